use crate::{
    api::{
        Comment, CommentId, CommentStore, Error, Post, UserId, VoteDirection, VoteStore, VoteTarget,
    },
    tree::{self, CommentNode},
    vote::{apply_vote, VoteOp, VoteSnapshot},
};

/// One screen's working copy of a post and its comment forest. Each screen
/// instance owns its copy exclusively; nothing here is shared or locked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostThread {
    pub viewer: Option<UserId>,
    pub post: Post,
    /// The viewer's own vote on the post, as currently displayed. Starts
    /// from the fetched vote records and then tracks optimistic updates.
    pub post_vote: Option<VoteDirection>,
    pub comments: Vec<CommentNode>,
}

/// An in-flight vote mutation: the op still to be confirmed by the store,
/// and the exact pre-mutation snapshot to restore if confirmation fails
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteSubmission {
    pub target: VoteTarget,
    pub op: VoteOp,
    rollback: VoteSnapshot,
}

impl VoteSubmission {
    pub async fn execute<S: VoteStore + ?Sized>(
        &self,
        store: &mut S,
        voter: UserId,
    ) -> Result<(), Error> {
        match self.op {
            VoteOp::Create(direction) => store.create_vote(self.target, voter, direction).await,
            VoteOp::Update(direction) => store.update_vote(self.target, voter, direction).await,
            VoteOp::Delete => store.delete_vote(self.target, voter).await,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteResolution {
    /// The optimistic state was confirmed; nothing left to do
    Confirmed,
    /// A failed post vote only rolls back locally
    RolledBack,
    /// A failed comment vote rolls back locally and the caller should
    /// refetch the flat list and call refresh_comments as a fallback
    RolledBackRefetch,
}

impl PostThread {
    pub fn new(post: Post, flat: Vec<Comment>, viewer: Option<UserId>) -> PostThread {
        let post_vote = post.viewer_vote(viewer);
        let comments = tree::build_tree(flat, viewer);
        PostThread {
            viewer,
            post,
            post_vote,
            comments,
        }
    }

    /// Rebuilds the forest from a fresh fetch, superseding any local state
    pub fn refresh_comments(&mut self, flat: Vec<Comment>) {
        self.comments = tree::build_tree(flat, self.viewer);
    }

    pub fn post_snapshot(&self) -> VoteSnapshot {
        VoteSnapshot {
            like_count: self.post.like_count,
            dislike_count: self.post.dislike_count,
            viewer_vote: self.post_vote,
        }
    }

    fn snapshot_of(&self, target: VoteTarget) -> Result<VoteSnapshot, Error> {
        match target {
            VoteTarget::Post(id) if id == self.post.id => Ok(self.post_snapshot()),
            VoteTarget::Post(id) => Err(Error::UnknownEntity(id.0)),
            VoteTarget::Comment(id) => {
                let node =
                    tree::find(&self.comments, id).ok_or(Error::UnknownEntity(id.0))?;
                Ok(VoteSnapshot {
                    like_count: node.comment.like_count,
                    dislike_count: node.comment.dislike_count,
                    viewer_vote: node.viewer_vote,
                })
            }
        }
    }

    fn set_snapshot(&mut self, target: VoteTarget, snap: VoteSnapshot) -> Result<(), Error> {
        match target {
            VoteTarget::Post(id) if id == self.post.id => {
                self.post.like_count = snap.like_count;
                self.post.dislike_count = snap.dislike_count;
                self.post_vote = snap.viewer_vote;
                Ok(())
            }
            VoteTarget::Post(id) => Err(Error::UnknownEntity(id.0)),
            VoteTarget::Comment(id) => {
                let node =
                    tree::find_mut(&mut self.comments, id).ok_or(Error::UnknownEntity(id.0))?;
                node.comment.like_count = snap.like_count;
                node.comment.dislike_count = snap.dislike_count;
                node.viewer_vote = snap.viewer_vote;
                Ok(())
            }
        }
    }

    /// Applies the vote to the displayed state synchronously and returns the
    /// submission carrying the store op and the rollback snapshot.
    ///
    /// The toggle is always computed from the state as currently displayed,
    /// never from a captured copy: under a fast double-tap the second
    /// request sees the first one's optimistic result, so it becomes an
    /// undo instead of a lost update.
    pub fn request_vote(
        &mut self,
        target: VoteTarget,
        requested: VoteDirection,
    ) -> Result<VoteSubmission, Error> {
        if self.viewer.is_none() {
            return Err(Error::Unauthenticated);
        }
        let rollback = self.snapshot_of(target)?;
        let (next, op) = apply_vote(&rollback, requested);
        self.set_snapshot(target, next)?;
        tracing::debug!(?target, ?op, "applied vote optimistically");
        Ok(VoteSubmission {
            target,
            op,
            rollback,
        })
    }

    /// Feeds the store's answer back in. On success the optimistic state is
    /// already correct; on failure the pre-mutation snapshot is restored
    /// as-is rather than recomputed from server state.
    pub fn resolve_vote(
        &mut self,
        submission: VoteSubmission,
        outcome: Result<(), Error>,
    ) -> VoteResolution {
        match outcome {
            Ok(()) => VoteResolution::Confirmed,
            Err(err) => {
                tracing::debug!(target = ?submission.target, %err, "vote persistence failed, rolling back");
                if let Err(err) = self.set_snapshot(submission.target, submission.rollback) {
                    tracing::warn!(target = ?submission.target, %err, "rollback target disappeared from the thread");
                }
                match submission.target {
                    VoteTarget::Post(_) => VoteResolution::RolledBack,
                    VoteTarget::Comment(_) => VoteResolution::RolledBackRefetch,
                }
            }
        }
    }

    /// Full optimistic round trip: apply locally, persist, reconcile
    pub async fn vote<S: VoteStore + ?Sized>(
        &mut self,
        store: &mut S,
        target: VoteTarget,
        requested: VoteDirection,
    ) -> Result<VoteResolution, Error> {
        let voter = self.viewer.ok_or(Error::Unauthenticated)?;
        let submission = self.request_vote(target, requested)?;
        let outcome = submission.execute(store, voter).await;
        Ok(self.resolve_vote(submission, outcome))
    }

    /// Deletion is the intentional asymmetry versus voting: the local
    /// removal happens only once the store has confirmed it, so a failed
    /// delete leaves the comment visible.
    pub async fn delete_comment<S: CommentStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: CommentId,
    ) -> Result<(), Error> {
        if self.viewer.is_none() {
            return Err(Error::Unauthenticated);
        }
        store.delete_comment(id).await?;
        if !tree::remove_by_id(&mut self.comments, id) {
            tracing::warn!(comment = ?id, "deleted comment was not in the local thread");
        }
        Ok(())
    }
}
