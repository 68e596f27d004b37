use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use kampus_api::{
    validate_string, Comment, CommentId, CommentSource, CommentStore, Error, Post, PostId, Time,
    User, UserId, Uuid, VoteDirection, VoteRecord, VoteStore, VoteTarget,
};

/// In-memory stand-in for the hosted backend: flat comment rows per post,
/// one vote row per (entity, voter), aggregate counts maintained the way the
/// real store maintains them. Also counts store calls and can fail the next
/// one, so tests can exercise the rollback paths.
pub struct MockServer {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<PostId, Vec<Comment>>,
    votes: HashMap<(Uuid, UserId), VoteDirection>,
    ops: usize,
    fail_next: bool,
}

trait Votable {
    fn counts_mut(&mut self) -> (&mut i64, &mut i64);
    fn votes_mut(&mut self) -> &mut Vec<VoteRecord>;
}

impl Votable for Post {
    fn counts_mut(&mut self) -> (&mut i64, &mut i64) {
        (&mut self.like_count, &mut self.dislike_count)
    }

    fn votes_mut(&mut self) -> &mut Vec<VoteRecord> {
        &mut self.votes
    }
}

impl Votable for Comment {
    fn counts_mut(&mut self) -> (&mut i64, &mut i64) {
        (&mut self.like_count, &mut self.dislike_count)
    }

    fn votes_mut(&mut self) -> &mut Vec<VoteRecord> {
        &mut self.votes
    }
}

fn bump(v: &mut dyn Votable, direction: VoteDirection, by: i64) {
    let (likes, dislikes) = v.counts_mut();
    match direction {
        VoteDirection::Up => *likes += by,
        VoteDirection::Down => *dislikes += by,
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            votes: HashMap::new(),
            ops: 0,
            fail_next: false,
        }
    }

    /// Makes the next store call fail with Error::Unknown without touching
    /// any state
    pub fn fail_next_op(&mut self) {
        self.fail_next = true;
    }

    /// Number of store calls made so far, failed ones included
    pub fn store_ops(&self) -> usize {
        self.ops
    }

    pub fn create_user(&mut self, name: &str) -> Result<UserId, Error> {
        validate_string(name)?;
        let id = UserId(Uuid::new_v4());
        self.users.insert(
            id,
            User {
                name: String::from(name),
            },
        );
        Ok(id)
    }

    pub fn create_post(
        &mut self,
        author: Option<UserId>,
        is_anonymous: bool,
        body: &str,
        at: Time,
    ) -> Result<PostId, Error> {
        validate_string(body)?;
        let id = PostId(Uuid::new_v4());
        self.posts.insert(
            id,
            Post {
                id,
                author_id: author,
                is_anonymous,
                created_at: at,
                body: String::from(body),
                like_count: 0,
                dislike_count: 0,
                votes: Vec::new(),
            },
        );
        self.comments.insert(id, Vec::new());
        Ok(id)
    }

    pub fn create_comment(
        &mut self,
        post: PostId,
        parent: Option<CommentId>,
        author: Option<UserId>,
        body: &str,
        at: Time,
    ) -> Result<CommentId, Error> {
        validate_string(body)?;
        let comments = self
            .comments
            .get_mut(&post)
            .ok_or(Error::UnknownEntity(post.0))?;
        let id = CommentId(Uuid::new_v4());
        comments.push(Comment {
            id,
            post_id: post,
            parent_id: parent,
            author_id: author,
            created_at: at,
            body: String::from(body),
            like_count: 0,
            dislike_count: 0,
            votes: Vec::new(),
        });
        Ok(id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments
            .values()
            .flat_map(|v| v.iter())
            .find(|c| c.id == id)
    }

    fn begin_op(&mut self) -> Result<(), Error> {
        self.ops += 1;
        match std::mem::take(&mut self.fail_next) {
            true => Err(Error::Unknown(String::from("injected failure"))),
            false => Ok(()),
        }
    }

    fn votable_mut(&mut self, target: VoteTarget) -> Result<&mut dyn Votable, Error> {
        match target {
            VoteTarget::Post(id) => self
                .posts
                .get_mut(&id)
                .map(|p| p as &mut dyn Votable)
                .ok_or(Error::UnknownEntity(id.0)),
            VoteTarget::Comment(id) => self
                .comments
                .values_mut()
                .flat_map(|v| v.iter_mut())
                .find(|c| c.id == id)
                .map(|c| c as &mut dyn Votable)
                .ok_or(Error::UnknownEntity(id.0)),
        }
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentSource for MockServer {
    async fn fetch_comments(&mut self, post: PostId) -> Result<Vec<Comment>, Error> {
        self.begin_op()?;
        self.comments
            .get(&post)
            .cloned()
            .ok_or(Error::UnknownEntity(post.0))
    }
}

#[async_trait]
impl VoteStore for MockServer {
    async fn create_vote(
        &mut self,
        target: VoteTarget,
        voter: UserId,
        direction: VoteDirection,
    ) -> Result<(), Error> {
        self.begin_op()?;
        let key = (target.uuid(), voter);
        if self.votes.contains_key(&key) {
            return Err(Error::VoteAlreadyRecorded(target.uuid()));
        }
        let v = self.votable_mut(target)?;
        v.votes_mut().push(VoteRecord {
            voter_id: voter,
            direction,
        });
        bump(v, direction, 1);
        self.votes.insert(key, direction);
        Ok(())
    }

    async fn update_vote(
        &mut self,
        target: VoteTarget,
        voter: UserId,
        direction: VoteDirection,
    ) -> Result<(), Error> {
        self.begin_op()?;
        let key = (target.uuid(), voter);
        let old = *self
            .votes
            .get(&key)
            .ok_or(Error::UnknownEntity(target.uuid()))?;
        let v = self.votable_mut(target)?;
        bump(&mut *v, old, -1);
        bump(&mut *v, direction, 1);
        if let Some(r) = v.votes_mut().iter_mut().find(|r| r.voter_id == voter) {
            r.direction = direction;
        }
        self.votes.insert(key, direction);
        Ok(())
    }

    async fn delete_vote(&mut self, target: VoteTarget, voter: UserId) -> Result<(), Error> {
        self.begin_op()?;
        let key = (target.uuid(), voter);
        let old = *self
            .votes
            .get(&key)
            .ok_or(Error::UnknownEntity(target.uuid()))?;
        let v = self.votable_mut(target)?;
        bump(&mut *v, old, -1);
        v.votes_mut().retain(|r| r.voter_id != voter);
        self.votes.remove(&key);
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MockServer {
    async fn delete_comment(&mut self, comment: CommentId) -> Result<(), Error> {
        self.begin_op()?;
        for comments in self.comments.values_mut() {
            let before = comments.len();
            // Only the row itself is removed; replies keep their now
            // dangling parent_id, like they do in the real store
            comments.retain(|c| c.id != comment);
            if comments.len() != before {
                return Ok(());
            }
        }
        Err(Error::UnknownEntity(comment.0))
    }
}
