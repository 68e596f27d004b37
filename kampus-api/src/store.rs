use async_trait::async_trait;

use crate::{Comment, CommentId, Error, PostId, UserId, VoteDirection, VoteTarget};

/// Where the flat comment rows come from. The client does not care whether
/// this is a REST call, a generated query client, or a local cache; it only
/// requires one post's comments, in any order, with vote records embedded.
#[async_trait]
pub trait CommentSource {
    async fn fetch_comments(&mut self, post: PostId) -> Result<Vec<Comment>, Error>;
}

/// Vote persistence, one record per (entity, voter). No partial-success
/// semantics: each call either fully applies or fully fails.
#[async_trait]
pub trait VoteStore {
    async fn create_vote(
        &mut self,
        target: VoteTarget,
        voter: UserId,
        direction: VoteDirection,
    ) -> Result<(), Error>;

    async fn update_vote(
        &mut self,
        target: VoteTarget,
        voter: UserId,
        direction: VoteDirection,
    ) -> Result<(), Error>;

    async fn delete_vote(&mut self, target: VoteTarget, voter: UserId) -> Result<(), Error>;
}

#[async_trait]
pub trait CommentStore {
    async fn delete_comment(&mut self, comment: CommentId) -> Result<(), Error>;
}
