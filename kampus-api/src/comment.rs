use uuid::Uuid;

use crate::{viewer_direction, PostId, Time, UserId, VoteDirection, VoteRecord, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

/// A comment row exactly as fetched: flat, with a nullable parent link and
/// its vote records embedded. Nesting is reconstructed client-side.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    /// None marks a root comment on the post
    pub parent_id: Option<CommentId>,
    pub author_id: Option<UserId>,
    pub created_at: Time,
    pub body: String,

    /// Aggregate counts, maintained by the store
    pub like_count: i64,
    pub dislike_count: i64,
    pub votes: Vec<VoteRecord>,
}

impl Comment {
    pub fn viewer_vote(&self, viewer: Option<UserId>) -> Option<VoteDirection> {
        viewer.and_then(|v| viewer_direction(&self.votes, v))
    }

    pub fn score(&self) -> i64 {
        self.like_count - self.dislike_count
    }
}
