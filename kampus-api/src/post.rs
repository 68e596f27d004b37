use uuid::Uuid;

use crate::{viewer_direction, Time, UserId, VoteDirection, VoteRecord, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn stub() -> PostId {
        PostId(STUB_UUID)
    }
}

/// A feed post as fetched from the store, with its vote records embedded
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: Option<UserId>,
    /// When set, the author's identity must never be surfaced, even though
    /// author_id may still be present in the row
    pub is_anonymous: bool,
    pub created_at: Time,
    pub body: String,

    /// Aggregate counts, maintained by the store
    pub like_count: i64,
    pub dislike_count: i64,
    pub votes: Vec<VoteRecord>,
}

impl Post {
    pub fn visible_author(&self) -> Option<UserId> {
        match self.is_anonymous {
            true => None,
            false => self.author_id,
        }
    }

    pub fn viewer_vote(&self, viewer: Option<UserId>) -> Option<VoteDirection> {
        viewer.and_then(|v| viewer_direction(&self.votes, v))
    }

    pub fn score(&self) -> i64 {
        self.like_count - self.dislike_count
    }
}
