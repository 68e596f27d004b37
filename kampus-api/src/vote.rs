use uuid::Uuid;

use crate::{CommentId, PostId, UserId};

/// There is no zero-magnitude vote: a viewer either voted up, voted down, or
/// has no record at all.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Contribution of one vote in this direction to a score delta
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn flip(self) -> VoteDirection {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

/// One voter's vote on one entity; the store enforces at most one record per
/// (entity, voter) pair
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteRecord {
    pub voter_id: UserId,
    pub direction: VoteDirection,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum VoteTarget {
    Post(PostId),
    Comment(CommentId),
}

impl VoteTarget {
    pub fn uuid(&self) -> Uuid {
        match self {
            VoteTarget::Post(p) => p.0,
            VoteTarget::Comment(c) => c.0,
        }
    }
}

/// Scan embedded vote records for the given voter's own direction
pub fn viewer_direction(votes: &[VoteRecord], voter: UserId) -> Option<VoteDirection> {
    votes
        .iter()
        .find(|r| r.voter_id == voter)
        .map(|r| r.direction)
}
