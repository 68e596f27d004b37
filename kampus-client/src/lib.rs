mod thread;
mod tree;
mod vote;

pub use thread::{PostThread, VoteResolution, VoteSubmission};
pub use tree::{build_tree, find, find_mut, node_count, remove_by_id, CommentNode};
pub use vote::{apply_vote, VoteOp, VoteSnapshot};

pub mod api {
    pub use kampus_api::*;
}
