mod comment;
mod error;
mod post;
mod store;
mod user;
mod vote;

pub use comment::{Comment, CommentId};
pub use error::Error;
pub use post::{Post, PostId};
pub use store::{CommentSource, CommentStore, VoteStore};
pub use user::{User, UserId};
pub use vote::{viewer_direction, VoteDirection, VoteRecord, VoteTarget};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

// The backing store keeps bodies and names in TEXT columns, which reject
// null bytes
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
