use std::fmt;

use crate::{Address, PostId, Target};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comment {}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub owner: Address,

    /// Post or comment this comment replies to
    pub parent: Target,

    pub body: String,
}

impl Comment {
    /// The record a ledger hands out for an id it never allocated
    pub fn empty(id: CommentId) -> Comment {
        Comment {
            id,
            owner: Address::zero(),
            parent: Target::Post(PostId(0)),
            body: String::new(),
        }
    }
}
