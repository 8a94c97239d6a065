use std::fmt;

use crate::Address;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post {}", self.0)
    }
}

/// A post as stored by the ledger, without its votes or comments
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub owner: Address,
    pub title: String,
    pub description: String,
}

impl Post {
    /// The record a ledger hands out for an id it never allocated
    pub fn empty(id: PostId) -> Post {
        Post {
            id,
            owner: Address::zero(),
            title: String::new(),
            description: String::new(),
        }
    }
}
