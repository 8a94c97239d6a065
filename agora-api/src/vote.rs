use std::fmt;

use crate::{Address, CommentId, PostId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct VoteId(pub u64);

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vote {}", self.0)
    }
}

/// Something that can be voted on or replied to
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "id")]
pub enum Target {
    Post(PostId),
    Comment(CommentId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Post(p) => p.fmt(f),
            Target::Comment(c) => c.fmt(f),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Vote {
    pub id: VoteId,
    pub voter: Address,
    pub target: Target,
    pub up: bool,

    /// Set once the same voter voted again on the same target
    pub changed: bool,
}

impl Vote {
    pub fn is_live(&self) -> bool {
        !self.changed
    }
}

impl From<PostId> for Target {
    fn from(p: PostId) -> Target {
        Target::Post(p)
    }
}

impl From<CommentId> for Target {
    fn from(c: CommentId) -> Target {
        Target::Comment(c)
    }
}
