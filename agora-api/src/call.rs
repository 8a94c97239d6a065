use std::fmt;

use crate::{CommentId, PostId, Target};

/// A state-changing operation submitted to the ledger
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case", tag = "op")]
pub enum Call {
    AddPost { title: String, description: String },
    VotePost { post: PostId, up: bool },
    CommentPost { post: PostId, body: String },
    VoteComment { comment: CommentId, up: bool },
    CommentComment { comment: CommentId, body: String },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::AddPost { .. } => "add-post",
            Call::VotePost { .. } => "vote-post",
            Call::CommentPost { .. } => "comment-post",
            Call::VoteComment { .. } => "vote-comment",
            Call::CommentComment { .. } => "comment-comment",
        }
    }

    /// The already-existing node this call refers to, if any
    pub fn target(&self) -> Option<Target> {
        match self {
            Call::AddPost { .. } => None,
            Call::VotePost { post, .. } | Call::CommentPost { post, .. } => Some(Target::Post(*post)),
            Call::VoteComment { comment, .. } | Call::CommentComment { comment, .. } => {
                Some(Target::Comment(*comment))
            }
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            None => f.write_str(self.name()),
            Some(t) => write!(f, "{} on {t}", self.name()),
        }
    }
}

/// Cost of a call, in ledger cost units
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct Gas(pub u64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Receipt {
    /// Whether the ledger applied the call
    pub status: bool,
    pub gas_used: Gas,
}
