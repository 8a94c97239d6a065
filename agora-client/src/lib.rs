mod account;
pub use account::{balance, create_account, unlock_account, FUNDING_AMOUNT};

mod builder;
pub use builder::{build_comment, build_post, build_posts, count_posts, FetchOptions};

mod collect;
pub use collect::collect;

pub mod consensus;

mod counters;
pub use counters::{comments_count, votes_count};

mod error;
pub use error::Error;

mod gateway;
pub use gateway::{add_post, comment_comment, comment_post, submit, vote_comment, vote_post};

mod tree;
pub use tree::{Comment, Moment, MomentKind, Node, Post};

mod vote;
pub use vote::resolve_votes;

mod fuzz;

#[cfg(test)]
mod test_util;

pub mod api {
    pub use agora_api::*;
}
