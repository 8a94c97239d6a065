mod account;
pub use account::{Address, Balance, WEI_PER_UNIT};

mod call;
pub use call::{Call, Gas, Receipt};

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod ledger;
pub use ledger::{Accounts, DataSource, Transactor};

mod post;
pub use post::{Post, PostId};

mod vote;
pub use vote::{Target, Vote, VoteId};
