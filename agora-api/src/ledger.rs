use async_trait::async_trait;

use crate::{
    Address, Balance, Call, Comment, CommentId, Error, Gas, Post, PostId, Receipt, Vote, VoteId,
};

/// Read access to the record store
///
/// Index lists are returned in creation order. Ids the store never allocated
/// may be answered with default records and empty index lists.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn post_count(&self) -> Result<u64, Error>;
    async fn post(&self, id: PostId) -> Result<Post, Error>;
    async fn comment(&self, id: CommentId) -> Result<Comment, Error>;
    async fn vote(&self, id: VoteId) -> Result<Vote, Error>;
    async fn post_votes(&self, id: PostId) -> Result<Vec<VoteId>, Error>;
    async fn comment_votes(&self, id: CommentId) -> Result<Vec<VoteId>, Error>;
    async fn post_comments(&self, id: PostId) -> Result<Vec<CommentId>, Error>;
    async fn comment_comments(&self, id: CommentId) -> Result<Vec<CommentId>, Error>;
}

/// Write access to the record store
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Fails if `from` could not get `call` applied, whatever the budget
    async fn estimate(&self, call: &Call, from: &Address) -> Result<Gas, Error>;

    /// Resolves once the ledger has a receipt for the call
    async fn submit(&self, call: &Call, from: &Address, gas: Gas) -> Result<Receipt, Error>;
}

#[async_trait]
pub trait Accounts: Send + Sync {
    async fn create_account(&self, password: &str) -> Result<Address, Error>;
    async fn unlock_account(&self, address: &Address, password: &str) -> Result<(), Error>;
    async fn balance(&self, address: &Address) -> Result<Balance, Error>;

    /// Transfer `amount` from the ledger's funding account to `to`
    async fn fund(&self, to: &Address, amount: Balance) -> Result<Receipt, Error>;
}
