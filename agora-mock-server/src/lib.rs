use std::collections::{btree_map, BTreeMap};

use agora_api::{
    Accounts, Address, Balance, Call, Comment, CommentId, DataSource, Error, Gas,
    Post, PostId, Receipt, Target, Transactor, Vote, VoteId,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Price of one unit of gas, in base units
pub const GAS_PRICE: u128 = 20_000_000_000;

pub const ADD_POST_GAS: Gas = Gas(150_000);
pub const ADD_COMMENT_GAS: Gas = Gas(120_000);
pub const ADD_VOTE_GAS: Gas = Gas(60_000);
/// Extra cost of a vote that supersedes a previous one
pub const CHANGE_VOTE_GAS: Gas = Gas(10_000);
pub const TRANSFER_GAS: Gas = Gas(21_000);

/// An in-memory ledger following the write rules of the forum contract
pub struct MockServer(Mutex<Ledger>);

#[derive(Debug)]
struct Ledger {
    posts: Vec<Node<Post>>,
    comments: Vec<Node<Comment>>,
    votes: Vec<Vote>,
    accounts: BTreeMap<Address, DbAccount>,
    coinbase: Address,
    unavailable: bool,
    reject_submissions: bool,
}

#[derive(Debug)]
struct Node<T> {
    record: T,
    votes: Vec<VoteId>,
    comments: Vec<CommentId>,
}

impl<T> Node<T> {
    fn new(record: T) -> Node<T> {
        Node {
            record,
            votes: Vec::new(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct DbAccount {
    password: String,
    unlocked: bool,
    balance: Balance,
}

fn cost(gas: Gas) -> Balance {
    Balance(u128::from(gas.0).saturating_mul(GAS_PRICE))
}

fn address(n: usize) -> Address {
    Address(format!("0x{:040x}", n + 1))
}

impl Ledger {
    fn check_available(&self) -> Result<(), Error> {
        match self.unavailable {
            true => Err(Error::Unavailable(String::from("mock ledger is down"))),
            false => Ok(()),
        }
    }

    fn exists(&self, t: Target) -> bool {
        match t {
            Target::Post(p) => (p.0 as usize) < self.posts.len(),
            Target::Comment(c) => (c.0 as usize) < self.comments.len(),
        }
    }

    fn node_mut(&mut self, t: Target) -> Option<(&mut Vec<VoteId>, &mut Vec<CommentId>)> {
        match t {
            Target::Post(p) => self
                .posts
                .get_mut(p.0 as usize)
                .map(|n| (&mut n.votes, &mut n.comments)),
            Target::Comment(c) => self
                .comments
                .get_mut(c.0 as usize)
                .map(|n| (&mut n.votes, &mut n.comments)),
        }
    }

    fn live_vote(&self, voter: &Address, t: Target) -> Option<VoteId> {
        let votes = match t {
            Target::Post(p) => &self.posts.get(p.0 as usize)?.votes,
            Target::Comment(c) => &self.comments.get(c.0 as usize)?.votes,
        };
        votes.iter().copied().find(|id| {
            self.votes
                .get(id.0 as usize)
                .map_or(false, |v| v.is_live() && v.voter == *voter)
        })
    }

    fn gas_for(&self, call: &Call, from: &Address) -> Gas {
        match call {
            Call::AddPost { .. } => ADD_POST_GAS,
            Call::CommentPost { .. } | Call::CommentComment { .. } => ADD_COMMENT_GAS,
            Call::VotePost { .. } | Call::VoteComment { .. } => {
                match call.target().and_then(|t| self.live_vote(from, t)) {
                    Some(_) => Gas(ADD_VOTE_GAS.0 + CHANGE_VOTE_GAS.0),
                    None => ADD_VOTE_GAS,
                }
            }
        }
    }

    fn account(&self, a: &Address) -> Result<&DbAccount, Error> {
        self.accounts
            .get(a)
            .ok_or_else(|| Error::UnknownAccount(a.clone()))
    }

    fn check_can_sign(&self, from: &Address) -> Result<&DbAccount, Error> {
        let account = self.account(from)?;
        if !account.unlocked {
            return Err(Error::AccountLocked(from.clone()));
        }
        Ok(account)
    }

    fn estimate(&self, call: &Call, from: &Address) -> Result<Gas, Error> {
        self.check_available()?;
        let account = self.check_can_sign(from)?;
        if let Some(t) = call.target() {
            if !self.exists(t) {
                return Err(Error::InvalidTarget(t));
            }
        }
        let gas = self.gas_for(call, from);
        if account.balance < cost(gas) {
            return Err(Error::InsufficientFunds(from.clone()));
        }
        Ok(gas)
    }

    fn submit(&mut self, call: &Call, from: &Address, gas: Gas) -> Result<Receipt, Error> {
        self.check_available()?;
        let account = self.check_can_sign(from)?;
        if account.balance < cost(gas) {
            return Err(Error::InsufficientFunds(from.clone()));
        }
        let required = self.gas_for(call, from);
        let applicable = call.target().map(|t| self.exists(t)).unwrap_or(true);
        let status = applicable && gas >= required && !self.reject_submissions;
        let gas_used = match status {
            true => required,
            false => gas,
        };
        if let Some(account) = self.accounts.get_mut(from) {
            account.balance = Balance(account.balance.0 - cost(gas_used).0);
        }
        if status {
            self.apply(call, from);
        } else {
            tracing::debug!(%call, %from, "reverted call");
        }
        Ok(Receipt { status, gas_used })
    }

    fn apply(&mut self, call: &Call, from: &Address) {
        match call {
            Call::AddPost { title, description } => {
                let id = PostId(self.posts.len() as u64);
                self.posts.push(Node::new(Post {
                    id,
                    owner: from.clone(),
                    title: title.clone(),
                    description: description.clone(),
                }));
            }
            Call::CommentPost { post, body } => self.add_comment(from, Target::Post(*post), body),
            Call::CommentComment { comment, body } => {
                self.add_comment(from, Target::Comment(*comment), body)
            }
            Call::VotePost { post, up } => self.add_vote(from, Target::Post(*post), *up),
            Call::VoteComment { comment, up } => {
                self.add_vote(from, Target::Comment(*comment), *up)
            }
        }
    }

    fn add_comment(&mut self, from: &Address, parent: Target, body: &str) {
        let id = CommentId(self.comments.len() as u64);
        if let Some((_, comments)) = self.node_mut(parent) {
            comments.push(id);
            self.comments.push(Node::new(Comment {
                id,
                owner: from.clone(),
                parent,
                body: String::from(body),
            }));
        }
    }

    fn add_vote(&mut self, from: &Address, target: Target, up: bool) {
        let id = VoteId(self.votes.len() as u64);
        if let Some(previous) = self.live_vote(from, target) {
            self.votes[previous.0 as usize].changed = true;
        }
        if let Some((votes, _)) = self.node_mut(target) {
            votes.push(id);
            self.votes.push(Vote {
                id,
                voter: from.clone(),
                target,
                up,
                changed: false,
            });
        }
    }

    fn create_account(&mut self, password: &str, unlocked: bool) -> Address {
        let address = address(self.accounts.len());
        self.accounts.insert(
            address.clone(),
            DbAccount {
                password: String::from(password),
                unlocked,
                balance: Balance(0),
            },
        );
        address
    }

    fn fund(&mut self, to: &Address, amount: Balance) -> Result<Receipt, Error> {
        self.check_available()?;
        self.account(to)?;
        let needed = amount.0.saturating_add(cost(TRANSFER_GAS).0);
        let coinbase = self
            .accounts
            .get_mut(&self.coinbase)
            .ok_or_else(|| Error::UnknownAccount(self.coinbase.clone()))?;
        if coinbase.balance.0 < needed {
            return Err(Error::InsufficientFunds(self.coinbase.clone()));
        }
        coinbase.balance = Balance(coinbase.balance.0 - needed);
        if let Some(account) = self.accounts.get_mut(to) {
            account.balance = Balance(account.balance.0.saturating_add(amount.0));
        }
        Ok(Receipt {
            status: true,
            gas_used: TRANSFER_GAS,
        })
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        let mut ledger = Ledger {
            posts: Vec::new(),
            comments: Vec::new(),
            votes: Vec::new(),
            accounts: BTreeMap::new(),
            coinbase: Address::zero(),
            unavailable: false,
            reject_submissions: false,
        };
        let coinbase = ledger.create_account("", true);
        if let Some(account) = ledger.accounts.get_mut(&coinbase) {
            account.balance = Balance::units(1_000_000_000);
        }
        ledger.coinbase = coinbase;
        MockServer(Mutex::new(ledger))
    }

    /// Account that funds new accounts
    pub fn coinbase(&self) -> Address {
        self.0.lock().coinbase.clone()
    }

    /// Make every subsequent call fail as if the ledger could not be reached
    pub fn test_set_unavailable(&self, unavailable: bool) {
        self.0.lock().unavailable = unavailable;
    }

    /// Make every subsequent submission revert
    pub fn test_reject_submissions(&self, reject: bool) {
        self.0.lock().reject_submissions = reject;
    }

    /// Create an unlocked account holding one unit
    pub fn test_new_funded_account(&self) -> Address {
        let mut ledger = self.0.lock();
        let address = ledger.create_account("", true);
        if let Some(account) = ledger.accounts.get_mut(&address) {
            account.balance = Balance::units(1);
        }
        address
    }

    pub fn test_lock(&self, address: &Address) {
        if let Some(account) = self.0.lock().accounts.get_mut(address) {
            account.unlocked = false;
        }
    }

    /// Return the current number of comments
    pub fn test_num_comments(&self) -> usize {
        self.0.lock().comments.len()
    }

    /// Return every vote ever cast, superseded ones included
    pub fn test_all_votes(&self) -> Vec<Vote> {
        self.0.lock().votes.clone()
    }

    /// Apply `call` for free, panicking if the ledger would refuse it
    pub fn test_apply(&self, call: Call, from: &Address) {
        let mut ledger = self.0.lock();
        if let Err(e) = ledger.estimate(&call, from) {
            panic!("applying {call} for {from}: {e}");
        }
        ledger.apply(&call, from);
    }

    pub fn test_add_post(&self, from: &Address, title: &str, description: &str) -> PostId {
        let id = PostId(self.0.lock().posts.len() as u64);
        self.test_apply(
            Call::AddPost {
                title: String::from(title),
                description: String::from(description),
            },
            from,
        );
        id
    }

    pub fn test_comment(&self, from: &Address, on: impl Into<Target>, body: &str) -> CommentId {
        let id = CommentId(self.test_num_comments() as u64);
        let body = String::from(body);
        self.test_apply(
            match on.into() {
                Target::Post(post) => Call::CommentPost { post, body },
                Target::Comment(comment) => Call::CommentComment { comment, body },
            },
            from,
        );
        id
    }

    pub fn test_vote(&self, from: &Address, on: impl Into<Target>, up: bool) -> VoteId {
        let id = VoteId(self.0.lock().votes.len() as u64);
        self.test_apply(
            match on.into() {
                Target::Post(post) => Call::VotePost { post, up },
                Target::Comment(comment) => Call::VoteComment { comment, up },
            },
            from,
        );
        id
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl DataSource for MockServer {
    async fn post_count(&self) -> Result<u64, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger.posts.len() as u64)
    }

    async fn post(&self, id: PostId) -> Result<Post, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .posts
            .get(id.0 as usize)
            .map(|n| n.record.clone())
            .unwrap_or_else(|| Post::empty(id)))
    }

    async fn comment(&self, id: CommentId) -> Result<Comment, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .comments
            .get(id.0 as usize)
            .map(|n| n.record.clone())
            .unwrap_or_else(|| Comment::empty(id)))
    }

    async fn vote(&self, id: VoteId) -> Result<Vote, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .votes
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| Vote {
                id,
                voter: Address::zero(),
                target: Target::Post(PostId(0)),
                up: false,
                changed: false,
            }))
    }

    async fn post_votes(&self, id: PostId) -> Result<Vec<VoteId>, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .posts
            .get(id.0 as usize)
            .map(|n| n.votes.clone())
            .unwrap_or_default())
    }

    async fn comment_votes(&self, id: CommentId) -> Result<Vec<VoteId>, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .comments
            .get(id.0 as usize)
            .map(|n| n.votes.clone())
            .unwrap_or_default())
    }

    async fn post_comments(&self, id: PostId) -> Result<Vec<CommentId>, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .posts
            .get(id.0 as usize)
            .map(|n| n.comments.clone())
            .unwrap_or_default())
    }

    async fn comment_comments(&self, id: CommentId) -> Result<Vec<CommentId>, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .comments
            .get(id.0 as usize)
            .map(|n| n.comments.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Transactor for MockServer {
    async fn estimate(&self, call: &Call, from: &Address) -> Result<Gas, Error> {
        self.0.lock().estimate(call, from)
    }

    async fn submit(&self, call: &Call, from: &Address, gas: Gas) -> Result<Receipt, Error> {
        self.0.lock().submit(call, from, gas)
    }
}

#[async_trait]
impl Accounts for MockServer {
    async fn create_account(&self, password: &str) -> Result<Address, Error> {
        let mut ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger.create_account(password, false))
    }

    async fn unlock_account(&self, address: &Address, password: &str) -> Result<(), Error> {
        let mut ledger = self.0.lock();
        ledger.check_available()?;
        match ledger.accounts.entry(address.clone()) {
            btree_map::Entry::Vacant(_) => Err(Error::UnknownAccount(address.clone())),
            btree_map::Entry::Occupied(mut a) if a.get().password == password => {
                a.get_mut().unlocked = true;
                Ok(())
            }
            btree_map::Entry::Occupied(_) => Err(Error::PermissionDenied),
        }
    }

    async fn balance(&self, address: &Address) -> Result<Balance, Error> {
        let ledger = self.0.lock();
        ledger.check_available()?;
        Ok(ledger
            .accounts
            .get(address)
            .map(|a| a.balance)
            .unwrap_or_default())
    }

    async fn fund(&self, to: &Address, amount: Balance) -> Result<Receipt, Error> {
        self.0.lock().fund(to, amount)
    }
}
