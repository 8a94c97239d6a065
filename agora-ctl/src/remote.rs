use agora_api::{
    Accounts, Address, Balance, Call, Comment, CommentId, DataSource, Error, Gas, Post, PostId,
    Receipt, Transactor, Vote, VoteId,
};
use async_trait::async_trait;
use serde_json::json;

/// A ledger reached through the HTTP gateway at `host`
pub struct RemoteLedger {
    client: reqwest::Client,
    host: String,

    /// Account reads are attributed to
    from: Option<Address>,
}

fn unavailable(e: reqwest::Error) -> Error {
    Error::Unavailable(e.to_string())
}

impl RemoteLedger {
    pub fn new(host: String, from: Option<Address>) -> RemoteLedger {
        RemoteLedger {
            client: reqwest::Client::new(),
            host: String::from(host.trim_end_matches('/')),
            from,
        }
    }

    async fn fetch<R>(&self, path: &str) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let req = self.client.get(format!("{}/api/{}", self.host, path));
        let req = match &self.from {
            Some(from) => req.query(&[("from", &from.0)]),
            None => req,
        };
        send(req).await
    }

    async fn send_json<R>(&self, path: &str, body: serde_json::Value) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        send(
            self.client
                .post(format!("{}/api/{}", self.host, path))
                .json(&body),
        )
        .await
    }
}

async fn send<R>(req: reqwest::RequestBuilder) -> Result<R, Error>
where
    R: for<'de> serde::Deserialize<'de>,
{
    let resp = req.send().await.map_err(unavailable)?;
    let status = resp.status();
    let body = resp.bytes().await.map_err(unavailable)?;
    if !status.is_success() {
        tracing::debug!(%status, "gateway returned an error");
        return Err(Error::parse(&body)
            .unwrap_or_else(|err| Error::Unknown(format!("{status}: {err:#}"))));
    }
    // the gateway answers calls without a result with an empty body, which is not valid json
    let body: &[u8] = match body.is_empty() {
        true => b"null",
        false => &body,
    };
    serde_json::from_slice(body).map_err(|err| Error::Unknown(format!("parsing response: {err}")))
}

#[async_trait]
impl DataSource for RemoteLedger {
    async fn post_count(&self) -> Result<u64, Error> {
        self.fetch("posts/count").await
    }

    async fn post(&self, id: PostId) -> Result<Post, Error> {
        self.fetch(&format!("posts/{}", id.0)).await
    }

    async fn comment(&self, id: CommentId) -> Result<Comment, Error> {
        self.fetch(&format!("comments/{}", id.0)).await
    }

    async fn vote(&self, id: VoteId) -> Result<Vote, Error> {
        self.fetch(&format!("votes/{}", id.0)).await
    }

    async fn post_votes(&self, id: PostId) -> Result<Vec<VoteId>, Error> {
        self.fetch(&format!("posts/{}/votes", id.0)).await
    }

    async fn comment_votes(&self, id: CommentId) -> Result<Vec<VoteId>, Error> {
        self.fetch(&format!("comments/{}/votes", id.0)).await
    }

    async fn post_comments(&self, id: PostId) -> Result<Vec<CommentId>, Error> {
        self.fetch(&format!("posts/{}/comments", id.0)).await
    }

    async fn comment_comments(&self, id: CommentId) -> Result<Vec<CommentId>, Error> {
        self.fetch(&format!("comments/{}/comments", id.0)).await
    }
}

#[async_trait]
impl Transactor for RemoteLedger {
    async fn estimate(&self, call: &Call, from: &Address) -> Result<Gas, Error> {
        self.send_json("estimate", json!({ "call": call, "from": from }))
            .await
    }

    async fn submit(&self, call: &Call, from: &Address, gas: Gas) -> Result<Receipt, Error> {
        self.send_json("submit", json!({ "call": call, "from": from, "gas": gas }))
            .await
    }
}

#[async_trait]
impl Accounts for RemoteLedger {
    async fn create_account(&self, password: &str) -> Result<Address, Error> {
        self.send_json("accounts", json!({ "password": password })).await
    }

    async fn unlock_account(&self, address: &Address, password: &str) -> Result<(), Error> {
        self.send_json(
            &format!("accounts/{address}/unlock"),
            json!({ "password": password }),
        )
        .await
    }

    async fn balance(&self, address: &Address) -> Result<Balance, Error> {
        self.fetch(&format!("accounts/{address}/balance")).await
    }

    async fn fund(&self, to: &Address, amount: Balance) -> Result<Receipt, Error> {
        self.send_json(&format!("accounts/{to}/fund"), json!({ "amount": amount }))
            .await
    }
}
