use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{Address, Target};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Unknown account {0}")]
    UnknownAccount(Address),

    #[error("Account {0} is locked")]
    AccountLocked(Address),

    #[error("Account {0} cannot fund this call")]
    InsufficientFunds(Address),

    #[error("No such {0}")]
    InvalidTarget(Target),
}

impl Error {
    pub fn contents(&self) -> Vec<u8> {
        match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::Unavailable(msg) => json!({
                "message": msg,
                "type": "unavailable",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::UnknownAccount(a) => json!({
                "message": "unknown account",
                "type": "unknown-account",
                "account": a,
            }),
            Error::AccountLocked(a) => json!({
                "message": "account is locked",
                "type": "account-locked",
                "account": a,
            }),
            Error::InsufficientFunds(a) => json!({
                "message": "insufficient funds",
                "type": "insufficient-funds",
                "account": a,
            }),
            Error::InvalidTarget(t) => json!({
                "message": "call refers to a nonexistent node",
                "type": "invalid-target",
                "target": t,
            }),
        }
        .to_string()
        .into_bytes()
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let account = || -> anyhow::Result<Address> {
            serde_json::from_value(
                data.get("account")
                    .cloned()
                    .ok_or_else(|| anyhow!("account error without an account"))?,
            )
            .context("parsing account of error")
        };
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(message()),
                "unavailable" => Error::Unavailable(message()),
                "permission-denied" => Error::PermissionDenied,
                "unknown-account" => Error::UnknownAccount(account()?),
                "account-locked" => Error::AccountLocked(account()?),
                "insufficient-funds" => Error::InsufficientFunds(account()?),
                "invalid-target" => Error::InvalidTarget(
                    serde_json::from_value(
                        data.get("target")
                            .cloned()
                            .ok_or_else(|| anyhow!("invalid-target error without a target"))?,
                    )
                    .context("parsing target of invalid-target error")?,
                ),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommentId, PostId};

    #[test]
    fn parses_what_it_renders() {
        let errors = [
            Error::Unknown(String::from("boom")),
            Error::Unavailable(String::from("connection refused")),
            Error::PermissionDenied,
            Error::UnknownAccount(Address::zero()),
            Error::AccountLocked(Address(String::from("0xabc"))),
            Error::InsufficientFunds(Address(String::from("0xdef"))),
            Error::InvalidTarget(Target::Post(PostId(3))),
            Error::InvalidTarget(Target::Comment(CommentId(12))),
        ];
        for e in errors {
            assert_eq!(Error::parse(&e.contents()).expect("parsing error"), e);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(Error::parse(br#"{"type": "nope"}"#).is_err());
        assert!(Error::parse(br#"{"type": "account-locked"}"#).is_err());
        assert!(Error::parse(b"not json").is_err());
    }
}
