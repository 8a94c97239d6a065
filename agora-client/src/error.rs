use crate::api::{Address, Call, Error as ApiError};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The ledger refused to price the call, so it was never submitted
    #[error("estimating cost of {call}")]
    Unestimable {
        call: Call,
        #[source]
        source: ApiError,
    },

    /// The account exists, but the transfer meant to fund it was reverted
    #[error("funding new account {address}")]
    FundingFailed { address: Address },
}
