use crate::{
    api::{Accounts, Address, Balance, WEI_PER_UNIT},
    Error,
};

/// Amount every new account receives from the ledger's funding account
pub const FUNDING_AMOUNT: Balance = Balance(WEI_PER_UNIT);

/// Creates an account and funds it with `FUNDING_AMOUNT`
///
/// The new account is locked until `unlock_account` is called. A reverted
/// funding transfer fails with `Error::FundingFailed`.
pub async fn create_account<A: Accounts + ?Sized>(
    accounts: &A,
    password: &str,
) -> Result<Address, Error> {
    let address = accounts.create_account(password).await?;
    let receipt = accounts.fund(&address, FUNDING_AMOUNT).await?;
    if !receipt.status {
        tracing::warn!(%address, "created account, but funding it FAILED");
        return Err(Error::FundingFailed { address });
    }
    tracing::info!(%address, amount = %FUNDING_AMOUNT, "created and funded account");
    Ok(address)
}

pub async fn unlock_account<A: Accounts + ?Sized>(
    accounts: &A,
    address: &Address,
    password: &str,
) -> Result<(), Error> {
    accounts.unlock_account(address, password).await?;
    tracing::debug!(%address, "unlocked account");
    Ok(())
}

/// Balance of `address`, in display units
pub async fn balance<A: Accounts + ?Sized>(
    accounts: &A,
    address: &Address,
) -> Result<String, Error> {
    Ok(accounts.balance(address).await?.to_string())
}

#[cfg(test)]
mod tests {
    use agora_mock_server::MockServer;
    use async_trait::async_trait;

    use super::*;
    use crate::{
        api::{Error as ApiError, Gas, PostId, Receipt},
        test_util::do_tokio_test,
        vote_post,
    };

    /// Creates accounts fine, but every funding transfer reverts
    struct RevertingFunds;

    #[async_trait]
    impl Accounts for RevertingFunds {
        async fn create_account(&self, _password: &str) -> Result<Address, ApiError> {
            Ok(Address(String::from("0x0000000000000000000000000000000000000007")))
        }
        async fn unlock_account(&self, _address: &Address, _password: &str) -> Result<(), ApiError> {
            Ok(())
        }
        async fn balance(&self, _address: &Address) -> Result<Balance, ApiError> {
            Ok(Balance(0))
        }
        async fn fund(&self, _to: &Address, _amount: Balance) -> Result<Receipt, ApiError> {
            Ok(Receipt {
                status: false,
                gas_used: Gas(21_000),
            })
        }
    }

    do_tokio_test!(reverted_funding_fails_account_creation, || async {
        assert_eq!(
            create_account(&RevertingFunds, "pw").await,
            Err(Error::FundingFailed {
                address: Address(String::from("0x0000000000000000000000000000000000000007")),
            })
        );
    });

    do_tokio_test!(new_accounts_are_funded_and_locked, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        mock.test_add_post(&alice, "t", "d");

        let a = create_account(&mock, "hunter2").await.expect("creating account");
        assert_eq!(balance(&mock, &a).await, Ok(String::from("1")));
        assert!(matches!(
            vote_post(&mock, PostId(0), true, &a).await,
            Err(Error::Unestimable {
                source: ApiError::AccountLocked(_),
                ..
            })
        ));

        assert_eq!(
            unlock_account(&mock, &a, "wrong").await,
            Err(Error::Api(ApiError::PermissionDenied))
        );
        unlock_account(&mock, &a, "hunter2")
            .await
            .expect("unlocking account");
        assert_eq!(vote_post(&mock, PostId(0), true, &a).await, Ok(true));

        let left = balance(&mock, &a).await.expect("getting balance");
        assert!(left.starts_with("0.99"), "{left}");
    });

    do_tokio_test!(unknown_accounts_have_nothing, || async {
        let mock = MockServer::new();
        let nobody = Address(String::from("0x1234"));
        assert_eq!(balance(&mock, &nobody).await, Ok(String::from("0")));
        assert_eq!(
            unlock_account(&mock, &nobody, "x").await,
            Err(Error::Api(ApiError::UnknownAccount(nobody.clone())))
        );
    });
}
