use crate::{
    api::{Address, Call, CommentId, PostId, Transactor},
    Error,
};

/// Prices `call` for `from`, submits it with exactly that budget and waits for its receipt
///
/// Returns whether the ledger applied the call. A call the ledger refuses to
/// price is never submitted, and fails with `Error::Unestimable`.
pub async fn submit<T: Transactor + ?Sized>(
    ledger: &T,
    call: Call,
    from: &Address,
) -> Result<bool, Error> {
    let gas = match ledger.estimate(&call, from).await {
        Ok(gas) => gas,
        Err(source) => {
            tracing::warn!(%call, %from, %source, "could not estimate call cost");
            return Err(Error::Unestimable { call, source });
        }
    };
    tracing::debug!(%call, gas = gas.0, "estimated call cost");
    let receipt = ledger.submit(&call, from, gas).await?;
    match receipt.status {
        true => tracing::info!(%call, gas_used = receipt.gas_used.0, "SUCCESS: {}", done(&call)),
        false => tracing::warn!(%call, gas_used = receipt.gas_used.0, "transaction FAILED"),
    }
    Ok(receipt.status)
}

fn done(call: &Call) -> &'static str {
    match call {
        Call::AddPost { .. } => "post added",
        Call::VotePost { .. } => "vote added",
        Call::CommentPost { .. } => "comment added",
        Call::VoteComment { .. } => "voted on comment",
        Call::CommentComment { .. } => "commented on comment",
    }
}

pub async fn add_post<T: Transactor + ?Sized>(
    ledger: &T,
    title: String,
    description: String,
    from: &Address,
) -> Result<bool, Error> {
    submit(ledger, Call::AddPost { title, description }, from).await
}

pub async fn vote_post<T: Transactor + ?Sized>(
    ledger: &T,
    post: PostId,
    up: bool,
    from: &Address,
) -> Result<bool, Error> {
    submit(ledger, Call::VotePost { post, up }, from).await
}

pub async fn comment_post<T: Transactor + ?Sized>(
    ledger: &T,
    post: PostId,
    body: String,
    from: &Address,
) -> Result<bool, Error> {
    submit(ledger, Call::CommentPost { post, body }, from).await
}

pub async fn vote_comment<T: Transactor + ?Sized>(
    ledger: &T,
    comment: CommentId,
    up: bool,
    from: &Address,
) -> Result<bool, Error> {
    submit(ledger, Call::VoteComment { comment, up }, from).await
}

pub async fn comment_comment<T: Transactor + ?Sized>(
    ledger: &T,
    comment: CommentId,
    body: String,
    from: &Address,
) -> Result<bool, Error> {
    submit(ledger, Call::CommentComment { comment, body }, from).await
}

#[cfg(test)]
mod tests {
    use agora_mock_server::MockServer;

    use super::*;
    use crate::{
        api::{Accounts, DataSource, Error as ApiError, Target},
        build_post,
        test_util::do_tokio_test,
        FetchOptions,
    };

    do_tokio_test!(funded_account_can_vote, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        assert_eq!(
            add_post(&mock, String::from("t"), String::from("d"), &alice).await,
            Ok(true)
        );
        assert_eq!(vote_post(&mock, PostId(0), true, &alice).await, Ok(true));
        let votes = mock.post_votes(PostId(0)).await.expect("listing votes");
        assert_eq!(votes.len(), 1);
    });

    do_tokio_test!(unfunded_account_fails_estimation, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        add_post(&mock, String::from("t"), String::from("d"), &alice)
            .await
            .expect("adding post");
        let broke = mock
            .create_account("secret")
            .await
            .expect("creating account");
        mock.unlock_account(&broke, "secret")
            .await
            .expect("unlocking account");
        let res = vote_post(&mock, PostId(0), true, &broke).await;
        assert_eq!(
            res,
            Err(Error::Unestimable {
                call: Call::VotePost {
                    post: PostId(0),
                    up: true,
                },
                source: ApiError::InsufficientFunds(broke.clone()),
            })
        );
        assert!(mock.post_votes(PostId(0)).await.expect("listing votes").is_empty());
    });

    do_tokio_test!(locked_account_fails_estimation, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        mock.test_lock(&alice);
        let res = add_post(&mock, String::from("t"), String::from("d"), &alice).await;
        assert!(matches!(
            res,
            Err(Error::Unestimable {
                source: ApiError::AccountLocked(_),
                ..
            })
        ));
        assert_eq!(mock.post_count().await, Ok(0));
    });

    do_tokio_test!(nonexistent_target_fails_estimation, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        let res = comment_comment(&mock, CommentId(3), String::from("hey"), &alice).await;
        assert!(matches!(
            res,
            Err(Error::Unestimable {
                source: ApiError::InvalidTarget(Target::Comment(CommentId(3))),
                ..
            })
        ));
    });

    do_tokio_test!(rejected_receipt_is_false_not_an_error, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        mock.test_reject_submissions(true);
        assert_eq!(
            add_post(&mock, String::from("t"), String::from("d"), &alice).await,
            Ok(false)
        );
        assert_eq!(mock.post_count().await, Ok(0));
    });

    do_tokio_test!(unavailable_ledger_propagates, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        mock.test_set_unavailable(true);
        let res = add_post(&mock, String::from("t"), String::from("d"), &alice).await;
        assert!(matches!(
            res,
            Err(Error::Unestimable {
                source: ApiError::Unavailable(_),
                ..
            })
        ));
    });

    do_tokio_test!(every_mutation_shows_up_in_the_tree, || async {
        let mock = MockServer::new();
        let alice = mock.test_new_funded_account();
        let bob = mock.test_new_funded_account();
        assert_eq!(add_post(&mock, String::from("t"), String::from("d"), &alice).await, Ok(true));
        assert_eq!(comment_post(&mock, PostId(0), String::from("c"), &bob).await, Ok(true));
        assert_eq!(comment_comment(&mock, CommentId(0), String::from("cc"), &alice).await, Ok(true));
        assert_eq!(vote_comment(&mock, CommentId(1), false, &alice).await, Ok(true));
        assert_eq!(vote_comment(&mock, CommentId(1), false, &bob).await, Ok(true));
        assert_eq!(vote_post(&mock, PostId(0), true, &bob).await, Ok(true));
        let post = build_post(&mock, PostId(0), &FetchOptions::default())
            .await
            .expect("building post");
        assert_eq!(post.comments_count, 2);
        assert_eq!(post.votes_count, 3);
        assert!(!post.consensus);
        assert!(post.comments[0].comments[0].consensus);
        assert_eq!(post.moments.len(), 1);
        assert_eq!(post.moments[0].label, "cc");
    });
}
