use futures::{future, stream, StreamExt, TryStreamExt};

use crate::{
    api::{DataSource, Vote, VoteId},
    Error, FetchOptions,
};

/// Fetches the votes at `ids` and keeps the live ones, in the order of `ids`
pub async fn resolve_votes<D: DataSource + ?Sized>(
    source: &D,
    ids: &[VoteId],
    options: &FetchOptions,
) -> Result<Vec<Vote>, Error> {
    let votes = stream::iter(ids.iter().map(|id| source.vote(*id)))
        .buffered(options.width())
        .try_filter(|v| future::ready(v.is_live()))
        .try_collect::<Vec<Vote>>()
        .await?;
    if votes.len() != ids.len() {
        tracing::trace!(
            fetched = ids.len(),
            live = votes.len(),
            "dropped superseded votes"
        );
    }
    Ok(votes)
}
