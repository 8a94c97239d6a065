use std::cmp;

use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    api::{self, CommentId, DataSource, PostId, Vote},
    resolve_votes, Comment, Error, Post,
};

/// How to schedule round trips to the data source while building trees
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchOptions {
    /// Maximum number of sibling fetches in flight at once, 0 meaning 1
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> FetchOptions {
        FetchOptions::sequential()
    }
}

impl FetchOptions {
    pub fn sequential() -> FetchOptions {
        FetchOptions { concurrency: 1 }
    }

    pub fn concurrent(concurrency: usize) -> FetchOptions {
        FetchOptions { concurrency }
    }

    pub(crate) fn width(&self) -> usize {
        cmp::max(1, self.concurrency)
    }
}

pub async fn count_posts<D: DataSource + ?Sized>(source: &D) -> Result<u64, Error> {
    let count = source.post_count().await?;
    tracing::info!("# posts: {count}");
    Ok(count)
}

/// Builds every post of the ledger, in id order
pub async fn build_posts<D: DataSource + ?Sized>(
    source: &D,
    options: &FetchOptions,
) -> Result<Vec<Post>, Error> {
    let count = count_posts(source).await?;
    stream::iter((0..count).map(|id| build_post(source, PostId(id), options)))
        .buffered(options.width())
        .try_collect()
        .await
}

pub async fn build_post<D: DataSource + ?Sized>(
    source: &D,
    id: PostId,
    options: &FetchOptions,
) -> Result<Post, Error> {
    let record = source.post(id).await?;
    if record == api::Post::empty(id) {
        tracing::warn!(%id, "got a default record, this post may not exist");
    }
    let votes = resolve_votes(source, &source.post_votes(id).await?, options).await?;
    let replies = source.post_comments(id).await?;
    let comments = build_replies(source, replies, options).await?;
    let post = Post::assemble(record, votes, comments);
    tracing::debug!(
        %id,
        consensus = post.consensus,
        comments = post.comments_count,
        votes = post.votes_count,
        moments = post.moments.len(),
        "built post"
    );
    Ok(post)
}

pub async fn build_comment<D: DataSource + ?Sized>(
    source: &D,
    id: CommentId,
    options: &FetchOptions,
) -> Result<Comment, Error> {
    let (node, replies) = fetch_comment(source, id, options).await?;
    let comments = build_replies(source, replies, options).await?;
    Ok(Comment::assemble(node.record, node.votes, comments))
}

/// A comment whose replies are not attached yet
struct Fetched {
    record: api::Comment,
    votes: Vec<Vote>,
    replies: usize,
}

async fn fetch_comment<D: DataSource + ?Sized>(
    source: &D,
    id: CommentId,
    options: &FetchOptions,
) -> Result<(Fetched, Vec<CommentId>), Error> {
    let record = source.comment(id).await?;
    if record == api::Comment::empty(id) {
        tracing::warn!(%id, "got a default record, this comment may not exist");
    }
    let votes = resolve_votes(source, &source.comment_votes(id).await?, options).await?;
    let replies = source.comment_comments(id).await?;
    tracing::debug!(
        %id,
        votes = votes.len(),
        replies = replies.len(),
        "fetched comment"
    );
    let node = Fetched {
        record,
        votes,
        replies: replies.len(),
    };
    Ok((node, replies))
}

/// Builds the comment trees rooted at `roots`, preserving their order
///
/// Works one depth level at a time, so that the nesting depth only costs heap.
/// Within a level the replies of a node are contiguous and follow the order of
/// their parents, which is what lets assembly hand them back out in order.
async fn build_replies<D: DataSource + ?Sized>(
    source: &D,
    roots: Vec<CommentId>,
    options: &FetchOptions,
) -> Result<Vec<Comment>, Error> {
    let mut levels: Vec<Vec<Fetched>> = Vec::new();
    let mut level = roots;
    while !level.is_empty() {
        let fetched = stream::iter(level.iter().map(|id| fetch_comment(source, *id, options)))
            .buffered(options.width())
            .try_collect::<Vec<_>>()
            .await?;
        let mut nodes = Vec::with_capacity(fetched.len());
        let mut next = Vec::new();
        for (node, replies) in fetched {
            nodes.push(node);
            next.extend(replies);
        }
        levels.push(nodes);
        level = next;
    }

    let mut below: Vec<Comment> = Vec::new();
    while let Some(nodes) = levels.pop() {
        let mut replies = below.into_iter();
        below = nodes
            .into_iter()
            .map(|n| {
                let comments = replies.by_ref().take(n.replies).collect();
                Comment::assemble(n.record, n.votes, comments)
            })
            .collect();
    }
    Ok(below)
}
