use crate::{Comment, Node};

/// Number of comments at any depth below `node`, not counting `node` itself
pub fn comments_count<N: Node + ?Sized>(node: &N) -> u64 {
    let mut count = 0;
    let mut stack = node.comments().iter().collect::<Vec<&Comment>>();
    while let Some(c) = stack.pop() {
        count += 1;
        stack.extend(c.comments.iter());
    }
    count
}

/// Number of live votes on `node` and on every comment below it
pub fn votes_count<N: Node + ?Sized>(node: &N) -> u64 {
    let mut count = node.votes().len() as u64;
    let mut stack = node.comments().iter().collect::<Vec<&Comment>>();
    while let Some(c) = stack.pop() {
        count += c.votes.len() as u64;
        stack.extend(c.comments.iter());
    }
    count
}
