use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{
    api::{self, Address, CommentId, PostId, Target, Vote},
    collect, comments_count, consensus, votes_count,
};

/// A node of a discussion tree
pub trait Node {
    /// Live votes, in insertion order
    fn votes(&self) -> &[Vote];

    /// Direct replies, in creation order
    fn comments(&self) -> &[Comment];

    /// The record this node contributes when it reached consensus
    fn moment(&self) -> Moment;
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentKind {
    Post,
    Comment,
}

/// A node whose votes reached consensus
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Moment {
    pub id: u64,

    /// Title for posts, body for comments
    pub label: String,

    pub kind: MomentKind,
}

/// A post with its whole comment tree, as it was when fetched
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub owner: Address,
    pub title: String,
    pub description: String,

    pub votes: Vec<Vote>,
    pub comments: Vec<Comment>,

    pub consensus: bool,

    /// Number of comments at any depth below this post
    pub comments_count: u64,

    /// Number of live votes on this post and every comment below it
    pub votes_count: u64,

    /// Nodes of this tree that reached consensus, in pre-order
    pub moments: Vec<Moment>,
}

impl Post {
    pub(crate) fn assemble(record: api::Post, votes: Vec<Vote>, comments: Vec<Comment>) -> Post {
        let mut post = Post {
            id: record.id,
            owner: record.owner,
            title: record.title,
            description: record.description,
            consensus: consensus::evaluate(&votes),
            votes,
            comments,
            comments_count: 0,
            votes_count: 0,
            moments: Vec::new(),
        };
        post.comments_count = comments_count(&post);
        post.votes_count = votes_count(&post);
        post.moments = collect(&post);
        post
    }
}

impl Node for Post {
    fn votes(&self) -> &[Vote] {
        &self.votes
    }

    fn comments(&self) -> &[Comment] {
        &self.comments
    }

    fn moment(&self) -> Moment {
        Moment {
            id: self.id.0,
            label: self.title.clone(),
            kind: MomentKind::Post,
        }
    }
}

/// A comment with every reply below it
///
/// `Clone`, `PartialEq`, `Debug` and `Serialize` walk the replies with an
/// explicit stack, so arbitrarily deep threads are fine. `Debug` and
/// `Serialize` flatten the replies into a single pre-order `replies` list,
/// each entry keeping its `parent` so the nesting can be rebuilt.
pub struct Comment {
    pub id: CommentId,
    pub owner: Address,
    pub parent: Target,
    pub body: String,

    pub votes: Vec<Vote>,
    pub comments: Vec<Comment>,

    pub consensus: bool,
}

impl Comment {
    pub(crate) fn assemble(
        record: api::Comment,
        votes: Vec<Vote>,
        comments: Vec<Comment>,
    ) -> Comment {
        Comment {
            id: record.id,
            owner: record.owner,
            parent: record.parent,
            body: record.body,
            consensus: consensus::evaluate(&votes),
            votes,
            comments,
        }
    }

    fn head(&self) -> Head<'_> {
        Head {
            id: self.id,
            owner: &self.owner,
            parent: &self.parent,
            body: &self.body,
            votes: &self.votes,
            consensus: self.consensus,
        }
    }

    fn with_replies(&self, comments: Vec<Comment>) -> Comment {
        Comment {
            id: self.id,
            owner: self.owner.clone(),
            parent: self.parent.clone(),
            body: self.body.clone(),
            votes: self.votes.clone(),
            comments,
            consensus: self.consensus,
        }
    }
}

/// Every comment of the forest rooted at `roots`, in pre-order
pub(crate) fn preorder(roots: &[Comment]) -> impl Iterator<Item = &Comment> {
    let mut stack = roots.iter().rev().collect::<Vec<&Comment>>();
    std::iter::from_fn(move || {
        let c = stack.pop()?;
        stack.extend(c.comments.iter().rev());
        Some(c)
    })
}

/// A comment without its replies
#[derive(Debug, PartialEq, serde::Serialize)]
struct Head<'a> {
    id: CommentId,
    owner: &'a Address,
    parent: &'a Target,
    body: &'a str,
    votes: &'a [Vote],
    consensus: bool,
}

struct Replies<'a>(&'a [Comment]);

impl fmt::Debug for Replies<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(preorder(self.0).map(Comment::head)).finish()
    }
}

impl Serialize for Replies<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(preorder(self.0).map(Comment::head))
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comment")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("parent", &self.parent)
            .field("body", &self.body)
            .field("votes", &self.votes)
            .field("consensus", &self.consensus)
            .field("replies", &Replies(&self.comments))
            .finish()
    }
}

impl Serialize for Comment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Comment", 7)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("owner", &self.owner)?;
        s.serialize_field("parent", &self.parent)?;
        s.serialize_field("body", &self.body)?;
        s.serialize_field("votes", &self.votes)?;
        s.serialize_field("consensus", &self.consensus)?;
        s.serialize_field("replies", &Replies(&self.comments))?;
        s.end()
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Comment) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.head() != b.head() || a.comments.len() != b.comments.len() {
                return false;
            }
            pending.extend(a.comments.iter().zip(&b.comments));
        }
        true
    }
}

impl Eq for Comment {}

impl Clone for Comment {
    fn clone(&self) -> Comment {
        // Every level below `self`, top-down, each in left-to-right order
        let mut levels = vec![self.comments.iter().collect::<Vec<&Comment>>()];
        loop {
            let next = levels[levels.len() - 1]
                .iter()
                .flat_map(|&c| c.comments.iter())
                .collect::<Vec<&Comment>>();
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }

        // Rebuild bottom-up: each level's clones own the next level's, in order
        let mut below = Vec::<Comment>::new();
        for level in levels.iter().rev() {
            let mut replies = below.into_iter();
            below = level
                .iter()
                .map(|c| c.with_replies(replies.by_ref().take(c.comments.len()).collect()))
                .collect();
        }
        self.with_replies(below)
    }
}

impl Node for Comment {
    fn votes(&self) -> &[Vote] {
        &self.votes
    }

    fn comments(&self) -> &[Comment] {
        &self.comments
    }

    fn moment(&self) -> Moment {
        Moment {
            id: self.id.0,
            label: self.body.clone(),
            kind: MomentKind::Comment,
        }
    }
}

// Replies can nest arbitrarily deep, so unlink them iteratively instead of
// letting the default drop glue recurse once per level.
impl Drop for Comment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.comments);
        while let Some(mut c) = pending.pop() {
            pending.append(&mut c.comments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{comment, post, vote};

    #[test]
    fn assembling_a_post_fills_derived_fields() {
        let p = post(
            0,
            vec![vote(0, true), vote(1, true), vote(2, true)],
            vec![comment(0, vec![vote(3, false)], vec![])],
        );
        assert!(p.consensus);
        assert_eq!(p.comments_count, 1);
        assert_eq!(p.votes_count, 4);
        assert_eq!(
            p.moments,
            vec![Moment {
                id: 0,
                label: String::from("post 0"),
                kind: MomentKind::Post,
            }]
        );
    }

    #[test]
    fn dropping_a_very_deep_thread_does_not_overflow() {
        let mut c = comment(0, vec![], vec![]);
        for i in 1..200_000 {
            c = comment(i, vec![], vec![c]);
        }
        drop(c);
    }

    fn deep_chain(depth: u64) -> Comment {
        let mut c = comment(0, vec![], vec![]);
        for i in 1..depth {
            c = comment(i, vec![], vec![c]);
        }
        c
    }

    #[test]
    fn cloning_and_comparing_a_very_deep_thread_does_not_overflow() {
        let c = deep_chain(200_000);
        let copy = c.clone();
        assert_eq!(comments_count(&copy), 199_999);
        assert!(copy == c);

        let mut other = deep_chain(200_000);
        let mut leaf = &mut other;
        while !leaf.comments.is_empty() {
            leaf = &mut leaf.comments[0];
        }
        leaf.body = String::from("edited");
        assert!(other != c);
    }

    #[test]
    fn formatting_a_very_deep_thread_does_not_overflow() {
        let c = deep_chain(200_000);
        let debug = format!("{:?}", c);
        assert!(debug.starts_with("Comment { id: CommentId(199999)"));
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains(r#""body":"comment 0""#));
    }

    #[test]
    fn clone_keeps_reply_order() {
        let c = comment(
            0,
            vec![vote(0, true)],
            vec![
                comment(1, vec![], vec![comment(3, vec![], vec![]), comment(4, vec![], vec![])]),
                comment(2, vec![vote(1, false)], vec![comment(5, vec![], vec![])]),
            ],
        );
        let copy = c.clone();
        assert_eq!(copy, c);
        assert_eq!(
            preorder(&copy.comments).map(|c| c.id.0).collect::<Vec<_>>(),
            vec![1, 3, 4, 2, 5]
        );
        assert_eq!(copy.comments[1].votes, vec![vote(1, false)]);
    }

    #[test]
    fn serialized_replies_are_flat_and_in_pre_order() {
        let mut c = comment(
            0,
            vec![],
            vec![
                comment(1, vec![], vec![comment(3, vec![], vec![])]),
                comment(2, vec![], vec![]),
            ],
        );
        c.comments[0].comments[0].parent = Target::Comment(CommentId(1));
        let json = serde_json::to_value(&c).unwrap();
        let replies = json["replies"].as_array().unwrap();
        assert_eq!(
            replies.iter().map(|r| r["id"].as_u64().unwrap()).collect::<Vec<_>>(),
            vec![1, 3, 2]
        );
        assert!(replies.iter().all(|r| r.get("replies").is_none()));
        assert_eq!(replies[1]["parent"], serde_json::json!({"kind": "comment", "id": 1}));
    }
}
