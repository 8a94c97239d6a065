#![cfg(test)]

use std::{cmp, collections::BTreeMap, ops::RangeTo, panic::AssertUnwindSafe};

use agora_mock_server::MockServer;

use crate::{
    api::{Address, Call, CommentId, DataSource, PostId, Target, Vote},
    build_post, build_posts, consensus, submit, Comment, FetchOptions, Moment, MomentKind, Node,
};

const NUM_ACCOUNTS: usize = 4;

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    AddPost {
        author: usize,
    },
    CommentPost {
        post: usize,
        author: usize,
    },
    CommentComment {
        comment: usize,
        author: usize,
    },
    VotePost {
        post: usize,
        voter: usize,
        up: bool,
    },
    VoteComment {
        comment: usize,
        voter: usize,
        up: bool,
    },
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

struct Fuzzer {
    mock: MockServer,
    accounts: Vec<Address>,
    num_posts: usize,
}

impl Fuzzer {
    fn new() -> Fuzzer {
        let mock = MockServer::new();
        let accounts = (0..NUM_ACCOUNTS)
            .map(|_| mock.test_new_funded_account())
            .collect();
        Fuzzer {
            mock,
            accounts,
            num_posts: 0,
        }
    }

    fn account(&self, fuzz_id: usize) -> &Address {
        &self.accounts[fuzz_id % NUM_ACCOUNTS]
    }

    fn post(&self, fuzz_id: usize) -> Option<PostId> {
        resize_int(fuzz_id, ..self.num_posts).map(|p| PostId(p as u64))
    }

    fn comment(&self, fuzz_id: usize) -> Option<CommentId> {
        resize_int(fuzz_id, ..self.mock.test_num_comments()).map(|c| CommentId(c as u64))
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        let (call, from) = match op {
            FuzzOp::AddPost { author } => (
                Call::AddPost {
                    title: format!("post {}", self.num_posts),
                    description: String::new(),
                },
                author,
            ),
            FuzzOp::CommentPost { post, author } => match self.post(post) {
                Some(post) => (
                    Call::CommentPost {
                        post,
                        body: format!("on {post}"),
                    },
                    author,
                ),
                None => return,
            },
            FuzzOp::CommentComment { comment, author } => match self.comment(comment) {
                Some(comment) => (
                    Call::CommentComment {
                        comment,
                        body: format!("on {comment}"),
                    },
                    author,
                ),
                None => return,
            },
            FuzzOp::VotePost { post, voter, up } => match self.post(post) {
                Some(post) => (Call::VotePost { post, up }, voter),
                None => return,
            },
            FuzzOp::VoteComment { comment, voter, up } => match self.comment(comment) {
                Some(comment) => (Call::VoteComment { comment, up }, voter),
                None => return,
            },
        };
        let is_post = matches!(call, Call::AddPost { .. });
        let from = self.account(from).clone();
        assert_eq!(
            submit(&self.mock, call.clone(), &from).await,
            Ok(true),
            "submitting {call}"
        );
        if is_post {
            self.num_posts += 1;
        }
    }
}

/// What a tree built straight from the ledger contents must look like
struct Reference {
    live_votes: BTreeMap<Target, Vec<Vote>>,
    root_of_comment: Vec<PostId>,
}

impl Reference {
    async fn new(mock: &MockServer) -> Reference {
        let mut live_votes = BTreeMap::<Target, Vec<Vote>>::new();
        for v in mock.test_all_votes().into_iter().filter(|v| !v.changed) {
            live_votes.entry(v.target).or_default().push(v);
        }
        let mut root_of_comment = Vec::new();
        for c in 0..mock.test_num_comments() {
            let c = mock
                .comment(CommentId(c as u64))
                .await
                .expect("fetching comment");
            let root = match c.parent {
                Target::Post(p) => p,
                Target::Comment(parent) => root_of_comment[parent.0 as usize],
            };
            root_of_comment.push(root);
        }
        Reference {
            live_votes,
            root_of_comment,
        }
    }

    fn votes_of(&self, t: Target) -> &[Vote] {
        self.live_votes.get(&t).map(|v| &v[..]).unwrap_or(&[])
    }

    fn root_of(&self, t: Target) -> PostId {
        match t {
            Target::Post(p) => p,
            Target::Comment(c) => self.root_of_comment[c.0 as usize],
        }
    }

    fn check_node<N: Node>(&self, n: &N, t: Target, consensus: bool) {
        assert_eq!(n.votes(), self.votes_of(t), "votes of {t}");
        let up = n.votes().iter().filter(|v| v.up).count();
        let down = n.votes().len() - up;
        assert_eq!(
            consensus,
            (up > 1 && down == 0) || (down > 1 && up == 0),
            "consensus of {t}"
        );
        for c in n.comments() {
            assert_eq!(c.parent, t, "parent of {}", c.id);
            self.check_node(c, Target::Comment(c.id), c.consensus);
        }
    }

    fn collect_recursively(n: &Comment, moments: &mut Vec<Moment>) {
        if consensus::evaluate(&n.votes) {
            moments.push(Moment {
                id: n.id.0,
                label: n.body.clone(),
                kind: MomentKind::Comment,
            });
        }
        for c in &n.comments {
            Reference::collect_recursively(c, moments);
        }
    }

    fn check_post(&self, p: &crate::Post) {
        self.check_node(p, Target::Post(p.id), p.consensus);
        assert_eq!(
            p.comments_count as usize,
            self.root_of_comment.iter().filter(|r| **r == p.id).count(),
            "comments count of {}",
            p.id
        );
        assert_eq!(
            p.votes_count as usize,
            self.live_votes
                .iter()
                .filter(|(t, _)| self.root_of(**t) == p.id)
                .map(|(_, v)| v.len())
                .sum::<usize>(),
            "votes count of {}",
            p.id
        );
        let mut moments = Vec::new();
        if consensus::evaluate(&p.votes) {
            moments.push(p.moment());
        }
        for c in &p.comments {
            Reference::collect_recursively(c, &mut moments);
        }
        assert_eq!(p.moments, moments, "moments of {}", p.id);
    }
}

#[test]
fn built_trees_match_ledger_contents() {
    let runtime = AssertUnwindSafe(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed initializing tokio runtime"),
    );
    bolero::check!()
        .with_generator(bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..100usize))
        .cloned()
        .for_each(move |ops| {
            runtime.block_on(async move {
                let mut fuzzer = Fuzzer::new();
                for op in ops {
                    fuzzer.execute_fuzz_op(op).await;
                }
                let reference = Reference::new(&fuzzer.mock).await;
                let posts = build_posts(&fuzzer.mock, &FetchOptions::default())
                    .await
                    .expect("building posts");
                assert_eq!(posts.len(), fuzzer.num_posts);
                for p in &posts {
                    reference.check_post(p);
                    let again = build_post(&fuzzer.mock, p.id, &FetchOptions::concurrent(4))
                        .await
                        .expect("building post again");
                    assert_eq!(*p, again, "rebuilding {}", p.id);
                }
            })
        })
}
