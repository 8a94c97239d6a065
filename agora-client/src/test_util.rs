use crate::{
    api::{self, Address, CommentId, PostId, Target, Vote, VoteId},
    Comment, Post,
};

macro_rules! do_tokio_test {
    ( $name:ident, $fn:expr ) => {
        #[test]
        fn $name() {
            if std::env::var("RUST_LOG").is_ok() {
                let _ = tracing_subscriber::fmt::try_init();
            }
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed initializing tokio runtime")
                .block_on($fn())
        }
    };
}
pub(crate) use do_tokio_test;

pub fn vote(id: u64, up: bool) -> Vote {
    Vote {
        id: VoteId(id),
        voter: Address(format!("0x{id:040x}")),
        target: Target::Post(PostId(0)),
        up,
        changed: false,
    }
}

pub fn comment(id: u64, votes: Vec<Vote>, comments: Vec<Comment>) -> Comment {
    Comment::assemble(
        api::Comment {
            id: CommentId(id),
            owner: Address::zero(),
            parent: Target::Post(PostId(0)),
            body: format!("comment {id}"),
        },
        votes,
        comments,
    )
}

pub fn post(id: u64, votes: Vec<Vote>, comments: Vec<Comment>) -> Post {
    Post::assemble(
        api::Post {
            id: PostId(id),
            owner: Address::zero(),
            title: format!("post {id}"),
            description: String::new(),
        },
        votes,
        comments,
    )
}
