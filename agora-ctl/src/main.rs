use agora_client::{
    api::{Address, CommentId, PostId},
    FetchOptions,
};
use anyhow::Context;

mod remote;
use remote::RemoteLedger;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the ledger gateway
    #[structopt(short, long, env = "AGORA_HOST", default_value = "http://localhost:8545")]
    host: String,

    /// Account to read as and to submit calls from
    #[structopt(short, long, env = "AGORA_ACCOUNT")]
    from: Option<String>,

    /// Maximum number of sibling fetches in flight
    #[structopt(long, default_value = "1")]
    concurrency: usize,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the number of posts
    CountPosts,

    /// Print a post with its whole comment tree
    GetPost { id: u64 },

    /// Print every post with its whole comment tree
    GetPosts,

    /// Print a comment with all its replies
    GetComment { id: u64 },

    AddPost { title: String, description: String },

    VotePost {
        id: u64,

        /// Vote down instead of up
        #[structopt(long)]
        down: bool,
    },

    CommentPost { id: u64, body: String },

    VoteComment {
        id: u64,

        /// Vote down instead of up
        #[structopt(long)]
        down: bool,
    },

    CommentComment { id: u64, body: String },

    /// Create and fund an account
    CreateAccount {
        /// Defaults to the AGORA_PASSWORD environment variable
        password: Option<String>,
    },

    /// Unlock the account given with --from
    UnlockAccount {
        /// Defaults to the AGORA_PASSWORD environment variable
        password: Option<String>,
    },

    /// Print the balance of an account, defaulting to the one given with --from
    Balance { address: Option<String> },
}

fn password(given: Option<String>) -> anyhow::Result<String> {
    match given {
        Some(p) => Ok(p),
        None => std::env::var("AGORA_PASSWORD")
            .context("retrieving AGORA_PASSWORD environment variable"),
    }
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(v).context("serializing result")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let from = opt.from.map(Address);
    let account = || {
        from.clone()
            .context("this command needs an account, see --from or AGORA_ACCOUNT")
    };
    let ledger = RemoteLedger::new(opt.host, from.clone());
    let options = FetchOptions::concurrent(opt.concurrency);

    match opt.cmd {
        Command::CountPosts => print_json(&agora_client::count_posts(&ledger).await?)?,
        Command::GetPost { id } => {
            let post = agora_client::build_post(&ledger, PostId(id), &options)
                .await
                .with_context(|| format!("fetching post {id}"))?;
            print_json(&post)?
        }
        Command::GetPosts => {
            let posts = agora_client::build_posts(&ledger, &options)
                .await
                .context("fetching posts")?;
            print_json(&posts)?
        }
        Command::GetComment { id } => {
            let comment = agora_client::build_comment(&ledger, CommentId(id), &options)
                .await
                .with_context(|| format!("fetching comment {id}"))?;
            print_json(&comment)?
        }
        Command::AddPost { title, description } => print_json(
            &agora_client::add_post(&ledger, title, description, &account()?).await?,
        )?,
        Command::VotePost { id, down } => print_json(
            &agora_client::vote_post(&ledger, PostId(id), !down, &account()?).await?,
        )?,
        Command::CommentPost { id, body } => print_json(
            &agora_client::comment_post(&ledger, PostId(id), body, &account()?).await?,
        )?,
        Command::VoteComment { id, down } => print_json(
            &agora_client::vote_comment(&ledger, CommentId(id), !down, &account()?).await?,
        )?,
        Command::CommentComment { id, body } => print_json(
            &agora_client::comment_comment(&ledger, CommentId(id), body, &account()?).await?,
        )?,
        Command::CreateAccount { password: pass } => {
            let address = agora_client::create_account(&ledger, &password(pass)?)
                .await
                .context("creating account")?;
            print_json(&address)?
        }
        Command::UnlockAccount { password: pass } => {
            agora_client::unlock_account(&ledger, &account()?, &password(pass)?)
                .await
                .context("unlocking account")?
        }
        Command::Balance { address } => {
            let address = match address {
                Some(a) => Address(a),
                None => account()?,
            };
            println!("{}", agora_client::balance(&ledger, &address).await?)
        }
    }

    Ok(())
}
