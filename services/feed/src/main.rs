use anyhow::{Context, Result};
use auth::api::http_client;
use auth::{SessionManager, SessionStatus, TokenApi};
use clap::{Parser, Subcommand, ValueEnum};
use common::{ClientConfig, KeyValueStore, MemoryStore};
use feed::{FactBoard, FactCard, FactId, FeedApi, FeedKind, NewFact, Outcome, Vote};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Browse, vote on and bookmark facts
#[derive(Parser)]
#[command(name = "feed", version)]
struct Cli {
    /// Keep the session in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in (password from FACTS_PASSWORD or prompted)
    Login { username: String },
    /// Sign out and forget the stored session
    Logout,
    /// Show the session status
    Whoami,
    /// List facts
    List {
        #[arg(value_enum, default_value_t = FeedArg::Latest)]
        feed: FeedArg,
    },
    /// Vote on a fact from the latest feed
    Vote {
        id: FactId,
        #[arg(value_enum)]
        direction: VoteArg,
    },
    /// Toggle the bookmark on a fact from the latest feed
    Bookmark { id: FactId },
    /// Post a new fact
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedArg {
    Latest,
    Popular,
    Bookmarks,
}

impl From<FeedArg> for FeedKind {
    fn from(arg: FeedArg) -> Self {
        match arg {
            FeedArg::Latest => FeedKind::Latest,
            FeedArg::Popular => FeedKind::Popular,
            FeedArg::Bookmarks => FeedKind::Bookmarks,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum VoteArg {
    Up,
    Down,
}

impl From<VoteArg> for Vote {
    fn from(arg: VoteArg) -> Self {
        match arg {
            VoteArg::Up => Vote::Up,
            VoteArg::Down => Vote::Down,
        }
    }
}

fn print_card(card: &FactCard) {
    let votes = card.vote.value();
    let marker = match votes.user_vote {
        Some(Vote::Up) => "▲",
        Some(Vote::Down) => "▼",
        None => " ",
    };
    let bookmark = if card.bookmark.value() { "★" } else { " " };
    let category = card
        .fact
        .category
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("General");
    println!(
        "[{:>5}] {} {:>4} {} {} ({})",
        card.fact.id, marker, votes.score, bookmark, card.fact.title, category
    );
}

async fn load_card(board: &mut FactBoard, id: FactId) -> Result<FactCard> {
    board.load(FeedKind::Latest).await?;
    board
        .card(id)
        .cloned()
        .with_context(|| format!("Fact {} is not in the latest feed", id))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.max_log_level()?)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("Starting feed client against {}", config.api_base_url());

    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        config.open_store()?
    };

    let client = http_client(config.request_timeout())?;
    let tokens = TokenApi::new(client.clone(), config.api_base_url());
    let session = SessionManager::new(store, Arc::new(tokens.clone()));
    let mut board = FactBoard::new(FeedApi::new(client, config.api_base_url()), session.clone());

    session.restore().await;

    match cli.command {
        Command::Login { username } => {
            let password = match std::env::var("FACTS_PASSWORD") {
                Ok(password) => password,
                Err(_) => rpassword::prompt_password("Password: ")?,
            };
            let pair = tokens.obtain(&username, &password).await?;
            session.login(username.as_str(), pair.access, pair.refresh).await;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            session.logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            let snapshot = session.snapshot();
            match snapshot.username() {
                Some(username) => println!("{} ({:?})", username, snapshot.status()),
                None => println!("Not logged in ({:?})", snapshot.status()),
            }
        }
        Command::List { feed } => {
            session.revalidate().await;
            let cards = board.load(feed.into()).await?;
            if cards.is_empty() {
                println!("No facts found.");
            }
            cards.iter().for_each(print_card);
        }
        Command::Vote { id, direction } => {
            if session.revalidate().await != SessionStatus::Authenticated {
                println!("Please log in to vote!");
                return Ok(());
            }
            let card = load_card(&mut board, id).await?;
            match card.vote.vote(direction.into()).await? {
                Outcome::NoChange(_) => println!("Already voted {}", Vote::from(direction)),
                Outcome::Busy => println!("A vote is already in progress"),
                Outcome::Confirmed(_) => {}
            }
            print_card(&card);
        }
        Command::Bookmark { id } => {
            if session.revalidate().await != SessionStatus::Authenticated {
                println!("Please log in to bookmark!");
                return Ok(());
            }
            let card = load_card(&mut board, id).await?;
            card.bookmark.toggle().await?;
            print_card(&card);
        }
        Command::Post {
            title,
            content,
            category,
        } => {
            session.revalidate().await;
            let fact = board
                .post(&NewFact {
                    title,
                    content,
                    category_id: category,
                })
                .await?;
            println!("Posted fact {}: {}", fact.id, fact.title);
        }
    }

    Ok(())
}
