//! Video Game Ideas console shell
//!
//! Mounts the store against the configured server and drives the list and
//! edit pages from stdin.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use video_game_ideas::views::{self, EditSession};
use video_game_ideas::{ClientConfig, HttpTransport, StoreHandle, SyncStore};

#[derive(Parser, Debug)]
#[command(name = "video-game-ideas", about = "Keep a list of video game ideas in sync")]
struct Args {
    /// Path of the client config file (JSON)
    #[arg(long, default_value = "video_game_ideas.json")]
    config: PathBuf,

    /// Directory for rolling log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

enum Command {
    List,
    Add(String),
    Edit { id: String, text: String },
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "list" | "" => Command::List,
            "add" => Command::Add(rest.to_string()),
            "edit" => match rest.split_once(' ') {
                Some((id, text)) => Command::Edit {
                    id: id.to_string(),
                    text: text.trim().to_string(),
                },
                None => Command::Unknown(line.to_string()),
            },
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

fn print_list(handle: &StoreHandle) {
    for line in views::list_lines(&handle.snapshot()) {
        println!("{}", line);
    }
}

async fn save(handle: &StoreHandle, mut session: EditSession, text: String) {
    session.set_text(text);
    // The list is shown again only once the save has settled
    if handle.save_item(session.edited_item()).await.is_err() {
        for line in EditSession::status_lines(&handle.snapshot()) {
            println!("{}", line);
        }
    }
    print_list(handle);
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = rolling_logger::init_logger(&args.log_dir, "VideoGameIdeas") {
        eprintln!("Logging disabled: {}", e);
    }

    let config = match ClientConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };
    let transport = HttpTransport::new(config);
    let _ = rolling_logger::info(&format!("Connecting to {}", transport.config().base_url));

    let store = SyncStore::mount(Arc::new(transport));
    let handle = store.handle();

    let mut state = handle.subscribe();
    if state.wait_for(|s| !s.fetching).await.is_err() {
        let _ = rolling_logger::error("Store closed before the initial fetch settled");
    }
    print_list(&handle);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                let _ = rolling_logger::error(&format!("stdin read failed: {}", e));
                break;
            }
        };

        let items = handle.snapshot().items;
        match Command::parse(&line) {
            Command::List => print_list(&handle),
            Command::Add(text) => {
                let session = EditSession::open(None, items.as_deref());
                save(&handle, session, text).await;
            }
            Command::Edit { id, text } => {
                let session = EditSession::open(Some(&id), items.as_deref());
                if session.is_new() {
                    println!("No idea with id {}", id);
                    continue;
                }
                save(&handle, session, text).await;
            }
            Command::Quit => break,
            Command::Unknown(input) => {
                println!("Unknown command: {}", input);
                println!("Commands: list | add <text> | edit <id> <text> | quit");
            }
        }
    }

    store.unmount();
    let _ = rolling_logger::info("Shell closed");
}
