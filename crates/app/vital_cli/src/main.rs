// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use tokio::runtime::Runtime;
use vital_core::provider::gemini::GeminiClient;
use vital_core::{ChatRelay, ChatRequest, ChatTurn, ProviderConfig};

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Ask { message } => {
            let request = ChatRequest::new(&message.join(" "), Vec::new())?;
            let relay = build_relay()?;
            let text = runtime()?.block_on(relay.relay(&request))?;
            println!("{text}");
        }
        Commands::Chat => {
            let relay = build_relay()?;
            chat_loop(&relay, &runtime()?)?;
        }
    }

    Ok(())
}

fn build_relay() -> Result<ChatRelay> {
    let config = ProviderConfig::from_env()?;
    let client = GeminiClient::new(&config)?;
    Ok(ChatRelay::new(config, Arc::new(client)))
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Keeps history the way the web widget does: seeded with the greeting, one
/// user/assistant pair appended per successful exchange.
fn chat_loop(relay: &ChatRelay, runtime: &Runtime) -> Result<()> {
    let greeting = relay.config().greeting.clone();
    println!("{greeting}");
    let mut history = vec![ChatTurn::assistant(greeting)];

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let request = ChatRequest::new(input, history.clone())?;
        match runtime.block_on(relay.relay(&request)) {
            Ok(text) => {
                println!("{text}");
                history.push(ChatTurn::user(input));
                history.push(ChatTurn::assistant(text));
            }
            Err(e) => println!("{}", e.public_message()),
        }
    }

    Ok(())
}
