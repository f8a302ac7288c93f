use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use multi_assistant::display;
use multi_assistant::server;
use multi_assistant::{AssistantService, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the REPL owns stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("invalid configuration")?;
    let service = Arc::new(AssistantService::new(&config)?);

    match config.server.transport.as_str() {
        "http" => {
            let bind: SocketAddr = config
                .server
                .http_bind
                .parse()
                .with_context(|| format!("invalid http_bind '{}'", config.server.http_bind))?;
            let listener = tokio::net::TcpListener::bind(bind).await?;
            tracing::info!(%bind, "Starting HTTP chat server");
            axum::serve(listener, server::router(service)).await?;
            Ok(())
        }
        _ => run_stdio(service).await,
    }
}

enum ReplInput<'a> {
    Blank,
    Quit,
    /// The line exactly as typed
    Utterance(&'a str),
}

fn read_input(line: &str) -> ReplInput<'_> {
    match line.trim() {
        "" => ReplInput::Blank,
        "exit" | "quit" => ReplInput::Quit,
        _ => ReplInput::Utterance(line),
    }
}

async fn run_stdio(service: Arc<AssistantService>) -> Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();
    service.start_session(&session_id).await?;
    tracing::info!(session = %session_id, "Starting stdio session");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", display::WELCOME);
    loop {
        stdout.write_all(format!("{} ", ">".bold().cyan()).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let utterance = match read_input(&line) {
            ReplInput::Blank => continue,
            ReplInput::Quit => break,
            ReplInput::Utterance(utterance) => utterance,
        };

        let outcome = match service.handle_turn(&session_id, utterance).await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                continue;
            }
        };

        for notice in &outcome.notices {
            println!("{}\n", notice);
        }
        if let Some(trace) = &outcome.trace {
            println!("{}\n", trace.dimmed());
        }
        match (&outcome.reply, outcome.answer()) {
            (_, Some(answer)) => println!("{}\n", answer.green()),
            (Err(e), None) => println!("{} {}\n", "I couldn't compose an answer:".red(), e),
            (Ok(_), None) => {}
        }
    }

    tracing::info!("stdio session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_keeps_utterance_verbatim() {
        assert!(matches!(
            read_input("  weather in Tokyo? "),
            ReplInput::Utterance("  weather in Tokyo? ")
        ));
        assert!(matches!(read_input(" quit "), ReplInput::Quit));
        assert!(matches!(read_input("exit"), ReplInput::Quit));
        assert!(matches!(read_input("   "), ReplInput::Blank));
    }
}
