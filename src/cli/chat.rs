//! Chat command - interactive question loop on stdin/stdout

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::infrastructure::agent::ReactAgent;

const BANNER: &str = r#"
==============================================================
                     Movie AI Agent
==============================================================
Ask me anything about the movies in the database.
Type 'help' for example questions, 'exit' to quit.
"#;

const HELP: &str = r#"
Example questions:
  - What are the top 5 rated movies?
  - Which movies did Christopher Nolan direct?
  - Show me Sci-Fi movies
  - What movies came out between 1990 and 2000?
  - Which movies star Leonardo DiCaprio?
  - Give me some statistics about the database

Commands:
  help             show this message
  exit, quit, q    leave the chat
"#;

const GOODBYE: &str = "Thank you for using Movie AI Agent! Goodbye!";

/// What to do with one line typed by the user
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Help,
    Exit,
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Input::Skip,
        "help" => Input::Help,
        "exit" | "quit" | "q" => Input::Exit,
        _ => Input::Question(line),
    }
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = crate::create_app_state(&config).await?;

    let Some(agent) = state.agent.clone() else {
        state.cache.close().await;
        anyhow::bail!(
            "No LLM available at {}. Make sure Ollama is running and a model is pulled.",
            config.llm.base_url
        );
    };

    println!("{}", BANNER);
    println!("Using model: {}", agent.model());

    let stdin = BufReader::new(tokio::io::stdin());
    let result = chat_loop(&agent, stdin, interrupted()).await;

    state.cache.close().await;
    println!("\n{}", GOODBYE);

    result
}

/// Resolves on the first Ctrl+C, never if the handler cannot be installed
///
/// The listener is registered on first poll and keeps every later signal, so
/// one instance has to live for the whole session.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Reads questions until exit, end of input or `interrupt` resolves
///
/// The interrupt is raced against both the prompt and a running query, so a
/// long agent run can be abandoned.
async fn chat_loop<R, I>(agent: &ReactAgent, reader: R, interrupt: I) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let mut lines = reader.lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => None,
        };

        let Some(line) = line else {
            return Ok(());
        };

        match classify(&line) {
            Input::Skip => continue,
            Input::Help => println!("{}", HELP),
            Input::Exit => return Ok(()),
            Input::Question(question) => {
                info!(question = %question, "Chat question");
                let answer = tokio::select! {
                    answer = agent.query(question) => answer,
                    _ = &mut interrupt => return Ok(()),
                };
                println!("\nAgent: {}", answer);
            }
        }
    }
}
