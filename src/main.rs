use anyhow::{Context, Result};
use askpanel::chat::ChatState;
use askpanel::upload::{PendingFile, UploadOutcome};
use askpanel::{Config, Widget};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Input;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Headless chat panel for a document question-answering backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// More logging (-v, -vv); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask one question and print the rendered answer
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Select files and upload the eligible ones
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the conversation history overlay
    History,
    /// Interactive chat (:voice, :history, :quit)
    Repl,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the JSON Schema of the config file
    Schema,
    /// Print the effective configuration as TOML
    Show,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }

    match cli.command {
        Command::Config { action } => {
            match action {
                ConfigAction::Schema => println!("{}", Config::json_schema()?),
                ConfigAction::Show => println!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { question } => {
            let mut widget = Widget::connect(&config).context("Failed to build HTTP client")?;
            let state = widget.chat.submit(&question.join(" ")).await.clone();
            println!("{}", widget.chat.to_html());
            Ok(exit_for_chat(&state))
        }
        Command::Upload { paths } => {
            let mut widget = Widget::connect(&config).context("Failed to build HTTP client")?;
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let file = PendingFile::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                files.push(file);
            }
            if widget.upload.add_files(files).is_err() {
                println!("{}", widget.upload.status().to_html());
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", widget.upload.list_html());
            let outcome = widget.upload.submit().await;
            println!("{}", widget.upload.to_html());
            Ok(match outcome {
                UploadOutcome::Succeeded(_) => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Command::History => {
            let mut widget = Widget::connect(&config).context("Failed to build HTTP client")?;
            widget.history.open().await;
            println!("{}", widget.history.overlay().to_html());
            Ok(ExitCode::SUCCESS)
        }
        Command::Repl => {
            let mut widget = Widget::connect(&config).context("Failed to build HTTP client")?;
            repl(&mut widget).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_for_chat(state: &ChatState) -> ExitCode {
    match state {
        ChatState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

async fn repl(widget: &mut Widget) -> Result<()> {
    let mut printed = 0;
    loop {
        let line = tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt("Tú")
                .allow_empty(true)
                .interact_text()
        })
        .await??;

        match line.trim() {
            ":quit" | ":q" => return Ok(()),
            ":history" => {
                widget.history.open().await;
                println!("{}", widget.history.overlay().html);
                widget.history.close();
                continue;
            }
            ":voice" => {
                if !widget.chat.voice().can_listen() {
                    println!("{}", style("dictado no disponible").yellow());
                    continue;
                }
                if !widget.chat.dictate().await {
                    continue;
                }
            }
            text => {
                if text.is_empty() {
                    continue;
                }
                widget.chat.submit(text).await;
            }
        }

        let messages = widget.chat.messages();
        for node in messages.nodes().iter().skip(printed) {
            if node.has_class("response-time") {
                println!("{}", style(&node.html).dim());
            } else {
                println!("{}", node.html);
            }
        }
        printed = messages.nodes().len();
        println!("{}", style(&widget.chat.badge().text).cyan());
        println!("{}", widget.chat.panel());
    }
}
