mod aggregate;
mod commands;
mod config;
mod github;
mod server;
mod slack;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use commands::{Ack, Command, Context};
use github::RestClient;
use slack::terminal::TerminalMessenger;
use slack::{SlackClient, SlashCommand};

/// PR Police: Slack bot that answers chat commands with GitHub pull request
/// and review summaries for one repository.
#[derive(Parser, Debug)]
#[command(name = "pr-police", version, about)]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Serve Slack slash commands and events over HTTP
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one command against GitHub and print the replies instead of
    /// sending them to Slack (no Slack tokens needed)
    Preview {
        /// Command name: list, pr-summary, stale, review-leaderboard
        #[arg(value_parser = parse_command)]
        command: Command,

        /// Command argument, e.g. the day count for `stale`
        #[arg(default_value = "")]
        text: String,
    },
}

fn parse_command(raw: &str) -> Result<Command, String> {
    Command::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Command::ALL.iter().map(|c| c.name()).collect();
        format!("unknown command {raw:?}; expected one of {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;
    let github = Arc::new(RestClient::new(&config.github, config.github_token()?));

    match cli.action {
        Action::Serve { port } => {
            let messenger = Arc::new(SlackClient::new(&config.slack, config.slack_bot_token()?));
            let signing_secret: Arc<str> = Arc::from(config.slack_signing_secret()?);
            let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.server.port)));

            let span = info_span!("serve", owner = %config.github.owner, repo = %config.github.repo);
            let state = server::AppState {
                ctx: Context {
                    github,
                    messenger,
                    config: Arc::new(config),
                },
                signing_secret,
            };
            server::serve(state, addr).instrument(span).await?;
        }
        Action::Preview { command, text } => {
            let ctx = Context {
                github,
                messenger: Arc::new(TerminalMessenger::new()),
                config: Arc::new(config),
            };
            let invocation = SlashCommand {
                command: command.to_string(),
                text,
                user_id: "preview".to_string(),
                channel_id: "preview".to_string(),
            };
            commands::handle(&ctx, command, &invocation, Ack::none()).await;
        }
    }

    Ok(())
}
