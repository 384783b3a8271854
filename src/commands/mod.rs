pub mod leaderboard;
pub mod list;
pub mod render;
pub mod stale;
pub mod summary;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{error, info, info_span, Instrument};

use crate::config::Config;
use crate::github::{GitHubApi, GitHubError};
use crate::slack::{Message, Messenger, SlackError, SlashCommand};

pub const LOADING_TEXT: &str = ":cop: Loading your PRs :loading:";
pub const FAILURE_TEXT: &str = ":x: There was an unexpected error. :cry:";
pub const INVALID_DAYS_TEXT: &str = "Wrong format for days parameter. :cry:";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("days parameter is not a whole number: {0:?}")]
    InvalidDays(String),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Slack(#[from] SlackError),
}

impl CommandError {
    /// Text shown in the channel when a command fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::InvalidDays(_) => INVALID_DAYS_TEXT,
            CommandError::GitHub(_) | CommandError::Slack(_) => FAILURE_TEXT,
        }
    }
}

/// The chat commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Summary,
    Stale,
    Leaderboard,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::List,
        Command::Summary,
        Command::Stale,
        Command::Leaderboard,
    ];

    /// Name as registered with Slack, without the leading slash.
    pub fn name(self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Summary => "pr-summary",
            Command::Stale => "stale",
            Command::Leaderboard => "review-leaderboard",
        }
    }

    /// Accepts the name with or without the leading slash.
    pub fn parse(raw: &str) -> Option<Command> {
        let name = raw.trim().trim_start_matches('/');
        Command::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Collaborators shared by every command invocation.
#[derive(Clone)]
pub struct Context {
    pub github: Arc<dyn GitHubApi>,
    pub messenger: Arc<dyn Messenger>,
    pub config: Arc<Config>,
}

/// Handle for the protocol-level acknowledgment of a slash command.
pub struct Ack(Option<oneshot::Sender<()>>);

impl Ack {
    /// An ack paired with the receiver the transport waits on.
    pub fn channel() -> (Ack, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Ack(Some(tx)), rx)
    }

    /// For transports with nothing to acknowledge.
    pub fn none() -> Ack {
        Ack(None)
    }

    pub fn send(mut self) {
        if let Some(tx) = self.0.take() {
            // Receiver gone means the transport stopped waiting
            let _ = tx.send(());
        }
    }
}

/// Run one command invocation to completion. Acknowledges before any other
/// work, and never returns an error: failures are logged and reported in the
/// invoking channel.
pub async fn handle(ctx: &Context, command: Command, invocation: &SlashCommand, ack: Ack) {
    ack.send();

    let span = info_span!(
        "command",
        command = %command,
        channel = %invocation.channel_id,
        user = %invocation.user_id,
    );

    async {
        info!("handling command");
        let result = match command {
            Command::List => list::run(ctx, invocation).await,
            Command::Summary => summary::run(ctx, invocation).await,
            Command::Stale => stale::run(ctx, invocation).await,
            Command::Leaderboard => leaderboard::run(ctx, invocation).await,
        };

        match result {
            Ok(()) => info!("command complete"),
            Err(err) => {
                error!(error = %err, "command failed");
                let notice = Message::text(err.user_message());
                if let Err(send_err) = ctx.messenger.post(&invocation.channel_id, &notice).await {
                    error!(error = %send_err, "failed to report command failure");
                }
            }
        }
    }
    .instrument(span)
    .await
}
