use chrono::Utc;
use tracing::{debug, trace};

use super::render::pull_sections;
use super::{CommandError, Context, LOADING_TEXT};
use crate::github::ListPulls;
use crate::slack::{Message, SlashCommand};

pub const NO_OPEN_PRS_TEXT: &str = "No open PRs! Nice! :cop:";

/// `/list`: every open pull request with its age.
pub async fn run(ctx: &Context, invocation: &SlashCommand) -> Result<(), CommandError> {
    let channel = &invocation.channel_id;
    ctx.messenger.post(channel, &Message::text(LOADING_TEXT)).await?;

    let pulls = ctx.github.list_pull_requests(&ListPulls::open()).await?;
    debug!(open = pulls.len(), "fetched open pull requests");
    for pr in &pulls {
        trace!(
            number = pr.number,
            state = pr.state.as_str(),
            author = pr.author.as_deref().unwrap_or("ghost"),
            "open pull request"
        );
    }

    if pulls.is_empty() {
        ctx.messenger.post(channel, &Message::text(NO_OPEN_PRS_TEXT)).await?;
        return Ok(());
    }

    let blocks = pull_sections(&pulls, " •", Utc::now());
    let reply = Message::blocks(blocks).with_text(format!("{} open PRs", pulls.len()));
    ctx.messenger.post(channel, &reply).await?;
    Ok(())
}
