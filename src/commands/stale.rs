use chrono::Utc;
use tracing::debug;

use super::render::pull_sections;
use super::{CommandError, Context};
use crate::aggregate::stale;
use crate::github::ListPulls;
use crate::slack::{Message, SlashCommand};

/// `/stale <days>`: open pull requests created more than `days` ago.
pub async fn run(ctx: &Context, invocation: &SlashCommand) -> Result<(), CommandError> {
    let now = Utc::now();
    let cutoff = stale::parse_days(&invocation.text)
        .and_then(|days| stale::cutoff(now, days))
        .ok_or_else(|| CommandError::InvalidDays(invocation.text.clone()))?;

    let channel = &invocation.channel_id;
    let cutoff_date = cutoff.format("%m/%d/%Y").to_string();

    let loading = format!(":cop: Loading your PRs from before *{cutoff_date}* :loading:");
    ctx.messenger.post(channel, &Message::text(loading)).await?;

    let pulls = ctx.github.list_pull_requests(&ListPulls::open()).await?;
    let open = pulls.len();
    let stale_pulls = stale::older_than(pulls, cutoff);
    debug!(%cutoff, open, stale = stale_pulls.len(), "filtered stale pull requests");

    let summary = format!(
        "{} open PRs were created before {cutoff_date}.",
        stale_pulls.len()
    );
    let reply = Message::blocks(pull_sections(&stale_pulls, ":warning:", now)).with_text(summary);
    ctx.messenger.post(channel, &reply).await?;
    Ok(())
}
