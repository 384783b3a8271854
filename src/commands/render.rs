use chrono::{DateTime, Utc};

use crate::aggregate::age;
use crate::github::PullRequest;
use crate::slack::{Block, Message, Text};

/// Slack rejects messages with more blocks than this.
pub const MAX_BLOCKS: usize = 50;

/// Replacement for the loading notice once data has arrived.
pub fn done_notice(text: &str) -> Message {
    Message::blocks(vec![Block::context(text)]).with_text(text)
}

/// One pull request with its age and a link button.
pub fn pull_section(pr: &PullRequest, bullet: &str, now: DateTime<Utc>) -> Block {
    let text = format!(
        "{bullet} {} - *Created {} ago.*",
        pr.title,
        age::distance(pr.created_at, now)
    );
    Block::linked_section(
        Text::mrkdwn(text),
        "Link",
        pr.id.to_string(),
        pr.html_url.clone(),
        format!("button-{}", pr.id),
    )
}

/// Sections for each pull request, capped so the message stays within
/// Slack's block limit. Overflow is summarised in a trailing context line.
pub fn pull_sections(pulls: &[PullRequest], bullet: &str, now: DateTime<Utc>) -> Vec<Block> {
    if pulls.len() <= MAX_BLOCKS {
        return pulls.iter().map(|pr| pull_section(pr, bullet, now)).collect();
    }

    let shown = MAX_BLOCKS - 1;
    let mut blocks: Vec<Block> = pulls[..shown]
        .iter()
        .map(|pr| pull_section(pr, bullet, now))
        .collect();
    blocks.push(Block::context(format!(
        "…and {} more.",
        pulls.len() - shown
    )));
    blocks
}
