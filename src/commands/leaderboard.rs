use std::collections::BTreeSet;

use tracing::debug;

use super::render::done_notice;
use super::{CommandError, Context, LOADING_TEXT};
use crate::aggregate::{fetch_reviews, ReviewerTally, TOP_REVIEWERS};
use crate::github::{ListPulls, PullState, MAX_PER_PAGE};
use crate::slack::{Block, Message, SlashCommand, Text};

pub const NO_DATA_TEXT: &str = "No pull requests found, so there are no reviews to rank. :cop:";
const DONE_TEXT: &str = "Here's the info we got. :cool-squirtle:";

/// `/review-leaderboard`: who reviewed the most of the latest pull requests.
pub async fn run(ctx: &Context, invocation: &SlashCommand) -> Result<(), CommandError> {
    let channel = &invocation.channel_id;
    let loading = ctx.messenger.post(channel, &Message::text(LOADING_TEXT)).await?;

    let query = ListPulls {
        state: PullState::All,
        per_page: Some(MAX_PER_PAGE),
        sort: None,
    };
    let pulls = ctx.github.list_pull_requests(&query).await?;
    if pulls.is_empty() {
        ctx.messenger.post(channel, &Message::text(NO_DATA_TEXT)).await?;
        return Ok(());
    }

    let reviews = fetch_reviews(ctx.github.as_ref(), &pulls, ctx.config.leaderboard.concurrency).await?;
    let tally = ReviewerTally::from_reviews(&reviews);
    let reviewed: BTreeSet<u64> = reviews.iter().map(|r| r.pull_number).collect();
    debug!(
        pulls = pulls.len(),
        reviewed = reviewed.len(),
        reviews = reviews.len(),
        reviewers = tally.len(),
        "built reviewer tally"
    );

    ctx.messenger.update(&loading, &done_notice(DONE_TEXT)).await?;

    let heading = format!(
        " :cool-squirtle: :trophy:  From the last {} pull requests, the top reviewers are:",
        pulls.len()
    );
    let mut blocks = vec![Block::section(Text::plain(heading.clone())), Block::Divider];
    if tally.is_empty() {
        blocks.push(Block::context("Nobody has left a review yet."));
    }
    blocks.extend(tally.ranked(TOP_REVIEWERS).iter().map(|row| Block::section(Text::mrkdwn(row.line()))));

    ctx.messenger.post(channel, &Message::blocks(blocks).with_text(heading)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{pull_numbered, review_by};
    use crate::commands::tests::{context, invocation, upstream_failure, Sent};
    use crate::commands::{handle, Ack, Command, FAILURE_TEXT};
    use crate::github::MockGitHubApi;

    #[tokio::test]
    async fn test_empty_batch_skips_review_fetches() {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .withf(|query| query.state == PullState::All && query.per_page == Some(100))
            .times(1)
            .returning(|_| Ok(vec![]));
        github.expect_pull_reviews().times(0);

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Leaderboard, "");
        handle(&ctx, Command::Leaderboard, &cmd, Ack::none()).await;

        let posts = messenger.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1], Message::text(NO_DATA_TEXT));
    }

    #[tokio::test]
    async fn test_pulls_without_reviews_render_placeholder() {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .returning(|_| Ok(vec![pull_numbered(1), pull_numbered(2)]));
        github.expect_pull_reviews().times(2).returning(|_| Ok(vec![]));

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Leaderboard, "");
        handle(&ctx, Command::Leaderboard, &cmd, Ack::none()).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 3, "loading, update, leaderboard");
        let text = sent[2].all_text();
        assert!(text.contains("From the last 2 pull requests"));
        assert!(text.contains("Nobody has left a review yet."));
        assert!(!text.contains(":github-review:"));
    }

    #[tokio::test]
    async fn test_ranks_reviewers() {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .returning(|_| Ok(vec![pull_numbered(1), pull_numbered(2)]));
        github.expect_pull_reviews().times(2).returning(|n| {
            let logins: &[&str] = if n == 1 {
                &["A", "B", "A"]
            } else {
                &["C", "A", "B"]
            };
            Ok(logins.iter().map(|login| review_by(n, login)).collect())
        });

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Leaderboard, "");
        handle(&ctx, Command::Leaderboard, &cmd, Ack::none()).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 3, "loading, update, leaderboard");
        assert!(matches!(&sent[1], Sent::Update { ts, .. } if ts == "1"));

        let reply = sent[2].message();
        let lines: Vec<&str> = reply
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Section { text: Text::Mrkdwn { text }, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                ":github-review: *A* with 3 reviews.",
                ":github-review: *B* with 2 reviews.",
                ":github-review: *C* with 1 review.",
            ]
        );
        assert!(sent[2].all_text().contains("From the last 2 pull requests"));
    }

    #[tokio::test]
    async fn test_truncates_to_top_reviewers() {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .returning(|_| Ok((1..=12).map(pull_numbered).collect()));
        github
            .expect_pull_reviews()
            .returning(|n| Ok(vec![review_by(n, &format!("reviewer{n}"))]));

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Leaderboard, "");
        handle(&ctx, Command::Leaderboard, &cmd, Ack::none()).await;

        let posts = messenger.posts();
        let reply = posts.last().unwrap();
        let rows = reply
            .blocks
            .iter()
            .filter(|block| matches!(block, Block::Section { text: Text::Mrkdwn { .. }, .. }))
            .count();
        assert_eq!(rows, TOP_REVIEWERS);
    }

    #[tokio::test]
    async fn test_single_failed_fetch_gives_generic_failure() {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .returning(|_| Ok((1..=5).map(pull_numbered).collect()));
        github.expect_pull_reviews().returning(|n| {
            if n == 3 {
                Err(upstream_failure())
            } else {
                Ok(vec![review_by(n, "alice")])
            }
        });

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Leaderboard, "");
        handle(&ctx, Command::Leaderboard, &cmd, Ack::none()).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 2, "loading notice then failure notice");
        assert_eq!(sent[1], Sent::Post(Message::text(FAILURE_TEXT)));
        assert!(!sent.iter().any(|s| s.all_text().contains(":github-review:")));
    }
}
