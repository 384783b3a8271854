use tracing::debug;

use super::render::done_notice;
use super::{CommandError, Context, LOADING_TEXT};
use crate::aggregate::severity_message;
use crate::github::{BranchHead, ListPulls, PullSort, PullState, MAX_PER_PAGE};
use crate::slack::{Block, Message, SlashCommand, Text};

const DONE_TEXT: &str = ":white_check_mark: Here's the info we got. :cool-squirtle:";
const HEADER_TEXT: &str = ":point_down::skin-tone-3: Here's your summary from the PR Police :cop:";
const FOOTER_IMAGE: &str =
    "https://avatars.slack-edge.com/2021-10-08/2578569961110_4dae16c7d9403e184cdb_64.png";

/// `/pr-summary`: open pull request count, how worrying it is, and who
/// landed the last commit on the main branch.
pub async fn run(ctx: &Context, invocation: &SlashCommand) -> Result<(), CommandError> {
    let channel = &invocation.channel_id;
    let loading = ctx.messenger.post(channel, &Message::text(LOADING_TEXT)).await?;

    let open_query = ListPulls {
        state: PullState::Open,
        per_page: Some(MAX_PER_PAGE),
        sort: Some(PullSort::Created),
    };
    let (open, commits, head) = tokio::try_join!(
        ctx.github.list_pull_requests(&open_query),
        ctx.github.list_commits(MAX_PER_PAGE),
        ctx.github.branch_head(&ctx.config.github.main_branch),
    )?;
    let latest = commits.first();
    debug!(
        open = open.len(),
        commits = commits.len(),
        latest = latest.map(|c| c.sha.as_str()).unwrap_or("none"),
        latest_url = latest.map(|c| c.html_url.as_str()).unwrap_or("none"),
        latest_author = latest.and_then(|c| c.author.as_deref()).unwrap_or("unknown"),
        "fetched summary data"
    );

    ctx.messenger.update(&loading, &done_notice(DONE_TEXT)).await?;

    let blocks = summary_blocks(ctx, open.len(), &head);
    let reply = Message::blocks(blocks).with_text(format!("{} open PRs", open.len()));
    ctx.messenger.post(channel, &reply).await?;
    Ok(())
}

fn summary_blocks(ctx: &Context, open_count: usize, head: &BranchHead) -> Vec<Block> {
    let branch = &ctx.config.github.main_branch;
    let mut blocks = vec![
        Block::Divider,
        Block::header(HEADER_TEXT),
        Block::linked_section(
            Text::mrkdwn(format!(":1234: Number of *open PRs* is *{open_count}*.")),
            "PRs Page in GH :old-man-yells-at-github:",
            "pulls_link",
            ctx.config.pulls_page_url(),
            "button-pulls-link",
        ),
    ];

    let last_commit = format!(
        "{} was the author of the <{}|*last commit*> merged to *{branch}*.",
        head.author_login, head.commit_html_url
    );
    blocks.push(match &head.author_avatar_url {
        Some(avatar) => Block::context_with_image(avatar.clone(), "commit author", last_commit),
        None => Block::context(last_commit),
    });

    // Slack rejects empty text objects, and zero open PRs has no severity
    let severity = severity_message(open_count);
    if !severity.is_empty() {
        blocks.push(Block::context(severity));
    }

    blocks.push(Block::Divider);
    blocks.push(Block::context_with_image(
        FOOTER_IMAGE,
        "squirtle",
        "Squirtle approves this message.",
    ));
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::pull_numbered;
    use crate::commands::tests::{context, invocation, upstream_failure, Sent};
    use crate::commands::{handle, Ack, Command, FAILURE_TEXT};
    use crate::github::{Commit, MockGitHubApi};

    fn head() -> BranchHead {
        BranchHead {
            author_login: "carol".to_string(),
            author_avatar_url: Some("https://avatars.example/carol.png".to_string()),
            commit_html_url: "https://github.com/cerbyinc/platform/commit/abc".to_string(),
        }
    }

    fn github_with_open(count: u64) -> MockGitHubApi {
        let mut github = MockGitHubApi::new();
        github
            .expect_list_pull_requests()
            .withf(|query| {
                query.state == PullState::Open
                    && query.per_page == Some(100)
                    && query.sort == Some(PullSort::Created)
            })
            .times(1)
            .returning(move |_| Ok((1..=count).map(pull_numbered).collect()));
        github.expect_list_commits().times(1).returning(|_| {
            Ok(vec![Commit {
                sha: "abc".to_string(),
                html_url: "https://github.com/cerbyinc/platform/commit/abc".to_string(),
                author: Some("carol".to_string()),
            }])
        });
        github
            .expect_branch_head()
            .withf(|branch| branch == "main")
            .times(1)
            .returning(|_| Ok(head()));
        github
    }

    #[tokio::test]
    async fn test_summary_reports_count_severity_and_last_commit() {
        let (ctx, messenger) = context(github_with_open(12));
        let cmd = invocation(Command::Summary, "");
        handle(&ctx, Command::Summary, &cmd, Ack::none()).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 3, "loading, update, summary");
        assert!(matches!(&sent[1], Sent::Update { .. }));

        let text = sent[2].all_text();
        assert!(text.contains("Number of *open PRs* is *12*."));
        assert!(text.contains("*decent* amount"));
        assert!(text.contains("carol was the author of the <https://github.com/cerbyinc/platform/commit/abc|*last commit*>"));
        assert!(text.contains("https://github.com/cerbyinc/platform/pulls"));
        assert!(text.contains("https://avatars.example/carol.png"));
    }

    #[tokio::test]
    async fn test_zero_open_prs_omits_severity() {
        let (ctx, messenger) = context(github_with_open(0));
        let cmd = invocation(Command::Summary, "");
        handle(&ctx, Command::Summary, &cmd, Ack::none()).await;

        let text = messenger.sent()[2].all_text();
        assert!(text.contains("is *0*."));
        for word in ["*alarming*", "*high*", "*decent*", "*healthy*"] {
            assert!(!text.contains(word));
        }
    }

    #[tokio::test]
    async fn test_any_failed_fetch_fails_summary() {
        let mut github = MockGitHubApi::new();
        github.expect_list_pull_requests().returning(|_| Ok(vec![]));
        github.expect_list_commits().returning(|_| Ok(vec![]));
        github
            .expect_branch_head()
            .returning(|_| Err(upstream_failure()));

        let (ctx, messenger) = context(github);
        let cmd = invocation(Command::Summary, "");
        handle(&ctx, Command::Summary, &cmd, Ack::none()).await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], Sent::Post(Message::text(FAILURE_TEXT)));
    }
}
