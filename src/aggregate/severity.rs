/// How worrying the number of open pull requests is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Healthy,
    Decent,
    High,
    Alarming,
}

impl Severity {
    /// Slack-formatted notice shown in the PR summary.
    pub fn message(self) -> &'static str {
        match self {
            Severity::Alarming => ":alarm: :cop: There is an *alarming* amount of Pull Requests open. Please review some if you have the chance! :cop: :alarm:",
            Severity::High => ":warning: :cop: There is a *high* amount of Pull Requests open. Please review some if you have the chance! :cop: :warning:",
            Severity::Decent => ":warning: :cop: There is a *decent* amount of Pull Requests open. It's not too bad, but please review some if you have the chance! :cop: :warning:",
            Severity::Healthy => ":white_check_mark: :cop: There is a *healthy* amount of Pull Requests open. Great work, team! :cop: :white_check_mark:",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Alarming => write!(f, "alarming"),
            Severity::High => write!(f, "high"),
            Severity::Decent => write!(f, "decent"),
            Severity::Healthy => write!(f, "healthy"),
        }
    }
}

/// Classify an open pull request count. Zero open pull requests get no
/// classification at all.
pub fn severity(open_count: usize) -> Option<Severity> {
    match open_count {
        0 => None,
        n if n >= 50 => Some(Severity::Alarming),
        n if n >= 20 => Some(Severity::High),
        n if n >= 10 => Some(Severity::Decent),
        _ => Some(Severity::Healthy),
    }
}

/// Summary text for `open_count`, empty when there is nothing to say.
pub fn severity_message(open_count: usize) -> &'static str {
    severity(open_count).map(Severity::message).unwrap_or("")
}
