mod circleci;
mod github;
mod gitlab;
mod jenkins;
mod travis;

pub use circleci::CircleCiParser;
pub use github::GitHubActionsParser;
pub use gitlab::GitLabCiParser;
pub use jenkins::JenkinsParser;
pub use travis::TravisCiParser;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::patterns::TestFramework;

/// A supported CI platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GithubActions,
    GitlabCi,
    Circleci,
    TravisCi,
    Jenkins,
}

impl Platform {
    /// Fixed enumeration order: detection, scoring comparison and
    /// tie-breaking all iterate platforms in this order.
    pub const ALL: [Platform; 5] = [
        Platform::GithubActions,
        Platform::GitlabCi,
        Platform::Circleci,
        Platform::TravisCi,
        Platform::Jenkins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GithubActions => "github_actions",
            Self::GitlabCi => "gitlab_ci",
            Self::Circleci => "circleci",
            Self::TravisCi => "travis_ci",
            Self::Jenkins => "jenkins",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test-related step detected in a CI configuration file.
///
/// Built by a platform parser while scanning a single file and consumed
/// immediately by the analyzer; never mutated after creation.
#[derive(Debug, Clone)]
pub struct TestStepInfo {
    /// Name of the CI job or stage the step came from
    pub job_name: String,
    /// Full command text as written in the configuration
    pub command: String,
    /// Test framework implied by the command, if any
    pub framework: Option<TestFramework>,
    /// Whether the command itself carries a coverage flag (e.g. `--cov`)
    pub has_coverage_flag: bool,
}

impl TestStepInfo {
    pub fn new(job_name: impl Into<String>, command: impl Into<String>) -> Self {
        let command = command.into();
        let framework = crate::patterns::detect_framework(&command);
        let has_coverage_flag = crate::patterns::has_coverage_flag(&command);

        Self {
            job_name: job_name.into(),
            command,
            framework,
            has_coverage_flag,
        }
    }
}

/// Outcome of parsing one configuration file that exists on disk.
///
/// A file that parses but contains no test-related steps yields
/// `Steps(vec![])`; structurally malformed content yields `Malformed` with
/// a human-readable reason. A missing or unreadable file is an `Err` from
/// [`ConfigParser::parse`] instead — detection guarantees the file exists,
/// so hitting that path is an integration bug, not a parse failure.
#[derive(Debug)]
pub enum ParseOutcome {
    Steps(Vec<TestStepInfo>),
    Malformed(String),
}

/// Parses one CI configuration file into test-related steps.
///
/// Five interchangeable implementations, one per [`Platform`]. Parsers are
/// stateless; the pattern matchers they rely on hold only constant data.
pub trait ConfigParser {
    fn platform(&self) -> Platform;

    /// Parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file cannot be read at all (missing
    /// file, permissions). Malformed content is reported through
    /// [`ParseOutcome::Malformed`], never as an error.
    fn parse(&self, path: &Path) -> Result<ParseOutcome>;
}

/// Returns the parser implementation for a platform.
pub fn parser_for(platform: Platform) -> Box<dyn ConfigParser> {
    match platform {
        Platform::GithubActions => Box::new(GitHubActionsParser),
        Platform::GitlabCi => Box::new(GitLabCiParser),
        Platform::Circleci => Box::new(CircleCiParser),
        Platform::TravisCi => Box::new(TravisCiParser),
        Platform::Jenkins => Box::new(JenkinsParser),
    }
}

/// Normalizes a YAML value that may be either a single string or a list of
/// strings into a flat command list. Anything else yields no commands.
pub(crate) fn string_or_list(value: &serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::String(command) => vec![command.clone()],
        serde_yaml::Value::Sequence(entries) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(ToString::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
