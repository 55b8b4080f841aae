use std::path::Path;

use log::debug;
use regex::Regex;

use crate::error::Result;
use crate::patterns::is_test_related;

use super::{ConfigParser, ParseOutcome, Platform, TestStepInfo};

/// All Jenkins steps share one label; pipeline stages do not map cleanly
/// onto the job concept used by the other platforms.
const JOB_LABEL: &str = "jenkins-pipeline";

/// Matches the quoted argument of `sh '...'` / `sh "..."`.
const SH_PATTERN: &str = r#"(?i)\bsh\s+(?:'([^']*)'|"([^"]*)")"#;
/// Matches the quoted argument of `bat '...'` / `bat "..."`.
const BAT_PATTERN: &str = r#"(?i)\bbat\s+(?:'([^']*)'|"([^"]*)")"#;

/// Parser for `Jenkinsfile`.
///
/// No structured parse: the file is plain text scanned with two
/// independent patterns extracting the quoted argument of `sh` and `bat`
/// invocations. Shell scripts invoked indirectly (e.g. `sh
/// './run_tests.sh'`) are opaque to this scan — an accepted limitation
/// versus evaluating the full pipeline DSL.
pub struct JenkinsParser;

impl JenkinsParser {
    fn scan(steps: &mut Vec<TestStepInfo>, pattern: &str, contents: &str) {
        let re = Regex::new(pattern).unwrap();

        for captures in re.captures_iter(contents) {
            let command = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();

            if !command.is_empty() && is_test_related(command) {
                steps.push(TestStepInfo::new(JOB_LABEL, command));
            }
        }
    }
}

impl ConfigParser for JenkinsParser {
    fn platform(&self) -> Platform {
        Platform::Jenkins
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let bytes = std::fs::read(path)?;

        let contents = match String::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(err) => return Ok(ParseOutcome::Malformed(err.to_string())),
        };

        let mut steps = Vec::new();
        Self::scan(&mut steps, SH_PATTERN, &contents);
        Self::scan(&mut steps, BAT_PATTERN, &contents);

        debug!(
            "Jenkinsfile {}: {} test-related step(s)",
            path.display(),
            steps.len()
        );

        Ok(ParseOutcome::Steps(steps))
    }
}
