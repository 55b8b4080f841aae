use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::patterns::is_test_related;

use super::{string_or_list, ConfigParser, ParseOutcome, Platform, TestStepInfo};

/// Label for steps from the top-level `script` section.
const SCRIPT_PHASE: &str = "script-phase";
/// Label for steps from `after_success`, which commonly carries coverage
/// upload rather than test invocation.
const AFTER_SUCCESS_PHASE: &str = "after-success-phase";

/// Parser for `.travis.yml`.
///
/// Travis has no job concept comparable to the other platforms; commands
/// live in top-level lifecycle sections. `script` and `after_success` are
/// scanned, each under a fixed phase label.
pub struct TravisCiParser;

impl ConfigParser for TravisCiParser {
    fn platform(&self) -> Platform {
        Platform::TravisCi
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let contents = std::fs::read_to_string(path)?;

        let config: serde_yaml::Value = match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => return Ok(ParseOutcome::Malformed(err.to_string())),
        };

        let mut steps = Vec::new();

        let sections = [
            (SCRIPT_PHASE, config.get("script")),
            (AFTER_SUCCESS_PHASE, config.get("after_success")),
        ];

        for (phase, section) in sections {
            let commands = section.map(string_or_list).unwrap_or_default();
            for command in commands {
                if is_test_related(&command) {
                    steps.push(TestStepInfo::new(phase, command));
                }
            }
        }

        debug!(
            "Travis CI config {}: {} test-related step(s)",
            path.display(),
            steps.len()
        );

        Ok(ParseOutcome::Steps(steps))
    }
}
