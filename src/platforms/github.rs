use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::patterns::is_test_related;

use super::{ConfigParser, ParseOutcome, Platform, TestStepInfo};

/// Parser for GitHub Actions workflow files.
///
/// Walks `jobs.<name>.steps[].run` in document order. Multi-line `run`
/// blocks are split by line and each non-empty line is evaluated
/// independently as a candidate command.
pub struct GitHubActionsParser;

impl ConfigParser for GitHubActionsParser {
    fn platform(&self) -> Platform {
        Platform::GithubActions
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let contents = std::fs::read_to_string(path)?;

        let workflow: serde_yaml::Value = match serde_yaml::from_str(&contents) {
            Ok(workflow) => workflow,
            Err(err) => return Ok(ParseOutcome::Malformed(err.to_string())),
        };

        let mut steps = Vec::new();

        if let Some(jobs) = workflow.get("jobs").and_then(|jobs| jobs.as_mapping()) {
            for (job_key, job) in jobs {
                let job_name = match job_key.as_str() {
                    Some(name) => name,
                    None => continue,
                };

                let job_steps = job
                    .get("steps")
                    .and_then(|steps| steps.as_sequence())
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                for step in job_steps {
                    if let Some(run) = step.get("run").and_then(|run| run.as_str()) {
                        for line in run.lines() {
                            let command = line.trim();
                            if !command.is_empty() && is_test_related(command) {
                                steps.push(TestStepInfo::new(job_name, command));
                            }
                        }
                    }
                }
            }
        }

        debug!(
            "GitHub Actions workflow {}: {} test-related step(s)",
            path.display(),
            steps.len()
        );

        Ok(ParseOutcome::Steps(steps))
    }
}
