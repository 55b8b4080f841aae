use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::patterns::is_test_related;

use super::{string_or_list, ConfigParser, ParseOutcome, Platform, TestStepInfo};

/// Top-level keys in `.gitlab-ci.yml` that configure the pipeline rather
/// than define a job.
const RESERVED_KEYWORDS: &[&str] = &[
    "image",
    "services",
    "stages",
    "variables",
    "cache",
    "before_script",
    "after_script",
    "artifacts",
    "retry",
    "timeout",
    "parallel",
    "trigger",
    "include",
    "extends",
    "pages",
    "workflow",
    "default",
    "inherit",
];

/// Parser for `.gitlab-ci.yml`.
///
/// Every top-level key that is not a reserved keyword and does not start
/// with `.` (hidden/template job convention) is a job. Commands come from
/// both `script` and `after_script`; the latter commonly carries coverage
/// upload rather than test invocation, so its steps get a distinguishing
/// job-name suffix.
pub struct GitLabCiParser;

impl GitLabCiParser {
    fn is_job_key(key: &str) -> bool {
        !key.starts_with('.') && !RESERVED_KEYWORDS.contains(&key)
    }

    fn collect_section(
        steps: &mut Vec<TestStepInfo>,
        job_name: &str,
        section: Option<&serde_yaml::Value>,
    ) {
        let commands = section.map(string_or_list).unwrap_or_default();
        for command in commands {
            if is_test_related(&command) {
                steps.push(TestStepInfo::new(job_name, command));
            }
        }
    }
}

impl ConfigParser for GitLabCiParser {
    fn platform(&self) -> Platform {
        Platform::GitlabCi
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let contents = std::fs::read_to_string(path)?;

        let pipeline: serde_yaml::Value = match serde_yaml::from_str(&contents) {
            Ok(pipeline) => pipeline,
            Err(err) => return Ok(ParseOutcome::Malformed(err.to_string())),
        };

        let mut steps = Vec::new();

        if let Some(jobs) = pipeline.as_mapping() {
            for (job_key, job) in jobs {
                let job_name = match job_key.as_str() {
                    Some(name) if Self::is_job_key(name) => name,
                    _ => continue,
                };

                Self::collect_section(&mut steps, job_name, job.get("script"));
                Self::collect_section(
                    &mut steps,
                    &format!("{job_name}:after_script"),
                    job.get("after_script"),
                );
            }
        }

        debug!(
            "GitLab CI config {}: {} test-related step(s)",
            path.display(),
            steps.len()
        );

        Ok(ParseOutcome::Steps(steps))
    }
}
