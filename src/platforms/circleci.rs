use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::patterns::is_test_related;

use super::{ConfigParser, ParseOutcome, Platform, TestStepInfo};

/// Parser for `.circleci/config.yml`.
///
/// Walks `jobs.<name>.steps[]`. A step is either a bare string, a `run`
/// key with a string value, or a `run` sub-object carrying `command`.
pub struct CircleCiParser;

impl CircleCiParser {
    /// Extracts the command text from one step entry, whatever its shape.
    fn step_command(step: &serde_yaml::Value) -> Option<&str> {
        if let Some(command) = step.as_str() {
            return Some(command);
        }

        let run = step.get("run")?;
        match run {
            serde_yaml::Value::String(command) => Some(command.as_str()),
            serde_yaml::Value::Mapping(_) => run.get("command").and_then(|cmd| cmd.as_str()),
            _ => None,
        }
    }
}

impl ConfigParser for CircleCiParser {
    fn platform(&self) -> Platform {
        Platform::Circleci
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let contents = std::fs::read_to_string(path)?;

        let config: serde_yaml::Value = match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => return Ok(ParseOutcome::Malformed(err.to_string())),
        };

        let mut steps = Vec::new();

        if let Some(jobs) = config.get("jobs").and_then(|jobs| jobs.as_mapping()) {
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
                    if let Some(command) = Self::step_command(step) {
                        if is_test_related(command) {
                            steps.push(TestStepInfo::new(job_name, command));
                        }
                    }
                }
            }
        }

        debug!(
            "CircleCI config {}: {} test-related step(s)",
            path.display(),
            steps.len()
        );

        Ok(ParseOutcome::Steps(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_config(contents: &str) -> ParseOutcome {
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(file, "{}", contents).unwrap();
        CircleCiParser.parse(file.path()).unwrap()
    }

    fn expect_steps(outcome: ParseOutcome) -> Vec<TestStepInfo> {
        match outcome {
            ParseOutcome::Steps(steps) => steps,
            ParseOutcome::Malformed(reason) => panic!("unexpected malformed: {reason}"),
        }
    }

    #[test]
    fn extracts_run_object_command() {
        let steps = expect_steps(parse_config(
            r"
version: 2.1
jobs:
  unit-tests:
    docker:
      - image: cimg/python:3.12
    steps:
      - checkout
      - run:
          name: Run tests
          command: pytest tests/
",
        ));

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].job_name, "unit-tests");
        assert_eq!(steps[0].command, "pytest tests/");
    }

    #[test]
    fn extracts_bare_string_run() {
        let steps = expect_steps(parse_config(
            r"
jobs:
  test:
    steps:
      - run: npm test
",
        ));

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].command, "npm test");
    }

    #[test]
    fn evaluates_bare_string_steps() {
        // Bare strings are usually built-ins like "checkout", but they are
        // still candidate commands
        let steps = expect_steps(parse_config(
            r"
jobs:
  test:
    steps:
      - checkout
      - go test ./...
",
        ));

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].command, "go test ./...");
    }

    #[test]
    fn collects_steps_across_multiple_jobs() {
        let steps = expect_steps(parse_config(
            r"
jobs:
  unit-tests:
    steps:
      - run: pytest tests/unit
  integration-tests:
    steps:
      - run: pytest tests/integration
  e2e-tests:
    steps:
      - run: pytest tests/e2e
",
        ));

        let jobs: Vec<&str> = steps.iter().map(|s| s.job_name.as_str()).collect();
        assert_eq!(jobs, vec!["unit-tests", "integration-tests", "e2e-tests"]);
    }

    #[test]
    fn config_without_jobs_is_empty() {
        let outcome = parse_config("version: 2.1\norbs: {}\n");
        assert!(matches!(outcome, ParseOutcome::Steps(steps) if steps.is_empty()));
    }

    #[test]
    fn invalid_yaml_is_malformed() {
        let outcome = parse_config("jobs: {test: [}\n");
        assert!(matches!(outcome, ParseOutcome::Malformed(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = CircleCiParser.parse(Path::new("/nonexistent/config.yml"));
        assert!(result.is_err());
    }
}
