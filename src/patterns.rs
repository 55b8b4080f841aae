use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Known test invocation fragments, covering the four ecosystems we score.
///
/// Matching is case-insensitive substring containment. This is deliberately
/// not a shell tokenizer: unusual invocations can slip through in either
/// direction, which is an accepted trade-off for determinism and speed.
const TEST_COMMAND_PATTERNS: &[&str] = &[
    // Python
    "pytest",
    "python -m pytest",
    // JavaScript
    "npm test",
    "npm run test",
    // Go
    "go test",
    // JVM
    "mvn test",
    "gradle test",
    "./gradlew test",
    "gradlew test",
];

/// Literal coverage flags that test runners accept on the command line.
const COVERAGE_FLAG_PATTERNS: &[&str] = &["--cov", "--coverage", "-cover", "-coverprofile"];

/// Test framework implied by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFramework {
    Pytest,
    Jest,
    Junit,
    GoTest,
}

/// Returns true if the command reads as a test invocation.
///
/// Empty or whitespace-only input is never a test command.
pub fn is_test_command(command: &str) -> bool {
    if command.trim().is_empty() {
        return false;
    }

    let lowered = command.to_lowercase();
    TEST_COMMAND_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Infers the single best-matching test framework for a command.
///
/// Priority order: pytest, then the npm test family (jest), then go test,
/// then Maven/Gradle (junit). Returns `None` when nothing matches.
pub fn detect_framework(command: &str) -> Option<TestFramework> {
    let lowered = command.to_lowercase();

    if lowered.contains("pytest") {
        Some(TestFramework::Pytest)
    } else if lowered.contains("npm test") || lowered.contains("npm run test") {
        Some(TestFramework::Jest)
    } else if lowered.contains("go test") {
        Some(TestFramework::GoTest)
    } else if lowered.contains("mvn test") || lowered.contains("gradle test") || lowered.contains("gradlew test") {
        Some(TestFramework::Junit)
    } else {
        None
    }
}

/// Returns true if the command carries a coverage flag (e.g. `--cov`,
/// `-coverprofile`). Independent of whether it is a test command.
pub fn has_coverage_flag(command: &str) -> bool {
    let lowered = command.to_lowercase();
    COVERAGE_FLAG_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Substrings identifying each coverage upload tool. Checked in this order
/// so the reported tool set is stable regardless of command order.
const COVERAGE_TOOL_PATTERNS: &[(&str, &[&str])] = &[
    ("codecov", &["codecov"]),
    ("coveralls", &["coveralls"]),
    ("sonarqube", &["sonar-scanner", "sonarqube"]),
];

/// Coverage upload tools detected across a set of commands.
#[derive(Debug, Clone, Default)]
pub struct CoverageTools {
    tools: IndexSet<String>,
}

impl CoverageTools {
    /// Scans a list of arbitrary command/step strings for coverage upload
    /// tool usage.
    ///
    /// Detects Codecov, Coveralls and SonarQube independently, by
    /// case-insensitive substring. Note that `--coverage` does not match
    /// "codecov": flags and upload tools are separate checks.
    pub fn detect<S: AsRef<str>>(commands: &[S]) -> Self {
        let lowered: Vec<String> = commands
            .iter()
            .map(|command| command.as_ref().to_lowercase())
            .collect();

        let mut tools = IndexSet::new();
        for (name, needles) in COVERAGE_TOOL_PATTERNS {
            let found = lowered
                .iter()
                .any(|command| needles.iter().any(|needle| command.contains(needle)));
            if found {
                tools.insert((*name).to_string());
            }
        }

        Self { tools }
    }

    /// True when at least one upload tool was detected.
    pub fn any_detected(&self) -> bool {
        !self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().cloned().collect()
    }
}

/// Collection predicate used by the platform parsers: a command becomes a
/// step when it is a test invocation, carries a coverage flag, or names a
/// coverage upload tool.
pub fn is_test_related(command: &str) -> bool {
    is_test_command(command)
        || has_coverage_flag(command)
        || CoverageTools::detect(&[command]).any_detected()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod is_test_command {
        use super::*;

        #[test]
        fn detects_pytest() {
            assert!(is_test_command("pytest tests/"));
        }

        #[test]
        fn detects_python_module_pytest() {
            assert!(is_test_command("python -m pytest -x"));
        }

        #[test]
        fn detects_npm_test() {
            assert!(is_test_command("npm test"));
        }

        #[test]
        fn detects_npm_run_test() {
            assert!(is_test_command("npm run test:unit"));
        }

        #[test]
        fn detects_go_test() {
            assert!(is_test_command("go test ./..."));
        }

        #[test]
        fn detects_maven_test() {
            assert!(is_test_command("mvn test -B"));
        }

        #[test]
        fn detects_gradlew_test() {
            assert!(is_test_command("./gradlew test --no-daemon"));
        }

        #[test]
        fn is_case_insensitive() {
            assert!(is_test_command("PyTest tests/"));
            assert!(is_test_command("NPM TEST"));
        }

        #[test]
        fn rejects_build_commands() {
            assert!(!is_test_command("make build"));
            assert!(!is_test_command("cargo fmt --check"));
            assert!(!is_test_command("docker build -t app ."));
        }

        #[test]
        fn rejects_empty_command() {
            assert!(!is_test_command(""));
        }

        #[test]
        fn rejects_whitespace_only_command() {
            assert!(!is_test_command("   \t  "));
        }
    }

    #[cfg(test)]
    mod detect_framework {
        use super::*;

        #[test]
        fn framework_wire_names_are_stable() {
            let names: Vec<String> = [
                TestFramework::Pytest,
                TestFramework::Jest,
                TestFramework::Junit,
                TestFramework::GoTest,
            ]
            .iter()
            .map(|framework| serde_json::to_string(framework).unwrap())
            .collect();
            assert_eq!(
                names,
                vec!["\"pytest\"", "\"jest\"", "\"junit\"", "\"go_test\""]
            );
        }

        #[test]
        fn infers_pytest() {
            assert_eq!(detect_framework("pytest tests/"), Some(TestFramework::Pytest));
        }

        #[test]
        fn pytest_wins_over_other_fragments() {
            // Priority order matters when one line chains multiple runners
            assert_eq!(
                detect_framework("pytest && npm test"),
                Some(TestFramework::Pytest)
            );
        }

        #[test]
        fn infers_jest_from_npm_test() {
            assert_eq!(detect_framework("npm test"), Some(TestFramework::Jest));
        }

        #[test]
        fn infers_jest_from_npm_run_test() {
            assert_eq!(
                detect_framework("npm run test -- --ci"),
                Some(TestFramework::Jest)
            );
        }

        #[test]
        fn infers_go_test() {
            assert_eq!(
                detect_framework("go test -race ./..."),
                Some(TestFramework::GoTest)
            );
        }

        #[test]
        fn infers_junit_from_maven() {
            assert_eq!(detect_framework("mvn test"), Some(TestFramework::Junit));
        }

        #[test]
        fn infers_junit_from_gradle_wrapper() {
            assert_eq!(
                detect_framework("./gradlew test"),
                Some(TestFramework::Junit)
            );
        }

        #[test]
        fn is_case_insensitive() {
            assert_eq!(detect_framework("Go Test ./..."), Some(TestFramework::GoTest));
        }

        #[test]
        fn returns_none_for_non_test_command() {
            assert_eq!(detect_framework("make lint"), None);
        }

        #[test]
        fn returns_none_for_empty_command() {
            assert_eq!(detect_framework(""), None);
        }
    }

    #[cfg(test)]
    mod has_coverage_flag {
        use super::*;

        #[test]
        fn detects_cov_flag() {
            assert!(has_coverage_flag("pytest --cov=src tests/"));
        }

        #[test]
        fn detects_coverage_flag() {
            assert!(has_coverage_flag("npm test -- --coverage"));
        }

        #[test]
        fn detects_go_cover_flag() {
            assert!(has_coverage_flag("go test -cover ./..."));
        }

        #[test]
        fn detects_coverprofile_flag() {
            assert!(has_coverage_flag("go test -coverprofile=coverage.out"));
        }

        #[test]
        fn ignores_plain_test_command() {
            assert!(!has_coverage_flag("pytest tests/"));
        }

        #[test]
        fn works_on_non_test_commands() {
            // The check does not require the command to be a test invocation
            assert!(has_coverage_flag("echo --coverage"));
        }
    }

    #[cfg(test)]
    mod coverage_tools {
        use super::*;

        #[test]
        fn detects_codecov_bare_command() {
            let tools = CoverageTools::detect(&["codecov"]);
            assert!(tools.any_detected());
            assert_eq!(tools.names(), vec!["codecov"]);
        }

        #[test]
        fn detects_codecov_action_reference() {
            let tools = CoverageTools::detect(&["uses: codecov/codecov-action@v3"]);
            assert_eq!(tools.names(), vec!["codecov"]);
        }

        #[test]
        fn detects_codecov_bash_installer() {
            let tools = CoverageTools::detect(&["bash <(curl -s https://codecov.io/bash)"]);
            assert_eq!(tools.names(), vec!["codecov"]);
        }

        #[test]
        fn detects_coveralls() {
            let tools = CoverageTools::detect(&["coveralls --service=github"]);
            assert_eq!(tools.names(), vec!["coveralls"]);
        }

        #[test]
        fn detects_sonar_scanner() {
            let tools = CoverageTools::detect(&["sonar-scanner -Dsonar.projectKey=app"]);
            assert_eq!(tools.names(), vec!["sonarqube"]);
        }

        #[test]
        fn detects_sonarqube_by_name() {
            let tools = CoverageTools::detect(&["docker run sonarqube:latest"]);
            assert_eq!(tools.names(), vec!["sonarqube"]);
        }

        #[test]
        fn coverage_flag_does_not_match_codecov() {
            // "--coverage" and "codecov" are distinct substrings; only the
            // flag check should fire on this command
            let tools = CoverageTools::detect(&["npm test -- --coverage"]);
            assert!(!tools.any_detected());
            assert!(has_coverage_flag("npm test -- --coverage"));
        }

        #[test]
        fn deduplicates_tools_across_commands() {
            let tools = CoverageTools::detect(&["codecov", "codecov -f lcov.info"]);
            assert_eq!(tools.names(), vec!["codecov"]);
        }

        #[test]
        fn keeps_detection_order_stable() {
            let tools = CoverageTools::detect(&["coveralls", "codecov"]);
            assert_eq!(tools.names(), vec!["codecov", "coveralls"]);
        }

        #[test]
        fn is_case_insensitive() {
            let tools = CoverageTools::detect(&["Codecov upload"]);
            assert_eq!(tools.names(), vec!["codecov"]);
        }

        #[test]
        fn detects_nothing_in_plain_commands() {
            let tools = CoverageTools::detect(&["make build", "pytest tests/"]);
            assert!(!tools.any_detected());
            assert!(tools.names().is_empty());
        }
    }

    #[cfg(test)]
    mod is_test_related {
        use super::*;

        #[test]
        fn accepts_test_command() {
            assert!(is_test_related("pytest tests/"));
        }

        #[test]
        fn accepts_coverage_upload_command() {
            assert!(is_test_related("codecov upload"));
        }

        #[test]
        fn accepts_coverage_flag_command() {
            assert!(is_test_related("nyc --coverage report"));
        }

        #[test]
        fn rejects_plain_build_command() {
            assert!(!is_test_related("make build"));
        }
    }
}
