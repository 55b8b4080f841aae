use std::path::{Path, PathBuf};

use glob::glob;
use log::{info, warn};

use crate::analysis::CIConfigResult;
use crate::error::{Result, TestLensError};
use crate::patterns::CoverageTools;
use crate::platforms::{parser_for, ParseOutcome, Platform, TestStepInfo};
use crate::scoring::{distinct_job_count, platform_score};

/// A CI platform whose configuration file exists in the repository.
#[derive(Debug, Clone)]
pub struct DetectedPlatform {
    pub platform: Platform,
    /// Configuration file path, relative to the repository root
    pub config_path: PathBuf,
}

/// Probes the fixed configuration locations of every supported platform.
///
/// Only the repository root is inspected; nothing recurses into arbitrary
/// subdirectories. Results come back in [`Platform::ALL`] order, which
/// later doubles as the tie-break order.
pub fn detect_platforms(repo_root: &Path) -> Vec<DetectedPlatform> {
    Platform::ALL
        .iter()
        .filter_map(|&platform| {
            config_path_for(repo_root, platform).map(|config_path| DetectedPlatform {
                platform,
                config_path,
            })
        })
        .collect()
}

fn config_path_for(repo_root: &Path, platform: Platform) -> Option<PathBuf> {
    match platform {
        Platform::GithubActions => first_workflow(repo_root),
        Platform::GitlabCi => existing_file(repo_root, ".gitlab-ci.yml"),
        Platform::Circleci => existing_file(repo_root, ".circleci/config.yml"),
        Platform::TravisCi => existing_file(repo_root, ".travis.yml"),
        Platform::Jenkins => existing_file(repo_root, "Jenkinsfile"),
    }
}

fn existing_file(repo_root: &Path, relative: &str) -> Option<PathBuf> {
    if repo_root.join(relative).is_file() {
        Some(PathBuf::from(relative))
    } else {
        None
    }
}

/// First workflow file under `.github/workflows`, merging `*.yml` and
/// `*.yaml` matches and sorting by file name so the choice is stable
/// across filesystems.
fn first_workflow(repo_root: &Path) -> Option<PathBuf> {
    let workflows_dir = repo_root.join(".github").join("workflows");

    let mut names = Vec::new();
    for pattern in ["*.yml", "*.yaml"] {
        let full_pattern = workflows_dir.join(pattern);
        if let Ok(entries) = glob(&full_pattern.to_string_lossy()) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name() {
                    names.push(name.to_os_string());
                }
            }
        }
    }

    names.sort();
    names.first().map(|name| {
        Path::new(".github").join("workflows").join(name)
    })
}

/// Analyzes a repository's CI configuration.
///
/// Detects present platforms, parses each one, selects the best-scoring
/// platform and aggregates its evidence into a [`CIConfigResult`]. A
/// malformed file excludes only its own platform; the rest still proceed.
///
/// # Errors
///
/// Returns an error when `repo_root` is not a directory, or when a
/// detected configuration file disappears between detection and parsing.
pub fn analyze(repo_root: &Path) -> Result<CIConfigResult> {
    if !repo_root.is_dir() {
        return Err(TestLensError::Repository(format!(
            "{} is not a directory",
            repo_root.display()
        )));
    }

    let detected = detect_platforms(repo_root);
    if detected.is_empty() {
        info!("No CI configuration found in {}", repo_root.display());
        return Ok(CIConfigResult::no_ci(Vec::new()));
    }

    info!(
        "Detected {} CI platform(s): {}",
        detected.len(),
        detected
            .iter()
            .map(|d| d.platform.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut parse_errors = Vec::new();
    let mut parsed: Vec<(DetectedPlatform, Vec<TestStepInfo>)> = Vec::new();

    for candidate in detected {
        let parser = parser_for(candidate.platform);
        match parser.parse(&repo_root.join(&candidate.config_path))? {
            ParseOutcome::Steps(steps) => parsed.push((candidate, steps)),
            ParseOutcome::Malformed(reason) => {
                let message = format!(
                    "Failed to parse {}: {}",
                    candidate.config_path.display(),
                    reason
                );
                warn!("{}", message);
                parse_errors.push(message);
            }
        }
    }

    if parsed.is_empty() {
        return Ok(CIConfigResult::no_ci(parse_errors));
    }

    // Coverage evidence spans every successfully parsed platform, not just
    // the winner
    let all_commands: Vec<&str> = parsed
        .iter()
        .flat_map(|(_, steps)| steps.iter().map(|step| step.command.as_str()))
        .collect();
    let coverage_tools = CoverageTools::detect(&all_commands);

    // Best platform wins; ties fall to the earlier platform in the fixed
    // enumeration order (strict > keeps the first maximum)
    let scores: Vec<u8> = parsed.iter().map(|(_, steps)| platform_score(steps)).collect();
    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = index;
        }
    }

    let (winner, steps) = &parsed[best];
    info!(
        "Selected platform {} with score {}",
        winner.platform, scores[best]
    );

    let test_commands: Vec<String> = steps.iter().map(|step| step.command.clone()).collect();

    Ok(CIConfigResult::new(
        Some(winner.platform),
        Some(winner.config_path.clone()),
        test_commands,
        coverage_tools.names(),
        distinct_job_count(steps),
        scores[best],
        parse_errors,
    ))
}
