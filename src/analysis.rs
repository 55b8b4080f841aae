use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TestLensError};
use crate::platforms::Platform;
use crate::scoring::{MAX_CI_SCORE, MAX_STATIC_SCORE};

/// Result of analyzing one repository's CI configuration.
///
/// This is the pipeline's externally visible contract. All invariants are
/// checked at construction; violating them is a programming error, so
/// construction panics rather than returning an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CIConfigResult {
    /// Winning CI platform, absent when no CI configuration was detected
    pub platform: Option<Platform>,
    /// Path of the winning configuration file, relative to the repository
    /// root; absent iff `platform` is absent
    pub config_file_path: Option<PathBuf>,
    /// Whether any test-related step was detected
    pub has_test_steps: bool,
    /// Raw commands of the detected steps, in parser order
    pub test_commands: Vec<String>,
    /// Whether a coverage upload tool was detected
    pub has_coverage_upload: bool,
    /// Unique coverage upload tool names, order-stable
    pub coverage_tools: Vec<String>,
    /// Number of distinct job/stage identifiers containing a test step
    pub test_job_count: usize,
    /// CI score in [0, 13]
    pub calculated_score: u8,
    /// Human-readable per-platform parse failure messages
    pub parse_errors: Vec<String>,
}

impl CIConfigResult {
    /// Builds a result, deriving the boolean evidence fields and asserting
    /// every invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        platform: Option<Platform>,
        config_file_path: Option<PathBuf>,
        test_commands: Vec<String>,
        coverage_tools: Vec<String>,
        test_job_count: usize,
        calculated_score: u8,
        parse_errors: Vec<String>,
    ) -> Self {
        assert!(
            platform.is_some() == config_file_path.is_some(),
            "platform and config_file_path must be present or absent together"
        );
        assert!(
            calculated_score <= MAX_CI_SCORE,
            "CI score {calculated_score} exceeds {MAX_CI_SCORE}"
        );
        assert!(
            platform.is_some() || test_commands.is_empty(),
            "test commands require a detected platform"
        );

        Self {
            platform,
            config_file_path,
            has_test_steps: !test_commands.is_empty(),
            test_commands,
            has_coverage_upload: !coverage_tools.is_empty(),
            coverage_tools,
            test_job_count,
            calculated_score,
            parse_errors,
        }
    }

    /// Zero-score result for a repository where no platform produced
    /// usable steps. `parse_errors` is non-empty only when at least one
    /// platform's file existed but failed to parse.
    pub fn no_ci(parse_errors: Vec<String>) -> Self {
        Self::new(None, None, Vec::new(), Vec::new(), 0, 0, parse_errors)
    }
}

/// Pre-computed static test infrastructure result (phase 1).
///
/// Produced by an external collaborator; this pipeline only consumes its
/// bounded score and treats everything else about it as opaque.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StaticTestResult {
    /// Static-analysis score in [0, 25]
    pub calculated_score: u8,
}

impl StaticTestResult {
    /// # Errors
    ///
    /// Returns a configuration error when the score exceeds the phase-1
    /// maximum of 25.
    pub fn new(calculated_score: u8) -> Result<Self> {
        if calculated_score > MAX_STATIC_SCORE {
            return Err(TestLensError::Config(format!(
                "static score {calculated_score} exceeds maximum {MAX_STATIC_SCORE}"
            )));
        }

        Ok(Self { calculated_score })
    }
}

/// Audit record for how the two phases combine.
///
/// Keeps the raw sum alongside the capped total so the cap's effect stays
/// visible instead of being silently lossy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Static infrastructure contribution, in [0, 25]
    pub phase1_contribution: u8,
    /// CI configuration contribution, in [0, 13]
    pub phase2_contribution: u8,
    /// Uncapped sum of both phases
    pub raw_total: u8,
    /// Sum after applying the 35-point ceiling
    pub capped_total: u8,
    /// Points lost to the ceiling, always >= 0
    pub truncated_points: u8,
}

/// Top-level Testing dimension report for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAnalysis {
    /// Repository the analysis ran against
    pub repository: String,
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// CI configuration result, absent when no CI config exists
    pub ci_config: Option<CIConfigResult>,
    /// Combined Testing dimension score in [0, 35]
    pub combined_score: u8,
    /// How the two phases produced `combined_score`
    pub breakdown: ScoreBreakdown,
}
