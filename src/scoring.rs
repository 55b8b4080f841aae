use std::collections::HashSet;

use chrono::Utc;

use crate::analysis::{CIConfigResult, ScoreBreakdown, StaticTestResult, TestAnalysis};
use crate::patterns::CoverageTools;
use crate::platforms::TestStepInfo;

/// Maximum CI configuration (phase 2) score.
pub const MAX_CI_SCORE: u8 = 13;
/// Maximum static infrastructure (phase 1) score.
pub const MAX_STATIC_SCORE: u8 = 25;
/// Ceiling for the combined Testing dimension score.
pub const MAX_COMBINED_SCORE: u8 = 35;

/// Points for having at least one test step.
const TEST_STEPS_POINTS: u8 = 5;
/// Points for a detected coverage signal (upload tool or coverage flag).
const COVERAGE_POINTS: u8 = 5;
/// Points for spreading tests across at least this many distinct jobs.
const MULTI_JOB_POINTS: u8 = 3;
const MULTI_JOB_THRESHOLD: usize = 2;

/// Number of distinct job names among a platform's steps.
pub fn distinct_job_count(steps: &[TestStepInfo]) -> usize {
    steps
        .iter()
        .map(|step| step.job_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Scores one platform's detected steps.
///
/// Also the basis for comparing platforms when several are present. The
/// final `min` cannot lower the sum today (5 + 5 + 3 = 13) but documents
/// the contract and guards future rule additions.
pub fn platform_score(steps: &[TestStepInfo]) -> u8 {
    let mut score = 0;

    if !steps.is_empty() {
        score += TEST_STEPS_POINTS;
    }

    let commands: Vec<&str> = steps.iter().map(|step| step.command.as_str()).collect();
    let has_coverage_signal = CoverageTools::detect(&commands).any_detected()
        || steps.iter().any(|step| step.has_coverage_flag);
    if has_coverage_signal {
        score += COVERAGE_POINTS;
    }

    if distinct_job_count(steps) >= MULTI_JOB_THRESHOLD {
        score += MULTI_JOB_POINTS;
    }

    score.min(MAX_CI_SCORE)
}

impl ScoreBreakdown {
    /// Combines the two phase contributions, recording the raw sum, the
    /// capped total and what the cap truncated.
    pub fn new(phase1_contribution: u8, phase2_contribution: u8) -> Self {
        debug_assert!(phase1_contribution <= MAX_STATIC_SCORE);
        debug_assert!(phase2_contribution <= MAX_CI_SCORE);

        let raw_total = phase1_contribution + phase2_contribution;
        let capped_total = raw_total.min(MAX_COMBINED_SCORE);

        Self {
            phase1_contribution,
            phase2_contribution,
            raw_total,
            capped_total,
            truncated_points: raw_total - capped_total,
        }
    }
}

/// Folds the externally computed static result and this pipeline's CI
/// result into the Testing dimension report.
pub fn combine(
    repository: impl Into<String>,
    static_result: StaticTestResult,
    ci_config: Option<CIConfigResult>,
) -> TestAnalysis {
    let phase2 = ci_config
        .as_ref()
        .map_or(0, |result| result.calculated_score);
    let breakdown = ScoreBreakdown::new(static_result.calculated_score, phase2);

    TestAnalysis {
        repository: repository.into(),
        analyzed_at: Utc::now(),
        ci_config,
        combined_score: breakdown.capped_total,
        breakdown,
    }
}
