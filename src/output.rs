use std::io::Write;

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};
use console::style;

use crate::analysis::TestAnalysis;
use crate::config::OutputFormat;

// Styling helpers

fn bright_yellow(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

fn bright_green(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().green()
}

fn cyan(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).cyan()
}

fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

fn magenta_bold(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

// Banner

pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔬 TestLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI Test Signal Analyzer")
    );
}

/// Writes the analysis in the requested format.
pub fn export_analysis(
    analysis: &TestAnalysis,
    format: OutputFormat,
    pretty: bool,
    include_commands: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => export_summary(analysis, include_commands, output),
        OutputFormat::Json => export_json(analysis, pretty, output),
    }
}

fn export_json(analysis: &TestAnalysis, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(analysis)?
    } else {
        serde_json::to_string(analysis)?
    };
    writeln!(output, "{}", json)?;
    Ok(())
}

fn export_summary(
    analysis: &TestAnalysis,
    include_commands: bool,
    output: &mut dyn Write,
) -> Result<()> {
    writeln!(output, "{}", render_summary(analysis, include_commands))?;
    Ok(())
}

/// Builds the human-readable summary: a score table followed by the CI
/// evidence and any parse warnings.
pub fn render_summary(analysis: &TestAnalysis, include_commands: bool) -> String {
    let mut summary = String::new();

    summary.push_str(&format!(
        "{} {}\n\n",
        magenta_bold("Testing dimension for"),
        cyan(&analysis.repository)
    ));

    summary.push_str(&score_table(analysis).to_string());
    summary.push('\n');

    let breakdown = &analysis.breakdown;
    if breakdown.truncated_points > 0 {
        summary.push_str(&format!(
            "\n  {} {}\n",
            bright_yellow("▲"),
            dim(format!(
                "{} point(s) above the {}-point ceiling were truncated",
                breakdown.truncated_points, breakdown.capped_total
            ))
        ));
    }

    let detected = analysis
        .ci_config
        .as_ref()
        .and_then(|ci| ci.platform.map(|platform| (ci, platform)));

    match detected {
        Some((ci, platform)) => {
            summary.push_str(&format!(
                "\n{}  {}\n",
                bright_green("⚙️"),
                style(format!("CI: {platform}")).underlined()
            ));
            if let Some(path) = &ci.config_file_path {
                summary.push_str(&format!("  {} {}\n", dim("config"), dim(path.display())));
            }
            summary.push_str(&format!(
                "  {} test job(s), {} coverage tool(s)\n",
                ci.test_job_count,
                ci.coverage_tools.len()
            ));

            for tool in &ci.coverage_tools {
                summary.push_str(&format!("  {} {}\n", cyan("•"), tool));
            }

            if include_commands {
                for command in &ci.test_commands {
                    summary.push_str(&format!("  {} {}\n", cyan("$"), command));
                }
            }
        }
        None => {
            summary.push_str(&format!(
                "\n  {} {}\n",
                bright_yellow("▲"),
                dim("no CI configuration detected")
            ));
        }
    }

    if let Some(ci) = &analysis.ci_config {
        for error in &ci.parse_errors {
            summary.push_str(&format!("  {} {}\n", bright_yellow("▲"), error));
        }
    }

    summary
}

fn score_table(analysis: &TestAnalysis) -> Table {
    let breakdown = &analysis.breakdown;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Phase").fg(TableColor::Cyan),
            Cell::new("Score").fg(TableColor::Cyan),
        ]);

    table.add_row(vec![
        Cell::new("Static infrastructure (phase 1)"),
        Cell::new(format!("{}/25", breakdown.phase1_contribution)),
    ]);
    table.add_row(vec![
        Cell::new("CI configuration (phase 2)"),
        Cell::new(format!("{}/13", breakdown.phase2_contribution)),
    ]);
    table.add_row(vec![
        Cell::new("Combined").fg(TableColor::Green),
        Cell::new(format!("{}/35", analysis.combined_score)).fg(TableColor::Green),
    ]);

    table
}
