use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::analysis::StaticTestResult;
use crate::analyzer;
use crate::config::{Config, OutputFormat};
use crate::output;
use crate::scoring;

#[derive(Parser)]
#[command(name = "testlens")]
#[command(author, version, about = "CI Test Signal Analyzer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    Analyze {
        /// Repository to analyze (falls back to the config file, then ".")
        repo: Option<PathBuf>,

        /// Pre-computed static infrastructure score (phase 1), in [0, 25]
        #[arg(short, long, env = "TESTLENS_STATIC_SCORE")]
        static_score: Option<u8>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    fn execute_analyze(
        &self,
        repo: Option<&PathBuf>,
        static_score: Option<u8>,
        format: Option<OutputFormat>,
        config_path: Option<&PathBuf>,
    ) -> Result<()> {
        let config = Config::load(config_path.map(PathBuf::as_path))?;

        let repo = repo
            .cloned()
            .or_else(|| config.analysis.repo_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        info!("Analyzing CI configuration in: {}", repo.display());

        let ci_result = analyzer::analyze(&repo)?;

        let static_score = static_score.or(config.analysis.static_score).unwrap_or(0);
        let static_result = StaticTestResult::new(static_score)?;

        let analysis = scoring::combine(
            repo.display().to_string(),
            static_result,
            Some(ci_result),
        );

        let format = format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;

        if let Some(output_path) = &self.output {
            let mut file = std::fs::File::create(output_path)?;
            output::export_analysis(
                &analysis,
                format,
                pretty,
                config.output.include_commands,
                &mut file,
            )?;
            info!("Analysis written to: {}", output_path.display());
        } else {
            output::export_analysis(
                &analysis,
                format,
                pretty,
                config.output.include_commands,
                &mut std::io::stdout(),
            )?;
        }

        Ok(())
    }

    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Analyze {
                repo,
                static_score,
                format,
                config,
            } => self.execute_analyze(repo.as_ref(), *static_score, *format, config.as_ref()),
        }
    }
}
