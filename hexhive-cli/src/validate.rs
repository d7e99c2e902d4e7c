//! Validate command - batch-check level files
//!
//! Parsing already enforces the hard invariants (dimension limits, tile
//! counts and codes, entity coordinates in range, at least one player). On
//! top of that this command warns about levels that parse but cannot be
//! played to completion, like more spots than blocks.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: collect_files(), check_files(), report_results()
//! - Level 3: check_file(), summarize(), design_warnings()
//! - Level 4: formatting utilities

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;

use hexhive_core::{EntityKind, LevelData, TileType};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct ValidateArgs {
    /// Level files or directories of level files
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of checking one file
struct FileReport {
    file: PathBuf,
    outcome: Result<LevelSummary, String>,
}

/// What a parsed level looks like, plus design warnings
struct LevelSummary {
    columns: u8,
    rows: u8,
    spots: usize,
    blocks: usize,
    warnings: Vec<String>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run validate command
///
/// This function reads like a table of contents:
/// 1. Collect the level files
/// 2. Check them in parallel
/// 3. Report per-file results and fail on any invalid file
pub fn run(args: ValidateArgs) -> Result<()> {
    let files = collect_files(&args.paths)?;

    tracing::info!("Checking {} level files", files.len());

    let reports = check_files(&files);

    report_results(&reports, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Expand directories into their .json files, keeping explicit files as-is
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory: {}", path.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|extension| extension == "json"))
                .collect();
            entries.sort();
            files.append(&mut entries);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        anyhow::bail!("no level files found");
    }

    Ok(files)
}

/// Check every file, one rayon task each
fn check_files(files: &[PathBuf]) -> Vec<FileReport> {
    files.par_iter().map(|file| check_file(file)).collect()
}

/// Print the reports and turn any failure into a non-zero exit
fn report_results(reports: &[FileReport], args: &ValidateArgs) -> Result<()> {
    let failed = reports
        .iter()
        .filter(|report| report.outcome.is_err())
        .count();

    if args.json {
        print_json_results(reports);
    } else {
        print_text_results(reports, failed);
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} level files invalid", reports.len());
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - PER-FILE CHECKS
// ============================================================================

fn check_file(file: &Path) -> FileReport {
    let outcome = LevelData::from_path(file)
        .map(|data| summarize(&data))
        .map_err(|error| format!("{error:#}"));

    FileReport {
        file: file.to_path_buf(),
        outcome,
    }
}

fn summarize(data: &LevelData) -> LevelSummary {
    let spots = data
        .tiles
        .iter()
        .filter(|tile| **tile == TileType::Spot)
        .count();
    let blocks = data
        .entities
        .iter()
        .filter(|spec| spec.kind == EntityKind::Block)
        .count();

    LevelSummary {
        columns: data.columns,
        rows: data.rows,
        spots,
        blocks,
        warnings: design_warnings(data, spots, blocks),
    }
}

/// Soft checks: the level parses but may not be winnable or interesting
fn design_warnings(data: &LevelData, spots: usize, blocks: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    if spots == 0 {
        warnings.push("no spots, level is solved at load".to_string());
    }

    if spots > blocks {
        warnings.push(format!("{spots} spots but only {blocks} blocks"));
    }

    let covered = data
        .entities
        .iter()
        .filter(|spec| {
            spec.kind == EntityKind::Block
                && data.tiles[usize::from(spec.tile(data.columns))] == TileType::Spot
        })
        .count();
    if spots > 0 && covered == spots {
        warnings.push("every spot starts covered".to_string());
    }

    let player_tile = data
        .entities
        .iter()
        .find(|spec| spec.kind == EntityKind::Player)
        .map(|spec| spec.tile(data.columns));
    if let Some(tile) = player_tile {
        if data.tiles[usize::from(tile)] == TileType::Empty {
            warnings.push("player starts on a hole".to_string());
        }
    }

    warnings
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(reports: &[FileReport]) {
    #[derive(serde::Serialize)]
    struct JsonReport {
        file: String,
        valid: bool,
        error: Option<String>,
        columns: Option<u8>,
        rows: Option<u8>,
        spots: Option<usize>,
        blocks: Option<usize>,
        warnings: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total: usize,
        valid: usize,
        invalid: usize,
        reports: Vec<JsonReport>,
    }

    let reports: Vec<JsonReport> = reports
        .iter()
        .map(|report| match &report.outcome {
            Ok(summary) => JsonReport {
                file: report.file.display().to_string(),
                valid: true,
                error: None,
                columns: Some(summary.columns),
                rows: Some(summary.rows),
                spots: Some(summary.spots),
                blocks: Some(summary.blocks),
                warnings: summary.warnings.clone(),
            },
            Err(error) => JsonReport {
                file: report.file.display().to_string(),
                valid: false,
                error: Some(error.clone()),
                columns: None,
                rows: None,
                spots: None,
                blocks: None,
                warnings: Vec::new(),
            },
        })
        .collect();

    let invalid = reports.iter().filter(|report| !report.valid).count();
    let output = JsonOutput {
        total: reports.len(),
        valid: reports.len() - invalid,
        invalid,
        reports,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(reports: &[FileReport], failed: usize) {
    for report in reports {
        match &report.outcome {
            Ok(summary) => {
                println!(
                    "ok      {} ({}x{}, {} spots, {} blocks)",
                    report.file.display(),
                    summary.columns,
                    summary.rows,
                    summary.spots,
                    summary.blocks
                );
                for warning in &summary.warnings {
                    println!("        warning: {warning}");
                }
            }
            Err(error) => {
                println!("FAILED  {}", report.file.display());
                println!("        {error}");
            }
        }
    }

    println!();
    println!(
        "{} checked, {} ok, {} failed",
        reports.len(),
        reports.len() - failed,
        failed
    );
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn data_from(text: &str) -> LevelData {
        LevelData::from_json(text).unwrap()
    }

    #[test]
    fn test_summary_counts_spots_and_blocks() {
        let data = data_from(
            r#"{
                "columns": 2,
                "rows": 2,
                "tiles": [1, 2, 2, 1],
                "entities": [0, 0, 0, 4, 1, 1, 1, 4]
            }"#,
        );

        let summary = summarize(&data);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.spots, 2);
        assert_eq!(summary.blocks, 1);
    }

    #[test]
    fn test_warns_when_blocks_cannot_cover_spots() {
        let data = data_from(
            r#"{
                "columns": 2,
                "rows": 2,
                "tiles": [1, 2, 2, 1],
                "entities": [0, 0, 0, 4, 1, 1, 1, 4]
            }"#,
        );

        let summary = summarize(&data);
        assert!(summary
            .warnings
            .iter()
            .any(|warning| warning.contains("2 spots but only 1 blocks")));
    }

    #[test]
    fn test_warns_when_solved_at_load() {
        let data = data_from(
            r#"{"columns": 1, "rows": 2, "tiles": [1, 2], "entities": [0, 0, 0, 4, 1, 0, 1, 4]}"#,
        );

        let summary = summarize(&data);
        assert!(summary
            .warnings
            .iter()
            .any(|warning| warning.contains("every spot starts covered")));
    }

    #[test]
    fn test_clean_level_has_no_warnings() {
        let data = data_from(
            r#"{"columns": 1, "rows": 3, "tiles": [1, 1, 2], "entities": [0, 0, 0, 4, 1, 0, 1, 4]}"#,
        );

        assert!(summarize(&data).warnings.is_empty());
    }
}
