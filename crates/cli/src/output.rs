//! Report rendering.

use anyhow::{Context, Result};
use mergecheck_core::config::ReportFormat;
use mergecheck_core::SimulationReport;

use crate::style;

pub const CLEAN_SUMMARY: &str =
    "Good news, everyone! Branches can be merged automatically without conflicts.";

/// Summary line for a report.
pub fn summary_line(report: &SimulationReport) -> String {
    if report.is_clean() {
        CLEAN_SUMMARY.to_string()
    } else {
        format!("Found {} conflicts in total.", report.total())
    }
}

/// Plain-text report: the conflict lines (when requested) followed by the
/// summary line, one per line.
pub fn render_text(report: &SimulationReport, print_conflicts: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if print_conflicts {
        lines.extend(report.conflicts.iter().map(|c| c.message.clone()));
    }
    lines.push(summary_line(report));
    lines
}

/// JSON report: the serialized report with its total added.
pub fn render_json(report: &SimulationReport) -> Result<String> {
    let mut value = serde_json::to_value(report).context("failed to serialize report")?;
    value["total"] = serde_json::json!(report.total());
    serde_json::to_string_pretty(&value).context("failed to serialize report")
}

/// Print `report` to stdout and its warnings to stderr.
pub fn print_report(
    report: &SimulationReport,
    format: ReportFormat,
    print_conflicts: bool,
) -> Result<()> {
    for warning in &report.warnings {
        eprintln!("{}", style::warn(warning));
    }

    match format {
        ReportFormat::Json => println!("{}", render_json(report)?),
        ReportFormat::Text => {
            let mut lines = render_text(report, print_conflicts);
            let summary = lines.pop().unwrap_or_default();
            for line in lines {
                println!("{}", line);
            }
            if report.is_clean() {
                println!("{}", style::success(&summary));
            } else {
                println!("{}", style::failure(&summary));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergecheck_core::conflict::ConflictKind;
    use mergecheck_core::simulate::{ConflictRecord, Operation};

    fn report_with_conflict() -> SimulationReport {
        let mut report = SimulationReport::new(Operation::Merge);
        report.conflicts.push(ConflictRecord {
            path: "src/lib.rs".into(),
            kind: ConflictKind::Content,
            message: "CONFLICT (content): Merge conflict in src/lib.rs".into(),
            step: None,
        });
        report
    }

    #[test]
    fn test_clean_summary() {
        let report = SimulationReport::new(Operation::Merge);
        assert_eq!(render_text(&report, true), vec![CLEAN_SUMMARY.to_string()]);
    }

    #[test]
    fn test_conflict_lines_only_when_requested() {
        let report = report_with_conflict();
        assert_eq!(
            render_text(&report, false),
            vec!["Found 1 conflicts in total.".to_string()]
        );
        assert_eq!(
            render_text(&report, true),
            vec![
                "CONFLICT (content): Merge conflict in src/lib.rs".to_string(),
                "Found 1 conflicts in total.".to_string(),
            ]
        );
    }

    #[test]
    fn test_json_has_total() {
        let json = render_json(&report_with_conflict()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["operation"], "merge");
        assert_eq!(value["conflicts"][0]["path"], "src/lib.rs");
        assert_eq!(value["conflicts"][0]["kind"], "content");
    }
}
