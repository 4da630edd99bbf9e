//! CLI output formatting.
//!
//! One line per file, printed as soon as the file is done:
//!
//! ```text
//! Saved: IMG_0001.jpg -> 1000x750
//! Skipped (animated): spinner.gif
//! Failed to process broken.jpg: Failed to decode: ...
//! ```
//!
//! followed by a summary line once the batch is finished:
//!
//! ```text
//! Processed 3 files: 1 saved, 1 skipped, 1 failed
//! ```
//!
//! Format functions are pure (no I/O) for testability; `print_*` wrappers
//! write to stdout.

use crate::batch::{Outcome, Report};

/// Format the console line for one outcome.
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Saved { name, dimensions } => format!("Saved: {name} -> {dimensions}"),
        Outcome::SkippedAnimated { name } => format!("Skipped (animated): {name}"),
        Outcome::Failed { name, error } => format!("Failed to process {name}: {error}"),
    }
}

/// Format the closing summary line.
pub fn format_summary(report: &Report) -> String {
    let total = report.outcomes.len();
    if total == 0 {
        return "No matching images found".to_string();
    }
    let files = if total == 1 { "file" } else { "files" };
    format!(
        "Processed {total} {files}: {} saved, {} skipped, {} failed",
        report.saved(),
        report.skipped(),
        report.failed()
    )
}

/// Names of the files that failed, for a closing recap.
pub fn failed_names(report: &Report) -> Vec<&str> {
    report
        .outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Failed { .. }))
        .map(Outcome::name)
        .collect()
}

pub fn print_outcome(outcome: &Outcome) {
    println!("{}", format_outcome(outcome));
}

pub fn print_summary(report: &Report) {
    println!("{}", format_summary(report));
    let failed = failed_names(report);
    if !failed.is_empty() {
        println!("Failed: {}", failed.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;

    fn saved(name: &str, width: u32, height: u32) -> Outcome {
        Outcome::Saved {
            name: name.into(),
            dimensions: Dimensions { width, height },
        }
    }

    #[test]
    fn saved_line() {
        assert_eq!(
            format_outcome(&saved("IMG_0001.jpg", 1000, 750)),
            "Saved: IMG_0001.jpg -> 1000x750"
        );
    }

    #[test]
    fn skipped_line() {
        let outcome = Outcome::SkippedAnimated {
            name: "spin.gif".into(),
        };
        assert_eq!(format_outcome(&outcome), "Skipped (animated): spin.gif");
    }

    #[test]
    fn failed_line() {
        let outcome = Outcome::Failed {
            name: "bad.jpg".into(),
            error: "IO error: boom".into(),
        };
        assert_eq!(
            format_outcome(&outcome),
            "Failed to process bad.jpg: IO error: boom"
        );
    }

    #[test]
    fn summary_counts_each_kind() {
        let report = Report {
            outcomes: vec![
                saved("a.png", 1, 1),
                saved("b.png", 1, 1),
                Outcome::SkippedAnimated { name: "c.gif".into() },
                Outcome::Failed {
                    name: "d.jpg".into(),
                    error: "x".into(),
                },
            ],
        };
        assert_eq!(
            format_summary(&report),
            "Processed 4 files: 2 saved, 1 skipped, 1 failed"
        );
        assert_eq!(failed_names(&report), vec!["d.jpg"]);
    }

    #[test]
    fn summary_singular_file() {
        let report = Report {
            outcomes: vec![saved("a.png", 1, 1)],
        };
        assert_eq!(
            format_summary(&report),
            "Processed 1 file: 1 saved, 0 skipped, 0 failed"
        );
    }

    #[test]
    fn summary_empty_report() {
        assert_eq!(format_summary(&Report::default()), "No matching images found");
    }
}
