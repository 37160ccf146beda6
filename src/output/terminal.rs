//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{AnalysisOutcome, AnalysisResult};

/// Format an analysis outcome for human-readable terminal output.
///
/// One line per headline number, colored by what it means: green for no
/// violation evidence, red for a significant violation.
pub fn format_outcome(outcome: &AnalysisOutcome, dataset: &str) -> String {
    match outcome {
        AnalysisOutcome::Completed(result) => format_result(result, dataset),
        AnalysisOutcome::Indeterminate(reason) => {
            format!(
                "{} {} — {}\n",
                "\u{2013}".dimmed(),
                format!("{}: no result", dataset).yellow().bold(),
                reason.description()
            )
        }
    }
}

fn format_result(result: &AnalysisResult, dataset: &str) -> String {
    let mut output = String::new();

    let violated = result.stats.max > 0.0;
    let header = if violated {
        format!(
            "{} {}",
            "\u{26A0}".yellow().bold(),
            format!("{}: race model violated", dataset).red().bold()
        )
    } else {
        format!(
            "{} {}",
            "\u{2713}".green().bold(),
            format!("{}: no violation", dataset).green().bold()
        )
    };
    output.push_str(&header);
    output.push('\n');

    let summary_line = if result.curves.window_is_empty {
        "Windowed mean violation: undefined (empty percentile window)"
            .yellow()
            .to_string()
    } else {
        format!("Windowed mean violation: {:.4}", result.curves.summary)
    };
    output.push_str(&format!("  {}\n", summary_line));

    output.push_str(&format!(
        "  Maximum: {:.3} | Mean: {:.3} | Total: {:.3} | Violations: {:.1}%\n",
        result.stats.max, result.stats.mean, result.stats.total, result.stats.percent_positive
    ));

    output.push_str(&format!(
        "  Participants: {} | Grid: {:.0}-{:.0} ms\n",
        result.curves.participants_used,
        result.curves.grid.min(),
        result.curves.grid.max()
    ));

    if let Some(perm) = &result.permutation {
        let perm_line = format!(
            "Permutation test: p = {:.4} ({} reshuffles)",
            perm.p_value,
            perm.null_distribution.len()
        );
        let colored_line = if perm.significant {
            format!("{} {}", perm_line.red(), "significant".red().bold())
        } else {
            format!(
                "{} {}",
                perm_line.green(),
                format!("not significant at \u{03B1} = {}", perm.alpha).green()
            )
        };
        output.push_str(&format!("  {}\n", colored_line));
    }

    output
}
