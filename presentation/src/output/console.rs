//! Console output formatter for comparison runs

use chorus_domain::{ComparisonRun, NO_MAJORITY_KEY, OutputFormat, RunStats, Verdict};
use colored::Colorize;

/// Formats comparison runs and statistics for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a run in the requested format
    pub fn render(run: &ComparisonRun, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_run(run),
            OutputFormat::Summary => Self::format_summary(run),
            OutputFormat::Json => Self::format_json(run),
        }
    }

    /// Format the complete run: every verdict with rationale and concerns
    pub fn format_run(run: &ComparisonRun) -> String {
        let mut output = String::new();

        let title = match run.id() {
            Some(id) => format!("Safety Comparison #{}", id),
            None => "Safety Comparison".to_string(),
        };
        output.push_str(&Self::header(&title));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Prompt:".cyan().bold(),
            run.query().prompt()
        ));
        if let Some(hint) = run.query().category_hint() {
            output.push_str(&format!("{} {}\n", "Category hint:".cyan().bold(), hint));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Submitted:".cyan().bold(),
            run.query().submitted_at().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&Self::section_header("Verdicts"));
        for verdict in run.verdicts() {
            output.push_str(&Self::verdict_block(verdict));
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::consensus_lines(run));

        output.push_str(&Self::footer());
        output
    }

    /// Consensus plus one line per provider
    pub fn format_summary(run: &ComparisonRun) -> String {
        let mut output = String::new();

        let id = run
            .id()
            .map(|id| format!(" #{}", id))
            .unwrap_or_default();
        output.push_str(&format!(
            "{}\n\n",
            format!("=== Safety Comparison{} ===", id).cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), run.query().prompt()));

        for verdict in run.verdicts() {
            output.push_str(&format!(
                "  {:<8} {}\n",
                verdict.provider().display_name(),
                Self::verdict_label(verdict)
            ));
        }
        output.push('\n');
        output.push_str(&Self::consensus_lines(run));
        output
    }

    /// Format as JSON
    pub fn format_json(run: &ComparisonRun) -> String {
        serde_json::to_string_pretty(run).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format aggregate statistics
    pub fn format_stats(stats: &RunStats) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Agreement Statistics"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Total runs:".cyan().bold(),
            stats.total_runs
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agreeing:".cyan().bold(),
            stats.agreeing_runs.to_string().green()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Disagreeing:".cyan().bold(),
            stats.disagreeing_runs().to_string().yellow()
        ));
        if stats.no_data_runs > 0 {
            output.push_str(&format!(
                "{} {}\n",
                "No data:".cyan().bold(),
                stats.no_data_runs.to_string().red()
            ));
        }
        output.push_str(&format!(
            "{} {:.1}%\n",
            "Agreement rate:".cyan().bold(),
            stats.agreement_rate() * 100.0
        ));

        if !stats.by_majority.is_empty() {
            output.push_str(&Self::section_header("By majority"));
            for (label, count) in &stats.by_majority {
                let label = if label == NO_MAJORITY_KEY {
                    "(none)"
                } else {
                    label.as_str()
                };
                output.push_str(&format!("  {:<10} {}\n", label, count));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// One line per run, most recent first as given
    pub fn format_run_list(runs: &[ComparisonRun]) -> String {
        if runs.is_empty() {
            return format!("{}\n", "No runs found.".dimmed());
        }

        let mut output = String::new();
        for run in runs {
            let id = run
                .id()
                .map(|id| format!("#{}", id))
                .unwrap_or_else(|| "-".to_string());
            let consensus = run.consensus();
            let status = match consensus.status_label() {
                "AGREEMENT" => consensus.status_label().green(),
                "NO_DATA" => consensus.status_label().red(),
                other => other.yellow(),
            };
            let majority = consensus
                .majority
                .map(|c| c.as_str())
                .unwrap_or(NO_MAJORITY_KEY);

            output.push_str(&format!(
                "{:>6}  {:<15} {:<9} {}\n",
                id.bold(),
                status,
                majority,
                Self::truncate(run.query().prompt(), 60)
            ));
            if let Some(category) = &consensus.category {
                output.push_str(&format!("        {} {}\n", "category:".dimmed(), category));
            }
        }
        output
    }

    fn verdict_block(verdict: &Verdict) -> String {
        let provider = verdict.provider();
        let title = format!("── {} ({}) ──", provider.display_name(), provider.vendor());
        let mut block = if verdict.is_voting() {
            format!("\n{}\n", title.yellow().bold())
        } else {
            format!("\n{}\n", title.red().bold())
        };

        block.push_str(&format!(
            "{} {}  {} {}ms\n",
            "Verdict:".bold(),
            Self::verdict_label(verdict),
            "Latency:".dimmed(),
            verdict.latency().as_millis()
        ));

        if let Some(error) = verdict.error() {
            block.push_str(&format!("{} {}\n", "Error:".red(), error));
        }
        if !verdict.rationale().is_empty() {
            block.push_str(&Self::indent(verdict.rationale(), "  "));
            block.push('\n');
        }
        if !verdict.concerns().is_empty() {
            block.push_str(&format!("{}\n", "Concerns:".bold()));
            for concern in verdict.concerns() {
                block.push_str(&format!("  * {}\n", concern));
            }
        }
        block
    }

    fn verdict_label(verdict: &Verdict) -> String {
        match verdict.classification() {
            Some(c) => match c {
                chorus_domain::Classification::Safe => c.as_str().green().to_string(),
                chorus_domain::Classification::Unsafe => c.as_str().red().to_string(),
                chorus_domain::Classification::Uncertain => c.as_str().yellow().to_string(),
            },
            None => verdict.outcome().as_str().red().dimmed().to_string(),
        }
    }

    fn consensus_lines(run: &ComparisonRun) -> String {
        let consensus = run.consensus();
        let mut output = String::new();

        let status = if consensus.agreement {
            consensus.status_label().green().bold()
        } else {
            consensus.status_label().yellow().bold()
        };
        output.push_str(&format!(
            "{} {}  ({} confidence, {} voting)\n",
            "Status:".cyan().bold(),
            status,
            consensus.confidence(),
            consensus.voters
        ));

        let majority = consensus
            .majority
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "none".to_string());
        output.push_str(&format!("{} {}\n", "Majority:".cyan().bold(), majority));

        let flagged = run.flagged_by();
        if !flagged.is_empty() {
            let names = flagged
                .iter()
                .map(|p| p.display_name())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("{} {}\n", "Flagged by:".cyan().bold(), names));
        }

        if !consensus.dissenters.is_empty() {
            let names = consensus
                .dissenters
                .iter()
                .map(|p| p.display_name())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("{} {}\n", "Dissenters:".yellow().bold(), names));
        }

        if let Some(category) = &consensus.category {
            output.push_str(&format!("{} {}\n", "Category:".cyan().bold(), category));
        }

        if run.all_failed() {
            output.push_str(&format!(
                "{}\n",
                "No provider returned a usable verdict.".red()
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        let line = text.lines().next().unwrap_or_default();
        if line.chars().count() > max_chars || text.lines().nth(1).is_some() {
            let cut: String = line.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            line.to_string()
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::{Classification, ProviderId, RunId, SafetyQuery};
    use std::time::Duration;

    fn split_run() -> ComparisonRun {
        colored::control::set_override(false);
        let query = SafetyQuery::new("How do I pick a lock?").unwrap();
        ComparisonRun::new(
            query,
            vec![
                Verdict::ok(
                    ProviderId::Claude,
                    Classification::Safe,
                    "Common hobby.",
                    Duration::from_millis(800),
                ),
                Verdict::ok(
                    ProviderId::Gpt,
                    Classification::Safe,
                    "Locksport is legal.",
                    Duration::from_millis(900),
                ),
                Verdict::ok(
                    ProviderId::Llama,
                    Classification::Unsafe,
                    "Could enable burglary.",
                    Duration::from_millis(1200),
                )
                .with_concerns(vec!["burglary".to_string()]),
            ],
        )
        .unwrap()
        .with_id(RunId(7))
    }

    #[test]
    fn test_full_format_lists_every_provider() {
        let out = ConsoleFormatter::format_run(&split_run());
        assert!(out.contains("Safety Comparison #7"));
        assert!(out.contains("Claude (Anthropic)"));
        assert!(out.contains("Llama (Together)"));
        assert!(out.contains("Could enable burglary."));
        assert!(out.contains("* burglary"));
        assert!(out.contains("REVIEW_REQUIRED"));
        assert!(out.contains("Dissenters: Llama"));
    }

    #[test]
    fn test_summary_shows_flagged_by() {
        let out = ConsoleFormatter::format_summary(&split_run());
        assert!(out.contains("Flagged by: Llama"));
        assert!(out.contains("Majority: SAFE"));
    }

    #[test]
    fn test_failed_verdict_shows_outcome() {
        colored::control::set_override(false);
        let query = SafetyQuery::new("hi").unwrap();
        let run = ComparisonRun::new(
            query,
            vec![Verdict::timeout(ProviderId::Gpt, Duration::from_secs(30))],
        )
        .unwrap();
        let out = ConsoleFormatter::format_summary(&run);
        assert!(out.contains("TIMEOUT"));
        assert!(out.contains("No provider returned a usable verdict."));
        assert!(out.contains("NO_DATA"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = ConsoleFormatter::render(&split_run(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["consensus"]["majority"], "SAFE");
    }

    #[test]
    fn test_stats_format() {
        colored::control::set_override(false);
        let mut stats = RunStats {
            total_runs: 4,
            agreeing_runs: 3,
            no_data_runs: 0,
            ..Default::default()
        };
        stats.by_majority.insert("SAFE".to_string(), 3);
        stats.by_majority.insert(NO_MAJORITY_KEY.to_string(), 1);

        let out = ConsoleFormatter::format_stats(&stats);
        assert!(out.contains("Total runs: 4"));
        assert!(out.contains("Agreement rate: 75.0%"));
        assert!(out.contains("(none)"));
        assert!(!out.contains("No data:"));
    }

    #[test]
    fn test_run_list() {
        colored::control::set_override(false);
        assert!(ConsoleFormatter::format_run_list(&[]).contains("No runs found."));

        let out = ConsoleFormatter::format_run_list(&[split_run()]);
        assert!(out.contains("#7"));
        assert!(out.contains("How do I pick a lock?"));
    }

    #[test]
    fn test_truncate_multiline() {
        assert_eq!(ConsoleFormatter::truncate("short", 10), "short");
        assert_eq!(ConsoleFormatter::truncate("abcdefghij", 4), "abcd...");
        assert_eq!(ConsoleFormatter::truncate("line one\nline two", 20), "line one...");
    }
}
