//! Progress reporting while providers are queried

use chorus_application::ports::progress::ProgressNotifier;
use chorus_domain::{ProviderId, Verdict};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports dispatch progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn dispatch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn status_line(verdict: &Verdict) -> String {
        let provider = verdict.provider().display_name();
        match verdict.classification() {
            Some(classification) => format!("{} {} {}", "v".green(), provider, classification),
            None => format!("{} {} {}", "x".red(), provider, verdict.outcome()),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_dispatch_start(&self, providers: &[ProviderId]) {
        let pb = ProgressBar::new(providers.len() as u64);
        pb.set_style(Self::dispatch_style());
        pb.set_prefix("Querying providers");
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_provider_complete(&self, verdict: &Verdict) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::status_line(verdict));
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_dispatch_start(&self, providers: &[ProviderId]) {
        let names = providers
            .iter()
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        eprintln!("{} {} ({})", "->".cyan(), "Querying".bold(), names);
    }

    fn on_provider_complete(&self, verdict: &Verdict) {
        eprintln!("  {}", ProgressReporter::status_line(verdict));
    }

    fn on_dispatch_complete(&self) {
        eprintln!();
    }
}
