//! Progress reporting for backend requests

use colored::Colorize;
use council_application::SessionProgress;
use council_domain::RequestSlot;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One spinner per in-flight request slot
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<RequestSlot, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn slot_display_name(slot: RequestSlot) -> &'static str {
        match slot {
            RequestSlot::Perspectives => "Loading perspectives",
            RequestSlot::Providers => "Checking providers",
            RequestSlot::Models => "Fetching models",
            RequestSlot::Answer => "Generating answer",
            RequestSlot::Conclusion => "Synthesizing conclusion",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProgress for ProgressReporter {
    fn on_request_start(&self, slot: RequestSlot, detail: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(Self::slot_display_name(slot));
        pb.set_message(detail.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        let previous = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, pb);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn on_request_complete(&self, slot: RequestSlot, success: bool) {
        let bar = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&slot);
        if let Some(pb) = bar {
            let status = if success { "done".green() } else { "failed".red() };
            pb.finish_with_message(status.to_string());
        }
    }
}

/// Plain line-per-event progress (no spinners)
pub struct SimpleProgress;

impl SessionProgress for SimpleProgress {
    fn on_request_start(&self, slot: RequestSlot, detail: &str) {
        let name = ProgressReporter::slot_display_name(slot);
        if detail.is_empty() {
            eprintln!("{} {}", "->".cyan(), name.bold());
        } else {
            eprintln!("{} {} ({})", "->".cyan(), name.bold(), detail);
        }
    }

    fn on_request_complete(&self, slot: RequestSlot, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), slot);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), slot);
        }
    }
}
