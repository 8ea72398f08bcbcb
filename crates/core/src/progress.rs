//! Progress extraction from training service logs.
//!
//! The training service streams free-form log text. Progress lines look
//! like `flux_train_replicate: 37%|...` and appear many times over a run;
//! the most recent line wins.

use std::sync::OnceLock;

use regex::Regex;

/// Marker line pattern: trainer tag followed by an integer percentage.
const PROGRESS_PATTERN: &str = r"flux_train_replicate:\s*(\d+)%";

fn progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PROGRESS_PATTERN).expect("progress pattern must compile"))
}

/// Extract the current progress percentage from raw training logs.
///
/// Scans lines from the end and returns the last percentage emitted.
/// A succeeded run always reports 100 regardless of log content; logs
/// with no marker report 0.
pub fn extract_progress_percent(logs: &str, succeeded: bool) -> i16 {
    if succeeded {
        return 100;
    }

    for line in logs.lines().rev() {
        if let Some(captures) = progress_regex().captures(line) {
            if let Ok(value) = captures[1].parse::<i16>() {
                return value.min(100);
            }
        }
    }

    0
}
