//! Utility functions for no-push-oops
//!
//! Small helpers shared by the runner and the CLI.

use std::time::Duration;

/// Format a duration the way progress lines show it: `850ms`, `12s`, `3m 5s`
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        return format!("{ms}ms");
    }

    let seconds = ms / 1000;
    if seconds < 60 {
        return format!("{seconds}s");
    }

    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Get the default shell program used to interpret commands
pub fn get_default_shell() -> &'static str {
    if cfg!(windows) { "cmd" } else { "sh" }
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}
