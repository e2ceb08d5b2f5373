use std::io::{self, Write};
use std::time::Instant;

/// Timestamped stderr log lines for a run. Disabled instances swallow everything, which is what
/// library callers and tests get by default.
#[derive(Clone, Debug)]
pub struct ConsoleProgress {
    enabled: bool,
    max_chars: usize,
    t0: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            max_chars: 240,
            t0: Instant::now(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Cap for model text echoed into log lines.
    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(16);
        self
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.line("", msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.line("WARN ", msg.as_ref());
    }

    pub fn progress(&self, label: &str, current: usize, total: usize) {
        if !self.enabled {
            return;
        }
        let total = total.max(1);
        let current = current.min(total);
        let pct = (current as f64 / total as f64) * 100.0;
        self.line("", &format!("{label} {current}/{total} ({pct:5.1}%)"));
    }

    /// Single-line head of `text`, at most `max_chars` characters.
    #[must_use]
    pub fn clip(&self, text: &str) -> String {
        let flat: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let flat = flat.trim();
        if flat.chars().count() <= self.max_chars {
            return flat.to_string();
        }
        let head: String = flat.chars().take(self.max_chars).collect();
        format!("{head}…")
    }

    fn line(&self, level: &str, msg: &str) {
        if !self.enabled {
            return;
        }
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{ts}] {level}{msg}");
    }
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
