//! Shortfall reporting sinks.

use tracing::warn;

/// Receives a human-readable line when a run ends with fewer configurations
/// than requested. Purely informational.
pub trait ShortfallReporter {
    /// Records one report line.
    fn report(&mut self, line: &str);
}

/// Forwards reports to the `tracing` pipeline at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ShortfallReporter for TracingReporter {
    fn report(&mut self, line: &str) {
        warn!("{}", line);
    }
}

/// Keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    lines: Vec<String>,
}

impl CollectingReporter {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines reported so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl ShortfallReporter for CollectingReporter {
    fn report(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl<T: ShortfallReporter + ?Sized> ShortfallReporter for &mut T {
    fn report(&mut self, line: &str) {
        (**self).report(line)
    }
}
