use log::{log_enabled, warn, Level};
use std::collections::HashSet;
use std::time::Instant;

/// Simple scoped timer for profiling the passes of a fixed tick.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Option<Instant>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        let start = if log_enabled!(Level::Trace) {
            log::trace!("⏱️ start {label}");
            Some(Instant::now())
        } else {
            None
        };
        Self { label, start }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            log::trace!("⏱️ end {} ({} µs)", self.label, start.elapsed().as_micros());
        }
    }
}

/// Latch that lets each (component, condition) pair warn only once.
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: HashSet<String>,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `message` at warn level the first time `key` is seen. Returns whether it logged.
    pub fn warn(&mut self, key: impl Into<String>, message: impl AsRef<str>) -> bool {
        if self.seen.insert(key.into()) {
            warn!("{}", message.as_ref());
            true
        } else {
            false
        }
    }

    pub fn has_warned(&self, key: &str) -> bool {
        self.seen.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_once_per_key() {
        let mut latch = WarnOnce::new();
        assert!(latch.warn("source:0:volume", "no influence volume"));
        assert!(!latch.warn("source:0:volume", "no influence volume"));
        assert!(latch.warn("source:1:volume", "no influence volume"));
        assert!(latch.has_warned("source:0:volume"));
    }
}
