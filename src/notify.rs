use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: Level,
    pub message: String,
    pub created: Instant,
}

/// Short-lived user notifications, newest last.
#[derive(Debug, Default)]
pub struct Toasts {
    queue: VecDeque<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_at(&mut self, level: Level, message: impl Into<String>, now: Instant) {
        if self.queue.len() == MAX_TOASTS {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            level,
            message: message.into(),
            created: now,
        });
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Drops every toast older than [`TOAST_LIFETIME`].
    pub fn prune(&mut self, now: Instant) {
        self.queue
            .retain(|t| now.saturating_duration_since(t.created) < TOAST_LIFETIME);
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_toasts_are_pruned() {
        let start = Instant::now();
        let mut toasts = Toasts::new();
        toasts.push_at(Level::Info, "old", start);
        toasts.push_at(Level::Success, "new", start + Duration::from_secs(2));

        toasts.prune(start + Duration::from_millis(3500));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().unwrap().message, "new");

        toasts.prune(start + Duration::from_secs(10));
        assert!(toasts.is_empty());
    }

    #[test]
    fn queue_is_bounded() {
        let mut toasts = Toasts::new();
        for i in 0..8 {
            toasts.error(format!("e{i}"));
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
        assert_eq!(toasts.latest().unwrap().message, "e7");
        assert_eq!(toasts.latest().unwrap().level, Level::Error);
    }
}
