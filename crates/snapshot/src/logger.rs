use core::fmt;
use std::time::Instant;

use log::{debug, warn};

/// Per-session diagnostic sink. Every line is prefixed with the session id and the time
/// elapsed since the logger was created. Disabled loggers drop everything.
#[derive(Debug)]
pub struct Logger {
    id: String,
    enabled: bool,
    start: Instant,
}

impl Logger {
    #[must_use]
    pub fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
            start: Instant::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            debug!(target: "snapshot", "{} {}ms {args}", self.id, self.elapsed_ms());
        }
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            warn!(target: "snapshot", "{} {}ms {args}", self.id, self.elapsed_ms());
        }
    }
}
