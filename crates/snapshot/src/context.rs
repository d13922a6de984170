//! Per-session configuration and dependency holder.

use core::sync::atomic::{AtomicU64, Ordering};

use dom::Bounds;
use serde::Serialize;

use crate::logger::Logger;

/// Policy handed untouched to the resource loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceOptions {
    pub allow_taint: bool,
    /// Milliseconds before an image load is abandoned.
    pub image_timeout: u64,
    pub proxy: Option<String>,
    pub use_cors: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            allow_taint: false,
            image_timeout: 15_000,
            proxy: None,
            use_cors: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextOptions {
    pub resources: ResourceOptions,
    pub logging: bool,
    pub cache: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            resources: ResourceOptions::default(),
            logging: true,
            cache: true,
        }
    }
}

/// Monotonic source of session ids.
#[derive(Debug)]
pub struct SessionIds {
    next: AtomicU64,
}

impl SessionIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SessionIds {
    fn default() -> Self {
        Self::new()
    }
}

static SESSION_IDS: SessionIds = SessionIds::new();

/// State shared by every stage of one snapshot request. Immutable once built.
#[derive(Debug)]
pub struct Context {
    session_id: u64,
    pub logger: Logger,
    pub resources: ResourceOptions,
    pub cache_enabled: bool,
    pub window_bounds: Bounds,
}

impl Context {
    /// Build a context with the next process-wide session id.
    #[must_use]
    pub fn new(options: &ContextOptions, window_bounds: Bounds) -> Self {
        Self::with_session(SESSION_IDS.next_id(), options, window_bounds)
    }

    /// Build a context for a caller-allocated session id.
    #[must_use]
    pub fn with_session(session_id: u64, options: &ContextOptions, window_bounds: Bounds) -> Self {
        Self {
            session_id,
            logger: Logger::new(format!("#{session_id}"), options.logging),
            resources: options.resources.clone(),
            cache_enabled: options.cache,
            window_bounds,
        }
    }

    #[inline]
    #[must_use]
    pub const fn session_id(&self) -> u64 {
        self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_and_increasing() {
        let ids = SessionIds::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn global_contexts_never_share_an_id() {
        let options = ContextOptions::default();
        let first = Context::new(&options, Bounds::EMPTY);
        let second = Context::new(&options, Bounds::EMPTY);
        assert!(second.session_id() > first.session_id());
        assert_eq!(second.logger.id(), format!("#{}", second.session_id()));
    }

    #[test]
    fn explicit_session_keeps_options() {
        let options = ContextOptions {
            resources: ResourceOptions {
                proxy: Some("https://proxy.test".to_owned()),
                ..ResourceOptions::default()
            },
            logging: false,
            cache: false,
        };
        let bounds = Bounds::new(0.0, 120.0, 1024.0, 768.0);
        let context = Context::with_session(42, &options, bounds);
        assert_eq!(context.session_id(), 42);
        assert_eq!(context.logger.id(), "#42");
        assert!(!context.logger.enabled());
        assert!(!context.cache_enabled);
        assert_eq!(context.resources.image_timeout, 15_000);
        assert_eq!(context.window_bounds, bounds);
    }
}
