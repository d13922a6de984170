//! Snapshot options and their environment overrides.
//!
//! Programmatic callers build [`Options`] directly; hosts that want the process
//! environment to decide resource policy and logging start from [`Options::from_env`].

use std::env;

use crate::cloner::CloneOptions;
use crate::context::{ContextOptions, ResourceOptions};

/// Settings that can come from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub resources: ResourceOptions,
    pub logging: bool,
    pub cache: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            resources: ResourceOptions::default(),
            logging: true,
            cache: true,
        }
    }
}

fn flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl SnapshotConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SNAPSHOT_LOGGING`: "0" disables session logging (default: enabled)
    /// - `SNAPSHOT_IMAGE_TIMEOUT_MS`: image timeout passed to the loader (default: 15000)
    /// - `SNAPSHOT_USE_CORS`: "1" to request images with CORS (default: disabled)
    /// - `SNAPSHOT_ALLOW_TAINT`: "1" to allow cross-origin images to taint (default: disabled)
    /// - `SNAPSHOT_PROXY`: proxy URL for cross-origin images (default: none)
    /// - `SNAPSHOT_CACHE`: "0" disables the resource cache (default: enabled)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let image_timeout = env::var("SNAPSHOT_IMAGE_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(defaults.resources.image_timeout);
        let proxy = env::var("SNAPSHOT_PROXY")
            .ok()
            .filter(|val| !val.trim().is_empty());
        Self {
            resources: ResourceOptions {
                allow_taint: flag("SNAPSHOT_ALLOW_TAINT").unwrap_or(defaults.resources.allow_taint),
                image_timeout,
                proxy,
                use_cors: flag("SNAPSHOT_USE_CORS").unwrap_or(defaults.resources.use_cors),
            },
            logging: flag("SNAPSHOT_LOGGING").unwrap_or(defaults.logging),
            cache: flag("SNAPSHOT_CACHE").unwrap_or(defaults.cache),
        }
    }
}

/// Viewport overrides. `None` falls back to the owning window's values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowOptions {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub scroll_x: Option<f32>,
    pub scroll_y: Option<f32>,
}

/// Everything [`crate::render_element`] accepts.
#[derive(Clone, Debug)]
pub struct Options {
    pub config: SnapshotConfig,
    pub window: WindowOptions,
    /// Detach the sandbox once the render tree is built.
    pub remove_container: bool,
    pub clone: CloneOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(SnapshotConfig::default())
    }
}

impl Options {
    #[must_use]
    pub fn from_config(config: SnapshotConfig) -> Self {
        Self {
            config,
            window: WindowOptions::default(),
            remove_container: true,
            clone: CloneOptions::default(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_config(SnapshotConfig::from_env())
    }

    #[must_use]
    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            resources: self.config.resources.clone(),
            logging: self.config.logging,
            cache: self.config.cache,
        }
    }
}
