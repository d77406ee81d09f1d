//! Persistent settings and logging setup.
//!
//! Settings are read from the file named by `HYDRA_SCENE_CONFIG`, else from
//! `<config dir>/hydra-scene/settings.json`, else defaults apply. Missing
//! fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scene::{compute_scene_index_diff_delta, compute_scene_index_diff_root, SceneIndexDiffFn};
use crate::tracker::PerfLog;
use crate::util::{Error, Result};

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "HYDRA_SCENE_CONFIG";

/// How a switching scene index reports an input change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStrategy {
    /// Remove everything, re-add the new input.
    #[default]
    Root,
    /// Walk both scenes and report only the differences.
    Delta,
}

impl DiffStrategy {
    pub fn diff_fn(self) -> SceneIndexDiffFn {
        match self {
            DiffStrategy::Root => Box::new(compute_scene_index_diff_root),
            DiffStrategy::Delta => Box::new(compute_scene_index_diff_delta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directives, e.g. `"hydra_scene=debug"`.
    pub log_filter: String,
    pub perf_log_enabled: bool,
    pub diff_strategy: DiffStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            perf_log_enabled: false,
            diff_strategy: DiffStrategy::Root,
        }
    }
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("hydra-scene");
            p.push("settings.json");
            p
        })
    }

    /// Load from the configured location, falling back to defaults.
    ///
    /// An unreadable or malformed file is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);
        match path {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Install logging with this filter and toggle the perf log.
    pub fn apply(&self) {
        init_logging(&self.log_filter);
        let perf = PerfLog::instance();
        if self.perf_log_enabled {
            perf.enable();
        } else {
            perf.disable();
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Later calls are no-ops.
pub fn init_logging(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
