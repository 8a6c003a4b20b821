//! Runtime configuration: worker count, spin/sleep thresholds, and register
//! file sizing.
//!
//! Loading hierarchy is env > file > defaults, the same order
//! `knhk-config` uses. Unlike `knhk-config`'s hand-rolled `KNHK_*` parsing,
//! this crate leans on the `config` crate's `Environment` source directly —
//! there's no nested connector/epoch maps here, just a flat handful of
//! scalars, so a builder pipeline is less code than reimplementing the
//! merge logic.

use serde::Deserialize;

use crate::time::{Interval, SECOND};

/// Environment variable prefix: `PRETVM_WORKER_COUNT`, `PRETVM_SPIN_THRESHOLD_NS`, ...
const ENV_PREFIX: &str = "PRETVM";

/// VM-wide configuration, independent of any particular schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Number of worker threads to spawn. Defaults to the platform's core
    /// count when left at `0` (see [`VmConfig::resolve_worker_count`]).
    pub worker_count: usize,

    /// Number of general-purpose counter registers reserved above the
    /// fixed control registers, for schedules that use `WU`/`WLT`
    /// rendezvous on dedicated counters.
    pub counter_count: usize,

    /// How long `DU` busy-spins on a near-future deadline before falling
    /// back to [`crate::platform::Platform::sleep_until`]. Mirrors
    /// `SPIN_WAIT_THRESHOLD` in the original scheduler's `inst_lib.c`.
    #[serde(deserialize_with = "deserialize_interval")]
    pub spin_wait_threshold: Interval,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            counter_count: 8,
            spin_wait_threshold: SECOND,
        }
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Interval, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer)
}

impl VmConfig {
    /// Load configuration, merging (in increasing priority):
    /// 1. [`VmConfig::default`]
    /// 2. a TOML file at `path`, if it exists
    /// 3. `PRETVM_*` environment variables
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::VmError> {
        let mut builder = config::Config::builder()
            .set_default("worker_count", 0i64)
            .map_err(config_err)?
            .set_default("counter_count", 8i64)
            .map_err(config_err)?
            .set_default("spin_wait_threshold", SECOND)
            .map_err(config_err)?;

        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        let built = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(config_err)?;

        built.try_deserialize().map_err(config_err)
    }

    /// Resolve `worker_count`, falling back to the platform's core count
    /// when unset (`0`).
    pub fn resolve_worker_count(&self, platform: &dyn crate::platform::Platform) -> usize {
        if self.worker_count == 0 {
            platform.num_cores()
        } else {
            self.worker_count
        }
    }
}

fn config_err(e: impl std::fmt::Display) -> crate::error::VmError {
    crate::error::VmError::PlatformInit(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_worker_count_unresolved() {
        let config = VmConfig::default();
        assert_eq!(config.worker_count, 0);
        assert_eq!(config.counter_count, 8);
        assert_eq!(config.spin_wait_threshold, SECOND);
    }

    #[test]
    fn resolve_worker_count_falls_back_to_platform_cores() {
        struct FixedCores(usize);
        impl crate::platform::Platform for FixedCores {
            fn now(&self) -> crate::time::Instant {
                0
            }
            fn sleep(&self, _duration: Interval) {}
            fn sleep_until(&self, _deadline: crate::time::Instant) {}
            fn num_cores(&self) -> usize {
                self.0
            }
        }

        let config = VmConfig::default();
        let platform = FixedCores(6);
        assert_eq!(config.resolve_worker_count(&platform), 6);

        let explicit = VmConfig {
            worker_count: 2,
            ..VmConfig::default()
        };
        assert_eq!(explicit.resolve_worker_count(&platform), 2);
    }

    #[test]
    fn load_without_a_file_uses_defaults() {
        let config = VmConfig::load(None).expect("load should succeed with no file");
        assert_eq!(config.counter_count, 8);
    }

    #[test]
    fn load_merges_toml_file_over_defaults() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "worker_count = 4\ncounter_count = 16").unwrap();

        let config = VmConfig::load(Some(file.path())).expect("load should succeed with a file");
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.counter_count, 16);
        // Untouched by the file, still the default.
        assert_eq!(config.spin_wait_threshold, SECOND);
    }

    #[test]
    fn load_ignores_a_missing_file_path() {
        let missing = std::path::Path::new("/nonexistent/pretvm-config.toml");
        let config = VmConfig::load(Some(missing)).expect("missing file path should not error");
        assert_eq!(config.worker_count, 0);
    }
}
