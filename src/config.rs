use std::fs;
use std::path::Path;

use error_stack::{ensure, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::polyline_io::{InputFormat, LineSelector};

/// Tolerance used when none is configured, in input coordinate units.
pub const DEFAULT_EPSILON: f64 = 50.0;

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

/// Settings for one simplification run.
///
/// Every field may be omitted from a config file; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplifyConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    pub feature: usize,
    pub path: usize,
    pub format: Option<InputFormat>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig {
            epsilon: DEFAULT_EPSILON,
            feature: 0,
            path: 0,
            format: None,
        }
    }
}

impl SimplifyConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimplifyConfig =
            serde_json::from_str(text).change_context(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .change_context(ConfigError::Io)
            .attach_printable_lazy(|| format!("file: {}", path.display()))?;
        Self::from_json(&text).attach_printable_lazy(|| format!("file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.epsilon.is_finite() && self.epsilon >= 0.0,
            ConfigError::Invalid
        );
        Ok(())
    }

    pub fn selector(&self) -> LineSelector {
        LineSelector {
            feature: self.feature,
            path: self.path,
        }
    }
}
