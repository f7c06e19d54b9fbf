//! Simulation configuration
//!
//! Loaded from a TOML file. Every section and key is optional; missing
//! values take the section's `Default`. A typical file:
//!
//! ```toml
//! [preset]
//! source = "firewall"
//!
//! [simulation]
//! size = 20
//! steps = 30
//! seed = 7
//! rules = ["DecreaseWhenFireRule", "VegetationToHotRule", "CellOnFireRule"]
//! visualizers = ["CellStateVisualizer"]
//!
//! [rule]
//! rule_approach = "stochastic"
//! pb = 0.3
//!
//! [visualizer.CellStateVisualizer]
//! scaling = 10
//! ```

use crate::error::SimError;
use crate::rules::{DecreaseWhenBurning, IgnitionParams, IgnitionRule};
use crate::visual::CellStateVisualizer;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: DebugConfig,
    pub preset: PresetConfig,
    pub simulation: SimulationConfig,
    /// Ignition rule parameters
    pub rule: IgnitionParams,
    pub output: OutputConfig,
    /// Per-visualizer settings, keyed by visualizer name
    pub visualizer: FxHashMap<String, SinkConfig>,
}

/// `[debug]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"fire_ca_core=debug"`
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
        }
    }
}

/// `[preset]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Preset name: `random`, `firewall` or `spark`
    pub source: String,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            source: "random".to_owned(),
        }
    }
}

/// `[simulation]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fallback for `width` and `height`
    pub size: usize,
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// Number of ticks to run
    pub steps: usize,
    /// Seed for presets and stochastic rules; drawn at startup when absent
    pub seed: Option<u64>,
    /// Neighborhood name; falls back to `NeumannNeighborhood`
    pub neighborhood: Option<String>,
    /// Rule names in application order
    pub rules: Vec<String>,
    /// Visualizer names in notification order
    pub visualizers: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: 10,
            width: None,
            height: None,
            steps: 1,
            seed: None,
            neighborhood: None,
            rules: vec![
                DecreaseWhenBurning::NAME.to_owned(),
                IgnitionRule::NAME.to_owned(),
            ],
            visualizers: vec![CellStateVisualizer::NAME.to_owned()],
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory every visualizer writes below
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out/"),
        }
    }
}

/// `[visualizer.<Name>]`; unset keys use the visualizer's own defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Subdirectory below `output.directory`
    pub directory: Option<String>,
    /// Per-frame file name pattern, `%03d` style
    pub pattern: Option<String>,
    /// Single output file name
    pub name: Option<String>,
    /// Pixels per cell edge
    pub scaling: Option<u32>,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, SimError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.simulation.width.unwrap_or(self.simulation.size)
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.simulation.height.unwrap_or(self.simulation.size)
    }

    /// Settings for the visualizer called `name` (all unset if absent)
    #[must_use]
    pub fn sink(&self, name: &str) -> SinkConfig {
        self.visualizer.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.width(), 10);
        assert_eq!(config.height(), 10);
        assert_eq!(config.simulation.steps, 1);
        assert_eq!(config.preset.source, "random");
        assert_eq!(config.output.directory, PathBuf::from("out/"));
        assert_eq!(config.rule.rule_approach, "general");
        assert_eq!(config.rule.threshold_sum, 8.0);
    }

    #[test]
    fn test_default_run_has_rules_and_a_sink() {
        let simulation = Config::default().simulation;
        assert_eq!(simulation.rules, vec!["DecreaseWhenFireRule", "CellOnFireRule"]);
        assert_eq!(simulation.visualizers, vec!["CellStateVisualizer"]);
        assert_eq!(simulation.seed, None);
        assert_eq!(simulation.neighborhood, None);
    }

    #[test]
    fn test_listed_rules_replace_the_defaults() {
        let config = Config::from_toml_str("[simulation]\nrules = []\nvisualizers = []").unwrap();
        assert!(config.simulation.rules.is_empty());
        assert!(config.simulation.visualizers.is_empty());
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml_str(
            r#"
            [debug]
            log_level = "debug"

            [preset]
            source = "firewall"

            [simulation]
            size = 12
            height = 8
            steps = 30
            seed = 7
            neighborhood = "ExtendedNeumannNeighborhood"
            rules = ["DecreaseWhenFireRule", "CellOnFireRule"]
            visualizers = ["CellStateVisualizer", "HeatPlotVisualizer"]

            [rule]
            rule_approach = "stochastic"
            pb = 0.3

            [output]
            directory = "results"

            [visualizer.CellStateVisualizer]
            scaling = 4
            pattern = "frame-%04d.ppm"
            "#,
        )
        .unwrap();

        assert_eq!(config.debug.log_level, "debug");
        assert_eq!(config.preset.source, "firewall");
        assert_eq!((config.width(), config.height()), (12, 8));
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(
            config.simulation.neighborhood.as_deref(),
            Some("ExtendedNeumannNeighborhood")
        );
        assert_eq!(config.simulation.rules.len(), 2);
        assert_eq!(config.rule.rule_approach, "stochastic");
        assert_eq!(config.rule.pb, 0.3);
        // Untouched rule parameters keep their defaults
        assert_eq!(config.rule.po, 0.10);
        assert_eq!(config.output.directory, PathBuf::from("results"));

        let sink = config.sink("CellStateVisualizer");
        assert_eq!(sink.scaling, Some(4));
        assert_eq!(sink.pattern.as_deref(), Some("frame-%04d.ppm"));
        assert_eq!(config.sink("FullVisualizer"), SinkConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml_str("[simulation]\nsteps = \"many\"").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/fire-ca/sim.toml").unwrap_err();
        assert!(matches!(err, SimError::ConfigRead { .. }));
    }
}
