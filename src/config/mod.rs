// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for photoscore.
//!
//! A request file bundles the upstream parameter vector, optional image
//! descriptors, the planning strategy and composer settings. Request files
//! are YAML, or TOML when the path ends in `.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::params::{ImageFeatures, MusicParameters};
use crate::rng::DEFAULT_SEED;

/// Coarsest resolution the note release gaps are laid out for
pub const MIN_PPQN: u32 = 96;
/// Largest resolution the file header can express as ticks per quarter
pub const MAX_PPQN: u32 = 0x7FFF;

/// Settings for the composer and score timing.
///
/// Bars are always four beats long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Ticks per quarter note
    #[serde(default = "default_ppqn")]
    pub ppqn: u32,
    /// Maximum velocity variation either way
    #[serde(default = "default_humanize_velocity")]
    pub humanize_velocity: u8,
    /// Maximum timing variation either way, in ticks
    #[serde(default = "default_humanize_timing")]
    pub humanize_timing: u64,
    /// Seed for humanization and melodic variation
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_ppqn() -> u32 {
    480
}
fn default_humanize_velocity() -> u8 {
    5
}
fn default_humanize_timing() -> u64 {
    8
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            ppqn: default_ppqn(),
            humanize_velocity: default_humanize_velocity(),
            humanize_timing: default_humanize_timing(),
            seed: default_seed(),
        }
    }
}

impl ComposerConfig {
    /// Copy with timing fields the composer can render.
    ///
    /// A zero resolution takes the default, others are clamped to
    /// [`MIN_PPQN`, `MAX_PPQN`]. Timing spread is capped at a thirty-second note.
    pub fn sanitized(&self) -> Self {
        let ppqn = if self.ppqn == 0 {
            default_ppqn()
        } else {
            self.ppqn.clamp(MIN_PPQN, MAX_PPQN)
        };
        Self {
            ppqn,
            humanize_timing: self.humanize_timing.min(ppqn as u64 / 8),
            ..self.clone()
        }
    }
}

/// How a request is turned into a song plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Pick a genre and plan from its template
    #[default]
    Template,
    /// Plan from energy and mood thresholds alone
    Heuristic,
}

/// One composition request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFile {
    #[serde(default)]
    pub params: MusicParameters,
    /// Image descriptors; neutral values when absent
    #[serde(default)]
    pub features: Option<ImageFeatures>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Genre name overriding automatic selection
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub composer: Option<ComposerConfig>,
}

impl RequestFile {
    /// Load a request, choosing the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {:?}", path))?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a request from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML request")
    }

    /// Parse a request from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Failed to parse TOML request")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize request to YAML")
    }

    /// Image descriptors, or neutral ones
    pub fn features(&self) -> ImageFeatures {
        self.features.unwrap_or_default()
    }

    /// Composer settings, or the defaults
    pub fn composer(&self) -> ComposerConfig {
        self.composer.clone().unwrap_or_default().sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::ScaleType;
    use crate::params::PatternType;

    #[test]
    fn test_parse_yaml_request() {
        let yaml = r#"
params:
  tempo_bpm: 128
  base_frequency: 440.0
  energy: 0.8
  brightness: 0.7
  scale_type: dorian
  pattern_type: chords
features:
  hue: 0.05
  saturation: 0.6
strategy: template
genre: drop
composer:
  seed: 7
"#;

        let request = RequestFile::from_yaml(yaml).unwrap();
        assert_eq!(request.params.tempo_bpm, 128.0);
        assert_eq!(request.params.scale_type, ScaleType::Dorian);
        assert_eq!(request.params.pattern_type, PatternType::Chords);
        assert_eq!(request.genre.as_deref(), Some("drop"));

        let features = request.features();
        assert_eq!(features.hue, 0.05);
        assert_eq!(features.brightness, 0.5);

        let composer = request.composer();
        assert_eq!(composer.seed, 7);
        assert_eq!(composer.ppqn, 480);
    }

    #[test]
    fn test_parse_toml_request() {
        let toml_str = r#"
strategy = "heuristic"

[params]
tempo_bpm = 72.0
energy = 0.2
scale_type = "minor"

[composer]
humanize_timing = 0
"#;

        let request = RequestFile::from_toml(toml_str).unwrap();
        assert_eq!(request.strategy, Strategy::Heuristic);
        assert_eq!(request.params.energy, 0.2);
        assert_eq!(request.params.base_frequency, 261.63);
        assert!(request.features.is_none());
        assert_eq!(request.composer().humanize_timing, 0);
        assert_eq!(request.composer().humanize_velocity, 5);
    }

    #[test]
    fn test_default_values() {
        let request = RequestFile::from_yaml("{}").unwrap();
        assert_eq!(request.strategy, Strategy::Template);
        assert_eq!(request.params, MusicParameters::default());
        assert_eq!(request.features(), ImageFeatures::default());
        assert_eq!(request.composer(), ComposerConfig::default());
    }

    #[test]
    fn test_zero_timing_sanitized() {
        let config = ComposerConfig {
            ppqn: 0,
            ..Default::default()
        };
        let fixed = config.sanitized();
        assert_eq!(fixed.ppqn, 480);
        assert_eq!(fixed.humanize_timing, 8);
    }

    #[test]
    fn test_extreme_timing_clamped() {
        let coarse = ComposerConfig {
            ppqn: 8,
            humanize_timing: 500,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(coarse.ppqn, MIN_PPQN);
        assert_eq!(coarse.humanize_timing, 12);

        let fine = ComposerConfig {
            ppqn: 1_000_000,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(fine.ppqn, MAX_PPQN);
        assert_eq!(fine.humanize_timing, 8);
    }

    #[test]
    fn test_legacy_bar_length_ignored() {
        let request = RequestFile::from_yaml("composer:\n  beats_per_bar: 2\n  ppqn: 8\n").unwrap();
        assert_eq!(request.composer.as_ref().map(|c| c.ppqn), Some(8));
        assert_eq!(request.composer().ppqn, MIN_PPQN);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(RequestFile::from_yaml("strategy: neural").is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("request.yaml");
        let request = RequestFile {
            params: MusicParameters {
                energy: 0.9,
                ..Default::default()
            },
            features: None,
            strategy: Strategy::Heuristic,
            genre: None,
            composer: None,
        };
        fs::write(&yaml_path, request.to_yaml().unwrap()).unwrap();
        assert_eq!(RequestFile::load(&yaml_path).unwrap(), request);

        let toml_path = dir.path().join("request.TOML");
        fs::write(&toml_path, "genre = \"chill\"\n").unwrap();
        assert_eq!(RequestFile::load(&toml_path).unwrap().genre.as_deref(), Some("chill"));

        assert!(RequestFile::load(dir.path().join("missing.yaml")).is_err());
    }
}
