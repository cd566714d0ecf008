// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Upstream inputs: the musical parameter vector and image descriptors.
//!
//! Both arrive once per request from the image-analysis side and are never
//! mutated by the engine. Unit-range fields are clamped on entry; anything
//! non-finite is replaced with a neutral value and logged.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::music::ScaleType;

/// Accompaniment pattern hinted by the upstream mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    #[default]
    Pad,
    Arp,
    Chords,
}

impl PatternType {
    /// Pattern for an upstream index. Out-of-range indices wrap.
    pub fn from_index(index: i64) -> Self {
        match index.rem_euclid(3) {
            0 => PatternType::Pad,
            1 => PatternType::Arp,
            _ => PatternType::Chords,
        }
    }
}

/// The fixed-shape parameter vector produced upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicParameters {
    /// Suggested tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo_bpm: f64,
    /// Tonal center frequency in Hz
    #[serde(default = "default_frequency")]
    pub base_frequency: f64,
    /// Overall energy (0.0 - 1.0)
    #[serde(default = "default_unit")]
    pub energy: f64,
    /// Timbral brightness (0.0 - 1.0)
    #[serde(default = "default_unit")]
    pub brightness: f64,
    /// Reverb amount (0.0 - 1.0), passed through for rendering
    #[serde(default)]
    pub reverb: f64,
    #[serde(default = "default_scale")]
    pub scale_type: ScaleType,
    #[serde(default)]
    pub pattern_type: PatternType,
}

fn default_tempo() -> f64 {
    110.0
}
fn default_frequency() -> f64 {
    261.63
}
fn default_unit() -> f64 {
    0.5
}
fn default_scale() -> ScaleType {
    ScaleType::Major
}

impl Default for MusicParameters {
    fn default() -> Self {
        Self {
            tempo_bpm: default_tempo(),
            base_frequency: default_frequency(),
            energy: default_unit(),
            brightness: default_unit(),
            reverb: 0.0,
            scale_type: default_scale(),
            pattern_type: PatternType::default(),
        }
    }
}

impl MusicParameters {
    /// Build from the raw upstream vector
    /// `[tempo, frequency, energy, brightness, reverb, scale, pattern]`.
    pub fn from_vector(v: [f64; 7]) -> Self {
        Self {
            tempo_bpm: v[0],
            base_frequency: v[1],
            energy: v[2],
            brightness: v[3],
            reverb: v[4],
            scale_type: ScaleType::from_index(index_of(v[5])),
            pattern_type: PatternType::from_index(index_of(v[6])),
        }
        .normalized()
    }

    /// Copy with unit fields clamped to [0, 1] and non-finite values
    /// replaced. Tempo and frequency are left to the planners, which own
    /// their bounds.
    pub fn normalized(&self) -> Self {
        Self {
            energy: unit("energy", self.energy),
            brightness: unit("brightness", self.brightness),
            reverb: unit("reverb", self.reverb),
            ..self.clone()
        }
    }
}

/// Normalized image descriptors, used only for genre and mood decisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFeatures {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub colorfulness: f64,
    pub contrast: f64,
}

impl Default for ImageFeatures {
    fn default() -> Self {
        Self {
            hue: 0.5,
            saturation: 0.5,
            brightness: 0.5,
            colorfulness: 0.5,
            contrast: 0.5,
        }
    }
}

impl ImageFeatures {
    /// Copy with every field clamped to [0, 1]
    pub fn normalized(&self) -> Self {
        Self {
            hue: unit("hue", self.hue),
            saturation: unit("saturation", self.saturation),
            brightness: unit("brightness", self.brightness),
            colorfulness: unit("colorfulness", self.colorfulness),
            contrast: unit("contrast", self.contrast),
        }
    }

    /// Lushness of the image: pleasant color and lightness, penalized by
    /// harsh contrast. Always in [0, 1].
    pub fn mood_score(&self) -> f64 {
        let f = self.normalized();
        let pleasant_color = (f.saturation + f.colorfulness) * 0.5;
        (0.6 * pleasant_color + 0.4 * f.brightness - 0.2 * f.contrast).clamp(0.0, 1.0)
    }
}

fn index_of(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

fn unit(name: &str, value: f64) -> f64 {
    if !value.is_finite() {
        warn!(field = name, "non-finite input replaced with 0.5");
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}
