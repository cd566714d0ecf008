// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rule-based genre classifier.

use tracing::{info, warn};

use super::GenreId;
use crate::params::ImageFeatures;

/// Lowest energy the classifier works with
pub const SAFE_ENERGY_MIN: f64 = 0.3;
/// Highest energy the classifier works with
pub const SAFE_ENERGY_MAX: f64 = 0.9;

/// Pick a genre for an image.
///
/// Energy is clamped into a safe band first, then an ordered rule list is
/// evaluated and the first match wins. Very bright, energetic images go to
/// retrowave instead of drop to keep tempos sane.
pub fn select_genre(features: &ImageFeatures, energy: f64) -> GenreId {
    let f = features.normalized();
    let e = if energy.is_finite() {
        energy.clamp(SAFE_ENERGY_MIN, SAFE_ENERGY_MAX)
    } else {
        SAFE_ENERGY_MIN
    };
    if e != energy {
        warn!(from = energy, to = e, "clamped energy for genre selection");
    }

    let (genre, rule) = classify(&f, e);
    info!(genre = %genre, rule, "selected genre");
    genre
}

fn classify(f: &ImageFeatures, e: f64) -> (GenreId, &'static str) {
    if f.brightness < 0.2 {
        return (GenreId::Cinematic, "very dark");
    }
    if f.brightness > 0.9 && e > 0.7 {
        return (GenreId::Retrowave, "very bright and energetic");
    }
    if f.saturation < 0.15 && f.colorfulness < 0.2 {
        return (GenreId::Cinematic, "near grayscale");
    }
    if e > 0.6 && (f.hue < 0.15 || f.hue > 0.9) {
        return (GenreId::Drop, "warm and energetic");
    }
    if f.brightness > 0.6 && f.saturation > 0.4 && f.saturation < 0.7 {
        return (GenreId::Retrowave, "bright, medium saturation");
    }
    if f.colorfulness < 0.3 && f.contrast > 0.5 {
        return (GenreId::Cinematic, "dull with high contrast");
    }
    if f.hue > 0.5 && f.hue < 0.7 {
        return (GenreId::Chill, "cool hue");
    }

    let genre = if e > 0.7 {
        GenreId::Drop
    } else if e > 0.4 {
        GenreId::Retrowave
    } else if f.brightness < 0.4 {
        GenreId::Cinematic
    } else {
        GenreId::Chill
    };
    (genre, "energy fallback")
}
