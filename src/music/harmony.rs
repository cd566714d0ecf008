// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord progressions and voicings.
//!
//! A progression is a short list of 0-based scale degrees, one chord per
//! bar, cycled from the start of every section. Voicings stack every other
//! degree above the chord root using the same wrapping lookup as the scale,
//! so upper tones of high degrees fold back under the root.

use serde::{Deserialize, Serialize};

use super::scale::{Scale, ScaleType};

/// A cyclic chord progression expressed in scale degrees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progression(Vec<usize>);

impl Progression {
    /// Build a progression. An empty list falls back to the tonic.
    pub fn new(degrees: Vec<usize>) -> Self {
        if degrees.is_empty() {
            Self(vec![0])
        } else {
            Self(degrees)
        }
    }

    /// Degrees in order
    pub fn degrees(&self) -> &[usize] {
        &self.0
    }

    /// Number of chords before the cycle repeats
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; construction guarantees at least one chord
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chord degree for a bar counted from the start of its section
    pub fn degree_at(&self, bar_in_section: u32) -> usize {
        self.0[bar_in_section as usize % self.0.len()]
    }
}

/// Default progression for a mode.
///
/// Bright modes use I-vi-IV-V, dark modes i-iv-VI-VI.
pub fn progression_for(scale_type: ScaleType) -> Progression {
    if scale_type.is_bright() {
        Progression(vec![0, 5, 3, 4])
    } else {
        Progression(vec![0, 3, 5, 5])
    }
}

/// Pitches of a chord built on `degree`: root, third, fifth and optionally
/// the seventh.
pub fn chord_tones(scale: &Scale, degree: usize, with_seventh: bool) -> Vec<i32> {
    let mut tones = vec![
        scale.pitch(degree, 0),
        scale.pitch(degree + 2, 0),
        scale.pitch(degree + 4, 0),
    ];
    if with_seventh {
        tones.push(scale.pitch(degree + 6, 0));
    }
    tones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_progressions() {
        assert_eq!(progression_for(ScaleType::Major).degrees(), &[0, 5, 3, 4]);
        assert_eq!(progression_for(ScaleType::Lydian).degrees(), &[0, 5, 3, 4]);
        assert_eq!(progression_for(ScaleType::Minor).degrees(), &[0, 3, 5, 5]);
        assert_eq!(progression_for(ScaleType::Dorian).degrees(), &[0, 3, 5, 5]);
    }

    #[test]
    fn test_progression_cycles() {
        let prog = Progression::new(vec![0, 5, 3, 4]);
        assert_eq!(prog.degree_at(0), 0);
        assert_eq!(prog.degree_at(3), 4);
        assert_eq!(prog.degree_at(4), 0);
        assert_eq!(prog.degree_at(9), 5);
    }

    #[test]
    fn test_empty_progression_is_tonic() {
        let prog = Progression::new(Vec::new());
        assert_eq!(prog.degrees(), &[0]);
        assert_eq!(prog.degree_at(7), 0);
    }

    #[test]
    fn test_c_major_triads() {
        let scale = Scale::new(60, ScaleType::Major);
        assert_eq!(chord_tones(&scale, 0, false), vec![60, 64, 67]);
        assert_eq!(chord_tones(&scale, 0, true), vec![60, 64, 67, 71]);
        // vi chord: A C E, upper tones wrap under the root
        assert_eq!(chord_tones(&scale, 5, false), vec![69, 60, 64]);
    }

    #[test]
    fn test_degree_past_scale_wraps() {
        let scale = Scale::new(57, ScaleType::Minor);
        assert_eq!(chord_tones(&scale, 9, false), chord_tones(&scale, 2, false));
    }
}
