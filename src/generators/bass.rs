// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bass line generator.
//!
//! Density follows section energy: a held root when quiet, root and
//! octave on the half bar in the middle, an eighth-note walk through
//! root, fifth and octave when energetic.

use super::{BarContext, Generator, NoteEvent};
use crate::rng::ComposeRng;

const LOW_ENERGY: f64 = 0.3;
const HIGH_ENERGY: f64 = 0.6;

/// Gap left before the next note so repeated pitches re-articulate
const RELEASE_GAP: u64 = 10;

/// Bass pattern generator
#[derive(Debug, Clone, Default)]
pub struct BassGenerator;

impl BassGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for BassGenerator {
    fn generate(&mut self, context: &BarContext<'_>, _rng: &mut ComposeRng) -> Vec<NoteEvent> {
        let energy = context.energy();
        let base = 70 + (energy * 25.0) as i32;
        let scale = context.scale();
        let degree = context.chord_degree;

        let root = scale.pitch(degree, -1);
        let fifth = scale.pitch(degree + 4, -1);
        let octave = root + 12;

        let start = context.start_tick();
        let beat = context.ticks_per_beat();
        let bar = context.ticks_per_bar();

        if energy < LOW_ENERGY {
            vec![NoteEvent::clamped(root, base, start, bar.saturating_sub(RELEASE_GAP))]
        } else if energy < HIGH_ENERGY {
            let second = if context.complexity > 0.4 { octave } else { root };
            vec![
                NoteEvent::clamped(root, base, start, (2 * beat).saturating_sub(RELEASE_GAP)),
                NoteEvent::clamped(
                    second,
                    base - 5,
                    start + 2 * beat,
                    (bar - 2 * beat).saturating_sub(RELEASE_GAP),
                ),
            ]
        } else {
            let eighth = context.note_duration(8);
            let steps = bar / eighth;
            (0..steps)
                .map(|i| {
                    let (note, velocity) = match i % 4 {
                        0 => (root, base),
                        1 => (fifth, base - 10),
                        2 => (octave, base - 5),
                        _ => (fifth, base - 10),
                    };
                    NoteEvent::clamped(note, velocity, start + i * eighth, eighth.saturating_sub(5))
                })
                .collect()
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "bass"
    }
}
