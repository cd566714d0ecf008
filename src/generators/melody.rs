// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Motif-based lead generator.
//!
//! Plays one short motif per bar, built on the current chord degree. The
//! contour comes from the plan's mood score; a small random walk carried
//! across bars occasionally lifts or drops the motif by an octave.

use rand::Rng;

use super::{BarContext, Generator, NoteEvent};
use crate::music::scale;
use crate::rng::ComposeRng;

/// Pitch window for the lead
const LEAD_LOW: i32 = 60;
const LEAD_HIGH: i32 = 84;

const STATE_START: i32 = 2;
const STATE_MIN: i32 = -3;
const STATE_MAX: i32 = 4;

/// Melodic contour chosen by mood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contour {
    /// Up and back down
    Arch,
    /// Stepwise with repeated notes
    Hook,
    /// Falling from the fifth
    Descending,
}

impl Contour {
    pub fn for_mood(mood: f64) -> Self {
        if mood > 0.6 {
            Contour::Arch
        } else if mood > 0.4 {
            Contour::Hook
        } else {
            Contour::Descending
        }
    }

    /// Scale degrees relative to the chord root
    pub fn degrees(self) -> &'static [usize] {
        match self {
            Contour::Arch => &[0, 2, 4, 5, 4, 2],
            Contour::Hook => &[0, 2, 2, 4, 4, 2],
            Contour::Descending => &[4, 2, 0, 2],
        }
    }
}

/// Lead melody generator
#[derive(Debug, Clone)]
pub struct MelodyGenerator {
    /// Random walk steering octave shifts across bars
    melodic_state: i32,
}

impl MelodyGenerator {
    pub fn new() -> Self {
        Self {
            melodic_state: STATE_START,
        }
    }

    pub fn melodic_state(&self) -> i32 {
        self.melodic_state
    }

    fn octave_shift(&self) -> i32 {
        if self.melodic_state > 3 {
            12
        } else if self.melodic_state < -2 {
            -12
        } else {
            0
        }
    }
}

impl Default for MelodyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for MelodyGenerator {
    fn generate(&mut self, context: &BarContext<'_>, rng: &mut ComposeRng) -> Vec<NoteEvent> {
        let mood = context.mood();
        let base = 75 + (mood * 20.0) as i32;
        let key = context.scale();
        let motif = Contour::for_mood(mood).degrees();

        let beat = context.ticks_per_beat();
        let step = if mood > 0.7 { beat / 4 } else { beat / 2 };
        let bar_start = context.start_tick();
        let bar_end = bar_start + context.ticks_per_bar();
        let shift = self.octave_shift();

        let mut events = Vec::with_capacity(motif.len());
        let mut tick = bar_start;
        for (i, &degree) in motif.iter().enumerate() {
            if tick >= bar_end {
                break;
            }
            let pitch = key.root() as i32 + 12 + key.offset(context.chord_degree + degree) + shift;
            let pitch = scale::fold_into_range(pitch, LEAD_LOW, LEAD_HIGH);

            let accented = i == 0 || i + 1 == motif.len();
            let (velocity, length) = if accented {
                (base + 10, step * 3 / 2)
            } else {
                (base, step)
            };
            events.push(NoteEvent::clamped(pitch, velocity, tick, length.saturating_sub(5)));
            tick += step;
        }

        self.melodic_state = (self.melodic_state + rng.gen_range(-1..=2)).clamp(STATE_MIN, STATE_MAX);
        events
    }

    fn reset(&mut self) {
        self.melodic_state = STATE_START;
    }

    fn name(&self) -> &'static str {
        "lead"
    }
}
