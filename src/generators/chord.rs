// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord generator.
//!
//! Voices the bar's progression degree as a triad, adding the seventh for
//! complex parts, and places it rhythmically by energy: held through the
//! bar, struck on the half bar, or as syncopated eighth-note stabs.

use super::{BarContext, Generator, NoteEvent};
use crate::music::harmony;
use crate::rng::ComposeRng;

/// Stab onsets in eighths: 1, 1&, 2, 2&, 3, 4
const STAB_EIGHTHS: [u64; 6] = [0, 1, 2, 3, 4, 6];

/// Gap left before the next chord so repeated tones re-articulate
const RELEASE_GAP: u64 = 10;

/// Rhythmic placement of the chord within the bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comping {
    /// One chord held for the bar
    Sustained,
    /// Chords on beats 1 and 3
    HalfNotes,
    /// Accented syncopated stabs
    Stabs,
}

impl Comping {
    /// Placement for a section. Drops always stab.
    pub fn for_section(energy: f64, has_drop: bool) -> Self {
        if has_drop || energy >= 0.7 {
            Comping::Stabs
        } else if energy >= 0.3 {
            Comping::HalfNotes
        } else {
            Comping::Sustained
        }
    }
}

/// Chord progression generator
#[derive(Debug, Clone, Default)]
pub struct ChordGenerator;

impl ChordGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for ChordGenerator {
    fn generate(&mut self, context: &BarContext<'_>, _rng: &mut ComposeRng) -> Vec<NoteEvent> {
        let base = 60 + (context.energy() * 20.0) as i32;
        let tones = harmony::chord_tones(&context.scale(), context.chord_degree, context.complexity > 0.6);

        let start = context.start_tick();
        let beat = context.ticks_per_beat();
        let bar = context.ticks_per_bar();
        let mut events = Vec::new();

        match Comping::for_section(context.energy(), context.section.has_drop) {
            Comping::Sustained => {
                for &note in &tones {
                    events.push(NoteEvent::clamped(note, base - 10, start, bar.saturating_sub(RELEASE_GAP)));
                }
            }
            Comping::HalfNotes => {
                for &note in &tones {
                    let half = (2 * beat).saturating_sub(RELEASE_GAP);
                    events.push(NoteEvent::clamped(note, base, start, half));
                    events.push(NoteEvent::clamped(note, base - 5, start + 2 * beat, half));
                }
            }
            Comping::Stabs => {
                let eighth = context.note_duration(8);
                let length = eighth.saturating_sub(RELEASE_GAP);
                let mut velocity = base + 5;
                for offset in STAB_EIGHTHS {
                    for &note in &tones {
                        events.push(NoteEvent::clamped(note, velocity, start + offset * eighth, length));
                    }
                    velocity -= 3;
                }
            }
        }
        events
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "chords"
    }
}
