// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing feel applied after generation: swing and humanization.

use rand::Rng;

use super::{clamp_velocity, NoteEvent};
use crate::rng::ComposeRng;

/// Delay events that fall on odd sixteenth steps by `swing` of a step.
///
/// `swing` is clamped to [0, 1]. Events off the grid are left alone.
pub fn apply_swing(events: &mut [NoteEvent], swing: f64, step_ticks: u64) {
    if step_ticks == 0 || !swing.is_finite() || swing <= 0.0 {
        return;
    }
    let delay = (swing.min(1.0) * step_ticks as f64).round() as u64;
    for event in events.iter_mut() {
        if event.start_tick % (2 * step_ticks) == step_ticks {
            event.start_tick += delay;
        }
    }
}

/// Bounded random variation of velocity and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Humanizer {
    /// Maximum velocity change either way
    pub velocity: u8,
    /// Maximum timing change either way, in ticks
    pub timing: u64,
}

impl Humanizer {
    pub fn new(velocity: u8, timing: u64) -> Self {
        Self { velocity, timing }
    }

    /// Timing spread for a track. Percussion gets half, or none in a tight pocket.
    pub fn timing_spread(&self, percussion: bool, tight_pocket: bool) -> u64 {
        match (percussion, tight_pocket) {
            (false, _) => self.timing,
            (true, true) => 0,
            (true, false) => self.timing / 2,
        }
    }

    pub fn apply(&self, events: &mut [NoteEvent], rng: &mut ComposeRng, percussion: bool, tight_pocket: bool) {
        let spread = self.timing_spread(percussion, tight_pocket) as i64;
        let vel = self.velocity as i32;

        for event in events.iter_mut() {
            if vel > 0 {
                let offset = rng.gen_range(-vel..=vel);
                event.velocity = clamp_velocity(event.velocity as i32 + offset);
            }
            if spread > 0 {
                let offset = rng.gen_range(-spread..=spread);
                event.start_tick = event.start_tick.saturating_add_signed(offset);
            }
        }
    }
}

/// Cut each note so it is released by the next onset of the same pitch
/// on its channel. Notes struck twice at the same tick keep only the
/// later entry.
pub fn release_repeated_notes(notes: &mut Vec<NoteEvent>) {
    let mut order: Vec<usize> = (0..notes.len()).collect();
    order.sort_by_key(|&i| (notes[i].channel, notes[i].note, notes[i].start_tick));

    let mut doubled = vec![false; notes.len()];
    for pair in order.windows(2) {
        let (current, next) = (&notes[pair[0]], &notes[pair[1]]);
        if (current.channel, current.note) != (next.channel, next.note) {
            continue;
        }
        let (start, end, onset) = (current.start_tick, current.end_tick(), next.start_tick);
        if onset == start {
            doubled[pair[0]] = true;
        } else if end > onset {
            notes[pair[0]].duration_ticks = onset - start;
        }
    }

    let mut doubled = doubled.into_iter();
    notes.retain(|_| !doubled.next().unwrap_or(false));
}
