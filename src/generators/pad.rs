// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sustained pad generator.

use super::{BarContext, Generator, NoteEvent};
use crate::rng::ComposeRng;

/// Holds the chord root, plus the third for brighter moods, for the whole bar
#[derive(Debug, Clone, Default)]
pub struct PadGenerator;

impl PadGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for PadGenerator {
    fn generate(&mut self, context: &BarContext<'_>, _rng: &mut ComposeRng) -> Vec<NoteEvent> {
        let mood = context.mood();
        let velocity = 50 + (mood * 15.0) as i32;
        let key = context.scale();
        let start = context.start_tick();
        let length = context.ticks_per_bar().saturating_sub(10);

        let mut notes = vec![key.pitch(context.chord_degree, 0)];
        if mood > 0.5 {
            notes.push(key.pitch(context.chord_degree + 2, 0));
        }

        notes
            .into_iter()
            .map(|note| NoteEvent::clamped(note, velocity, start, length))
            .collect()
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "pad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::{context, plan};
    use crate::genre::SectionKind;
    use crate::rng::create_rng;

    #[test]
    fn test_single_note_for_dark_mood() {
        let p = plan(SectionKind::Verse, 4, 0.5, 0.2);
        let events = PadGenerator::new().generate(&context(&p, 0, 0.3), &mut create_rng(1));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].note, 60);
        assert_eq!(events[0].velocity, 53);
        assert_eq!(events[0].duration_ticks, 1910);
    }

    #[test]
    fn test_adds_third_for_bright_mood() {
        let p = plan(SectionKind::Verse, 4, 0.5, 0.8);
        // Bar 1 is the vi chord: A and C
        let events = PadGenerator::new().generate(&context(&p, 1, 0.3), &mut create_rng(1));
        let notes: Vec<u8> = events.iter().map(|e| e.note).collect();
        assert_eq!(notes, vec![69, 72]);
        assert!(events.iter().all(|e| e.start_tick == 1920 && e.velocity == 62));
    }
}
