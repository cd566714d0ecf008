// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Drum generator with groove archetypes and genre hit tables.
//!
//! Generates one bar of percussion from the plan's groove or, when the
//! genre supplies one, its hit pattern. Adds a crash on the first bar of
//! a drop and a rising snare fill on the last bar before a new section.

use super::{clamp_velocity, BarContext, Generator, NoteEvent};
use crate::arrangement::Groove;
use crate::genre::HitPattern;
use crate::rng::ComposeRng;

/// Standard General MIDI drum notes
pub mod gm_drums {
    pub const KICK: u8 = 36;
    pub const SNARE: u8 = 38;
    pub const CLOSED_HAT: u8 = 42;
    pub const OPEN_HAT: u8 = 46;
    pub const CRASH: u8 = 49;
}

/// How a bar's main pattern is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
enum DrumStyle<'a> {
    /// Groove archetype
    Archetype(Groove),
    /// Genre hit table
    Table(&'a HitPattern),
}

/// Drum pattern generator
#[derive(Debug, Clone, Default)]
pub struct DrumGenerator;

impl DrumGenerator {
    /// Create a new drum generator
    pub fn new() -> Self {
        Self
    }

    /// Sparse always wins; otherwise a genre table replaces the archetype
    fn style<'a>(context: &BarContext<'a>) -> DrumStyle<'a> {
        match (context.plan.groove, &context.plan.feel.hit_pattern) {
            (Groove::Sparse, _) => DrumStyle::Archetype(Groove::Sparse),
            (_, Some(pattern)) => DrumStyle::Table(pattern),
            (groove, None) => DrumStyle::Archetype(groove),
        }
    }

    fn hit(events: &mut Vec<NoteEvent>, note: u8, velocity: i32, start: u64, duration: u64) {
        events.push(NoteEvent::new(note, clamp_velocity(velocity), start, duration.max(1)));
    }

    fn archetype(events: &mut Vec<NoteEvent>, context: &BarContext<'_>, groove: Groove, base: i32) {
        use gm_drums::*;

        let bar = context.start_tick();
        let beat = context.ticks_per_beat();
        let half = beat / 2;
        let quarter = beat / 4;

        match groove {
            Groove::Sparse => {
                Self::hit(events, KICK, base, bar, half);
                Self::hit(events, KICK, base - 10, bar + 2 * beat, half);
                if context.complexity > 0.3 {
                    for b in 0..4 {
                        Self::hit(events, CLOSED_HAT, base - 20, bar + b * beat, quarter);
                    }
                }
            }
            Groove::FourOnFloor => {
                for b in 0..4 {
                    Self::hit(events, KICK, base, bar + b * beat, half);
                }
                Self::hit(events, SNARE, base, bar + beat, half);
                Self::hit(events, SNARE, base, bar + 3 * beat, half);
                for i in 0..8 {
                    let hat = if i % 4 == 3 && context.complexity > 0.6 {
                        OPEN_HAT
                    } else {
                        CLOSED_HAT
                    };
                    Self::hit(events, hat, base - 10, bar + i * half, quarter);
                }
            }
            Groove::Backbeat => {
                Self::hit(events, KICK, base, bar, half);
                Self::hit(events, KICK, base - 5, bar + 2 * beat, half);
                Self::hit(events, SNARE, base, bar + beat, half);
                Self::hit(events, SNARE, base, bar + 3 * beat, half);
                for b in 0..4 {
                    Self::hit(events, CLOSED_HAT, base - 15, bar + b * beat, quarter);
                }
            }
        }
    }

    fn table(events: &mut Vec<NoteEvent>, context: &BarContext<'_>, pattern: &HitPattern, base: i32) {
        let bar = context.start_tick();
        let step = context.step_ticks();
        for &s in &pattern.kick {
            Self::hit(events, pattern.kick_note, base, bar + s as u64 * step, step * 2);
        }
        for &s in &pattern.snare {
            Self::hit(events, pattern.snare_note, base, bar + s as u64 * step, step * 2);
        }
        for &s in &pattern.hat {
            Self::hit(events, pattern.hat_note, base - 15, bar + s as u64 * step, step);
        }
    }

    /// Four sixteenth snares over the last beat, rising in velocity
    fn fill(events: &mut Vec<NoteEvent>, context: &BarContext<'_>, base: i32) {
        let step = context.step_ticks();
        let start = context.start_tick() + context.ticks_per_bar() - context.ticks_per_beat();
        for i in 0..4 {
            Self::hit(
                events,
                gm_drums::SNARE,
                base - 10 + 5 * i as i32,
                start + i * step,
                step / 2,
            );
        }
    }
}

impl Generator for DrumGenerator {
    fn generate(&mut self, context: &BarContext<'_>, _rng: &mut ComposeRng) -> Vec<NoteEvent> {
        let base = 80 + (context.energy() * 30.0) as i32;
        let mut events = Vec::with_capacity(24);

        if context.section.has_drop && context.is_section_downbeat() {
            Self::hit(
                &mut events,
                gm_drums::CRASH,
                base + 10,
                context.start_tick(),
                context.ticks_per_beat() * 2,
            );
        }

        match Self::style(context) {
            DrumStyle::Table(pattern) => Self::table(&mut events, context, pattern, base),
            DrumStyle::Archetype(groove) => Self::archetype(&mut events, context, groove, base),
        }

        if context.is_transition_bar() {
            Self::fill(&mut events, context, base);
        }

        events
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "drums"
    }
}

#[cfg(test)]
mod tests {
    use super::gm_drums::*;
    use super::*;
    use crate::generators::test_support::{context, plan};
    use crate::genre::{GenreId, GenreRegistry, SectionKind};
    use crate::rng::create_rng;

    fn render(plan: &crate::arrangement::SongPlan, bar: u32, complexity: f64) -> Vec<NoteEvent> {
        let mut gen = DrumGenerator::new();
        gen.generate(&context(plan, bar, complexity), &mut create_rng(1))
    }

    fn count(events: &[NoteEvent], note: u8) -> usize {
        events.iter().filter(|e| e.note == note).count()
    }

    #[test]
    fn test_backbeat() {
        let p = plan(SectionKind::Verse, 8, 0.5, 0.5);
        let events = render(&p, 0, 0.5);
        assert_eq!(count(&events, KICK), 2);
        assert_eq!(count(&events, SNARE), 2);
        assert_eq!(count(&events, CLOSED_HAT), 4);
        let kick = events.iter().find(|e| e.note == KICK).unwrap();
        assert_eq!(kick.velocity, 95);
    }

    #[test]
    fn test_four_on_floor() {
        let mut p = plan(SectionKind::Verse, 8, 0.5, 0.5);
        p.groove = Groove::FourOnFloor;
        let events = render(&p, 0, 0.8);
        assert_eq!(count(&events, KICK), 4);
        assert_eq!(count(&events, SNARE), 2);
        assert_eq!(count(&events, OPEN_HAT), 2);
        assert_eq!(count(&events, CLOSED_HAT), 6);
    }

    #[test]
    fn test_sparse_ignores_hit_table() {
        let mut p = plan(SectionKind::Verse, 8, 0.2, 0.5);
        p.groove = Groove::Sparse;
        p.feel = GenreRegistry::shared().get(GenreId::Retrowave).unwrap().style.feel.clone();
        let events = render(&p, 0, 0.2);
        assert_eq!(count(&events, KICK), 2);
        assert_eq!(count(&events, 40), 0);
        assert_eq!(count(&events, CLOSED_HAT), 0);
    }

    #[test]
    fn test_hit_table_replaces_archetype() {
        let mut p = plan(SectionKind::Verse, 8, 0.5, 0.5);
        p.feel = GenreRegistry::shared().get(GenreId::Retrowave).unwrap().style.feel.clone();
        let events = render(&p, 0, 0.5);
        assert_eq!(count(&events, KICK), 3);
        assert_eq!(count(&events, 40), 2);
        assert_eq!(count(&events, CLOSED_HAT), 8);
        assert_eq!(count(&events, SNARE), 0);
    }

    #[test]
    fn test_crash_on_drop_downbeat() {
        let p = plan(SectionKind::Drop, 8, 0.9, 0.5);
        assert_eq!(count(&render(&p, 0, 0.5), CRASH), 1);
        assert_eq!(count(&render(&p, 1, 0.5), CRASH), 0);
    }

    #[test]
    fn test_fill_before_next_section() {
        let p = plan(SectionKind::Verse, 4, 0.5, 0.5);
        let events = render(&p, 3, 0.5);
        let bar_start = 3 * 1920;
        let fill: Vec<&NoteEvent> = events
            .iter()
            .filter(|e| e.note == SNARE && e.start_tick >= bar_start + 1440)
            .collect();
        // Backbeat snare on beat 4 plus four fill hits
        assert_eq!(fill.len(), 5);
        let rolls: Vec<u8> = fill.iter().filter(|e| e.duration_ticks == 60).map(|e| e.velocity).collect();
        assert_eq!(rolls, vec![85, 90, 95, 100]);

        assert_eq!(count(&render(&p, 2, 0.5), SNARE), 2);
    }
}
