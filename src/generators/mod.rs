// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-role bar generators and the composer that drives them.
//!
//! Each role has a generator that turns one bar of a plan into note
//! events. The closed set of generators is wrapped in [`Voice`] so the
//! composer can dispatch by role with a single `match`.

pub mod bass;
pub mod chord;
pub mod composer;
pub mod drums;
pub mod feel;
pub mod melody;
pub mod pad;

pub use composer::{compose_song, Composer, Composition, ControlChange, RoleTrack};

use crate::arrangement::{PlannedSection, Role, SongPlan};
use crate::genre::SectionKind;
use crate::music::scale::{self, Scale};
use crate::rng::ComposeRng;

/// Every bar is four quarter-note beats
pub const BEATS_PER_BAR: u8 = 4;

/// Note produced by a generator
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub note: u8,
    /// Velocity (1-127)
    pub velocity: u8,
    /// Absolute start tick
    pub start_tick: u64,
    /// Duration in ticks
    pub duration_ticks: u64,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl NoteEvent {
    /// Create a new note event
    pub fn new(note: u8, velocity: u8, start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            note,
            velocity,
            start_tick,
            duration_ticks,
            channel: 0,
        }
    }

    /// Build from unclamped intermediate values
    pub fn clamped(note: i32, velocity: i32, start_tick: u64, duration_ticks: u64) -> Self {
        Self::new(
            scale::clamp_midi(note),
            clamp_velocity(velocity),
            start_tick,
            duration_ticks.max(1),
        )
    }

    /// Set the channel for this event
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }

    /// Tick at which the note is released
    pub fn end_tick(&self) -> u64 {
        self.start_tick + self.duration_ticks
    }
}

/// Keep a velocity audible and in range
pub fn clamp_velocity(velocity: i32) -> u8 {
    velocity.clamp(1, 127) as u8
}

/// Everything a generator needs to render one bar
#[derive(Debug, Clone)]
pub struct BarContext<'a> {
    pub plan: &'a SongPlan,
    pub section: &'a PlannedSection,
    pub section_index: usize,
    /// Bar counted from the start of the section
    pub bar_in_section: u32,
    /// Progression degree for this bar
    pub chord_degree: usize,
    /// Complexity of the role being rendered
    pub complexity: f64,
    /// Ticks per quarter note
    pub ppqn: u32,
}

impl BarContext<'_> {
    /// Bar counted from the start of the song
    pub fn absolute_bar(&self) -> u32 {
        self.section.start_bar + self.bar_in_section
    }

    /// First tick of this bar
    pub fn start_tick(&self) -> u64 {
        self.absolute_bar() as u64 * self.ticks_per_bar()
    }

    /// Calculate ticks per beat
    pub fn ticks_per_beat(&self) -> u64 {
        self.ppqn as u64
    }

    /// Calculate ticks per bar
    pub fn ticks_per_bar(&self) -> u64 {
        self.ppqn as u64 * BEATS_PER_BAR as u64
    }

    /// Calculate duration in ticks for a note value
    /// division: 1 = whole, 2 = half, 4 = quarter, 8 = eighth, etc.
    pub fn note_duration(&self, division: u32) -> u64 {
        (self.ppqn as u64 * 4) / division.max(1) as u64
    }

    /// Length of one step of the sixteenth grid
    pub fn step_ticks(&self) -> u64 {
        self.note_duration(16)
    }

    pub fn energy(&self) -> f64 {
        self.section.energy
    }

    pub fn mood(&self) -> f64 {
        self.plan.mood
    }

    pub fn scale(&self) -> Scale {
        self.plan.key()
    }

    pub fn is_section_downbeat(&self) -> bool {
        self.bar_in_section == 0
    }

    /// Last bar of a section that is followed by another
    pub fn is_transition_bar(&self) -> bool {
        self.bar_in_section + 1 == self.section.bars && self.section_index + 1 < self.plan.sections.len()
    }

    /// The lead plays through climaxes and the outro, and joins builds
    /// halfway through.
    pub fn lead_active(&self) -> bool {
        match self.section.kind {
            kind if kind.is_climax() => true,
            SectionKind::Outro => true,
            SectionKind::Build => self.bar_in_section >= self.section.bars / 2,
            _ => false,
        }
    }
}

/// Shared interface of the per-role generators
pub trait Generator {
    /// Render one bar. Events carry absolute ticks and channel 0.
    fn generate(&mut self, context: &BarContext<'_>, rng: &mut ComposeRng) -> Vec<NoteEvent>;

    /// Return to the state at the start of a song
    fn reset(&mut self);

    /// Get the generator type name
    fn name(&self) -> &'static str;
}

/// One generator per role
#[derive(Debug, Clone)]
pub enum Voice {
    Rhythm(drums::DrumGenerator),
    Bass(bass::BassGenerator),
    Harmony(chord::ChordGenerator),
    Lead(melody::MelodyGenerator),
    Pad(pad::PadGenerator),
}

impl Voice {
    /// Fresh generator for a role
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Rhythm => Voice::Rhythm(drums::DrumGenerator::new()),
            Role::Bass => Voice::Bass(bass::BassGenerator::new()),
            Role::Harmony => Voice::Harmony(chord::ChordGenerator::new()),
            Role::Lead => Voice::Lead(melody::MelodyGenerator::new()),
            Role::Pad => Voice::Pad(pad::PadGenerator::new()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Voice::Rhythm(_) => Role::Rhythm,
            Voice::Bass(_) => Role::Bass,
            Voice::Harmony(_) => Role::Harmony,
            Voice::Lead(_) => Role::Lead,
            Voice::Pad(_) => Role::Pad,
        }
    }
}

impl Generator for Voice {
    fn generate(&mut self, context: &BarContext<'_>, rng: &mut ComposeRng) -> Vec<NoteEvent> {
        match self {
            Voice::Rhythm(g) => g.generate(context, rng),
            Voice::Bass(g) => g.generate(context, rng),
            Voice::Harmony(g) => g.generate(context, rng),
            Voice::Lead(g) => g.generate(context, rng),
            Voice::Pad(g) => g.generate(context, rng),
        }
    }

    fn reset(&mut self) {
        match self {
            Voice::Rhythm(g) => g.reset(),
            Voice::Bass(g) => g.reset(),
            Voice::Harmony(g) => g.reset(),
            Voice::Lead(g) => g.reset(),
            Voice::Pad(g) => g.reset(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Voice::Rhythm(g) => g.name(),
            Voice::Bass(g) => g.name(),
            Voice::Harmony(g) => g.name(),
            Voice::Lead(g) => g.name(),
            Voice::Pad(g) => g.name(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::arrangement::{ActiveRole, Groove, RhythmFeel};
    use crate::music::{Progression, ScaleType};

    /// Single-section plan for exercising generators
    pub fn plan(kind: SectionKind, bars: u32, energy: f64, mood: f64) -> SongPlan {
        let mut section = PlannedSection::new(kind, 0, bars, energy);
        section.has_drop = kind == SectionKind::Drop;
        SongPlan {
            genre: None,
            tempo_bpm: 120,
            root_note: 60,
            scale: ScaleType::Major,
            total_bars: bars,
            sections: vec![section, PlannedSection::new(SectionKind::Outro, bars, 4, 0.2)],
            roles: vec![ActiveRole::new(Role::Rhythm, "drums", 0)],
            groove: Groove::Backbeat,
            feel: RhythmFeel::default(),
            mood,
            progression: Progression::new(vec![0, 5, 3, 4]),
        }
    }

    pub fn context(plan: &SongPlan, bar_in_section: u32, complexity: f64) -> BarContext<'_> {
        BarContext {
            plan,
            section: &plan.sections[0],
            section_index: 0,
            bar_in_section,
            chord_degree: plan.progression.degree_at(bar_in_section),
            complexity,
            ppqn: 480,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn test_note_event_creation() {
        let event = NoteEvent::new(60, 100, 0, 12);
        assert_eq!(event.note, 60);
        assert_eq!(event.velocity, 100);
        assert_eq!(event.end_tick(), 12);
        assert_eq!(event.channel, 0);

        let event = event.with_channel(5);
        assert_eq!(event.channel, 5);
    }

    #[test]
    fn test_clamped_event() {
        let event = NoteEvent::clamped(140, 0, 10, 0);
        assert_eq!(event.note, 127);
        assert_eq!(event.velocity, 1);
        assert_eq!(event.duration_ticks, 1);
    }

    #[test]
    fn test_bar_context_timing() {
        let plan = plan(SectionKind::Verse, 8, 0.5, 0.5);
        let ctx = context(&plan, 3, 0.5);
        assert_eq!(ctx.ticks_per_bar(), 1920);
        assert_eq!(ctx.start_tick(), 3 * 1920);
        assert_eq!(ctx.note_duration(8), 240);
        assert_eq!(ctx.step_ticks(), 120);
        assert_eq!(ctx.chord_degree, 4);
    }

    #[test]
    fn test_transition_bar() {
        let plan = plan(SectionKind::Verse, 4, 0.5, 0.5);
        assert!(context(&plan, 3, 0.5).is_transition_bar());
        assert!(!context(&plan, 2, 0.5).is_transition_bar());

        let last = BarContext {
            section: &plan.sections[1],
            section_index: 1,
            ..context(&plan, 3, 0.5)
        };
        assert!(!last.is_transition_bar());
    }

    #[test]
    fn test_lead_activity() {
        let build = plan(SectionKind::Build, 8, 0.5, 0.5);
        assert!(!context(&build, 3, 0.5).lead_active());
        assert!(context(&build, 4, 0.5).lead_active());

        let intro = plan(SectionKind::Intro, 4, 0.2, 0.5);
        assert!(!context(&intro, 0, 0.5).lead_active());

        let chorus = plan(SectionKind::Chorus, 4, 0.8, 0.5);
        assert!(context(&chorus, 0, 0.5).lead_active());
    }

    #[test]
    fn test_voice_dispatch() {
        let plan = plan(SectionKind::Verse, 4, 0.5, 0.5);
        let ctx = context(&plan, 0, 0.5);
        let mut rng = create_rng(7);
        for role in Role::ALL {
            let mut voice = Voice::for_role(role);
            assert_eq!(voice.role(), role);
            assert!(!voice.name().is_empty());
            let events = voice.generate(&ctx, &mut rng);
            assert!(!events.is_empty(), "{} produced nothing", role);
            assert!(events.iter().all(|e| e.start_tick < ctx.ticks_per_bar()));
            voice.reset();
        }
    }
}
