// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song planning.
//!
//! This module provides:
//! - `SongPlan`: resolved tempo, key, section timeline and instrumentation
//! - `SongPlanner`: the planning interface, with a genre-template strategy
//!   and a threshold-based heuristic strategy
//!
//! Both strategies guarantee contiguous sections whose lengths sum to the
//! total, a tempo inside their bounds, a root note inside the singable
//! window, and at least a rhythm and a bass role.

pub mod heuristic;
pub mod template;

pub use heuristic::HeuristicPlanner;
pub use template::{plan_song, TemplatePlanner};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::genre::{GenreId, HitPattern, SectionKind};
use crate::music::{scale, Progression, Scale, ScaleType};
use crate::params::{ImageFeatures, MusicParameters};

/// MIDI channel reserved for percussion (channel 10 in 1-based terms)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Instrument role in the arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Rhythm,
    Bass,
    Harmony,
    Lead,
    Pad,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Rhythm, Role::Bass, Role::Harmony, Role::Lead, Role::Pad];

    /// Track and stem name
    pub fn name(self) -> &'static str {
        match self {
            Role::Rhythm => "drums",
            Role::Bass => "bass",
            Role::Harmony => "chords",
            Role::Lead => "lead",
            Role::Pad => "pad",
        }
    }

    pub fn is_percussion(self) -> bool {
        self == Role::Rhythm
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Percussion archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Groove {
    /// Kick on 1 and 3, light hats
    Sparse,
    /// Kick on 1 and 3, snare on 2 and 4, quarter hats
    Backbeat,
    /// Kick on every beat, snare on 2 and 4, eighth hats
    FourOnFloor,
}

impl Groove {
    pub fn name(self) -> &'static str {
        match self {
            Groove::Sparse => "sparse",
            Groove::Backbeat => "backbeat",
            Groove::FourOnFloor => "four_on_floor",
        }
    }
}

impl fmt::Display for Groove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Micro-timing character of a song
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmFeel {
    /// Fraction of a sixteenth step that off-beat steps are delayed by
    pub swing: f64,
    /// Keep percussion exactly on the grid
    pub tight_pocket: bool,
    /// Genre percussion table replacing the groove archetype
    pub hit_pattern: Option<HitPattern>,
}

/// A span of bars in the resolved timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSection {
    pub kind: SectionKind,
    /// Absolute first bar
    pub start_bar: u32,
    pub bars: u32,
    pub energy: f64,
    pub has_drop: bool,
    /// Rising filter automation across the section
    pub filter_sweep: bool,
    /// Rising expression automation across the section
    pub volume_build: bool,
    pub drop_intensity: f64,
}

impl PlannedSection {
    /// Section with automation flags derived from its kind
    pub fn new(kind: SectionKind, start_bar: u32, bars: u32, energy: f64) -> Self {
        let building = kind == SectionKind::Build;
        Self {
            kind,
            start_bar,
            bars,
            energy: energy.clamp(0.0, 1.0),
            has_drop: false,
            filter_sweep: building,
            volume_build: building,
            drop_intensity: 0.0,
        }
    }

    /// One past the last bar
    pub fn end_bar(&self) -> u32 {
        self.start_bar + self.bars
    }
}

/// An instrument selected for the song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRole {
    pub role: Role,
    pub instrument: String,
    /// General MIDI program
    pub program: u8,
    pub channel: u8,
    /// 0.0 - 1.0, mapped to CC7
    pub base_volume: f64,
    /// 0.0 - 1.0, drives voicing and pattern density
    pub complexity: f64,
    pub sidechain: bool,
}

impl ActiveRole {
    pub fn new(role: Role, instrument: impl Into<String>, program: u8) -> Self {
        Self {
            role,
            instrument: instrument.into(),
            program: program.min(127),
            channel: 0,
            base_volume: 0.7,
            complexity: 0.5,
            sidechain: false,
        }
    }

    pub fn with_mix(mut self, base_volume: f64, complexity: f64) -> Self {
        self.base_volume = base_volume.clamp(0.0, 1.0);
        self.complexity = complexity.clamp(0.0, 1.0);
        self
    }

    /// Role inserted when a plan would otherwise lack it
    fn fallback(role: Role) -> Self {
        match role {
            Role::Rhythm => ActiveRole::new(Role::Rhythm, "drums", 0),
            Role::Bass => ActiveRole::new(Role::Bass, "bass", 38),
            other => ActiveRole::new(other, other.name(), 0),
        }
    }
}

/// Everything the composer needs to render a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongPlan {
    /// Genre the plan was built from, if any
    pub genre: Option<GenreId>,
    pub tempo_bpm: u32,
    pub root_note: u8,
    pub scale: ScaleType,
    pub total_bars: u32,
    pub sections: Vec<PlannedSection>,
    pub roles: Vec<ActiveRole>,
    pub groove: Groove,
    pub feel: RhythmFeel,
    /// Image lushness (0.0 - 1.0)
    pub mood: f64,
    pub progression: Progression,
}

impl SongPlan {
    /// Root and mode as a scale
    pub fn key(&self) -> Scale {
        Scale::new(self.root_note, self.scale)
    }

    pub fn role(&self, role: Role) -> Option<&ActiveRole> {
        self.roles.iter().find(|r| r.role == role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role(role).is_some()
    }

    /// Sections start where the previous one ends and cover every bar
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 0;
        for section in &self.sections {
            if section.start_bar != expected || section.bars == 0 {
                return false;
            }
            expected = section.end_bar();
        }
        expected == self.total_bars
    }
}

impl fmt::Display for SongPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let genre = self.genre.map(|g| g.as_str()).unwrap_or("heuristic");
        writeln!(
            f,
            "{} | {} bpm | {} {} | {} bars | {} groove | mood {:.2}",
            genre,
            self.tempo_bpm,
            scale::note_name(self.root_note),
            self.scale,
            self.total_bars,
            self.groove,
            self.mood
        )?;
        for s in &self.sections {
            writeln!(
                f,
                "  bar {:>3}  {:<6}{} x{:<3} energy {:.2}",
                s.start_bar,
                s.kind,
                if s.has_drop { "*" } else { " " },
                s.bars,
                s.energy
            )?;
        }
        for r in &self.roles {
            writeln!(
                f,
                "  ch {:>2}  {:<6} {} (program {}, volume {:.2}, complexity {:.2})",
                r.channel, r.role, r.instrument, r.program, r.base_volume, r.complexity
            )?;
        }
        Ok(())
    }
}

/// A strategy that turns upstream inputs into a plan
pub trait SongPlanner {
    fn plan(&self, features: &ImageFeatures, params: &MusicParameters) -> SongPlan;

    fn name(&self) -> &'static str;
}

/// Append rhythm and bass when missing
pub(crate) fn ensure_minimum_roles(roles: &mut Vec<ActiveRole>) {
    for required in [Role::Rhythm, Role::Bass] {
        if !roles.iter().any(|r| r.role == required) {
            tracing::debug!(role = %required, "forcing required role");
            roles.push(ActiveRole::fallback(required));
        }
    }
}

/// Percussion goes on the reserved channel; other roles take channels in
/// plan order, skipping it.
pub(crate) fn assign_channels(roles: &mut [ActiveRole]) {
    let mut next = 0u8;
    for role in roles.iter_mut() {
        if role.role.is_percussion() {
            role.channel = PERCUSSION_CHANNEL;
            continue;
        }
        if next == PERCUSSION_CHANNEL {
            next += 1;
        }
        role.channel = next.min(15);
        next = next.saturating_add(1);
    }
}

/// Root note for a base frequency, octave-folded into the plan window
pub(crate) fn resolve_root(base_frequency: f64) -> u8 {
    if !base_frequency.is_finite() || base_frequency <= 0.0 {
        tracing::warn!(base_frequency, "unusable base frequency, using middle C");
    }
    scale::root_from_frequency(base_frequency)
}
