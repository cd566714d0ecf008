// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Threshold-based planning strategy.
//!
//! Derives structure, groove and instrumentation directly from energy and
//! mood without a genre template.

use tracing::{info, warn};

use super::{
    assign_channels, ensure_minimum_roles, resolve_root, ActiveRole, Groove, PlannedSection,
    RhythmFeel, Role, SongPlan, SongPlanner,
};
use crate::genre::SectionKind;
use crate::music::{harmony, ScaleType};
use crate::params::{ImageFeatures, MusicParameters, PatternType};

/// Slowest tempo the heuristic produces
pub const MIN_TEMPO: u32 = 40;
/// Fastest tempo the heuristic produces
pub const MAX_TEMPO: u32 = 140;

/// Instrument families and their General MIDI programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    SoftPad,
    Keys,
    Pluck,
    Bell,
}

impl Preset {
    fn program(self, scale: ScaleType) -> u8 {
        match self {
            Preset::SoftPad => 89,
            Preset::Keys if scale.is_bright() => 0,
            Preset::Keys => 4,
            Preset::Pluck => 46,
            Preset::Bell => 11,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Preset::SoftPad => "soft pad",
            Preset::Keys => "keys",
            Preset::Pluck => "pluck",
            Preset::Bell => "bell",
        }
    }
}

/// Plans songs from energy and mood thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPlanner;

impl HeuristicPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl SongPlanner for HeuristicPlanner {
    fn plan(&self, features: &ImageFeatures, params: &MusicParameters) -> SongPlan {
        let params = params.normalized();
        let energy = params.energy;
        let mood = features.mood_score();
        let scale = params.scale_type;

        let tempo_bpm = quantize_tempo(params.tempo_bpm);
        let root_note = resolve_root(params.base_frequency);
        let sections = structure(energy, mood);
        let total_bars = sections.last().map(|s| s.end_bar()).unwrap_or(0);

        let groove = if energy < 0.2 && tempo_bpm < 70 {
            Groove::Sparse
        } else if energy > 0.4 || tempo_bpm > 90 {
            Groove::FourOnFloor
        } else {
            Groove::Backbeat
        };

        let mut roles = vec![
            ActiveRole::new(Role::Rhythm, "drums", 0).with_mix(0.6 + energy * 0.3, energy),
            ActiveRole::new(Role::Bass, "bass", 32 + scale.index() as u8).with_mix(0.7, energy * 0.6),
        ];

        let chord_preset = match (scale.is_bright(), params.brightness > 0.5) {
            (true, true) => Preset::Keys,
            (true, false) => Preset::Pluck,
            (false, true) => Preset::Bell,
            (false, false) => Preset::Keys,
        };
        roles.push(
            ActiveRole::new(Role::Harmony, chord_preset.label(), chord_preset.program(scale))
                .with_mix(0.5 + mood * 0.2, 0.5 + energy * 0.3),
        );

        if mood > 0.4 {
            let lead_preset = if mood > 0.7 {
                Preset::Bell
            } else if params.brightness > 0.6 {
                Preset::Pluck
            } else {
                Preset::Keys
            };
            roles.push(
                ActiveRole::new(Role::Lead, lead_preset.label(), lead_preset.program(scale))
                    .with_mix(0.4 + mood * 0.3, mood),
            );
        }

        if mood > 0.3 || params.pattern_type == PatternType::Pad {
            roles.push(
                ActiveRole::new(Role::Pad, Preset::SoftPad.label(), Preset::SoftPad.program(scale))
                    .with_mix(0.3 + mood * 0.2, 0.3),
            );
        }

        ensure_minimum_roles(&mut roles);
        assign_channels(&mut roles);

        info!(
            tempo = tempo_bpm,
            bars = total_bars,
            groove = %groove,
            roles = roles.len(),
            "planned song heuristically"
        );

        SongPlan {
            genre: None,
            tempo_bpm,
            root_note,
            scale,
            total_bars,
            sections,
            roles,
            groove,
            feel: RhythmFeel::default(),
            mood,
            progression: harmony::progression_for(scale),
        }
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Round to a multiple of five and clamp to the heuristic range
fn quantize_tempo(requested: f64) -> u32 {
    if !requested.is_finite() {
        warn!(requested, "non-finite tempo, using minimum");
        return MIN_TEMPO;
    }
    let rounded = (requested / 5.0).round() * 5.0;
    rounded.clamp(MIN_TEMPO as f64, MAX_TEMPO as f64) as u32
}

/// Section layout: 16, 24 or 32 bars depending on energy and mood
fn structure(energy: f64, mood: f64) -> Vec<PlannedSection> {
    use SectionKind::*;

    let blueprint: Vec<(SectionKind, u32, f64)> = if energy < 0.3 && mood < 0.4 {
        vec![(Intro, 4, 0.5), (Verse, 8, 1.0), (Outro, 4, 0.6)]
    } else if energy < 0.6 || mood < 0.6 {
        vec![(Intro, 4, 0.5), (Verse, 8, 1.0), (Chorus, 8, 0.9), (Outro, 4, 0.6)]
    } else {
        vec![(Intro, 4, 0.5), (Verse, 12, 1.0), (Chorus, 12, 0.95), (Outro, 4, 0.6)]
    };

    let mut bar = 0;
    blueprint
        .into_iter()
        .map(|(kind, bars, scale)| {
            let section = PlannedSection::new(kind, bar, bars, energy * scale);
            bar += bars;
            section
        })
        .collect()
}
