// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Walks a song plan bar by bar and collects one track per role.
//!
//! For every section and bar the composer renders each planned role in
//! order, applies swing and humanization, and adds controller automation
//! for build sections. A single seeded generator is threaded through the
//! whole song, so the same plan and seed always give the same tracks.

use std::collections::BTreeMap;

use tracing::debug;

use super::feel::{apply_swing, Humanizer};
use super::feel::release_repeated_notes;
use super::{BarContext, Generator, NoteEvent, Voice, BEATS_PER_BAR};
use crate::arrangement::{ActiveRole, PlannedSection, Role, SongPlan};
use crate::config::ComposerConfig;
use crate::rng::{create_rng, ComposeRng};

/// Controller numbers used for automation
pub mod cc {
    pub const VOLUME: u8 = 7;
    pub const EXPRESSION: u8 = 11;
    pub const BRIGHTNESS: u8 = 74;
}

const SWEEP_START: u8 = 40;
const EXPRESSION_START: u8 = 80;
const AUTOMATION_END: u8 = 127;

/// Controller value at a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub tick: u64,
    pub controller: u8,
    pub value: u8,
}

impl ControlChange {
    pub fn new(tick: u64, controller: u8, value: u8) -> Self {
        Self {
            tick,
            controller: controller & 0x7F,
            value: value.min(127),
        }
    }
}

/// Everything composed for one role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTrack {
    pub role: Role,
    /// Track and stem name
    pub name: String,
    pub channel: u8,
    /// Program change at the start; percussion has none
    pub program: Option<u8>,
    pub notes: Vec<NoteEvent>,
    pub controls: Vec<ControlChange>,
}

impl RoleTrack {
    fn for_role(active: &ActiveRole) -> Self {
        let percussion = active.role.is_percussion();
        let mut controls = Vec::new();
        if !percussion {
            let volume = (active.base_volume.clamp(0.0, 1.0) * 127.0).round() as u8;
            controls.push(ControlChange::new(0, cc::VOLUME, volume));
        }
        Self {
            role: active.role,
            name: active.role.name().to_string(),
            channel: active.channel,
            program: (!percussion).then_some(active.program),
            notes: Vec::new(),
            controls,
        }
    }

    /// Tick after the last note is released
    pub fn end_tick(&self) -> u64 {
        self.notes.iter().map(NoteEvent::end_tick).max().unwrap_or(0)
    }
}

/// A composed song, ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub tempo_bpm: u32,
    /// Ticks per quarter note
    pub ppqn: u32,
    pub beats_per_bar: u8,
    /// One track per planned role, in plan order
    pub tracks: Vec<RoleTrack>,
}

impl Composition {
    pub fn get(&self, role: Role) -> Option<&RoleTrack> {
        self.tracks.iter().find(|t| t.role == role)
    }

    pub fn by_role(&self) -> BTreeMap<Role, &RoleTrack> {
        self.tracks.iter().map(|t| (t.role, t)).collect()
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}

/// Renders song plans into compositions
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposerConfig,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose a plan. The seed drives humanization and melodic variation.
    pub fn compose(&self, plan: &SongPlan, seed: u64) -> Composition {
        let mut rng = create_rng(seed);
        let humanizer = Humanizer::new(self.config.humanize_velocity, self.config.humanize_timing);

        let mut voices: Vec<Voice> = plan.roles.iter().map(|r| Voice::for_role(r.role)).collect();
        let mut tracks: Vec<RoleTrack> = plan.roles.iter().map(RoleTrack::for_role).collect();

        for (section_index, section) in plan.sections.iter().enumerate() {
            debug!(
                section = %section.kind,
                start_bar = section.start_bar,
                bars = section.bars,
                energy = section.energy,
                drop = section.has_drop,
                "composing section"
            );

            for bar_in_section in 0..section.bars {
                let template = BarContext {
                    plan,
                    section,
                    section_index,
                    bar_in_section,
                    chord_degree: plan.progression.degree_at(bar_in_section),
                    complexity: 0.5,
                    ppqn: self.config.ppqn,
                };

                for ((active, voice), track) in plan.roles.iter().zip(voices.iter_mut()).zip(tracks.iter_mut()) {
                    let context = BarContext {
                        complexity: active.complexity,
                        ..template.clone()
                    };
                    automate(track, section, &context);

                    if active.role == Role::Lead && !context.lead_active() {
                        continue;
                    }

                    let mut notes = voice.generate(&context, &mut rng);
                    self.finish_bar(&mut notes, active, plan, &context, &humanizer, &mut rng);
                    track.notes.extend(notes);
                }
            }
        }

        for track in tracks.iter_mut().filter(|t| !t.role.is_percussion()) {
            release_repeated_notes(&mut track.notes);
        }

        for track in &tracks {
            debug!(role = %track.role, notes = track.notes.len(), controls = track.controls.len(), "track composed");
        }

        Composition {
            tempo_bpm: plan.tempo_bpm,
            ppqn: self.config.ppqn,
            beats_per_bar: BEATS_PER_BAR,
            tracks,
        }
    }

    fn finish_bar(
        &self,
        notes: &mut [NoteEvent],
        active: &ActiveRole,
        plan: &SongPlan,
        context: &BarContext<'_>,
        humanizer: &Humanizer,
        rng: &mut ComposeRng,
    ) {
        for note in notes.iter_mut() {
            note.channel = active.channel & 0x0F;
        }
        apply_swing(notes, plan.feel.swing, context.step_ticks());
        humanizer.apply(notes, rng, active.role.is_percussion(), plan.feel.tight_pocket);
    }
}

/// Compose with default settings
pub fn compose_song(plan: &SongPlan, seed: u64) -> Composition {
    Composer::default().compose(plan, seed)
}

/// Linear ramp value for bar `index` of `bars`. A single bar sits at the end.
fn ramp(start: u8, end: u8, index: u32, bars: u32) -> u8 {
    let t = if bars <= 1 {
        1.0
    } else {
        index as f64 / (bars - 1) as f64
    };
    (start as f64 + (end as f64 - start as f64) * t).round() as u8
}

/// Per-bar controller automation for build sections
fn automate(track: &mut RoleTrack, section: &PlannedSection, context: &BarContext<'_>) {
    let tick = context.start_tick();
    let index = context.bar_in_section;

    if section.filter_sweep && matches!(track.role, Role::Harmony | Role::Lead | Role::Pad) {
        let value = ramp(SWEEP_START, AUTOMATION_END, index, section.bars);
        track.controls.push(ControlChange::new(tick, cc::BRIGHTNESS, value));
    }
    if section.volume_build && !track.role.is_percussion() {
        let value = ramp(EXPRESSION_START, AUTOMATION_END, index, section.bars);
        track.controls.push(ControlChange::new(tick, cc::EXPRESSION, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{assign_channels, Groove, RhythmFeel, SongPlanner, TemplatePlanner};
    use crate::genre::{GenreRegistry, SectionKind};
    use crate::params::{ImageFeatures, MusicParameters};
    use crate::music::{Progression, ScaleType};

    fn full_plan() -> SongPlan {
        let sections = vec![
            PlannedSection::new(SectionKind::Intro, 0, 2, 0.2),
            PlannedSection::new(SectionKind::Build, 2, 4, 0.5),
            PlannedSection::new(SectionKind::Chorus, 6, 2, 0.8),
        ];
        let mut roles = vec![
            ActiveRole::new(Role::Rhythm, "drums", 0).with_mix(0.8, 0.5),
            ActiveRole::new(Role::Bass, "bass", 38).with_mix(0.7, 0.5),
            ActiveRole::new(Role::Harmony, "keys", 0).with_mix(0.6, 0.5),
            ActiveRole::new(Role::Lead, "bell", 11).with_mix(0.5, 0.5),
            ActiveRole::new(Role::Pad, "soft pad", 89).with_mix(0.4, 0.3),
        ];
        assign_channels(&mut roles);
        SongPlan {
            genre: None,
            tempo_bpm: 100,
            root_note: 60,
            scale: ScaleType::Major,
            total_bars: 8,
            sections,
            roles,
            groove: Groove::Backbeat,
            feel: RhythmFeel::default(),
            mood: 0.6,
            progression: Progression::new(vec![0, 5, 3, 4]),
        }
    }

    #[test]
    fn test_track_per_role() {
        let plan = full_plan();
        let song = compose_song(&plan, 42);
        assert_eq!(song.tracks.len(), 5);
        assert_eq!(song.tempo_bpm, 100);
        assert_eq!(song.ppqn, 480);

        let drums = song.get(Role::Rhythm).unwrap();
        assert_eq!(drums.channel, 9);
        assert_eq!(drums.program, None);
        assert!(drums.notes.iter().all(|n| n.channel == 9));

        let bass = song.get(Role::Bass).unwrap();
        assert_eq!(bass.program, Some(38));
        assert_eq!(bass.controls[0], ControlChange::new(0, cc::VOLUME, 89));
        assert!(!bass.notes.is_empty());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let plan = full_plan();
        assert_eq!(compose_song(&plan, 7), compose_song(&plan, 7));
        assert_ne!(compose_song(&plan, 7), compose_song(&plan, 8));
    }

    #[test]
    fn test_lead_only_in_active_bars() {
        let plan = full_plan();
        let song = compose_song(&plan, 1);
        let lead = song.get(Role::Lead).unwrap();
        let bar = 1920u64;
        // Silent through the intro and the first half of the build
        assert!(lead.notes.iter().all(|n| n.start_tick + 8 >= 4 * bar));
        assert!(lead.notes.iter().any(|n| n.start_tick >= 6 * bar));
    }

    #[test]
    fn test_build_automation() {
        let plan = full_plan();
        let song = compose_song(&plan, 1);

        let chords = song.get(Role::Harmony).unwrap();
        let sweep: Vec<(u64, u8)> = chords
            .controls
            .iter()
            .filter(|c| c.controller == cc::BRIGHTNESS)
            .map(|c| (c.tick, c.value))
            .collect();
        assert_eq!(sweep, vec![(3840, 40), (5760, 69), (7680, 98), (9600, 127)]);

        let expression: Vec<u8> = chords
            .controls
            .iter()
            .filter(|c| c.controller == cc::EXPRESSION)
            .map(|c| c.value)
            .collect();
        assert_eq!(expression.first(), Some(&80));
        assert_eq!(expression.last(), Some(&127));

        let bass = song.get(Role::Bass).unwrap();
        assert!(bass.controls.iter().all(|c| c.controller != cc::BRIGHTNESS));
        let drums = song.get(Role::Rhythm).unwrap();
        assert!(drums.controls.is_empty());
    }

    #[test]
    fn test_ramp_single_bar() {
        assert_eq!(ramp(40, 127, 0, 1), 127);
        assert_eq!(ramp(80, 127, 0, 3), 80);
        assert_eq!(ramp(80, 127, 2, 3), 127);
    }

    #[test]
    fn test_swing_and_humanize_settings() {
        let mut plan = full_plan();
        plan.feel.swing = 0.5;
        let composer = Composer::new(ComposerConfig {
            humanize_velocity: 0,
            humanize_timing: 0,
            ..Default::default()
        });
        let song = composer.compose(&plan, 3);
        let drums = song.get(Role::Rhythm).unwrap();
        // No humanization: every hit sits on the grid or half a step after it
        assert!(drums.notes.iter().all(|n| n.start_tick % 120 == 0 || n.start_tick % 120 == 60));
    }

    #[test]
    fn test_by_role() {
        let song = compose_song(&full_plan(), 2);
        let map = song.by_role();
        assert_eq!(map.len(), 5);
        assert!(map.contains_key(&Role::Pad));
        assert!(song.note_count() > 0);
        assert!(song.tracks.iter().all(|t| t.end_tick() <= 8 * 1920 + 100));
    }

    /// Pairs of same-pitch notes where the first is still held at the second's onset
    fn held_over(track: &RoleTrack) -> usize {
        let mut notes = track.notes.clone();
        notes.sort_by_key(|n| (n.channel, n.note, n.start_tick));
        notes
            .windows(2)
            .filter(|w| (w[0].channel, w[0].note) == (w[1].channel, w[1].note))
            .filter(|w| w[0].end_tick() > w[1].start_tick)
            .count()
    }

    #[test]
    fn test_repeated_pitches_never_overlap() {
        let params = MusicParameters {
            energy: 0.9,
            ..Default::default()
        };
        for template in GenreRegistry::shared().iter() {
            let plan = TemplatePlanner::new(template).plan(&ImageFeatures::default(), &params);
            for seed in 0..5 {
                let song = compose_song(&plan, seed);
                for track in song.tracks.iter().filter(|t| !t.role.is_percussion()) {
                    assert_eq!(held_over(track), 0, "{} {} seed {}", template.id, track.role, seed);
                }
            }
        }
        assert_eq!(held_over(compose_song(&full_plan(), 9).get(Role::Pad).unwrap()), 0);
    }

    #[test]
    fn test_extreme_timing_config() {
        let plan = full_plan();
        for ppqn in [1, 8, 95, 1_000_000] {
            let composer = Composer::new(ComposerConfig {
                ppqn,
                humanize_timing: u64::MAX,
                humanize_velocity: u8::MAX,
                ..Default::default()
            });
            let song = composer.compose(&plan, 4);
            let bar = song.ppqn as u64 * 4;
            assert!(song.ppqn >= 96);
            assert_eq!(song.beats_per_bar, 4);
            for track in &song.tracks {
                for note in &track.notes {
                    assert!((1..=bar).contains(&note.duration_ticks), "ppqn {}", ppqn);
                    assert!(note.start_tick < plan.total_bars as u64 * bar + bar);
                    assert!((1..=127).contains(&note.velocity));
                }
            }
        }
    }
}
