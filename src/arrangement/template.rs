// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Genre-template planning strategy.
//!
//! Walks a genre's section blueprint, decides which sections drop, and
//! keeps the instrument layers the image is energetic enough for.

use tracing::{debug, info, warn};

use super::{
    assign_channels, ensure_minimum_roles, resolve_root, ActiveRole, Groove, PlannedSection,
    SongPlan, SongPlanner,
};
use crate::genre::GenreTemplate;
use crate::music::harmony;
use crate::params::{ImageFeatures, MusicParameters};

/// Energy boost applied to drop sections, scaled by image energy
pub const DROP_BOOST: f64 = 0.3;

/// Image energy below which every genre plays its sparse groove
const SPARSE_ENERGY: f64 = 0.3;

/// Plans songs from one genre template
#[derive(Debug, Clone, Copy)]
pub struct TemplatePlanner<'a> {
    template: &'a GenreTemplate,
}

impl<'a> TemplatePlanner<'a> {
    pub fn new(template: &'a GenreTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &'a GenreTemplate {
        self.template
    }
}

impl SongPlanner for TemplatePlanner<'_> {
    fn plan(&self, features: &ImageFeatures, params: &MusicParameters) -> SongPlan {
        plan_song(features, params, self.template)
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

/// Build a plan from a genre template
pub fn plan_song(features: &ImageFeatures, params: &MusicParameters, template: &GenreTemplate) -> SongPlan {
    let params = params.normalized();
    let energy = params.energy;

    let tempo_bpm = resolve_tempo(params.tempo_bpm, template);
    let scale = template
        .preferred_scales
        .first()
        .copied()
        .unwrap_or(params.scale_type);
    let root_note = resolve_root(params.base_frequency);

    // Timeline
    let drops_enabled = energy >= template.drop_energy_threshold;
    let mut sections = Vec::with_capacity(template.sections.len());
    let mut bar = 0;
    for blueprint in &template.sections {
        let mut section = PlannedSection::new(blueprint.kind, bar, blueprint.bars, blueprint.energy);
        if blueprint.drop_trigger && drops_enabled {
            section.has_drop = true;
            section.drop_intensity = 1.0;
            section.energy = (section.energy + energy * DROP_BOOST).min(1.0);
        }
        debug!(
            kind = %section.kind,
            start = section.start_bar,
            bars = section.bars,
            energy = section.energy,
            drop = section.has_drop,
            "planned section"
        );
        bar = section.end_bar();
        sections.push(section);
    }

    // Instrumentation: first active layer per role wins
    let mut roles: Vec<ActiveRole> = Vec::new();
    for layer in &template.layers {
        if energy < layer.min_energy || roles.iter().any(|r| r.role == layer.role) {
            continue;
        }
        let mut role = ActiveRole::new(layer.role, layer.instrument.clone(), layer.program);
        role.sidechain = layer.sidechain;
        roles.push(role);
    }
    ensure_minimum_roles(&mut roles);
    assign_channels(&mut roles);

    let groove = if energy < SPARSE_ENERGY {
        Groove::Sparse
    } else {
        template.style.groove
    };

    let plan = SongPlan {
        genre: Some(template.id),
        tempo_bpm,
        root_note,
        scale,
        total_bars: bar,
        sections,
        roles,
        groove,
        feel: template.style.feel.clone(),
        mood: features.mood_score(),
        progression: template
            .progression
            .clone()
            .unwrap_or_else(|| harmony::progression_for(scale)),
    };
    info!(
        genre = %template.id,
        tempo = plan.tempo_bpm,
        bars = plan.total_bars,
        roles = plan.roles.len(),
        "planned song from template"
    );
    plan
}

fn resolve_tempo(requested: f64, template: &GenreTemplate) -> u32 {
    if !requested.is_finite() {
        warn!(requested, "non-finite tempo, using template minimum");
        return template.min_tempo;
    }
    let rounded = requested.round().clamp(0.0, u32::MAX as f64) as u32;
    rounded.clamp(template.min_tempo, template.max_tempo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::Role;
    use crate::genre::{GenreId, GenreRegistry, SectionKind};
    use crate::music::ScaleType;

    fn params(energy: f64) -> MusicParameters {
        MusicParameters {
            energy,
            ..Default::default()
        }
    }

    fn template(id: GenreId) -> &'static GenreTemplate {
        GenreRegistry::shared().get(id).unwrap()
    }

    #[test]
    fn test_tempo_clamped_to_template() {
        let t = template(GenreId::Drop);
        for (requested, expected) in [(60.0, 125), (-40.0, 125), (130.4, 130), (400.0, 135), (f64::NAN, 125)] {
            let p = MusicParameters {
                tempo_bpm: requested,
                ..params(0.5)
            };
            assert_eq!(plan_song(&ImageFeatures::default(), &p, t).tempo_bpm, expected);
        }
    }

    #[test]
    fn test_preferred_scale_wins() {
        let p = MusicParameters {
            scale_type: ScaleType::Major,
            ..params(0.5)
        };
        let plan = plan_song(&ImageFeatures::default(), &p, template(GenreId::Cinematic));
        assert_eq!(plan.scale, ScaleType::Minor);

        let mut custom = template(GenreId::Cinematic).clone();
        custom.preferred_scales.clear();
        let plan = plan_song(&ImageFeatures::default(), &p, &custom);
        assert_eq!(plan.scale, ScaleType::Major);
    }

    #[test]
    fn test_drop_requires_threshold() {
        let t = template(GenreId::Drop);
        let quiet = plan_song(&ImageFeatures::default(), &params(0.5), t);
        assert!(quiet.sections.iter().all(|s| !s.has_drop));
        assert!(quiet
            .sections
            .iter()
            .zip(&t.sections)
            .all(|(s, b)| (s.energy - b.energy).abs() < 1e-9));

        let loud = plan_song(&ImageFeatures::default(), &params(0.95), t);
        let drops: Vec<_> = loud.sections.iter().filter(|s| s.has_drop).collect();
        assert_eq!(drops.len(), 2);
        for d in drops {
            assert_eq!(d.kind, SectionKind::Drop);
            assert_eq!(d.drop_intensity, 1.0);
            assert!((d.energy - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_first_active_layer_wins() {
        let plan = plan_song(&ImageFeatures::default(), &params(0.5), template(GenreId::Cinematic));
        let pad = plan.role(Role::Pad).unwrap();
        assert_eq!(pad.instrument, "choir");
        let harmony = plan.role(Role::Harmony).unwrap();
        assert_eq!(harmony.instrument, "strings");
        assert_eq!(plan.roles.iter().filter(|r| r.role == Role::Pad).count(), 1);
    }

    #[test]
    fn test_low_energy_forces_rhythm_and_bass() {
        let plan = plan_song(&ImageFeatures::default(), &params(0.0), template(GenreId::Cinematic));
        assert!(plan.has_role(Role::Rhythm));
        assert!(plan.has_role(Role::Bass));
        assert!(!plan.has_role(Role::Lead));
        assert_eq!(plan.groove, Groove::Sparse);
        assert_eq!(plan.role(Role::Rhythm).unwrap().channel, 9);
    }

    #[test]
    fn test_genre_progression_used() {
        let plan = plan_song(&ImageFeatures::default(), &params(0.5), template(GenreId::Chill));
        assert_eq!(plan.progression.degrees(), &[0, 4, 5, 3]);
        assert_eq!(plan.genre, Some(GenreId::Chill));
    }

    #[test]
    fn test_planner_trait_matches_free_fn() {
        let t = template(GenreId::Retrowave);
        let planner = TemplatePlanner::new(t);
        let f = ImageFeatures::default();
        let p = params(0.7);
        assert_eq!(planner.plan(&f, &p), plan_song(&f, &p, t));
        assert_eq!(planner.name(), "template");
    }
}
