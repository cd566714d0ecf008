// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Genre catalog.
//!
//! Each genre is a declarative template: tempo bounds, a section
//! blueprint, instrument layers gated by energy, a drop threshold,
//! preferred modes and a rhythmic style. Templates live in an immutable
//! [`GenreRegistry`] built once and handed to planners by reference.

pub mod select;

pub use select::select_genre;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::arrangement::{Groove, RhythmFeel, Role};
use crate::error::{ComposeError, Result};
use crate::music::{Progression, ScaleType};

/// Number of steps in one bar of a hit pattern (sixteenth grid)
pub const STEPS_PER_BAR: u8 = 16;

/// Built-in genre identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreId {
    /// Laid-back, cool-toned
    Chill,
    /// Highest energy, four-on-the-floor with repeated drops
    Drop,
    /// Bright 80s synth feel at a milder tempo
    Retrowave,
    /// Slow, dark, orchestral
    Cinematic,
}

impl GenreId {
    pub const ALL: [GenreId; 4] = [
        GenreId::Chill,
        GenreId::Drop,
        GenreId::Retrowave,
        GenreId::Cinematic,
    ];

    /// Lowercase identifier used in files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            GenreId::Chill => "chill",
            GenreId::Drop => "drop",
            GenreId::Retrowave => "retrowave",
            GenreId::Cinematic => "cinematic",
        }
    }

    /// Parse an identifier
    pub fn parse(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        GenreId::ALL
            .into_iter()
            .find(|id| id.as_str() == key)
            .ok_or_else(|| ComposeError::UnknownGenre(s.to_string()))
    }
}

impl fmt::Display for GenreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a section in the song's macro-structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Build,
    Drop,
    Break,
    Verse,
    Chorus,
    Outro,
}

impl SectionKind {
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Build => "build",
            SectionKind::Drop => "drop",
            SectionKind::Break => "break",
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Outro => "outro",
        }
    }

    /// Climax sections where the lead always plays
    pub fn is_climax(self) -> bool {
        matches!(self, SectionKind::Drop | SectionKind::Chorus)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a genre's section blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    pub kind: SectionKind,
    pub bars: u32,
    /// Base energy before any image-driven boost
    pub energy: f64,
    /// Section may become a drop when the image is energetic enough
    #[serde(default)]
    pub drop_trigger: bool,
}

impl SectionTemplate {
    fn new(kind: SectionKind, bars: u32, energy: f64, drop_trigger: bool) -> Self {
        Self {
            kind,
            bars,
            energy,
            drop_trigger,
        }
    }
}

/// An instrument that joins the arrangement once image energy reaches
/// `min_energy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentLayer {
    pub role: Role,
    /// Human-readable instrument label ("kick", "strings", ...)
    pub instrument: String,
    /// General MIDI program number
    pub program: u8,
    #[serde(default)]
    pub min_energy: f64,
    /// Eligible for downstream sidechain ducking
    #[serde(default)]
    pub sidechain: bool,
}

impl InstrumentLayer {
    fn new(role: Role, instrument: &str, program: u8, min_energy: f64, sidechain: bool) -> Self {
        Self {
            role,
            instrument: instrument.to_string(),
            program,
            min_energy,
            sidechain,
        }
    }
}

/// Genre-specific percussion layout on the sixteenth grid.
///
/// Replaces the groove archetype when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPattern {
    pub kick: Vec<u8>,
    pub snare: Vec<u8>,
    pub hat: Vec<u8>,
    #[serde(default = "default_kick_note")]
    pub kick_note: u8,
    #[serde(default = "default_snare_note")]
    pub snare_note: u8,
    #[serde(default = "default_hat_note")]
    pub hat_note: u8,
}

fn default_kick_note() -> u8 {
    36
}
fn default_snare_note() -> u8 {
    38
}
fn default_hat_note() -> u8 {
    42
}

impl HitPattern {
    fn steps_valid(&self) -> bool {
        self.kick
            .iter()
            .chain(&self.snare)
            .chain(&self.hat)
            .all(|&s| s < STEPS_PER_BAR)
    }
}

/// Rhythmic identity of a genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreStyle {
    pub groove: Groove,
    #[serde(flatten)]
    pub feel: RhythmFeel,
}

/// A complete genre descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreTemplate {
    pub id: GenreId,
    pub name: String,
    pub min_tempo: u32,
    pub max_tempo: u32,
    pub sections: Vec<SectionTemplate>,
    pub layers: Vec<InstrumentLayer>,
    pub drop_energy_threshold: f64,
    #[serde(default)]
    pub preferred_scales: Vec<ScaleType>,
    pub style: GenreStyle,
    /// Overrides the mode's default progression
    #[serde(default)]
    pub progression: Option<Progression>,
}

impl GenreTemplate {
    /// Sum of the blueprint's bar counts
    pub fn total_bars(&self) -> u32 {
        self.sections.iter().map(|s| s.bars).sum()
    }

    /// Check structural soundness of a template
    pub fn validate(&self) -> Result<()> {
        let genre = self.id.as_str();
        if self.min_tempo == 0 || self.min_tempo > self.max_tempo {
            return Err(ComposeError::invalid(
                genre,
                format!("tempo bounds {}..{} are inverted or zero", self.min_tempo, self.max_tempo),
            ));
        }
        if self.sections.is_empty() {
            return Err(ComposeError::invalid(genre, "no sections"));
        }
        if let Some(i) = self.sections.iter().position(|s| s.bars == 0) {
            return Err(ComposeError::invalid(genre, format!("section {} has zero bars", i)));
        }
        if !(0.0..=1.0).contains(&self.drop_energy_threshold) {
            return Err(ComposeError::invalid(genre, "drop threshold outside [0, 1]"));
        }
        if let Some(pattern) = &self.style.feel.hit_pattern {
            if !pattern.steps_valid() {
                return Err(ComposeError::invalid(
                    genre,
                    format!("hit pattern step must be below {}", STEPS_PER_BAR),
                ));
            }
        }
        if let Some(prog) = &self.progression {
            if prog.is_empty() {
                return Err(ComposeError::invalid(genre, "empty progression"));
            }
        }
        Ok(())
    }
}

/// Immutable set of genre templates
#[derive(Debug, Clone)]
pub struct GenreRegistry {
    templates: BTreeMap<GenreId, GenreTemplate>,
}

impl GenreRegistry {
    /// Registry holding the four built-in genres
    pub fn builtin() -> Self {
        let builtins = [
            chill_template(),
            drop_template(),
            retrowave_template(),
            cinematic_template(),
        ];
        let templates = builtins.into_iter().map(|t| (t.id, t)).collect();
        Self { templates }
    }

    /// Process-wide built-in registry, created on first use
    pub fn shared() -> &'static GenreRegistry {
        static SHARED: OnceLock<GenreRegistry> = OnceLock::new();
        SHARED.get_or_init(GenreRegistry::builtin)
    }

    /// Build a registry from templates, validating each one.
    /// A later template with the same id replaces an earlier one.
    pub fn from_templates(templates: Vec<GenreTemplate>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for template in templates {
            template.validate()?;
            map.insert(template.id, template);
        }
        Ok(Self { templates: map })
    }

    /// Parse a catalog from a YAML list of templates
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let templates: Vec<GenreTemplate> =
            serde_yaml::from_str(yaml).context("Failed to parse genre catalog YAML")?;
        Self::from_templates(templates).context("Genre catalog failed validation")
    }

    /// Serialize the catalog to YAML
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        let templates: Vec<&GenreTemplate> = self.templates.values().collect();
        serde_yaml::to_string(&templates).context("Failed to serialize genre catalog")
    }

    /// Look up a template
    pub fn get(&self, id: GenreId) -> Result<&GenreTemplate> {
        self.templates
            .get(&id)
            .ok_or_else(|| ComposeError::UnknownGenre(id.to_string()))
    }

    /// Look up a template by its string id
    pub fn get_by_name(&self, name: &str) -> Result<&GenreTemplate> {
        self.get(GenreId::parse(name)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenreTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for GenreRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn chill_template() -> GenreTemplate {
    use SectionKind::*;
    GenreTemplate {
        id: GenreId::Chill,
        name: "Chill".to_string(),
        min_tempo: 100,
        max_tempo: 115,
        sections: vec![
            SectionTemplate::new(Intro, 4, 0.2, false),
            SectionTemplate::new(Build, 8, 0.5, false),
            SectionTemplate::new(Drop, 8, 0.7, true),
            SectionTemplate::new(Break, 4, 0.4, false),
            SectionTemplate::new(Outro, 4, 0.2, false),
        ],
        layers: vec![
            InstrumentLayer::new(Role::Rhythm, "kick", 0, 0.0, false),
            InstrumentLayer::new(Role::Bass, "bass", 38, 0.2, true),
            InstrumentLayer::new(Role::Pad, "pad", 89, 0.0, true),
            InstrumentLayer::new(Role::Lead, "lead", 81, 0.5, true),
            InstrumentLayer::new(Role::Harmony, "arp", 88, 0.6, true),
        ],
        drop_energy_threshold: 0.4,
        preferred_scales: vec![ScaleType::Major, ScaleType::Lydian],
        style: GenreStyle {
            groove: Groove::Sparse,
            feel: RhythmFeel {
                swing: 0.2,
                tight_pocket: false,
                hit_pattern: None,
            },
        },
        progression: Some(Progression::new(vec![0, 4, 5, 3])),
    }
}

fn drop_template() -> GenreTemplate {
    use SectionKind::*;
    GenreTemplate {
        id: GenreId::Drop,
        name: "Drop".to_string(),
        min_tempo: 125,
        max_tempo: 135,
        sections: vec![
            SectionTemplate::new(Intro, 4, 0.3, false),
            SectionTemplate::new(Build, 8, 0.6, false),
            SectionTemplate::new(Drop, 8, 0.8, true),
            SectionTemplate::new(Build, 4, 0.7, false),
            SectionTemplate::new(Drop, 8, 0.8, true),
            SectionTemplate::new(Outro, 4, 0.3, false),
        ],
        layers: vec![
            InstrumentLayer::new(Role::Rhythm, "kick", 0, 0.0, false),
            InstrumentLayer::new(Role::Bass, "bass", 38, 0.0, true),
            InstrumentLayer::new(Role::Lead, "square lead", 80, 0.5, true),
            InstrumentLayer::new(Role::Harmony, "pluck", 25, 0.6, true),
            InstrumentLayer::new(Role::Pad, "pad", 89, 0.3, true),
        ],
        drop_energy_threshold: 0.7,
        preferred_scales: vec![ScaleType::Minor, ScaleType::Dorian],
        style: GenreStyle {
            groove: Groove::FourOnFloor,
            feel: RhythmFeel {
                swing: 0.0,
                tight_pocket: true,
                hit_pattern: None,
            },
        },
        progression: Some(Progression::new(vec![0, 5, 3, 6])),
    }
}

fn retrowave_template() -> GenreTemplate {
    use SectionKind::*;
    GenreTemplate {
        id: GenreId::Retrowave,
        name: "Retrowave".to_string(),
        min_tempo: 90,
        max_tempo: 110,
        sections: vec![
            SectionTemplate::new(Intro, 4, 0.3, false),
            SectionTemplate::new(Build, 8, 0.5, false),
            SectionTemplate::new(Drop, 8, 0.8, true),
            SectionTemplate::new(Break, 8, 0.5, false),
            SectionTemplate::new(Drop, 8, 0.8, true),
            SectionTemplate::new(Outro, 4, 0.3, false),
        ],
        layers: vec![
            InstrumentLayer::new(Role::Rhythm, "kick", 0, 0.0, false),
            InstrumentLayer::new(Role::Bass, "analog bass", 38, 0.0, false),
            InstrumentLayer::new(Role::Lead, "saw lead", 81, 0.4, false),
            InstrumentLayer::new(Role::Pad, "warm pad", 89, 0.2, false),
            InstrumentLayer::new(Role::Harmony, "poly arp", 88, 0.6, false),
        ],
        drop_energy_threshold: 0.6,
        preferred_scales: vec![ScaleType::Major, ScaleType::Lydian],
        style: GenreStyle {
            groove: Groove::Backbeat,
            feel: RhythmFeel {
                swing: 0.0,
                tight_pocket: true,
                // Gated electric snare on 2 and 4, straight eighth hats
                hit_pattern: Some(HitPattern {
                    kick: vec![0, 8, 10],
                    snare: vec![4, 12],
                    hat: vec![0, 2, 4, 6, 8, 10, 12, 14],
                    kick_note: 36,
                    snare_note: 40,
                    hat_note: 42,
                }),
            },
        },
        progression: Some(Progression::new(vec![0, 5, 3, 4])),
    }
}

fn cinematic_template() -> GenreTemplate {
    use SectionKind::*;
    GenreTemplate {
        id: GenreId::Cinematic,
        name: "Cinematic".to_string(),
        min_tempo: 70,
        max_tempo: 90,
        sections: vec![
            SectionTemplate::new(Intro, 8, 0.2, false),
            SectionTemplate::new(Build, 12, 0.5, false),
            SectionTemplate::new(Drop, 8, 0.9, true),
            SectionTemplate::new(Break, 8, 0.4, false),
            SectionTemplate::new(Outro, 8, 0.2, false),
        ],
        layers: vec![
            InstrumentLayer::new(Role::Rhythm, "timpani", 47, 0.3, false),
            InstrumentLayer::new(Role::Harmony, "strings", 49, 0.0, false),
            InstrumentLayer::new(Role::Lead, "brass", 61, 0.5, false),
            InstrumentLayer::new(Role::Pad, "choir", 52, 0.4, false),
            InstrumentLayer::new(Role::Pad, "pad", 89, 0.0, false),
            InstrumentLayer::new(Role::Harmony, "piano", 0, 0.6, false),
        ],
        drop_energy_threshold: 0.5,
        preferred_scales: vec![ScaleType::Minor, ScaleType::Dorian],
        style: GenreStyle {
            groove: Groove::Backbeat,
            feel: RhythmFeel {
                swing: 0.33,
                tight_pocket: false,
                // Floor-tom rolls standing in for timpani, ride for pulse
                hit_pattern: Some(HitPattern {
                    kick: vec![0, 3, 8, 11],
                    snare: vec![12],
                    hat: vec![0, 4, 8, 12],
                    kick_note: 41,
                    snare_note: 45,
                    hat_note: 51,
                }),
            },
        },
        progression: Some(Progression::new(vec![0, 5, 2, 6])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let registry = GenreRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for template in registry.iter() {
            template.validate().unwrap();
            assert!(template.min_tempo <= template.max_tempo);
        }
    }

    #[test]
    fn test_bar_totals() {
        let registry = GenreRegistry::shared();
        assert_eq!(registry.get(GenreId::Chill).unwrap().total_bars(), 28);
        assert_eq!(registry.get(GenreId::Drop).unwrap().total_bars(), 36);
        assert_eq!(registry.get(GenreId::Retrowave).unwrap().total_bars(), 40);
        assert_eq!(registry.get(GenreId::Cinematic).unwrap().total_bars(), 44);
    }

    #[test]
    fn test_parse_genre_id() {
        assert_eq!(GenreId::parse("Chill").unwrap(), GenreId::Chill);
        assert_eq!(GenreId::parse(" cinematic ").unwrap(), GenreId::Cinematic);
        match GenreId::parse("polka") {
            Err(ComposeError::UnknownGenre(name)) => assert_eq!(name, "polka"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_genre_is_config_error() {
        let registry = GenreRegistry::from_templates(vec![chill_template()]).unwrap();
        assert!(registry.get(GenreId::Chill).is_ok());
        assert!(matches!(
            registry.get(GenreId::Drop),
            Err(ComposeError::UnknownGenre(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_templates() {
        let mut t = drop_template();
        t.min_tempo = 140;
        assert!(t.validate().is_err());

        let mut t = drop_template();
        t.sections.clear();
        assert!(t.validate().is_err());

        let mut t = drop_template();
        t.sections[1].bars = 0;
        assert!(t.validate().is_err());

        let mut t = retrowave_template();
        if let Some(p) = t.style.feel.hit_pattern.as_mut() {
            p.hat.push(16);
        }
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_yaml_catalog_round_trip() {
        let yaml = GenreRegistry::builtin().to_yaml().unwrap();
        let parsed = GenreRegistry::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(
            parsed.get(GenreId::Retrowave).unwrap(),
            GenreRegistry::builtin().get(GenreId::Retrowave).unwrap()
        );
    }

    #[test]
    fn test_yaml_catalog_validation_error() {
        let yaml = r#"
- id: chill
  name: Broken
  min_tempo: 120
  max_tempo: 100
  sections:
    - kind: intro
      bars: 4
      energy: 0.2
  layers: []
  drop_energy_threshold: 0.4
  style:
    groove: sparse
"#;
        let err = GenreRegistry::from_yaml(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("tempo bounds"));
    }

    #[test]
    fn test_drop_flags_in_blueprints() {
        for template in GenreRegistry::shared().iter() {
            assert!(template
                .sections
                .iter()
                .any(|s| s.drop_trigger && s.kind == SectionKind::Drop));
        }
    }
}
