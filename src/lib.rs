// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! photoscore - procedural composition from image mood.
//!
//! A request's parameter vector and image descriptors pick a genre, a
//! planner turns them into a [`SongPlan`], the composer renders one track
//! per role, and the score writer emits Standard MIDI files.

pub mod arrangement;
pub mod config;
pub mod error;
pub mod generators;
pub mod genre;
pub mod music;
pub mod params;
pub mod rng;
pub mod score;

pub use arrangement::{HeuristicPlanner, Role, SongPlan, SongPlanner, TemplatePlanner};
pub use config::{ComposerConfig, RequestFile, Strategy};
pub use error::{ComposeError, Result};
pub use generators::{compose_song, Composer, Composition};
pub use genre::{select_genre, GenreId, GenreRegistry};
pub use params::{ImageFeatures, MusicParameters};
pub use score::{ScoreFormat, ScoreWriter};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

/// Resolve a request into a plan with the strategy it asks for
pub fn plan_request(request: &RequestFile, registry: &GenreRegistry) -> Result<SongPlan> {
    let features = request.features();
    match request.strategy {
        Strategy::Template => {
            let template = match request.genre.as_deref() {
                Some(name) => registry.get_by_name(name)?,
                None => registry.get(select_genre(&features, request.params.energy))?,
            };
            info!(genre = %template.id, "planning from genre template");
            Ok(TemplatePlanner::new(template).plan(&features, &request.params))
        }
        Strategy::Heuristic => Ok(HeuristicPlanner::new().plan(&features, &request.params)),
    }
}

/// Plan and compose a request with its own composer settings
pub fn compose_request(request: &RequestFile, registry: &GenreRegistry) -> Result<Composition> {
    let plan = plan_request(request, registry)?;
    let composer = Composer::new(request.composer());
    let seed = composer.config().seed;
    Ok(composer.compose(&plan, seed))
}

/// Multi-track file contents for a plan
pub fn render_midi_bytes(plan: &SongPlan, seed: u64) -> Vec<u8> {
    ScoreWriter::from_composition(&compose_song(plan, seed)).to_bytes()
}

/// Compose a plan and write it as one multi-track file
pub fn compose_genre_song_to_midi<P: AsRef<Path>>(plan: &SongPlan, path: P, seed: u64) -> Result<()> {
    ScoreWriter::from_composition(&compose_song(plan, seed)).export(path)
}

/// Compose a plan and write one single-track file per role.
///
/// Returns role name to file path.
pub fn compose_song_to_stems<P: AsRef<Path>>(
    plan: &SongPlan,
    dir: P,
    seed: u64,
) -> Result<BTreeMap<String, PathBuf>> {
    score::write_stems(&compose_song(plan, seed), dir)
}
