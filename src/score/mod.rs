// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Score serialization.
//!
//! This module provides:
//! - `ScoreWriter`: Standard MIDI file output, multi-track or single-track
//! - Stem export: one single-track file per role

pub mod writer;

pub use writer::{ScoreFormat, ScoreTrack, ScoreWriter};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ComposeError, Result};
use crate::generators::Composition;

/// Write one `<role>.mid` per track into `dir`, creating it if needed.
///
/// Either every stem is written or none is left behind.
pub fn write_stems<P: AsRef<Path>>(composition: &Composition, dir: P) -> Result<BTreeMap<String, PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ComposeError::io(dir, source))?;

    let mut written = BTreeMap::new();
    for track in &composition.tracks {
        let path = dir.join(format!("{}.mid", track.name));
        let bytes = ScoreWriter::stem(composition, track).to_bytes();
        if let Err(err) = writer::write_atomically(&path, &bytes) {
            for stale in written.values() {
                if let Err(cleanup) = fs::remove_file(stale) {
                    warn!(path = ?stale, error = %cleanup, "failed to remove partial stem");
                }
            }
            return Err(err);
        }
        written.insert(track.name.clone(), path);
    }

    info!(dir = %dir.display(), stems = written.len(), "wrote stems");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::Role;
    use crate::generators::{ControlChange, NoteEvent, RoleTrack};

    fn composition() -> Composition {
        let track = |role: Role, channel: u8| RoleTrack {
            role,
            name: role.name().to_string(),
            channel,
            program: (!role.is_percussion()).then_some(0),
            notes: vec![NoteEvent::new(60, 90, 0, 480).with_channel(channel)],
            controls: vec![ControlChange::new(0, 7, 100)],
        };
        Composition {
            tempo_bpm: 110,
            ppqn: 480,
            beats_per_bar: 4,
            tracks: vec![track(Role::Rhythm, 9), track(Role::Bass, 0), track(Role::Pad, 1)],
        }
    }

    #[test]
    fn test_write_stems() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stems");
        let stems = write_stems(&composition(), &out).unwrap();

        assert_eq!(stems.len(), 3);
        assert_eq!(stems["drums"], out.join("drums.mid"));
        for path in stems.values() {
            let bytes = fs::read(path).unwrap();
            assert_eq!(&bytes[0..4], b"MThd");
            assert_eq!(&bytes[8..10], &0u16.to_be_bytes());
            assert_eq!(&bytes[10..12], &1u16.to_be_bytes());
            // Every stem carries its own tempo
            assert!(bytes.windows(3).any(|w| w == [0xFF, 0x51, 0x03]));
        }
    }

    #[test]
    fn test_failed_stem_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the pad stem should go makes its rename fail
        fs::create_dir(dir.path().join("pad.mid")).unwrap();
        fs::write(dir.path().join("pad.mid").join("keep"), b"x").unwrap();

        let err = write_stems(&composition(), dir.path()).unwrap_err();
        assert!(matches!(err, ComposeError::Io { .. }));
        assert!(!dir.path().join("drums.mid").exists());
        assert!(!dir.path().join("bass.mid").exists());
        assert!(!dir.path().join("pad.mid.part").exists());
    }
}
