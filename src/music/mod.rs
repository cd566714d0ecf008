// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory tables for photoscore.
//!
//! Scale definitions, pitch helpers, chord progressions and voicings.

pub mod harmony;
pub mod scale;

pub use harmony::{progression_for, Progression};
pub use scale::{MidiNote, Note, Scale, ScaleType};
