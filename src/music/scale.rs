// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale definitions and pitch arithmetic.
//!
//! Provides the four modes the composer understands, modulo-wrapping
//! scale-degree lookup, frequency to MIDI conversion and octave folding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Lowest root note a plan may resolve to (C3)
pub const ROOT_NOTE_MIN: i32 = 48;
/// Highest root note a plan may resolve to (C5)
pub const ROOT_NOTE_MAX: i32 = 72;

/// Fallback root for unusable frequencies (middle C)
const DEFAULT_ROOT: i32 = 60;

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        Note::ALL.iter().position(|&n| n == self).unwrap_or(0) as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Pitch class of a MIDI note
    pub fn of_midi(note: MidiNote) -> Self {
        Note::from_pitch_class(note % 12)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        };
        write!(f, "{}", name)
    }
}

/// Scientific pitch name for a MIDI note (middle C = C4 = 60)
pub fn note_name(note: MidiNote) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", Note::of_midi(note), octave)
}

/// Modes supported by the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    Minor,
    Dorian,
    Lydian,
}

impl ScaleType {
    /// Modes in upstream index order (0=Major, 1=Minor, 2=Dorian, 3=Lydian)
    pub const ALL: [ScaleType; 4] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::Dorian,
        ScaleType::Lydian,
    ];

    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
        }
    }

    /// Mode for an upstream index. Out-of-range indices wrap.
    pub fn from_index(index: i64) -> Self {
        ScaleType::ALL[index.rem_euclid(ScaleType::ALL.len() as i64) as usize]
    }

    /// Upstream index of this mode
    pub fn index(self) -> usize {
        match self {
            ScaleType::Major => 0,
            ScaleType::Minor => 1,
            ScaleType::Dorian => 2,
            ScaleType::Lydian => 3,
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::Minor => "Minor",
            ScaleType::Dorian => "Dorian",
            ScaleType::Lydian => "Lydian",
        }
    }

    /// Major-third modes (Major, Lydian)
    pub fn is_bright(self) -> bool {
        matches!(self, ScaleType::Major | ScaleType::Lydian)
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A mode anchored on a MIDI root note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    root: MidiNote,
    scale_type: ScaleType,
}

impl Scale {
    /// Create a new scale from root and type
    pub fn new(root: MidiNote, scale_type: ScaleType) -> Self {
        Self { root, scale_type }
    }

    /// Get the root note
    pub fn root(&self) -> MidiNote {
        self.root
    }

    /// Get the scale type
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Get the intervals (semitones from root)
    pub fn intervals(&self) -> &'static [u8] {
        self.scale_type.intervals()
    }

    /// Get the number of notes in this scale
    pub fn len(&self) -> usize {
        self.intervals().len()
    }

    /// Always false; every mode has seven degrees
    pub fn is_empty(&self) -> bool {
        self.intervals().is_empty()
    }

    /// Semitone offset of a 0-based degree. Degrees past the end wrap
    /// without adding an octave.
    pub fn offset(&self, degree: usize) -> i32 {
        self.intervals()[degree % self.len()] as i32
    }

    /// Absolute pitch of a 0-based degree, shifted by whole octaves
    pub fn pitch(&self, degree: usize, octave_shift: i32) -> i32 {
        self.root as i32 + 12 * octave_shift + self.offset(degree)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Note::of_midi(self.root), self.scale_type)
    }
}

/// Nearest MIDI note for a frequency, A4 = 440 Hz = 69.
///
/// Non-positive or non-finite frequencies map to middle C.
pub fn frequency_to_midi(freq: f64) -> i32 {
    if !freq.is_finite() || freq <= 0.0 {
        return DEFAULT_ROOT;
    }
    (12.0 * (freq / 440.0).log2() + 69.0).round() as i32
}

/// Shift a note by whole octaves until it lies in `[low, high]`.
///
/// The window must span at least an octave.
pub fn fold_into_range(note: i32, low: i32, high: i32) -> i32 {
    debug_assert!(high - low >= 11);
    let mut folded = note;
    while folded < low {
        folded += 12;
    }
    while folded > high {
        folded -= 12;
    }
    folded
}

/// Root note for a base frequency, folded into the singable window
pub fn root_from_frequency(freq: f64) -> MidiNote {
    fold_into_range(frequency_to_midi(freq), ROOT_NOTE_MIN, ROOT_NOTE_MAX) as MidiNote
}

/// Clamp an intermediate pitch to the MIDI range
pub fn clamp_midi(note: i32) -> MidiNote {
    note.clamp(0, 127) as MidiNote
}
