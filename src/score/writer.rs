// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file writer.
//!
//! Writes compositions as format 1 (one chunk per role) or format 0 (a
//! single merged chunk, used for stems).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ComposeError, Result};
use crate::config::MAX_PPQN;
use crate::generators::{Composition, ControlChange, NoteEvent, RoleTrack};

/// Largest value a four-byte variable-length quantity can hold
pub const VLQ_MAX: u64 = 0x0FFF_FFFF;

/// Release velocity written with every note-off
const NOTE_OFF_VELOCITY: u8 = 64;

/// MIDI file format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreFormat {
    /// Format 0: one track carrying every channel
    Single,
    /// Format 1: simultaneous tracks
    #[default]
    Multi,
}

impl ScoreFormat {
    fn header_value(self) -> u16 {
        match self {
            ScoreFormat::Single => 0,
            ScoreFormat::Multi => 1,
        }
    }
}

/// A track for export
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTrack {
    pub name: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Program change at start (None = no change)
    pub program: Option<u8>,
    pub notes: Vec<NoteEvent>,
    pub controls: Vec<ControlChange>,
}

impl ScoreTrack {
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel: channel & 0x0F,
            program: None,
            notes: Vec::new(),
            controls: Vec::new(),
        }
    }

    /// Set program
    pub fn with_program(mut self, program: u8) -> Self {
        self.program = Some(program);
        self
    }

    pub fn add_note(&mut self, note: NoteEvent) {
        self.notes.push(note);
    }

    pub fn add_control(&mut self, control: ControlChange) {
        self.controls.push(control);
    }
}

impl From<&RoleTrack> for ScoreTrack {
    fn from(track: &RoleTrack) -> Self {
        Self {
            name: track.name.clone(),
            channel: track.channel & 0x0F,
            program: track.program,
            notes: track.notes.clone(),
            controls: track.controls.clone(),
        }
    }
}

/// Ordering of events that share a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Meta,
    Program,
    Controller,
    NoteOff,
    NoteOn,
}

/// MIDI event for export
#[derive(Debug, Clone)]
struct ScoreEvent {
    /// Absolute tick
    tick: u64,
    kind: EventKind,
    /// Event data
    data: Vec<u8>,
}

impl ScoreEvent {
    fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            kind: EventKind::NoteOn,
            data: vec![0x90 | (channel & 0x0F), note & 0x7F, velocity.clamp(1, 127)],
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8) -> Self {
        Self {
            tick,
            kind: EventKind::NoteOff,
            data: vec![0x80 | (channel & 0x0F), note & 0x7F, NOTE_OFF_VELOCITY],
        }
    }

    fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self {
            tick,
            kind: EventKind::Program,
            data: vec![0xC0 | (channel & 0x0F), program & 0x7F],
        }
    }

    fn control_change(channel: u8, control: &ControlChange) -> Self {
        Self {
            tick: control.tick,
            kind: EventKind::Controller,
            data: vec![0xB0 | (channel & 0x0F), control.controller & 0x7F, control.value & 0x7F],
        }
    }

    fn tempo(tick: u64, bpm: u32) -> Self {
        let microseconds = microseconds_per_quarter(bpm);
        Self {
            tick,
            kind: EventKind::Meta,
            data: vec![
                0xFF, 0x51, 0x03,
                ((microseconds >> 16) & 0xFF) as u8,
                ((microseconds >> 8) & 0xFF) as u8,
                (microseconds & 0xFF) as u8,
            ],
        }
    }

    fn time_signature(tick: u64, numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = (denominator.max(1) as f64).log2() as u8;
        Self {
            tick,
            kind: EventKind::Meta,
            data: vec![
                0xFF, 0x58, 0x04,
                numerator,
                denom_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        }
    }

    fn track_name(tick: u64, name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut data = vec![0xFF, 0x03];
        write_variable_length(&mut data, bytes.len() as u64);
        data.extend_from_slice(bytes);
        Self {
            tick,
            kind: EventKind::Meta,
            data,
        }
    }
}

/// Tempo meta value, limited to its three bytes
pub fn microseconds_per_quarter(bpm: u32) -> u32 {
    (60_000_000 / bpm.max(1)).min(0xFF_FFFF)
}

/// Append a variable-length quantity. Values past four bytes are clamped.
pub fn write_variable_length(out: &mut Vec<u8>, value: u64) {
    let mut value = value.min(VLQ_MAX) as u32;
    let mut bytes = [0u8; 4];
    let mut len = 0;

    bytes[len] = (value & 0x7F) as u8;
    len += 1;
    value >>= 7;

    while value > 0 {
        bytes[len] = (value & 0x7F) as u8 | 0x80;
        len += 1;
        value >>= 7;
    }

    out.extend(bytes[..len].iter().rev());
}

/// MIDI file writer
#[derive(Debug, Clone)]
pub struct ScoreWriter {
    format: ScoreFormat,
    /// PPQN (ticks per quarter note)
    ppqn: u16,
    tempo_bpm: u32,
    time_sig: (u8, u8),
    tracks: Vec<ScoreTrack>,
}

impl ScoreWriter {
    pub fn new(format: ScoreFormat) -> Self {
        Self {
            format,
            ppqn: 480,
            tempo_bpm: 120,
            time_sig: (4, 4),
            tracks: Vec::new(),
        }
    }

    /// Multi-track file with one chunk per role
    pub fn from_composition(composition: &Composition) -> Self {
        let mut writer = Self::new(ScoreFormat::Multi).timed_like(composition);
        writer.tracks = composition.tracks.iter().map(ScoreTrack::from).collect();
        writer
    }

    /// Single-track file holding one role
    pub fn stem(composition: &Composition, track: &RoleTrack) -> Self {
        let mut writer = Self::new(ScoreFormat::Single).timed_like(composition);
        writer.tracks.push(ScoreTrack::from(track));
        writer
    }

    fn timed_like(mut self, composition: &Composition) -> Self {
        self.set_ppqn(composition.ppqn.min(MAX_PPQN) as u16);
        self.set_tempo(composition.tempo_bpm);
        self.set_time_signature(composition.beats_per_bar, 4);
        self
    }

    pub fn format(&self) -> ScoreFormat {
        self.format
    }

    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.ppqn = ppqn.max(1);
    }

    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    pub fn set_tempo(&mut self, bpm: u32) {
        self.tempo_bpm = bpm.max(1);
    }

    pub fn tempo(&self) -> u32 {
        self.tempo_bpm
    }

    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        self.time_sig = (numerator.max(1), denominator.max(1));
    }

    pub fn time_signature(&self) -> (u8, u8) {
        self.time_sig
    }

    pub fn add_track(&mut self, track: ScoreTrack) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[ScoreTrack] {
        &self.tracks
    }

    /// Number of track chunks the file will contain
    pub fn chunk_count(&self) -> usize {
        match self.format {
            ScoreFormat::Single => 1,
            ScoreFormat::Multi => self.tracks.len().max(1),
        }
    }

    /// Render the complete file
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_header(&mut out);
        match self.format {
            ScoreFormat::Single => {
                let mut events = self.global_events();
                if let Some(first) = self.tracks.first() {
                    events.push(ScoreEvent::track_name(0, &first.name));
                }
                for track in &self.tracks {
                    Self::track_events(track, &mut events);
                }
                Self::write_track(&mut out, events);
            }
            ScoreFormat::Multi if self.tracks.is_empty() => {
                Self::write_track(&mut out, self.global_events());
            }
            ScoreFormat::Multi => {
                for (i, track) in self.tracks.iter().enumerate() {
                    let mut events = if i == 0 { self.global_events() } else { Vec::new() };
                    events.push(ScoreEvent::track_name(0, &track.name));
                    Self::track_events(track, &mut events);
                    Self::write_track(&mut out, events);
                }
            }
        }
        out
    }

    /// Write the file to `path` through a temporary sibling
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_atomically(path, &self.to_bytes())?;
        info!(path = %path.display(), chunks = self.chunk_count(), "wrote score");
        Ok(())
    }

    /// Tempo and time signature, carried by the first chunk only
    fn global_events(&self) -> Vec<ScoreEvent> {
        vec![
            ScoreEvent::tempo(0, self.tempo_bpm),
            ScoreEvent::time_signature(0, self.time_sig.0, self.time_sig.1),
        ]
    }

    fn track_events(track: &ScoreTrack, events: &mut Vec<ScoreEvent>) {
        if let Some(program) = track.program {
            events.push(ScoreEvent::program_change(0, track.channel, program));
        }
        for control in &track.controls {
            events.push(ScoreEvent::control_change(track.channel, control));
        }
        for note in &track.notes {
            events.push(ScoreEvent::note_on(note.start_tick, track.channel, note.note, note.velocity));
            events.push(ScoreEvent::note_off(note.end_tick(), track.channel, note.note));
        }
    }

    /// Write MIDI file header chunk
    fn write_header(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"MThd");
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&self.format.header_value().to_be_bytes());
        out.extend_from_slice(&(self.chunk_count().min(u16::MAX as usize) as u16).to_be_bytes());
        out.extend_from_slice(&self.ppqn.to_be_bytes());
    }

    /// Write a track chunk. Events are stably sorted by tick, then kind.
    fn write_track(out: &mut Vec<u8>, mut events: Vec<ScoreEvent>) {
        events.sort_by_key(|e| (e.tick, e.kind));

        let mut track_data = Vec::new();
        let mut last_tick = 0u64;
        for event in &events {
            write_variable_length(&mut track_data, event.tick.saturating_sub(last_tick));
            track_data.extend_from_slice(&event.data);
            last_tick = last_tick.max(event.tick);
        }

        // End of track
        write_variable_length(&mut track_data, 0);
        track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        out.extend_from_slice(&track_data);
    }
}

impl Default for ScoreWriter {
    fn default() -> Self {
        Self::new(ScoreFormat::default())
    }
}

/// Sibling path used while a file is being written
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Write `bytes` to `path` so that readers never see a partial file
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp = partial_path(path);
    let written = File::create(&temp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&temp, path));

    written.map_err(|source| {
        let _ = fs::remove_file(&temp);
        ComposeError::io(path, source)
    })
}
