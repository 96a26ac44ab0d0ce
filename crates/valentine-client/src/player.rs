//! Preview playback for the request's song.
//!
//! The player tracks position and volume itself and drives a device through
//! [`AudioOutput`]. It owns exactly one loaded track; switching tracks or
//! dropping the player stops and unloads the previous one first.

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use valentine_types::catalog::{self, Track};

/// Sound device seam. Implementations stream the file at `track.path`.
pub trait AudioOutput: Send {
    fn load(&mut self, track: &Track);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
    fn unload(&mut self);
}

/// Output that plays nothing. Used when the front-end has no audio.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn load(&mut self, _track: &Track) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _seconds: f64) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn unload(&mut self) {}
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("unknown track '{0}'")]
    UnknownTrack(String),
}

pub struct PreviewPlayer {
    output: Box<dyn AudioOutput>,
    track: Option<&'static Track>,
    volume: f32,
    /// Position at the last play/pause/seek.
    offset: f64,
    /// Set while playing.
    started_at: Option<Instant>,
}

impl PreviewPlayer {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            track: None,
            volume: 1.0,
            offset: 0.0,
            started_at: None,
        }
    }

    /// Load a catalog track, releasing whatever was loaded before.
    pub fn load(&mut self, track_id: &str) -> Result<&'static Track, PlayerError> {
        let track = catalog::track(track_id).ok_or_else(|| PlayerError::UnknownTrack(track_id.to_string()))?;
        self.unload();

        debug!("Loading preview track {}", track.id);
        self.output.load(track);
        self.output.set_volume(self.volume);
        self.track = Some(track);
        Ok(track)
    }

    pub fn unload(&mut self) {
        if self.track.take().is_some() {
            if self.started_at.is_some() {
                self.output.pause();
            }
            self.output.unload();
        }
        self.offset = 0.0;
        self.started_at = None;
    }

    pub fn track(&self) -> Option<&'static Track> {
        self.track
    }

    /// Clip length in seconds, 0 when nothing is loaded.
    pub fn duration(&self) -> f64 {
        self.track.map_or(0.0, |t| f64::from(t.duration))
    }

    pub fn position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map_or(0.0, |start| start.elapsed().as_secs_f64());
        (self.offset + elapsed).min(self.duration())
    }

    /// Playing and not yet at the end of the clip.
    pub fn is_playing(&self) -> bool {
        self.started_at.is_some() && self.position() < self.duration()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn play(&mut self) {
        if self.track.is_none() || self.is_playing() {
            return;
        }
        // A finished clip starts over
        if self.position() >= self.duration() {
            self.offset = 0.0;
            self.output.seek(0.0);
        } else {
            self.offset = self.position();
        }
        self.started_at = Some(Instant::now());
        self.output.play();
    }

    pub fn pause(&mut self) {
        if self.started_at.is_none() {
            return;
        }
        self.offset = self.position();
        self.started_at = None;
        self.output.pause();
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        if self.track.is_none() {
            return;
        }
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, self.duration())
        } else {
            0.0
        };
        self.offset = target;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        self.output.seek(target);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
        if self.track.is_some() {
            self.output.set_volume(self.volume);
        }
    }

    /// `"m:ss / m:ss"` for the time display.
    pub fn formatted(&self) -> String {
        format!("{} / {}", format_time(self.position()), format_time(self.duration()))
    }
}

impl Drop for PreviewPlayer {
    fn drop(&mut self) {
        self.unload();
    }
}

pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
