//! Audio playback capability boundary.
//!
//! The controller never touches the platform media stack directly; it drives
//! an [`AudioPlayable`] produced by an [`AudioBackend`]. The production
//! implementation decodes provider bytes through `rodio` and owns the output
//! stream and sink exclusively, so at most one resource is ever live. Tests
//! drive the controller with a synthetic implementation instead.

use crate::error::NarrationError;
use rodio::source::Source;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::debug;

/// Samples between updates of the level meter feed.
const LEVEL_WINDOW: u32 = 2048;
/// The provider encodes `mp3_44100_128`; used when the decoder cannot report
/// a total duration so position refinement is never blocked in production.
const FALLBACK_BITRATE_BITS_PER_SEC: u64 = 128_000;

/// One exclusively-owned, playable audio resource.
pub trait AudioPlayable {
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn set_rate(&mut self, rate: f32);
    fn set_volume(&mut self, volume: f32);
    /// Elapsed playback time within this resource.
    fn position(&self) -> Duration;
    /// Total duration, once known.
    fn duration(&self) -> Option<Duration>;
    fn is_finished(&self) -> bool;
    /// Optional analysis tap for a level-metering feed.
    fn level(&self) -> f32 {
        0.0
    }
}

/// Factory turning provider audio bytes into a playable resource.
pub trait AudioBackend: Send + Sync {
    fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn AudioPlayable>, NarrationError>;
}

/// Production backend bound to the host audio stack via `rodio`.
#[derive(Debug, Default)]
pub struct RodioBackend;

impl AudioBackend for RodioBackend {
    fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn AudioPlayable>, NarrationError> {
        let byte_len = bytes.len();
        let (stream, handle) = OutputStream::try_default()
            .map_err(|err| NarrationError::Playback(format!("opening audio output: {err}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|err| NarrationError::Playback(format!("creating sink: {err}")))?;

        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|err| NarrationError::Playback(format!("decoding audio: {err}")))?;
        let duration = decoder.total_duration().or_else(|| {
            Some(Duration::from_secs_f64(
                (byte_len as u64 * 8) as f64 / FALLBACK_BITRATE_BITS_PER_SEC as f64,
            ))
        });

        let level = Arc::new(AtomicU32::new(0));
        let tapped = LevelTap::new(decoder.convert_samples::<f32>(), Arc::clone(&level));
        sink.append(tapped);
        sink.pause();

        debug!(bytes = byte_len, ?duration, "Loaded audio resource");
        Ok(Box::new(RodioPlayer {
            _stream: stream,
            sink,
            duration,
            level,
        }))
    }
}

struct RodioPlayer {
    _stream: OutputStream,
    sink: Sink,
    duration: Option<Duration>,
    level: Arc<AtomicU32>,
}

impl AudioPlayable for RodioPlayer {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn set_rate(&mut self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn level(&self) -> f32 {
        f32::from_bits(self.level.load(Ordering::Relaxed))
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        // Release must be safe to repeat; the stream follows.
        self.sink.stop();
    }
}

/// Passes samples through unchanged while publishing a windowed peak for the
/// optional visualizer feed.
struct LevelTap<S> {
    inner: S,
    shared: Arc<AtomicU32>,
    peak: f32,
    count: u32,
}

impl<S> LevelTap<S> {
    fn new(inner: S, shared: Arc<AtomicU32>) -> Self {
        Self {
            inner,
            shared,
            peak: 0.0,
            count: 0,
        }
    }
}

impl<S> Iterator for LevelTap<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        self.peak = self.peak.max(sample.abs());
        self.count += 1;
        if self.count >= LEVEL_WINDOW {
            self.shared.store(self.peak.to_bits(), Ordering::Relaxed);
            self.peak = 0.0;
            self.count = 0;
        }
        Some(sample)
    }
}

impl<S> Source for LevelTap<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::source::SineWave;

    #[test]
    fn level_tap_publishes_windowed_peak() {
        let shared = Arc::new(AtomicU32::new(0));
        let source = SineWave::new(440.0).take_duration(Duration::from_millis(200));
        let mut tap = LevelTap::new(source, Arc::clone(&shared));

        for _ in 0..(LEVEL_WINDOW * 2) {
            if tap.next().is_none() {
                break;
            }
        }

        let level = f32::from_bits(shared.load(Ordering::Relaxed));
        assert!(level > 0.5, "sine peak should be near 1.0, got {level}");
    }
}
