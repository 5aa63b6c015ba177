//! Playback synchronization — tick↔seconds math and the audio capability.
//!
//! During autoplay the audio clock owns the tick cursor: every frame the
//! elapsed playback time is converted back into a tick position and written
//! over the scroll accumulator. Manual scrolling does the opposite (and
//! stops autoplay), so the two never fight.

use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// 192 ticks per measure, 4 beats per measure.
pub const TICKS_PER_BEAT: f64 = 48.0;

/// Audio latency calibration, in seconds. Playback is seeked this much
/// earlier than the nominal chart time, and the same amount is added back
/// when reading the clock.
pub const OFFSET_SECS: f64 = 0.82;

/// Nominal seconds at a tick position for a fixed BPM.
pub fn tick_to_seconds(tick: f64, bpm: f64) -> f64 {
    tick / TICKS_PER_BEAT * 60.0 / bpm
}

/// Tick position at a clock time for a fixed BPM.
pub fn seconds_to_tick(seconds: f64, bpm: f64) -> f64 {
    seconds / 60.0 * bpm * TICKS_PER_BEAT
}

/// Where to seek the audio before starting autoplay at `tick`. May be
/// negative near tick 0; the capability clamps to its own bounds.
pub fn seek_seconds(tick: f64, bpm: f64) -> f64 {
    tick_to_seconds(tick, bpm) - OFFSET_SECS
}

/// Tick the cursor should sit at for an elapsed playback time.
pub fn elapsed_to_tick(elapsed_seconds: f64, bpm: f64) -> f64 {
    seconds_to_tick(elapsed_seconds + OFFSET_SECS, bpm)
}

/// The external audio capability, backed by rodio. Constructed from an
/// audio file; when construction fails the editor simply runs without
/// autoplay.
pub struct AudioEngine {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
    sample_rate: u32,
}

impl AudioEngine {
    /// Open the default output device and decode `path`. Returns `None` on
    /// any failure — no device, unreadable file, unknown codec.
    pub fn init(path: &Path) -> Option<Self> {
        let (stream, handle) = OutputStream::try_default().ok()?;
        let file = std::fs::File::open(path).ok()?;
        let source = Decoder::new(BufReader::new(file)).ok()?;
        let sample_rate = source.sample_rate();

        let sink = Sink::try_new(&handle).ok()?;
        sink.pause();
        sink.append(source);

        Some(Self {
            _stream: stream,
            _handle: handle,
            sink,
            sample_rate,
        })
    }

    /// Seek to an absolute playback time. Negative targets clamp to zero;
    /// seek failures leave the position where it was.
    pub fn seek_to_seconds(&self, seconds: f64) {
        let clamped = seconds.max(0.0);
        let _ = self.sink.try_seek(Duration::from_secs_f64(clamped));
    }

    pub fn start(&self) {
        self.sink.play();
    }

    pub fn stop(&self) {
        self.sink.pause();
    }

    /// Elapsed playback time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_zero_seeks_before_nominal_zero() {
        // Starting autoplay at the top of the chart lands 820 ms before
        // nominal zero; the engine clamps at its own bounds.
        let secs = seek_seconds(0.0, 140.0);
        assert!((secs - (-0.82)).abs() < 1e-9);
    }

    #[test]
    fn test_tick_seconds_round_trip() {
        for bpm in [60.0, 140.0, 174.5] {
            for tick in [0.0, 48.0, 192.0, 1000.5] {
                let secs = tick_to_seconds(tick, bpm);
                assert!((seconds_to_tick(secs, bpm) - tick).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_one_measure_at_120_bpm_is_two_seconds() {
        // 192 ticks = 4 beats; at 120 BPM a beat is half a second.
        assert!((tick_to_seconds(192.0, 120.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_and_elapsed_agree() {
        // The cursor read back at the seek target equals the starting tick.
        let bpm = 140.0;
        let tick = 960.0;
        let elapsed = seek_seconds(tick, bpm);
        assert!((elapsed_to_tick(elapsed, bpm) - tick).abs() < 1e-6);
    }
}
