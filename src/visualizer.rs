//! Synthetic spectrum bars.
//!
//! Nothing here looks at samples. The bars are a deterministic function of
//! elapsed time and volume, shaped per band and smoothed with an
//! attack/release envelope so they move like a meter.

use crate::session::TransportState;

/// Per-tick multiplier while paused.
const PAUSE_DECAY: f32 = 0.92;
/// Smoothing toward a higher target.
const ATTACK: f32 = 0.6;
/// Smoothing toward a lower target.
const RELEASE: f32 = 0.2;

/// What one update needs to know about playback.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub transport: TransportState,
    /// 0-100.
    pub volume: u8,
    /// Position in the current track, negative when unknown.
    pub elapsed_ms: i64,
    pub track_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Visualizer {
    bars: Vec<f32>,
    bound_track: Option<String>,
}

impl Visualizer {
    pub fn new(bars: usize) -> Self {
        Self {
            bars: vec![0.0; bars],
            bound_track: None,
        }
    }

    #[cfg(test)]
    pub fn bars(&self) -> &[f32] {
        &self.bars
    }

    /// Drop every bar to zero and forget the bound track.
    pub fn clear(&mut self) {
        self.bars.iter_mut().for_each(|b| *b = 0.0);
        self.bound_track = None;
    }

    /// Advance one tick.
    pub fn update(&mut self, frame: &Frame<'_>) {
        match frame.transport {
            TransportState::Stopped => {
                self.clear();
                return;
            }
            TransportState::Paused => {
                self.bars.iter_mut().for_each(|b| *b *= PAUSE_DECAY);
                return;
            }
            TransportState::Playing => {}
        }

        if self.bound_track.as_deref() != frame.track_id {
            self.bars.iter_mut().for_each(|b| *b = 0.0);
            self.bound_track = frame.track_id.map(str::to_string);
            return;
        }

        if frame.elapsed_ms <= 0 {
            return;
        }

        let scale = f32::from(frame.volume.min(100)) / 100.0;
        let t = frame.elapsed_ms as f32 / 1000.0 * 2.0;
        let n = self.bars.len();

        for (i, level) in self.bars.iter_mut().enumerate() {
            let target = (band_level(i, n, t) * scale).clamp(0.0, 1.0);
            let k = if target > *level { ATTACK } else { RELEASE };
            *level = k * target + (1.0 - k) * *level;
        }
    }

    /// Bar heights in rows, truncated, never above `max`.
    pub fn heights(&self, max: u16) -> Vec<u16> {
        self.bars
            .iter()
            .map(|b| ((b.clamp(0.0, 1.0) * f32::from(max)) as u16).min(max))
            .collect()
    }
}

/// Unscaled target for bar `i` of `n` at time factor `t`.
fn band_level(i: usize, n: usize, t: f32) -> f32 {
    let ratio = if n > 1 {
        i as f32 / (n - 1) as f32
    } else {
        0.0
    };
    let i = i as f32;

    if ratio < 0.3 {
        // bass: high floor, slow swell
        0.7 + (t * 1.2 + i * 0.5).sin() * 0.4 + (t * 0.8).sin() * 0.3
    } else if ratio < 0.7 {
        0.5 + (t * 1.8 + i * 0.3).sin() * 0.3 + (t * 1.1).cos() * 0.2
    } else {
        // treble: low floor, fast spikes
        0.4 + (t * 2.5 + i * 0.8).sin() * 0.4 + (t * 3.0).sin() * 0.2
    }
}
