//! Utterance boundary detection over the live 16 kHz mono stream.
//!
//! An energy gate splits the continuous capture stream into utterances: the
//! splitter stays quiet until a chunk's RMS amplitude exceeds the calibrated
//! threshold, accumulates samples while speech continues, and closes the
//! utterance after enough trailing silence or when the phrase-length cap is
//! reached.  Everything here is pure state over sample buffers, so it tests
//! without hardware.

// ---------------------------------------------------------------------------
// RMS + calibration
// ---------------------------------------------------------------------------

/// Root-mean-square amplitude of `samples`; 0.0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

/// Derive the speech gate threshold from an ambient-noise sample.
///
/// The measured ambient RMS is scaled by `factor` and clamped below by
/// `floor`, so a dead-quiet room does not produce a hair-trigger gate and a
/// noisy one raises the bar proportionally.
pub fn calibrate_threshold(ambient: &[f32], factor: f32, floor: f32) -> f32 {
    (rms(ambient) * factor).max(floor)
}

// ---------------------------------------------------------------------------
// UtteranceSplitter
// ---------------------------------------------------------------------------

/// Accumulates speech between silence boundaries.
///
/// Feed capture chunks with [`push`](Self::push); a completed utterance is
/// returned the moment its boundary is detected.
#[derive(Debug)]
pub struct UtteranceSplitter {
    /// RMS gate; chunks above it count as voice.
    threshold: f32,
    /// Trailing-silence run (in samples) that closes an utterance.
    silence_samples: usize,
    /// Hard cap on utterance length in samples.
    max_samples: usize,

    in_speech: bool,
    buf: Vec<f32>,
    trailing_silence: usize,
}

impl UtteranceSplitter {
    /// Create a splitter.
    ///
    /// # Panics
    ///
    /// Panics when `max_samples == 0` — a zero-length cap would emit empty
    /// utterances forever.
    pub fn new(threshold: f32, silence_samples: usize, max_samples: usize) -> Self {
        assert!(max_samples > 0, "max_samples must be > 0");
        Self {
            threshold,
            silence_samples,
            max_samples,
            in_speech: false,
            buf: Vec::new(),
            trailing_silence: 0,
        }
    }

    /// The RMS gate currently in use.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// `true` while an utterance is being accumulated.
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Feed one chunk of 16 kHz mono samples.
    ///
    /// Returns the completed utterance when this chunk closes one: either
    /// the trailing-silence run reached its length, or the buffer hit the
    /// phrase cap.  Silence before any speech is discarded.
    pub fn push(&mut self, chunk: &[f32]) -> Option<Vec<f32>> {
        if chunk.is_empty() {
            return None;
        }

        let is_voice = rms(chunk) > self.threshold;

        if !self.in_speech {
            if !is_voice {
                return None;
            }
            self.in_speech = true;
            self.trailing_silence = 0;
        }

        self.buf.extend_from_slice(chunk);

        if is_voice {
            self.trailing_silence = 0;
        } else {
            self.trailing_silence += chunk.len();
        }

        if self.trailing_silence >= self.silence_samples || self.buf.len() >= self.max_samples {
            return Some(self.take());
        }

        None
    }

    /// Take the accumulated utterance and reset to the listening state.
    fn take(&mut self) -> Vec<f32> {
        self.in_speech = false;
        self.trailing_silence = 0;
        std::mem::take(&mut self.buf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: usize = 160; // 10 ms @ 16 kHz

    fn voice() -> Vec<f32> {
        vec![0.5_f32; CHUNK]
    }

    fn silence() -> Vec<f32> {
        vec![0.0_f32; CHUNK]
    }

    fn splitter() -> UtteranceSplitter {
        // Close after 2 silent chunks; cap at 10 chunks.
        UtteranceSplitter::new(0.05, 2 * CHUNK, 10 * CHUNK)
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&[0.5_f32; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn calibration_scales_and_floors() {
        // Quiet room: factor × tiny ambient stays at the floor.
        let quiet = vec![0.001_f32; 100];
        assert!((calibrate_threshold(&quiet, 2.5, 0.01) - 0.01).abs() < 1e-6);

        // Noisy room: threshold rises above the floor.
        let noisy = vec![0.2_f32; 100];
        let t = calibrate_threshold(&noisy, 2.5, 0.01);
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn leading_silence_is_discarded() {
        let mut s = splitter();
        assert!(s.push(&silence()).is_none());
        assert!(s.push(&silence()).is_none());
        assert!(!s.in_speech());
    }

    #[test]
    fn utterance_closes_after_trailing_silence() {
        let mut s = splitter();
        assert!(s.push(&voice()).is_none());
        assert!(s.push(&voice()).is_none());
        assert!(s.push(&silence()).is_none());
        let utterance = s.push(&silence()).expect("second silent chunk closes");
        // Two voice chunks plus the two silent tail chunks.
        assert_eq!(utterance.len(), 4 * CHUNK);
        assert!(!s.in_speech());
    }

    #[test]
    fn silence_run_resets_on_new_voice() {
        let mut s = splitter();
        s.push(&voice());
        s.push(&silence());
        // Voice again: the silence run starts over.
        s.push(&voice());
        assert!(s.push(&silence()).is_none());
        assert!(s.push(&silence()).is_some());
    }

    #[test]
    fn phrase_cap_closes_long_utterance() {
        let mut s = splitter();
        for _ in 0..9 {
            assert!(s.push(&voice()).is_none());
        }
        let utterance = s.push(&voice()).expect("cap reached");
        assert_eq!(utterance.len(), 10 * CHUNK);
    }

    #[test]
    fn splitter_is_reusable_after_an_utterance() {
        let mut s = splitter();
        s.push(&voice());
        s.push(&silence());
        assert!(s.push(&silence()).is_some());

        // Second utterance from the same splitter.
        s.push(&voice());
        s.push(&silence());
        let second = s.push(&silence()).expect("second utterance");
        assert_eq!(second.len(), 3 * CHUNK);
    }

    #[test]
    #[should_panic(expected = "max_samples must be > 0")]
    fn zero_cap_panics() {
        UtteranceSplitter::new(0.05, CHUNK, 0);
    }
}
