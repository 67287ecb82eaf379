//! STT (Speech-to-Text) engine module.
//!
//! The capture worker hands one utterance of 16 kHz mono audio at a time to
//! an `Arc<dyn SttEngine>`; [`WhisperEngine`] is the production
//! implementation.  A missing model file degrades the voice-command feature
//! at startup instead of failing the application.
//!
//! ```rust,no_run
//! use voice_gallery::stt::{SttEngine, TranscribeParams, WhisperEngine};
//!
//! let engine = WhisperEngine::load("models/ggml-base.en.bin", TranscribeParams::default())
//!     .expect("model file present");
//!
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s @ 16 kHz
//! let text = engine.transcribe(&audio).unwrap();
//! println!("{text}");
//! ```

pub mod engine;
pub mod transcribe;

pub use engine::{SttEngine, SttError, WhisperEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES};
pub use transcribe::{SamplingStrategy, TranscribeParams};

// test-only re-export so other modules' test code can use the mock without
// reaching into `engine` directly.
#[cfg(test)]
pub use engine::MockSttEngine;
