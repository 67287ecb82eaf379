//! Microphone capture and speech segmentation.
//!
//! Audio flow:
//!
//! ```text
//! cpal input stream ─▶ AudioChunk channel ─▶ stereo_to_mono ─▶
//! resample_to_16k ─▶ UtteranceSplitter ─▶ SttEngine ─▶ command queue
//! ```
//!
//! [`CaptureWorker`] runs the whole chain on its own thread; the rest of
//! the crate only ever touches the command queue it feeds.

pub mod capture;
pub mod resample;
pub mod segment;
pub mod worker;

pub use capture::{AudioChunk, CaptureError, MicCapture, StreamHandle};
pub use resample::{resample_to_16k, stereo_to_mono};
pub use segment::{calibrate_threshold, rms, UtteranceSplitter};
pub use worker::{normalize_transcript, CaptureWorker, CaptureWorkerHandle};
