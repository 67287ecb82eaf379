//! Voice Gallery — a voice-controlled desktop media browser.
//!
//! A local image/animation collection is displayed in an egui window and
//! driven by spoken commands: navigate, run a slideshow, or fetch new media
//! from a web image search.  State changes are narrated through a serialized
//! speech-synthesis channel.
//!
//! # Module map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`media`] | Decoding media files and the ordered collection + cursor |
//! | [`schedule`] | Cancellable repeating timers for animation and slideshow |
//! | [`dispatch`] | The FIFO command queue and the command classifier |
//! | [`speak`] | Serialized non-blocking speech announcements |
//! | [`stt`] | Whisper transcription engine |
//! | [`listen`] | Microphone capture, utterance splitting, the capture worker |
//! | [`fetch`] | Async image search + download pipeline |
//! | [`app`] | The eframe presentation loop tying everything together |
//! | [`config`] | TOML settings and platform paths |

pub mod app;
pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod listen;
pub mod media;
pub mod schedule;
pub mod speak;
pub mod stt;
