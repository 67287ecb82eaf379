//! The long-lived speech capture worker.
//!
//! [`CaptureWorker::spawn`] starts one dedicated OS thread that runs
//! forever (until stopped): it opens the default microphone, samples
//! ambient noise to calibrate the speech gate, then loops between listening
//! and transcribing.  Successful transcripts are normalized and pushed onto
//! the command queue; the presentation loop never sees this thread directly.
//!
//! # State machine
//!
//! ```text
//! Idle ──spawn──▶ Calibrating ──window elapsed──▶ Listening
//! Listening ──utterance boundary──▶ Transcribing ──always──▶ Listening
//! ```
//!
//! No input device: one degraded-capability announcement, then the thread
//! exits without ever entering Listening.  Recognition backend failures log
//! and back off briefly rather than terminating the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ListenConfig;
use crate::dispatch::CommandSender;
use crate::listen::capture::{AudioChunk, MicCapture};
use crate::listen::resample::{resample_to_16k, stereo_to_mono};
use crate::listen::segment::{calibrate_threshold, UtteranceSplitter};
use crate::speak::VoiceAnnouncer;
use crate::stt::SttEngine;

/// Spoken once when no microphone is available at startup.
const NO_MIC_MESSAGE: &str = "No microphone found. Voice commands are disabled.";

/// How long a quiet `recv` waits before re-checking the stop flag.
const POLL_TIMEOUT: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// CaptureWorkerHandle
// ---------------------------------------------------------------------------

/// Handle to the running capture worker thread.
///
/// The original design ran the worker until process exit with no stop path;
/// here `stop()` is an explicit signal the loop honours at its next
/// iteration.
pub struct CaptureWorkerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl CaptureWorkerHandle {
    /// Ask the worker to exit and wait for the thread to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for CaptureWorkerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // The thread notices the flag within one poll timeout; do not join
        // here so a drop on the UI thread never blocks it.
    }
}

// ---------------------------------------------------------------------------
// CaptureWorker
// ---------------------------------------------------------------------------

/// Spawner for the capture thread.
pub struct CaptureWorker;

impl CaptureWorker {
    /// Spawn the worker thread.
    ///
    /// * `config` — gate calibration and utterance timing settings.
    /// * `stt` — transcription engine, shared with no locking.
    /// * `announcer` — used once for the missing-device announcement.
    /// * `commands` — producer half of the command queue.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread (extremely unlikely).
    pub fn spawn(
        config: ListenConfig,
        stt: Arc<dyn SttEngine>,
        announcer: VoiceAnnouncer,
        commands: CommandSender,
    ) -> CaptureWorkerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("speech-capture".into())
            .spawn(move || run(config, stt, announcer, commands, stop_flag))
            .expect("failed to spawn speech-capture thread");

        CaptureWorkerHandle {
            stop,
            thread: Some(thread),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// Convert a raw capture chunk to 16 kHz mono.
fn to_16k_mono(chunk: &AudioChunk) -> Vec<f32> {
    let mono = stereo_to_mono(&chunk.samples, chunk.channels);
    resample_to_16k(&mono, chunk.sample_rate)
}

fn run(
    config: ListenConfig,
    stt: Arc<dyn SttEngine>,
    announcer: VoiceAnnouncer,
    commands: CommandSender,
    stop: Arc<AtomicBool>,
) {
    // ── Device setup ──────────────────────────────────────────────────────
    let capture = match MicCapture::new() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("speech capture unavailable: {e}");
            announcer.announce(NO_MIC_MESSAGE);
            return;
        }
    };

    let (chunk_tx, chunk_rx) = mpsc::channel::<AudioChunk>();
    let _stream = match capture.start(chunk_tx) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("failed to start capture stream: {e}");
            announcer.announce(NO_MIC_MESSAGE);
            return;
        }
    };

    log::info!(
        "speech capture started ({} Hz, {} ch)",
        capture.sample_rate(),
        capture.channels()
    );

    // ── Calibrating ───────────────────────────────────────────────────────
    let calibration_target = (16_000.0 * config.calibration_secs).max(1.0) as usize;
    let mut ambient: Vec<f32> = Vec::with_capacity(calibration_target);

    while ambient.len() < calibration_target && !stop.load(Ordering::Relaxed) {
        match chunk_rx.recv_timeout(POLL_TIMEOUT) {
            Ok(chunk) => ambient.extend(to_16k_mono(&chunk)),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("capture stream ended during calibration");
                return;
            }
        }
    }

    let threshold =
        calibrate_threshold(&ambient, config.threshold_factor, config.threshold_floor);
    log::info!("speech gate calibrated: rms threshold {threshold:.4}");

    let mut splitter = UtteranceSplitter::new(
        threshold,
        (16_000.0 * config.silence_secs).max(1.0) as usize,
        (16_000.0 * config.max_utterance_secs).max(1.0) as usize,
    );

    let backoff = Duration::from_secs_f32(config.retry_backoff_secs.max(0.0));

    // ── Listening ⇄ Transcribing ──────────────────────────────────────────
    while !stop.load(Ordering::Relaxed) {
        let chunk = match chunk_rx.recv_timeout(POLL_TIMEOUT) {
            Ok(chunk) => chunk,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("capture stream ended; speech worker exiting");
                return;
            }
        };

        let Some(utterance) = splitter.push(&to_16k_mono(&chunk)) else {
            continue;
        };

        // Transcribing — always returns to Listening afterwards.
        match stt.transcribe(&utterance) {
            Ok(text) => {
                let command = normalize_transcript(&text);
                if command.is_empty() {
                    continue; // nothing intelligible — not an error
                }
                log::info!("heard: {command:?}");
                if commands.send(command).is_err() {
                    // Consumer gone — the application is shutting down.
                    return;
                }
            }
            Err(e) if e.is_discardable() => {
                // Unrecognized utterance; keep listening.
            }
            Err(e) => {
                log::warn!("transcription backend failed: {e}; retrying after backoff");
                std::thread::sleep(backoff);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript normalization
// ---------------------------------------------------------------------------

/// Normalize a raw transcript into a command string: strip Whisper's
/// bracketed annotations (`[BLANK_AUDIO]`, `(music)`), drop punctuation,
/// lowercase, and collapse whitespace.
pub fn normalize_transcript(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_alphanumeric() => {
                for lower in c.to_lowercase() {
                    out.push(lower);
                }
            }
            c if c.is_whitespace() => out.push(' '),
            _ => {} // punctuation
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_whitespace_and_punctuation() {
        assert_eq!(normalize_transcript(" Next. "), "next");
        assert_eq!(normalize_transcript("Download Cyn, 8!"), "download cyn 8");
        assert_eq!(normalize_transcript("stop   slideshow"), "stop slideshow");
    }

    #[test]
    fn strips_bracketed_annotations() {
        assert_eq!(normalize_transcript("[BLANK_AUDIO]"), "");
        assert_eq!(normalize_transcript("(door slams) next"), "next");
        assert_eq!(normalize_transcript("next [laughs] please"), "next please");
    }

    #[test]
    fn empty_and_noise_only_input_yields_empty() {
        assert_eq!(normalize_transcript(""), "");
        assert_eq!(normalize_transcript("...!?"), "");
    }

    /// An engine transcript reaches the command queue normalized, so the
    /// dispatcher sees the same strings the UI controls produce.
    #[test]
    fn transcript_flows_to_command_queue_normalized() {
        use crate::dispatch::command_queue;
        use crate::stt::{MockSttEngine, SttEngine};

        let engine = MockSttEngine::ok(" Next, please! ");
        let (tx, rx) = command_queue();

        let audio = vec![0.1_f32; 16_000]; // 1 s @ 16 kHz
        let text = engine.transcribe(&audio).expect("mock transcribes");
        tx.send(normalize_transcript(&text)).expect("queue alive");

        assert_eq!(rx.try_recv().as_deref(), Ok("next please"));
    }

    #[test]
    fn handle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CaptureWorkerHandle>();
    }
}
