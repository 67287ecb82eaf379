//! Spoken status announcements via the system speech synthesizer.
//!
//! [`VoiceAnnouncer::detect`] probes for a synthesis command once at
//! startup: `espeak-ng` (then `espeak`) on Linux, `say` on macOS, and the
//! PowerShell SAPI one-liner on Windows.  When nothing is found the
//! announcer becomes a silent no-op — a missing speech engine degrades the
//! feature, never the application.
//!
//! `announce` never blocks the caller: each call spawns a short-lived named
//! thread that speaks behind a shared mutex, so utterances play strictly
//! one at a time.  For announcements issued from the single presentation
//! loop, mutex acquisition order matches call order; no ordering is
//! promised across concurrent callers.

use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::config::SpeakConfig;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// The resolved synthesis invocation.
#[derive(Debug, Clone)]
enum Backend {
    /// Command that takes the text as its final argument
    /// (`espeak-ng`, `espeak`, `say`).
    TextArg(String),
    /// Windows PowerShell SAPI invocation; the text is interpolated into a
    /// script argument.
    #[allow(dead_code)] // constructed on Windows only
    PowerShell,
}

impl Backend {
    /// Speak `text`, blocking until playback ends.
    fn speak(&self, text: &str) -> std::io::Result<()> {
        let status = match self {
            Backend::TextArg(cmd) => Command::new(cmd)
                .arg(text)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()?,
            Backend::PowerShell => {
                // SAPI text is single-quoted; double any embedded quote.
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
                    text.replace('\'', "''")
                );
                Command::new("powershell")
                    .args(["-NoProfile", "-Command", &script])
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()?
            }
        };

        if !status.success() {
            log::warn!("speech synthesis exited with {status}");
        }
        Ok(())
    }
}

/// `true` when `cmd --version` runs at all (the probe used for espeak-style
/// binaries).
fn probe(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

fn detect_backend(config: &SpeakConfig) -> Option<Backend> {
    if let Some(cmd) = &config.command {
        if probe(cmd) {
            return Some(Backend::TextArg(cmd.clone()));
        }
        log::warn!("configured speech command {cmd:?} not found");
        return None;
    }

    #[cfg(target_os = "macos")]
    {
        // `say` ships with the OS; no probe needed.
        return Some(Backend::TextArg("say".into()));
    }

    #[cfg(target_os = "windows")]
    {
        return Some(Backend::PowerShell);
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        for cmd in ["espeak-ng", "espeak"] {
            if probe(cmd) {
                return Some(Backend::TextArg(cmd.into()));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// VoiceAnnouncer
// ---------------------------------------------------------------------------

/// Serializes text-to-speech utterances onto short-lived worker threads.
///
/// Cheap to clone; all clones share the same mutex and backend.
#[derive(Clone)]
pub struct VoiceAnnouncer {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Option<Backend>,
    // Guards the synthesis call so utterances never overlap.
    lock: Mutex<()>,
}

impl VoiceAnnouncer {
    /// Probe for a synthesis backend per `config`.
    ///
    /// Always succeeds; when disabled or nothing is found the returned
    /// announcer is a silent no-op (logged once).
    pub fn detect(config: &SpeakConfig) -> Self {
        let backend = if config.enabled {
            let b = detect_backend(config);
            if b.is_none() {
                log::warn!("no speech synthesizer found; announcements are disabled");
            }
            b
        } else {
            None
        };

        Self {
            inner: Arc::new(Inner {
                backend,
                lock: Mutex::new(()),
            }),
        }
    }

    /// A guaranteed-silent announcer, for tests and headless runs.
    pub fn silent() -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: None,
                lock: Mutex::new(()),
            }),
        }
    }

    /// `true` when a synthesis backend was found.
    pub fn is_available(&self) -> bool {
        self.inner.backend.is_some()
    }

    /// Queue `text` for speech.  Returns immediately; the utterance plays on
    /// its own thread once the previous one finishes.  Failures are logged
    /// and swallowed — this never blocks or panics the caller.
    pub fn announce(&self, text: &str) {
        let Some(backend) = self.inner.backend.clone() else {
            log::debug!("announce (muted): {text}");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let spawned = std::thread::Builder::new()
            .name("voice-announce".into())
            .spawn(move || {
                // A poisoned mutex only means a previous utterance panicked;
                // keep speaking.
                let _guard = inner.lock.lock().unwrap_or_else(|p| p.into_inner());
                if let Err(e) = backend.speak(&text) {
                    log::warn!("speech synthesis failed: {e}");
                }
            });

        if let Err(e) = spawned {
            log::warn!("could not spawn announce thread: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_announcer_is_a_noop() {
        let announcer = VoiceAnnouncer::silent();
        assert!(!announcer.is_available());
        // Must not block and must not panic.
        announcer.announce("hello");
    }

    #[test]
    fn disabled_config_yields_silent_announcer() {
        let config = SpeakConfig {
            enabled: false,
            command: None,
        };
        let announcer = VoiceAnnouncer::detect(&config);
        assert!(!announcer.is_available());
        announcer.announce("still fine");
    }

    #[test]
    fn missing_configured_command_degrades() {
        let config = SpeakConfig {
            enabled: true,
            command: Some("definitely-not-a-real-binary-xyz".into()),
        };
        let announcer = VoiceAnnouncer::detect(&config);
        assert!(!announcer.is_available());
    }

    #[test]
    fn announcer_is_send_and_clone() {
        fn assert_send_clone<T: Send + Clone>() {}
        assert_send_clone::<VoiceAnnouncer>();
    }
}
