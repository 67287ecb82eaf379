//! Application entry point — Voice Gallery.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime for the fetch pipeline.
//! 4. Detect a speech backend and build the [`VoiceAnnouncer`].
//! 5. Create the command queue and the fetch completion channel.
//! 6. Load the Whisper engine; on failure voice input degrades to off.
//! 7. Spawn the speech capture worker thread.
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use voice_gallery::{
    app::GalleryApp,
    config::{AppConfig, AppPaths},
    dispatch,
    fetch::FetchOutcome,
    listen::CaptureWorker,
    media::MetadataStore,
    speak::VoiceAnnouncer,
    stt::{SttEngine, TranscribeParams, WhisperEngine},
};

fn native_options() -> eframe::NativeOptions {
    let vp = egui::ViewportBuilder::default()
        .with_inner_size([1000.0, 650.0])
        .with_min_inner_size([640.0, 420.0])
        .with_title("Voice Gallery");

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Gallery starting up");

    // 2. Configuration + paths
    let paths = AppPaths::new();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let media_dir = config.media.media_dir(&paths);
    let metadata_file = config.media.metadata_file(&paths);
    if let Err(e) = std::fs::create_dir_all(&media_dir) {
        log::warn!("Could not create media directory {}: {e}", media_dir.display());
    }

    // 3. Tokio runtime (2 workers — concurrent fetch runs share them)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Speech output
    let announcer = VoiceAnnouncer::detect(&config.speak);
    if !announcer.is_available() {
        log::warn!("No speech synthesis backend found; announcements are off");
    }

    // 5. Channel setup
    let (command_tx, command_rx) = dispatch::command_queue();
    let (fetch_tx, fetch_rx) = std::sync::mpsc::channel::<FetchOutcome>();

    // 6. Whisper engine (may fail if the model is absent — degrade to
    //    button/keyboard control only)
    let model_path = paths.models_dir.join(format!("{}.bin", config.listen.model));
    let params = TranscribeParams {
        language: config.listen.language.clone(),
        ..TranscribeParams::default()
    };

    // 7. Capture worker — only spawned when transcription is possible
    let capture = match WhisperEngine::load(&model_path, params) {
        Ok(engine) => {
            log::info!("Whisper model loaded: {}", model_path.display());
            let stt: Arc<dyn SttEngine> = Arc::new(engine);
            Some(CaptureWorker::spawn(
                config.listen.clone(),
                stt,
                announcer.clone(),
                command_tx.clone(),
            ))
        }
        Err(e) => {
            log::warn!(
                "Could not load Whisper model ({}): {e}. Voice commands are disabled.",
                model_path.display()
            );
            announcer.announce("Speech recognition is unavailable. Voice commands are disabled.");
            None
        }
    };

    // 8. Build the egui app and run it (blocks until the window is closed)
    let metadata = MetadataStore::load(&metadata_file);
    let app = GalleryApp::new(
        config,
        media_dir,
        metadata_file,
        metadata,
        command_tx,
        command_rx,
        fetch_tx,
        fetch_rx,
        announcer,
        rt.handle().clone(),
        capture,
    );

    eframe::run_native(
        "Voice Gallery",
        native_options(),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
