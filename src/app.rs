//! Voice Gallery — egui/eframe presentation loop.
//!
//! # Architecture
//!
//! [`GalleryApp`] is the top-level [`eframe::App`].  It is the single owner
//! of the media collection and both schedulers; every concurrent input
//! reaches it through one of two channels polled in `update()`:
//!
//! * `command_rx` — normalized command strings from the speech capture
//!   worker *and* from the UI controls (both produce identical strings, so
//!   a button press is indistinguishable downstream from a spoken command).
//! * `fetch_rx` — one [`FetchOutcome`] per completed download run.
//!
//! Commands are not applied as they arrive: a repeating dispatch timer
//! drains the queue on its own short period, so ordering is FIFO and every
//! mutation of UI-visible state happens here, on the presentation loop.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::AppConfig;
use crate::dispatch::{parse_command, CommandKind, CommandReceiver, CommandSender};
use crate::fetch::{self, FetchOutcome};
use crate::listen::CaptureWorkerHandle;
use crate::media::{MediaCollection, MetadataStore};
use crate::schedule::{AnimationScheduler, RepeatingTimer, SlideshowScheduler};
use crate::speak::VoiceAnnouncer;

// ---------------------------------------------------------------------------
// GalleryApp
// ---------------------------------------------------------------------------

/// eframe application — the voice-controlled media browser window.
pub struct GalleryApp {
    // ── Collection state ─────────────────────────────────────────────────
    collection: MediaCollection,
    metadata: MetadataStore,
    media_dir: PathBuf,
    metadata_file: PathBuf,

    // ── Presentation-loop schedulers ─────────────────────────────────────
    animation: AnimationScheduler,
    slideshow: SlideshowScheduler,
    dispatch_timer: RepeatingTimer,

    // ── Display state ────────────────────────────────────────────────────
    /// Frame of the current item being shown.
    frame_index: usize,
    /// Uploaded texture and the (item path, frame) pair it was built from.
    /// Keyed on the path, not the cursor position: a reload can put a
    /// different item at the same position.
    texture: Option<(egui::TextureHandle, PathBuf, usize)>,
    /// One-line status shown in the bottom bar next to the item counter.
    status: String,
    /// Query box contents for the Download control.
    query_input: String,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: CommandSender,
    command_rx: CommandReceiver,
    fetch_tx: mpsc::Sender<FetchOutcome>,
    fetch_rx: mpsc::Receiver<FetchOutcome>,

    // ── Collaborators ────────────────────────────────────────────────────
    announcer: VoiceAnnouncer,
    runtime: tokio::runtime::Handle,
    client: reqwest::Client,
    config: AppConfig,
    /// Keeps the capture thread alive for the lifetime of the window.
    _capture: Option<CaptureWorkerHandle>,
}

impl GalleryApp {
    /// Build the application and load the media collection from disk.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AppConfig,
        media_dir: PathBuf,
        metadata_file: PathBuf,
        metadata: MetadataStore,
        command_tx: CommandSender,
        command_rx: CommandReceiver,
        fetch_tx: mpsc::Sender<FetchOutcome>,
        fetch_rx: mpsc::Receiver<FetchOutcome>,
        announcer: VoiceAnnouncer,
        runtime: tokio::runtime::Handle,
        capture: Option<CaptureWorkerHandle>,
    ) -> Self {
        let collection = MediaCollection::load(&media_dir, &metadata);

        let now = Instant::now();
        let mut dispatch_timer =
            RepeatingTimer::new(Duration::from_millis(config.timing.dispatch_ms));
        dispatch_timer.arm(now);

        let client = fetch::build_client(&config.fetch);

        let mut app = Self {
            collection,
            metadata,
            media_dir,
            metadata_file,
            animation: AnimationScheduler::new(Duration::from_millis(config.timing.animation_ms)),
            slideshow: SlideshowScheduler::new(Duration::from_secs_f32(
                config.timing.slideshow_secs,
            )),
            dispatch_timer,
            frame_index: 0,
            texture: None,
            status: String::new(),
            query_input: String::new(),
            command_tx,
            command_rx,
            fetch_tx,
            fetch_rx,
            announcer,
            runtime,
            client,
            config,
            _capture: capture,
        };
        app.show_current(now);
        app
    }

    /// Producer half of the command queue, for callers outside the window.
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    // ── Display ──────────────────────────────────────────────────────────

    /// Point the display at the collection's current item: reset the frame
    /// cursor and rearm (or cancel) the animation timer.
    fn show_current(&mut self, now: Instant) {
        self.frame_index = 0;
        match self.collection.current() {
            Some(item) => self.animation.start(item.frames().len(), now),
            None => self.animation.stop(),
        }
    }

    fn advance(&mut self, delta: isize, now: Instant) {
        if self.collection.advance(delta).is_some() {
            self.show_current(now);
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain completed fetch runs (non-blocking).
    fn poll_fetch(&mut self, now: Instant) {
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            match outcome {
                FetchOutcome::Saved { query, paths } => {
                    let n = paths.len();
                    self.reload_collection(paths.first().cloned(), now);
                    self.status = format!("saved {n} file(s) for \"{query}\"");
                    self.announcer
                        .announce(&format!("Saved {n} new images for {query}."));
                }
                FetchOutcome::Empty { query } => {
                    self.status = format!("no results for \"{query}\"");
                    self.announcer
                        .announce(&format!("Sorry, I found nothing for {query}."));
                }
            }
        }
    }

    /// Rescan the media directory after a fetch and show `select`, or the
    /// first item when it is gone or unset.
    fn reload_collection(&mut self, select: Option<PathBuf>, now: Instant) {
        self.metadata = MetadataStore::load(&self.metadata_file);
        self.collection = MediaCollection::load(&self.media_dir, &self.metadata);
        if let Some(path) = select {
            self.collection.select_path(&path);
        }
        self.show_current(now);
    }

    // ── Command dispatch ─────────────────────────────────────────────────

    /// Drain the command queue completely.  Commands arriving during the
    /// drain wait for the next tick.
    fn dispatch_tick(&mut self, ctx: &egui::Context, now: Instant) {
        let pending: Vec<String> = self.command_rx.try_iter().collect();
        for raw in pending {
            self.apply_command(&raw, ctx, now);
        }
    }

    fn apply_command(&mut self, raw: &str, ctx: &egui::Context, now: Instant) {
        match parse_command(raw) {
            CommandKind::Next => self.advance(1, now),
            CommandKind::Previous => self.advance(-1, now),
            CommandKind::StartSlideshow => {
                if !self.collection.is_empty() {
                    self.slideshow.start(now);
                    self.announcer.announce("Slideshow started.");
                }
            }
            CommandKind::StopSlideshow => {
                self.slideshow.stop();
                self.announcer.announce("Slideshow stopped.");
            }
            CommandKind::Download { query, count } => {
                let count = count.unwrap_or(self.config.fetch.default_count);
                self.status = format!("fetching \"{query}\"...");
                self.announcer.announce(&format!("Downloading {query}."));
                self.spawn_fetch(query, count, ctx);
            }
            CommandKind::Quit => {
                self.announcer.announce("Goodbye.");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            CommandKind::Unrecognized(text) => {
                self.announcer
                    .announce(&format!("Command not recognized: {text}."));
            }
        }
    }

    /// Launch one fetch run on the tokio runtime.  Concurrent runs are
    /// permitted; filename generation keeps their outputs distinct.
    fn spawn_fetch(&self, query: String, count: usize, ctx: &egui::Context) {
        let client = self.client.clone();
        let config = self.config.fetch.clone();
        let media_dir = self.media_dir.clone();
        let fetch_tx = self.fetch_tx.clone();
        let repaint_ctx = ctx.clone();

        self.runtime.spawn(async move {
            let outcome = fetch::run(client, config, query, count, &media_dir).await;
            if fetch_tx.send(outcome).is_ok() {
                repaint_ctx.request_repaint();
            }
        });
    }

    // ── Keyboard ─────────────────────────────────────────────────────────

    /// Arrow keys and space feed the same queue as spoken commands.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Stay out of the way while the query box (or any widget) owns the
        // keyboard.
        if ctx.wants_keyboard_input() {
            return;
        }
        let (left, right, space) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Space),
            )
        });

        if left {
            let _ = self.command_tx.send("previous".into());
        }
        if right {
            let _ = self.command_tx.send("next".into());
        }
        if space {
            let toggle = if self.slideshow.is_active() {
                "stop slideshow"
            } else {
                "start slideshow"
            };
            let _ = self.command_tx.send(toggle.into());
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Return the texture for the current (item, frame), uploading it only
    /// when either changed since the last frame.
    fn current_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let item = self.collection.current()?;
        let frame_index = self.frame_index.min(item.frames().len().saturating_sub(1));

        if let Some((handle, path, frame)) = &self.texture {
            if path == item.path() && *frame == frame_index {
                return Some(handle.clone());
            }
        }

        let frame = item.frames().get(frame_index)?;
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.rgba,
        );
        let handle = ctx.load_texture("media-frame", image, egui::TextureOptions::LINEAR);
        self.texture = Some((handle.clone(), item.path().to_path_buf(), frame_index));
        Some(handle)
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Prev").clicked() {
                let _ = self.command_tx.send("previous".into());
            }
            if ui.button("Next").clicked() {
                let _ = self.command_tx.send("next".into());
            }
            let slideshow_label = if self.slideshow.is_active() {
                "Pause"
            } else {
                "Play"
            };
            if ui.button(slideshow_label).clicked() {
                let toggle = if self.slideshow.is_active() {
                    "stop slideshow"
                } else {
                    "start slideshow"
                };
                let _ = self.command_tx.send(toggle.into());
            }

            ui.separator();

            ui.add(
                egui::TextEdit::singleline(&mut self.query_input)
                    .hint_text("search query")
                    .desired_width(160.0),
            );
            if ui.button("Download").clicked() && !self.query_input.trim().is_empty() {
                let _ = self
                    .command_tx
                    .send(format!("download {}", self.query_input.trim().to_lowercase()));
                self.query_input.clear();
            }
        });
    }

    fn draw_info_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Info");
        ui.add_space(4.0);
        match self.collection.current() {
            Some(item) => {
                ui.label(egui::RichText::new(item.display_name()).strong());
                ui.add_space(4.0);
                ui.label(item.description());
            }
            None => {
                ui.label("No media loaded.");
            }
        }

        ui.add_space(12.0);
        ui.heading("Controls");
        ui.add_space(4.0);
        ui.label("Left / Right : previous / next");
        ui.label("Space : play or pause slideshow");
        ui.label("Say: \"next\", \"start slideshow\",\n\"download <query> [count]\", \"quit\"");

        ui.add_space(12.0);
        if self.announcer.is_available() {
            ui.label("Speech output: on");
        } else {
            ui.label("Speech output: unavailable");
        }
    }

    fn status_line(&self) -> String {
        let counter = match self.collection.current() {
            Some(item) => format!(
                "{}/{} — {}",
                self.collection.position(),
                self.collection.len(),
                item.file_name()
            ),
            None => "0 images".to_string(),
        };
        if self.status.is_empty() {
            counter
        } else {
            format!("{counter}   |   {}", self.status)
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for GalleryApp {
    /// Called every frame.  Polls channels, fires due timers, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_fetch(now);
        self.handle_keys(ctx);

        // Timers, in a fixed order: animation frames first, then slideshow
        // advance, then the command drain.
        if let Some(frame) = self.animation.tick(now) {
            self.frame_index = frame;
        }
        if self.slideshow.tick(now) {
            self.advance(1, now);
        }
        if self.dispatch_timer.fire_if_due(now) {
            self.dispatch_tick(ctx, now);
        }

        // Keep polling while anything is scheduled; timers are Instant-based
        // so a late repaint only delays, never drops, a tick.
        ctx.request_repaint_after(Duration::from_millis(50));

        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            ui.label(self.status_line());
        });

        egui::SidePanel::right("info-panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.draw_info_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let texture = self.current_texture(ctx);
            ui.vertical(|ui| {
                let image_height = ui.available_height() - 36.0;
                ui.allocate_ui(egui::vec2(ui.available_width(), image_height), |ui| {
                    ui.centered_and_justified(|ui| match texture {
                        Some(handle) => {
                            ui.add(
                                egui::Image::new(&handle)
                                    .maintain_aspect_ratio(true)
                                    .shrink_to_fit(),
                            );
                        }
                        None => {
                            ui.label(format!(
                                "No images found.\nPlace media files in {}.",
                                self.media_dir.display()
                            ));
                        }
                    });
                });
                self.draw_controls(ui);
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("gallery window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::tempdir;

    use crate::media::{MediaCollection, MetadataStore};

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(2, 2).save(&path).expect("write png");
        path
    }

    /// A downloaded file that sorts ahead of the only existing item lands at
    /// the same cursor position after a reload.  The texture cache therefore
    /// keys on the item path: across such a reload the (position, frame)
    /// pair is unchanged while the displayed item is not.
    #[test]
    fn reload_can_put_a_different_item_at_the_same_position() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "zebra.png");

        let store = MetadataStore::default();
        let collection = MediaCollection::load(dir.path(), &store);
        let old_position = collection.position();
        let old_path = collection
            .current()
            .expect("one item")
            .path()
            .to_path_buf();

        let fetched = write_png(dir.path(), "fetched_20260830120000000_0.png");
        let mut reloaded = MediaCollection::load(dir.path(), &store);
        assert!(reloaded.select_path(&fetched));

        assert_eq!(reloaded.position(), old_position);
        assert_ne!(reloaded.current().expect("selected item").path(), old_path);
    }
}
