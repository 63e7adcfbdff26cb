use eframe::egui;
use services::{FileServer, HttpFileServer, UploadQueue};
use shared::UploadTarget;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod widgets;
use widgets::{DragDropHandler, FilePickerWidget};

// Types module - view state and notifications
mod types;
pub use types::*;

// Background listing fetches
mod state;
use state::request_refresh;

mod utils;
use utils::{load_settings_or_default, targets_from_drops, targets_from_paths};

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings_or_default();
    tracing::info!(server = %settings.server_url, "starting UFO uploader");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let server: Arc<dyn FileServer> = Arc::new(HttpFileServer::new(
        &settings.server_url,
        settings.request_timeout(),
    )?);
    let (queue, upload_events_rx) = UploadQueue::start(Arc::clone(&server), runtime.handle());

    let mut state = UploaderState::new(settings);
    state.upload_events_rx = Some(upload_events_rx);

    let picker = match directories::UserDirs::new() {
        Some(dirs) => FilePickerWidget::new().with_start_dir(dirs.home_dir().to_path_buf()),
        None => FilePickerWidget::new(),
    }
    .with_title("Select files to upload")
    .multiple(true);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([480.0, 420.0])
            .with_drag_and_drop(true),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "UFO File Upload",
        options,
        Box::new(move |_cc| {
            Box::new(UploaderApp {
                state,
                runtime,
                server,
                queue,
                drop_zone: DragDropHandler::default(),
                picker,
                loaded: false,
            })
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {}", e))
}

struct UploaderApp {
    state: UploaderState,
    // Kept alive for the lifetime of the window; the upload worker runs on it
    runtime: tokio::runtime::Runtime,
    server: Arc<dyn FileServer>,
    queue: UploadQueue,
    drop_zone: DragDropHandler,
    picker: FilePickerWidget,
    /// Initial listing requested
    loaded: bool,
}

impl UploaderApp {
    fn refresh(&mut self) {
        request_refresh(&mut self.state, &self.server, self.runtime.handle());
    }

    fn enqueue(&mut self, targets: Vec<UploadTarget>) {
        let count = targets.len();
        if count == 0 {
            return;
        }
        if self.queue.enqueue(targets) {
            self.state.files_queued(count);
        } else {
            tracing::error!("upload worker is not running");
            self.state
                .show_notification(NotificationKind::Error, "Upload worker stopped");
        }
    }

    fn enqueue_paths(&mut self, paths: Vec<std::path::PathBuf>) {
        let converted = targets_from_paths(paths);
        self.enqueue_converted(converted);
    }

    fn enqueue_converted(
        &mut self,
        (targets, failures): (Vec<UploadTarget>, Vec<(String, shared::UploadError)>),
    ) {
        for (name, err) in failures {
            tracing::warn!(file = %name, "cannot upload: {}", err);
            self.state.show_notification(
                NotificationKind::Error,
                format!("Failed to upload {}: {}", name, err),
            );
        }
        self.enqueue(targets);
    }

    fn open_picker(&mut self) {
        let paths = self.picker.pick_files();
        self.enqueue_paths(paths);
    }

    /// Queue everything dropped this frame as one batch, in drop order.
    fn take_drops(&mut self) {
        let dropped = self.drop_zone.take_dropped();
        if dropped.is_empty() {
            return;
        }
        let converted = targets_from_drops(dropped);
        self.enqueue_converted(converted);
    }

    fn copy_listing_html(&mut self, ctx: &egui::Context) {
        let html = shared::format::render_listing_html(self.state.files(), chrono::Utc::now());
        ctx.output_mut(|o| o.copied_text = html);
        self.state
            .show_notification(NotificationKind::Success, "Listing copied as HTML");
    }
}

impl eframe::App for UploaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.loaded {
            self.loaded = true;
            self.refresh();
        }

        // Apply background results before drawing
        for action in self.state.poll_upload_events() {
            match action {
                Action::RefreshListing => self.refresh(),
            }
        }
        self.state.poll_listing();

        self.drop_zone.update(ctx);
        self.state.set_drag_over(self.drop_zone.is_highlighted());
        self.take_drops();

        let now = Instant::now();
        self.state.expire_notification(now);

        let mut style = (*ctx.style()).clone();
        style.visuals = if self.state.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        ctx.set_style(style);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("🛸 UFO File Upload").size(22.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.state.settings.server_url);
                });
            });
            ui.add_space(8.0);
        });

        let mut open_picker = false;
        let mut list_response = widgets::FileListResponse::default();

        egui::CentralPanel::default().show(ctx, |ui| {
            let zone_size = egui::vec2(ui.available_width(), 160.0);
            let zone = self
                .drop_zone
                .show_drop_zone(ui, zone_size, "☁ Drag & drop files here or click to browse");

            // The button sits inside the zone; one click opens one dialog
            let button_rect = egui::Rect::from_center_size(
                zone.rect.center() + egui::vec2(0.0, 24.0),
                egui::vec2(140.0, 32.0),
            );
            let button = ui.put(button_rect, egui::Button::new("📤 Choose Files"));
            if button.clicked() || zone.clicked() {
                open_picker = true;
            }

            ui.add_space(12.0);
            widgets::show_progress(ui, self.state.progress(), self.state.queued());
            ui.add_space(12.0);

            list_response = widgets::show_file_list(
                ui,
                self.state.files(),
                self.state.is_refresh_busy(),
                chrono::Utc::now(),
            );
        });

        if let Some(notification) = self.state.visible_notification(now) {
            widgets::show_notification(ctx, notification);
        }

        if open_picker {
            self.open_picker();
        }
        if list_response.refresh_clicked {
            self.refresh();
        }
        if list_response.copy_html_clicked {
            self.copy_listing_html(ctx);
        }

        // Keep polling while uploads, refreshes or the banner timer are pending
        if self.state.needs_repaint(now) || self.state.is_drag_over() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
