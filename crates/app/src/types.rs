//! Core types for the uploader window
//!
//! `UploaderState` is the single view-state object. Background work never
//! touches it directly: upload events and listing results arrive over
//! channels and are applied on the UI thread by the `poll_*` methods.

use services::UploadEvent;
use shared::files::sort_newest_first;
use shared::settings::UploaderSettings;
use shared::FileRecord;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(4);

/// Result from a background listing fetch
pub type ListingResult = Result<Vec<FileRecord>, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    /// Still on screen at `now`.
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < NOTIFICATION_LIFETIME
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub visible: bool,
    /// 0-100
    pub percent: u8,
    pub text: String,
}

/// Follow-up work the UI thread has to start after applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RefreshListing,
}

pub struct UploaderState {
    pub settings: UploaderSettings,
    drag_over: bool,
    progress: Progress,
    notification: Option<Notification>,
    refresh_busy: bool,
    /// Newest first
    files: Vec<FileRecord>,
    /// Files handed to the queue that have not finished yet
    queued: usize,
    pub upload_events_rx: Option<Receiver<UploadEvent>>,
    listing_tx: Sender<ListingResult>,
    listing_rx: Receiver<ListingResult>,
}

impl UploaderState {
    /// Empty state: no files, nothing queued, no notification.
    pub fn new(settings: UploaderSettings) -> Self {
        let (listing_tx, listing_rx) = channel();
        Self {
            settings,
            drag_over: false,
            progress: Progress::default(),
            notification: None,
            refresh_busy: false,
            files: Vec::new(),
            queued: 0,
            upload_events_rx: None,
            listing_tx,
            listing_rx,
        }
    }

    // Drag highlight

    /// Toggle the drop zone highlight.
    pub fn set_drag_over(&mut self, on: bool) {
        self.drag_over = on;
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    // Progress

    /// Reveal the progress area without touching bar or text.
    pub fn show_progress(&mut self) {
        self.progress.visible = true;
    }

    /// Set the bar (clamped to 100) and the status line.
    pub fn update_progress(&mut self, percent: u8, text: impl Into<String>) {
        self.progress.percent = percent.min(100);
        self.progress.text = text.into();
    }

    /// Hide the progress area and reset it to 0% with empty text.
    pub fn hide_progress(&mut self) {
        self.progress.visible = false;
        self.update_progress(0, "");
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    // Notifications

    /// Replace whatever notification is showing.
    pub fn show_notification(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.show_notification_at(kind, message, Instant::now());
    }

    /// `show_notification` with an explicit clock.
    pub fn show_notification_at(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) {
        self.notification = Some(Notification {
            kind,
            message: message.into(),
            shown_at: now,
        });
    }

    /// The notification to draw at `now`, if it has not expired.
    pub fn visible_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| n.is_visible_at(now))
    }

    /// Drop an expired notification so the slot reads as empty.
    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| !n.is_visible_at(now))
        {
            self.notification = None;
        }
    }

    // Listing

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Replace the listing, sorted newest first.
    pub fn set_files(&mut self, mut files: Vec<FileRecord>) {
        sort_newest_first(&mut files);
        self.files = files;
    }

    pub fn is_refresh_busy(&self) -> bool {
        self.refresh_busy
    }

    /// Mark a refresh as started and hand out the sender its result goes to.
    pub fn begin_refresh(&mut self) -> Sender<ListingResult> {
        self.refresh_busy = true;
        self.listing_tx.clone()
    }

    /// Apply any finished listing fetches. The last one to arrive wins.
    pub fn poll_listing(&mut self) {
        while let Ok(result) = self.listing_rx.try_recv() {
            self.apply_listing_result(result);
        }
    }

    /// Apply one listing result. Failures keep the current list and raise an error banner.
    pub fn apply_listing_result(&mut self, result: ListingResult) {
        // Any completion clears the busy indicator, even if others are still in flight
        self.refresh_busy = false;
        match result {
            Ok(files) => {
                tracing::info!(count = files.len(), "listing refreshed");
                self.set_files(files);
            }
            Err(e) => {
                tracing::warn!("failed to load files: {}", e);
                self.show_notification(NotificationKind::Error, "Failed to load files");
            }
        }
    }

    // Uploads

    /// Count files handed to the upload worker.
    pub fn files_queued(&mut self, count: usize) {
        self.queued += count;
    }

    pub fn queued(&self) -> usize {
        self.queued
    }

    /// Apply pending upload events and collect the follow-up actions.
    pub fn poll_upload_events(&mut self) -> Vec<Action> {
        let events: Vec<UploadEvent> = match &self.upload_events_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return Vec::new(),
        };
        let now = Instant::now();
        events
            .into_iter()
            .filter_map(|event| self.apply_upload_event(event, now))
            .collect()
    }

    /// Update progress and notifications for one upload event.
    ///
    /// Returns `RefreshListing` once the post-success pause has elapsed.
    pub fn apply_upload_event(&mut self, event: UploadEvent, now: Instant) -> Option<Action> {
        match event {
            UploadEvent::Started { name } => {
                self.show_progress();
                self.update_progress(0, format!("Uploading {}...", name));
                None
            }
            UploadEvent::Succeeded { name } => {
                self.update_progress(100, "Upload complete!");
                self.show_notification_at(
                    NotificationKind::Success,
                    format!("{} uploaded successfully!", name),
                    now,
                );
                None
            }
            UploadEvent::Settled { .. } => {
                self.queued = self.queued.saturating_sub(1);
                self.hide_progress();
                Some(Action::RefreshListing)
            }
            UploadEvent::Failed { name, message } => {
                self.queued = self.queued.saturating_sub(1);
                self.show_notification_at(
                    NotificationKind::Error,
                    format!("Failed to upload {}: {}", name, message),
                    now,
                );
                self.hide_progress();
                None
            }
        }
    }

    /// Whether the UI should keep repainting to observe timers and background work.
    pub fn needs_repaint(&self, now: Instant) -> bool {
        self.refresh_busy
            || self.queued > 0
            || self.progress.visible
            || self.visible_notification(now).is_some()
    }
}
