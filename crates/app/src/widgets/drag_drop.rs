//! Drop zone for files dragged onto the window.
//!
//! egui reports hovered and dropped files for the whole window. The handler
//! consumes all of them every frame and only forwards drops that land on the
//! zone, so a file released elsewhere in the window is ignored instead of
//! being uploaded.

use egui::{Context, Pos2, Rect, Response, Sense, Ui, Vec2};
use shared::UploadTarget;
use std::path::PathBuf;

/// A file released over the zone.
#[derive(Debug, Clone)]
pub enum DroppedItem {
    Path(PathBuf),
    Target(UploadTarget),
}

/// Highlight bookkeeping for the zone, independent of egui's input plumbing.
#[derive(Debug, Default, Clone)]
pub struct DropZoneTracker {
    zone: Option<Rect>,
    highlight: bool,
    /// Pointer position when the current hover began
    hover_origin: Option<Pos2>,
}

impl DropZoneTracker {
    /// Record where the zone was laid out this frame.
    pub fn set_zone(&mut self, rect: Rect) {
        self.zone = Some(rect);
    }

    /// Unknown positions count as inside: some platforms stop reporting the
    /// pointer while an OS drag is in progress.
    fn contains(&self, pos: Option<Pos2>) -> bool {
        match (self.zone, pos) {
            (Some(zone), Some(pos)) => zone.contains(pos),
            _ => true,
        }
    }

    /// Pointer moved while files are hovering over the window.
    pub fn drag_over(&mut self, pos: Option<Pos2>) {
        if self.hover_origin.is_none() {
            self.hover_origin = pos;
        }
        if self.contains(pos) {
            self.highlight = true;
        } else {
            self.drag_leave(pos);
        }
    }

    /// Clear the highlight only if `related` (where the pointer went) is outside
    /// the zone. Moving onto the zone's own label or button keeps it lit.
    pub fn drag_leave(&mut self, related: Option<Pos2>) {
        let still_inside = match (self.zone, related) {
            (Some(zone), Some(pos)) => zone.contains(pos),
            _ => false,
        };
        if !still_inside {
            self.highlight = false;
        }
        if related.is_none() {
            self.hover_origin = None;
        }
    }

    /// Clear the highlight and report whether the drop landed on the zone.
    ///
    /// A position that has not changed since the hover began is stale (the
    /// platform sent no cursor events during the OS drag) and is accepted.
    pub fn drop_at(&mut self, pos: Option<Pos2>) -> bool {
        self.highlight = false;
        let origin = self.hover_origin.take();
        let stale = pos.is_some() && origin == pos;
        stale || self.contains(pos)
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight
    }
}

/// Handler for drag and drop file operations.
#[derive(Default)]
pub struct DragDropHandler {
    tracker: DropZoneTracker,
    dropped: Vec<DroppedItem>,
    /// Whether files are being dragged over the window at all
    hovering: bool,
}

impl DragDropHandler {
    /// Process hovered and dropped files for this frame.
    ///
    /// Call once per frame, before `show_drop_zone`.
    pub fn update(&mut self, ctx: &Context) {
        ctx.input(|i| {
            let pos = i.pointer.latest_pos();
            let hovering = !i.raw.hovered_files.is_empty();

            if hovering {
                self.tracker.drag_over(pos);
            } else if self.hovering && i.raw.dropped_files.is_empty() {
                // Drag left the window or was cancelled
                self.tracker.drag_leave(None);
            }
            self.hovering = hovering;

            if i.raw.dropped_files.is_empty() {
                return;
            }
            if !self.tracker.drop_at(pos) {
                tracing::info!(
                    count = i.raw.dropped_files.len(),
                    ?pos,
                    "ignoring files dropped outside the upload zone"
                );
                return;
            }
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    self.dropped.push(DroppedItem::Path(path.clone()));
                } else if let Some(bytes) = &file.bytes {
                    self.dropped.push(DroppedItem::Target(UploadTarget::from_bytes(
                        file.name.clone(),
                        bytes.clone(),
                    )));
                }
            }
        });
    }

    /// Take and clear dropped files.
    pub fn take_dropped(&mut self) -> Vec<DroppedItem> {
        std::mem::take(&mut self.dropped)
    }

    /// Whether the zone should draw its drag highlight.
    pub fn is_highlighted(&self) -> bool {
        self.tracker.is_highlighted()
    }

    /// Draw the drop zone. The response senses clicks so the caller can open the picker.
    pub fn show_drop_zone(&mut self, ui: &mut Ui, size: Vec2, label: &str) -> Response {
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        self.tracker.set_zone(rect);
        let highlight = self.tracker.is_highlighted();

        let visuals = if highlight || response.hovered() {
            ui.visuals().widgets.hovered
        } else {
            ui.visuals().widgets.inactive
        };

        ui.painter().rect(
            rect,
            8.0,
            if highlight {
                visuals.bg_fill.gamma_multiply(1.2)
            } else {
                visuals.bg_fill
            },
            visuals.bg_stroke,
        );

        if highlight {
            let stroke = egui::Stroke::new(2.0, ui.visuals().selection.bg_fill);
            ui.painter().rect_stroke(rect, 8.0, stroke);
        }

        ui.painter().text(
            rect.center() - Vec2::new(0.0, 18.0),
            egui::Align2::CENTER_CENTER,
            if highlight { "📥 Drop files here" } else { label },
            egui::FontId::proportional(16.0),
            if highlight {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().text_color()
            },
        );

        response.on_hover_cursor(egui::CursorIcon::PointingHand)
    }
}
