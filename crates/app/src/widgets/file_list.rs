//! Listing of files already on the server.

use chrono::{DateTime, Utc};
use egui::{Color32, RichText, Ui};
use shared::format::{format_file_size, format_record_date};
use shared::FileRecord;

/// What the user clicked in the list header this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileListResponse {
    pub refresh_clicked: bool,
    pub copy_html_clicked: bool,
}

/// A row as displayed: name, size and date already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub size: String,
    pub date: String,
}

/// Format `files` (already newest first) for display.
pub fn rows(files: &[FileRecord], now: DateTime<Utc>) -> Vec<FileRow> {
    files
        .iter()
        .map(|f| FileRow {
            name: f.name.clone(),
            size: format_file_size(f.size),
            date: format_record_date(f, now),
        })
        .collect()
}

/// Draw the listing header and rows, reporting which header buttons were clicked.
pub fn show_file_list(
    ui: &mut Ui,
    files: &[FileRecord],
    refresh_busy: bool,
    now: DateTime<Utc>,
) -> FileListResponse {
    let mut response = FileListResponse::default();

    ui.horizontal(|ui| {
        ui.heading("Uploaded Files");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label_color = if refresh_busy {
                ui.visuals().text_color().gamma_multiply(0.7)
            } else {
                ui.visuals().text_color()
            };
            if ui
                .button(RichText::new("🔄 Refresh").color(label_color))
                .clicked()
            {
                response.refresh_clicked = true;
            }
            if refresh_busy {
                ui.spinner();
            }
            if ui
                .add_enabled(!files.is_empty(), egui::Button::new("📋 Copy as HTML"))
                .clicked()
            {
                response.copy_html_clicked = true;
            }
        });
    });
    ui.separator();

    if files.is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("📭").size(32.0));
            ui.label(RichText::new("No files uploaded yet").color(Color32::GRAY));
        });
        return response;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for row in rows(files, now) {
                ui.horizontal(|ui| {
                    ui.label("📄");
                    // Plain text label: names are never interpreted as markup
                    ui.label(RichText::new(&row.name).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(&row.date).color(Color32::GRAY));
                        ui.label(RichText::new(&row.size).color(Color32::GRAY));
                    });
                });
                ui.separator();
            }
        });

    response
}
