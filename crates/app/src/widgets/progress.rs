use crate::types::Progress;
use egui::Ui;

/// Progress bar for the upload in flight. Draws nothing while hidden.
pub fn show_progress(ui: &mut Ui, progress: &Progress, queued: usize) {
    if !progress.visible {
        return;
    }
    ui.add(
        egui::ProgressBar::new(progress.percent as f32 / 100.0)
            .show_percentage()
            .animate(progress.percent < 100),
    );
    ui.horizontal(|ui| {
        ui.label(&progress.text);
        // The file in flight is included in `queued`
        if queued > 1 {
            ui.weak(format!("({} more waiting)", queued - 1));
        }
    });
}
