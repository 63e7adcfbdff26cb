//! Transient banner in the top-right corner.

use crate::types::{Notification, NotificationKind};
use egui::{Align2, Area, Color32, Context, Frame, Id, Order, RichText, Rounding, Vec2};

/// Draw the banner in the top-right corner, above everything else.
pub fn show_notification(ctx: &Context, notification: &Notification) {
    let (fill, icon) = match notification.kind {
        NotificationKind::Success => (Color32::from_rgb(46, 160, 67), "✅"),
        NotificationKind::Error => (Color32::from_rgb(207, 34, 46), "❌"),
    };

    Area::new(Id::new("upload_notification"))
        .order(Order::Foreground)
        .anchor(Align2::RIGHT_TOP, Vec2::new(-16.0, 16.0))
        .interactable(false)
        .show(ctx, |ui| {
            Frame::none()
                .fill(fill)
                .rounding(Rounding::same(8.0))
                .inner_margin(egui::Margin::symmetric(14.0, 10.0))
                .show(ui, |ui| {
                    ui.set_max_width(360.0);
                    ui.label(
                        RichText::new(format!("{} {}", icon, notification.message))
                            .color(Color32::WHITE),
                    );
                });
        });
}
