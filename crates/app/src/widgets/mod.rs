//! Reusable widgets for the uploader window.

pub mod drag_drop;
pub mod file_list;
pub mod file_picker;
pub mod notification;
pub mod progress;

pub use drag_drop::{DragDropHandler, DroppedItem};
pub use file_list::{show_file_list, FileListResponse};
pub use file_picker::FilePickerWidget;
pub use notification::show_notification;
pub use progress::show_progress;
