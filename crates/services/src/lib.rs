//! Network side of the uploader: the HTTP client for the upload server and
//! the sequential upload queue that drives it.

pub mod file_server;
pub mod upload_queue;

pub use file_server::{FileServer, HttpFileServer};
pub use upload_queue::{UploadEvent, UploadQueue, SETTLE_DELAY};
