//! Background work for the uploader window
//!
//! Runs listing fetches on the tokio runtime and reports back through the
//! channel handed out by `UploaderState::begin_refresh`.

use crate::types::{ListingResult, UploaderState};
use services::FileServer;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Start a listing fetch. Concurrent refreshes are not deduplicated.
pub fn request_refresh(
    state: &mut UploaderState,
    server: &Arc<dyn FileServer>,
    handle: &tokio::runtime::Handle,
) {
    let tx = state.begin_refresh();
    let server = Arc::clone(server);
    handle.spawn(run_refresh(server, tx));
}

async fn run_refresh(server: Arc<dyn FileServer>, tx: Sender<ListingResult>) {
    let result = server.list_files().await.map_err(|e| e.to_string());
    // The window may have closed in the meantime
    let _ = tx.send(result);
}
