//! Sequential upload worker.
//!
//! Every batch of picked or dropped files is pushed onto one queue, and a
//! single task drains it one file at a time. A file's handling, including the
//! settle delay after a success, finishes before the next file starts, so at
//! most one upload request is in flight.

use shared::UploadTarget;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::file_server::FileServer;

/// Pause between a successful upload and hiding the progress bar.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Progress of the queue, as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { name: String },
    Succeeded { name: String },
    /// Emitted `SETTLE_DELAY` after `Succeeded`; the listing should be refreshed now.
    Settled { name: String },
    Failed { name: String, message: String },
}

pub struct UploadQueue {
    tx: UnboundedSender<Vec<UploadTarget>>,
}

impl UploadQueue {
    /// Spawn the worker on `handle`. Events are delivered on the returned receiver,
    /// which the UI polls with `try_recv`.
    pub fn start(
        server: Arc<dyn FileServer>,
        handle: &tokio::runtime::Handle,
    ) -> (Self, Receiver<UploadEvent>) {
        Self::start_with_delay(server, handle, SETTLE_DELAY)
    }

    /// Same as `start` with a custom pause after each success.
    pub fn start_with_delay(
        server: Arc<dyn FileServer>,
        handle: &tokio::runtime::Handle,
        settle_delay: Duration,
    ) -> (Self, Receiver<UploadEvent>) {
        let (tx, mut rx) = unbounded_channel::<Vec<UploadTarget>>();
        let (events_tx, events_rx) = channel();

        handle.spawn(async move {
            while let Some(batch) = rx.recv().await {
                run_batch(server.as_ref(), batch, &events_tx, settle_delay).await;
            }
            tracing::debug!("upload queue closed");
        });

        (Self { tx }, events_rx)
    }

    /// Queue files for upload. Returns `false` if the worker has stopped.
    pub fn enqueue(&self, targets: Vec<UploadTarget>) -> bool {
        if targets.is_empty() {
            return true;
        }
        self.tx.send(targets).is_ok()
    }
}

/// Upload `targets` strictly in order.
pub async fn run_batch(
    server: &dyn FileServer,
    targets: Vec<UploadTarget>,
    events: &Sender<UploadEvent>,
    settle_delay: Duration,
) {
    for target in targets {
        upload_one(server, target, events, settle_delay).await;
    }
}

/// Upload a single file and report it, pausing `settle_delay` after a success.
pub async fn upload_one(
    server: &dyn FileServer,
    target: UploadTarget,
    events: &Sender<UploadEvent>,
    settle_delay: Duration,
) {
    let name = target.name.clone();
    tracing::info!(file = %name, size = target.size, "uploading");
    let _ = events.send(UploadEvent::Started { name: name.clone() });

    match server.upload(&target).await {
        Ok(resp) => {
            match resp.file {
                Some(stored) if stored.name != name => {
                    tracing::info!(file = %name, stored_as = %stored.name, "upload complete")
                }
                _ => tracing::info!(file = %name, "upload complete"),
            }
            let _ = events.send(UploadEvent::Succeeded { name: name.clone() });
            // The target is no longer needed while we wait
            drop(target);
            tokio::time::sleep(settle_delay).await;
            let _ = events.send(UploadEvent::Settled { name });
        }
        Err(e) => {
            tracing::warn!(file = %name, "upload failed: {}", e);
            let _ = events.send(UploadEvent::Failed {
                name,
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::{FileRecord, UploadError, UploadResponse};
    use tokio::time::Instant;

    /// Answers every upload from a script and records when each call started.
    struct ScriptedServer {
        script: Mutex<Vec<Result<UploadResponse, UploadError>>>,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedServer {
        fn new(script: Vec<Result<UploadResponse, UploadError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    fn ok() -> Result<UploadResponse, UploadError> {
        Ok(UploadResponse {
            success: true,
            message: None,
            file: None,
        })
    }

    #[async_trait]
    impl FileServer for ScriptedServer {
        async fn upload(&self, target: &UploadTarget) -> Result<UploadResponse, UploadError> {
            self.calls.lock().push((target.name.clone(), Instant::now()));
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut script = self.script.lock();
            if script.is_empty() {
                ok()
            } else {
                script.remove(0)
            }
        }

        async fn list_files(&self) -> Result<Vec<FileRecord>, UploadError> {
            Ok(Vec::new())
        }
    }

    fn target(name: &str) -> UploadTarget {
        UploadTarget::from_bytes(name, Arc::from(name.as_bytes().to_vec()))
    }

    fn drain(rx: &Receiver<UploadEvent>) -> Vec<UploadEvent> {
        rx.try_iter().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_is_sequential_with_settle_delay() {
        let server = ScriptedServer::new(vec![]);
        let (tx, rx) = channel();

        run_batch(&server, vec![target("a.txt"), target("b.txt")], &tx, SETTLE_DELAY).await;

        let calls = server.calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "a.txt");
        assert_eq!(calls[1].0, "b.txt");
        // 50ms request + 1s settle before the second file starts
        assert!(calls[1].1 - calls[0].1 >= SETTLE_DELAY + Duration::from_millis(50));

        let name = |n: &str| n.to_string();
        assert_eq!(
            drain(&rx),
            vec![
                UploadEvent::Started { name: name("a.txt") },
                UploadEvent::Succeeded { name: name("a.txt") },
                UploadEvent::Settled { name: name("a.txt") },
                UploadEvent::Started { name: name("b.txt") },
                UploadEvent::Succeeded { name: name("b.txt") },
                UploadEvent::Settled { name: name("b.txt") },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_has_no_settle_delay() {
        let server = ScriptedServer::new(vec![Err(UploadError::rejected(Some("too large".into())))]);
        let (tx, rx) = channel();

        let started = Instant::now();
        upload_one(&server, target("big.iso"), &tx, SETTLE_DELAY).await;
        assert!(Instant::now() - started < SETTLE_DELAY);

        assert_eq!(
            drain(&rx),
            vec![
                UploadEvent::Started { name: "big.iso".into() },
                UploadEvent::Failed {
                    name: "big.iso".into(),
                    message: "too large".into()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_batch() {
        let server = ScriptedServer::new(vec![
            Err(UploadError::Transport("connection reset".into())),
            ok(),
        ]);
        let (tx, rx) = channel();

        run_batch(&server, vec![target("a"), target("b")], &tx, SETTLE_DELAY).await;

        let events = drain(&rx);
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[1], UploadEvent::Failed { message, .. } if message == "connection reset"));
        assert_eq!(events[4], UploadEvent::Settled { name: "b".into() });
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_serializes_batches() {
        let server = Arc::new(ScriptedServer::new(vec![]));
        let handle = tokio::runtime::Handle::current();
        let (queue, rx) = UploadQueue::start(server.clone(), &handle);

        assert!(queue.enqueue(vec![target("first")]));
        assert!(queue.enqueue(vec![target("second"), target("third")]));
        assert!(queue.enqueue(Vec::new()));

        tokio::time::sleep(Duration::from_secs(10)).await;

        let calls = server.calls.lock();
        let names: Vec<_> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= SETTLE_DELAY);
        }
        assert_eq!(drain(&rx).len(), 9);
    }
}
