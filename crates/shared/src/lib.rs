pub mod error;
pub mod files;
pub mod format;

pub use error::UploadError;
pub use files::{FileRecord, UploadResponse, UploadSource, UploadTarget};

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    fn default_server_url() -> String {
        "http://127.0.0.1:8080".into()
    }

    fn default_timeout_secs() -> u64 {
        120
    }

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UploaderSettings {
        /// Base URL of the upload server, without a trailing slash
        #[serde(default = "default_server_url")]
        pub server_url: String,
        #[serde(default = "default_timeout_secs")]
        pub request_timeout_secs: u64,
        #[serde(default = "default_true")]
        pub dark_mode: bool,
    }

    impl Default for UploaderSettings {
        fn default() -> Self {
            Self {
                server_url: default_server_url(),
                request_timeout_secs: default_timeout_secs(),
                dark_mode: true,
            }
        }
    }

    impl UploaderSettings {
        /// Apply `UFO_SERVER_URL` / `UFO_REQUEST_TIMEOUT_SECS` on top of the loaded values.
        pub fn with_env_overrides(self) -> Self {
            self.with_overrides(
                std::env::var("UFO_SERVER_URL").ok(),
                std::env::var("UFO_REQUEST_TIMEOUT_SECS").ok(),
            )
        }

        fn with_overrides(mut self, server_url: Option<String>, timeout: Option<String>) -> Self {
            if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
                self.server_url = url;
            }
            // Unparseable values keep the previous setting
            if let Some(secs) = timeout.and_then(|t| t.trim().parse::<u64>().ok()) {
                self.request_timeout_secs = secs;
            }
            self.server_url = self.server_url.trim().trim_end_matches('/').to_string();
            self
        }

        /// Connect and listing deadline as a `Duration`.
        pub fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.request_timeout_secs)
        }
    }

}
