//! Settings loading and path helpers for the uploader app

use crate::widgets::DroppedItem;
use shared::settings::UploaderSettings;
use shared::{UploadError, UploadTarget};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of `settings.json` in the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "UFO", "UfoUploader")?;
    let _ = fs::create_dir_all(proj.config_dir());
    Some(proj.config_dir().join("settings.json"))
}

/// Read settings from `path`, falling back to defaults when it is missing or unreadable.
pub fn load_settings_from(path: &Path) -> UploaderSettings {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return UploaderSettings::default(),
    };
    match serde_json::from_slice::<UploaderSettings>(&bytes) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring unreadable settings at {:?}: {}", path, e);
            UploaderSettings::default()
        }
    }
}

/// Settings from the config file, with `UFO_*` environment overrides applied.
pub fn load_settings_or_default() -> UploaderSettings {
    let settings = match config_path() {
        Some(path) => load_settings_from(&path),
        None => UploaderSettings::default(),
    };
    settings.with_env_overrides()
}

/// Turn picked paths into upload targets, keeping the failures apart.
pub fn targets_from_paths(paths: Vec<PathBuf>) -> (Vec<UploadTarget>, Vec<(String, UploadError)>) {
    targets_from_drops(paths.into_iter().map(DroppedItem::Path).collect())
}

/// Turn dropped items into upload targets in drop order, keeping the failures apart.
pub fn targets_from_drops(
    items: Vec<DroppedItem>,
) -> (Vec<UploadTarget>, Vec<(String, UploadError)>) {
    let mut targets = Vec::new();
    let mut failures = Vec::new();
    for item in items {
        let path = match item {
            DroppedItem::Target(target) => {
                targets.push(target);
                continue;
            }
            DroppedItem::Path(path) => path,
        };
        match UploadTarget::from_path(&path) {
            Ok(target) => targets.push(target),
            Err(e) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                failures.push((name, e));
            }
        }
    }
    (targets, failures)
}
