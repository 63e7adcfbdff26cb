//! File picker widget using rfd (rust file dialog).
//!
//! Opens the native multi-select dialog and remembers the last folder so the
//! next pick starts there.

use std::path::PathBuf;

pub struct FilePickerWidget {
    title: String,
    start_dir: Option<PathBuf>,
    multiple: bool,
}

impl Default for FilePickerWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePickerWidget {
    /// Multi-select picker with the default title.
    pub fn new() -> Self {
        Self {
            title: "Select files to upload".to_string(),
            start_dir: None,
            multiple: true,
        }
    }

    /// Set the dialog title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Folder the first dialog opens in.
    pub fn with_start_dir(mut self, dir: PathBuf) -> Self {
        self.start_dir = Some(dir);
        self
    }

    /// Allow picking more than one file.
    pub fn multiple(mut self, allow: bool) -> Self {
        self.multiple = allow;
        self
    }

    /// Blocking file picker (opens native dialog and waits).
    ///
    /// Returns an empty list when the user cancels.
    pub fn pick_files(&mut self) -> Vec<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title(&self.title);
        if let Some(ref dir) = self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let picked = if self.multiple {
            dialog.pick_files().unwrap_or_default()
        } else {
            dialog.pick_file().map(|f| vec![f]).unwrap_or_default()
        };

        self.remember_dir(&picked);
        picked
    }

    fn remember_dir(&mut self, picked: &[PathBuf]) {
        if let Some(parent) = picked.first().and_then(|p| p.parent()) {
            self.start_dir = Some(parent.to_path_buf());
        }
    }
}
