//! Sheet slot stores.
//!
//! One slot holds one sheet's JSON text. `FileStore` is the on-disk store
//! used by the binary; `MemoryStore` backs tests and one-shot tooling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Single-slot persistence backend for sheet text.
pub trait SheetStore: Send + Sync {
    /// Read the stored text. `None` when nothing useful is stored
    /// (absent slot or blank text).
    fn load_sheet(&self) -> Option<String>;

    /// Replace the stored text.
    fn save_sheet(&self, text: &str) -> io::Result<()>;
}

/// In-memory slot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SheetStore for MemoryStore {
    fn load_sheet(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap()
            .clone()
            .filter(|text| !text.trim().is_empty())
    }

    fn save_sheet(&self, text: &str) -> io::Result<()> {
        *self.slot.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

/// File-backed slot: one file is the sheet.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default slot location: `<config dir>/tripane/sheet.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tripane").join("sheet.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetStore for FileStore {
    /// Missing, unreadable, and blank files all read as "nothing stored".
    fn load_sheet(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .filter(|text| !text.trim().is_empty())
    }

    /// Write-to-temp-then-rename so a crash mid-write cannot corrupt the slot.
    fn save_sheet(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, text)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
