//! Output side of a rewrite: one writer per container family.

use std::io;

use crate::entry::{Entry, EntryKind};
use crate::format::ArchiveFormat;

pub use self::tar::TarGzEntryWriter;
pub use self::zip::ZipEntryWriter;

pub(crate) mod tar;
pub(crate) mod zip;

/// Destination container as seen by rewriters and hooks.
pub trait ArchiveWriter {
    fn format(&self) -> ArchiveFormat;

    /// Write one entry. `content` is ignored for anything but regular files
    /// and tar special entries.
    fn write_entry(&mut self, entry: &Entry, content: &[u8]) -> io::Result<()>;

    /// Entries written so far, in order.
    fn written(&self) -> &[Entry];

    fn contains(&self, name: &str) -> bool {
        self.written().iter().any(|e| e.name == name)
    }

    fn add_file(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        self.write_entry(&Entry::file(name, content.len() as u64), content)
    }

    fn add_directory(&mut self, name: &str) -> io::Result<()> {
        self.write_entry(&Entry::new(name, EntryKind::Directory), &[])
    }
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
