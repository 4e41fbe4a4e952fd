use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};

use super::{ArchiveWriter, now_secs};
use crate::Error;
use crate::entry::{Entry, EntryKind};
use crate::format::ArchiveFormat;

/// Writer for gzip-compressed tar containers. Long names use GNU
/// long-name records.
pub struct TarGzEntryWriter<W: Write> {
    inner:   Builder<GzEncoder<W>>,
    written: Vec<Entry>,
}

impl<W: Write> TarGzEntryWriter<W> {
    pub fn new(out: W, level: u32) -> Self {
        Self {
            inner:   Builder::new(GzEncoder::new(out, Compression::new(level))),
            written: Vec::new(),
        }
    }

    /// Write the tar end blocks and the gzip trailer, then hand back the
    /// stream.
    pub fn finish(self) -> io::Result<(W, Vec<Entry>)> {
        let out = self.inner.into_inner()?.finish()?;
        Ok((out, self.written))
    }

    /// Copy a source entry with its original header: links keep their
    /// target, special entries keep type and device numbers.
    pub(crate) fn copy_verbatim(
        &mut self,
        entry: &Entry,
        source: &Header,
        data: &[u8],
    ) -> io::Result<()> {
        let mut header = source.clone();
        match entry.link_target() {
            Some(target) => self.inner.append_link(&mut header, &entry.name, target)?,
            None => self.inner.append_data(&mut header, &entry.name, data)?,
        }
        self.written.push(entry.clone());
        Ok(())
    }

    fn header(entry: &Entry, entry_type: EntryType, default_mode: u32) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(0);
        header.set_mode(entry.mode.unwrap_or(default_mode) & 0o7777);
        header.set_mtime(entry.modified.unwrap_or_else(now_secs));
        if let Some(gnu) = header.as_gnu_mut() {
            if let Some(atime) = entry.accessed {
                gnu.set_atime(atime);
            }
            if let Some(ctime) = entry.created {
                gnu.set_ctime(ctime);
            }
        }
        header
    }
}

impl<W: Write> ArchiveWriter for TarGzEntryWriter<W> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn write_entry(&mut self, entry: &Entry, content: &[u8]) -> io::Result<()> {
        let written = match &entry.kind {
            EntryKind::Directory => {
                let mut header = Self::header(&Entry::directory(entry.name.as_str()), EntryType::Directory, 0o755);
                self.inner
                    .append_data(&mut header, &entry.name, io::empty())?;
                Entry::directory(entry.name.clone())
            }
            EntryKind::File => {
                let mut header = Self::header(entry, EntryType::Regular, 0o644);
                header.set_size(content.len() as u64);
                self.inner.append_data(&mut header, &entry.name, content)?;
                let mut written = entry.clone();
                written.size = content.len() as u64;
                written
            }
            EntryKind::Symlink { target } | EntryKind::HardLink { target } => {
                let entry_type = if entry.is_symlink() {
                    EntryType::Symlink
                } else {
                    EntryType::Link
                };
                let mut header = Self::header(entry, entry_type, 0o777);
                self.inner.append_link(&mut header, &entry.name, target)?;
                entry.clone()
            }
            EntryKind::Other => {
                return Err(io::Error::other(Error::UnsupportedOutputTarget {
                    entry:  entry.name.clone(),
                    reason: "special tar entries can only be copied from a tar source",
                }));
            }
        };
        self.written.push(written);
        Ok(())
    }

    fn written(&self) -> &[Entry] {
        &self.written
    }
}

/// Metadata of a source tar entry.
pub(crate) fn source_entry<R: io::Read>(entry: &tar::Entry<'_, R>) -> io::Result<Entry> {
    let header = entry.header();
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let link = || {
        entry
            .link_name_bytes()
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    };

    let entry_type = header.entry_type();
    let kind = if entry_type.is_dir() {
        EntryKind::Directory
    } else if entry_type.is_symlink() {
        EntryKind::Symlink { target: link() }
    } else if entry_type.is_hard_link() {
        EntryKind::HardLink { target: link() }
    } else if entry_type.is_file() || entry_type == EntryType::Continuous {
        EntryKind::File
    } else {
        EntryKind::Other
    };

    let mut out = Entry::new(name, kind).with_size(header.size()?);
    out.mode = header.mode().ok();
    out.modified = header.mtime().ok();
    if let Some(gnu) = header.as_gnu() {
        out.accessed = gnu.atime().ok().filter(|t| *t != 0);
        out.created = gnu.ctime().ok().filter(|t| *t != 0);
    }
    Ok(out)
}
