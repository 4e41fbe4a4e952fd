use std::collections::HashSet;
use std::io::{self, Seek, Write};

use zip::extra_fields::ExtraField;
use zip::write::{FileOptions, FullFileOptions, SimpleFileOptions};
use zip::{CompressionMethod, ZipWriter};

use super::ArchiveWriter;
use crate::entry::{Entry, EntryKind};
use crate::error::zip_io;
use crate::format::ArchiveFormat;
use crate::Error;

const EXTENDED_TIMESTAMP: u16 = 0x5455;

/// Writer for zip and jar-like containers. A name can be written once.
pub struct ZipEntryWriter<W: Write + Seek> {
    inner:       ZipWriter<W>,
    format:      ArchiveFormat,
    compression: Option<CompressionMethod>,
    written:     Vec<Entry>,
    names:       HashSet<String>,
}

impl<W: Write + Seek> ZipEntryWriter<W> {
    pub fn new(out: W, format: ArchiveFormat) -> Self {
        Self {
            inner: ZipWriter::new(out),
            format,
            compression: None,
            written: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn with_compression(mut self, method: Option<CompressionMethod>) -> Self {
        self.compression = method;
        self
    }

    /// Write the central directory and hand back the stream.
    pub fn finish(self) -> io::Result<(W, Vec<Entry>)> {
        let out = self.inner.finish().map_err(zip_io)?;
        Ok((out, self.written))
    }

    fn method_for(&self, entry: &Entry) -> CompressionMethod {
        match (self.compression, entry.method) {
            (Some(forced), _) => forced,
            (None, Some(CompressionMethod::Stored)) => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        }
    }

    fn write_file(&mut self, entry: &Entry, content: &[u8]) -> io::Result<Entry> {
        let crc = crc32fast::hash(content);
        let method = self.method_for(entry);

        let mut options: FullFileOptions<'_> = FileOptions::default()
            .compression_method(method)
            .large_file(content.len() as u64 >= u32::MAX as u64);
        if let Some(time) = entry.dos_time {
            options = options.last_modified_time(time);
        }
        if let Some(mode) = entry.mode {
            options = options.unix_permissions(mode);
        }
        if let Some(field) = extended_timestamp(entry) {
            options
                .add_extra_data(EXTENDED_TIMESTAMP, field.into_boxed_slice(), false)
                .map_err(zip_io)?;
        }

        self.inner
            .start_file(entry.name.as_str(), options)
            .map_err(zip_io)?;
        self.inner.write_all(content)?;

        let mut written = entry.clone();
        written.size = content.len() as u64;
        written.crc32 = Some(crc);
        written.method = Some(method);
        Ok(written)
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipEntryWriter<W> {
    fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn write_entry(&mut self, entry: &Entry, content: &[u8]) -> io::Result<()> {
        if self.names.contains(&entry.name) {
            return Err(io::Error::other(Error::UnsupportedOutputTarget {
                entry:  entry.name.clone(),
                reason: "zip containers hold one entry per name",
            }));
        }
        let written = match &entry.kind {
            EntryKind::Directory => {
                self.inner
                    .add_directory(entry.name.as_str(), SimpleFileOptions::default())
                    .map_err(zip_io)?;
                Entry::directory(entry.name.clone())
            }
            EntryKind::File => self.write_file(entry, content)?,
            EntryKind::Symlink { .. } | EntryKind::HardLink { .. } | EntryKind::Other => {
                return Err(io::Error::other(Error::UnsupportedOutputTarget {
                    entry:  entry.name.clone(),
                    reason: "zip containers only hold files and directories",
                }));
            }
        };
        self.names.insert(written.name.clone());
        self.written.push(written);
        Ok(())
    }

    fn written(&self) -> &[Entry] {
        &self.written
    }

    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Metadata of a source zip entry.
pub(crate) fn source_entry(file: &zip::read::ZipFile<'_>) -> Entry {
    let kind = if file.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    let mut entry = Entry::new(file.name(), kind).with_size(file.size());
    entry.mode = file.unix_mode();
    entry.dos_time = file.last_modified();
    entry.method = Some(file.compression());
    entry.crc32 = Some(file.crc32());

    for field in file.extra_data_fields() {
        let ExtraField::ExtendedTimestamp(ts) = field;
        entry.modified = ts.mod_time().map(u64::from);
        entry.accessed = ts.ac_time().map(u64::from);
        entry.created = ts.cr_time().map(u64::from);
    }
    entry
}

/// Local-header form of the 0x5455 field: flag byte, then the present
/// times as little-endian u32 in mtime, atime, ctime order.
fn extended_timestamp(entry: &Entry) -> Option<Vec<u8>> {
    let times = [entry.modified, entry.accessed, entry.created];
    if times.iter().all(Option::is_none) {
        return None;
    }
    let mut flags = 0u8;
    let mut data = vec![0u8];
    for (bit, time) in times.iter().enumerate() {
        if let Some(secs) = time {
            flags |= 1 << bit;
            let secs = u32::try_from(*secs).unwrap_or(u32::MAX);
            data.extend_from_slice(&secs.to_le_bytes());
        }
    }
    data[0] = flags;
    Some(data)
}
