use std::io::{Read, Write};

use flate2::read::GzDecoder;
use tracing::debug;

use super::{DESTINATION, Rewriter, SOURCE, hook_failed, trace_state, transform_failed, write_failed};
use crate::entry::{EntryKind, RewriteReport};
use crate::io::{NonClosing, read_entry};
use crate::writer::tar::source_entry;
use crate::writer::{ArchiveWriter, TarGzEntryWriter};
use crate::{Error, Result};

pub(super) fn rewrite<R: Read, W: Write>(
    rw: &Rewriter,
    src: &mut R,
    dest: &mut W,
) -> Result<RewriteReport> {
    let format = rw.format;
    let registry = &rw.registry;
    let mut report = RewriteReport::new(format);

    trace_state(format, "open_source");
    let mut archive = tar::Archive::new(GzDecoder::new(NonClosing::new(src)));
    let mut out = TarGzEntryWriter::new(NonClosing::new(dest), rw.options.gzip_level);

    trace_state(format, "before_archive");
    registry
        .before_archive(&mut out)
        .map_err(|e| hook_failed(DESTINATION, e))?;

    for entry in archive.entries().map_err(|e| Error::read(SOURCE, e))? {
        let mut entry = entry.map_err(|e| Error::read(SOURCE, e))?;
        let source = source_entry(&entry).map_err(|e| Error::read(SOURCE, e))?;
        let name = source.name.as_str();
        report.entries_read += 1;

        if registry.should_skip(name) {
            debug!(entry = %name, "skipped");
            report.entries_skipped += 1;
            continue;
        }

        trace_state(format, "before_entry");
        registry
            .before_entry(name, &mut out)
            .map_err(|e| hook_failed(name, e))?;

        match &source.kind {
            EntryKind::Directory => {
                out.write_entry(&source, &[])
                    .map_err(|e| write_failed(name, e))?;
            }
            EntryKind::Symlink { .. } | EntryKind::HardLink { .. } => {
                out.copy_verbatim(&source, entry.header(), &[])
                    .map_err(|e| write_failed(name, e))?;
            }
            EntryKind::Other => {
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(|e| Error::read(name, e))?;
                out.copy_verbatim(&source, entry.header(), &data)
                    .map_err(|e| write_failed(name, e))?;
            }
            EntryKind::File => {
                let content =
                    read_entry(&mut entry, source.size).map_err(|e| Error::read(name, e))?;
                report.bytes_in += content.len() as u64;

                let content = registry
                    .apply(name, content)
                    .map_err(|e| transform_failed(name, e))?;
                report.bytes_out += content.len() as u64;
                out.write_entry(&source, &content)
                    .map_err(|e| write_failed(name, e))?;
            }
        }
        rw.options
            .report(out.written().len(), report.bytes_out, name);

        trace_state(format, "after_entry");
        registry
            .after_entry(name, &mut out)
            .map_err(|e| hook_failed(name, e))?;
    }

    trace_state(format, "after_archive");
    registry
        .after_archive(&mut out)
        .map_err(|e| hook_failed(DESTINATION, e))?;

    trace_state(format, "close");
    let (_, entries) = out.finish().map_err(|e| Error::write(DESTINATION, e))?;
    report.entries_written = entries.len();
    report.entries = entries;
    Ok(report)
}
