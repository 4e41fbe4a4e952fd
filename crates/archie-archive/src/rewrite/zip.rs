use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;
use zip::ZipArchive;
use zip::read::read_zipfile_from_stream;

use super::{DESTINATION, Rewriter, SOURCE, hook_failed, trace_state, transform_failed, write_failed};
use crate::entry::{Entry, RewriteReport};
use crate::error::zip_io;
use crate::io::{NonClosing, read_entry};
use crate::writer::zip::source_entry;
use crate::writer::{ArchiveWriter, ZipEntryWriter};
use crate::{Error, Result};

/// Source entries are taken from the local headers in file order, so
/// entries sharing a name are all seen. Archives whose local headers
/// cannot be walked (data descriptors, prefixed stubs) fall back to the
/// central directory.
pub(super) fn rewrite<R, W>(rw: &Rewriter, src: &mut R, dest: &mut W) -> Result<RewriteReport>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let format = rw.format;

    trace_state(format, "open_source");
    let (modes, streamable) = survey(src)?;
    let mut pass = Pass {
        rw,
        out: ZipEntryWriter::new(NonClosing::new(dest), format)
            .with_compression(rw.options.zip_compression),
        report: RewriteReport::new(format),
    };

    trace_state(format, "before_archive");
    rw.registry
        .before_archive(&mut pass.out)
        .map_err(|e| hook_failed(DESTINATION, e))?;

    if streamable {
        src.seek(SeekFrom::Start(0))
            .map_err(|e| Error::read(SOURCE, e))?;
        let mut reader = NonClosing::new(&mut *src);
        while let Some(mut file) =
            read_zipfile_from_stream(&mut reader).map_err(|e| Error::read(SOURCE, zip_io(e)))?
        {
            let mut source = source_entry(&file);
            if source.mode.is_none() {
                source.mode = modes.get(&source.name).copied();
            }
            pass.entry(source, &mut file)?;
        }
    } else {
        let mut archive =
            ZipArchive::new(NonClosing::new(&mut *src)).map_err(|e| Error::read(SOURCE, zip_io(e)))?;
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::read(SOURCE, zip_io(e)))?;
            let source = source_entry(&file);
            pass.entry(source, &mut file)?;
        }
    }

    trace_state(format, "after_archive");
    rw.registry
        .after_archive(&mut pass.out)
        .map_err(|e| hook_failed(DESTINATION, e))?;

    trace_state(format, "close");
    let Pass { out, mut report, .. } = pass;
    let (_, entries) = out.finish().map_err(|e| Error::write(DESTINATION, e))?;
    report.entries_written = entries.len();
    report.entries = entries;
    Ok(report)
}

/// Unix modes from the central directory (local headers do not carry
/// them), and whether the local headers can be read in sequence.
fn survey<R: Read + Seek>(src: &mut R) -> Result<(HashMap<String, u32>, bool)> {
    let mut archive =
        ZipArchive::new(NonClosing::new(&mut *src)).map_err(|e| Error::read(SOURCE, zip_io(e)))?;
    let central = archive.len();
    let mut modes = HashMap::new();
    for i in 0..central {
        let file = archive
            .by_index_raw(i)
            .map_err(|e| Error::read(SOURCE, zip_io(e)))?;
        if let Some(mode) = file.unix_mode() {
            modes.insert(file.name().to_string(), mode);
        }
    }

    src.seek(SeekFrom::Start(0))
        .map_err(|e| Error::read(SOURCE, e))?;
    let mut reader = NonClosing::new(src);
    let mut local = 0;
    loop {
        match read_zipfile_from_stream(&mut reader) {
            Ok(Some(_)) => local += 1,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "local headers not readable in order, using the central directory");
                return Ok((modes, false));
            }
        }
    }
    if local > central {
        debug!(duplicates = local - central, "source repeats entry names");
    }
    Ok((modes, true))
}

struct Pass<'a, W: Write + Seek> {
    rw:     &'a Rewriter,
    out:    ZipEntryWriter<W>,
    report: RewriteReport,
}

impl<W: Write + Seek> Pass<'_, W> {
    fn entry(&mut self, source: Entry, file: &mut dyn Read) -> Result<()> {
        let rw = self.rw;
        let format = rw.format;
        let registry = &rw.registry;
        let name = source.name.as_str();
        self.report.entries_read += 1;

        if registry.should_skip(name) {
            debug!(entry = %name, "skipped");
            self.report.entries_skipped += 1;
            return Ok(());
        }
        if self.out.contains(name) {
            debug!(entry = %name, "name already written, dropping repeated entry");
            self.report.entries_skipped += 1;
            return Ok(());
        }

        trace_state(format, "before_entry");
        registry
            .before_entry(name, &mut self.out)
            .map_err(|e| hook_failed(name, e))?;

        if source.is_directory() {
            self.out
                .write_entry(&source, &[])
                .map_err(|e| write_failed(name, e))?;
        } else {
            let content = read_entry(file, source.size).map_err(|e| Error::read(name, e))?;
            self.report.bytes_in += content.len() as u64;

            let content = registry
                .apply(name, content)
                .map_err(|e| transform_failed(name, e))?;
            self.report.bytes_out += content.len() as u64;
            self.out
                .write_entry(&source, &content)
                .map_err(|e| write_failed(name, e))?;
        }
        rw.options
            .report(self.out.written().len(), self.report.bytes_out, name);

        trace_state(format, "after_entry");
        registry
            .after_entry(name, &mut self.out)
            .map_err(|e| hook_failed(name, e))?;
        Ok(())
    }
}
