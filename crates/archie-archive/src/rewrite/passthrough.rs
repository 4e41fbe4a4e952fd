use std::io::{self, Read, Write};

use super::{DESTINATION, SOURCE, trace_state};
use crate::entry::RewriteReport;
use crate::error::lift;
use crate::format::ArchiveFormat;
use crate::{Error, Result};

/// Verbatim copy; registry rules and hooks do not apply.
pub(super) fn rewrite<R: Read, W: Write>(src: &mut R, dest: &mut W) -> Result<RewriteReport> {
    trace_state(ArchiveFormat::PassThrough, "copy");

    let copied = io::copy(&mut Source(src), dest).map_err(|e| lift(e, |e| Error::write(DESTINATION, e)))?;

    let mut report = RewriteReport::new(ArchiveFormat::PassThrough);
    report.bytes_in = copied;
    report.bytes_out = copied;
    Ok(report)
}

/// Tags read errors so they surface as read failures after `io::copy`.
struct Source<'a, R: ?Sized>(&'a mut R);

impl<R: Read + ?Sized> Read for Source<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| match e.kind() {
            io::ErrorKind::Interrupted => e,
            _ => io::Error::other(Error::read(SOURCE, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad sector"))
        }
    }

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn copies_bytes_unchanged() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        let report = rewrite(&mut &data[..], &mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(report.bytes_out, 20_000);
        assert_eq!(report.entries_written, 0);
    }

    #[test]
    fn failures_are_attributed_to_their_side() {
        let err = rewrite(&mut Broken, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ReadFailed { ref path, .. } if path == SOURCE));

        let err = rewrite(&mut &b"data"[..], &mut Broken).unwrap_err();
        assert!(matches!(err, Error::WriteFailed { ref path, .. } if path == DESTINATION));
    }
}
