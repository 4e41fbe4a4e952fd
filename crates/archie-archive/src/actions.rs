//! Stock content functions and hooks.

use std::io::{self, Cursor};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::zip_io;
use crate::io::read_entry;
use crate::registry::ContentFn;
use crate::rewrite::Rewriter;
use crate::writer::ArchiveWriter;
use crate::writer::zip::source_entry;

/// Write a fixed entry.
pub fn insert_entry(
    name: impl Into<String>,
    content: impl Into<Vec<u8>>,
) -> impl Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static {
    let name = name.into();
    let content = content.into();
    move |out: &mut dyn ArchiveWriter| out.add_file(&name, &content)
}

/// Write an entry whose content is produced when the hook fires.
pub fn insert_with<F>(
    name: impl Into<String>,
    supplier: F,
) -> impl Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static
where
    F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
{
    let name = name.into();
    move |out: &mut dyn ArchiveWriter| out.add_file(&name, &supplier()?)
}

/// Write an entry with the current content of a file on disk.
pub fn insert_file(
    name: impl Into<String>,
    path: impl Into<PathBuf>,
) -> impl Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static {
    let path = path.into();
    insert_with(name, move || std::fs::read(&path))
}

/// Copy every entry of another jar into the output, metadata included.
/// Entries whose name is already in the output are left out.
pub fn inline_jar(
    jar: impl Into<Vec<u8>>,
) -> impl Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static {
    let jar: Arc<[u8]> = jar.into().into();
    move |out: &mut dyn ArchiveWriter| {
        let mut archive = zip::ZipArchive::new(Cursor::new(&jar[..])).map_err(zip_io)?;
        let mut inlined = 0;
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(zip_io)?;
            let entry = source_entry(&file);
            if out.contains(&entry.name) {
                debug!(entry = %entry.name, "already in output, not inlined");
                continue;
            }
            let content = if entry.is_file() {
                read_entry(&mut file, entry.size)?
            } else {
                Vec::new()
            };
            out.write_entry(&entry, &content)?;
            inlined += 1;
        }
        debug!(entries = inlined, "inlined jar");
        Ok(())
    }
}

/// Rewrite an embedded container with `rewriter`.
pub fn nested(rewriter: Rewriter) -> ContentFn {
    Arc::new(move |bytes| rewriter.rewrite_bytes(&bytes).map_err(io::Error::other))
}

pub fn prepend(text: impl AsRef<[u8]>) -> ContentFn {
    let text = text.as_ref().to_vec();
    Arc::new(move |bytes| {
        let mut out = Vec::with_capacity(text.len() + bytes.len());
        out.extend_from_slice(&text);
        out.extend_from_slice(&bytes);
        Ok(out)
    })
}

pub fn append(text: impl AsRef<[u8]>) -> ContentFn {
    let text = text.as_ref().to_vec();
    Arc::new(move |mut bytes| {
        bytes.extend_from_slice(&text);
        Ok(bytes)
    })
}

/// Replace the whole content.
pub fn replace(content: impl AsRef<[u8]>) -> ContentFn {
    let content = content.as_ref().to_vec();
    Arc::new(move |_| Ok(content.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_functions() {
        assert_eq!(prepend("a")(b"b".to_vec()).unwrap(), b"ab");
        assert_eq!(append("c")(b"b".to_vec()).unwrap(), b"bc");
        assert_eq!(replace("z")(b"anything".to_vec()).unwrap(), b"z");
    }
}
