#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use archie_archive::{ArchiveFormat, Registry, Rewriter};
use flate2::read::GzDecoder;
use zip::write::SimpleFileOptions;

pub const ARCHIVE_ZIP: &[u8] = include_bytes!("../fixtures/archive.zip");
pub const ARCHIVE_JAR: &[u8] = include_bytes!("../fixtures/archive.jar");
pub const ARCHIVE_TAR_GZ: &[u8] = include_bytes!("../fixtures/archive.tar.gz");
pub const COLORS_JAR: &[u8] = include_bytes!("../fixtures/colors.jar");
pub const DOCUMENT_PDF: &[u8] = include_bytes!("../fixtures/document.pdf");
/// `a.txt` ("first"), `b.txt`, then `a.txt` again ("second").
pub const DUPLICATES_ZIP: &[u8] = include_bytes!("../fixtures/duplicates.zip");
/// Written to an unseekable stream: every entry uses a data descriptor.
pub const STREAMED_JAR: &[u8] = include_bytes!("../fixtures/streamed.jar");

pub fn rewrite(format: ArchiveFormat, registry: Registry, src: &[u8]) -> Vec<u8> {
    Rewriter::new(format, Arc::new(registry))
        .rewrite_bytes(src)
        .expect("rewrite failed")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipItem {
    pub name:    String,
    pub content: Vec<u8>,
    pub crc32:   u32,
    pub is_dir:  bool,
}

pub fn zip_items(bytes: &[u8]) -> Vec<ZipItem> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("not a zip");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            ZipItem {
                name: file.name().to_string(),
                crc32: file.crc32(),
                is_dir: file.is_dir(),
                content,
            }
        })
        .collect()
}

pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    zip_items(bytes).into_iter().map(|i| i.name).collect()
}

pub fn zip_content(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    zip_items(bytes)
        .into_iter()
        .find(|i| i.name == name)
        .map(|i| i.content)
}

/// One line per entry, nested jars expanded as `outer > inner`, file lines
/// carrying their content.
pub fn zip_listing(bytes: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    list_into(bytes, "", &mut lines);
    lines
}

fn list_into(bytes: &[u8], prefix: &str, lines: &mut Vec<String>) {
    for item in zip_items(bytes) {
        let name = format!("{prefix}{}", item.name);
        if item.name.ends_with(".jar") {
            lines.push(name.clone());
            list_into(&item.content, &format!("{name} > "), lines);
        } else if item.is_dir {
            lines.push(name);
        } else {
            lines.push(format!("{name}  {}", String::from_utf8_lossy(&item.content)));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarItem {
    pub name:       String,
    pub entry_type: tar::EntryType,
    pub content:    Vec<u8>,
    pub link:       Option<String>,
    pub mode:       u32,
    pub mtime:      u64,
}

pub fn tar_items(bytes: &[u8]) -> Vec<TarItem> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|e| {
            let mut e = e.unwrap();
            let mut content = Vec::new();
            e.read_to_end(&mut content).unwrap();
            TarItem {
                name: String::from_utf8_lossy(&e.path_bytes()).into_owned(),
                entry_type: e.header().entry_type(),
                link: e
                    .link_name_bytes()
                    .map(|b| String::from_utf8_lossy(&b).into_owned()),
                mode: e.header().mode().unwrap(),
                mtime: e.header().mtime().unwrap(),
                content,
            }
        })
        .collect()
}

pub fn tar_names(bytes: &[u8]) -> Vec<String> {
    tar_items(bytes).into_iter().map(|i| i.name).collect()
}

pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .unwrap();
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Structurally signed jar: per-entry manifest digests, a signature file
/// covering `com/example/Red.class` and a signature block.
pub fn signed_jar() -> Vec<u8> {
    build_zip(&[
        (
            "META-INF/MANIFEST.MF",
            b"Manifest-Version: 1.0\r\n\r\nName: com/example/Red.class\r\nSHA-256-Digest: cmVk\r\n\r\n",
        ),
        (
            "META-INF/SIGNER.SF",
            b"Signature-Version: 1.0\r\n\r\nName: com/example/Red.class\r\nSHA-256-Digest: cmVk\r\n\r\n",
        ),
        ("META-INF/SIGNER.RSA", b"not really a signature block"),
        ("com/", b""),
        ("com/example/", b""),
        ("com/example/Red.class", b"red"),
    ])
}

/// Shared event log for hooks.
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
