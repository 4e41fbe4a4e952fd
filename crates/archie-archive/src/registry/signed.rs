//! Heuristic detection of signed jars.
//!
//! A signed jar must be copied untouched: changing any covered entry breaks
//! its signature. Detection is structural only. Signature blocks are never
//! checked cryptographically, and any parse failure reports "not signed".

use std::collections::HashSet;
use std::io::{Cursor, Read};

use tracing::trace;

const MANIFEST: &str = "META-INF/MANIFEST.MF";
const BLOCK_EXTENSIONS: [&str; 3] = ["RSA", "DSA", "EC"];

/// Whether `bytes`, stored under `name`, look like a signed jar.
pub fn is_signed_jar(name: &str, bytes: &[u8]) -> bool {
    if !name.ends_with(".jar") {
        return false;
    }
    match inspect(bytes) {
        Ok(signed) => signed,
        Err(e) => {
            trace!(entry = %name, error = %e, "signed-jar check failed, treating as unsigned");
            false
        }
    }
}

fn inspect(bytes: &[u8]) -> zip::result::ZipResult<bool> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let manifest = match archive.by_name(MANIFEST) {
        Ok(mut file) => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            Manifest::parse(&buf)
        }
        Err(zip::result::ZipError::FileNotFound) => return Ok(false),
        Err(e) => return Err(e),
    };

    if !manifest.has_entry_digests() {
        return Ok(false);
    }

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let block_stems: HashSet<String> = names
        .iter()
        .filter_map(|n| signature_block_stem(n))
        .collect();

    let mut covered = HashSet::new();
    for sf in names.iter().filter(|n| is_signature_file(n)) {
        let stem = &sf[..sf.len() - ".SF".len()];
        if !block_stems.contains(&stem.to_ascii_uppercase()) {
            continue;
        }
        let mut buf = Vec::new();
        archive.by_name(sf)?.read_to_end(&mut buf)?;
        covered.extend(Manifest::parse(&buf).sections.into_iter().map(|s| s.name));
    }

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if file.is_dir() {
            continue;
        }
        if covered.contains(file.name()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_signature_file(name: &str) -> bool {
    name.starts_with("META-INF/") && !name[9..].contains('/') && name.ends_with(".SF")
}

fn signature_block_stem(name: &str) -> Option<String> {
    let rest = name.strip_prefix("META-INF/")?;
    if rest.contains('/') {
        return None;
    }
    let (stem, ext) = name.rsplit_once('.')?;
    BLOCK_EXTENSIONS
        .iter()
        .any(|b| ext.eq_ignore_ascii_case(b))
        .then(|| stem.to_ascii_uppercase())
}

/// Jar manifest: `Key: Value` lines, continuation lines start with one
/// space, blank lines separate sections, per-entry sections start with
/// `Name:`.
#[derive(Debug, Default)]
pub(crate) struct Manifest {
    #[cfg_attr(not(test), allow(dead_code))]
    pub main:     Vec<(String, String)>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Default)]
pub(crate) struct Section {
    pub name:       String,
    pub attributes: Vec<(String, String)>,
}

impl Manifest {
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);

        let mut blocks: Vec<Vec<(String, String)>> = vec![Vec::new()];
        for line in text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)) {
            if line.is_empty() {
                if blocks.last().is_some_and(|b| !b.is_empty()) {
                    blocks.push(Vec::new());
                }
                continue;
            }
            let Some(block) = blocks.last_mut() else { continue };
            if let Some(cont) = line.strip_prefix(' ') {
                if let Some((_, value)) = block.last_mut() {
                    value.push_str(cont);
                }
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                block.push((key.trim().to_string(), value.trim_start().to_string()));
            }
        }

        let mut blocks = blocks.into_iter().filter(|b| !b.is_empty());
        let main = blocks.next().unwrap_or_default();
        let sections = blocks
            .filter_map(|attrs| {
                let name = attrs
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("Name"))
                    .map(|(_, v)| v.clone())?;
                Some(Section {
                    name,
                    attributes: attrs,
                })
            })
            .collect();

        Self { main, sections }
    }

    pub fn has_entry_digests(&self) -> bool {
        self.sections
            .iter()
            .flat_map(|s| s.attributes.iter())
            .any(|(k, _)| k.contains("-Digest"))
    }
}
