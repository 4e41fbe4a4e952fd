use std::path::Path;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    /// `.jar`, `.ear`, `.war` and `.rar`; zip codec.
    Jar,
    TarGz,
    /// Copied byte for byte.
    PassThrough,
}

impl ArchiveFormat {
    /// Select a format by file-name suffix.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let format = if lower.ends_with(".zip") {
            Self::Zip
        } else if lower.ends_with(".tar.gz") {
            Self::TarGz
        } else if [".jar", ".ear", ".war", ".rar"]
            .iter()
            .any(|ext| lower.ends_with(ext))
        {
            Self::Jar
        } else if lower.ends_with(".pdf") {
            Self::PassThrough
        } else {
            return Err(Error::UnsupportedContainerType {
                filename: name.to_string(),
            });
        };
        Ok(format)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_file_name(&name)
    }

    pub fn is_zip_family(&self) -> bool {
        matches!(self, Self::Zip | Self::Jar)
    }
}
