use std::fs::File;
use std::io;
use std::path::Path;

use ::digest::DynDigest;

use crate::{Result, VerifyError};

/// Digest algorithms carried by the standard chain, in cascade order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Md5, Algorithm::Sha1, Algorithm::Sha256];

    /// Display name used in reports and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
        }
    }

    /// Sidecar file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    pub fn digest_length(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    fn hasher(&self) -> Box<dyn DynDigest + Send + Sync> {
        match self {
            Self::Md5 => Box::new(md5::Md5::default()),
            Self::Sha1 => Box::new(sha1::Sha1::default()),
            Self::Sha256 => Box::new(sha2::Sha256::default()),
        }
    }

    /// One-shot digest of an in-memory buffer, lowercase hex.
    pub fn hex_of(&self, data: &[u8]) -> String {
        let mut acc = Accumulator::new(*self);
        acc.update(data);
        acc.hex()
    }

    /// One-shot digest of a file's content, lowercase hex.
    pub fn hex_of_file(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path).map_err(|e| VerifyError::ReadFailed {
            path:   path.to_path_buf(),
            source: e,
        })?;
        let mut acc = Accumulator::new(*self);
        io::copy(&mut file, &mut acc).map_err(|e| VerifyError::ReadFailed {
            path:   path.to_path_buf(),
            source: e,
        })?;
        Ok(acc.hex())
    }
}

/// Running hash state for one algorithm.
///
/// The first call to [`Accumulator::digest`] finalizes the state and caches
/// the result. Bytes fed afterwards still count toward [`byte_count`] but no
/// longer change the digest.
///
/// [`byte_count`]: Accumulator::byte_count
pub struct Accumulator {
    algorithm: Algorithm,
    state:     Option<Box<dyn DynDigest + Send + Sync>>,
    result:    Option<Box<[u8]>>,
    bytes:     u64,
}

impl Accumulator {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            state: Some(algorithm.hasher()),
            result: None,
            bytes: 0,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn update(&mut self, data: &[u8]) {
        self.bytes += data.len() as u64;
        if let Some(state) = self.state.as_mut() {
            state.update(data);
        }
    }

    pub fn digest(&mut self) -> &[u8] {
        if let Some(state) = self.state.take() {
            self.result = Some(state.finalize());
        }
        self.result.as_deref().unwrap_or_default()
    }

    pub fn hex(&mut self) -> String {
        hex::encode(self.digest())
    }

    pub fn byte_count(&self) -> u64 {
        self.bytes
    }

    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }
}

impl io::Write for Accumulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("algorithm", &self.algorithm)
            .field("bytes", &self.bytes)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(Algorithm::Md5.hex_of(b"hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(
            Algorithm::Sha1.hex_of(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            Algorithm::Sha256.hex_of(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn digest_lengths_match_output() {
        for algorithm in Algorithm::ALL {
            let mut acc = Accumulator::new(algorithm);
            assert_eq!(acc.digest().len(), algorithm.digest_length());
        }
    }

    #[test]
    fn finalize_once() {
        let mut acc = Accumulator::new(Algorithm::Sha256);
        acc.update(b"hello ");
        acc.update(b"world");
        let first = acc.hex();

        acc.update(b"more bytes");
        assert_eq!(acc.hex(), first);
        assert_eq!(acc.byte_count(), 21);
        assert!(acc.is_finalized());
    }

    #[test]
    fn names_and_extensions() {
        let names: Vec<_> = Algorithm::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["MD5", "SHA-1", "SHA-256"]);
        let exts: Vec<_> = Algorithm::ALL.iter().map(|a| a.extension()).collect();
        assert_eq!(exts, ["md5", "sha1", "sha256"]);
    }

    #[test]
    fn hex_of_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello world").unwrap();
        assert_eq!(
            Algorithm::Md5.hex_of_file(&path).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn hex_of_missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = Algorithm::Sha1.hex_of_file(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, VerifyError::ReadFailed { .. }));
    }
}
