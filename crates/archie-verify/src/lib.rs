//! Multi-digest streaming and sidecar checksum verification.
//!
//! Feeds one byte stream through MD5, SHA-1 and SHA-256 at once and ties the
//! results to `<file>.md5`, `<file>.sha1` and `<file>.sha256` sidecar files.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use archie_verify::Sidecars;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let sidecars = Sidecars::new(dir.path().join("app.bin"));
//!
//! let mut out = sidecars.create().unwrap();
//! out.write_all(b"hello world").unwrap();
//! out.finish().unwrap();
//!
//! sidecars.verify().unwrap();
//! ```

pub use self::algorithm::{Accumulator, Algorithm};
pub use self::chain::{DigestChain, DigestReader, DigestWriter};
pub use self::error::{Result, VerifyError};
pub use self::sidecar::{Digests, SidecarWriter, Sidecars};

mod algorithm;
mod chain;
mod error;
mod sidecar;
