//! Entry-by-entry archive rewriting.
//!
//! Reads a zip, jar-like or tar.gz container and writes a new one, running
//! ordered content transforms and structural hooks from a [`Registry`] along
//! the way. Entries no rule touches come out as they went in; signed jars are
//! never modified.
//!
//! # Architecture
//!
//! - `registry/` - Rules, hooks, exclusions and the signed-jar heuristic
//! - `rewrite/` - Per-format entry loops
//! - `writer/` - Output containers exposed to hooks
//! - `io.rs` - Non-closing stream adapter
//! - `actions.rs` - Stock content functions and hooks
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use archie_archive::{ArchiveFormat, Registry, Rewriter};
//!
//! let registry = Registry::builder()
//!     .append("notes.txt", "\nrewritten")
//!     .add("README.txt", "Hello, World!")
//!     .build()
//!     .unwrap();
//!
//! let rewriter = Rewriter::new(ArchiveFormat::Zip, Arc::new(registry));
//! # let source = {
//! #     use std::io::Write;
//! #     let mut w = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
//! #     w.start_file("notes.txt", zip::write::SimpleFileOptions::default()).unwrap();
//! #     w.write_all(b"original").unwrap();
//! #     w.finish().unwrap().into_inner()
//! # };
//! let rewritten = rewriter.rewrite_bytes(&source).unwrap();
//! # assert!(!rewritten.is_empty());
//! ```

pub use entry::{Entry, EntryKind, RewriteReport};
pub use error::{Error, Result};
pub use format::ArchiveFormat;
pub use options::{Progress, RewriteOptions};
pub use registry::{Matcher, Phase, Registry, RegistryBuilder};
pub use rewrite::{Rewriter, rewriter_for};
pub use writer::ArchiveWriter;

pub mod actions;
pub mod entry;
mod error;
pub mod format;
pub mod io;
pub mod options;
pub mod registry;
mod rewrite;
pub mod writer;
