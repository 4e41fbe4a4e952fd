//! Ordered transformation rules, phase hooks and exclusion rules.
//!
//! A [`Registry`] makes every decision of a rewrite (which entries are
//! dropped, which are copied untouched, which content functions run, which
//! hooks fire) without touching any container bytes itself.

use std::io;

use tracing::{info, trace};

pub use self::builder::RegistryBuilder;
pub use self::matcher::Matcher;
pub use self::rule::{ContentFn, Hook, HookFn, Phase, TransformRule};
pub use self::signed::is_signed_jar;

use crate::writer::ArchiveWriter;

mod builder;
mod matcher;
mod rule;
mod signed;

/// Immutable rule set shared by any number of rewrites.
#[derive(Clone)]
pub struct Registry {
    transforms:         Vec<TransformRule>,
    hooks:              Vec<Hook>,
    skips:              Vec<Matcher>,
    passthrough:        Vec<Matcher>,
    detect_signed_jars: bool,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Fold every matching transform over `bytes`, in registration order.
    ///
    /// Entries under a skip-transformation rule and signed jars come back
    /// unchanged.
    pub fn apply(&self, name: &str, bytes: Vec<u8>) -> io::Result<Vec<u8>> {
        if self.is_passthrough(name, &bytes) {
            return Ok(bytes);
        }
        let mut content = bytes;
        for rule in self.transforms.iter().filter(|r| r.matcher.matches(name)) {
            trace!(entry = %name, matcher = ?rule.matcher, "applying transform");
            content = (rule.transform)(content)?;
        }
        Ok(content)
    }

    pub fn should_skip(&self, name: &str) -> bool {
        self.skips.iter().any(|m| m.matches(name))
    }

    pub fn is_passthrough(&self, name: &str, bytes: &[u8]) -> bool {
        if self.passthrough.iter().any(|m| m.matches(name)) {
            return true;
        }
        if self.detect_signed_jars && is_signed_jar(name, bytes) {
            info!(entry = %name, "signed jar, leaving content untouched");
            return true;
        }
        false
    }

    pub fn has_transform_for(&self, name: &str) -> bool {
        self.transforms.iter().any(|r| r.matcher.matches(name))
    }

    pub fn before_archive(&self, out: &mut dyn ArchiveWriter) -> io::Result<()> {
        self.run(Phase::BeforeArchive, "", out)
    }

    pub fn after_archive(&self, out: &mut dyn ArchiveWriter) -> io::Result<()> {
        self.run(Phase::AfterArchive, "", out)
    }

    pub fn before_entry(&self, name: &str, out: &mut dyn ArchiveWriter) -> io::Result<()> {
        self.run(Phase::BeforeEntry, name, out)
    }

    pub fn after_entry(&self, name: &str, out: &mut dyn ArchiveWriter) -> io::Result<()> {
        self.run(Phase::AfterEntry, name, out)
    }

    fn run(&self, phase: Phase, name: &str, out: &mut dyn ArchiveWriter) -> io::Result<()> {
        for hook in self.hooks.iter().filter(|h| h.fires(phase, name)) {
            trace!(?phase, entry = %name, "running hook");
            (hook.action)(out)?;
        }
        Ok(())
    }

    pub fn transforms(&self) -> &[TransformRule] {
        &self.transforms
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("transforms", &self.transforms.len())
            .field("hooks", &self.hooks.len())
            .field("skips", &self.skips)
            .field("passthrough", &self.passthrough)
            .field("detect_signed_jars", &self.detect_signed_jars)
            .finish()
    }
}
