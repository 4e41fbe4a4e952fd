use std::io;
use std::sync::Arc;

use super::Matcher;
use crate::writer::ArchiveWriter;

/// Opaque byte-to-byte content transformation.
pub type ContentFn = Arc<dyn Fn(Vec<u8>) -> io::Result<Vec<u8>> + Send + Sync>;

/// Structural action against the output container.
pub type HookFn = Arc<dyn Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    BeforeArchive,
    AfterArchive,
    BeforeEntry,
    AfterEntry,
}

#[derive(Clone)]
pub struct TransformRule {
    pub matcher:   Matcher,
    pub transform: ContentFn,
}

#[derive(Clone)]
pub struct Hook {
    pub phase:   Phase,
    /// Always [`Matcher::Any`] for the archive phases.
    pub matcher: Matcher,
    pub action:  HookFn,
}

impl Hook {
    pub(crate) fn fires(&self, phase: Phase, name: &str) -> bool {
        self.phase == phase && self.matcher.matches(name)
    }
}
