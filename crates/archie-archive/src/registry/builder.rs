use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::{Hook, Matcher, Phase, Registry, TransformRule};
use crate::writer::ArchiveWriter;
use crate::{Error, Result, actions};

type Consumer = Box<dyn FnOnce(RegistryBuilder) -> RegistryBuilder>;

const DEFAULT_MAX_CONSUMER_ROUNDS: usize = 1024;

/// Collects rules, hooks and exclusions in registration order.
///
/// Consumers registered with [`RegistryBuilder::and`] may register further
/// consumers; [`RegistryBuilder::build`] runs them until none are left.
pub struct RegistryBuilder {
    transforms:          Vec<TransformRule>,
    hooks:               Vec<Hook>,
    skips:               Vec<Matcher>,
    passthrough:         Vec<Matcher>,
    detect_signed_jars:  bool,
    consumers:           VecDeque<Consumer>,
    max_consumer_rounds: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            transforms:          Vec::new(),
            hooks:               Vec::new(),
            skips:               Vec::new(),
            passthrough:         Vec::new(),
            detect_signed_jars:  true,
            consumers:           VecDeque::new(),
            max_consumer_rounds: DEFAULT_MAX_CONSUMER_ROUNDS,
        }
    }

    /// Register a content function for matching entries.
    pub fn enhance<F>(self, matcher: impl Into<Matcher>, f: F) -> Self
    where
        F: Fn(Vec<u8>) -> Vec<u8> + Send + Sync + 'static,
    {
        self.transform(matcher, Arc::new(move |bytes| Ok(f(bytes))))
    }

    /// Like [`enhance`](Self::enhance) for content functions that can fail.
    pub fn try_enhance<F>(self, matcher: impl Into<Matcher>, f: F) -> Self
    where
        F: Fn(Vec<u8>) -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.transform(matcher, Arc::new(f))
    }

    pub fn transform(mut self, matcher: impl Into<Matcher>, transform: super::ContentFn) -> Self {
        self.transforms.push(TransformRule {
            matcher: matcher.into(),
            transform,
        });
        self
    }

    pub fn prepend(self, matcher: impl Into<Matcher>, text: impl AsRef<[u8]>) -> Self {
        self.transform(matcher, actions::prepend(text))
    }

    pub fn append(self, matcher: impl Into<Matcher>, text: impl AsRef<[u8]>) -> Self {
        self.transform(matcher, actions::append(text))
    }

    pub fn replace(self, matcher: impl Into<Matcher>, content: impl AsRef<[u8]>) -> Self {
        self.transform(matcher, actions::replace(content))
    }

    pub fn before<F>(self, action: F) -> Self
    where
        F: Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.hook(Phase::BeforeArchive, Matcher::Any, action)
    }

    pub fn after<F>(self, action: F) -> Self
    where
        F: Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.hook(Phase::AfterArchive, Matcher::Any, action)
    }

    pub fn before_entry<F>(self, matcher: impl Into<Matcher>, action: F) -> Self
    where
        F: Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.hook(Phase::BeforeEntry, matcher.into(), action)
    }

    pub fn after_entry<F>(self, matcher: impl Into<Matcher>, action: F) -> Self
    where
        F: Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.hook(Phase::AfterEntry, matcher.into(), action)
    }

    fn hook<F>(mut self, phase: Phase, matcher: Matcher, action: F) -> Self
    where
        F: Fn(&mut dyn ArchiveWriter) -> io::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(Hook {
            phase,
            matcher,
            action: Arc::new(action),
        });
        self
    }

    /// Insert an entry once every source entry has been written.
    pub fn add(self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.after(actions::insert_entry(name, content))
    }

    /// Like [`add`](Self::add); `supplier` runs on every rewrite.
    pub fn add_with<F>(self, name: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.after(actions::insert_with(name, supplier))
    }

    /// Like [`add`](Self::add) with the content of a file on disk, read on
    /// every rewrite.
    pub fn add_file(self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.after(actions::insert_file(name, path))
    }

    /// Drop matching entries from the output. No hooks fire for them.
    pub fn skip(mut self, matcher: impl Into<Matcher>) -> Self {
        self.skips.push(matcher.into());
        self
    }

    /// Copy matching entries without running any transform.
    pub fn skip_transformation(mut self, matcher: impl Into<Matcher>) -> Self {
        self.passthrough.push(matcher.into());
        self
    }

    pub fn detect_signed_jars(mut self, enabled: bool) -> Self {
        self.detect_signed_jars = enabled;
        self
    }

    /// Defer configuration to `consumer`, which may itself call `and`.
    pub fn and<F>(mut self, consumer: F) -> Self
    where
        F: FnOnce(RegistryBuilder) -> RegistryBuilder + 'static,
    {
        self.consumers.push_back(Box::new(consumer));
        self
    }

    pub fn max_consumer_rounds(mut self, rounds: usize) -> Self {
        self.max_consumer_rounds = rounds;
        self
    }

    /// Run pending consumers to a fixed point, then freeze the rule set.
    ///
    /// Each round runs every consumer queued at its start; consumers they
    /// register run in the next round.
    pub fn build(mut self) -> Result<Registry> {
        let mut rounds = 0;
        while !self.consumers.is_empty() {
            if rounds == self.max_consumer_rounds {
                return Err(Error::BuilderDidNotConverge { rounds });
            }
            rounds += 1;

            let pending = std::mem::take(&mut self.consumers);
            for consumer in pending {
                self = consumer(self);
            }
        }
        debug!(
            transforms = self.transforms.len(),
            hooks = self.hooks.len(),
            rounds,
            "registry built"
        );

        Ok(Registry {
            transforms:         self.transforms,
            hooks:              self.hooks,
            skips:              self.skips,
            passthrough:        self.passthrough,
            detect_signed_jars: self.detect_signed_jars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumers_extend_the_builder() {
        let registry = RegistryBuilder::new()
            .append("a", "1")
            .and(|b| b.append("a", "2").and(|b| b.append("a", "4")))
            .and(|b| b.append("a", "3"))
            .build()
            .unwrap();

        assert_eq!(registry.apply("a", Vec::new()).unwrap(), b"1234");
    }

    #[test]
    fn runaway_consumers_are_capped() {
        fn again(b: RegistryBuilder) -> RegistryBuilder {
            b.and(again)
        }

        let err = RegistryBuilder::new()
            .and(again)
            .max_consumer_rounds(8)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::BuilderDidNotConverge { rounds: 8 }));
    }

    #[test]
    fn hooks_keep_phase_and_order() {
        let registry = RegistryBuilder::new()
            .after(|_| Ok(()))
            .before_entry("x", |_| Ok(()))
            .add("README.txt", "hi")
            .before(|_| Ok(()))
            .build()
            .unwrap();

        let phases: Vec<_> = registry.hooks().iter().map(|h| h.phase).collect();
        assert_eq!(
            phases,
            [
                Phase::AfterArchive,
                Phase::BeforeEntry,
                Phase::AfterArchive,
                Phase::BeforeArchive
            ]
        );
    }

    #[test]
    fn signed_jar_detection_can_be_disabled() {
        let registry = RegistryBuilder::new().detect_signed_jars(false).build().unwrap();
        assert!(!registry.is_passthrough("a.jar", b"not a zip"));
    }
}
