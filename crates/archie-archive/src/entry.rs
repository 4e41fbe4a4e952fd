use crate::format::ArchiveFormat;

/// Metadata of one container entry, as read from the source or written to
/// the destination.
#[derive(Clone, Debug)]
pub struct Entry {
    pub name:     String,
    pub kind:     EntryKind,
    pub size:     u64,
    pub mode:     Option<u32>,
    /// Unix seconds.
    pub modified: Option<u64>,
    pub accessed: Option<u64>,
    pub created:  Option<u64>,
    /// MS-DOS timestamp of zip-family entries.
    pub dos_time: Option<zip::DateTime>,
    pub method:   Option<zip::CompressionMethod>,
    pub crc32:    Option<u32>,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: 0,
            mode: None,
            modified: None,
            accessed: None,
            created: None,
            dos_time: None,
            method: None,
            crc32: None,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, EntryKind::File).with_size(size)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory)
    }

    pub fn symlink(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryKind::Symlink {
                target: target.into(),
            },
        )
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_modified(mut self, secs: u64) -> Self {
        self.modified = Some(secs);
        self
    }

    pub fn with_accessed(mut self, secs: u64) -> Self {
        self.accessed = Some(secs);
        self
    }

    pub fn with_created(mut self, secs: u64) -> Self {
        self.created = Some(secs);
        self
    }

    pub fn with_crc32(mut self, crc: u32) -> Self {
        self.crc32 = Some(crc);
        self
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::Symlink { .. } | EntryKind::HardLink { .. }
        )
    }

    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Symlink { target } | EntryKind::HardLink { target } => Some(target),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink { target: String },
    /// tar only.
    HardLink { target: String },
    /// tar special entries (devices, fifos) copied verbatim.
    Other,
}

/// Outcome of one rewrite.
#[derive(Clone, Debug)]
pub struct RewriteReport {
    pub format:          ArchiveFormat,
    pub entries_read:    usize,
    /// Includes entries written by hooks.
    pub entries_written: usize,
    pub entries_skipped: usize,
    /// Regular-file content read from the source.
    pub bytes_in:        u64,
    /// Regular-file content written to the destination.
    pub bytes_out:       u64,
    pub entries:         Vec<Entry>,
}

impl RewriteReport {
    pub(crate) fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            entries_read: 0,
            entries_written: 0,
            entries_skipped: 0,
            bytes_in: 0,
            bytes_out: 0,
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_fields() {
        let entry = Entry::file("bin/tool", 1024).with_mode(0o755);
        assert_eq!(entry.name, "bin/tool");
        assert_eq!(entry.size, 1024);
        assert_eq!(entry.mode, Some(0o755));
        assert!(entry.is_file());
        assert!(!entry.is_directory());
        assert!(!entry.is_symlink());
    }

    #[test]
    fn entry_timestamps() {
        let entry = Entry::file("a", 1)
            .with_modified(10)
            .with_accessed(20)
            .with_created(30);
        assert_eq!(entry.modified, Some(10));
        assert_eq!(entry.accessed, Some(20));
        assert_eq!(entry.created, Some(30));
    }

    #[test]
    fn entry_directory() {
        let entry = Entry::directory("bin/");
        assert!(entry.is_directory());
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn entry_links() {
        let entry = Entry::symlink("sample/hello.txt", "hello.txt.1");
        assert!(entry.is_symlink());
        assert!(entry.is_link());
        assert_eq!(entry.link_target(), Some("hello.txt.1"));

        let hard = Entry::new(
            "b",
            EntryKind::HardLink {
                target: "a".to_string(),
            },
        );
        assert!(hard.is_link());
        assert!(!hard.is_symlink());
        assert_eq!(Entry::file("x", 0).link_target(), None);
    }

    #[test]
    fn report_lookup() {
        let mut report = RewriteReport::new(ArchiveFormat::Zip);
        report.entries.push(Entry::file("a.txt", 3));
        report.entries.push(Entry::directory("dir/"));
        assert_eq!(report.names(), ["a.txt", "dir/"]);
        assert_eq!(report.entry("a.txt").map(|e| e.size), Some(3));
        assert!(report.entry("missing").is_none());
    }
}
