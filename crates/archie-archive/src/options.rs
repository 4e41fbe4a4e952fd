use std::sync::Arc;

#[derive(Clone)]
pub struct RewriteOptions {
    /// gzip level (0-9) for tar.gz output.
    pub gzip_level:      u32,
    /// Force one compression method for every zip-family file entry.
    /// `None` keeps each source entry's method.
    pub zip_compression: Option<zip::CompressionMethod>,
    pub on_progress:     Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            gzip_level: 6,
            zip_compression: None,
            on_progress: None,
        }
    }
}

impl std::fmt::Debug for RewriteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteOptions")
            .field("gzip_level", &self.gzip_level)
            .field("zip_compression", &self.zip_compression)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub entries_processed: usize,
    pub bytes_processed:   u64,
    pub current_entry:     Option<String>,
}

impl RewriteOptions {
    pub fn gzip_level(mut self, level: u32) -> Self {
        self.gzip_level = level.min(9);
        self
    }

    pub fn zip_compression(mut self, method: zip::CompressionMethod) -> Self {
        self.zip_compression = Some(method);
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn report(&self, entries_processed: usize, bytes_processed: u64, current: &str) {
        if let Some(callback) = &self.on_progress {
            callback(Progress {
                entries_processed,
                bytes_processed,
                current_entry: Some(current.to_string()),
            });
        }
    }
}
