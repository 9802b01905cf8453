//! Model cache for deduplicating parsed vertex data
//!
//! Sits on top of a [`ModelParser`] so every source is parsed at most once
//! per cache lifetime. Keys carry the parser kind, so the same path read
//! as a header and as text yields two separate entries.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::model_loader::{ModelData, ModelLoader, ModelParser};
use super::AssetError;

/// A cacheable vertex source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource<'a> {
    /// Float array `array` inside a header file
    Header {
        /// Header file
        path: &'a Path,
        /// Array name
        array: &'a str,
    },
    /// One-vertex-per-line text file
    Text(&'a Path),
    /// Wavefront OBJ file
    Obj(&'a Path),
}

impl ModelSource<'_> {
    /// Cache key: `header:<path>#<array>`, `text:<path>` or `obj:<path>`
    pub fn cache_key(&self) -> String {
        match self {
            Self::Header { path, array } => format!("header:{}#{}", path.display(), array),
            Self::Text(path) => format!("text:{}", path.display()),
            Self::Obj(path) => format!("obj:{}", path.display()),
        }
    }

    fn parse(&self, parser: &dyn ModelParser) -> Result<ModelData, AssetError> {
        match self {
            Self::Header { path, array } => parser.parse_header(path, array),
            Self::Text(path) => parser.parse_text(path),
            Self::Obj(path) => parser.parse_obj(path),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached sources
    pub entries: usize,
    /// Vertices over all entries
    pub total_vertices: usize,
    /// Vertex bytes over all entries
    pub total_bytes: usize,
}

/// Thread-safe parse cache for vertex data
///
/// Constructed explicitly and passed to whoever loads models; there is no
/// global instance.
pub struct ModelCache {
    /// Cache storage: key -> parsed data
    cache: RwLock<HashMap<String, Arc<ModelData>>>,
    parser: Box<dyn ModelParser>,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCache {
    /// Create an empty cache backed by [`ModelLoader`]
    pub fn new() -> Self {
        Self::with_parser(Box::new(ModelLoader::new()))
    }

    /// Create an empty cache backed by a custom parser
    pub fn with_parser(parser: Box<dyn ModelParser>) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            parser,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<ModelData>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ModelData>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the float array `array` from a header file
    ///
    /// # Returns
    /// The shared vertex data, or `None` if the source could not be parsed
    pub fn load_model(&self, path: impl AsRef<Path>, array: &str) -> Option<Arc<ModelData>> {
        self.load(ModelSource::Header { path: path.as_ref(), array })
    }

    /// Load a one-vertex-per-line text file
    pub fn load_model_from_text(&self, path: impl AsRef<Path>) -> Option<Arc<ModelData>> {
        self.load(ModelSource::Text(path.as_ref()))
    }

    /// Load a Wavefront OBJ file
    pub fn load_model_from_obj(&self, path: impl AsRef<Path>) -> Option<Arc<ModelData>> {
        self.load(ModelSource::Obj(path.as_ref()))
    }

    /// Load any source, parsing it only on a miss
    ///
    /// Failures are logged and not cached, so a later call retries.
    pub fn load(&self, source: ModelSource<'_>) -> Option<Arc<ModelData>> {
        match self.try_load(source) {
            Ok(data) => Some(data),
            Err(e) => {
                log::error!("Failed to load model {}: {}", source.cache_key(), e);
                None
            }
        }
    }

    /// [`load`](Self::load) with the error instead of a log line
    pub fn try_load(&self, source: ModelSource<'_>) -> Result<Arc<ModelData>, AssetError> {
        let key = source.cache_key();

        if let Some(data) = self.read().get(&key) {
            log::debug!("Model cache hit: {}", key);
            return Ok(Arc::clone(data));
        }

        // Parse under the write lock so a source is never parsed twice
        let mut cache = self.write();
        if let Some(data) = cache.get(&key) {
            return Ok(Arc::clone(data));
        }

        log::debug!("Model cache miss: {} - loading", key);
        let data = Arc::new(source.parse(self.parser.as_ref())?);
        if data.is_empty() {
            return Err(AssetError::Empty(key));
        }

        log::debug!("Model cached: {} ({} vertices)", key, data.vertex_count());
        cache.insert(key, Arc::clone(&data));
        Ok(data)
    }

    /// Check if a source is cached
    pub fn contains(&self, source: ModelSource<'_>) -> bool {
        self.read().contains_key(&source.cache_key())
    }

    /// Drop every entry; data still referenced elsewhere stays alive
    pub fn clear(&self) {
        self.write().clear();
        log::info!("Model cache cleared");
    }

    /// Get the number of cached sources
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry, vertex and byte totals
    pub fn stats(&self) -> CacheStats {
        self.read().values().fold(CacheStats::default(), |mut stats, data| {
            stats.entries += 1;
            stats.total_vertices += data.vertex_count();
            stats.total_bytes += data.byte_size();
            stats
        })
    }

    /// Log every entry and the totals
    pub fn log_stats(&self) {
        let cache = self.read();
        let mut keys: Vec<&String> = cache.keys().collect();
        keys.sort();

        log::info!("=== Model Cache Stats ===");
        log::info!("Cached models: {}", cache.len());
        for key in keys {
            if let Some(data) = cache.get(key) {
                log::info!("  - {}: {} vertices", key, data.vertex_count());
            }
        }
        drop(cache);

        let stats = self.stats();
        log::info!("Total vertices: {}", stats.total_vertices);
        log::info!("Total memory: {} KB", stats.total_bytes / 1024);
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
