//! Asset management system
//!
//! Vertex data parsers and the shared model cache. Parsers return flat,
//! interleaved float buffers laid out as position [, normal [, texcoord]].

pub mod model_loader;
pub mod model_cache;

pub use model_loader::{ModelData, ModelLoader, ModelParser};
pub use model_cache::{CacheStats, ModelCache, ModelSource};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Content could not be parsed
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// Offending file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Parsed successfully but contained no vertices
    #[error("No vertex data in {0}")]
    Empty(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// OBJ import error
    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),
}
