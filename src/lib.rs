//! # Pycograph - Python code graph
//!
//! Turns a Python project into a fully resolved object graph.
//!
//! Pycograph provides:
//! - Tree-sitter based extraction of basic syntax events per module
//! - An ownership tree of packages, modules, classes, functions and constants
//! - Bounded multi-pass resolution of imports, re-exports and calls
//! - Test code classification based on package names
//! - Export as a JSON graph document or into a SQLite graph store

pub mod syntax;
pub mod naming;
pub mod object;
pub mod graph;
pub mod builder;
pub mod adapter;
pub mod project;
pub mod ignore;
pub mod export;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use config::Settings;
pub use export::{GraphDocument, SqliteStore};
pub use graph::ObjectGraph;
pub use object::{ObjectId, ObjectKind, ObjectWithContext, Relationship};
pub use project::{parse_project, ParseResult, Project, ResolutionStats};
pub use syntax::SyntaxElement;

/// Result type alias for Pycograph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pycograph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid project root: {0}")]
    InvalidRoot(String),

    #[error("No Python modules found in {0}")]
    NoSourceFiles(String),

    #[error("Syntax error in {module} at line {line}, column {column}")]
    Syntax {
        module: String,
        line: usize,
        column: usize,
    },

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Graph {0} already exists (use --overwrite to replace it)")]
    GraphExists(String),

    #[error("Config error: {0}")]
    Config(String),
}
