//! Export Layer - rendering a parse result as a graph
//!
//! The resolved objects become nodes and their relationships edges:
//! - `GraphDocument`: nodes and edges as serializable records (JSON export)
//! - `SqliteStore`: named graphs persisted in SQLite with tables
//!   graphs(name), nodes(graph, full_name, label, properties),
//!   edges(graph, source, relation, destination, properties)

pub mod document;
pub mod schema;
pub mod sqlite;

pub use document::{EdgeRecord, GraphDocument, NodeRecord};
pub use sqlite::{PopulateSummary, SqliteStore, StoredGraphStats};
