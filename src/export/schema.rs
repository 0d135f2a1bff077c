//! Database schema definitions

/// SQL to create the graphs table
pub const CREATE_GRAPHS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS graphs (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the nodes table
/// One row per object; `properties` holds the node properties as JSON
pub const CREATE_NODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    graph TEXT NOT NULL REFERENCES graphs(name),
    full_name TEXT NOT NULL,
    label TEXT NOT NULL,
    properties TEXT NOT NULL,
    UNIQUE(graph, full_name)
)
"#;

/// SQL to create the edges table
/// Repeated calls between the same objects are kept as separate rows
pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    graph TEXT NOT NULL REFERENCES graphs(name),
    source TEXT NOT NULL,
    relation TEXT NOT NULL,
    destination TEXT NOT NULL,
    properties TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_nodes_graph ON nodes(graph)",
    "CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(graph, label)",
    "CREATE INDEX IF NOT EXISTS idx_edges_graph ON edges(graph)",
    "CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(graph, source)",
    "CREATE INDEX IF NOT EXISTS idx_edges_destination ON edges(graph, destination)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_GRAPHS_TABLE, CREATE_NODES_TABLE, CREATE_EDGES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
