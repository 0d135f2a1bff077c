//! SQLite storage of named graphs

use super::document::{EdgeRecord, GraphDocument, NodeRecord};
use super::schema;
use crate::{Error, Result};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// SQLite-backed storage for object graphs
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Graph Operations ==========

    /// Store `doc` under `graph_name` in a single transaction.
    ///
    /// An existing graph of that name is replaced when `overwrite` is set,
    /// otherwise the call fails with `Error::GraphExists`.
    pub fn populate(&mut self, graph_name: &str, doc: &GraphDocument, overwrite: bool) -> Result<PopulateSummary> {
        let tx = self.conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM graphs WHERE name = ?1)",
            params![graph_name],
            |row| row.get(0),
        )?;
        if exists {
            if !overwrite {
                return Err(Error::GraphExists(graph_name.to_string()));
            }
            info!("Replacing graph {}", graph_name);
            delete_graph_rows(&tx, graph_name)?;
        }

        tx.execute("INSERT INTO graphs (name) VALUES (?1)", params![graph_name])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO nodes (graph, full_name, label, properties) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for node in &doc.nodes {
                let properties = serde_json::to_string(&node.properties)?;
                stmt.execute(params![graph_name, node.full_name(), node.label, properties])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                "INSERT INTO edges (graph, source, relation, destination, properties) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for edge in &doc.edges {
                let properties = serde_json::to_string(&edge.properties)?;
                stmt.execute(params![graph_name, edge.source, edge.relation, edge.destination, properties])?;
            }
        }
        tx.commit()?;

        debug!(
            "Stored {} nodes and {} edges in graph {}",
            doc.nodes.len(),
            doc.edges.len(),
            graph_name
        );
        Ok(PopulateSummary {
            graph_name: graph_name.to_string(),
            nodes_added: doc.nodes.len(),
            edges_added: doc.edges.len(),
        })
    }

    /// Names of the stored graphs
    pub fn graph_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM graphs ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn has_graph(&self, graph_name: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM graphs WHERE name = ?1)",
            params![graph_name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Delete a graph; returns whether it existed
    pub fn delete_graph(&mut self, graph_name: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let deleted = delete_graph_rows(&tx, graph_name)?;
        tx.commit()?;
        Ok(deleted)
    }

    // ========== Node Operations ==========

    /// Nodes of a graph in insertion order
    pub fn nodes(&self, graph_name: &str) -> Result<Vec<NodeRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label, properties FROM nodes WHERE graph = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![graph_name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(label, properties)| {
                Ok(NodeRecord {
                    label,
                    properties: parse_properties(&properties)?,
                })
            })
            .collect()
    }

    /// Node counts per label, most frequent first
    pub fn label_counts(&self, graph_name: &str) -> Result<Vec<(String, usize)>> {
        self.grouped_counts(
            "SELECT label, COUNT(*) AS n FROM nodes WHERE graph = ?1 GROUP BY label ORDER BY n DESC, label",
            graph_name,
        )
    }

    // ========== Edge Operations ==========

    /// Edges of a graph in insertion order
    pub fn edges(&self, graph_name: &str) -> Result<Vec<EdgeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, relation, destination, properties FROM edges WHERE graph = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![graph_name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(source, relation, destination, properties)| {
                Ok(EdgeRecord {
                    source,
                    relation,
                    destination,
                    properties: parse_properties(&properties)?,
                })
            })
            .collect()
    }

    /// Edge counts per relation, most frequent first
    pub fn relation_counts(&self, graph_name: &str) -> Result<Vec<(String, usize)>> {
        self.grouped_counts(
            "SELECT relation, COUNT(*) AS n FROM edges WHERE graph = ?1 GROUP BY relation ORDER BY n DESC, relation",
            graph_name,
        )
    }

    // ========== Statistics ==========

    /// Summary of a stored graph, `None` when it does not exist
    pub fn stats(&self, graph_name: &str) -> Result<Option<StoredGraphStats>> {
        if !self.has_graph(graph_name)? {
            return Ok(None);
        }
        Ok(Some(StoredGraphStats {
            graph_name: graph_name.to_string(),
            nodes_by_label: self.label_counts(graph_name)?,
            edges_by_relation: self.relation_counts(graph_name)?,
        }))
    }

    fn grouped_counts(&self, sql: &str, graph_name: &str) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt
            .query_map(params![graph_name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }
}

fn delete_graph_rows(conn: &Connection, graph_name: &str) -> Result<bool> {
    conn.execute("DELETE FROM edges WHERE graph = ?1", params![graph_name])?;
    conn.execute("DELETE FROM nodes WHERE graph = ?1", params![graph_name])?;
    let deleted = conn.execute("DELETE FROM graphs WHERE name = ?1", params![graph_name])?;
    Ok(deleted > 0)
}

fn parse_properties(text: &str) -> Result<Map<String, Value>> {
    Ok(serde_json::from_str(text)?)
}

/// Result of storing a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub graph_name: String,
    pub nodes_added: usize,
    pub edges_added: usize,
}

/// Counts of a stored graph
#[derive(Debug, Clone, Serialize)]
pub struct StoredGraphStats {
    pub graph_name: String,
    pub nodes_by_label: Vec<(String, usize)>,
    pub edges_by_relation: Vec<(String, usize)>,
}

impl StoredGraphStats {
    pub fn total_nodes(&self) -> usize {
        self.nodes_by_label.iter().map(|(_, n)| n).sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges_by_relation.iter().map(|(_, n)| n).sum()
    }
}

impl std::fmt::Display for StoredGraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics ({}):", self.graph_name)?;
        writeln!(f, "  Nodes: {}", self.total_nodes())?;
        for (label, count) in &self.nodes_by_label {
            writeln!(f, "    {}: {}", label, count)?;
        }
        writeln!(f, "  Edges: {}", self.total_edges())?;
        for (relation, count) in &self.edges_by_relation {
            writeln!(f, "    {}: {}", relation, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(label: &str, full_name: &str) -> NodeRecord {
        let mut properties = Map::new();
        properties.insert("name".into(), json!(full_name.rsplit('.').next().unwrap()));
        properties.insert("full_name".into(), json!(full_name));
        NodeRecord {
            label: label.to_string(),
            properties,
        }
    }

    fn edge(source: &str, relation: &str, destination: &str) -> EdgeRecord {
        EdgeRecord {
            source: source.to_string(),
            relation: relation.to_string(),
            destination: destination.to_string(),
            properties: Map::new(),
        }
    }

    fn sample_document() -> GraphDocument {
        GraphDocument {
            nodes: vec![
                node("package", "pkg"),
                node("module", "pkg.main"),
                node("function", "pkg.main.run"),
                node("function", "pkg.main.helper"),
            ],
            edges: vec![
                edge("pkg", "contains", "pkg.main"),
                edge("pkg.main", "contains", "pkg.main.run"),
                edge("pkg.main", "contains", "pkg.main.helper"),
                edge("pkg.main.run", "calls", "pkg.main.helper"),
                edge("pkg.main.run", "calls", "pkg.main.helper"),
            ],
        }
    }

    #[test]
    fn test_populate_and_read_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let doc = sample_document();

        let summary = store.populate("demo", &doc, false).unwrap();
        assert_eq!(
            summary,
            PopulateSummary {
                graph_name: "demo".to_string(),
                nodes_added: 4,
                edges_added: 5,
            }
        );

        assert_eq!(store.graph_names().unwrap(), vec!["demo"]);
        assert_eq!(store.nodes("demo").unwrap(), doc.nodes);
        assert_eq!(store.edges("demo").unwrap(), doc.edges);
    }

    #[test]
    fn test_existing_graph_requires_overwrite() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let doc = sample_document();
        store.populate("demo", &doc, false).unwrap();

        let again = store.populate("demo", &doc, false);
        assert!(matches!(again, Err(Error::GraphExists(name)) if name == "demo"));
        assert_eq!(store.nodes("demo").unwrap().len(), 4);

        let smaller = GraphDocument {
            nodes: vec![node("package", "pkg")],
            edges: Vec::new(),
        };
        let summary = store.populate("demo", &smaller, true).unwrap();
        assert_eq!(summary.nodes_added, 1);
        assert_eq!(store.nodes("demo").unwrap().len(), 1);
        assert!(store.edges("demo").unwrap().is_empty());
    }

    #[test]
    fn test_graphs_are_separate() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.populate("first", &sample_document(), false).unwrap();
        store.populate("second", &sample_document(), false).unwrap();

        assert!(store.delete_graph("first").unwrap());
        assert!(!store.delete_graph("first").unwrap());
        assert_eq!(store.graph_names().unwrap(), vec!["second"]);
        assert_eq!(store.nodes("second").unwrap().len(), 4);
    }

    #[test]
    fn test_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.populate("demo", &sample_document(), false).unwrap();

        let stats = store.stats("demo").unwrap().unwrap();
        assert_eq!(stats.total_nodes(), 4);
        assert_eq!(stats.total_edges(), 5);
        assert_eq!(stats.nodes_by_label[0], ("function".to_string(), 2));
        assert_eq!(
            stats.edges_by_relation,
            vec![("contains".to_string(), 3), ("calls".to_string(), 2)]
        );
        assert!(stats.to_string().starts_with("Graph Statistics (demo):"));

        assert!(store.stats("missing").unwrap().is_none());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("graph.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.populate("demo", &sample_document(), false).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.has_graph("demo").unwrap());
    }
}
