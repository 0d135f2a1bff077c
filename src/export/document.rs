//! Graph document - nodes and edges of a parse result

use crate::Result;
use crate::config::Settings;
use crate::graph::ObjectGraph;
use crate::project::ParseResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node: one object of the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub label: String,
    pub properties: Map<String, Value>,
}

impl NodeRecord {
    pub fn full_name(&self) -> &str {
        self.properties
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// An edge: one relationship between two objects, by full name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub relation: String,
    pub destination: String,
    pub properties: Map<String, Value>,
}

/// All nodes and edges of a parsed project, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    pub fn from_parse_result(result: &ParseResult) -> Self {
        Self::from_graph(&result.graph, &result.settings)
    }

    /// Build the document. Edges whose destination is not an object of the
    /// graph are left out.
    pub fn from_graph(graph: &ObjectGraph, settings: &Settings) -> Self {
        let nodes = graph
            .objects()
            .map(|object| NodeRecord {
                label: object.label().to_string(),
                properties: object.node_properties(settings),
            })
            .collect();

        let mut edges = Vec::new();
        for object in graph.objects() {
            for relationship in &object.relationships {
                if !graph.contains(relationship.destination()) {
                    continue;
                }
                edges.push(EdgeRecord {
                    source: object.full_name.clone(),
                    relation: relationship.label().to_string(),
                    destination: relationship.destination().to_string(),
                    properties: relationship.properties(),
                });
            }
        }

        Self { nodes, edges }
    }

    /// Find a node by full name
    pub fn node(&self, full_name: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|node| node.full_name() == full_name)
    }

    /// Edges leaving `full_name` with the given relation
    pub fn edges_from<'a>(&'a self, full_name: &'a str, relation: &'a str) -> impl Iterator<Item = &'a EdgeRecord> {
        self.edges
            .iter()
            .filter(move |edge| edge.source == full_name && edge.relation == relation)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
