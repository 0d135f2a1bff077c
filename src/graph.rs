//! Object Graph - arena of objects plus the project-wide object table
//!
//! Objects are owned by the arena and addressed by `ObjectId`. The object
//! table maps every full name to its handle, in discovery order, and is the
//! single place where full names are checked for uniqueness.

use crate::object::{ObjectId, ObjectWithContext, Relationship};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// In-memory object graph built while parsing a project.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    /// All objects, indexed by `ObjectId`
    objects: Vec<ObjectWithContext>,
    /// Full name → handle, in insertion order
    table: IndexMap<String, ObjectId>,
}

impl ObjectGraph {
    /// Create a new empty object graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object without an owner (a package).
    ///
    /// Returns the handle of an existing object when the full name is taken.
    pub fn insert_root(&mut self, object: ObjectWithContext) -> ObjectId {
        if let Some(&existing) = self.table.get(&object.full_name) {
            tracing::warn!(
                "{} already exists as {}, reusing it",
                object.full_name,
                self[existing].kind
            );
            return existing;
        }
        self.push(object)
    }

    /// Attach `object` to `owner`: derive its context, emit `Contains` and
    /// register it in the object table.
    ///
    /// When the derived full name is already taken, the existing object is
    /// returned if `owner` owns it. An object of another owner is never
    /// shared: nothing is attached and `None` is returned.
    pub fn attach(&mut self, owner: ObjectId, mut object: ObjectWithContext) -> Option<ObjectId> {
        object.initialize(owner, &self[owner]);
        if let Some(&existing) = self.table.get(&object.full_name) {
            if self[existing].owner == Some(owner) {
                tracing::debug!("{} already exists, reusing it", object.full_name);
                return Some(existing);
            }
            tracing::warn!(
                "Skipping {} {}: the name belongs to a {} elsewhere",
                object.kind,
                object.full_name,
                self[existing].kind
            );
            return None;
        }

        let full_name = object.full_name.clone();
        let id = self.push(object);
        let owner = &mut self[owner];
        owner.relationships.push(Relationship::contains(full_name));
        owner.contained_objects.push(id);
        Some(id)
    }

    fn push(&mut self, object: ObjectWithContext) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.table.insert(object.full_name.clone(), id);
        self.objects.push(object);
        id
    }

    /// Get an object by handle
    pub fn get(&self, id: ObjectId) -> Option<&ObjectWithContext> {
        self.objects.get(id.index())
    }

    /// Find the handle registered for a full name
    pub fn id_of(&self, full_name: &str) -> Option<ObjectId> {
        self.table.get(full_name).copied()
    }

    /// Find an object by its full name
    pub fn find(&self, full_name: &str) -> Option<&ObjectWithContext> {
        self.id_of(full_name).map(|id| &self[id])
    }

    /// Whether an object with this full name exists
    pub fn contains(&self, full_name: &str) -> bool {
        self.table.contains_key(full_name)
    }

    /// Direct child of `owner` with the given local name
    pub fn child_named(&self, owner: ObjectId, name: &str) -> Option<ObjectId> {
        self[owner]
            .contained_objects
            .iter()
            .copied()
            .find(|&child| self[child].name == name)
    }

    /// `root` and the objects defined under it, in pre-order.
    ///
    /// Packages and modules below `root` are not entered.
    pub fn subtree(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            ids.push(id);
            stack.extend(
                self[id]
                    .contained_objects
                    .iter()
                    .rev()
                    .copied()
                    .filter(|&child| !self[child].kind.is_container()),
            );
        }
        ids
    }

    /// Objects in table order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectWithContext> {
        self.table.values().map(|&id| &self[id])
    }

    /// Full names in table order
    pub fn full_names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut objects_by_label = BTreeMap::new();
        let mut relationships_by_label = BTreeMap::new();
        for object in self.objects() {
            *objects_by_label.entry(object.label()).or_insert(0) += 1;
            for relationship in &object.relationships {
                *relationships_by_label.entry(relationship.label()).or_insert(0) += 1;
            }
        }
        GraphStats {
            total_objects: self.len(),
            objects_by_label,
            relationships_by_label,
        }
    }
}

impl Index<ObjectId> for ObjectGraph {
    type Output = ObjectWithContext;

    fn index(&self, id: ObjectId) -> &Self::Output {
        &self.objects[id.index()]
    }
}

impl IndexMut<ObjectId> for ObjectGraph {
    fn index_mut(&mut self, id: ObjectId) -> &mut Self::Output {
        &mut self.objects[id.index()]
    }
}

/// Statistics about an object graph
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub total_objects: usize,
    pub objects_by_label: BTreeMap<&'static str, usize>,
    pub relationships_by_label: BTreeMap<&'static str, usize>,
}

impl GraphStats {
    pub fn total_relationships(&self) -> usize {
        self.relationships_by_label.values().sum()
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Object Graph Statistics:")?;
        writeln!(f, "  Objects: {}", self.total_objects)?;
        for (label, count) in &self.objects_by_label {
            writeln!(f, "    {}: {}", label, count)?;
        }
        writeln!(f, "  Relationships: {}", self.total_relationships())?;
        for (label, count) in &self.relationships_by_label {
            writeln!(f, "    {}: {}", label, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::object::ObjectKind;

    fn sample_graph() -> (ObjectGraph, ObjectId, ObjectId) {
        let mut graph = ObjectGraph::new();
        let package = graph.insert_root(ObjectWithContext::package("pkg", &Settings::default()));
        let module = graph
            .attach(package, ObjectWithContext::new(ObjectKind::Module, "logic"))
            .unwrap();
        (graph, package, module)
    }

    #[test]
    fn test_attach_registers_and_contains() {
        let (mut graph, package, module) = sample_graph();
        let function = graph
            .attach(module, ObjectWithContext::new(ObjectKind::Function, "run"))
            .unwrap();

        assert_eq!(graph[function].full_name, "pkg.logic.run");
        assert_eq!(graph[function].owner, Some(module));
        assert_eq!(graph.id_of("pkg.logic.run"), Some(function));
        assert_eq!(graph[package].relationships, vec![Relationship::contains("pkg.logic")]);
        assert_eq!(graph[module].contained_objects, vec![function]);
    }

    #[test]
    fn test_attach_reuses_taken_name() {
        let (mut graph, _, module) = sample_graph();
        let first = graph.attach(module, ObjectWithContext::new(ObjectKind::Constant, "X"));
        let second = graph.attach(module, ObjectWithContext::new(ObjectKind::Constant, "X"));

        assert_eq!(first, second);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph[module].relationships.len(), 1);
    }

    #[test]
    fn test_attach_refuses_foreign_object() {
        let mut graph = ObjectGraph::new();
        let sub_package = graph.insert_root(ObjectWithContext::package("pkg.sub", &Settings::default()));
        let package = graph.insert_root(ObjectWithContext::package("pkg", &Settings::default()));

        let module = graph.attach(package, ObjectWithContext::new(ObjectKind::Module, "sub"));
        assert_eq!(module, None);
        assert!(graph[package].contained_objects.is_empty());
        assert!(graph[package].relationships.is_empty());
        assert_eq!(graph.id_of("pkg.sub"), Some(sub_package));
        assert_eq!(graph[sub_package].kind, ObjectKind::Package);
    }

    #[test]
    fn test_insert_root_reuses_taken_name() {
        let (mut graph, package, _) = sample_graph();
        let again = graph.insert_root(ObjectWithContext::package("pkg", &Settings::default()));
        assert_eq!(again, package);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_subtree_pre_order() {
        let (mut graph, package, module) = sample_graph();
        let class = graph
            .attach(module, ObjectWithContext::new(ObjectKind::Class, "Example"))
            .unwrap();
        let method = graph
            .attach(class, ObjectWithContext::new(ObjectKind::Function, "do_stuff"))
            .unwrap();
        let constant = graph
            .attach(module, ObjectWithContext::new(ObjectKind::Constant, "ANSWER"))
            .unwrap();

        assert_eq!(graph.subtree(module), vec![module, class, method, constant]);
        assert_eq!(graph.subtree(package), vec![package]);
        assert_eq!(graph.child_named(module, "ANSWER"), Some(constant));
        assert_eq!(graph.child_named(module, "missing"), None);
    }

    #[test]
    fn test_ids_are_arena_indices() {
        let (mut graph, package, module) = sample_graph();
        let run = graph
            .attach(module, ObjectWithContext::new(ObjectKind::Function, "run"))
            .unwrap();

        assert_eq!((package.index(), module.index(), run.index()), (0, 1, 2));
        assert_eq!(graph.get(ObjectId(2)).map(|o| o.full_name.as_str()), Some("pkg.logic.run"));
        assert!(graph.get(ObjectId(usize::MAX)).is_none());
    }

    #[test]
    fn test_table_order_and_stats() {
        let (mut graph, _, module) = sample_graph();
        graph.attach(module, ObjectWithContext::new(ObjectKind::Function, "run")).unwrap();

        let names: Vec<_> = graph.full_names().collect();
        assert_eq!(names, vec!["pkg", "pkg.logic", "pkg.logic.run"]);

        let stats = graph.stats();
        assert_eq!(stats.total_objects, 3);
        assert_eq!(stats.objects_by_label["function"], 1);
        assert_eq!(stats.relationships_by_label["contains"], 2);
        assert_eq!(stats.total_relationships(), 2);
    }
}
