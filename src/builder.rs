//! Object Graph Builder - turns syntax events into owned objects
//!
//! Definitions become children of the object the events are scoped to and
//! are registered in its scope. Imports and calls are deferred on the owner
//! until the project resolver has a complete object table.

use crate::graph::ObjectGraph;
use crate::object::{ObjectId, ObjectKind, ObjectWithContext};
use crate::syntax::SyntaxElement;

impl ObjectGraph {
    /// Create (or reuse) the child of `owner` called `name`.
    ///
    /// A redefinition of an existing child returns the existing object,
    /// switched to `kind` when a class or function replaces another kind.
    /// `None` when the full name belongs to an object outside `owner`.
    pub fn add_child(&mut self, owner: ObjectId, kind: ObjectKind, name: &str) -> Option<ObjectId> {
        if let Some(existing) = self.child_named(owner, name) {
            tracing::debug!("Redefinition of {}", self[existing].full_name);
            self[existing].redefine_as(kind);
            return Some(existing);
        }
        self.attach(owner, ObjectWithContext::new(kind, name))
    }

    /// Parse the syntax events of `owner`'s body.
    ///
    /// Returns the handles of all objects created in the subtree, in the
    /// order they were defined.
    pub fn parse_syntax_elements(
        &mut self,
        owner: ObjectId,
        elements: Vec<SyntaxElement>,
    ) -> Vec<ObjectId> {
        let mut created = Vec::new();
        for element in elements {
            match element {
                SyntaxElement::Import(import) => self[owner].unresolved_imports.push(import),
                SyntaxElement::Call(call) => self[owner].calls.push(call),
                SyntaxElement::Definition(definition) => {
                    let (kind, name, body) = definition.into_parts();
                    let existed = self.child_named(owner, &name).is_some();
                    let Some(child) = self.add_child(owner, kind.into(), &name) else {
                        continue;
                    };
                    if !existed {
                        created.push(child);
                    }

                    let full_name = self[child].full_name.clone();
                    self[owner].names_in_scope.insert(name, full_name);

                    if kind.is_block() {
                        created.extend(self.parse_syntax_elements(child, body));
                    }
                }
            }
        }
        created
    }
}
