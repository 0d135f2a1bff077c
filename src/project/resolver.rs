//! Relationship resolution in the context of the whole project
//!
//! The steps have a strict order:
//! 1. Resolve the imports, in a bounded number of passes so that imports of
//!    imported names can resolve once their source has
//! 2. Push the names now in scope down to the objects of each module
//! 3. Resolve the calls with the knowledge of those names

use super::Project;
use crate::object::{ObjectId, Relationship};
use crate::syntax::{ImportElement, ImportOrigin, ReferenceType};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ResolutionStats {
    pub modules_parsed: usize,
    pub modules_skipped: usize,
    pub import_passes: usize,
    pub imports_resolved: usize,
    pub imports_unresolved: usize,
    /// Calls whose destination is an object of the project
    pub calls_resolved: usize,
    /// Calls bound to a name in scope whose destination is not an object
    /// (`self.attr`, attributes of imported objects)
    pub calls_unmatched: usize,
    /// Calls to names not in scope (builtins, dynamic names)
    pub calls_dropped: usize,
}

impl fmt::Display for ResolutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolution Stats:")?;
        writeln!(
            f,
            "  Modules: {} parsed, {} skipped",
            self.modules_parsed, self.modules_skipped
        )?;
        writeln!(
            f,
            "  Imports: {} resolved, {} unresolved after {} passes",
            self.imports_resolved, self.imports_unresolved, self.import_passes
        )?;
        writeln!(
            f,
            "  Calls: {} resolved, {} unmatched, {} dropped",
            self.calls_resolved, self.calls_unmatched, self.calls_dropped
        )
    }
}

/// Target of a relative import: drop `level` trailing segments of the
/// importer's full name and append the imported name.
///
/// `None` when the importer has no `level` segments to drop.
pub fn relative_import_path(module_full_name: &str, import_full_name: &str, level: usize) -> Option<String> {
    let segments: Vec<&str> = module_full_name.split('.').collect();
    if level >= segments.len() {
        return None;
    }
    let base = segments[..segments.len() - level].join(".");
    Some(format!("{}.{}", base, import_full_name))
}

impl Project {
    pub(super) fn resolve_relationships(&mut self) {
        // Objects of each module, with the module that owns them
        let scopes: Vec<(ObjectId, ObjectId)> = self
            .modules
            .iter()
            .flat_map(|module| {
                self.graph
                    .subtree(module.id)
                    .into_iter()
                    .map(move |id| (id, module.id))
            })
            .collect();

        self.resolve_imports(&scopes);
        self.update_names_in_scope();
        self.resolve_calls(&scopes);

        info!(
            "Resolved {} imports and {} calls",
            self.stats.imports_resolved, self.stats.calls_resolved
        );
    }

    fn resolve_imports(&mut self, scopes: &[(ObjectId, ObjectId)]) {
        for pass in 1..=self.settings.import_resolution_passes {
            let mut resolved = 0;
            for &(id, module) in scopes {
                resolved += self.resolve_imports_of(id, module);
            }
            self.stats.import_passes = pass;
            self.stats.imports_resolved += resolved;
            debug!("Import pass {}: {} imports resolved", pass, resolved);

            // Nothing changed, so further passes cannot resolve more
            if resolved == 0 {
                break;
            }
        }

        for &(id, _) in scopes {
            let object = &self.graph[id];
            for import in &object.unresolved_imports {
                debug!("Unresolved in {}: {}", object.full_name, import);
            }
            self.stats.imports_unresolved += object.unresolved_imports.len();
        }
    }

    /// Try every import still queued on `id`; returns how many resolved.
    fn resolve_imports_of(&mut self, id: ObjectId, module: ObjectId) -> usize {
        let pending = std::mem::take(&mut self.graph[id].unresolved_imports);
        if pending.is_empty() {
            return 0;
        }

        let module_full_name = self.graph[module].full_name.clone();
        let mut resolved = 0;
        for import in pending {
            match self.resolve_import(&import, &module_full_name) {
                Some(target) => {
                    self.process_resolved_import(id, module, import, target);
                    resolved += 1;
                }
                None => self.graph[id].unresolved_imports.push(import),
            }
        }
        resolved
    }

    /// Full name of the object an import refers to
    fn resolve_import(&self, import: &ImportElement, module_full_name: &str) -> Option<String> {
        let target = import.target_name();
        match import.reference_type() {
            ReferenceType::Absolute => self.find_by_full_name(&target).or_else(|| {
                // A module of the importer's own package
                relative_import_path(module_full_name, &target, 1)
                    .and_then(|sibling| self.find_by_full_name(&sibling))
            }),
            ReferenceType::Relative => {
                relative_import_path(module_full_name, &target, import.level())
                    .and_then(|path| self.find_by_full_name(&path))
            }
        }
    }

    fn process_resolved_import(
        &mut self,
        id: ObjectId,
        module: ObjectId,
        import: ImportElement,
        target: String,
    ) {
        // `import a.b` also makes `a` usable in the importer
        let package_binding = match (&import.origin, &import.as_name) {
            (ImportOrigin::Plain, None) => import
                .name
                .split_once('.')
                .and_then(|(first, _)| self.find_by_full_name(first).map(|t| (first.to_string(), t))),
            _ => None,
        };

        let holder = &mut self.graph[id];
        holder
            .names_in_scope
            .insert(import.name_in_importer().to_string(), target.clone());
        if let Some((name, package)) = package_binding {
            holder.names_in_scope.entry(name).or_insert(package);
        }

        if id == module {
            let owner_name = self.graph[module].export_name();
            let reference_name = format!("{}.{}", owner_name, import.name);
            self.imported_names.insert(reference_name, target.clone());
        }

        self.graph[id]
            .relationships
            .push(Relationship::resolved_import(target, import));
    }

    /// Look a full name up in the object table, following imported names.
    fn find_by_full_name(&self, reference_name: &str) -> Option<String> {
        let mut visited = HashSet::new();
        let mut current = reference_name;
        loop {
            if self.graph.contains(current) {
                return Some(current.to_string());
            }
            if !visited.insert(current) {
                return None;
            }
            current = self.imported_names.get(current)?.as_str();
        }
    }

    /// Copy every object's scope into its children without shadowing their
    /// own bindings.
    fn update_names_in_scope(&mut self) {
        let module_ids: Vec<ObjectId> = self.modules.iter().map(|module| module.id).collect();
        for module in module_ids {
            for id in self.graph.subtree(module) {
                let object = &self.graph[id];
                if object.contained_objects.is_empty() || object.names_in_scope.is_empty() {
                    continue;
                }
                let names = object.names_in_scope.clone();
                let children: Vec<ObjectId> = object
                    .contained_objects
                    .iter()
                    .copied()
                    .filter(|&child| !self.graph[child].kind.is_container())
                    .collect();
                for child in children {
                    let scope = &mut self.graph[child].names_in_scope;
                    for (name, full_name) in &names {
                        scope
                            .entry(name.clone())
                            .or_insert_with(|| full_name.clone());
                    }
                }
            }
        }
    }

    fn resolve_calls(&mut self, scopes: &[(ObjectId, ObjectId)]) {
        for &(id, _) in scopes {
            let object = &self.graph[id];
            let mut relationships = Vec::new();
            for call in &object.calls {
                let Some(base) = object.names_in_scope.get(&call.reference_name) else {
                    self.stats.calls_dropped += 1;
                    continue;
                };
                let mut destination = match &call.called_attribute {
                    Some(attribute) => format!("{}.{}", base, attribute),
                    None => base.clone(),
                };
                if let Some(imported) = self.imported_names.get(&destination) {
                    destination = imported.clone();
                }
                if self.graph.contains(&destination) {
                    self.stats.calls_resolved += 1;
                } else {
                    self.stats.calls_unmatched += 1;
                }
                relationships.push(Relationship::calls(destination, call.clone()));
            }
            self.graph[id].relationships.extend(relationships);
        }
    }
}
