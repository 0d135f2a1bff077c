//! Project Resolver - the pipeline from a directory to a resolved graph
//!
//! 1. Discovery: packages and modules from the directory tree
//! 2. Content parsing: syntax events per module, in parallel
//! 3. Import resolution, scope propagation and call resolution

pub mod discovery;
pub mod resolver;

pub use resolver::ResolutionStats;

use crate::adapter::{self, LanguageAdapter};
use crate::config::Settings;
use crate::graph::ObjectGraph;
use crate::object::{ObjectId, ObjectKind, ObjectWithContext};
use crate::syntax::SyntaxElement;
use crate::{Error, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Where a module's content comes from.
#[derive(Debug, Clone)]
pub enum ModuleSource {
    File(PathBuf),
    Inline(String),
}

impl ModuleSource {
    fn read(&self) -> Result<String> {
        match self {
            ModuleSource::File(path) => Ok(std::fs::read_to_string(path)?),
            ModuleSource::Inline(content) => Ok(content.clone()),
        }
    }
}

#[derive(Debug)]
struct ModuleEntry {
    id: ObjectId,
    source: ModuleSource,
}

/// The finished object graph, handed to the export adapter.
#[derive(Debug)]
pub struct ParseResult {
    pub graph: ObjectGraph,
    pub settings: Settings,
    pub stats: ResolutionStats,
}

impl ParseResult {
    /// Find an object by its full name
    pub fn find(&self, full_name: &str) -> Option<&ObjectWithContext> {
        self.graph.find(full_name)
    }

    /// Objects in discovery order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectWithContext> {
        self.graph.objects()
    }
}

/// A Python project being parsed.
pub struct Project {
    settings: Settings,
    adapter: Box<dyn LanguageAdapter>,
    graph: ObjectGraph,
    modules: Vec<ModuleEntry>,
    /// `{module or package}.{imported name}` → resolved full name
    imported_names: HashMap<String, String>,
    stats: ResolutionStats,
}

impl Project {
    /// Create an empty project; packages and modules are added by hand.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            adapter: adapter::default_adapter(),
            graph: ObjectGraph::new(),
            modules: Vec::new(),
            imported_names: HashMap::new(),
            stats: ResolutionStats::default(),
        }
    }

    /// Create a project from a directory tree.
    ///
    /// Fails when `root` is not a directory or contains no module.
    pub fn from_directory(root: &Path, settings: Settings) -> Result<Self> {
        let mut project = Self::new(settings);
        project.discover(root)?;
        Ok(project)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Add a top-level package
    pub fn add_package(&mut self, full_name: &str) -> ObjectId {
        self.graph
            .insert_root(ObjectWithContext::package(full_name, &self.settings))
    }

    /// Add the package of the files directly in the project directory.
    ///
    /// Its name is the directory's own name, which is not part of any import
    /// path, so it is never classified as test code.
    pub fn add_root_package(&mut self, full_name: &str) -> ObjectId {
        self.graph
            .insert_root(ObjectWithContext::new(ObjectKind::Package, full_name))
    }

    /// Add a module to a package.
    ///
    /// `None` when the module's full name is taken by an object of another
    /// owner.
    pub fn add_module(&mut self, package: ObjectId, name: &str, source: ModuleSource) -> Option<ObjectId> {
        let id = self.graph.add_child(package, ObjectKind::Module, name)?;
        if self.modules.iter().any(|module| module.id == id) {
            tracing::warn!("Module {} added twice", self.graph[id].full_name);
        } else {
            self.modules.push(ModuleEntry { id, source });
        }
        Some(id)
    }

    /// Parse all modules and resolve their relationships
    pub fn parse(mut self) -> ParseResult {
        self.parse_module_contents();
        self.resolve_relationships();

        let stats = self.graph.stats();
        info!(
            "Parsed {} objects with {} relationships",
            stats.total_objects,
            stats.total_relationships()
        );
        ParseResult {
            graph: self.graph,
            settings: self.settings,
            stats: self.stats,
        }
    }

    /// Run the front end on every module and build the object tree.
    ///
    /// A module that cannot be read or parsed is skipped.
    fn parse_module_contents(&mut self) {
        let adapter = self.adapter.as_ref();
        let jobs: Vec<(String, &ModuleSource)> = self
            .modules
            .iter()
            .map(|module| (self.graph[module.id].full_name.clone(), &module.source))
            .collect();

        let parsed: Vec<Result<Vec<SyntaxElement>>> = jobs
            .par_iter()
            .map(|(full_name, source)| {
                let content = source.read()?;
                adapter.parse_module(&content, full_name)
            })
            .collect();

        let module_ids: Vec<ObjectId> = self.modules.iter().map(|module| module.id).collect();
        for (id, result) in module_ids.into_iter().zip(parsed) {
            let full_name = self.graph[id].full_name.clone();
            match result {
                Ok(elements) => {
                    self.graph.parse_syntax_elements(id, elements);
                    self.register_index_exports(id);
                    self.stats.modules_parsed += 1;
                }
                Err(Error::Syntax { line, column, .. }) => {
                    error!("Skipped module {} because of syntax error.", full_name);
                    tracing::debug!("Syntax error in {} at {}:{}", full_name, line, column);
                    self.stats.modules_skipped += 1;
                }
                Err(e) => {
                    error!("Skipped module {}: {}", full_name, e);
                    self.stats.modules_skipped += 1;
                }
            }
        }
    }

    /// Make the top-level definitions of an index module reachable under
    /// its package's name.
    fn register_index_exports(&mut self, module: ObjectId) {
        let index = &self.graph[module];
        if !index.is_index_module() {
            return;
        }
        let package_name = index.export_name().to_string();
        for &child in &index.contained_objects {
            let child = &self.graph[child];
            self.imported_names
                .entry(format!("{}.{}", package_name, child.name))
                .or_insert_with(|| child.full_name.clone());
        }
    }
}

/// Parse the project rooted at `root`
pub fn parse_project(root: &Path, settings: Settings) -> Result<ParseResult> {
    info!("Parsing project at {}", root.display());
    Ok(Project::from_directory(root, settings)?.parse())
}
