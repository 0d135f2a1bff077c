//! Objects with context - the nodes of the code graph
//!
//! Every package, module, class, function and constant of a project becomes
//! an `ObjectWithContext`. Besides its names it carries:
//! - the test classification inherited from its package
//! - its scope map (bare identifier → full name)
//! - the relationships discovered so far (edges starting at this object)
//! - deferred imports and calls awaiting resolution
//! - handles of the objects it owns
//!
//! Relationships reference their destination by full name only, so objects
//! never hold references to each other.

use crate::config::Settings;
use crate::naming::{self, TestClassification};
use crate::syntax::{CallElement, DefinitionKind, ImportElement, ImportOrigin};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Name of a package's index module.
pub const INDEX_MODULE_NAME: &str = "__init__";

/// Handle of an object inside an [`ObjectGraph`](crate::graph::ObjectGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Package,
    Module,
    Class,
    Function,
    Constant,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Package => "package",
            ObjectKind::Module => "module",
            ObjectKind::Class => "class",
            ObjectKind::Function => "function",
            ObjectKind::Constant => "constant",
        }
    }

    /// Packages and modules, which are created from the file system.
    pub fn is_container(&self) -> bool {
        matches!(self, ObjectKind::Package | ObjectKind::Module)
    }
}

impl From<DefinitionKind> for ObjectKind {
    fn from(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Class => ObjectKind::Class,
            DefinitionKind::Function => ObjectKind::Function,
            DefinitionKind::Constant => ObjectKind::Constant,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge starting at the object that stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    /// Ownership of a contained object.
    Contains { destination: String },
    /// A resolved call site.
    Calls {
        destination: String,
        call: CallElement,
    },
    /// A resolved import.
    ResolvedImport {
        destination: String,
        import: ImportElement,
    },
}

impl Relationship {
    pub fn contains(destination: impl Into<String>) -> Self {
        Self::Contains {
            destination: destination.into(),
        }
    }

    pub fn calls(destination: impl Into<String>, call: CallElement) -> Self {
        Self::Calls {
            destination: destination.into(),
            call,
        }
    }

    pub fn resolved_import(destination: impl Into<String>, import: ImportElement) -> Self {
        Self::ResolvedImport {
            destination: destination.into(),
            import,
        }
    }

    /// Full name of the destination object
    pub fn destination(&self) -> &str {
        match self {
            Relationship::Contains { destination }
            | Relationship::Calls { destination, .. }
            | Relationship::ResolvedImport { destination, .. } => destination,
        }
    }

    /// Edge label used by the export adapter
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::Contains { .. } => "contains",
            Relationship::Calls { .. } => "calls",
            Relationship::ResolvedImport { .. } => "imports",
        }
    }

    /// Edge properties used by the export adapter
    pub fn properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        match self {
            Relationship::Contains { .. } => {}
            Relationship::Calls { call, .. } => {
                props.insert("reference_name".into(), call.reference_name.clone().into());
                props.insert(
                    "called_attribute".into(),
                    call.called_attribute.clone().unwrap_or_default().into(),
                );
            }
            Relationship::ResolvedImport { import, .. } => {
                props.insert("name".into(), import.name.clone().into());
                props.insert(
                    "as_name".into(),
                    import.as_name.clone().unwrap_or_default().into(),
                );
                props.insert("reference_type".into(), import.reference_type().as_str().into());
                if let ImportOrigin::From { from_text, level } = &import.origin {
                    props.insert("from".into(), from_text.clone().unwrap_or_default().into());
                    props.insert("level".into(), (*level).into());
                }
            }
        }
        props
    }
}

/// A named object of the project enriched with its context.
#[derive(Debug, Clone)]
pub struct ObjectWithContext {
    pub kind: ObjectKind,
    /// Local name. For packages this is the dotted package path.
    pub name: String,
    /// Globally unique dotted name.
    pub full_name: String,
    pub owner: Option<ObjectId>,
    pub names_in_scope: HashMap<String, String>,
    pub is_test_object: bool,
    pub test_type: Option<String>,
    pub relationships: Vec<Relationship>,
    pub unresolved_imports: Vec<ImportElement>,
    pub calls: Vec<CallElement>,
    pub contained_objects: Vec<ObjectId>,
}

impl ObjectWithContext {
    /// Create an object that has not been attached to an owner yet.
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            full_name: name.clone(),
            name,
            owner: None,
            names_in_scope: HashMap::new(),
            is_test_object: false,
            test_type: None,
            relationships: Vec::new(),
            unresolved_imports: Vec::new(),
            calls: Vec::new(),
            contained_objects: Vec::new(),
        }
    }

    /// Create a top-level package, classified by the tokens of its name.
    pub fn package(full_name: impl Into<String>, settings: &Settings) -> Self {
        let mut package = Self::new(ObjectKind::Package, full_name);
        let classification =
            TestClassification::for_package(&package.full_name, settings.determine_test_types);
        package.is_test_object = classification.is_test_object;
        package.test_type = classification.test_type;
        package
    }

    /// Derive the full name and classification from the owner.
    ///
    /// Classes additionally bind `self` and `class` to themselves.
    pub fn initialize(&mut self, owner_id: ObjectId, owner: &ObjectWithContext) {
        self.owner = Some(owner_id);
        self.full_name = format!("{}.{}", owner.full_name, self.name);
        self.is_test_object = owner.is_test_object;
        self.test_type = owner.test_type.clone();
        if self.kind == ObjectKind::Class {
            self.bind_class_names();
        }
    }

    /// Turn a redefined name into a class or function (`API = None` followed
    /// by `class API:`). The last block definition decides the kind.
    pub fn redefine_as(&mut self, kind: ObjectKind) {
        if self.kind == kind || !matches!(kind, ObjectKind::Class | ObjectKind::Function) {
            return;
        }
        tracing::debug!("{} redefined as {}", self.full_name, kind);
        self.kind = kind;
        if kind == ObjectKind::Class {
            self.bind_class_names();
        }
    }

    fn bind_class_names(&mut self) {
        for name in ["self", "class"] {
            self.names_in_scope
                .insert(name.to_string(), self.full_name.clone());
        }
    }

    /// Whether this is a package's index module (`__init__`).
    pub fn is_index_module(&self) -> bool {
        self.kind == ObjectKind::Module && self.name == INDEX_MODULE_NAME
    }

    /// The name other modules use to reach this module's exported names.
    ///
    /// An index module exports under its package's name.
    pub fn export_name(&self) -> &str {
        if self.is_index_module() {
            self.full_name
                .strip_suffix(&format!(".{}", INDEX_MODULE_NAME))
                .unwrap_or(&self.full_name)
        } else {
            &self.full_name
        }
    }

    /// Node label used by the export adapter
    pub fn label(&self) -> &'static str {
        match (self.kind, self.is_test_object) {
            (ObjectKind::Module, _) if self.is_index_module() => "init",
            (ObjectKind::Package, false) => "package",
            (ObjectKind::Package, true) => "test_package",
            (ObjectKind::Module, false) => "module",
            (ObjectKind::Module, true) => "test_module",
            (ObjectKind::Class, false) => "class",
            (ObjectKind::Class, true) => "test_class",
            (ObjectKind::Function, false) => "function",
            (ObjectKind::Function, true) if naming::is_test_function_name(&self.name) => {
                "test_function"
            }
            (ObjectKind::Function, true) => "test_helper_function",
            (ObjectKind::Constant, false) => "constant",
            (ObjectKind::Constant, true) => "test_constant",
        }
    }

    /// Node properties used by the export adapter
    pub fn node_properties(&self, settings: &Settings) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("name".into(), self.name.clone().into());
        props.insert("full_name".into(), self.full_name.clone().into());
        props.insert("is_test_object".into(), self.is_test_object.into());
        if self.is_test_object && settings.determine_test_types {
            props.insert(
                "test_type".into(),
                self.test_type.clone().unwrap_or_default().into(),
            );
        }
        props
    }
}
