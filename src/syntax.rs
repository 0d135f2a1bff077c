//! Syntax events - the front end's output
//!
//! A front end reduces a module's source text to a sequence of basic syntax
//! events. They carry no context: full names, scopes and relationships are
//! computed later by the builder and the project resolver.
//!
//! Three kinds of events exist:
//! - `Definition`: a class, function or constant with a name
//! - `Call`: a reference to a name, optionally followed by attribute accesses
//! - `Import`: an `import x` or `from y import x` statement, one per name

use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic syntax event emitted by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Definition(Definition),
    Call(CallElement),
    Import(ImportElement),
}

impl SyntaxElement {
    pub fn class(name: impl Into<String>, body: Vec<SyntaxElement>) -> Self {
        Self::Definition(Definition::Class { name: name.into(), body })
    }

    pub fn function(name: impl Into<String>, body: Vec<SyntaxElement>) -> Self {
        Self::Definition(Definition::Function { name: name.into(), body })
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Self::Definition(Definition::Constant { name: name.into() })
    }

    pub fn call(reference_name: impl Into<String>) -> Self {
        Self::Call(CallElement::new(reference_name))
    }

    pub fn attribute_call(reference_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Call(CallElement::with_attribute(reference_name, attribute))
    }

    pub fn import(name: impl Into<String>, as_name: Option<&str>) -> Self {
        Self::Import(ImportElement::import(name, as_name))
    }

    pub fn import_from(
        from_text: Option<&str>,
        name: impl Into<String>,
        as_name: Option<&str>,
        level: usize,
    ) -> Self {
        Self::Import(ImportElement::import_from(from_text, name, as_name, level))
    }
}

/// A named definition.
///
/// Classes and functions are blocks: they carry the ordered events found in
/// their body. Constants carry nothing but their name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Class { name: String, body: Vec<SyntaxElement> },
    Function { name: String, body: Vec<SyntaxElement> },
    Constant { name: String },
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Class { name, .. }
            | Definition::Function { name, .. }
            | Definition::Constant { name } => name,
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        match self {
            Definition::Class { .. } => DefinitionKind::Class,
            Definition::Function { .. } => DefinitionKind::Function,
            Definition::Constant { .. } => DefinitionKind::Constant,
        }
    }

    /// Body of a block definition; empty for constants.
    pub fn body(&self) -> &[SyntaxElement] {
        match self {
            Definition::Class { body, .. } | Definition::Function { body, .. } => body,
            Definition::Constant { .. } => &[],
        }
    }

    /// Split the definition into its name and (possibly empty) body.
    pub fn into_parts(self) -> (DefinitionKind, String, Vec<SyntaxElement>) {
        match self {
            Definition::Class { name, body } => (DefinitionKind::Class, name, body),
            Definition::Function { name, body } => (DefinitionKind::Function, name, body),
            Definition::Constant { name } => (DefinitionKind::Constant, name, Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Class,
    Function,
    Constant,
}

impl DefinitionKind {
    /// Block kinds may contain further syntax events.
    pub fn is_block(&self) -> bool {
        matches!(self, DefinitionKind::Class | DefinitionKind::Function)
    }
}

/// A reference to a name, e.g. `do_stuff`, `self.other` or `pkg.sub.fn`.
///
/// `called_attribute` holds the dotted attribute chain following the
/// referenced name, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallElement {
    pub reference_name: String,
    pub called_attribute: Option<String>,
}

impl CallElement {
    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            called_attribute: None,
        }
    }

    pub fn with_attribute(reference_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            called_attribute: Some(attribute.into()),
        }
    }
}

impl fmt::Display for CallElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.called_attribute {
            Some(attribute) => write!(f, "{}.{}", self.reference_name, attribute),
            None => write!(f, "{}", self.reference_name),
        }
    }
}

/// How an import computes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// Computed from the project root (`level == 0`).
    Absolute,
    /// Computed from the importer's own location by stripping `level` segments.
    Relative,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Absolute => "absolute",
            ReferenceType::Relative => "relative",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an imported name comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportOrigin {
    /// `import name [as as_name]`
    Plain,
    /// `from [.]*from_text import name [as as_name]`
    From {
        from_text: Option<String>,
        level: usize,
    },
}

/// One imported name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportElement {
    pub name: String,
    pub as_name: Option<String>,
    pub origin: ImportOrigin,
}

impl ImportElement {
    pub fn import(name: impl Into<String>, as_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            as_name: as_name.map(str::to_string),
            origin: ImportOrigin::Plain,
        }
    }

    pub fn import_from(
        from_text: Option<&str>,
        name: impl Into<String>,
        as_name: Option<&str>,
        level: usize,
    ) -> Self {
        Self {
            name: name.into(),
            as_name: as_name.map(str::to_string),
            origin: ImportOrigin::From {
                from_text: from_text.map(str::to_string),
                level,
            },
        }
    }

    /// The name bound in the importer's scope.
    pub fn name_in_importer(&self) -> &str {
        self.as_name.as_deref().unwrap_or(&self.name)
    }

    /// The dotted name being imported, before any relative path arithmetic.
    pub fn target_name(&self) -> String {
        match &self.origin {
            ImportOrigin::From {
                from_text: Some(from_text),
                ..
            } => format!("{}.{}", from_text, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn level(&self) -> usize {
        match self.origin {
            ImportOrigin::Plain => 0,
            ImportOrigin::From { level, .. } => level,
        }
    }

    pub fn reference_type(&self) -> ReferenceType {
        if self.level() == 0 {
            ReferenceType::Absolute
        } else {
            ReferenceType::Relative
        }
    }
}

impl fmt::Display for ImportElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            ImportOrigin::Plain => write!(f, "import {}", self.name)?,
            ImportOrigin::From { from_text, level } => write!(
                f,
                "from {}{} import {}",
                ".".repeat(*level),
                from_text.as_deref().unwrap_or(""),
                self.name
            )?,
        }
        if let Some(as_name) = &self.as_name {
            write!(f, " as {}", as_name)?;
        }
        Ok(())
    }
}
