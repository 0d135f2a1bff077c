//! Language Adapter Framework
//!
//! A front end turns a module's source text into syntax events using a
//! Tree-sitter grammar. Python is the only built-in language.

pub mod framework;
pub mod python;

pub use framework::LanguageAdapter;
pub use python::PythonAdapter;

/// Create the built-in adapter
pub fn default_adapter() -> Box<dyn LanguageAdapter> {
    Box::new(PythonAdapter::new())
}
