//! Core adapter framework
//!
//! Defines the trait a front end implements to feed the object graph
//! builder. The resolver never sees language-specific syntax.

use crate::Result;
use crate::syntax::SyntaxElement;
use std::path::Path;

/// Trait for language front ends
///
/// Each adapter is responsible for:
/// 1. Identifying the files it can parse
/// 2. Reducing a module's source text to basic syntax events
/// 3. Reporting syntax errors so the module can be skipped
pub trait LanguageAdapter: Send + Sync {
    /// Get the language name (for display)
    fn language_name(&self) -> &str;

    /// Get the source file extension, without the dot
    fn file_extension(&self) -> &str;

    /// File names that are never treated as modules
    fn excluded_file_names(&self) -> &[&str] {
        &[]
    }

    /// Check if a file is a module of this language
    fn is_eligible(&self, path: &Path) -> bool {
        let has_extension =
            path.extension().and_then(|e| e.to_str()) == Some(self.file_extension());
        let excluded = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.excluded_file_names().contains(&name));
        has_extension && !excluded
    }

    /// Parse a module's content into syntax events
    fn parse_module(&self, content: &str, module_full_name: &str) -> Result<Vec<SyntaxElement>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAdapter;

    impl LanguageAdapter for TestAdapter {
        fn language_name(&self) -> &str {
            "test"
        }

        fn file_extension(&self) -> &str {
            "test"
        }

        fn excluded_file_names(&self) -> &[&str] {
            &["build.test"]
        }

        fn parse_module(&self, _content: &str, _name: &str) -> Result<Vec<SyntaxElement>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_is_eligible() {
        let adapter = TestAdapter;
        assert!(adapter.is_eligible(Path::new("pkg/foo.test")));
        assert!(!adapter.is_eligible(Path::new("pkg/foo.other")));
        assert!(!adapter.is_eligible(Path::new("pkg/build.test")));
        assert!(!adapter.is_eligible(Path::new("pkg/Makefile")));
    }
}
