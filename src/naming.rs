//! Name analysis - tokenizing dotted names and classifying test code
//!
//! A package is test code when one of the lexical tokens of its full name is
//! a test marker (`test`, `tests`). Tokens come from splitting the name on
//! separator characters (`.`, `_`, `-`, ...) and splitting camel-case words,
//! so `pkg.sample_pkg.PycoThing` yields `pkg, sample, pkg, pyco, thing`.

/// Tokens marking a package as test code.
pub const TEST_MARKERS: &[&str] = &["test", "tests"];

/// Prefix distinguishing test functions from test helpers.
pub const TEST_FUNCTION_PREFIX: &str = "test_";

/// Split a single name into lowercase tokens.
///
/// Snake case, kebab case and camel case are supported, also mixed:
/// `sample_pkgThing` yields `sample, pkg, thing`.
pub fn name_parts(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .flat_map(split_camel_case)
        .collect()
}

/// Split all segments of a dotted full name into lowercase tokens.
pub fn full_name_parts(full_name: &str) -> Vec<String> {
    full_name.split('.').flat_map(name_parts).collect()
}

/// Split a camel-case word into lowercase parts.
///
/// A new part starts at an uppercase letter following a lowercase letter or
/// digit, and at the last uppercase letter of an acronym followed by a
/// lowercase letter (`HTTPServer` yields `http, server`).
pub fn split_camel_case(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Test classification of a package, inherited by everything it owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestClassification {
    pub is_test_object: bool,
    pub test_type: Option<String>,
}

impl TestClassification {
    /// Classify a package by the tokens of its full name.
    ///
    /// With `determine_test_types`, a test package whose name has more than
    /// one token records its second token as test type (`tests.unit.cli`
    /// has test type `unit`).
    pub fn for_package(full_name: &str, determine_test_types: bool) -> Self {
        let parts = full_name_parts(full_name);
        let is_test_object = parts
            .iter()
            .any(|part| TEST_MARKERS.contains(&part.as_str()));
        let test_type = if determine_test_types && is_test_object && parts.len() > 1 {
            Some(parts[1].clone())
        } else {
            None
        };
        Self {
            is_test_object,
            test_type,
        }
    }
}

/// Whether a function name marks an actual test rather than a helper.
pub fn is_test_function_name(name: &str) -> bool {
    name.starts_with(TEST_FUNCTION_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_parts() {
        let parts = full_name_parts("pkg.sample_pkg.dummy.PycoThing");
        assert_eq!(parts, vec!["pkg", "sample", "pkg", "dummy", "pyco", "thing"]);
    }

    #[test]
    fn test_split_camel_case_acronym() {
        assert_eq!(split_camel_case("HTTPServer"), vec!["http", "server"]);
        assert_eq!(split_camel_case("pycoThing"), vec!["pyco", "thing"]);
        assert_eq!(split_camel_case("v2Api"), vec!["v2", "api"]);
        assert_eq!(split_camel_case("CONSTANT"), vec!["constant"]);
    }

    #[test]
    fn test_production_package() {
        let classification = TestClassification::for_package("example", true);
        assert!(!classification.is_test_object);
        assert_eq!(classification.test_type, None);
    }

    #[test]
    fn test_unit_test_package_without_test_types() {
        let classification = TestClassification::for_package("tests.unit.cli", false);
        assert!(classification.is_test_object);
        assert_eq!(classification.test_type, None);
    }

    #[test]
    fn test_unit_test_package_with_test_types() {
        let classification = TestClassification::for_package("tests.unit.cli", true);
        assert!(classification.is_test_object);
        assert_eq!(classification.test_type.as_deref(), Some("unit"));

        let classification = TestClassification::for_package("tests.unit", true);
        assert_eq!(classification.test_type.as_deref(), Some("unit"));
    }

    #[test]
    fn test_main_test_package_has_no_type() {
        let classification = TestClassification::for_package("tests", true);
        assert!(classification.is_test_object);
        assert_eq!(classification.test_type, None);
    }

    #[test]
    fn test_marker_inside_camel_case() {
        assert!(TestClassification::for_package("app.IntegrationTests", false).is_test_object);
        assert!(!TestClassification::for_package("app.contest", false).is_test_object);
    }

    #[test]
    fn test_function_prefix() {
        assert!(is_test_function_name("test_load"));
        assert!(!is_test_function_name("load_fixture"));
    }
}
