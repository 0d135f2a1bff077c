//! Python language adapter
//!
//! Reduces Python source files to syntax events using tree-sitter.
//!
//! Module and class bodies keep their structure: functions and classes
//! defined there become definitions. Function bodies are flattened, so
//! everything below a function (parameter defaults and annotations, body,
//! nested functions) is attributed to the function itself.

use super::framework::LanguageAdapter;
use crate::syntax::{CallElement, SyntaxElement};
use crate::{Error, Result};
use tree_sitter::{Node, Parser};

/// Node kinds that pass an assignment or deletion context on to their
/// children (`a, (b, *c) = ...`).
const TARGET_CONTAINERS: &[&str] = &[
    "pattern_list",
    "tuple_pattern",
    "list_pattern",
    "list_splat_pattern",
    "expression_list",
    "tuple",
    "list",
    "parenthesized_expression",
    "as_pattern_target",
];

/// Python language adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAdapter;

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self
    }

    fn parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Adapter(format!("Failed to load Python grammar: {}", e)))?;
        Ok(parser)
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language_name(&self) -> &str {
        "python"
    }

    fn file_extension(&self) -> &str {
        "py"
    }

    fn excluded_file_names(&self) -> &[&str] {
        &["setup.py"]
    }

    fn parse_module(&self, content: &str, module_full_name: &str) -> Result<Vec<SyntaxElement>> {
        let mut parser = self.parser()?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| Error::Adapter(format!("No syntax tree for {}", module_full_name)))?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error(root).unwrap_or(root).start_position();
            return Err(Error::Syntax {
                module: module_full_name.to_string(),
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        Ok(EventWalker::new(content.as_bytes(), false).walk([root]))
    }
}

/// First ERROR or MISSING node in pre-order
fn first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

/// Whether an assigned name counts as a constant (`ANSWER`, `MAX_SIZE_2`)
pub fn is_constant_like(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && name == name.to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Load,
    Store,
    Delete,
}

/// Pre-order walk producing syntax events.
struct EventWalker<'s> {
    source: &'s [u8],
    in_function: bool,
}

impl<'s> EventWalker<'s> {
    fn new(source: &'s [u8], in_function: bool) -> Self {
        Self {
            source,
            in_function,
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    /// Dotted name without any whitespace between its segments
    fn dotted(&self, node: Node) -> String {
        self.text(node).split_whitespace().collect()
    }

    fn walk<'t>(&self, roots: impl IntoIterator<Item = Node<'t>>) -> Vec<SyntaxElement> {
        let mut events = Vec::new();
        let mut stack: Vec<(Node<'t>, Context)> =
            roots.into_iter().map(|node| (node, Context::Load)).collect();
        stack.reverse();

        while let Some((node, context)) = stack.pop() {
            let next = self.visit(node, context, &mut events);
            stack.extend(next.into_iter().rev());
        }
        events
    }

    /// Handle one node, returning the children to visit in source order.
    fn visit<'t>(
        &self,
        node: Node<'t>,
        context: Context,
        events: &mut Vec<SyntaxElement>,
    ) -> Vec<(Node<'t>, Context)> {
        match node.kind() {
            "comment" | "global_statement" | "nonlocal_statement" | "future_import_statement" => {
                Vec::new()
            }
            "import_statement" | "import_from_statement" => {
                events.extend(self.imports(node));
                Vec::new()
            }
            "function_definition" if self.in_function => {
                fields(node, &["parameters", "return_type", "body"], Context::Load)
            }
            "function_definition" => {
                events.extend(self.function(node));
                Vec::new()
            }
            "class_definition" => {
                if let Some(bases) = node.child_by_field_name("superclasses") {
                    events.extend(self.walk([bases]));
                }
                events.extend(self.class(node));
                Vec::new()
            }
            "identifier" | "keyword_identifier" => {
                let name = self.text(node);
                match context {
                    Context::Load => events.push(SyntaxElement::call(name)),
                    Context::Store if is_constant_like(name) => {
                        events.push(SyntaxElement::constant(name))
                    }
                    _ => {}
                }
                Vec::new()
            }
            "attribute" => {
                if context == Context::Load {
                    if let Some(call) = self.attribute_reference(node) {
                        events.push(SyntaxElement::Call(call));
                    }
                }
                fields(node, &["object"], Context::Load)
            }
            "assignment" => {
                let mut next = Vec::new();
                if node.child_by_field_name("right").is_some() {
                    next.extend(fields(node, &["left"], Context::Store));
                }
                next.extend(fields(node, &["type", "right"], Context::Load));
                next
            }
            "parameters" | "lambda_parameters" => self.parameter_defaults(node),
            "keyword_argument" => fields(node, &["value"], Context::Load),
            "delete_statement" => named_children(node)
                .into_iter()
                .map(|child| (child, Context::Delete))
                .collect(),
            _ => self.children_in_context(node, context),
        }
    }

    fn children_in_context<'t>(&self, node: Node<'t>, context: Context) -> Vec<(Node<'t>, Context)> {
        let parent = node.kind();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return children;
        }
        loop {
            let child = cursor.node();
            if child.is_named() {
                let child_context = match (parent, cursor.field_name()) {
                    ("augmented_assignment" | "for_statement" | "for_in_clause", Some("left")) => {
                        Context::Store
                    }
                    ("named_expression", Some("name")) => Context::Store,
                    ("as_pattern" | "except_clause", Some("alias")) => Context::Store,
                    _ if TARGET_CONTAINERS.contains(&parent) => context,
                    _ => Context::Load,
                };
                children.push((child, child_context));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        children
    }

    /// Defaults and annotations of a parameter list; names are skipped.
    fn parameter_defaults<'t>(&self, node: Node<'t>) -> Vec<(Node<'t>, Context)> {
        named_children(node)
            .into_iter()
            .flat_map(|parameter| match parameter.kind() {
                "default_parameter" => fields(parameter, &["value"], Context::Load),
                "typed_parameter" => fields(parameter, &["type"], Context::Load),
                "typed_default_parameter" => fields(parameter, &["type", "value"], Context::Load),
                _ => Vec::new(),
            })
            .collect()
    }

    fn function(&self, node: Node) -> Option<SyntaxElement> {
        let name = self.text(node.child_by_field_name("name")?);
        let parts = ["parameters", "return_type", "body"]
            .iter()
            .filter_map(|field| node.child_by_field_name(field));
        let body = EventWalker::new(self.source, true).walk(parts);
        Some(SyntaxElement::function(name, body))
    }

    fn class(&self, node: Node) -> Option<SyntaxElement> {
        let name = self.text(node.child_by_field_name("name")?);
        let body = EventWalker::new(self.source, false).walk(node.child_by_field_name("body"));
        Some(SyntaxElement::class(name, body))
    }

    /// `a.b.c`, `Example().do_stuff` -> reference to the chain's root name
    fn attribute_reference(&self, node: Node) -> Option<CallElement> {
        let mut attributes = Vec::new();
        let mut current = node;
        let root = loop {
            attributes.push(self.text(current.child_by_field_name("attribute")?));
            let object = current.child_by_field_name("object")?;
            match object.kind() {
                "attribute" => current = object,
                "identifier" => break object,
                "call" => {
                    let function = object.child_by_field_name("function")?;
                    if function.kind() != "identifier" {
                        return None;
                    }
                    break function;
                }
                _ => return None,
            }
        };
        attributes.reverse();
        Some(CallElement::with_attribute(
            self.text(root),
            attributes.join("."),
        ))
    }

    fn imports(&self, node: Node) -> Vec<SyntaxElement> {
        let mut cursor = node.walk();
        let names: Vec<(String, Option<String>)> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|name| self.imported_name(name))
            .collect();

        if node.kind() == "import_statement" {
            return names
                .into_iter()
                .map(|(name, alias)| SyntaxElement::import(name, alias.as_deref()))
                .collect();
        }

        let (from_text, level) = self.import_source(node);
        names
            .into_iter()
            .map(|(name, alias)| {
                SyntaxElement::import_from(from_text.as_deref(), name, alias.as_deref(), level)
            })
            .collect()
    }

    fn imported_name(&self, node: Node) -> Option<(String, Option<String>)> {
        match node.kind() {
            "dotted_name" => Some((self.dotted(node), None)),
            "aliased_import" => {
                let name = self.dotted(node.child_by_field_name("name")?);
                let alias = node
                    .child_by_field_name("alias")
                    .map(|alias| self.text(alias).to_string());
                Some((name, alias))
            }
            _ => None,
        }
    }

    /// Module text and level of a `from ... import` statement
    fn import_source(&self, node: Node) -> (Option<String>, usize) {
        match node.child_by_field_name("module_name") {
            Some(module) if module.kind() == "relative_import" => {
                let mut from_text = None;
                let mut level = 0;
                for child in named_children(module) {
                    match child.kind() {
                        "import_prefix" => {
                            level = self.text(child).chars().filter(|&c| c == '.').count()
                        }
                        "dotted_name" => from_text = Some(self.dotted(child)),
                        _ => {}
                    }
                }
                (from_text, level)
            }
            Some(module) => (Some(self.dotted(module)), 0),
            None => (None, 0),
        }
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn fields<'t>(node: Node<'t>, names: &[&str], context: Context) -> Vec<(Node<'t>, Context)> {
    names
        .iter()
        .filter_map(|name| node.child_by_field_name(name))
        .map(|child| (child, context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Definition;

    fn parse(source: &str) -> Vec<SyntaxElement> {
        PythonAdapter::new()
            .parse_module(source, "module_name")
            .unwrap()
    }

    fn function_body(source: &str) -> Vec<SyntaxElement> {
        let mut result = parse(source);
        assert_eq!(result.len(), 1);
        match result.remove(0) {
            SyntaxElement::Definition(Definition::Function { body, .. }) => body,
            other => panic!("expected a function, got {:?}", other),
        }
    }

    #[test]
    fn test_eligible_files() {
        let adapter = PythonAdapter::new();
        assert!(adapter.is_eligible(std::path::Path::new("pkg/logic.py")));
        assert!(!adapter.is_eligible(std::path::Path::new("setup.py")));
        assert!(!adapter.is_eligible(std::path::Path::new("README.md")));
    }

    #[test]
    fn test_constant_at_module_level() {
        assert_eq!(parse("ANSWER = 42\n"), vec![SyntaxElement::constant("ANSWER")]);
        assert_eq!(parse("answer = 42\n"), vec![]);
        assert_eq!(parse("_ = 42\n"), vec![]);
    }

    #[test]
    fn test_chained_and_annotated_constants() {
        assert_eq!(
            parse("A = B = 1\n"),
            vec![SyntaxElement::constant("A"), SyntaxElement::constant("B")]
        );
        assert_eq!(
            parse("LIMIT: int = 3\n"),
            vec![SyntaxElement::constant("LIMIT"), SyntaxElement::call("int")]
        );
        assert_eq!(parse("LIMIT: int\n"), vec![SyntaxElement::call("int")]);
    }

    #[test]
    fn test_call_directly_in_a_module() {
        assert_eq!(parse("dumbo()\n"), vec![SyntaxElement::call("dumbo")]);
    }

    #[test]
    fn test_nested_call_in_a_function() {
        let body = function_body("def dummy_func():\n    dumbo(other())\n");
        assert_eq!(body, vec![SyntaxElement::call("dumbo"), SyntaxElement::call("other")]);
    }

    #[test]
    fn test_call_with_attribute() {
        let body = function_body("def dummy_func():\n    obj.dummy()\n");
        assert_eq!(
            body,
            vec![
                SyntaxElement::attribute_call("obj", "dummy"),
                SyntaxElement::call("obj"),
            ]
        );
    }

    #[test]
    fn test_attribute_chain() {
        let body = function_body("def other():\n    package.logic.do_stuff()\n");
        assert_eq!(
            body,
            vec![
                SyntaxElement::attribute_call("package", "logic.do_stuff"),
                SyntaxElement::attribute_call("package", "logic"),
                SyntaxElement::call("package"),
            ]
        );
    }

    #[test]
    fn test_attribute_of_call_result() {
        let body = function_body("def other():\n    Example().do_stuff()\n");
        assert_eq!(
            body,
            vec![
                SyntaxElement::attribute_call("Example", "do_stuff"),
                SyntaxElement::call("Example"),
            ]
        );
    }

    #[test]
    fn test_assigning_value_to_an_attribute() {
        let body = function_body("def dummy_func():\n    obj.dummy = 42\n");
        assert_eq!(body, vec![SyntaxElement::call("obj")]);
    }

    #[test]
    fn test_parameters_and_keywords_are_not_references() {
        let body = function_body(
            "def run(self, nr: int = DEFAULT, *args, **kwargs) -> Result:\n    return build(size=nr)\n",
        );
        assert_eq!(
            body,
            vec![
                SyntaxElement::call("int"),
                SyntaxElement::call("DEFAULT"),
                SyntaxElement::call("Result"),
                SyntaxElement::call("build"),
                SyntaxElement::call("nr"),
            ]
        );
    }

    #[test]
    fn test_store_targets_in_function() {
        let body = function_body(
            "def run():\n    RESULT = 1\n    for ITEM, other in pairs():\n        del ITEM\n    global G\n",
        );
        assert_eq!(
            body,
            vec![
                SyntaxElement::constant("RESULT"),
                SyntaxElement::constant("ITEM"),
                SyntaxElement::call("pairs"),
            ]
        );
    }

    #[test]
    fn test_nested_function_is_flattened() {
        let body = function_body(
            "def outer():\n    def inner(x=DEFAULT):\n        helper()\n    return inner\n",
        );
        assert_eq!(
            body,
            vec![
                SyntaxElement::call("DEFAULT"),
                SyntaxElement::call("helper"),
                SyntaxElement::call("inner"),
            ]
        );
    }

    #[test]
    fn test_class_with_method() {
        let result = parse(
            "class Example(Base):\n    LIMIT = 3\n\n    async def do_stuff(self):\n        self.other()\n",
        );
        assert_eq!(
            result,
            vec![
                SyntaxElement::call("Base"),
                SyntaxElement::class(
                    "Example",
                    vec![
                        SyntaxElement::constant("LIMIT"),
                        SyntaxElement::function(
                            "do_stuff",
                            vec![
                                SyntaxElement::attribute_call("self", "other"),
                                SyntaxElement::call("self"),
                            ]
                        ),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_class_inside_function() {
        let body = function_body("def factory():\n    class Local:\n        def run(self):\n            pass\n    return Local\n");
        assert_eq!(
            body,
            vec![
                SyntaxElement::class("Local", vec![SyntaxElement::function("run", vec![])]),
                SyntaxElement::call("Local"),
            ]
        );
    }

    #[test]
    fn test_decorated_function() {
        assert_eq!(
            parse("@decorator\ndef f():\n    pass\n"),
            vec![SyntaxElement::call("decorator"), SyntaxElement::function("f", vec![])]
        );
    }

    #[test]
    fn test_import() {
        assert_eq!(
            parse("import package.logic as lg, os\n"),
            vec![
                SyntaxElement::import("package.logic", Some("lg")),
                SyntaxElement::import("os", None),
            ]
        );
    }

    #[test]
    fn test_import_from() {
        assert_eq!(
            parse("from package.logic import do_stuff as alias, other\n"),
            vec![
                SyntaxElement::import_from(Some("package.logic"), "do_stuff", Some("alias"), 0),
                SyntaxElement::import_from(Some("package.logic"), "other", None, 0),
            ]
        );
    }

    #[test]
    fn test_relative_import_from() {
        assert_eq!(
            parse("from . import sibling\nfrom ..pkg.sub import thing\n"),
            vec![
                SyntaxElement::import_from(None, "sibling", None, 1),
                SyntaxElement::import_from(Some("pkg.sub"), "thing", None, 2),
            ]
        );
    }

    #[test]
    fn test_future_and_wildcard_imports_are_skipped() {
        assert_eq!(parse("from __future__ import annotations\nfrom os import *\n"), vec![]);
    }

    #[test]
    fn test_import_in_function_is_deferred_on_function() {
        let body = function_body("def run():\n    import os\n    os.getcwd()\n");
        assert_eq!(
            body,
            vec![
                SyntaxElement::import("os", None),
                SyntaxElement::attribute_call("os", "getcwd"),
                SyntaxElement::call("os"),
            ]
        );
    }

    #[test]
    fn test_syntax_error() {
        let result = PythonAdapter::new().parse_module("def broken(:\n    pass\n", "pkg.broken");
        match result {
            Err(Error::Syntax { module, line, .. }) => {
                assert_eq!(module, "pkg.broken");
                assert_eq!(line, 1);
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_like() {
        assert!(is_constant_like("ANSWER"));
        assert!(is_constant_like("MAX_SIZE_2"));
        assert!(!is_constant_like("Answer"));
        assert!(!is_constant_like("__all__"));
        assert!(!is_constant_like("_"));
    }
}
