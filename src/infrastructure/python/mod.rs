//! Python path-context extraction backed by tree-sitter.
//!
//! Each `def` / `async def` in a module (methods and nested functions
//! included) is traversed on its own into an [`Arena`] and yields one
//! [`FunctionRecord`].

mod builder;
mod literal;
mod syntax;

use std::collections::VecDeque;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::domain::deadline::Deadline;
use crate::domain::error::ExtractError;
use crate::domain::path::{FunctionRecord, MergeLimits};
use crate::domain::tree::{Arena, ElementId, TreeDto};
use crate::ports::PathExtractor;

use builder::TreeBuilder;
use syntax::SyntaxKind;

/// Nesting depth at which a function is given up on.
pub const DEFAULT_RECURSION_LIMIT: usize = 500;

/// The tree and record of one function definition.
#[derive(Debug, Clone)]
pub struct ExtractedFunction {
    pub record: FunctionRecord,
    pub arena: Arena,
    pub root: ElementId,
}

impl ExtractedFunction {
    pub fn tree(&self) -> TreeDto {
        self.arena.to_dto(self.root)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PythonExtractor {
    limits: MergeLimits,
    recursion_limit: usize,
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new(MergeLimits::default())
    }
}

impl PythonExtractor {
    pub fn new(limits: MergeLimits) -> Self {
        Self {
            limits,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn limits(&self) -> MergeLimits {
        self.limits
    }

    /// Parse `source` and extract every function definition, breadth-first.
    pub fn extract_source(
        &self,
        source: &str,
        deadline: &Deadline,
    ) -> Result<Vec<ExtractedFunction>, ExtractError> {
        if source.contains('\0') {
            return Err(ExtractError::Value(
                "source code string cannot contain null bytes".to_string(),
            ));
        }

        let tree = parse(source, deadline)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root).map_or(
                ExtractError::Syntax { line: 1, column: 1 },
                syntax_error,
            ));
        }

        let bytes = source.as_bytes();
        collect_functions(root, bytes)?
            .into_iter()
            .map(|function| {
                deadline.check()?;
                TreeBuilder::build(function, bytes, self.limits, deadline, self.recursion_limit)
            })
            .collect()
    }

    pub fn extract_file(
        &self,
        path: &Path,
        deadline: &Deadline,
    ) -> Result<Vec<ExtractedFunction>, ExtractError> {
        let source = read_source(path)?;
        let functions = self.extract_source(&source, deadline)?;
        tracing::trace!(file = %path.display(), functions = functions.len(), "extracted");
        Ok(functions)
    }

    /// Encoded output lines for `path`, one per function, unmasked.
    pub fn extract_lines(&self, path: &Path, deadline: &Deadline) -> Result<Vec<String>, ExtractError> {
        Ok(self
            .extract_file(path, deadline)?
            .iter()
            .map(|function| function.record.to_line())
            .collect())
    }

    pub fn extract_trees(&self, path: &Path) -> Result<Vec<TreeDto>, ExtractError> {
        Ok(self
            .extract_file(path, &Deadline::none())?
            .iter()
            .map(ExtractedFunction::tree)
            .collect())
    }
}

impl PathExtractor for PythonExtractor {
    fn extract_lines(&self, path: &Path, deadline: &Deadline) -> Result<Vec<String>, ExtractError> {
        PythonExtractor::extract_lines(self, path, deadline)
    }
}

/// Read a source file as UTF-8, falling back to Latin-1 for legacy
/// encodings. A leading byte-order mark is dropped.
fn read_source(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| char::from(b)).collect(),
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn parse(source: &str, deadline: &Deadline) -> Result<Tree, ExtractError> {
    deadline.check()?;
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ExtractError::Parser(e.to_string()))?;
    if let Some(remaining) = deadline.remaining() {
        parser.set_timeout_micros(u64::try_from(remaining.as_micros()).unwrap_or(u64::MAX).max(1));
    }
    parser.parse(source, None).ok_or(ExtractError::Timeout)
}

/// All function definitions in breadth-first order. Any Python 2 construct,
/// inside a function or not, makes the whole module invalid.
fn collect_functions<'t>(root: Node<'t>, source: &[u8]) -> Result<Vec<Node<'t>>, ExtractError> {
    let mut functions = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        match SyntaxKind::classify(node.kind()) {
            SyntaxKind::FunctionDefinition => functions.push(node),
            SyntaxKind::Python2Only => return Err(syntax_error(node)),
            _ => {}
        }
        check_python3(node, source)?;
        queue.extend(named_children(node));
    }
    Ok(functions)
}

/// Reject Python 2 spellings the grammar still parses: `<>`, `except E, e`,
/// `raise E, msg`, long and legacy octal numbers, `ur''` prefixes, backtick
/// repr and truncated hex escapes.
fn check_python3(node: Node<'_>, source: &[u8]) -> Result<(), ExtractError> {
    let token = |kind: &str| {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| !c.is_named() && c.kind() == kind);
        found
    };
    match node.kind() {
        "comparison_operator" => match token("<>") {
            Some(diamond) => Err(syntax_error(diamond)),
            None => Ok(()),
        },
        "except_clause" => match token(",") {
            Some(comma) => Err(syntax_error(comma)),
            None => Ok(()),
        },
        "raise_statement" => match named_children(node)
            .into_iter()
            .find(|c| c.kind() == "expression_list")
        {
            Some(list) => Err(syntax_error(list)),
            None => Ok(()),
        },
        "integer" | "float" => literal::literal_repr(node.kind(), node_text(node, source)?)
            .map(|_| ())
            .ok_or_else(|| syntax_error(node)),
        "string" => literal::string_value(node, source).map(|_| ()),
        "concatenated_string" => literal::concatenated_value(node, source).map(|_| ()),
        _ => Ok(()),
    }
}

/// First error or missing node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

pub(crate) fn syntax_error(node: Node<'_>) -> ExtractError {
    let position = node.start_position();
    ExtractError::Syntax {
        line: position.row + 1,
        column: position.column + 1,
    }
}

/// Named children without comments.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    children
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> Result<&'s str, ExtractError> {
    node.utf8_text(source)
        .map_err(|e| ExtractError::Value(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<ExtractedFunction> {
        PythonExtractor::default()
            .extract_source(source, &Deadline::none())
            .unwrap()
    }

    fn tags(function: &ExtractedFunction) -> Vec<String> {
        fn walk(arena: &Arena, id: ElementId, out: &mut Vec<String>) {
            out.push(arena.get(id).node_type().to_string());
            for &child in arena.children(id) {
                walk(arena, child, out);
            }
        }
        let mut out = Vec::new();
        walk(&function.arena, function.root, &mut out);
        out
    }

    fn top_level(function: &ExtractedFunction) -> Vec<String> {
        function
            .arena
            .children(function.root)
            .iter()
            .map(|&id| function.arena.get(id).node_type().to_string())
            .collect()
    }

    #[test]
    fn test_function_layout_follows_ast_field_order() {
        let functions = extract("@decorate\ndef f(a, b=1) -> int:\n    return a\n");
        assert_eq!(
            top_level(&functions[0]),
            vec!["MethodName", "arguments", "Return", "Name", "Name"]
        );
    }

    #[test]
    fn test_parameters_follow_arguments_field_order() {
        let functions = extract("def f(a, *rest, key=2, **extra):\n    pass\n");
        let arena = &functions[0].arena;
        let arguments = arena.children(functions[0].root)[1];
        let layout: Vec<String> = arena
            .children(arguments)
            .iter()
            .map(|&id| match arena.get(id).node_type() {
                "arg" => arena
                    .get(arena.children(id)[0])
                    .value()
                    .unwrap_or_default()
                    .to_string(),
                other => other.to_string(),
            })
            .collect();
        assert_eq!(layout, vec!["a", "rest", "key", "Constant", "extra"]);
    }

    #[test]
    fn test_operator_nodes_combine_category_and_operator() {
        let functions = extract(
            "def f(a, b):\n    x = not a\n    y = -b\n    a += b\n    return a < b and b or a // b\n",
        );
        let tags = tags(&functions[0]);
        for expected in ["UnaryOp_Not", "UnaryOp_USub", "AugAssign_Add", "Compare_Lt", "BoolOp_Or", "BoolOp_And", "BinOp_FloorDiv"] {
            assert!(tags.iter().any(|t| t == expected), "missing {expected} in {tags:?}");
        }
    }

    #[test]
    fn test_chained_boolean_operands_are_flattened() {
        let functions = extract("def f(a, b, c):\n    return a and b and c\n");
        let arena = &functions[0].arena;
        let ret = arena.children(functions[0].root)[2];
        let bool_op = arena.children(ret)[0];
        assert_eq!(arena.get(bool_op).node_type(), "BoolOp_And");
        assert_eq!(arena.children(bool_op).len(), 3);
    }

    #[test]
    fn test_two_word_comparison_operators() {
        let functions = extract("def f(a, b):\n    return a not in b, a is not b\n");
        let tags = tags(&functions[0]);
        assert!(tags.contains(&"Compare_NotIn".to_string()));
        assert!(tags.contains(&"Compare_IsNot".to_string()));
    }

    #[test]
    fn test_break_and_continue_are_self_valued_leaves() {
        let functions = extract("def f(xs):\n    for x in xs:\n        if x:\n            break\n        continue\n");
        let jumps: Vec<_> = functions[0]
            .arena
            .iter()
            .map(|(_, element)| element)
            .filter(|element| matches!(element.node_type(), "Break" | "Continue"))
            .map(|element| (element.node_type().to_string(), element.value().map(str::to_string)))
            .collect();
        assert_eq!(
            jumps,
            vec![
                ("Break".to_string(), Some("Break".to_string())),
                ("Continue".to_string(), Some("Continue".to_string())),
            ]
        );
    }

    #[test]
    fn test_elif_nests_into_orelse() {
        let functions = extract("def f(x):\n    if x:\n        pass\n    elif x:\n        pass\n    else:\n        return x\n");
        let tags = tags(&functions[0]);
        assert_eq!(tags.iter().filter(|t| *t == "If").count(), 2);
    }

    #[test]
    fn test_literals_use_python_str() {
        let functions = extract("def f():\n    return 0x10, 1e20, None, b'a b', 'tab\\there'\n");
        let arena = &functions[0].arena;
        let constants: Vec<&str> = arena
            .iter()
            .map(|(_, element)| element)
            .filter(|e| e.node_type() == "Constant")
            .filter_map(|e| e.value())
            .collect();
        assert_eq!(constants, vec!["16", "1e+20", "None", "b'ab'", "tab\\there"]);
    }

    #[test]
    fn test_fstring_becomes_joined_str() {
        let functions = extract("def f(name):\n    return f\"hi {name!r:>10}\"\n");
        let tags = tags(&functions[0]);
        assert!(tags.contains(&"JoinedStr".to_string()));
        assert!(tags.contains(&"FormattedValue".to_string()));
    }

    #[test]
    fn test_mixed_bytes_and_str_concatenation_is_a_syntax_error() {
        let result = PythonExtractor::default().extract_source("def f():\n    return b'a' 'b'\n", &Deadline::none());
        assert!(matches!(result, Err(ExtractError::Syntax { line: 2, .. })));
    }

    #[test]
    fn test_python2_print_is_rejected() {
        let result = PythonExtractor::default().extract_source("print 'hello'\n", &Deadline::none());
        assert!(matches!(result, Err(ExtractError::Syntax { .. })));
    }

    #[test]
    fn test_python2_only_constructs_are_rejected() {
        let cases = [
            ("diamond", "def f(a, b):\n    return a <> b\n"),
            ("legacy octal", "def f():\n    return 0777\n"),
            ("long suffix", "def f():\n    return 10L\n"),
            ("except comma", "def f():\n    try:\n        pass\n    except ValueError, e:\n        pass\n"),
            ("raise comma", "def f():\n    raise ValueError, 'bad'\n"),
            ("backtick repr", "def f(x):\n    return `x`\n"),
            ("ur prefix", "def f():\n    return ur'x'\n"),
            ("short hex escape", "def f():\n    return '\\x4'\n"),
            ("short unicode escape", "def f():\n    return '\\u12'\n"),
            ("outside any function", "X = 0777\n\ndef f():\n    return 1\n"),
        ];
        for (label, source) in cases {
            let result = PythonExtractor::default().extract_source(source, &Deadline::none());
            assert!(
                matches!(result, Err(ExtractError::Syntax { .. })),
                "{label} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_python3_spellings_are_accepted() {
        let cases = [
            "def f(a, b):\n    return a != b\n",
            "def f():\n    return 0o777 + 0 + 00 + 10 + 0777.5\n",
            "def f():\n    try:\n        pass\n    except (ValueError, KeyError) as e:\n        pass\n",
            "def f():\n    raise ValueError('bad')\n",
            "def f(x):\n    return repr(x)\n",
            "def f():\n    return r'x' + u'x' + Rb'\\x4'.decode() + '\\x41\\u00e9'\n",
        ];
        for source in cases {
            let functions = PythonExtractor::default()
                .extract_source(source, &Deadline::none())
                .unwrap_or_else(|err| panic!("{source:?} rejected: {err}"));
            assert_eq!(functions.len(), 1);
        }
    }

    #[test]
    fn test_nested_function_is_also_part_of_outer_tree() {
        let functions = extract("def outer():\n    def inner():\n        return 1\n    return inner\n");
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].record.name, "outer");
        assert_eq!(functions[1].record.name, "inner");
        assert!(tags(&functions[0]).iter().filter(|t| *t == "FunctionDef").count() == 2);
    }
}
