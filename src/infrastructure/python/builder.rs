// Traversal of one tree-sitter function definition into an element arena.
//
// Tags and child order follow Python's `ast` module so that path contexts
// read the same as the ones produced from CPython trees.

use tree_sitter::Node;

use crate::domain::deadline::Deadline;
use crate::domain::error::ExtractError;
use crate::domain::path::{MergeLimits, PathMerger};
use crate::domain::token::{clean, encode_literal};
use crate::domain::tree::{Arena, Element, ElementId};

use super::literal::{self, StringPart, StringValue};
use super::syntax::{self, SyntaxKind};
use super::{ExtractedFunction, named_children, node_text, syntax_error};

/// Builds the tree and the path contexts of exactly one function.
pub(crate) struct TreeBuilder<'s> {
    source: &'s [u8],
    deadline: &'s Deadline,
    arena: Arena,
    stack: Vec<ElementId>,
    merger: PathMerger,
    recursion_limit: usize,
    depth: usize,
}

/// One declared parameter: its name node and optional annotation.
#[derive(Clone, Copy)]
struct Param<'t> {
    name: Node<'t>,
    annotation: Option<Node<'t>>,
}

#[derive(Default)]
struct Signature<'t> {
    positional: Vec<Param<'t>>,
    vararg: Option<Param<'t>>,
    keyword_only: Vec<Param<'t>>,
    keyword_defaults: Vec<Node<'t>>,
    kwarg: Option<Param<'t>>,
    defaults: Vec<Node<'t>>,
}

impl<'s> TreeBuilder<'s> {
    /// Traverse `function` and consume the merger into its record.
    pub(crate) fn build(
        function: Node<'_>,
        source: &'s [u8],
        limits: MergeLimits,
        deadline: &'s Deadline,
        recursion_limit: usize,
    ) -> Result<ExtractedFunction, ExtractError> {
        let name = match function.child_by_field_name("name") {
            Some(name) => clean(node_text(name, source)?),
            None => String::new(),
        };
        let mut builder = TreeBuilder {
            source,
            deadline,
            arena: Arena::new(),
            stack: Vec::new(),
            merger: PathMerger::new(name, limits),
            recursion_limit,
            depth: 0,
        };
        let root = builder.visit_function(function)?;
        Ok(ExtractedFunction {
            record: builder.merger.finish(),
            arena: builder.arena,
            root,
        })
    }

    /// Attach `element` under the top of the stack, push it for the duration
    /// of `f` and pop it on every exit.
    fn with_element<F>(&mut self, element: Element, f: F) -> Result<ElementId, ExtractError>
    where
        F: FnOnce(&mut Self) -> Result<(), ExtractError>,
    {
        if self.stack.len() >= self.recursion_limit {
            return Err(ExtractError::RecursionLimit(self.recursion_limit));
        }
        let id = self.arena.alloc(element);
        if let Some(&top) = self.stack.last() {
            self.arena.append_child(top, id)?;
        }
        self.stack.push(id);
        let result = f(self);
        self.stack.pop();
        result.map(|()| id)
    }

    fn node<F>(&mut self, tag: &str, f: F) -> Result<(), ExtractError>
    where
        F: FnOnce(&mut Self) -> Result<(), ExtractError>,
    {
        self.with_element(Element::node(tag), f).map(drop)
    }

    /// Emit a leaf and register the path that ends in it.
    fn leaf(&mut self, tag: &str, value: impl Into<String>) -> Result<(), ExtractError> {
        self.with_element(Element::leaf(tag, value), Self::register_path)
            .map(drop)
    }

    fn register_path(&mut self) -> Result<(), ExtractError> {
        self.deadline.check()?;
        self.merger.add_path(&self.arena, self.stack.clone())
    }

    fn visit_all<'t>(&mut self, nodes: impl IntoIterator<Item = Node<'t>>) -> Result<(), ExtractError> {
        for node in nodes {
            self.visit(node)?;
        }
        Ok(())
    }

    fn visit_field(&mut self, node: Node<'_>, field: &str) -> Result<(), ExtractError> {
        match node.child_by_field_name(field) {
            Some(child) => self.visit(child),
            None => Ok(()),
        }
    }

    fn visit(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        if self.depth >= self.recursion_limit {
            return Err(ExtractError::RecursionLimit(self.recursion_limit));
        }
        self.depth += 1;
        let result = self.dispatch(node);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        match SyntaxKind::classify(node.kind()) {
            SyntaxKind::Elided => Ok(()),
            SyntaxKind::Transparent => self.visit_all(named_children(node)),
            SyntaxKind::FunctionDefinition => self.visit_function(node).map(drop),
            SyntaxKind::ClassDefinition => self.visit_class(node),
            SyntaxKind::DecoratedDefinition => self.visit_field(node, "definition"),
            SyntaxKind::Parameters => self.visit_parameters(Some(node)),
            SyntaxKind::Lambda => self.node("Lambda", move |b| {
                b.visit_parameters(node.child_by_field_name("parameters"))?;
                b.visit_field(node, "body")
            }),
            SyntaxKind::ExpressionStatement => self.visit_expression_statement(node),
            SyntaxKind::Assignment => self.visit_assignment(node),
            SyntaxKind::AugmentedAssignment => {
                let tag = operator_tag(node, "AugAssign", syntax::augmented_operator_name)?;
                self.node(&tag, move |b| {
                    b.visit_field(node, "left")?;
                    b.visit_field(node, "right")
                })
            }
            SyntaxKind::If => self.visit_if(node),
            SyntaxKind::For => {
                let tag = if has_token(node, "async") { "AsyncFor" } else { "For" };
                self.node(tag, move |b| {
                    b.visit_field(node, "left")?;
                    b.visit_field(node, "right")?;
                    b.visit_field(node, "body")?;
                    b.visit_field(node, "alternative")
                })
            }
            SyntaxKind::With => {
                let tag = if has_token(node, "async") { "AsyncWith" } else { "With" };
                self.node(tag, move |b| b.visit_all(named_children(node)))
            }
            SyntaxKind::WithItem => self.node("withitem", move |b| match node.child_by_field_name("value") {
                Some(value) if value.kind() == "as_pattern" => b.visit_all(named_children(value)),
                Some(value) => b.visit(value),
                None => Ok(()),
            }),
            SyntaxKind::Try => {
                let star = named_children(node)
                    .iter()
                    .any(|c| c.kind() == "except_group_clause");
                let tag = if star { "TryStar" } else { "Try" };
                self.node(tag, move |b| b.visit_all(named_children(node)))
            }
            SyntaxKind::ExceptClause => self.visit_except(node),
            SyntaxKind::Import => self.visit_import(node, "Import"),
            SyntaxKind::ImportFrom => self.visit_import(node, "ImportFrom"),
            SyntaxKind::NameList(tag) => self.node(tag, |_| Ok(())),
            SyntaxKind::Delete => self.node("Delete", move |b| {
                for target in named_children(node) {
                    if target.kind() == "expression_list" {
                        b.visit_all(named_children(target))?;
                    } else {
                        b.visit(target)?;
                    }
                }
                Ok(())
            }),
            SyntaxKind::Jump(tag) => self.leaf(tag, tag),
            SyntaxKind::Python2Only => Err(syntax_error(node)),
            SyntaxKind::Identifier => {
                let name = clean(node_text(node, self.source)?);
                self.leaf("Name", name)
            }
            SyntaxKind::Literal => {
                let repr = literal::literal_repr(node.kind(), node_text(node, self.source)?)
                    .ok_or_else(|| syntax_error(node))?;
                self.leaf("Constant", encode_literal(&repr))
            }
            SyntaxKind::String => {
                let value = literal::string_value(node, self.source)?;
                self.visit_string(value)
            }
            SyntaxKind::ConcatenatedString => {
                let value = literal::concatenated_value(node, self.source)?;
                self.visit_string(value)
            }
            SyntaxKind::BinaryOperator => {
                let tag = operator_tag(node, "BinOp", syntax::binary_operator_name)?;
                self.node(&tag, move |b| {
                    b.visit_field(node, "left")?;
                    b.visit_field(node, "right")
                })
            }
            SyntaxKind::BooleanOperator => self.visit_boolean(node),
            SyntaxKind::NotOperator => self.node("UnaryOp_Not", move |b| b.visit_field(node, "argument")),
            SyntaxKind::UnaryOperator => {
                let tag = operator_tag(node, "UnaryOp", syntax::unary_operator_name)?;
                self.node(&tag, move |b| b.visit_field(node, "argument"))
            }
            SyntaxKind::Comparison => {
                let op = first_comparison_operator(node)
                    .and_then(syntax::comparison_operator_name)
                    .ok_or_else(|| syntax_error(node))?;
                self.node(&format!("Compare_{op}"), move |b| b.visit_all(named_children(node)))
            }
            SyntaxKind::Call => self.visit_call(node),
            SyntaxKind::KeywordArgument => self.node("keyword", move |b| b.visit_field(node, "value")),
            SyntaxKind::DictionarySplat => self.node("keyword", move |b| b.visit_all(named_children(node))),
            SyntaxKind::Attribute => self.node("Attribute", move |b| b.visit_field(node, "object")),
            SyntaxKind::Subscript => self.node("Subscript", move |b| {
                b.visit_field(node, "value")?;
                let mut cursor = node.walk();
                let subscripts: Vec<Node<'_>> = node
                    .children_by_field_name("subscript", &mut cursor)
                    .filter(|c| c.kind() != "comment")
                    .collect();
                if subscripts.len() > 1 {
                    b.node("Tuple", move |b| b.visit_all(subscripts))
                } else {
                    b.visit_all(subscripts)
                }
            }),
            SyntaxKind::Dictionary => self.visit_dictionary(node),
            SyntaxKind::Comprehension(tag) => self.visit_comprehension(node, tag),
            SyntaxKind::ConditionalExpression => {
                let parts = named_children(node);
                self.node("IfExp", move |b| match parts.as_slice() {
                    [body, test, orelse] => {
                        b.visit(*test)?;
                        b.visit(*body)?;
                        b.visit(*orelse)
                    }
                    _ => b.visit_all(parts.iter().copied()),
                })
            }
            SyntaxKind::Yield => {
                let tag = if has_token(node, "from") { "YieldFrom" } else { "Yield" };
                self.node(tag, move |b| b.visit_all(named_children(node)))
            }
            SyntaxKind::Simple(tag) => self.node(tag, move |b| b.visit_all(named_children(node))),
            SyntaxKind::Generic => self.node(node.kind(), move |b| b.visit_all(named_children(node))),
        }
    }

    fn visit_function(&mut self, node: Node<'_>) -> Result<ElementId, ExtractError> {
        let tag = if has_token(node, "async") {
            "AsyncFunctionDef"
        } else {
            "FunctionDef"
        };
        self.with_element(Element::node(tag), move |b| {
            let name = match node.child_by_field_name("name") {
                Some(name) => clean(node_text(name, b.source)?),
                None => String::new(),
            };
            b.leaf("MethodName", name)?;
            b.visit_parameters(node.child_by_field_name("parameters"))?;

            if let Some(body) = node.child_by_field_name("body") {
                let statements = named_children(body);
                let skip = statements
                    .first()
                    .is_some_and(|first| is_docstring(*first, b.source));
                b.visit_all(statements.into_iter().skip(usize::from(skip)))?;
            }

            b.visit_all(decorators(node))?;
            b.visit_field(node, "return_type")?;
            b.visit_field(node, "type_parameters")
        })
    }

    fn visit_class(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        self.node("ClassDef", move |b| {
            let arguments = node
                .child_by_field_name("superclasses")
                .map(named_children)
                .unwrap_or_default();
            let (keywords, bases): (Vec<_>, Vec<_>) =
                arguments.into_iter().partition(|arg| is_keyword(*arg));
            b.visit_all(bases)?;
            b.visit_all(keywords)?;
            b.visit_field(node, "body")?;
            b.visit_all(decorators(node))?;
            b.visit_field(node, "type_parameters")
        })
    }

    /// `arguments` node in `ast.arguments` field order. Lambdas without
    /// parameters still get an empty one.
    fn visit_parameters(&mut self, parameters: Option<Node<'_>>) -> Result<(), ExtractError> {
        let signature = match parameters {
            Some(parameters) => signature(parameters)?,
            None => Signature::default(),
        };
        self.node("arguments", move |b| {
            for param in signature.positional {
                b.visit_arg(param)?;
            }
            if let Some(vararg) = signature.vararg {
                b.visit_arg(vararg)?;
            }
            for param in signature.keyword_only {
                b.visit_arg(param)?;
            }
            b.visit_all(signature.keyword_defaults)?;
            if let Some(kwarg) = signature.kwarg {
                b.visit_arg(kwarg)?;
            }
            b.visit_all(signature.defaults)
        })
    }

    fn visit_arg(&mut self, param: Param<'_>) -> Result<(), ExtractError> {
        self.node("arg", move |b| {
            let name = clean(node_text(param.name, b.source)?);
            b.leaf("ArgName", name)?;
            match param.annotation {
                Some(annotation) => b.visit(annotation),
                None => Ok(()),
            }
        })
    }

    fn visit_expression_statement(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        let children = named_children(node);
        if let [only] = children[..] {
            if matches!(only.kind(), "assignment" | "augmented_assignment") {
                return self.visit(only);
            }
            return self.node("Expr", move |b| b.visit(only));
        }
        self.node("Expr", move |b| b.node("Tuple", move |b| b.visit_all(children)))
    }

    /// `Import` and `ImportFrom` hold one empty `alias` per imported name;
    /// the names themselves are plain strings in `ast`.
    fn visit_import(&mut self, node: Node<'_>, tag: &str) -> Result<(), ExtractError> {
        let mut cursor = node.walk();
        let mut aliases = node.children_by_field_name("name", &mut cursor).count();
        if named_children(node).iter().any(|c| c.kind() == "wildcard_import") {
            aliases += 1;
        }
        self.node(tag, move |b| {
            for _ in 0..aliases {
                b.node("alias", |_| Ok(()))?;
            }
            Ok(())
        })
    }

    /// `a = b = value` is one `Assign` with two targets; an annotation turns
    /// it into `AnnAssign`.
    fn visit_assignment(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        if let Some(annotation) = node.child_by_field_name("type") {
            return self.node("AnnAssign", move |b| {
                b.visit_field(node, "left")?;
                b.visit(annotation)?;
                b.visit_field(node, "right")
            });
        }

        let mut targets = Vec::new();
        let mut current = node;
        let value = loop {
            if let Some(left) = current.child_by_field_name("left") {
                targets.push(left);
            }
            match current.child_by_field_name("right") {
                Some(right)
                    if right.kind() == "assignment" && right.child_by_field_name("type").is_none() =>
                {
                    current = right;
                }
                other => break other,
            }
        };
        self.node("Assign", move |b| {
            b.visit_all(targets)?;
            match value {
                Some(value) => b.visit(value),
                None => Ok(()),
            }
        })
    }

    fn visit_if(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        let mut cursor = node.walk();
        let alternatives: Vec<Node<'_>> = node
            .children_by_field_name("alternative", &mut cursor)
            .collect();
        self.node("If", move |b| {
            b.visit_field(node, "condition")?;
            b.visit_field(node, "consequence")?;
            b.visit_else_chain(&alternatives)
        })
    }

    /// Each `elif` becomes an `If` nested in the `orelse` of the previous one.
    fn visit_else_chain(&mut self, alternatives: &[Node<'_>]) -> Result<(), ExtractError> {
        match alternatives.split_first() {
            None => Ok(()),
            Some((clause, rest)) if clause.kind() == "elif_clause" => {
                let clause = *clause;
                self.node("If", move |b| {
                    b.visit_field(clause, "condition")?;
                    b.visit_field(clause, "consequence")?;
                    b.visit_else_chain(rest)
                })
            }
            Some((clause, _)) => self.visit(*clause),
        }
    }

    /// `ExceptHandler` keeps the exception type and the body; the bound name
    /// is a plain string in `ast`.
    fn visit_except(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        let children = named_children(node);
        let exception = children
            .iter()
            .copied()
            .find(|c| c.kind() != "block")
            .map(|c| {
                if c.kind() == "as_pattern" {
                    c.named_child(0).unwrap_or(c)
                } else {
                    c
                }
            });
        let bodies: Vec<Node<'_>> = children.into_iter().filter(|c| c.kind() == "block").collect();
        self.node("ExceptHandler", move |b| {
            if let Some(exception) = exception {
                b.visit(exception)?;
            }
            b.visit_all(bodies)
        })
    }

    /// `a and b and c` is a single `BoolOp_And` over three operands.
    fn visit_boolean(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        let op = operator_token(node);
        let tag = op
            .and_then(syntax::boolean_operator_name)
            .map(|name| format!("BoolOp_{name}"))
            .ok_or_else(|| syntax_error(node))?;

        let mut operands = Vec::new();
        let mut current = node;
        loop {
            if let Some(right) = current.child_by_field_name("right") {
                operands.push(right);
            }
            match current.child_by_field_name("left") {
                Some(left) if left.kind() == "boolean_operator" && operator_token(left) == op => {
                    current = left;
                }
                Some(left) => {
                    operands.push(left);
                    break;
                }
                None => break,
            }
        }
        operands.reverse();
        self.node(&tag, move |b| b.visit_all(operands))
    }

    /// `Call(func, args, keywords)`: positional arguments before keywords.
    fn visit_call(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        self.node("Call", move |b| {
            b.visit_field(node, "function")?;
            match node.child_by_field_name("arguments") {
                Some(arguments) if arguments.kind() == "generator_expression" => b.visit(arguments),
                Some(arguments) => {
                    let (keywords, positional): (Vec<_>, Vec<_>) = named_children(arguments)
                        .into_iter()
                        .partition(|arg| is_keyword(*arg));
                    b.visit_all(positional)?;
                    b.visit_all(keywords)
                }
                None => Ok(()),
            }
        })
    }

    /// `Dict(keys, values)`: all keys first, then all values. `**spread`
    /// entries have no key.
    fn visit_dictionary(&mut self, node: Node<'_>) -> Result<(), ExtractError> {
        let entries = named_children(node);
        self.node("Dict", move |b| {
            for entry in &entries {
                if entry.kind() == "pair" {
                    b.visit_field(*entry, "key")?;
                }
            }
            for entry in &entries {
                match entry.kind() {
                    "pair" => b.visit_field(*entry, "value")?,
                    "dictionary_splat" => b.visit_all(named_children(*entry))?,
                    _ => b.visit(*entry)?,
                }
            }
            Ok(())
        })
    }

    fn visit_comprehension(&mut self, node: Node<'_>, tag: &str) -> Result<(), ExtractError> {
        let mut groups: Vec<(Node<'_>, Vec<Node<'_>>)> = Vec::new();
        for clause in named_children(node) {
            match clause.kind() {
                "for_in_clause" => groups.push((clause, Vec::new())),
                "if_clause" => {
                    if let Some((_, ifs)) = groups.last_mut() {
                        ifs.push(clause);
                    }
                }
                _ => {}
            }
        }

        self.node(tag, move |b| {
            match node.child_by_field_name("body") {
                Some(body) if body.kind() == "pair" => {
                    b.visit_field(body, "key")?;
                    b.visit_field(body, "value")?;
                }
                Some(body) => b.visit(body)?,
                None => {}
            }
            for (clause, ifs) in groups {
                b.node("comprehension", move |b| {
                    b.visit_field(clause, "left")?;
                    let mut cursor = clause.walk();
                    let iterables: Vec<Node<'_>> = clause
                        .children_by_field_name("right", &mut cursor)
                        .filter(|c| c.kind() != "comment")
                        .collect();
                    if iterables.len() > 1 {
                        b.node("Tuple", move |b| b.visit_all(iterables))?;
                    } else {
                        b.visit_all(iterables)?;
                    }
                    for condition in ifs {
                        b.visit_all(named_children(condition))?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    fn visit_string(&mut self, value: StringValue<'_>) -> Result<(), ExtractError> {
        match value {
            StringValue::Str(text) => self.leaf("Constant", encode_literal(&text)),
            StringValue::Bytes(bytes) => self.leaf("Constant", encode_literal(&literal::bytes_repr(&bytes))),
            StringValue::Formatted(parts) => self.visit_joined(parts),
        }
    }

    fn visit_joined(&mut self, parts: Vec<StringPart<'_>>) -> Result<(), ExtractError> {
        self.node("JoinedStr", move |b| {
            for part in parts {
                match part {
                    StringPart::Text(text) => b.leaf("Constant", encode_literal(&text))?,
                    StringPart::Interpolation(interpolation) => b.visit_formatted_value(interpolation)?,
                }
            }
            Ok(())
        })
    }

    /// `FormattedValue(value, format_spec)`; the conversion flag is an int.
    fn visit_formatted_value(&mut self, interpolation: Node<'_>) -> Result<(), ExtractError> {
        let children = named_children(interpolation);
        let spec = children
            .iter()
            .copied()
            .find(|c| c.kind() == "format_specifier");
        let values: Vec<Node<'_>> = children
            .into_iter()
            .filter(|c| !matches!(c.kind(), "format_specifier" | "type_conversion"))
            .collect();
        self.node("FormattedValue", move |b| {
            b.visit_all(values)?;
            match spec {
                Some(spec) => {
                    let parts = literal::format_spec_parts(spec, b.source)?;
                    b.visit_joined(parts)
                }
                None => Ok(()),
            }
        })
    }
}

/// Split a parameter list into the fields of `ast.arguments`.
fn signature(parameters: Node<'_>) -> Result<Signature<'_>, ExtractError> {
    let mut signature = Signature::default();
    let mut keyword_only = false;

    for child in named_children(parameters) {
        let (param, default) = match child.kind() {
            "identifier" => (Param { name: child, annotation: None }, None),
            "typed_parameter" => {
                let annotation = child.child_by_field_name("type");
                let Some(inner) = child.named_child(0) else {
                    return Err(syntax_error(child));
                };
                let param = |name| Param { name, annotation };
                match inner.kind() {
                    "list_splat_pattern" => {
                        signature.vararg = Some(param(splat_name(inner)?));
                        keyword_only = true;
                        continue;
                    }
                    "dictionary_splat_pattern" => {
                        signature.kwarg = Some(param(splat_name(inner)?));
                        continue;
                    }
                    _ => (param(inner), None),
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                let name = child
                    .child_by_field_name("name")
                    .filter(|name| name.kind() == "identifier")
                    .ok_or_else(|| syntax_error(child))?;
                let param = Param {
                    name,
                    annotation: child.child_by_field_name("type"),
                };
                (param, child.child_by_field_name("value"))
            }
            "list_splat_pattern" => {
                signature.vararg = Some(Param {
                    name: splat_name(child)?,
                    annotation: None,
                });
                keyword_only = true;
                continue;
            }
            "dictionary_splat_pattern" => {
                signature.kwarg = Some(Param {
                    name: splat_name(child)?,
                    annotation: None,
                });
                continue;
            }
            "keyword_separator" => {
                keyword_only = true;
                continue;
            }
            "positional_separator" => continue,
            // Python 2 tuple parameters.
            _ => return Err(syntax_error(child)),
        };

        if keyword_only {
            signature.keyword_only.push(param);
            signature.keyword_defaults.extend(default);
        } else {
            signature.positional.push(param);
            signature.defaults.extend(default);
        }
    }

    Ok(signature)
}

fn splat_name(pattern: Node<'_>) -> Result<Node<'_>, ExtractError> {
    named_children(pattern)
        .into_iter()
        .find(|c| c.kind() == "identifier")
        .ok_or_else(|| syntax_error(pattern))
}

/// Decorators live on the enclosing `decorated_definition`.
fn decorators(definition: Node<'_>) -> Vec<Node<'_>> {
    definition
        .parent()
        .filter(|parent| parent.kind() == "decorated_definition")
        .map(|parent| {
            named_children(parent)
                .into_iter()
                .filter(|c| c.kind() == "decorator")
                .collect()
        })
        .unwrap_or_default()
}

/// A leading plain-string statement with non-blank text.
fn is_docstring(statement: Node<'_>, source: &[u8]) -> bool {
    if statement.kind() != "expression_statement" {
        return false;
    }
    let children = named_children(statement);
    let [only] = children.as_slice() else {
        return false;
    };
    let value = match only.kind() {
        "string" => literal::string_value(*only, source),
        "concatenated_string" => literal::concatenated_value(*only, source),
        _ => return false,
    };
    matches!(value, Ok(StringValue::Str(text)) if !text.trim().is_empty())
}

fn is_keyword(argument: Node<'_>) -> bool {
    matches!(argument.kind(), "keyword_argument" | "dictionary_splat")
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

fn operator_token(node: Node<'_>) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

fn operator_tag(
    node: Node<'_>,
    category: &str,
    name: fn(&str) -> Option<&'static str>,
) -> Result<String, ExtractError> {
    operator_token(node)
        .and_then(name)
        .map(|op| format!("{category}_{op}"))
        .ok_or_else(|| syntax_error(node))
}

/// First operator of a comparison chain, with two-word operators joined.
fn first_comparison_operator(node: Node<'_>) -> Option<&'static str> {
    let mut cursor = node.walk();
    let tokens: Vec<&'static str> = node
        .children(&mut cursor)
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["not", "in", ..] => Some("not in"),
        ["is", "not", ..] => Some("is not"),
        [first, ..] => Some(*first),
        [] => None,
    }
}
