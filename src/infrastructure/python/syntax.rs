// Classification of tree-sitter-python node kinds.
//
// Every grammar kind maps to exactly one `SyntaxKind`; the tree builder
// matches on the variant, so adding a variant forces a handler.

/// How the tree builder treats one grammar node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    /// Dropped with its subtree (comments, separators).
    Elided,
    /// Not materialized; named children are visited in its place.
    Transparent,
    FunctionDefinition,
    ClassDefinition,
    DecoratedDefinition,
    Parameters,
    Lambda,
    ExpressionStatement,
    Assignment,
    AugmentedAssignment,
    If,
    /// `for` / `async for`.
    For,
    /// `with` / `async with`.
    With,
    WithItem,
    Try,
    ExceptClause,
    Import,
    ImportFrom,
    /// `global` / `nonlocal`: names are plain strings, nothing below the node.
    NameList(&'static str),
    Delete,
    /// `break` / `continue`: leaf whose value is its own tag.
    Jump(&'static str),
    /// Statements that only exist in Python 2.
    Python2Only,
    Identifier,
    /// Numbers, booleans, `None` and `...`.
    Literal,
    String,
    ConcatenatedString,
    BinaryOperator,
    BooleanOperator,
    NotOperator,
    UnaryOperator,
    Comparison,
    Call,
    KeywordArgument,
    Attribute,
    Subscript,
    Dictionary,
    DictionarySplat,
    Comprehension(&'static str),
    ConditionalExpression,
    Yield,
    /// One-to-one mapping onto an `ast` tag, children in source order.
    Simple(&'static str),
    /// Anything else: node tagged with the grammar kind itself.
    Generic,
}

impl SyntaxKind {
    pub fn classify(kind: &str) -> SyntaxKind {
        match kind {
            "comment" | "line_continuation" | "keyword_separator" | "positional_separator" => {
                SyntaxKind::Elided
            }
            "block" | "else_clause" | "finally_clause" | "parenthesized_expression" | "type"
            | "decorator" | "with_clause" | "as_pattern_target" => SyntaxKind::Transparent,

            "function_definition" => SyntaxKind::FunctionDefinition,
            "class_definition" => SyntaxKind::ClassDefinition,
            "decorated_definition" => SyntaxKind::DecoratedDefinition,
            "parameters" | "lambda_parameters" => SyntaxKind::Parameters,
            "lambda" => SyntaxKind::Lambda,

            "expression_statement" => SyntaxKind::ExpressionStatement,
            "assignment" => SyntaxKind::Assignment,
            "augmented_assignment" => SyntaxKind::AugmentedAssignment,
            "if_statement" | "elif_clause" => SyntaxKind::If,
            "for_statement" => SyntaxKind::For,
            "while_statement" => SyntaxKind::Simple("While"),
            "with_statement" => SyntaxKind::With,
            "with_item" => SyntaxKind::WithItem,
            "try_statement" => SyntaxKind::Try,
            "except_clause" | "except_group_clause" => SyntaxKind::ExceptClause,
            "return_statement" => SyntaxKind::Simple("Return"),
            "raise_statement" => SyntaxKind::Simple("Raise"),
            "assert_statement" => SyntaxKind::Simple("Assert"),
            "pass_statement" => SyntaxKind::Simple("Pass"),
            "delete_statement" => SyntaxKind::Delete,
            "import_statement" => SyntaxKind::Import,
            "import_from_statement" | "future_import_statement" => SyntaxKind::ImportFrom,
            "global_statement" => SyntaxKind::NameList("Global"),
            "nonlocal_statement" => SyntaxKind::NameList("Nonlocal"),
            "break_statement" => SyntaxKind::Jump("Break"),
            "continue_statement" => SyntaxKind::Jump("Continue"),
            "print_statement" | "exec_statement" => SyntaxKind::Python2Only,

            "identifier" => SyntaxKind::Identifier,
            "integer" | "float" | "true" | "false" | "none" | "ellipsis" => SyntaxKind::Literal,
            "string" => SyntaxKind::String,
            "concatenated_string" => SyntaxKind::ConcatenatedString,

            "binary_operator" => SyntaxKind::BinaryOperator,
            "boolean_operator" => SyntaxKind::BooleanOperator,
            "not_operator" => SyntaxKind::NotOperator,
            "unary_operator" => SyntaxKind::UnaryOperator,
            "comparison_operator" => SyntaxKind::Comparison,

            "call" => SyntaxKind::Call,
            "keyword_argument" => SyntaxKind::KeywordArgument,
            "attribute" => SyntaxKind::Attribute,
            "subscript" => SyntaxKind::Subscript,
            "slice" => SyntaxKind::Simple("Slice"),
            "dictionary" => SyntaxKind::Dictionary,
            "dictionary_splat" => SyntaxKind::DictionarySplat,
            "list_splat" | "list_splat_pattern" => SyntaxKind::Simple("Starred"),
            "list" | "list_pattern" => SyntaxKind::Simple("List"),
            "tuple" | "tuple_pattern" | "expression_list" | "pattern_list" => {
                SyntaxKind::Simple("Tuple")
            }
            "set" => SyntaxKind::Simple("Set"),
            "list_comprehension" => SyntaxKind::Comprehension("ListComp"),
            "set_comprehension" => SyntaxKind::Comprehension("SetComp"),
            "dictionary_comprehension" => SyntaxKind::Comprehension("DictComp"),
            "generator_expression" => SyntaxKind::Comprehension("GeneratorExp"),
            "conditional_expression" => SyntaxKind::ConditionalExpression,
            "named_expression" => SyntaxKind::Simple("NamedExpr"),
            "await" => SyntaxKind::Simple("Await"),
            "yield" => SyntaxKind::Yield,

            _ => SyntaxKind::Generic,
        }
    }
}

/// `ast` operator class for a binary operator token.
pub fn binary_operator_name(token: &str) -> Option<&'static str> {
    let name = match token {
        "+" => "Add",
        "-" => "Sub",
        "*" => "Mult",
        "@" => "MatMult",
        "/" => "Div",
        "%" => "Mod",
        "**" => "Pow",
        "<<" => "LShift",
        ">>" => "RShift",
        "|" => "BitOr",
        "^" => "BitXor",
        "&" => "BitAnd",
        "//" => "FloorDiv",
        _ => return None,
    };
    Some(name)
}

/// Operator class for `+=`, `<<=`, ...
pub fn augmented_operator_name(token: &str) -> Option<&'static str> {
    token.strip_suffix('=').and_then(binary_operator_name)
}

pub fn boolean_operator_name(token: &str) -> Option<&'static str> {
    match token {
        "and" => Some("And"),
        "or" => Some("Or"),
        _ => None,
    }
}

pub fn unary_operator_name(token: &str) -> Option<&'static str> {
    match token {
        "-" => Some("USub"),
        "+" => Some("UAdd"),
        "~" => Some("Invert"),
        "not" => Some("Not"),
        _ => None,
    }
}

pub fn comparison_operator_name(token: &str) -> Option<&'static str> {
    let name = match token {
        "==" => "Eq",
        "!=" => "NotEq",
        "<" => "Lt",
        "<=" => "LtE",
        ">" => "Gt",
        ">=" => "GtE",
        "is" => "Is",
        "is not" => "IsNot",
        "in" => "In",
        "not in" => "NotIn",
        _ => return None,
    };
    Some(name)
}
