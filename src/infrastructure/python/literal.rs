// Python literal values as `str()` would print them.

use tree_sitter::Node;

use crate::domain::error::ExtractError;

/// Value of a string literal or an implicit concatenation of them.
#[derive(Debug)]
pub enum StringValue<'t> {
    Str(String),
    Bytes(Vec<u8>),
    /// f-string: literal chunks interleaved with `{...}` interpolations.
    Formatted(Vec<StringPart<'t>>),
}

#[derive(Debug)]
pub enum StringPart<'t> {
    Text(String),
    Interpolation(Node<'t>),
}

#[derive(Debug, Clone, Copy, Default)]
struct Prefix {
    raw: bool,
    bytes: bool,
    formatted: bool,
}

fn text<'s>(node: Node<'_>, source: &'s [u8]) -> Result<&'s str, ExtractError> {
    node.utf8_text(source)
        .map_err(|e| ExtractError::Value(e.to_string()))
}

/// Prefix letters Python 3 accepts, in any case and order.
const VALID_PREFIXES: [&str; 9] = ["", "r", "u", "b", "f", "br", "rb", "fr", "rf"];

fn string_prefix(node: Node<'_>, source: &[u8]) -> Result<Prefix, ExtractError> {
    let start = match node.child(0) {
        Some(child) if child.kind() == "string_start" => text(child, source)?,
        _ => text(node, source)?,
    };
    // The grammar also lexes Python 2 backtick repr as a string.
    if start.contains('`') {
        return Err(super::syntax_error(node));
    }
    let letters: String = start
        .chars()
        .take_while(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .to_ascii_lowercase();
    if !VALID_PREFIXES.contains(&letters.as_str()) {
        return Err(super::syntax_error(node));
    }
    Ok(Prefix {
        raw: letters.contains('r'),
        bytes: letters.contains('b'),
        formatted: letters.contains('f'),
    })
}

/// Byte range of the literal body, between the opening and closing quotes.
fn body_range(node: Node<'_>) -> (usize, usize) {
    let count = node.child_count();
    let start = node
        .child(0)
        .filter(|c| c.kind() == "string_start")
        .map(|c| c.end_byte())
        .unwrap_or_else(|| node.start_byte());
    let end = count
        .checked_sub(1)
        .and_then(|last| node.child(last))
        .filter(|c| c.kind() == "string_end")
        .map(|c| c.start_byte())
        .unwrap_or_else(|| node.end_byte());
    (start, end.max(start))
}

fn slice(source: &[u8], start: usize, end: usize) -> Result<&str, ExtractError> {
    std::str::from_utf8(&source[start..end]).map_err(|e| ExtractError::Value(e.to_string()))
}

/// Decode a single `string` node.
pub fn string_value<'t>(node: Node<'t>, source: &[u8]) -> Result<StringValue<'t>, ExtractError> {
    let prefix = string_prefix(node, source)?;
    let (start, end) = body_range(node);

    if !prefix.formatted {
        let raw = slice(source, start, end)?;
        return if prefix.bytes {
            Ok(StringValue::Bytes(decode_bytes(raw, prefix.raw, node)?))
        } else {
            decode_str(raw, prefix.raw)
                .map(StringValue::Str)
                .ok_or_else(|| super::syntax_error(node))
        };
    }

    let mut cursor = node.walk();
    let interpolations: Vec<Node<'t>> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "interpolation")
        .collect();
    Ok(StringValue::Formatted(split_formatted(
        node,
        source,
        (start, end),
        &interpolations,
        prefix.raw,
    )?))
}

/// Literal text and nested interpolations of an f-string format spec.
pub fn format_spec_parts<'t>(spec: Node<'t>, source: &[u8]) -> Result<Vec<StringPart<'t>>, ExtractError> {
    let mut cursor = spec.walk();
    let interpolations: Vec<Node<'t>> = spec
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "interpolation")
        .collect();
    let start = (spec.start_byte() + 1).min(spec.end_byte());
    split_formatted(spec, source, (start, spec.end_byte()), &interpolations, true)
}

fn split_formatted<'t>(
    node: Node<'_>,
    source: &[u8],
    (start, end): (usize, usize),
    interpolations: &[Node<'t>],
    raw: bool,
) -> Result<Vec<StringPart<'t>>, ExtractError> {
    let mut parts = Vec::new();
    let mut position = start;
    for &interpolation in interpolations {
        let chunk = slice(source, position, interpolation.start_byte().max(position))?;
        push_text(&mut parts, &unbrace(chunk), raw).ok_or_else(|| super::syntax_error(node))?;
        parts.push(StringPart::Interpolation(interpolation));
        position = interpolation.end_byte();
    }
    let tail = slice(source, position.min(end), end)?;
    push_text(&mut parts, &unbrace(tail), raw).ok_or_else(|| super::syntax_error(node))?;
    Ok(parts)
}

fn unbrace(chunk: &str) -> String {
    chunk.replace("{{", "{").replace("}}", "}")
}

fn push_text(parts: &mut Vec<StringPart<'_>>, chunk: &str, raw: bool) -> Option<()> {
    if chunk.is_empty() {
        return Some(());
    }
    let decoded = decode_str(chunk, raw)?;
    match parts.last_mut() {
        Some(StringPart::Text(existing)) => existing.push_str(&decoded),
        _ => parts.push(StringPart::Text(decoded)),
    }
    Some(())
}

/// Decode an implicit concatenation (`"a" "b"`).
pub fn concatenated_value<'t>(node: Node<'t>, source: &[u8]) -> Result<StringValue<'t>, ExtractError> {
    let mut cursor = node.walk();
    let pieces: Vec<Node<'t>> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "string")
        .collect();

    let mut values = Vec::with_capacity(pieces.len());
    for piece in pieces {
        values.push(string_value(piece, source)?);
    }

    let any_formatted = values.iter().any(|v| matches!(v, StringValue::Formatted(_)));
    let any_bytes = values.iter().any(|v| matches!(v, StringValue::Bytes(_)));
    let all_bytes = values.iter().all(|v| matches!(v, StringValue::Bytes(_)));
    if any_bytes && !all_bytes {
        // Python refuses to mix bytes and str literals.
        return Err(super::syntax_error(node));
    }

    if any_formatted {
        let mut parts: Vec<StringPart<'t>> = Vec::new();
        for value in values {
            let pieces = match value {
                StringValue::Formatted(parts) => parts,
                StringValue::Str(text) => vec![StringPart::Text(text)],
                StringValue::Bytes(_) => Vec::new(),
            };
            for part in pieces {
                match (parts.last_mut(), part) {
                    (Some(StringPart::Text(existing)), StringPart::Text(next)) => existing.push_str(&next),
                    (_, part) => parts.push(part),
                }
            }
        }
        return Ok(StringValue::Formatted(parts));
    }

    if all_bytes && !values.is_empty() {
        let mut bytes = Vec::new();
        for value in values {
            if let StringValue::Bytes(chunk) = value {
                bytes.extend(chunk);
            }
        }
        return Ok(StringValue::Bytes(bytes));
    }

    let mut joined = String::new();
    for value in values {
        if let StringValue::Str(chunk) = value {
            joined.push_str(&chunk);
        }
    }
    Ok(StringValue::Str(joined))
}

/// `None` when an escape is malformed.
fn decode_str(raw: &str, is_raw: bool) -> Option<String> {
    if is_raw {
        return Some(raw.to_string());
    }
    Some(
        unescape(raw, true)?
            .into_iter()
            .map(|code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

fn decode_bytes(raw: &str, is_raw: bool, node: Node<'_>) -> Result<Vec<u8>, ExtractError> {
    let codes: Vec<u32> = if is_raw {
        raw.chars().map(|c| c as u32).collect()
    } else {
        unescape(raw, false).ok_or_else(|| super::syntax_error(node))?
    };
    codes
        .into_iter()
        .map(|code| u8::try_from(code).map_err(|_| super::syntax_error(node)))
        .collect()
}

/// Resolve backslash escapes into code points. `\u`, `\U` and `\N{}` are
/// only escapes in text literals. A truncated hex escape yields `None`.
fn unescape(raw: &str, text: bool) -> Option<Vec<u32>> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c as u32);
            i += 1;
            continue;
        }
        let next = chars[i + 1];
        i += 2;
        match next {
            '\n' => {}
            '\r' => {
                if chars.get(i) == Some(&'\n') {
                    i += 1;
                }
            }
            '\\' | '\'' | '"' => out.push(next as u32),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(0x0a),
            'r' => out.push(0x0d),
            't' => out.push(0x09),
            'v' => out.push(0x0b),
            '0'..='7' => {
                let mut value = next as u32 - '0' as u32;
                let mut digits = 1;
                while digits < 3 && i < chars.len() && ('0'..='7').contains(&chars[i]) {
                    value = value * 8 + (chars[i] as u32 - '0' as u32);
                    i += 1;
                    digits += 1;
                }
                out.push(value);
            }
            'x' => out.push(hex_escape(&chars, &mut i, 2)?),
            'u' if text => out.push(hex_escape(&chars, &mut i, 4)?),
            'U' if text => out.push(hex_escape(&chars, &mut i, 8)?),
            other => {
                out.push('\\' as u32);
                out.push(other as u32);
            }
        }
    }
    Some(out)
}

/// Exactly `width` hex digits, as Python requires.
fn hex_escape(chars: &[char], i: &mut usize, width: usize) -> Option<u32> {
    let digits: String = chars.iter().skip(*i).take(width).collect();
    if digits.len() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(&digits, 16).ok()?;
    *i += width;
    Some(value)
}

/// `repr(b"...")`.
pub fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            _ if b as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push(quote);
    out
}

/// `str()` of a number, boolean, `None` or `...` literal. `None` for number
/// spellings only Python 2 accepts.
pub fn literal_repr(kind: &str, text: &str) -> Option<String> {
    match kind {
        "true" => Some("True".to_string()),
        "false" => Some("False".to_string()),
        "none" => Some("None".to_string()),
        "ellipsis" => Some("Ellipsis".to_string()),
        "integer" | "float" => number_repr(text),
        _ => Some(text.to_string()),
    }
}

fn number_repr(text: &str) -> Option<String> {
    let cleaned = text.replace('_', "").to_ascii_lowercase();
    // `10L` longs and `0777` octals.
    if cleaned.ends_with('l') || is_legacy_octal(&cleaned) {
        return None;
    }

    if let Some(imaginary) = cleaned.strip_suffix('j') {
        return Some(match imaginary.parse::<f64>() {
            Ok(value) => {
                let repr = float_repr(value);
                format!("{}j", repr.strip_suffix(".0").unwrap_or(&repr))
            }
            Err(_) => cleaned,
        });
    }

    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| cleaned.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        return Some(
            u128::from_str_radix(digits, radix)
                .map(|value| value.to_string())
                .unwrap_or(cleaned),
        );
    }

    if cleaned.contains(['.', 'e']) {
        return Some(cleaned.parse::<f64>().map(float_repr).unwrap_or(cleaned));
    }

    Some(
        cleaned
            .parse::<u128>()
            .map(|value| value.to_string())
            .unwrap_or(cleaned),
    )
}

/// A decimal integer with a leading zero that is not all zeros.
fn is_legacy_octal(cleaned: &str) -> bool {
    cleaned.len() > 1
        && cleaned.starts_with('0')
        && cleaned.bytes().all(|b| b.is_ascii_digit())
        && cleaned.bytes().any(|b| b != b'0')
}

/// `repr(float)`: shortest round-trip digits, exponent form below 1e-4 and
/// from 1e16 on, with a signed two-digit exponent.
pub fn float_repr(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => debug,
    }
}
