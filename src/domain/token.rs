//! Token normalization and line encoding.
//!
//! Commas separate the three fields of a path context and spaces separate
//! contexts, so neither may survive inside a token.

/// Placeholder substituted for endpoints that repeat the function's own name.
pub const METHOD_NAME_PLACEHOLDER: &str = "METHOD_NAME";

/// Split camel/Pascal case into lowercase `_`-joined words.
///
/// A boundary is inserted before every run of ASCII capitals and before every
/// capitalized word, so `HTTPServer` becomes `http_server`.
pub fn to_snake_case(token: &str) -> String {
    let mut spaced = String::with_capacity(token.len() + 8);
    let mut prev_upper = false;
    for c in token.chars() {
        let upper = c.is_ascii_uppercase();
        if upper && !prev_upper {
            spaced.push(' ');
        }
        spaced.push(c);
        prev_upper = upper;
    }

    let chars: Vec<char> = spaced.chars().collect();
    let mut words = String::with_capacity(chars.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()) {
            words.push(' ');
            words.push(c);
            i += 1;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                words.push(chars[i]);
                i += 1;
            }
        } else {
            words.push(c);
            i += 1;
        }
    }

    words
        .split_whitespace()
        .map(|word| word.trim_matches('_').to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Canonical multi-word form of an identifier: `getHTTPResponse_2` becomes
/// `get|http|response`.
pub fn clean(token: &str) -> String {
    let snake = to_snake_case(token);
    let mut out = String::with_capacity(snake.len());
    let mut in_run = false;
    for c in snake.chars() {
        if c.is_ascii_digit() || c == '_' || c == ',' {
            if !in_run {
                out.push('|');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out.trim_matches('|').to_string()
}

/// Escape `text` into printable single-line ASCII.
///
/// Backslash and `\t`, `\n`, `\r` get two-character escapes; other control
/// and Latin-1 characters become `\xNN`, the rest of the BMP `\uNNNN` and
/// everything above `\UNNNNNNNN`.
pub fn unicode_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' '..='~' => out.push(c),
            _ => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
        }
    }
    out
}

/// Leaf value for a literal whose `str()` form is `repr`.
pub fn encode_literal(repr: &str) -> String {
    unicode_escape(repr).replace(' ', "")
}

/// Replace every context endpoint equal to the line's leading name with
/// [`METHOD_NAME_PLACEHOLDER`].
///
/// Lines whose name cleaned down to nothing are returned untouched; an empty
/// name would otherwise mask every empty literal token.
pub fn mask_method_name(line: &str) -> String {
    let (body, newline) = match line.strip_suffix('\n') {
        Some(body) => (body, "\n"),
        None => (line, ""),
    };
    let Some((name, contexts)) = body.split_once(' ') else {
        return line.to_string();
    };
    if name.is_empty() {
        return line.to_string();
    }

    let masked: Vec<String> = contexts
        .split(' ')
        .map(|context| mask_context(context, name))
        .collect();
    format!("{name} {}{newline}", masked.join(" "))
}

fn mask_context(context: &str, name: &str) -> String {
    let mut fields = context.splitn(3, ',');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(start), Some(path), Some(end)) => {
            let start = if start == name { METHOD_NAME_PLACEHOLDER } else { start };
            let end = if end == name { METHOD_NAME_PLACEHOLDER } else { end };
            format!("{start},{path},{end}")
        }
        _ => context.to_string(),
    }
}
