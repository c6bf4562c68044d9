//! Statement grammar for code-mode scripts.
//!
//! One call per line: `name(arg, ...)` with JSON arguments, `#` or `//`
//! comments, optional trailing semicolon. Everything is parsed for real;
//! a malformed line is a per-line error fed back to the model, never a
//! guess about what it meant.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub args: Vec<Value>,
    /// 1-based source line, for error messages.
    pub line: usize,
}

pub fn parse_script(source: &str) -> Result<Vec<Statement>, String> {
    let mut statements = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        statements.push(parse_statement(line, line_no)?);
    }
    Ok(statements)
}

fn parse_statement(line: &str, line_no: usize) -> Result<Statement, String> {
    let open = line.find('(').ok_or_else(|| {
        format!(
            "line {}: expected a call like name(...), got '{}'",
            line_no, line
        )
    })?;

    let name = line[..open].trim();
    if !is_identifier(name) {
        return Err(format!(
            "line {}: '{}' is not a valid function name",
            line_no, name
        ));
    }

    let rest = line[open + 1..].trim_end();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    let inner = rest.strip_suffix(')').ok_or_else(|| {
        format!("line {}: missing closing ')' in call to {}", line_no, name)
    })?;

    let mut args = Vec::new();
    for piece in split_top_level(inner, line_no)? {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err(format!("line {}: empty argument in call to {}", line_no, name));
        }
        let value: Value = serde_json::from_str(piece).map_err(|e| {
            format!(
                "line {}: argument '{}' is not valid JSON ({}); strings need double quotes",
                line_no, piece, e
            )
        })?;
        args.push(value);
    }

    Ok(Statement {
        name: name.to_string(),
        args,
        line: line_no,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits an argument list on commas outside strings, objects, and arrays.
fn split_top_level(inner: &str, line_no: usize) -> Result<Vec<&str>, String> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0usize;

    for (pos, ch) in inner.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&inner[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return Err(format!("line {}: unbalanced brackets in arguments", line_no));
        }
    }
    if in_string {
        return Err(format!("line {}: unterminated string in arguments", line_no));
    }
    if depth != 0 {
        return Err(format!("line {}: unbalanced brackets in arguments", line_no));
    }

    let tail = &inner[start..];
    if !tail.trim().is_empty() || !pieces.is_empty() {
        pieces.push(tail);
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_no_arg_call() {
        let statements = parse_script("servers()").unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].name, "servers");
        assert!(statements[0].args.is_empty());
    }

    #[test]
    fn parses_object_argument_with_nested_commas() {
        let statements =
            parse_script(r#"get_current_time({"timezone": "Europe/Amsterdam", "format": "24h"})"#)
                .unwrap();
        assert_eq!(statements[0].args.len(), 1);
        assert_eq!(statements[0].args[0]["timezone"], "Europe/Amsterdam");
    }

    #[test]
    fn parses_multiple_arguments() {
        let statements = parse_script(r#"describe("time", "get_current_time")"#).unwrap();
        assert_eq!(
            statements[0].args,
            vec![json!("time"), json!("get_current_time")]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let source = "# find the server\n\n// then list it\nservers()\n";
        let statements = parse_script(source).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 4);
    }

    #[test]
    fn allows_trailing_semicolon() {
        let statements = parse_script(r#"index("time");"#).unwrap();
        assert_eq!(statements[0].args, vec![json!("time")]);
    }

    #[test]
    fn rejects_unquoted_strings() {
        let err = parse_script("index(time)").unwrap_err();
        assert!(err.contains("strings need double quotes"), "{}", err);
    }

    #[test]
    fn rejects_non_call_lines() {
        let err = parse_script("import os").unwrap_err();
        assert!(err.contains("expected a call"), "{}", err);
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        let err = parse_script(r#"dispatch("time", "x", {"a": [1, 2})"#).unwrap_err();
        assert!(err.contains("unbalanced"), "{}", err);
    }

    #[test]
    fn comma_inside_string_is_not_a_separator() {
        let statements = parse_script(r#"echo({"text": "a, b, c"})"#).unwrap();
        assert_eq!(statements[0].args.len(), 1);
        assert_eq!(statements[0].args[0]["text"], "a, b, c");
    }
}
