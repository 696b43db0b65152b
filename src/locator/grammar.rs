//! String grammar: `type[:value]([filter])*[@anchor[relation]]`.
//!
//! The grammar only splits the input into a [`RawLocator`]; every semantic
//! check happens in validation, so string and structured input fail the same
//! way.

use crate::locator::errors::{LocatorSyntaxError, SyntaxIssue};
use crate::locator::schema::{FilterValue, RawAnchor, RawLocator, RawValue, MAX_ANCHOR_DEPTH};
use std::collections::BTreeMap;

/// Bracket key that sets the index flag instead of adding a filter.
const TREAT_AS_INDEX: &str = "treat_as_index";

pub(crate) fn parse_locator_str(input: &str) -> Result<RawLocator, LocatorSyntaxError> {
    parse_nested(input, 0).map_err(|failure| match failure {
        Failure::Syntax(error) => error,
        Failure::TooDeep => too_deep(),
    })
}

pub(crate) fn too_deep() -> LocatorSyntaxError {
    LocatorSyntaxError::new(
        "anchor",
        format!("anchors nest deeper than {MAX_ANCHOR_DEPTH} levels"),
    )
}

/// Reported once at the top level instead of per nesting level.
enum Failure {
    Syntax(LocatorSyntaxError),
    TooDeep,
}

impl From<LocatorSyntaxError> for Failure {
    fn from(error: LocatorSyntaxError) -> Self {
        Failure::Syntax(error)
    }
}

fn parse_nested(input: &str, depth: usize) -> Result<RawLocator, Failure> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LocatorSyntaxError::new("locator", "locator cannot be empty").into());
    }

    let mut scanner = Scanner::new(input);
    let mut raw = RawLocator::default();

    let type_name = scanner.take_until(&[':', '[', '@']).trim();
    if type_name.is_empty() {
        return Err(LocatorSyntaxError::new(
            "type",
            "locator must specify an object type",
        )
        .into());
    }
    raw.object_type = Some(type_name.to_string());

    if scanner.eat(':') {
        scanner.skip_ws();
        if scanner.at_quote() {
            raw.value = Some(RawValue::Text(scanner.quoted()?));
        } else {
            let value = scanner.take_until(&['[', '@']).trim();
            if !value.is_empty() {
                raw.value = Some(RawValue::Text(value.to_string()));
            }
        }
    }

    let mut filters = Vec::new();
    loop {
        scanner.skip_ws();
        if !scanner.eat('[') {
            break;
        }
        let body = scanner.bracket_body()?;
        let (key, value) = parse_filter(body)?;
        if key == TREAT_AS_INDEX {
            match value {
                FilterValue::Bool(flag) => raw.treat_as_index = Some(flag),
                other => {
                    return Err(LocatorSyntaxError::new(
                        TREAT_AS_INDEX,
                        format!("expected true or false, got {other}"),
                    )
                    .into())
                }
            }
        } else {
            filters.push(BTreeMap::from([(key, value)]));
        }
    }
    raw.filters = Some(filters);

    if scanner.eat('@') {
        scanner.skip_ws();
        let anchor = if scanner.eat('{') {
            if depth >= MAX_ANCHOR_DEPTH {
                return Err(Failure::TooDeep);
            }
            let nested = scanner.brace_body()?;
            let nested = parse_nested(nested, depth + 1).map_err(|failure| match failure {
                Failure::Syntax(error) => Failure::Syntax(prefixed(error, "anchor")),
                other => other,
            })?;
            RawAnchor::Locator(Box::new(nested))
        } else if scanner.at_quote() {
            RawAnchor::Id(scanner.quoted()?)
        } else {
            RawAnchor::Id(scanner.take_until(&['[']).trim().to_string())
        };
        raw.anchor = Some(anchor);

        scanner.skip_ws();
        if scanner.eat('[') {
            let relation = scanner.bracket_body()?.trim();
            if !relation.is_empty() {
                raw.relation = Some(relation.to_string());
            }
        }
    }

    scanner.skip_ws();
    if let Some(ch) = scanner.peek() {
        return Err(scanner.error(format!("unexpected character '{ch}'")).into());
    }

    Ok(raw)
}

/// `key=value` or a bare keyword meaning `true`.
fn parse_filter(body: &str) -> Result<(String, FilterValue), LocatorSyntaxError> {
    let Some((key, value)) = body.split_once('=') else {
        let keyword = body.trim();
        if keyword.is_empty() {
            return Err(LocatorSyntaxError::new("filters", "empty filter '[]'"));
        }
        return Ok((keyword.to_string(), FilterValue::Bool(true)));
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(LocatorSyntaxError::new(
            "filters",
            format!("filter '[{body}]' has no name"),
        ));
    }

    let value = value.trim();
    let mut scanner = Scanner::new(value);
    if scanner.at_quote() {
        let text = scanner.quoted()?;
        scanner.skip_ws();
        if scanner.peek().is_some() {
            return Err(LocatorSyntaxError::new(
                format!("filters.{key}"),
                format!("unexpected text after quoted value in '[{body}]'"),
            ));
        }
        return Ok((key.to_string(), FilterValue::Text(text)));
    }

    Ok((key.to_string(), FilterValue::coerce(value)))
}

fn prefixed(mut error: LocatorSyntaxError, prefix: &str) -> LocatorSyntaxError {
    for issue in &mut error.issues {
        issue.field = format!("{prefix}.{}", issue.field);
    }
    error
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn at_quote(&self) -> bool {
        matches!(self.peek(), Some('"' | '\''))
    }

    /// Consume up to (not including) the first stop character.
    fn take_until(&mut self, stops: &[char]) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c| stops.contains(&c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Quoted string starting at the current quote character. Double quotes
    /// honor backslash escapes; single quotes are literal.
    fn quoted(&mut self) -> Result<String, LocatorSyntaxError> {
        let start = self.pos;
        let quote_char = self.bump().unwrap_or('"');
        let mut out = String::new();

        loop {
            let Some(ch) = self.bump() else {
                self.pos = start;
                return Err(self.error("unterminated quoted string"));
            };
            if ch == quote_char {
                return Ok(out);
            }
            if quote_char == '"' && ch == '\\' {
                if let Some(next) = self.bump() {
                    out.push(match next {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    continue;
                }
            }
            out.push(ch);
        }
    }

    /// Contents of a `[...]` group whose opening bracket was consumed.
    /// Brackets inside quotes do not close the group.
    fn bracket_body(&mut self) -> Result<&'a str, LocatorSyntaxError> {
        self.delimited(None, ']')
    }

    /// Contents of a `{...}` group whose opening brace was consumed.
    fn brace_body(&mut self) -> Result<&'a str, LocatorSyntaxError> {
        self.delimited(Some('{'), '}')
    }

    fn delimited(&mut self, open: Option<char>, close: char) -> Result<&'a str, LocatorSyntaxError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(ch) = self.bump() {
            match quote {
                Some(q) => {
                    if q == '"' && ch == '\\' {
                        self.bump();
                    } else if ch == q {
                        quote = None;
                    }
                }
                None if ch == '"' || ch == '\'' => quote = Some(ch),
                None if Some(ch) == open => depth += 1,
                None if ch == close => {
                    if depth == 0 {
                        let end = self.pos - close.len_utf8();
                        return Ok(&self.input[start..end]);
                    }
                    depth -= 1;
                }
                None => {}
            }
        }

        self.pos = start;
        Err(self.error(format!("missing closing '{close}'")))
    }

    fn error(&self, message: impl Into<String>) -> LocatorSyntaxError {
        LocatorSyntaxError {
            issues: vec![SyntaxIssue::new(
                "locator",
                format!("{} at position {} in '{}'", message.into(), self.pos, self.input),
            )],
        }
    }
}
