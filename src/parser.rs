//! Recursive-descent parser building a [`Value`] tree from tokens.
//!
//! ```text
//! document     ::= { statement }
//! statement    ::= header | key "=" value | NEWLINE
//! header       ::= "[" key { "." key } "]"
//! value        ::= STRING | NUMBER | DATE | "true" | "false" | array | inline-table
//! array        ::= "[" [ value { "," value } [ "," ] ] "]"
//! inline-table ::= "{" [ key "=" value { "," key "=" value } [ "," ] ] "}"
//! ```
//!
//! Newlines may appear anywhere inside the brackets of an array or the braces
//! of an inline table.
//!
//! A header opens a section that receives every following key until the
//! next header. Header paths are always resolved from the document root.

use crate::lexer::{Lexer, Token, TokenKind};
use crate::{Datetime, Error, Map, Result, Value};
use log::trace;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token();
        Parser { lexer, token }
    }

    fn advance(&mut self) {
        self.token = self.lexer.next_token();
    }

    fn error(&self, msg: impl Into<String>) -> Error {
        Error::parse(self.token.line, self.token.col, msg)
    }

    fn unexpected(&self, expected: &str) -> Error {
        self.error(format!(
            "expected {}, found {}",
            expected,
            self.found()
        ))
    }

    fn found(&self) -> String {
        if self.token.kind == TokenKind::Eof && self.lexer.unterminated_string() {
            return "unterminated string".to_string();
        }
        match self.token.kind {
            TokenKind::String | TokenKind::Number | TokenKind::Date => {
                format!("{} `{}`", self.token.kind.describe(), self.token.lexeme)
            }
            kind => kind.describe().to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.token.kind != kind {
            return Err(self.unexpected(kind.describe()));
        }
        self.advance();
        Ok(())
    }

    fn skip_newlines(&mut self) {
        while self.token.kind == TokenKind::Newline {
            self.advance();
        }
    }

    /// Parses the whole input into the root table.
    pub fn parse_document(&mut self) -> Result<Map> {
        let mut root = Map::new();
        let mut section: Vec<String> = Vec::new();

        loop {
            match self.token.kind {
                TokenKind::Eof => {
                    if self.lexer.unterminated_string() {
                        return Err(self.error("unterminated string"));
                    }
                    if let Some(ch) = self.lexer.rest().chars().next() {
                        return Err(self.error(format!("unexpected character `{}`", ch)));
                    }
                    break;
                }
                TokenKind::Newline => self.advance(),
                TokenKind::LBracket => {
                    let (line, col) = (self.token.line, self.token.col);
                    self.advance();
                    let path = self.parse_table_path()?;
                    self.expect(TokenKind::RBracket)?;
                    descend(&mut root, &path, line, col)?;
                    trace!("entering table [{}]", path.join("."));
                    section = path;
                }
                TokenKind::String => {
                    let (line, col) = (self.token.line, self.token.col);
                    let key = self.parse_key()?;
                    self.expect(TokenKind::Equals)?;
                    let value = self.parse_value()?;
                    descend(&mut root, &section, line, col)?.insert(key, value);
                    self.skip_newlines();
                }
                _ => return Err(self.error(format!("unexpected token: {}", self.found()))),
            }
        }

        Ok(root)
    }

    fn parse_key(&mut self) -> Result<String> {
        if self.token.kind != TokenKind::String {
            return Err(self.unexpected("a key"));
        }
        let key = unescape(self.token.lexeme);
        self.advance();
        Ok(key)
    }

    fn parse_table_path(&mut self) -> Result<Vec<String>> {
        let mut path = vec![self.parse_key().map_err(|_| self.unexpected("a table name"))?];
        while self.token.kind == TokenKind::Dot {
            self.advance();
            path.push(
                self.parse_key()
                    .map_err(|_| self.unexpected("a table name after `.`"))?,
            );
        }
        Ok(path)
    }

    fn parse_value(&mut self) -> Result<Value> {
        let token = self.token;
        match token.kind {
            TokenKind::String => {
                self.advance();
                let text = unescape(token.lexeme);
                Ok(match Datetime::parse(&text) {
                    Ok(dt) => Value::Datetime(dt),
                    Err(_) => Value::String(text),
                })
            }
            TokenKind::Number => {
                let value = parse_number(token.lexeme)
                    .ok_or_else(|| self.error(format!("invalid number `{}`", token.lexeme)))?;
                self.advance();
                Ok(value)
            }
            TokenKind::Date => {
                let dt = Datetime::parse(token.lexeme).map_err(|e| {
                    self.error(format!("malformed timestamp `{}`: {}", token.lexeme, e))
                })?;
                self.advance();
                Ok(Value::Datetime(dt))
            }
            TokenKind::True => {
                self.advance();
                Ok(Value::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Value::Boolean(false))
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_inline_table(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.advance(); // [
        self.skip_newlines();

        let mut elements = Vec::new();
        if self.token.kind == TokenKind::RBracket {
            self.advance();
            return Ok(Value::Array(elements));
        }

        loop {
            elements.push(self.parse_value()?);
            self.skip_newlines();

            match self.token.kind {
                TokenKind::RBracket => {
                    self.advance();
                    return Ok(Value::Array(elements));
                }
                TokenKind::Comma => {
                    self.advance();
                    self.skip_newlines();
                    if self.token.kind == TokenKind::RBracket {
                        self.advance();
                        return Ok(Value::Array(elements));
                    }
                }
                _ => return Err(self.unexpected("`,` or `]`")),
            }
        }
    }

    fn parse_inline_table(&mut self) -> Result<Value> {
        self.advance(); // {
        self.skip_newlines();

        let mut table = Map::new();
        if self.token.kind == TokenKind::RBrace {
            self.advance();
            return Ok(Value::InlineTable(table));
        }

        loop {
            let key = self.parse_key()?;
            self.expect(TokenKind::Equals)?;
            let value = self.parse_value()?;
            table.insert(key, value);
            self.skip_newlines();

            match self.token.kind {
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(Value::InlineTable(table));
                }
                TokenKind::Comma => {
                    self.advance();
                    self.skip_newlines();
                    if self.token.kind == TokenKind::RBrace {
                        self.advance();
                        return Ok(Value::InlineTable(table));
                    }
                }
                _ => return Err(self.unexpected("`,` or `}`")),
            }
        }
    }
}

/// Walks `path` from `table`, creating missing section tables on the way.
fn descend<'m>(
    mut table: &'m mut Map,
    path: &[String],
    line: usize,
    col: usize,
) -> Result<&'m mut Map> {
    for (i, key) in path.iter().enumerate() {
        let entry = table
            .entry(key.clone())
            .or_insert_with(|| Value::Table(Map::new()));
        table = match entry {
            Value::Table(map) => map,
            _ => {
                return Err(Error::parse(
                    line,
                    col,
                    format!(
                        "cannot use `{}` as table, it's already defined as a value",
                        path[..=i].join(".")
                    ),
                ))
            }
        };
    }
    Ok(table)
}

fn parse_number(lexeme: &str) -> Option<Value> {
    if lexeme.contains(['.', 'e', 'E']) {
        lexeme.parse::<f64>().ok().map(Value::Float)
    } else {
        lexeme.parse::<i64>().ok().map(Value::Integer)
    }
}

/// Resolves the escapes the encoder writes. Unknown escapes are kept as-is.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Parses `input` into the root table of the document.
pub fn parse_str(input: &str) -> Result<Map> {
    Parser::new(input).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Integer(i)
    }

    #[test]
    fn test_scalars() {
        let root = parse_str("s = \"abc\"\ni = 3\nf = 3.5\nb = true\nn = false\n").unwrap();
        assert_eq!(root.get("s"), Some(&Value::from("abc")));
        assert_eq!(root.get("i"), Some(&int(3)));
        assert_eq!(root.get("f"), Some(&Value::Float(3.5)));
        assert_eq!(root.get("b"), Some(&Value::Boolean(true)));
        assert_eq!(root.get("n"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_bare_string_value() {
        let root = parse_str("env = local").unwrap();
        assert_eq!(root.get("env"), Some(&Value::from("local")));
    }

    #[test]
    fn test_section_header() {
        let root = parse_str("[nested]\nvalue = 1\n").unwrap();
        let nested = root.get("nested").unwrap();
        assert!(matches!(nested, Value::Table(_)));
        assert_eq!(nested.get("value"), Some(&int(1)));
    }

    #[test]
    fn test_header_scopes_until_next_header() {
        let root = parse_str("top = 0\n[a]\nx = 1\n\ny = 2\n[b]\nz = 3\n").unwrap();
        let keys: Vec<_> = root.keys().cloned().collect();
        assert_eq!(keys, vec!["top", "a", "b"]);
        assert_eq!(root.get("a").unwrap().get("y"), Some(&int(2)));
        assert_eq!(root.get("b").unwrap().get("z"), Some(&int(3)));
    }

    #[test]
    fn test_dotted_header_creates_chain() {
        let root = parse_str("[a.b.c]\nv = 1\n[a]\nw = 2\n").unwrap();
        let a = root.get("a").unwrap();
        assert_eq!(a.get("w"), Some(&int(2)));
        let c = a.get("b").and_then(|b| b.get("c")).unwrap();
        assert_eq!(c.get("v"), Some(&int(1)));
    }

    #[test]
    fn test_table_path_conflict() {
        let err = parse_str("a = 1\n[a.b]\n").unwrap_err();
        match err {
            Error::Parse { msg, line, .. } => {
                assert_eq!(msg, "cannot use `a` as table, it's already defined as a value");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = parse_str("[a]\nb = [1]\n[a.b.c]\n").unwrap_err();
        assert!(err.to_string().contains("`a.b`"));
    }

    #[test]
    fn test_header_on_inline_table_conflicts() {
        assert!(parse_str("t = { x = 1 }\n[t]\n").is_err());
    }

    #[test]
    fn test_arrays() {
        let root = parse_str("arr = [1, 2, 3]\nempty = []\nnested = [[1], [\"a\"]]\n").unwrap();
        assert_eq!(root.get("arr"), Some(&Value::Array(vec![int(1), int(2), int(3)])));
        assert_eq!(root.get("empty"), Some(&Value::Array(vec![])));
        assert_eq!(
            root.get("nested"),
            Some(&Value::Array(vec![
                Value::Array(vec![int(1)]),
                Value::Array(vec![Value::from("a")])
            ]))
        );
    }

    #[test]
    fn test_multiline_array() {
        let root = parse_str("hosts = [\n  \"a\",\n  \"b\"\n]\nnext = 1\n").unwrap();
        assert_eq!(
            root.get("hosts"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(root.get("next"), Some(&int(1)));

        let root = parse_str("ids = [\n  1,\n  2,\n]\n").unwrap();
        assert_eq!(root.get("ids"), Some(&Value::Array(vec![int(1), int(2)])));
    }

    #[test]
    fn test_inline_table() {
        let root = parse_str("point = { x = 1, y = \"two\" }\nempty = {}\n").unwrap();
        let point = root.get("point").unwrap();
        assert!(matches!(point, Value::InlineTable(_)));
        assert_eq!(point.get("x"), Some(&int(1)));
        assert_eq!(point.get("y"), Some(&Value::from("two")));
        assert_eq!(root.get("empty"), Some(&Value::InlineTable(Map::new())));
    }

    #[test]
    fn test_timestamps() {
        let root = parse_str("a = 2024-01-15T10:30:00Z\nb = \"2024-01-15T10:30:00+02:00\"\n").unwrap();
        assert!(root.get("a").unwrap().is_datetime());
        assert!(root.get("b").unwrap().is_datetime());
    }

    #[test]
    fn test_malformed_timestamp() {
        let err = parse_str("when = 2024-13-45\n").unwrap_err();
        assert!(err.to_string().contains("malformed timestamp"));
    }

    #[test]
    fn test_negative_number_is_rejected_as_timestamp() {
        let err = parse_str("n = -5\n").unwrap_err();
        assert!(err.to_string().contains("malformed timestamp `-5`"));
    }

    #[test]
    fn test_missing_value() {
        let err = parse_str("key = \n").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("expected a value"));
    }

    #[test]
    fn test_missing_equals() {
        assert!(parse_str("key 1\n").is_err());
    }

    #[test]
    fn test_unterminated_header() {
        assert!(parse_str("[server\nport = 1\n").is_err());
        assert!(parse_str("[]\n").is_err());
        assert!(parse_str("[a.]\n").is_err());
    }

    #[test]
    fn test_unexpected_statement() {
        let err = parse_str("= 1\n").unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_unknown_character() {
        let err = parse_str("a = 1\n@b = 2\n").unwrap_err();
        assert_eq!(err, Error::parse(2, 1, "unexpected character `@`"));
    }

    #[test]
    fn test_unterminated_string_in_key_position() {
        let err = parse_str("a = 1\n\"b = 2\nc = 3\n").unwrap_err();
        assert_eq!(err, Error::parse(2, 1, "unterminated string"));
    }

    #[test]
    fn test_unterminated_string_in_value_position() {
        let err = parse_str("a = \"open\nb = 2\n").unwrap_err();
        assert_eq!(err, Error::parse(1, 5, "expected a value, found unterminated string"));
    }

    #[test]
    fn test_multiline_inline_table() {
        let root = parse_str("pool = {\n  min = 1,\n  max = 8,\n}\nnext = 2\n").unwrap();
        let pool = root.get("pool").unwrap();
        assert!(matches!(pool, Value::InlineTable(_)));
        assert_eq!(pool.get("min"), Some(&int(1)));
        assert_eq!(pool.get("max"), Some(&int(8)));
        assert_eq!(root.get("next"), Some(&int(2)));

        let root = parse_str("empty = {\n}\n").unwrap();
        assert_eq!(root.get("empty"), Some(&Value::InlineTable(Map::new())));
    }

    #[test]
    fn test_quoted_timestamp_keeps_its_text() {
        let root = parse_str("at = \"2024-01-15 10:30:00.5+00:00\"\n").unwrap();
        match root.get("at") {
            Some(Value::Datetime(dt)) => assert_eq!(dt.as_str(), "2024-01-15 10:30:00.5+00:00"),
            other => panic!("expected a timestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_unescape() {
        let root = parse_str(r#"s = "a\"b\\c\nd""#).unwrap();
        assert_eq!(root.get("s"), Some(&Value::from("a\"b\\c\nd")));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let root = parse_str("a = 1\na = 2\n").unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root.get("a"), Some(&int(2)));
    }

    #[test]
    fn test_exponent_numbers_are_floats() {
        let root = parse_str("big = 1e3\n").unwrap();
        assert_eq!(root.get("big"), Some(&Value::Float(1000.0)));
    }

    #[test]
    fn test_comments() {
        let root = parse_str("# config\n[server] # the server\nport = 80 # http\n").unwrap();
        assert_eq!(root.get("server").unwrap().get("port"), Some(&int(80)));
    }
}
