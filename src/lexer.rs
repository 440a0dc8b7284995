//! Tokenizer for tomlet documents.
//!
//! The [`Lexer`] hands out one [`Token`] at a time until it reaches
//! [`TokenKind::Eof`]. It never fails: characters it does not recognize, and
//! strings that are never closed, simply end the token stream. The parser
//! asks [`Lexer::rest`] and [`Lexer::unterminated_string`] why the stream
//! ended and reports the problem at that point.

/// The different kinds of tokens the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input, or input the lexer could not make sense of.
    Eof,
    /// A quoted string (raw contents between the quotes) or a bare identifier.
    String,
    /// A run of digits with optional `.`, `+`, `e`, `E`.
    Number,
    True,
    False,
    /// A number-like run that contained `T`, `Z`, `-` or `:`.
    Date,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `.`
    Dot,
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `\n`; newlines separate statements.
    Newline,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
}

impl TokenKind {
    /// Human readable description used in parse errors.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Date => "date",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Dot => "`.`",
            TokenKind::Equals => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::Newline => "newline",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
        }
    }
}

/// A token with the text it was read from and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub line: usize,
    pub col: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    unterminated: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
            unterminated: false,
        }
    }

    /// Produces the next token. Once `Eof` is returned every later call
    /// returns `Eof` as well, unless the lexer stopped on a character it
    /// could not classify.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            self.skip_whitespace();
            if self.peek_char() == Some('#') {
                self.skip_comment();
            } else {
                break;
            }
        }

        let (line, col) = (self.line, self.column);
        let start = self.position;

        let Some(c) = self.peek_char() else {
            return self.token(TokenKind::Eof, start, line, col);
        };

        let single = match c {
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '.' => Some(TokenKind::Dot),
            '=' => Some(TokenKind::Equals),
            ',' => Some(TokenKind::Comma),
            '\n' => Some(TokenKind::Newline),
            _ => None,
        };
        if let Some(kind) = single {
            self.next_char();
            return self.token(kind, start, line, col);
        }

        match c {
            '"' => self.read_string(line, col),
            '-' => self.read_number_or_date(line, col),
            c if c.is_ascii_digit() => self.read_number_or_date(line, col),
            c if c.is_alphabetic() => {
                if let Some(kind) = self.keyword() {
                    return kind;
                }
                self.read_identifier(line, col)
            }
            _ => self.token(TokenKind::Eof, start, line, col),
        }
    }

    /// Input not yet consumed. Non-empty after an `Eof` token when the lexer
    /// stopped on a character it could not classify.
    pub fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// `true` once a quoted string ran to the end of input without its
    /// closing quote. The `Eof` token returned then points at the opening quote.
    pub fn unterminated_string(&self) -> bool {
        self.unterminated
    }

    fn token(&self, kind: TokenKind, start: usize, line: usize, col: usize) -> Token<'a> {
        Token {
            kind,
            lexeme: &self.input[start..self.position],
            line,
            col,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() && ch != '\n' {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.next_char();
        }
    }

    fn read_string(&mut self, line: usize, col: usize) -> Token<'a> {
        self.next_char(); // opening quote
        let start = self.position;
        let mut prev = '"';

        while let Some(ch) = self.next_char() {
            if ch == '"' && prev != '\\' {
                let end = self.position - 1;
                return Token {
                    kind: TokenKind::String,
                    lexeme: &self.input[start..end],
                    line,
                    col,
                };
            }
            prev = ch;
        }

        self.unterminated = true;
        Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line,
            col,
        }
    }

    /// Recognizes `true` / `false` when they are not the start of a longer identifier.
    fn keyword(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.position..];
        let (word, kind) = if rest.starts_with("true") {
            ("true", TokenKind::True)
        } else if rest.starts_with("false") {
            ("false", TokenKind::False)
        } else {
            return None;
        };

        if rest[word.len()..].chars().next().is_some_and(is_ident_char) {
            return None;
        }

        let (line, col, start) = (self.line, self.column, self.position);
        for _ in 0..word.len() {
            self.next_char();
        }
        Some(self.token(kind, start, line, col))
    }

    /// Reads a number or a date. A `-` counts as a date separator, so a
    /// leading minus sign makes the whole run a `Date`; existing documents
    /// depend on that classification.
    fn read_number_or_date(&mut self, line: usize, col: usize) -> Token<'a> {
        let start = self.position;
        let mut is_date = false;

        while let Some(ch) = self.peek_char() {
            match ch {
                'T' | 'Z' | '-' | ':' => is_date = true,
                '.' | '+' | 'e' | 'E' => {}
                c if c.is_ascii_digit() => {}
                _ => break,
            }
            self.next_char();
        }

        let kind = if is_date {
            TokenKind::Date
        } else {
            TokenKind::Number
        };
        self.token(kind, start, line, col)
    }

    fn read_identifier(&mut self, line: usize, col: usize) -> Token<'a> {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if !is_ident_char(ch) {
                break;
            }
            self.next_char();
        }
        self.token(TokenKind::String, start, line, col)
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields tokens up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    fn lexemes(input: &str) -> Vec<&str> {
        Lexer::new(input).map(|t| t.lexeme).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("[]{}.=,\n"),
            vec![
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Dot,
                TokenKind::Equals,
                TokenKind::Comma,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_key_value_line() {
        assert_eq!(
            kinds("title = \"abc\"\n"),
            vec![
                TokenKind::String,
                TokenKind::Equals,
                TokenKind::String,
                TokenKind::Newline
            ]
        );
        assert_eq!(lexemes("title = \"abc\""), vec!["title", "=", "abc"]);
    }

    #[test]
    fn test_comment_is_skipped_but_newline_kept() {
        assert_eq!(
            kinds("# header comment\nx = 1 # trailing\n"),
            vec![
                TokenKind::Newline,
                TokenKind::String,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let mut lexer = Lexer::new(r#""say \"hi\"" rest"#);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.lexeme, r#"say \"hi\""#);
    }

    #[test]
    fn test_unterminated_string_is_eof() {
        let mut lexer = Lexer::new("a\n  \"never closed");
        assert_eq!(lexer.next_token().kind, TokenKind::String);
        assert_eq!(lexer.next_token().kind, TokenKind::Newline);
        assert!(!lexer.unterminated_string());

        let eof = lexer.next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.line, eof.col), (2, 3));
        assert!(lexer.unterminated_string());
        assert_eq!(lexer.rest(), "");
    }

    #[test]
    fn test_booleans_need_a_boundary() {
        assert_eq!(kinds("true false"), vec![TokenKind::True, TokenKind::False]);
        assert_eq!(kinds("trueish"), vec![TokenKind::String]);
        assert_eq!(lexemes("false_flag"), vec!["false_flag"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42 3.14 1e5 6.02E+23"), vec![TokenKind::Number; 4]);
        assert_eq!(lexemes("6.02E+23"), vec!["6.02E+23"]);
    }

    #[test]
    fn test_dates() {
        let mut lexer = Lexer::new("2024-01-15T10:30:00Z");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Date);
        assert_eq!(token.lexeme, "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_negative_number_lexes_as_date() {
        let mut lexer = Lexer::new("-5");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Date);
        assert_eq!(token.lexeme, "-5");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lexemes("http_server max-conns"), vec!["http_server", "max-conns"]);
    }

    #[test]
    fn test_unknown_character_ends_stream() {
        assert_eq!(kinds("a = @"), vec![TokenKind::String, TokenKind::Equals]);
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("a = 1\n  b = 2");
        let tokens: Vec<_> = std::iter::from_fn(|| Some(lexer.next_token()))
            .take_while(|t| t.kind != TokenKind::Eof)
            .collect();
        let b = tokens.iter().find(|t| t.lexeme == "b").unwrap();
        assert_eq!((b.line, b.col), (2, 3));
    }
}
