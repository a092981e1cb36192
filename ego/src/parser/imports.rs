use std::ops::Range;

use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The import-only view of a header file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    /// Name from the package clause.
    pub package: String,
    /// Import specs in file order, duplicates included.
    pub imports: Vec<ImportSpec>,
    /// Offset of the first token after the import declarations, if any.
    pub rest: Option<usize>,
}

/// A single import spec: `[alias] "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name, `.` or `_`, when given.
    pub alias: Option<String>,
    /// The decoded import path.
    pub path: String,
    /// The path literal exactly as written, quotes included.
    pub literal: String,
    pub span: Range<usize>,
}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Whether `name` lexes as exactly one identifier token.
///
/// Keywords and the blank identifier pass; the package clause grammar
/// rejects those itself.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Whether `path` is acceptable as an import path: non-empty, graphic,
/// and free of spaces and reserved punctuation.
pub fn is_valid_import_path(path: &str) -> bool {
    const ILLEGAL: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{fffd}";
    !path.is_empty()
        && path
            .chars()
            .all(|c| !c.is_control() && !c.is_whitespace() && !ILLEGAL.contains(c))
}

pub(crate) fn parse_import_file(source: &str, file_id: usize) -> Result<ImportFile, ParseError> {
    let mut parser = ImportParser {
        lexer: Lexer::new(source, file_id),
        file_id,
    };
    parser.parse_file()
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str { literal: String, value: String },
    LParen,
    RParen,
    Dot,
    /// `;`, or a newline/EOF where a semicolon is inserted.
    Semi { implicit: bool },
    Other(char),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{}'", name),
            Token::Str { literal, .. } => literal.clone(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Semi { implicit: true } => "newline".to_string(),
            Token::Semi { implicit: false } => "';'".to_string(),
            Token::Other(c) => format!("'{}'", c),
            Token::Eof => "EOF".to_string(),
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    file_id: usize,
    /// Set after tokens that end a statement at a line break.
    insert_semi: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        Lexer {
            source,
            offset: 0,
            file_id,
            insert_semi: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>, span: Range<usize>) -> ParseError {
        ParseError::error(message, span, self.file_id)
    }

    fn next_token(&mut self) -> Result<(Token, Range<usize>), ParseError> {
        loop {
            let start = self.offset;
            let Some(c) = self.peek() else {
                if std::mem::take(&mut self.insert_semi) {
                    return Ok((Token::Semi { implicit: true }, start..start));
                }
                return Ok((Token::Eof, start..start));
            };

            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    if std::mem::take(&mut self.insert_semi) {
                        return Ok((Token::Semi { implicit: true }, start..self.offset));
                    }
                }
                '/' if self.peek_second() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '/' if self.peek_second() == Some('*') => {
                    let body_start = start + 2;
                    let Some(len) = self.source[body_start..].find("*/") else {
                        self.offset = self.source.len();
                        return Err(self.error("comment not terminated", start..start + 2));
                    };
                    self.offset = body_start + len + 2;
                    let spans_lines = self.source[body_start..body_start + len].contains('\n');
                    if spans_lines && std::mem::take(&mut self.insert_semi) {
                        return Ok((Token::Semi { implicit: true }, start..self.offset));
                    }
                }
                '"' => return self.interpreted_string(),
                '`' => return self.raw_string(),
                c if c == '_' || c.is_alphabetic() => {
                    while self.peek().is_some_and(|c| c == '_' || c.is_alphanumeric()) {
                        self.bump();
                    }
                    let name = &self.source[start..self.offset];
                    self.insert_semi = !is_keyword(name)
                        || matches!(name, "break" | "continue" | "fallthrough" | "return");
                    return Ok((Token::Ident(name.to_string()), start..self.offset));
                }
                _ => {
                    self.bump();
                    let token = match c {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        '.' => Token::Dot,
                        ';' => Token::Semi { implicit: false },
                        other => Token::Other(other),
                    };
                    self.insert_semi = matches!(token, Token::RParen);
                    return Ok((token, start..self.offset));
                }
            }
        }
    }

    fn interpreted_string(&mut self) -> Result<(Token, Range<usize>), ParseError> {
        let start = self.offset;
        self.bump();
        let mut value: Vec<u8> = Vec::new();
        loop {
            let escape_start = self.offset;
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error("string literal not terminated", start..escape_start));
                }
                Some('"') => break,
                Some('\\') => self.escape(&mut value, escape_start)?,
                Some(c) => {
                    let mut utf8 = [0u8; 4];
                    value.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
        self.insert_semi = true;
        Ok((
            Token::Str {
                literal: self.source[start..self.offset].to_string(),
                value: String::from_utf8_lossy(&value).into_owned(),
            },
            start..self.offset,
        ))
    }

    fn escape(&mut self, value: &mut Vec<u8>, start: usize) -> Result<(), ParseError> {
        let simple = match self.peek() {
            Some('a') => Some(0x07),
            Some('b') => Some(0x08),
            Some('f') => Some(0x0c),
            Some('n') => Some(b'\n'),
            Some('r') => Some(b'\r'),
            Some('t') => Some(b'\t'),
            Some('v') => Some(0x0b),
            Some('\\') => Some(b'\\'),
            Some('"') => Some(b'"'),
            _ => None,
        };
        if let Some(byte) = simple {
            self.bump();
            value.push(byte);
            return Ok(());
        }

        let (radix, digits) = match self.peek() {
            Some('0'..='7') => (8, 3),
            Some('x') => (16, 2),
            Some('u') => (16, 4),
            Some('U') => (16, 8),
            _ => {
                self.bump();
                return Err(self.error("unknown escape sequence", start..self.offset));
            }
        };
        let prefixed = radix == 16;
        if prefixed {
            self.bump();
        }
        let digits_start = self.offset;
        for _ in 0..digits {
            match self.peek() {
                Some(c) if c.is_digit(radix) => {
                    self.bump();
                }
                _ => {
                    return Err(
                        self.error("illegal character in escape sequence", start..self.offset)
                    );
                }
            }
        }
        let text = &self.source[digits_start..self.offset];
        let invalid =
            || self.error("escape sequence is invalid Unicode code point", start..self.offset);
        let code = u32::from_str_radix(text, radix).map_err(|_| invalid())?;
        if digits <= 3 {
            let byte = u8::try_from(code)
                .map_err(|_| self.error("octal escape value > 255", start..self.offset))?;
            value.push(byte);
        } else {
            let c = char::from_u32(code).ok_or_else(invalid)?;
            let mut utf8 = [0u8; 4];
            value.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
        Ok(())
    }

    fn raw_string(&mut self) -> Result<(Token, Range<usize>), ParseError> {
        let start = self.offset;
        self.bump();
        let Some(len) = self.source[self.offset..].find('`') else {
            self.offset = self.source.len();
            return Err(self.error("raw string literal not terminated", start..start + 1));
        };
        let value = self.source[self.offset..self.offset + len].replace('\r', "");
        self.offset += len + 1;
        self.insert_semi = true;
        Ok((
            Token::Str {
                literal: self.source[start..self.offset].to_string(),
                value,
            },
            start..self.offset,
        ))
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct ImportParser<'a> {
    lexer: Lexer<'a>,
    file_id: usize,
}

impl ImportParser<'_> {
    fn next(&mut self) -> Result<(Token, Range<usize>), ParseError> {
        self.lexer.next_token()
    }

    fn unexpected(&self, expected: &str, found: &Token, span: Range<usize>) -> ParseError {
        ParseError::error(
            format!("expected {}, found {}", expected, found.describe()),
            span,
            self.file_id,
        )
    }

    fn parse_file(&mut self) -> Result<ImportFile, ParseError> {
        let (token, span) = self.next()?;
        if token != Token::Ident("package".to_string()) {
            return Err(self.unexpected("'package'", &token, span));
        }

        let package = match self.next()? {
            (Token::Ident(name), span) if name == "_" => {
                return Err(ParseError::error("invalid package name _", span, self.file_id));
            }
            (Token::Ident(name), span) if is_keyword(&name) => {
                return Err(self.unexpected("package name", &Token::Ident(name), span));
            }
            (Token::Ident(name), _) => name,
            (token, span) => return Err(self.unexpected("package name", &token, span)),
        };
        self.expect_semi()?;

        let mut imports = Vec::new();
        let rest = loop {
            match self.next()? {
                (Token::Eof, _) => break None,
                (Token::Semi { .. }, _) => continue,
                (Token::Ident(kw), _) if kw == "import" => {
                    self.parse_import_decl(&mut imports)?;
                    self.expect_semi()?;
                }
                (_, span) => break Some(span.start),
            }
        };

        Ok(ImportFile {
            package,
            imports,
            rest,
        })
    }

    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            (Token::Semi { .. } | Token::Eof, _) => Ok(()),
            (token, span) => Err(self.unexpected("';'", &token, span)),
        }
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        let (token, span) = self.next()?;
        if token != Token::LParen {
            imports.push(self.parse_spec(token, span)?);
            return Ok(());
        }

        loop {
            match self.next()? {
                (Token::RParen, _) => return Ok(()),
                (Token::Semi { .. }, _) => continue,
                (Token::Eof, span) => return Err(self.unexpected("')'", &Token::Eof, span)),
                (token, span) => {
                    imports.push(self.parse_spec(token, span)?);
                    match self.next()? {
                        (Token::Semi { .. }, _) => {}
                        (Token::RParen, _) => return Ok(()),
                        (token, span) => return Err(self.unexpected("';' or ')'", &token, span)),
                    }
                }
            }
        }
    }

    fn parse_spec(
        &mut self,
        first: Token,
        first_span: Range<usize>,
    ) -> Result<ImportSpec, ParseError> {
        let start = first_span.start;
        let (alias, token, span) = match first {
            Token::Ident(name) if is_keyword(&name) => {
                return Err(self.unexpected("import path", &Token::Ident(name), first_span));
            }
            Token::Ident(name) => {
                let (token, span) = self.next()?;
                (Some(name), token, span)
            }
            Token::Dot => {
                let (token, span) = self.next()?;
                (Some(".".to_string()), token, span)
            }
            token => (None, token, first_span),
        };

        let (literal, value) = match token {
            Token::Str { literal, value } => (literal, value),
            token => return Err(self.unexpected("import path", &token, span)),
        };
        if !is_valid_import_path(&value) {
            return Err(ParseError::error(
                format!("invalid import path: {}", literal),
                span,
                self.file_id,
            ));
        }

        Ok(ImportSpec {
            alias,
            path: value,
            literal,
            span: start..span.end,
        })
    }
}
