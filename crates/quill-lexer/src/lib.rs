//! Quill lexer: converts source text into tokens.
//!
//! The lexer pulls bytes from a [`Source`] on demand and produces one token
//! per call, with a single token of lookahead for the parser. Multi-character
//! operators are disambiguated longest-match-first within the same lead
//! character (`&` → `&*&` → `&&`; `=` → `=>>` → `=>` → `==` → `=`), peeking
//! at following bytes before committing to the shorter variant.

pub mod source;

pub use source::{FileSource, Source, StringSource};

use quill_syntax::error::{lex_error_at, Result};
use quill_syntax::token::{Pos, Token, TokenKind};

/// Streaming tokenizer over a byte source.
pub struct Lexer {
    src: Box<dyn Source>,
    peeked: Option<Token>,
}

impl Lexer {
    /// Create a lexer over an in-memory string.
    pub fn new(input: &str) -> Self {
        Self::from_source(Box::new(StringSource::new(input)))
    }

    /// Create a lexer over an arbitrary byte source.
    pub fn from_source(src: Box<dyn Source>) -> Self {
        Self { src, peeked: None }
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            let tok = self.scan_token()?;
            return Ok(self.peeked.insert(tok));
        }
        match &self.peeked {
            Some(tok) => Ok(tok),
            None => unreachable!("lookahead slot is filled above"),
        }
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        self.scan_token()
    }

    fn scan_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;
        let pos = self.src.pos();

        let Some(c) = self.src.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };

        let kind = match c {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.read_ident_or_keyword(),
            b'0'..=b'9' => self.read_number(pos)?,
            b'"' => self.read_string(pos)?,
            b'&' => {
                self.src.get();
                if self.src.peek() == Some(b'*') {
                    self.src.get();
                    if self.src.peek() == Some(b'&') {
                        self.src.get();
                        TokenKind::Compose
                    } else {
                        // give the '*' back; it belongs to the next token
                        self.src.unget();
                        TokenKind::Unknown("&".to_string())
                    }
                } else if self.src.peek() == Some(b'&') {
                    self.src.get();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Unknown("&".to_string())
                }
            }
            b'=' => {
                self.src.get();
                match self.src.peek() {
                    Some(b'=') => {
                        self.src.get();
                        TokenKind::EqEq
                    }
                    Some(b'>') => {
                        self.src.get();
                        if self.src.peek() == Some(b'>') {
                            self.src.get();
                            TokenKind::Bind
                        } else {
                            TokenKind::Arrow
                        }
                    }
                    _ => TokenKind::Assign,
                }
            }
            b'|' => {
                self.src.get();
                if self.src.peek() == Some(b'|') {
                    self.src.get();
                    TokenKind::OrOr
                } else {
                    TokenKind::Unknown("|".to_string())
                }
            }
            b'!' => {
                self.src.get();
                if self.src.peek() == Some(b'=') {
                    self.src.get();
                    TokenKind::NotEq
                } else {
                    // the language has no unary '!'
                    TokenKind::Unknown("!".to_string())
                }
            }
            b'<' => {
                self.src.get();
                if self.src.peek() == Some(b'=') {
                    self.src.get();
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                self.src.get();
                if self.src.peek() == Some(b'=') {
                    self.src.get();
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            b'+' => {
                self.src.get();
                TokenKind::Plus
            }
            b'-' => {
                self.src.get();
                TokenKind::Minus
            }
            b'*' => {
                self.src.get();
                TokenKind::Star
            }
            // a '/' starting '//' or '/*' was already consumed by the skip phase
            b'/' => {
                self.src.get();
                TokenKind::Slash
            }
            b'%' => {
                self.src.get();
                TokenKind::Percent
            }
            b'(' => {
                self.src.get();
                TokenKind::LParen
            }
            b')' => {
                self.src.get();
                TokenKind::RParen
            }
            b'{' => {
                self.src.get();
                TokenKind::LBrace
            }
            b'}' => {
                self.src.get();
                TokenKind::RBrace
            }
            b',' => {
                self.src.get();
                TokenKind::Comma
            }
            b';' => {
                self.src.get();
                TokenKind::Semicolon
            }
            b':' => {
                self.src.get();
                TokenKind::Colon
            }
            other => {
                self.src.get();
                TokenKind::Unknown((other as char).to_string())
            }
        };

        Ok(Token { kind, pos })
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.src.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.src.get();
                }
                Some(b'/') => {
                    let pos = self.src.pos();
                    self.src.get();
                    match self.src.peek() {
                        Some(b'/') => {
                            // line comment through the next newline or EOF
                            loop {
                                match self.src.get() {
                                    None | Some(b'\n') => break,
                                    Some(_) => {}
                                }
                            }
                        }
                        Some(b'*') => {
                            self.src.get();
                            // block comments do not nest
                            loop {
                                match self.src.get() {
                                    None => {
                                        return lex_error_at(
                                            pos.line,
                                            pos.col,
                                            "Unterminated block comment",
                                        );
                                    }
                                    Some(b'*') if self.src.peek() == Some(b'/') => {
                                        self.src.get();
                                        break;
                                    }
                                    Some(_) => {}
                                }
                            }
                        }
                        _ => {
                            // a plain '/': hand it back to the classifier
                            self.src.unget();
                            return Ok(());
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_ident_or_keyword(&mut self) -> TokenKind {
        let mut buf = String::new();
        while let Some(c) = self.src.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.src.get();
                buf.push(c as char);
            } else {
                break;
            }
        }
        match buf.as_str() {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "fun" => TokenKind::Fun,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "const" => TokenKind::Const,
            "int" => TokenKind::TyInt,
            "float" => TokenKind::TyFloat,
            "str" => TokenKind::TyStr,
            "bool" => TokenKind::TyBool,
            _ => TokenKind::Ident(buf),
        }
    }

    fn read_number(&mut self, pos: Pos) -> Result<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.src.peek() {
            if c.is_ascii_digit() {
                self.src.get();
                text.push(c as char);
            } else {
                break;
            }
        }

        let mut is_float = false;
        let mut malformed = false;

        if self.src.peek() == Some(b'.') {
            self.src.get();
            text.push('.');
            if matches!(self.src.peek(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                while let Some(c) = self.src.peek() {
                    if c.is_ascii_digit() {
                        self.src.get();
                        text.push(c as char);
                    } else {
                        break;
                    }
                }
            } else {
                // a trailing '.' with no fractional digits
                malformed = true;
            }
        }

        if matches!(self.src.peek(), Some(c) if c.is_ascii_alphabetic() || c == b'_') {
            // a letter adjoining the number
            malformed = true;
        }

        if malformed {
            // the Unknown lexeme spans the whole malformed run
            while let Some(c) = self.src.peek() {
                if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                    self.src.get();
                    text.push(c as char);
                } else {
                    break;
                }
            }
            return Ok(TokenKind::Unknown(text));
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(x) => Ok(TokenKind::Float(x)),
                Err(_) => lex_error_at(pos.line, pos.col, "Invalid float literal"),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => Ok(TokenKind::Int(n)),
                Err(_) => lex_error_at(pos.line, pos.col, "Integer literal overflow"),
            }
        }
    }

    fn read_string(&mut self, pos: Pos) -> Result<TokenKind> {
        self.src.get(); // opening quote
        let mut buf: Vec<u8> = Vec::new();
        loop {
            match self.src.get() {
                None => return lex_error_at(pos.line, pos.col, "Unterminated string literal"),
                Some(b'"') => break,
                Some(b'\\') => match self.src.get() {
                    None => return lex_error_at(pos.line, pos.col, "Unterminated escape"),
                    Some(b'n') => buf.push(b'\n'),
                    Some(b't') => buf.push(b'\t'),
                    Some(b'\\') => buf.push(b'\\'),
                    Some(b'"') => buf.push(b'"'),
                    // any other escaped byte stands for itself
                    Some(other) => buf.push(other),
                },
                Some(other) => buf.push(other),
            }
        }
        match String::from_utf8(buf) {
            Ok(s) => Ok(TokenKind::Str(s)),
            Err(_) => lex_error_at(pos.line, pos.col, "String literal is not valid UTF-8"),
        }
    }
}
