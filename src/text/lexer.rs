//! Tokenizer for FDO source text (`spec.md` §4.2, §6).

use crate::error::{Error, ErrorKind, Position};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    AtomName(String),
    Identifier(String),
    Number(i64),
    /// Raw `T-I` / `T-S-I` text, parsed into an [`crate::gid::FdoGid`] downstream.
    Gid(String),
    /// Hex digits, without the trailing `x`/`X`.
    Hex(String),
    String(String),
    AngleOpen,
    AngleClose,
    Comma,
    Pipe,
    Newline,
    Eof,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexedToken {
    pub token: Token,
    pub pos: Position,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { chars: src.char_indices().peekable(), src, line: 1, column: 1 }
    }

    /// Tokenizes the entire source, ending with a single [`Token::Eof`].
    pub fn tokenize(src: &'a str) -> crate::error::Result<Vec<LexedToken>> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn next_token(&mut self) -> crate::error::Result<LexedToken> {
        loop {
            match self.peek_char() {
                None => return Ok(LexedToken { token: Token::Eof, pos: self.pos() }),
                Some('\n') => {
                    let pos = self.pos();
                    self.bump();
                    return Ok(LexedToken { token: Token::Newline, pos });
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some(';') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }

        let pos = self.pos();
        let c = self.peek_char().expect("checked above");

        match c {
            '<' => {
                self.bump();
                Ok(LexedToken { token: Token::AngleOpen, pos })
            }
            '>' => {
                self.bump();
                Ok(LexedToken { token: Token::AngleClose, pos })
            }
            ',' => {
                self.bump();
                Ok(LexedToken { token: Token::Comma, pos })
            }
            '|' => {
                self.bump();
                Ok(LexedToken { token: Token::Pipe, pos })
            }
            '"' => self.lex_string(pos),
            '-' if self.is_signed_number_start() => self.lex_number(pos),
            c if c.is_ascii_digit() => self.lex_digit_run(pos),
            c if c == '_' || c.is_alphabetic() => self.lex_word(pos),
            other => Err(Error::at(
                ErrorKind::BadArgumentFormat,
                pos,
                format!("unexpected character '{other}'"),
            )),
        }
    }

    /// A `-` starts a negative number only when immediately followed by a digit; GIDs never
    /// start with `-` (`spec.md` §6's `NUMBER`/`GID` lexical grammar).
    fn is_signed_number_start(&mut self) -> bool {
        let mut clone = self.chars.clone();
        clone.next();
        matches!(clone.peek(), Some((_, c)) if c.is_ascii_digit())
    }

    fn lex_string(&mut self, pos: Position) -> crate::error::Result<LexedToken> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(Error::at(ErrorKind::MissingQuote, pos, "unterminated string literal"));
                }
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => out.push(other),
                    None => {
                        return Err(Error::at(ErrorKind::MissingQuote, pos, "unterminated string literal"));
                    }
                },
                Some(c) => out.push(c),
            }
        }
        Ok(LexedToken { token: Token::String(out), pos })
    }

    fn lex_word(&mut self, pos: Position) -> crate::error::Result<LexedToken> {
        let mut raw = String::new();
        let mut has_underscore = false;
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                if c == '_' {
                    has_underscore = true;
                }
                raw.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let token = if has_underscore { Token::AtomName(raw) } else { Token::Identifier(raw) };
        Ok(LexedToken { token, pos })
    }

    /// A pure decimal run: `-?[0-9]+`.
    fn lex_number(&mut self, pos: Position) -> crate::error::Result<LexedToken> {
        let mut raw = String::new();
        if self.peek_char() == Some('-') {
            raw.push('-');
            self.bump();
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                raw.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let value = raw
            .parse::<i64>()
            .map_err(|_| Error::at(ErrorKind::BadNumberFormat(raw.clone()), pos, format!("invalid number '{raw}'")))?;
        Ok(LexedToken { token: Token::Number(value), pos })
    }

    /// Reads a maximal alnum/`-` run starting at a digit and classifies it as `HEX`, `GID`, or
    /// `NUMBER` per `spec.md` §6.
    fn lex_digit_run(&mut self, pos: Position) -> crate::error::Result<LexedToken> {
        let mut raw = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '-' {
                raw.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if raw.ends_with('x') || raw.ends_with('X') {
            let digits = &raw[..raw.len() - 1];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(LexedToken { token: Token::Hex(digits.to_owned()), pos });
            }
        }

        if raw.contains('-') {
            let segments: Vec<&str> = raw.split('-').collect();
            if segments.len() >= 2 && segments.iter().all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())) {
                return Ok(LexedToken { token: Token::Gid(raw), pos });
            }
        }

        if raw.chars().all(|c| c.is_ascii_digit()) {
            let value = raw
                .parse::<i64>()
                .map_err(|_| Error::at(ErrorKind::BadNumberFormat(raw.clone()), pos, format!("invalid number '{raw}'")))?;
            return Ok(LexedToken { token: Token::Number(value), pos });
        }

        Err(Error::at(ErrorKind::BadArgumentFormat, pos, format!("malformed literal '{raw}'")))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn toks(src: &str) -> Vec<Token> {
        Lexer::tokenize(src).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn atom_name_vs_identifier() {
        assert_eq!(toks("uni_start_stream"), vec![Token::AtomName("uni_start_stream".into()), Token::Eof]);
        assert_eq!(toks("vcf"), vec![Token::Identifier("vcf".into()), Token::Eof]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(toks(r#""a\nb\"c""#), vec![Token::String("a\nb\"c".into()), Token::Eof]);
    }

    #[test]
    fn unterminated_string_is_missing_quote() {
        let err = Lexer::tokenize("\"unterminated").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingQuote));
    }

    #[test]
    fn hex_value() {
        assert_eq!(toks("1Ax"), vec![Token::Hex("1A".into()), Token::Eof]);
    }

    #[test]
    fn gid_requires_two_segments() {
        assert_eq!(toks("32-105"), vec![Token::Gid("32-105".into()), Token::Eof]);
        assert_eq!(toks("1-0-21029"), vec![Token::Gid("1-0-21029".into()), Token::Eof]);
    }

    #[test]
    fn negative_number_is_not_a_gid() {
        assert_eq!(toks("-5"), vec![Token::Number(-5), Token::Eof]);
    }

    #[test]
    fn comment_is_dropped() {
        assert_eq!(toks("; a comment\nfoo"), vec![Token::Newline, Token::Identifier("foo".into()), Token::Eof]);
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            toks("<,|>"),
            vec![Token::AngleOpen, Token::Comma, Token::Pipe, Token::AngleClose, Token::Eof]
        );
    }
}
