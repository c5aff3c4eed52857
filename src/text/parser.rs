//! Recursive-descent parser turning a token stream into a [`StreamNode`] (`spec.md` §4.2, §6).

use super::ast::{ArgumentNode, AtomNode, StreamNode};
use super::lexer::{Lexer, LexedToken, Token};
use crate::error::{Error, ErrorKind, Position};
use crate::table::ATOM_TABLE;

pub struct Parser {
    tokens: Vec<LexedToken>,
    pos: usize,
}

impl Parser {
    /// Tokenizes and parses a complete source string into a top-level [`StreamNode`].
    pub fn parse(src: &str) -> crate::error::Result<StreamNode> {
        let tokens = Lexer::tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let stream = parser.parse_stream_while(|t| !matches!(t, Token::Eof))?;
        Ok(stream)
    }

    fn current_pos(&self) -> Position {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].token.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Token::Newline) {
            self.advance();
        }
    }

    /// Parses atoms until `stop` no longer holds for the lookahead token (used both for the
    /// top-level stream and for a nested-stream argument's inner atoms).
    fn parse_stream_while(&mut self, stop: impl Fn(&Token) -> bool) -> crate::error::Result<StreamNode> {
        let mut atoms = Vec::new();
        loop {
            self.skip_newlines();
            if !stop(self.peek()) {
                break;
            }
            if matches!(self.peek(), Token::Eof) {
                break;
            }
            atoms.push(self.parse_atom()?);
            self.skip_newlines();
        }
        Ok(StreamNode { atoms })
    }

    fn parse_atom(&mut self) -> crate::error::Result<AtomNode> {
        let pos = self.current_pos();
        let name = match self.advance() {
            Token::AtomName(n) => n,
            other => {
                return Err(Error::at(
                    ErrorKind::BadArgumentFormat,
                    pos,
                    format!("expected an atom name, found {other:?}"),
                ));
            }
        };
        let definition = ATOM_TABLE.by_name(&name);

        let arguments = if matches!(self.peek(), Token::AngleOpen) {
            self.advance();
            self.parse_arg_block()?
        } else if looks_like_bare_argument(self.peek()) {
            return Err(Error::at(
                ErrorKind::MissingOpenBracket,
                self.current_pos(),
                "expected '<' before argument",
            ));
        } else {
            None
        };

        Ok(AtomNode { name, arguments, definition, pos })
    }

    /// Parses the contents of `< … >`, having already consumed the opening angle bracket.
    fn parse_arg_block(&mut self) -> crate::error::Result<Option<Vec<ArgumentNode>>> {
        self.skip_newlines();
        if matches!(self.peek(), Token::AngleClose) {
            self.advance();
            return Ok(None);
        }

        if let Token::AtomName(inner_name) = self.peek() {
            if ATOM_TABLE.by_name(inner_name).is_some() {
                let stream =
                    self.parse_stream_while(|t| !matches!(t, Token::AngleClose | Token::Comma))?;
                let trailing = if matches!(self.peek(), Token::Comma) {
                    self.advance();
                    self.parse_comma_list()?
                } else {
                    Vec::new()
                };
                self.expect_close()?;
                return Ok(Some(vec![ArgumentNode::NestedStream { stream, trailing }]));
            }
        }

        let args = self.parse_comma_list()?;
        self.expect_close()?;
        Ok(Some(collapse(args)))
    }

    fn expect_close(&mut self) -> crate::error::Result<()> {
        self.skip_newlines();
        match self.peek() {
            Token::AngleClose => {
                self.advance();
                Ok(())
            }
            _ => Err(Error::at(ErrorKind::MissingCloseBracket, self.current_pos(), "expected '>'")),
        }
    }

    fn parse_comma_list(&mut self) -> crate::error::Result<Vec<ArgumentNode>> {
        let mut args = vec![self.parse_arg()?];
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::Comma => {
                    self.advance();
                    self.skip_newlines();
                    args.push(self.parse_arg()?);
                }
                Token::AngleClose => break,
                _ if starts_arg(self.peek()) => {
                    return Err(Error::at(
                        ErrorKind::MissingComma,
                        self.current_pos(),
                        "expected ',' between arguments",
                    ));
                }
                _ => {
                    return Err(Error::at(ErrorKind::MissingCloseBracket, self.current_pos(), "expected '>'"));
                }
            }
        }
        Ok(args)
    }

    fn parse_arg(&mut self) -> crate::error::Result<ArgumentNode> {
        let pos = self.current_pos();
        match self.peek().clone() {
            Token::String(s) => {
                self.advance();
                Ok(ArgumentNode::String(s))
            }
            Token::Number(n) => {
                self.advance();
                Ok(ArgumentNode::Number(n))
            }
            Token::Hex(h) => {
                self.advance();
                Ok(ArgumentNode::Hex(h))
            }
            Token::Gid(g) => {
                self.advance();
                Ok(ArgumentNode::Gid(g))
            }
            Token::Identifier(s) | Token::AtomName(s) => {
                self.advance();
                let mut parts = vec![ArgumentNode::Identifier(s)];
                while matches!(self.peek(), Token::Pipe) {
                    self.advance();
                    parts.push(self.parse_pipe_operand()?);
                }
                if parts.len() == 1 {
                    Ok(parts.into_iter().next().expect("just checked len == 1"))
                } else {
                    Ok(ArgumentNode::Piped(parts))
                }
            }
            Token::AngleOpen => {
                self.advance();
                let stream = self.parse_stream_while(|t| !matches!(t, Token::AngleClose))?;
                self.expect_close()?;
                Ok(ArgumentNode::NestedStream { stream, trailing: Vec::new() })
            }
            other => Err(Error::at(ErrorKind::BadArgumentFormat, pos, format!("unexpected token {other:?}"))),
        }
    }

    fn parse_pipe_operand(&mut self) -> crate::error::Result<ArgumentNode> {
        let pos = self.current_pos();
        match self.peek().clone() {
            Token::Identifier(s) | Token::AtomName(s) => {
                self.advance();
                Ok(ArgumentNode::Identifier(s))
            }
            Token::Number(n) => {
                self.advance();
                Ok(ArgumentNode::Number(n))
            }
            other => Err(Error::at(ErrorKind::BadArgumentFormat, pos, format!("invalid pipe operand {other:?}"))),
        }
    }
}

/// A token that can only be the start of an argument, never the start of the next atom (which
/// must be an `ATOM_NAME`). Seeing one directly after an atom name with no `<` means the writer
/// forgot the opening bracket, rather than this being a second, argument-less atom.
fn looks_like_bare_argument(token: &Token) -> bool {
    matches!(
        token,
        Token::String(_) | Token::Number(_) | Token::Hex(_) | Token::Gid(_) | Token::Identifier(_)
    )
}

fn starts_arg(token: &Token) -> bool {
    matches!(
        token,
        Token::String(_)
            | Token::Number(_)
            | Token::Hex(_)
            | Token::Gid(_)
            | Token::Identifier(_)
            | Token::AtomName(_)
            | Token::AngleOpen
    )
}

/// Collapses a parsed argument list per `spec.md` §4.2 rule 2: a two-element
/// `Identifier, String` pair becomes an [`ArgumentNode::ObjectType`]; any other multi-element
/// list becomes an [`ArgumentNode::List`]; a single argument is left bare.
fn collapse(args: Vec<ArgumentNode>) -> Vec<ArgumentNode> {
    match args.len() {
        0 => Vec::new(),
        1 => args,
        2 => {
            if let (ArgumentNode::Identifier(type_name), ArgumentNode::String(title)) = (&args[0], &args[1]) {
                return vec![ArgumentNode::ObjectType { type_name: type_name.clone(), title: title.clone() }];
            }
            vec![ArgumentNode::List(args)]
        }
        _ => vec![ArgumentNode::List(args)],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_block_is_no_arguments() {
        let stream = Parser::parse("uni_start_stream<>").unwrap();
        assert_eq!(stream.atoms[0].arguments, None);
    }

    #[test]
    fn absent_block_is_no_arguments() {
        let stream = Parser::parse("uni_start_stream").unwrap();
        assert_eq!(stream.atoms[0].arguments, None);
    }

    #[test]
    fn single_string_argument() {
        let stream = Parser::parse(r#"de_data<"TOSAdvisor">"#).unwrap();
        assert_eq!(stream.atoms[0].arguments, Some(vec![ArgumentNode::String("TOSAdvisor".into())]));
    }

    #[test]
    fn gid_argument() {
        let stream = Parser::parse("mat_object_id<32-105>").unwrap();
        assert_eq!(stream.atoms[0].arguments, Some(vec![ArgumentNode::Gid("32-105".into())]));
    }

    #[test]
    fn object_type_collapse() {
        let stream = Parser::parse(r#"gen_create_object<ind_group, "Title">"#).unwrap();
        assert_eq!(
            stream.atoms[0].arguments,
            Some(vec![ArgumentNode::ObjectType { type_name: "ind_group".into(), title: "Title".into() }])
        );
    }

    #[test]
    fn piped_identifiers_collapse() {
        let stream = Parser::parse("act_set_criterion<left | center | right>").unwrap();
        assert_eq!(
            stream.atoms[0].arguments,
            Some(vec![ArgumentNode::Piped(vec![
                ArgumentNode::Identifier("left".into()),
                ArgumentNode::Identifier("center".into()),
                ArgumentNode::Identifier("right".into()),
            ])])
        );
    }

    #[test]
    fn multi_element_list_collapse() {
        let stream = Parser::parse("if_eq<1,2,3>").unwrap();
        assert_eq!(
            stream.atoms[0].arguments,
            Some(vec![ArgumentNode::List(vec![
                ArgumentNode::Number(1),
                ArgumentNode::Number(2),
                ArgumentNode::Number(3),
            ])])
        );
    }

    #[test]
    fn nested_stream_form() {
        let stream = Parser::parse(
            "uni_start_stream\nact_replace_select_action < uni_start_stream uni_end_stream >\nuni_end_stream\n",
        )
        .unwrap();
        assert_eq!(stream.atoms.len(), 3);
        let args = stream.atoms[1].arguments.as_ref().unwrap();
        match &args[0] {
            ArgumentNode::NestedStream { stream, trailing } => {
                assert_eq!(stream.atoms.len(), 2);
                assert!(trailing.is_empty());
            }
            other => panic!("expected NestedStream, got {other:?}"),
        }
    }

    #[test]
    fn nested_stream_with_trailing_args() {
        let stream = Parser::parse("act_replace_select_action<uni_start_stream uni_end_stream, 1Ax>").unwrap();
        let args = stream.atoms[0].arguments.as_ref().unwrap();
        match &args[0] {
            ArgumentNode::NestedStream { trailing, .. } => {
                assert_eq!(trailing, &vec![ArgumentNode::Hex("1A".into())]);
            }
            other => panic!("expected NestedStream, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_block_is_missing_close_bracket() {
        let err = Parser::parse("de_data<\"abc\"").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingCloseBracket));
    }

    #[test]
    fn missing_comma_between_arguments() {
        let err = Parser::parse("if_eq<1 2>").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingComma));
    }

    #[test]
    fn bare_argument_without_angle_bracket_is_missing_open_bracket() {
        let err = Parser::parse(r#"de_data "TOSAdvisor""#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingOpenBracket));
    }

    #[test]
    fn unknown_atom_is_tolerated_with_no_definition() {
        let stream = Parser::parse("not_a_real_atom<1>").unwrap();
        assert!(stream.atoms[0].definition.is_none());
    }
}
