// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The scanner implementation.

use minicc_ast::{Loc, Token, TokenKind};
use thiserror::Error;

/// A fatal lexing error. Lexing never continues past the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{loc}: error: '{message}'. Lexing Stopped!")]
pub struct LexError {
    pub loc: Loc,
    pub message: String,
}

impl LexError {
    fn new(loc: Loc, message: impl Into<String>) -> Self {
        LexError { loc, message: message.into() }
    }
}

const ESCAPES: &[u8] = b"'\"?\\abfnrtv0";

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match text {
        "auto" => Auto,
        "break" => Break,
        "case" => Case,
        "char" => Char,
        "const" => Const,
        "continue" => Continue,
        "default" => Default,
        "do" => Do,
        "double" => Double,
        "else" => Else,
        "enum" => Enum,
        "extern" => Extern,
        "float" => Float,
        "for" => For,
        "goto" => Goto,
        "if" => If,
        "inline" => Inline,
        "int" => Int,
        "long" => Long,
        "register" => Register,
        "restrict" => Restrict,
        "return" => Return,
        "short" => Short,
        "signed" => Signed,
        "sizeof" => Sizeof,
        "static" => Static,
        "struct" => Struct,
        "switch" => Switch,
        "typedef" => Typedef,
        "union" => Union,
        "unsigned" => Unsigned,
        "void" => Void,
        "volatile" => Volatile,
        "while" => While,
        "_Alignas" => AlignAs,
        "_Alignof" => AlignOf,
        "_Atomic" => Atomic,
        "_Bool" => Bool,
        "_Complex" => Complex,
        "_Generic" => Generic,
        "_Imaginary" => Imaginary,
        "_Noreturn" => Noreturn,
        "_Static_assert" => StaticAssert,
        "_Thread_local" => ThreadLocal,
        _ => return None,
    };
    Some(kind)
}

/// The scanner. Input is treated as ASCII bytes; line and column are both
/// 1-based and `\r`, `\n` and `\r\n` each count as one line break.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src: src.as_bytes(), pos: 0, line: 1, col: 1 }
    }

    /// Lexes the whole input. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, self.loc()));
                return Ok(tokens);
            };
            let token = match c {
                b'0'..=b'9' => self.munch_number(),
                b'\'' => self.munch_character()?,
                b'"' => self.munch_string()?,
                c if is_ident_start(c) => self.munch_word(),
                _ => self.munch_punctuator()?,
            };
            tokens.push(token);
        }
    }

    fn loc(&self) -> Loc {
        Loc::new(self.line, self.col)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    /// Advances over one non-newline byte.
    fn bump(&mut self) {
        self.pos += 1;
        self.col += 1;
    }

    fn bump_n(&mut self, n: usize) {
        self.pos += n;
        self.col += n as u32;
    }

    /// Advances over a line break (`\n`, `\r` or `\r\n`).
    fn bump_newline(&mut self) {
        if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
            self.pos += 1;
        }
        self.pos += 1;
        self.line += 1;
        self.col = 1;
    }

    /// Skips whitespace and comments. Fails on an unterminated block
    /// comment, reported at the position of the opening `/*`.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') => self.bump(),
                Some(b'\n') | Some(b'\r') => self.bump_newline(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    self.bump_n(2);
                    while let Some(c) = self.peek() {
                        if c == b'\n' || c == b'\r' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.loc();
                    self.bump_n(2);
                    loop {
                        match self.peek() {
                            None => {
                                return Err(LexError::new(start, "Unterminated Comment!"));
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump_n(2);
                                break;
                            }
                            Some(b'\n') | Some(b'\r') => self.bump_newline(),
                            Some(_) => self.bump(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// A run of decimal digits. Validation of the value is left to the
    /// semantic analyzer, so `123afg` lexes as `123` followed by `afg`.
    fn munch_number(&mut self) -> Token {
        let loc = self.loc();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        Token::with_text(TokenKind::Number, loc, self.text_from(start))
    }

    /// An identifier run, reinterpreted as a keyword when the whole run
    /// spells one. A keyword followed by more identifier characters is a
    /// plain identifier (`automa`), never `auto` + `ma`.
    fn munch_word(&mut self) -> Token {
        let loc = self.loc();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.bump();
        }
        let text = self.text_from(start);
        match keyword_kind(&text) {
            Some(kind) => Token::new(kind, loc),
            None => Token::with_text(TokenKind::Identifier, loc, text),
        }
    }

    /// A character literal: one plain character or one escape from the
    /// fixed set, between single quotes. The token text keeps the spelling
    /// without the quotes.
    fn munch_character(&mut self) -> Result<Token, LexError> {
        let loc = self.loc();
        self.bump();
        let text = match self.peek() {
            Some(b'\\') => {
                let esc = self.peek_at(1);
                match esc {
                    Some(c) if ESCAPES.contains(&c) => {
                        self.bump_n(2);
                        format!("\\{}", c as char)
                    }
                    _ => {
                        let shown = esc.map(|c| c as char).unwrap_or_default();
                        return Err(LexError::new(
                            loc,
                            format!("Invalid character: '\\{shown}'"),
                        ));
                    }
                }
            }
            Some(c) if c != b'\'' && c != b'\n' && c != b'\r' => {
                self.bump();
                (c as char).to_string()
            }
            other => {
                let shown = other.map(|c| c as char).unwrap_or_default();
                return Err(LexError::new(loc, format!("Invalid character: '{shown}'")));
            }
        };
        match self.peek() {
            Some(b'\'') => {
                self.bump();
                Ok(Token::with_text(TokenKind::CharLit, loc, text))
            }
            other => {
                let shown = other.map(|c| c as char).unwrap_or_default();
                Err(LexError::new(loc, format!("Invalid character: '{shown}'")))
            }
        }
    }

    /// A string literal. Escapes are validated against the fixed set but
    /// kept verbatim in the token text; the text excludes the quotes.
    fn munch_string(&mut self) -> Result<Token, LexError> {
        let loc = self.loc();
        self.bump();
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let text = self.text_from(start);
                    self.bump();
                    return Ok(Token::with_text(TokenKind::StringLit, loc, text));
                }
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(LexError::new(
                        loc,
                        format!("Line break in string at {}", self.text_from(start)),
                    ));
                }
                Some(b'\\') => match self.peek_at(1) {
                    Some(c) if ESCAPES.contains(&c) => self.bump_n(2),
                    _ => {
                        self.bump();
                        return Err(LexError::new(
                            loc,
                            format!("Invalid escape at {}", self.text_from(start)),
                        ));
                    }
                },
                Some(_) => self.bump(),
            }
        }
    }

    fn text_from(&self, start: usize) -> String {
        std::str::from_utf8(&self.src[start..self.pos])
            .unwrap_or_default()
            .to_string()
    }

    /// Longest-match punctuator, including the digraph spellings which lex
    /// to the same kinds as the tokens they alias.
    fn munch_punctuator(&mut self) -> Result<Token, LexError> {
        use TokenKind::*;
        let loc = self.loc();
        let one = self.src[self.pos];
        let two = self.peek_at(1);
        let three = self.peek_at(2);
        let (kind, len) = match one {
            b'{' => (LBrace, 1),
            b'}' => (RBrace, 1),
            b'[' => (LBracket, 1),
            b']' => (RBracket, 1),
            b'(' => (LParen, 1),
            b')' => (RParen, 1),
            b'+' => match two {
                Some(b'=') => (PlusAssign, 2),
                Some(b'+') => (PlusPlus, 2),
                _ => (Plus, 1),
            },
            b'-' => match two {
                Some(b'-') => (MinusMinus, 2),
                Some(b'=') => (MinusAssign, 2),
                Some(b'>') => (Arrow, 2),
                _ => (Minus, 1),
            },
            b'=' => match two {
                Some(b'=') => (Eq, 2),
                _ => (Assign, 1),
            },
            b'<' => match two {
                Some(b':') => (LBracket, 2),
                Some(b'%') => (LBrace, 2),
                Some(b'=') => (Le, 2),
                Some(b'<') => {
                    if three == Some(b'=') {
                        (ShlAssign, 3)
                    } else {
                        (Shl, 2)
                    }
                }
                _ => (Lt, 1),
            },
            b'>' => match two {
                Some(b'=') => (Ge, 2),
                Some(b'>') => {
                    if three == Some(b'=') {
                        (ShrAssign, 3)
                    } else {
                        (Shr, 2)
                    }
                }
                _ => (Gt, 1),
            },
            b'!' => match two {
                Some(b'=') => (Ne, 2),
                _ => (Not, 1),
            },
            b',' => (Comma, 1),
            b';' => (Semi, 1),
            b'.' => {
                if two == Some(b'.') && three == Some(b'.') {
                    (Ellipsis, 3)
                } else {
                    (Dot, 1)
                }
            }
            b'^' => match two {
                Some(b'=') => (CaretAssign, 2),
                _ => (Caret, 1),
            },
            b'~' => (Tilde, 1),
            b'*' => match two {
                Some(b'=') => (StarAssign, 2),
                _ => (Star, 1),
            },
            b'/' => match two {
                Some(b'=') => (SlashAssign, 2),
                _ => (Slash, 1),
            },
            b'%' => match two {
                Some(b'=') => (PercentAssign, 2),
                Some(b':') => {
                    if three == Some(b'%') && self.peek_at(3) == Some(b':') {
                        (HashHash, 4)
                    } else {
                        (Hash, 2)
                    }
                }
                Some(b'>') => (RBrace, 2),
                _ => (Percent, 1),
            },
            b'&' => match two {
                Some(b'=') => (AmpAssign, 2),
                Some(b'&') => (AmpAmp, 2),
                _ => (Amp, 1),
            },
            b'|' => match two {
                Some(b'=') => (PipeAssign, 2),
                Some(b'|') => (PipePipe, 2),
                _ => (Pipe, 1),
            },
            b':' => match two {
                Some(b'>') => (RBracket, 2),
                _ => (Colon, 1),
            },
            b'#' => match two {
                Some(b'#') => (HashHash, 2),
                _ => (Hash, 1),
            },
            b'?' => (Question, 1),
            _ => return Err(self.unknown_token()),
        };
        self.bump_n(len);
        Ok(Token::new(kind, loc))
    }

    fn unknown_token(&self) -> LexError {
        let rest = &self.src[self.pos..];
        let shown: String = rest.iter().take(3).map(|&c| c as char).collect();
        let message = if rest.len() > 3 {
            format!("Unknown token {shown} [truncated]")
        } else {
            format!("Unknown token {shown}")
        };
        LexError::new(self.loc(), message)
    }
}

/// Renders the token stream for `--tokenize`, one token per line:
/// `line:col<TAB>text<TAB>name`. Character and string literals show their
/// quotes; the trailing `Eof` is not listed.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.kind == TokenKind::Eof {
            break;
        }
        let text = match token.kind {
            TokenKind::CharLit => format!("'{}'", token.text),
            TokenKind::StringLit => format!("\"{}\"", token.text),
            _ => token.spelling().to_string(),
        };
        out.push_str(&format!("{}\t{}\t{}\n", token.loc, text, token.kind.name()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        match Lexer::new(src).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => panic!("unexpected lex error: {e}"),
        }
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> LexError {
        match Lexer::new(src).tokenize() {
            Ok(tokens) => panic!("expected a lex error, got {tokens:?}"),
            Err(e) => e,
        }
    }

    #[test]
    fn simple_operators() {
        assert_eq!(kinds("+")[0], TokenKind::Plus);
        assert_eq!(kinds("-")[0], TokenKind::Minus);
        assert_eq!(kinds("++")[0], TokenKind::PlusPlus);
        assert_eq!(kinds("--")[0], TokenKind::MinusMinus);
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(kinds("<<="), vec![TokenKind::ShlAssign, TokenKind::Eof]);
        assert_eq!(kinds(">>="), vec![TokenKind::ShrAssign, TokenKind::Eof]);
        assert_eq!(
            kinds("+++"),
            vec![TokenKind::PlusPlus, TokenKind::Plus, TokenKind::Eof]
        );
        assert_eq!(
            kinds("..."),
            vec![TokenKind::Ellipsis, TokenKind::Eof]
        );
        assert_eq!(
            kinds(".."),
            vec![TokenKind::Dot, TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn keyword_max_munch() {
        let tokens = lex("automa");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "automa");

        let tokens = lex("auto");
        assert_eq!(tokens[0].kind, TokenKind::Auto);
    }

    #[test]
    fn number_stops_at_letter() {
        let tokens = lex("123afg");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "123");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "afg");
    }

    #[test]
    fn digraphs_alias_primary_kinds() {
        assert_eq!(
            kinds("<% %> <: :> %: %:%:"),
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Hash,
                TokenKind::HashHash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn underscore_keywords() {
        assert_eq!(kinds("_Bool")[0], TokenKind::Bool);
        assert_eq!(kinds("_Static_assert")[0], TokenKind::StaticAssert);
        let tokens = lex("_Boolean");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "_Boolean");
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // line comment\nb /* block */ c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment() {
        let err = lex_err("int a; /* no end");
        assert_eq!(err.loc, Loc::new(1, 8));
        assert_eq!(
            err.to_string(),
            "1:8: error: 'Unterminated Comment!'. Lexing Stopped!"
        );
    }

    #[test]
    fn char_literals() {
        let tokens = lex("'a' '\\n' '\\\\'");
        assert_eq!(tokens[0].kind, TokenKind::CharLit);
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].text, "\\n");
        assert_eq!(tokens[2].text, "\\\\");
    }

    #[test]
    fn invalid_char_literals() {
        let err = lex_err("'\\x'");
        assert!(err.message.starts_with("Invalid character:"), "{err}");
        let err = lex_err("'ab'");
        assert!(err.message.starts_with("Invalid character:"), "{err}");
        let err = lex_err("''");
        assert!(err.message.starts_with("Invalid character:"), "{err}");
    }

    #[test]
    fn string_literals() {
        let tokens = lex("\"hi\\tthere\"");
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].text, "hi\\tthere");
    }

    #[test]
    fn string_errors() {
        let err = lex_err("\"abc\ndef\"");
        assert!(err.message.starts_with("Line break in string at"), "{err}");
        let err = lex_err("\"ab\\yc\"");
        assert!(err.message.starts_with("Invalid escape at"), "{err}");
    }

    #[test]
    fn unknown_token() {
        let err = lex_err("int a = 1; @");
        assert_eq!(err.loc, Loc::new(1, 12));
        assert!(err.message.starts_with("Unknown token @"), "{err}");
    }

    #[test]
    fn positions_across_line_breaks() {
        let tokens = lex("a\nbb\r\nccc\rd");
        assert_eq!(tokens[0].loc, Loc::new(1, 1));
        assert_eq!(tokens[1].loc, Loc::new(2, 1));
        assert_eq!(tokens[2].loc, Loc::new(3, 1));
        assert_eq!(tokens[3].loc, Loc::new(4, 1));
    }

    #[test]
    fn positions_within_line() {
        let tokens = lex("int main() {}");
        assert_eq!(tokens[0].loc, Loc::new(1, 1));
        assert_eq!(tokens[1].loc, Loc::new(1, 5));
        assert_eq!(tokens[2].loc, Loc::new(1, 10));
        assert_eq!(tokens[3].loc, Loc::new(1, 11));
        assert_eq!(tokens[4].loc, Loc::new(1, 13));
        assert_eq!(tokens[5].loc, Loc::new(1, 14));
    }

    #[test]
    fn dump_format() {
        let tokens = lex("int x;\n'a'");
        let dump = dump_tokens(&tokens);
        assert_eq!(dump, "1:1\tint\tint\n1:5\tx\tidentifier\n1:6\t;\t;\n2:1\t'a'\tcharacter constant\n");
    }

    #[test]
    fn eof_token_terminates_stream() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].loc, Loc::new(1, 1));
    }
}
