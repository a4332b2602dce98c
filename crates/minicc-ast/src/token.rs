// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tokens produced by the lexer.

use crate::loc::Loc;

/// Every token kind the lexer can produce.
///
/// The full C99 keyword set is lexed even though the parser only accepts a
/// subset; unsupported keywords surface as parse errors, not lex errors.
/// The digraphs `<%`, `%>`, `<:`, `:>`, `%:` and `%:%:` lex to the same
/// kinds as the brace, bracket and hash punctuators they spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
    AlignAs,
    AlignOf,
    Atomic,
    Bool,
    Complex,
    Generic,
    Imaginary,
    Noreturn,
    StaticAssert,
    ThreadLocal,

    // Punctuators
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Plus,
    PlusPlus,
    PlusAssign,
    Minus,
    MinusMinus,
    MinusAssign,
    Arrow,
    Star,
    StarAssign,
    Slash,
    SlashAssign,
    Percent,
    PercentAssign,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    ShlAssign,
    Shr,
    ShrAssign,
    Not,
    Amp,
    AmpAmp,
    AmpAssign,
    Pipe,
    PipePipe,
    PipeAssign,
    Caret,
    CaretAssign,
    Tilde,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,
    Question,
    Hash,
    HashHash,

    // Tokens carrying text
    Identifier,
    Number,
    CharLit,
    StringLit,

    Eof,
}

impl TokenKind {
    /// Display spelling used in diagnostics and the token dump.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Auto => "auto",
            Break => "break",
            Case => "case",
            Char => "char",
            Const => "const",
            Continue => "continue",
            Default => "default",
            Do => "do",
            Double => "double",
            Else => "else",
            Enum => "enum",
            Extern => "extern",
            Float => "float",
            For => "for",
            Goto => "goto",
            If => "if",
            Inline => "inline",
            Int => "int",
            Long => "long",
            Register => "register",
            Restrict => "restrict",
            Return => "return",
            Short => "short",
            Signed => "signed",
            Sizeof => "sizeof",
            Static => "static",
            Struct => "struct",
            Switch => "switch",
            Typedef => "typedef",
            Union => "union",
            Unsigned => "unsigned",
            Void => "void",
            Volatile => "volatile",
            While => "while",
            AlignAs => "_Alignas",
            AlignOf => "_Alignof",
            Atomic => "_Atomic",
            Bool => "_Bool",
            Complex => "_Complex",
            Generic => "_Generic",
            Imaginary => "_Imaginary",
            Noreturn => "_Noreturn",
            StaticAssert => "_Static_assert",
            ThreadLocal => "_Thread_local",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            LParen => "(",
            RParen => ")",
            Plus => "+",
            PlusPlus => "++",
            PlusAssign => "+=",
            Minus => "-",
            MinusMinus => "--",
            MinusAssign => "-=",
            Arrow => "->",
            Star => "*",
            StarAssign => "*=",
            Slash => "/",
            SlashAssign => "/=",
            Percent => "%",
            PercentAssign => "%=",
            Assign => "=",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Shl => "<<",
            ShlAssign => "<<=",
            Shr => ">>",
            ShrAssign => ">>=",
            Not => "!",
            Amp => "&",
            AmpAmp => "&&",
            AmpAssign => "&=",
            Pipe => "|",
            PipePipe => "||",
            PipeAssign => "|=",
            Caret => "^",
            CaretAssign => "^=",
            Tilde => "~",
            Comma => ",",
            Semi => ";",
            Colon => ":",
            Dot => ".",
            Ellipsis => "...",
            Question => "?",
            Hash => "#",
            HashHash => "##",
            Identifier => "identifier",
            Number => "number",
            CharLit => "character constant",
            StringLit => "string literal",
            Eof => "end of file",
        }
    }

    /// Whether this keyword can begin a declaration in the supported subset.
    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            TokenKind::Void | TokenKind::Char | TokenKind::Int | TokenKind::Struct
        )
    }
}

/// A lexed token. `text` holds the source spelling for identifiers, numbers
/// and character/string literals (without quotes); it is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, loc: Loc) -> Self {
        Token { kind, loc, text: String::new() }
    }

    pub fn with_text(kind: TokenKind, loc: Loc, text: impl Into<String>) -> Self {
        Token { kind, loc, text: text.into() }
    }

    /// The spelling shown in diagnostics: the carried text when there is
    /// one, the kind's fixed spelling otherwise.
    pub fn spelling(&self) -> &str {
        if self.text.is_empty() {
            self.kind.name()
        } else {
            &self.text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_spellings() {
        assert_eq!(TokenKind::While.name(), "while");
        assert_eq!(TokenKind::ShlAssign.name(), "<<=");
        assert_eq!(TokenKind::StaticAssert.name(), "_Static_assert");
    }

    #[test]
    fn spelling_prefers_carried_text() {
        let loc = Loc::new(1, 1);
        let ident = Token::with_text(TokenKind::Identifier, loc, "automa");
        assert_eq!(ident.spelling(), "automa");
        let semi = Token::new(TokenKind::Semi, loc);
        assert_eq!(semi.spelling(), ";");
    }

    #[test]
    fn type_specifiers() {
        assert!(TokenKind::Struct.is_type_specifier());
        assert!(!TokenKind::Union.is_type_specifier());
    }
}
