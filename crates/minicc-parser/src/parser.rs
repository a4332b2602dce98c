// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The recursive-descent parser implementation.

use minicc_ast::decl::{Decl, DeclKind, Declarator, DeclaratorKind, ParamDecl, TranslationUnit};
use minicc_ast::expr::{AssignOp, BinOp, Expr, ExprKind, UnaryOp};
use minicc_ast::stmt::{BlockItem, Stmt, StmtKind};
use minicc_ast::ty::{ScalarKind, Ty, TyKind};
use minicc_ast::{Loc, NodeId, Token, TokenKind};
use thiserror::Error;

/// A fatal parse error. Parsing never continues past the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{loc}: error: Unexpected Token: \"{found}\", expecting \"{expected}\". Parsing Stopped!")]
pub struct ParseError {
    pub loc: Loc,
    pub found: String,
    pub expected: String,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
}

impl Parser {
    /// The token stream must end with an `Eof` token, as produced by the
    /// lexer.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof));
        Parser { tokens, pos: 0, next_id: 0 }
    }

    pub fn parse(mut self) -> Result<TranslationUnit, ParseError> {
        let mut decls = Vec::new();
        while !self.check(TokenKind::Eof) {
            decls.push(self.parse_external_declaration()?);
        }
        Ok(TranslationUnit { decls })
    }

    // === Cursor ===

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(kind.name()))
        }
    }

    /// An error at the current token.
    fn error(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError {
            loc: token.loc,
            found: token.spelling().to_string(),
            expected: expected.to_string(),
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Declarations ===

    /// external-declaration: type-specifier `;`
    ///                     | type-specifier declarator `;`
    ///                     | type-specifier declarator compound-statement
    fn parse_external_declaration(&mut self) -> Result<Decl, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let ty = self.parse_type_specifier()?;

        if self.check(TokenKind::Semi) {
            if !matches!(ty.kind, TyKind::Struct { .. }) {
                return Err(self.error("identifier"));
            }
            self.advance();
            return Ok(Decl { id, loc, kind: DeclKind::Struct { ty, alias: None } });
        }

        let decl = self.parse_declarator()?;
        if self.eat(TokenKind::Semi) {
            return Ok(Decl { id, loc, kind: classify_declaration(ty, decl) });
        }

        if self.check(TokenKind::LBrace) {
            if !decl.is_function() {
                return Err(self.error(";"));
            }
            let body = self.parse_compound()?;
            return Ok(Decl { id, loc, kind: DeclKind::FunctionDef { ret: ty, decl, body } });
        }

        Err(self.error(";"))
    }

    /// declaration: type-specifier `;` | type-specifier declarator `;`
    ///
    /// Used for block items and struct members; no function bodies here.
    fn parse_declaration(&mut self) -> Result<Decl, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let ty = self.parse_type_specifier()?;

        if self.check(TokenKind::Semi) {
            if !matches!(ty.kind, TyKind::Struct { .. }) {
                return Err(self.error("identifier"));
            }
            self.advance();
            return Ok(Decl { id, loc, kind: DeclKind::Struct { ty, alias: None } });
        }

        let decl = self.parse_declarator()?;
        self.expect(TokenKind::Semi)?;
        Ok(Decl { id, loc, kind: classify_declaration(ty, decl) })
    }

    /// type-specifier: `void` | `char` | `int` | struct-specifier
    fn parse_type_specifier(&mut self) -> Result<Ty, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let scalar = match self.current().kind {
            TokenKind::Void => Some(ScalarKind::Void),
            TokenKind::Char => Some(ScalarKind::Char),
            TokenKind::Int => Some(ScalarKind::Int),
            _ => None,
        };
        if let Some(kind) = scalar {
            self.advance();
            return Ok(Ty { id, loc, kind: TyKind::Scalar(kind) });
        }
        if !self.check(TokenKind::Struct) {
            return Err(self.error("type specifier"));
        }
        self.advance();

        let name = if self.check(TokenKind::Identifier) {
            Some(self.advance().text)
        } else {
            None
        };
        let members = if self.check(TokenKind::LBrace) {
            self.advance();
            // at least one member declaration is required
            let mut members = Vec::new();
            loop {
                members.push(self.parse_declaration()?);
                if self.check(TokenKind::RBrace) {
                    break;
                }
            }
            self.advance();
            Some(members)
        } else {
            None
        };
        if name.is_none() && members.is_none() {
            return Err(self.error("identifier"));
        }
        Ok(Ty { id, loc, kind: TyKind::Struct { name, members } })
    }

    /// declarator: `*`* direct-declarator parameter-suffix?
    ///
    /// A parameter suffix turns the whole declarator into a function
    /// declarator; pointer stars seen before it re-associate to the return
    /// type (`int *f(int)` declares a function returning `int *`). Without
    /// a suffix the stars wrap the direct declarator itself.
    fn parse_declarator(&mut self) -> Result<Declarator, ParseError> {
        let loc = self.current().loc;
        let mut ptr = 0u32;
        while self.eat(TokenKind::Star) {
            ptr += 1;
        }

        let base = if self.check(TokenKind::LParen) {
            self.advance();
            let inner = self.parse_declarator()?;
            self.expect(TokenKind::RParen)?;
            inner
        } else if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Declarator { loc: token.loc, kind: DeclaratorKind::Direct(token.text) }
        } else if ptr > 0 {
            // bare pointer stars: an unnamed (abstract) declarator
            return Ok(Declarator { loc, kind: DeclaratorKind::Abstract { ptr_depth: ptr } });
        } else {
            return Err(self.error("identifier"));
        };

        // The bracket pair is an alternate parameter-list spelling so the
        // digraph forms `<:` `:>` round-trip; arrays are not modeled.
        let close = match self.current().kind {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            _ => None,
        };
        if let Some(close) = close {
            self.advance();
            let params = if self.check(close) {
                Vec::new()
            } else {
                self.parse_parameter_list(close)?
            };
            self.expect(close)?;
            return Ok(Declarator {
                loc,
                kind: DeclaratorKind::Function { inner: Box::new(base), params, ret_ptr: ptr },
            });
        }

        if ptr > 0 {
            return Ok(Declarator {
                loc,
                kind: DeclaratorKind::Pointer { inner: Box::new(base), depth: ptr },
            });
        }
        Ok(base)
    }

    /// parameter-list: parameter-declaration (`,` parameter-declaration)*
    ///
    /// A single unnamed `void` parameter is the spelling for an empty list
    /// and is normalized away here.
    fn parse_parameter_list(&mut self, close: TokenKind) -> Result<Vec<ParamDecl>, ParseError> {
        let mut params = Vec::new();
        loop {
            params.push(self.parse_parameter_declaration(close)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if params.len() == 1 && params[0].decl.is_none() && params[0].ty.is_scalar_void() {
            return Ok(Vec::new());
        }
        Ok(params)
    }

    fn parse_parameter_declaration(&mut self, close: TokenKind) -> Result<ParamDecl, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let ty = self.parse_type_specifier()?;
        let decl = if self.check(TokenKind::Comma) || self.check(close) {
            None
        } else {
            Some(self.parse_declarator()?)
        };
        Ok(ParamDecl { id, loc, ty, decl })
    }

    // === Statements ===

    fn parse_compound(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current().loc;
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error("}"));
            }
            if self.current().kind.is_type_specifier() {
                items.push(BlockItem::Decl(self.parse_declaration()?));
            } else {
                items.push(BlockItem::Stmt(self.parse_stmt()?));
            }
        }
        self.advance();
        Ok(Stmt { loc, kind: StmtKind::Compound(items) })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current().loc;
        match self.current().kind {
            TokenKind::LBrace => self.parse_compound(),
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then_branch = Box::new(self.parse_stmt()?);
                // dangling else binds to the nearest if
                let else_branch = if self.eat(TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Ok(Stmt { loc, kind: StmtKind::If { cond, then_branch, else_branch } })
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt { loc, kind: StmtKind::While { cond, body } })
            }
            TokenKind::Goto => {
                self.advance();
                let token = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt {
                    loc,
                    kind: StmtKind::Goto { name: token.text, name_loc: token.loc },
                })
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt { loc, kind: StmtKind::Break })
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semi)?;
                Ok(Stmt { loc, kind: StmtKind::Continue })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semi)?;
                Ok(Stmt { loc, kind: StmtKind::Return(value) })
            }
            TokenKind::Semi => {
                self.advance();
                Ok(Stmt { loc, kind: StmtKind::Expr(None) })
            }
            // a label needs two tokens of lookahead to tell apart from an
            // expression statement starting with an identifier
            TokenKind::Identifier if self.peek(1).kind == TokenKind::Colon => {
                let token = self.advance();
                self.advance();
                let stmt = Box::new(self.parse_stmt()?);
                Ok(Stmt {
                    loc,
                    kind: StmtKind::Label { name: token.text, name_loc: token.loc, stmt },
                })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt { loc, kind: StmtKind::Expr(Some(expr)) })
            }
        }
    }

    // === Expressions ===

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_conditional()?;
        let op = match self.current().kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::AddAssign,
            TokenKind::MinusAssign => AssignOp::SubAssign,
            _ => return Ok(lhs),
        };
        self.advance();
        let loc = lhs.loc;
        let rhs = self.parse_assignment()?;
        Ok(Expr {
            id: self.fresh_id(),
            loc,
            kind: ExprKind::Assign { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
        })
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(0)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_conditional()?;
        let loc = cond.loc;
        Ok(Expr {
            id: self.fresh_id(),
            loc,
            kind: ExprKind::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
        })
    }

    /// Left-associative binary levels, loosest first.
    const BINARY_LEVELS: &'static [&'static [(TokenKind, BinOp)]] = &[
        &[(TokenKind::PipePipe, BinOp::Or)],
        &[(TokenKind::AmpAmp, BinOp::And)],
        &[(TokenKind::Eq, BinOp::Eq), (TokenKind::Ne, BinOp::Ne)],
        &[
            (TokenKind::Lt, BinOp::Lt),
            (TokenKind::Le, BinOp::Le),
            (TokenKind::Gt, BinOp::Gt),
            (TokenKind::Ge, BinOp::Ge),
        ],
        &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
        &[(TokenKind::Star, BinOp::Mul)],
    ];

    fn parse_binary(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == Self::BINARY_LEVELS.len() {
            return self.parse_unary();
        }
        let mut lhs = self.parse_binary(level + 1)?;
        'munch: loop {
            for &(kind, op) in Self::BINARY_LEVELS[level] {
                if self.check(kind) {
                    self.advance();
                    let rhs = self.parse_binary(level + 1)?;
                    let loc = lhs.loc;
                    lhs = Expr {
                        id: self.fresh_id(),
                        loc,
                        kind: ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                    };
                    continue 'munch;
                }
            }
            return Ok(lhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current().loc;
        let op = match self.current().kind {
            TokenKind::Amp => UnaryOp::AddrOf,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Sizeof => {
                self.advance();
                // `sizeof (type-name)` only when a type specifier follows
                // the paren; otherwise the operand is a unary expression
                if self.check(TokenKind::LParen) && self.peek(1).kind.is_type_specifier() {
                    self.advance();
                    let ty = self.parse_type_name()?;
                    self.expect(TokenKind::RParen)?;
                    return Ok(Expr { id: self.fresh_id(), loc, kind: ExprKind::SizeofType(ty) });
                }
                let operand = self.parse_unary()?;
                return Ok(Expr {
                    id: self.fresh_id(),
                    loc,
                    kind: ExprKind::SizeofExpr(Box::new(operand)),
                });
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr {
            id: self.fresh_id(),
            loc,
            kind: ExprKind::Unary { op, operand: Box::new(operand) },
        })
    }

    /// type-name: type-specifier `*`*
    fn parse_type_name(&mut self) -> Result<Ty, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let base = self.parse_type_specifier()?;
        let mut ptr_depth = 0u32;
        while self.eat(TokenKind::Star) {
            ptr_depth += 1;
        }
        if ptr_depth == 0 {
            return Ok(base);
        }
        Ok(Ty { id, loc, kind: TyKind::Abstract { base: Box::new(base), ptr_depth } })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let loc = expr.loc;
            match self.current().kind {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr {
                        id: self.fresh_id(),
                        loc,
                        kind: ExprKind::Index { base: Box::new(expr), index: Box::new(index) },
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    expr = Expr {
                        id: self.fresh_id(),
                        loc,
                        kind: ExprKind::Call { callee: Box::new(expr), args },
                    };
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let arrow = self.current().kind == TokenKind::Arrow;
                    self.advance();
                    let token = self.expect(TokenKind::Identifier)?;
                    expr = Expr {
                        id: self.fresh_id(),
                        loc,
                        kind: ExprKind::Member {
                            base: Box::new(expr),
                            member: token.text,
                            member_loc: token.loc,
                            arrow,
                        },
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let id = self.fresh_id();
        let loc = self.current().loc;
        let kind = match self.current().kind {
            TokenKind::Identifier => ExprKind::Ident(self.advance().text),
            TokenKind::Number => ExprKind::Number(self.advance().text),
            TokenKind::CharLit => ExprKind::CharLit(self.advance().text),
            TokenKind::StringLit => ExprKind::StringLit(self.advance().text),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.error("expression")),
        };
        Ok(Expr { id, loc, kind })
    }
}

/// `;`-terminated declarations classify by shape: function declarators give
/// function declarations (including pointer-to-function ones), struct types
/// give struct declarations, the rest are plain variables.
fn classify_declaration(ty: Ty, decl: Declarator) -> DeclKind {
    if decl.is_function() {
        DeclKind::FunctionDecl { ret: ty, decl }
    } else if matches!(ty.kind, TyKind::Struct { .. }) {
        DeclKind::Struct { ty, alias: Some(decl) }
    } else {
        DeclKind::Data { ty, decl }
    }
}
