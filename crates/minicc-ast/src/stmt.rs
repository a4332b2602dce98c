// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statements.

use crate::decl::Decl;
use crate::expr::Expr;
use crate::loc::Loc;

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub loc: Loc,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Compound(Vec<BlockItem>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Label {
        name: String,
        name_loc: Loc,
        stmt: Box<Stmt>,
    },
    Goto {
        name: String,
        name_loc: Loc,
    },
    /// Expression statement; `None` for the empty statement `;`.
    Expr(Option<Expr>),
    Break,
    Continue,
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Decl(Decl),
    Stmt(Stmt),
}
