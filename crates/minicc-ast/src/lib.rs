// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract syntax tree types for the C subset.
//!
//! This crate defines the tokens and AST nodes shared between the lexer,
//! parser, semantic analyzer, and pretty-printer.

pub mod loc;
pub mod token;
pub mod ty;
pub mod decl;
pub mod stmt;
pub mod expr;

pub use loc::Loc;
pub use token::{Token, TokenKind};

/// Unique identifier for AST nodes.
///
/// Used by semantic analysis to key its resolution side tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);
