// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the C subset.
//!
//! Transforms a token stream into an abstract syntax tree. Fail-fast: the
//! first unexpected token aborts the parse.

mod parser;

pub use parser::{ParseError, Parser};
