// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the C subset.
//!
//! A hand-rolled maximal-munch scanner. Tokenizes the whole input up front
//! and stops at the first invalid construct.

mod lexer;

pub use lexer::{dump_tokens, LexError, Lexer};
