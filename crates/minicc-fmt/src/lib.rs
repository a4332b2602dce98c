// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Canonical pretty-printer for the C subset.
//!
//! Prints the parsed tree back as source in one fixed shape, with every
//! expression fully parenthesized and declarators in their re-associated
//! form. Printing a parse of printed output reproduces it exactly.

mod printer;

pub use printer::pretty_print;

/// Format source text. Returns the input unchanged if it does not lex or
/// parse.
pub fn format_source(source: &str) -> String {
    let Ok(tokens) = minicc_lexer::Lexer::new(source).tokenize() else {
        return source.to_string();
    };
    let Ok(unit) = minicc_parser::Parser::new(tokens).parse() else {
        return source.to_string();
    };
    pretty_print(&unit)
}
