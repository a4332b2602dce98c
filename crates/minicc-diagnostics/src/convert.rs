// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from stage error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for minicc_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.loc, format!("'{}'. Lexing Stopped!", self.message))
    }
}

impl ToDiagnostic for minicc_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(
            self.loc,
            format!(
                "Unexpected Token: \"{}\", expecting \"{}\". Parsing Stopped!",
                self.found, self.expected
            ),
        )
    }
}

impl ToDiagnostic for minicc_sema::SemanticError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.loc, self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicc_ast::Loc;

    #[test]
    fn stage_errors_keep_their_wording() {
        let err = minicc_lexer::Lexer::new("/* open").tokenize().unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(diag.message, "'Unterminated Comment!'. Lexing Stopped!");
        assert_eq!(diag.loc, Loc { line: 1, col: 1 });

        let tokens = minicc_lexer::Lexer::new("int a b;").tokenize().unwrap();
        let err = minicc_parser::Parser::new(tokens).parse().unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(
            diag.message,
            "Unexpected Token: \"b\", expecting \";\". Parsing Stopped!"
        );
        assert_eq!(diag.loc, Loc { line: 1, col: 7 });
    }
}
