// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! Renders the message, the offending source line and a caret:
//!
//! ```text
//! error: Use of undeclared identifier 'x'
//!   --> main.c:3:2
//!     |
//!   3 |  x = 1;
//!     |  ^
//! ```

use colored::Colorize;

use crate::{Diagnostic, Severity};

pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: &'a str,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        DiagnosticFormatter { source, file_name: "<source>" }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = name;
        self
    }

    pub fn format(&self, diag: &Diagnostic) -> String {
        let severity = match diag.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        let mut out = format!("{severity}: {}\n", diag.message.bold());

        let line_no = diag.loc.line as usize;
        let Some(line) = self.source.lines().nth(line_no.saturating_sub(1)) else {
            return out;
        };

        let gutter = line_no.to_string().len().max(2);
        out.push_str(&format!("  {} {}:{}\n", "-->".blue(), self.file_name, diag.loc));
        out.push_str(&format!("{} {}\n", " ".repeat(gutter + 1), "|".blue()));
        let padded = format!("{:>width$}", line_no, width = gutter + 1);
        out.push_str(&format!("{} {} {line}\n", padded.blue().bold(), "|".blue()));
        out.push_str(&format!(
            "{} {} {}{}\n",
            " ".repeat(gutter + 1),
            "|".blue(),
            " ".repeat((diag.loc.col as usize).saturating_sub(1)),
            "^".red().bold()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Diagnostic;
    use minicc_ast::Loc;

    #[test]
    fn renders_the_offending_line_with_a_caret() {
        colored::control::set_override(false);
        let source = "int main() {\n  break;\n}\n";
        let diag = Diagnostic::error(
            Loc { line: 2, col: 3 },
            "'break' statement not in a loop statement",
        );
        let out = DiagnosticFormatter::new(source).with_file_name("test.c").format(&diag);
        assert_eq!(
            out,
            "error: 'break' statement not in a loop statement\n\
             \x20 --> test.c:2:3\n\
             \x20   |\n\
             \x20 2 |   break;\n\
             \x20   |   ^\n"
        );
    }

    #[test]
    fn out_of_range_line_prints_the_header_only() {
        colored::control::set_override(false);
        let diag = Diagnostic::error(Loc { line: 9, col: 1 }, "something");
        let out = DiagnosticFormatter::new("int a;\n").format(&diag);
        assert_eq!(out, "error: something\n");
    }
}
