// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source locations.

use std::fmt;

/// A line/column position in the source text. Both components are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(line: u32, col: u32) -> Self {
        Loc { line, col }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_line_colon_col() {
        assert_eq!(Loc::new(3, 14).to_string(), "3:14");
    }
}
