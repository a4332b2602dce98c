// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type specifiers as written in the source.

use crate::decl::Decl;
use crate::loc::Loc;
use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Void,
    Char,
    Int,
}

/// A type specifier. Struct specifiers carry their member declarations when
/// the source spells out a body; `Abstract` is the type-name form used by
/// `sizeof(type)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ty {
    pub id: NodeId,
    pub loc: Loc,
    pub kind: TyKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TyKind {
    Scalar(ScalarKind),
    Struct {
        name: Option<String>,
        members: Option<Vec<Decl>>,
    },
    Abstract {
        base: Box<Ty>,
        ptr_depth: u32,
    },
}

impl Ty {
    pub fn is_scalar_void(&self) -> bool {
        matches!(self.kind, TyKind::Scalar(ScalarKind::Void))
    }
}
