// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declarations and declarators.

use crate::loc::Loc;
use crate::stmt::Stmt;
use crate::ty::Ty;
use crate::NodeId;

/// A declarator, already re-associated by the parser.
///
/// `int *f(int)` becomes `Function { inner: Direct("f"), ret_ptr: 1 }`
/// (function returning pointer), while `int (*g)(int)` becomes
/// `Function { inner: Pointer(Direct("g"), 1), ret_ptr: 0 }` (pointer to
/// function).
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub loc: Loc,
    pub kind: DeclaratorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaratorKind {
    Direct(String),
    /// An unnamed declarator: bare pointer stars, as in a parameter
    /// `int f(int *)` or the inner part of `int (*)(int)`.
    Abstract { ptr_depth: u32 },
    Pointer { inner: Box<Declarator>, depth: u32 },
    Function {
        inner: Box<Declarator>,
        params: Vec<ParamDecl>,
        ret_ptr: u32,
    },
}

impl Declarator {
    /// The declared identifier, if any.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclaratorKind::Direct(n) => Some(n),
            DeclaratorKind::Abstract { .. } => None,
            DeclaratorKind::Pointer { inner, .. } => inner.name(),
            DeclaratorKind::Function { inner, .. } => inner.name(),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclaratorKind::Function { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub id: NodeId,
    pub loc: Loc,
    pub ty: Ty,
    pub decl: Option<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub id: NodeId,
    pub loc: Loc,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Function definition; the body is always a compound statement.
    FunctionDef {
        ret: Ty,
        decl: Declarator,
        body: Stmt,
    },
    /// Function (or function pointer) declaration.
    FunctionDecl { ret: Ty, decl: Declarator },
    /// Variable declaration.
    Data { ty: Ty, decl: Declarator },
    /// Struct declaration, optionally declaring a variable of that struct
    /// type at the same time. The type is always `TyKind::Struct`.
    Struct { ty: Ty, alias: Option<Declarator> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub decls: Vec<Decl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarator_name_unwraps_pointers_and_functions() {
        let g = Declarator {
            loc: Loc::default(),
            kind: DeclaratorKind::Function {
                inner: Box::new(Declarator {
                    loc: Loc::default(),
                    kind: DeclaratorKind::Pointer {
                        inner: Box::new(Declarator {
                            loc: Loc::default(),
                            kind: DeclaratorKind::Direct("g".into()),
                        }),
                        depth: 1,
                    },
                }),
                params: vec![],
                ret_ptr: 0,
            },
        };
        assert_eq!(g.name(), Some("g"));
        assert!(g.is_function());
    }
}
