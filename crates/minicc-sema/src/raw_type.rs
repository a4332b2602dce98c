// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Structural types used by the analyzer.
//!
//! `RawType` is the analyzer's own type representation, independent of the
//! AST type specifiers. Values are immutable and shared through `Rc`.

use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    Void,
    Char,
    Int,
    /// The type of the literal `0`, which unifies with every integer and
    /// pointer type (it doubles as the null pointer constant).
    Nil,
    Pointer(Rc<RawType>),
    Function {
        ret: Rc<RawType>,
        params: Vec<Rc<RawType>>,
    },
    /// Structs compare by qualified tag name; `member_sizes` carries the
    /// ordered member sizes for the sizeof computation.
    Struct {
        name: String,
        member_sizes: Vec<i64>,
    },
}

impl RawType {
    pub fn is_int_like(&self) -> bool {
        matches!(self, RawType::Int | RawType::Char | RawType::Nil)
    }

    /// A struct that has been declared but not defined yet. Its members
    /// are unknown, so it cannot provide storage.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, RawType::Struct { member_sizes, .. } if member_sizes.is_empty())
    }

    pub fn is_void_ptr(&self) -> bool {
        match self {
            RawType::Pointer(inner) => {
                matches!(**inner, RawType::Void) || inner.is_void_ptr()
            }
            _ => false,
        }
    }

    pub fn is_function_pointer(&self) -> bool {
        match self {
            RawType::Pointer(inner) => {
                matches!(**inner, RawType::Function { .. }) || inner.is_function_pointer()
            }
            _ => false,
        }
    }

    pub fn deref(&self) -> Option<&Rc<RawType>> {
        match self {
            RawType::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The return type, looking through pointers to functions.
    pub fn ret(&self) -> Option<&Rc<RawType>> {
        match self {
            RawType::Function { ret, .. } => Some(ret),
            RawType::Pointer(inner) => inner.ret(),
            _ => None,
        }
    }

    /// Whether a value of `other` can stand where `self` is wanted
    /// (assignment, comparison, argument passing). Symmetric in practice:
    /// `Nil` unifies with every integer and pointer type, any pointer
    /// matches any integer, a void pointer matches any pointer, and a
    /// function is admitted wherever its return type would be.
    pub fn compatible(&self, other: &RawType) -> bool {
        match (self, other) {
            (RawType::Void, _) | (_, RawType::Void) => {
                matches!(self, RawType::Void) && matches!(other, RawType::Void)
            }

            (RawType::Struct { name: a, .. }, RawType::Struct { name: b, .. }) => {
                struct_names_match(a, b)
            }
            (RawType::Struct { .. }, _) | (_, RawType::Struct { .. }) => false,

            (RawType::Pointer(p), RawType::Pointer(q)) => {
                self.is_void_ptr() || other.is_void_ptr() || p.compatible(q)
            }
            (RawType::Pointer(_), RawType::Nil | RawType::Char | RawType::Int) => true,
            (RawType::Pointer(p), RawType::Function { ret, .. }) => p.compatible(ret),

            (RawType::Function { ret: a, params: p }, RawType::Function { ret: b, params: q }) => {
                p.len() == q.len()
                    && p.iter().zip(q).all(|(x, y)| x.compatible(y))
                    && a.compatible(b)
            }
            (RawType::Function { ret, .. }, RawType::Int | RawType::Char) => {
                other.compatible(ret)
            }
            (RawType::Function { ret, .. }, RawType::Pointer(q)) => {
                other.is_void_ptr() || q.compatible(ret)
            }
            (RawType::Function { .. }, RawType::Nil) => true,

            (a, RawType::Pointer(_)) => a.is_int_like(),
            (a, RawType::Nil | RawType::Int | RawType::Char) => a.is_int_like(),
            (a, RawType::Function { ret, .. }) => a.compatible(ret),
        }
    }

    /// Exact type identity, modulo `Nil` standing in for any integer or
    /// pointer. Used for redeclaration checks and pointer subtraction.
    pub fn same(&self, other: &RawType) -> bool {
        match (self, other) {
            (RawType::Struct { name: a, .. }, RawType::Struct { name: b, .. }) => {
                struct_names_match(a, b)
            }

            (RawType::Pointer(p), RawType::Pointer(q)) => p.same(q),
            (RawType::Pointer(_), RawType::Nil) => true,

            (RawType::Function { ret: a, params: p }, RawType::Function { ret: b, params: q }) => {
                p.len() == q.len() && p.iter().zip(q).all(|(x, y)| x.same(y)) && a.same(b)
            }
            (RawType::Function { .. }, RawType::Nil) => true,

            (RawType::Void, RawType::Void) => true,
            (RawType::Int | RawType::Nil, RawType::Nil | RawType::Int) => true,
            (RawType::Char | RawType::Nil, RawType::Char) => true,
            (RawType::Nil, RawType::Pointer(_)) => false,

            _ => false,
        }
    }

    /// Object size in bytes. Struct size pads each member to its own size
    /// and the total to the largest member.
    pub fn size(&self) -> i64 {
        match self {
            RawType::Void => 1,
            RawType::Char => 1,
            RawType::Int | RawType::Nil => 4,
            RawType::Pointer(_) => 8,
            RawType::Function { .. } => 1,
            RawType::Struct { member_sizes, .. } => {
                let mut size = 0i64;
                let mut pad = 1i64;
                for &m in member_sizes {
                    size += m;
                    pad = pad.max(m);
                    if size > 0 && size % m != 0 {
                        size += m - size % m;
                    }
                }
                if size > 0 && size % pad != 0 {
                    size += pad - size % pad;
                }
                size
            }
        }
    }
}

/// Anonymous struct names end at their scope path, so a tag and its
/// trailing-dot spelling compare equal.
fn struct_names_match(a: &str, b: &str) -> bool {
    a == b || format!("{a}.") == b || a == format!("{b}.")
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawType::Void => write!(f, "void"),
            RawType::Char => write!(f, "char"),
            RawType::Int => write!(f, "int"),
            RawType::Nil => write!(f, "null"),
            RawType::Pointer(inner) => write!(f, "&({inner})"),
            RawType::Function { ret, params } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")->{ret}")
            }
            RawType::Struct { name, .. } => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(t: RawType) -> RawType {
        RawType::Pointer(Rc::new(t))
    }

    #[test]
    fn nil_unifies_widely() {
        assert!(RawType::Nil.compatible(&RawType::Int));
        assert!(RawType::Int.compatible(&RawType::Nil));
        assert!(ptr(RawType::Int).compatible(&RawType::Nil));
        assert!(ptr(RawType::Int).same(&RawType::Nil));
        assert!(RawType::Nil.compatible(&ptr(RawType::Char)));
    }

    #[test]
    fn void_pointer_is_a_wildcard() {
        let vp = ptr(RawType::Void);
        let ip = ptr(RawType::Int);
        assert!(vp.compatible(&ip));
        assert!(ip.compatible(&vp));
        assert!(!vp.same(&ip));
    }

    #[test]
    fn pointers_compare_structurally() {
        let a = ptr(ptr(RawType::Int));
        let b = ptr(ptr(RawType::Int));
        let c = ptr(RawType::Int);
        assert!(a.same(&b));
        assert!(!a.same(&c));
        // any pointer matches any integer, but not exactly
        assert!(c.compatible(&RawType::Char));
        assert!(!c.same(&RawType::Char));
    }

    #[test]
    fn int_and_char_mix_loosely() {
        assert!(RawType::Int.compatible(&RawType::Char));
        assert!(!RawType::Int.same(&RawType::Char));
        assert!(!RawType::Void.compatible(&RawType::Int));
    }

    #[test]
    fn functions_admit_their_return_type() {
        let f = RawType::Function { ret: Rc::new(RawType::Int), params: vec![] };
        assert!(f.compatible(&RawType::Int));
        assert!(RawType::Int.compatible(&f));
        let g = RawType::Function { ret: Rc::new(RawType::Int), params: vec![Rc::new(RawType::Char)] };
        assert!(!f.same(&g));
    }

    #[test]
    fn sizes() {
        assert_eq!(RawType::Char.size(), 1);
        assert_eq!(RawType::Int.size(), 4);
        assert_eq!(RawType::Nil.size(), 4);
        assert_eq!(ptr(RawType::Char).size(), 8);
        assert_eq!(RawType::Function { ret: Rc::new(RawType::Void), params: vec![] }.size(), 1);
    }

    #[test]
    fn struct_size_is_padded() {
        // struct { char c; int i; } -> 4 + 4
        let s = RawType::Struct { name: "$.s".into(), member_sizes: vec![1, 4] };
        assert_eq!(s.size(), 8);
        // struct { char c; } -> 1
        let s = RawType::Struct { name: "$.s".into(), member_sizes: vec![1] };
        assert_eq!(s.size(), 1);
        // struct { int i; char c; } -> 5 padded to 8
        let s = RawType::Struct { name: "$.s".into(), member_sizes: vec![4, 1] };
        assert_eq!(s.size(), 8);
        // struct { char c; char *p; int i; } -> 1 pad 8 + 8 + 4 pad 24
        let s = RawType::Struct { name: "$.s".into(), member_sizes: vec![1, 8, 4] };
        assert_eq!(s.size(), 24);
    }

    #[test]
    fn declared_but_undefined_structs_are_incomplete() {
        let fwd = RawType::Struct { name: "$.a".into(), member_sizes: vec![] };
        assert!(fwd.is_incomplete());
        let s = RawType::Struct { name: "$.a".into(), member_sizes: vec![4] };
        assert!(!s.is_incomplete());
        // a pointer to an incomplete struct is itself complete
        assert!(!ptr(fwd).is_incomplete());
    }

    #[test]
    fn display_forms() {
        assert_eq!(RawType::Nil.to_string(), "null");
        assert_eq!(ptr(RawType::Int).to_string(), "&(int)");
        let f = RawType::Function {
            ret: Rc::new(RawType::Int),
            params: vec![Rc::new(RawType::Int), Rc::new(RawType::Char)],
        };
        assert_eq!(f.to_string(), "(int, char)->int");
    }
}
