// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Semantic analysis for the C subset.
//!
//! Resolves names through qualified-name scopes, type-checks every
//! expression against the structural `RawType` model and enforces the
//! control-flow rules (labels, loops, returns). Results land in an
//! [`Analysis`] keyed by AST node ids; the AST itself is never mutated.

mod analyzer;
mod raw_type;
mod scope;

pub use analyzer::{analyze, Analysis, SemanticError};
pub use raw_type::RawType;
pub use scope::ScopeContext;

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Result<Analysis, SemanticError> {
        let tokens = minicc_lexer::Lexer::new(src)
            .tokenize()
            .unwrap_or_else(|e| panic!("lex error: {e}"));
        let unit = minicc_parser::Parser::new(tokens)
            .parse()
            .unwrap_or_else(|e| panic!("parse error: {e}"));
        analyze(&unit)
    }

    fn ok(src: &str) -> Analysis {
        run(src).unwrap_or_else(|e| panic!("unexpected error: {e}"))
    }

    fn fail(src: &str) -> SemanticError {
        match run(src) {
            Ok(_) => panic!("expected a semantic error for {src:?}"),
            Err(e) => e,
        }
    }

    #[test]
    fn block_scope_dies_with_the_block() {
        let err = fail("int main() { { int a; } a = 1; }");
        assert_eq!(err.message, "Use of undeclared identifier 'a'");
        let err = fail("int main() { while (1) { int x; } x = 1; }");
        assert_eq!(err.message, "Use of undeclared identifier 'x'");
    }

    #[test]
    fn redefinition_in_the_same_block() {
        let err = fail("int main() { int a; int a; }");
        assert_eq!(err.message, "Redefinition of 'a'");
    }

    #[test]
    fn inner_block_shadows_outer() {
        ok("int main() { int a; { int a; a = 2; } a = 1; }");
    }

    #[test]
    fn tentative_globals() {
        ok("int g;\nint g;");
        ok("int f(int);\nint f(int);");
        let err = fail("int g;\nchar g;");
        assert_eq!(err.message, "Redefinition of 'g' with a different type");
    }

    #[test]
    fn function_redefinition() {
        let err = fail("int f() { } int f() { }");
        assert_eq!(err.message, "Redefinition of 'f'");
        ok("int f(int);\nint f(int a) { return a; }");
        let err = fail("int f(int);\nchar f(int a) { return a; }");
        assert_eq!(err.message, "Redefinition of 'f' with a different type");
    }

    #[test]
    fn function_pointer_cannot_be_defined() {
        let err = fail("int (*g)(int) { }");
        assert_eq!(err.message, "Can't define the function pointer 'g'");
    }

    #[test]
    fn parameter_checks() {
        let err = fail("int f(int a, int a) { }");
        assert_eq!(err.message, "Redefinition of 'a'");
        let err = fail("int f(int) { }");
        assert_eq!(err.message, "Parameter name omitted");
        let err = fail("void f(void x) { }");
        assert_eq!(err.message, "Parameter has incomplete type 'void'");
    }

    #[test]
    fn void_variable_is_incomplete() {
        let err = fail("void v;");
        assert_eq!(err.to_string(), "1:6: error: Variable has incomplete type 'void'");
    }

    #[test]
    fn label_resolution() {
        ok("int main() { goto done; done: ; }");
        ok("int main() { back: goto back; }");
        let err = fail("int main() { foo: ; foo: ; }");
        assert_eq!(err.message, "Redefinition of label 'foo'");
        let err = fail("int main() { goto foo; }");
        assert_eq!(err.message, "Use of undeclared label 'foo'");
    }

    #[test]
    fn labels_reset_between_functions() {
        ok("int f() { l: ; } int g() { l: ; }");
        let err = fail("int f() { l: ; } int g() { goto l; }");
        assert_eq!(err.message, "Use of undeclared label 'l'");
    }

    #[test]
    fn break_and_continue_need_a_loop() {
        ok("int main() { while (1) { break; } }");
        ok("int main() { while (1) { while (1) continue; break; } }");
        let err = fail("int main() { break; }");
        assert_eq!(err.message, "'break' statement not in a loop statement");
        let err = fail("int main() { if (1) continue; }");
        assert_eq!(err.message, "'continue' statement not in a loop statement");
    }

    #[test]
    fn pointer_difference_is_int() {
        ok("int main() { int *p; int *q; int d; d = p - q; }");
        let err = fail("int main() { int *p; char *c; p - c; }");
        assert_eq!(
            err.message,
            "'&(int)' and '&(char)' are not pointers to compatible types"
        );
    }

    #[test]
    fn pointer_arithmetic() {
        ok("int main() { int *p; p = p + 1; p = p - 2; p = 1 + p; }");
        let err = fail("int main() { int *p; int *q; p + q; }");
        assert_eq!(
            err.message,
            "Invalid operands to binary expression ('&(int)' and '&(int)')"
        );
    }

    #[test]
    fn null_literal_unifies_with_pointers() {
        ok("int main() { int *p; p = 0; if (p == 0) ; }");
    }

    #[test]
    fn integer_literal_validation() {
        ok("int main() { int a; a = 2147483647; a = 0; }");
        let err = fail("int main() { int a; a = 007; }");
        assert_eq!(err.message, "Invalid integer literal '007'");
        let err = fail("int main() { int a; a = 2147483648; }");
        assert_eq!(err.message, "Integer literal '2147483648' is out of range");
    }

    #[test]
    fn undeclared_identifier() {
        let err = fail("int main() { x = 1; }");
        assert_eq!(err.message, "Use of undeclared identifier 'x'");
    }

    #[test]
    fn assignment_needs_a_place() {
        let err = fail("int main() { 1 = 2; }");
        assert_eq!(err.message, "Expression is not assignable");
        let err = fail("struct s { int x; }; int main() { struct s v; int a; a = v; }");
        assert_eq!(err.message, "Assigning to 'int' from incompatible type '$.s'");
    }

    #[test]
    fn address_of_needs_a_place() {
        ok("int main() { int a; int *p; p = &a; }");
        let err = fail("int main() { int a; int *p; p = &(a + 1); }");
        assert_eq!(err.message, "Can't get address of temporary object");
    }

    #[test]
    fn indirection_needs_a_pointer() {
        ok("int main() { int a; int *p; p = &a; *p = 1; }");
        let err = fail("int main() { int a; *a = 1; }");
        assert_eq!(err.message, "Indirection requires pointer operand ('int' invalid)");
    }

    #[test]
    fn call_arity_and_argument_types() {
        ok("int f(int); int main() { return f(1); }");
        let err = fail("int f(int); int main() { return f(1, 2); }");
        assert_eq!(err.message, "Too many arguments to function call");
        let err = fail("int f(int); int main() { return f(); }");
        assert_eq!(err.message, "Too few arguments to function call");
        let err = fail("struct s { int x; }; int f(int); int main() { struct s v; return f(v); }");
        assert_eq!(err.message, "Passing '$.s' to parameter of incompatible type 'int'");
        let err = fail("int main() { int a; a(); }");
        assert_eq!(err.message, "Called object is not a function or function pointer");
    }

    #[test]
    fn calls_through_function_pointers() {
        ok("int (*g)(int); int main() { return g(1); }");
    }

    #[test]
    fn void_parameter_is_a_wildcard() {
        // a lone unnamed void is the empty parameter list, but alongside
        // other parameters it accepts any argument
        ok("struct s { int x; }; int f(void, int); int main() { struct s v; return f(v, 1); }");
    }

    #[test]
    fn member_access() {
        ok("struct s { int x; }; int main() { struct s v; v.x = 1; }");
        ok("struct s { int x; }; int main() { struct s *p; p->x = 1; }");
        let err = fail("struct s { int x; }; int main() { struct s v; v.y = 1; }");
        assert_eq!(err.message, "No member named 'y' in '$.s'");
        let err = fail("struct s { int x; }; int main() { struct s v; v->x = 1; }");
        assert_eq!(err.message, "Member reference type '$.s' is not a pointer");
        let err = fail("int main() { int a; a.x = 1; }");
        assert_eq!(err.message, "Member reference base type 'int' is not a structure");
    }

    #[test]
    fn struct_redefinition_and_shadowing() {
        let err = fail("struct s { int x; }; struct s { int x; };");
        assert_eq!(err.message, "Redefinition of 's'");
        let err = fail("void main(int a) { struct S { int a; } s; struct S { int a; } t; }");
        assert_eq!(err.message, "Redefinition of 'S'");
        // an inner scope may define its own tag
        ok("struct s { int x; }; int main() { struct s { char c; }; struct s v; v.c = 'a'; }");
    }

    #[test]
    fn incomplete_struct_types_cannot_provide_storage() {
        let err = fail(
            "struct A; struct B { int i; struct A a; }; \
             int main() { int x; x = sizeof(struct B); return 0; }",
        );
        assert_eq!(err.message, "Field has incomplete type '$.A'");
        let err = fail("struct A; struct A a;");
        assert_eq!(err.message, "Variable has incomplete type '$.A'");
        let err = fail("struct A; int main() { struct A a; }");
        assert_eq!(err.message, "Variable has incomplete type '$.A'");
        let err = fail("struct s { struct s inner; };");
        assert_eq!(err.message, "Field has incomplete type '$.s'");
        // pointers to a forward-declared struct are fine, and so is the
        // variable once the definition lands
        ok("struct A; struct B { struct A *p; }; struct A { int i; }; struct A a;");
    }

    #[test]
    fn anonymous_struct_members_flatten() {
        ok("int main() { struct { int x; } v; v.x = 1; }");
        ok("struct s { struct { int x; }; int y; }; int main() { struct s v; v.x = v.y; }");
    }

    #[test]
    fn subscript_checks() {
        ok("int main() { int *p; p[0] = 1; 1[p] = 2; }");
        let err = fail("int main() { int a; a[0] = 1; }");
        assert_eq!(err.message, "Subscripted value is not a pointer");
        let err = fail("int main() { int *p; int *q; p[q] = 1; }");
        assert_eq!(err.message, "Array subscript is not an integer");
    }

    #[test]
    fn return_type_checks() {
        let err = fail("void f() { return 1; }");
        assert_eq!(err.message, "Void function 'f' should not return a value");
        let err = fail("int f() { return; }");
        assert_eq!(err.message, "Non-void function 'f' should return a value");
        let err = fail("struct s { int x; }; int f() { struct s v; return v; }");
        assert_eq!(
            err.message,
            "Returning '$.s' from a function with incompatible result type 'int'"
        );
    }

    #[test]
    fn conditions_need_scalar_types() {
        let err = fail("struct s { int x; }; int main() { struct s v; if (v) ; }");
        assert_eq!(
            err.message,
            "Statement requires expression of scalar type ('$.s' invalid)"
        );
        let err = fail("struct s { int x; }; int main() { struct s v; int a; a = v ? 1 : 2; }");
        assert_eq!(
            err.message,
            "Used type '$.s' where arithmetic or pointer type is required"
        );
    }

    #[test]
    fn ternary_branches_must_agree() {
        ok("int main() { int a; a = 1 ? 2 : 3; }");
        ok("int main() { int *p; p = 1 ? p : 0; }");
        let err = fail("struct s { int x; }; int main() { struct s v; int a; a = 1 ? v : 2; }");
        assert_eq!(err.message, "Incompatible operand types ('$.s' and 'int')");
    }

    #[test]
    fn sizeof_folds_constants() {
        // sizeof of a sizeof expression is pointer sized
        let analysis = ok("int main() { int a; a = sizeof(sizeof a); }");
        let mut values: Vec<i64> = analysis.sizeof_values.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![4, 8]);

        // a string literal measures its unescaped length plus the NUL
        let analysis = ok("int main() { int a; a = sizeof(\"ab\\n\"); }");
        let values: Vec<i64> = analysis.sizeof_values.values().copied().collect();
        assert_eq!(values, vec![4]);

        let analysis = ok("int main() { int a; a = sizeof(int *); }");
        let values: Vec<i64> = analysis.sizeof_values.values().copied().collect();
        assert_eq!(values, vec![8]);

        // struct { char c; int i; } pads to 8
        let analysis =
            ok("struct s { char c; int i; }; int main() { int a; a = sizeof(struct s); }");
        let values: Vec<i64> = analysis.sizeof_values.values().copied().collect();
        assert_eq!(values, vec![8]);
    }

    #[test]
    fn unary_operand_types() {
        ok("int main() { int a; a = -a; a = !a; }");
        let err = fail("struct s { int x; }; int main() { struct s v; -v; }");
        assert_eq!(err.message, "Invalid argument type '$.s' to unary expression");
    }

    #[test]
    fn error_display_carries_the_location() {
        let err = fail("int main() {\n  break;\n}");
        assert_eq!(err.to_string(), "2:3: error: 'break' statement not in a loop statement");
    }
}
