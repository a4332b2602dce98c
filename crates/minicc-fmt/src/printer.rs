// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The canonical printer.
//!
//! Expressions come out fully parenthesized and declarators in their
//! re-associated spelling, so two programs print identically exactly when
//! their trees agree. Statement layout runs on a small mode machine: a
//! loop or if arm prints its body inline (`Inline`), an `else` continues
//! on the closing brace line (`Scope`), and an `else if` chains onto the
//! `else` (`If`).

use minicc_ast::decl::{Decl, DeclKind, Declarator, DeclaratorKind, ParamDecl, TranslationUnit};
use minicc_ast::expr::{Expr, ExprKind};
use minicc_ast::stmt::{BlockItem, Stmt, StmtKind};
use minicc_ast::ty::{ScalarKind, Ty, TyKind};

pub fn pretty_print(unit: &TranslationUnit) -> String {
    let mut printer = Printer { indent: 0, mode: Mode::Default };
    let mut out = String::new();
    for (i, decl) in unit.decls.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&printer.decl(decl));
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Default,
    Inline,
    If,
    Scope,
}

struct Printer {
    indent: usize,
    mode: Mode,
}

impl Printer {
    fn indent(&self) -> String {
        "\t".repeat(self.indent)
    }

    fn small_indent(&self) -> String {
        "\t".repeat(self.indent.saturating_sub(1))
    }

    // === Declarations ===

    fn decl(&mut self, decl: &Decl) -> String {
        match &decl.kind {
            DeclKind::FunctionDef { ret, decl, body } => {
                let header =
                    format!("{}{} {}\n", self.indent(), self.ty(ret), self.declarator(decl));
                format!("{header}{}", self.stmt(body))
            }
            DeclKind::FunctionDecl { ret, decl } => {
                format!("{}{} {};\n", self.indent(), self.ty(ret), self.declarator(decl))
            }
            DeclKind::Data { ty, decl } => {
                format!("{}{} {};\n", self.indent(), self.ty(ty), self.declarator(decl))
            }
            DeclKind::Struct { ty, alias } => match alias {
                Some(alias) => {
                    format!("{}{} {};\n", self.indent(), self.ty(ty), self.declarator(alias))
                }
                None => format!("{}{};\n", self.indent(), self.ty(ty)),
            },
        }
    }

    fn ty(&mut self, ty: &Ty) -> String {
        match &ty.kind {
            TyKind::Scalar(ScalarKind::Void) => "void".into(),
            TyKind::Scalar(ScalarKind::Char) => "char".into(),
            TyKind::Scalar(ScalarKind::Int) => "int".into(),
            TyKind::Struct { name, members } => {
                let mut out = String::from("struct");
                if let Some(name) = name {
                    out.push(' ');
                    out.push_str(name);
                }
                if let Some(members) = members {
                    out.push('\n');
                    out.push_str(&self.indent());
                    out.push_str("{\n");
                    self.indent += 1;
                    for member in members {
                        out.push_str(&self.decl(member));
                    }
                    self.indent -= 1;
                    out.push_str(&self.indent());
                    out.push('}');
                }
                out
            }
            TyKind::Abstract { base, ptr_depth } => {
                let n = *ptr_depth as usize;
                format!("{} {}{}", self.ty(base), "(*".repeat(n), ")".repeat(n))
            }
        }
    }

    fn declarator(&mut self, d: &Declarator) -> String {
        match &d.kind {
            DeclaratorKind::Direct(name) => name.clone(),
            DeclaratorKind::Abstract { ptr_depth } => {
                let n = *ptr_depth as usize;
                format!("{}{}", "(*".repeat(n), ")".repeat(n))
            }
            DeclaratorKind::Pointer { inner, depth } => {
                let n = *depth as usize;
                format!("{}{}{}", "(*".repeat(n), self.declarator(inner), ")".repeat(n))
            }
            DeclaratorKind::Function { inner, params, ret_ptr } => {
                let n = *ret_ptr as usize;
                let params: Vec<String> = params.iter().map(|p| self.param(p)).collect();
                format!(
                    "{}({}({})){}",
                    "(*".repeat(n),
                    self.declarator(inner),
                    params.join(", "),
                    ")".repeat(n)
                )
            }
        }
    }

    fn param(&mut self, p: &ParamDecl) -> String {
        match &p.decl {
            Some(d) => format!("{} {}", self.ty(&p.ty), self.declarator(d)),
            None => self.ty(&p.ty),
        }
    }

    // === Statements ===

    fn stmt(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Compound(items) => self.compound(items),
            StmtKind::If { cond, then_branch, else_branch } => {
                self.if_else(cond, then_branch, else_branch.as_deref())
            }
            _ => {
                // simple statements share the mode prologue
                match self.mode {
                    Mode::Inline => {
                        self.mode = Mode::Default;
                        return format!("\n{}", self.stmt(stmt));
                    }
                    Mode::If => {
                        self.mode = Mode::Inline;
                        return self.stmt(stmt);
                    }
                    Mode::Scope => {
                        self.mode = Mode::Inline;
                        let body = self.stmt(stmt);
                        return format!("{body}{}", self.small_indent());
                    }
                    Mode::Default => {}
                }
                match &stmt.kind {
                    StmtKind::While { cond, body } => {
                        let mut out = format!("{}while ({})", self.indent(), self.expr(cond));
                        self.mode = Mode::Inline;
                        self.indent += 1;
                        out.push_str(&self.stmt(body));
                        self.indent -= 1;
                        out
                    }
                    // labels sit at column zero
                    StmtKind::Label { name, stmt, .. } => {
                        format!("{name}:\n{}", self.stmt(stmt))
                    }
                    StmtKind::Goto { name, .. } => format!("{}goto {name};\n", self.indent()),
                    StmtKind::Expr(Some(expr)) => {
                        format!("{}{};\n", self.indent(), self.expr(expr))
                    }
                    StmtKind::Expr(None) => format!("{};\n", self.indent()),
                    StmtKind::Break => format!("{}break;\n", self.indent()),
                    StmtKind::Continue => format!("{}continue;\n", self.indent()),
                    StmtKind::Return(value) => {
                        let value = match value {
                            Some(expr) => format!(" {}", self.expr(expr)),
                            None => String::new(),
                        };
                        format!("{}return{value};\n", self.indent())
                    }
                    StmtKind::Compound(_) | StmtKind::If { .. } => unreachable!(),
                }
            }
        }
    }

    fn compound(&mut self, items: &[BlockItem]) -> String {
        match self.mode {
            Mode::Inline => {
                self.mode = Mode::Default;
                let body = self.block_items(items);
                format!(" {{\n{body}{}}}\n", self.small_indent())
            }
            Mode::If => {
                self.mode = Mode::Inline;
                self.compound(items)
            }
            // the closing brace keeps the line open for an `else`
            Mode::Scope => {
                self.mode = Mode::Default;
                let body = self.block_items(items);
                format!(" {{\n{body}{}}} ", self.small_indent())
            }
            Mode::Default => {
                self.indent += 1;
                let body = self.block_items(items);
                self.indent -= 1;
                format!("{0}{{\n{body}{0}}}\n", self.indent())
            }
        }
    }

    fn block_items(&mut self, items: &[BlockItem]) -> String {
        let mut out = String::new();
        for item in items {
            match item {
                BlockItem::Decl(decl) => out.push_str(&self.decl(decl)),
                BlockItem::Stmt(stmt) => out.push_str(&self.stmt(stmt)),
            }
        }
        out
    }

    fn if_else(&mut self, cond: &Expr, then: &Stmt, els: Option<&Stmt>) -> String {
        match self.mode {
            Mode::Inline => {
                self.mode = Mode::Default;
                format!("\n{}", self.if_else(cond, then, els))
            }
            Mode::If => {
                let mut out = format!(" if ({})", self.expr(cond));
                out.push_str(&self.branches(then, els));
                out
            }
            Mode::Scope => {
                self.mode = Mode::Inline;
                let body = self.if_else(cond, then, els);
                format!("{body}{}", self.small_indent())
            }
            Mode::Default => {
                let mut out = format!("{}if ({})", self.indent(), self.expr(cond));
                self.indent += 1;
                out.push_str(&self.branches(then, els));
                self.indent -= 1;
                out
            }
        }
    }

    fn branches(&mut self, then: &Stmt, els: Option<&Stmt>) -> String {
        let mut out = String::new();
        match els {
            Some(els) => {
                self.mode = Mode::Scope;
                out.push_str(&self.stmt(then));
                self.mode = Mode::If;
                out.push_str("else");
                out.push_str(&self.stmt(els));
            }
            None => {
                self.mode = Mode::Inline;
                out.push_str(&self.stmt(then));
            }
        }
        out
    }

    // === Expressions ===

    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Number(text) => text.clone(),
            ExprKind::CharLit(text) => format!("'{text}'"),
            ExprKind::StringLit(text) => format!("\"{text}\""),
            ExprKind::Member { base, member, arrow, .. } => {
                let op = if *arrow { "->" } else { "." };
                format!("({}{op}{member})", self.expr(base))
            }
            ExprKind::Index { base, index } => {
                format!("({}[{}])", self.expr(base), self.expr(index))
            }
            ExprKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("({}({}))", self.expr(callee), args.join(", "))
            }
            ExprKind::Unary { op, operand } => {
                format!("({}{})", op.symbol(), self.expr(operand))
            }
            ExprKind::SizeofExpr(operand) => format!("(sizeof {})", self.expr(operand)),
            ExprKind::SizeofType(ty) => format!("(sizeof({}))", self.ty(ty)),
            ExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", self.expr(lhs), op.symbol(), self.expr(rhs))
            }
            ExprKind::Ternary { cond, then_expr, else_expr } => format!(
                "({} ? {} : {})",
                self.expr(cond),
                self.expr(then_expr),
                self.expr(else_expr)
            ),
            ExprKind::Assign { op, lhs, rhs } => {
                format!("({} {} {})", self.expr(lhs), op.symbol(), self.expr(rhs))
            }
        }
    }
}
