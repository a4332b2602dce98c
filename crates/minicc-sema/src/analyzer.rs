// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The semantic analyzer.
//!
//! A single pass over the AST that resolves every name against the
//! qualified-name scope context, computes a `RawType` for every declaration
//! and expression, folds `sizeof`, and enforces the declaration, type and
//! control-flow rules. Fail-fast: the first violation aborts the analysis.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use minicc_ast::decl::{Decl, DeclKind, Declarator, DeclaratorKind, ParamDecl, TranslationUnit};
use minicc_ast::expr::{BinOp, Expr, ExprKind, UnaryOp};
use minicc_ast::stmt::{BlockItem, Stmt, StmtKind};
use minicc_ast::ty::{ScalarKind, Ty, TyKind};
use minicc_ast::{Loc, NodeId};
use thiserror::Error;

use crate::raw_type::RawType;
use crate::scope::ScopeContext;

/// A fatal semantic error. Analysis never continues past the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{loc}: error: {message}")]
pub struct SemanticError {
    pub loc: Loc,
    pub message: String,
}

/// Resolution results, keyed by `NodeId`.
#[derive(Debug, Default)]
pub struct Analysis {
    /// The resolved type of every declaration and expression node.
    pub types: HashMap<NodeId, Rc<RawType>>,
    /// Qualified names for declarations, identifier uses and member
    /// accesses.
    pub names: HashMap<NodeId, String>,
    /// The folded constant of every `sizeof` expression.
    pub sizeof_values: HashMap<NodeId, i64>,
}

pub fn analyze(unit: &TranslationUnit) -> Result<Analysis, SemanticError> {
    let mut analyzer = Analyzer::new();
    for decl in &unit.decls {
        analyzer.check_decl(decl)?;
    }
    Ok(analyzer.analysis)
}

fn err<T>(loc: Loc, message: String) -> Result<T, SemanticError> {
    Err(SemanticError { loc, message })
}

struct ExprInfo {
    ty: Rc<RawType>,
    lvalue: bool,
}

impl ExprInfo {
    fn value(ty: Rc<RawType>) -> Self {
        ExprInfo { ty, lvalue: false }
    }

    fn place(ty: Rc<RawType>) -> Self {
        ExprInfo { ty, lvalue: true }
    }
}

struct Analyzer {
    scope: ScopeContext,
    analysis: Analysis,
    loop_depth: u32,
    labels: HashSet<String>,
    unresolved_labels: Vec<(String, Loc)>,
    current_fn: String,
    current_ret: Option<Rc<RawType>>,
}

impl Analyzer {
    fn new() -> Self {
        Analyzer {
            scope: ScopeContext::new(),
            analysis: Analysis::default(),
            loop_depth: 0,
            labels: HashSet::new(),
            unresolved_labels: Vec::new(),
            current_fn: String::new(),
            current_ret: None,
        }
    }

    // === Declarations ===

    fn check_decl(&mut self, decl: &Decl) -> Result<(), SemanticError> {
        match &decl.kind {
            DeclKind::FunctionDef { ret, decl: d, body } => {
                self.function_def(decl.id, ret, d, body)
            }
            DeclKind::FunctionDecl { ret, decl: d } => self.object_decl(decl.id, ret, d, false),
            DeclKind::Data { ty, decl: d } => self.object_decl(decl.id, ty, d, true),
            DeclKind::Struct { ty, alias } => {
                let sty = self.build_type(ty)?;
                self.analysis.types.insert(decl.id, sty.clone());
                if let Some(alias) = alias {
                    let (named, aty) = self.build_declarator(sty, alias)?;
                    let Some((name, name_loc)) = named else {
                        return err(alias.loc, "Declaration does not declare anything".into());
                    };
                    if aty.is_incomplete() {
                        return err(name_loc, format!("Variable has incomplete type '{aty}'"));
                    }
                    let qname = self.declare_object(&name, name_loc, aty.clone())?;
                    self.analysis.types.insert(decl.id, aty);
                    self.analysis.names.insert(decl.id, qname);
                }
                Ok(())
            }
        }
    }

    /// Variable and function declarations share this path; only variables
    /// reject the incomplete `void` type (function declarators produce a
    /// function type, never bare `void`).
    fn object_decl(
        &mut self,
        id: NodeId,
        ty: &Ty,
        d: &Declarator,
        reject_void: bool,
    ) -> Result<(), SemanticError> {
        let base = self.build_type(ty)?;
        let (named, dty) = self.build_declarator(base, d)?;
        let Some((name, name_loc)) = named else {
            return err(d.loc, "Declaration does not declare anything".into());
        };
        if reject_void && (*dty == RawType::Void || dty.is_incomplete()) {
            return err(name_loc, format!("Variable has incomplete type '{dty}'"));
        }
        let qname = self.declare_object(&name, name_loc, dty.clone())?;
        self.analysis.types.insert(id, dty);
        self.analysis.names.insert(id, qname);
        Ok(())
    }

    /// Declares `name` in the current scope. Redeclaring an identical type
    /// at file scope is a tentative redeclaration and allowed; everything
    /// else is a redefinition error.
    fn declare_object(
        &mut self,
        name: &str,
        name_loc: Loc,
        ty: Rc<RawType>,
    ) -> Result<String, SemanticError> {
        let qname = self.scope.qualify(name);
        if let Some(existing) = self.scope.get(&qname) {
            if !existing.same(&ty) {
                return err(
                    name_loc,
                    format!("Redefinition of '{name}' with a different type"),
                );
            }
            if !self.scope.at_file_scope() {
                return err(name_loc, format!("Redefinition of '{name}'"));
            }
            return Ok(qname);
        }
        self.scope.declare(qname.clone(), ty);
        Ok(qname)
    }

    fn function_def(
        &mut self,
        id: NodeId,
        ret: &Ty,
        d: &Declarator,
        body: &Stmt,
    ) -> Result<(), SemanticError> {
        let ret_ty = self.build_type(ret)?;
        let (named, fn_ty) = self.build_declarator(ret_ty, d)?;
        let Some((name, name_loc)) = named else {
            return err(d.loc, "Declaration does not declare anything".into());
        };
        if !matches!(*fn_ty, RawType::Function { .. }) {
            return err(name_loc, format!("Can't define the function pointer '{name}'"));
        }

        let qname = self.scope.qualify(&name);
        if self.scope.is_defined(&qname) {
            return err(name_loc, format!("Redefinition of '{name}'"));
        }
        if let Some(existing) = self.scope.get(&qname) {
            if !existing.same(&fn_ty) {
                return err(
                    name_loc,
                    format!("Redefinition of '{name}' with a different type"),
                );
            }
        }
        self.scope.declare(qname.clone(), fn_ty.clone());
        self.scope.define(qname.clone());
        self.analysis.types.insert(id, fn_ty.clone());
        self.analysis.names.insert(id, qname);

        let DeclaratorKind::Function { params: param_decls, .. } = &d.kind else {
            return err(d.loc, format!("Can't define the function pointer '{name}'"));
        };
        let RawType::Function { ret: ret_ty, params: param_tys } = &*fn_ty else {
            return err(d.loc, format!("Can't define the function pointer '{name}'"));
        };

        self.scope.enter(name.clone());
        self.labels.clear();
        self.unresolved_labels.clear();
        self.current_fn = name;
        self.current_ret = Some(ret_ty.clone());

        for (pd, pty) in param_decls.iter().zip(param_tys) {
            let pname = pd.decl.as_ref().and_then(|pdecl| pdecl.name());
            let Some(pname) = pname else {
                return err(pd.loc, "Parameter name omitted".into());
            };
            let pq = self.scope.qualify(pname);
            if self.scope.get(&pq).is_some() {
                return err(pd.loc, format!("Redefinition of '{pname}'"));
            }
            self.scope.declare(pq.clone(), pty.clone());
            self.analysis.types.insert(pd.id, pty.clone());
            self.analysis.names.insert(pd.id, pq);
        }

        self.check_stmt(body)?;

        if let Some((label, loc)) = self.unresolved_labels.first() {
            return err(*loc, format!("Use of undeclared label '{label}'"));
        }
        self.scope.leave();
        self.current_ret = None;
        Ok(())
    }

    // === Types ===

    fn build_type(&mut self, ty: &Ty) -> Result<Rc<RawType>, SemanticError> {
        match &ty.kind {
            TyKind::Scalar(ScalarKind::Void) => Ok(Rc::new(RawType::Void)),
            TyKind::Scalar(ScalarKind::Char) => Ok(Rc::new(RawType::Char)),
            TyKind::Scalar(ScalarKind::Int) => Ok(Rc::new(RawType::Int)),
            TyKind::Abstract { base, ptr_depth } => {
                let mut built = self.build_type(base)?;
                for _ in 0..*ptr_depth {
                    built = Rc::new(RawType::Pointer(built));
                }
                Ok(built)
            }
            TyKind::Struct { name, members } => self.struct_type(ty.loc, name, members),
        }
    }

    fn struct_type(
        &mut self,
        loc: Loc,
        name: &Option<String>,
        members: &Option<Vec<Decl>>,
    ) -> Result<Rc<RawType>, SemanticError> {
        match (name, members) {
            (Some(tag), Some(member_decls)) => {
                let qname = self.scope.qualify(tag);
                if self.scope.is_defined(&qname) {
                    return err(loc, format!("Redefinition of '{tag}'"));
                }
                if let Some(existing) = self.scope.get(&qname) {
                    if !matches!(*existing, RawType::Struct { .. }) {
                        return err(
                            loc,
                            format!("Redefinition of '{tag}' with a different type"),
                        );
                    }
                }
                // placeholder so members can point at the struct itself
                self.scope.declare(
                    qname.clone(),
                    Rc::new(RawType::Struct { name: qname.clone(), member_sizes: vec![] }),
                );
                self.scope.enter(tag.clone());
                let mut sizes = Vec::new();
                for member in member_decls {
                    sizes.extend(self.member_decl(member)?);
                }
                self.scope.leave_keep();
                let ty = Rc::new(RawType::Struct { name: qname.clone(), member_sizes: sizes });
                self.scope.declare(qname.clone(), ty.clone());
                self.scope.define(qname);
                Ok(ty)
            }
            (Some(tag), None) => {
                if let Some((_, existing)) = self.scope.lookup(tag) {
                    if matches!(*existing, RawType::Struct { .. }) {
                        return Ok(existing);
                    }
                    return err(loc, format!("'{tag}' does not name a struct type"));
                }
                // forward reference, incomplete until defined
                let qname = self.scope.qualify(tag);
                let ty = Rc::new(RawType::Struct { name: qname.clone(), member_sizes: vec![] });
                self.scope.declare(qname, ty.clone());
                Ok(ty)
            }
            (None, Some(member_decls)) => {
                // anonymous: members flatten into the surrounding scope and
                // the type is named after it
                let mut sizes = Vec::new();
                for member in member_decls {
                    sizes.extend(self.member_decl(member)?);
                }
                Ok(Rc::new(RawType::Struct {
                    name: self.scope.current_path(),
                    member_sizes: sizes,
                }))
            }
            (None, None) => err(loc, "Declaration does not declare anything".into()),
        }
    }

    /// One struct member. Returns its contribution to the ordered member
    /// size list; anonymous struct members contribute their own members.
    fn member_decl(&mut self, member: &Decl) -> Result<Vec<i64>, SemanticError> {
        match &member.kind {
            DeclKind::Data { ty, decl } | DeclKind::FunctionDecl { ret: ty, decl } => {
                let base = self.build_type(ty)?;
                let (named, dty) = self.build_declarator(base, decl)?;
                let Some((name, name_loc)) = named else {
                    return err(decl.loc, "Declaration does not declare anything".into());
                };
                if *dty == RawType::Void || dty.is_incomplete() {
                    return err(name_loc, format!("Field has incomplete type '{dty}'"));
                }
                let qname = self.declare_object(&name, name_loc, dty.clone())?;
                let size = dty.size();
                self.analysis.types.insert(member.id, dty);
                self.analysis.names.insert(member.id, qname);
                Ok(vec![size])
            }
            DeclKind::Struct { ty, alias } => {
                let sty = self.build_type(ty)?;
                self.analysis.types.insert(member.id, sty.clone());
                if let Some(alias) = alias {
                    let (named, aty) = self.build_declarator(sty, alias)?;
                    let Some((name, name_loc)) = named else {
                        return err(alias.loc, "Declaration does not declare anything".into());
                    };
                    if aty.is_incomplete() {
                        return err(name_loc, format!("Field has incomplete type '{aty}'"));
                    }
                    let qname = self.declare_object(&name, name_loc, aty.clone())?;
                    let size = aty.size();
                    self.analysis.names.insert(member.id, qname);
                    self.analysis.types.insert(member.id, aty);
                    return Ok(vec![size]);
                }
                match &*sty {
                    // anonymous member: its flattened members take storage
                    RawType::Struct { name, member_sizes }
                        if *name == self.scope.current_path() =>
                    {
                        Ok(member_sizes.clone())
                    }
                    // a nested tag definition declares a type, no storage
                    _ => Ok(Vec::new()),
                }
            }
            DeclKind::FunctionDef { .. } => {
                err(member.loc, "Function definition is not allowed here".into())
            }
        }
    }

    /// Builds the declared type by peeling the declarator against the base
    /// type, returning the declared name (if any) with its location.
    #[allow(clippy::type_complexity)]
    fn build_declarator(
        &mut self,
        base: Rc<RawType>,
        d: &Declarator,
    ) -> Result<(Option<(String, Loc)>, Rc<RawType>), SemanticError> {
        match &d.kind {
            DeclaratorKind::Direct(name) => Ok((Some((name.clone(), d.loc)), base)),
            DeclaratorKind::Abstract { ptr_depth } => {
                Ok((None, wrap_pointers(base, *ptr_depth)))
            }
            DeclaratorKind::Pointer { inner, depth } => {
                self.build_declarator(wrap_pointers(base, *depth), inner)
            }
            DeclaratorKind::Function { inner, params, ret_ptr } => {
                let ret = wrap_pointers(base, *ret_ptr);
                let mut param_tys = Vec::with_capacity(params.len());
                for p in params {
                    param_tys.push(self.build_param(p)?);
                }
                let fn_ty = Rc::new(RawType::Function { ret, params: param_tys });
                self.build_declarator(fn_ty, inner)
            }
        }
    }

    fn build_param(&mut self, p: &ParamDecl) -> Result<Rc<RawType>, SemanticError> {
        let base = self.build_type(&p.ty)?;
        let ty = match &p.decl {
            Some(d) => self.build_declarator(base, d)?.1,
            None => base,
        };
        // an unnamed void parameter stays as a wildcard; naming it claims
        // storage for an incomplete type
        if *ty == RawType::Void && p.decl.as_ref().and_then(|d| d.name()).is_some() {
            return err(p.loc, "Parameter has incomplete type 'void'".into());
        }
        Ok(ty)
    }

    // === Statements ===

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match &stmt.kind {
            StmtKind::Compound(items) => {
                self.scope.enter("$");
                for item in items {
                    match item {
                        BlockItem::Decl(decl) => self.check_decl(decl)?,
                        BlockItem::Stmt(inner) => self.check_stmt(inner)?,
                    }
                }
                self.scope.leave();
                Ok(())
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.check_condition(cond)?;
                self.scope.enter("if");
                self.check_stmt(then_branch)?;
                self.scope.leave();
                if let Some(else_branch) = else_branch {
                    self.scope.enter("else");
                    self.check_stmt(else_branch)?;
                    self.scope.leave();
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond)?;
                self.scope.enter("while");
                self.loop_depth += 1;
                self.check_stmt(body)?;
                self.loop_depth -= 1;
                self.scope.leave();
                Ok(())
            }
            StmtKind::Label { name, name_loc, stmt } => {
                if !self.labels.insert(name.clone()) {
                    return err(*name_loc, format!("Redefinition of label '{name}'"));
                }
                self.unresolved_labels.retain(|(l, _)| l != name);
                self.check_stmt(stmt)
            }
            StmtKind::Goto { name, name_loc } => {
                // forward references resolve when the label appears; what
                // is left over is reported at the end of the function
                if !self.labels.contains(name) {
                    self.unresolved_labels.push((name.clone(), *name_loc));
                }
                Ok(())
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    return err(stmt.loc, "'break' statement not in a loop statement".into());
                }
                Ok(())
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    return err(
                        stmt.loc,
                        "'continue' statement not in a loop statement".into(),
                    );
                }
                Ok(())
            }
            StmtKind::Return(value) => self.check_return(stmt.loc, value.as_ref()),
            StmtKind::Expr(Some(expr)) => self.check_expr(expr).map(|_| ()),
            StmtKind::Expr(None) => Ok(()),
        }
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<(), SemanticError> {
        let info = self.check_expr(cond)?;
        if !info.ty.compatible(&RawType::Int) {
            return err(
                cond.loc,
                format!("Statement requires expression of scalar type ('{}' invalid)", info.ty),
            );
        }
        Ok(())
    }

    fn check_return(&mut self, loc: Loc, value: Option<&Expr>) -> Result<(), SemanticError> {
        let Some(ret) = self.current_ret.clone() else {
            return Ok(());
        };
        match value {
            Some(expr) => {
                let info = self.check_expr(expr)?;
                if *ret == RawType::Void {
                    return err(
                        loc,
                        format!("Void function '{}' should not return a value", self.current_fn),
                    );
                }
                if !ret.compatible(&info.ty) {
                    return err(
                        loc,
                        format!(
                            "Returning '{}' from a function with incompatible result type '{}'",
                            info.ty, ret
                        ),
                    );
                }
                Ok(())
            }
            None => {
                if *ret != RawType::Void {
                    return err(
                        loc,
                        format!("Non-void function '{}' should return a value", self.current_fn),
                    );
                }
                Ok(())
            }
        }
    }

    // === Expressions ===

    fn check_expr(&mut self, expr: &Expr) -> Result<ExprInfo, SemanticError> {
        let info = self.check_expr_inner(expr)?;
        self.analysis.types.insert(expr.id, info.ty.clone());
        Ok(info)
    }

    fn check_expr_inner(&mut self, expr: &Expr) -> Result<ExprInfo, SemanticError> {
        match &expr.kind {
            ExprKind::Ident(name) => {
                let Some((qname, ty)) = self.scope.lookup(name) else {
                    return err(expr.loc, format!("Use of undeclared identifier '{name}'"));
                };
                self.analysis.names.insert(expr.id, qname);
                Ok(ExprInfo::place(ty))
            }
            ExprKind::Number(text) => {
                if text != "0" && text.starts_with('0') {
                    return err(expr.loc, format!("Invalid integer literal '{text}'"));
                }
                match text.parse::<i32>() {
                    Ok(0) => Ok(ExprInfo::value(Rc::new(RawType::Nil))),
                    Ok(_) => Ok(ExprInfo::value(Rc::new(RawType::Int))),
                    Err(_) => err(expr.loc, format!("Integer literal '{text}' is out of range")),
                }
            }
            ExprKind::CharLit(_) => Ok(ExprInfo::value(Rc::new(RawType::Char))),
            ExprKind::StringLit(_) => Ok(ExprInfo::value(Rc::new(RawType::Pointer(Rc::new(
                RawType::Char,
            ))))),
            ExprKind::Member { base, member, member_loc, arrow } => {
                let base_info = self.check_expr(base)?;
                let target = if *arrow {
                    match base_info.ty.deref() {
                        Some(inner) => inner.clone(),
                        None => {
                            return err(
                                expr.loc,
                                format!(
                                    "Member reference type '{}' is not a pointer",
                                    base_info.ty
                                ),
                            )
                        }
                    }
                } else {
                    base_info.ty.clone()
                };
                let RawType::Struct { name: tag, .. } = &*target else {
                    return err(
                        expr.loc,
                        format!("Member reference base type '{target}' is not a structure"),
                    );
                };
                let key = format!("{tag}.{member}");
                let Some(mty) = self.scope.get(&key) else {
                    return err(*member_loc, format!("No member named '{member}' in '{tag}'"));
                };
                self.analysis.names.insert(expr.id, key);
                Ok(ExprInfo::place(mty))
            }
            ExprKind::Index { base, index } => {
                let base_info = self.check_expr(base)?;
                let index_info = self.check_expr(index)?;
                let (pointer, integer) = if base_info.ty.deref().is_some() {
                    (&base_info, &index_info)
                } else if index_info.ty.deref().is_some() {
                    (&index_info, &base_info)
                } else {
                    return err(expr.loc, "Subscripted value is not a pointer".into());
                };
                if !integer.ty.is_int_like() {
                    return err(expr.loc, "Array subscript is not an integer".into());
                }
                let inner = pointer.ty.deref().cloned();
                match inner {
                    Some(inner) => Ok(ExprInfo::place(inner)),
                    None => err(expr.loc, "Subscripted value is not a pointer".into()),
                }
            }
            ExprKind::Call { callee, args } => {
                let callee_info = self.check_expr(callee)?;
                let fn_ty = match &*callee_info.ty {
                    RawType::Function { .. } => callee_info.ty.clone(),
                    RawType::Pointer(inner) if matches!(**inner, RawType::Function { .. }) => {
                        inner.clone()
                    }
                    _ => {
                        return err(
                            expr.loc,
                            "Called object is not a function or function pointer".into(),
                        )
                    }
                };
                let RawType::Function { ret, params } = &*fn_ty else {
                    return err(
                        expr.loc,
                        "Called object is not a function or function pointer".into(),
                    );
                };
                if args.len() > params.len() {
                    return err(expr.loc, "Too many arguments to function call".into());
                }
                if args.len() < params.len() {
                    return err(expr.loc, "Too few arguments to function call".into());
                }
                for (arg, param) in args.iter().zip(params) {
                    let arg_info = self.check_expr(arg)?;
                    // a void formal is a wildcard, anything may be passed
                    if matches!(**param, RawType::Void) {
                        continue;
                    }
                    if !param.compatible(&arg_info.ty) {
                        return err(
                            arg.loc,
                            format!(
                                "Passing '{}' to parameter of incompatible type '{param}'",
                                arg_info.ty
                            ),
                        );
                    }
                }
                Ok(ExprInfo::value(ret.clone()))
            }
            ExprKind::Unary { op, operand } => {
                let info = self.check_expr(operand)?;
                match op {
                    UnaryOp::AddrOf => {
                        if !info.lvalue {
                            return err(expr.loc, "Can't get address of temporary object".into());
                        }
                        Ok(ExprInfo::value(Rc::new(RawType::Pointer(info.ty))))
                    }
                    UnaryOp::Deref => match &*info.ty {
                        RawType::Pointer(inner) => Ok(ExprInfo::place(inner.clone())),
                        RawType::Function { .. } => Ok(ExprInfo::place(info.ty.clone())),
                        other => err(
                            expr.loc,
                            format!("Indirection requires pointer operand ('{other}' invalid)"),
                        ),
                    },
                    UnaryOp::Neg | UnaryOp::Not => {
                        if !info.ty.is_int_like() {
                            return err(
                                expr.loc,
                                format!("Invalid argument type '{}' to unary expression", info.ty),
                            );
                        }
                        Ok(ExprInfo::value(Rc::new(RawType::Int)))
                    }
                }
            }
            ExprKind::SizeofExpr(operand) => {
                let info = self.check_expr(operand)?;
                let value = match &operand.kind {
                    // the operand of an inner sizeof is already folded away;
                    // its result behaves like a pointer-sized constant
                    ExprKind::SizeofExpr(_) | ExprKind::SizeofType(_) => 8,
                    ExprKind::StringLit(text) => unescaped_len(text) + 1,
                    _ => info.ty.size(),
                };
                self.analysis.sizeof_values.insert(expr.id, value);
                Ok(ExprInfo::value(Rc::new(RawType::Int)))
            }
            ExprKind::SizeofType(ty) => {
                let built = self.build_type(ty)?;
                self.analysis.sizeof_values.insert(expr.id, built.size());
                Ok(ExprInfo::value(Rc::new(RawType::Int)))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_info = self.check_expr(lhs)?;
                let rhs_info = self.check_expr(rhs)?;
                self.check_binary(expr.loc, *op, &lhs_info.ty, &rhs_info.ty)
            }
            ExprKind::Ternary { cond, then_expr, else_expr } => {
                let cond_info = self.check_expr(cond)?;
                if !cond_info.ty.compatible(&RawType::Int) {
                    return err(
                        cond.loc,
                        format!(
                            "Used type '{}' where arithmetic or pointer type is required",
                            cond_info.ty
                        ),
                    );
                }
                let then_info = self.check_expr(then_expr)?;
                let else_info = self.check_expr(else_expr)?;
                if !then_info.ty.compatible(&else_info.ty) {
                    return err(
                        expr.loc,
                        format!(
                            "Incompatible operand types ('{}' and '{}')",
                            then_info.ty, else_info.ty
                        ),
                    );
                }
                // prefer the branch that pins the type down
                let ty = if *then_info.ty == RawType::Nil {
                    else_info.ty
                } else {
                    then_info.ty
                };
                Ok(ExprInfo::value(ty))
            }
            ExprKind::Assign { lhs, rhs, .. } => {
                let lhs_info = self.check_expr(lhs)?;
                if !lhs_info.lvalue || matches!(*lhs_info.ty, RawType::Function { .. }) {
                    return err(expr.loc, "Expression is not assignable".into());
                }
                let rhs_info = self.check_expr(rhs)?;
                if !lhs_info.ty.compatible(&rhs_info.ty) {
                    return err(
                        expr.loc,
                        format!(
                            "Assigning to '{}' from incompatible type '{}'",
                            lhs_info.ty, rhs_info.ty
                        ),
                    );
                }
                Ok(ExprInfo::value(lhs_info.ty))
            }
        }
    }

    fn check_binary(
        &mut self,
        loc: Loc,
        op: BinOp,
        lhs: &Rc<RawType>,
        rhs: &Rc<RawType>,
    ) -> Result<ExprInfo, SemanticError> {
        let invalid = || {
            err(
                loc,
                format!("Invalid operands to binary expression ('{lhs}' and '{rhs}')"),
            )
        };
        match op {
            BinOp::Mul => {
                if lhs.is_int_like() && rhs.is_int_like() {
                    Ok(ExprInfo::value(Rc::new(RawType::Int)))
                } else {
                    invalid()
                }
            }
            BinOp::Add => {
                if lhs.deref().is_some() && rhs.is_int_like() {
                    Ok(ExprInfo::value(lhs.clone()))
                } else if lhs.is_int_like() && rhs.deref().is_some() {
                    Ok(ExprInfo::value(rhs.clone()))
                } else if lhs.is_int_like() && rhs.is_int_like() {
                    Ok(ExprInfo::value(Rc::new(RawType::Int)))
                } else {
                    invalid()
                }
            }
            BinOp::Sub => {
                if lhs.deref().is_some() && rhs.deref().is_some() {
                    // pointer difference: exact same pointee required, the
                    // result is a plain int
                    if lhs.same(rhs) {
                        Ok(ExprInfo::value(Rc::new(RawType::Int)))
                    } else {
                        err(
                            loc,
                            format!("'{lhs}' and '{rhs}' are not pointers to compatible types"),
                        )
                    }
                } else if lhs.deref().is_some() && rhs.is_int_like() {
                    Ok(ExprInfo::value(lhs.clone()))
                } else if lhs.is_int_like() && rhs.is_int_like() {
                    Ok(ExprInfo::value(Rc::new(RawType::Int)))
                } else {
                    invalid()
                }
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                if lhs.compatible(rhs) {
                    Ok(ExprInfo::value(Rc::new(RawType::Int)))
                } else {
                    invalid()
                }
            }
            BinOp::And | BinOp::Or => {
                if lhs.compatible(&RawType::Int) && rhs.compatible(&RawType::Int) {
                    Ok(ExprInfo::value(Rc::new(RawType::Int)))
                } else {
                    invalid()
                }
            }
        }
    }
}

fn wrap_pointers(mut ty: Rc<RawType>, depth: u32) -> Rc<RawType> {
    for _ in 0..depth {
        ty = Rc::new(RawType::Pointer(ty));
    }
    ty
}

/// Length of a string literal spelling after unescaping; every `\x` pair
/// counts as one character.
fn unescaped_len(text: &str) -> i64 {
    let mut len = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        }
        len += 1;
    }
    len
}
