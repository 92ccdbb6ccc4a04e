//! Expression analyzer: walks one [`Expr`] and emits the instructions that
//! leave its value on top of the operand stack.
//!
//! Lvalues are restricted to a bare local or global name, mirroring
//! `LValueCompiler`'s dispatch, which only ever descends into
//! `GlobalVariableRefExpression`/`LocalVariableRefExpression`. Anything else
//! used as an assignment target, and every AST expression kind this minimal
//! core does not lower at all, is reported as
//! [`DiagnosticId::SemaUnsupportedConstruct`] rather than panicking.

use glint_base::DiagnosticId;
use glint_syntax::ast::{BinaryOp, Expr, ExprKind};

use crate::ir::Op;
use crate::lowering::Lowering;
use crate::operators;

impl<'a> Lowering<'a> {
    /// Lowers `expr`, leaving exactly one value of the returned type on top
    /// of the stack.
    pub(crate) fn lower_expr(&mut self, expr: &Expr<'_>) -> glint_sema::TypeId {
        match &expr.kind {
            ExprKind::IntLiteral(v) => {
                self.builder.push(Op::ConstInt(*v));
                self.types.int()
            }
            ExprKind::StringLiteral(s) => {
                let id = self.strings.intern(self.interner.get(*s));
                self.builder.push(Op::ConstString(id));
                self.types.string()
            }
            ExprKind::NothingLiteral => {
                // The minimal core has no dedicated `nothing` constant
                // opcode; a `nothing`-typed slot never needs a pushed value
                // because it carries no representation to convert from.
                self.types.nothing()
            }
            ExprKind::Name(name) => self.lower_name_read(name, &expr.start),
            ExprKind::Assignment { op: None, lhs, rhs } => self.lower_plain_assignment(*lhs, *rhs),
            ExprKind::Assignment { op: Some(op), lhs, rhs } => {
                self.lower_compound_assignment(*op, *lhs, *rhs, &expr.start)
            }
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, *lhs, *rhs, &expr.start),
            other => {
                let _ = other;
                self.sink
                    .report(DiagnosticId::SemaUnsupportedConstruct, expr.start.clone())
                    .arg(expr_kind_name(&expr.kind));
                self.types.error()
            }
        }
    }

    fn lower_name_read(&mut self, name: &glint_syntax::ast::Name, at: &glint_base::SourceLocation) -> glint_sema::TypeId {
        let Some(simple) = name.as_simple() else {
            self.sink
                .report(DiagnosticId::SemaUnsupportedConstruct, at.clone())
                .arg("qualified name reference");
            return self.types.error();
        };
        if let Some(local) = self.scope.lookup(simple) {
            let ty = self.scope.local(local).ty;
            self.builder.push(Op::LocalGet(local));
            return ty;
        }
        if let Some((global, ty)) = self.resolve_global(simple) {
            self.builder.push(Op::GlobalReadLock(global));
            self.builder.push(Op::GlobalGet(global));
            self.builder.push(Op::GlobalReadUnlock(global));
            return ty;
        }
        self.sink
            .report(DiagnosticId::SemaUnknownIdentifier, at.clone())
            .arg(self.interner.get(simple));
        self.types.error()
    }

    fn lower_plain_assignment(&mut self, lhs: &Expr<'_>, rhs: &Expr<'_>) -> glint_sema::TypeId {
        match &lhs.kind {
            ExprKind::VarDecl { ty, name } => {
                self.lower_local_declaration(ty.clone(), *name, rhs, &lhs.start)
            }
            ExprKind::Name(name) => self.lower_assign_to_name(name, rhs, &lhs.start),
            _ => {
                self.sink
                    .report(DiagnosticId::SemaInvalidLvalue, lhs.start.clone());
                self.lower_expr(rhs);
                self.types.error()
            }
        }
    }

    fn lower_local_declaration(
        &mut self,
        ty: glint_syntax::ast::TypeAnnotation,
        name: glint_base::StringId,
        rhs: &Expr<'_>,
        at: &glint_base::SourceLocation,
    ) -> glint_sema::TypeId {
        let declared =
            self.types.resolve(self.graph, self.ns, &ty, self.interner, self.sink);
        let value_ty = self.lower_expr(rhs);
        let converted = self.convert_to(value_ty, declared, at);
        let id = self.scope.declare(name, converted, at.clone(), self.interner, self.sink);
        self.builder.push(Op::LifetimeStart(id));
        self.builder.push(Op::LocalSet(id));
        self.builder.push(Op::LocalGet(id));
        converted
    }

    fn lower_assign_to_name(
        &mut self,
        name: &glint_syntax::ast::Name,
        rhs: &Expr<'_>,
        at: &glint_base::SourceLocation,
    ) -> glint_sema::TypeId {
        let Some(simple) = name.as_simple() else {
            self.sink
                .report(DiagnosticId::SemaInvalidLvalue, at.clone());
            self.lower_expr(rhs);
            return self.types.error();
        };
        if let Some(local) = self.scope.lookup(simple) {
            let declared = self.scope.local(local).ty;
            let value_ty = self.lower_expr(rhs);
            let converted = self.convert_to(value_ty, declared, at);
            self.builder.push(Op::LocalSet(local));
            self.builder.push(Op::LocalGet(local));
            return converted;
        }
        if let Some((global, declared)) = self.resolve_global(simple) {
            let value_ty = self.lower_expr(rhs);
            let converted = self.convert_to(value_ty, declared, at);
            self.builder.push(Op::GlobalWriteLock(global));
            self.builder.push(Op::GlobalSet(global));
            self.builder.push(Op::GlobalWriteUnlock(global));
            self.builder.push(Op::GlobalReadLock(global));
            self.builder.push(Op::GlobalGet(global));
            self.builder.push(Op::GlobalReadUnlock(global));
            return converted;
        }
        self.sink
            .report(DiagnosticId::SemaUnknownIdentifier, at.clone())
            .arg(self.interner.get(simple));
        self.lower_expr(rhs);
        self.types.error()
    }

    fn lower_compound_assignment(
        &mut self,
        op: BinaryOp,
        lhs: &Expr<'_>,
        rhs: &Expr<'_>,
        at: &glint_base::SourceLocation,
    ) -> glint_sema::TypeId {
        if op != BinaryOp::Add {
            self.sink
                .report(DiagnosticId::SemaUnsupportedConstruct, at.clone())
                .arg("compound assignment operator other than '+='");
            self.lower_expr(rhs);
            return self.types.error();
        }
        let ExprKind::Name(name) = &lhs.kind else {
            self.sink
                .report(DiagnosticId::SemaInvalidLvalue, lhs.start.clone());
            self.lower_expr(rhs);
            return self.types.error();
        };
        let Some(simple) = name.as_simple() else {
            self.sink
                .report(DiagnosticId::SemaInvalidLvalue, at.clone());
            self.lower_expr(rhs);
            return self.types.error();
        };

        let (declared, is_global, global_id, local_id) = if let Some(local) = self.scope.lookup(simple) {
            (self.scope.local(local).ty, false, None, Some(local))
        } else if let Some((g, ty)) = self.resolve_global(simple) {
            (ty, true, Some(g), None)
        } else {
            self.sink
                .report(DiagnosticId::SemaUnknownIdentifier, at.clone())
                .arg(self.interner.get(simple));
            self.lower_expr(rhs);
            return self.types.error();
        };

        let Ok((_widen, operator)) = operators::dispatch_compound(declared, self.types) else {
            self.sink
                .report(DiagnosticId::SemaInvalidOperands, at.clone())
                .arg(self.types.display(declared, self.graph, self.interner))
                .arg("<rhs>")
                .arg("+=");
            self.lower_expr(rhs);
            return self.types.error();
        };

        if is_global {
            let g = global_id.unwrap();
            self.builder.push(Op::GlobalWriteLock(g));
            self.builder.push(Op::GlobalGet(g));
        } else {
            self.builder.push(Op::LocalGet(local_id.unwrap()));
        }
        let rhs_ty = self.lower_expr(rhs);
        let _ = self.convert_to(rhs_ty, declared, at);
        self.builder.push(Op::InvokeBinaryOperator(operator));

        if is_global {
            let g = global_id.unwrap();
            self.builder.push(Op::GlobalSet(g));
            self.builder.push(Op::GlobalWriteUnlock(g));
            self.builder.push(Op::GlobalReadLock(g));
            self.builder.push(Op::GlobalGet(g));
            self.builder.push(Op::GlobalReadUnlock(g));
        } else {
            self.builder.push(Op::LocalSet(local_id.unwrap()));
            self.builder.push(Op::LocalGet(local_id.unwrap()));
        }
        declared
    }

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr<'_>,
        rhs: &Expr<'_>,
        at: &glint_base::SourceLocation,
    ) -> glint_sema::TypeId {
        // Widen-then-dispatch needs both operand types up front, before
        // either side's instructions are emitted, so the left operand's
        // conversion (if any) can be inserted right after it is pushed
        // rather than after the whole right-hand side has also run.
        let lhs_ty0 = self.type_of(lhs);
        let rhs_ty0 = self.type_of(rhs);
        let dispatch = operators::dispatch(op, lhs_ty0, rhs_ty0, self.types);
        let Ok((widen, operator)) = dispatch else {
            self.sink
                .report(DiagnosticId::SemaInvalidOperands, at.clone())
                .arg(self.types.display(lhs_ty0, self.graph, self.interner))
                .arg(self.types.display(rhs_ty0, self.graph, self.interner))
                .arg(binary_op_spelling(op));
            self.lower_expr(lhs);
            self.lower_expr(rhs);
            return self.types.error();
        };
        let widened_ty = self.widen_target(widen);
        let lhs_ty = self.lower_expr(lhs);
        let _ = self.convert_to(lhs_ty, widened_ty, at);
        let rhs_ty = self.lower_expr(rhs);
        let _ = self.convert_to(rhs_ty, widened_ty, at);
        self.builder.push(Op::InvokeBinaryOperator(operator));
        if operators::yields_bool(op) {
            self.types.soft_bool()
        } else {
            widened_ty
        }
    }

    /// Computes an expression's type without emitting any instructions, so
    /// operator dispatch can see both operand types before committing to an
    /// emission order. Mirrors the subset of [`Self::lower_expr`] that
    /// operator operands are allowed to be built from.
    fn type_of(&mut self, expr: &Expr<'_>) -> glint_sema::TypeId {
        match &expr.kind {
            ExprKind::IntLiteral(_) => self.types.int(),
            ExprKind::StringLiteral(_) => self.types.string(),
            ExprKind::NothingLiteral => self.types.nothing(),
            ExprKind::Name(name) => match name.as_simple() {
                Some(simple) => {
                    if let Some(local) = self.scope.lookup(simple) {
                        self.scope.local(local).ty
                    } else if let Some((_, ty)) = self.resolve_global(simple) {
                        ty
                    } else {
                        self.types.error()
                    }
                }
                None => self.types.error(),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_ty = self.type_of(*lhs);
                let rhs_ty = self.type_of(*rhs);
                match operators::dispatch(*op, lhs_ty, rhs_ty, self.types) {
                    Ok((_, _)) if operators::yields_bool(*op) => self.types.soft_bool(),
                    Ok((widen, _)) => self.widen_target(widen),
                    Err(()) => self.types.error(),
                }
            }
            ExprKind::Assignment { op: None, lhs, .. } => match &lhs.kind {
                ExprKind::VarDecl { ty, .. } => {
                    self.types.resolve(self.graph, self.ns, ty, self.interner, self.sink)
                }
                ExprKind::Name(name) => name
                    .as_simple()
                    .and_then(|s| {
                        self.scope
                            .lookup(s)
                            .map(|l| self.scope.local(l).ty)
                            .or_else(|| self.resolve_global(s).map(|(_, t)| t))
                    })
                    .unwrap_or_else(|| self.types.error()),
                _ => self.types.error(),
            },
            ExprKind::Assignment { op: Some(_), lhs, .. } => match &lhs.kind {
                ExprKind::Name(name) => name
                    .as_simple()
                    .and_then(|s| {
                        self.scope
                            .lookup(s)
                            .map(|l| self.scope.local(l).ty)
                            .or_else(|| self.resolve_global(s).map(|(_, t)| t))
                    })
                    .unwrap_or_else(|| self.types.error()),
                _ => self.types.error(),
            },
            _ => self.types.error(),
        }
    }

    fn widen_target(&self, widen: operators::Widen) -> glint_sema::TypeId {
        match widen {
            operators::Widen::Any => self.types.any(),
            operators::Widen::SoftInt => self.types.soft_int(),
            operators::Widen::SoftString => self.types.soft_string(),
            operators::Widen::SoftBool => self.types.soft_bool(),
        }
    }

    /// Emits `InvokeConversion` if `value_ty != target_ty` and a conversion
    /// exists; reports `SemaCannotConvert` and returns the error type
    /// otherwise, so lowering can keep going with a placeholder type.
    pub(crate) fn convert_to(
        &mut self,
        value_ty: glint_sema::TypeId,
        target_ty: glint_sema::TypeId,
        at: &glint_base::SourceLocation,
    ) -> glint_sema::TypeId {
        if self.types.is_error(value_ty) || self.types.is_error(target_ty) {
            return target_ty;
        }
        match crate::convert::find_conversion(self.types, value_ty, target_ty) {
            Ok(None) => target_ty,
            Ok(Some(conversion)) => {
                self.builder.push(Op::InvokeConversion(conversion));
                target_ty
            }
            Err(()) => {
                self.sink
                    .report(DiagnosticId::SemaCannotConvert, at.clone())
                    .arg(self.types.display(value_ty, self.graph, self.interner))
                    .arg(self.types.display(target_ty, self.graph, self.interner));
                self.types.error()
            }
        }
    }

    fn resolve_global(&self, name: glint_base::StringId) -> Option<(glint_sema::GlobalId, glint_sema::TypeId)> {
        let mut cur = Some(self.ns);
        while let Some(ns) = cur {
            if let Some(id) = self.graph.find_global(ns, name) {
                return Some((id, self.graph.global(id).ty));
            }
            cur = self.graph.parent_of(ns);
        }
        None
    }
}

fn binary_op_spelling(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::RegexMatch => "=~",
        BinaryOp::RegexNotMatch => "!~",
        BinaryOp::Coalesce => "??",
        BinaryOp::CoalesceAsterisk => "?*",
    }
}

fn expr_kind_name(kind: &ExprKind<'_>) -> &'static str {
    match kind {
        ExprKind::Error => "<error>",
        ExprKind::IntLiteral(_) => "int literal",
        ExprKind::FloatLiteral(_) => "float literal",
        ExprKind::StringLiteral(_) => "string literal",
        ExprKind::BoolLiteral(_) => "bool literal",
        ExprKind::NothingLiteral => "NOTHING",
        ExprKind::NullLiteral => "NULL",
        ExprKind::DateLiteral(_) => "date literal",
        ExprKind::BinaryLiteral(_) => "binary literal",
        ExprKind::SelfExpr => "self",
        ExprKind::Name(_) => "name",
        ExprKind::List(_) => "list literal",
        ExprKind::Hash(_) => "hash literal",
        ExprKind::VarDecl { .. } => "variable declaration without an initializer",
        ExprKind::Cast { .. } => "cast",
        ExprKind::Call { .. } => "call",
        ExprKind::Unary { .. } => "unary operator",
        ExprKind::KeywordUnary { .. } => "keyword unary operator",
        ExprKind::Index { .. } => "index",
        ExprKind::Access { .. } => "member access",
        ExprKind::New { .. } => "new",
        ExprKind::Binary { .. } => "binary operator",
        ExprKind::Instanceof { .. } => "instanceof",
        ExprKind::Conditional { .. } => "conditional expression",
        ExprKind::Assignment { .. } => "assignment",
        ExprKind::ListOperation { .. } => "list operation",
        ExprKind::Regex { .. } => "regex",
        ExprKind::Closure { .. } => "closure",
    }
}
