//! Statement analyzer: lowers one [`Stmt`] into instructions appended to the
//! routine's current block, pushing/popping lexical scopes and closing
//! blocks on every control-flow-affecting construct.
//!
//! Only the subset the closed instruction set can express is implemented:
//! expression statements, compound blocks, `return`, `if`/`else`, and
//! `try`/`catch`. Everything else (`while`, `for`, `foreach`, `switch`,
//! `break`/`continue`/`rethrow`, `thread_exit`, scope guards) is reported as
//! [`DiagnosticId::SemaUnsupportedConstruct`].

use glint_base::{DiagnosticId, SourceLocation};
use glint_sema::TypeKind;
use glint_syntax::ast::{Stmt, StmtKind};

use crate::ir::{Op, Terminator};
use crate::lowering::Lowering;

impl<'a> Lowering<'a> {
    /// Lowers `stmt`. Returns `false` once the current block has been
    /// closed by a terminator (e.g. `return`), so the caller knows not to
    /// keep appending to it.
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt<'_>) -> bool {
        if self.builder.is_current_closed() {
            return false;
        }
        match &stmt.kind {
            StmtKind::Empty => true,
            StmtKind::Expression(expr) => {
                let ty = self.lower_expr(*expr);
                if self.types.is_ref_counted(ty) {
                    self.builder.push(Op::RefDec);
                }
                true
            }
            StmtKind::Compound(stmts) => self.lower_block(*stmts),
            StmtKind::Return(value) => {
                self.lower_return(*value, &stmt.start);
                false
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.lower_if(*cond, *then_branch, *else_branch, &stmt.start)
            }
            StmtKind::Try { body, catch_var, catch_body } => {
                self.lower_try(*body, *catch_var, *catch_body, &stmt.start)
            }
            other => {
                self.sink
                    .report(DiagnosticId::SemaUnsupportedConstruct, stmt.start.clone())
                    .arg(stmt_kind_name(other));
                true
            }
        }
    }

    /// Lowers a compound statement's children under a fresh lexical scope,
    /// releasing every local it declared in reverse declaration order on
    /// exit.
    pub(crate) fn lower_block(&mut self, stmts: &[&Stmt<'_>]) -> bool {
        self.scope.push_scope();
        let mut fell_through = true;
        for s in stmts {
            if !self.lower_stmt(*s) {
                fell_through = false;
                break;
            }
        }
        let declared = self.scope.pop_scope();
        if fell_through {
            self.emit_scope_cleanup(&declared);
        }
        self.builder.set_local_count(self.scope.local_count());
        fell_through
    }

    pub(crate) fn emit_scope_cleanup(&mut self, declared: &[glint_sema::LocalId]) {
        for &id in declared {
            let ty = self.scope.local(id).ty;
            if self.types.is_ref_counted(ty) {
                self.builder.push(Op::LocalGet(id));
                self.builder.push(Op::RefDecNoexcept);
            }
            self.builder.push(Op::LifetimeEnd(id));
        }
    }

    fn lower_return(&mut self, value: Option<&glint_syntax::ast::Expr<'_>>, at: &SourceLocation) {
        match value {
            Some(expr) => {
                let ty = self.lower_expr(expr);
                let _ = self.convert_to(ty, self.return_type, at);
                self.builder.terminate(Terminator::Ret);
            }
            None => {
                if !matches!(self.types.kind(self.return_type), TypeKind::Nothing) {
                    self.sink.report(DiagnosticId::SemaVoidReturnRequiresNothing, at.clone());
                }
                self.builder.terminate(Terminator::RetVoid);
            }
        }
    }

    fn lower_if(
        &mut self,
        cond: &glint_syntax::ast::Expr<'_>,
        then_branch: &Stmt<'_>,
        else_branch: Option<&Stmt<'_>>,
        at: &SourceLocation,
    ) -> bool {
        let cond_ty = self.lower_expr(cond);
        let _ = self.convert_to(cond_ty, self.types.soft_bool(), at);

        let then_block = self.builder.new_block();
        let else_block = self.builder.new_block();
        let join_block = self.builder.new_block();
        self.builder.terminate(Terminator::Branch { on_true: then_block, on_false: else_block });

        self.builder.set_current(then_block);
        let then_falls_through = self.lower_stmt(then_branch);
        if then_falls_through {
            self.builder.terminate(Terminator::Jump(join_block));
        }

        self.builder.set_current(else_block);
        let else_falls_through = match else_branch {
            Some(e) => self.lower_stmt(e),
            None => true,
        };
        if else_falls_through {
            self.builder.terminate(Terminator::Jump(join_block));
        }

        self.builder.set_current(join_block);
        then_falls_through || else_falls_through
    }

    fn lower_try(
        &mut self,
        body: &Stmt<'_>,
        catch_var: Option<glint_base::StringId>,
        catch_body: &Stmt<'_>,
        at: &SourceLocation,
    ) -> bool {
        let lpad_block = self.builder.new_block();
        let join_block = self.builder.new_block();

        self.builder.push_landing_pad(lpad_block);
        let body_falls_through = self.lower_stmt(body);
        self.builder.pop_landing_pad();
        if body_falls_through {
            self.builder.terminate(Terminator::Jump(join_block));
        }

        self.builder.set_current(lpad_block);
        self.scope.push_scope();
        let bound = catch_var.map(|name| {
            self.scope.declare(name, self.types.any(), at.clone(), self.interner, self.sink)
        });
        self.builder.push(Op::LandingPad(bound));
        let catch_falls_through = self.lower_stmt(catch_body);
        let declared = self.scope.pop_scope();
        if catch_falls_through {
            self.emit_scope_cleanup(&declared);
            self.builder.terminate(Terminator::Jump(join_block));
        }

        self.builder.set_current(join_block);
        body_falls_through || catch_falls_through
    }
}

fn stmt_kind_name(kind: &StmtKind<'_>) -> &'static str {
    match kind {
        StmtKind::Empty => "<empty>",
        StmtKind::Expression(_) => "expression statement",
        StmtKind::Compound(_) => "compound statement",
        StmtKind::Return(_) => "return",
        StmtKind::If { .. } => "if",
        StmtKind::Try { .. } => "try",
        StmtKind::Foreach { .. } => "foreach",
        StmtKind::Throw(_) => "throw",
        StmtKind::Break => "break",
        StmtKind::Continue => "continue",
        StmtKind::Rethrow => "rethrow",
        StmtKind::ThreadExit => "thread_exit",
        StmtKind::ScopeGuard(_) => "on_exit",
        StmtKind::While { .. } => "while",
        StmtKind::DoWhile { .. } => "do/while",
        StmtKind::For { .. } => "for",
        StmtKind::Switch { .. } => "switch",
    }
}
