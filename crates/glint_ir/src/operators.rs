//! Binary-operator dispatch: picks the single hard-coded operator function
//! two widened operand types call into.
//!
//! Grounded on `BinaryOperator::find`, which special-cases `Plus`/
//! `PlusEquals` by checking `any`, then `string`, then `int` in that order
//! and otherwise aborts with `QORE_NOT_IMPLEMENTED`. The rest of the table
//! (subtraction through equality) was never written down in the source —
//! only `+`/`+=` exist there — so it follows the same widen-then-dispatch
//! shape in the order `any`, then `int`/`softint`, then `string`/
//! `softstring`, with bitwise/shift/most-arithmetic operators rejecting a
//! string operand outright (they are not meaningful on strings).

use glint_syntax::ast::BinaryOp;

use glint_sema::{TypeKind, TypeRegistry};

use crate::ir::{AnyOp, ArithOp, LogicOp, OperatorId, StringOp};

/// What kind of value an operator acts on once both operands are widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widen {
    Any,
    SoftInt,
    SoftString,
    /// `&&`/`||`: no widening step, both operands must already be `softbool`.
    SoftBool,
}

/// Picks the widened family and dispatch target for `op` given unwidened
/// operand types `left`/`right`. Returns `Err(())` if no combination
/// applies (e.g. a bitwise operator given a string operand).
pub fn dispatch(
    op: BinaryOp,
    left: glint_sema::TypeId,
    right: glint_sema::TypeId,
    types: &TypeRegistry,
) -> Result<(Widen, OperatorId), ()> {
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let logic = if op == BinaryOp::And { LogicOp::And } else { LogicOp::Or };
        return Ok((Widen::SoftBool, OperatorId::SoftBoolLogic(logic)));
    }

    let is_any = |t: glint_sema::TypeId| matches!(types.kind(t), TypeKind::Any);
    let is_int = |t: glint_sema::TypeId| matches!(types.kind(t), TypeKind::Int | TypeKind::SoftInt);
    let is_string =
        |t: glint_sema::TypeId| matches!(types.kind(t), TypeKind::String | TypeKind::SoftString);

    if op == BinaryOp::Add {
        // `+` checks `any`, then string, then int: string concatenation
        // takes precedence over numeric addition when both could apply.
        if is_any(left) || is_any(right) {
            return Ok((Widen::Any, OperatorId::AnyOp(AnyOp::Add)));
        }
        if is_string(left) || is_string(right) {
            return Ok((Widen::SoftString, OperatorId::SoftStringOp(StringOp::Add)));
        }
        if is_int(left) || is_int(right) {
            return Ok((Widen::SoftInt, OperatorId::SoftIntOp(ArithOp::Add)));
        }
        return Err(());
    }

    let string_allowed = matches!(
        op,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
    );

    if is_any(left) || is_any(right) {
        return Ok((Widen::Any, OperatorId::AnyOp(any_op(op))));
    }
    if is_int(left) || is_int(right) {
        return Ok((Widen::SoftInt, OperatorId::SoftIntOp(arith_op(op))));
    }
    if string_allowed && (is_string(left) || is_string(right)) {
        return Ok((Widen::SoftString, OperatorId::SoftStringOp(string_op(op))));
    }
    Err(())
}

/// `lhs op= rhs`: the left side alone determines the scheme (its static
/// type is never itself widened away — the result type is always `L`).
pub fn dispatch_compound(
    left: glint_sema::TypeId,
    types: &TypeRegistry,
) -> Result<(Widen, OperatorId), ()> {
    match types.kind(left) {
        TypeKind::Any => Ok((Widen::Any, OperatorId::AnyPlusEquals)),
        TypeKind::String | TypeKind::SoftString => {
            Ok((Widen::SoftString, OperatorId::SoftStringOp(StringOp::Add)))
        }
        TypeKind::Int | TypeKind::SoftInt => Ok((Widen::SoftInt, OperatorId::SoftIntOp(ArithOp::Add))),
        _ => Err(()),
    }
}

/// `true` for operators whose result is always `softbool` regardless of the
/// widened operand family (every relational and equality operator).
pub fn yields_bool(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::And
            | BinaryOp::Or
    )
}

fn any_op(op: BinaryOp) -> AnyOp {
    match op {
        BinaryOp::Add => AnyOp::Add,
        BinaryOp::Sub => AnyOp::Sub,
        BinaryOp::Mul => AnyOp::Mul,
        BinaryOp::Div => AnyOp::Div,
        BinaryOp::Mod => AnyOp::Mod,
        BinaryOp::BitAnd => AnyOp::BitAnd,
        BinaryOp::BitOr => AnyOp::BitOr,
        BinaryOp::BitXor => AnyOp::BitXor,
        BinaryOp::Shl => AnyOp::Shl,
        BinaryOp::Shr => AnyOp::Shr,
        BinaryOp::Lt => AnyOp::Lt,
        BinaryOp::Le => AnyOp::Le,
        BinaryOp::Gt => AnyOp::Gt,
        BinaryOp::Ge => AnyOp::Ge,
        BinaryOp::Eq => AnyOp::Eq,
        BinaryOp::Ne => AnyOp::Ne,
        _ => unreachable!("operator {op:?} has no any-widened form"),
    }
}

fn arith_op(op: BinaryOp) -> ArithOp {
    match op {
        BinaryOp::Add => ArithOp::Add,
        BinaryOp::Sub => ArithOp::Sub,
        BinaryOp::Mul => ArithOp::Mul,
        BinaryOp::Div => ArithOp::Div,
        BinaryOp::Mod => ArithOp::Mod,
        BinaryOp::BitAnd => ArithOp::BitAnd,
        BinaryOp::BitOr => ArithOp::BitOr,
        BinaryOp::BitXor => ArithOp::BitXor,
        BinaryOp::Shl => ArithOp::Shl,
        BinaryOp::Shr => ArithOp::Shr,
        BinaryOp::Lt => ArithOp::Lt,
        BinaryOp::Le => ArithOp::Le,
        BinaryOp::Gt => ArithOp::Gt,
        BinaryOp::Ge => ArithOp::Ge,
        BinaryOp::Eq => ArithOp::Eq,
        BinaryOp::Ne => ArithOp::Ne,
        _ => unreachable!("operator {op:?} has no softint form"),
    }
}

fn string_op(op: BinaryOp) -> StringOp {
    match op {
        BinaryOp::Add => StringOp::Add,
        BinaryOp::Lt => StringOp::Lt,
        BinaryOp::Le => StringOp::Le,
        BinaryOp::Gt => StringOp::Gt,
        BinaryOp::Ge => StringOp::Ge,
        BinaryOp::Eq => StringOp::Eq,
        BinaryOp::Ne => StringOp::Ne,
        _ => unreachable!("operator {op:?} has no softstring form"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_prefers_string_over_int_when_both_apply() {
        let types = TypeRegistry::new();
        let (widen, id) = dispatch(BinaryOp::Add, types.string(), types.int(), &types).unwrap();
        assert_eq!(widen, Widen::SoftString);
        assert_eq!(id, OperatorId::SoftStringOp(StringOp::Add));
    }

    #[test]
    fn plus_with_any_always_wins() {
        let types = TypeRegistry::new();
        let (widen, _) = dispatch(BinaryOp::Add, types.any(), types.int(), &types).unwrap();
        assert_eq!(widen, Widen::Any);
    }

    #[test]
    fn subtraction_rejects_string_operands() {
        let types = TypeRegistry::new();
        assert_eq!(dispatch(BinaryOp::Sub, types.string(), types.int(), &types), Err(()));
    }

    #[test]
    fn equality_accepts_strings() {
        let types = TypeRegistry::new();
        let (widen, id) = dispatch(BinaryOp::Eq, types.string(), types.string(), &types).unwrap();
        assert_eq!(widen, Widen::SoftString);
        assert_eq!(id, OperatorId::SoftStringOp(StringOp::Eq));
    }

    #[test]
    fn logical_and_needs_no_widening() {
        let types = TypeRegistry::new();
        let (widen, id) = dispatch(BinaryOp::And, types.bool_ty(), types.bool_ty(), &types).unwrap();
        assert_eq!(widen, Widen::SoftBool);
        assert_eq!(id, OperatorId::SoftBoolLogic(LogicOp::And));
    }

    #[test]
    fn compound_plus_equals_on_any_uses_anypluseq() {
        let types = TypeRegistry::new();
        let (widen, id) = dispatch_compound(types.any(), &types).unwrap();
        assert_eq!(widen, Widen::Any);
        assert_eq!(id, OperatorId::AnyPlusEquals);
    }

    #[test]
    fn yields_bool_covers_relational_and_logical() {
        assert!(yields_bool(BinaryOp::Lt));
        assert!(yields_bool(BinaryOp::And));
        assert!(!yields_bool(BinaryOp::Add));
    }
}
