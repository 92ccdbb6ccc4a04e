//! The finite table of value conversions, ported from `Conversion::find`.
//!
//! The original dispatches on `Type::operator==` chains ending in
//! `QORE_NOT_IMPLEMENTED`; here the same chain is an exhaustive `match`
//! returning `Option<ConversionId>`, with "no conversion exists" surfaced
//! as `Err` instead of aborting the process.

use glint_sema::{TypeKind, TypeRegistry};

use crate::ir::ConversionId;

/// Finds the conversion needed to use a value of type `src` where `dest` is
/// expected.
///
/// Returns `Ok(None)` when no instruction is needed (identity conversion,
/// `src == dest`), `Ok(Some(id))` when a conversion applies, and `Err(())`
/// when the combination is not in the table — the caller reports
/// `SemaCannotConvert` using its own, richer location/type-name context.
pub fn find_conversion(
    types: &TypeRegistry,
    src: glint_sema::TypeId,
    dest: glint_sema::TypeId,
) -> Result<Option<ConversionId>, ()> {
    if src == dest {
        return Ok(None);
    }
    let src_kind = types.kind(src);
    let dest_kind = types.kind(dest);

    if matches!(dest_kind, TypeKind::String) {
        if matches!(src_kind, TypeKind::Any) {
            return Ok(Some(ConversionId::AnyToString));
        }
        return Err(());
    }
    if matches!(dest_kind, TypeKind::SoftString) {
        match src_kind {
            TypeKind::String => return Ok(None),
            TypeKind::Int | TypeKind::SoftInt => return Ok(Some(ConversionId::IntToString)),
            TypeKind::Any => return Ok(Some(ConversionId::AnyToString)),
            _ => return Err(()),
        }
    }
    if matches!(dest_kind, TypeKind::SoftBool) {
        if matches!(src_kind, TypeKind::Int | TypeKind::SoftInt) {
            return Ok(Some(ConversionId::IntToSoftBool));
        }
        return Err(());
    }
    if matches!(dest_kind, TypeKind::SoftInt) {
        match src_kind {
            TypeKind::Int => return Ok(None),
            TypeKind::String | TypeKind::SoftString => return Ok(Some(ConversionId::StringToSoftInt)),
            _ => return Err(()),
        }
    }
    if matches!(dest_kind, TypeKind::Any) {
        match src_kind {
            TypeKind::Int | TypeKind::SoftInt => return Ok(Some(ConversionId::IntToAny)),
            TypeKind::String | TypeKind::SoftString => return Ok(None),
            _ => return Err(()),
        }
    }
    Err(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_needs_no_conversion() {
        let types = TypeRegistry::new();
        assert_eq!(find_conversion(&types, types.int(), types.int()), Ok(None));
    }

    #[test]
    fn any_to_string_is_a_real_conversion() {
        let types = TypeRegistry::new();
        assert_eq!(
            find_conversion(&types, types.any(), types.string()),
            Ok(Some(ConversionId::AnyToString))
        );
    }

    #[test]
    fn int_to_softbool_is_a_real_conversion() {
        let types = TypeRegistry::new();
        assert_eq!(
            find_conversion(&types, types.int(), types.soft_bool()),
            Ok(Some(ConversionId::IntToSoftBool))
        );
    }

    #[test]
    fn string_to_softint_is_a_real_conversion() {
        let types = TypeRegistry::new();
        assert_eq!(
            find_conversion(&types, types.string(), types.soft_int()),
            Ok(Some(ConversionId::StringToSoftInt))
        );
    }

    #[test]
    fn int_to_any_boxes() {
        let types = TypeRegistry::new();
        assert_eq!(
            find_conversion(&types, types.int(), types.any()),
            Ok(Some(ConversionId::IntToAny))
        );
    }

    #[test]
    fn bool_to_int_is_not_in_the_table() {
        let types = TypeRegistry::new();
        assert_eq!(find_conversion(&types, types.bool_ty(), types.int()), Err(()));
    }
}
