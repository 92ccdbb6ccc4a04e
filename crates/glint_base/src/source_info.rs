//! Identity of a source blob and locations within it.
//!
//! [`SourceInfo`] is compared by address: two [`SourceLocation`]s refer to
//! the same source blob exactly when they hold the same `SourceInfo`
//! instance, not merely an equal short name.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

struct SourceInfoData {
    short_name: String,
    full_path: String,
}

/// Immutable descriptor of one source blob: a short display name and a
/// resolved full path. Cheap to clone; clones refer to the same blob.
#[derive(Clone)]
pub struct SourceInfo(Rc<SourceInfoData>);

/// Serializes as `{short_name, full_path}`; round-tripping loses pointer
/// identity, which only matters within one live compilation, not across a
/// persistence boundary.
#[derive(Serialize, Deserialize)]
struct SourceInfoRepr {
    short_name: String,
    full_path: String,
}

impl Serialize for SourceInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SourceInfoRepr {
            short_name: self.0.short_name.clone(),
            full_path: self.0.full_path.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceInfo {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SourceInfoRepr::deserialize(deserializer)?;
        Ok(SourceInfo::new(repr.short_name, repr.full_path))
    }
}

impl SourceInfo {
    /// Creates a new, distinct source identity.
    pub fn new(short_name: impl Into<String>, full_path: impl Into<String>) -> Self {
        SourceInfo(Rc::new(SourceInfoData {
            short_name: short_name.into(),
            full_path: full_path.into(),
        }))
    }

    /// The sentinel identity used by [`SourceLocation::invalid`]. Every call
    /// returns a clone referring to the same one-per-thread invalid blob, so
    /// `SourceLocation::default().source == SourceLocation::default().source`.
    pub fn invalid() -> Self {
        thread_local! {
            static INVALID: RefCell<Option<SourceInfo>> = const { RefCell::new(None) };
        }
        INVALID.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_none() {
                *slot = Some(SourceInfo::new("<invalid>", "<invalid>"));
            }
            slot.clone().unwrap()
        })
    }

    pub fn short_name(&self) -> &str {
        &self.0.short_name
    }

    pub fn full_path(&self) -> &str {
        &self.0.full_path
    }

    pub fn is_invalid(&self) -> bool {
        *self == SourceInfo::invalid()
    }
}

impl PartialEq for SourceInfo {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SourceInfo {}

impl fmt::Debug for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceInfo({})", self.0.short_name)
    }
}

/// A location within a [`SourceInfo`] blob: a 1-based line and a column
/// capped at 255 (matching the byte the original diagnostics renderer used
/// for a location column).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub source: SourceInfo,
    pub line: u32,
    pub column: u8,
}

impl SourceLocation {
    pub fn new(source: SourceInfo, line: u32, column: u32) -> Self {
        SourceLocation {
            source,
            line,
            column: column.min(255) as u8,
        }
    }

    /// A default-constructed location pointing at the sentinel `Invalid`
    /// source.
    pub fn invalid() -> Self {
        SourceLocation {
            source: SourceInfo::invalid(),
            line: 0,
            column: 0,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.source.is_invalid()
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source.short_name(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_blob_compares_equal_by_identity() {
        let info = SourceInfo::new("a.gl", "/tmp/a.gl");
        let loc1 = SourceLocation::new(info.clone(), 1, 1);
        let loc2 = SourceLocation::new(info, 2, 3);
        assert_eq!(loc1.source, loc2.source);
    }

    #[test]
    fn distinct_blobs_with_same_name_are_not_equal() {
        let a = SourceInfo::new("a.gl", "/tmp/a.gl");
        let b = SourceInfo::new("a.gl", "/tmp/a.gl");
        assert_ne!(a, b);
    }

    #[test]
    fn default_location_points_at_invalid() {
        let loc = SourceLocation::default();
        assert!(loc.is_invalid());
    }

    #[test]
    fn column_is_capped_at_255() {
        let info = SourceInfo::new("a.gl", "/tmp/a.gl");
        let loc = SourceLocation::new(info, 1, 9000);
        assert_eq!(loc.column, 255);
    }
}
