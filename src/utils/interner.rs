//! Global string interner.
//!
//! Turns shader feature-flag strings into compact [`Symbol`]s so define lists can
//! be compared and hashed as integers.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Interned string handle.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol when already present.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up a symbol without allocating.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the flags every frame touches so the hot path only does lookups.
pub fn preload_common_flags() {
    let common = [
        "HAS_NORMALS",
        "HAS_TANGENTS",
        "HAS_UV_SET1",
        "HAS_UV_SET2",
        "HAS_JOINT_SET1",
        "HAS_WEIGHT_SET1",
        "USE_SKINNING",
        "USE_MORPHING",
        "USE_PUNCTUAL",
        "USE_IBL",
        "ALPHAMODE_OPAQUE",
        "ALPHAMODE_MASK",
        "MATERIAL_METALLICROUGHNESS",
        "1",
    ];

    for name in common {
        intern(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let s1 = intern("HAS_NORMALS");
        let s2 = intern("HAS_NORMALS");
        let s3 = intern("HAS_TANGENTS");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);

        assert_eq!(resolve(s1), "HAS_NORMALS");
        assert_eq!(resolve(s3), "HAS_TANGENTS");
    }

    #[test]
    fn test_get() {
        let _ = intern("existing_flag");

        assert!(get("existing_flag").is_some());
        assert!(get("never_interned_flag").is_none());
    }
}
