//! Shader Feature Flags
//!
//! An ordered list of `NAME VALUE` feature flags that selects a shader
//! permutation. Keys and values are interned [`Symbol`]s, so comparing and
//! hashing define lists is integer work.
//!
//! # Ordering
//!
//! Flags keep their insertion order: primitive flags first, then material
//! flags, then renderer flags. Setting an existing key updates its value in
//! place and keeps its position.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen::resources::ShaderDefines;
//!
//! let mut defines = ShaderDefines::new();
//! defines.set("HAS_NORMALS", "1");
//! defines.set("JOINT_COUNT", "24");
//!
//! let flags: Vec<String> = defines.flag_strings().collect();
//! assert_eq!(flags, ["HAS_NORMALS 1", "JOINT_COUNT 24"]);
//! ```

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::utils::interner::{self, Symbol};

/// An insertion-ordered collection of shader feature flags.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(Symbol, Symbol)>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            defines: Vec::with_capacity(capacity),
        }
    }

    /// Sets a flag. An existing key keeps its position and takes the new value.
    pub fn set(&mut self, key: &str, value: &str) {
        self.set_symbol(interner::intern(key), interner::intern(value));
    }

    /// Sets a flag whose value is `1`.
    pub fn enable(&mut self, key: &str) {
        self.set(key, "1");
    }

    #[inline]
    pub fn set_symbol(&mut self, key: Symbol, value: Symbol) {
        if let Some(entry) = self.defines.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.defines.push((key, value));
        }
    }

    /// Parses and sets a `"NAME VALUE"` flag string. A bare name means `1`.
    pub fn set_flag_string(&mut self, flag: &str) {
        let mut parts = flag.split_whitespace();
        if let Some(key) = parts.next() {
            self.set(key, parts.next().unwrap_or("1"));
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let Some(key_sym) = interner::get(key) else {
            return false;
        };
        let before = self.defines.len();
        self.defines.retain(|(k, _)| *k != key_sym);
        self.defines.len() != before
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key).is_some_and(|key_sym| self.defines.iter().any(|(k, _)| *k == key_sym))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let key_sym = interner::get(key)?;
        self.defines
            .iter()
            .find(|(k, _)| *k == key_sym)
            .map(|&(_, v)| interner::resolve(v))
    }

    #[inline]
    pub fn clear(&mut self) {
        self.defines.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, Symbol)> {
        self.defines.iter()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter_strings(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Iterates flags in their `"NAME VALUE"` form.
    pub fn flag_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.iter_strings().map(|(k, v)| format!("{k} {v}"))
    }

    /// Sorted map of the flags (for template rendering).
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter_strings()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Appends the flags of `other`; conflicting keys take `other`'s value.
    pub fn extend(&mut self, other: &ShaderDefines) {
        for &(key, value) in &other.defines {
            self.set_symbol(key, value);
        }
    }

    #[must_use]
    pub fn merged_with(&self, other: &ShaderDefines) -> ShaderDefines {
        let mut result = self.clone();
        result.extend(other);
        result
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[(Symbol, Symbol)] {
        &self.defines
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::with_capacity(defines.len());
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut defines = ShaderDefines::new();
        defines.enable("HAS_NORMALS");
        defines.set("JOINT_COUNT", "3");
        defines.enable("HAS_UV_SET1");
        defines.set("JOINT_COUNT", "4");

        let flags: Vec<String> = defines.flag_strings().collect();
        assert_eq!(flags, ["HAS_NORMALS 1", "JOINT_COUNT 4", "HAS_UV_SET1 1"]);
    }

    #[test]
    fn test_flag_string_parsing() {
        let mut defines = ShaderDefines::new();
        defines.set_flag_string("LIGHT_COUNT 2");
        defines.set_flag_string("USE_IBL");
        assert_eq!(defines.get("LIGHT_COUNT"), Some("2"));
        assert_eq!(defines.get("USE_IBL"), Some("1"));
    }

    #[test]
    fn test_extend_overrides() {
        let mut a = ShaderDefines::from(&[("A", "1"), ("B", "1")][..]);
        let b = ShaderDefines::from(&[("B", "2"), ("C", "1")][..]);
        a.extend(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.get("B"), Some("2"));
        assert!(a.remove("A"));
        assert!(!a.contains("A"));
    }
}
