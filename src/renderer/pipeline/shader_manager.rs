//! Shader Template Sources
//!
//! Owns the minijinja environment the shader variants are rendered with and
//! the embedded WGSL sources it renders.
//!
//! ## Template syntax
//!
//! | Construct | Syntax |
//! |-----------|--------|
//! | block     | `{$ if HAS_NORMALS is defined $} ... {$ endif $}` |
//! | variable  | `{{ JOINT_COUNT }}` |
//! | line statement | `$$ set HAS_NORMALS = 1` |
//! | vertex location | `@location({{ loc.next() }})` |
//! | dynamic flag test | `{$ if flag("HAS_TARGET_POSITION" ~ i) $}` |
//!
//! ## Includes
//!
//! `#include <name>` markers are resolved once, when the sources are loaded:
//! the first marker of a name is replaced by that source, later markers of the
//! same name are deleted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use minijinja::value::{Object, Value};
use minijinja::{Environment, Error, ErrorKind, State, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::errors::Result;

#[derive(RustEmbed)]
#[folder = "src/renderer/pipeline/shaders"]
struct ShaderAssets;

/// Builds the environment every variant is rendered with.
pub fn create_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);

    env.add_function("flag", flag);

    Ok(env)
}

/// `flag("NAME")`: whether a flag is set (and not `0`) in the rendered variant.
fn flag(state: &State, name: String) -> bool {
    state
        .lookup(&name)
        .is_some_and(|value| !value.is_undefined() && !value.is_none() && value.is_true())
}

/// All embedded sources, keyed by file name without the `.wgsl` extension.
#[must_use]
pub fn embedded_sources() -> FxHashMap<String, String> {
    let mut sources = FxHashMap::default();
    for path in ShaderAssets::iter() {
        let Some(file) = ShaderAssets::get(&path) else {
            continue;
        };
        let Ok(text) = std::str::from_utf8(file.data.as_ref()) else {
            log::warn!("Shader source '{path}' is not valid UTF-8, skipping");
            continue;
        };
        let name = path.strip_suffix(".wgsl").unwrap_or(&path);
        sources.insert(name.to_string(), text.to_string());
    }
    sources
}

/// Resolves `#include <name>` markers against the other sources.
///
/// Single pass: the text spliced in is taken from the unresolved sources.
#[must_use]
pub fn resolve_includes(sources: &FxHashMap<String, String>) -> FxHashMap<String, String> {
    let mut names: Vec<&String> = sources.keys().collect();
    names.sort();

    sources
        .iter()
        .map(|(name, source)| {
            let mut resolved = source.clone();
            for &include in &names {
                let marker = format!("#include <{include}>");
                if let Some(first) = resolved.find(&marker) {
                    let mut spliced = String::with_capacity(resolved.len() + sources[include].len());
                    spliced.push_str(&resolved[..first]);
                    spliced.push_str(&sources[include]);
                    spliced.push_str(&resolved[first + marker.len()..].replace(&marker, ""));
                    resolved = spliced;
                }
            }
            (name.clone(), resolved)
        })
        .collect()
}

/// Hands out consecutive `@location` indices while a template renders.
#[derive(Debug, Serialize)]
pub struct LocationAllocator {
    #[serde(skip)]
    counter: AtomicU32,
}

impl Default for LocationAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Object for LocationAllocator {
    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        name: &str,
        _args: &[Value],
    ) -> std::result::Result<Value, Error> {
        if name == "next" {
            Ok(Value::from(self.next()))
        } else {
            Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("method {name} not found"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(entries: &[(&str, &str)]) -> FxHashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn first_include_is_replaced_and_duplicates_removed() {
        let resolved = resolve_includes(&sources(&[
            ("main", "a\n#include <chunk>\nb\n#include <chunk>\nc"),
            ("chunk", "CHUNK"),
        ]));
        assert_eq!(resolved["main"], "a\nCHUNK\nb\n\nc");
        assert_eq!(resolved["chunk"], "CHUNK");
    }

    #[test]
    fn unknown_include_is_left_alone() {
        let resolved = resolve_includes(&sources(&[("main", "#include <missing>")]));
        assert_eq!(resolved["main"], "#include <missing>");
    }

    #[test]
    fn embedded_templates_are_present() {
        let sources = embedded_sources();
        assert!(sources.contains_key("primitive.vert"));
        assert!(sources.contains_key("pbr.frag"));
    }

    #[test]
    fn flag_function_sees_line_statements() {
        let env = create_env().unwrap();
        let out = env
            .render_str(
                "$$ set HAS_TARGET_POSITION0 = 1\n{$ for i in range(2) $}{$ if flag(\"HAS_TARGET_POSITION\" ~ i) $}1{$ else $}0{$ endif $} {$ endfor $}",
                minijinja::context! {},
            )
            .unwrap();
        assert_eq!(out.trim(), "1 0");
    }

    #[test]
    fn locations_are_consecutive() {
        let env = create_env().unwrap();
        let loc = Value::from_object(LocationAllocator::new());
        let out = env
            .render_str("{{ loc.next() }},{{ loc.next() }}", minijinja::context! { loc => loc })
            .unwrap();
        assert_eq!(out, "0,1");
    }
}
