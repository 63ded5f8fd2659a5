//! Architecture enforcement tests.
//!
//! The layering is `cli` -> `engine` -> `core`, with `ui` used only by `cli`.
//! These tests scan the source tree so that violations are caught in CI.
//!
//! # Test Categories
//!
//! 1. **Thin CLI** - Command handlers never touch the filesystem directly
//! 2. **Silent engine** - `engine` and `core` never print
//! 3. **Object store ownership** - Only `core::store` reads or writes objects
//! 4. **Layering** - `core` never imports `engine`, `cli`, or `ui`
//! 5. **No panicking shortcuts** - No `unwrap()`/`expect()` outside tests

use std::fs;
use std::path::{Path, PathBuf};

/// Files allowed to name object paths. `paths.rs` defines them.
const OBJECT_PATH_OWNERS: &[&str] = &["src/core/paths.rs", "src/core/store.rs"];

/// Forbidden tokens for command handlers.
const FS_TOKENS: &[&str] = &["std::fs", "fs::", "File::", "OpenOptions"];

/// Forbidden tokens for library layers that must not print.
const PRINT_TOKENS: &[&str] = &["println!", "eprintln!", "print!(", "eprint!("];

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// All `.rs` files under `dir`, sorted.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

/// Source lines that are neither comments nor inside the test module.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let content = fs::read_to_string(path).unwrap();
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(n, line)| (n + 1, line.to_string()))
        .collect()
}

fn relative(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}

/// Every `(file:line, text)` in `dir` containing one of `tokens`.
fn find_tokens(dir: &str, tokens: &[&str], skip: &[&str]) -> Vec<String> {
    let mut hits = Vec::new();
    for path in rust_files(&root().join(dir)) {
        let rel = relative(&path);
        if skip.contains(&rel.as_str()) {
            continue;
        }
        for (line_no, line) in production_lines(&path) {
            if tokens.iter().any(|token| line.contains(token)) {
                hits.push(format!("{rel}:{line_no}: {}", line.trim()));
            }
        }
    }
    hits
}

#[test]
fn command_handlers_do_not_touch_filesystem() {
    let hits = find_tokens("src/cli", FS_TOKENS, &[]);
    assert!(
        hits.is_empty(),
        "CLI code must go through the engine:\n{}",
        hits.join("\n")
    );
}

#[test]
fn engine_and_core_never_print() {
    let mut hits = find_tokens("src/engine", PRINT_TOKENS, &[]);
    hits.extend(find_tokens("src/core", PRINT_TOKENS, &[]));
    assert!(
        hits.is_empty(),
        "library layers must return results, not print:\n{}",
        hits.join("\n")
    );
}

#[test]
fn only_store_touches_objects() {
    let hits = find_tokens("src", &["object_path", "objects_dir"], OBJECT_PATH_OWNERS);
    assert!(
        hits.is_empty(),
        "objects are read and written only through core::store:\n{}",
        hits.join("\n")
    );
}

#[test]
fn core_does_not_depend_on_upper_layers() {
    let hits = find_tokens(
        "src/core",
        &["crate::engine", "crate::cli", "crate::ui"],
        &[],
    );
    assert!(hits.is_empty(), "core must stay at the bottom:\n{}", hits.join("\n"));
}

#[test]
fn engine_does_not_depend_on_cli_or_ui() {
    let hits = find_tokens("src/engine", &["crate::cli", "crate::ui"], &[]);
    assert!(hits.is_empty(), "engine must not render:\n{}", hits.join("\n"));
}

#[test]
fn no_unwrap_outside_tests() {
    let hits = find_tokens("src", &[".unwrap()", ".expect("], &[]);
    assert!(
        hits.is_empty(),
        "propagate errors instead of panicking:\n{}",
        hits.join("\n")
    );
}

#[test]
fn every_command_has_a_handler() {
    let commands = root().join("src/cli/commands");
    let mod_rs = fs::read_to_string(commands.join("mod.rs")).unwrap();
    for path in rust_files(&commands) {
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        if name == "mod" {
            continue;
        }
        assert!(
            mod_rs.contains(&format!("mod {name};")),
            "{name}.rs is not declared in commands/mod.rs"
        );
    }
}
