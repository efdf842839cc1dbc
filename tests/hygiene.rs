//! Hygiene: source-level standards checked at test time.
//!
//! Scans `src/` (excluding `_test.rs` files and the shared test doubles) for
//! patterns that crash, swallow errors, or bypass the `log` facade. Every
//! budget is zero; the budget never grows.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        if !is_rs || path_str.ends_with("_test.rs") || path_str.ends_with("testing.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Fail if `pattern` appears on more than `budget` lines across the crate.
fn assert_budget(pattern: &str, budget: usize, why: &str) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");

    let hits: Vec<(String, usize)> = files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect();
    let total: usize = hits.iter().map(|(_, c)| c).sum();
    let listing = hits
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");

    assert!(total <= budget, "`{pattern}` ({why}): found {total}, max {budget}.\n{listing}");
}

#[test]
fn no_unwrap() {
    assert_budget(".unwrap()", 0, "panics");
}

#[test]
fn no_expect() {
    assert_budget(".expect(", 0, "panics");
}

#[test]
fn no_panic_macros() {
    for pattern in ["panic!(", "unreachable!(", "todo!(", "unimplemented!("] {
        assert_budget(pattern, 0, "panics");
    }
}

#[test]
fn no_silent_discard() {
    assert_budget("let _ =", 0, "drops a result unread");
    assert_budget(".ok()", 0, "drops an error unread");
}

#[test]
fn no_dead_code_allowance() {
    assert_budget("#[allow(dead_code)]", 0, "hides unused code");
}

#[test]
fn logging_goes_through_log_facade() {
    for pattern in ["println!(", "eprintln!(", "dbg!(", "console::log"] {
        assert_budget(pattern, 0, "bypasses the log facade");
    }
}

#[test]
fn no_unstable_web_sys_setters() {
    // Only generated under `--cfg web_sys_unstable_apis`.
    assert_budget("set_desynchronized(", 0, "unstable web-sys API");
}
