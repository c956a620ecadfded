//! Hygiene: source-scanning checks for the engine crate.
//!
//! Every production `.rs` file under `src/` (sibling `_test.rs` files are
//! skipped) is scanned for patterns that crash the page, swallow errors, or
//! bypass the `log` facade. Each pattern has a budget; all budgets are zero.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

// ── Panics ──────────────────────────────────────────────────────
const UNWRAP: Budget = Budget { pattern: ".unwrap()", max: 0, why: "propagate or log instead" };
const EXPECT: Budget = Budget { pattern: ".expect(", max: 0, why: "propagate or log instead" };
const PANIC: Budget = Budget { pattern: "panic!(", max: 0, why: "a panic kills the page" };
const UNREACHABLE: Budget = Budget { pattern: "unreachable!(", max: 0, why: "match exhaustively" };
const TODO: Budget = Budget { pattern: "todo!(", max: 0, why: "unfinished code" };
const UNIMPLEMENTED: Budget = Budget { pattern: "unimplemented!(", max: 0, why: "unfinished code" };

// ── Silent loss ─────────────────────────────────────────────────
const SILENT_DISCARD: Budget = Budget { pattern: "let _ =", max: 0, why: "inspect the error and log it" };
const DOT_OK: Budget = Budget { pattern: ".ok()", max: 0, why: "inspect the error and log it" };

// ── Diagnostics go through `log` ────────────────────────────────
const PRINTLN: Budget = Budget { pattern: "println!(", max: 0, why: "use the log facade" };
const EPRINTLN: Budget = Budget { pattern: "eprintln!(", max: 0, why: "use the log facade" };
const CONSOLE: Budget = Budget { pattern: "console::log", max: 0, why: "use the log facade" };

// ── Structure ───────────────────────────────────────────────────
const ALLOW_DEAD_CODE: Budget = Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code" };

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    assert!(!files.is_empty(), "no sources found; run from the crate root");
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Matching lines per file, skipping `//` comment lines.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
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
        .collect()
}

fn check(budget: &Budget) {
    let found = hits(&source_files(), budget.pattern);
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let listing = found
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(
        count <= budget.max,
        "`{}` budget exceeded: found {count}, max {} ({}).\n{listing}",
        budget.pattern,
        budget.max,
        budget.why,
    );
}

#[test]
fn unwrap_budget() {
    check(&UNWRAP);
}

#[test]
fn expect_budget() {
    check(&EXPECT);
}

#[test]
fn panic_budget() {
    check(&PANIC);
}

#[test]
fn unreachable_budget() {
    check(&UNREACHABLE);
}

#[test]
fn todo_budget() {
    check(&TODO);
}

#[test]
fn unimplemented_budget() {
    check(&UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    check(&SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    check(&DOT_OK);
}

#[test]
fn println_budget() {
    check(&PRINTLN);
}

#[test]
fn eprintln_budget() {
    check(&EPRINTLN);
}

#[test]
fn console_budget() {
    check(&CONSOLE);
}

#[test]
fn allow_dead_code_budget() {
    check(&ALLOW_DEAD_CODE);
}
