//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold:
//! the domain is pure, application services speak only to ports, and only the
//! infrastructure layer touches HTTP or the filesystem.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

/// Non-test lines of every file under `dir` containing any of `needles`.
fn find_in_production_code(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        if file.file_name().and_then(|n| n.to_str()) == Some("test_support.rs") {
            continue;
        }
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        let mut tracker = CfgTestTracker::new();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if tracker.process_line(line) {
                continue;
            }
            for needle in needles {
                if line.contains(needle) {
                    violations.push(format!("{rel}:{}: `{needle}`: {line}", i + 1));
                }
            }
        }
    }
    violations
}

#[test]
fn domain_is_pure() {
    let violations = find_in_production_code(
        &src_dir().join("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "tokio",
            "reqwest",
            "std::fs",
            "std::net",
        ],
    );
    assert!(
        violations.is_empty(),
        "Found I/O or outer-layer imports in domain/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_depends_only_on_ports() {
    let violations = find_in_production_code(
        &src_dir().join("application"),
        &[
            "crate::infra",
            "crate::commands",
            "crate::output",
            "reqwest",
            "std::fs",
        ],
    );
    assert!(
        violations.is_empty(),
        "Found infrastructure imports in application/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_concrete_adapters_in_service_signatures() {
    let concrete = ["HttpBackend", "JsonFileStore", "GitHubClient", "ProvisionerClient"];
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir().join("application").join("services")) {
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if !line.contains("fn ") {
                continue;
            }
            for ty in concrete {
                if line.contains(ty) {
                    violations.push(format!("{}:{}: {line}", file.display(), i + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "Found concrete adapter types in service signatures; use port bounds:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_unwrap_in_production_code() {
    let violations = find_in_production_code(&src_dir(), &[".unwrap()", ".expect("]);
    let allowed: Vec<_> = violations
        .into_iter()
        .filter(|v| !v.contains("valid regex"))
        .collect();
    assert!(
        allowed.is_empty(),
        "Found unwrap/expect outside tests:\n{}",
        allowed.join("\n")
    );
}
