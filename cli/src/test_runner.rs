use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use generator::Error;
use serde::Deserialize;

use crate::manifest::Manifest;

const TEST_SUFFIX: &str = ".test.toml";

/// A `.test.toml` fixture: a package manifest plus expectations about
/// the generated source.
#[derive(Debug, Deserialize)]
pub struct TestCase {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Substrings that must appear in the generated source, in order.
    #[serde(default)]
    pub expect_contains: Vec<String>,

    /// Substrings that must not appear in the generated source.
    #[serde(default)]
    pub expect_absent: Vec<String>,

    /// Expected generation error: its Display string must contain this.
    #[serde(default)]
    pub expect_error: Option<String>,

    #[serde(flatten)]
    pub manifest: Manifest,
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let case: TestCase = match toml::from_str(&content) {
        Ok(case) => case,
        Err(e) => return fail(None, format!("TOML parse error: {}", e)),
    };
    let description = case.description.clone();

    let package = match case.manifest.to_package() {
        Ok(p) => p,
        Err(e) => return fail(description, format!("invalid manifest: {}", e)),
    };

    // Pin the banner timestamp so expectations can match it.
    let mut options = case.manifest.render_options();
    if let Some(at) = NaiveDate::from_ymd_opt(2006, 1, 2).and_then(|d| d.and_hms_opt(15, 4, 5)) {
        options = options.with_generated_at(at);
    }

    let mut output = Vec::new();
    let result = generator::write_package(&package, &mut output, &options);
    let output = String::from_utf8_lossy(&output);

    let outcome = match check(&case, result, &output) {
        Some(reason) => TestOutcome::Fail(reason),
        None => TestOutcome::Pass,
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Compare a generation result against the fixture's expectations.
/// Returns `Some(reason)` on mismatch.
fn check(case: &TestCase, result: Result<(), Error>, output: &str) -> Option<String> {
    match (&case.expect_error, result) {
        (Some(expected), Err(err)) => {
            let message = err.to_string();
            return (!message.contains(expected.as_str())).then(|| {
                format!(
                    "expected error containing \"{}\", got: {}",
                    expected, message
                )
            });
        }
        (Some(expected), Ok(())) => {
            return Some(format!(
                "expected error containing \"{}\", but generation succeeded",
                expected
            ));
        }
        (None, Err(err)) => return Some(format!("unexpected error: {}", err)),
        (None, Ok(())) => {}
    }

    let mut rest = output;
    for expected in &case.expect_contains {
        match rest.find(expected.as_str()) {
            Some(at) => rest = &rest[at + expected.len()..],
            None if output.contains(expected.as_str()) => {
                return Some(format!("output contains {:?}, but out of order", expected));
            }
            None => {
                return Some(format!(
                    "output is missing {:?}\n  actual output:\n{}",
                    expected, output
                ));
            }
        }
    }

    case.expect_absent
        .iter()
        .find(|absent| output.contains(absent.as_str()))
        .map(|absent| format!("output unexpectedly contains {:?}", absent))
}

/// Fixture files grouped by category: their directory relative to `root`,
/// "" for files directly in it.
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect_tests(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEST_SUFFIX));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Select the categories to run. An empty request selects everything; a
/// requested category also selects its sub-folders.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }

    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                available.join(", ")
            );
        }
    }
    selected
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, code: &str, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }
}

fn print_result(result: &TestResult, style: &Style) {
    let label = match result.outcome {
        TestOutcome::Pass => style.pass(),
        TestOutcome::Fail(_) => style.fail(),
    };
    eprintln!("  {}  {}", label, result.label());
}

/// Print failure details and the summary line. Returns the exit code.
fn summarize(results: &[TestResult], style: &Style) -> i32 {
    let failures: Vec<&TestResult> = results
        .iter()
        .filter(|r| matches!(r.outcome, TestOutcome::Fail(_)))
        .collect();
    let passed = results.len() - failures.len();

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            passed,
            failures.len(),
            results.len()
        );
        1
    }
}

/// Run all `.test.toml` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    if path.is_file() {
        let result = run_single_test(path);
        print_result(&result, &style);
        return summarize(&[result], &style);
    }

    let all_categories = discover_categorized(path);
    if all_categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return 1;
    }

    let selected = select_categories(&all_categories, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut results = Vec::new();
    for (category, files) in selected {
        eprintln!();
        eprintln!("{}", style.paint("1", category_label(category)));
        for file in files {
            let result = run_single_test(file);
            print_result(&result, &style);
            results.push(result);
        }
    }
    summarize(&results, &style)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSING: &str = r#"
description = "hello world"
package = "views"
expect_contains = ["package views", "__1 = []byte(\"Hello\")", "c.Write(__1)"]
expect_absent = ["import ("]

[[templates]]
path = "hello.ego"

[[templates.blocks]]
kind = "declaration"
content = "func Hello(c *Context)"

[[templates.blocks]]
kind = "text"
content = "Hello"
"#;

    const EXPECTS_ERROR: &str = r#"
package = "views"
expect_error = "declaration block required"

[[templates]]
path = "broken.ego"
"#;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn passing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "hello.test.toml", PASSING);
        let result = run_single_test(&path);
        assert!(matches!(result.outcome, TestOutcome::Pass));
        assert_eq!(result.label(), "hello world");
    }

    #[test]
    fn expected_error_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "broken.test.toml", EXPECTS_ERROR);
        let result = run_single_test(&path);
        assert!(matches!(result.outcome, TestOutcome::Pass));
        assert_eq!(result.label(), "broken");
    }

    #[test]
    fn out_of_order_expectations_fail() {
        let dir = tempfile::tempdir().unwrap();
        let swapped = PASSING.replace(
            "[\"package views\", \"__1",
            "[\"c.Write(__1)\", \"package views\", \"__1",
        );
        let path = write_fixture(dir.path(), "swapped.test.toml", &swapped);
        let TestOutcome::Fail(reason) = run_single_test(&path).outcome else {
            panic!("expected failure");
        };
        assert!(reason.contains("out of order"), "{}", reason);
    }

    #[test]
    fn discovers_fixtures_by_category() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("imports/dedup")).unwrap();
        write_fixture(dir.path(), "top.test.toml", PASSING);
        write_fixture(&dir.path().join("imports"), "a.test.toml", PASSING);
        write_fixture(&dir.path().join("imports/dedup"), "b.test.toml", PASSING);
        write_fixture(&dir.path().join("imports"), "notes.toml", PASSING);

        let categories = discover_categorized(dir.path());
        let names: Vec<&str> = categories.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["", "imports", "imports/dedup"]);

        let selected = select_categories(&categories, &["imports".to_string()]);
        assert_eq!(selected.len(), 2);
        assert_eq!(run_tests(dir.path(), true, &[]), 0);
    }

    #[test]
    fn repository_fixtures_pass() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
        assert_eq!(run_tests(&fixtures, true, &[]), 0);
    }
}
