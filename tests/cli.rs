use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn knov_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("knov");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("sun.txt"),
        "The sun shines particularly strongly when it's noon.",
    )
    .unwrap();
    fs::write(
        files_dir.join("lake.txt"),
        "This is another note. The man was swimming in the lake.",
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/knov.sqlite"

[snippet]
left = "<b>"
right = "</b>"
tokens = 16
"#,
        root.display()
    );

    let config_path = config_dir.join("knov.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_knov(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = knov_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run knov binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn file(tmp: &TempDir, name: &str) -> String {
    tmp.path().join("files").join(name).display().to_string()
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_knov(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_knov(&config_path, &["init"]);
    assert!(success, "second init failed (not idempotent)");
}

#[test]
fn test_index_then_search() {
    let (tmp, config_path) = setup_test_env();
    let sun = file(&tmp, "sun.txt");
    let lake = file(&tmp, "lake.txt");

    let (stdout, stderr, success) =
        run_knov(&config_path, &["index", &sun, "-t", "sky", "-t", "day", "--title", "Sun"]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("indexed"));
    run_knov(&config_path, &["index", &lake, "-t", "water"]);

    let (stdout, _, success) = run_knov(&config_path, &["search", "shine", "--show-tags"]);
    assert!(success);
    assert!(stdout.contains(&sun));
    assert!(stdout.contains("<b>shines</b>"));
    assert!(stdout.contains("tags: day, sky"));
    assert!(!stdout.contains(&lake));

    let (stdout, _, success) = run_knov(&config_path, &["search", "swim", "-t", "sky"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_reindex_updates_in_place() {
    let (tmp, config_path) = setup_test_env();
    let sun = file(&tmp, "sun.txt");

    run_knov(&config_path, &["index", &sun, "-t", "sky"]);
    let (stdout, _, success) = run_knov(&config_path, &["index", &sun, "-t", "noon"]);
    assert!(success);
    assert!(stdout.contains("updated"));

    let (stdout, _, _) = run_knov(&config_path, &["stats"]);
    assert!(stdout.contains("Documents:   1"));
    assert!(stdout.contains("Segments:    1"));
    assert!(stdout.contains("Tag links:   1"));

    let (stdout, _, _) = run_knov(&config_path, &["tags", "noon"]);
    assert!(stdout.contains(&sun));
    let (stdout, _, _) = run_knov(&config_path, &["tags", "sky"]);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_with_broken_syntax() {
    let (tmp, config_path) = setup_test_env();
    let sun = file(&tmp, "sun.txt");
    run_knov(&config_path, &["index", &sun]);

    let (stdout, stderr, success) = run_knov(&config_path, &["search", "noon\""]);
    assert!(success, "search failed: stderr={}", stderr);
    assert!(stdout.contains(&sun));
}

#[test]
fn test_exists() {
    let (tmp, config_path) = setup_test_env();
    let sun = file(&tmp, "sun.txt");

    let (_, _, success) = run_knov(&config_path, &["exists", &sun]);
    assert!(!success);

    run_knov(&config_path, &["index", &sun]);
    let (stdout, _, success) = run_knov(&config_path, &["exists", &sun]);
    assert!(success);
    assert!(stdout.contains("indexed"));
}

#[test]
fn test_unknown_type_fails() {
    let (tmp, config_path) = setup_test_env();
    let sun = file(&tmp, "sun.txt");

    let (_, stderr, success) = run_knov(&config_path, &["index", &sun, "-d", "website"]);
    assert!(!success);
    assert!(stderr.contains("unknown document type"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_knov(&tmp.path().join("absent.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("configuration error"));
}
