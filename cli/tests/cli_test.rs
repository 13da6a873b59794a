use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const HELLO_WORLD: &str = r#"
class Main {
    public static void main() {
        System.out.println(42);
    }
}
"#;

const BAD_PROGRAM: &str = r#"
class Main {
    public static void main() {
        System.out.println(missing);
    }
}
"#;

#[test]
fn check_succeeds_on_a_valid_program() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(&dir, "hello.mjava", HELLO_WORLD);

    Command::cargo_bin("mjc")
        .unwrap()
        .args(["check", "--source"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_fails_on_an_invalid_program() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(&dir, "bad.mjava", BAD_PROGRAM);

    Command::cargo_bin("mjc")
        .unwrap()
        .args(["check", "--source"])
        .arg(&source)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn compile_writes_a_c_project_to_the_output_directory() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let source = write_fixture(&src_dir, "hello.mjava", HELLO_WORLD);

    Command::cargo_bin("mjc")
        .unwrap()
        .args(["compile", "--source"])
        .arg(&source)
        .arg("--out")
        .arg(out_dir.path())
        .assert()
        .success();

    assert!(out_dir.path().join("Main.c").exists());
    assert!(out_dir.path().join("Main.h").exists());
    assert!(out_dir.path().join("main.c").exists());
    assert!(out_dir.path().join("__int_array.h").exists());
    assert!(out_dir.path().join("CMakeLists.txt").exists());
}

#[test]
fn compile_reports_json_errors_when_requested() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let source = write_fixture(&src_dir, "bad.mjava", BAD_PROGRAM);

    Command::cargo_bin("mjc")
        .unwrap()
        .args(["compile", "--source"])
        .arg(&source)
        .arg("--out")
        .arg(out_dir.path())
        .arg("--json-errors")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"message\""));
}
