//! Integration tests for end-to-end execution.
//!
//! These tests write programs to a temporary directory and run them through
//! the driver, covering local module resolution, import failures and the
//! diagnostics printed for each.

use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use violet::{
    errors::errors::ErrorKind,
    runtime::{
        driver::{execute, report, run_file, DriverError, RunOptions, EXIT_FAILURE, EXIT_SUCCESS},
        runner::Runner,
        stdlib::StdLib,
    },
};

fn write(dir: &Path, name: &str, source: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, source).unwrap();
}

/// Runs `entry` from `dir`, returning the result and everything printed.
fn run_program(dir: &Path, entry: &str) -> (Runner, Result<(), DriverError>, String) {
    let path = dir.join(entry);
    let source = fs::read_to_string(&path).unwrap();

    let buffer = Rc::new(RefCell::new(Vec::new()));
    let output: Rc<RefCell<dyn Write>> = buffer.clone();
    let mut runner = Runner::new(
        path.to_string_lossy(),
        &RunOptions::default(),
        Rc::new(StdLib::default()),
        output,
    );

    let result = execute(&mut runner, source);
    let printed = String::from_utf8(buffer.borrow().clone()).unwrap();
    (runner, result, printed)
}

fn diagnostic(error: &DriverError) -> (i32, String) {
    let mut diagnostics = Vec::new();
    let code = report(error, &mut diagnostics);
    (code, String::from_utf8(diagnostics).unwrap())
}

#[test]
fn test_local_import() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "util.vi",
        "import print from std.io;
let label = \"util\";
fn double(n: Integer) -> Integer { return n * 2; }
fn main(argv) { print(\"imported main ran\"); }",
    );
    write(
        dir.path(),
        "main.vi",
        "import print from std.io;
import double, label from util;
fn main(argv) { print(double(21), label); }",
    );

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    result.unwrap();
    assert_eq!(printed, "42 util\n");
}

#[test]
fn test_import_from_subdirectory() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib/math.vi", "fn square(n) { return n * n; }");
    write(
        dir.path(),
        "main.vi",
        "import print from std.io;
import square from lib.math;
fn main(argv) { print(square(3)); }",
    );

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    result.unwrap();
    assert_eq!(printed, "9\n");
}

#[test]
fn test_nested_imports_resolve_relative_to_importer() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib/base.vi", "let greeting = \"hello\";");
    write(
        dir.path(),
        "lib/words.vi",
        "import greeting from base;\nfn greet(name) { return greeting + \" \" + name; }",
    );
    write(
        dir.path(),
        "main.vi",
        "import print from std.io;
import greet, greeting from lib.words;
fn main(argv) { print(greet(\"violet\")); }",
    );

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    result.unwrap();
    assert_eq!(printed, "hello violet\n");
}

#[test]
fn test_imported_functions_resolve_names_at_call_site() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "words.vi",
        "let greeting = \"hello\";\nfn greet(name) { return greeting + \" \" + name; }",
    );
    write(
        dir.path(),
        "main.vi",
        "import greet from words;
fn main(argv) { greet(\"violet\"); }",
    );

    let (_, result, _) = run_program(dir.path(), "main.vi");

    match result {
        Err(DriverError::Program(error)) => {
            assert_eq!(error.kind(), ErrorKind::NameError);
            assert_eq!(error.to_string(), "variable \"greeting\" is not defined");
        }
        other => panic!("expected a name error, got {:?}", other),
    }
}

#[test]
fn test_missing_export_binds_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "util.vi", "fn double(n) { return n * 2; }");
    write(
        dir.path(),
        "main.vi",
        "import double, missing from util;\nfn main(argv) {}",
    );

    let (runner, result, _) = run_program(dir.path(), "main.vi");
    assert!(runner.lookup_global("double").is_err());

    let error = result.unwrap_err();
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR:1: failed to import \"missing\" from \"util\"\n")
        )
    );
}

#[test]
fn test_import_ignores_builtin_type_names() {
    let dir = tempdir().unwrap();
    write(dir.path(), "util.vi", "fn double(n) { return n * 2; }");
    write(dir.path(), "main.vi", "import Integer from util;\nfn main(argv) {}");

    let (_, result, _) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    match &error {
        DriverError::Program(program) => assert_eq!(program.kind(), ErrorKind::ImportError),
        other => panic!("expected a program error, got {:?}", other),
    }
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR:1: failed to import \"Integer\" from \"util\"\n")
        )
    );
}

#[test]
fn test_missing_module() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.vi", "let x = 1;\nimport thing from nowhere;\nfn main(argv) {}");

    let (_, result, _) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR:2: module \"nowhere\" does not exist\n")
        )
    );
}

#[test]
fn test_circular_import() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.vi", "import g from b;\nfn f() {}\nfn main(argv) {}");
    write(dir.path(), "b.vi", "import f from a;\nfn g() {}");

    let (_, result, _) = run_program(dir.path(), "a.vi");

    match result {
        Err(DriverError::Program(error)) => {
            assert_eq!(error.kind(), ErrorKind::ImportError);
            assert_eq!(
                error.to_string(),
                "failed to load module \"b\": line 1: circular import of module \"a\""
            );
        }
        other => panic!("expected an import error, got {:?}", other),
    }
}

#[test]
fn test_self_import() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.vi", "import main from main;\nfn main(argv) {}");

    let (_, result, _) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR:1: circular import of module \"main\"\n")
        )
    );
}

#[test]
fn test_failing_module() {
    let dir = tempdir().unwrap();
    write(dir.path(), "util.vi", "let x = 1;\nx = \"s\";");
    write(dir.path(), "main.vi", "import x from util;\nfn main(argv) {}");

    let (_, result, _) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from(
                "ERROR:1: failed to load module \"util\": line 2: types do not match: expected \"Integer\", received \"String\"\n"
            )
        )
    );
}

#[test]
fn test_parse_error_diagnostic() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.vi", "let x = 1;\nlet = 2;\nfn main(argv) {}");

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert_eq!(printed, "");
    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR:2: unexpected token (expected identifier during variable declaration): \"=\"\n")
        )
    );
}

#[test]
fn test_every_parse_error_reported() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "main.vi",
        "let = 1;\nlet ok = 2;\nfn main(argv) {\n    let y = ;\n}\nlet z = (3;",
    );

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert!(matches!(&error, DriverError::Syntax(errors) if errors.len() == 3));
    assert_eq!(printed, "");

    let (code, lines) = diagnostic(&error);
    assert_eq!(code, EXIT_FAILURE);
    let prefixes: Vec<String> = lines
        .lines()
        .map(|line| line.splitn(3, ':').take(2).collect::<Vec<_>>().join(":"))
        .collect();
    assert_eq!(prefixes, vec!["ERROR:1", "ERROR:4", "ERROR:6"]);
}

#[test]
fn test_output_before_failure_is_kept() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "main.vi",
        "import print from std.io;
fn main(argv) {
    print(\"before\");
    let y = 1 / 0;
    print(\"after\");
}",
    );

    let (_, result, printed) = run_program(dir.path(), "main.vi");

    let error = result.unwrap_err();
    assert_eq!(printed, "before\n");
    assert_eq!(
        diagnostic(&error),
        (EXIT_FAILURE, String::from("ERROR:4: division by zero\n"))
    );
}

#[test]
fn test_unreadable_file_diagnostic() {
    let error = DriverError::Unreadable {
        path: String::from("missing.vi"),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    };

    assert_eq!(
        diagnostic(&error),
        (
            EXIT_FAILURE,
            String::from("ERROR: could not read 'missing.vi': not found\n")
        )
    );
}

#[test]
fn test_run_file_exit_codes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "ok.vi", "fn main(argv) {}");
    write(dir.path(), "no_main.vi", "let x = 1;");
    write(dir.path(), "broken.vi", "fn main(argv) { let x = ; }");

    let options = RunOptions::default();
    assert_eq!(run_file(&dir.path().join("ok.vi"), &options), EXIT_SUCCESS);
    assert_eq!(run_file(&dir.path().join("no_main.vi"), &options), EXIT_FAILURE);
    assert_eq!(run_file(&dir.path().join("broken.vi"), &options), EXIT_FAILURE);
    assert_eq!(run_file(&dir.path().join("absent.vi"), &options), EXIT_FAILURE);
}
