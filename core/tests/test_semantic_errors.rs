//! Integration tests for programs that should fail during semantic
//! analysis. Each program exercises exactly one rule from spec.md §4.3.

use mjc::driver::CompileOptions;
use mjc::{check, compile_to_units};

fn expect_semantic_error(src: &str, needle: &str) {
    let err = check(src).unwrap_err();
    let message = format!("{}", err);
    assert!(
        message.contains(needle),
        "expected error containing {:?}, got {:?}",
        needle,
        message
    );
}

#[test]
fn cyclic_inheritance_is_rejected() {
    expect_semantic_error(
        r#"
        class A extends B {}
        class B extends A {}
        "#,
        "Cyclic inheritance",
    );
}

#[test]
fn duplicate_field_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            int x;
            int x;
            public static void main() {}
        }
        "#,
        "already exists",
    );
}

#[test]
fn undefined_reference_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {
                System.out.println(missing);
            }
        }
        "#,
        "not found",
    );
}

#[test]
fn type_mismatch_in_binary_expression_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {
                boolean b;
                b = 1 && true;
            }
        }
        "#,
        "boolean",
    );
}

#[test]
fn assigning_to_array_length_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {
                int[] xs;
                xs = new int[4];
                xs.length = 10;
            }
        }
        "#,
        "length",
    );
}

#[test]
fn break_outside_a_loop_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {
                break;
            }
        }
        "#,
        "break",
    );
}

#[test]
fn continue_outside_a_loop_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {
                continue;
            }
        }
        "#,
        "continue",
    );
}

#[test]
fn unreachable_statement_after_return_is_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public int value() {
                return 1;
                return 2;
            }
            public static void main() {}
        }
        "#,
        "Unreachable",
    );
}

#[test]
fn missing_main_method_is_rejected() {
    expect_semantic_error(
        r#"
        class Helper {
            int x;
        }
        "#,
        "main method",
    );
}

#[test]
fn multiple_main_methods_are_rejected() {
    expect_semantic_error(
        r#"
        class Main {
            public static void main() {}
        }
        class OtherMain {
            public static void main() {}
        }
        "#,
        "multiple classes declare a main method",
    );
}

#[test]
fn check_and_compile_agree_on_failure() {
    let src = r#"
        class Main {
            public static void main() {
                System.out.println(missing);
            }
        }
    "#;
    assert!(check(src).is_err());
    assert!(compile_to_units(src, &CompileOptions::default()).is_err());
}
