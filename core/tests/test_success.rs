//! Integration tests for programs that should compile all the way through
//! to generated C without error.

use mjc::driver::CompileOptions;
use mjc::compile_to_units;

fn compile_ok(src: &str) -> Vec<mjc::GeneratedFile> {
    compile_to_units(src, &CompileOptions::default())
        .unwrap_or_else(|e| panic!("expected successful compile, got: {}", e))
}

fn file_contents<'a>(files: &'a [mjc::GeneratedFile], name: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.to_str() == Some(name))
        .unwrap_or_else(|| panic!("no generated file named {}", name))
        .contents
        .as_str()
}

#[test]
fn hello_world() {
    let src = r#"
        class Main {
            public static void main() {
                System.out.println(1);
            }
        }
    "#;
    let files = compile_ok(src);
    let main_c = file_contents(&files, "main.c");
    assert!(main_c.contains("Main_main()"));
    let main_class_c = file_contents(&files, "Main.c");
    assert!(main_class_c.contains("printf(\"%d\\n\", 1);"));
}

#[test]
fn print_does_not_append_a_newline() {
    let src = r#"
        class Main {
            public static void main() {
                System.out.print(1);
                System.out.println(2);
                System.out.printf(3);
            }
        }
    "#;
    let files = compile_ok(src);
    let main_class_c = file_contents(&files, "Main.c");
    assert!(main_class_c.contains("printf(\"%d\", 1);"));
    assert!(main_class_c.contains("printf(\"%d\\n\", 2);"));
    assert!(main_class_c.contains("printf(\"%d\\n\", 3);"));
}

#[test]
fn inheritance_and_override() {
    let src = r#"
        class Shape {
            int sides;
            public int getSides() {
                return sides;
            }
        }
        class Square extends Shape {
            public int getSides() {
                return 4;
            }
        }
        class Main {
            public static void main() {
                Square s;
                s = new Square();
                System.out.println(s.getSides());
            }
        }
    "#;
    let files = compile_ok(src);
    let square_c = file_contents(&files, "Square.c");
    assert!(square_c.contains("Square_getSides"));
    let shape_h = file_contents(&files, "Shape.h");
    assert!(shape_h.contains("$_function_getSides"));
    let square_h = file_contents(&files, "Square.h");
    assert!(!square_h.contains("$_function_getSides"));
}

#[test]
fn array_allocation_and_length() {
    let src = r#"
        class Main {
            public static void main() {
                int[] xs;
                int total;
                xs = new int[10];
                xs[0] = 5;
                total = xs.length + xs[0];
                System.out.println(total);
            }
        }
    "#;
    let files = compile_ok(src);
    let main_c = file_contents(&files, "Main.c");
    assert!(main_c.contains("$_new___int_array(10)"));
    assert!(main_c.contains("->length"));
    assert!(main_c.contains("->data["));
}

#[test]
fn loops_and_casts() {
    let src = r#"
        class Counter {
            int value;
            public int next() {
                value = value + 1;
                return value;
            }
        }
        class Main {
            public static void main() {
                int i;
                int total;
                boolean done;
                total = 0;
                i = 0;
                while (i < 10) {
                    total = total + i;
                    i = i + 1;
                }
                done = false;
                do {
                    total = total - 1;
                } while (!done);
                for (i = 0; i < 5; i = i + 1) {
                    total = total + i;
                }
                System.out.println((int) total);
            }
        }
    "#;
    let files = compile_ok(src);
    let main_c = file_contents(&files, "Main.c");
    assert!(main_c.contains("goto"));
    assert!(main_c.contains("(int)"));
}

#[test]
fn three_level_field_inheritance() {
    let src = r#"
        class A {
            int a;
        }
        class B extends A {
            int b;
        }
        class C extends B {
            public int sum() {
                return a + b;
            }
        }
        class Main {
            public static void main() {
                C c;
                c = new C();
                System.out.println(c.sum());
            }
        }
    "#;
    let files = compile_ok(src);
    let c_c = file_contents(&files, "C.c");
    assert!(c_c.contains("super.super"));
}

#[test]
fn nested_method_calls() {
    let src = r#"
        class Helper {
            public int identity(int x) {
                return x;
            }
        }
        class Main {
            public static void main() {
                Helper h;
                h = new Helper();
                System.out.println(h.identity(h.identity(3)));
            }
        }
    "#;
    let files = compile_ok(src);
    let main_c = file_contents(&files, "Main.c");
    // Each nested call dispatches through the receiver's function-pointer
    // slot, so two independent `->$_function_identity(` call sites should
    // appear — one for the outer call, one for the inner.
    assert_eq!(main_c.matches("->$_function_identity(").count(), 2);
    let helper_c = file_contents(&files, "Helper.c");
    assert!(helper_c.contains("Helper_identity"));
}
