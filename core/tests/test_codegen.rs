//! Structural assertions on emitted C source. These never invoke a C
//! compiler — spec.md's "compiling the emitted C" round-trip property is
//! documented, not executed, since shelling out to `cc` is outside this
//! crate's business.

use mjc::driver::CompileOptions;
use mjc::compile_to_units;
use pretty_assertions::assert_eq;

fn generate(src: &str) -> Vec<mjc::GeneratedFile> {
    compile_to_units(src, &CompileOptions::default()).expect("expected successful compile")
}

fn file<'a>(files: &'a [mjc::GeneratedFile], name: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.to_str() == Some(name))
        .unwrap_or_else(|| panic!("no generated file named {}", name))
        .contents
        .as_str()
}

#[test]
fn header_includes_are_a_superset_of_field_and_param_dependencies() {
    let src = r#"
        class Engine {
            int horsepower;
        }
        class Car {
            Engine engine;
            public void start(Engine e) {
                engine = e;
            }
        }
        class Main {
            public static void main() {}
        }
    "#;
    let files = generate(src);
    let car_h = file(&files, "Car.h");
    assert!(car_h.contains("#include \"Engine.h\""));
}

#[test]
fn dangling_else_binds_to_the_nearest_if_in_generated_labels() {
    let src = r#"
        class Main {
            public static void main() {
                boolean a;
                boolean b;
                a = true;
                b = false;
                if (a) if (b) System.out.println(1); else System.out.println(2);
            }
        }
    "#;
    let files = generate(src);
    let main_c = file(&files, "Main.c");
    // Only the inner `if` has an else arm, so its else label's name
    // should appear exactly twice: once as a goto target, once as the
    // label definition. The outer `if` never produces one.
    let else_labels = main_c.matches("$_l_if_else_").count();
    assert_eq!(else_labels, 2);
}

#[test]
fn multi_level_inheritance_embeds_super_by_value() {
    let src = r#"
        class A { int a; }
        class B extends A { int b; }
        class C extends B { int c; }
        class Main {
            public static void main() {}
        }
    "#;
    let files = generate(src);
    let b_h = file(&files, "B.h");
    assert!(b_h.contains("struct A super;"));
    let c_h = file(&files, "C.h");
    assert!(c_h.contains("struct B super;"));
}

#[test]
fn only_the_introducing_class_declares_the_function_pointer_field() {
    let src = r#"
        class Animal {
            public int legs() { return 4; }
        }
        class Bird extends Animal {
            public int legs() { return 2; }
        }
        class Main {
            public static void main() {}
        }
    "#;
    let files = generate(src);
    let animal_h = file(&files, "Animal.h");
    assert!(animal_h.contains("$_function_legs"));
    let bird_h = file(&files, "Bird.h");
    assert!(!bird_h.contains("$_function_legs"));
}

#[test]
fn override_installs_its_own_function_pointer_in_the_inherited_slot() {
    let src = r#"
        class Animal {
            public int legs() { return 4; }
        }
        class Bird extends Animal {
            public int legs() { return 2; }
        }
        class Main {
            public static void main() {}
        }
    "#;
    let files = generate(src);
    let bird_c = file(&files, "Bird.c");
    assert!(bird_c.contains("self->super.$_function_legs = &Bird_legs;"));
    let animal_c = file(&files, "Animal.c");
    assert!(animal_c.contains("self->$_function_legs = &Animal_legs;"));
}

#[test]
fn cmake_manifest_declares_a_single_c99_executable_target() {
    let files = generate("class Main { public static void main() {} }");
    let cmake = file(&files, "CMakeLists.txt");
    assert!(cmake.contains("add_executable(mjc_program"));
    assert!(cmake.contains("CMAKE_C_STANDARD 99"));
}

#[test]
fn cmake_manifest_globs_sources_instead_of_naming_them() {
    let files = generate("class Main { public static void main() {} }");
    let cmake = file(&files, "CMakeLists.txt");
    let expected = "cmake_minimum_required(VERSION 3.10)\nproject(mjc_program C)\n\nset(CMAKE_C_STANDARD 99)\nset(CMAKE_C_STANDARD_REQUIRED ON)\n\nfile(GLOB MJC_SOURCES CONFIGURE_DEPENDS \"*.c\")\nadd_executable(mjc_program ${MJC_SOURCES})\n";
    assert_eq!(cmake, expected);
}
