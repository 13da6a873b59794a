//! Assembles the per-class `.h`/`.c` text, the fixed `int[]` runtime
//! support pair, the program's `main.c`, and the CMake build manifest, per
//! spec.md §4.4/§4.5.

use crate::ast::*;

use super::layout::{self, c_kind_type_name};
use super::lower::Lowerer;

use itertools::Itertools;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// One file this compile produced, relative to the output directory the
/// driver was asked to write into.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

pub fn emit_class(project: &Project, class: &Class) -> (GeneratedFile, GeneratedFile) {
    let deps = referenced_classes(project, class);

    let header = emit_header(project, class, &deps);
    let source = emit_source(project, class);

    (
        GeneratedFile {
            path: PathBuf::from(format!("{}.h", class.name)),
            contents: header,
        },
        GeneratedFile {
            path: PathBuf::from(format!("{}.c", class.name)),
            contents: source,
        },
    )
}

fn emit_header(project: &Project, class: &Class, deps: &BTreeSet<String>) -> String {
    let guard = format!("MJC_{}_H", class.name.to_uppercase());
    let mut out = String::new();
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
    out.push_str(&format!("struct {};\n\n", class.name));
    out.push_str("#include <stdbool.h>\n#include \"__int_array.h\"\n");
    for dep in deps {
        out.push_str(&format!("#include \"{}.h\"\n", dep));
    }
    out.push('\n');

    out.push_str(&format!("struct {} {{\n", class.name));
    if let Some(parent) = &class.extends {
        out.push_str(&format!("    struct {} super;\n", parent));
    }
    for field in &class.fields {
        out.push_str(&format!(
            "    {} {};\n",
            c_kind_type_name(field.primitive_kind, &field.type_lexeme),
            field.name
        ));
    }
    for method in &class.methods {
        if method.is_main || !layout::declares_own_slot(project, &class.name, &method.name) {
            continue;
        }
        out.push_str(&format!("    {};\n", method_pointer_field(method)));
    }
    out.push_str("};\n\n");

    out.push_str(&format!(
        "struct {}* $_new_{}(void);\n",
        class.name, class.name
    ));
    for method in &class.methods {
        out.push_str(&format!("{};\n", method_signature(class, method)));
    }

    out.push_str(&format!("\n#endif /* {} */\n", guard));
    out
}

fn emit_source(project: &Project, class: &Class) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "#include \"{}.h\"\n#include <stdlib.h>\n#include <stdio.h>\n\n",
        class.name
    ));

    out.push_str(&format!(
        "struct {}* $_new_{}(void) {{\n    struct {}* self = calloc(1, sizeof(struct {}));\n",
        class.name, class.name, class.name, class.name
    ));
    for slot in layout::visible_method_slots(project, &class.name) {
        let hops = layout::hops_to_ancestor(project, &class.name, &slot.field_owner);
        let field = layout::super_path(hops, &format!("$_function_{}", slot.name));
        out.push_str(&format!(
            "    self->{} = &{}_{};\n",
            field, slot.impl_owner, slot.name
        ));
    }
    out.push_str("    return self;\n}\n\n");

    for method in &class.methods {
        out.push_str(&method_signature(class, method));
        out.push_str(" {\n");
        if !method.is_main {
            out.push_str(&format!(
                "    struct {}* super = (struct {}*) $this;\n",
                class.name, class.name
            ));
        }
        let mut lowerer = Lowerer::new(project, &class.name);
        for line in lowerer.lower_method(method) {
            out.push_str("    ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("}\n\n");
    }

    out
}

/// Every non-main method takes `void* $this` as its first parameter, per
/// spec.md §4.4/§6 — the body then aliases it into a typed local named
/// `super` (see `emit_source`) rather than receiving a typed receiver
/// parameter directly.
fn method_signature(class: &Class, method: &Method) -> String {
    let ret = c_kind_type_name(method.return_kind, &method.return_lexeme);
    if method.is_main {
        return format!("{} {}_main(void)", ret, class.name);
    }
    let mut params = vec!["void* $this".to_string()];
    for p in &method.params {
        params.push(format!(
            "{} {}",
            c_kind_type_name(p.primitive_kind, &p.type_lexeme),
            p.name
        ));
    }
    format!("{} {}_{}({})", ret, class.name, method.name, params.join(", "))
}

/// The `$_function_<name>` struct field declaration for a method a class
/// introduces (not an override — those reuse an ancestor's slot).
fn method_pointer_field(method: &Method) -> String {
    let ret = c_kind_type_name(method.return_kind, &method.return_lexeme);
    let params = std::iter::once("void*".to_string())
        .chain(method.params.iter().map(|p| c_kind_type_name(p.primitive_kind, &p.type_lexeme)))
        .join(", ");
    format!("{} (*$_function_{})({})", ret, method.name, params)
}

/// Every other class referenced by `class`'s fields, method signatures, or
/// method bodies (field/param/return types, `new` allocations, and any
/// chain part that resolves to a class type) — spec.md's "dependency-
/// tracked #includes".
fn referenced_classes(project: &Project, class: &Class) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    if let Some(parent) = &class.extends {
        set.insert(parent.clone());
    }
    for field in &class.fields {
        if field.primitive_kind == PrimitiveKind::Class {
            set.insert(field.type_lexeme.clone());
        }
    }
    for method in &class.methods {
        if method.return_kind == PrimitiveKind::Class {
            set.insert(method.return_lexeme.clone());
        }
        for param in &method.params {
            if param.primitive_kind == PrimitiveKind::Class {
                set.insert(param.type_lexeme.clone());
            }
        }
        collect_node(&method.body, &mut set);
    }
    set.remove(&class.name);
    set.retain(|name| project.contains(name));
    set
}

fn collect_node(node: &ASTNode, set: &mut BTreeSet<String>) {
    match &node.kind {
        ASTNodeKind::CodeBlock(stmts) => {
            for stmt in stmts {
                collect_node(stmt, set);
            }
        }
        ASTNodeKind::BinaryExpression { left, right, .. } => {
            collect_node(left, set);
            collect_node(right, set);
        }
        ASTNodeKind::NotExpression { operand, .. } => collect_node(operand, set),
        ASTNodeKind::CastExpression {
            operand,
            target_type_lexeme,
        } => {
            collect_node(operand, set);
            set.insert(target_type_lexeme.clone());
        }
        ASTNodeKind::ReturnStatement { operand } => {
            if let Some(operand) = operand {
                collect_node(operand, set);
            }
        }
        ASTNodeKind::Reference(chain) => collect_chain(chain, set),
        ASTNodeKind::LocalVariableDecl(field) => {
            if field.primitive_kind == PrimitiveKind::Class {
                set.insert(field.type_lexeme.clone());
            }
        }
        ASTNodeKind::Assignment { lhs, rhs, .. } => {
            collect_chain(lhs, set);
            collect_node(rhs, set);
        }
        ASTNodeKind::IfStatement {
            condition,
            then_body,
            else_body,
        } => {
            collect_node(condition, set);
            collect_node(then_body, set);
            if let Some(else_body) = else_body {
                collect_node(else_body, set);
            }
        }
        ASTNodeKind::WhileStatement { condition, body, .. } => {
            collect_node(condition, set);
            collect_node(body, set);
        }
        ASTNodeKind::ForStatement {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                collect_node(init, set);
            }
            if let Some(condition) = condition {
                collect_node(condition, set);
            }
            if let Some(update) = update {
                collect_node(update, set);
            }
            if let Some(body) = body {
                collect_node(body, set);
            }
        }
        _ => {}
    }
}

fn collect_chain(chain: &ReferenceChain, set: &mut BTreeSet<String>) {
    for part in &chain.parts {
        if is_class_type(&part.resolved_type) {
            set.insert(part.resolved_type.clone());
        }
        match &part.payload {
            Some(ChainPayload::NewObject {
                class_type: Some(class),
                ..
            }) => {
                set.insert(class.clone());
            }
            Some(ChainPayload::MethodCall { args, .. }) => {
                for arg in args {
                    collect_node(arg, set);
                }
            }
            Some(ChainPayload::ArrayCall { index, .. }) => collect_node(index, set),
            _ => {}
        }
    }
}

fn is_class_type(name: &str) -> bool {
    !matches!(
        name,
        "int" | "int[]" | "boolean" | "void" | "System" | "System.out" | "return-void" | ""
    )
}

/// The fixed `int[]` runtime support pair, included by every generated
/// header.
pub fn int_array_runtime() -> (GeneratedFile, GeneratedFile) {
    let header = r#"#ifndef MJC_INT_ARRAY_H
#define MJC_INT_ARRAY_H

typedef struct __int_array {
    int length;
    int* data;
} __int_array;

__int_array* $_new___int_array(int size);

#endif /* MJC_INT_ARRAY_H */
"#
    .to_string();

    let source = r#"#include "__int_array.h"
#include <stdlib.h>

__int_array* $_new___int_array(int size) {
    __int_array* array = malloc(sizeof(__int_array));
    array->length = size;
    array->data = calloc((size_t)size, sizeof(int));
    return array;
}
"#
    .to_string();

    (
        GeneratedFile {
            path: PathBuf::from("__int_array.h"),
            contents: header,
        },
        GeneratedFile {
            path: PathBuf::from("__int_array.c"),
            contents: source,
        },
    )
}

pub fn emit_main(main_class: &str) -> GeneratedFile {
    GeneratedFile {
        path: PathBuf::from("main.c"),
        contents: format!(
            "#include \"{}.h\"\n\nint main(void) {{\n    {}_main();\n    return 0;\n}}\n",
            main_class, main_class
        ),
    }
}

/// Globs `*.c`/`*.h` out of the output directory rather than listing every
/// emitted file by name, per spec.md §4.4 ("a build manifest... globbing
/// `*.c` and `*.h`") and §9's Design Notes.
pub fn emit_build_manifest(project_name: &str) -> GeneratedFile {
    let contents = format!(
        "cmake_minimum_required(VERSION 3.10)\nproject({} C)\n\nset(CMAKE_C_STANDARD 99)\nset(CMAKE_C_STANDARD_REQUIRED ON)\n\nfile(GLOB MJC_SOURCES CONFIGURE_DEPENDS \"*.c\")\nadd_executable({} ${{MJC_SOURCES}})\n",
        project_name, project_name
    );

    GeneratedFile {
        path: PathBuf::from("CMakeLists.txt"),
        contents,
    }
}
