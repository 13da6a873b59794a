//! Object-model and type-lowering helpers shared by [`super::lower`] and
//! [`super::emit`].
//!
//! Every class struct embeds its parent as a field named `super` (spec.md
//! §4.4's "nested struct with embedded `super`"), so `&obj->super` is the
//! same address as `obj` and an upcast is free. Every non-main method a
//! class *introduces* (no ancestor already declares that name) gets its
//! own function-pointer field `$_function_<name>` on that class's struct;
//! an overriding subclass reuses the same slot rather than adding a
//! parallel field — its allocator just installs a different function
//! pointer into the ancestor's slot, reached by the same `->super.super…`
//! climb used for inherited data fields.

use crate::ast::{Class, PrimitiveKind, Project};
use std::collections::HashMap;

/// Lowers a MiniJava type name (as stored in `resolved_type`/`type_lexeme`)
/// to its C spelling.
pub fn c_type_name(type_name: &str) -> String {
    match type_name {
        "int" => "int".to_string(),
        "boolean" => "bool".to_string(),
        "int[]" => "__int_array*".to_string(),
        "void" => "void".to_string(),
        class => format!("struct {}*", class),
    }
}

pub fn c_kind_type_name(kind: PrimitiveKind, lexeme: &str) -> String {
    match kind {
        PrimitiveKind::Class => c_type_name(lexeme),
        other => c_type_name(other.type_name()),
    }
}

/// The number of `->super` hops from `from` up to `ancestor`, which must
/// actually be an ancestor of (or equal to) `from`.
pub fn hops_to_ancestor(project: &Project, from: &str, ancestor: &str) -> usize {
    let mut hops = 0;
    let mut current = from;
    while current != ancestor {
        let class = project.class(current).expect("class exists");
        match &class.extends {
            Some(parent) => {
                hops += 1;
                current = parent;
            }
            None => panic!("{} is not an ancestor of {}", ancestor, from),
        }
    }
    hops
}

/// `obj-><"super.".repeat(hops)><field>`, the super-hop access spec.md
/// describes for reaching an inherited struct member.
pub fn super_path(hops: usize, field: &str) -> String {
    let mut path = String::new();
    for _ in 0..hops {
        path.push_str("super.");
    }
    path.push_str(field);
    path
}

/// Finds the nearest class (starting at `from` and walking up) that
/// declares a field named `name`, and how many `->super` hops separate
/// `from` from it. Mirrors [`crate::symbol::SymbolTable::resolve`]'s
/// nearest-scope-wins rule.
pub fn field_owner(project: &Project, from: &str, name: &str) -> (String, usize) {
    let mut hops = 0;
    let mut current = from;
    loop {
        let class = project.class(current).expect("class exists");
        if class.field(name).is_some() {
            return (class.name.clone(), hops);
        }
        match &class.extends {
            Some(parent) => {
                hops += 1;
                current = parent;
            }
            None => panic!("field {} not found above {}", name, from),
        }
    }
}

/// `true` if `class_name` is the class whose struct literally declares the
/// `$_function_<method_name>` slot — i.e. no ancestor of `class_name`
/// already declares a method of that name. An overriding class answers
/// `false`: it reuses the ancestor's slot instead of adding its own field.
pub fn declares_own_slot(project: &Project, class_name: &str, method_name: &str) -> bool {
    let class = project.class(class_name).expect("class exists");
    match &class.extends {
        None => true,
        Some(parent) => !ancestor_declares(project, parent, method_name),
    }
}

fn ancestor_declares(project: &Project, from: &str, method_name: &str) -> bool {
    let mut current = from;
    loop {
        let class = project.class(current).expect("class exists");
        if class.method(method_name).is_some() {
            return true;
        }
        match &class.extends {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// One method name visible from `class_name` (declared by `class_name`
/// itself or any ancestor).
pub struct MethodSlot {
    pub name: String,
    pub return_type: String,
    pub param_types: Vec<String>,
    /// The class whose struct physically holds the `$_function_<name>`
    /// field — the topmost ancestor (closest to the hierarchy's root)
    /// that first declares this method name.
    pub field_owner: String,
    /// The class whose `<Class>_<name>` function should be installed into
    /// that slot — the nearest declaration from `class_name` upward,
    /// i.e. the actual override winner.
    pub impl_owner: String,
}

/// Every method name visible from `class_name`, in first-declared order
/// (walking the hierarchy root-to-`class_name`), together with which
/// class's struct owns its slot and which class's implementation should be
/// installed there. `$_new_<class_name>`'s allocator uses this to populate
/// every function-pointer field the object's struct transitively embeds.
pub fn visible_method_slots(project: &Project, class_name: &str) -> Vec<MethodSlot> {
    let mut chain = Vec::new();
    let mut current = class_name;
    loop {
        chain.push(current.to_string());
        let class = project.class(current).expect("class exists");
        match &class.extends {
            Some(parent) => current = parent,
            None => break,
        }
    }
    chain.reverse();

    let mut order: Vec<String> = Vec::new();
    let mut slots: HashMap<String, MethodSlot> = HashMap::new();
    for cname in &chain {
        let class = project.class(cname).expect("class exists");
        for method in &class.methods {
            if method.is_main {
                continue;
            }
            if let Some(slot) = slots.get_mut(&method.name) {
                slot.impl_owner = cname.clone();
            } else {
                order.push(method.name.clone());
                slots.insert(
                    method.name.clone(),
                    MethodSlot {
                        name: method.name.clone(),
                        return_type: c_kind_type_name(method.return_kind, &method.return_lexeme),
                        param_types: method
                            .params
                            .iter()
                            .map(|p| c_kind_type_name(p.primitive_kind, &p.type_lexeme))
                            .collect(),
                        field_owner: cname.clone(),
                        impl_owner: cname.clone(),
                    },
                );
            }
        }
    }
    order
        .into_iter()
        .map(|name| slots.remove(&name).expect("just inserted"))
        .collect()
}
