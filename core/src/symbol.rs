//! Lexically scoped symbol tables and the process-wide class registry
//! described in spec.md §3/§4.3/§5.
//!
//! Class-scope tables are shared (a derived class's method scope needs to
//! walk up through its parent's table, and the registry needs to hand the
//! same table out repeatedly during lookups), so they live behind
//! `Rc<RefCell<_>>`. Method scopes are not shared — each is built fresh for
//! one method body and discarded after analysis of that body finishes — so
//! they're plain owned values that merely hold an `Rc` to their enclosing
//! class scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A name bound in some scope: a field, a parameter, a local variable, or a
/// method. `params`/`return_type` are meaningful only when `is_method`.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub type_name: String,
    pub is_method: bool,
    pub params: Vec<String>,
    pub return_type: String,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_method: false,
            params: Vec::new(),
            return_type: String::new(),
        }
    }

    pub fn method(
        name: impl Into<String>,
        params: Vec<String>,
        return_type: impl Into<String>,
    ) -> Self {
        let return_type = return_type.into();
        Self {
            name: name.into(),
            type_name: return_type.clone(),
            is_method: true,
            params,
            return_type,
        }
    }
}

/// A shared handle to a class-scope symbol table, as stored in the
/// [`AnalysisContext`] registry and referenced as the parent of every
/// method scope within that class.
pub type SharedScope = Rc<RefCell<SymbolTable>>;

/// A lexical scope: class scope, method scope, or a built-in scope (the
/// `System`/`int[]` pseudo-classes registered in Phase 1).
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    parent: Option<SharedScope>,
    /// Non-empty only for a class-scope table; the class's own name.
    pub class_name: String,
    /// Non-empty only for a method-scope table; the enclosing method's
    /// declared return type.
    pub return_type: String,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_scope(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn class_scope_with_parent(
        class_name: impl Into<String>,
        parent: SharedScope,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn method_scope(
        parent: SharedScope,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            parent: Some(parent),
            return_type: return_type.into(),
            ..Self::default()
        }
    }

    /// Registers a symbol in this scope only. Returns `false` (and leaves
    /// the existing binding untouched) if the name already exists in this
    /// exact scope — callers turn that into a duplicate-declaration error.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(&symbol.name) {
            return false;
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// True if a symbol with this name is declared directly in this scope
    /// (not an ancestor).
    pub fn contains_local(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Resolves a name by walking this scope and its ancestors. Clones the
    /// symbol out since the parent chain is shared via `Rc<RefCell<_>>`.
    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        if let Some(sym) = self.symbols.get(name) {
            return Some(sym.clone());
        }
        self.parent.as_ref()?.borrow().resolve(name)
    }

    /// Walks up the parent chain to find the nearest scope with a
    /// non-empty `class_name` — used to resolve `this` and to know which
    /// class a method scope belongs to.
    pub fn enclosing_class_name(&self) -> Option<String> {
        if !self.class_name.is_empty() {
            return Some(self.class_name.clone());
        }
        self.parent
            .as_ref()
            .and_then(|p| p.borrow().enclosing_class_name())
    }
}

/// The process-wide (really: per-compile) registry of class-scope symbol
/// tables, populated by semantic analysis Phase 1 in topological order and
/// read-only thereafter. spec.md's Design Notes call for this to be an
/// explicit, owned context rather than a module-level global; this is that
/// context.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    tables: HashMap<String, SharedScope>,
    /// Each class's immediate `extends` target, recorded alongside its
    /// scope table so `can_cast` doesn't need to walk `Rc` parent chains.
    extends: HashMap<String, String>,
    topo_order: Vec<String>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class's scope table. Called once per class (plus once
    /// each for the built-in `System` and `int[]` pseudo-classes) in
    /// topological order. `extends` is the class's immediate parent, if
    /// any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        extends: Option<String>,
        table: SharedScope,
    ) {
        let name = name.into();
        self.topo_order.push(name.clone());
        if let Some(parent) = extends {
            self.extends.insert(name.clone(), parent);
        }
        self.tables.insert(name, table);
    }

    pub fn get(&self, name: &str) -> Option<SharedScope> {
        self.tables.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// The order classes were registered in — ancestors before
    /// descendants, built-ins first.
    pub fn topo_order(&self) -> &[String] {
        &self.topo_order
    }

    /// The immediate `extends` target of `name`, if any.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.extends.get(name).map(String::as_str)
    }

    /// Walks the `extends` chain of `from`, returning `true` if `to`
    /// appears anywhere in it (including `from` itself). Primitive types
    /// are handled by the caller — this only ever sees class names.
    pub fn can_cast(&self, from: &str, to: &str) -> bool {
        let mut current = from;
        loop {
            if current == to {
                return true;
            }
            match self.parent_of(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_walks_parent_chain() {
        let parent = Rc::new(RefCell::new(SymbolTable::class_scope("A")));
        parent
            .borrow_mut()
            .define(Symbol::variable("x", "int"));
        let mut child = SymbolTable::method_scope(parent, "void");
        child.define(Symbol::variable("y", "boolean"));

        assert_eq!(child.resolve("y").unwrap().type_name, "boolean");
        assert_eq!(child.resolve("x").unwrap().type_name, "int");
        assert!(child.resolve("z").is_none());
    }

    #[test]
    fn define_rejects_local_duplicate() {
        let mut scope = SymbolTable::class_scope("A");
        assert!(scope.define(Symbol::variable("x", "int")));
        assert!(!scope.define(Symbol::variable("x", "boolean")));
    }

    #[test]
    fn enclosing_class_name_walks_up_from_method_scope() {
        let class = Rc::new(RefCell::new(SymbolTable::class_scope("Foo")));
        let method = SymbolTable::method_scope(class, "int");
        assert_eq!(method.enclosing_class_name().as_deref(), Some("Foo"));
    }

    #[test]
    fn can_cast_walks_extends_chain() {
        let mut ctx = AnalysisContext::new();
        let a = Rc::new(RefCell::new(SymbolTable::class_scope("A")));
        ctx.register("A", None, a.clone());
        let b = Rc::new(RefCell::new(SymbolTable::class_scope_with_parent(
            "B", a,
        )));
        ctx.register("B", Some("A".to_string()), b.clone());
        let c = Rc::new(RefCell::new(SymbolTable::class_scope_with_parent(
            "C", b,
        )));
        ctx.register("C", Some("B".to_string()), c);

        assert!(ctx.can_cast("C", "A"));
        assert!(ctx.can_cast("C", "C"));
        assert!(!ctx.can_cast("A", "C"));
    }
}
