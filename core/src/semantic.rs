//! Two-phase semantic analysis, per spec.md §4.3.
//!
//! Phase 1 orders classes topologically (Kahn's algorithm over the
//! `extends` edges) and builds one chained [`SymbolTable`] per class, so
//! that resolving a member on a derived class transparently climbs into
//! its ancestors via [`SymbolTable::resolve`]. Phase 2 walks every method
//! body, attaching a `resolved_type` to each expression node and checking
//! every rule in this module's match arms.
//!
//! Diverging from the teacher's `CompileErrors`-accumulator style: every
//! error here aborts analysis immediately with a single [`SemanticError`],
//! matching spec.md's "all semantic errors abort analysis" (see
//! DESIGN.md).

use crate::ast::*;
use crate::error::SemanticError;
use crate::symbol::{AnalysisContext, SharedScope, Symbol, SymbolTable};
use std::cell::RefCell;
use std::rc::Rc;

const PRINT_METHODS: &[&str] = &["print", "println", "printf"];

pub fn analyze(project: &mut Project) -> Result<AnalysisContext, SemanticError> {
    log::debug!("analyze: {} classes", project.classes.len());
    let ctx = build_class_registry(project)?;
    check_unique_main(project)?;
    for class in &mut project.classes {
        analyze_class(class, &ctx)?;
    }
    log::debug!("analyze: all classes checked ok");
    Ok(ctx)
}

/// spec.md §3 calls `main` "the unique main method" — exactly one class in
/// the whole project may declare it.
fn check_unique_main(project: &Project) -> Result<(), SemanticError> {
    let mains: Vec<&Class> = project
        .classes
        .iter()
        .filter(|c| c.methods.iter().any(|m| m.is_main))
        .collect();
    match mains.len() {
        1 => Ok(()),
        0 => Err(SemanticError::new(
            "no class declares a main method; exactly one is required",
        )),
        _ => Err(SemanticError::at(
            format!(
                "multiple classes declare a main method: {}",
                mains
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            mains[1].location,
        )),
    }
}

// ---- Phase 1: class ordering and symbol table construction -----------

fn build_class_registry(project: &Project) -> Result<AnalysisContext, SemanticError> {
    let mut ctx = AnalysisContext::new();

    ctx.register(
        types::SYSTEM,
        None,
        Rc::new(RefCell::new(SymbolTable::class_scope(types::SYSTEM))),
    );
    let int_array_scope = Rc::new(RefCell::new(SymbolTable::class_scope(types::INT_ARRAY)));
    int_array_scope
        .borrow_mut()
        .define(Symbol::variable("length", types::INT));
    ctx.register(types::INT_ARRAY, None, int_array_scope);

    for class in &project.classes {
        if let Some(parent) = &class.extends {
            if !project.contains(parent) && parent != types::SYSTEM {
                return Err(SemanticError::at(
                    format!("Class {} not found", parent),
                    class.location,
                ));
            }
        }
    }

    let mut remaining: Vec<&Class> = project.classes.iter().collect();
    let mut progressed = true;
    while !remaining.is_empty() && progressed {
        progressed = false;
        let mut next_remaining = Vec::new();
        for class in remaining {
            let ready = match &class.extends {
                None => true,
                Some(parent) => ctx.contains(parent),
            };
            if ready {
                let scope = match &class.extends {
                    None => SymbolTable::class_scope(class.name.clone()),
                    Some(parent) => SymbolTable::class_scope_with_parent(
                        class.name.clone(),
                        ctx.get(parent).expect("parent was just confirmed ready"),
                    ),
                };
                let shared = Rc::new(RefCell::new(scope));
                define_members(class, &shared)?;
                log::trace!("registered class {} (extends {:?})", class.name, class.extends);
                ctx.register(class.name.clone(), class.extends.clone(), shared);
                progressed = true;
            } else {
                next_remaining.push(class);
            }
        }
        remaining = next_remaining;
    }

    if let Some(class) = remaining.first() {
        return Err(SemanticError::at(
            "Cyclic inheritance detected",
            class.location,
        ));
    }

    Ok(ctx)
}

fn define_members(class: &Class, shared: &SharedScope) -> Result<(), SemanticError> {
    let mut scope = shared.borrow_mut();
    for field in &class.fields {
        if !scope.define(Symbol::variable(&field.name, field.declared_type())) {
            return Err(SemanticError::at(
                format!("Field {} already exists in {}", field.name, class.name),
                field.location,
            ));
        }
    }
    for method in &class.methods {
        let params = method
            .params
            .iter()
            .map(|p| p.declared_type().to_string())
            .collect::<Vec<_>>();
        if let Some(existing) = scope.resolve(&method.name) {
            if existing.is_method
                && (existing.params != params || existing.return_type != method.return_type())
            {
                return Err(SemanticError::at(
                    format!(
                        "Method {} in {} has a signature incompatible with its override",
                        method.name, class.name
                    ),
                    method.location,
                ));
            }
        }
        if !scope.define(Symbol::method(&method.name, params, method.return_type())) {
            return Err(SemanticError::at(
                format!("Method {} already exists in {}", method.name, class.name),
                method.location,
            ));
        }
    }
    Ok(())
}

// ---- Phase 2: method body analysis ------------------------------------

fn analyze_class(class: &mut Class, ctx: &AnalysisContext) -> Result<(), SemanticError> {
    let class_scope = ctx.get(&class.name).expect("class registered in phase 1");
    for method in &mut class.methods {
        let scope: SharedScope = if method.is_main {
            Rc::new(RefCell::new(SymbolTable::method_scope(
                Rc::new(RefCell::new(SymbolTable::class_scope(types::SYSTEM))),
                types::VOID,
            )))
        } else {
            Rc::new(RefCell::new(SymbolTable::method_scope(
                class_scope.clone(),
                method.return_type().to_string(),
            )))
        };
        {
            let mut s = scope.borrow_mut();
            for param in &method.params {
                if !s.define(Symbol::variable(&param.name, param.declared_type())) {
                    return Err(SemanticError::at(
                        format!(
                            "Parameter {} already exists in {}",
                            param.name, method.name
                        ),
                        param.location,
                    ));
                }
            }
        }
        let current_class = if method.is_main {
            None
        } else {
            Some(class.name.as_str())
        };
        analyze_block(&mut method.body, &scope, ctx, current_class, false)?;

        if method.return_kind != PrimitiveKind::Void
            && method.body.resolved_type != types::RETURN_VOID
        {
            return Err(SemanticError::at(
                format!(
                    "Method {} is missing a return statement on some code path",
                    method.name
                ),
                method.location,
            ));
        }
    }
    Ok(())
}

fn analyze_block(
    node: &mut ASTNode,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
    in_loop: bool,
) -> Result<(), SemanticError> {
    let statements = match &mut node.kind {
        ASTNodeKind::CodeBlock(stmts) => stmts,
        _ => unreachable!("analyze_block called on a non-CodeBlock node"),
    };

    let mut returns = false;
    for (i, stmt) in statements.iter_mut().enumerate() {
        if returns {
            return Err(SemanticError::at(
                "Unreachable statement",
                stmt.location,
            ));
        }
        analyze_statement(stmt, scope, ctx, current_class, in_loop)?;
        let _ = i;
        if stmt.resolved_type == types::RETURN_VOID {
            returns = true;
        }
    }
    node.resolved_type = if returns {
        types::RETURN_VOID.to_string()
    } else {
        types::VOID.to_string()
    };
    Ok(())
}

fn analyze_statement(
    node: &mut ASTNode,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
    in_loop: bool,
) -> Result<(), SemanticError> {
    match &mut node.kind {
        ASTNodeKind::CodeBlock(_) => {
            analyze_block(node, scope, ctx, current_class, in_loop)?;
        }
        ASTNodeKind::LocalVariableDecl(field) => {
            if !scope
                .borrow_mut()
                .define(Symbol::variable(&field.name, field.declared_type()))
            {
                return Err(SemanticError::at(
                    format!("Variable {} is already declared", field.name),
                    field.location,
                ));
            }
            node.resolved_type = field.declared_type().to_string();
        }
        ASTNodeKind::Assignment { lhs, op, rhs } => {
            analyze_chain(lhs, scope, ctx, current_class)?;
            analyze_expr(rhs, scope, ctx, current_class)?;
            if lhs.is_array_length {
                return Err(SemanticError::at(
                    "Cannot assign to an array's length",
                    lhs.location,
                ));
            }
            let lhs_type = lhs.resolved_type.clone();
            let rhs_type = rhs.resolved_type.clone();
            check_assignment(&lhs_type, *op, &rhs_type, ctx, node.location)?;
            node.resolved_type = lhs_type;
        }
        ASTNodeKind::IfStatement {
            condition,
            then_body,
            else_body,
        } => {
            analyze_expr(condition, scope, ctx, current_class)?;
            require_type(&condition.resolved_type, types::BOOLEAN, condition.location)?;
            analyze_block(then_body, scope, ctx, current_class, in_loop)?;
            let mut else_returns = false;
            if let Some(else_body) = else_body {
                analyze_block(else_body, scope, ctx, current_class, in_loop)?;
                else_returns = else_body.resolved_type == types::RETURN_VOID;
            }
            node.resolved_type = if else_returns && then_body.resolved_type == types::RETURN_VOID
            {
                types::RETURN_VOID.to_string()
            } else {
                types::VOID.to_string()
            };
        }
        ASTNodeKind::WhileStatement {
            condition,
            body,
            ..
        } => {
            analyze_expr(condition, scope, ctx, current_class)?;
            require_type(&condition.resolved_type, types::BOOLEAN, condition.location)?;
            analyze_block(body, scope, ctx, current_class, true)?;
            node.resolved_type = types::VOID.to_string();
        }
        ASTNodeKind::ForStatement {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = init {
                analyze_block(init, scope, ctx, current_class, in_loop)?;
            }
            if let Some(condition) = condition {
                analyze_expr(condition, scope, ctx, current_class)?;
                require_type(&condition.resolved_type, types::BOOLEAN, condition.location)?;
            }
            if let Some(update) = update {
                analyze_block(update, scope, ctx, current_class, in_loop)?;
            }
            if let Some(body) = body {
                analyze_block(body, scope, ctx, current_class, true)?;
            }
            node.resolved_type = types::VOID.to_string();
        }
        ASTNodeKind::ReturnStatement { operand } => {
            let scope_return_type = scope.borrow().return_type.clone();
            match operand {
                None => {
                    if scope_return_type != types::VOID {
                        return Err(SemanticError::at(
                            "Non-void method must return a value",
                            node.location,
                        ));
                    }
                }
                Some(operand) => {
                    analyze_expr(operand, scope, ctx, current_class)?;
                    if scope_return_type == types::VOID {
                        return Err(SemanticError::at(
                            "Void method cannot return a value",
                            node.location,
                        ));
                    }
                    if !is_assignable(&operand.resolved_type, &scope_return_type, ctx) {
                        return Err(SemanticError::at(
                            format!(
                                "Cannot return a value of type {} from a method returning {}",
                                operand.resolved_type, scope_return_type
                            ),
                            node.location,
                        ));
                    }
                }
            }
            node.resolved_type = types::RETURN_VOID.to_string();
        }
        ASTNodeKind::BreakStatement => {
            if !in_loop {
                return Err(SemanticError::at(
                    "'break' used outside of a loop",
                    node.location,
                ));
            }
            node.resolved_type = types::VOID.to_string();
        }
        ASTNodeKind::ContinueStatement => {
            if !in_loop {
                return Err(SemanticError::at(
                    "'continue' used outside of a loop",
                    node.location,
                ));
            }
            node.resolved_type = types::VOID.to_string();
        }
        ASTNodeKind::Reference(_) => {
            analyze_expr(node, scope, ctx, current_class)?;
        }
        _ => unreachable!("not a statement-shaped node"),
    }
    Ok(())
}

fn analyze_expr(
    node: &mut ASTNode,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
) -> Result<(), SemanticError> {
    match &mut node.kind {
        ASTNodeKind::NumberLiteral(_) => node.resolved_type = types::INT.to_string(),
        ASTNodeKind::BooleanLiteral(_) => node.resolved_type = types::BOOLEAN.to_string(),
        ASTNodeKind::NotExpression { op, operand } => {
            analyze_expr(operand, scope, ctx, current_class)?;
            let expected = if op == "!" { types::BOOLEAN } else { types::INT };
            require_type(&operand.resolved_type, expected, operand.location)?;
            node.resolved_type = expected.to_string();
        }
        ASTNodeKind::CastExpression {
            target_type_lexeme,
            operand,
        } => {
            analyze_expr(operand, scope, ctx, current_class)?;
            let target = target_type_lexeme.clone();
            let is_known = matches!(target.as_str(), "int" | "boolean") || ctx.contains(&target);
            if !is_known {
                return Err(SemanticError::at(
                    format!("Unknown type '{}' in cast", target),
                    node.location,
                ));
            }
            let from = operand.resolved_type.clone();
            let ok = if matches!(target.as_str(), "int" | "boolean") {
                from == target
            } else {
                ctx.can_cast(&from, &target) || ctx.can_cast(&target, &from)
            };
            if !ok {
                return Err(SemanticError::at(
                    format!("Cannot cast {} to {}", from, target),
                    node.location,
                ));
            }
            node.resolved_type = target;
        }
        ASTNodeKind::BinaryExpression { op, left, right } => {
            analyze_expr(left, scope, ctx, current_class)?;
            analyze_expr(right, scope, ctx, current_class)?;
            node.resolved_type =
                check_binary(op, &left.resolved_type, &right.resolved_type, node.location)?;
        }
        ASTNodeKind::Reference(chain) => {
            analyze_chain(chain, scope, ctx, current_class)?;
            node.resolved_type = chain.resolved_type.clone();
        }
        _ => unreachable!("not an expression-shaped node"),
    }
    Ok(())
}

fn require_type(
    actual: &str,
    expected: &str,
    location: crate::error::Location,
) -> Result<(), SemanticError> {
    if actual != expected {
        return Err(SemanticError::at(
            format!("Expected type {}, found {}", expected, actual),
            location,
        ));
    }
    Ok(())
}

fn is_assignable(from: &str, to: &str, ctx: &AnalysisContext) -> bool {
    if from == to {
        return true;
    }
    ctx.can_cast(from, to)
}

fn check_assignment(
    lhs: &str,
    op: AssignOp,
    rhs: &str,
    ctx: &AnalysisContext,
    location: crate::error::Location,
) -> Result<(), SemanticError> {
    let ok = match op {
        AssignOp::Assign => is_assignable(rhs, lhs, ctx),
        _ if op.is_arithmetic_compound() => lhs == types::INT && rhs == types::INT,
        _ if op.is_bitwise_compound() => {
            (lhs == types::INT && rhs == types::INT)
                || (lhs == types::BOOLEAN && rhs == types::BOOLEAN)
        }
        _ => unreachable!(),
    };
    if !ok {
        return Err(SemanticError::at(
            format!("Cannot assign {} to {}", rhs, lhs),
            location,
        ));
    }
    Ok(())
}

fn check_binary(
    op: &str,
    left: &str,
    right: &str,
    location: crate::error::Location,
) -> Result<String, SemanticError> {
    let mismatch = || {
        SemanticError::at(
            format!(
                "Operator '{}' cannot be applied to {} and {}",
                op, left, right
            ),
            location,
        )
    };
    match op {
        "+" | "-" | "*" | "/" | "%" | ">>>" => {
            if left == types::INT && right == types::INT {
                Ok(types::INT.to_string())
            } else {
                Err(mismatch())
            }
        }
        "<" | "<=" | ">" | ">=" => {
            if left == types::INT && right == types::INT {
                Ok(types::BOOLEAN.to_string())
            } else {
                Err(mismatch())
            }
        }
        "&&" | "||" => {
            if left == types::BOOLEAN && right == types::BOOLEAN {
                Ok(types::BOOLEAN.to_string())
            } else {
                Err(mismatch())
            }
        }
        "&" | "|" | "^" => {
            if left == types::INT && right == types::INT {
                Ok(types::INT.to_string())
            } else if left == types::BOOLEAN && right == types::BOOLEAN {
                Ok(types::BOOLEAN.to_string())
            } else {
                Err(mismatch())
            }
        }
        "==" | "!=" => {
            if left == right || is_class_type(left) && is_class_type(right) {
                Ok(types::BOOLEAN.to_string())
            } else {
                Err(mismatch())
            }
        }
        _ => Err(mismatch()),
    }
}

fn is_class_type(name: &str) -> bool {
    !matches!(name, "int" | "int[]" | "boolean" | "void")
}

// ---- reference chain resolution ---------------------------------------

fn analyze_chain(
    chain: &mut ReferenceChain,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
) -> Result<(), SemanticError> {
    resolve_seed(&mut chain.parts[0], scope, ctx, current_class)?;

    for i in 1..chain.parts.len() {
        let prev_type = chain.parts[i - 1].resolved_type.clone();
        resolve_member(&mut chain.parts[i], &prev_type, scope, ctx)?;
        if prev_type == types::INT_ARRAY && chain.parts[i].name == "length" {
            chain.is_array_length = true;
        }
    }

    chain.resolved_type = chain.parts.last().unwrap().resolved_type.clone();
    Ok(())
}

fn resolve_seed(
    part: &mut ChainPart,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
) -> Result<(), SemanticError> {
    if part.name == "this" {
        let cls = scope
            .borrow()
            .enclosing_class_name()
            .ok_or_else(|| SemanticError::at("'this' used outside of an instance context", part.location))?;
        part.resolved_type = cls;
        return Ok(());
    }

    if part.name == "new" {
        match &mut part.payload {
            Some(ChainPayload::NewObject {
                class_type: Some(class),
                ..
            }) => {
                if !ctx.contains(class) {
                    return Err(SemanticError::at(
                        format!("Class {} not found", class),
                        part.location,
                    ));
                }
                part.resolved_type = class.clone();
            }
            Some(ChainPayload::NewObject {
                array_size: Some(size),
                ..
            }) => {
                analyze_expr(size, scope, ctx, current_class)?;
                require_type(&size.resolved_type, types::INT, size.location)?;
                part.resolved_type = types::INT_ARRAY.to_string();
            }
            _ => unreachable!("'new' chain part always carries a NewObject payload"),
        }
        return Ok(());
    }

    if part.name == types::SYSTEM {
        part.resolved_type = types::SYSTEM.to_string();
        return Ok(());
    }

    match &mut part.payload {
        Some(ChainPayload::MethodCall { args, caller_type }) => {
            let cls = current_class.ok_or_else(|| {
                SemanticError::at(
                    "Method call outside of an instance context",
                    part.location,
                )
            })?;
            *caller_type = cls.to_string();
            let class_scope = ctx.get(cls).expect("current class is registered");
            let sym = class_scope
                .borrow()
                .resolve(&part.name)
                .filter(|s| s.is_method)
                .ok_or_else(|| {
                    SemanticError::at(format!("Method {} not found", part.name), part.location)
                })?;
            check_args(args, &sym, scope, ctx, current_class, part.location)?;
            part.resolved_type = sym.return_type;
        }
        Some(ChainPayload::ArrayCall { index, caller_type }) => {
            let sym = scope
                .borrow()
                .resolve(&part.name)
                .filter(|s| !s.is_method)
                .ok_or_else(|| {
                    SemanticError::at(format!("Variable {} not found", part.name), part.location)
                })?;
            require_type(&sym.type_name, types::INT_ARRAY, part.location)?;
            *caller_type = sym.type_name;
            analyze_expr(index, scope, ctx, current_class)?;
            require_type(&index.resolved_type, types::INT, index.location)?;
            part.resolved_type = types::INT.to_string();
        }
        None => {
            let sym = scope.borrow().resolve(&part.name).ok_or_else(|| {
                SemanticError::at(format!("Variable {} not found", part.name), part.location)
            })?;
            if sym.is_method {
                return Err(SemanticError::at(
                    format!("{} is a method, not a variable", part.name),
                    part.location,
                ));
            }
            part.resolved_type = sym.type_name;
        }
    }
    Ok(())
}

fn resolve_member(
    part: &mut ChainPart,
    prev_type: &str,
    scope: &SharedScope,
    ctx: &AnalysisContext,
) -> Result<(), SemanticError> {
    if prev_type == types::SYSTEM {
        if part.name != "out" {
            return Err(SemanticError::at(
                format!("System has no member {}", part.name),
                part.location,
            ));
        }
        part.resolved_type = "System.out".to_string();
        return Ok(());
    }

    if prev_type == "System.out" {
        return match &mut part.payload {
            Some(ChainPayload::MethodCall { args, caller_type })
                if PRINT_METHODS.contains(&part.name.as_str()) =>
            {
                *caller_type = "System.out".to_string();
                for arg in args.iter_mut() {
                    analyze_expr(arg, scope, ctx, None)?;
                    if arg.resolved_type != types::INT {
                        return Err(SemanticError::at(
                            format!(
                                "System.out.{} cannot print a value of type {}",
                                part.name, arg.resolved_type
                            ),
                            arg.location,
                        ));
                    }
                }
                part.resolved_type = types::VOID.to_string();
                Ok(())
            }
            _ => Err(SemanticError::at(
                format!("System.out has no member {}", part.name),
                part.location,
            )),
        };
    }

    if matches!(prev_type, "int" | "boolean" | "void") {
        return Err(SemanticError::at(
            format!("Type {} has no members", prev_type),
            part.location,
        ));
    }

    let class_scope = ctx.get(prev_type).ok_or_else(|| {
        SemanticError::at(format!("Class {} not found", prev_type), part.location)
    })?;

    match &mut part.payload {
        Some(ChainPayload::MethodCall { args, caller_type }) => {
            *caller_type = prev_type.to_string();
            let sym = class_scope
                .borrow()
                .resolve(&part.name)
                .filter(|s| s.is_method)
                .ok_or_else(|| {
                    SemanticError::at(
                        format!("Method {} not found on {}", part.name, prev_type),
                        part.location,
                    )
                })?;
            check_args(args, &sym, scope, ctx, None, part.location)?;
            part.resolved_type = sym.return_type;
        }
        Some(ChainPayload::ArrayCall { index, caller_type }) => {
            let sym = class_scope
                .borrow()
                .resolve(&part.name)
                .filter(|s| !s.is_method)
                .ok_or_else(|| {
                    SemanticError::at(
                        format!("Field {} not found on {}", part.name, prev_type),
                        part.location,
                    )
                })?;
            require_type(&sym.type_name, types::INT_ARRAY, part.location)?;
            *caller_type = sym.type_name;
            analyze_expr(index, scope, ctx, None)?;
            require_type(&index.resolved_type, types::INT, index.location)?;
            part.resolved_type = types::INT.to_string();
        }
        None => {
            let sym = class_scope
                .borrow()
                .resolve(&part.name)
                .ok_or_else(|| {
                    SemanticError::at(
                        format!("Field {} not found on {}", part.name, prev_type),
                        part.location,
                    )
                })?;
            if sym.is_method {
                return Err(SemanticError::at(
                    format!("{} is a method, not a field", part.name),
                    part.location,
                ));
            }
            part.resolved_type = sym.type_name;
        }
    }
    Ok(())
}

fn check_args(
    args: &mut [ASTNode],
    sym: &Symbol,
    scope: &SharedScope,
    ctx: &AnalysisContext,
    current_class: Option<&str>,
    location: crate::error::Location,
) -> Result<(), SemanticError> {
    if args.len() != sym.params.len() {
        return Err(SemanticError::at(
            format!(
                "Method {} expects {} argument(s), found {}",
                sym.name,
                sym.params.len(),
                args.len()
            ),
            location,
        ));
    }
    for (arg, expected) in args.iter_mut().zip(&sym.params) {
        analyze_expr(arg, scope, ctx, current_class)?;
        if !is_assignable(&arg.resolved_type, expected, ctx) {
            return Err(SemanticError::at(
                format!(
                    "Argument of type {} is not assignable to parameter of type {}",
                    arg.resolved_type, expected
                ),
                arg.location,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn analyze_source(src: &str) -> Result<AnalysisContext, SemanticError> {
        let mut project = match Parser::parse_source(src) {
            Ok(p) => p,
            Err(e) => panic!("parse failed: {}", e),
        };
        analyze(&mut project)
    }

    #[test]
    fn analyzes_hello_world() {
        analyze_source(
            "class Main { public static void main() { System.out.println(1 + 2); } }",
        )
        .expect("should analyze cleanly");
    }

    #[test]
    fn rejects_cyclic_inheritance() {
        let err = analyze_source("class A extends B { } class B extends A { }")
            .expect_err("should reject cycle");
        assert!(err.0.message.contains("Cyclic"));
    }

    #[test]
    fn rejects_undefined_reference() {
        let err = analyze_source(
            "class M { public static void main() { int x; x = y; } }",
        )
        .expect_err("should reject undefined variable");
        assert!(err.0.message.contains("not found"));
    }

    #[test]
    fn rejects_assignment_to_array_length() {
        let err = analyze_source(
            "class M { public static void main() {
                int[] a; a = new int[3]; a.length = 5;
            } }",
        )
        .expect_err("should reject assigning to length");
        assert!(err.0.message.contains("length"));
    }

    #[test]
    fn rejects_break_outside_loop() {
        let err = analyze_source("class M { public static void main() { break; } }")
            .expect_err("should reject break outside loop");
        assert!(err.0.message.contains("break"));
    }

    #[test]
    fn rejects_missing_return() {
        let err = analyze_source(
            "class M { public int f() { } }
             class Main { public static void main() { } }",
        )
        .expect_err("should reject missing return");
        assert!(err.0.message.contains("return"));
    }

    #[test]
    fn allows_inherited_field_access() {
        analyze_source(
            "class A { int x; }
             class B extends A {
                public int getX() { return this.x; }
             }
             class Main { public static void main() { } }",
        )
        .expect("inherited field access should resolve");
    }

    #[test]
    fn rejects_incompatible_override() {
        let err = analyze_source(
            "class A { public int f() { return 0; } }
             class B extends A { public boolean f() { return true; } }
             class Main { public static void main() { } }",
        )
        .expect_err("should reject incompatible override");
        assert!(err.0.message.contains("incompatible"));
    }

    #[test]
    fn rejects_project_with_no_main_method() {
        let err = analyze_source("class M { int x; }").expect_err("should reject missing main");
        assert!(err.0.message.contains("main method"));
    }

    #[test]
    fn rejects_project_with_multiple_main_methods() {
        let err = analyze_source(
            "class Main { public static void main() { } }
             class OtherMain { public static void main() { } }",
        )
        .expect_err("should reject duplicate main");
        assert!(err.0.message.contains("multiple classes declare a main method"));
    }
}
