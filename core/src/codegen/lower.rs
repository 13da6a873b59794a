//! Three-address-code-style statement and expression lowering, per
//! spec.md §4.4.
//!
//! Every statement lowers to zero or more flat C statement lines pushed
//! onto an output buffer; every expression lowers to either a small atom
//! (a literal, a bare identifier, or a parenthesized field/array access)
//! or a freshly introduced temporary (`$_t_N`) assigned just before the
//! atom is used, so nested operations never need to re-evaluate a
//! sub-expression. Control flow (`if`/`while`/`do`/`for`) lowers to
//! labels and `goto`, not nested C control structures, matching spec.md's
//! "goto-based control flow" design note.

use crate::ast::*;

use super::layout::{self, c_kind_type_name, c_type_name};

use std::collections::HashSet;

/// Lowers the bodies of one class's methods. Casts and call signatures are
/// already validated by semantic analysis (see [`crate::symbol::AnalysisContext`]);
/// this stage only needs the [`Project`] to resolve field/method ownership
/// across `extends` chains.
pub struct Lowerer<'a> {
    project: &'a Project,
    class_name: &'a str,
    locals: HashSet<String>,
    temp_counter: usize,
    label_counter: usize,
    /// `(continue_target, break_target)` for the innermost enclosing loop.
    loop_labels: Vec<(String, String)>,
}

impl<'a> Lowerer<'a> {
    pub fn new(project: &'a Project, class_name: &'a str) -> Self {
        Self {
            project,
            class_name,
            locals: HashSet::new(),
            temp_counter: 0,
            label_counter: 0,
            loop_labels: Vec::new(),
        }
    }

    fn fresh_temp(&mut self) -> String {
        let t = format!("$_t_{}", self.temp_counter);
        self.temp_counter += 1;
        t
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let l = format!("$_l_{}_{}", prefix, self.label_counter);
        self.label_counter += 1;
        l
    }

    /// Lowers one method body into its C statement lines (the contents of
    /// the generated function's `{ ... }`).
    pub fn lower_method(&mut self, method: &Method) -> Vec<String> {
        self.locals = collect_locals(&method.body, &method.params);
        let mut out = Vec::new();
        self.lower_stmt(&method.body, &mut out);
        out
    }

    fn lower_stmt(&mut self, node: &ASTNode, out: &mut Vec<String>) {
        match &node.kind {
            ASTNodeKind::CodeBlock(stmts) => {
                for stmt in stmts {
                    self.lower_stmt(stmt, out);
                }
            }
            ASTNodeKind::LocalVariableDecl(field) => {
                out.push(format!(
                    "{} {};",
                    c_kind_type_name(field.primitive_kind, &field.type_lexeme),
                    field.name
                ));
            }
            ASTNodeKind::Assignment { lhs, op, rhs } => {
                let rhs_atom = self.lower_expr(rhs, out);
                let lhs_text = self.lower_lvalue(lhs, out);
                let c_op = match op {
                    AssignOp::Assign => "=",
                    AssignOp::AddAssign => "+=",
                    AssignOp::SubAssign => "-=",
                    AssignOp::MulAssign => "*=",
                    AssignOp::DivAssign => "/=",
                    AssignOp::AndAssign => "&=",
                    AssignOp::OrAssign => "|=",
                    AssignOp::XorAssign => "^=",
                };
                out.push(format!("{} {} {};", lhs_text, c_op, rhs_atom));
            }
            ASTNodeKind::IfStatement {
                condition,
                then_body,
                else_body,
            } => {
                let cond_atom = self.lower_expr(condition, out);
                match else_body {
                    None => {
                        let end = self.fresh_label("if_end");
                        out.push(format!("if (!({})) goto {};", cond_atom, end));
                        self.lower_stmt(then_body, out);
                        out.push(format!("{}:;", end));
                    }
                    Some(else_body) => {
                        let else_label = self.fresh_label("if_else");
                        let end = self.fresh_label("if_end");
                        out.push(format!("if (!({})) goto {};", cond_atom, else_label));
                        self.lower_stmt(then_body, out);
                        out.push(format!("goto {};", end));
                        out.push(format!("{}:;", else_label));
                        self.lower_stmt(else_body, out);
                        out.push(format!("{}:;", end));
                    }
                }
            }
            ASTNodeKind::WhileStatement {
                condition,
                body,
                is_do_while,
            } => {
                let cond_label = self.fresh_label("while_cond");
                let end = self.fresh_label("while_end");
                self.loop_labels.push((cond_label.clone(), end.clone()));
                if *is_do_while {
                    let start = self.fresh_label("do_start");
                    out.push(format!("{}:;", start));
                    self.lower_stmt(body, out);
                    out.push(format!("{}:;", cond_label));
                    let cond_atom = self.lower_expr(condition, out);
                    out.push(format!("if ({}) goto {};", cond_atom, start));
                    out.push(format!("{}:;", end));
                } else {
                    out.push(format!("{}:;", cond_label));
                    let cond_atom = self.lower_expr(condition, out);
                    out.push(format!("if (!({})) goto {};", cond_atom, end));
                    self.lower_stmt(body, out);
                    out.push(format!("goto {};", cond_label));
                    out.push(format!("{}:;", end));
                }
                self.loop_labels.pop();
            }
            ASTNodeKind::ForStatement {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.lower_stmt(init, out);
                }
                let cond_label = self.fresh_label("for_cond");
                let update_label = self.fresh_label("for_update");
                let end = self.fresh_label("for_end");
                self.loop_labels
                    .push((update_label.clone(), end.clone()));
                out.push(format!("{}:;", cond_label));
                if let Some(condition) = condition {
                    let cond_atom = self.lower_expr(condition, out);
                    out.push(format!("if (!({})) goto {};", cond_atom, end));
                }
                if let Some(body) = body {
                    self.lower_stmt(body, out);
                }
                out.push(format!("{}:;", update_label));
                if let Some(update) = update {
                    self.lower_stmt(update, out);
                }
                out.push(format!("goto {};", cond_label));
                out.push(format!("{}:;", end));
                self.loop_labels.pop();
            }
            ASTNodeKind::ReturnStatement { operand } => match operand {
                None => out.push("return;".to_string()),
                Some(operand) => {
                    let atom = self.lower_expr(operand, out);
                    out.push(format!("return {};", atom));
                }
            },
            ASTNodeKind::BreakStatement => {
                let (_, brk) = self
                    .loop_labels
                    .last()
                    .expect("break outside a loop is rejected in semantic analysis")
                    .clone();
                out.push(format!("goto {};", brk));
            }
            ASTNodeKind::ContinueStatement => {
                let (cont, _) = self
                    .loop_labels
                    .last()
                    .expect("continue outside a loop is rejected in semantic analysis")
                    .clone();
                out.push(format!("goto {};", cont));
            }
            ASTNodeKind::Reference(chain) => {
                self.lower_chain(chain, out);
            }
            other => unreachable!("{:?} is not a statement-shaped node", other),
        }
    }

    /// Lowers the left-hand side of an assignment to a C lvalue
    /// expression, without the temp-hoisting `lower_expr` does for
    /// read contexts (there is nothing to hoist: an lvalue is always
    /// already a simple name or field/array access).
    fn lower_lvalue(&mut self, chain: &ReferenceChain, out: &mut Vec<String>) -> String {
        self.lower_chain(chain, out)
    }

    fn lower_expr(&mut self, node: &ASTNode, out: &mut Vec<String>) -> String {
        match &node.kind {
            ASTNodeKind::NumberLiteral(lexeme) => number_literal_to_c(lexeme),
            ASTNodeKind::BooleanLiteral(b) => {
                if *b {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            ASTNodeKind::NotExpression { op, operand } => {
                let atom = self.lower_expr(operand, out);
                let temp = self.fresh_temp();
                let ctype = c_type_name(&node.resolved_type);
                out.push(format!("{} {} = {}({});", ctype, temp, op, atom));
                temp
            }
            ASTNodeKind::CastExpression {
                target_type_lexeme,
                operand,
            } => {
                let atom = self.lower_expr(operand, out);
                let temp = self.fresh_temp();
                let ctype = c_type_name(target_type_lexeme);
                out.push(format!("{} {} = ({}){};", ctype, temp, ctype, atom));
                temp
            }
            ASTNodeKind::BinaryExpression { op, left, right } => {
                let l = self.lower_expr(left, out);
                let r = self.lower_expr(right, out);
                let temp = self.fresh_temp();
                let ctype = c_type_name(&node.resolved_type);
                if op == ">>>" {
                    out.push(format!(
                        "{} {} = (int)((unsigned int){} >> (unsigned int){});",
                        ctype, temp, l, r
                    ));
                } else {
                    out.push(format!("{} {} = {} {} {};", ctype, temp, l, op, r));
                }
                temp
            }
            ASTNodeKind::Reference(chain) => self.lower_chain(chain, out),
            other => unreachable!("{:?} is not an expression-shaped node", other),
        }
    }

    fn lower_chain(&mut self, chain: &ReferenceChain, out: &mut Vec<String>) -> String {
        let mut current_text = String::new();
        let mut current_type = String::new();

        let seed = &chain.parts[0];
        match seed.name.as_str() {
            "this" => {
                current_text = "super".to_string();
                current_type = seed.resolved_type.clone();
            }
            "new" => match &seed.payload {
                Some(ChainPayload::NewObject {
                    class_type: Some(class),
                    ..
                }) => {
                    current_text = format!("$_new_{}()", class);
                    current_type = class.clone();
                }
                Some(ChainPayload::NewObject {
                    array_size: Some(size),
                    ..
                }) => {
                    let atom = self.lower_expr(size, out);
                    current_text = format!("$_new___int_array({})", atom);
                    current_type = types::INT_ARRAY.to_string();
                }
                _ => unreachable!("'new' chain part always has a NewObject payload"),
            },
            "System" => {
                current_type = types::SYSTEM.to_string();
            }
            _ => match &seed.payload {
                Some(ChainPayload::MethodCall { args, .. }) => {
                    current_text = self.dispatch_call(
                        "super",
                        self.class_name,
                        &seed.name,
                        args,
                        out,
                        &seed.resolved_type,
                    );
                    current_type = seed.resolved_type.clone();
                }
                Some(ChainPayload::ArrayCall { index, .. }) => {
                    let base = self.local_or_field_text(&seed.name);
                    let idx = self.lower_expr(index, out);
                    current_text = format!("({})->data[{}]", base, idx);
                    current_type = types::INT.to_string();
                }
                None => {
                    current_text = self.local_or_field_text(&seed.name);
                    current_type = seed.resolved_type.clone();
                }
            },
        }

        for part in &chain.parts[1..] {
            if current_type == types::SYSTEM {
                current_type = "System.out".to_string();
                current_text = String::new();
                continue;
            }
            if current_type == "System.out" {
                if let Some(ChainPayload::MethodCall { args, .. }) = &part.payload {
                    self.lower_print_call(&part.name, args, out);
                }
                current_text = String::new();
                current_type = types::VOID.to_string();
                continue;
            }
            if current_type == types::INT_ARRAY && part.name == "length" && part.payload.is_none()
            {
                current_text = format!("({})->length", current_text);
                current_type = types::INT.to_string();
                continue;
            }
            match &part.payload {
                Some(ChainPayload::MethodCall { args, .. }) => {
                    let receiver = current_text.clone();
                    current_text = self.dispatch_call(
                        &receiver,
                        &current_type,
                        &part.name,
                        args,
                        out,
                        &part.resolved_type,
                    );
                    current_type = part.resolved_type.clone();
                }
                Some(ChainPayload::ArrayCall { index, .. }) => {
                    let (_, hops) = layout::field_owner(self.project, &current_type, &part.name);
                    let base = format!(
                        "({})->{}",
                        current_text,
                        layout::super_path(hops, &part.name)
                    );
                    let idx = self.lower_expr(index, out);
                    current_text = format!("({})->data[{}]", base, idx);
                    current_type = types::INT.to_string();
                }
                None => {
                    let (_, hops) = layout::field_owner(self.project, &current_type, &part.name);
                    current_text = format!(
                        "({})->{}",
                        current_text,
                        layout::super_path(hops, &part.name)
                    );
                    current_type = part.resolved_type.clone();
                }
            }
        }

        current_text
    }

    fn local_or_field_text(&self, name: &str) -> String {
        if self.locals.contains(name) {
            name.to_string()
        } else {
            let (_, hops) = layout::field_owner(self.project, self.class_name, name);
            format!("(super)->{}", layout::super_path(hops, name))
        }
    }

    /// `System.out.{print,println,printf}` rewrite per spec.md §4.4: only
    /// `println` (and `printf`) append the trailing `\n` — `print` doesn't.
    fn lower_print_call(&mut self, method_name: &str, args: &[ASTNode], out: &mut Vec<String>) {
        let newline = method_name != "print";
        if args.is_empty() {
            if newline {
                out.push("printf(\"\\n\");".to_string());
            }
            return;
        }
        let arg = &args[0];
        let atom = self.lower_expr(arg, out);
        if newline {
            out.push(format!("printf(\"%d\\n\", {});", atom));
        } else {
            out.push(format!("printf(\"%d\", {});", atom));
        }
    }

    /// Emits a call through the receiver's `$_function_<name>` slot: finds
    /// which ancestor's struct owns that slot and climbs `->super` hops to
    /// reach it, per spec.md §4.4/§6/§8.
    fn dispatch_call(
        &mut self,
        receiver_text: &str,
        receiver_type: &str,
        method_name: &str,
        args: &[ASTNode],
        out: &mut Vec<String>,
        resolved_type: &str,
    ) -> String {
        let slot = layout::visible_method_slots(self.project, receiver_type)
            .into_iter()
            .find(|s| s.name == method_name)
            .expect("method resolved by semantic analysis must have a slot");
        let hops = layout::hops_to_ancestor(self.project, receiver_type, &slot.field_owner);
        let field = format!(
            "({})->{}",
            receiver_text,
            layout::super_path(hops, &format!("$_function_{}", method_name))
        );

        let mut arg_atoms: Vec<String> = vec![receiver_text.to_string()];
        for arg in args {
            arg_atoms.push(self.lower_expr(arg, out));
        }
        let call_expr = format!("{}({})", field, arg_atoms.join(", "));

        if resolved_type == types::VOID {
            out.push(format!("{};", call_expr));
            String::new()
        } else {
            let temp = self.fresh_temp();
            let ctype = c_type_name(resolved_type);
            out.push(format!("{} {} = {};", ctype, temp, call_expr));
            temp
        }
    }
}

fn number_literal_to_c(lexeme: &str) -> String {
    if lexeme.starts_with("0b") || lexeme.starts_with("0B") {
        let value = u64::from_str_radix(&lexeme[2..], 2).unwrap_or(0);
        value.to_string()
    } else {
        lexeme.to_string()
    }
}

/// Walks a method body collecting every name bound directly in its (flat,
/// single-scope) method scope: parameters plus every `LocalVariableDecl`.
/// Mirrors the flat-scope design `semantic.rs` uses for method bodies.
fn collect_locals(body: &ASTNode, params: &[Field]) -> HashSet<String> {
    let mut locals: HashSet<String> = params.iter().map(|p| p.name.clone()).collect();
    collect_locals_in(body, &mut locals);
    locals
}

fn collect_locals_in(node: &ASTNode, locals: &mut HashSet<String>) {
    match &node.kind {
        ASTNodeKind::CodeBlock(stmts) => {
            for stmt in stmts {
                collect_locals_in(stmt, locals);
            }
        }
        ASTNodeKind::LocalVariableDecl(field) => {
            locals.insert(field.name.clone());
        }
        ASTNodeKind::IfStatement {
            then_body,
            else_body,
            ..
        } => {
            collect_locals_in(then_body, locals);
            if let Some(else_body) = else_body {
                collect_locals_in(else_body, locals);
            }
        }
        ASTNodeKind::WhileStatement { body, .. } => collect_locals_in(body, locals),
        ASTNodeKind::ForStatement {
            init, update, body, ..
        } => {
            if let Some(init) = init {
                collect_locals_in(init, locals);
            }
            if let Some(update) = update {
                collect_locals_in(update, locals);
            }
            if let Some(body) = body {
                collect_locals_in(body, locals);
            }
        }
        _ => {}
    }
}
