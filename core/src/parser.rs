//! Recursive-descent parser with precedence climbing, per spec.md §4.2.
//!
//! The parser consumes a flat [`Token`] vector (produced by
//! [`crate::lexer::tokenize`]) through the [`TokenStream`] adapter and
//! builds a [`Project`]. Every syntactic error aborts parsing immediately
//! with a [`ParseError`] naming the offending token.

use crate::ast::*;
use crate::error::{Location, ParseError};
use crate::token::{Token, TokenKind, TokenStream};

/// Binary operators recognized at each precedence tier, lowest first. Used
/// both by the precedence-climbing expression parser and by the
/// cast-vs-parenthesized-expression heuristic in [`Parser::parse_primary`].
fn binary_precedence(lexeme: &str) -> Option<u8> {
    Some(match lexeme {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | "<=" | ">" | ">=" => 7,
        "+" | "-" => 8,
        // spec.md's precedence table has no row for `>>>` even though the
        // generator lowers it as a BinaryExpression (§4.4). It's placed
        // here, between additive and multiplicative, as the most
        // conventional slot for a shift operator; see DESIGN.md.
        ">>>" => 9,
        "*" | "/" | "%" => 10,
        _ => return None,
    })
}

fn is_binary_operator_lexeme(lexeme: &str) -> bool {
    binary_precedence(lexeme).is_some()
}

pub struct Parser {
    tokens: TokenStream,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
        }
    }

    /// The parser's public entry point: consumes a complete token vector
    /// and returns the parsed [`Project`] or the first syntactic error.
    pub fn parse(tokens: Vec<Token>) -> Result<Project, ParseError> {
        Self::new(tokens).parse_project()
    }

    /// Convenience entry point: lex and parse in one call.
    pub fn parse_source(source: &str) -> Result<Project, crate::error::CompileError> {
        let tokens = crate::lexer::tokenize(source)?;
        Ok(Self::parse(tokens)?)
    }

    // ---- token helpers ----------------------------------------------

    fn loc(&self) -> Location {
        self.tokens
            .peek()
            .map(Token::location)
            .unwrap_or(Location { line: 0, column: 0 })
    }

    fn peek_lexeme(&self) -> Option<&str> {
        self.tokens.peek().map(|t| t.lexeme.as_str())
    }

    fn eof_error(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("Unexpected end of input, expected {}", what),
            self.loc(),
        )
    }

    fn unexpected(&self, token: &Token, what: &str) -> ParseError {
        ParseError::new(
            format!(
                "Expected {}, found '{}' at line {}",
                what, token.lexeme, token.line
            ),
            token.location(),
        )
    }

    /// Consumes the next token, requiring its lexeme to match exactly.
    fn expect(&mut self, lexeme: &str) -> Result<Token, ParseError> {
        let loc = self.loc();
        let tok = self
            .tokens
            .read()
            .cloned()
            .ok_or_else(|| self.eof_error(&format!("'{}'", lexeme)))?;
        if tok.lexeme != lexeme {
            return Err(ParseError::new(
                format!(
                    "Expected '{}', found '{}'",
                    lexeme, tok.lexeme
                ),
                loc,
            ));
        }
        Ok(tok)
    }

    fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        let loc = self.loc();
        let tok = self
            .tokens
            .read()
            .cloned()
            .ok_or_else(|| self.eof_error("an identifier"))?;
        if tok.kind != TokenKind::Identifier {
            return Err(self.unexpected(&tok, "an identifier"));
        }
        Ok(tok)
    }

    // ---- top level -----------------------------------------------------

    /// Consumes class declarations until `read_until("class")` fails, per
    /// spec.md §4.2.
    pub fn parse_project(&mut self) -> Result<Project, ParseError> {
        log::debug!("parse_project: starting");
        let mut project = Project::new();
        while self.tokens.read_until("class").is_some() {
            let class = self.parse_class()?;
            if !project.push(class.clone()) {
                return Err(ParseError::new(
                    format!("Duplicate class '{}'", class.name),
                    class.location,
                ));
            }
        }
        log::debug!("parse_project: parsed {} classes", project.classes.len());
        Ok(project)
    }

    fn parse_class(&mut self) -> Result<Class, ParseError> {
        let location = self.loc();
        let name = self.expect_identifier()?.lexeme;

        let extends = if self.peek_lexeme() == Some("extends") {
            self.tokens.read();
            let target = self.expect_identifier()?;
            if target.lexeme == name {
                return Err(ParseError::new(
                    format!("Class '{}' cannot extend itself", name),
                    target.location(),
                ));
            }
            Some(target.lexeme)
        } else {
            None
        };

        self.expect("{")?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while self.peek_lexeme() != Some("}") {
            match self.parse_member()? {
                Member::Field(f) => {
                    if fields.iter().any(|existing: &Field| existing.name == f.name)
                        || methods.iter().any(|m: &Method| m.name == f.name)
                    {
                        return Err(ParseError::new(
                            format!(
                                "Field {} already exists in {}",
                                f.name, name
                            ),
                            f.location,
                        ));
                    }
                    fields.push(f);
                }
                Member::Method(m) => {
                    if methods.iter().any(|existing: &Method| existing.name == m.name)
                    {
                        return Err(ParseError::new(
                            format!(
                                "Method {} already exists in {}",
                                m.name, name
                            ),
                            m.location,
                        ));
                    }
                    methods.push(m);
                }
            }
        }
        self.expect("}")?;

        Ok(Class::new(name, extends, fields, methods, location))
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let location = self.loc();
        let mut is_public = false;
        let mut is_static = false;
        loop {
            match self.peek_lexeme() {
                Some("public") => {
                    self.tokens.read();
                    is_public = true;
                }
                Some("static") => {
                    self.tokens.read();
                    is_static = true;
                }
                _ => break,
            }
        }
        let _ = is_public; // visibility isn't otherwise modeled; MiniJava has no `private`.

        let (kind, lexeme) = self.parse_type(true)?;
        let name = self.expect_identifier()?.lexeme;

        match self.peek_lexeme() {
            Some("(") => {
                let is_main = name == "main";
                if is_static && !is_main {
                    return Err(ParseError::new(
                        "Only 'main' can be declared static",
                        location,
                    ));
                }
                if is_main && !is_static {
                    return Err(ParseError::new(
                        "'main' must be declared static",
                        location,
                    ));
                }
                if is_main && kind != PrimitiveKind::Void {
                    return Err(ParseError::new(
                        "'main' must return void",
                        location,
                    ));
                }
                let params = self.parse_params()?;
                self.expect("{")?;
                let body_loc = self.loc();
                let statements = self.parse_statements_until("}")?;
                self.expect("}")?;
                for p in &params {
                    if params.iter().filter(|q| q.name == p.name).count() > 1 {
                        return Err(ParseError::new(
                            format!(
                                "Parameter {} already exists in {}",
                                p.name, name
                            ),
                            p.location,
                        ));
                    }
                }
                Ok(Member::Method(Method {
                    return_kind: kind,
                    return_lexeme: lexeme,
                    name,
                    params,
                    body: ASTNode::new(ASTNodeKind::CodeBlock(statements), body_loc),
                    is_main,
                    location,
                }))
            }
            Some(";") => {
                if is_static {
                    return Err(ParseError::new(
                        format!("Field {} cannot be declared static", name),
                        location,
                    ));
                }
                if kind == PrimitiveKind::Void {
                    return Err(ParseError::new(
                        "Fields cannot have type void",
                        location,
                    ));
                }
                self.tokens.read();
                Ok(Member::Field(Field {
                    primitive_kind: kind,
                    type_lexeme: lexeme,
                    name,
                    location,
                }))
            }
            _ => {
                let tok = self.tokens.peek().cloned();
                Err(match tok {
                    Some(t) => self.unexpected(&t, "'(' or ';'"),
                    None => self.eof_error("'(' or ';'"),
                })
            }
        }
    }

    fn parse_params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect("(")?;
        let mut params = Vec::new();
        if self.peek_lexeme() != Some(")") {
            loop {
                let location = self.loc();
                let (kind, lexeme) = self.parse_type(false)?;
                let name = self.expect_identifier()?.lexeme;
                params.push(Field {
                    primitive_kind: kind,
                    type_lexeme: lexeme,
                    name,
                    location,
                });
                if self.peek_lexeme() == Some(",") {
                    self.tokens.read();
                } else {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    /// Parses a type name: `int`, `int[]`, `boolean`, `void` (only when
    /// `allow_void` is set, i.e. at a method-return position), or a class
    /// identifier.
    fn parse_type(&mut self, allow_void: bool) -> Result<(PrimitiveKind, String), ParseError> {
        let tok = self
            .tokens
            .read()
            .cloned()
            .ok_or_else(|| self.eof_error("a type"))?;
        match tok.lexeme.as_str() {
            "int" => {
                if self.peek_lexeme() == Some("[") {
                    self.tokens.read();
                    self.expect("]")?;
                    Ok((PrimitiveKind::IntArray, "int[]".to_string()))
                } else {
                    Ok((PrimitiveKind::Int, "int".to_string()))
                }
            }
            "boolean" => Ok((PrimitiveKind::Boolean, "boolean".to_string())),
            "void" if allow_void => Ok((PrimitiveKind::Void, "void".to_string())),
            _ if tok.kind == TokenKind::Identifier => {
                Ok((PrimitiveKind::Class, tok.lexeme))
            }
            _ => Err(self.unexpected(&tok, "a type")),
        }
    }

    /// Speculatively attempts to parse `TYPE IDENT` as the head of a local
    /// variable declaration. Restores the cursor and returns `None` if the
    /// lookahead doesn't match, per the one-token-lookahead rule in
    /// spec.md §4.2.
    fn try_parse_local_decl_head(&mut self) -> Option<(PrimitiveKind, String, Token)> {
        self.tokens.save();
        let result = (|| -> Option<(PrimitiveKind, String, Token)> {
            let (kind, lexeme) = self.parse_type(false).ok()?;
            if self.tokens.peek()?.kind != TokenKind::Identifier {
                return None;
            }
            let name = self.tokens.read()?.clone();
            Some((kind, lexeme, name))
        })();
        match result {
            Some(v) => {
                self.tokens.commit();
                Some(v)
            }
            None => {
                self.tokens.restore();
                None
            }
        }
    }

    // ---- statements ------------------------------------------------

    fn parse_statements_until(&mut self, end_lexeme: &str) -> Result<Vec<ASTNode>, ParseError> {
        let mut statements = Vec::new();
        let mut terminated = false;
        while self.peek_lexeme() != Some(end_lexeme) {
            if self.tokens.peek().is_none() {
                return Err(self.eof_error(&format!("'{}'", end_lexeme)));
            }
            if terminated {
                return Err(ParseError::new(
                    "Unreachable statement",
                    self.loc(),
                ));
            }
            let stmts = self.parse_statement()?;
            if stmts.iter().any(is_terminal_statement) {
                terminated = true;
            }
            statements.extend(stmts);
        }
        Ok(statements)
    }

    fn parse_block(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.expect("{")?;
        let statements = self.parse_statements_until("}")?;
        self.expect("}")?;
        Ok(ASTNode::new(ASTNodeKind::CodeBlock(statements), location))
    }

    /// Parses a single control-flow arm, always producing a `CodeBlock`
    /// node — either the braced block itself, or a single statement
    /// wrapped in one, per spec.md §4.2.
    fn parse_stmt_or_block(&mut self) -> Result<ASTNode, ParseError> {
        if self.peek_lexeme() == Some("{") {
            self.parse_block()
        } else {
            let location = self.loc();
            let statements = self.parse_statement()?;
            Ok(ASTNode::new(ASTNodeKind::CodeBlock(statements), location))
        }
    }

    fn parse_statement(&mut self) -> Result<Vec<ASTNode>, ParseError> {
        match self.peek_lexeme() {
            Some("{") => Ok(vec![self.parse_block()?]),
            Some("if") => Ok(vec![self.parse_if()?]),
            Some("while") => Ok(vec![self.parse_while()?]),
            Some("do") => Ok(vec![self.parse_do_while()?]),
            Some("for") => Ok(vec![self.parse_for()?]),
            Some("return") => Ok(vec![self.parse_return()?]),
            Some("break") => {
                let location = self.loc();
                self.tokens.read();
                self.expect(";")?;
                Ok(vec![ASTNode::new(ASTNodeKind::BreakStatement, location)])
            }
            Some("continue") => {
                let location = self.loc();
                self.tokens.read();
                self.expect(";")?;
                Ok(vec![ASTNode::new(ASTNodeKind::ContinueStatement, location)])
            }
            _ => {
                if let Some((kind, lexeme, name)) = self.try_parse_local_decl_head() {
                    let nodes = self.finish_local_decl(kind, lexeme, name)?;
                    self.expect(";")?;
                    Ok(nodes)
                } else {
                    let node = self.parse_simple_expr_stmt()?;
                    self.expect(";")?;
                    Ok(vec![node])
                }
            }
        }
    }

    fn finish_local_decl(
        &mut self,
        kind: PrimitiveKind,
        lexeme: String,
        name: Token,
    ) -> Result<Vec<ASTNode>, ParseError> {
        let location = name.location();
        let field = Field {
            primitive_kind: kind,
            type_lexeme: lexeme,
            name: name.lexeme.clone(),
            location,
        };
        let mut nodes = vec![ASTNode::new(
            ASTNodeKind::LocalVariableDecl(field),
            location,
        )];
        if let Some(op) = self.peek_lexeme().and_then(AssignOp::from_lexeme) {
            self.tokens.read();
            let rhs = self.parse_expression()?;
            let chain = ReferenceChain::new(
                vec![ChainPart::new(name.lexeme, location)],
                location,
            );
            nodes.push(ASTNode::new(
                ASTNodeKind::Assignment {
                    lhs: chain,
                    op,
                    rhs: Box::new(rhs),
                },
                location,
            ));
        }
        Ok(nodes)
    }

    fn parse_if(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.read(); // 'if'
        self.expect("(")?;
        let condition = self.parse_expression()?;
        self.expect(")")?;
        let then_body = self.parse_stmt_or_block()?;
        let else_body = if self.peek_lexeme() == Some("else") {
            self.tokens.read();
            Some(Box::new(self.parse_stmt_or_block()?))
        } else {
            None
        };
        Ok(ASTNode::new(
            ASTNodeKind::IfStatement {
                condition: Box::new(condition),
                then_body: Box::new(then_body),
                else_body,
            },
            location,
        ))
    }

    fn parse_while(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.read(); // 'while'
        self.expect("(")?;
        let condition = self.parse_expression()?;
        self.expect(")")?;
        let body = self.parse_stmt_or_block()?;
        Ok(ASTNode::new(
            ASTNodeKind::WhileStatement {
                condition: Box::new(condition),
                body: Box::new(body),
                is_do_while: false,
            },
            location,
        ))
    }

    fn parse_do_while(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.read(); // 'do'
        let body = self.parse_stmt_or_block()?;
        self.expect("while")?;
        self.expect("(")?;
        let condition = self.parse_expression()?;
        self.expect(")")?;
        self.expect(";")?;
        Ok(ASTNode::new(
            ASTNodeKind::WhileStatement {
                condition: Box::new(condition),
                body: Box::new(body),
                is_do_while: true,
            },
            location,
        ))
    }

    fn parse_for(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.read(); // 'for'
        self.expect("(")?;

        let init = if self.peek_lexeme() == Some(";") {
            None
        } else {
            let init_loc = self.loc();
            let nodes = if let Some((kind, lexeme, name)) = self.try_parse_local_decl_head() {
                self.finish_local_decl(kind, lexeme, name)?
            } else {
                vec![self.parse_simple_expr_stmt()?]
            };
            Some(Box::new(ASTNode::new(
                ASTNodeKind::CodeBlock(nodes),
                init_loc,
            )))
        };
        self.expect(";")?;

        let condition = if self.peek_lexeme() == Some(";") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(";")?;

        let update = if self.peek_lexeme() == Some(")") {
            None
        } else {
            let update_loc = self.loc();
            let node = self.parse_simple_expr_stmt()?;
            Some(Box::new(ASTNode::new(
                ASTNodeKind::CodeBlock(vec![node]),
                update_loc,
            )))
        };
        self.expect(")")?;

        let body = self.parse_stmt_or_block()?;

        Ok(ASTNode::new(
            ASTNodeKind::ForStatement {
                init,
                condition,
                update,
                body: Some(Box::new(body)),
            },
            location,
        ))
    }

    fn parse_return(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.read(); // 'return'
        let operand = if self.peek_lexeme() == Some(";") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(";")?;
        Ok(ASTNode::new(
            ASTNodeKind::ReturnStatement { operand },
            location,
        ))
    }

    /// Parses a reference chain optionally followed by an assignment
    /// operator or unary `++`/`--`, without consuming a trailing `;` —
    /// shared by statement-level expression statements and `for`-loop
    /// init/update clauses.
    fn parse_simple_expr_stmt(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        let chain = self.parse_reference_chain()?;

        if let Some(op) = self.peek_lexeme().and_then(AssignOp::from_lexeme) {
            self.tokens.read();
            let rhs = self.parse_expression()?;
            return Ok(ASTNode::new(
                ASTNodeKind::Assignment {
                    lhs: chain,
                    op,
                    rhs: Box::new(rhs),
                },
                location,
            ));
        }

        match self.peek_lexeme() {
            Some("++") | Some("--") => {
                let op = if self.peek_lexeme() == Some("++") {
                    AssignOp::AddAssign
                } else {
                    AssignOp::SubAssign
                };
                self.tokens.read();
                let one = ASTNode::new(
                    ASTNodeKind::NumberLiteral("1".to_string()),
                    location,
                );
                Ok(ASTNode::new(
                    ASTNodeKind::Assignment {
                        lhs: chain,
                        op,
                        rhs: Box::new(one),
                    },
                    location,
                ))
            }
            _ => Ok(ASTNode::new(ASTNodeKind::Reference(chain), location)),
        }
    }

    // ---- expressions -------------------------------------------------

    fn parse_expression(&mut self) -> Result<ASTNode, ParseError> {
        self.parse_binary_expr(1)
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<ASTNode, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let lexeme = match self.tokens.peek() {
                Some(t) if t.kind == TokenKind::Operator => t.lexeme.clone(),
                _ => break,
            };
            let prec = match binary_precedence(&lexeme) {
                Some(p) => p,
                None => break,
            };
            if prec < min_prec {
                break;
            }
            let op_loc = self.loc();
            self.tokens.read();
            let right = self.parse_binary_expr(prec + 1)?;
            left = ASTNode::new(
                ASTNodeKind::BinaryExpression {
                    op: lexeme,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                op_loc,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ASTNode, ParseError> {
        match self.peek_lexeme() {
            Some("!") | Some("~") => {
                let location = self.loc();
                let op = self.tokens.read().unwrap().lexeme.clone();
                let operand = self.parse_unary()?;
                Ok(ASTNode::new(
                    ASTNodeKind::NotExpression {
                        op,
                        operand: Box::new(operand),
                    },
                    location,
                ))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        let tok = self
            .tokens
            .peek()
            .cloned()
            .ok_or_else(|| self.eof_error("an expression"))?;

        match tok.kind {
            TokenKind::Number | TokenKind::HexNumber | TokenKind::BinaryNumber => {
                self.tokens.read();
                Ok(ASTNode::new(
                    ASTNodeKind::NumberLiteral(tok.lexeme),
                    location,
                ))
            }
            TokenKind::Keyword if tok.lexeme == "true" || tok.lexeme == "false" => {
                self.tokens.read();
                Ok(ASTNode::new(
                    ASTNodeKind::BooleanLiteral(tok.lexeme == "true"),
                    location,
                ))
            }
            TokenKind::Keyword if tok.lexeme == "this" || tok.lexeme == "new" => {
                let chain = self.parse_reference_chain()?;
                Ok(ASTNode::new(ASTNodeKind::Reference(chain), location))
            }
            TokenKind::Identifier => {
                let chain = self.parse_reference_chain()?;
                Ok(ASTNode::new(ASTNodeKind::Reference(chain), location))
            }
            TokenKind::Operator if tok.lexeme == "(" => self.parse_paren_or_cast(),
            _ => Err(self.unexpected(&tok, "an expression")),
        }
    }

    /// Implements the `(TYPE) expr` cast heuristic from spec.md §4.2's
    /// Design Notes: a parenthesized single-token type is a cast only if
    /// the token after the closing `)` is neither a binary operator nor
    /// `;`. Otherwise this is an ordinary parenthesized expression.
    fn parse_paren_or_cast(&mut self) -> Result<ASTNode, ParseError> {
        let location = self.loc();
        self.tokens.save();
        self.tokens.read(); // '('

        let candidate = match self.tokens.peek() {
            Some(t)
                if t.kind == TokenKind::Identifier
                    || t.lexeme == "int"
                    || t.lexeme == "boolean" =>
            {
                Some(t.lexeme.clone())
            }
            _ => None,
        };

        if let Some(type_lexeme) = candidate {
            self.tokens.read();
            if self.peek_lexeme() == Some(")") {
                self.tokens.read();
                let is_cast = match self.tokens.peek() {
                    None => true,
                    Some(t) => t.lexeme != ";" && !is_binary_operator_lexeme(&t.lexeme),
                };
                if is_cast {
                    self.tokens.commit();
                    let operand = self.parse_unary()?;
                    return Ok(ASTNode::new(
                        ASTNodeKind::CastExpression {
                            target_type_lexeme: type_lexeme,
                            operand: Box::new(operand),
                        },
                        location,
                    ));
                }
            }
        }

        self.tokens.restore();
        self.tokens.read(); // '('
        let expr = self.parse_expression()?;
        self.expect(")")?;
        Ok(expr)
    }

    // ---- reference chains ---------------------------------------------

    /// Parses a reference chain starting at the current seed token
    /// (identifier, `this`, or `new`), per spec.md §4.2.
    fn parse_reference_chain(&mut self) -> Result<ReferenceChain, ParseError> {
        let location = self.loc();
        let seed = self
            .tokens
            .read()
            .cloned()
            .ok_or_else(|| self.eof_error("an identifier, 'this', or 'new'"))?;

        let mut parts = Vec::new();
        match seed.lexeme.as_str() {
            "this" => parts.push(ChainPart::new("this", seed.location())),
            "new" => parts.push(self.parse_new_part(seed.location())?),
            _ => {
                if seed.kind != TokenKind::Identifier {
                    return Err(self.unexpected(&seed, "an identifier, 'this', or 'new'"));
                }
                parts.push(self.parse_chain_part(seed.lexeme, seed.location())?);
            }
        }

        loop {
            if self.peek_lexeme() != Some(".") {
                break;
            }
            self.tokens.read();
            let field_loc = self.loc();
            let name = self.expect_identifier()?.lexeme;
            parts.push(self.parse_chain_part(name, field_loc)?);
        }

        let _ = location;
        Ok(ReferenceChain::new(parts, seed.location()))
    }

    /// Builds one chain part from a just-read identifier, checking
    /// whether it's immediately followed by `(` (method call) or `[`
    /// (array index).
    fn parse_chain_part(
        &mut self,
        name: String,
        location: Location,
    ) -> Result<ChainPart, ParseError> {
        match self.peek_lexeme() {
            Some("(") => {
                let args = self.parse_args()?;
                Ok(ChainPart::with_payload(
                    name,
                    ChainPayload::MethodCall {
                        args,
                        caller_type: String::new(),
                    },
                    location,
                ))
            }
            Some("[") => {
                self.tokens.read();
                let index = self.parse_expression()?;
                self.expect("]")?;
                Ok(ChainPart::with_payload(
                    name,
                    ChainPayload::ArrayCall {
                        index: Box::new(index),
                        caller_type: String::new(),
                    },
                    location,
                ))
            }
            _ => Ok(ChainPart::new(name, location)),
        }
    }

    fn parse_new_part(&mut self, location: Location) -> Result<ChainPart, ParseError> {
        let tok = self
            .tokens
            .read()
            .cloned()
            .ok_or_else(|| self.eof_error("a type after 'new'"))?;
        if tok.lexeme == "int" {
            self.expect("[")?;
            let size = self.parse_expression()?;
            self.expect("]")?;
            Ok(ChainPart::with_payload(
                "new",
                ChainPayload::NewObject {
                    class_type: None,
                    array_size: Some(Box::new(size)),
                },
                location,
            ))
        } else if tok.kind == TokenKind::Identifier {
            self.expect("(")?;
            self.expect(")")?;
            Ok(ChainPart::with_payload(
                "new",
                ChainPayload::NewObject {
                    class_type: Some(tok.lexeme),
                    array_size: None,
                },
                location,
            ))
        } else {
            Err(self.unexpected(&tok, "a class name or 'int'"))
        }
    }

    fn parse_args(&mut self) -> Result<Vec<ASTNode>, ParseError> {
        self.expect("(")?;
        let mut args = Vec::new();
        if self.peek_lexeme() != Some(")") {
            loop {
                args.push(self.parse_expression()?);
                if self.peek_lexeme() == Some(",") {
                    self.tokens.read();
                } else {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(args)
    }
}

enum Member {
    Field(Field),
    Method(Method),
}

/// True if a statement node unconditionally ends the control-flow path it
/// appears on (a `return`, or an `if` whose arms both do). Used by the
/// parser only to reject an obviously unreachable statement inside the
/// same block; the semantic analyzer performs the authoritative
/// return-path check described in spec.md §4.3, since it also needs type
/// information the parser doesn't have.
fn is_terminal_statement(node: &ASTNode) -> bool {
    matches!(node.kind, ASTNodeKind::ReturnStatement { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Project {
        Parser::parse_source(src).expect("parse should succeed")
    }

    fn parse_err(src: &str) -> crate::error::CompileError {
        Parser::parse_source(src).expect_err("parse should fail")
    }

    #[test]
    fn parses_hello_world_skeleton() {
        let project = parse(
            "class Main { public static void main() { System.out.println(42); } }",
        );
        assert_eq!(project.classes.len(), 1);
        let main = project.class("Main").unwrap();
        let method = main.method("main").unwrap();
        assert!(method.is_main);
        match &method.body.kind {
            ASTNodeKind::CodeBlock(stmts) => assert_eq!(stmts.len(), 1),
            _ => panic!("expected code block"),
        }
    }

    #[test]
    fn parses_extends_clause() {
        let project = parse(
            "class A { int v; } class B extends A { int w; }",
        );
        assert_eq!(project.class("B").unwrap().extends.as_deref(), Some("A"));
    }

    #[test]
    fn rejects_self_extends() {
        let err = parse_err("class A extends A { }");
        assert!(matches!(err, crate::error::CompileError::Parse(_)));
    }

    #[test]
    fn rejects_duplicate_field() {
        let err = parse_err("class C { int x; int x; }");
        let msg = err.diagnostic().unwrap().message.clone();
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn parses_array_allocation_and_index() {
        let project = parse(
            "class M { public static void main() {
                int[] x; x = new int[3]; x[0] = 7;
            } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => assert_eq!(stmts.len(), 3),
            _ => panic!(),
        }
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let project = parse(
            "class M { public static void main() {
                if (true) if (true) a(); else b();
            } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        let outer = match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => &stmts[0],
            _ => panic!(),
        };
        match &outer.kind {
            ASTNodeKind::IfStatement { then_body, .. } => match &then_body.kind {
                ASTNodeKind::CodeBlock(inner) => match &inner[0].kind {
                    ASTNodeKind::IfStatement { else_body, .. } => {
                        assert!(else_body.is_some())
                    }
                    _ => panic!("expected inner if"),
                },
                _ => panic!(),
            },
            _ => panic!("expected outer if"),
        }
    }

    #[test]
    fn parses_cast_expression() {
        let project = parse(
            "class A { } class M { public static void main() {
                A a; a = new A(); int b; b = (int) 0;
            } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => {
                let last = stmts.last().unwrap();
                match &last.kind {
                    ASTNodeKind::Assignment { rhs, .. } => {
                        assert!(matches!(
                            rhs.kind,
                            ASTNodeKind::CastExpression { .. }
                        ));
                    }
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    fn does_not_treat_paren_group_followed_by_operator_as_cast() {
        let project = parse(
            "class M { public static void main() {
                int x; x = 1; int y; y = (x) + 1;
            } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => {
                let last = stmts.last().unwrap();
                match &last.kind {
                    ASTNodeKind::Assignment { rhs, .. } => {
                        assert!(matches!(
                            rhs.kind,
                            ASTNodeKind::BinaryExpression { .. }
                        ));
                    }
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    fn desugars_increment_to_compound_assignment() {
        let project = parse(
            "class M { public static void main() { int x; x = 0; x++; } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => match &stmts[2].kind {
                ASTNodeKind::Assignment { op, .. } => {
                    assert_eq!(*op, AssignOp::AddAssign)
                }
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn parses_for_with_empty_clauses() {
        let project = parse(
            "class M { public static void main() { for (;;) { break; } } }",
        );
        let body = &project.class("M").unwrap().method("main").unwrap().body;
        match &body.kind {
            ASTNodeKind::CodeBlock(stmts) => match &stmts[0].kind {
                ASTNodeKind::ForStatement {
                    init,
                    condition,
                    update,
                    ..
                } => {
                    assert!(init.is_none());
                    assert!(condition.is_none());
                    assert!(update.is_none());
                }
                _ => panic!(),
            },
            _ => panic!(),
        }
    }
}
