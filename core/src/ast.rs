//! All the types that make up a parsed MiniJava program. There is no
//! functionality implemented here beyond small constructors and accessors;
//! the parser builds these, the semantic analyzer mutates `resolved_type`
//! fields in place, and the code generator reads the finished tree.
//!
//! Every expression-shaped node carries a `resolved_type: String`, set by
//! the semantic analyzer to one of the well-known type names in
//! [`types`], a class name, or the internal marker [`types::RETURN_VOID`].

use crate::error::Location;
use std::collections::HashMap;

/// Well-known `resolved_type` spellings. A class-typed node's
/// `resolved_type` is simply the class's name, so there's no constant for
/// that case.
pub mod types {
    pub const INT: &str = "int";
    pub const INT_ARRAY: &str = "int[]";
    pub const BOOLEAN: &str = "boolean";
    pub const VOID: &str = "void";
    /// Internal marker a [`super::ASTNodeKind::CodeBlock`] resolves to when
    /// every control-flow path through it ends in a `return` — used by the
    /// analyzer to detect that a non-void method body always returns.
    pub const RETURN_VOID: &str = "return-void";
    /// The built-in pseudo-class backing `System.out.println`/etc.
    pub const SYSTEM: &str = "System";
}

/// Which of the five primitive shapes a field/parameter/return type has.
/// `type_lexeme` on the owning [`Field`] carries the source spelling,
/// since `Class` needs the class name and `IntArray` needs to be told
/// apart from `Int` (the kind alone can't do either).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Int,
    Boolean,
    IntArray,
    Class,
    Void,
}

impl PrimitiveKind {
    /// The `resolved_type` this kind maps to when it is not a user class
    /// (for `Class`, the caller must use `type_lexeme` instead).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int => types::INT,
            Self::Boolean => types::BOOLEAN,
            Self::IntArray => types::INT_ARRAY,
            Self::Void => types::VOID,
            Self::Class => {
                unreachable!("Class kind has no fixed type name")
            }
        }
    }
}

/// A field declaration: `int x;`, `int[] xs;`, `boolean b;`, `Foo f;`. Also
/// used for method parameters and local variable declarations, which share
/// exactly this shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub primitive_kind: PrimitiveKind,
    pub type_lexeme: String,
    pub name: String,
    pub location: Location,
}

impl Field {
    /// The type name this field's declared type resolves to.
    pub fn declared_type(&self) -> &str {
        match self.primitive_kind {
            PrimitiveKind::Class => &self.type_lexeme,
            other => other.type_name(),
        }
    }
}

/// A method declaration, including `main`.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub return_kind: PrimitiveKind,
    pub return_lexeme: String,
    pub name: String,
    pub params: Vec<Field>,
    pub body: ASTNode,
    pub is_main: bool,
    pub location: Location,
}

impl Method {
    pub fn return_type(&self) -> &str {
        match self.return_kind {
            PrimitiveKind::Class => &self.return_lexeme,
            other => other.type_name(),
        }
    }
}

/// A class declaration, with lookup maps for its own (non-inherited)
/// members. Inherited members are reached through the symbol table chain
/// built in semantic analysis, not through these maps.
#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub name: String,
    pub extends: Option<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub location: Location,
    field_index: HashMap<String, usize>,
    method_index: HashMap<String, usize>,
}

impl Class {
    pub fn new(
        name: String,
        extends: Option<String>,
        fields: Vec<Field>,
        methods: Vec<Method>,
        location: Location,
    ) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let method_index = methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self {
            name,
            extends,
            fields,
            methods,
            location,
            field_index,
            method_index,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        let i = *self.method_index.get(name)?;
        Some(&mut self.methods[i])
    }
}

/// The whole parsed program: an ordered list of classes plus a name-to-
/// index map. Class names are globally unique (enforced by the parser).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Project {
    pub classes: Vec<Class>,
    index: HashMap<String, usize>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. Returns `false` (and does not add it) if a class by
    /// this name already exists — the parser turns that into a "Duplicate
    /// class" error.
    pub fn push(&mut self, class: Class) -> bool {
        if self.index.contains_key(&class.name) {
            return false;
        }
        self.index.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
        true
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut Class> {
        let i = *self.index.get(name)?;
        Some(&mut self.classes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// The assignment operator spelled out on an [`ASTNodeKind::Assignment`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    AndAssign,
    OrAssign,
    XorAssign,
}

impl AssignOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Some(match lexeme {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubAssign,
            "*=" => Self::MulAssign,
            "/=" => Self::DivAssign,
            "&=" => Self::AndAssign,
            "|=" => Self::OrAssign,
            "^=" => Self::XorAssign,
            _ => return None,
        })
    }

    /// `true` for the four operators restricted to `int` operands
    /// (`+= -= *= /=`); `false` for the bitwise/boolean trio (`&= |= ^=`),
    /// which additionally accept matching `boolean` operands.
    pub fn is_arithmetic_compound(self) -> bool {
        matches!(
            self,
            Self::AddAssign | Self::SubAssign | Self::MulAssign | Self::DivAssign
        )
    }

    pub fn is_bitwise_compound(self) -> bool {
        matches!(self, Self::AndAssign | Self::OrAssign | Self::XorAssign)
    }
}

/// One step of a [`ReferenceChain`]: a `(token, payload?)` pair as
/// described in spec.md §3. `name` is the identifier lexeme for a field or
/// method access, or the literal seed marker (`"this"`/`"new"`) when this
/// is the chain's first part and the seed wasn't a plain identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainPart {
    pub name: String,
    pub payload: Option<ChainPayload>,
    pub location: Location,
    /// The type this part's value has, filled in during semantic
    /// analysis as the chain is walked left to right.
    pub resolved_type: String,
}

impl ChainPart {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            payload: None,
            location,
            resolved_type: String::new(),
        }
    }

    pub fn with_payload(
        name: impl Into<String>,
        payload: ChainPayload,
        location: Location,
    ) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload),
            location,
            resolved_type: String::new(),
        }
    }
}

/// The payload attached to a chain part: a method call, an array index, or
/// (only ever on the chain's first part) a `new` allocation.
#[derive(Clone, Debug, PartialEq)]
pub enum ChainPayload {
    MethodCall {
        args: Vec<ASTNode>,
        /// Back-filled by reference-chain resolution with the type the
        /// call is dispatched against, before the call's own arguments
        /// and return type are resolved. See spec.md Design Notes: this
        /// must be set before `MethodCall` analysis runs.
        caller_type: String,
    },
    ArrayCall {
        index: Box<ASTNode>,
        caller_type: String,
    },
    NewObject {
        /// `Some(class)` for `new Foo()`; mutually exclusive with
        /// `array_size`.
        class_type: Option<String>,
        /// `Some(size)` for `new int[size]`; mutually exclusive with
        /// `class_type`.
        array_size: Option<Box<ASTNode>>,
    },
}

/// A source-level sequence of dot- and bracket-separated accesses
/// beginning with an identifier, `this`, or `new`. `parts` is always
/// non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceChain {
    pub parts: Vec<ChainPart>,
    pub resolved_type: String,
    pub is_array_length: bool,
    pub location: Location,
}

impl ReferenceChain {
    pub fn new(parts: Vec<ChainPart>, location: Location) -> Self {
        assert!(!parts.is_empty(), "reference chain must have a seed");
        Self {
            parts,
            resolved_type: String::new(),
            is_array_length: false,
            location,
        }
    }
}

/// A fully typed AST node: the tagged variant from spec.md §3, paired with
/// its resolved type and the source location it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ASTNode {
    pub kind: ASTNodeKind,
    pub resolved_type: String,
    pub location: Location,
}

impl ASTNode {
    pub fn new(kind: ASTNodeKind, location: Location) -> Self {
        Self {
            kind,
            resolved_type: String::new(),
            location,
        }
    }

    pub fn boxed(kind: ASTNodeKind, location: Location) -> Box<Self> {
        Box::new(Self::new(kind, location))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ASTNodeKind {
    CodeBlock(Vec<ASTNode>),
    BinaryExpression {
        op: String,
        left: Box<ASTNode>,
        right: Box<ASTNode>,
    },
    NotExpression {
        op: String,
        operand: Box<ASTNode>,
    },
    CastExpression {
        target_type_lexeme: String,
        operand: Box<ASTNode>,
    },
    ReturnStatement {
        operand: Option<Box<ASTNode>>,
    },
    BreakStatement,
    ContinueStatement,
    /// Any expression that starts with an identifier, `this`, or `new`:
    /// field access, array indexing, method calls, and allocations all
    /// route through here via [`ChainPayload`].
    Reference(ReferenceChain),
    NumberLiteral(String),
    BooleanLiteral(bool),
    LocalVariableDecl(Field),
    Assignment {
        lhs: ReferenceChain,
        op: AssignOp,
        rhs: Box<ASTNode>,
    },
    IfStatement {
        condition: Box<ASTNode>,
        then_body: Box<ASTNode>,
        else_body: Option<Box<ASTNode>>,
    },
    WhileStatement {
        condition: Box<ASTNode>,
        body: Box<ASTNode>,
        is_do_while: bool,
    },
    ForStatement {
        init: Option<Box<ASTNode>>,
        condition: Option<Box<ASTNode>>,
        update: Option<Box<ASTNode>>,
        body: Option<Box<ASTNode>>,
    },
}
