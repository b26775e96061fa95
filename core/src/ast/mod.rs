//! Syntax tree consumed by the evaluator.
//!
//! Producing this tree from source text is the job of an external parser;
//! [`build`] offers constructors for hosts and tests that assemble trees by
//! hand.

pub mod build;

use alloc::sync::Arc;

use crate::scope::Modifiers;
use crate::types::Type;
use crate::values::Value;
use crate::{Box, Vec};

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    /// `final int a = 1, b;`
    VarDecl {
        modifiers: Modifiers,
        ty: Option<Type>,
        declarators: Vec<Declarator>,
    },
    Block(Block),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    /// `for (final T x : iterable)`
    ForEach {
        modifiers: Modifiers,
        ty: Option<Type>,
        name: Arc<str>,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Throw(Expr),
    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    MethodDecl(Arc<MethodDecl>),
    Empty,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Arc<str>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub modifiers: Modifiers,
    /// Multi-catch alternatives. Empty means an untyped catch.
    pub types: Vec<Type>,
    pub name: Arc<str>,
    pub body: Block,
}

/// A parameter of a method or lambda. For a varargs parameter `ty` is the
/// element type.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Arc<str>,
    pub ty: Option<Type>,
    pub modifiers: Modifiers,
    pub varargs: bool,
}

impl Param {
    /// The type of the local the parameter binds to.
    pub fn binding_type(&self) -> Option<Type> {
        match (&self.ty, self.varargs) {
            (Some(ty), true) => Some(Type::array_of(ty.clone())),
            (None, true) => Some(Type::array_of(Type::object())),
            (ty, false) => ty.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: Arc<str>,
    pub modifiers: Modifiers,
    pub return_type: Option<Type>,
    pub params: Vec<Param>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub body: LambdaBody,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone)]
pub enum MethodRefTarget {
    /// `expr::name`; the expression is evaluated when the reference is.
    Expr(Box<Expr>),
    /// `Type::name`, or `Type::new` for constructors.
    Type(Type),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Ident(Arc<str>),
    /// `target = value` or `target op= value`.
    Assign {
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Cast {
        ty: Type,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: Type,
    },
    /// `name(args)` or `target.name(args)`.
    Call {
        target: Option<Box<Expr>>,
        name: Arc<str>,
        args: Vec<Expr>,
    },
    /// Calling a value directly, e.g. `lambdas[i]()`.
    Invoke {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Field {
        target: Box<Expr>,
        name: Arc<str>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    New {
        ty: Type,
        args: Vec<Expr>,
    },
    /// `new int[2][3][]`: two sized dimensions, one extra.
    NewArray {
        element: Type,
        dimensions: Vec<Expr>,
        extra_dimensions: usize,
    },
    /// `{a, b, c}` with the element type of the array being built.
    ArrayLiteral {
        element: Type,
        elements: Vec<Expr>,
    },
    Lambda(Arc<LambdaExpr>),
    MethodRef {
        target: MethodRefTarget,
        name: Arc<str>,
    },
    This,
    Super,
}
