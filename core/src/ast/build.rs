//! Terse constructors for syntax trees.
//!
//! ```ignore
//! use jolt_core::ast::build::*;
//!
//! // for (i = 0; i < 4; i++) { total += i; }
//! let program = for_(
//!     vec![expr(set("i", int(0)))],
//!     Some(binary(BinaryOp::Lt, ident("i"), int(4))),
//!     vec![post_inc(ident("i"))],
//!     block(vec![expr(assign_op(BinaryOp::Add, ident("total"), ident("i")))]),
//! );
//! ```

use alloc::sync::Arc;

use super::*;
use crate::Box;

// Expressions

pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

pub fn int(value: i32) -> Expr {
    Expr::Literal(Value::int(value))
}

pub fn long(value: i64) -> Expr {
    Expr::Literal(Value::long(value))
}

pub fn double(value: f64) -> Expr {
    Expr::Literal(Value::double(value))
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(Value::boolean(value))
}

pub fn char(value: char) -> Expr {
    Expr::Literal(Value::char(value))
}

pub fn string(value: &str) -> Expr {
    Expr::Literal(Value::string(value))
}

pub fn null() -> Expr {
    Expr::Literal(Value::Null)
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(Arc::from(name))
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        op: None,
        target: Box::new(target),
        value: Box::new(value),
    }
}

/// `name = value`
pub fn set(name: &str, value: Expr) -> Expr {
    assign(ident(name), value)
}

pub fn assign_op(op: BinaryOp, target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        op: Some(op),
        target: Box::new(target),
        value: Box::new(value),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

pub fn post_inc(operand: Expr) -> Expr {
    unary(UnaryOp::PostInc, operand)
}

pub fn pre_inc(operand: Expr) -> Expr {
    unary(UnaryOp::PreInc, operand)
}

pub fn ternary(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::Ternary {
        cond: Box::new(cond),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    }
}

pub fn cast(ty: Type, expr: Expr) -> Expr {
    Expr::Cast {
        ty,
        expr: Box::new(expr),
    }
}

pub fn instance_of(expr: Expr, ty: Type) -> Expr {
    Expr::InstanceOf {
        expr: Box::new(expr),
        ty,
    }
}

/// Unqualified call `name(args)`.
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        target: None,
        name: Arc::from(name),
        args,
    }
}

/// Qualified call `target.name(args)`.
pub fn method(target: Expr, name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        target: Some(Box::new(target)),
        name: Arc::from(name),
        args,
    }
}

pub fn invoke(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Invoke {
        callee: Box::new(callee),
        args,
    }
}

pub fn field(target: Expr, name: &str) -> Expr {
    Expr::Field {
        target: Box::new(target),
        name: Arc::from(name),
    }
}

pub fn index(target: Expr, idx: Expr) -> Expr {
    Expr::Index {
        target: Box::new(target),
        index: Box::new(idx),
    }
}

pub fn new(class: &str, args: Vec<Expr>) -> Expr {
    Expr::New {
        ty: Type::class(class),
        args,
    }
}

pub fn new_array(element: Type, dimensions: Vec<Expr>) -> Expr {
    Expr::NewArray {
        element,
        dimensions,
        extra_dimensions: 0,
    }
}

pub fn array_literal(element: Type, elements: Vec<Expr>) -> Expr {
    Expr::ArrayLiteral { element, elements }
}

pub fn param(name: &str) -> Param {
    Param {
        name: Arc::from(name),
        ty: None,
        modifiers: Modifiers::empty(),
        varargs: false,
    }
}

pub fn typed_param(ty: Type, name: &str) -> Param {
    Param {
        ty: Some(ty),
        ..param(name)
    }
}

pub fn final_param(ty: Option<Type>, name: &str) -> Param {
    Param {
        ty,
        modifiers: Modifiers::FINAL,
        ..param(name)
    }
}

pub fn varargs_param(element: Type, name: &str) -> Param {
    Param {
        ty: Some(element),
        varargs: true,
        ..param(name)
    }
}

/// Expression lambda with untyped parameters.
pub fn lambda(params: &[&str], body: Expr) -> Expr {
    lambda_with(params.iter().map(|p| param(p)).collect(), LambdaBody::Expr(body))
}

pub fn lambda_block(params: &[&str], body: Vec<Stmt>) -> Expr {
    lambda_with(
        params.iter().map(|p| param(p)).collect(),
        LambdaBody::Block(Block::new(body)),
    )
}

pub fn lambda_with(params: Vec<Param>, body: LambdaBody) -> Expr {
    Expr::Lambda(Arc::new(LambdaExpr { params, body }))
}

/// `target::name`
pub fn method_ref(target: Expr, name: &str) -> Expr {
    Expr::MethodRef {
        target: MethodRefTarget::Expr(Box::new(target)),
        name: Arc::from(name),
    }
}

/// `Type::name`
pub fn type_ref(ty: Type, name: &str) -> Expr {
    Expr::MethodRef {
        target: MethodRefTarget::Type(ty),
        name: Arc::from(name),
    }
}

// Statements

pub fn expr(e: Expr) -> Stmt {
    Stmt::Expr(e)
}

pub fn decl(ty: Type, name: &str, init: Option<Expr>) -> Stmt {
    decl_with(Modifiers::empty(), Some(ty), name, init)
}

pub fn final_decl(ty: Option<Type>, name: &str, init: Option<Expr>) -> Stmt {
    decl_with(Modifiers::FINAL, ty, name, init)
}

pub fn decl_with(modifiers: Modifiers, ty: Option<Type>, name: &str, init: Option<Expr>) -> Stmt {
    Stmt::VarDecl {
        modifiers,
        ty,
        declarators: Vec::from([Declarator {
            name: Arc::from(name),
            init,
        }]),
    }
}

pub fn block(statements: Vec<Stmt>) -> Stmt {
    Stmt::Block(Block::new(statements))
}

pub fn if_(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Stmt {
    Stmt::If {
        cond,
        then: Box::new(then),
        otherwise: otherwise.map(Box::new),
    }
}

pub fn while_(cond: Expr, body: Stmt) -> Stmt {
    Stmt::While {
        cond,
        body: Box::new(body),
    }
}

pub fn do_while(body: Stmt, cond: Expr) -> Stmt {
    Stmt::DoWhile {
        body: Box::new(body),
        cond,
    }
}

pub fn for_(init: Vec<Stmt>, cond: Option<Expr>, update: Vec<Expr>, body: Stmt) -> Stmt {
    Stmt::For {
        init,
        cond,
        update,
        body: Box::new(body),
    }
}

pub fn for_each(modifiers: Modifiers, ty: Option<Type>, name: &str, iterable: Expr, body: Stmt) -> Stmt {
    Stmt::ForEach {
        modifiers,
        ty,
        name: Arc::from(name),
        iterable,
        body: Box::new(body),
    }
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

pub fn ret_void() -> Stmt {
    Stmt::Return(None)
}

pub fn throw(value: Expr) -> Stmt {
    Stmt::Throw(value)
}

pub fn catch(modifiers: Modifiers, types: Vec<Type>, name: &str, body: Vec<Stmt>) -> CatchClause {
    CatchClause {
        modifiers,
        types,
        name: Arc::from(name),
        body: Block::new(body),
    }
}

pub fn try_(body: Vec<Stmt>, catches: Vec<CatchClause>, finally: Option<Vec<Stmt>>) -> Stmt {
    Stmt::Try {
        body: Block::new(body),
        catches,
        finally: finally.map(Block::new),
    }
}

pub fn method_decl(name: &str, params: Vec<Param>, return_type: Option<Type>, body: Vec<Stmt>) -> Stmt {
    Stmt::MethodDecl(Arc::new(MethodDecl {
        name: Arc::from(name),
        modifiers: Modifiers::empty(),
        return_type,
        params,
        body: Block::new(body),
    }))
}

pub fn program(statements: Vec<Stmt>) -> Block {
    Block::new(statements)
}
