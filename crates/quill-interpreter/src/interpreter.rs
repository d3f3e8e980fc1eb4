//! The evaluator: a post-order tree walk over the AST.
//!
//! Expressions evaluate to a [`Value`]; statements thread the [`Flow`]
//! execution signal so that `return` unwinds to the nearest call boundary
//! without exceptions. User function bodies run in a frame parented to the
//! environment in force at the *call site*, so free variables resolve
//! against the caller's chain.

use std::rc::Rc;

use quill_syntax::ast::*;
use quill_syntax::error::{runtime_error_at, Result};
use quill_syntax::token::Pos;

use crate::env::Env;
use crate::flow::Flow;
use crate::value::{Callable, Function, NativeFn, Value};

pub struct Interpreter;

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter
    }

    /// A fresh root environment preloaded with the built-in bindings.
    pub fn root_env() -> Env {
        let env = Env::new_root();
        let print = Function {
            params: vec!["x".to_string()],
            callable: Callable::Native(Rc::new(|_, _, args| {
                if let Some(v) = args.first() {
                    println!("{}", v);
                }
                Ok(Value::Null)
            })),
        };
        env.define("print".to_string(), Value::Fun(Rc::new(print)), false);
        env
    }

    /// Runs a program against a fresh root environment and returns the value
    /// of its last top-level statement.
    pub fn run(&mut self, program: &Program) -> Result<Value> {
        let env = Self::root_env();
        self.run_with_env(program, &env)
    }

    /// Runs a program against an existing environment (the REPL keeps one
    /// root alive across lines). A `return` reaching the end of the program
    /// is a runtime error.
    pub fn run_with_env(&mut self, program: &Program, env: &Env) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in &program.stmts {
            match self.exec_stmt(env, stmt)? {
                Flow::Continue(v) => last = v,
                Flow::Return(_) => {
                    return runtime_error_at(
                        stmt.pos.line,
                        stmt.pos.col,
                        "'return' outside of function",
                    );
                }
            }
        }
        Ok(last)
    }

    fn exec_block(&mut self, env: &Env, block: &Block) -> Result<Flow> {
        let mut last = Value::Null;
        for stmt in &block.stmts {
            match self.exec_stmt(env, stmt)? {
                Flow::Continue(v) => last = v,
                Flow::Return(v) => return Ok(Flow::Return(v)),
            }
        }
        Ok(Flow::Continue(last))
    }

    fn exec_stmt(&mut self, env: &Env, stmt: &Stmt) -> Result<Flow> {
        match &stmt.kind {
            StmtKind::Expr(None) => Ok(Flow::Continue(Value::Null)),
            StmtKind::Expr(Some(expr)) => Ok(Flow::Continue(self.eval_expr(env, expr)?)),
            StmtKind::VarDecl { name, init } => {
                let value = self.eval_expr(env, init)?;
                if env.exists_local(name) {
                    return runtime_error_at(
                        stmt.pos.line,
                        stmt.pos.col,
                        format!("Variable '{}' is already declared", name),
                    );
                }
                env.define(name.clone(), value, true);
                Ok(Flow::Continue(Value::Null))
            }
            StmtKind::Return(value) => {
                let v = match value {
                    Some(expr) => self.eval_expr(env, expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(v))
            }
            StmtKind::Block(block) => {
                let child = env.child();
                self.exec_block(&child, block)
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let c = self.eval_expr(env, cond)?;
                if Self::truthy(&c, cond.pos)? {
                    let child = env.child();
                    self.exec_block(&child, then_block)
                } else if let Some(eb) = else_block {
                    let child = env.child();
                    self.exec_block(&child, eb)
                } else {
                    Ok(Flow::Continue(Value::Null))
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                match init {
                    Some(ForInit::Decl(decl)) => {
                        self.exec_stmt(env, decl)?;
                    }
                    Some(ForInit::Expr(expr)) => {
                        self.eval_expr(env, expr)?;
                    }
                    None => {}
                }
                loop {
                    // an absent condition loops unconditionally
                    let go = match cond {
                        Some(c) => {
                            let v = self.eval_expr(env, c)?;
                            Self::to_bool(&v, c.pos)?
                        }
                        None => true,
                    };
                    if !go {
                        break;
                    }
                    let child = env.child();
                    match self.exec_block(&child, body)? {
                        Flow::Continue(_) => {}
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                    }
                    if let Some(p) = post {
                        self.eval_expr(env, p)?;
                    }
                }
                Ok(Flow::Continue(Value::Null))
            }
            StmtKind::FuncDecl(decl) => {
                let params = decl.params.iter().map(|p| p.name.clone()).collect();
                let function = Function {
                    params,
                    callable: Callable::Body(decl.body.clone()),
                };
                env.define(decl.name.clone(), Value::Fun(Rc::new(function)), false);
                Ok(Flow::Continue(Value::Null))
            }
        }
    }

    fn eval_expr(&mut self, env: &Env, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
            }),
            ExprKind::Ident(name) => match env.get(name) {
                Some(v) => Ok(v),
                None => runtime_error_at(
                    expr.pos.line,
                    expr.pos.col,
                    format!("Undefined variable '{}'", name),
                ),
            },
            ExprKind::Unary(UnaryOp::Neg, rhs) => {
                let v = self.eval_expr(env, rhs)?;
                match v {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    Value::Float(x) => Ok(Value::Float(-x)),
                    other => runtime_error_at(
                        expr.pos.line,
                        expr.pos.col,
                        format!("Cannot negate {}", other.kind_name()),
                    ),
                }
            }
            ExprKind::Binary(op, lhs, rhs) => self.eval_binary(env, *op, lhs, rhs, expr.pos),
            ExprKind::Call { callee, args } => {
                let callee = self.eval_expr(env, callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(env, arg)?);
                }
                self.invoke(env, &callee, &values, expr.pos)
            }
            ExprKind::Tuple(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for el in elements {
                    values.push(self.eval_expr(env, el)?);
                }
                Ok(Value::Tuple(Rc::new(values)))
            }
            ExprKind::Assign { target, value } => {
                let v = self.eval_expr(env, value)?;
                env.assign(target, v.clone())
                    .map_err(|e| e.at(expr.pos.line, expr.pos.col))?;
                Ok(v)
            }
        }
    }

    fn eval_binary(
        &mut self,
        env: &Env,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        pos: Pos,
    ) -> Result<Value> {
        // both sides always evaluate; && and || do not short-circuit
        let l = self.eval_expr(env, lhs)?;
        let r = self.eval_expr(env, rhs)?;
        match op {
            BinOp::Add => {
                if let Value::Str(s) = &l {
                    Ok(Value::Str(format!("{}{}", s, Self::to_str(&r))))
                } else {
                    Ok(Value::Float(
                        Self::to_number(&l, pos)? + Self::to_number(&r, pos)?,
                    ))
                }
            }
            BinOp::Sub => Ok(Value::Float(
                Self::to_number(&l, pos)? - Self::to_number(&r, pos)?,
            )),
            BinOp::Mul => Ok(Value::Float(
                Self::to_number(&l, pos)? * Self::to_number(&r, pos)?,
            )),
            BinOp::Div => {
                let a = Self::to_number(&l, pos)?;
                let b = Self::to_number(&r, pos)?;
                // division never raises; a zero divisor yields +inf
                if b == 0.0 {
                    Ok(Value::Float(f64::INFINITY))
                } else {
                    Ok(Value::Float(a / b))
                }
            }
            BinOp::Mod => {
                let a = Self::to_int(&l, pos)?;
                let b = Self::to_int(&r, pos)?;
                if b == 0 {
                    return runtime_error_at(pos.line, pos.col, "Modulo by zero");
                }
                Ok(Value::Int(a.wrapping_rem(b)))
            }
            BinOp::Eq => Ok(Value::Bool(
                Self::to_number(&l, pos)? == Self::to_number(&r, pos)?,
            )),
            BinOp::NotEq => Ok(Value::Bool(
                Self::to_number(&l, pos)? != Self::to_number(&r, pos)?,
            )),
            BinOp::Less => Ok(Value::Bool(
                Self::to_number(&l, pos)? < Self::to_number(&r, pos)?,
            )),
            BinOp::LessEq => Ok(Value::Bool(
                Self::to_number(&l, pos)? <= Self::to_number(&r, pos)?,
            )),
            BinOp::Greater => Ok(Value::Bool(
                Self::to_number(&l, pos)? > Self::to_number(&r, pos)?,
            )),
            BinOp::GreaterEq => Ok(Value::Bool(
                Self::to_number(&l, pos)? >= Self::to_number(&r, pos)?,
            )),
            BinOp::And => Ok(Value::Bool(
                Self::to_bool(&l, pos)? && Self::to_bool(&r, pos)?,
            )),
            BinOp::Or => Ok(Value::Bool(
                Self::to_bool(&l, pos)? || Self::to_bool(&r, pos)?,
            )),
            BinOp::Compose => self.compose(&l, &r, pos),
            BinOp::Bind => self.bind(&l, &r, pos),
        }
    }

    /// `base &*& deco`: a new function with `base`'s parameters whose calls
    /// forward to `deco` with `base` prepended as the first argument.
    fn compose(&mut self, l: &Value, r: &Value, pos: Pos) -> Result<Value> {
        let (base, deco) = match (l, r) {
            (Value::Fun(b), Value::Fun(d)) => (b.clone(), d.clone()),
            _ => return runtime_error_at(pos.line, pos.col, "Decorator requires two functions"),
        };
        if deco.params.len() != base.params.len() + 1 {
            return runtime_error_at(
                pos.line,
                pos.col,
                "Decorator must take (function + base arguments)",
            );
        }

        let params = base.params.clone();
        let native: NativeFn = Rc::new(move |interp, env, args| {
            let mut deco_args = Vec::with_capacity(args.len() + 1);
            deco_args.push(Value::Fun(base.clone()));
            deco_args.extend_from_slice(args);
            interp.invoke(env, &Value::Fun(deco.clone()), &deco_args, pos)
        });
        Ok(Value::Fun(Rc::new(Function {
            params,
            callable: Callable::Native(native),
        })))
    }

    /// `bound =>> f`: a new function of the remaining arity whose calls
    /// forward to `f` with the bound prefix prepended. A tuple on the left
    /// binds its elements in order; any other value binds as a single
    /// argument.
    fn bind(&mut self, l: &Value, r: &Value, pos: Pos) -> Result<Value> {
        let bound: Vec<Value> = match l {
            Value::Tuple(elements) => elements.as_ref().clone(),
            other => vec![other.clone()],
        };
        let func = match r {
            Value::Fun(f) => f.clone(),
            _ => return runtime_error_at(pos.line, pos.col, "Right side of =>> must be function"),
        };
        if bound.len() > func.params.len() {
            return runtime_error_at(pos.line, pos.col, "Too many bound arguments");
        }

        let params = func.params[bound.len()..].to_vec();
        let native: NativeFn = Rc::new(move |interp, env, args| {
            let mut full = Vec::with_capacity(bound.len() + args.len());
            full.extend(bound.iter().cloned());
            full.extend_from_slice(args);
            interp.invoke(env, &Value::Fun(func.clone()), &full, pos)
        });
        Ok(Value::Fun(Rc::new(Function {
            params,
            callable: Callable::Native(native),
        })))
    }

    /// Calls `callee` with already-evaluated arguments. Arity must match
    /// exactly. A user body runs in a fresh frame parented to the current
    /// environment; falling off its end yields `Null`.
    pub fn invoke(&mut self, env: &Env, callee: &Value, args: &[Value], pos: Pos) -> Result<Value> {
        let func = match callee {
            Value::Fun(f) => f.clone(),
            _ => return runtime_error_at(pos.line, pos.col, "Value is not callable"),
        };
        if args.len() != func.params.len() {
            return runtime_error_at(
                pos.line,
                pos.col,
                format!(
                    "Wrong number of arguments: expected {}, got {}",
                    func.params.len(),
                    args.len()
                ),
            );
        }
        match &func.callable {
            Callable::Native(native) => {
                let native = native.clone();
                native(self, env, args)
            }
            Callable::Body(body) => {
                let frame = env.child();
                for (name, value) in func.params.iter().zip(args.iter()) {
                    frame.define(name.clone(), value.clone(), false);
                }
                let inner = frame.child();
                match self.exec_block(&inner, body)? {
                    Flow::Return(v) => Ok(v),
                    Flow::Continue(_) => Ok(Value::Null),
                }
            }
        }
    }

    fn to_number(v: &Value, pos: Pos) -> Result<f64> {
        match v {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => match s.parse::<f64>() {
                Ok(x) => Ok(x),
                Err(_) => runtime_error_at(
                    pos.line,
                    pos.col,
                    format!("Cannot convert '{}' to number", s),
                ),
            },
            other => runtime_error_at(
                pos.line,
                pos.col,
                format!("Expected a number, got {}", other.kind_name()),
            ),
        }
    }

    fn to_int(v: &Value, pos: Pos) -> Result<i64> {
        match v {
            Value::Int(n) => Ok(*n),
            // truncation toward zero
            Value::Float(x) => Ok(x.trunc() as i64),
            Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
            Value::Str(s) => match s.parse::<i64>() {
                Ok(n) => Ok(n),
                Err(_) => runtime_error_at(
                    pos.line,
                    pos.col,
                    format!("Cannot convert '{}' to integer", s),
                ),
            },
            other => runtime_error_at(
                pos.line,
                pos.col,
                format!("Expected an integer, got {}", other.kind_name()),
            ),
        }
    }

    fn to_bool(v: &Value, pos: Pos) -> Result<bool> {
        match v {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Float(x) => Ok(*x != 0.0),
            Value::Str(s) => Ok(!s.is_empty()),
            Value::Null => Ok(false),
            other => runtime_error_at(
                pos.line,
                pos.col,
                format!("Expected a boolean, got {}", other.kind_name()),
            ),
        }
    }

    /// Like `to_bool`, but `Null` in an `if` condition is an error.
    fn truthy(v: &Value, pos: Pos) -> Result<bool> {
        match v {
            Value::Null => runtime_error_at(pos.line, pos.col, "Invalid condition value"),
            other => Self::to_bool(other, pos),
        }
    }

    /// Stringification for concatenation; differs from `Display` only for
    /// `Null`, which concatenates as `null`.
    fn to_str(v: &Value) -> String {
        match v {
            Value::Null => "null".to_string(),
            other => format!("{}", other),
        }
    }
}
