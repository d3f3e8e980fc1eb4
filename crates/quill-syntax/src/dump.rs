//! Indented structural dump of the AST, for debugging and tooling.

use std::fmt::Write;

use crate::ast::*;

/// Renders a program as an indented tree, one node per line.
pub fn dump_program(program: &Program) -> String {
    let mut d = Dumper::default();
    d.line("Program");
    d.indent += 1;
    for stmt in &program.stmts {
        d.stmt(stmt);
    }
    d.out
}

#[derive(Default)]
struct Dumper {
    out: String,
    indent: usize,
}

impl Dumper {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        // writing to a String cannot fail
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    fn block(&mut self, b: &Block) {
        self.line("Block");
        self.indent += 1;
        for stmt in &b.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, s: &Stmt) {
        match &s.kind {
            StmtKind::Expr(None) => self.line("ExprStmt <empty>"),
            StmtKind::Expr(Some(e)) => {
                self.line("ExprStmt");
                self.indent += 1;
                self.expr(e);
                self.indent -= 1;
            }
            StmtKind::VarDecl { name, init } => {
                self.line(format!("VarDecl const {}", name));
                self.indent += 1;
                self.expr(init);
                self.indent -= 1;
            }
            StmtKind::Return(value) => {
                self.line("Return");
                if let Some(e) = value {
                    self.indent += 1;
                    self.expr(e);
                    self.indent -= 1;
                }
            }
            StmtKind::Block(b) => self.block(b),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.line("If");
                self.indent += 1;
                self.expr(cond);
                self.block(then_block);
                if let Some(eb) = else_block {
                    self.line("Else");
                    self.block(eb);
                }
                self.indent -= 1;
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.line("For");
                self.indent += 1;
                match init {
                    Some(ForInit::Decl(d)) => self.stmt(d),
                    Some(ForInit::Expr(e)) => self.expr(e),
                    None => self.line("<no init>"),
                }
                match cond {
                    Some(c) => self.expr(c),
                    None => self.line("<no cond>"),
                }
                match post {
                    Some(p) => self.expr(p),
                    None => self.line("<no post>"),
                }
                self.block(body);
                self.indent -= 1;
            }
            StmtKind::FuncDecl(f) => {
                let params: Vec<String> = f
                    .params
                    .iter()
                    .map(|p| match &p.ty {
                        Some(t) => format!("{}:{}", p.name, t),
                        None => p.name.clone(),
                    })
                    .collect();
                let ret = match &f.return_ty {
                    Some(t) => format!(" -> {}", t),
                    None => String::new(),
                };
                self.line(format!("FuncDecl {}({}){}", f.name, params.join(", "), ret));
                self.indent += 1;
                self.block(&f.body);
                self.indent -= 1;
            }
        }
    }

    fn expr(&mut self, e: &Expr) {
        match &e.kind {
            ExprKind::Literal(Literal::Int(n)) => self.line(format!("Int {}", n)),
            ExprKind::Literal(Literal::Float(x)) => self.line(format!("Float {}", x)),
            ExprKind::Literal(Literal::Str(s)) => self.line(format!("Str {:?}", s)),
            ExprKind::Literal(Literal::Bool(b)) => self.line(format!("Bool {}", b)),
            ExprKind::Ident(name) => self.line(format!("Ident {}", name)),
            ExprKind::Unary(op, rhs) => {
                let op = match op {
                    UnaryOp::Neg => "-",
                };
                self.line(format!("Unary {}", op));
                self.indent += 1;
                self.expr(rhs);
                self.indent -= 1;
            }
            ExprKind::Binary(op, lhs, rhs) => {
                self.line(format!("Binary {}", op));
                self.indent += 1;
                self.expr(lhs);
                self.expr(rhs);
                self.indent -= 1;
            }
            ExprKind::Call { callee, args } => {
                self.line("Call");
                self.indent += 1;
                self.expr(callee);
                for a in args {
                    self.expr(a);
                }
                self.indent -= 1;
            }
            ExprKind::Tuple(elements) => {
                self.line(format!("Tuple ({} elements)", elements.len()));
                self.indent += 1;
                for el in elements {
                    self.expr(el);
                }
                self.indent -= 1;
            }
            ExprKind::Assign { target, value } => {
                self.line(format!("Assign {}", target));
                self.indent += 1;
                self.expr(value);
                self.indent -= 1;
            }
        }
    }
}
