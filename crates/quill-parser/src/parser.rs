//! Recursive-descent parser producing a [`Program`].
//!
//! The parser keeps a single current token; statement parsing dispatches on
//! it and every failure past the first committed token is fatal. Expression
//! parsing follows the precedence cascade (low to high): function operators
//! (`&*&`, `=>>`), logic (`&&`, `||`), a single non-associative comparison,
//! additive, multiplicative, unary minus, calls, primaries.

use quill_lexer::Lexer;
use quill_syntax::ast::*;
use quill_syntax::error::{parse_error_at, Result};
use quill_syntax::token::{Pos, Token, TokenKind};

pub struct Parser {
    lexer: Lexer,
    cur: Token,
}

impl Parser {
    /// Creates a parser and primes the current token.
    pub fn new(mut lexer: Lexer) -> Result<Self> {
        let cur = lexer.next_token()?;
        Ok(Self { lexer, cur })
    }

    fn advance(&mut self) -> Result<()> {
        self.cur = self.lexer.next_token()?;
        Ok(())
    }

    fn error<T>(&self, pos: Pos, msg: impl Into<String>) -> Result<T> {
        parse_error_at(pos.line, pos.col, msg)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.cur.kind == *kind {
            self.advance()
        } else {
            self.error(
                self.cur.pos,
                format!("Expected '{}', got '{}'", kind, self.cur.kind),
            )
        }
    }

    /// Parses an entire program up to end of input.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while self.cur.kind != TokenKind::Eof {
            stmts.push(self.parse_statement()?);
        }
        Ok(Program { stmts })
    }

    /// Parses a single expression (assignment level); used by tests and tools.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_assign()
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos;
        match self.cur.kind {
            TokenKind::Fun => self.parse_func_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Const => self.parse_var_decl(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Stmt {
                    kind: StmtKind::Block(block),
                    pos,
                })
            }
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(Stmt {
                    kind: StmtKind::Expr(None),
                    pos,
                })
            }
            _ => {
                let expr = self.parse_assign()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(Stmt {
                    kind: StmtKind::Expr(Some(expr)),
                    pos,
                })
            }
        }
    }

    // const_decl = "const" identifier "=" expr ";"
    fn parse_var_decl(&mut self) -> Result<Stmt> {
        self.advance()?; // const
        let pos = self.cur.pos;
        let name = match &self.cur.kind {
            TokenKind::Ident(name) => name.clone(),
            other => {
                return self.error(
                    pos,
                    format!("Expected identifier in variable declaration, got '{}'", other),
                );
            }
        };
        self.advance()?;
        self.expect(&TokenKind::Assign)?;
        let init = self.parse_func_op_expr()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt {
            kind: StmtKind::VarDecl { name, init },
            pos,
        })
    }

    // func_decl = "fun" [type_ann] identifier "(" [param_list] ")" block
    fn parse_func_decl(&mut self) -> Result<Stmt> {
        self.advance()?; // fun

        // A lone identifier after 'fun' is a return-type annotation only when
        // another identifier (the function name) follows it.
        let return_ty = match &self.cur.kind {
            TokenKind::TyInt
            | TokenKind::TyFloat
            | TokenKind::TyStr
            | TokenKind::TyBool
            | TokenKind::Fun => Some(self.parse_type_ann()?),
            TokenKind::Ident(_) => {
                if matches!(self.lexer.peek_token()?.kind, TokenKind::Ident(_)) {
                    Some(self.parse_type_ann()?)
                } else {
                    None
                }
            }
            _ => None,
        };

        let pos = self.cur.pos;
        let name = match &self.cur.kind {
            TokenKind::Ident(name) => name.clone(),
            other => {
                return self.error(pos, format!("Expected function name, got '{}'", other));
            }
        };
        self.advance()?;

        self.expect(&TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt {
            kind: StmtKind::FuncDecl(FuncDecl {
                name,
                return_ty,
                params,
                body,
            }),
            pos,
        })
    }

    fn parse_type_ann(&mut self) -> Result<TypeAnn> {
        let ty = match &self.cur.kind {
            TokenKind::TyInt => TypeAnn::Int,
            TokenKind::TyFloat => TypeAnn::Float,
            TokenKind::TyStr => TypeAnn::Str,
            TokenKind::TyBool => TypeAnn::Bool,
            TokenKind::Fun => TypeAnn::Fun,
            TokenKind::Ident(name) => TypeAnn::Named(name.clone()),
            other => {
                return self.error(self.cur.pos, format!("Expected type name, got '{}'", other));
            }
        };
        self.advance()?;
        Ok(ty)
    }

    // param = ["const"] identifier [":" type_ann]
    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.cur.kind == TokenKind::RParen {
            return Ok(params);
        }
        loop {
            // 'const' on a parameter is accepted and discarded
            if self.cur.kind == TokenKind::Const {
                self.advance()?;
            }
            let name = match &self.cur.kind {
                TokenKind::Ident(name) => name.clone(),
                other => {
                    return self.error(
                        self.cur.pos,
                        format!("Expected parameter name, got '{}'", other),
                    );
                }
            };
            self.advance()?;

            let ty = if self.cur.kind == TokenKind::Colon {
                self.advance()?;
                Some(self.parse_type_ann()?)
            } else {
                None
            };
            params.push(Param { name, ty });

            if self.cur.kind == TokenKind::Comma {
                self.advance()?;
                continue;
            }
            break;
        }
        Ok(params)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let pos = self.cur.pos;
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::RBrace => {
                    self.advance()?;
                    break;
                }
                TokenKind::Eof => {
                    return self.error(self.cur.pos, "Expected '}', got '<eof>'");
                }
                _ => stmts.push(self.parse_statement()?),
            }
        }
        Ok(Block { stmts, pos })
    }

    // return_stmt = "return" [expr] ";"
    fn parse_return(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos;
        self.advance()?;
        let value = if self.cur.kind == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_func_op_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            pos,
        })
    }

    // if_stmt = "if" "(" expr ")" block ["else" block]
    fn parse_if(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos;
        self.advance()?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_func_op_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.cur.kind == TokenKind::Else {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            pos,
        })
    }

    // for_stmt = "for" "(" [init] ";" [expr] ";" [assign] ")" block
    //
    // The init slot is the only tentative spot in the grammar: a leading
    // 'const' selects a declaration, a ';' selects the empty init, anything
    // else commits to an assignment expression.
    fn parse_for(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos;
        self.advance()?;
        self.expect(&TokenKind::LParen)?;

        let init = match self.cur.kind {
            TokenKind::Semicolon => {
                self.advance()?;
                None
            }
            TokenKind::Const => {
                // parse_var_decl consumes the trailing ';'
                Some(ForInit::Decl(Box::new(self.parse_var_decl()?)))
            }
            _ => {
                let expr = self.parse_assign()?;
                self.expect(&TokenKind::Semicolon)?;
                Some(ForInit::Expr(expr))
            }
        };

        let cond = if self.cur.kind == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_func_op_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;

        let post = if self.cur.kind == TokenKind::RParen {
            None
        } else {
            Some(self.parse_assign()?)
        };
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::For {
                init,
                cond,
                post,
                body,
            },
            pos,
        })
    }

    // assign = func_op_expr ["=" assign]        (right-associative)
    fn parse_assign(&mut self) -> Result<Expr> {
        let left = self.parse_func_op_expr()?;
        if self.cur.kind == TokenKind::Assign {
            let op_pos = self.cur.pos;
            self.advance()?;
            let value = self.parse_assign()?;
            return match left.kind {
                ExprKind::Ident(name) => Ok(Expr {
                    kind: ExprKind::Assign {
                        target: name,
                        value: Box::new(value),
                    },
                    pos: op_pos,
                }),
                _ => self.error(op_pos, "Left-hand side of assignment must be an identifier"),
            };
        }
        Ok(left)
    }

    // func_op_expr = logic_expr { ("&*&" | "=>>") logic_expr }
    fn parse_func_op_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_logic_expr()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Compose => BinOp::Compose,
                TokenKind::Bind => BinOp::Bind,
                _ => break,
            };
            let op_pos = self.cur.pos;
            self.advance()?;
            let right = self.parse_logic_expr()?;
            left = Expr {
                kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
                pos: op_pos,
            };
        }
        Ok(left)
    }

    // logic_expr = comp_expr { ("&&" | "||") comp_expr }
    fn parse_logic_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_comp_expr()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::AndAnd => BinOp::And,
                TokenKind::OrOr => BinOp::Or,
                _ => break,
            };
            let op_pos = self.cur.pos;
            self.advance()?;
            let right = self.parse_comp_expr()?;
            left = Expr {
                kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
                pos: op_pos,
            };
        }
        Ok(left)
    }

    // comp_expr = add_expr [cmp add_expr]       (non-associative)
    fn parse_comp_expr(&mut self) -> Result<Expr> {
        let left = self.parse_add_expr()?;
        let op = match self.cur.kind {
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::NotEq => BinOp::NotEq,
            TokenKind::Less => BinOp::Less,
            TokenKind::LessEq => BinOp::LessEq,
            TokenKind::Greater => BinOp::Greater,
            TokenKind::GreaterEq => BinOp::GreaterEq,
            _ => return Ok(left),
        };
        let op_pos = self.cur.pos;
        self.advance()?;
        let right = self.parse_add_expr()?;
        Ok(Expr {
            kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
            pos: op_pos,
        })
    }

    // add_expr = mul_expr { ("+" | "-") mul_expr }
    fn parse_add_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_mul_expr()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let op_pos = self.cur.pos;
            self.advance()?;
            let right = self.parse_mul_expr()?;
            left = Expr {
                kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
                pos: op_pos,
            };
        }
        Ok(left)
    }

    // mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }
    fn parse_mul_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary_expr()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let op_pos = self.cur.pos;
            self.advance()?;
            let right = self.parse_unary_expr()?;
            left = Expr {
                kind: ExprKind::Binary(op, Box::new(left), Box::new(right)),
                pos: op_pos,
            };
        }
        Ok(left)
    }

    // unary_expr = "-" unary_expr | call_expr
    fn parse_unary_expr(&mut self) -> Result<Expr> {
        if self.cur.kind == TokenKind::Minus {
            let op_pos = self.cur.pos;
            self.advance()?;
            let rhs = self.parse_unary_expr()?;
            return Ok(Expr {
                kind: ExprKind::Unary(UnaryOp::Neg, Box::new(rhs)),
                pos: op_pos,
            });
        }
        self.parse_call_expr()
    }

    // call_expr = primary { "(" [arg_list] ")" }
    fn parse_call_expr(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.cur.kind == TokenKind::LParen {
            let call_pos = self.cur.pos;
            self.advance()?;
            let args = self.parse_arg_list()?;
            self.expect(&TokenKind::RParen)?;
            expr = Expr {
                kind: ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
                pos: call_pos,
            };
        }
        Ok(expr)
    }

    // arg_list = expr { "," expr }
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.cur.kind == TokenKind::RParen {
            return Ok(args);
        }
        loop {
            args.push(self.parse_func_op_expr()?);
            if self.cur.kind == TokenKind::Comma {
                self.advance()?;
                continue;
            }
            break;
        }
        Ok(args)
    }

    // primary = literal | identifier | "(" expr ["," expr {"," expr}] ")"
    fn parse_primary(&mut self) -> Result<Expr> {
        let pos = self.cur.pos;
        let lit = match &self.cur.kind {
            TokenKind::Int(n) => Some(Literal::Int(*n)),
            TokenKind::Float(x) => Some(Literal::Float(*x)),
            TokenKind::Str(s) => Some(Literal::Str(s.clone())),
            TokenKind::Bool(b) => Some(Literal::Bool(*b)),
            _ => None,
        };
        if let Some(lit) = lit {
            self.advance()?;
            return Ok(Expr {
                kind: ExprKind::Literal(lit),
                pos,
            });
        }

        if let TokenKind::Ident(name) = &self.cur.kind {
            let name = name.clone();
            self.advance()?;
            return Ok(Expr {
                kind: ExprKind::Ident(name),
                pos,
            });
        }

        if self.cur.kind == TokenKind::LParen {
            self.advance()?;
            let first = self.parse_func_op_expr()?;
            // a comma turns the parenthesized expression into a tuple;
            // '(e)' stays plain 'e'
            if self.cur.kind == TokenKind::Comma {
                let mut elements = vec![first];
                while self.cur.kind == TokenKind::Comma {
                    self.advance()?;
                    elements.push(self.parse_func_op_expr()?);
                }
                self.expect(&TokenKind::RParen)?;
                return Ok(Expr {
                    kind: ExprKind::Tuple(elements),
                    pos,
                });
            }
            self.expect(&TokenKind::RParen)?;
            return Ok(first);
        }

        self.error(
            pos,
            format!("Expected primary expression, got '{}'", self.cur.kind),
        )
    }
}
