pub mod error;
pub mod lexer;

pub use error::SyntaxError;

use crate::expr::Expr;
use crate::interner;
use crate::types::ty::Type;
use lexer::{lex, Token};

/// Read a logical form from its surface syntax, e.g.
/// `(lambda $0:e (and:<t*,t> (big:<e,t> $0) (wet:<e,t> $0)))`.
pub fn parse_expr(source: &str) -> Result<Expr, SyntaxError> {
    let mut reader = Reader::new(lex(source)?);
    let expr = reader.expr()?;
    reader.finish()?;
    Ok(expr)
}

/// Read a type expression, e.g. `<e,<e,t>>`, `t*`, `loc`.
pub fn parse_type(source: &str) -> Result<Type, SyntaxError> {
    let mut reader = Reader::new(lex(source)?);
    let ty = reader.ty()?;
    reader.finish()?;
    Ok(ty)
}

/// Cursor over the token stream. The grammar is LL(1), so a single peek
/// drives every decision.
struct Reader {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Reader {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Reader { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).copied();
        self.pos += 1;
        item
    }

    fn expect(&mut self, want: Token, label: &str) -> Result<(), SyntaxError> {
        match self.next() {
            Some((token, _)) if token == want => Ok(()),
            Some((token, pos)) => Err(SyntaxError::Unexpected {
                pos,
                found: format!("{:?}", token),
                expected: label.to_string(),
            }),
            None => Err(SyntaxError::Eof {
                expected: label.to_string(),
            }),
        }
    }

    fn finish(&mut self) -> Result<(), SyntaxError> {
        match self.next() {
            None => Ok(()),
            Some((token, pos)) => Err(SyntaxError::Unexpected {
                pos,
                found: format!("{:?}", token),
                expected: "end of input".to_string(),
            }),
        }
    }

    /// EXPR := $var | name ':' TYPE | '(' lambda $var ':' TYPE EXPR ')'
    ///       | '(' EXPR EXPR+ ')'
    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        match self.next() {
            Some((Token::Var(name), _)) => Ok(Expr::Var { name, ty: None }),
            Some((Token::Name(name), _)) => {
                self.expect(Token::Colon, "':' after constant name")?;
                let ty = self.ty()?;
                Ok(Expr::Const { name, ty })
            }
            Some((Token::LParen, _)) => {
                if self.peek() == Some(Token::Lambda) {
                    self.next();
                    let var = match self.next() {
                        Some((Token::Var(name), _)) => name,
                        Some((token, pos)) => {
                            return Err(SyntaxError::Unexpected {
                                pos,
                                found: format!("{:?}", token),
                                expected: "binder variable".to_string(),
                            })
                        }
                        None => {
                            return Err(SyntaxError::Eof {
                                expected: "binder variable".to_string(),
                            })
                        }
                    };
                    self.expect(Token::Colon, "':' after binder")?;
                    let var_ty = self.ty()?;
                    let body = self.expr()?;
                    self.expect(Token::RParen, "')'")?;
                    Ok(Expr::Lambda {
                        var,
                        var_ty,
                        body: Box::new(body),
                        ty: None,
                    })
                } else {
                    let pred = self.expr()?;
                    let mut args = Vec::new();
                    while self.peek() != Some(Token::RParen) && self.peek().is_some() {
                        args.push(self.expr()?);
                    }
                    self.expect(Token::RParen, "')'")?;
                    if args.is_empty() {
                        // A parenthesized single expression is itself.
                        return Ok(pred);
                    }
                    Ok(Expr::App {
                        pred: Box::new(pred),
                        args,
                        ty: None,
                    })
                }
            }
            Some((token, pos)) => Err(SyntaxError::Unexpected {
                pos,
                found: format!("{:?}", token),
                expected: "expression".to_string(),
            }),
            None => Err(SyntaxError::Eof {
                expected: "expression".to_string(),
            }),
        }
    }

    /// TYPE := PRIMARY '*'? ; PRIMARY := name | '<' TYPE (',' TYPE)+ '>'
    ///
    /// Multiple commas curry to the right: `<a,b,c>` reads as `<a,<b,c>>`.
    /// The name `top` denotes the ontology root.
    fn ty(&mut self) -> Result<Type, SyntaxError> {
        let primary = match self.next() {
            Some((Token::Name(name), _)) => {
                if interner::resolve(name) == "top" {
                    Type::Top
                } else {
                    Type::Atomic(name)
                }
            }
            Some((Token::Lt, _)) => {
                let mut parts = vec![self.ty()?];
                while self.peek() == Some(Token::Comma) {
                    self.next();
                    parts.push(self.ty()?);
                }
                self.expect(Token::Gt, "'>'")?;
                if parts.len() < 2 {
                    let pos = self.tokens.get(self.pos.saturating_sub(1)).map(|(_, p)| *p);
                    return Err(SyntaxError::Unexpected {
                        pos: pos.unwrap_or(0),
                        found: "'>'".to_string(),
                        expected: "',' and a result type".to_string(),
                    });
                }
                let mut ty = parts.pop().ok_or(SyntaxError::Eof {
                    expected: "type".to_string(),
                })?;
                while let Some(from) = parts.pop() {
                    ty = Type::complex(from, ty);
                }
                ty
            }
            Some((token, pos)) => {
                return Err(SyntaxError::Unexpected {
                    pos,
                    found: format!("{:?}", token),
                    expected: "type".to_string(),
                })
            }
            None => {
                return Err(SyntaxError::Eof {
                    expected: "type".to_string(),
                })
            }
        };
        if self.peek() == Some(Token::Star) {
            self.next();
            Ok(Type::list(primary))
        } else {
            Ok(primary)
        }
    }
}
