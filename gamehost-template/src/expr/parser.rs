//! Recursive-descent parser for expressions.

use gamehost_ir::Value;

use super::{
    ExprError,
    ast::{BinaryOp, Expr, Function, UnaryOp},
    lexer::{Span, Token, tokenize},
};

/// Parse expression text into a syntax tree.
pub fn parse_expression(src: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(src).map_err(|span| {
        ExprError::new(
            format!("unexpected character '{}'", &src[span.clone()]),
            span,
        )
    })?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        len: src.len(),
    };
    let expr = parser.expr()?;
    if let Some((token, span)) = parser.peek_with_span() {
        return Err(ExprError::new(
            format!("unexpected {} after expression", token.describe()),
            span,
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_with_span(&self) -> Option<(Token, Span)> {
        self.tokens.get(self.pos).cloned()
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn end_span(&self) -> Span {
        self.len..self.len
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ExprError> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, span)) => Err(ExprError::new(
                format!("expected {}, found {}", what, token.describe()),
                span,
            )),
            None => Err(ExprError::new(
                format!("expected {}, found end of expression", what),
                self.end_span(),
            )),
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let cond = self.binary(0)?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.expr()?;
        self.expect(Token::Colon, "':' in conditional expression")?;
        let otherwise = self.expr()?;
        Ok(Expr::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Precedence climbing over the binary operator table.
    fn binary(&mut self, min_prec: u8) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while let Some((op, prec)) = self.peek().and_then(binary_op) {
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                match self.advance() {
                    Some((Token::Ident(field), _)) => {
                        expr = Expr::Member(Box::new(expr), field);
                    }
                    Some((token, span)) => {
                        return Err(ExprError::new(
                            format!("expected property name after '.', found {}", token.describe()),
                            span,
                        ));
                    }
                    None => {
                        return Err(ExprError::new(
                            "expected property name after '.'",
                            self.end_span(),
                        ));
                    }
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.expr()?;
                self.expect(Token::RBracket, "']'")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let Some((token, span)) = self.advance() else {
            return Err(ExprError::new(
                "expected a value, found end of expression",
                self.end_span(),
            ));
        };

        match token {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => Ok(Expr::Array(self.list(Token::RBracket, "']'")?)),
            Token::Ident(name) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.call(&name, span)
            }
            Token::Ident(name) => Ok(Expr::Ident(name)),
            other => Err(ExprError::new(
                format!("expected a value, found {}", other.describe()),
                span,
            )),
        }
    }

    fn call(&mut self, name: &str, span: Span) -> Result<Expr, ExprError> {
        let function = Function::from_name(name)
            .ok_or_else(|| ExprError::new(format!("unknown function '{}'", name), span.clone()))?;
        let args = self.list(Token::RParen, "')'")?;

        let (min, max) = function.arity();
        let count = args.len();
        if count < min || max.is_some_and(|max| count > max) {
            let expected = match max {
                Some(max) if max == min => format!("{}", min),
                Some(max) => format!("{} to {}", min, max),
                None => format!("at least {}", min),
            };
            return Err(ExprError::new(
                format!(
                    "'{}' takes {} argument{}, found {}",
                    name,
                    expected,
                    if max == Some(1) && min == 1 { "" } else { "s" },
                    count
                ),
                span,
            ));
        }

        Ok(Expr::Call(function, args))
    }

    /// Parse a comma-separated list up to and including the closing token.
    fn list(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.expr()?);
            if self.eat(&Token::Comma) {
                // Allow a trailing comma
                if self.eat(&close) {
                    return Ok(items);
                }
                continue;
            }
            self.expect(close.clone(), what)?;
            return Ok(items);
        }
    }
}

/// Binary operator and precedence for a token (higher binds tighter).
fn binary_op(token: &Token) -> Option<(BinaryOp, u8)> {
    let entry = match token {
        Token::OrOr => (BinaryOp::Or, 1),
        Token::AndAnd => (BinaryOp::And, 2),
        Token::EqEq => (BinaryOp::Eq, 3),
        Token::NotEq => (BinaryOp::Ne, 3),
        Token::Lt => (BinaryOp::Lt, 4),
        Token::Le => (BinaryOp::Le, 4),
        Token::Gt => (BinaryOp::Gt, 4),
        Token::Ge => (BinaryOp::Ge, 4),
        Token::Plus => (BinaryOp::Add, 5),
        Token::Minus => (BinaryOp::Sub, 5),
        Token::Star => (BinaryOp::Mul, 6),
        Token::Slash => (BinaryOp::Div, 6),
        Token::Percent => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(entry)
}
