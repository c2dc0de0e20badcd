use super::{
    token::{tokenize, Token, TokenKind},
    BinaryOp, BuiltinFunction, CompileError, Expr, IndexArg, UnaryOp,
};

/// deepest nesting of parentheses, calls, conditionals, unary operators and
/// exponents accepted by [`parse`].
pub const MAX_NESTING_DEPTH: usize = 256;

/// parses expression text into an unresolved [`Expr`] tree.
///
/// precedence, loosest first: `?:`, `||`, `&&`, comparisons, `+ -`, `* /`,
/// `^` (right associative), unary `! -`.
pub fn parse(text: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.ternary()?;
    match parser.peek() {
        TokenKind::End => Ok(expr),
        other => Err(CompileError::syntax(
            parser.position(),
            format!("unexpected {other} after end of expression"),
        )),
    }
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
    end: Token,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Parser {
        let end_position = tokens.last().map(|t| t.position).unwrap_or_default();
        Parser {
            tokens,
            cursor: 0,
            depth: 0,
            end: Token::new(TokenKind::End, end_position),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.end)
    }

    fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    fn position(&self) -> usize {
        self.current().position
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), CompileError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(CompileError::syntax(
                self.position(),
                format!("expected {kind}, found {}", self.peek()),
            ))
        }
    }

    /// runs a nested production, failing once nesting exceeds [`MAX_NESTING_DEPTH`].
    fn nested(
        &mut self,
        production: fn(&mut Parser) -> Result<Expr, CompileError>,
    ) -> Result<Expr, CompileError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CompileError::syntax(
                self.position(),
                "expression nested too deeply",
            ));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn ternary(&mut self) -> Result<Expr, CompileError> {
        self.nested(Parser::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, CompileError> {
        let condition = self.or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let if_true = self.ternary()?;
        self.expect(TokenKind::Colon)?;
        let if_false = self.ternary()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    fn or(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.comparison()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.comparison()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqualEqual => BinaryOp::Equal,
                TokenKind::BangEqual => BinaryOp::NotEqual,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn additive(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.power()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.power()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn power(&mut self) -> Result<Expr, CompileError> {
        let base = self.unary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.nested(Parser::power)?;
            Ok(binary(BinaryOp::Power, base, exponent))
        } else {
            Ok(base)
        }
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        let op = match self.peek() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };
        self.advance();
        let operand = self.nested(Parser::unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Constant(value)),
            TokenKind::Variable(name) => {
                if self.peek() == &TokenKind::LeftParen {
                    return Err(CompileError::syntax(
                        token.position,
                        format!("'@{name}' is a variable and cannot be called"),
                    ));
                }
                self.variable(name, token.position)
            }
            TokenKind::Identifier(name) if self.peek() == &TokenKind::LeftParen => {
                self.call(&name, token.position)
            }
            TokenKind::Identifier(name) => self.variable(name, token.position),
            TokenKind::LeftParen => {
                let inner = self.ternary()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            other => Err(CompileError::syntax(
                token.position,
                format!("expected an expression, found {other}"),
            )),
        }
    }

    fn call(&mut self, name: &str, position: usize) -> Result<Expr, CompileError> {
        let function = BuiltinFunction::from_name(name).ok_or_else(|| {
            CompileError::syntax(position, format!("unknown function '{name}'"))
        })?;
        self.expect(TokenKind::LeftParen)?;
        let mut args = vec![];
        if !self.eat(&TokenKind::RightParen) {
            loop {
                args.push(self.ternary()?);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RightParen)?;
                break;
            }
        }
        function
            .check_arity(args.len())
            .map_err(|msg| CompileError::syntax(position, msg))?;
        Ok(Expr::Call { function, args })
    }

    fn variable(&mut self, name: String, position: usize) -> Result<Expr, CompileError> {
        let mut indices = vec![];
        if self.eat(&TokenKind::LeftBracket) {
            loop {
                let token = self.advance();
                let index = match &token.kind {
                    TokenKind::Identifier(keyword) => {
                        IndexArg::from_keyword(keyword).ok_or_else(|| {
                            CompileError::syntax(
                                token.position,
                                format!(
                                    "unknown index '{keyword}', expected one of alt, orig, dest, period"
                                ),
                            )
                        })?
                    }
                    TokenKind::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 => {
                        IndexArg::Literal(*n as u32)
                    }
                    other => {
                        return Err(CompileError::syntax(
                            token.position,
                            format!("expected an index, found {other}"),
                        ))
                    }
                };
                indices.push(index);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RightBracket)?;
                break;
            }
        }
        Ok(Expr::Variable {
            name,
            indices,
            position,
        })
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, position: usize) -> Box<Expr> {
        Box::new(Expr::Variable {
            name: name.into(),
            indices: vec![],
            position,
        })
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse("a + b * c").expect("test invariant failed");
        let expected = Expr::Binary {
            op: BinaryOp::Add,
            lhs: var("a", 0),
            rhs: Box::new(Expr::Binary {
                op: BinaryOp::Multiply,
                lhs: var("b", 4),
                rhs: var("c", 8),
            }),
        };
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("2 ^ 3 ^ 2").expect("test invariant failed");
        match expr {
            Expr::Binary {
                op: BinaryOp::Power,
                lhs,
                rhs,
            } => {
                assert_eq!(*lhs, Expr::Constant(2.0));
                assert!(matches!(
                    *rhs,
                    Expr::Binary {
                        op: BinaryOp::Power,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn test_ternary_is_loosest() {
        let expr = parse("@a == 1 || @b ? 1 : 2").expect("test invariant failed");
        match expr {
            Expr::Conditional { condition, .. } => {
                assert!(matches!(
                    *condition,
                    Expr::Binary {
                        op: BinaryOp::Or,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn test_indexed_variable() {
        let expr = parse("@sov_time[dest, orig, 2]").expect("test invariant failed");
        assert_eq!(
            expr,
            Expr::Variable {
                name: "sov_time".into(),
                indices: vec![
                    IndexArg::Destination,
                    IndexArg::Origin,
                    IndexArg::Literal(2)
                ],
                position: 0
            }
        );
    }

    #[test]
    fn test_function_call() {
        let expr = parse("max(@a, 0, -1)").expect("test invariant failed");
        match expr {
            Expr::Call { function, args } => {
                assert_eq!(function, BuiltinFunction::Max);
                assert_eq!(args.len(), 3);
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn test_deep_nesting_is_a_syntax_error() {
        let parens = format!("{}1{}", "(".repeat(3_000), ")".repeat(3_000));
        match parse(&parens) {
            Err(CompileError::SyntaxError { position, message }) => {
                assert_eq!(position, MAX_NESTING_DEPTH);
                assert_eq!(message, "expression nested too deeply");
            }
            other => panic!("expected syntax error, found {other:?}"),
        }
        let negations = format!("{}1", "-".repeat(3_000));
        assert!(matches!(
            parse(&negations),
            Err(CompileError::SyntaxError { .. })
        ));
        let powers = vec!["2"; 3_000].join("^");
        assert!(matches!(
            parse(&powers),
            Err(CompileError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let depth = MAX_NESTING_DEPTH - 10;
        let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            parse(&text).expect("test invariant failed"),
            Expr::Constant(1.0)
        );
    }

    #[test]
    fn test_syntax_error_positions() {
        let cases = [
            ("1 +", 3),
            ("(1 + 2", 6),
            ("1 2", 2),
            ("foo(1)", 0),
            ("ln(1, 2)", 0),
            ("@x[north]", 3),
            ("@x[]", 3),
            ("@f(1)", 0),
            ("@a ? 1", 6),
        ];
        for (text, expected) in cases {
            match parse(text) {
                Err(CompileError::SyntaxError { position, .. }) => {
                    assert_eq!(position, expected, "position for '{text}'")
                }
                other => panic!("expected syntax error for '{text}', found {other:?}"),
            }
        }
    }
}
