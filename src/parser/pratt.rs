//! Pratt parser for configuration expressions
//!
//! Binary operators are driven by a precedence table; primary expressions,
//! postfix chains (member access, calls, non-null assertions) and prefix
//! operators are parsed by dedicated methods. Type-only syntax is consumed
//! and wrapped in [`ExpressionNode::TypeAssertion`] so evaluation can ignore it.

use smallvec::SmallVec;

use super::error::{ParseError, ParseResult};
use super::lexer::TokenStream;
use super::span::{Spanned, helpers};
use super::tokenizer::{TemplateToken, Token, Tokenizer};
use crate::ast::{
    ArrayElement, BinaryOperator, Expression, ExpressionNode, LiteralValue, ObjectMember,
    PropertyKey, UnaryOperator,
};
use crate::model::coercion::number_to_string;

/// Operator precedence levels (higher = tighter binding)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Conditional `a ? b : c` and arrow functions
    Conditional = 1,
    /// `||` and `??`
    LogicalOr = 2,
    /// `&&`
    LogicalAnd = 3,
    /// `==`, `!=`, `===`, `!==`
    Equality = 4,
    /// `<`, `<=`, `>`, `>=`, `as`, `satisfies`
    Relational = 5,
    /// `+`, `-`
    Additive = 6,
    /// `*`, `/`, `%`
    Multiplicative = 7,
    /// `**` (right associative)
    Exponent = 8,
    /// Prefix `!`, `-`, `+`, `typeof`
    Unary = 9,
    /// Member access, calls, postfix `!`
    Postfix = 10,
}

impl Precedence {
    /// Get the next higher precedence level for left-associative operators
    pub const fn next_level(self) -> Self {
        match self {
            Precedence::Conditional => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Exponent,
            Precedence::Exponent => Precedence::Unary,
            Precedence::Unary => Precedence::Postfix,
            Precedence::Postfix => Precedence::Postfix,
        }
    }

    /// Check if this precedence is right associative
    pub const fn is_right_associative(self) -> bool {
        matches!(self, Precedence::Exponent | Precedence::Conditional)
    }
}

fn get_precedence(token: &Token<'_>) -> Option<Precedence> {
    match token {
        Token::Or | Token::Coalesce => Some(Precedence::LogicalOr),
        Token::And => Some(Precedence::LogicalAnd),
        Token::Equal | Token::NotEqual | Token::StrictEqual | Token::StrictNotEqual => {
            Some(Precedence::Equality)
        }
        Token::LessThan
        | Token::LessThanOrEqual
        | Token::GreaterThan
        | Token::GreaterThanOrEqual => Some(Precedence::Relational),
        Token::Plus | Token::Minus => Some(Precedence::Additive),
        Token::Multiply | Token::Divide | Token::Percent => Some(Precedence::Multiplicative),
        Token::Power => Some(Precedence::Exponent),
        _ => None,
    }
}

fn token_to_binary_op(token: &Token<'_>) -> Option<BinaryOperator> {
    match token {
        Token::Or => Some(BinaryOperator::Or),
        Token::Coalesce => Some(BinaryOperator::Coalesce),
        Token::And => Some(BinaryOperator::And),
        Token::Equal => Some(BinaryOperator::Equal),
        Token::NotEqual => Some(BinaryOperator::NotEqual),
        Token::StrictEqual => Some(BinaryOperator::StrictEqual),
        Token::StrictNotEqual => Some(BinaryOperator::StrictNotEqual),
        Token::LessThan => Some(BinaryOperator::LessThan),
        Token::LessThanOrEqual => Some(BinaryOperator::LessThanOrEqual),
        Token::GreaterThan => Some(BinaryOperator::GreaterThan),
        Token::GreaterThanOrEqual => Some(BinaryOperator::GreaterThanOrEqual),
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Subtract),
        Token::Multiply => Some(BinaryOperator::Multiply),
        Token::Divide => Some(BinaryOperator::Divide),
        Token::Percent => Some(BinaryOperator::Modulo),
        Token::Power => Some(BinaryOperator::Exponent),
        _ => None,
    }
}

/// Words that cannot start an expression we can fold
const UNSUPPORTED_EXPRESSION_KEYWORDS: &[&str] = &[
    "function", "class", "new", "this", "super", "await", "yield", "void", "delete", "async",
];

/// Prefix operators in type position
const TYPE_OPERATORS: &[&str] = &["keyof", "typeof", "readonly", "unique", "infer", "new", "asserts"];

/// Recursive-descent / Pratt parser over a token stream.
///
/// Module-level parsing (imports, declarations) lives in `module.rs` as a
/// second `impl` block on the same type.
pub struct Parser<'input> {
    pub(super) stream: TokenStream<'input>,
}

impl<'input> Parser<'input> {
    /// Tokenize `source` and create a parser over it
    pub fn new(source: &'input str) -> ParseResult<Self> {
        let tokens = Tokenizer::new(source).tokenize_all()?;
        Ok(Self {
            stream: TokenStream::new(source, tokens),
        })
    }

    /// Create a parser over `source[start..end]` with absolute offsets
    fn with_range(source: &'input str, start: usize, end: usize) -> ParseResult<Self> {
        let tokens = Tokenizer::with_range(source, start, end).tokenize_all()?;
        Ok(Self {
            stream: TokenStream::new(source, tokens),
        })
    }

    /// Parse a full expression (conditional level)
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_expression_with_precedence(Precedence::Conditional)
    }

    /// Fail unless every token was consumed
    pub fn expect_eof(&self) -> ParseResult<()> {
        if self.stream.is_eof() {
            Ok(())
        } else {
            Err(self.stream.unexpected())
        }
    }

    /// Core Pratt loop
    pub fn parse_expression_with_precedence(
        &mut self,
        min_precedence: Precedence,
    ) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(token) = self.stream.peek_token() else {
                break;
            };

            if matches!(token, Token::Question) {
                if min_precedence > Precedence::Conditional {
                    break;
                }
                self.stream.next();
                let then_expr = self.parse_expression()?;
                self.stream.expect(Token::Colon)?;
                let else_expr = self.parse_expression_with_precedence(Precedence::Conditional)?;
                let start = left.start;
                let end = else_expr.end;
                left = Spanned::new(
                    ExpressionNode::conditional(left, then_expr, else_expr),
                    start,
                    end,
                );
                continue;
            }

            if (token.is_word("as") || token.is_word("satisfies"))
                && !self.stream.newline_before()
            {
                if min_precedence > Precedence::Relational {
                    break;
                }
                self.stream.next();
                self.skip_type()?;
                let start = left.start;
                let end = self.stream.previous_end();
                left = Spanned::new(ExpressionNode::type_assertion(left), start, end);
                continue;
            }

            let Some(precedence) = get_precedence(token) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let Some(op) = token_to_binary_op(token) else {
                break;
            };
            self.stream.next();

            let next_min = if precedence.is_right_associative() {
                precedence
            } else {
                precedence.next_level()
            };
            let right = self.parse_expression_with_precedence(next_min)?;
            let span = helpers::between(&left, &right, ());
            left = span.map(|()| ExpressionNode::binary_op(op, left, right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.stream.peek() else {
            return Err(self.stream.unexpected());
        };
        let start = token.start;

        let op = match &token.value {
            Token::Not => Some(UnaryOperator::Not),
            Token::Minus => Some(UnaryOperator::Negate),
            Token::Plus => Some(UnaryOperator::Plus),
            Token::Identifier("typeof") => Some(UnaryOperator::TypeOf),
            _ => None,
        };

        if let Some(op) = op {
            self.stream.next();
            let operand = self.parse_unary()?;
            if self.stream.check(&Token::Power) {
                return Err(ParseError::syntax(
                    "Unary operator used immediately before exponentiation expression; use parentheses",
                    self.stream.offset(),
                ));
            }
            let end = operand.end;
            return Ok(Spanned::new(ExpressionNode::unary_op(op, operand), start, end));
        }

        // `<Type>expr` assertion
        if matches!(token.value, Token::LessThan) {
            self.skip_balanced(Token::LessThan, Token::GreaterThan)?;
            let operand = self.parse_unary()?;
            let end = operand.end;
            return Ok(Spanned::new(ExpressionNode::type_assertion(operand), start, end));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expression) -> ParseResult<Expression> {
        loop {
            let Some(token) = self.stream.peek_token() else {
                break;
            };
            let start = expr.start;
            match token {
                Token::Dot => {
                    self.stream.next();
                    let name = self.parse_property_name()?;
                    expr = Spanned::new(
                        ExpressionNode::member(expr, name.value, false),
                        start,
                        name.end,
                    );
                }
                Token::QuestionDot => {
                    self.stream.next();
                    match self.stream.peek_token() {
                        Some(Token::LeftBracket) => {
                            self.stream.next();
                            let index = self.parse_expression()?;
                            let close = self.stream.expect(Token::RightBracket)?;
                            expr = Spanned::new(
                                ExpressionNode::index(expr, index, true),
                                start,
                                close.end,
                            );
                        }
                        Some(Token::LeftParen) => {
                            return Err(ParseError::syntax(
                                "Optional calls are not supported",
                                self.stream.offset(),
                            ));
                        }
                        _ => {
                            let name = self.parse_property_name()?;
                            expr = Spanned::new(
                                ExpressionNode::member(expr, name.value, true),
                                start,
                                name.end,
                            );
                        }
                    }
                }
                Token::LeftBracket => {
                    self.stream.next();
                    let index = self.parse_expression()?;
                    let close = self.stream.expect(Token::RightBracket)?;
                    expr = Spanned::new(
                        ExpressionNode::index(expr, index, false),
                        start,
                        close.end,
                    );
                }
                Token::LeftParen => {
                    self.stream.next();
                    let args = self.parse_arguments()?;
                    let end = self.stream.previous_end();
                    expr = Spanned::new(ExpressionNode::call(expr, args), start, end);
                }
                Token::Not if !self.stream.newline_before() => {
                    let bang = self.stream.next().map(|t| t.end).unwrap_or(expr.end);
                    expr = Spanned::new(ExpressionNode::type_assertion(expr), start, bang);
                }
                Token::Template(_) if !self.stream.newline_before() => {
                    return Err(ParseError::syntax(
                        "Tagged templates are not supported",
                        self.stream.offset(),
                    ));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Property name after `.` or `?.`; keywords are allowed
    fn parse_property_name(&mut self) -> ParseResult<Spanned<String>> {
        let name = self.stream.expect_identifier()?;
        Ok(name.map(str::to_string))
    }

    /// Arguments after `(`, consuming the closing `)`
    fn parse_arguments(&mut self) -> ParseResult<SmallVec<[Expression; 2]>> {
        let mut args = SmallVec::new();
        while !self.stream.eat(&Token::RightParen) {
            if self.stream.check(&Token::Ellipsis) {
                return Err(ParseError::syntax(
                    "Spread arguments are not supported",
                    self.stream.offset(),
                ));
            }
            args.push(self.parse_expression()?);
            if !self.stream.eat(&Token::Comma) {
                self.stream.expect(Token::RightParen)?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let Some(token) = self.stream.peek().cloned() else {
            return Err(self.stream.unexpected());
        };
        let (start, end) = (token.start, token.end);

        match token.value {
            Token::Number(n) => {
                self.stream.next();
                Ok(Spanned::new(
                    ExpressionNode::literal(LiteralValue::Number(n)),
                    start,
                    end,
                ))
            }
            Token::String(s) => {
                self.stream.next();
                Ok(Spanned::new(
                    ExpressionNode::literal(LiteralValue::String(s)),
                    start,
                    end,
                ))
            }
            Token::Template(template) => {
                self.stream.next();
                self.parse_template(*template, start, end)
            }
            Token::Identifier(name) => {
                let literal = match name {
                    "true" => Some(LiteralValue::Boolean(true)),
                    "false" => Some(LiteralValue::Boolean(false)),
                    "null" => Some(LiteralValue::Null),
                    _ => None,
                };
                if let Some(literal) = literal {
                    self.stream.next();
                    return Ok(Spanned::new(ExpressionNode::literal(literal), start, end));
                }
                if UNSUPPORTED_EXPRESSION_KEYWORDS.iter().any(|k| *k == name) {
                    return Err(ParseError::syntax(
                        format!("'{name}' expressions are not supported"),
                        start,
                    ));
                }
                self.stream.next();
                if self.stream.check(&Token::Arrow) && !self.stream.newline_before() {
                    self.stream.next();
                    let body = self.parse_arrow_body()?;
                    let end = body.end;
                    return Ok(Spanned::new(
                        ExpressionNode::lambda_single(name, body),
                        start,
                        end,
                    ));
                }
                Ok(Spanned::new(ExpressionNode::identifier(name), start, end))
            }
            Token::LeftParen => {
                if let Some(arrow) = self.try_parse_arrow()? {
                    return Ok(arrow);
                }
                self.stream.next();
                let inner = self.parse_expression()?;
                self.stream.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::LeftBracket => self.parse_array_literal(),
            Token::LeftBrace => self.parse_object_literal(),
            Token::Divide => Err(ParseError::syntax(
                "Regular expression literals are not supported",
                start,
            )),
            _ => Err(self.stream.unexpected()),
        }
    }

    fn parse_template(
        &mut self,
        template: TemplateToken,
        start: usize,
        end: usize,
    ) -> ParseResult<Expression> {
        let source = self.stream.source();
        let mut expressions = Vec::with_capacity(template.substitutions.len());
        for (sub_start, sub_end) in template.substitutions {
            let mut parser = Parser::with_range(source, sub_start, sub_end)?;
            if parser.stream.is_eof() {
                return Err(ParseError::syntax("Empty template substitution", sub_start));
            }
            let expr = parser.parse_expression()?;
            parser.expect_eof()?;
            expressions.push(expr);
        }
        Ok(Spanned::new(
            ExpressionNode::template(template.quasis, expressions),
            start,
            end,
        ))
    }

    /// Try `( params ) [: Type] => body` at the current `(`; restores the
    /// stream and returns `None` if this is an ordinary parenthesized expression.
    fn try_parse_arrow(&mut self) -> ParseResult<Option<Expression>> {
        let saved = self.stream.position();
        let start = self.stream.offset();
        match self.parse_arrow_parameters() {
            Ok(params) if self.stream.check(&Token::Arrow) => {
                self.stream.next();
                let body = self.parse_arrow_body()?;
                let end = body.end;
                Ok(Some(Spanned::new(
                    ExpressionNode::lambda(params, body),
                    start,
                    end,
                )))
            }
            _ => {
                self.stream.reset_to(saved);
                Ok(None)
            }
        }
    }

    fn parse_arrow_parameters(&mut self) -> ParseResult<SmallVec<[String; 2]>> {
        let mut params = SmallVec::new();
        self.stream.expect(Token::LeftParen)?;
        while !self.stream.eat(&Token::RightParen) {
            let name = self.stream.expect_identifier()?;
            params.push(name.value.to_string());
            self.stream.eat(&Token::Question);
            if self.stream.eat(&Token::Colon) {
                self.skip_type()?;
            }
            if self.stream.check(&Token::Assign) {
                return Err(ParseError::syntax(
                    "Default parameter values are not supported",
                    self.stream.offset(),
                ));
            }
            if !self.stream.eat(&Token::Comma) {
                self.stream.expect(Token::RightParen)?;
                break;
            }
        }
        if self.stream.eat(&Token::Colon) {
            self.skip_type_operand()?;
        }
        Ok(params)
    }

    /// Expression body, or a block containing a single `return`
    fn parse_arrow_body(&mut self) -> ParseResult<Expression> {
        if !self.stream.check(&Token::LeftBrace) {
            return self.parse_expression();
        }
        self.stream.next();
        if !self.stream.eat_word("return") {
            return Err(ParseError::syntax(
                "Arrow function blocks must consist of a single return statement",
                self.stream.offset(),
            ));
        }
        let body = self.parse_expression()?;
        self.stream.eat(&Token::Semicolon);
        self.stream.expect(Token::RightBrace)?;
        Ok(body)
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let open = self.stream.expect(Token::LeftBracket)?;
        let mut elements = Vec::new();
        loop {
            if let Some(close) = self.stream.consume_if(|t| matches!(t, Token::RightBracket)) {
                return Ok(Spanned::new(
                    ExpressionNode::Array(elements),
                    open.start,
                    close.end,
                ));
            }
            if self.stream.eat(&Token::Comma) {
                elements.push(ArrayElement::Hole);
                continue;
            }
            let element = if self.stream.eat(&Token::Ellipsis) {
                ArrayElement::Spread(self.parse_expression()?)
            } else {
                ArrayElement::Item(self.parse_expression()?)
            };
            elements.push(element);
            if !self.stream.eat(&Token::Comma) && !self.stream.check(&Token::RightBracket) {
                return Err(self.stream.expected("',' or ']'"));
            }
        }
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expression> {
        let open = self.stream.expect(Token::LeftBrace)?;
        let mut members = Vec::new();
        loop {
            if let Some(close) = self.stream.consume_if(|t| matches!(t, Token::RightBrace)) {
                return Ok(Spanned::new(
                    ExpressionNode::Object(members),
                    open.start,
                    close.end,
                ));
            }
            members.push(self.parse_object_member()?);
            if !self.stream.eat(&Token::Comma) && !self.stream.check(&Token::RightBrace) {
                return Err(self.stream.expected("',' or '}'"));
            }
        }
    }

    fn parse_object_member(&mut self) -> ParseResult<ObjectMember> {
        if self.stream.eat(&Token::Ellipsis) {
            return Ok(ObjectMember::Spread(self.parse_expression()?));
        }

        let Some(token) = self.stream.next() else {
            return Err(self.stream.unexpected());
        };
        let (key, shorthand) = match token.value {
            Token::Identifier(name) => (PropertyKey::Static(name.to_string()), Some(name)),
            Token::String(s) => (PropertyKey::Static(s), None),
            Token::Number(n) => (PropertyKey::Static(number_to_string(n)), None),
            Token::LeftBracket => {
                let computed = self.parse_expression()?;
                self.stream.expect(Token::RightBracket)?;
                (PropertyKey::Computed(Box::new(computed)), None)
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    token: other.to_string(),
                    position: token.start,
                });
            }
        };

        if self.stream.eat(&Token::Colon) {
            let value = self.parse_expression()?;
            return Ok(ObjectMember::Property { key, value });
        }

        match shorthand {
            Some(name)
                if self.stream.check(&Token::Comma) || self.stream.check(&Token::RightBrace) =>
            {
                Ok(ObjectMember::Shorthand(Spanned::new(
                    name.to_string(),
                    token.start,
                    token.end,
                )))
            }
            _ if self.stream.check(&Token::LeftParen) => Err(ParseError::syntax(
                "Methods in object literals are not supported",
                self.stream.offset(),
            )),
            _ => Err(self.stream.expected("':'")),
        }
    }

    /// Consume a balanced `open ... close` group starting at the current token
    pub(super) fn skip_balanced(&mut self, open: Token<'input>, close: Token<'input>) -> ParseResult<()> {
        let start = self.stream.offset();
        self.stream.expect(open.clone())?;
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.stream.next() else {
                return Err(ParseError::UnexpectedEof { position: start });
            };
            if std::mem::discriminant(&token.value) == std::mem::discriminant(&open) {
                depth += 1;
            } else if std::mem::discriminant(&token.value) == std::mem::discriminant(&close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Consume a type annotation (unions, intersections, conditional types)
    pub(super) fn skip_type(&mut self) -> ParseResult<()> {
        self.stream.eat(&Token::Pipe);
        self.stream.eat(&Token::Ampersand);
        loop {
            self.skip_type_operand()?;
            if self.stream.eat(&Token::Pipe) || self.stream.eat(&Token::Ampersand) {
                continue;
            }
            if self.stream.check_word("extends") && !self.stream.newline_before() {
                self.stream.next();
                self.skip_type_operand()?;
                self.stream.expect(Token::Question)?;
                self.skip_type()?;
                self.stream.expect(Token::Colon)?;
                continue;
            }
            return Ok(());
        }
    }

    /// Consume a single type operand (reference, literal, object, tuple, function type)
    pub(super) fn skip_type_operand(&mut self) -> ParseResult<()> {
        // type operators; a bare `keyof` etc. followed by a delimiter is a type name
        while TYPE_OPERATORS.iter().any(|w| self.stream.check_word(w))
            && matches!(
                self.stream.peek_ahead(1).map(|t| &t.value),
                Some(Token::Identifier(_) | Token::LeftBrace | Token::LeftBracket | Token::LeftParen)
            )
        {
            self.stream.next();
        }

        let Some(token) = self.stream.peek_token() else {
            return Err(self.stream.expected("type"));
        };
        match token {
            Token::Identifier(_) => {
                self.stream.next();
                while self.stream.check(&Token::Dot) {
                    self.stream.next();
                    self.stream.expect_identifier()?;
                }
                if self.stream.check(&Token::LessThan) && !self.stream.newline_before() {
                    self.skip_balanced(Token::LessThan, Token::GreaterThan)?;
                }
                if self.stream.check_word("is") && !self.stream.newline_before() {
                    self.stream.next();
                    self.skip_type_operand()?;
                }
            }
            Token::String(_) | Token::Number(_) | Token::Template(_) => {
                self.stream.next();
            }
            Token::Minus => {
                self.stream.next();
                self.stream.expect(Token::Number(0.0))?;
            }
            Token::LeftBrace => self.skip_balanced(Token::LeftBrace, Token::RightBrace)?,
            Token::LeftBracket => self.skip_balanced(Token::LeftBracket, Token::RightBracket)?,
            Token::LessThan => {
                self.skip_balanced(Token::LessThan, Token::GreaterThan)?;
                self.skip_function_type()?;
            }
            Token::LeftParen => self.skip_function_type()?,
            _ => return Err(self.stream.expected("type")),
        }

        // array and indexed access types
        while self.stream.check(&Token::LeftBracket) && !self.stream.newline_before() {
            self.skip_balanced(Token::LeftBracket, Token::RightBracket)?;
        }
        Ok(())
    }

    /// `( ... ) => Type`, or a parenthesized type
    fn skip_function_type(&mut self) -> ParseResult<()> {
        self.skip_balanced(Token::LeftParen, Token::RightParen)?;
        if self.stream.eat(&Token::Arrow) {
            self.skip_type()?;
        }
        Ok(())
    }
}

/// Parse a standalone expression string
pub fn parse_expression(input: &str) -> ParseResult<Expression> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}
