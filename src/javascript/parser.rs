use super::ast::{Block, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement};
use super::tokenizer::{Lexer, Token, TokenKind};
use log::{debug, trace};
use std::collections::HashMap;

/// Binding strength of an infix operator, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,     // == !=
    Comparison, // < > <= >=
    Sum,        // + -
    Product,    // * /
    Prefix,     // -x !x
    Call,       // f(x)
    Property,   // a.b
}

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Option<Expression>;

/// Pratt parser over a lazily lexed token stream.
///
/// The prefix/infix tables are built per instance in `new`, so parsers share
/// no state. Missing tokens never abort parsing: the construct being built is
/// dropped, a diagnostic is recorded, and parsing resumes with the next token.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    prefix_fns: HashMap<TokenKind, PrefixParseFn<'a>>,
    infix_fns: HashMap<TokenKind, (Precedence, InfixParseFn<'a>)>,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::eof(),
            peek: Token::eof(),
            prefix_fns: HashMap::new(),
            infix_fns: HashMap::new(),
            errors: Vec::new(),
        };

        parser.register_prefix(TokenKind::Identifier, Self::parse_identifier);
        parser.register_prefix(TokenKind::Number, Self::parse_number_literal);
        parser.register_prefix(TokenKind::String, Self::parse_string_literal);
        parser.register_prefix(TokenKind::True, Self::parse_boolean_literal);
        parser.register_prefix(TokenKind::False, Self::parse_boolean_literal);
        parser.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::LeftParen, Self::parse_grouped_expression);
        parser.register_prefix(TokenKind::Function, Self::parse_function_literal);
        parser.register_prefix(TokenKind::If, Self::parse_if_expression);

        use Precedence::*;
        parser.register_infix(TokenKind::Plus, Sum, Self::parse_infix_expression);
        parser.register_infix(TokenKind::Minus, Sum, Self::parse_infix_expression);
        parser.register_infix(TokenKind::Star, Product, Self::parse_infix_expression);
        parser.register_infix(TokenKind::Slash, Product, Self::parse_infix_expression);
        parser.register_infix(TokenKind::DoubleEquals, Equals, Self::parse_infix_expression);
        parser.register_infix(TokenKind::NotEquals, Equals, Self::parse_infix_expression);
        parser.register_infix(TokenKind::LessThan, Comparison, Self::parse_infix_expression);
        parser.register_infix(TokenKind::GreaterThan, Comparison, Self::parse_infix_expression);
        parser.register_infix(TokenKind::LessThanEquals, Comparison, Self::parse_infix_expression);
        parser.register_infix(TokenKind::GreaterThanEquals, Comparison, Self::parse_infix_expression);
        parser.register_infix(TokenKind::LeftParen, Call, Self::parse_call_expression);
        parser.register_infix(TokenKind::Dot, Property, Self::parse_property_expression);

        // Fill current and peek
        parser.next_token();
        parser.next_token();
        parser
    }

    fn register_prefix(&mut self, kind: TokenKind, f: PrefixParseFn<'a>) {
        self.prefix_fns.insert(kind, f);
    }

    fn register_infix(&mut self, kind: TokenKind, precedence: Precedence, f: InfixParseFn<'a>) {
        self.infix_fns.insert(kind, (precedence, f));
    }

    /// Diagnostics for every construct dropped so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            self.error(format!(
                "expected next token to be {:?}, got {:?} ({:?}) instead",
                kind, self.peek.kind, self.peek.literal
            ));
            false
        }
    }

    fn error(&mut self, message: String) {
        debug!(target: "javascript", "Parse error: {}", message);
        self.errors.push(message);
    }

    fn peek_precedence(&self) -> Precedence {
        self.infix_fns
            .get(&self.peek.kind)
            .map(|(precedence, _)| *precedence)
            .unwrap_or(Precedence::Lowest)
    }

    fn current_precedence(&self) -> Precedence {
        self.infix_fns
            .get(&self.current.kind)
            .map(|(precedence, _)| *precedence)
            .unwrap_or(Precedence::Lowest)
    }

    /// Consumes the rest of the token stream. Once it returns, the lexer sits
    /// at end of input and any further call yields an empty program.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenKind::EOF) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        debug!(target: "javascript", "Parsed {} statement(s), {} error(s)", statements.len(), self.errors.len());
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        trace!(target: "javascript", "Parsing statement, current token: {:?}", self.current);
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LeftBrace => Some(Statement::Block(self.parse_block())),
            // Empty statement
            TokenKind::Semicolon => None,
            _ => self.parse_expression_statement(),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let name = Identifier(self.current.literal.clone());

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_semicolon();

        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if matches!(
            self.peek.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::EOF
        ) {
            self.skip_semicolon();
            return Some(Statement::Return(None));
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_semicolon();

        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest);
        self.skip_semicolon();
        Some(Statement::Expression(expr))
    }

    /// Expects `current` to be `{`; stops on the matching `}` or end of input.
    fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        self.next_token();

        while !self.current_is(TokenKind::RightBrace) && !self.current_is(TokenKind::EOF) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        Block { statements }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_fns.get(&self.current.kind).copied() else {
            self.error(format!(
                "no prefix parse function for {:?} ({:?})",
                self.current.kind, self.current.literal
            ));
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some((_, infix)) = self.infix_fns.get(&self.peek.kind).copied() else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier(self.current.literal.clone())))
    }

    fn parse_number_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<f64>() {
            Ok(n) => Some(Expression::Number(n)),
            Err(e) => {
                self.error(format!("could not parse {:?} as number: {}", self.current.literal, e));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(self.current.literal.clone()))
    }

    fn parse_boolean_literal(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.current_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let op = match self.current.kind {
            TokenKind::Bang => PrefixOperator::Not,
            _ => PrefixOperator::Negative,
        };
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = match self.current.kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Subtract,
            TokenKind::Star => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::DoubleEquals => InfixOperator::Equal,
            TokenKind::NotEquals => InfixOperator::NotEqual,
            TokenKind::LessThan => InfixOperator::LessThan,
            TokenKind::GreaterThan => InfixOperator::GreaterThan,
            TokenKind::LessThanEquals => InfixOperator::LessThanEqual,
            TokenKind::GreaterThanEquals => InfixOperator::GreaterThanEqual,
            kind => {
                self.error(format!("{:?} is not an infix operator", kind));
                return None;
            }
        };
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_property_expression(&mut self, object: Expression) -> Option<Expression> {
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        Some(Expression::Property {
            object: Box::new(object),
            property: Identifier(self.current.literal.clone()),
        })
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let arguments =
            self.parse_delimited(TokenKind::RightParen, |p| p.parse_expression(Precedence::Lowest))?;
        Some(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }
        let params = self.parse_delimited(TokenKind::RightParen, Self::parse_parameter)?;

        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Expression::Function { params, body })
    }

    fn parse_parameter(&mut self) -> Option<Identifier> {
        if self.current_is(TokenKind::Identifier) {
            Some(Identifier(self.current.literal.clone()))
        } else {
            self.error(format!(
                "expected parameter name, got {:?} ({:?})",
                self.current.kind, self.current.literal
            ));
            None
        }
    }

    /// Parses `item (, item)*` up to `end`. `current` must be the opening
    /// delimiter; on success `current` is `end`.
    fn parse_delimited<T>(
        &mut self,
        end: TokenKind,
        item: impl Fn(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(item(self)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(item(self)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LeftParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RightParen) || !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }
}

pub fn parse(source: &str) -> Program {
    let mut parser = Parser::new(Lexer::new(source));
    parser.parse_program()
}
