use thiserror::Error;
use tracing::trace;
use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

/// How deeply expressions may nest before the parser gives up on the input.
/// Parsing and evaluation both recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Debug)]
enum Precedence {
    LOWEST,
    EQUALS, // ==
    LessGreater, // > <
    SUM, // +, -
    PRODUCT, // *, /
    PREFIX, // -X, !X
    CALL,
    INDEX
}

fn get_precedence(token: TokenType) -> Precedence {
    match token {
        TokenType::EQ | TokenType::NotEq => Precedence::EQUALS,
        TokenType::LT | TokenType::GT => Precedence::LessGreater,
        TokenType::PLUS | TokenType::MINUS => Precedence::SUM,
        TokenType::ASTERISK | TokenType::SLASH => Precedence::PRODUCT,
        TokenType::LPAREN => Precedence::CALL,
        TokenType::LBRACKET => Precedence::INDEX,
        _ => Precedence::LOWEST
    }
}

/// A diagnostic collected while parsing. Parsing never stops at the first
/// one; callers read them all through [`Parser::errors`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {actual} instead")]
    UnexpectedToken { expected: TokenType, actual: TokenType },

    #[error("no prefix parse function for {0} found")]
    NoPrefixParseFn(TokenType),

    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),

    #[error("expression nested too deeply: max depth {0} exceeded")]
    TooDeep(usize),
}

pub struct Parser {
    l: Lexer,
    errors: Vec<ParseError>,

    cur_token: Token,
    peek_token: Token,

    depth: usize,
    too_deep: bool,
}

impl Parser {

    pub fn new(mut l: Lexer) -> Self {
        // filling cur_token and peek_token
        let cur_token = l.next_token();
        let peek_token = l.next_token();

        Parser {
            l,
            errors: Vec::new(),
            cur_token,
            peek_token,
            depth: 0,
            too_deep: false,
        }
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.l.next_token());
    }

    fn cur_token_is(&self, t: TokenType) -> bool {
        self.cur_token.token_type == t
    }

    fn peek_token_is(&self, t: TokenType) -> bool {
        self.peek_token.token_type == t
    }

    fn expect_peek(&mut self, t: TokenType) -> bool {
        if self.peek_token_is(t) {
            self.next_token();
            true
        } else {
            self.peek_error(t);
            false
        }
    }

    /// Diagnostics in the order they were found. Empty means the last
    /// `parse_program` succeeded.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn peek_error(&mut self, t: TokenType) {
        self.errors.push(ParseError::UnexpectedToken {
            expected: t,
            actual: self.peek_token.token_type,
        })
    }

    fn no_prefix_fn_error(&mut self, t: TokenType) {
        self.errors.push(ParseError::NoPrefixParseFn(t))
    }

    pub fn parse_program(&mut self) -> Program {
        let mut p = Program::default();

        while !self.cur_token_is(TokenType::EOF) {
            if let Some(s) = self.parse_statement() {
                p.statements.push(s)
            }
            self.next_token();
        }
        trace!(statements = p.statements.len(), errors = self.errors.len(), "parsed program");
        p
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            TokenType::LET => self.parse_let_statement(),
            TokenType::RETURN => self.parse_return_statement(),
            _ => self.parse_expression_statement()
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenType::IDENT) {
            return None;
        }

        let name = self.cur_token.literal.clone();

        if !self.expect_peek(TokenType::ASSIGN) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }

        Some(Statement::LetStatement { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let ret_val = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::ReturnStatement(ret_val))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::LOWEST)?;

        if self.peek_token_is(TokenType::SEMICOLON) {
            self.next_token();
        }
        Some(Statement::ExpressionStatement(expression))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        if self.depth >= MAX_NESTING_DEPTH {
            if !self.too_deep {
                self.too_deep = true;
                self.errors.push(ParseError::TooDeep(MAX_NESTING_DEPTH));
            }
            // the rest of the input is dropped, leaving one diagnostic
            while !self.cur_token_is(TokenType::EOF) {
                self.next_token();
            }
            return None;
        }

        self.depth += 1;
        let exp = self.parse_nested_expression(precedence);
        self.depth -= 1;

        if self.too_deep {
            return None;
        }
        exp
    }

    fn parse_nested_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left_exp = match self.cur_token.token_type {
            TokenType::IDENT => self.parse_identifier(),
            TokenType::INT => self.parse_integer_literal(),
            TokenType::STRING => self.parse_string_literal(),
            TokenType::MINUS | TokenType::BANG => self.parse_prefix_expression(),
            TokenType::LBRACKET => self.parse_array_literal(),
            TokenType::LPAREN => self.parse_grouped_expression(),
            TokenType::LBRACE => self.parse_hash_literal(),
            TokenType::TRUE | TokenType::FALSE => self.parse_boolean(),
            TokenType::IF => self.parse_if_expression(),
            TokenType::FUNCTION => self.parse_function_literal(),
            other => {
                self.no_prefix_fn_error(other);
                None
            },
        }?;

        while !self.peek_token_is(TokenType::SEMICOLON) && precedence < self.peek_precedence() {
            left_exp = match self.peek_token.token_type {
                TokenType::PLUS | TokenType::MINUS | TokenType::ASTERISK | TokenType::SLASH |
                    TokenType::EQ | TokenType::NotEq | TokenType::LT | TokenType::GT => {
                    self.next_token();
                    self.parse_infix_expression(left_exp)?
                },
                TokenType::LPAREN => {
                    self.next_token();
                    self.parse_call_expression(left_exp)?
                },
                TokenType::LBRACKET => {
                    self.next_token();
                    self.parse_index_expression(left_exp)?
                },
                _ => return Some(left_exp)
            }
        }
        Some(left_exp)
    }

    fn peek_precedence(&self) -> Precedence {
        get_precedence(self.peek_token.token_type)
    }

    fn cur_precedence(&self) -> Precedence {
        get_precedence(self.cur_token.token_type)
    }

    fn parse_identifier(&self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur_token.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors.push(ParseError::InvalidInteger(self.cur_token.literal.clone()));
                None
            }
        }
    }

    fn parse_string_literal(&self) -> Option<Expression> {
        Some(Expression::String(self.cur_token.literal.clone()))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let op = self.cur_token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::PREFIX)?;
        Some(Expression::PrefixExpression {
            operation: op,
            right: Box::new(right)
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = self.cur_token.literal.clone();

        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::InfixExpression {
            operation: op,
            left: Box::new(left),
            right: Box::new(right)
        })
    }

    fn parse_boolean(&self) -> Option<Expression> {
        Some(Expression::Boolean(self.cur_token_is(TokenType::TRUE)))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        Some(exp)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LPAREN) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::LOWEST)?;
        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        if !self.expect_peek(TokenType::LBRACE) {
            return None;
        }

        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenType::ELSE) {
            self.next_token();
            if !self.expect_peek(TokenType::LBRACE) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Expects `cur_token` on `{`; stops on the matching `}` or at EOF.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();
        while !self.cur_token_is(TokenType::RBRACE) && !self.cur_token_is(TokenType::EOF) {
            if let Some(st) = self.parse_statement() {
                block.statements.push(st);
            }
            self.next_token();
        }
        block
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::LPAREN) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::LBRACE) {
            return None;
        }

        let body = self.parse_block_statement();

        Some(Expression::Function { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if self.peek_token_is(TokenType::RPAREN) {
            self.next_token();
            return Some(params);
        }

        if !self.expect_peek(TokenType::IDENT) {
            return None;
        }
        params.push(self.cur_token.literal.clone());

        while self.peek_token_is(TokenType::COMMA) {
            self.next_token();
            if !self.expect_peek(TokenType::IDENT) {
                return None;
            }
            params.push(self.cur_token.literal.clone());
        }

        if !self.expect_peek(TokenType::RPAREN) {
            return None;
        }
        Some(params)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenType::RPAREN)?;
        Some(Expression::CallExpression { function: Box::new(function), arguments })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list)
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::LOWEST)?);

        while self.peek_token_is(TokenType::COMMA) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::LOWEST)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenType::RBRACKET)?;
        Some(Expression::Array(elements))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::LOWEST)?;

        if !self.expect_peek(TokenType::RBRACKET) {
            return None;
        }

        Some(Expression::IndexExpression { left: Box::new(left), index: Box::new(index) })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenType::RBRACE) {
            self.next_token();
            let key = self.parse_expression(Precedence::LOWEST)?;
            if !self.expect_peek(TokenType::COLON) {
                return None;
            }

            self.next_token();

            let value = self.parse_expression(Precedence::LOWEST)?;
            if !self.peek_token_is(TokenType::RBRACE) && !self.expect_peek(TokenType::COMMA) {
                return None;
            }

            pairs.push((key, value));
        }

        if !self.expect_peek(TokenType::RBRACE) {
            return None;
        }
        Some(Expression::Hash(pairs))
    }
}
