//! Script parser
//!
//! This module implements a recursive descent parser for the script subset
//! evaluated by the bundled interpreter. It produces an AST from a stream of
//! tokens and reports the first syntax error it meets.

use crate::ast::*;
use crate::error::{messages, Error, Result, SourceLocation};
use crate::lexer::{number_value, string_value, Keyword, Lexer, Token, TokenKind};
use crate::runtime::convert::number_to_string;
use std::rc::Rc;

/// A recursive descent parser
pub struct Parser<'src> {
    /// Source code (kept for error messages)
    source: &'src str,
    /// Tokens to parse
    tokens: Vec<Token<'src>>,
    /// Current position in tokens
    pos: usize,
    /// Parsing strict mode code
    strict: bool,
    /// Parsing a function body
    in_function: bool,
}

impl<'src> Parser<'src> {
    /// Create a new parser from source code
    pub fn new(source: &'src str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
            strict: false,
            in_function: false,
        })
    }

    /// Parse the source as a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let start = self.location();
        let (strict, mut body) = self.parse_directive_prologue()?;
        self.strict = strict;
        while !self.is_eof() {
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            body,
            strict,
            span: Span::new(start, self.location()),
        })
    }

    /// Parse a single expression
    pub fn parse_expression(&mut self) -> Result<Expression> {
        let expression = self.parse_sequence()?;
        if !self.is_eof() {
            return Err(self.unexpected());
        }
        Ok(expression)
    }

    /// Parse leading string-literal statements, detecting "use strict"
    fn parse_directive_prologue(&mut self) -> Result<(bool, Vec<Statement>)> {
        let mut strict = self.strict;
        let mut body = Vec::new();
        while self.peek() == TokenKind::StringLiteral && self.directive_ends_at(self.pos + 1) {
            let text = self.current().text;
            if text == "\"use strict\"" || text == "'use strict'" {
                strict = true;
            }
            body.push(self.parse_statement()?);
        }
        Ok((strict, body))
    }

    fn directive_ends_at(&self, index: usize) -> bool {
        match self.tokens.get(index) {
            Some(token) => {
                matches!(
                    token.kind,
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
                ) || token.newline_before
            }
            None => true,
        }
    }

    // ========== Token Access ==========

    fn current(&self) -> &Token<'src> {
        &self.tokens[self.pos]
    }

    fn peek(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    fn is_eof(&self) -> bool {
        self.peek() == TokenKind::Eof
    }

    fn location(&self) -> SourceLocation {
        self.current().location
    }

    /// Create a parse error with source context
    fn error(&self, message: impl Into<String>, location: SourceLocation) -> Error {
        Error::parse_error_with_context(message, location, self.source)
    }

    /// Error for the current token
    fn unexpected(&self) -> Error {
        let token = self.current();
        let message = match token.kind {
            TokenKind::Eof => messages::UNEXPECTED_END.to_string(),
            _ => messages::unexpected_token(token.text),
        };
        self.error(message, token.location)
    }

    fn advance(&mut self) -> &Token<'src> {
        let index = self.pos;
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token<'src>> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Automatic semicolon insertion: `;`, `}`, end of input or a preceding newline
    fn consume_semicolon(&mut self) -> Result<()> {
        if self.consume(TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.current();
        if matches!(token.kind, TokenKind::RightBrace | TokenKind::Eof) || token.newline_before {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn parse_identifier(&mut self) -> Result<Identifier> {
        let token = self.expect(TokenKind::Identifier)?;
        let location = token.location;
        let name = token.text.to_string();
        Ok(Identifier::new(name, Span::new(location, location)))
    }

    // ========== Statements ==========

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            TokenKind::LeftBrace => self.parse_block().map(Statement::Block),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Keyword(Keyword::Var) => self.parse_variable_declaration(VariableKind::Var),
            TokenKind::Keyword(Keyword::Let) => self.parse_variable_declaration(VariableKind::Let),
            TokenKind::Keyword(Keyword::Const) => {
                self.parse_variable_declaration(VariableKind::Const)
            }
            TokenKind::Keyword(Keyword::Function) => {
                let function = self.parse_function(true)?;
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw_statement(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try_statement(),
            _ => {
                let expression = self.parse_sequence()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        self.expect(TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while self.peek() != TokenKind::RightBrace {
            if self.is_eof() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_variable_declaration(&mut self, kind: VariableKind) -> Result<Statement> {
        self.advance(); // var / let / const
        let mut declarations = Vec::new();
        loop {
            let id = self.parse_identifier()?;
            let init = if self.consume(TokenKind::Equals) {
                Some(self.parse_assignment()?)
            } else if kind == VariableKind::Const {
                let location = self.location();
                return Err(self.error("Missing initializer in const declaration", location));
            } else {
                None
            };
            declarations.push(VariableDeclarator { id, init });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            kind,
            declarations,
        }))
    }

    fn parse_function(&mut self, is_declaration: bool) -> Result<FunctionRef> {
        let start = self.location();
        self.advance(); // function

        let id = if self.peek() == TokenKind::Identifier {
            Some(self.parse_identifier()?)
        } else if is_declaration {
            return Err(self.unexpected());
        } else {
            None
        };

        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while self.peek() != TokenKind::RightParen {
            params.push(self.parse_identifier()?);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        self.expect(TokenKind::LeftBrace)?;
        let outer = (self.strict, self.in_function);
        self.in_function = true;
        let body = self.parse_function_body();
        (self.strict, self.in_function) = outer;
        let (strict, body) = body?;

        Ok(Rc::new(Function {
            id,
            params,
            body,
            strict,
            span: Span::new(start, self.location()),
        }))
    }

    fn parse_function_body(&mut self) -> Result<(bool, Vec<Statement>)> {
        let (strict, mut body) = self.parse_directive_prologue()?;
        self.strict = strict;
        while self.peek() != TokenKind::RightBrace {
            if self.is_eof() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok((strict, body))
    }

    fn parse_if_statement(&mut self) -> Result<Statement> {
        self.advance(); // if
        self.expect(TokenKind::LeftParen)?;
        let test = self.parse_sequence()?;
        self.expect(TokenKind::RightParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.consume(TokenKind::Keyword(Keyword::Else)) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Statement::If(Box::new(IfStatement {
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        if !self.in_function {
            let location = self.location();
            return Err(self.error("Illegal return statement", location));
        }
        self.advance(); // return
        let token = self.current();
        let argument = if matches!(
            token.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || token.newline_before
        {
            None
        } else {
            Some(self.parse_sequence()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(argument))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement> {
        self.advance(); // throw
        if self.current().newline_before {
            let location = self.location();
            return Err(self.error("Illegal newline after throw", location));
        }
        let argument = self.parse_sequence()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(argument))
    }

    fn parse_try_statement(&mut self) -> Result<Statement> {
        self.advance(); // try
        let block = self.parse_block()?;

        let handler = if self.consume(TokenKind::Keyword(Keyword::Catch)) {
            let param = if self.consume(TokenKind::LeftParen) {
                let param = self.parse_identifier()?;
                self.expect(TokenKind::RightParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.consume(TokenKind::Keyword(Keyword::Finally)) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            let location = self.location();
            return Err(self.error("Missing catch or finally after try", location));
        }
        Ok(Statement::Try(Box::new(TryStatement {
            block,
            handler,
            finalizer,
        })))
    }

    // ========== Expressions ==========

    fn parse_sequence(&mut self) -> Result<Expression> {
        let first = self.parse_assignment()?;
        if self.peek() != TokenKind::Comma {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.consume(TokenKind::Comma) {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(expressions))
    }

    fn parse_assignment(&mut self) -> Result<Expression> {
        let start = self.location();
        let left = self.parse_conditional()?;
        let kind = self.peek();
        if !kind.is_assignment_operator() {
            return Ok(left);
        }
        let operator = match kind {
            TokenKind::PlusEquals => AssignmentOperator::Compound(BinaryOperator::Add),
            TokenKind::MinusEquals => AssignmentOperator::Compound(BinaryOperator::Sub),
            TokenKind::StarEquals => AssignmentOperator::Compound(BinaryOperator::Mul),
            TokenKind::SlashEquals => AssignmentOperator::Compound(BinaryOperator::Div),
            TokenKind::PercentEquals => AssignmentOperator::Compound(BinaryOperator::Mod),
            _ => AssignmentOperator::Assign,
        };
        let target = match left {
            Expression::Identifier(id) => AssignmentTarget::Identifier(id),
            Expression::Member(member) => AssignmentTarget::Member(member),
            _ => return Err(self.error(messages::INVALID_ASSIGNMENT_TARGET, start)),
        };
        self.advance();
        let value = self.parse_assignment()?;
        Ok(Expression::Assignment(Box::new(AssignmentExpression {
            operator,
            target,
            value,
        })))
    }

    fn parse_conditional(&mut self) -> Result<Expression> {
        let test = self.parse_logical_or()?;
        if !self.consume(TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional(Box::new(ConditionalExpression {
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_logical_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_logical_and()?;
        while self.consume(TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = Expression::Logical(Box::new(LogicalExpression {
                operator: LogicalOperator::Or,
                left,
                right,
            }));
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_equality()?;
        while self.consume(TokenKind::AmpersandAmpersand) {
            let right = self.parse_equality()?;
            left = Expression::Logical(Box::new(LogicalExpression {
                operator: LogicalOperator::And,
                left,
                right,
            }));
        }
        Ok(left)
    }

    /// Parse a left-associative binary level
    fn parse_binary_level(
        &mut self,
        operator_for: fn(TokenKind) -> Option<BinaryOperator>,
        next: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut left = next(self)?;
        while let Some(operator) = operator_for(self.peek()) {
            self.advance();
            let right = next(self)?;
            left = Expression::Binary(Box::new(BinaryExpression {
                operator,
                left,
                right,
            }));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::EqualsEquals => Some(BinaryOperator::Equal),
                TokenKind::BangEquals => Some(BinaryOperator::NotEqual),
                TokenKind::EqualsEqualsEquals => Some(BinaryOperator::StrictEqual),
                TokenKind::BangEqualsEquals => Some(BinaryOperator::StrictNotEqual),
                _ => None,
            },
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Less => Some(BinaryOperator::Less),
                TokenKind::Greater => Some(BinaryOperator::Greater),
                TokenKind::LessEquals => Some(BinaryOperator::LessEq),
                TokenKind::GreaterEquals => Some(BinaryOperator::GreaterEq),
                _ => None,
            },
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Plus => Some(BinaryOperator::Add),
                TokenKind::Minus => Some(BinaryOperator::Sub),
                _ => None,
            },
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        self.parse_binary_level(
            |kind| match kind {
                TokenKind::Star => Some(BinaryOperator::Mul),
                TokenKind::Slash => Some(BinaryOperator::Div),
                TokenKind::Percent => Some(BinaryOperator::Mod),
                _ => None,
            },
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        let operator = match self.peek() {
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Keyword(Keyword::Typeof) => UnaryOperator::Typeof,
            TokenKind::Keyword(Keyword::Void) => UnaryOperator::Void,
            _ => return self.parse_call_member(),
        };
        self.advance();
        let argument = self.parse_unary()?;
        Ok(Expression::Unary(Box::new(UnaryExpression { operator, argument })))
    }

    fn parse_call_member(&mut self) -> Result<Expression> {
        let mut expression = self.parse_primary()?;
        loop {
            let start = self.location();
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let token = self.current();
                    let name = match token.kind {
                        TokenKind::Identifier | TokenKind::Keyword(_) => token.text.to_string(),
                        _ => return Err(self.unexpected()),
                    };
                    self.advance();
                    expression = Expression::Member(Box::new(MemberExpression {
                        object: expression,
                        property: MemberProperty::Named(name),
                        span: Span::new(start, self.location()),
                    }));
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = self.parse_sequence()?;
                    self.expect(TokenKind::RightBracket)?;
                    expression = Expression::Member(Box::new(MemberExpression {
                        object: expression,
                        property: MemberProperty::Computed(property),
                        span: Span::new(start, self.location()),
                    }));
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let mut arguments = Vec::new();
                    while self.peek() != TokenKind::RightParen {
                        arguments.push(self.parse_assignment()?);
                        if !self.consume(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RightParen)?;
                    expression = Expression::Call(Box::new(CallExpression {
                        callee: expression,
                        arguments,
                        span: Span::new(start, self.location()),
                    }));
                }
                _ => return Ok(expression),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.current();
        let location = token.location;
        match token.kind {
            TokenKind::Identifier => Ok(Expression::Identifier(self.parse_identifier()?)),
            TokenKind::NumberLiteral => {
                let value = number_value(token.text);
                self.advance();
                Ok(Expression::Literal(Literal::Number(value)))
            }
            TokenKind::StringLiteral => {
                let value = string_value(token.text, location)
                    .map_err(|e| e.with_source_context(self.source))?;
                self.advance();
                Ok(Expression::Literal(Literal::String(value)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Ok(Expression::This(Span::new(location, location)))
            }
            TokenKind::Keyword(Keyword::Function) => {
                Ok(Expression::Function(self.parse_function(false)?))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.parse_sequence()?;
                self.expect(TokenKind::RightParen)?;
                Ok(expression)
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression> {
        self.advance(); // [
        let mut elements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RightBracket => break,
                TokenKind::Comma => {
                    self.advance();
                    elements.push(None);
                }
                _ => {
                    elements.push(Some(self.parse_assignment()?));
                    if !self.consume(TokenKind::Comma) {
                        break;
                    }
                }
            }
        }
        self.expect(TokenKind::RightBracket)?;
        Ok(Expression::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expression> {
        self.advance(); // {
        let mut properties = Vec::new();
        while self.peek() != TokenKind::RightBrace {
            let token = self.current();
            let key = match token.kind {
                TokenKind::Identifier | TokenKind::Keyword(_) => token.text.to_string(),
                TokenKind::StringLiteral => string_value(token.text, token.location)
                    .map_err(|e| e.with_source_context(self.source))?,
                TokenKind::NumberLiteral => number_to_string(number_value(token.text)),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assignment()?;
            properties.push(Property { key, value });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(Expression::Object(properties))
    }
}

/// Parse source code into an AST
pub fn parse(source: &str) -> Result<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Parse a single expression
pub fn parse_expression(source: &str) -> Result<Expression> {
    let mut parser = Parser::new(source)?;
    parser.parse_expression()
}
