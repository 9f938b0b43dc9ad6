use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token};
use thiserror::Error;

/// Parser error type. Only used internally: every error is turned into an
/// [`AstNode::Unsupported`] fragment by the recovery logic.
#[derive(Debug, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

/// Recursive descent parser for the teaching subset.
///
/// Parsing never fails as a whole. When a statement or top-level item cannot be
/// parsed, the parser skips to the end of it (the next `;` or the end of a
/// balanced `{ … }` block) and records the skipped source as
/// [`AstNode::Unsupported`].
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    lines: Vec<String>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Self {
            tokens,
            position: 0,
            lines: source.lines().map(str::to_string).collect(),
        }
    }

    /// Parse the entire program (functions, prototypes and driver statements)
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.is_at_end() {
            let start = self.position;
            let node = match self.parse_top_level_declaration() {
                Ok(node) => node,
                Err(err) => self.recover(start, err),
            };
            program.nodes.push(node);
        }

        program
    }

    /// Parse a function definition, prototype, or a driver statement
    fn parse_top_level_declaration(&mut self) -> Result<AstNode, ParseError> {
        if self.is_type_keyword() && self.is_function_header() {
            return self.parse_function_definition();
        }
        self.parse_statement()
    }

    /// Lookahead: `type name (` followed by `)` or a parameter type
    fn is_function_header(&mut self) -> bool {
        let saved_pos = self.position;
        let result = self.scan_function_header().is_some();
        self.position = saved_pos;
        result
    }

    fn scan_function_header(&mut self) -> Option<()> {
        self.parse_type().ok()?;
        self.expect_identifier().ok()?;
        if !self.match_token(&Token::LParen(self.current_location())) {
            return None;
        }
        if self.check(&Token::RParen(self.current_location())) || self.is_type_keyword() {
            Some(())
        } else {
            None
        }
    }

    /// Parse function definition or prototype: type name(params) { body } | ;
    fn parse_function_definition(&mut self) -> Result<AstNode, ParseError> {
        let return_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after function name")?;

        let params = self.parse_parameter_list()?;

        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after parameters")?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(AstNode::FunctionDecl {
                name,
                params,
                return_type,
                location: loc,
            });
        }

        self.expect_token(&Token::LBrace(self.current_location()), "Expected '{' before function body")?;

        let body = self.parse_block_statements();

        let end_location = self.current_location();
        self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after function body")?;

        Ok(AstNode::FunctionDef {
            name,
            params,
            return_type,
            body,
            location: loc,
            end_location,
        })
    }

    /// Parse parameter list: (type name, type name, ...)
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // (void) means no parameters
        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let mut param_type = self.parse_type()?;
            // prototypes may leave parameters unnamed
            let name = if let Token::Ident(name, _) = self.peek_token() {
                self.advance();
                name
            } else {
                String::new()
            };

            // `int arr[]` is a list parameter
            if self.match_token(&Token::LBracket(self.current_location())) {
                self.expect_token(&Token::RBracket(self.current_location()), "Expected ']' in array parameter")?;
                param_type = Type::new(BaseType::Vector(Box::new(param_type)));
            }

            params.push(Param { name, param_type });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse type: [const] base [<T>] [const] [&]
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let mut is_const = self.match_token(&Token::Const(self.current_location()));

        let base = match self.peek_token() {
            Token::Int(_) => {
                self.advance();
                BaseType::Int
            }
            Token::Long(_) => {
                self.advance();
                // `long long`, `long int`
                while self.check(&Token::Long(self.current_location()))
                    || self.check(&Token::Int(self.current_location()))
                {
                    self.advance();
                }
                BaseType::Long
            }
            Token::Bool(_) => {
                self.advance();
                BaseType::Bool
            }
            Token::Char(_) => {
                self.advance();
                BaseType::Char
            }
            Token::Void(_) => {
                self.advance();
                BaseType::Void
            }
            Token::Double(_) => {
                self.advance();
                BaseType::Double
            }
            Token::Float(_) => {
                self.advance();
                BaseType::Float
            }
            Token::StringType(_) => {
                self.advance();
                BaseType::Str
            }
            Token::Auto(_) => {
                self.advance();
                BaseType::Auto
            }
            Token::Vector(_) => {
                self.advance();
                self.expect_token(&Token::Lt(self.current_location()), "Expected '<' after 'vector'")?;
                let element = self.parse_type()?;
                self.close_angle()?;
                BaseType::Vector(Box::new(element))
            }
            _ => {
                return Err(ParseError {
                    message: format!("Expected type, found {}", self.peek()),
                    location: self.current_location(),
                });
            }
        };

        if self.match_token(&Token::Const(self.current_location())) {
            is_const = true;
        }
        let is_reference = self.match_token(&Token::Amp(self.current_location()));

        Ok(Type {
            base,
            is_const,
            is_reference,
        })
    }

    /// Consume one `>`; a `>>` closing two templates is split into two tokens.
    fn close_angle(&mut self) -> Result<(), ParseError> {
        let loc = self.current_location();
        if self.match_token(&Token::Gt(loc)) {
            return Ok(());
        }
        if self.check(&Token::GtGt(loc)) {
            // Split into two `>` so a rewind to before this point still parses
            self.tokens[self.position] = Token::Gt(loc);
            self.tokens
                .insert(self.position + 1, Token::Gt(SourceLocation::new(loc.line, loc.column + 1)));
            self.advance();
            return Ok(());
        }
        Err(ParseError {
            message: format!("Expected '>' to close template, found {}", self.peek()),
            location: loc,
        })
    }

    /// Parse block statements (inside braces, excluding the braces themselves)
    fn parse_block_statements(&mut self) -> Vec<AstNode> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            let start = self.position;
            let stmt = match self.parse_statement() {
                Ok(stmt) => stmt,
                Err(err) => self.recover(start, err),
            };
            statements.push(stmt);
        }

        statements
    }

    /// Parse a statement
    fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        if self.match_token(&Token::LBrace(loc)) {
            let statements = self.parse_block_statements();
            self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after block")?;
            return Ok(AstNode::Block {
                statements,
                location: loc,
            });
        }

        // empty statement
        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                location: loc,
            });
        }

        if self.match_token(&Token::Using(loc)) {
            while !self.check(&Token::Semicolon(self.current_location())) && !self.is_at_end() {
                self.advance();
            }
            self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after 'using'")?;
            return Ok(AstNode::UsingDirective { location: loc });
        }

        if matches!(self.peek(), Token::Ident(name, _) if name == "cout") {
            return self.parse_stream_output();
        }

        if self.is_type_keyword() {
            if self.is_function_header() {
                return Err(ParseError {
                    message: "Nested function definitions are not supported".to_string(),
                    location: loc,
                });
            }
            return self.parse_variable_declaration();
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse `cout << a << b << endl;`
    fn parse_stream_output(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        self.advance(); // consume 'cout'

        let mut items = Vec::new();
        while self.match_token(&Token::LtLt(self.current_location())) {
            // operands bind tighter than '<<', so stop at additive level
            items.push(self.parse_additive()?);
        }

        if items.is_empty() {
            return Err(ParseError {
                message: "Expected '<<' after 'cout'".to_string(),
                location: loc,
            });
        }

        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after output statement")?;

        Ok(AstNode::StreamOutput {
            items,
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after return")?;

        Ok(AstNode::Return { expr, location: loc })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let body = self.parse_statement_or_block()?;

        self.expect_token(&Token::While(self.current_location()), "Expected 'while' after do body")?;
        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after do-while condition")?;
        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'for'")?;

        // Init (optional)
        let init = if self.check(&Token::Semicolon(self.current_location())) {
            self.advance();
            None
        } else if self.is_type_keyword() {
            // Declaration includes semicolon, so don't expect another
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let expr_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after for init")?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: expr_loc,
            }))
        };

        // Condition (optional)
        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after for condition")?;

        // Increment (optional)
        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse variable declaration:
    /// `type name [= init];`, `type name[N];`, `vector<T> name(n[, fill]);`
    fn parse_variable_declaration(&mut self) -> Result<AstNode, ParseError> {
        let mut var_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        // C-style array: int arr[5]; / int arr[] = {...};
        let mut array_size = None;
        let element = var_type.clone();
        if self.match_token(&Token::LBracket(self.current_location())) {
            if !self.check(&Token::RBracket(self.current_location())) {
                array_size = Some(Box::new(self.parse_expression()?));
            }
            self.expect_token(&Token::RBracket(self.current_location()), "Expected ']' after array size")?;
            var_type = Type::new(BaseType::Vector(Box::new(var_type)));
        }

        let init = if self.match_token(&Token::Eq(self.current_location())) {
            Some(Box::new(self.parse_expression()?))
        } else if self.match_token(&Token::LParen(self.current_location())) {
            if let BaseType::Vector(element) = &var_type.base {
                let element = (**element).clone();
                Some(Box::new(self.parse_vector_ctor(element)?))
            } else {
                let ctor_loc = self.previous_location();
                let mut args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after constructor arguments")?;
                if args.len() != 1 {
                    return Err(ParseError {
                        message: "Constructor syntax is only supported for vectors".to_string(),
                        location: ctor_loc,
                    });
                }
                args.pop().map(Box::new)
            }
        } else {
            array_size.map(|size| {
                Box::new(AstNode::VectorInit {
                    size,
                    fill: None,
                    element,
                    location: loc,
                })
            })
        };

        self.expect_token(&Token::Semicolon(self.current_location()), "Expected ';' after variable declaration")?;

        Ok(AstNode::VarDecl {
            name,
            var_type,
            init,
            location: loc,
        })
    }

    /// Arguments of a vector constructor, after its `(`: `(n[, fill])`.
    /// `()` is an empty list.
    fn parse_vector_ctor(&mut self, element: Type) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let mut args = self.parse_argument_list()?;
        self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after constructor arguments")?;

        if args.len() > 2 {
            return Err(ParseError {
                message: "vector constructor takes a size and an optional fill value".to_string(),
                location: loc,
            });
        }
        if args.is_empty() {
            return Ok(AstNode::ListLiteral {
                items: Vec::new(),
                location: loc,
            });
        }
        let fill = if args.len() == 2 { args.pop().map(Box::new) } else { None };
        let size = Box::new(args.remove(0));
        Ok(AstNode::VectorInit {
            size,
            fill,
            element,
            location: loc,
        })
    }

    /// Parse statement or block (for if/while/for bodies)
    fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let statements = self.parse_block_statements();
            self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after block")?;
            Ok(statements)
        } else {
            // Single statement
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Skip the unparseable construct that starts at token `start` and wrap
    /// its source text in an [`AstNode::Unsupported`].
    fn recover(&mut self, start: usize, err: ParseError) -> AstNode {
        self.position = start;
        let location = self.current_location();
        let mut brace_depth = 0usize;
        let mut paren_depth = 0usize;

        loop {
            match self.peek() {
                Token::Eof(_) => break,
                Token::LBrace(_) => {
                    brace_depth += 1;
                    self.advance();
                }
                Token::RBrace(_) => {
                    if brace_depth == 0 {
                        // belongs to the enclosing block, unless nothing was consumed yet
                        if self.position == start {
                            self.advance();
                        }
                        break;
                    }
                    brace_depth -= 1;
                    self.advance();
                    if brace_depth == 0 && paren_depth == 0 {
                        self.match_token(&Token::Semicolon(self.current_location()));
                        break;
                    }
                }
                Token::LParen(_) => {
                    paren_depth += 1;
                    self.advance();
                }
                Token::RParen(_) => {
                    paren_depth = paren_depth.saturating_sub(1);
                    self.advance();
                }
                Token::Semicolon(_) if brace_depth == 0 && paren_depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }

        let end_line = if self.position > start {
            self.previous_location().line
        } else {
            location.line
        };

        AstNode::Unsupported {
            text: self.source_text(location.line, end_line),
            reason: err.message,
            location,
        }
    }

    fn source_text(&self, first_line: usize, last_line: usize) -> String {
        let first = first_line.saturating_sub(1);
        let last = last_line.max(first_line).min(self.lines.len());
        self.lines
            .get(first..last)
            .map(|lines| {
                lines
                    .iter()
                    .map(|l| l.trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// Parse expression (top-level entry point)
    fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;

        // Check for assignment operators
        let loc = self.current_location();
        if self.match_token(&Token::Eq(loc)) {
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        // Compound assignments
        let compound_op = if self.match_token(&Token::PlusEq(loc)) {
            Some(BinOp::Add)
        } else if self.match_token(&Token::MinusEq(loc)) {
            Some(BinOp::Sub)
        } else if self.match_token(&Token::StarEq(loc)) {
            Some(BinOp::Mul)
        } else if self.match_token(&Token::SlashEq(loc)) {
            Some(BinOp::Div)
        } else if self.match_token(&Token::PercentEq(loc)) {
            Some(BinOp::Mod)
        } else {
            None
        };

        if let Some(op) = compound_op {
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_expression()?);
            self.expect_token(&Token::Colon(self.current_location()), "Expected ':' in ternary expression")?;
            let false_expr = Box::new(self.parse_ternary()?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else {
                break;
            };

            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            let right = Box::new(self.parse_unary()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse unary (! - + ++ --)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = if self.match_token(&Token::Bang(loc)) {
            UnOp::Not
        } else if self.match_token(&Token::Minus(loc)) {
            UnOp::Neg
        } else if self.match_token(&Token::PlusPlus(loc)) {
            UnOp::PreInc
        } else if self.match_token(&Token::MinusMinus(loc)) {
            UnOp::PreDec
        } else if self.match_token(&Token::Plus(loc)) {
            // Unary plus: just return the operand
            return self.parse_unary();
        } else {
            return self.parse_postfix();
        };

        let operand = Box::new(self.parse_unary()?);
        Ok(AstNode::UnaryOp {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix (++ -- [] .method() ())
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::PlusPlus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(&Token::RBracket(self.current_location()), "Expected ']' after index")?;
                expr = AstNode::ArrayAccess {
                    array: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let method = self.expect_identifier()?;
                self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after method name")?;
                let args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after method arguments")?;
                expr = AstNode::MethodCall {
                    object: Box::new(expr),
                    method,
                    args,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                // Function call
                let args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after function arguments")?;

                let (name, name_loc) = if let AstNode::Variable(n, l) = expr {
                    (n, l)
                } else {
                    return Err(ParseError {
                        message: "Function call must be on identifier".to_string(),
                        location: loc,
                    });
                };

                expr = AstNode::FunctionCall {
                    name,
                    args,
                    location: name_loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, variables, brace lists, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, loc) => {
                self.advance();
                Ok(AstNode::IntLiteral(n, loc))
            }
            Token::FloatLiteral(x, loc) => {
                self.advance();
                Ok(AstNode::FloatLiteral(x, loc))
            }
            Token::CharLiteral(c, loc) => {
                self.advance();
                Ok(AstNode::CharLiteral(c, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                Ok(AstNode::StringLiteral(s, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(AstNode::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(AstNode::BoolLiteral(false, loc))
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(AstNode::Variable(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(&Token::RParen(self.current_location()), "Expected ')' after expression")?;
                Ok(expr)
            }
            Token::Vector(_) => {
                // temporary such as `vector<int>(n, 0)`
                let ty = self.parse_type()?;
                let BaseType::Vector(element) = ty.base else {
                    return Err(ParseError {
                        message: "Expected vector type".to_string(),
                        location: loc,
                    });
                };
                self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after vector type")?;
                self.parse_vector_ctor(*element)
            }
            Token::LBrace(_) => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&Token::RBrace(self.current_location())) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.match_token(&Token::Comma(self.current_location())) {
                            break;
                        }
                        // trailing comma
                        if self.check(&Token::RBrace(self.current_location())) {
                            break;
                        }
                    }
                }
                self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after list")?;
                Ok(AstNode::ListLiteral {
                    items,
                    location: loc,
                })
            }
            Token::Invalid(message, loc) => Err(ParseError {
                message,
                location: loc,
            }),
            _ => Err(ParseError {
                message: format!("Unexpected token: {}", self.peek()),
                location: loc,
            }),
        }
    }

    // ===== Helper methods =====

    fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek_token(),
            Token::Int(_)
                | Token::Long(_)
                | Token::Bool(_)
                | Token::Char(_)
                | Token::Void(_)
                | Token::Double(_)
                | Token::Float(_)
                | Token::StringType(_)
                | Token::Vector(_)
                | Token::Auto(_)
                | Token::Const(_)
        )
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program()
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("int factorial(int n) {\n  return 1;\n}");

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::FunctionDef {
                name,
                params,
                return_type,
                body,
                end_location,
                ..
            } => {
                assert_eq!(name, "factorial");
                assert_eq!(params.len(), 1);
                assert_eq!(params[0].name, "n");
                assert_eq!(return_type.base, BaseType::Int);
                assert_eq!(body.len(), 1);
                assert_eq!(end_location.line, 3);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_prototype_and_driver() {
        let program = parse("bool isOdd(int);\nint n = 5;\nisOdd(n);");

        assert!(matches!(program.nodes[0], AstNode::FunctionDecl { ref name, .. } if name == "isOdd"));
        assert!(matches!(program.nodes[1], AstNode::VarDecl { ref name, .. } if name == "n"));
        assert!(matches!(program.nodes[2], AstNode::ExpressionStatement { .. }));
    }

    #[test]
    fn test_parse_reference_and_nested_vector_params() {
        let program = parse("void f(vector<vector<int>>& grid, const string& s) {}");

        match &program.nodes[0] {
            AstNode::FunctionDef { params, .. } => {
                assert!(params[0].param_type.is_reference);
                match &params[0].param_type.base {
                    BaseType::Vector(inner) => {
                        assert!(matches!(inner.base, BaseType::Vector(_)))
                    }
                    other => panic!("Expected vector, got {:?}", other),
                }
                assert!(params[1].param_type.is_const);
                assert_eq!(params[1].param_type.base, BaseType::Str);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_stream_output() {
        let program = parse("cout << \"Found: \" << n + 1 << endl;");

        match &program.nodes[0] {
            AstNode::StreamOutput { items, .. } => {
                assert_eq!(items.len(), 3);
                assert!(matches!(items[1], AstNode::BinaryOp { op: BinOp::Add, .. }));
            }
            other => panic!("Expected output statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_vector_constructor() {
        let program = parse("vector<int> memo(10, -1);");

        match &program.nodes[0] {
            AstNode::VarDecl { init: Some(init), .. } => {
                assert!(matches!(**init, AstNode::VectorInit { fill: Some(_), .. }))
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_statement_is_recovered() {
        let program = parse("int f(int n) {\n  int *p = &n;\n  return n;\n}");

        match &program.nodes[0] {
            AstNode::FunctionDef { body, .. } => {
                assert_eq!(body.len(), 2);
                match &body[0] {
                    AstNode::Unsupported { text, location, .. } => {
                        assert_eq!(text, "int *p = &n;");
                        assert_eq!(location.line, 2);
                    }
                    other => panic!("Expected unsupported fragment, got {:?}", other),
                }
                assert!(matches!(body[1], AstNode::Return { .. }));
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_top_level_item_skips_whole_block() {
        let program = parse("class A {\n int x;\n};\nint g() { return 1; }");

        assert_eq!(program.nodes.len(), 2);
        assert!(matches!(program.nodes[0], AstNode::Unsupported { .. }));
        assert!(matches!(program.nodes[1], AstNode::FunctionDef { ref name, .. } if name == "g"));
    }

    fn assert_nested_vector(ty: &Type) {
        match &ty.base {
            BaseType::Vector(inner) => assert!(matches!(inner.base, BaseType::Vector(_))),
            other => panic!("Expected vector of vectors, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_vector_declaration_at_top_level() {
        let program = parse("vector<vector<int>> g = {{1, 2}, {3}};\ncout << g << endl;");

        assert_eq!(program.nodes.len(), 2);
        match &program.nodes[0] {
            AstNode::VarDecl { name, var_type, .. } => {
                assert_eq!(name, "g");
                assert_nested_vector(var_type);
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
        assert!(matches!(program.nodes[1], AstNode::StreamOutput { .. }));
    }

    #[test]
    fn test_parse_nested_vector_declaration_in_body() {
        let program = parse("void f() {\n  vector<vector<int>> g = {{1}, {2}};\n  cout << g << endl;\n}");

        match &program.nodes[0] {
            AstNode::FunctionDef { body, .. } => {
                assert_eq!(body.len(), 2);
                match &body[0] {
                    AstNode::VarDecl { var_type, .. } => assert_nested_vector(var_type),
                    other => panic!("Expected declaration, got {:?}", other),
                }
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_vector_return_type() {
        let program = parse("vector<vector<int>> make() {\n  return {{1}};\n}\nmake();");

        assert_eq!(program.nodes.len(), 2);
        match &program.nodes[0] {
            AstNode::FunctionDef {
                name, return_type, ..
            } => {
                assert_eq!(name, "make");
                assert_nested_vector(return_type);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_vector_temporary_fill() {
        let program = parse("vector<vector<int>> g(2, vector<int>(2, 0));");

        match &program.nodes[0] {
            AstNode::VarDecl { init: Some(init), .. } => match init.as_ref() {
                AstNode::VectorInit {
                    fill: Some(fill),
                    element,
                    ..
                } => {
                    assert!(matches!(element.base, BaseType::Vector(_)));
                    assert!(matches!(**fill, AstNode::VectorInit { fill: Some(_), .. }));
                }
                other => panic!("Expected vector constructor, got {:?}", other),
            },
            other => panic!("Expected declaration, got {:?}", other),
        }
    }
}
