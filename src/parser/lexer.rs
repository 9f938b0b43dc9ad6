//! Lexer (tokenizer) for the C++-like teaching subset
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Preprocessor lines (`#include …`) are skipped and a leading `std::` qualifier
//! is dropped, so `std::vector` and `vector` lex identically.
//!
//! The lexer never fails: characters it cannot make sense of become
//! [`Token::Invalid`], and the parser turns the surrounding statement into an
//! unsupported fragment.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(char, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Type keywords
    Int(SourceLocation),
    Long(SourceLocation),
    Bool(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    Double(SourceLocation),
    Float(SourceLocation),
    StringType(SourceLocation),
    Vector(SourceLocation),
    Auto(SourceLocation),
    Const(SourceLocation),

    // Keywords
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    For(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Using(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Stream insertion / nested template close
    LtLt(SourceLocation), // <<
    GtGt(SourceLocation), // >>

    // Reference marker in parameter types
    Amp(SourceLocation), // &

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access
    Dot(SourceLocation), // .

    // Ternary
    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    /// Text the lexer could not tokenize, with a description
    Invalid(String, SourceLocation),

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Invalid(_, loc) => *loc,
            Token::Int(loc)
            | Token::Long(loc)
            | Token::Bool(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::Double(loc)
            | Token::Float(loc)
            | Token::StringType(loc)
            | Token::Vector(loc)
            | Token::Auto(loc)
            | Token::Const(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::For(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Return(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Using(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::LtLt(loc)
            | Token::GtGt(loc)
            | Token::Amp(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(x, _) => write!(f, "float literal {}", x),
            Token::CharLiteral(c, _) => write!(f, "char literal {:?}", c),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Invalid(msg, _) => write!(f, "invalid input ({})", msg),
            Token::Int(_) => write!(f, "'int'"),
            Token::Long(_) => write!(f, "'long'"),
            Token::Bool(_) => write!(f, "'bool'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::StringType(_) => write!(f, "'string'"),
            Token::Vector(_) => write!(f, "'vector'"),
            Token::Auto(_) => write!(f, "'auto'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Do(_) => write!(f, "'do'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Using(_) => write!(f, "'using'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::LtLt(_) => write!(f, "'<<'"),
            Token::GtGt(_) => write!(f, "'>>'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Question(_) => write!(f, "'?'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer for subset source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The last token is always [`Token::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            if let Some(invalid) = self.skip_whitespace_and_comments() {
                tokens.push(invalid);
            }

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token());
        }

        tokens
    }

    /// Get next token
    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::Eof(loc);
        };

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),

            '+' => {
                if self.match_char('+') {
                    Token::PlusPlus(loc)
                } else if self.match_char('=') {
                    Token::PlusEq(loc)
                } else {
                    Token::Plus(loc)
                }
            }
            '-' => {
                if self.match_char('-') {
                    Token::MinusMinus(loc)
                } else if self.match_char('=') {
                    Token::MinusEq(loc)
                } else {
                    Token::Minus(loc)
                }
            }
            '*' => {
                if self.match_char('=') {
                    Token::StarEq(loc)
                } else {
                    Token::Star(loc)
                }
            }
            '/' => {
                if self.match_char('=') {
                    Token::SlashEq(loc)
                } else {
                    Token::Slash(loc)
                }
            }
            '%' => {
                if self.match_char('=') {
                    Token::PercentEq(loc)
                } else {
                    Token::Percent(loc)
                }
            }
            '=' => {
                if self.match_char('=') {
                    Token::EqEq(loc)
                } else {
                    Token::Eq(loc)
                }
            }
            '!' => {
                if self.match_char('=') {
                    Token::NotEq(loc)
                } else {
                    Token::Bang(loc)
                }
            }
            '<' => {
                if self.match_char('=') {
                    Token::Le(loc)
                } else if self.match_char('<') {
                    Token::LtLt(loc)
                } else {
                    Token::Lt(loc)
                }
            }
            '>' => {
                if self.match_char('=') {
                    Token::Ge(loc)
                } else if self.match_char('>') {
                    Token::GtGt(loc)
                } else {
                    Token::Gt(loc)
                }
            }
            '&' => {
                if self.match_char('&') {
                    Token::AndAnd(loc)
                } else {
                    Token::Amp(loc)
                }
            }
            '|' => {
                if self.match_char('|') {
                    Token::OrOr(loc)
                } else {
                    Token::Invalid("bitwise '|' is not supported".to_string(), loc)
                }
            }
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.number_literal('.', loc)
                } else {
                    Token::Dot(loc)
                }
            }
            '?' => Token::Question(loc),
            ':' => Token::Colon(loc),
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),
            '[' => Token::LBracket(loc),
            ']' => Token::RBracket(loc),
            ';' => Token::Semicolon(loc),
            ',' => Token::Comma(loc),

            _ => Token::Invalid(format!("unexpected character '{}'", ch), loc),
        }
    }

    /// Parse string literal
    fn string_literal(&mut self, loc: SourceLocation) -> Token {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            match ch {
                '"' => return Token::StringLiteral(string, loc),
                '\\' => match self.advance().and_then(unescape) {
                    Some(c) => string.push(c),
                    None => {
                        return Token::Invalid("unknown escape sequence".to_string(), loc)
                    }
                },
                _ => string.push(ch),
            }
        }

        Token::Invalid("unterminated string literal".to_string(), loc)
    }

    /// Parse character literal
    fn char_literal(&mut self, loc: SourceLocation) -> Token {
        let value = match self.advance() {
            Some('\\') => self.advance().and_then(unescape),
            Some('\'') | Some('\n') | None => None,
            Some(c) => Some(c),
        };

        match value {
            Some(c) if self.match_char('\'') => Token::CharLiteral(c, loc),
            _ => Token::Invalid("malformed character literal".to_string(), loc),
        }
    }

    /// Parse numeric literal (integer or decimal)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Token {
        let mut num_str = String::new();
        num_str.push(first);
        let mut is_float = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // literal suffixes carry no meaning once types are erased
        while matches!(self.peek(), Some('l' | 'L' | 'u' | 'U' | 'f' | 'F')) {
            self.advance();
        }

        if is_float {
            match num_str.parse::<f64>() {
                Ok(x) => Token::FloatLiteral(x, loc),
                Err(_) => Token::Invalid(format!("invalid number {}", num_str), loc),
            }
        } else {
            match num_str.parse::<i64>() {
                Ok(n) => Token::IntLiteral(n, loc),
                Err(_) => Token::Invalid(format!("integer literal too large: {}", num_str), loc),
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if ident == "std" && self.peek() == Some(':') && self.peek_ahead(1) == Some(':') {
            self.advance();
            self.advance();
            let next_loc = self.current_location();
            return match self.advance() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    self.identifier_or_keyword(c, next_loc)
                }
                _ => Token::Invalid("expected name after 'std::'".to_string(), loc),
            };
        }

        match ident.as_str() {
            "int" => Token::Int(loc),
            "long" => Token::Long(loc),
            "bool" => Token::Bool(loc),
            "char" => Token::Char(loc),
            "void" => Token::Void(loc),
            "double" => Token::Double(loc),
            "float" => Token::Float(loc),
            "string" => Token::StringType(loc),
            "vector" => Token::Vector(loc),
            "auto" => Token::Auto(loc),
            "const" => Token::Const(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "do" => Token::Do(loc),
            "for" => Token::For(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "return" => Token::Return(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "using" => Token::Using(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments. An unterminated block comment is reported
    /// as an invalid token.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        if let Some(invalid) = self.skip_block_comment() {
                            return Some(invalid);
                        }
                    } else {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Option<Token> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return None;
            }
            self.advance();
        }

        Some(Token::Invalid(
            "unterminated block comment".to_string(),
            start_loc,
        ))
    }

    /// Skip preprocessor directive (#include, etc.)
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn unescape(escaped: char) -> Option<char> {
    match escaped {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("int f() { return 0; }").tokenize();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "f"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::RParen(_)));
        assert!(matches!(tokens[4], Token::LBrace(_)));
        assert!(matches!(tokens[5], Token::Return(_)));
        assert!(matches!(tokens[6], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[7], Token::Semicolon(_)));
        assert!(matches!(tokens[8], Token::RBrace(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let tokens = Lexer::new("++ -- += -= == != && || << >>").tokenize();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::MinusEq(_)));
        assert!(matches!(tokens[4], Token::EqEq(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
        assert!(matches!(tokens[6], Token::AndAnd(_)));
        assert!(matches!(tokens[7], Token::OrOr(_)));
        assert!(matches!(tokens[8], Token::LtLt(_)));
        assert!(matches!(tokens[9], Token::GtGt(_)));
    }

    #[test]
    fn test_comments() {
        let tokens = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;").tokenize();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert_eq!(tokens[6].location().line, 3);
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""hello\nworld""#).tokenize();

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "hello\nworld"),
            other => panic!("Expected string literal, got {}", other),
        }
    }

    #[test]
    fn test_preprocessor_and_std_prefix_skipped() {
        let tokens = Lexer::new("#include <vector>\nstd::vector<int> v;").tokenize();

        assert!(matches!(tokens[0], Token::Vector(_)));
        assert!(matches!(tokens[1], Token::Lt(_)));
        assert!(matches!(tokens[2], Token::Int(_)));
        assert!(matches!(tokens[3], Token::Gt(_)));
    }

    #[test]
    fn test_float_and_suffix() {
        let tokens = Lexer::new("3.5 10L").tokenize();
        assert!(matches!(tokens[0], Token::FloatLiteral(x, _) if x == 3.5));
        assert!(matches!(tokens[1], Token::IntLiteral(10, _)));
    }

    #[test]
    fn test_unknown_character_becomes_invalid_token() {
        let tokens = Lexer::new("int x = 1 @ 2;").tokenize();
        assert!(tokens.iter().any(|t| matches!(t, Token::Invalid(_, _))));
        assert!(matches!(tokens.last(), Some(Token::Eof(_))));
    }
}
