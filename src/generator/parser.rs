//! Parser for trajectory expressions such as `linear(-4,4) + 2*periodic(10,0.5)`.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor ('*' factor)*
//! factor := '-' factor | NUMBER | NAME '(' [arg (',' arg)*] ')' | '(' expr ')'
//! arg    := ['+' | '-'] NUMBER
//! ```

use super::error::ArgError;
use super::function::Function;

/// Deepest nesting of parentheses and unary minus accepted.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Name(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    col: usize,
}

/// Parse the expression typed into field `index`.
///
/// Blank input is the zero function.
pub fn parse_function(text: &str, index: usize) -> Result<Function, ArgError> {
    if text.trim().is_empty() {
        return Ok(Function::zero());
    }
    let tokens = tokenize(text, index)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        index,
        depth: 0,
    };
    let function = parser.parse_expr()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(parser.error_at(trailing.col, format!("unexpected {:?}", trailing.kind)));
    }
    Ok(function)
}

fn tokenize(text: &str, index: usize) -> Result<Vec<Token>, ArgError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        let col = pos + 1;
        let kind = match ch {
            ' ' | '\t' => {
                pos += 1;
                continue;
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '0'..='9' | '.' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                // Exponent: 1e-3, 2.5E+2
                if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                    let mut look = pos + 1;
                    if look < chars.len() && (chars[look] == '+' || chars[look] == '-') {
                        look += 1;
                    }
                    if look < chars.len() && chars[look].is_ascii_digit() {
                        pos = look;
                        while pos < chars.len() && chars[pos].is_ascii_digit() {
                            pos += 1;
                        }
                    }
                }
                let literal: String = chars[start..pos].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| {
                    ArgError::input(index, format!("column {col}: invalid number '{literal}'"))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    col,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Name(chars[start..pos].iter().collect()),
                    col,
                });
                continue;
            }
            other => {
                return Err(ArgError::input(
                    index,
                    format!("column {col}: unexpected character '{other}'"),
                ));
            }
        };
        tokens.push(Token { kind, col });
        pos += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        col: chars.len() + 1,
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    index: usize,
    depth: usize,
}

impl Parser {
    fn parse_expr(&mut self) -> Result<Function, ArgError> {
        let mut acc = self.parse_term()?;
        loop {
            match self.peek().kind {
                TokenKind::Plus => {
                    self.advance();
                    acc = acc + self.parse_term()?;
                }
                TokenKind::Minus => {
                    self.advance();
                    acc = acc - self.parse_term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Function, ArgError> {
        let mut acc = self.parse_factor()?;
        while self.peek().kind == TokenKind::Star {
            self.advance();
            acc = acc * self.parse_factor()?;
        }
        Ok(acc)
    }

    fn parse_factor(&mut self) -> Result<Function, ArgError> {
        self.depth += 1;
        let result = if self.depth > MAX_DEPTH {
            let col = self.peek().col;
            Err(self.error_at(col, "expression nested too deeply"))
        } else {
            self.parse_nested_factor()
        };
        self.depth -= 1;
        result
    }

    fn parse_nested_factor(&mut self) -> Result<Function, ArgError> {
        let t = self.advance();
        match t.kind {
            TokenKind::Minus => Ok(-self.parse_factor()?),
            TokenKind::Number(v) => Ok(Function::constant(v)),
            TokenKind::Name(name) => self.parse_call(&name, t.col),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Eof => Err(self.error_at(t.col, "unexpected end of expression")),
            other => Err(self.error_at(t.col, format!("unexpected {other:?}"))),
        }
    }

    fn parse_call(&mut self, name: &str, col: usize) -> Result<Function, ArgError> {
        self.expect(TokenKind::LParen, "'(' after function name")?;
        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            args.push(self.parse_signed_number()?);
            while self.peek().kind == TokenKind::Comma {
                self.advance();
                args.push(self.parse_signed_number()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        let name = name.to_ascii_lowercase();
        let arity = match name.as_str() {
            "linear" | "periodic" | "step" => 2,
            "constant" => 1,
            "zero" => 0,
            _ => return Err(self.error_at(col, format!("unknown function '{name}'"))),
        };
        if args.len() != arity {
            return Err(self.error_at(
                col,
                format!("{name} takes {arity} arguments, found {}", args.len()),
            ));
        }

        match name.as_str() {
            "linear" => Ok(Function::linear(args[0], args[1])),
            "periodic" => {
                if args[0] <= 0.0 {
                    return Err(self.error_at(col, "periodic period must be positive"));
                }
                Ok(Function::periodic(args[0], args[1]))
            }
            "step" => Ok(Function::step(args[0], args[1])),
            "constant" => Ok(Function::constant(args[0])),
            _ => Ok(Function::zero()),
        }
    }

    fn parse_signed_number(&mut self) -> Result<f64, ArgError> {
        let sign = match self.peek().kind {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        let t = self.advance();
        match t.kind {
            TokenKind::Number(v) => Ok(sign * v),
            other => Err(self.error_at(t.col, format!("expected number, found {other:?}"))),
        }
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos].clone()
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ArgError> {
        let t = self.advance();
        if t.kind == kind {
            Ok(())
        } else {
            Err(self.error_at(t.col, format!("expected {what}, found {:?}", t.kind)))
        }
    }

    fn error_at(&self, col: usize, message: impl Into<String>) -> ArgError {
        ArgError::input(self.index, format!("column {col}: {}", message.into()))
    }
}
