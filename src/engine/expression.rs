//! Restricted expression grammar used inside `{{ … }}` tokens.
//!
//! ```text
//! expr     := or ( "?" expr ":" expr )?
//! or       := and ( "||" and )*
//! and      := equality ( "&&" equality )*
//! equality := relation ( ("==" | "===" | "!=" | "!==") relation )*
//! relation := unary ( ("<" | "<=" | ">" | ">=") unary )*
//! unary    := ("!" | "-") unary | primary
//! primary  := number | string | true | false | null | undefined
//!           | path | "(" expr ")"
//! ```
//!
//! Paths are resolved through a caller-supplied function. There are no
//! calls, assignments or member access beyond dotted paths, so an
//! expression can only read what the resolver hands out.

use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

use super::path::{as_number, is_truthy, number_value, values_equal};

/// Nesting limit for parentheses, ternaries, unary chains and binary
/// operator chains, which all deepen the parsed tree.
pub const MAX_EXPRESSION_DEPTH: usize = 32;

pub type ExprResult<T> = Result<T, ExpressionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid number '{text}' at {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unexpected '{found}' at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Question,
    Colon,
    OrOr,
    AndAnd,
    Eq { strict: bool },
    NotEq { strict: bool },
    Lt,
    Le,
    Gt,
    Ge,
    Bang,
    Minus,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Str(s) => format!("'{}'", s),
            Token::Ident(s) => s.clone(),
            Token::Question => "?".into(),
            Token::Colon => ":".into(),
            Token::OrOr => "||".into(),
            Token::AndAnd => "&&".into(),
            Token::Eq { strict: true } => "===".into(),
            Token::Eq { strict: false } => "==".into(),
            Token::NotEq { strict: true } => "!==".into(),
            Token::NotEq { strict: false } => "!=".into(),
            Token::Lt => "<".into(),
            Token::Le => "<=".into(),
            Token::Gt => ">".into(),
            Token::Ge => ">=".into(),
            Token::Bang => "!".into(),
            Token::Minus => "-".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(src: &str) -> ExprResult<Vec<(Token, usize)>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let next = chars.get(i + 1).copied();
        let next2 = chars.get(i + 2).copied();

        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '?' => {
                i += 1;
                Token::Question
            }
            ':' => {
                i += 1;
                Token::Colon
            }
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '-' => {
                i += 1;
                Token::Minus
            }
            '|' if next == Some('|') => {
                i += 2;
                Token::OrOr
            }
            '&' if next == Some('&') => {
                i += 2;
                Token::AndAnd
            }
            '=' if next == Some('=') => {
                let strict = next2 == Some('=');
                i += if strict { 3 } else { 2 };
                Token::Eq { strict }
            }
            '!' if next == Some('=') => {
                let strict = next2 == Some('=');
                i += if strict { 3 } else { 2 };
                Token::NotEq { strict }
            }
            '!' => {
                i += 1;
                Token::Bang
            }
            '<' if next == Some('=') => {
                i += 2;
                Token::Le
            }
            '<' => {
                i += 1;
                Token::Lt
            }
            '>' if next == Some('=') => {
                i += 2;
                Token::Ge
            }
            '>' => {
                i += 1;
                Token::Gt
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(ExpressionError::UnterminatedString { pos: start }),
                        Some('\\') => {
                            if let Some(escaped) = chars.get(i + 1) {
                                text.push(*escaped);
                            }
                            i += 2;
                        }
                        Some(ch) if *ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            text.push(*ch);
                            i += 1;
                        }
                    }
                }
                Token::Str(text)
            }
            c if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::InvalidNumber {
                        text: text.clone(),
                        pos: start,
                    })?;
                Token::Number(value)
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '$' | '.'))
                {
                    i += 1;
                }
                Token::Ident(chars[start..i].iter().collect())
            }
            other => return Err(ExpressionError::UnexpectedChar { ch: other, pos: start }),
        };
        tokens.push((token, start));
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Path(String),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> ExprResult<()> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> ExprResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ExpressionError::TooDeep {
                limit: MAX_EXPRESSION_DEPTH,
            });
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> ExprResult<Expr> {
        self.enter()?;
        let cond = self.parse_or()?;
        let expr = if self.peek() == Some(&Token::Question) {
            self.advance();
            let then = self.parse_expr()?;
            self.expect(Token::Colon)?;
            let otherwise = self.parse_expr()?;
            Expr::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            }
        } else {
            cond
        };
        self.depth -= 1;
        Ok(expr)
    }

    /// Release the depth taken by `folded` operators of a finished chain.
    fn leave(&mut self, folded: usize) {
        self.depth -= folded;
    }

    // Every operator folded into a chain nests the tree one level deeper,
    // so each one is charged against the depth budget.

    fn parse_or(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_and()?;
        let mut folded = 0;
        while self.peek() == Some(&Token::OrOr) {
            self.enter()?;
            folded += 1;
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Logical {
                op: LogicalOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.leave(folded);
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_equality()?;
        let mut folded = 0;
        while self.peek() == Some(&Token::AndAnd) {
            self.enter()?;
            folded += 1;
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::Logical {
                op: LogicalOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.leave(folded);
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_relation()?;
        let mut folded = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Eq { strict: false }) => BinaryOp::Eq,
                Some(Token::Eq { strict: true }) => BinaryOp::StrictEq,
                Some(Token::NotEq { strict: false }) => BinaryOp::NotEq,
                Some(Token::NotEq { strict: true }) => BinaryOp::StrictNotEq,
                _ => {
                    self.leave(folded);
                    return Ok(lhs);
                }
            };
            self.enter()?;
            folded += 1;
            self.advance();
            let rhs = self.parse_relation()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_relation(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_unary()?;
        let mut folded = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => {
                    self.leave(folded);
                    return Ok(lhs);
                }
            };
            self.enter()?;
            folded += 1;
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> ExprResult<Expr> {
        match self.peek() {
            Some(Token::Bang) | Some(Token::Minus) => {
                self.enter()?;
                let negate = self.peek() == Some(&Token::Minus);
                self.advance();
                let operand = Box::new(self.parse_unary()?);
                self.depth -= 1;
                Ok(if negate {
                    Expr::Neg(operand)
                } else {
                    Expr::Not(operand)
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ExprResult<Expr> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(Expr::Literal(number_value(n))),
            Some((Token::Str(s), _)) => Ok(Expr::Literal(Value::String(s))),
            Some((Token::Ident(name), _)) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ => Expr::Path(name),
            }),
            Some((Token::LParen, _)) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

/// Parse an expression.
pub fn parse(src: &str) -> ExprResult<Expr> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    match parser.advance() {
        None => Ok(expr),
        Some((token, pos)) => Err(ExpressionError::UnexpectedToken {
            found: token.describe(),
            pos,
        }),
    }
}

/// Result of evaluating an expression, with how many of the paths it
/// visited actually resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub paths_visited: usize,
    pub paths_resolved: usize,
}

impl Evaluation {
    /// True when the expression read paths and none of them existed.
    pub fn nothing_resolved(&self) -> bool {
        self.paths_visited > 0 && self.paths_resolved == 0
    }
}

impl Expr {
    /// Evaluate against `resolve`, which maps a dotted path to a value.
    pub fn evaluate<F>(&self, resolve: &F) -> Evaluation
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut visited = 0;
        let mut resolved = 0;
        let value = self.eval(resolve, &mut visited, &mut resolved);
        Evaluation {
            value,
            paths_visited: visited,
            paths_resolved: resolved,
        }
    }

    fn eval<F>(&self, resolve: &F, visited: &mut usize, resolved: &mut usize) -> Value
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Path(path) => {
                *visited += 1;
                match resolve(path) {
                    Some(value) => {
                        *resolved += 1;
                        value
                    }
                    None => Value::Null,
                }
            }
            Expr::Not(inner) => Value::Bool(!is_truthy(&inner.eval(resolve, visited, resolved))),
            Expr::Neg(inner) => match as_number(&inner.eval(resolve, visited, resolved)) {
                Some(n) => number_value(-n),
                None => Value::Null,
            },
            Expr::Logical { op, lhs, rhs } => {
                let left = lhs.eval(resolve, visited, resolved);
                match (op, is_truthy(&left)) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => left,
                    _ => rhs.eval(resolve, visited, resolved),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let left = lhs.eval(resolve, visited, resolved);
                let right = rhs.eval(resolve, visited, resolved);
                Value::Bool(apply_binary(*op, &left, &right))
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                if is_truthy(&cond.eval(resolve, visited, resolved)) {
                    then.eval(resolve, visited, resolved)
                } else {
                    otherwise.eval(resolve, visited, resolved)
                }
            }
        }
    }
}

fn loose_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::Bool(_), Value::Number(_))
        | (Value::Number(_), Value::Bool(_)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => values_equal(a, b),
    }
}

/// Ordering used by `<`/`>` style operators. Strings compare
/// lexicographically; everything else must coerce to a number.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Null, _) | (_, Value::Null) => None,
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> bool {
    match op {
        BinaryOp::Eq => loose_equal(left, right),
        BinaryOp::NotEq => !loose_equal(left, right),
        BinaryOp::StrictEq => values_equal(left, right),
        BinaryOp::StrictNotEq => !values_equal(left, right),
        BinaryOp::Lt => compare(left, right) == Some(Ordering::Less),
        BinaryOp::Le => matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => compare(left, right) == Some(Ordering::Greater),
        BinaryOp::Ge => matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Parse and evaluate in one step.
pub fn evaluate<F>(src: &str, resolve: &F) -> ExprResult<Evaluation>
where
    F: Fn(&str) -> Option<Value>,
{
    Ok(parse(src)?.evaluate(resolve))
}
