//! # Formula Evaluator
//!
//! Restricted arithmetic for salary-structure formulas such as
//! `basic * 0.4` or `(basic + da) * 12 / 100`.
//!
//! ## Grammar
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  expr   := term (('+' | '-') term)*                                    │
//! │  term   := unary (('*' | '/') unary)*                                  │
//! │  unary  := ('+' | '-') unary | atom                                    │
//! │  atom   := NUMBER | IDENT | '(' expr ')'                               │
//! │                                                                         │
//! │  NUMBER := digits ['.' digits] | '.' digits                            │
//! │  IDENT  := (letter | '_') (letter | digit | '_')*   (case-insensitive) │
//! │                                                                         │
//! │  Nothing else: no calls, no assignment, no property access.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A formula is parsed once into a [`Formula`] and evaluated for each
//! employee against a [`Variables`] set.
//!
//! ## Usage
//! ```rust
//! use khata_core::formula::{Formula, Variables};
//!
//! let hra = Formula::parse("Basic * 0.4").unwrap();
//! let vars = Variables::new().with("basic", 25_000.0);
//! assert_eq!(hra.evaluate(&vars).unwrap(), 10_000.0);
//! assert_eq!(hra.variables(), vec!["basic".to_string()]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FormulaError;
use crate::money::Money;

/// Longest accepted formula text.
pub const MAX_FORMULA_LENGTH: usize = 1024;

/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_NESTING: usize = 64;

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    position: usize,
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = position;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_digit() || c == '.') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let text = &source[position..end];
                tokens.push(Spanned {
                    token: Token::Number(parse_number(text, position)?),
                    position,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = position;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                tokens.push(Spanned {
                    token: Token::Ident(source[position..end].to_ascii_lowercase()),
                    position,
                });
                continue;
            }
            other => {
                return Err(FormulaError::UnexpectedChar {
                    ch: other,
                    position,
                })
            }
        };
        chars.next();
        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

fn parse_number(text: &str, position: usize) -> Result<f64, FormulaError> {
    let invalid = || FormulaError::InvalidNumber {
        text: text.to_string(),
        position,
    };
    // "1.", "." and "1.2.3" are typos, not numbers
    if text.ends_with('.') || text.matches('.').count() > 1 {
        return Err(invalid());
    }
    // overflowing literals parse to infinity
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(invalid)
}

// =============================================================================
// Syntax Tree
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    /// Lower-cased variable name.
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn evaluate(&self, vars: &Variables) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => match vars.get(name) {
                Some(value) if value.is_finite() => Ok(value),
                Some(_) => Err(FormulaError::NonFinite),
                None => Err(FormulaError::UnknownVariable(name.clone())),
            },
            Expr::Neg(inner) => Ok(-inner.evaluate(vars)?),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(vars)?;
                let r = rhs.evaluate(vars)?;
                let value = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Err(FormulaError::DivisionByZero);
                        }
                        l / r
                    }
                };
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(FormulaError::NonFinite)
                }
            }
        }
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(inner) => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Spanned> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::TooDeep { max: MAX_NESTING });
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek().and_then(|t| match t.token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(|t| match t.token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek().map(|t| &t.token) {
            Some(Token::Plus) | Some(Token::Minus) => {
                let negate = matches!(self.next().map(|t| &t.token), Some(Token::Minus));
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(if negate {
                    Expr::Neg(Box::new(inner))
                } else {
                    inner
                })
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        let Some(spanned) = self.next() else {
            return Err(FormulaError::UnexpectedEnd);
        };
        match &spanned.token {
            Token::Number(n) => Ok(Expr::Number(*n)),
            Token::Ident(name) => Ok(Expr::Variable(name.clone())),
            Token::LParen => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken {
                        found: other.token.to_string(),
                        position: other.position,
                    }),
                    None => Err(FormulaError::UnclosedParenthesis {
                        position: spanned.position,
                    }),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                position: spanned.position,
            }),
        }
    }
}

// =============================================================================
// Variables
// =============================================================================

/// Values formulas may reference, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, f64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_ascii_lowercase(), value);
    }

    /// Sets a variable to a money amount in major units.
    pub fn set_money(&mut self, name: &str, value: Money) {
        self.set(name, value.cents() as f64 / 100.0);
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_lowercase())
    }
}

// =============================================================================
// Formula
// =============================================================================

/// A parsed, reusable formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parses formula text.
    ///
    /// ## Errors
    /// Any [`FormulaError`] other than the evaluation-time ones
    /// (`UnknownVariable`, `DivisionByZero`, `NonFinite`).
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        if source.len() > MAX_FORMULA_LENGTH {
            return Err(FormulaError::TooLong {
                max: MAX_FORMULA_LENGTH,
            });
        }
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        if let Some(extra) = parser.peek() {
            return Err(FormulaError::UnexpectedToken {
                found: extra.token.to_string(),
                position: extra.position,
            });
        }

        Ok(Formula {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// Referenced variable names, lower-cased, in order of first use.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.expr.collect_variables(&mut names);
        names
    }

    pub fn evaluate(&self, vars: &Variables) -> Result<f64, FormulaError> {
        self.expr.evaluate(vars)
    }

    /// Evaluates to a money amount in major units, rounded to the cent.
    pub fn evaluate_money(&self, vars: &Variables) -> Result<Money, FormulaError> {
        self.evaluate(vars).map(Money::from_major_f64)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses and evaluates in one step.
pub fn evaluate(source: &str, vars: &Variables) -> Result<f64, FormulaError> {
    Formula::parse(source)?.evaluate(vars)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> Result<f64, FormulaError> {
        evaluate(source, &Variables::new().with("basic", 20_000.0).with("da", 5_000.0))
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(eval("100 / 10 / 5").unwrap(), 2.0);
        assert_eq!(eval("-2 * -3").unwrap(), 6.0);
        assert_eq!(eval("+5 - -5").unwrap(), 10.0);
        assert_eq!(eval(".5 * 4").unwrap(), 2.0);
    }

    #[test]
    fn test_variables_are_case_insensitive() {
        assert_eq!(eval("BASIC * 0.4").unwrap(), 8_000.0);
        assert_eq!(eval("(Basic + DA) * 12 / 100").unwrap(), 3_000.0);
    }

    #[test]
    fn test_variables_listed_once_in_order() {
        let formula = Formula::parse("da + Basic * basic - DA").unwrap();
        assert_eq!(formula.variables(), vec!["da".to_string(), "basic".to_string()]);
        assert!(Formula::parse("12 * 3").unwrap().variables().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(eval(""), Err(FormulaError::Empty));
        assert_eq!(eval("   "), Err(FormulaError::Empty));
        assert_eq!(
            eval("basic * 0.4; alert(1)"),
            Err(FormulaError::UnexpectedChar { ch: ';', position: 11 })
        );
        assert_eq!(eval("basic *"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(
            eval("(basic + 1"),
            Err(FormulaError::UnclosedParenthesis { position: 0 })
        );
        assert_eq!(
            eval("basic)"),
            Err(FormulaError::UnexpectedToken {
                found: ")".to_string(),
                position: 5
            })
        );
        assert_eq!(
            eval("basic basic"),
            Err(FormulaError::UnexpectedToken {
                found: "basic".to_string(),
                position: 6
            })
        );
        assert!(matches!(eval("1.2.3"), Err(FormulaError::InvalidNumber { .. })));
        assert!(matches!(eval("3."), Err(FormulaError::InvalidNumber { .. })));
    }

    #[test]
    fn test_overflowing_literal_is_rejected() {
        let huge = "9".repeat(400);
        assert_eq!(
            eval(&huge),
            Err(FormulaError::InvalidNumber {
                text: huge.clone(),
                position: 0
            })
        );
        assert!(Formula::parse(&format!("basic + {huge}")).is_err());
        assert_eq!(
            evaluate("x + 1", &Variables::new().with("x", f64::INFINITY)),
            Err(FormulaError::NonFinite)
        );
    }

    #[test]
    fn test_function_calls_are_rejected() {
        assert_eq!(
            eval("max(basic)"),
            Err(FormulaError::UnexpectedToken {
                found: "(".to_string(),
                position: 3
            })
        );
        assert_eq!(
            eval("max(basic, 1000)"),
            Err(FormulaError::UnexpectedChar { ch: ',', position: 9 })
        );
        assert!(matches!(
            eval("Math.round(basic)"),
            Err(FormulaError::InvalidNumber { .. })
        ));
        assert!(matches!(
            eval("basic = 0"),
            Err(FormulaError::UnexpectedChar { ch: '=', .. })
        ));
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(
            eval("bsic * 2"),
            Err(FormulaError::UnknownVariable("bsic".to_string()))
        );
        assert_eq!(eval("basic / (da - 5000)"), Err(FormulaError::DivisionByZero));
        assert_eq!(
            evaluate("x * x", &Variables::new().with("x", 1e200)),
            Err(FormulaError::NonFinite)
        );
    }

    #[test]
    fn test_limits() {
        let deep = format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(eval(&deep), Err(FormulaError::TooDeep { max: MAX_NESTING }));

        let ok = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(eval(&ok).unwrap(), 1.0);

        let signs = format!("{}1", "-".repeat(MAX_NESTING + 1));
        assert_eq!(eval(&signs), Err(FormulaError::TooDeep { max: MAX_NESTING }));

        let long = "1+".repeat(MAX_FORMULA_LENGTH) + "1";
        assert_eq!(
            eval(&long),
            Err(FormulaError::TooLong {
                max: MAX_FORMULA_LENGTH
            })
        );
    }

    #[test]
    fn test_evaluate_money_rounds_to_cent() {
        let formula: Formula = "basic / 3".parse().unwrap();
        let mut vars = Variables::new();
        vars.set_money("basic", Money::from_major(1000));
        assert_eq!(formula.evaluate_money(&vars).unwrap(), Money::from_cents(33_333));
        assert_eq!(formula.to_string(), "basic / 3");
    }
}
