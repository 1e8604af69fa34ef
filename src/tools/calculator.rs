//! Arithmetic over a closed grammar.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```
//!
//! There are no identifiers, calls or attribute access, so nothing but
//! arithmetic can ever run. Integers stay integers under `+ - *`; `/` and
//! mixed operands produce floats. Integers are unbounded.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Nesting beyond this is rejected instead of recursing further.
const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    fn as_f64(&self) -> Result<f64, CalcError> {
        match self {
            Number::Int(i) => i.to_f64().filter(|f| f.is_finite()).ok_or(CalcError::IntTooLarge),
            Number::Float(f) => Ok(*f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip float text: always a decimal point or an exponent,
/// exponent form below 1e-4 and from 1e16 up.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    if (1e-4..1e16).contains(&v.abs()) {
        let s = v.to_string();
        return if s.contains('.') { s } else { format!("{s}.0") };
    }
    let s = format!("{v:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("leading zeros in decimal integer literals are not permitted: '{0}'")]
    LeadingZeros(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("int too large to convert to float")]
    IntTooLarge,
    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
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
            Token::Num(n) => write!(f, "number {n}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_ascii_whitespace() => {
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
                let mut literal = String::new();
                let mut seen_dot = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                        seen_dot |= c == '.';
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Num(parse_number(&literal)?), pos));
                continue;
            }
            other => return Err(CalcError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push((token, pos));
        chars.next();
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, CalcError> {
    if literal == "." {
        return Err(CalcError::InvalidNumber(literal.to_string()));
    }
    if literal.contains('.') {
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| CalcError::InvalidNumber(literal.to_string()))
    } else if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
        Err(CalcError::LeadingZeros(literal.to_string()))
    } else {
        literal
            .parse::<BigInt>()
            .map(Number::Int)
            .map_err(|_| CalcError::InvalidNumber(literal.to_string()))
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| t.clone())
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        next
    }

    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            acc = if op == Token::Plus { add(acc, rhs)? } else { sub(acc, rhs)? };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Number, CalcError> {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            acc = if op == Token::Star { mul(acc, rhs)? } else { div(acc, rhs)? };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<Number, CalcError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.advance();
                match self.nested(Self::unary)? {
                    Number::Int(i) => Ok(Number::Int(-i)),
                    Number::Float(f) => Ok(Number::Float(-f)),
                }
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Number, CalcError> {
        match self.advance() {
            Some((Token::Num(n), _)) => Ok(n),
            Some((Token::LParen, _)) => {
                let value = self.nested(Self::expr)?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((found, pos)) => Err(CalcError::UnexpectedToken { found: found.to_string(), pos }),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some((found, pos)) => Err(CalcError::UnexpectedToken { found: found.to_string(), pos }),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn nested(&mut self, rule: fn(&mut Self) -> Result<Number, CalcError>) -> Result<Number, CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        let value = rule(self);
        self.depth -= 1;
        value
    }
}

fn add(a: Number, b: Number) -> Result<Number, CalcError> {
    match (&a, &b) {
        (Number::Int(x), Number::Int(y)) => Ok(Number::Int(x + y)),
        _ => Ok(Number::Float(a.as_f64()? + b.as_f64()?)),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, CalcError> {
    match (&a, &b) {
        (Number::Int(x), Number::Int(y)) => Ok(Number::Int(x - y)),
        _ => Ok(Number::Float(a.as_f64()? - b.as_f64()?)),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, CalcError> {
    match (&a, &b) {
        (Number::Int(x), Number::Int(y)) => Ok(Number::Int(x * y)),
        _ => Ok(Number::Float(a.as_f64()? * b.as_f64()?)),
    }
}

fn div(a: Number, b: Number) -> Result<Number, CalcError> {
    let zero = match &b {
        Number::Int(y) => y.is_zero(),
        Number::Float(y) => *y == 0.0,
    };
    if zero {
        return Err(CalcError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64()? / b.as_f64()?))
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<Number, CalcError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let value = parser.expr()?;
    match parser.advance() {
        None => Ok(value),
        Some((found, pos)) => Err(CalcError::UnexpectedToken { found: found.to_string(), pos }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(expr: &str) -> String {
        evaluate(expr).map(|n| n.to_string()).unwrap_or_else(|e| format!("error: {e}"))
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(evaluate("25 * 4 + 10"), Ok(Number::Int(BigInt::from(110))));
        assert_eq!(eval_str("2 + 3 * 4"), "14");
        assert_eq!(eval_str("(2 + 3) * 4"), "20");
        assert_eq!(eval_str("10 - 2 - 3"), "5");
        assert_eq!(eval_str("-(3 - 5)"), "2");
        assert_eq!(eval_str("--4"), "4");
        assert_eq!(eval_str("+7"), "7");
    }

    #[test]
    fn division_always_produces_float() {
        assert_eq!(eval_str("4 / 2"), "2.0");
        assert_eq!(eval_str("7/2"), "3.5");
        assert_eq!(eval_str("1 / 3"), "0.3333333333333333");
        assert_eq!(eval_str("8 / 2 / 2"), "2.0");
    }

    #[test]
    fn floats_render_like_shortest_repr() {
        assert_eq!(eval_str("0.1 + 0.2"), "0.30000000000000004");
        assert_eq!(eval_str("1.5 * 2"), "3.0");
        assert_eq!(eval_str(".5 + 1"), "1.5");
        assert_eq!(eval_str("10000000000000000.0 * 1"), "1e+16");
        assert_eq!(eval_str("1 / 100000"), "1e-05");
        assert_eq!(eval_str("-0.0"), "-0.0");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("   "), Err(CalcError::Empty));
        assert_eq!(evaluate("2 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("."), Err(CalcError::InvalidNumber(".".to_string())));
        assert!(matches!(evaluate("1 + 2)"), Err(CalcError::UnexpectedToken { pos: 5, .. })));
        assert!(matches!(evaluate("3 4"), Err(CalcError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("* 2"), Err(CalcError::UnexpectedToken { pos: 0, .. })));
    }

    #[test]
    fn identifiers_and_calls_are_rejected() {
        assert_eq!(
            evaluate("__import__('os')"),
            Err(CalcError::UnexpectedChar { ch: '_', pos: 0 })
        );
        assert!(matches!(evaluate("2 ** 3"), Err(CalcError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("abs(1)"), Err(CalcError::UnexpectedChar { ch: 'a', .. })));
    }

    #[test]
    fn arithmetic_faults() {
        assert_eq!(evaluate("1 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("1.5 / (2 - 2.0)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn integers_are_unbounded() {
        assert_eq!(eval_str("10000000000 * 10000000000"), "100000000000000000000");
        assert_eq!(eval_str("9223372036854775807 + 1"), "9223372036854775808");
        assert_eq!(eval_str("-99999999999999999999 - 1"), "-100000000000000000000");
        assert_eq!(eval_str("10000000000 * 10000000000 / 10000000000"), "10000000000.0");
    }

    #[test]
    fn huge_integers_do_not_mix_with_floats() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(evaluate(&format!("{huge} + 0.5")), Err(CalcError::IntTooLarge));
        assert_eq!(evaluate(&format!("{huge} / 0")), Err(CalcError::DivisionByZero));
        assert_eq!(eval_str(&format!("{huge} - {huge}")), "0");
    }

    #[test]
    fn leading_zeros_and_foreign_whitespace_are_rejected() {
        assert_eq!(evaluate("007 + 1"), Err(CalcError::LeadingZeros("007".to_string())));
        assert_eq!(eval_str("0 + 00"), "0");
        assert_eq!(eval_str("007.5"), "7.5");
        assert_eq!(eval_str("0.25 * 4"), "1.0");
        assert_eq!(
            evaluate("1\u{00a0}+ 1"),
            Err(CalcError::UnexpectedChar { ch: '\u{00a0}', pos: 1 })
        );
        assert_eq!(eval_str(" 1\t+\n1 "), "2");
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));

        let fine = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(evaluate(&fine), Ok(Number::Int(BigInt::from(1))));
    }
}
