//! Default expression evaluator.
//!
//! A small expression language, enough for template conditions and lookups:
//!
//! - literals: numbers, `'single'` or `"double"` quoted strings, `true`,
//!   `false`, `null`
//! - parameter names and dotted paths into maps (`user.address.city`)
//! - `!` and unary `-`, `* / %`, `+ -`, `< <= > >=`, `== !=`, `&&`, `||`
//!   with the usual precedence, parentheses for grouping
//!
//! `&&` and `||` short-circuit. `+` adds numbers or concatenates strings.
//! Values of different types are never equal. Parsed expressions are cached
//! per evaluator.

use std::sync::{Arc, RwLock};

use gesso_carton::{format_compact, FxHashMap, String};
use gesso_relief::{EvalError, Evaluator, Params, Value};

/// The evaluator registered by default under the `"evaluator"` key.
#[derive(Debug, Default)]
pub struct ExpressionEvaluator {
    cache: RwLock<FxHashMap<String, Arc<Expr>>>,
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `expression`, reusing an earlier parse when possible
    fn compile(&self, expression: &str) -> Result<Arc<Expr>, EvalError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(cached) = cache.get(expression) {
                return Ok(Arc::clone(cached));
            }
        }

        let parsed = Arc::new(ExprParser::new(expression)?.parse()?);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(String::from(expression), Arc::clone(&parsed));
        }
        Ok(parsed)
    }
}

impl Evaluator for ExpressionEvaluator {
    fn evaluate(&self, expression: &str, params: &Params) -> Result<Value, EvalError> {
        self.compile(expression)?.eval(params)
    }
}

// ========== AST ==========

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Path(String),
    Not(Box<Expr>),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

impl Expr {
    fn eval(&self, params: &Params) -> Result<Value, EvalError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Path(path) => params
                .lookup(path)
                .cloned()
                .ok_or_else(|| EvalError::MissingParameter(path.clone())),
            Self::Not(operand) => match operand.eval(params)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(invalid_unary("!", &other)),
            },
            Self::Negate(operand) => match operand.eval(params)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(invalid_unary("-", &other)),
            },
            Self::Binary(op @ (BinaryOp::And | BinaryOp::Or), left, right) => {
                let left = left.eval(params)?;
                let Value::Bool(l) = left else {
                    return Err(invalid_operands(*op, &left, "bool"));
                };
                // Short-circuit
                if (*op == BinaryOp::And) != l {
                    return Ok(Value::Bool(l));
                }
                match right.eval(params)? {
                    Value::Bool(r) => Ok(Value::Bool(r)),
                    other => Err(invalid_operands(*op, &left, other.type_name())),
                }
            }
            Self::Binary(op, left, right) => binary(*op, left.eval(params)?, right.eval(params)?),
        }
    }
}

fn invalid_unary(operator: &'static str, operand: &Value) -> EvalError {
    EvalError::InvalidOperands {
        operator,
        left: "nothing",
        right: operand.type_name(),
    }
}

fn invalid_operands(op: BinaryOp, left: &Value, right: &'static str) -> EvalError {
    EvalError::InvalidOperands {
        operator: op.as_str(),
        left: left.type_name(),
        right,
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    use BinaryOp::*;

    let result = match (op, &left, &right) {
        (Eq, _, _) => Value::Bool(left == right),
        (NotEq, _, _) => Value::Bool(left != right),
        (Add, Value::String(l), Value::String(r)) => Value::String(format_compact!("{l}{r}")),
        (Add, Value::Number(l), Value::Number(r)) => Value::Number(l + r),
        (Sub, Value::Number(l), Value::Number(r)) => Value::Number(l - r),
        (Mul, Value::Number(l), Value::Number(r)) => Value::Number(l * r),
        (Div, Value::Number(l), Value::Number(r)) => Value::Number(l / r),
        (Rem, Value::Number(l), Value::Number(r)) => Value::Number(l % r),
        (Lt | LtEq | Gt | GtEq, Value::Number(l), Value::Number(r)) => {
            Value::Bool(compare(op, l.partial_cmp(r)))
        }
        (Lt | LtEq | Gt | GtEq, Value::String(l), Value::String(r)) => {
            Value::Bool(compare(op, Some(l.cmp(r))))
        }
        _ => return Err(invalid_operands(op, &left, right.type_name())),
    };
    Ok(result)
}

fn compare(op: BinaryOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;

    match (op, ordering) {
        (_, None) => false,
        (BinaryOp::Lt, Some(o)) => o == Less,
        (BinaryOp::LtEq, Some(o)) => o != Greater,
        (BinaryOp::Gt, Some(o)) => o == Greater,
        (BinaryOp::GtEq, Some(o)) => o != Less,
        _ => false,
    }
}

// ========== Lexer ==========

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Number(f64),
    Str(String),
    /// Identifier or dotted path
    Path(String),
    Op(&'static str),
    LParen,
    RParen,
}

fn syntax_error(expression: &str, reason: impl Into<String>) -> EvalError {
    EvalError::Syntax {
        expression: expression.into(),
        reason: reason.into(),
    }
}

fn lex(expression: &str) -> Result<Vec<Tok>, EvalError> {
    const OPERATORS: [&str; 15] = [
        "||", "&&", "==", "!=", "<=", ">=", "<", ">", "!", "+", "-", "*", "/", "%", ".",
    ];

    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text = &expression[start..i];
            let number = text
                .parse::<f64>()
                .map_err(|_| syntax_error(expression, format_compact!("bad number `{text}`")))?;
            tokens.push(Tok::Number(number));
        } else if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            // Dotted path segments may start with a digit (`items.0`)
            while i + 1 < bytes.len()
                && bytes[i] == b'.'
                && (bytes[i + 1].is_ascii_alphanumeric() || bytes[i + 1] == b'_')
            {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
            }
            tokens.push(Tok::Path(expression[start..i].into()));
        } else if c == b'"' || c == b'\'' {
            let start = i + 1;
            let Some(len) = expression[start..].find(c as char) else {
                return Err(syntax_error(expression, "unterminated string"));
            };
            tokens.push(Tok::Str(expression[start..start + len].into()));
            i = start + len + 1;
        } else if c == b'(' {
            tokens.push(Tok::LParen);
            i += 1;
        } else if c == b')' {
            tokens.push(Tok::RParen);
            i += 1;
        } else {
            let rest = &expression[i..];
            let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
                let found = rest.chars().next().unwrap_or_default();
                return Err(syntax_error(
                    expression,
                    format_compact!("unexpected character `{found}`"),
                ));
            };
            if *op == "." {
                return Err(syntax_error(expression, "unexpected `.`"));
            }
            tokens.push(Tok::Op(*op));
            i += op.len();
        }
    }

    Ok(tokens)
}

// ========== Parser ==========

/// Recursive descent parser over the token list
struct ExprParser<'e> {
    expression: &'e str,
    tokens: Vec<Tok>,
    pos: usize,
}

/// Binary precedence levels, loosest first
const LEVELS: [&[(&str, BinaryOp)]; 6] = [
    &[("||", BinaryOp::Or)],
    &[("&&", BinaryOp::And)],
    &[("==", BinaryOp::Eq), ("!=", BinaryOp::NotEq)],
    &[
        ("<", BinaryOp::Lt),
        ("<=", BinaryOp::LtEq),
        (">", BinaryOp::Gt),
        (">=", BinaryOp::GtEq),
    ],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
    &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Rem)],
];

impl<'e> ExprParser<'e> {
    fn new(expression: &'e str) -> Result<Self, EvalError> {
        Ok(Self {
            expression,
            tokens: lex(expression)?,
            pos: 0,
        })
    }

    fn parse(mut self) -> Result<Expr, EvalError> {
        if self.tokens.is_empty() {
            return Err(self.error("empty expression"));
        }
        let expr = self.binary(0)?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some(tok) => Err(self.error(format_compact!("unexpected {}", describe(tok)))),
        }
    }

    fn error(&self, reason: impl Into<String>) -> EvalError {
        syntax_error(self.expression, reason)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    /// Operator at the current position if it belongs to `level`
    fn peek_op(&self, level: &[(&str, BinaryOp)]) -> Option<BinaryOp> {
        match self.tokens.get(self.pos) {
            Some(Tok::Op(op)) => level
                .iter()
                .find(|(text, _)| text == op)
                .map(|(_, binary)| *binary),
            _ => None,
        }
    }

    fn binary(&mut self, level: usize) -> Result<Expr, EvalError> {
        let Some(operators) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut left = self.binary(level + 1)?;
        while let Some(op) = self.peek_op(operators) {
            self.pos += 1;
            let right = self.binary(level + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        match self.tokens.get(self.pos) {
            Some(Tok::Op("!")) => {
                self.pos += 1;
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            Some(Tok::Op("-")) => {
                self.pos += 1;
                Ok(Expr::Negate(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Tok::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
            Some(Tok::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Tok::Path(path)) => Ok(match path.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Path(path),
            }),
            Some(Tok::LParen) => {
                let inner = self.binary(0)?;
                match self.next() {
                    Some(Tok::RParen) => Ok(inner),
                    _ => Err(self.error("missing `)`")),
                }
            }
            Some(tok) => Err(self.error(format_compact!("unexpected {}", describe(&tok)))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

fn describe(tok: &Tok) -> String {
    match tok {
        Tok::Number(n) => format_compact!("number `{n}`"),
        Tok::Str(s) => format_compact!("string `{s}`"),
        Tok::Path(p) => format_compact!("name `{p}`"),
        Tok::Op(op) => format_compact!("`{op}`"),
        Tok::LParen => "`(`".into(),
        Tok::RParen => "`)`".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::params;

    fn eval(expression: &str, params: &Params) -> Result<Value, EvalError> {
        ExpressionEvaluator::new().evaluate(expression, params)
    }

    #[test]
    fn test_literals() {
        let params = Params::new();
        assert_eq!(eval("42", &params), Ok(Value::Number(42.0)));
        assert_eq!(eval("1.5", &params), Ok(Value::Number(1.5)));
        assert_eq!(eval("'single'", &params), Ok(Value::from("single")));
        assert_eq!(eval("\"double\"", &params), Ok(Value::from("double")));
        assert_eq!(eval("true", &params), Ok(Value::Bool(true)));
        assert_eq!(eval("null", &params), Ok(Value::Null));
    }

    #[test]
    fn test_paths() {
        let params = params! {
            "name" => "Ann",
            "user" => params! { "address" => params! { "city" => "Lisbon" } },
        };
        assert_eq!(eval("name", &params), Ok(Value::from("Ann")));
        assert_eq!(eval("user.address.city", &params), Ok(Value::from("Lisbon")));
        assert_eq!(
            eval("user.phone", &params),
            Err(EvalError::MissingParameter("user.phone".into()))
        );
    }

    #[test]
    fn test_precedence() {
        let params = params! { "a" => 2, "b" => 3 };
        assert_eq!(eval("1 + a * b", &params), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + a) * b", &params), Ok(Value::Number(9.0)));
        assert_eq!(eval("-a + 10 % 4", &params), Ok(Value::Number(0.0)));
        assert_eq!(eval("a < b && b <= 3 || false", &params), Ok(Value::Bool(true)));
        assert_eq!(eval("!(a == 2)", &params), Ok(Value::Bool(false)));
        assert_eq!(eval("a + 1 == b", &params), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_short_circuit() {
        let params = params! { "flag" => false };
        // `missing` is never looked up
        assert_eq!(eval("flag && missing", &params), Ok(Value::Bool(false)));
        assert_eq!(eval("!flag || missing", &params), Ok(Value::Bool(true)));
        assert!(matches!(
            eval("!flag && missing", &params),
            Err(EvalError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_strings() {
        let params = params! { "first" => "Ann", "last" => "Lee" };
        assert_eq!(eval("first + ' ' + last", &params), Ok(Value::from("Ann Lee")));
        assert_eq!(eval("first < last", &params), Ok(Value::Bool(true)));
        assert_eq!(eval("first == 'Ann'", &params), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_equality_across_types() {
        let params = params! { "n" => 1, "s" => "1" };
        assert_eq!(eval("n == s", &params), Ok(Value::Bool(false)));
        assert_eq!(eval("n != s", &params), Ok(Value::Bool(true)));
        assert_eq!(eval("null == null", &params), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_invalid_operands() {
        let params = params! { "n" => 1, "s" => "x" };
        assert_eq!(
            eval("n + s", &params),
            Err(EvalError::InvalidOperands {
                operator: "+",
                left: "number",
                right: "string",
            })
        );
        assert!(matches!(eval("!n", &params), Err(EvalError::InvalidOperands { .. })));
        assert!(matches!(eval("n && true", &params), Err(EvalError::InvalidOperands { .. })));
    }

    #[test]
    fn test_syntax_errors() {
        let params = Params::new();
        for expression in ["", "1 +", "(1", "'open", "a b", "a ? b", "a..b", ")"] {
            assert!(
                matches!(eval(expression, &params), Err(EvalError::Syntax { .. })),
                "{expression:?} should not parse"
            );
        }
    }

    #[test]
    fn test_typed_accessors() {
        let evaluator = ExpressionEvaluator::new();
        let params = params! { "count" => 3, "name" => "Ann" };
        assert_eq!(evaluator.evaluate_bool("count > 2", &params), Ok(true));
        assert_eq!(evaluator.evaluate_string("name", &params).as_deref(), Ok("Ann"));
        assert!(matches!(
            evaluator.evaluate_string("count", &params),
            Err(EvalError::UnexpectedType { found: "number", .. })
        ));
    }

    #[test]
    fn test_cache_reuses_parse() {
        let evaluator = ExpressionEvaluator::new();
        let first = evaluator.compile("a + 1").unwrap();
        let second = evaluator.compile("a + 1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            evaluator.evaluate("a + 1", &params! { "a" => 1 }),
            Ok(Value::Number(2.0))
        );
        assert_eq!(
            evaluator.evaluate("a + 1", &params! { "a" => 41 }),
            Ok(Value::Number(42.0))
        );
    }
}
