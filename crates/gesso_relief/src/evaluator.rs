//! Expression evaluator contract.

use gesso_carton::String;

use crate::errors::EvalError;
use crate::value::{Params, Value};

/// Turns an expression string plus a parameter map into a value.
///
/// Implementations must be pure: the same expression and parameters always
/// produce the same result, and nothing is retained between calls.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str, params: &Params) -> Result<Value, EvalError>;

    fn evaluate_bool(&self, expression: &str, params: &Params) -> Result<bool, EvalError> {
        match self.evaluate(expression, params)? {
            Value::Bool(b) => Ok(b),
            other => Err(unexpected_type(expression, "bool", &other)),
        }
    }

    fn evaluate_string(&self, expression: &str, params: &Params) -> Result<String, EvalError> {
        match self.evaluate(expression, params)? {
            Value::String(s) => Ok(s),
            other => Err(unexpected_type(expression, "string", &other)),
        }
    }
}

fn unexpected_type(expression: &str, expected: &'static str, found: &Value) -> EvalError {
    EvalError::UnexpectedType {
        expression: expression.into(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    /// Looks the expression up as a parameter name
    struct Lookup;

    impl Evaluator for Lookup {
        fn evaluate(&self, expression: &str, params: &Params) -> Result<Value, EvalError> {
            params
                .get(expression)
                .cloned()
                .ok_or_else(|| EvalError::MissingParameter(expression.into()))
        }
    }

    #[test]
    fn test_typed_accessors() {
        let params = params! { "flag" => true, "name" => "Ann" };
        assert_eq!(Lookup.evaluate_bool("flag", &params), Ok(true));
        assert_eq!(Lookup.evaluate_string("name", &params).as_deref(), Ok("Ann"));
        assert_eq!(
            Lookup.evaluate_bool("name", &params),
            Err(EvalError::UnexpectedType {
                expression: "name".into(),
                expected: "bool",
                found: "string",
            })
        );
        assert!(matches!(
            Lookup.evaluate_string("missing", &params),
            Err(EvalError::MissingParameter(_))
        ));
    }
}
