//! The `expression` module evaluates the legacy share encoding, which expresses the share
//! value as a small function call such as `sum(10, 20)` or `lcm(4, 6)`.
//!

use crate::math::lcm;
use crate::{DecodingError, PluralityError, PluralityResult};

/// The characters that are trimmed around arguments.
const BLANKS: &[char] = &[' ', '\t'];

/// The function parses the comma-separated arguments of an expression.
///
/// Spaces and tabs around each argument are trimmed. An empty argument list `()` results in
/// no arguments, whereas a blank argument, e.g. `( )` or `(1,,2)`, is rejected.
fn parse_arguments(arguments: &str, expression: &str) -> PluralityResult<Vec<i64>> {
    if arguments.is_empty() {
        return Ok(vec![]);
    }
    arguments
        .split(',')
        .map(|argument| -> PluralityResult<i64> {
            let argument = argument.trim_matches(BLANKS);
            if argument.is_empty() {
                return Err(DecodingError::MalformedExpression(format!(
                    "Empty argument in expression '{}'.",
                    expression
                ))
                .into());
            }
            argument.parse::<i64>().map_err(|_| {
                DecodingError::MalformedExpression(format!(
                    "Invalid argument '{}' in expression '{}'.",
                    argument, expression
                ))
                .into()
            })
        })
        .collect()
}

/// The function evaluates a legacy share expression.
///
/// The expression has the form `name(arg1, arg2, ...)` with integer arguments. The supported
/// functions are `sum`, `subtraction` (or `subtract`), `mul` (or `multiply`, `product`),
/// `div` (or `divide`), and `lcm`. All arithmetic is checked: an overflow results in an
/// [ArithmeticOverflow](crate::PluralityError::ArithmeticOverflow) error.
///
/// * `expression` - The expression string.
pub fn evaluate_expression(expression: &str) -> PluralityResult<i64> {
    let trimmed = expression.trim();
    let (name, rest) = match trimmed.find('(') {
        Some(position) => (trimmed[..position].trim(), &trimmed[position + 1..]),
        None => {
            return Err(DecodingError::MalformedExpression(format!(
                "Missing '(' in expression '{}'.",
                expression
            ))
            .into())
        }
    };
    let arguments = match rest.strip_suffix(')') {
        Some(arguments) => arguments,
        None => {
            return Err(DecodingError::MalformedExpression(format!(
                "Missing ')' in expression '{}'.",
                expression
            ))
            .into())
        }
    };
    let overflow = || PluralityError::ArithmeticOverflow(expression.to_string());
    let arity_error = |message: &str| -> PluralityError {
        DecodingError::ArityError(format!("{} in expression '{}'.", message, expression)).into()
    };
    match name {
        "sum" => parse_arguments(arguments, expression)?
            .into_iter()
            .try_fold(0i64, i64::checked_add)
            .ok_or_else(overflow),
        "subtraction" | "subtract" => {
            let arguments = parse_arguments(arguments, expression)?;
            if arguments.len() < 2 {
                return Err(arity_error("Subtraction requires at least 2 arguments"));
            }
            arguments[1..]
                .iter()
                .try_fold(arguments[0], |result, &value| result.checked_sub(value))
                .ok_or_else(overflow)
        }
        "mul" | "multiply" | "product" => parse_arguments(arguments, expression)?
            .into_iter()
            .try_fold(1i64, i64::checked_mul)
            .ok_or_else(overflow),
        "div" | "divide" => {
            let arguments = parse_arguments(arguments, expression)?;
            if arguments.len() != 2 {
                return Err(arity_error("Division requires exactly 2 arguments"));
            }
            if arguments[1] == 0 {
                return Err(DecodingError::DivisionByZero(expression.to_string()).into());
            }
            arguments[0].checked_div(arguments[1]).ok_or_else(overflow)
        }
        "lcm" => {
            let arguments = parse_arguments(arguments, expression)?;
            if arguments.is_empty() {
                return Err(arity_error("LCM requires at least 1 argument"));
            }
            let mut result = arguments[0];
            for &value in &arguments[1..] {
                result = lcm(result, value)?;
            }
            Ok(result)
        }
        _ => Err(DecodingError::UnknownFunction(name.to_string()).into()),
    }
}

// ******************************** TESTS ********************************
