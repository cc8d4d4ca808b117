//! Keypad arithmetic: a flat `+ - * /` expression evaluator.
//!
//! Evaluation is total. Malformed input degrades to the cleanest prefix
//! interpretation, and anything without an operand is `0`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
        }
    }

    fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide if rhs == 0.0 => 0.0,
            Operator::Divide => lhs / rhs,
        }
    }
}

pub fn is_operator(ch: char) -> bool {
    Operator::from_char(ch).is_some()
}

pub fn is_decimal_separator(ch: char) -> bool {
    ch == ',' || ch == '.'
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(Operator),
}

fn flush_number(number: &mut String, tokens: &mut Vec<Token>) {
    if number.is_empty() {
        return;
    }
    // Only the prefix up to a second separator counts: "1.2.3" reads as 1.2.
    let valid = match number.find('.') {
        Some(first) => number[first + 1..]
            .find('.')
            .map_or(number.as_str(), |second| &number[..first + 1 + second]),
        None => number.as_str(),
    };
    tokens.push(Token::Number(valid.parse().unwrap_or(0.0)));
    number.clear();
}

fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut number = String::new();

    for ch in expression.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
        } else if is_decimal_separator(ch) {
            number.push('.');
        } else if let Some(op) = Operator::from_char(ch) {
            flush_number(&mut number, &mut tokens);
            tokens.push(Token::Op(op));
        }
    }
    flush_number(&mut number, &mut tokens);

    tokens
}

fn apply_top(operators: &mut Vec<Operator>, output: &mut Vec<f64>) {
    if let Some(op) = operators.pop() {
        let rhs = output.pop().unwrap_or(0.0);
        let lhs = output.pop().unwrap_or(0.0);
        output.push(op.apply(lhs, rhs));
    }
}

/// Evaluates `expression` with standard precedence, left to right.
///
/// - Empty input or no operands → `0`
/// - Trailing operators are dropped (`"250+"` → `250`)
/// - Division by zero → `0`
/// - Non-finite results → `0`
pub fn evaluate(expression: &str) -> f64 {
    let mut tokens = tokenize(expression);

    while matches!(tokens.last(), Some(Token::Op(_))) {
        tokens.pop();
    }

    let mut output: Vec<f64> = Vec::new();
    let mut operators: Vec<Operator> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(value) => output.push(value),
            Token::Op(op) => {
                while operators
                    .last()
                    .is_some_and(|top| top.precedence() >= op.precedence())
                {
                    apply_top(&mut operators, &mut output);
                }
                operators.push(op);
            }
        }
    }

    while !operators.is_empty() {
        apply_top(&mut operators, &mut output);
    }

    let result = output.first().copied().unwrap_or(0.0);
    if result.is_finite() { result } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_and_operand_free_input() {
        assert_eq!(evaluate(""), 0.0);
        assert_eq!(evaluate("   "), 0.0);
        assert_eq!(evaluate("+"), 0.0);
        assert_eq!(evaluate("abc"), 0.0);
    }

    #[test]
    fn test_single_numbers() {
        assert_eq!(evaluate("42"), 42.0);
        assert_close(evaluate("3.14"), 3.14);
        assert_close(evaluate("3,14"), 3.14);
    }

    #[test]
    fn test_basic_operations() {
        assert_eq!(evaluate("10+5"), 15.0);
        assert_eq!(evaluate("10-3"), 7.0);
        assert_eq!(evaluate("4*5"), 20.0);
        assert_eq!(evaluate("20/4"), 5.0);
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(evaluate("2+3*4"), 14.0);
        assert_eq!(evaluate("10-6/2"), 7.0);
        assert_eq!(evaluate("2+3*4-1"), 13.0);
        assert_eq!(evaluate("250+10-25*10/2"), 135.0);
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(evaluate("10-3-2"), 5.0);
        assert_eq!(evaluate("100/10/2"), 5.0);
    }

    #[test]
    fn test_trailing_operators_are_dropped() {
        assert_eq!(evaluate("100+"), 100.0);
        assert_eq!(evaluate("250+"), 250.0);
        assert_eq!(evaluate("10+5*"), 15.0);
        assert_eq!(evaluate("10+5*-"), 15.0);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(evaluate("10/0"), 0.0);
        assert_eq!(evaluate("5+10/0"), 5.0);
    }

    #[test]
    fn test_decimals_and_whitespace() {
        assert_close(evaluate("10,5+0,5"), 11.0);
        assert_eq!(evaluate("10 + 5"), 15.0);
        assert_eq!(evaluate("100 000,00"), 100000.0);
        assert_close(evaluate("10/3"), 10.0 / 3.0);
    }

    #[test]
    fn test_extra_separators_keep_valid_prefix() {
        assert_close(evaluate("1,2,3"), 1.2);
        assert_close(evaluate("1.2.3"), 1.2);
        assert_close(evaluate("10+1.5.5"), 11.5);
        assert_close(evaluate("12,5,5+3"), 15.5);
        assert_eq!(evaluate("7,,"), 7.0);
        assert_eq!(evaluate(","), 0.0);
    }

    #[test]
    fn test_unknown_characters_are_ignored() {
        assert_eq!(evaluate("1a0$+5"), 15.0);
        assert_eq!(evaluate("(2+3)*4"), 14.0);
    }

    #[test]
    fn test_non_finite_collapses_to_zero() {
        let huge = format!("{}*{}", "9".repeat(200), "9".repeat(200));
        assert_eq!(evaluate(&huge), 0.0);
    }

    #[test]
    fn test_operator_round_trip() {
        for ch in ['+', '-', '*', '/'] {
            assert_eq!(Operator::from_char(ch).unwrap().as_char(), ch);
        }
        assert!(Operator::from_char(',').is_none());
        assert!(is_operator('*'));
        assert!(!is_operator('x'));
    }
}
