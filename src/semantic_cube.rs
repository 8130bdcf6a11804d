//! Semantic Cube: `(type, op, type) -> result type` resolution table.
//!
//! A flat table of exact triples: `int`/`float` mixes in arithmetic fall
//! back to `float`; relationals always yield `bool`.

use crate::ast::BinOp;
use crate::memory::ValueType;

pub struct SemanticCube;

impl SemanticCube {
    /// Resolve `(left, op, right) -> result`, or `None` if the triple is not
    /// a valid combination.
    pub fn check(left: ValueType, op: BinOp, right: ValueType) -> Option<ValueType> {
        use ValueType::*;
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => match (left, right) {
                (Int, Int) => Some(Int),
                (Float, Float) | (Int, Float) | (Float, Int) => Some(Float),
                _ => None,
            },
            BinOp::Div => match (left, right) {
                (Int, Int) => Some(Float),
                (Float, Float) | (Int, Float) | (Float, Int) => Some(Float),
                _ => None,
            },
            BinOp::Lt | BinOp::Gt | BinOp::Ne => match (left, right) {
                (Int, Int) | (Float, Float) | (Int, Float) | (Float, Int) => Some(Bool),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_div_int_widens_to_float() {
        assert_eq!(
            SemanticCube::check(ValueType::Int, BinOp::Div, ValueType::Int),
            Some(ValueType::Float)
        );
    }

    #[test]
    fn arithmetic_with_any_float_is_float() {
        assert_eq!(
            SemanticCube::check(ValueType::Int, BinOp::Add, ValueType::Float),
            Some(ValueType::Float)
        );
    }

    #[test]
    fn relational_yields_bool() {
        assert_eq!(
            SemanticCube::check(ValueType::Float, BinOp::Lt, ValueType::Int),
            Some(ValueType::Bool)
        );
    }

    #[test]
    fn bool_operands_are_rejected() {
        assert_eq!(SemanticCube::check(ValueType::Bool, BinOp::Add, ValueType::Int), None);
    }
}
