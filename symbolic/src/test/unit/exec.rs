use kestrel_ir::ConstValue;
use test_case::test_case;

use crate::exec::{inc, mul, neg, sin};

#[test_case(ConstValue::Int(3), Some(ConstValue::Int(-3)) ; "int")]
#[test_case(ConstValue::Float(1.5), Some(ConstValue::Float(-1.5)) ; "float")]
#[test_case(ConstValue::Int(i64::MIN), None ; "overflow")]
#[test_case(ConstValue::Bool(true), None ; "bool")]
fn test_neg(input: ConstValue, expected: Option<ConstValue>) {
    assert_eq!(neg(&input), expected);
}

#[test]
fn test_inc() {
    assert_eq!(inc(&ConstValue::Int(41)), Some(ConstValue::Int(42)));
    assert_eq!(inc(&ConstValue::Float(0.5)), Some(ConstValue::Float(1.5)));
    assert_eq!(inc(&ConstValue::Int(i64::MAX)), None);
}

#[test]
fn test_mul_mixed() {
    assert_eq!(mul(&ConstValue::Int(6), &ConstValue::Int(7)), Some(ConstValue::Int(42)));
    assert_eq!(mul(&ConstValue::Int(2), &ConstValue::Float(0.25)), Some(ConstValue::Float(0.5)));
}

#[test]
fn test_sin_rejects_non_numbers() {
    assert_eq!(sin(&ConstValue::Bool(false)), None);
}
