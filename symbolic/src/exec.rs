//! Numeric functions attached to operators as exec handles.
//!
//! The rewriting core treats [`ExecHandle`](kestrel_ir::ExecHandle) as opaque.
//! This crate stores a [`NumericFn`] in it, and constant folding downcasts
//! it back.

use kestrel_ir::{ConstValue, Matrix, Operator};

/// Binary step of a variadic fold.
pub type FoldFn = fn(&ConstValue, &ConstValue) -> Option<ConstValue>;

/// Unary numeric function.
pub type MapFn = fn(&ConstValue) -> Option<ConstValue>;

/// Executable semantics of an operator on literal values.
///
/// Every function returns `None` when it is undefined for its inputs
/// (integer overflow, mismatched matrix shapes, non-numeric operands).
#[derive(Debug, Clone, Copy)]
pub enum NumericFn {
    /// Associative binary operation applied left to right.
    Fold(FoldFn),
    Unary(MapFn),
}

impl NumericFn {
    /// Evaluate on `args`. A fold needs at least one argument, a unary
    /// function exactly one.
    pub fn eval(&self, args: &[ConstValue]) -> Option<ConstValue> {
        match (self, args) {
            (NumericFn::Unary(f), [arg]) => f(arg),
            (NumericFn::Fold(f), [first, rest @ ..]) => {
                rest.iter().try_fold(first.clone(), |acc, arg| f(&acc, arg))
            }
            _ => None,
        }
    }

    pub fn is_fold(&self) -> bool {
        matches!(self, NumericFn::Fold(_))
    }

    /// The numeric function attached to `op`, if any.
    pub fn of(op: &Operator) -> Option<NumericFn> {
        op.props.exec.downcast_ref::<NumericFn>().copied()
    }
}

fn float_result(v: f64) -> Option<ConstValue> {
    v.is_finite().then_some(ConstValue::Float(v))
}

/// Elementwise binary operation: scalars, equal-shape matrices, or a scalar
/// broadcast over a matrix.
fn elementwise(
    a: &ConstValue,
    b: &ConstValue,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<ConstValue> {
    match (a, b) {
        (ConstValue::Int(x), ConstValue::Int(y)) => int_op(*x, *y).map(ConstValue::Int),
        (ConstValue::Matrix(m), ConstValue::Matrix(n)) => m.zip_with(n, float_op).map(ConstValue::Matrix),
        (ConstValue::Matrix(m), s) | (s, ConstValue::Matrix(m)) => {
            let s = s.as_f64()?;
            Some(ConstValue::Matrix(m.map(|v| float_op(v, s))))
        }
        _ => float_result(float_op(a.as_f64()?, b.as_f64()?)),
    }
}

pub fn add(a: &ConstValue, b: &ConstValue) -> Option<ConstValue> {
    elementwise(a, b, i64::checked_add, |x, y| x + y)
}

/// Product. Two matrices multiply as matrices; anything else elementwise.
pub fn mul(a: &ConstValue, b: &ConstValue) -> Option<ConstValue> {
    match (a, b) {
        (ConstValue::Matrix(m), ConstValue::Matrix(n)) => matmul(m, n).map(ConstValue::Matrix),
        _ => elementwise(a, b, i64::checked_mul, |x, y| x * y),
    }
}

fn matmul(a: &Matrix, b: &Matrix) -> Option<Matrix> {
    if a.cols() != b.rows() {
        return None;
    }
    let (lhs, rhs) = (a.data(), b.data());
    let mut data = vec![0.0; a.rows() * b.cols()];
    for i in 0..a.rows() {
        for j in 0..b.cols() {
            data[i * b.cols() + j] = (0..a.cols()).map(|k| lhs[i * a.cols() + k] * rhs[k * b.cols() + j]).sum();
        }
    }
    Matrix::new(a.rows(), b.cols(), data)
}

pub fn neg(a: &ConstValue) -> Option<ConstValue> {
    match a {
        ConstValue::Int(v) => v.checked_neg().map(ConstValue::Int),
        ConstValue::Float(v) => Some(ConstValue::Float(-v)),
        ConstValue::Matrix(m) => Some(ConstValue::Matrix(m.map(|v| -v))),
        ConstValue::Bool(_) => None,
    }
}

pub fn inc(a: &ConstValue) -> Option<ConstValue> {
    match a {
        ConstValue::Int(v) => v.checked_add(1).map(ConstValue::Int),
        _ => float_result(a.as_f64()? + 1.0),
    }
}

pub fn sin(a: &ConstValue) -> Option<ConstValue> {
    float_result(a.as_f64()?.sin())
}
