//! Literal values carried by expression leaves.
//!
//! [`ConstValue`] is the payload of `Literal` nodes. Equality and hashing are
//! structural: floats compare by bit pattern so that hash consing and
//! substitution consistency checks agree on what "the same literal" means.
//! Numeric comparisons (is this zero? is it greater?) go through the explicit
//! helpers below instead.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::discriminant;
use std::sync::Arc;

/// Dense row-major matrix literal.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Arc<[f64]>,
}

impl Matrix {
    /// Build a matrix from row-major data.
    ///
    /// Returns `None` when `data.len() != rows * cols` or the element count
    /// overflows `usize`.
    pub fn new(rows: usize, cols: usize, data: impl Into<Arc<[f64]>>) -> Option<Self> {
        let data = data.into();
        if data.len() != rows.checked_mul(cols)? {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// All-zero matrix of the given shape, `None` if the element count
    /// overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Option<Self> {
        let len = rows.checked_mul(cols)?;
        Some(Self { rows, cols, data: vec![0.0; len].into() })
    }

    /// Identity matrix of size `n`, `None` if `n * n` overflows `usize`.
    pub fn identity(n: usize) -> Option<Self> {
        let mut data = vec![0.0; n.checked_mul(n)?];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Some(Self { rows: n, cols: n, data: data.into() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| *v == 0.0)
    }

    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|r| {
                (0..self.cols).all(|c| self.data[r * self.cols + c] == if r == c { 1.0 } else { 0.0 })
            })
    }

    /// Elementwise combination of two equally shaped matrices.
    pub fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Option<Matrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        let data: Vec<f64> = self.data.iter().zip(other.data.iter()).map(|(a, b)| f(*a, *b)).collect();
        Some(Matrix { rows: self.rows, cols: self.cols, data: data.into() })
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix { rows: self.rows, cols: self.cols, data: self.data.iter().map(|v| f(*v)).collect() }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.data.iter().zip(other.data.iter()).all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Matrix {}

impl Hash for Matrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        for v in self.data.iter() {
            v.to_bits().hash(state);
        }
    }
}

/// Value of a `Literal` expression.
#[derive(Debug, Clone)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Matrix(Matrix),
}

impl ConstValue {
    /// True for `0`, `0.0`, `-0.0` and all-zero matrices.
    pub fn is_zero(&self) -> bool {
        match self {
            ConstValue::Int(v) => *v == 0,
            ConstValue::Float(v) => *v == 0.0,
            ConstValue::Bool(_) => false,
            ConstValue::Matrix(m) => m.is_zero(),
        }
    }

    /// True for `1`, `1.0` and identity matrices.
    pub fn is_one(&self) -> bool {
        match self {
            ConstValue::Int(v) => *v == 1,
            ConstValue::Float(v) => *v == 1.0,
            ConstValue::Bool(_) => false,
            ConstValue::Matrix(m) => m.is_identity(),
        }
    }

    /// True for scalar numbers (ints and floats).
    pub fn is_number(&self) -> bool {
        matches!(self, ConstValue::Int(_) | ConstValue::Float(_))
    }

    /// Scalar value as `f64`, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric ordering between two scalars.
    ///
    /// Ints compare exactly; mixed int/float pairs compare as `f64`.
    /// Returns `None` for non-numeric values or NaN.
    pub fn numeric_cmp(&self, other: &ConstValue) -> Option<Ordering> {
        match (self, other) {
            (ConstValue::Int(a), ConstValue::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Int(a), ConstValue::Int(b)) => a == b,
            (ConstValue::Float(a), ConstValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstValue::Bool(a), ConstValue::Bool(b)) => a == b,
            (ConstValue::Matrix(a), ConstValue::Matrix(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl Hash for ConstValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
        match self {
            ConstValue::Int(v) => v.hash(state),
            ConstValue::Float(v) => v.to_bits().hash(state),
            ConstValue::Bool(v) => v.hash(state),
            ConstValue::Matrix(m) => m.hash(state),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v:?}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::Matrix(m) => {
                write!(f, "[")?;
                for r in 0..m.rows {
                    if r > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "[")?;
                    for c in 0..m.cols {
                        if c > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{:?}", m.data[r * m.cols + c])?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for ConstValue {
    fn from(v: i64) -> Self {
        ConstValue::Int(v)
    }
}

impl From<f64> for ConstValue {
    fn from(v: f64) -> Self {
        ConstValue::Float(v)
    }
}

impl From<bool> for ConstValue {
    fn from(v: bool) -> Self {
        ConstValue::Bool(v)
    }
}

impl From<Matrix> for ConstValue {
    fn from(m: Matrix) -> Self {
        ConstValue::Matrix(m)
    }
}
