use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Registry or rule construction failed in the rewriting core.
    #[snafu(display("{source}"), context(false))]
    Ir { source: kestrel_ir::Error },

    /// Rule family needs an identity element the operator does not declare.
    #[snafu(display("operator '{op}' has no identity element"))]
    NoIdentity { op: String },

    /// Flattening requested for a non-associative operator.
    #[snafu(display("operator '{op}' is not associative"))]
    NotAssociative { op: String },

    /// Constant folding requested for an operator without a numeric function.
    #[snafu(display("operator '{op}' has no numeric function attached"))]
    NoNumericFn { op: String },
}
