use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    // =========================================================================
    // Registry construction
    // =========================================================================
    /// Operator symbol is not present in the symbol table.
    #[snafu(display("unknown operator symbol '{symbol}'"))]
    UnknownSymbol { symbol: String },

    /// Operator symbol registered twice.
    #[snafu(display("operator symbol '{symbol}' is already defined"))]
    DuplicateSymbol { symbol: String },

    /// Extractor registered twice.
    #[snafu(display("extractor '{name}' is already defined"))]
    DuplicateExtractor { name: String },

    // =========================================================================
    // Rule construction
    // =========================================================================
    /// Pattern references an extractor that is not registered.
    #[snafu(display("unknown extractor '{name}'"))]
    UnknownExtractor { name: String },

    /// Commutative compound pattern with more than one sequence variable.
    #[snafu(display("commutative pattern ({op} ...) contains more than one sequence variable: {vars:?}"))]
    MultipleSequenceVars { op: String, vars: Vec<String> },

    /// Sequence variable used where a single expression is expected.
    #[snafu(display("sequence variable '{var}' must appear directly inside a compound"))]
    SequenceVarOutsideCompound { var: String },

    /// The same name is used both as a plain and as a sequence variable.
    #[snafu(display("variable '{var}' is used both as a plain and as a sequence variable"))]
    VarKindConflict { var: String },

    /// Guard or transform references a variable the pattern never binds.
    #[snafu(display("{context} references variable '{var}' which is not bound by the pattern"))]
    UnboundVariable { var: String, context: &'static str },

    /// Extractor applied to the wrong number of argument patterns.
    #[snafu(display("extractor '{name}' takes {expected} argument(s), got {got}"))]
    ExtractorArity { name: String, expected: usize, got: usize },

    /// Extractors only make sense on the matching side of a rule.
    #[snafu(display("extractor '{name}' cannot appear in a transform template"))]
    ExtractorInTemplate { name: String },

    /// A template must produce exactly one expression.
    #[snafu(display("sequence variable '{var}' cannot be the whole transform template"))]
    SequenceVarInTemplateRoot { var: String },

    // =========================================================================
    // Normalization
    // =========================================================================
    /// The configured rewrite bound was reached before a fixpoint.
    #[snafu(display("rule set '{rules}' exceeded the rewrite limit of {limit}; the rule set may not terminate"))]
    RewriteLimitExceeded { limit: usize, rules: String },
}

impl Error {
    /// True for errors reported by `define_rule` and pattern compilation.
    pub fn is_rule_construction(&self) -> bool {
        matches!(
            self,
            Error::UnknownSymbol { .. }
                | Error::UnknownExtractor { .. }
                | Error::MultipleSequenceVars { .. }
                | Error::SequenceVarOutsideCompound { .. }
                | Error::VarKindConflict { .. }
                | Error::UnboundVariable { .. }
                | Error::ExtractorArity { .. }
                | Error::ExtractorInTemplate { .. }
                | Error::SequenceVarInTemplateRoot { .. }
        )
    }
}
