//! Property-based tests for matching and normalization.
//!
//! Uses proptest to verify invariants across wide input spaces.

#[cfg(test)]
mod matcher_props;

pub mod generators;
