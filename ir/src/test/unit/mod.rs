mod registry;
mod rule;
mod substitution;
mod tree;
