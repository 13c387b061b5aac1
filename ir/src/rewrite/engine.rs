//! Bottom-up fixpoint normalizer.
//!
//! # Algorithm
//!
//! For every node, children first:
//! 1. Normalize each child, optionally forked on rayon.
//! 2. Rebuild the node from its normalized children.
//! 3. Scan the rules in order and apply the first one that fires. The
//!    result's children are normalized again, then the scan restarts from
//!    the first rule. A full scan with no firing rule ends the loop.
//!
//! Step 3 re-normalizes below the rewritten node, so every node of the
//! result is a fixpoint and normalizing twice is a no-op.
//!
//! The walk runs on an explicit stack of `Visit` / `Descend` / `Finalize`
//! entries, so deep trees do not grow the thread's stack.
//!
//! # Caching
//!
//! * **Normal-form tag**: a node that reached its fixpoint under rule set `R`
//!   is stamped with `R`'s id and skipped by later runs of `R`. Nodes are
//!   immutable and hash-consed, so a rewrite always yields different nodes
//!   (and different ancestors) and a stale tag is never read.
//! * **Memo**: within one normalizer, node id -> result. DAG-shared subtrees
//!   are normalized once.
//!
//! Termination depends on the rule set. [`normalize`] runs unbounded;
//! [`try_normalize`] honors [`NormalizeConfig::max_rewrites`].

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use snafu::ensure;
use tracing::{debug, trace};

use super::config::NormalizeConfig;
use crate::error::{Result, RewriteLimitExceededSnafu};
use crate::rule::Rule;
use crate::Expr;

// Starts at 1: tag value 0 means "not normal".
static RULE_SET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// An ordered, immutable collection of rules with a unique identity.
///
/// Clones share the identity. Every constructor call produces a fresh one.
#[derive(Debug, Clone)]
pub struct RuleSet {
    id: u64,
    name: Arc<str>,
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn new(name: impl AsRef<str>, rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            id: RULE_SET_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name.as_ref()),
            rules: rules.into_iter().collect(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// New rule set with `more` appended after these rules.
    pub fn extend(&self, name: impl AsRef<str>, more: impl IntoIterator<Item = Rule>) -> Self {
        Self::new(name, self.rules.iter().cloned().chain(more))
    }

    /// Apply the first rule that fires at the root of `expr`.
    ///
    /// A rule whose result is structurally identical to `expr` does not
    /// count as firing.
    pub fn rewrite_once(&self, expr: &Arc<Expr>) -> Option<(usize, Arc<Expr>)> {
        self.rules.iter().enumerate().find_map(|(idx, rule)| {
            let result = rule.apply(expr)?;
            if Arc::ptr_eq(&result, expr) || *result == **expr {
                trace!(rule = %rule.label(), %expr, "rule produced identical expression");
                return None;
            }
            Some((idx, result))
        })
    }
}

/// Counters collected by a [`Normalizer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Rules that fired.
    pub rewrites: usize,
    /// Nodes entered by the descent, including cache hits.
    pub nodes_visited: usize,
    /// Nodes answered by the normal-form tag or the memo.
    pub cache_hits: usize,
}

/// Stage of a node on the normalizer's work stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// First sight of a node: answer from the tag or the memo, or descend.
    Visit,
    /// Queue the children of `working`, then its finalization.
    Descend,
    /// Children are done: rebuild, try the rules, link the result.
    Finalize,
}

/// Work stack entry.
///
/// `original` is the node the caller asked about and the memo key of the
/// final result; `working` is the node currently being normalized, which
/// differs from `original` once a rule has fired.
#[derive(Debug, Clone)]
struct StackEntry {
    original: Arc<Expr>,
    working: Arc<Expr>,
    stage: Stage,
}

impl StackEntry {
    fn visit(node: Arc<Expr>) -> Self {
        Self { original: node.clone(), working: node, stage: Stage::Visit }
    }

    fn descend(original: Arc<Expr>, working: Arc<Expr>) -> Self {
        Self { original, working, stage: Stage::Descend }
    }

    fn finalize(original: Arc<Expr>, working: Arc<Expr>) -> Self {
        Self { original, working, stage: Stage::Finalize }
    }
}

/// Reusable normalization driver for one rule set.
///
/// The memo and the counters persist across [`run`](Self::run) calls, and
/// the rewrite bound applies to their total.
///
/// Traversal uses an explicit work stack, so tree depth is limited by heap
/// memory rather than the thread's stack. Only parallel forks recurse, once
/// per forking level.
pub struct Normalizer<'r> {
    rules: &'r RuleSet,
    config: NormalizeConfig,
    memo: papaya::HashMap<u64, Arc<Expr>>,
    rewrites: AtomicUsize,
    visited: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl<'r> Normalizer<'r> {
    pub fn new(rules: &'r RuleSet, config: NormalizeConfig) -> Self {
        Self {
            rules,
            config,
            memo: papaya::HashMap::new(),
            rewrites: AtomicUsize::new(0),
            visited: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    pub fn stats(&self) -> NormalizeStats {
        NormalizeStats {
            rewrites: self.rewrites.load(Ordering::Relaxed),
            nodes_visited: self.visited.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Normal form of `expr`, failing once the rewrite bound is exceeded.
    pub fn run(&self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        self.drive(expr, &|done| self.check_limit(done))
    }

    /// Normal form of `expr` plus the counters so far.
    pub fn run_with_stats(&self, expr: &Arc<Expr>) -> Result<(Arc<Expr>, NormalizeStats)> {
        let result = self.run(expr)?;
        Ok((result, self.stats()))
    }

    /// Normal form of `expr`, ignoring the rewrite bound.
    fn run_unbounded(&self, expr: &Arc<Expr>) -> Arc<Expr> {
        match self.drive::<Infallible>(expr, &|_| Ok(())) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    fn check_limit(&self, done: usize) -> Result<()> {
        if let Some(limit) = self.config.max_rewrites {
            ensure!(done <= limit, RewriteLimitExceededSnafu { limit, rules: self.rules.name() });
        }
        Ok(())
    }

    fn is_certified(&self, expr: &Expr) -> bool {
        self.config.normal_form_cache && expr.is_normal_under(self.rules.id())
    }

    /// Result for a node the stack already finished.
    fn resolved(&self, node: &Arc<Expr>) -> Option<Arc<Expr>> {
        if self.is_certified(node) {
            return Some(node.clone());
        }
        self.memo.pin().get(&node.id).cloned()
    }

    /// Bottom-up fixpoint over an explicit stack.
    ///
    /// `on_rewrite` receives the running rewrite count after every firing
    /// and aborts the run by returning an error.
    fn drive<E: Send>(&self, root: &Arc<Expr>, on_rewrite: &OnRewrite<'_, E>) -> std::result::Result<Arc<Expr>, E> {
        let mut stack = vec![StackEntry::visit(root.clone())];

        while let Some(StackEntry { original, working, stage }) = stack.pop() {
            match stage {
                Stage::Visit => {
                    self.visited.fetch_add(1, Ordering::Relaxed);
                    if self.resolved(&working).is_some() {
                        self.cache_hits.fetch_add(1, Ordering::Relaxed);
                    } else {
                        stack.push(StackEntry::descend(original, working));
                    }
                }
                Stage::Descend => {
                    let children = working.children();
                    if self.config.forks(children.len()) {
                        children
                            .par_iter()
                            .map(|c| self.drive(c, on_rewrite).map(drop))
                            .collect::<std::result::Result<(), E>>()?;
                        stack.push(StackEntry::finalize(original, working));
                    } else {
                        let pending: Vec<StackEntry> = children.iter().rev().cloned().map(StackEntry::visit).collect();
                        stack.push(StackEntry::finalize(original, working));
                        stack.extend(pending);
                    }
                }
                Stage::Finalize => {
                    let children = working.children().iter().map(|c| self.resolved(c).unwrap_or_else(|| c.clone()));
                    let current = working.with_children(children);

                    if !self.is_certified(&current)
                        && let Some((idx, next)) = self.rules.rewrite_once(&current)
                    {
                        on_rewrite(self.rewrites.fetch_add(1, Ordering::Relaxed) + 1)?;
                        debug!(rules = %self.rules.name(), rule = idx, from = %current, to = %next, "rewrite");
                        stack.push(StackEntry::descend(original, next));
                        continue;
                    }

                    if self.config.normal_form_cache {
                        current.mark_normal(self.rules.id());
                    }
                    let memo = self.memo.pin();
                    memo.insert(original.id, current.clone());
                    memo.insert(current.id, current);
                }
            }
        }

        Ok(self.resolved(root).unwrap_or_else(|| root.clone()))
    }
}

/// Callback run after every rewrite with the running count.
type OnRewrite<'a, E> = dyn Fn(usize) -> std::result::Result<(), E> + Sync + 'a;

/// Normal form of `expr` under `rules`.
///
/// Runs until a fixpoint without any bound: a non-terminating rule set
/// makes this loop forever. Use [`try_normalize`] for a bounded run.
///
/// Intermediate expressions built by rewrites die with the run, but their
/// entries in the global hash-consing cache stay until
/// [`gc_dead_refs`](crate::gc_dead_refs) runs. Long-lived processes either
/// call it periodically or set [`NormalizeConfig::collect_garbage`] on
/// [`try_normalize`].
#[tracing::instrument(skip_all, fields(rules = %rules.name()))]
pub fn normalize(rules: &RuleSet, expr: &Arc<Expr>) -> Arc<Expr> {
    Normalizer::new(rules, NormalizeConfig::default().unbounded()).run_unbounded(expr)
}

/// Normal form of `expr` under `rules`, honoring `config`.
#[tracing::instrument(skip_all, fields(rules = %rules.name()))]
pub fn try_normalize(rules: &RuleSet, expr: &Arc<Expr>, config: &NormalizeConfig) -> Result<Arc<Expr>> {
    let (result, stats) = Normalizer::new(rules, config.clone()).run_with_stats(expr)?;
    debug!(rewrites = stats.rewrites, visited = stats.nodes_visited, cache_hits = stats.cache_hits, "normalized");
    if config.collect_garbage {
        crate::gc_dead_refs();
    }
    Ok(result)
}

/// Normalize under each rule set in turn.
pub fn normalize_pipeline<'a>(sets: impl IntoIterator<Item = &'a RuleSet>, expr: &Arc<Expr>) -> Arc<Expr> {
    sets.into_iter().fold(expr.clone(), |acc, rules| normalize(rules, &acc))
}

/// Bounded [`normalize_pipeline`]; the bound applies per rule set.
pub fn try_normalize_pipeline<'a>(
    sets: impl IntoIterator<Item = &'a RuleSet>,
    expr: &Arc<Expr>,
    config: &NormalizeConfig,
) -> Result<Arc<Expr>> {
    sets.into_iter().try_fold(expr.clone(), |acc, rules| try_normalize(rules, &acc, config))
}
