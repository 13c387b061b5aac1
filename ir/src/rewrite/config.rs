//! Normalizer configuration.
//!
//! Typed configuration with a bon builder and environment-variable fallbacks.

use bon::bon;

/// Children count at which parallel descent kicks in, by default.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Settings for a normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Stop with an error after this many rewrites. `None` is unbounded.
    pub max_rewrites: Option<usize>,

    /// Normalize sibling subtrees on the rayon pool.
    pub parallel: bool,

    /// Minimum number of children for a node to fork its descent.
    pub parallel_threshold: usize,

    /// Read and write the per-node normal-form tag.
    pub normal_form_cache: bool,

    /// Sweep dead entries from the hash-consing cache after the run.
    pub collect_garbage: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl NormalizeConfig {
    /// Create a configuration with builder pattern.
    #[builder]
    pub fn new(
        max_rewrites: Option<usize>,
        #[builder(default = false)] parallel: bool,
        #[builder(default = DEFAULT_PARALLEL_THRESHOLD)] parallel_threshold: usize,
        #[builder(default = true)] normal_form_cache: bool,
        #[builder(default = false)] collect_garbage: bool,
    ) -> Self {
        let parallel_threshold = parallel_threshold.max(1);
        Self { max_rewrites, parallel, parallel_threshold, normal_form_cache, collect_garbage }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KESTREL_MAX_REWRITES=N` - Rewrite bound (default: unbounded)
    /// * `KESTREL_PARALLEL=N` - Enable parallel descent for nodes with at
    ///   least N children; `0` or unset disables it
    /// * `KESTREL_NO_NF_CACHE` - Disable the normal-form tag if set
    /// * `KESTREL_GC` - Sweep the hash-consing cache after each run if set
    pub fn from_env() -> Self {
        let max_rewrites = std::env::var("KESTREL_MAX_REWRITES").ok().and_then(|s| s.parse().ok());
        let parallel_threshold = std::env::var("KESTREL_PARALLEL").ok().and_then(|s| s.parse::<usize>().ok());
        let normal_form_cache = std::env::var("KESTREL_NO_NF_CACHE").is_err();
        let collect_garbage = std::env::var("KESTREL_GC").is_ok();

        Self::builder()
            .maybe_max_rewrites(max_rewrites)
            .parallel(parallel_threshold.is_some_and(|n| n > 0))
            .parallel_threshold(parallel_threshold.filter(|&n| n > 0).unwrap_or(DEFAULT_PARALLEL_THRESHOLD))
            .normal_form_cache(normal_form_cache)
            .collect_garbage(collect_garbage)
            .build()
    }

    /// Same settings without a rewrite bound.
    pub fn unbounded(mut self) -> Self {
        self.max_rewrites = None;
        self
    }

    /// True if a node with `children` children should fork.
    pub fn forks(&self, children: usize) -> bool {
        self.parallel && children >= self.parallel_threshold
    }
}
