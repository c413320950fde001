//! Worker pool configuration.

use crate::core::constants::DEFAULT_MAX_RECOGNIZER_SESSIONS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the worker pool shared by every recognition stage.
///
/// The pool is built once per engine and injected into the cascade, so
/// concurrent pages never create threads of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of worker threads.
    /// If None, the available parallelism of the machine is used.
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Number of ONNX sessions each recognizer keeps.
    /// If None, `min(workers, 4)` sessions are created.
    #[serde(default)]
    pub recognizer_sessions: Option<usize>,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the number of sessions per recognizer.
    pub fn with_recognizer_sessions(mut self, sessions: Option<usize>) -> Self {
        self.recognizer_sessions = sessions;
        self
    }

    /// Effective number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.max_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Effective number of sessions per recognizer.
    pub fn recognizer_session_count(&self) -> usize {
        self.recognizer_sessions
            .unwrap_or_else(|| self.worker_count().min(DEFAULT_MAX_RECOGNIZER_SESSIONS))
            .max(1)
    }

    /// Builds the bounded worker pool described by this policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use koten_ocr::core::config::ParallelPolicy;
    /// let pool = ParallelPolicy::new()
    ///     .with_max_threads(Some(2))
    ///     .build_worker_pool()
    ///     .unwrap();
    /// assert_eq!(pool.current_num_threads(), 2);
    /// ```
    pub fn build_worker_pool(&self) -> Result<Arc<rayon::ThreadPool>, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count())
            .thread_name(|i| format!("koten-ocr-worker-{i}"))
            .build()?;
        Ok(Arc::new(pool))
    }
}
