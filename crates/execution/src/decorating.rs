//! Executor that adorns every submitted task.

use adorn_core::{AdornError, Adorner, BoxTask, Failure, SharedAdorner};

use crate::{Executor, ExecutorConfig, GuaranteedRunnable};

/// Executor that adorns tasks before forwarding them to another executor.
///
/// On each submission the adorner is asked for a before action, on the
/// submitting thread. The task and its before action are wrapped in a
/// [`GuaranteedRunnable`] and handed to the inner executor, which decides
/// when and where it runs.
///
/// If the adorner fails, or yields no before action, `execute` fails and
/// nothing is forwarded. Run-time guarantees are entirely the wrapper's.
pub struct DecoratingExecutor<E> {
    inner: E,
    adorner: SharedAdorner,
    config: ExecutorConfig,
}

impl<E: Executor> DecoratingExecutor<E> {
    /// Decorate `inner` with `adorner`.
    pub fn new(inner: E, adorner: SharedAdorner) -> Self {
        Self {
            inner,
            adorner,
            config: ExecutorConfig::default(),
        }
    }

    /// Start a builder.
    pub fn builder() -> DecoratingExecutorBuilder<E> {
        DecoratingExecutorBuilder::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the inner executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Consume the wrapper and return the inner executor.
    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Get the adorner.
    pub fn adorner(&self) -> &SharedAdorner {
        &self.adorner
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl<E: Executor> Executor for DecoratingExecutor<E> {
    fn execute(&self, task: BoxTask) -> Result<(), Failure> {
        let span = tracing::debug_span!(
            "decorating_execute",
            executor = %self.config.name,
            task = task.name()
        );
        let _entered = span.enter();

        let before = self
            .adorner
            .create_adornment(&*task)?
            .ok_or_else(|| Failure::from(AdornError::NullBeforeAction))?;
        let runnable = GuaranteedRunnable::new(task, before).trace_phases(self.config.trace_phases);

        self.inner.execute(Box::new(runnable))
    }
}

/// Builder for [`DecoratingExecutor`]. Both the inner executor and the
/// adorner are required.
pub struct DecoratingExecutorBuilder<E> {
    inner: Option<E>,
    adorner: Option<SharedAdorner>,
    config: ExecutorConfig,
}

impl<E> Default for DecoratingExecutorBuilder<E> {
    fn default() -> Self {
        Self {
            inner: None,
            adorner: None,
            config: ExecutorConfig::default(),
        }
    }
}

impl<E: Executor> DecoratingExecutorBuilder<E> {
    /// Set the executor to forward to.
    pub fn executor(mut self, inner: E) -> Self {
        self.inner = Some(inner);
        self
    }

    /// Set the adorner.
    pub fn adorner(mut self, adorner: SharedAdorner) -> Self {
        self.adorner = Some(adorner);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the executor.
    pub fn build(self) -> Result<DecoratingExecutor<E>, AdornError> {
        let inner = self
            .inner
            .ok_or_else(|| AdornError::InvalidArgument("executor is required".to_string()))?;
        let adorner = self
            .adorner
            .ok_or_else(|| AdornError::InvalidArgument("adorner is required".to_string()))?;

        Ok(DecoratingExecutor::new(inner, adorner).with_config(self.config))
    }
}
