//! Routing a chain to an execution strategy.
//!
//! A [`Dispatcher`] classifies the chain and calls the handler registered for
//! the flavour. Without one, the generic fallback replays every Part against
//! the backend: the root becomes [`Backend::root`], attributes become
//! [`Backend::attr`] and calls become [`Backend::call`]. A backend therefore
//! runs any chain before it has a single dedicated handler.

use indexmap::IndexMap;
use strata_core::Value;

use crate::chain::{Chain, Kwargs, Part};
use crate::classify::{ClassifyError, Classifier, Flavour};

/// Backend object a chain is replayed against.
pub trait Backend {
    /// Intermediate and final results of replaying a chain.
    type Output;
    type Error: From<DispatchError>;

    fn root(&self, name: &str) -> Result<Self::Output, Self::Error>;

    fn attr(&self, target: Self::Output, name: &str) -> Result<Self::Output, Self::Error>;

    fn call(
        &self,
        target: Self::Output,
        method: &str,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("no handler for flavour `{0}` and replay is disabled")]
    NoHandler(Flavour),
}

/// Handler for one flavour.
pub type Handler<B> =
    Box<dyn Fn(&B, &Chain) -> Result<<B as Backend>::Output, <B as Backend>::Error> + Send + Sync>;

pub struct Dispatcher<B: Backend> {
    classifier: Classifier,
    handlers: IndexMap<Flavour, Handler<B>>,
    replay: bool,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            handlers: IndexMap::new(),
            replay: true,
        }
    }

    /// Register `handler` for `flavour`, replacing any previous one.
    pub fn handle<F>(mut self, flavour: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&B, &Chain) -> Result<B::Output, B::Error> + Send + Sync + 'static,
    {
        self.handlers
            .insert(Flavour::new(flavour), Box::new(handler));
        self
    }

    /// Fail instead of replaying chains that have no handler.
    pub fn without_replay(mut self) -> Self {
        self.replay = false;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn has_handler(&self, flavour: &Flavour) -> bool {
        self.handlers.contains_key(flavour)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(root = chain.root()))]
    pub fn dispatch(&self, backend: &B, chain: &Chain) -> Result<B::Output, B::Error> {
        let flavour = match self.classifier.classify(chain) {
            Ok(flavour) => flavour,
            Err(err) if self.replay => {
                tracing::debug!(error = %err, "unclassified, replaying");
                return replay(backend, chain);
            }
            Err(err) => return Err(DispatchError::from(err).into()),
        };

        if let Some(handler) = self.handlers.get(&flavour) {
            tracing::debug!(%flavour, "dispatching to handler");
            return handler(backend, chain);
        }
        if self.replay {
            tracing::debug!(%flavour, "no handler, replaying");
            return replay(backend, chain);
        }
        Err(DispatchError::NoHandler(flavour).into())
    }
}

impl<B: Backend> Default for Dispatcher<B> {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

/// Replay every Part of `chain` against `backend`.
pub fn replay<B: Backend>(backend: &B, chain: &Chain) -> Result<B::Output, B::Error> {
    let mut target = backend.root(chain.root())?;
    for part in chain.parts() {
        target = match part {
            Part::Attr(name) => backend.attr(target, name)?,
            Part::Call {
                method,
                args,
                kwargs,
            } => backend.call(target, method, args, kwargs)?,
        };
    }
    Ok(target)
}
