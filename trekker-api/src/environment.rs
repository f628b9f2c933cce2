use trekker_core::types::{Traverser, TraverserData};

use crate::traversal::TraverserStream;

/// The entry point for building a barrier job.
///
/// Create an environment, admit values via [`from_iter`](Self::from_iter),
/// pick a barrier on the returned [`TraverserStream`], and run it.
pub struct TraversalEnvironment {
    name: String,
}

impl TraversalEnvironment {
    /// Create an environment for a job with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Admit values as traversers with an empty context.
    pub fn from_iter<S, I>(&self, values: I) -> TraverserStream<(), S>
    where
        S: TraverserData,
        I: IntoIterator<Item = S>,
    {
        self.from_iter_with_context((), values)
    }

    /// Admit values as traversers carrying the given execution context.
    ///
    /// Ordinals are stamped in admission order; order-sensitive barriers
    /// use them as provenance.
    pub fn from_iter_with_context<C, S, I>(&self, context: C, values: I) -> TraverserStream<C, S>
    where
        C: Clone + Send + 'static,
        S: TraverserData,
        I: IntoIterator<Item = S>,
    {
        let traversers = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Traverser::new(context.clone(), value, i as u64))
            .collect();
        TraverserStream::new(self.name.clone(), context, traversers)
    }
}
