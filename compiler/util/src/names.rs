use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A source of names that are distinct from every other name produced by the
/// same source.
///
/// Passes that introduce variables take a `&mut impl UniqueNames` instead of
/// reading a global counter, so two runs never share state.
pub trait UniqueNames {
    /// Produce a new name beginning with `prefix`.
    fn fresh(&mut self, prefix: &str) -> String;
}

impl<N: UniqueNames + ?Sized> UniqueNames for &mut N {
    fn fresh(&mut self, prefix: &str) -> String {
        (**self).fresh(prefix)
    }
}

/// Appends a per-prefix counter to every requested prefix, so the first call
/// with `"a$"` returns `"a$0"`, the next `"a$1"`, and so on.
///
/// Names from different prefixes only stay distinct if no prefix is another
/// prefix followed by digits; the compiler's prefixes all end in `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCounter {
    next: HashMap<String, usize>,
}

impl NameCounter {
    /// Create a counter that has not produced any names yet.
    pub fn new() -> Self {
        Default::default()
    }

    /// The number of names produced so far for `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.next.get(prefix).copied().unwrap_or_default()
    }
}

impl UniqueNames for NameCounter {
    fn fresh(&mut self, prefix: &str) -> String {
        let next = self.next.entry(prefix.to_string()).or_default();
        let id = *next;
        *next += 1;

        format!("{prefix}{id}")
    }
}

/// Wraps a closure as a [`UniqueNames`] source.
pub struct NamesFn<F>(pub F);

impl<F: FnMut(&str) -> String> UniqueNames for NamesFn<F> {
    fn fresh(&mut self, prefix: &str) -> String {
        (self.0)(prefix)
    }
}
