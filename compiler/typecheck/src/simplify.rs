//! Simplification: replace every variable in the reduced constraints with the
//! value it was reduced to.

use crate::{ConstraintMap, Operator, Value};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// The fully substituted value of every reduced variable.
pub type Simplified = IndexMap<String, Value>;

/// Simplify every entry in `map`, in order.
pub fn simplify(map: &ConstraintMap) -> Simplified {
    let mut simplifier = Simplifier {
        map,
        cache: HashMap::new(),
        expanding: HashSet::new(),
    };

    let simplified = map
        .keys()
        .map(|name| (name.clone(), simplifier.variable(name).value))
        .collect::<Simplified>();

    log::debug!("simplified {} entries", simplified.len());

    simplified
}

/// Substitute the simplified value of every variable in `value`.
pub fn substitute(value: &Value, simplified: &Simplified) -> Value {
    value.rewrite(&mut |value| {
        value
            .as_free_variable()
            .and_then(|name| simplified.get(name))
            .cloned()
    })
}

struct Simplifier<'a> {
    map: &'a ConstraintMap,
    cache: HashMap<String, Value>,
    expanding: HashSet<String>,
}

struct Expansion {
    value: Value,

    /// Whether a variable was left unexpanded to break a cycle.
    cut: bool,
}

impl Simplifier<'_> {
    fn variable(&mut self, name: &str) -> Expansion {
        if let Some(value) = self.cache.get(name) {
            return Expansion {
                value: value.clone(),
                cut: false,
            };
        }

        let map = self.map;
        let Some(entry) = map.get(name) else {
            return Expansion {
                value: Value::variable(name),
                cut: false,
            };
        };

        if !self.expanding.insert(name.to_string()) {
            log::trace!("`{name}` refers to itself");

            return Expansion {
                value: Value::variable(name),
                cut: true,
            };
        }

        let mut expansion = self.value(&entry.to);
        self.expanding.remove(name);

        if entry.operator == Operator::EvaluatedFrom {
            expansion.value = expansion.value.strip_implicits().clone();
        }

        if !expansion.cut {
            self.cache.insert(name.to_string(), expansion.value.clone());
        }

        expansion
    }

    fn value(&mut self, value: &Value) -> Expansion {
        let mut cut = false;

        let value = value.rewrite(&mut |value| {
            let name = value.as_free_variable()?;
            let expansion = self.variable(name);
            cut |= expansion.cut;
            Some(expansion.value)
        });

        Expansion { value, cut }
    }
}
