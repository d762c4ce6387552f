// Bulk construction of variables sharing bounds and type
// Arrays, keyed maps and maps over an enumeration's members

use super::error::{ModelError, Result};
use super::variable::Variable;
use crate::domain::VariableType;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A closed set of key values, typically the variants of a fieldless enum.
///
/// ```
/// use sonnet::modeling::Enumeration;
///
/// #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// enum Shift { Day, Night }
///
/// impl std::fmt::Display for Shift {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{:?}", self)
///     }
/// }
///
/// impl Enumeration for Shift {
///     fn members() -> Vec<Self> {
///         vec![Shift::Day, Shift::Night]
///     }
/// }
/// ```
pub trait Enumeration: Sized + Ord + Clone + Display {
    /// Every member, each exactly once.
    fn members() -> Vec<Self>;
}

fn element_name(base: &str, key: impl Display) -> String {
    if base.is_empty() {
        String::new()
    } else {
        format!("{base}_{key}")
    }
}

impl Variable {
    /// `n` new variables named `<base>_0 .. <base>_{n-1}`, or default names
    /// when `base` is empty.
    pub fn new_array(
        n: usize,
        base: &str,
        lower: f64,
        upper: f64,
        variable_type: VariableType,
    ) -> Vec<Variable> {
        (0..n)
            .map(|i| Variable::named_with_bounds(&element_name(base, i), lower, upper, variable_type))
            .collect()
    }

    /// One new variable per key, named `<base>_<key>`.
    ///
    /// A key that repeats is skipped; the first occurrence keeps its variable.
    pub fn new_map<K, I>(
        keys: I,
        base: &str,
        lower: f64,
        upper: f64,
        variable_type: VariableType,
    ) -> BTreeMap<K, Variable>
    where
        K: Ord + Clone + Display,
        I: IntoIterator<Item = K>,
    {
        let mut map = BTreeMap::new();
        for key in keys {
            if map.contains_key(&key) {
                continue;
            }
            let variable =
                Variable::named_with_bounds(&element_name(base, &key), lower, upper, variable_type);
            map.insert(key, variable);
        }
        map
    }

    /// One new variable per member of `E`, named `<base>_<member>`.
    ///
    /// Fails with `InvalidArgument` when `E` lists no members or lists one
    /// twice; no variables are created in that case.
    pub fn new_enum_map<E: Enumeration>(
        base: &str,
        lower: f64,
        upper: f64,
        variable_type: VariableType,
    ) -> Result<BTreeMap<E, Variable>> {
        let members = E::members();
        if members.is_empty() {
            return Err(ModelError::InvalidArgument(format!(
                "{} has no members to key variables by",
                std::any::type_name::<E>()
            )));
        }

        let mut sorted = members.clone();
        sorted.sort();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ModelError::InvalidArgument(format!(
                "{} lists member '{}' more than once",
                std::any::type_name::<E>(),
                pair[0]
            )));
        }

        Ok(Variable::new_map(members, base, lower, upper, variable_type))
    }
}
