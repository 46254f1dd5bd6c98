//! Boolean options and the configurations built from them.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A named boolean feature of a variability model.
///
/// Identity is the option name; the parent is carried along so that
/// alternative-group membership can be resolved without going back to the
/// model. Ordering is by name first, which keeps candidate tuples and
/// configuration sets stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BinaryOption {
    /// Unique name within the model.
    pub name: String,

    /// Name of the parent option, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl BinaryOption {
    /// Creates a top-level option.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates an option nested under `parent`.
    pub fn with_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
        }
    }
}

impl fmt::Display for BinaryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An immutable set of selected options.
///
/// Unselected options are implicit. Two configurations are equal iff their
/// selected sets are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Configuration {
    selected: BTreeSet<BinaryOption>,
}

impl Configuration {
    /// Creates a configuration from the selected options.
    pub fn new(selected: impl IntoIterator<Item = BinaryOption>) -> Self {
        Self {
            selected: selected.into_iter().collect(),
        }
    }

    /// Returns true if `option` is selected.
    pub fn contains(&self, option: &BinaryOption) -> bool {
        self.selected.contains(option)
    }

    /// Returns true if every option in `options` is selected.
    pub fn contains_all<'a>(&self, options: impl IntoIterator<Item = &'a BinaryOption>) -> bool {
        options.into_iter().all(|o| self.selected.contains(o))
    }

    /// Returns true if an option with the given name is selected.
    pub fn contains_name(&self, name: &str) -> bool {
        self.selected.iter().any(|o| o.name == name)
    }

    /// Iterates the selected options in order.
    pub fn selected(&self) -> impl Iterator<Item = &BinaryOption> {
        self.selected.iter()
    }

    /// Number of selected options.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns a copy with `from` replaced by `to`.
    pub(crate) fn swapped(&self, from: &BinaryOption, to: &BinaryOption) -> Self {
        let mut selected = self.selected.clone();
        selected.remove(from);
        selected.insert(to.clone());
        Self { selected }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.selected.iter().map(|o| o.name.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl FromIterator<BinaryOption> for Configuration {
    fn from_iter<I: IntoIterator<Item = BinaryOption>>(iter: I) -> Self {
        Self::new(iter)
    }
}
