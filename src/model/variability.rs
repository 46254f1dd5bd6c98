//! In-memory variability model.

use std::collections::HashMap;

use crate::error::ModelError;

use super::option::{BinaryOption, Configuration};
use super::Result;

/// A set of sibling options under a parent of which exactly one is selected
/// whenever the parent is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeGroup {
    /// The grouping option.
    pub parent: BinaryOption,

    /// Mutually exclusive members, in declaration order.
    pub members: Vec<BinaryOption>,
}

impl AlternativeGroup {
    /// Returns true if `option` is a member of this group.
    pub fn contains(&self, option: &BinaryOption) -> bool {
        self.members.iter().any(|m| m == option)
    }

    /// The members other than `option`.
    pub fn siblings<'a>(&'a self, option: &'a BinaryOption) -> impl Iterator<Item = &'a BinaryOption> {
        self.members.iter().filter(move |m| *m != option)
    }

    /// The member selected in `config`, if any.
    pub fn selected_member(&self, config: &Configuration) -> Option<&BinaryOption> {
        self.members.iter().find(|m| config.contains(m))
    }
}

/// The feature-model surface consumed by the sampler.
pub trait FeatureModel {
    /// All boolean options, in declaration order.
    fn binary_options(&self) -> &[BinaryOption];

    /// All alternative groups, in declaration order.
    fn alternative_groups(&self) -> &[AlternativeGroup];

    /// The alternative group `option` belongs to, if any.
    fn alternative_group(&self, option: &BinaryOption) -> Option<&AlternativeGroup> {
        self.alternative_groups().iter().find(|g| g.contains(option))
    }

    /// Returns true if `a` and `b` are distinct siblings of one alternative group.
    fn are_exclusive(&self, a: &BinaryOption, b: &BinaryOption) -> bool {
        a != b
            && self
                .alternative_group(a)
                .map(|g| g.contains(b))
                .unwrap_or(false)
    }
}

/// A feature model held in memory and built programmatically.
///
/// Constraints are structural (parent/child, alternative groups) plus simple
/// cross-tree `requires`/`excludes` pairs.
#[derive(Debug, Clone, Default)]
pub struct VariabilityModel {
    name: String,
    options: Vec<BinaryOption>,
    index: HashMap<String, usize>,
    groups: Vec<AlternativeGroup>,
    requires: Vec<(BinaryOption, BinaryOption)>,
    excludes: Vec<(BinaryOption, BinaryOption)>,
}

impl VariabilityModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an option by name.
    pub fn option(&self, name: &str) -> Option<&BinaryOption> {
        self.index.get(name).map(|&i| &self.options[i])
    }

    fn require(&self, name: &str) -> Result<BinaryOption> {
        self.option(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownOption(name.to_string()))
    }

    fn insert(&mut self, option: BinaryOption) -> Result<()> {
        if self.index.contains_key(&option.name) {
            return Err(ModelError::DuplicateOption(option.name));
        }
        self.index.insert(option.name.clone(), self.options.len());
        self.options.push(option);
        Ok(())
    }

    /// Adds a top-level optional feature.
    pub fn add_option(&mut self, name: &str) -> Result<()> {
        self.insert(BinaryOption::new(name))
    }

    /// Adds an optional feature nested under an existing `parent`.
    pub fn add_child(&mut self, name: &str, parent: &str) -> Result<()> {
        if name == parent {
            return Err(ModelError::SelfReference(name.to_string()));
        }
        self.require(parent)?;
        self.insert(BinaryOption::with_parent(name, parent))
    }

    /// Declares an alternative group under an existing `parent`.
    ///
    /// Members that do not exist yet are created as children of `parent`.
    pub fn add_alternative_group(&mut self, parent: &str, members: &[&str]) -> Result<()> {
        if members.is_empty() {
            return Err(ModelError::EmptyAlternativeGroup(parent.to_string()));
        }
        let parent_option = self.require(parent)?;

        let mut group = Vec::with_capacity(members.len());
        for &member in members {
            if member == parent {
                return Err(ModelError::SelfReference(member.to_string()));
            }
            let option = match self.option(member) {
                Some(existing) => existing.clone(),
                None => {
                    self.add_child(member, parent)?;
                    self.require(member)?
                }
            };
            if option.parent.as_deref() != Some(parent) {
                return Err(ModelError::NotAChild {
                    option: member.to_string(),
                    parent: parent.to_string(),
                });
            }
            if let Some(other) = self.alternative_group(&option) {
                return Err(ModelError::AlreadyGrouped {
                    option: member.to_string(),
                    parent: other.parent.name.clone(),
                });
            }
            group.push(option);
        }

        self.groups.push(AlternativeGroup {
            parent: parent_option,
            members: group,
        });
        Ok(())
    }

    /// Adds a cross-tree constraint: selecting `a` requires `b`.
    pub fn add_requires(&mut self, a: &str, b: &str) -> Result<()> {
        let pair = (self.require(a)?, self.require(b)?);
        self.requires.push(pair);
        Ok(())
    }

    /// Adds a cross-tree constraint: `a` and `b` are never selected together.
    pub fn add_excludes(&mut self, a: &str, b: &str) -> Result<()> {
        let pair = (self.require(a)?, self.require(b)?);
        self.excludes.push(pair);
        Ok(())
    }

    /// Checks a configuration against every constraint of the model.
    pub fn is_valid(&self, config: &Configuration) -> bool {
        for option in config.selected() {
            if !self.index.contains_key(&option.name) {
                return false;
            }
            if let Some(parent) = &option.parent {
                if !config.contains_name(parent) {
                    return false;
                }
            }
        }

        for group in &self.groups {
            let selected = group.members.iter().filter(|m| config.contains(m)).count();
            let expected = usize::from(config.contains(&group.parent));
            if selected != expected {
                return false;
            }
        }

        let requires_ok = self
            .requires
            .iter()
            .all(|(a, b)| !config.contains(a) || config.contains(b));
        let excludes_ok = self
            .excludes
            .iter()
            .all(|(a, b)| !(config.contains(a) && config.contains(b)));

        requires_ok && excludes_ok
    }
}

impl FeatureModel for VariabilityModel {
    fn binary_options(&self) -> &[BinaryOption] {
        &self.options
    }

    fn alternative_groups(&self) -> &[AlternativeGroup] {
        &self.groups
    }
}
