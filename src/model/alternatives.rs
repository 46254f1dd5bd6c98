//! Sibling substitution over alternative groups.

use std::collections::BTreeSet;

use super::option::Configuration;
use super::variability::AlternativeGroup;

/// Expands a configuration into every configuration reachable by swapping a
/// selected alternative member for one of its siblings.
///
/// Groups are independent, so the result is the cartesian product over all
/// groups with a selected member. The input configuration is always part of
/// the result. Groups with no selected member contribute nothing.
pub fn substitute_alternatives(
    config: &Configuration,
    groups: &[AlternativeGroup],
) -> BTreeSet<Configuration> {
    let mut result = BTreeSet::new();
    result.insert(config.clone());

    for group in groups {
        let Some(selected) = group.selected_member(config) else {
            continue;
        };

        let mut expanded = BTreeSet::new();
        for current in &result {
            expanded.insert(current.clone());
            for sibling in group.siblings(selected) {
                expanded.insert(current.swapped(selected, sibling));
            }
        }
        result = expanded;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureModel, VariabilityModel};

    fn model() -> VariabilityModel {
        let mut model = VariabilityModel::new("alt");
        model.add_option("codec").unwrap();
        model.add_alternative_group("codec", &["h264", "vp9", "av1"]).unwrap();
        model.add_option("container").unwrap();
        model.add_alternative_group("container", &["mp4", "mkv"]).unwrap();
        model.add_option("audio").unwrap();
        model
    }

    fn pick(model: &VariabilityModel, names: &[&str]) -> Configuration {
        names
            .iter()
            .map(|n| model.option(n).cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_no_groups_selected_returns_input() {
        let model = model();
        let config = pick(&model, &["audio"]);
        let result = substitute_alternatives(&config, model.alternative_groups());
        assert_eq!(result.len(), 1);
        assert!(result.contains(&config));
    }

    #[test]
    fn test_single_group_expands_to_siblings() {
        let model = model();
        let config = pick(&model, &["codec", "vp9"]);
        let result = substitute_alternatives(&config, model.alternative_groups());
        assert_eq!(result.len(), 3);
        assert!(result.contains(&pick(&model, &["codec", "h264"])));
        assert!(result.contains(&pick(&model, &["codec", "av1"])));
    }

    #[test]
    fn test_groups_multiply() {
        let model = model();
        let config = pick(&model, &["codec", "h264", "container", "mkv", "audio"]);
        let result = substitute_alternatives(&config, model.alternative_groups());
        assert_eq!(result.len(), 6);
        for expanded in &result {
            assert!(model.is_valid(expanded), "{expanded} should stay valid");
            assert!(expanded.contains_name("audio"));
        }
    }
}
