//! Topic Selector
//!
//! Chooses the next topic from the catalog given the topics already visited.
//! Selection is a pure function of its inputs: there is no randomness and no
//! hidden state, so the same catalog and visit history always produce the
//! same topic.
//!
//! Diversity comes from avoiding the category of the most recently visited
//! topic whenever another category still has unvisited topics. Without it an
//! interview tends to stay inside one area (one subject asked about five
//! different ways) until that area runs dry.

use crate::error::{ConductorError, Result};
use crate::topic::{Topic, TopicCatalog};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// How the preferred category is picked among the non-current ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Prefer the category with the fewest visited topics, then the lowest
    /// priority rank, then catalog order.
    #[default]
    Balanced,
    /// Only avoid the current category; otherwise lowest rank, then catalog
    /// order.
    AvoidRepeat,
}

impl FromStr for RotationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "balanced" => Ok(RotationPolicy::Balanced),
            "avoid_repeat" => Ok(RotationPolicy::AvoidRepeat),
            other => Err(format!("unknown rotation policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Next(&'a Topic),
    Exhausted,
}

impl<'a> Selection<'a> {
    pub fn topic(self) -> Option<&'a Topic> {
        match self {
            Selection::Next(topic) => Some(topic),
            Selection::Exhausted => None,
        }
    }
}

/// Selects the next topic with the default [`RotationPolicy`].
///
/// `visited` is in visit order; its last element is the most recent visit.
pub fn select_next<'a>(catalog: &'a TopicCatalog, visited: &[String]) -> Result<Selection<'a>> {
    select_next_with(catalog, visited, RotationPolicy::default())
}

pub fn select_next_with<'a>(
    catalog: &'a TopicCatalog,
    visited: &[String],
    policy: RotationPolicy,
) -> Result<Selection<'a>> {
    if catalog.is_empty() {
        return Err(ConductorError::CatalogExhaustedPrematurely);
    }

    let visited_set: HashSet<&str> = visited.iter().map(String::as_str).collect();
    let last_category = visited
        .last()
        .and_then(|id| catalog.get(id))
        .map(|t| t.category.as_str());

    let mut visits_per_category: HashMap<&str, usize> = HashMap::new();
    for topic in catalog.topics() {
        if visited_set.contains(topic.id.as_str()) {
            *visits_per_category.entry(topic.category.as_str()).or_default() += 1;
        }
    }

    // Unvisited topics paired with their catalog position for tie-breaking.
    let remaining = catalog
        .topics()
        .iter()
        .enumerate()
        .filter(|(_, t)| !visited_set.contains(t.id.as_str()));

    let (other, same): (Vec<_>, Vec<_>) =
        remaining.partition(|(_, t)| Some(t.category.as_str()) != last_category);

    let pick = if !other.is_empty() {
        other.into_iter().min_by_key(|(index, t)| {
            let balance = match policy {
                RotationPolicy::Balanced => visits_per_category
                    .get(t.category.as_str())
                    .copied()
                    .unwrap_or(0),
                RotationPolicy::AvoidRepeat => 0,
            };
            (balance, t.priority_rank, *index)
        })
    } else {
        same.into_iter()
            .min_by_key(|(index, t)| (t.priority_rank, *index))
    };

    Ok(match pick {
        Some((_, topic)) => Selection::Next(topic),
        None => Selection::Exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_catalog() -> TopicCatalog {
        TopicCatalog::new(vec![
            Topic::new("T1", "technical", 1, "Explain T1."),
            Topic::new("T2", "technical", 2, "Explain T2."),
            Topic::new("T3", "behavioral", 1, "Describe T3."),
        ])
        .unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn id_of(selection: Selection<'_>) -> Option<&str> {
        selection.topic().map(|t| t.id.as_str())
    }

    #[test]
    fn test_scenario_a_first_then_diverse() {
        let catalog = scenario_catalog();
        assert_eq!(id_of(select_next(&catalog, &[]).unwrap()), Some("T1"));
        assert_eq!(id_of(select_next(&catalog, &ids(&["T1"])).unwrap()), Some("T3"));
    }

    #[test]
    fn test_falls_back_to_current_category() {
        let catalog = scenario_catalog();
        assert_eq!(
            id_of(select_next(&catalog, &ids(&["T1", "T3"])).unwrap()),
            Some("T2")
        );
    }

    #[test]
    fn test_scenario_c_exhausted() {
        let catalog = scenario_catalog();
        assert_eq!(
            select_next(&catalog, &ids(&["T1", "T2", "T3"])).unwrap(),
            Selection::Exhausted
        );
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let catalog = TopicCatalog::new(vec![]).unwrap();
        assert!(matches!(
            select_next(&catalog, &[]),
            Err(ConductorError::CatalogExhaustedPrematurely)
        ));
    }

    #[test]
    fn test_ties_break_by_rank_then_catalog_order() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("b2", "backend", 2, ""),
            Topic::new("f1", "frontend", 1, ""),
            Topic::new("b1", "backend", 1, ""),
            Topic::new("f1b", "frontend", 1, ""),
        ])
        .unwrap();
        assert_eq!(id_of(select_next(&catalog, &[]).unwrap()), Some("f1"));
        assert_eq!(id_of(select_next(&catalog, &ids(&["f1"])).unwrap()), Some("b1"));
        assert_eq!(
            id_of(select_next(&catalog, &ids(&["f1", "b1"])).unwrap()),
            Some("f1b")
        );
    }

    #[test]
    fn test_balanced_prefers_least_visited_category() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("d1", "design", 1, ""),
            Topic::new("a1", "analysis", 1, ""),
            Topic::new("b1", "behavioral", 1, ""),
            Topic::new("d2", "design", 2, ""),
            Topic::new("a2", "analysis", 2, ""),
        ])
        .unwrap();
        // design and analysis have one visit each, behavioral none.
        let visited = ids(&["d1", "a1"]);
        assert_eq!(
            id_of(select_next_with(&catalog, &visited, RotationPolicy::Balanced).unwrap()),
            Some("b1")
        );
        // Without balancing the lowest rank outside `analysis` wins: b1 (rank 1)
        // over d2 (rank 2).
        assert_eq!(
            id_of(select_next_with(&catalog, &visited, RotationPolicy::AvoidRepeat).unwrap()),
            Some("b1")
        );

        let visited = ids(&["d1", "b1", "a1"]);
        // Balanced: design has 1 visit, behavioral is exhausted; d2 is next.
        assert_eq!(
            id_of(select_next_with(&catalog, &visited, RotationPolicy::Balanced).unwrap()),
            Some("d2")
        );
    }

    #[test]
    fn test_policies_differ_on_balance() {
        let catalog = TopicCatalog::new(vec![
            Topic::new("x1", "x", 1, ""),
            Topic::new("x2", "x", 1, ""),
            Topic::new("y1", "y", 5, ""),
            Topic::new("z1", "z", 1, ""),
        ])
        .unwrap();
        let visited = ids(&["x1", "z1"]);
        // Balanced prefers untouched `y` even though its rank is worse.
        assert_eq!(
            id_of(select_next_with(&catalog, &visited, RotationPolicy::Balanced).unwrap()),
            Some("y1")
        );
        assert_eq!(
            id_of(select_next_with(&catalog, &visited, RotationPolicy::AvoidRepeat).unwrap()),
            Some("x2")
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let catalog = scenario_catalog();
        let visited = ids(&["T3"]);
        let first = select_next(&catalog, &visited).unwrap();
        for _ in 0..100 {
            assert_eq!(select_next(&catalog, &visited).unwrap(), first);
        }
    }

    #[test]
    fn test_repeated_selection_visits_every_topic_once() {
        let catalog = TopicCatalog::new(
            (0..12)
                .map(|i| Topic::new(format!("t{}", i), format!("c{}", i % 3), (i % 4) as u32, ""))
                .collect(),
        )
        .unwrap();
        for policy in [RotationPolicy::Balanced, RotationPolicy::AvoidRepeat] {
            let mut visited: Vec<String> = Vec::new();
            while let Selection::Next(topic) = select_next_with(&catalog, &visited, policy).unwrap() {
                assert!(!visited.contains(&topic.id), "{} selected twice", topic.id);
                if let Some(last) = visited.last() {
                    let last_category = &catalog.get(last).unwrap().category;
                    let other_left = catalog.topics().iter().any(|t| {
                        !visited.contains(&t.id) && &t.category != last_category
                    });
                    if other_left {
                        assert_ne!(&topic.category, last_category);
                    }
                }
                visited.push(topic.id.clone());
            }
            assert_eq!(visited.len(), catalog.len());
        }
    }

    #[test]
    fn test_rotation_policy_parsing() {
        assert_eq!("balanced".parse::<RotationPolicy>().unwrap(), RotationPolicy::Balanced);
        assert_eq!(
            "avoid-repeat".parse::<RotationPolicy>().unwrap(),
            RotationPolicy::AvoidRepeat
        );
        assert!("random".parse::<RotationPolicy>().is_err());
    }
}
