//! Weighted descriptive tags.
//!
//! # Design
//! `TopTags` validates on decode: it is sorted heaviest first and its weights
//! stay within [`PERCENTILE_BUDGET`], so consumers can draw proportional bars
//! without rechecking the payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the sum of tag weights in a [`TopTags`] list.
pub const PERCENTILE_BUDGET: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWeight {
    pub description: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopTagsError {
    #[error("tag weights sum to {total}, above the budget of {}", PERCENTILE_BUDGET)]
    OverBudget { total: u32 },
}

/// Ranked tags of a shop or user, heaviest first.
///
/// Equal weights keep the order they arrived in. The weights never sum to
/// more than [`PERCENTILE_BUDGET`]; a payload that does fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TagWeight>", into = "Vec<TagWeight>")]
pub struct TopTags(Vec<TagWeight>);

impl TopTags {
    pub fn new(tags: Vec<TagWeight>) -> Result<Self, TopTagsError> {
        Self::try_from(tags)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagWeight> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn top(&self) -> Option<&TagWeight> {
        self.0.first()
    }

    pub fn total_weight(&self) -> u32 {
        self.0.iter().map(|tag| tag.weight).sum()
    }
}

impl TryFrom<Vec<TagWeight>> for TopTags {
    type Error = TopTagsError;

    fn try_from(mut tags: Vec<TagWeight>) -> Result<Self, Self::Error> {
        let total = tags
            .iter()
            .fold(0u32, |acc, tag| acc.saturating_add(tag.weight));
        if total > PERCENTILE_BUDGET {
            return Err(TopTagsError::OverBudget { total });
        }
        // stable: ties keep insertion order
        tags.sort_by(|a, b| b.weight.cmp(&a.weight));
        Ok(Self(tags))
    }
}

impl From<TopTags> for Vec<TagWeight> {
    fn from(tags: TopTags) -> Self {
        tags.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(description: &str, weight: u32) -> TagWeight {
        TagWeight {
            description: description.to_string(),
            weight,
        }
    }

    #[test]
    fn sorts_descending_and_keeps_ties_in_order() {
        let tags = TopTags::new(vec![
            tag("cozy", 10),
            tag("spicy", 40),
            tag("quiet", 10),
            tag("cheap", 25),
        ])
        .unwrap();
        let order: Vec<&str> = tags.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(order, ["spicy", "cheap", "cozy", "quiet"]);
        assert_eq!(tags.top().map(|t| t.weight), Some(40));
    }

    #[test]
    fn rejects_weights_over_budget() {
        let err = TopTags::new(vec![tag("a", 60), tag("b", 50)]).unwrap_err();
        assert_eq!(err, TopTagsError::OverBudget { total: 110 });
    }

    #[test]
    fn exact_budget_is_accepted() {
        let tags = TopTags::new(vec![tag("a", 60), tag("b", 40)]).unwrap();
        assert_eq!(tags.total_weight(), PERCENTILE_BUDGET);
    }

    #[test]
    fn decoding_sorts_and_validates() {
        let parsed: TopTags = serde_json::from_str(
            r#"[{"description":"kind","weight":5},{"description":"tasty","weight":70}]"#,
        )
        .unwrap();
        assert_eq!(parsed.top().map(|t| t.description.as_str()), Some("tasty"));

        let over = serde_json::from_str::<TopTags>(r#"[{"description":"x","weight":101}]"#);
        assert!(over.is_err());
    }
}
