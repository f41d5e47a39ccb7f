//! Per-user statistics and the nickname record.

use serde::{Deserialize, Serialize};

use super::{ShopSimple, TagTitle, TopTags, UserClass};

/// Per-user statistics, recomputed by the backend on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalyzeResponse {
    pub nickname: String,
    pub percentile: f64,
    pub user_class: UserClass,
    pub radar_values: [f64; 7],
    #[serde(default)]
    pub recent_clippings: Vec<ShopSimple>,
    #[serde(default)]
    pub recent_results: Vec<ShopSimple>,
    #[serde(default)]
    pub tags: TopTags,
}

impl UserAnalyzeResponse {
    /// Radar values paired with their axis.
    pub fn radar(&self) -> impl Iterator<Item = (TagTitle, f64)> + '_ {
        TagTitle::RADAR_AXES
            .iter()
            .copied()
            .zip(self.radar_values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNicknameResponse {
    pub nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYZE: &str = r#"{
        "nickname": "cherry",
        "percentile": 12.5,
        "userClass": "EXPLORER",
        "radarValues": [0.9, 0.4, 0.3, 0.7, 0.5, 0.6, 0.2]
    }"#;

    #[test]
    fn radar_pairs_values_with_axes() {
        let analyze: UserAnalyzeResponse = serde_json::from_str(ANALYZE).unwrap();
        let radar: Vec<(TagTitle, f64)> = analyze.radar().collect();
        assert_eq!(radar.len(), 7);
        assert_eq!(radar[0], (TagTitle::Taste, 0.9));
        assert_eq!(radar[6], (TagTitle::Accessibility, 0.2));
        assert_eq!(analyze.user_class, UserClass::Explorer);
        assert!(analyze.tags.is_empty());
    }

    #[test]
    fn radar_requires_seven_values() {
        let short = ANALYZE.replace("[0.9, 0.4, 0.3, 0.7, 0.5, 0.6, 0.2]", "[0.9, 0.4]");
        assert!(serde_json::from_str::<UserAnalyzeResponse>(&short).is_err());
    }
}
