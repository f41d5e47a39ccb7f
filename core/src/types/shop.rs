//! Shop cards, details, result lists and clipping state.

use serde::{Deserialize, Serialize};

use super::TopTags;

/// Compact shop row used by result and clipping lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSimple {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_category: String,
    pub shop_address: String,
    #[serde(default)]
    pub main_photo_url: Option<String>,
    #[serde(default)]
    pub shop_clipping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleShopResponse {
    #[serde(default)]
    pub shops: Vec<ShopSimple>,
}

/// The card shown during a swipe round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopCardResponse {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_category: String,
    pub shop_address: String,
    #[serde(default)]
    pub one_line_review: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub shop_clipping: bool,
    #[serde(default)]
    pub top_tags: TopTags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub name: String,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDetailResponse {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_category: String,
    pub shop_address: String,
    #[serde(default)]
    pub shop_hours: Option<String>,
    #[serde(default)]
    pub shop_phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub menus: Vec<Menu>,
    #[serde(default)]
    pub total_review_count: u32,
    #[serde(default)]
    pub shop_clipping: bool,
    #[serde(default)]
    pub top_tags: TopTags,
}

/// Bookmark state of a shop after a clipping call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippingResponse {
    pub shop_id: i64,
    pub shop_clipping: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_card_sorts_top_tags() {
        let card: ShopCardResponse = serde_json::from_str(
            r#"{
                "shopId": 11,
                "shopName": "Cherry Bistro",
                "shopCategory": "Western",
                "shopAddress": "1 Main St",
                "shopClipping": true,
                "topTags": [
                    {"description": "cozy", "weight": 20},
                    {"description": "tasty", "weight": 50}
                ]
            }"#,
        )
        .unwrap();
        assert!(card.shop_clipping);
        assert!(card.photo_urls.is_empty());
        assert_eq!(card.top_tags.top().map(|t| t.weight), Some(50));
    }

    #[test]
    fn shop_detail_rejects_over_budget_tags() {
        let result = serde_json::from_str::<ShopDetailResponse>(
            r#"{
                "shopId": 11,
                "shopName": "Cherry Bistro",
                "shopCategory": "Western",
                "shopAddress": "1 Main St",
                "latitude": 37.5,
                "longitude": 127.0,
                "topTags": [{"description": "all of it", "weight": 150}]
            }"#,
        );
        assert!(result.is_err());
    }
}
