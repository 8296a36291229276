use serde::{Deserialize, Serialize};

/// Sentinel stored in [`AppDetails::android_version`] when the listing says
/// the requirement varies with the device.
pub const ANDROID_VERSION_VARY: &str = "VARY";

/// Install bounds parsed from a free-text range such as `"1,000 - 5,000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRange {
    pub min: u64,
    pub max: u64,
}

/// Per-star rating counts. Keys are fixed; a missing or unreadable cell
/// counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    #[serde(rename = "1")]
    pub one: u64,
    #[serde(rename = "2")]
    pub two: u64,
    #[serde(rename = "3")]
    pub three: u64,
    #[serde(rename = "4")]
    pub four: u64,
    #[serde(rename = "5")]
    pub five: u64,
}

impl Histogram {
    /// Returns the count for `stars`, or `None` outside 1–5.
    #[must_use]
    pub fn get(&self, stars: u8) -> Option<u64> {
        match stars {
            1 => Some(self.one),
            2 => Some(self.two),
            3 => Some(self.three),
            4 => Some(self.four),
            5 => Some(self.five),
            _ => None,
        }
    }

    /// Sum of all five buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.one + self.two + self.three + self.four + self.five
    }
}

/// Everything the details page exposes about one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    pub app_id: String,
    /// Details URL the page was fetched from, including `hl`/`gl`.
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub icon: Option<String>,
    /// Raw price string from the `price` meta tag, e.g. `"0"` or `"$1.99"`.
    pub price: Option<String>,
    pub free: bool,
    pub min_installs: u64,
    pub max_installs: u64,
    pub score: f64,
    pub reviews: u64,
    pub developer: String,
    pub developer_email: Option<String>,
    pub developer_website: Option<String>,
    pub updated: String,
    pub version: String,
    pub genre: Option<String>,
    pub genre_id: Option<String>,
    pub family_genre: Option<String>,
    pub family_genre_id: Option<String>,
    pub size: String,
    /// Plain-text description with paragraph breaks kept as newlines.
    pub description: Option<String>,
    #[serde(rename = "descriptionHTML")]
    pub description_html: Option<String>,
    pub histogram: Histogram,
    #[serde(rename = "offersIAP")]
    pub offers_iap: bool,
    pub ad_supported: bool,
    pub android_version_text: String,
    /// Dotted version (`"4.1"`) or [`ANDROID_VERSION_VARY`].
    pub android_version: String,
    pub android_version_sdk: Option<u32>,
    pub content_rating: String,
    pub screenshots: Vec<String>,
    pub video: Option<String>,
    pub comments: Vec<String>,
    pub recent_changes: Vec<String>,
}

impl AppDetails {
    /// Returns the install bounds as a single value.
    #[must_use]
    pub fn installs(&self) -> InstallRange {
        InstallRange {
            min: self.min_installs,
            max: self.max_installs,
        }
    }

    /// `true` when the minimum SDK could not be pinned to a single version.
    #[must_use]
    pub fn varies_with_device(&self) -> bool {
        self.android_version == ANDROID_VERSION_VARY
    }
}

/// Developer response attached to a review. Date and text always travel
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperReply {
    pub date: String,
    pub text: String,
}

/// One user review from the reviews endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Numeric profile id taken from the author link; absent for reviews
    /// without a profile link.
    pub user_id: Option<String>,
    pub user_name: String,
    /// Localized date string exactly as displayed, e.g. `"March 3, 2017"`.
    pub date: String,
    pub url: Option<String>,
    /// Awarded stars, 1 to 5.
    pub score: u8,
    pub title: String,
    pub text: String,
    pub reply: Option<DeveloperReply>,
}

/// One entry of a search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: Option<String>,
    pub app_id: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub developer: Option<String>,
    pub developer_id: Option<String>,
    pub price_text: String,
    pub free: bool,
    pub summary: Option<String>,
    pub score_text: Option<String>,
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_details() -> AppDetails {
        AppDetails {
            app_id: "com.example.app".to_string(),
            url: "https://play.google.com/store/apps/details?id=com.example.app&hl=en&gl=us"
                .to_string(),
            title: "Example".to_string(),
            summary: None,
            icon: None,
            price: Some("0".to_string()),
            free: true,
            min_installs: 1_000,
            max_installs: 5_000,
            score: 4.3,
            reviews: 120,
            developer: "Example Inc.".to_string(),
            developer_email: None,
            developer_website: None,
            updated: "March 3, 2017".to_string(),
            version: "1.0".to_string(),
            genre: Some("Tools".to_string()),
            genre_id: Some("TOOLS".to_string()),
            family_genre: None,
            family_genre_id: None,
            size: "3.2M".to_string(),
            description: None,
            description_html: None,
            histogram: Histogram::default(),
            offers_iap: false,
            ad_supported: false,
            android_version_text: "Varies with device".to_string(),
            android_version: ANDROID_VERSION_VARY.to_string(),
            android_version_sdk: None,
            content_rating: "Everyone".to_string(),
            screenshots: vec![],
            video: None,
            comments: vec![],
            recent_changes: vec![],
        }
    }

    #[test]
    fn histogram_get_covers_fixed_keys() {
        let h = Histogram {
            one: 1,
            two: 2,
            three: 3,
            four: 4,
            five: 5,
        };
        assert_eq!(h.get(1), Some(1));
        assert_eq!(h.get(5), Some(5));
        assert_eq!(h.get(0), None);
        assert_eq!(h.get(6), None);
        assert_eq!(h.total(), 15);
    }

    #[test]
    fn histogram_serializes_with_star_keys() {
        let h = Histogram {
            five: 10,
            ..Histogram::default()
        };
        let json = serde_json::to_value(h).expect("serialization failed");
        assert_eq!(json["5"], 10);
        assert_eq!(json["1"], 0);
    }

    #[test]
    fn app_details_installs_pairs_bounds() {
        let details = make_details();
        assert_eq!(
            details.installs(),
            InstallRange {
                min: 1_000,
                max: 5_000
            }
        );
    }

    #[test]
    fn app_details_varies_with_device() {
        let mut details = make_details();
        assert!(details.varies_with_device());
        details.android_version = "4.1".to_string();
        assert!(!details.varies_with_device());
    }

    #[test]
    fn app_details_serializes_camel_case_keys() {
        let json = serde_json::to_value(make_details()).expect("serialization failed");
        assert_eq!(json["appId"], "com.example.app");
        assert_eq!(json["minInstalls"], 1_000);
        assert!(json["androidVersionSdk"].is_null());
        assert!(json.get("offersIAP").is_some());
        assert!(json.get("descriptionHTML").is_some());
    }

    #[test]
    fn review_without_reply_serializes_null_reply() {
        let review = Review {
            user_id: Some("1234".to_string()),
            user_name: "Jane".to_string(),
            date: "March 3, 2017".to_string(),
            url: None,
            score: 4,
            title: "Nice".to_string(),
            text: "Works well".to_string(),
            reply: None,
        };
        let json = serde_json::to_value(&review).expect("serialization failed");
        assert!(json["reply"].is_null());
        assert_eq!(json["userName"], "Jane");
    }
}
