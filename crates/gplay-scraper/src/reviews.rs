//! Reviews extraction.
//!
//! The reviews endpoint answers with a JSON envelope guarded by a `)]}'`
//! prefix; the review markup sits as an HTML string at `[0][2]`.

use std::fmt;
use std::str::FromStr;

use gplay_core::{DeveloperReply, Review};
use scraper::ElementRef;
use serde_json::Value;

use crate::dom::{self, Document};
use crate::error::ScraperError;
use crate::normalize::{
    extract_user_id, filter_review_text, parse_localized_star_rating, Locale,
};

/// Prefix of public review permalinks.
pub const PLAY_STORE_ORIGIN: &str = "https://play.google.com";

const XSSI_GUARD: &str = ")]}'";

/// Review ordering accepted by the reviews endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sort {
    #[default]
    Newest,
    Rating,
    Helpfulness,
}

impl Sort {
    /// Value sent as `reviewSortOrder`.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Newest => 0,
            Self::Rating => 1,
            Self::Helpfulness => 2,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Newest => "newest",
            Self::Rating => "rating",
            Self::Helpfulness => "helpfulness",
        };
        f.write_str(name)
    }
}

impl FromStr for Sort {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "0" => Ok(Self::Newest),
            "rating" | "1" => Ok(Self::Rating),
            "helpfulness" | "2" => Ok(Self::Helpfulness),
            other => Err(ScraperError::validation(
                "sort",
                format!("unknown sort '{other}'"),
            )),
        }
    }
}

/// Pulls the reviews HTML out of a raw `getreviews` response body.
///
/// # Errors
///
/// - [`ScraperError::Deserialize`] when the body (minus its guard) is not JSON.
/// - [`ScraperError::Parse`] when `[0][2]` is missing or not a string.
pub fn extract_reviews_payload(body: &str) -> Result<String, ScraperError> {
    let json = body.trim_start();
    let json = json.strip_prefix(XSSI_GUARD).unwrap_or(json);

    let envelope: Value =
        serde_json::from_str(json).map_err(|source| ScraperError::Deserialize {
            context: "reviews response".to_owned(),
            source,
        })?;

    envelope
        .get(0)
        .and_then(|first| first.get(2))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ScraperError::parse("reviews", "no HTML payload at [0][2]"))
}

/// Extracts every review on the page, in document order.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] for `score` when a review has no star
/// label or the label has no digit for `locale`.
pub fn extract_reviews(html: &str, locale: Locale) -> Result<Vec<Review>, ScraperError> {
    let doc = Document::parse_fragment(html);
    let reviews = dom::select_all(doc.root(), r#"div[class="single-review"]"#)
        .into_iter()
        .map(|element| extract_review(element, locale))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = reviews.len(), ?locale, "extracted reviews");
    Ok(reviews)
}

fn extract_review(element: ElementRef<'_>, locale: Locale) -> Result<Review, ScraperError> {
    let info = dom::select_first(element, r#"div[class="review-info"]"#);

    let user_link = info.and_then(|info| dom::select_first(info, "a"));
    let user_id = user_link
        .and_then(|link| link.value().attr("href"))
        .and_then(extract_user_id);
    let user_name = user_link
        .map(|link| dom::element_text(link).trim().to_owned())
        .unwrap_or_default();

    let date = dom::trimmed_text(element, r#"span[class="review-date"]"#);

    let label = dom::attr(element, ".star-rating-non-editable-container", "aria-label")
        .ok_or_else(|| ScraperError::parse("score", "review has no star rating label"))?;
    let score = parse_localized_star_rating(label.trim(), locale)?;

    let url = info
        .and_then(|info| dom::attr(info, ".reviews-permalink", "href"))
        .map(|href| format!("{PLAY_STORE_ORIGIN}{href}"));

    let body = dom::select_first(element, ".review-body");
    let title = body
        .map(|body| dom::trimmed_text(body, r#"span[class="review-title"]"#))
        .unwrap_or_default();
    let text = body
        .map(|body| {
            let full = dom::element_text(body);
            filter_review_text(full.trim(), title.chars().count())
        })
        .unwrap_or_default();

    Ok(Review {
        user_id,
        user_name,
        date,
        url,
        score,
        title,
        text,
        reply: developer_reply(element),
    })
}

/// The reply block is the review's next element sibling; its text is the
/// element's own text with the nested date removed.
fn developer_reply(review: ElementRef<'_>) -> Option<DeveloperReply> {
    let reply = dom::next_element_sibling(review)
        .filter(|next| dom::has_class(*next, "developer-reply"))?;
    Some(DeveloperReply {
        date: dom::trimmed_text(reply, "span.review-date"),
        text: dom::own_text(reply).trim().to_owned(),
    })
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
