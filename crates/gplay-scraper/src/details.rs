//! App details page extraction.
//!
//! The details page is server-rendered HTML. Every field is located through
//! a class, attribute or `itemprop` landmark; see [`crate::dom`] for the
//! text semantics. Only the title and the install range are load-bearing:
//! without them the page is treated as a layout change and rejected.

use gplay_core::{AppDetails, Histogram};
use scraper::ElementRef;

use crate::dom::{self, Document};
use crate::error::ScraperError;
use crate::normalize::{
    clean_integer, normalize_android_version, parse_install_range, parse_localized_score,
    resolve_sdk_level,
};

const FAMILY_CATEGORY: &str = r#".details-info .category[href*="FAMILY"]"#;

/// Extracts every details field from a details page.
///
/// `app_id` and `url` describe the request the page came from and are copied
/// into the result unchanged.
///
/// # Errors
///
/// - [`ScraperError::Parse`] for `title` when the document title is missing
///   or blank.
/// - [`ScraperError::Parse`] for `installs` when the download range has no
///   recognised delimiter.
pub fn extract_app_details(html: &str, app_id: &str, url: &str) -> Result<AppDetails, ScraperError> {
    let doc = Document::parse(html);
    let root = doc.root();

    let title = dom::trimmed_text(root, ".details-info div.document-title");
    if title.is_empty() {
        return Err(ScraperError::parse(
            "title",
            "no .details-info div.document-title on page",
        ));
    }

    let developer = dom::text(root, r#".details-info span[itemprop="name"]"#);
    let summary = dom::attr(root, r#"meta[name="description"]"#, "content");

    let (genre, genre_id) = dom::select_first(root, ".details-info .category")
        .map(category)
        .unwrap_or_default();
    let (family_genre, family_genre_id) = if dom::exists(root, FAMILY_CATEGORY) {
        let text = dom::trimmed_text(root, FAMILY_CATEGORY);
        let id = dom::attr(root, FAMILY_CATEGORY, "href")
            .as_deref()
            .and_then(genre_id_from_href);
        (Some(text).filter(|t| !t.is_empty()), id)
    } else {
        (None, None)
    };

    let price = dom::attr(root, ".details-info meta[itemprop=price]", "content");
    let free = price.as_deref() == Some("0");
    let icon = dom::attr(root, ".details-info img.cover-image", "src");
    let offers_iap = dom::exists(root, ".details-info .inapp-msg");
    let ad_supported = dom::exists(root, ".details-info .ads-supported-label-msg");

    let description_html = dom::select_first(
        root,
        ".details-section-contents div[itemprop=description] div",
    )
    .map(|element| element.inner_html());
    let description = description_html
        .as_deref()
        .map(dom::text_with_paragraph_breaks);

    let version = content_by_itemprop(root, "softwareVersion");
    let updated = content_by_itemprop(root, "datePublished");
    let android_version_text = content_by_itemprop(root, "operatingSystems");
    let android_version = normalize_android_version(&android_version_text);
    let android_version_sdk = resolve_sdk_level(&android_version);
    let content_rating = content_by_itemprop(root, "contentRating");
    let size = content_by_itemprop(root, "fileSize");
    let installs = parse_install_range(&content_by_itemprop(root, "numDownloads"))?;

    let developer_email = dom::attr(
        root,
        r#".details-section-contents .dev-link[href^="mailto:"]"#,
        "href",
    )
    .as_deref()
    .and_then(email_from_mailto);
    let developer_website = dom::attr(
        root,
        r#".details-section-contents .dev-link[href^="http"]"#,
        "href",
    )
    .as_deref()
    .and_then(unwrap_redirect);

    let comments = dom::select_all(root, ".quoted-review")
        .into_iter()
        .map(|element| dom::element_text(element).trim().to_owned())
        .collect();
    let reviews = clean_integer(&dom::text(root, ".rating-box span.reviews-num"));
    let score = parse_localized_score(&dom::text(root, ".rating-box div.score"));
    let histogram = histogram(root);

    let video = dom::attr(
        root,
        ".screenshots span.preview-overlay-container[data-video-url]",
        "data-video-url",
    )
    .map(|video| strip_query(&video).to_owned());
    let screenshots = dom::attrs(root, ".thumbnails .screenshot", "src");
    let recent_changes = dom::select_all(root, ".recent-change")
        .into_iter()
        .map(dom::element_text)
        .collect();

    tracing::debug!(app_id, %title, "extracted app details");

    Ok(AppDetails {
        app_id: app_id.to_owned(),
        url: url.to_owned(),
        title,
        summary,
        icon,
        price,
        free,
        min_installs: installs.min,
        max_installs: installs.max,
        score,
        reviews,
        developer,
        developer_email,
        developer_website,
        updated,
        version,
        genre,
        genre_id,
        family_genre,
        family_genre_id,
        size,
        description,
        description_html,
        histogram,
        offers_iap,
        ad_supported,
        android_version_text,
        android_version,
        android_version_sdk,
        content_rating,
        screenshots,
        video,
        comments,
        recent_changes,
    })
}

/// Text of the `div.content` tagged with `itemprop` in the additional
/// information section, trimmed.
fn content_by_itemprop(root: ElementRef<'_>, itemprop: &str) -> String {
    dom::trimmed_text(
        root,
        &format!(r#".details-section-contents div.content[itemprop="{itemprop}"]"#),
    )
}

fn category(element: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let text = dom::element_text(element).trim().to_owned();
    let id = element.value().attr("href").and_then(genre_id_from_href);
    (Some(text), id)
}

/// `/store/apps/category/GAME_ACTION` → `GAME_ACTION` (fifth `/` segment).
fn genre_id_from_href(href: &str) -> Option<String> {
    href.split('/').nth(4).map(str::to_owned)
}

/// `mailto:dev@example.com` → `dev@example.com`: the text between the first
/// and second colon.
fn email_from_mailto(href: &str) -> Option<String> {
    href.split(':').nth(1).map(str::to_owned)
}

/// Outbound links go through `https://www.google.com/url?q=<target>&…`; the
/// real destination is the redirector's `q` parameter.
fn unwrap_redirect(href: &str) -> Option<String> {
    let url = reqwest::Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn histogram(root: ElementRef<'_>) -> Histogram {
    let bar = |class: &str| {
        clean_integer(&dom::text(
            root,
            &format!(".rating-histogram .{class} .bar-number"),
        ))
    };
    Histogram {
        one: bar("one"),
        two: bar("two"),
        three: bar("three"),
        four: bar("four"),
        five: bar("five"),
    }
}

#[cfg(test)]
#[path = "details_test.rs"]
mod tests;
