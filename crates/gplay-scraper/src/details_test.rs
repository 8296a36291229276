use super::*;

const PAGE: &str = include_str!("../tests/fixtures/app_details.html");
const APP_ID: &str = "com.inkwell.sketchpad";
const URL: &str = "https://play.google.com/store/apps/details?id=com.inkwell.sketchpad&hl=en&gl=us";

fn extract(html: &str) -> AppDetails {
    extract_app_details(html, APP_ID, URL).expect("fixture should extract")
}

#[test]
fn copies_request_identity() {
    let details = extract(PAGE);
    assert_eq!(details.app_id, APP_ID);
    assert_eq!(details.url, URL);
}

#[test]
fn extracts_header_fields() {
    let details = extract(PAGE);
    assert_eq!(details.title, "Sketch Pad Pro");
    assert_eq!(details.developer, "Inkwell Labs");
    assert_eq!(details.summary.as_deref(), Some("Draw, paint and sketch anywhere."));
    assert_eq!(
        details.icon.as_deref(),
        Some("https://lh3.googleusercontent.com/icon=w300")
    );
}

#[test]
fn genre_and_id_come_from_first_category_link() {
    let details = extract(PAGE);
    assert_eq!(details.genre.as_deref(), Some("Art & Design"));
    assert_eq!(details.genre_id.as_deref(), Some("ART_AND_DESIGN"));
}

#[test]
fn family_genre_present_when_category_links_family() {
    let details = extract(PAGE);
    assert_eq!(details.family_genre.as_deref(), Some("Creativity"));
    assert_eq!(details.family_genre_id.as_deref(), Some("FAMILY_CREATE"));
}

#[test]
fn family_genre_absent_without_family_category() {
    let html = PAGE.replace("FAMILY_CREATE", "ART_KIDS");
    let details = extract(&html);
    assert!(details.family_genre.is_none());
    assert!(details.family_genre_id.is_none());
}

#[test]
fn zero_price_is_free() {
    let details = extract(PAGE);
    assert_eq!(details.price.as_deref(), Some("0"));
    assert!(details.free);

    let paid = extract(&PAGE.replace(r#"itemprop="price" content="0""#, r#"itemprop="price" content="$2.99""#));
    assert_eq!(paid.price.as_deref(), Some("$2.99"));
    assert!(!paid.free);
}

#[test]
fn purchase_and_ad_flags_follow_markers() {
    let details = extract(PAGE);
    assert!(details.offers_iap);
    assert!(!details.ad_supported);
}

#[test]
fn description_keeps_paragraph_breaks() {
    let details = extract(PAGE);
    assert_eq!(
        details.description.as_deref(),
        Some("Sketch on the go.\nLayers, brushes and more.\n")
    );
    assert!(details
        .description_html
        .as_deref()
        .is_some_and(|html| html.contains("<b>more</b>")));
}

#[test]
fn additional_information_fields() {
    let details = extract(PAGE);
    assert_eq!(details.updated, "March 3, 2017");
    assert_eq!(details.size, "12M");
    assert_eq!(details.version, "2.4.1");
    assert_eq!(details.content_rating, "Everyone");
    assert_eq!(details.min_installs, 1_000_000);
    assert_eq!(details.max_installs, 5_000_000);
}

#[test]
fn android_version_resolves_sdk_level() {
    let details = extract(PAGE);
    assert_eq!(details.android_version_text, "4.1 and up");
    assert_eq!(details.android_version, "4.1");
    assert_eq!(details.android_version_sdk, Some(16));
}

#[test]
fn android_version_varies_with_device() {
    let details = extract(&PAGE.replace("4.1 and up", "Varies with device"));
    assert_eq!(details.android_version, gplay_core::ANDROID_VERSION_VARY);
    assert!(details.varies_with_device());
    assert!(details.android_version_sdk.is_none());
}

#[test]
fn developer_contact_links() {
    let details = extract(PAGE);
    assert_eq!(
        details.developer_email.as_deref(),
        Some("support@inkwell.example.com")
    );
    assert_eq!(
        details.developer_website.as_deref(),
        Some("https://inkwell.example.com/")
    );
}

#[test]
fn rating_summary_uses_localized_numbers() {
    let details = extract(PAGE);
    assert!((details.score - 4.3).abs() < f64::EPSILON);
    assert_eq!(details.reviews, 12_345);
}

#[test]
fn histogram_reads_each_bar_and_defaults_empty_to_zero() {
    let details = extract(PAGE);
    assert_eq!(
        details.histogram,
        Histogram {
            one: 0,
            two: 500,
            three: 1_000,
            four: 2_345,
            five: 8_000,
        }
    );
}

#[test]
fn media_fields() {
    let details = extract(PAGE);
    assert_eq!(
        details.video.as_deref(),
        Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
    );
    assert_eq!(
        details.screenshots,
        vec![
            "https://lh3.googleusercontent.com/shot1",
            "https://lh3.googleusercontent.com/shot2",
        ]
    );
}

#[test]
fn comments_and_recent_changes_keep_page_order() {
    let details = extract(PAGE);
    assert_eq!(
        details.comments,
        vec!["Best drawing app I have used.", "Needs a dark mode."]
    );
    assert_eq!(
        details.recent_changes,
        vec!["Fixed crash on rotate", "New brushes"]
    );
}

#[test]
fn missing_optional_sections_yield_defaults() {
    let html = r#"
        <div class="details-info"><div class="document-title">Bare</div></div>
        <div class="details-section-contents">
          <div class="content" itemprop="numDownloads">10 - 50</div>
        </div>
    "#;
    let details = extract(html);
    assert_eq!(details.title, "Bare");
    assert!(details.genre.is_none());
    assert!(details.video.is_none());
    assert!(details.developer_email.is_none());
    assert!(details.screenshots.is_empty());
    assert_eq!(details.histogram, Histogram::default());
    assert!(details.score.abs() < f64::EPSILON);
    assert!(!details.free);
}

#[test]
fn missing_title_is_parse_error() {
    let html = PAGE.replace("Sketch Pad Pro", "  ");
    let err = extract_app_details(&html, APP_ID, URL).unwrap_err();
    assert!(
        matches!(err, ScraperError::Parse { field: "title", .. }),
        "expected Parse(title), got: {err:?}"
    );
}

#[test]
fn install_range_without_delimiter_is_parse_error() {
    let html = PAGE.replace("1,000,000 - 5,000,000", "1,000,000+");
    let err = extract_app_details(&html, APP_ID, URL).unwrap_err();
    assert!(
        matches!(err, ScraperError::Parse { field: "installs", .. }),
        "expected Parse(installs), got: {err:?}"
    );
}

#[test]
fn helpers_handle_malformed_links() {
    assert_eq!(genre_id_from_href("/store/apps").as_deref(), None);
    assert_eq!(email_from_mailto("no-colon").as_deref(), None);
    assert!(unwrap_redirect("not a url").is_none());
    assert!(unwrap_redirect("https://www.google.com/url?sa=D").is_none());
    assert_eq!(strip_query("https://x.test/v"), "https://x.test/v");
}
