use scraper::{Html, Selector};
use serde::Serialize;

/// Head-level metadata pulled from a single document.
///
/// Absent fields stay `None` and are omitted from serialized output rather
/// than null-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_image: Option<String>,
}

/// Extract head-level metadata from a document.
///
/// Pure function of the input text: parses once, no retries, no network.
/// `<meta name=...>` and `<meta property=...>` are matched case-insensitively
/// against a fixed table; the first occurrence of a repeated name wins. The
/// canonical href is returned exactly as written, not resolved against any
/// base URL.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let doc = Html::parse_document(html);
    let mut metadata = PageMetadata::default();

    if let Ok(sel) = Selector::parse("title") {
        metadata.title = doc
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty());
    }

    if let Ok(sel) = Selector::parse("meta") {
        for element in doc.select(&sel) {
            let Some(content) = element.value().attr("content") else {
                continue;
            };
            let name = element.value().attr("name").map(str::to_ascii_lowercase);
            let property = element.value().attr("property").map(str::to_ascii_lowercase);

            let slot = match name.as_deref() {
                Some("description") => &mut metadata.description,
                Some("keywords") => &mut metadata.keywords,
                Some("author") => &mut metadata.author,
                Some("twitter:card") => &mut metadata.twitter_card,
                Some("twitter:title") => &mut metadata.twitter_title,
                Some("twitter:description") => &mut metadata.twitter_description,
                Some("twitter:image") => &mut metadata.twitter_image,
                _ => match property.as_deref() {
                    Some("og:title") => &mut metadata.og_title,
                    Some("og:description") => &mut metadata.og_description,
                    Some("og:image") => &mut metadata.og_image,
                    Some("og:url") => &mut metadata.og_url,
                    Some("og:type") => &mut metadata.og_type,
                    _ => continue,
                },
            };
            if slot.is_none() {
                *slot = Some(content.to_string());
            }
        }
    }

    if let Ok(sel) = Selector::parse(r#"link[rel~="canonical"]"#) {
        metadata.canonical_url = doc
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::to_string);
    }

    metadata.language = doc
        .root_element()
        .value()
        .attr("lang")
        .map(str::to_string)
        .filter(|lang| !lang.is_empty());

    metadata
}
