use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// One hyperlink discovered in a document, with its resolved absolute URL.
///
/// `is_internal` and `is_external` are mutually exclusive; a link whose host
/// cannot be determined (mailto, data, etc.) is neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_internal: bool,
    pub is_external: bool,
}

/// Inclusion filters applied during link discovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkFilters {
    /// Keep only links on the same host as the source page.
    pub internal_only: bool,
    /// Keep only links on a different host.
    pub external_only: bool,
    /// Keep pure fragment references, which are skipped by default.
    pub include_anchors: bool,
}

/// Extract every anchor carrying an href, in document order.
///
/// Relative, protocol-relative, and absolute hrefs are all resolved against
/// `source_url`; an href the URL parser cannot resolve is skipped. Duplicate
/// hrefs produce separate records.
pub fn extract_links(html: &str, source_url: &Url, filters: LinkFilters) -> Vec<LinkRecord> {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let source_host = source_url.host_str().unwrap_or("");

    let mut records = Vec::new();
    for element in doc.select(&sel) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') && !filters.include_anchors {
            continue;
        }
        let Ok(resolved) = source_url.join(href) else {
            continue;
        };

        let link_host = resolved.host_str().unwrap_or("");
        let is_internal = !link_host.is_empty() && link_host == source_host;
        let is_external = !link_host.is_empty() && link_host != source_host;

        if filters.internal_only && !is_internal {
            continue;
        }
        if filters.external_only && !is_external {
            continue;
        }

        records.push(LinkRecord {
            url: resolved.into(),
            text: element.text().collect::<String>().trim().to_string(),
            title: element.value().attr("title").map(str::to_string),
            is_internal,
            is_external,
        });
    }
    records
}
