use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Main-content text derived from one document, plus which stage produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub used_fallback: bool,
}

/// Subtrees that never contribute main-content text.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "template", "nav", "header", "footer", "aside",
    "form", "button", "select", "svg",
];

/// class/id fragments that mark page chrome rather than content.
const NOISE_MARKERS: &[&str] = &[
    "advert", "banner", "breadcrumb", "carousel", "cookie", "newsletter", "popup", "promo",
    "related", "sidebar", "social", "sponsor", "subscribe",
];

/// Derive the main-content text of a document.
///
/// Stage 1 picks a content container (semantic element, else the densest
/// top-level section of the body) and renders it with boilerplate subtrees
/// skipped, keeping link and image references inline. Stage 2 runs only when
/// stage 1 yields nothing: it drops script/style subtrees, takes the
/// remaining visible text, and collapses its whitespace line by line. Neither
/// stage ever returns markup; an unextractable document yields an empty
/// string, not an error.
pub fn extract_content(html: &str) -> ExtractedContent {
    let doc = Html::parse_document(html);
    match primary_text(&doc) {
        Some(text) => ExtractedContent {
            text,
            used_fallback: false,
        },
        None => ExtractedContent {
            text: fallback_text(&doc),
            used_fallback: true,
        },
    }
}

fn primary_text(doc: &Html) -> Option<String> {
    let container = semantic_container(doc).or_else(|| densest_section(doc))?;
    let text = render_block(container);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn semantic_container<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    for selector in ["article", "main", r#"[role="main"]"#] {
        if let Ok(sel) = Selector::parse(selector) {
            if let Some(element) = doc.select(&sel).next() {
                return Some(element);
            }
        }
    }
    None
}

/// Without a semantic container, prefer the densest top-level section of the
/// body. A section only wins when it holds the clear majority of the body
/// text; otherwise the whole body is the candidate.
fn densest_section<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())?;
    let body_len = render_block(body).len();

    let mut best: Option<(usize, ElementRef<'a>)> = None;
    for child in body.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        if is_excluded(element) {
            continue;
        }
        let len = render_block(element).len();
        if best.is_none_or(|(best_len, _)| len > best_len) {
            best = Some((len, element));
        }
    }

    match best {
        Some((len, element)) if len * 10 >= body_len * 7 => Some(element),
        _ => Some(body),
    }
}

fn is_excluded(element: ElementRef<'_>) -> bool {
    let tag = element.value().name().to_ascii_lowercase();
    if SKIP_TAGS.contains(&tag.as_str()) {
        return true;
    }
    for attr in ["class", "id"] {
        if let Some(value) = element.value().attr(attr) {
            let value = value.to_ascii_lowercase();
            if NOISE_MARKERS.iter().any(|marker| value.contains(marker)) {
                return true;
            }
        }
    }
    false
}

fn render_block(root: ElementRef<'_>) -> String {
    let mut out = TextComposer::default();
    visit_children(root, &mut out);
    out.finish()
}

fn visit_node(node: NodeRef<'_, Node>, out: &mut TextComposer) {
    match node.value() {
        Node::Text(text) => out.append_text(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, out);
            }
        }
        _ => {}
    }
}

fn visit_element(element: ElementRef<'_>, out: &mut TextComposer) {
    if is_excluded(element) {
        return;
    }
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "a" => visit_anchor(element, out),
        "img" => visit_image(element, out),
        "br" => out.break_line(),
        "li" => {
            out.break_line();
            out.append_raw("- ");
            visit_children(element, out);
            out.break_line();
        }
        "p" | "div" | "section" | "article" | "main" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "ul" | "ol" | "dl" | "dt" | "dd" | "table" | "tr" | "blockquote" | "pre" | "figure"
        | "figcaption" | "address" | "hr" => {
            out.break_line();
            visit_children(element, out);
            out.break_line();
        }
        _ => visit_children(element, out),
    }
}

fn visit_children(element: ElementRef<'_>, out: &mut TextComposer) {
    for child in element.children() {
        visit_node(child, out);
    }
}

fn visit_anchor(element: ElementRef<'_>, out: &mut TextComposer) {
    let href = element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| is_content_href(href));
    let Some(href) = href else {
        visit_children(element, out);
        return;
    };
    let checkpoint = out.checkpoint();
    visit_children(element, out);
    out.wrap_link(checkpoint, href);
}

fn visit_image(element: ElementRef<'_>, out: &mut TextComposer) {
    let Some(src) = element
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
    else {
        return;
    };
    let alt = element.value().attr("alt").unwrap_or("").trim();
    out.ensure_space();
    out.append_raw(&format!("![{alt}]({src})"));
}

fn is_content_href(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
}

/// Accumulates rendered text, collapsing whitespace runs and keeping at most
/// one line break between blocks.
#[derive(Default)]
struct TextComposer {
    out: String,
}

impl TextComposer {
    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.out.is_empty() || self.out.ends_with([' ', '\n']) {
                    continue;
                }
                self.out.push(' ');
            } else {
                self.out.push(ch);
            }
        }
    }

    fn append_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn break_line(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if self.out.is_empty() || self.out.ends_with('\n') {
            return;
        }
        self.out.push('\n');
    }

    fn ensure_space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with([' ', '\n']) {
            self.out.push(' ');
        }
    }

    fn checkpoint(&self) -> usize {
        self.out.len()
    }

    /// Rewrite everything appended since `checkpoint` as a `[label](href)`
    /// reference. A label that rendered to nothing drops the link entirely.
    fn wrap_link(&mut self, checkpoint: usize, href: &str) {
        let label = self.out[checkpoint..].trim().to_string();
        self.out.truncate(checkpoint);
        if label.is_empty() {
            return;
        }
        self.out.push('[');
        self.out.push_str(&label);
        self.out.push_str("](");
        self.out.push_str(href);
        self.out.push(')');
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

fn fallback_text(doc: &Html) -> String {
    let mut raw = String::new();
    collect_text(*doc.root_element(), &mut raw);
    normalize_fragments(&raw)
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
                return;
            }
        }
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

/// Trim every line, split runs of two or more spaces, drop empty fragments,
/// and rejoin the survivors with single newlines. Deliberately lossy: blank
/// lines and indentation do not survive.
fn normalize_fragments(text: &str) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    for line in text.lines() {
        for fragment in line.trim().split("  ") {
            let fragment = fragment.trim();
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }
    }
    fragments.join("\n")
}
