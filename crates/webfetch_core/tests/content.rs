use std::sync::Once;

use pretty_assertions::assert_eq;
use webfetch_core::extract_content;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[test]
fn article_content_wins_over_boilerplate() {
    init_logging();
    let html = r#"
    <html><body>
        <nav>Home | About | Contact</nav>
        <article>
            <h1>Headline</h1>
            <p>First paragraph of the story.</p>
            <p>Second paragraph.</p>
        </article>
        <footer>Copyright 2024</footer>
    </body></html>
    "#;
    let extracted = extract_content(html);
    assert!(!extracted.used_fallback);
    assert_eq!(
        extracted.text,
        "Headline\nFirst paragraph of the story.\nSecond paragraph."
    );
}

#[test]
fn links_and_images_are_preserved_inline() {
    init_logging();
    let html = r#"
    <html><body><article>
        <p>Read the <a href="/docs">documentation</a> first.</p>
        <img src="/diagram.png" alt="architecture diagram">
    </article></body></html>
    "#;
    let extracted = extract_content(html);
    assert!(extracted.text.contains("[documentation](/docs)"));
    assert!(extracted.text.contains("![architecture diagram](/diagram.png)"));
}

#[test]
fn noise_classes_are_excluded_from_primary_output() {
    init_logging();
    let html = r#"
    <html><body><main>
        <p>Real content here.</p>
        <div class="sidebar-promo">Subscribe now!</div>
    </main></body></html>
    "#;
    let extracted = extract_content(html);
    assert!(!extracted.used_fallback);
    assert_eq!(extracted.text, "Real content here.");
}

#[test]
fn whitespace_runs_collapse_in_primary_output() {
    init_logging();
    let html = "<html><body><p>Hello  World</p></body></html>";
    let extracted = extract_content(html);
    assert!(!extracted.used_fallback);
    assert_eq!(extracted.text, "Hello World");
}

#[test]
fn fallback_runs_when_primary_finds_nothing() {
    init_logging();
    // Only chrome in the body: the primary walker skips it all, the fallback
    // keeps the visible text.
    let html = r#"
    <html><body>
        <nav>Home | About</nav>
        <script>var x = 1;</script>
    </body></html>
    "#;
    let extracted = extract_content(html);
    assert!(extracted.used_fallback);
    assert_eq!(extracted.text, "Home | About");
}

#[test]
fn empty_document_yields_empty_content_not_an_error() {
    init_logging();
    let extracted = extract_content("<html><body><script>only();</script></body></html>");
    assert!(extracted.used_fallback);
    assert_eq!(extracted.text, "");
}

#[test]
fn fragment_hrefs_render_as_plain_text() {
    init_logging();
    let html = r##"
    <html><body><article>
        <p>Jump to <a href="#section">the section</a> below.</p>
    </article></body></html>
    "##;
    let extracted = extract_content(html);
    assert_eq!(extracted.text, "Jump to the section below.");
}

#[test]
fn list_items_become_dashed_lines() {
    init_logging();
    let html = r#"
    <html><body><article><ul>
        <li>alpha</li>
        <li>beta</li>
    </ul></article></body></html>
    "#;
    let extracted = extract_content(html);
    assert_eq!(extracted.text, "- alpha\n- beta");
}

#[test]
fn densest_body_section_is_selected_without_semantic_markers() {
    init_logging();
    let html = r#"
    <html><body>
        <div class="wrapper">
            <p>This long-form body copy carries the overwhelming majority of
            the text on the page and should be chosen as the content root.</p>
            <p>It continues across several sentences to stay clearly denser
            than everything around it.</p>
        </div>
        <div>ok</div>
    </body></html>
    "#;
    let extracted = extract_content(html);
    assert!(!extracted.used_fallback);
    assert!(extracted.text.contains("overwhelming majority"));
    assert!(!extracted.text.is_empty());
}
