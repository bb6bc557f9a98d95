//! Chapter markup sanitising.
//!
//! Chapter documents come from whoever uploaded the book, and the viewer
//! renders them inside the app. The document is parsed with an HTML5
//! parser and re-serialised from the `<body>` down, keeping only inert
//! content: active elements are dropped with everything inside them,
//! event-handler attributes are removed, and URL attributes with a
//! script-capable scheme are removed.

use scraper::{ElementRef, Html, Node};

/// Elements dropped together with their content.
const DROPPED_ELEMENTS: &[&str] = &[
    "animate",
    "animatemotion",
    "animatetransform",
    "applet",
    "base",
    "embed",
    "form",
    "frame",
    "frameset",
    "iframe",
    "link",
    "meta",
    "noscript",
    "object",
    "portal",
    "script",
    "set",
    "style",
    "template",
];

/// Elements serialised without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "hr", "img", "input", "source", "track", "wbr",
];

/// Attributes whose value is fetched or navigated to.
const URL_ATTRIBUTES: &[&str] = &[
    "action",
    "background",
    "cite",
    "formaction",
    "href",
    "longdesc",
    "poster",
    "src",
    "srcset",
];

/// Sanitised inner markup of the document's `<body>`.
///
/// Markup without a `<body>` is treated as body content.
pub(crate) fn body_markup(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut out = String::with_capacity(markup.len());
    let body = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body");
    if let Some(body) = body {
        write_children(body, &mut out);
    }
    out
}

fn write_children(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            write_element(element, out);
        } else if let Node::Text(text) = child.value() {
            escape_into(text, false, out);
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    let lower = name.to_ascii_lowercase();
    if DROPPED_ELEMENTS.contains(&lower.as_str()) {
        return;
    }

    // Sorted so the output does not depend on the parser's attribute order.
    let mut attrs: Vec<(&str, &str)> = element
        .value()
        .attrs()
        .filter(|(attr, value)| keep_attribute(attr, value))
        .collect();
    attrs.sort_unstable();

    out.push('<');
    out.push_str(name);
    for (attr, value) in attrs {
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&lower.as_str()) {
        return;
    }
    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn keep_attribute(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") || name == "srcdoc" {
        return false;
    }
    if URL_ATTRIBUTES.contains(&name.as_str()) {
        return !is_script_url(value);
    }
    if name == "style" {
        let style = value.to_ascii_lowercase();
        return !(style.contains("expression(") || style.contains("javascript:"));
    }
    true
}

/// Browsers ignore whitespace and control characters inside a scheme,
/// so they are removed before the scheme is compared.
fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect();
    let compact = compact.to_ascii_lowercase();
    compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || (compact.starts_with("data:") && !compact.starts_with("data:image/"))
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_body_only() {
        let markup = "<html><head><title>x</title></head>\
                      <body class=\"c\"><p>Hi</p><script>alert(1)</script></body></html>";
        assert_eq!(body_markup(markup), "<p>Hi</p>");
    }

    #[test]
    fn fragment_without_body_is_kept() {
        assert_eq!(body_markup("<p>fragment</p>"), "<p>fragment</p>");
    }

    #[test]
    fn strips_event_handlers_script_urls_and_frames() {
        let markup = r#"<html><body><img src="x" onerror="alert(document.cookie)"/><a href="javascript:alert(1)">x</a><iframe src="https://evil.example"></iframe></body></html>"#;
        let out = body_markup(markup);
        assert_eq!(out, r#"<img src="x"><a>x</a>"#);
    }

    #[test]
    fn obfuscated_schemes_are_caught() {
        let out = body_markup(
            "<a href=\" jav\tascript:alert(1)\">a</a>\
             <a href=\"VBScript:x\">b</a>\
             <a href=\"data:text/html,<script>alert(1)</script>\">c</a>",
        );
        assert_eq!(out, "<a>a</a><a>b</a><a>c</a>");
    }

    #[test]
    fn inert_content_survives() {
        let markup = r#"<body><h1 id="t">A &amp; B</h1><p class="x">1 &lt; 2<br>"quoted"</p><a href="ch2.xhtml#s">next</a><img src="data:image/png;base64,AA" alt="i"></body>"#;
        assert_eq!(
            body_markup(markup),
            r#"<h1 id="t">A &amp; B</h1><p class="x">1 &lt; 2<br>"quoted"</p><a href="ch2.xhtml#s">next</a><img alt="i" src="data:image/png;base64,AA">"#
        );
    }

    #[test]
    fn svg_animation_cannot_rewrite_links() {
        let markup = r##"<svg><a href="#"><set attributeName="href" to="javascript:alert(1)"/><text>t</text></a></svg>"##;
        let out = body_markup(markup);
        assert!(!out.contains("javascript"), "{out}");
        assert!(out.contains("<text>t</text>"), "{out}");
    }

    #[test]
    fn active_elements_are_dropped_with_content() {
        let out = body_markup(
            "<p>keep</p><object data=\"x.swf\"><p>fallback</p></object>\
             <form action=\"/steal\"><input name=\"k\"></form><style>p{}</style>",
        );
        assert_eq!(out, "<p>keep</p>");
    }
}
