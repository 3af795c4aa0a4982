use std::collections::{HashMap, HashSet};

use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use scraper::Html;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// The parser drops one newline right after these start tags.
const LEADING_NEWLINE_TAGS: &[&str] = &["pre", "listing", "textarea"];

const ARTICLE_TAGS: &[&str] = &[
    "h3", "h4", "h5", "h6", "blockquote", "p", "ul", "ol", "nl", "li", "b", "i", "strong", "em",
    "strike", "code", "hr", "br", "div", "table", "thead", "caption", "tbody", "tr", "th", "td",
    "pre", "iframe", "img", "figure", "article", "h2", "h1",
];

/// Tags and attributes that survive sanitization.
#[derive(Debug, Clone)]
pub struct AllowList {
    tags: HashSet<String>,
    /// Allowed attributes per tag, in output order.
    attributes: HashMap<String, Vec<String>>,
    url_attributes: HashSet<String>,
    allowed_schemes: HashSet<String>,
    discard_content: HashSet<String>,
    empty_content: HashSet<String>,
}

impl AllowList {
    /// Allows nothing; text content is kept, script-like content is dropped.
    pub fn empty() -> Self {
        Self {
            tags: HashSet::new(),
            attributes: HashMap::new(),
            url_attributes: to_set(&["src", "href", "cite"]),
            allowed_schemes: to_set(&["http", "https", "ftp", "mailto", "tel"]),
            discard_content: to_set(&[
                "script", "style", "textarea", "option", "noscript", "template",
            ]),
            // Raw-text elements whose children would not survive a reparse.
            empty_content: to_set(&["iframe", "xmp", "noembed", "noframes"]),
        }
    }

    /// Structural and semantic article markup; only images carry attributes.
    pub fn article() -> Self {
        Self::empty()
            .allow_tags(ARTICLE_TAGS)
            .allow_attributes("img", &["src", "alt", "sizes"])
    }

    pub fn allow_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_ascii_lowercase()));
        self
    }

    pub fn allow_attributes(mut self, tag: &str, attributes: &[&str]) -> Self {
        let allowed = self.attributes.entry(tag.to_ascii_lowercase()).or_default();
        for attribute in attributes {
            let attribute = attribute.to_ascii_lowercase();
            if !allowed.contains(&attribute) {
                allowed.push(attribute);
            }
        }
        self
    }

    pub fn is_tag_allowed(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn allowed_attributes(&self, tag: &str) -> &[String] {
        self.attributes.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    fn is_value_allowed(&self, attribute: &str, value: &str) -> bool {
        !self.url_attributes.contains(attribute) || self.is_url_allowed(value)
    }

    fn is_url_allowed(&self, value: &str) -> bool {
        // Browsers ignore embedded whitespace and control characters in schemes.
        let compact: String = value
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
            .collect();
        match url_scheme(&compact) {
            Some(scheme) => self.allowed_schemes.contains(&scheme.to_ascii_lowercase()),
            None => true,
        }
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::article()
    }
}

/// Cleans an untrusted HTML fragment against `allow`.
///
/// Disallowed tags are unwrapped (their text survives) except script-like
/// tags, which are removed with their content. Disallowed attributes are
/// stripped. Malformed markup is recovered by the HTML5 parser, and the
/// result is a fixed point: sanitizing it again returns it unchanged.
pub fn sanitize(html: &str, allow: &AllowList) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        write_node(child, allow, &mut out);
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, allow: &AllowList, out: &mut String) {
    match node.value() {
        Node::Text(text) => escape_text(text, out),
        Node::Element(element) => write_element(node, element, allow, out),
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
        _ => write_children(node, allow, out),
    }
}

fn write_element(
    node: NodeRef<'_, Node>,
    element: &Element,
    allow: &AllowList,
    out: &mut String,
) {
    let name = element.name();
    if allow.discard_content.contains(name) {
        return;
    }
    if !allow.is_tag_allowed(name) {
        write_children(node, allow, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    for attribute in allow.allowed_attributes(name) {
        let Some(value) = element.attr(attribute) else {
            continue;
        };
        if allow.is_value_allowed(attribute, value) {
            out.push(' ');
            out.push_str(attribute);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }
    if VOID_TAGS.contains(&name) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    if !allow.empty_content.contains(name) {
        let mut inner = String::new();
        write_children(node, allow, &mut inner);
        if LEADING_NEWLINE_TAGS.contains(&name) && inner.starts_with('\n') {
            out.push('\n');
        }
        out.push_str(&inner);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(node: NodeRef<'_, Node>, allow: &AllowList, out: &mut String) {
    for child in node.children() {
        write_node(child, allow, out);
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn url_scheme(value: &str) -> Option<&str> {
    let colon = value.find(':')?;
    let candidate = &value[..colon];
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(candidate)
    } else {
        None
    }
}

fn to_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(html: &str) -> String {
        sanitize(html, &AllowList::article())
    }

    #[test]
    fn script_is_removed_with_content() {
        assert_eq!(clean("<p>hi</p><script>bad</script>"), "<p>hi</p>");
    }

    #[test]
    fn disallowed_tags_are_unwrapped() {
        assert_eq!(
            clean(r#"<p>see <a href="https://x.example">link</a> <span>here</span></p>"#),
            "<p>see link here</p>"
        );
    }

    #[test]
    fn only_image_attributes_survive() {
        assert_eq!(
            clean(r#"<p class="lead" style="color:red">x</p><img src="/a.png" alt="A" onerror="boom()" sizes="10vw">"#),
            r#"<p>x</p><img src="/a.png" alt="A" sizes="10vw" />"#
        );
    }

    #[test]
    fn unsafe_image_schemes_are_dropped() {
        assert_eq!(clean(r#"<img src="javascript:alert(1)" alt="x">"#), r#"<img alt="x" />"#);
        assert_eq!(clean(r#"<img src=" java&#9;script:alert(1)">"#), "<img />");
        assert_eq!(
            clean(r#"<img src="https://cdn.example/a.png">"#),
            r#"<img src="https://cdn.example/a.png" />"#
        );
    }

    #[test]
    fn unbalanced_markup_is_closed() {
        assert_eq!(clean("<p>open <b>bold"), "<p>open <b>bold</b></p>");
        assert_eq!(clean("</div>stray</p>"), "stray<p></p>");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(clean("a &lt; b &amp; c"), "a &lt; b &amp; c");
        assert_eq!(clean("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn iframe_is_kept_empty() {
        assert_eq!(
            clean(r#"<iframe src="https://evil.example">fallback</iframe>"#),
            "<iframe></iframe>"
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(clean("<p>a<!-- secret -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn leading_newlines_in_pre_survive_a_reparse() {
        assert_eq!(clean("<pre>\n\n\n\nx</pre>"), "<pre>\n\n\n\nx</pre>");
        assert_eq!(clean("<pre>\nx</pre>"), "<pre>x</pre>");
        assert_eq!(clean("<pre><span>\n\nx</span></pre>"), "<pre>\n\n\nx</pre>");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "<pre>\n\n\n\n\n\nx</pre>",
            "<pre>\n</pre>",
            "<pre><span>\nx</span></pre>",
            "<p><table><td>x",
            "</div>stray",
            "<b><p>x</b>",
            "<p>open <b>bold",
            "<ul><li>one<li>two</ul><table>loose text<tr><td>cell",
            "<h1><h2>nested</h1></h2>",
            r#"<img src="javascript:x" alt="a"><iframe>inner</iframe>"#,
            "plain text, no markup at all & some < signs > here",
            "",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn scheme_detection() {
        assert_eq!(url_scheme("https://x"), Some("https"));
        assert_eq!(url_scheme("/relative:path"), None);
        assert_eq!(url_scheme("no-scheme"), None);
    }
}
