//! HTML5 parsing and serialization for the rendering surface
//!
//! Parsing goes through scraper (html5ever underneath). Script elements are
//! stripped before the document reaches the surface: every script when the
//! sandbox disallows scripts, otherwise only those loaded from tracker hosts.

use super::dom::ElementId;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

/// Hosts whose scripts are never allowed into the surface
pub const DEFAULT_BLOCKED_HOSTS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "facebook.com",
    "doubleclick.net",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// HTML5 parser with sandbox sanitizing
#[derive(Debug, Clone)]
pub struct HtmlParser {
    allow_scripts: bool,
    blocked_hosts: Vec<String>,
}

impl HtmlParser {
    /// Create a parser that strips all scripts
    pub fn new() -> Self {
        Self {
            allow_scripts: false,
            blocked_hosts: DEFAULT_BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Keep first-party scripts in the document
    pub fn with_scripts(mut self, allow: bool) -> Self {
        self.allow_scripts = allow;
        self
    }

    /// Replace the tracker host list
    pub fn with_blocked_hosts(mut self, hosts: Vec<String>) -> Self {
        self.blocked_hosts = hosts;
        self
    }

    /// Parse content into a sanitized document
    pub fn parse(&self, content: &str) -> Html {
        let mut document = Html::parse_document(content);

        let doomed: Vec<_> = document
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "script" && self.strips(el))
            .map(|el| el.id())
            .collect();

        if !doomed.is_empty() {
            log::debug!("Stripping {} script element(s)", doomed.len());
        }
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        document
    }

    fn strips(&self, script: &ElementRef<'_>) -> bool {
        if !self.allow_scripts {
            return true;
        }
        match script.value().attr("src") {
            Some(src) => self.blocked_hosts.iter().any(|host| src.contains(host.as_str())),
            None => false,
        }
    }

    /// Whether inline event handler attributes survive serialization
    pub fn allows_scripts(&self) -> bool {
        self.allow_scripts
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Presentation attributes layered onto an element at serialization time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoration {
    pub style: String,
    pub title: String,
}

/// Serialize a document, merging per-element decorations
///
/// `decorate` is consulted for every element; a returned decoration's style
/// is appended to the element's own `style` and its title replaces `title`.
pub fn serialize<F>(document: &Html, allow_scripts: bool, decorate: F) -> String
where
    F: Fn(ElementId) -> Option<Decoration>,
{
    let mut out = String::new();
    write_node(document.tree.root(), &mut out, allow_scripts, &decorate, false);
    out
}

fn write_node<F>(
    node: NodeRef<'_, Node>,
    out: &mut String,
    allow_scripts: bool,
    decorate: &F,
    raw: bool,
) where
    F: Fn(ElementId) -> Option<Decoration>,
{
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(child, out, allow_scripts, decorate, false);
            }
        }
        Node::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.name());
            out.push('>');
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, out, false);
            }
        }
        Node::Element(element) => {
            let name = element.name();
            let decoration = ElementRef::wrap(node).and_then(|el| decorate(ElementId::of(&el)));

            out.push('<');
            out.push_str(name);
            let mut style_written = false;
            let mut title_written = false;
            for (attr, value) in element.attrs() {
                if !allow_scripts && attr.starts_with("on") {
                    continue;
                }
                let value = match (&decoration, attr) {
                    (Some(d), "style") if !d.style.is_empty() => {
                        style_written = true;
                        merge_style(value, &d.style)
                    }
                    (Some(d), "title") if !d.title.is_empty() => {
                        title_written = true;
                        d.title.clone()
                    }
                    _ => value.to_string(),
                };
                write_attr(out, attr, &value);
            }
            if let Some(d) = &decoration {
                if !style_written && !d.style.is_empty() {
                    write_attr(out, "style", &d.style);
                }
                if !title_written && !d.title.is_empty() {
                    write_attr(out, "title", &d.title);
                }
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            let raw_children = RAW_TEXT_ELEMENTS.contains(&name);
            for child in node.children() {
                write_node(child, out, allow_scripts, decorate, raw_children);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::ProcessingInstruction(_) => {}
    }
}

fn merge_style(own: &str, overlay: &str) -> String {
    let own = own.trim().trim_end_matches(';');
    if own.is_empty() {
        overlay.to_string()
    } else {
        format!("{own}; {overlay}")
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, out, true);
    out.push('"');
}

fn escape_into(text: &str, out: &mut String, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Fallback document shown in place of a page that could not be fetched
pub fn failed_notice(message: &str) -> String {
    let mut escaped = String::new();
    escape_into(message, &mut escaped, false);
    format!(
        "<!DOCTYPE html><html><body><div class=\"seltag-failed\">페이지를 불러오지 못했습니다: {escaped}</div></body></html>"
    )
}
