//! Markdown → platform markup with every style inlined.

pub mod markup;
pub mod theme;

pub use markup::{Element, LocalImage, Markup, Node};
pub use theme::{ElementKind, Theme, ThemeRegistry};

use crate::domain::{article::ThemeId, media::ImageRef};
use markdown::{
    ParseOptions,
    mdast::{self, AlignKind},
};

const LOCAL_IMAGE_PATH: &str = "/images/";
const LINK_SCHEMES: &[&str] = &["http", "https", "mailto"];
const IMAGE_SCHEMES: &[&str] = &["http", "https"];

/// Recognises URLs that point at locally staged images.
#[derive(Debug, Clone)]
pub struct LocalImageLocator {
    public_base: String,
}

impl LocalImageLocator {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL under which a staged image is served.
    pub fn url_for(&self, image: &ImageRef) -> String {
        format!("{}{LOCAL_IMAGE_PATH}{image}", self.public_base)
    }

    pub fn locate(&self, url: &str) -> Option<ImageRef> {
        let path = url
            .strip_prefix(self.public_base.as_str())
            .filter(|rest| rest.starts_with(LOCAL_IMAGE_PATH))
            .unwrap_or(url);
        let name = path.strip_prefix(LOCAL_IMAGE_PATH)?;
        let name = name.split(['?', '#']).next().unwrap_or_default();
        ImageRef::parse(name).ok()
    }
}

/// The content transformer. Rendering is deterministic and has no side
/// effects: the same body and theme always produce byte-identical markup.
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    locator: LocalImageLocator,
}

impl ContentRenderer {
    pub fn new(locator: LocalImageLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &LocalImageLocator {
        &self.locator
    }

    pub fn themes(&self) -> impl Iterator<Item = &'static Theme> {
        ThemeRegistry::builtin().iter()
    }

    pub fn render(&self, markdown: &str, theme: &ThemeId) -> Markup {
        let theme = ThemeRegistry::builtin().resolve(theme);
        let walker = Walker {
            theme,
            locator: &self.locator,
        };
        let mut root = Element::new("section", theme.style(ElementKind::Document));

        match markdown::to_mdast(markdown, &ParseOptions::gfm()) {
            Ok(tree) => {
                let mut nodes = Vec::new();
                walker.node(&tree, &mut nodes);
                root = root.with_children(nodes);
            }
            Err(_) if markdown.trim().is_empty() => {}
            Err(_) => {
                let mut lines = Vec::new();
                push_text_lines(markdown, &mut lines);
                let paragraph =
                    Element::new("p", theme.style(ElementKind::Paragraph)).with_children(lines);
                root.push(Node::Element(paragraph));
            }
        }

        Markup::new(root)
    }

    /// Markup for the preview page: local images keep their local URLs.
    pub fn render_preview(&self, markdown: &str, theme: &ThemeId) -> String {
        self.render(markdown, theme).to_html()
    }
}

struct Walker<'a> {
    theme: &'a Theme,
    locator: &'a LocalImageLocator,
}

impl Walker<'_> {
    fn element(&self, tag: &'static str, kind: ElementKind) -> Element {
        Element::new(tag, self.theme.style(kind))
    }

    fn wrap(&self, tag: &'static str, kind: ElementKind, children: &[mdast::Node]) -> Node {
        let mut nodes = Vec::new();
        self.nodes(children, &mut nodes);
        Node::Element(self.element(tag, kind).with_children(nodes))
    }

    fn nodes(&self, children: &[mdast::Node], out: &mut Vec<Node>) {
        for child in children {
            self.node(child, out);
        }
    }

    fn node(&self, node: &mdast::Node, out: &mut Vec<Node>) {
        match node {
            mdast::Node::Root(root) => self.nodes(&root.children, out),
            mdast::Node::Paragraph(p) => {
                out.push(self.wrap("p", ElementKind::Paragraph, &p.children));
            }
            mdast::Node::Heading(heading) => {
                let level = heading.depth.clamp(1, 6);
                out.push(self.wrap(heading_tag(level), ElementKind::Heading(level), &heading.children));
            }
            mdast::Node::Blockquote(quote) => {
                out.push(self.wrap("blockquote", ElementKind::Blockquote, &quote.children));
            }
            mdast::Node::List(list) => out.push(self.list(list)),
            mdast::Node::ListItem(item) => out.push(self.list_item(item, false)),
            mdast::Node::Code(code) => {
                let mut text = self.element("code", ElementKind::CodeBlockText);
                text.push(Node::Text(code.value.clone()));
                let pre = self
                    .element("pre", ElementKind::CodeBlock)
                    .with_children(vec![Node::Element(text)]);
                out.push(Node::Element(pre));
            }
            mdast::Node::Math(math) => {
                let mut text = self.element("code", ElementKind::CodeBlockText);
                text.push(Node::Text(math.value.clone()));
                let pre = self
                    .element("pre", ElementKind::CodeBlock)
                    .with_children(vec![Node::Element(text)]);
                out.push(Node::Element(pre));
            }
            mdast::Node::InlineCode(code) => out.push(self.inline_code(&code.value)),
            mdast::Node::InlineMath(math) => out.push(self.inline_code(&math.value)),
            mdast::Node::Emphasis(em) => out.push(self.wrap("em", ElementKind::Emphasis, &em.children)),
            mdast::Node::Strong(strong) => {
                out.push(self.wrap("strong", ElementKind::Strong, &strong.children));
            }
            mdast::Node::Delete(del) => {
                out.push(self.wrap("del", ElementKind::Strikethrough, &del.children));
            }
            mdast::Node::Link(link) => {
                let mut children = Vec::new();
                self.nodes(&link.children, &mut children);
                if !is_safe_url(&link.url, LINK_SCHEMES) {
                    out.extend(children);
                    return;
                }
                let mut anchor = self.element("a", ElementKind::Link).attr("href", link.url.clone());
                if let Some(title) = &link.title {
                    anchor = anchor.attr("title", title.clone());
                }
                out.push(Node::Element(anchor.with_children(children)));
            }
            mdast::Node::Image(image) => out.push(self.image(image)),
            mdast::Node::Table(table) => out.push(self.table(table)),
            mdast::Node::ThematicBreak(_) => {
                out.push(Node::Element(self.element("hr", ElementKind::ThematicBreak)));
            }
            mdast::Node::Break(_) => out.push(Node::Element(Element::new("br", ""))),
            mdast::Node::Text(text) => push_text_lines(&text.value, out),
            mdast::Node::LinkReference(reference) => self.nodes(&reference.children, out),
            mdast::Node::ImageReference(reference) => out.push(Node::Text(reference.alt.clone())),
            mdast::Node::FootnoteReference(reference) => {
                let label = reference.label.as_deref().unwrap_or(&reference.identifier);
                out.push(Node::Text(format!("[{label}]")));
            }
            mdast::Node::FootnoteDefinition(definition) => self.nodes(&definition.children, out),
            mdast::Node::Definition(_) | mdast::Node::Yaml(_) | mdast::Node::Toml(_) => {}
            // Raw HTML and anything else the platform cannot take degrade to text.
            other => {
                let mut text = String::new();
                collect_text(other, &mut text);
                if !text.is_empty() {
                    out.push(Node::Text(text));
                }
            }
        }
    }

    fn inline_code(&self, value: &str) -> Node {
        let mut code = self.element("code", ElementKind::InlineCode);
        code.push(Node::Text(value.to_string()));
        Node::Element(code)
    }

    fn list(&self, list: &mdast::List) -> Node {
        let (tag, kind) = if list.ordered {
            ("ol", ElementKind::OrderedList)
        } else {
            ("ul", ElementKind::UnorderedList)
        };
        let mut element = self.element(tag, kind);
        if let Some(start) = list.start.filter(|start| list.ordered && *start != 1) {
            element = element.attr("start", start.to_string());
        }
        for child in &list.children {
            match child {
                mdast::Node::ListItem(item) => element.push(self.list_item(item, !list.spread)),
                other => {
                    let mut nodes = Vec::new();
                    self.node(other, &mut nodes);
                    for node in nodes {
                        element.push(node);
                    }
                }
            }
        }
        Node::Element(element)
    }

    fn list_item(&self, item: &mdast::ListItem, tight: bool) -> Node {
        let mut element = self.element("li", ElementKind::ListItem);
        if let Some(checked) = item.checked {
            element.push(Node::Text(if checked { "☑ " } else { "☐ " }.to_string()));
        }
        for child in &item.children {
            match child {
                mdast::Node::Paragraph(p) if tight && !item.spread => {
                    let mut nodes = Vec::new();
                    self.nodes(&p.children, &mut nodes);
                    for node in nodes {
                        element.push(node);
                    }
                }
                other => {
                    let mut nodes = Vec::new();
                    self.node(other, &mut nodes);
                    for node in nodes {
                        element.push(node);
                    }
                }
            }
        }
        Node::Element(element)
    }

    fn image(&self, image: &mdast::Image) -> Node {
        let style = self.theme.style(ElementKind::Image);
        if let Some(reference) = self.locator.locate(&image.url) {
            return Node::LocalImage(LocalImage {
                image: reference,
                src: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
                style: style.to_string(),
            });
        }
        if !is_safe_url(&image.url, IMAGE_SCHEMES) {
            return Node::Text(image.alt.clone());
        }
        let mut element = Element::new("img", style)
            .attr("src", image.url.clone())
            .attr("alt", image.alt.clone());
        if let Some(title) = &image.title {
            element = element.attr("title", title.clone());
        }
        Node::Element(element)
    }

    fn table(&self, table: &mdast::Table) -> Node {
        let mut element = self.element("table", ElementKind::Table);
        for (row_index, row) in table.children.iter().enumerate() {
            let mdast::Node::TableRow(row) = row else {
                continue;
            };
            let mut tr = self.element("tr", ElementKind::TableRow);
            let (tag, kind) = if row_index == 0 {
                ("th", ElementKind::TableHeaderCell)
            } else {
                ("td", ElementKind::TableCell)
            };
            for (column, cell) in row.children.iter().enumerate() {
                let mdast::Node::TableCell(cell) = cell else {
                    continue;
                };
                let base = self.theme.style(kind);
                let style = match table.align.get(column).and_then(|align| align_value(*align)) {
                    Some(align) => with_text_align(base, align),
                    None => base.to_string(),
                };
                let mut children = Vec::new();
                self.nodes(&cell.children, &mut children);
                tr.push(Node::Element(Element::new(tag, &style).with_children(children)));
            }
            element.push(Node::Element(tr));
        }
        Node::Element(element)
    }
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

fn align_value(align: AlignKind) -> Option<&'static str> {
    match align {
        AlignKind::Left => Some("left"),
        AlignKind::Right => Some("right"),
        AlignKind::Center => Some("center"),
        AlignKind::None => None,
    }
}

/// Replaces any `text-align` declaration in `style` with `align`.
fn with_text_align(style: &str, align: &str) -> String {
    let mut declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| {
            !declaration.is_empty()
                && declaration
                    .split(':')
                    .next()
                    .is_some_and(|property| property.trim() != "text-align")
        })
        .collect();
    let aligned = format!("text-align: {align}");
    declarations.push(&aligned);
    let mut out = declarations.join("; ");
    out.push(';');
    out
}

/// Relative URLs pass; absolute ones only with a listed scheme. Control
/// characters and whitespace are ignored the way browsers ignore them.
fn is_safe_url(url: &str, allowed: &[&str]) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let head = cleaned
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    match head.split_once(':') {
        None => true,
        Some((scheme, _)) => allowed
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed)),
    }
}

/// Soft line breaks become `<br/>`, matching how authors expect chat-written
/// markdown to look.
fn push_text_lines(value: &str, out: &mut Vec<Node>) {
    for (index, line) in value.split('\n').enumerate() {
        if index > 0 {
            out.push(Node::Element(Element::new("br", "")));
        }
        if !line.is_empty() {
            out.push(Node::Text(line.to_string()));
        }
    }
}

fn collect_text(node: &mdast::Node, buffer: &mut String) {
    match node {
        mdast::Node::Text(text) => buffer.push_str(&text.value),
        mdast::Node::Html(html) => buffer.push_str(&html.value),
        mdast::Node::InlineCode(code) => buffer.push_str(&code.value),
        mdast::Node::Code(code) => buffer.push_str(&code.value),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_text(child, buffer);
                }
            }
        }
    }
}
