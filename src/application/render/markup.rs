//! Structured output of the content transformer.
//!
//! Local images stay distinct [`Node::LocalImage`] nodes until the publish
//! pipeline resolves them, so nothing downstream has to search the HTML text.

use crate::domain::media::ImageRef;
use std::fmt::Write as _;

const VOID_TAGS: [&str; 3] = ["br", "hr", "img"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    LocalImage(LocalImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str, style: &str) -> Self {
        let mut element = Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        };
        if !style.is_empty() {
            element.attrs.push(("style", style.to_string()));
        }
        element
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// An image whose bytes are staged locally and still have to be migrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub image: ImageRef,
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
    pub style: String,
}

impl LocalImage {
    fn to_element(&self, src: String) -> Element {
        let mut element = Element::new("img", &self.style)
            .attr("src", src)
            .attr("alt", self.alt.clone());
        if let Some(title) = &self.title {
            element = element.attr("title", title.clone());
        }
        element
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    root: Element,
}

impl Markup {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Distinct local images in document order.
    pub fn local_images(&self) -> Vec<ImageRef> {
        let mut found = Vec::new();
        visit(&self.root.children, &mut |node| {
            if let Node::LocalImage(local) = node {
                if !found.contains(&local.image) {
                    found.push(local.image.clone());
                }
            }
        });
        found
    }

    /// `src` of every image that is neither local nor already resolved.
    pub fn external_images(&self) -> Vec<String> {
        let mut found = Vec::new();
        visit(&self.root.children, &mut |node| {
            if let Node::Element(element) = node {
                if element.tag == "img" {
                    if let Some(src) = element.attribute("src") {
                        found.push(src.to_string());
                    }
                }
            }
        });
        found
    }

    pub fn has_unresolved_images(&self) -> bool {
        !self.local_images().is_empty()
    }

    /// Replaces every local image with a plain `<img>` pointing at the URL
    /// returned by `lookup`. Stops at the first image `lookup` cannot
    /// resolve and returns it; the markup is left untouched in that case.
    pub fn resolve_images<F>(&mut self, mut lookup: F) -> Result<(), ImageRef>
    where
        F: FnMut(&ImageRef) -> Option<String>,
    {
        let mut resolved = Vec::new();
        for image in self.local_images() {
            match lookup(&image) {
                Some(url) => resolved.push((image, url)),
                None => return Err(image),
            }
        }
        replace_local(&mut self.root.children, &resolved);
        Ok(())
    }

    /// Serialises the tree. Unresolved local images keep their local URL,
    /// which is what the preview page wants.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(&self.root, &mut out);
        out
    }
}

fn visit<'a, F>(nodes: &'a [Node], f: &mut F)
where
    F: FnMut(&'a Node),
{
    for node in nodes {
        f(node);
        if let Node::Element(element) = node {
            visit(&element.children, f);
        }
    }
}

fn replace_local(nodes: &mut [Node], resolved: &[(ImageRef, String)]) {
    for node in nodes.iter_mut() {
        match node {
            Node::LocalImage(local) => {
                if let Some((_, url)) = resolved.iter().find(|(image, _)| *image == local.image) {
                    *node = Node::Element(local.to_element(url.clone()));
                }
            }
            Node::Element(element) => replace_local(&mut element.children, resolved),
            Node::Text(_) => {}
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(element.tag);
    for (name, value) in &element.attrs {
        let _ = write!(
            out,
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        );
    }
    if VOID_TAGS.contains(&element.tag) {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", element.tag);
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::LocalImage(local) => write_element(&local.to_element(local.src.clone()), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> Node {
        Node::LocalImage(LocalImage {
            image: ImageRef::parse(name).unwrap(),
            src: format!("/images/{name}"),
            alt: "alt".into(),
            title: None,
            style: "max-width: 100%;".into(),
        })
    }

    fn sample() -> Markup {
        let paragraph = Element::new("p", "").with_children(vec![
            local("aa.png"),
            Node::Text("a < b".into()),
            local("bb.jpg"),
            local("aa.png"),
        ]);
        Markup::new(Element::new("section", "").with_children(vec![Node::Element(paragraph)]))
    }

    #[test]
    fn local_images_are_distinct_and_ordered() {
        let images: Vec<String> = sample()
            .local_images()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(images, vec!["aa.png", "bb.jpg"]);
    }

    #[test]
    fn resolve_rewrites_every_occurrence() {
        let mut markup = sample();
        markup
            .resolve_images(|image| Some(format!("https://mmbiz.qpic.cn/{image}")))
            .unwrap();
        assert!(!markup.has_unresolved_images());
        let html = markup.to_html();
        assert_eq!(html.matches("https://mmbiz.qpic.cn/aa.png").count(), 2);
        assert!(!html.contains("/images/"));
    }

    #[test]
    fn resolve_reports_the_missing_image_and_changes_nothing() {
        let mut markup = sample();
        let before = markup.clone();
        let missing = markup
            .resolve_images(|image| (image.as_str() == "aa.png").then(|| "x".to_string()))
            .unwrap_err();
        assert_eq!(missing.as_str(), "bb.jpg");
        assert_eq!(markup, before);
    }

    #[test]
    fn serialisation_escapes_text_and_attributes() {
        let element = Element::new("a", "color: red;")
            .attr("href", "https://example.com/?a=\"1\"")
            .with_children(vec![Node::Text("<b>&".into())]);
        let html = Markup::new(element).to_html();
        assert_eq!(
            html,
            "<a style=\"color: red;\" href=\"https://example.com/?a=&quot;1&quot;\">&lt;b&gt;&amp;</a>"
        );
    }
}
