//! Built-in themes: flat element → inline style tables.
//!
//! The platform strips `<style>` blocks and stylesheet links, so a theme is
//! nothing more than the complete declaration each element kind carries.

use crate::domain::article::ThemeId;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Document,
    Paragraph,
    Heading(u8),
    Blockquote,
    UnorderedList,
    OrderedList,
    ListItem,
    CodeBlock,
    CodeBlockText,
    InlineCode,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    Table,
    TableRow,
    TableHeaderCell,
    TableCell,
    ThematicBreak,
}

#[derive(Debug, Clone)]
pub struct Theme {
    name: &'static str,
    label: &'static str,
    rules: HashMap<ElementKind, String>,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Declaration for `kind`, empty when the theme leaves it unstyled.
    pub fn style(&self, kind: ElementKind) -> &str {
        self.rules.get(&kind).map_or("", String::as_str)
    }
}

pub struct ThemeRegistry {
    themes: BTreeMap<&'static str, Theme>,
}

static BUILTIN: Lazy<ThemeRegistry> = Lazy::new(|| ThemeRegistry {
    themes: PALETTES
        .iter()
        .map(|palette| (palette.name, palette.build()))
        .collect(),
});

impl ThemeRegistry {
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Theme for `id`, or the baseline theme when `id` is unknown.
    pub fn resolve(&self, id: &ThemeId) -> &Theme {
        self.get(id.as_str())
            .or_else(|| self.get(ThemeId::DEFAULT))
            .unwrap_or_else(|| unreachable!("baseline theme is always registered"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.values()
    }
}

struct Palette {
    name: &'static str,
    label: &'static str,
    font: Option<&'static str>,
    text: &'static str,
    heading: &'static str,
    accent: Option<&'static str>,
    muted: &'static str,
    quote_border: &'static str,
    code_bg: &'static str,
    border: &'static str,
    link: &'static str,
}

const PALETTES: [Palette; 5] = [
    Palette {
        name: "default",
        label: "Default",
        font: None,
        text: "#333",
        heading: "#333",
        accent: None,
        muted: "#666",
        quote_border: "#ddd",
        code_bg: "#f5f5f5",
        border: "#ddd",
        link: "#576b95",
    },
    Palette {
        name: "classic",
        label: "Classic",
        font: Some("Georgia, 'Times New Roman', serif"),
        text: "#2b2b2b",
        heading: "#1a1a1a",
        accent: Some("#8b5a2b"),
        muted: "#5c5c5c",
        quote_border: "#c8b79e",
        code_bg: "#f7f3ec",
        border: "#d9cfc1",
        link: "#8b5a2b",
    },
    Palette {
        name: "purple",
        label: "Purple",
        font: None,
        text: "#3a3a3a",
        heading: "#4b3a6b",
        accent: Some("#8064a9"),
        muted: "#6b5d80",
        quote_border: "#8064a9",
        code_bg: "#f4f0fa",
        border: "#d6cce6",
        link: "#8064a9",
    },
    Palette {
        name: "lapis",
        label: "Lapis",
        font: None,
        text: "#40464f",
        heading: "#1f3b73",
        accent: Some("#3f6ec7"),
        muted: "#5e6b80",
        quote_border: "#3f6ec7",
        code_bg: "#eef3fb",
        border: "#c9d6ee",
        link: "#3f6ec7",
    },
    Palette {
        name: "orangeheart",
        label: "Orange Heart",
        font: None,
        text: "#3e3e3e",
        heading: "#3e3e3e",
        accent: Some("#ef7060"),
        muted: "#7a6a66",
        quote_border: "#ef7060",
        code_bg: "#fdf3f1",
        border: "#f3c9c2",
        link: "#ef7060",
    },
];

impl Palette {
    fn build(&self) -> Theme {
        let font = self
            .font
            .map(|family| format!(" font-family: {family};"))
            .unwrap_or_default();
        let mut rules = HashMap::new();

        rules.insert(
            ElementKind::Document,
            format!("font-size: 16px; color: {}; line-height: 1.8; word-wrap: break-word;{font}", self.text),
        );
        rules.insert(
            ElementKind::Paragraph,
            format!("margin: 1em 0; line-height: 1.8; color: {};", self.text),
        );

        let sizes = ["1.5em", "1.3em", "1.1em", "1em", "0.95em", "0.9em"];
        let margins = ["1.5em 0 0.5em", "1.2em 0 0.5em", "1em 0 0.5em", "1em 0 0.5em", "1em 0 0.5em", "1em 0 0.5em"];
        for (index, (size, margin)) in sizes.iter().zip(margins).enumerate() {
            let level = u8::try_from(index + 1).unwrap_or(6);
            let mut style = format!(
                "font-size: {size}; font-weight: bold; margin: {margin}; color: {};",
                self.heading
            );
            if let (Some(accent), 2) = (self.accent, level) {
                style.push_str(&format!(" border-bottom: 2px solid {accent}; padding-bottom: 0.3em;"));
            }
            rules.insert(ElementKind::Heading(level), style);
        }

        rules.insert(
            ElementKind::Blockquote,
            format!(
                "border-left: 4px solid {}; padding-left: 1em; margin: 1em 0; color: {};",
                self.quote_border, self.muted
            ),
        );
        let list = "margin: 1em 0; padding-left: 2em;".to_string();
        rules.insert(ElementKind::UnorderedList, format!("{list} list-style-type: disc;"));
        rules.insert(ElementKind::OrderedList, format!("{list} list-style-type: decimal;"));
        rules.insert(
            ElementKind::ListItem,
            format!("margin: 0.5em 0; line-height: 1.6; color: {};", self.text),
        );
        rules.insert(
            ElementKind::CodeBlock,
            format!(
                "background: {}; padding: 1em; border-radius: 4px; overflow-x: auto; font-size: 0.9em; line-height: 1.5; white-space: pre;",
                self.code_bg
            ),
        );
        rules.insert(
            ElementKind::CodeBlockText,
            "font-family: Menlo, Consolas, monospace; background: none; padding: 0;".to_string(),
        );
        rules.insert(
            ElementKind::InlineCode,
            format!(
                "background: {}; padding: 0.2em 0.4em; border-radius: 3px; font-family: monospace;",
                self.code_bg
            ),
        );
        rules.insert(ElementKind::Emphasis, "font-style: italic;".to_string());
        let strong = match self.accent {
            Some(accent) => format!("font-weight: bold; color: {accent};"),
            None => "font-weight: bold;".to_string(),
        };
        rules.insert(ElementKind::Strong, strong);
        rules.insert(ElementKind::Strikethrough, "text-decoration: line-through;".to_string());
        rules.insert(
            ElementKind::Link,
            format!("color: {}; text-decoration: none;", self.link),
        );
        rules.insert(
            ElementKind::Image,
            "max-width: 100%; height: auto; display: block; margin: 1em auto;".to_string(),
        );
        rules.insert(
            ElementKind::Table,
            "width: 100%; border-collapse: collapse; margin: 1em 0;".to_string(),
        );
        rules.insert(ElementKind::TableRow, String::new());
        rules.insert(
            ElementKind::TableHeaderCell,
            format!(
                "border: 1px solid {}; padding: 8px; background: {}; text-align: left;",
                self.border, self.code_bg
            ),
        );
        rules.insert(
            ElementKind::TableCell,
            format!("border: 1px solid {}; padding: 8px;", self.border),
        );
        rules.insert(
            ElementKind::ThematicBreak,
            format!("border: none; border-top: 1px solid {}; margin: 2em 0;", self.border),
        );

        Theme {
            name: self.name,
            label: self.label,
            rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let registry = ThemeRegistry::builtin();
        let theme = registry.resolve(&ThemeId::new("does-not-exist"));
        assert_eq!(theme.name(), "default");
    }

    #[test]
    fn every_theme_styles_every_visible_element() {
        let kinds = [
            ElementKind::Document,
            ElementKind::Paragraph,
            ElementKind::Heading(1),
            ElementKind::Heading(6),
            ElementKind::Blockquote,
            ElementKind::ListItem,
            ElementKind::CodeBlock,
            ElementKind::InlineCode,
            ElementKind::Link,
            ElementKind::Image,
            ElementKind::TableCell,
        ];
        for theme in ThemeRegistry::builtin().iter() {
            for kind in kinds {
                assert!(!theme.style(kind).is_empty(), "{} leaves {kind:?} bare", theme.name());
            }
        }
    }

    #[test]
    fn default_theme_keeps_the_baseline_paragraph_style() {
        let theme = ThemeRegistry::builtin().resolve(&ThemeId::default());
        assert_eq!(
            theme.style(ElementKind::Paragraph),
            "margin: 1em 0; line-height: 1.8; color: #333;"
        );
    }
}
