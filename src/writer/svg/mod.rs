//! SVG document model and serialization
//!
//! An export produces one [`SvgDocument`]: a square root element holding one
//! [`LayerGroup`] per exported style layer, in style order. Groups hold
//! [`VectorElement`]s, the drawing primitives a layer translates to.
//!
//! # Submodules
//!
//! - `spec` - declarative style-property to attribute tables per layer type
//! - `translate` - the export pipeline ([`MapExporter`])
//! - `diagnostics` - non-fatal problems reported during an export

pub mod diagnostics;
pub mod spec;
pub mod translate;

pub use diagnostics::{Diagnostic, ExportReport, SkipReason};
pub use spec::{AttributeRule, AttributeTransform, LayerStyleSpec};
pub use translate::{LayerPlan, MapExporter};

use std::fmt::Write;

use crate::config::ExportConfig;

/// SVG namespace stamped on the root element
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// SVG version stamped on the root element
pub const SVG_VERSION: &str = "1.1";

/// Class carried by every label text element
pub const LABEL_CLASS: &str = "place-label";

/// Escape text for XML/SVG.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Ordered presentation attributes. Setting a name twice keeps the first
/// position and the last value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn write_to(&self, out: &mut String) {
        for (name, value) in self.iter() {
            let _ = write!(out, r#" {}="{}""#, name, escape_xml(value));
        }
    }
}

/// One output drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorElement {
    /// A filled or stroked path.
    Path {
        id: String,
        d: String,
        attributes: Attributes,
    },
    /// A label positioned with a `translate(x,y)` transform.
    Text {
        id: String,
        transform: String,
        content: String,
        attributes: Attributes,
    },
    /// A Gaussian blur filter referenced by halo text.
    Filter { id: String, std_deviation: String },
}

impl VectorElement {
    pub fn id(&self) -> &str {
        match self {
            VectorElement::Path { id, .. }
            | VectorElement::Text { id, .. }
            | VectorElement::Filter { id, .. } => id,
        }
    }

    /// Element tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            VectorElement::Path { .. } => "path",
            VectorElement::Text { .. } => "text",
            VectorElement::Filter { .. } => "filter",
        }
    }

    /// Presentation attribute by name; `None` for filters.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            VectorElement::Path { attributes, .. } | VectorElement::Text { attributes, .. } => {
                attributes.get(name)
            }
            VectorElement::Filter { .. } => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            VectorElement::Path { id, d, attributes } => {
                let _ = write!(out, r#"<path id="{}" d="{}""#, escape_xml(id), d);
                attributes.write_to(out);
                out.push_str("/>");
            }
            VectorElement::Text {
                id,
                transform,
                content,
                attributes,
            } => {
                let _ = write!(
                    out,
                    r#"<text id="{}" class="{}" transform="{}""#,
                    escape_xml(id),
                    LABEL_CLASS,
                    transform
                );
                attributes.write_to(out);
                let _ = write!(out, ">{}</text>", escape_xml(content));
            }
            VectorElement::Filter { id, std_deviation } => {
                let _ = write!(
                    out,
                    r#"<filter id="{}"><feGaussianBlur in="SourceGraphic" stdDeviation="{}"/></filter>"#,
                    escape_xml(id),
                    escape_xml(std_deviation)
                );
            }
        }
    }
}

/// The `<g>` holding one style layer's elements.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    pub id: String,
    pub elements: Vec<VectorElement>,
}

impl LayerGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
        }
    }
}

/// A complete, standalone SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub size: u32,
    pub title: String,
    pub xml_declaration: bool,
    pub groups: Vec<LayerGroup>,
}

impl SvgDocument {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            size: config.size,
            title: config.title.clone(),
            xml_declaration: config.xml_declaration,
            groups: Vec::new(),
        }
    }

    pub fn group(&self, layer_id: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|group| group.id == layer_id)
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &VectorElement> {
        self.groups.iter().flat_map(|group| group.elements.iter())
    }

    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|group| group.elements.len()).sum()
    }

    /// Serialize to SVG text.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::with_capacity(256 + 128 * self.element_count());
        if self.xml_declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        let _ = writeln!(
            out,
            r#"<svg xmlns="{ns}" version="{version}" title="{title}" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
            ns = SVG_NAMESPACE,
            version = SVG_VERSION,
            title = escape_xml(&self.title),
            size = self.size,
        );
        for group in &self.groups {
            let _ = writeln!(out, r#"  <g id="{}">"#, escape_xml(&group.id));
            for element in &group.elements {
                out.push_str("    ");
                element.write_to(&mut out);
                out.push('\n');
            }
            out.push_str("  </g>\n");
        }
        out.push_str("</svg>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(id: &str) -> VectorElement {
        let mut attributes = Attributes::new();
        attributes.set("fill", "#ff0000");
        attributes.set("stroke", "none");
        VectorElement::Path {
            id: id.to_string(),
            d: "M0,0L10,0L10,10Z".to_string(),
            attributes,
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<Tom & "Jerry's">"#),
            "&lt;Tom &amp; &quot;Jerry&apos;s&quot;&gt;"
        );
    }

    #[test]
    fn test_attributes_replace_in_place() {
        let mut attributes = Attributes::new();
        attributes.set("fill", "#000000");
        attributes.set("opacity", "1");
        attributes.set("fill", "#ffffff");
        let pairs: Vec<_> = attributes.iter().collect();
        assert_eq!(pairs, vec![("fill", "#ffffff"), ("opacity", "1")]);
    }

    #[test]
    fn test_document_serialization() {
        let mut document = SvgDocument::new(&ExportConfig::default().with_size(256));
        let mut group = LayerGroup::new("water");
        group.elements.push(path("w1"));
        document.groups.push(group);

        let svg = document.to_svg_string();
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg "));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"version="1.1""#));
        assert!(svg.contains(r#"title="svg_title""#));
        assert!(svg.contains(r#"viewBox="0 0 256 256""#));
        assert!(svg.contains(
            r##"<g id="water">
    <path id="w1" d="M0,0L10,0L10,10Z" fill="#ff0000" stroke="none"/>
  </g>"##
        ));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(document.element_count(), 1);
    }

    #[test]
    fn test_text_and_filter_serialization() {
        let mut attributes = Attributes::new();
        attributes.set("font-size", "12");
        let text = VectorElement::Text {
            id: "7-text".to_string(),
            transform: "translate(10,20)".to_string(),
            content: "Fish & Chips".to_string(),
            attributes,
        };
        let mut out = String::new();
        text.write_to(&mut out);
        assert_eq!(
            out,
            r#"<text id="7-text" class="place-label" transform="translate(10,20)" font-size="12">Fish &amp; Chips</text>"#
        );

        let filter = VectorElement::Filter {
            id: "7-blur".to_string(),
            std_deviation: "5".to_string(),
        };
        let mut out = String::new();
        filter.write_to(&mut out);
        assert_eq!(
            out,
            r#"<filter id="7-blur"><feGaussianBlur in="SourceGraphic" stdDeviation="5"/></filter>"#
        );
        assert_eq!(filter.attribute("stdDeviation"), None);
        assert_eq!(text.tag(), "text");
    }

    #[test]
    fn test_without_declaration() {
        let document = SvgDocument::new(&ExportConfig::default().without_xml_declaration());
        assert!(document.to_svg_string().starts_with("<svg "));
    }
}
