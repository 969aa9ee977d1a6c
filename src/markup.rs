//! Rendered SVG markup and the root-element edits the pipeline performs on it.
//!
//! The pipeline never rewrites the drawing itself. It only touches
//! attributes of the root `<svg>` element: display normalization after a
//! successful render, and explicit `width`/`height` stamping on the copy that
//! gets exported. Every edit returns a new [`RenderedMarkup`]; the original
//! value is left as it was.

use regex::Regex;
use std::sync::LazyLock;

/// Matches the opening tag of the first `<svg>` element, allowing `>` inside
/// quoted attribute values.
static ROOT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<svg\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("root tag pattern is valid")
});

/// Style properties forced onto every successfully rendered diagram.
const DISPLAY_STYLE: [(&str, &str); 3] = [
    ("max-width", "100%"),
    ("height", "auto"),
    ("background-color", "transparent"),
];

/// Drawable size of a diagram in logical (SVG user) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalSize {
    pub width: f32,
    pub height: f32,
}

impl LogicalSize {
    /// Returns `None` unless both edges are finite and strictly positive.
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }
}

/// SVG text produced by the render engine for one diagram description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkup(String);

impl RenderedMarkup {
    pub fn new(svg: impl Into<String>) -> Self {
        Self(svg.into())
    }

    /// The serialized wire form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Text of the root `<svg ...>` opening tag, if the markup has one.
    pub fn root_tag(&self) -> Option<&str> {
        ROOT_TAG.find(&self.0).map(|m| m.as_str())
    }

    /// Value of an attribute on the root element, entity-decoded for the
    /// handful of entities this module itself writes.
    pub fn root_attribute(&self, name: &str) -> Option<String> {
        let tag = self.root_tag()?;
        let caps = attribute_pattern(name).captures(tag)?;
        let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
        Some(unescape_attribute(raw))
    }

    /// Copy of this markup with `name="value"` set on the root element,
    /// replacing any existing value. Markup without a root `<svg>` element is
    /// returned unchanged.
    pub fn with_root_attribute(&self, name: &str, value: &str) -> Self {
        let Some(tag_match) = ROOT_TAG.find(&self.0) else {
            return self.clone();
        };
        let tag = tag_match.as_str();
        let escaped = escape_attribute(value);

        let new_tag = match attribute_pattern(name).captures(tag) {
            Some(caps) => {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                format!(
                    "{} {}=\"{}\"{}",
                    &tag[..whole.start],
                    name,
                    escaped,
                    &tag[whole.end..]
                )
            }
            None => {
                let body_end = if tag.ends_with("/>") {
                    tag.len() - 2
                } else {
                    tag.len() - 1
                };
                format!(
                    "{} {}=\"{}\"{}",
                    tag[..body_end].trim_end(),
                    name,
                    escaped,
                    &tag[body_end..]
                )
            }
        };

        let range = tag_match.range();
        let mut out = String::with_capacity(self.0.len() + name.len() + value.len() + 4);
        out.push_str(&self.0[..range.start]);
        out.push_str(&new_tag);
        out.push_str(&self.0[range.end..]);
        Self(out)
    }

    /// Width and height of the root `viewBox`, when one is declared and usable.
    pub fn view_box_size(&self) -> Option<LogicalSize> {
        let view_box = self.root_attribute("viewBox")?;
        let parts: Vec<f32> = view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [_, _, width, height] => LogicalSize::new(*width, *height),
            _ => None,
        }
    }

    /// Copy with explicit `width`/`height` attributes equal to `size`.
    pub fn with_dimensions(&self, size: LogicalSize) -> Self {
        self.with_root_attribute("width", &format_length(size.width))
            .with_root_attribute("height", &format_length(size.height))
    }

    /// Copy constrained to its container: width capped at 100%, automatic
    /// height and a transparent background. Existing root style declarations
    /// for other properties are preserved.
    pub fn normalized_for_display(&self) -> Self {
        let existing = self.root_attribute("style").unwrap_or_default();
        let mut declarations: Vec<String> = existing
            .split(';')
            .map(str::trim)
            .filter(|decl| !decl.is_empty())
            .filter(|decl| {
                let property = decl.split(':').next().unwrap_or_default().trim();
                !property.eq_ignore_ascii_case("background")
                    && !DISPLAY_STYLE
                        .iter()
                        .any(|(forced, _)| property.eq_ignore_ascii_case(forced))
            })
            .map(str::to_owned)
            .collect();
        declarations.extend(
            DISPLAY_STYLE
                .iter()
                .map(|(property, value)| format!("{property}: {value}")),
        );
        self.with_root_attribute("style", &format!("{};", declarations.join("; ")))
    }
}

impl From<String> for RenderedMarkup {
    fn from(svg: String) -> Self {
        Self(svg)
    }
}

fn attribute_pattern(name: &str) -> Regex {
    // Leading whitespace keeps `width` from matching `stroke-width`.
    Regex::new(&format!(
        r#"\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(name)
    ))
    .expect("escaped attribute pattern is valid")
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Whole numbers print without a fractional part.
fn format_length(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
