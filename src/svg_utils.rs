//! SVG helpers shared by the engine and the exporter: font database,
//! font-family sanitization, and `usvg` parsing.

use std::sync::{Arc, LazyLock};

use resvg::usvg;

use crate::markup::{LogicalSize, RenderedMarkup};

/// Lazily-loaded system font database for SVG text rendering.
///
/// Loading system fonts is expensive (~50ms), so it happens once and the
/// database is shared by every parse.
pub(crate) static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    crate::debug_info!("SVG", "Loaded {} font faces from system", db.len());
    Arc::new(db)
});

/// Parse SVG bytes into a render tree using the shared font database.
pub(crate) fn parse_tree(data: &[u8]) -> Result<usvg::Tree, usvg::Error> {
    let opts = usvg::Options {
        fontdb: FONTDB.clone(),
        ..Default::default()
    };
    usvg::Tree::from_data(data, &opts)
}

/// Size of the diagram as it would be laid out on screen, used when the
/// markup declares no usable `viewBox`.
pub(crate) fn rendered_size(markup: &RenderedMarkup) -> Option<LogicalSize> {
    match parse_tree(markup.as_str().as_bytes()) {
        Ok(tree) => {
            let size = tree.size();
            LogicalSize::new(size.width(), size.height())
        }
        Err(e) => {
            crate::debug_log!("SVG", "Bounding-box measurement failed: {e}");
            None
        }
    }
}

/// Fix malformed SVG font-family attributes that contain unescaped inner quotes.
///
/// Mermaid themes emit values like
///   `font-family="Inter, "Segoe UI", sans-serif"`
/// which is invalid XML. Inner `"` within the attribute value become `'`.
pub(crate) fn sanitize_svg_font_family(svg: &str) -> String {
    const ATTR_START: &str = "font-family=\"";

    let mut result = String::with_capacity(svg.len());
    let mut rest = svg;

    while let Some(pos) = rest.find(ATTR_START) {
        let value_start = pos + ATTR_START.len();
        result.push_str(&rest[..value_start]);
        rest = &rest[value_start..];

        let mut chars = rest.char_indices().peekable();
        let mut consumed = rest.len();
        while let Some((i, c)) = chars.next() {
            if c != '"' {
                result.push(c);
                continue;
            }
            // A quote followed by whitespace, `/`, `>` or end of input closes the value.
            match chars.peek() {
                Some(&(_, next)) if next != ' ' && next != '/' && next != '>' => {
                    result.push('\'');
                }
                _ => {
                    result.push('"');
                    consumed = i + 1;
                    break;
                }
            }
        }
        rest = &rest[consumed..];
    }
    result.push_str(rest);
    result
}
