use crate::board::{BoardNode, NodeKind};
use crate::cell::Cell;
use crate::color::{darken, normalize_color};
use crate::style::Style;

use super::node_bounds;

const DEFAULT_COLOR: &str = "#f0f0f0";
const DEFAULT_WIDTH: f64 = 180.0;
const DEFAULT_HEIGHT: f64 = 80.0;
const MARKDOWN_FONT_SIZE: f64 = 14.0;

const NOTE_FILL: &str = "#ffffcc";
const NOTE_STROKE: &str = "#cccc00";

/// Markdown blocks, callouts, notes and any unrecognized node type.
pub fn build_shape(node: &BoardNode, cell_id: String, parent: &str, show_descriptions: bool) -> Cell {
    let color = normalize_color(node.data.color.as_deref().unwrap_or(DEFAULT_COLOR));
    let mut label = node.label().unwrap_or_default().to_string();

    if show_descriptions {
        if let Some(content) = node.data.content.as_deref().filter(|c| !c.is_empty()) {
            label.push_str("\n\n");
            label.push_str(content);
        }
    }

    let mut style = Style::new()
        .with("rounded", 1)
        .with("whiteSpace", "wrap")
        .with("html", 1)
        .with("fillColor", color.as_str())
        .with("strokeColor", darken(&color, 20.0))
        .with("fontSize", 12);

    match node.kind {
        NodeKind::Markdown => {
            let font_size = node
                .style
                .as_ref()
                .and_then(|s| s.font_size.as_ref())
                .and_then(|f| f.as_f64())
                .filter(|f| *f > 0.0)
                .unwrap_or(MARKDOWN_FONT_SIZE);
            style
                .set("text", 1)
                .set("align", "center")
                .set("verticalAlign", "middle")
                .set("fontSize", font_size.trunc())
                .set("fontStyle", 1);
        }
        NodeKind::Callout => {
            style
                .set("shape", "note")
                .set("fontSize", 11)
                .set("align", "left")
                .set("verticalAlign", "top");
            if let (Some(method), Some(url)) = (node.data.method.as_deref(), node.data.url.as_deref()) {
                label = format!("{} {}\n\n{}", method, url, label);
            }
        }
        NodeKind::Annotation | NodeKind::Note => {
            style
                .set("shape", "note")
                .set("fontSize", 12)
                .set("align", "left")
                .set("verticalAlign", "top")
                .set("fillColor", NOTE_FILL)
                .set("strokeColor", NOTE_STROKE);
        }
        _ => {}
    }

    Cell::vertex(cell_id, parent, node_bounds(node, DEFAULT_WIDTH, DEFAULT_HEIGHT))
        .with_value(label)
        .with_style(style)
}
