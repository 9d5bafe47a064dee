use crate::board::BoardNode;
use crate::cell::Cell;
use crate::color::{darken, normalize_color};
use crate::style::Style;

use super::node_bounds;

const DEFAULT_COLOR: &str = "#e0e0e0";
const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 400.0;

/// A group zone becomes one rounded, non-swimlane rectangle.
pub fn build_group(node: &BoardNode, cell_id: String, parent: &str, show_descriptions: bool) -> Cell {
    let color = normalize_color(node.data.color.as_deref().unwrap_or(DEFAULT_COLOR));

    let mut label = node.label().unwrap_or("Group").to_string();
    if show_descriptions {
        if let Some(content) = node.data.content.as_deref().filter(|c| !c.is_empty()) {
            label.push('\n');
            label.push_str(content);
        }
    }

    let style = Style::new()
        .with("swimlane", 0)
        .with("fillColor", color.as_str())
        .with("strokeColor", darken(&color, 20.0))
        .with("strokeWidth", 2)
        .with("rounded", 1)
        .with("fontSize", 14)
        .with("fontStyle", 1)
        .with("align", "left")
        .with("verticalAlign", "top")
        .with("spacingLeft", 10)
        .with("spacingTop", 10);

    Cell::vertex(cell_id, parent, node_bounds(node, DEFAULT_WIDTH, DEFAULT_HEIGHT))
        .with_value(label)
        .with_style(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Bounds;
    use serde_json::json;

    fn group(data: serde_json::Value) -> BoardNode {
        serde_json::from_value(json!({
            "id": "g1", "type": "groupZone", "position": { "x": 40.4, "y": 59.6 }, "data": data
        }))
        .unwrap()
    }

    #[test]
    fn test_default_size() {
        let cell = build_group(&group(json!({ "label": "Sales" })), "group_Sales".into(), "1", false);
        assert_eq!(cell.geometry().unwrap().bounds, Bounds::new(40.0, 60.0, 800.0, 400.0));
        assert_eq!(cell.value.as_deref(), Some("Sales"));
        assert_eq!(cell.parent.as_deref(), Some("1"));
    }

    #[test]
    fn test_style_from_rgba() {
        let cell = build_group(
            &group(json!({ "label": "Zone", "color": "rgba(107,99,123,0.4)" })),
            "g".into(),
            "1",
            false,
        );
        let style = cell.style.unwrap().compose();
        assert!(style.starts_with("swimlane=0;fillColor=#6b637b;strokeColor=#383048;"));
        assert!(style.contains("rounded=1;"));
    }

    #[test]
    fn test_content_only_with_descriptions() {
        let node = group(json!({ "label": "Zone", "content": "Billing objects" }));
        assert_eq!(build_group(&node, "g".into(), "1", false).value.as_deref(), Some("Zone"));
        assert_eq!(
            build_group(&node, "g".into(), "1", true).value.as_deref(),
            Some("Zone\nBilling objects")
        );
    }

    #[test]
    fn test_missing_label() {
        let cell = build_group(&group(json!({})), "g".into(), "1", false);
        assert_eq!(cell.value.as_deref(), Some("Group"));
    }
}
