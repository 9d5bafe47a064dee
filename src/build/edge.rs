//! Relationship edges.

use crate::board::{handle_field_name, BoardEdge, DashArray, EdgeStyle};
use crate::cell::Cell;
use crate::color::normalize_color;
use crate::ids::IdAllocator;
use crate::options::{ConversionOptions, DiagramStyle, RelationshipStyle};
use crate::style::Style;

use super::CellRegistry;

const DEFAULT_STROKE: &str = "#6c757d";

/// Endpoints an edge attaches to, after handle redirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub source: String,
    pub target: String,
}

/// Resolve both ends to cell ids, preferring the field row named by a handle
/// over the whole table. `None` if either end has no cell.
pub fn resolve_endpoints(edge: &BoardEdge, registry: &CellRegistry) -> Option<Endpoints> {
    let end = |node_id: &str, handle: Option<&str>| -> Option<String> {
        if node_id.is_empty() {
            return None;
        }
        let field_cell = handle
            .map(handle_field_name)
            .and_then(|field| registry.field_cell(node_id, field));
        field_cell
            .or_else(|| registry.node_cell(node_id))
            .map(str::to_string)
    };

    Some(Endpoints {
        source: end(&edge.source, edge.source_handle.as_deref())?,
        target: end(&edge.target, edge.target_handle.as_deref())?,
    })
}

/// Seed for the edge cell id: the label, else the tail of the edge id.
pub fn edge_seed(edge: &BoardEdge) -> String {
    let name = match edge.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => label.to_string(),
        None => {
            let parts: Vec<&str> = edge.id.split('.').collect();
            parts[parts.len().saturating_sub(2)..].join("_to_")
        }
    };
    format!("edge_{}", name)
}

pub struct EdgeBuilder<'a> {
    options: &'a ConversionOptions,
}

impl<'a> EdgeBuilder<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self { options }
    }

    /// Build the edge cell, or `None` when an endpoint is unresolvable.
    pub fn build(&self, edge: &BoardEdge, ids: &mut IdAllocator, registry: &CellRegistry) -> Option<Cell> {
        let ends = resolve_endpoints(edge, registry)?;

        let mut style = match self.options.diagram_style {
            DiagramStyle::Erd => erd_style(),
            DiagramStyle::Uml => self.uml_style(edge),
        };
        if let Some(overrides) = &edge.style {
            apply_overrides(&mut style, overrides);
        }

        let id = ids.allocate(&edge_seed(edge));
        Some(
            Cell::edge(id, ends.source, ends.target)
                .with_value(edge.label.clone().unwrap_or_default())
                .with_style(style)
                .with_tooltip(tooltip(edge, registry)),
        )
    }

    fn uml_style(&self, edge: &BoardEdge) -> Style {
        let composition = self.options.uml_options.relationship_style == RelationshipStyle::Smart
            && edge.kind.as_ref().is_some_and(|k| k.is_foreign_key());

        let (end_arrow, end_fill) = if composition {
            ("diamondThin", 1)
        } else {
            ("open", 0)
        };

        routing_style()
            .with("fontSize", 11)
            .with("html", 1)
            .with("endArrow", end_arrow)
            .with("startArrow", "none")
            .with("endFill", end_fill)
            .with("startFill", 0)
            .with("strokeWidth", 1)
            .with("strokeColor", DEFAULT_STROKE)
            .with("curved", 0)
    }
}

fn routing_style() -> Style {
    Style::new()
        .with("edgeStyle", "orthogonalEdgeStyle")
        .with("rounded", 0)
        .with("orthogonalLoop", 1)
        .with("jettySize", "auto")
}

/// Crow's foot, many at the source and one at the target, whatever the edge
/// type says.
fn erd_style() -> Style {
    routing_style()
        .with("fontSize", 12)
        .with("html", 1)
        .with("endArrow", "ERone")
        .with("startArrow", "ERmany")
        .with("endFill", 0)
        .with("startFill", 0)
        .with("strokeWidth", 2)
        .with("strokeColor", DEFAULT_STROKE)
        .with("curved", 0)
}

fn apply_overrides(style: &mut Style, overrides: &EdgeStyle) {
    if let Some(width) = overrides.stroke_width.as_ref().and_then(|w| w.as_f64()) {
        style.set("strokeWidth", width);
    }
    if let Some(color) = overrides.stroke_color.as_deref().map(str::trim) {
        if !color.is_empty() {
            style.set("strokeColor", edge_color(color));
        }
    }
    if let Some(pattern) = overrides.stroke_dasharray.as_ref().and_then(dash_pattern) {
        style.set("dashed", 1).set("dashPattern", pattern);
    }
    if let Some(opacity) = overrides.opacity.as_ref().and_then(|o| o.as_f64()) {
        style.set("opacity", opacity_percent(opacity));
    }
    if let Some(size) = overrides.font_size.as_ref().and_then(|f| f.as_f64()) {
        style.set("fontSize", size);
    }
    if overrides.curved.as_ref().is_some_and(|c| c.is_truthy()) {
        style
            .set("edgeStyle", "curvedEdgeStyle")
            .set("rounded", 1)
            .set("curved", 1);
    }
    if let Some(routing) = overrides.edge_style.as_deref().map(str::trim) {
        if !routing.is_empty() && !routing.contains([';', '=']) {
            style.set("edgeStyle", routing);
        }
    }
}

/// CSS variables cannot be resolved in the output, so they fall back to the
/// default stroke.
fn edge_color(color: &str) -> String {
    if color.starts_with("var(") {
        DEFAULT_STROKE.to_string()
    } else {
        normalize_color(color)
    }
}

/// `[5, 3]`, `"5,3"` and `"5 3"` all become `5,3`.
fn dash_pattern(dash: &DashArray) -> Option<String> {
    let parts: Vec<String> = match dash {
        DashArray::List(values) => values.iter().map(|v| v.to_string()).collect(),
        DashArray::Text(text) => text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty() && s.parse::<f64>().is_ok())
            .map(str::to_string)
            .collect(),
    };
    (!parts.is_empty()).then(|| parts.join(","))
}

/// Fractional opacity (0-1) to the 0-100 scale; larger values are taken as
/// already scaled.
fn opacity_percent(opacity: f64) -> i64 {
    let scaled = if opacity <= 1.0 { opacity * 100.0 } else { opacity };
    scaled.round().clamp(0.0, 100.0) as i64
}

fn tooltip(edge: &BoardEdge, registry: &CellRegistry) -> String {
    let end = |node_id: &str, handle: Option<&str>| {
        let name = registry.display_name(node_id);
        match handle.map(handle_field_name).filter(|f| !f.is_empty()) {
            Some(field) => format!("{}.{}", name, field),
            None => name.to_string(),
        }
    };
    let path = format!(
        "{} → {}",
        end(&edge.source, edge.source_handle.as_deref()),
        end(&edge.target, edge.target_handle.as_deref())
    );
    match edge.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => format!("{}\n{}", label, path),
        None => path,
    }
}
