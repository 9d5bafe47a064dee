//! Table nodes: a swimlane container with one stacked child row per field.
//!
//! Two looks share the geometry. Entity-relation rows carry `PK:`/`FK:`
//! prefixes and key-tinted fills; class-diagram rows carry `+`/`-`
//! visibility markers on a plain body.

use crate::board::BoardNode;
use crate::cell::{Bounds, Cell};
use crate::color::{darken, lighten, normalize_color};
use crate::field::{extract_fields, order_fields, plural, Field, FieldFilter, FieldList};
use crate::ids::IdAllocator;
use crate::measure::TextMetrics;
use crate::options::{ConversionOptions, DiagramStyle};
use crate::style::Style;

use super::CellRegistry;

const DEFAULT_COLOR: &str = "#3b82f6";
const HEADER_HEIGHT: f64 = 30.0;
const ICON_HEADER_HEIGHT: f64 = 60.0;
const DESCRIPTION_LIMIT: usize = 80;

const BADGE_HEIGHT: f64 = 20.0;
const BADGE_FONT_SIZE: f64 = 10.0;
const BADGE_INSET: f64 = 6.0;
const TABLE_TOP_MARGIN: f64 = 10.0;

const CUSTOM_FILL: &str = "#fff4e5";
const CUSTOM_STROKE: &str = "#f59e0b";

const ICON_CATEGORIES: [&str; 5] = ["standard", "utility", "custom", "action", "doctype"];

/// Cells produced for one table node.
#[derive(Debug)]
pub struct TableCells {
    /// Container, rows, and (for annotated tables) wrapper and badge, in
    /// emission order.
    pub cells: Vec<Cell>,
    /// The container itself, never the wrapper.
    pub table_id: String,
}

pub struct TableBuilder<'a> {
    options: &'a ConversionOptions,
    metrics: TextMetrics,
}

impl<'a> TableBuilder<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self {
            options,
            metrics: TextMetrics::default(),
        }
    }

    pub fn build(
        &self,
        node: &BoardNode,
        parent: &str,
        ids: &mut IdAllocator,
        registry: &mut CellRegistry,
    ) -> TableCells {
        let opts = self.options;
        let name = node.table_name();
        let color = normalize_color(node.data.color.as_deref().unwrap_or(DEFAULT_COLOR));

        let filter = FieldFilter {
            include_read_only: opts.include_read_only_fields,
            custom_only: opts.custom_fields_only,
        };
        let mut fields = node
            .data
            .schema
            .as_ref()
            .map(|s| extract_fields(s, filter))
            .unwrap_or_default();
        let grouped = match opts.diagram_style {
            DiagramStyle::Erd => true,
            DiagramStyle::Uml => opts.uml_options.group_by_visibility,
        };
        if grouped {
            order_fields(&mut fields);
        }
        let max = node.data.max_fields.unwrap_or(opts.max_fields);
        let list = FieldList::truncate(fields, max);

        let icon = node
            .data
            .icon
            .as_deref()
            .and_then(|r| icon_url(r, &opts.icon_base_url));
        let header = if icon.is_some() {
            ICON_HEADER_HEIGHT
        } else {
            HEADER_HEIGHT
        };
        let expanded = header + opts.field_height * list.row_count() as f64;
        let (shown, alternate) = if opts.collapse_tables {
            (header, expanded)
        } else {
            (expanded, header)
        };

        let x = node.position.x.round();
        let y = node.position.y.round();
        let annotation = node
            .data
            .annotation
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        let mut cells = Vec::with_capacity(list.row_count() + 3);

        let (table_parent, table_origin) = match annotation {
            Some(_) => {
                let wrapper_id = ids.allocate(&format!("group_{}", name));
                let mut wrapper = Cell::vertex(
                    wrapper_id.clone(),
                    parent,
                    Bounds::new(x, y, opts.table_width, BADGE_HEIGHT + shown),
                )
                .with_style(Style::new().with("group", 1).with("connectable", 0));
                wrapper.connectable = Some(false);
                cells.push(wrapper);
                (wrapper_id, (0.0, TABLE_TOP_MARGIN))
            }
            None => (parent.to_string(), (x, y)),
        };

        let table_id = ids.allocate(&format!("table_{}", name));
        let mut table = Cell::vertex(
            table_id.clone(),
            &table_parent,
            Bounds::new(table_origin.0, table_origin.1, opts.table_width, shown),
        )
        .with_value(name.as_str())
        .with_style(self.container_style(&color, header, icon.as_deref()))
        .with_tooltip(table_tooltip(&list, node));
        table.collapsed = Some(opts.collapse_tables);
        if let Some(geometry) = table.geometry_mut() {
            geometry.alternate = Some((opts.table_width, alternate));
        }
        cells.push(table);

        let total = list.total();
        let mut row_y = header;
        for (index, field) in list.visible.iter().enumerate() {
            let row_id = ids.allocate(&format!("{}_{}", name, field.name));
            registry.register_field(&node.id, field.name, &row_id);

            let (label, style) = match opts.diagram_style {
                DiagramStyle::Erd => (self.erd_label(field), self.erd_row_style(field, &color)),
                DiagramStyle::Uml => (self.uml_label(field), self.uml_row_style(field)),
            };

            cells.push(
                Cell::vertex(
                    row_id,
                    &table_id,
                    Bounds::new(0.0, row_y, opts.table_width, opts.field_height),
                )
                .with_value(label)
                .with_style(style)
                .with_tooltip(row_tooltip(field, index, total)),
            );
            row_y += opts.field_height;
        }

        if list.has_more() {
            let more_id = ids.allocate(&format!("{}_more", name));
            let label = format!("… {} more", plural(list.hidden, "field"));
            cells.push(
                Cell::vertex(
                    more_id,
                    &table_id,
                    Bounds::new(0.0, row_y, opts.table_width, opts.field_height),
                )
                .with_value(label)
                .with_style(more_row_style(&color))
                .with_tooltip(format!(
                    "{} hidden (showing {} of {})",
                    plural(list.hidden, "field"),
                    list.visible.len(),
                    total
                )),
            );
        }

        if let Some(text) = annotation {
            cells.push(self.badge(text, &name, &table_parent, &color, ids));
        }

        TableCells { cells, table_id }
    }

    fn container_style(&self, color: &str, header: f64, icon: Option<&str>) -> Style {
        let mut style = Style::new()
            .with("swimlane", 1)
            .with("fontStyle", 1)
            .with("childLayout", "stackLayout")
            .with("horizontal", 1)
            .with("startSize", header)
            .with("horizontalStack", 0)
            .with("resizeParent", 1)
            .with("resizeParentMax", 0)
            .with("resizeLast", 0)
            .with("collapsible", 1)
            .with("marginBottom", 0);

        match self.options.diagram_style {
            DiagramStyle::Erd => {
                style
                    .set("fillColor", color)
                    .set("strokeColor", darken(color, 20.0))
                    .set("strokeWidth", 2)
                    .set("rounded", 0)
                    .set("align", "center")
                    .set("verticalAlign", "middle");
            }
            DiagramStyle::Uml => {
                style
                    .set("fillColor", color)
                    .set("swimlaneFillColor", "#ffffff")
                    .set("strokeColor", darken(color, 20.0))
                    .set("strokeWidth", 1)
                    .set("rounded", 0)
                    .set("align", "center")
                    .set("verticalAlign", "top")
                    .set("whiteSpace", "wrap");
            }
        }
        style.set("html", 1);
        if let Some(url) = icon {
            style.set("image", url);
        }
        style
    }

    fn erd_label(&self, field: &Field<'_>) -> String {
        let mut label = String::new();
        if field.is_primary {
            label.push_str("PK: ");
        } else if field.is_foreign {
            label.push_str("FK: ");
        }
        label.push_str(field.name);
        if self.options.show_field_types {
            label.push_str(" : ");
            label.push_str(field.type_label());
        }
        if self.options.show_descriptions && !field.description.is_empty() {
            label.push('\n');
            label.extend(field.description.chars().take(DESCRIPTION_LIMIT));
        }
        label
    }

    fn erd_row_style(&self, field: &Field<'_>, color: &str) -> Style {
        let mut style = row_base_style()
            .with("shape", "partialRectangle")
            .with("top", 0)
            .with("left", 0)
            .with("right", 0)
            .with("bottom", 1)
            .with("fillColor", lighten(color, 40.0))
            .with("strokeColor", darken(color, 10.0))
            .with("fontSize", 12);

        if field.is_primary {
            style.set("fontStyle", 1).set("fillColor", lighten(color, 30.0));
            if let Some(extra) = &self.options.primary_key_style {
                style.merge(extra);
            }
        } else if field.is_foreign {
            style.set("fontStyle", 0).set("fillColor", lighten(color, 35.0));
            if let Some(extra) = &self.options.foreign_key_style {
                style.merge(extra);
            }
        }
        self.highlight_custom(&mut style, field);
        style
    }

    fn uml_label(&self, field: &Field<'_>) -> String {
        let mut label = String::new();
        if self.options.uml_options.show_visibility_markers {
            label.push_str(if field.is_read_only && !field.is_primary {
                "- "
            } else {
                "+ "
            });
        }
        label.push_str(field.name);
        if self.options.show_field_types {
            label.push_str(" : ");
            label.push_str(field.type_label());
        }
        label
    }

    fn uml_row_style(&self, field: &Field<'_>) -> Style {
        let mut style = row_base_style()
            .with("fillColor", "none")
            .with("strokeColor", "none")
            .with("fontSize", 12)
            .with("fontStyle", i32::from(field.is_primary));
        self.highlight_custom(&mut style, field);
        style
    }

    fn highlight_custom(&self, style: &mut Style, field: &Field<'_>) {
        if self.options.highlight_custom_fields && field.is_custom {
            style
                .set("fillColor", CUSTOM_FILL)
                .set("strokeColor", CUSTOM_STROKE)
                .set("strokeWidth", 2);
        }
    }

    fn badge(
        &self,
        text: &str,
        table_name: &str,
        wrapper_id: &str,
        color: &str,
        ids: &mut IdAllocator,
    ) -> Cell {
        let (width, _) = self.metrics.label_box(text, BADGE_FONT_SIZE);
        let x = (self.options.table_width - width - BADGE_INSET).max(0.0);
        let style = Style::new()
            .with("rounded", 1)
            .with("arcSize", 50)
            .with("whiteSpace", "nowrap")
            .with("html", 1)
            .with("fillColor", darken(color, 20.0))
            .with("strokeColor", "#ffffff")
            .with("fontColor", "#ffffff")
            .with("fontSize", BADGE_FONT_SIZE)
            .with("fontStyle", 1)
            .with("align", "center")
            .with("verticalAlign", "middle")
            .with("connectable", 0)
            .with("movable", 0);

        Cell::vertex(
            ids.allocate(&format!("badge_{}", table_name)),
            wrapper_id,
            Bounds::new(x, 0.0, width, BADGE_HEIGHT),
        )
        .with_value(text)
        .with_style(style)
    }
}

fn row_base_style() -> Style {
    Style::new()
        .with("text", 1)
        .with("align", "left")
        .with("verticalAlign", "middle")
        .with("spacingLeft", 4)
        .with("spacingRight", 4)
        .with("overflow", "hidden")
        .with("rotatable", 0)
        .with("points", "[[0,0.5],[1,0.5]]")
        .with("portConstraint", "eastwest")
        .with("movable", 0)
}

fn more_row_style(color: &str) -> Style {
    row_base_style()
        .with("align", "center")
        .with("fillColor", lighten(color, 45.0))
        .with("strokeColor", darken(color, 10.0))
        .with("fontSize", 11)
        .with("fontStyle", 2)
        .with("connectable", 0)
}

fn table_tooltip(list: &FieldList<'_>, node: &BoardNode) -> String {
    let mut tooltip = plural(list.total(), "field");
    if list.has_more() {
        tooltip.push_str(&format!(" (showing {})", list.visible.len()));
    }
    let description = node
        .data
        .schema
        .as_ref()
        .and_then(|s| s.description.as_deref())
        .or_else(|| node.data.table.as_ref().and_then(|t| t.description.as_deref()))
        .filter(|d| !d.is_empty());
    if let Some(description) = description {
        tooltip.push('\n');
        tooltip.push_str(description);
    }
    tooltip
}

fn row_tooltip(field: &Field<'_>, index: usize, total: usize) -> String {
    let mut tooltip = format!(
        "{} ({}), field {} of {}",
        field.name,
        field.display_type,
        index + 1,
        total
    );
    if !field.description.is_empty() {
        tooltip.push('\n');
        tooltip.push_str(field.description);
    }
    tooltip
}

/// Resolve a `category:name` icon reference against the icon base URL.
pub fn icon_url(reference: &str, base_url: &str) -> Option<String> {
    let (category, name) = reference.split_once(':')?;
    if name.is_empty() || name.contains(':') || !ICON_CATEGORIES.contains(&category) {
        return None;
    }
    Some(format!(
        "{}/{}/{}.svg",
        base_url.trim_end_matches('/'),
        category,
        name
    ))
}
