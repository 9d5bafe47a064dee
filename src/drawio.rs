//! mxGraph / draw.io markup writer.

use std::fmt::{self, Write};

use chrono::SecondsFormat;

use crate::cell::{Cell, CellKind};
use crate::document::Document;

const HOST: &str = "app.diagrams.net";
const AGENT: &str = concat!("boardio/", env!("CARGO_PKG_VERSION"));
pub const DIAGRAM_ID: &str = "diagram1";

/// `<mxfile>` attributes owned by the writer; metadata cannot override them.
const RESERVED_KEYS: [&str; 4] = ["host", "modified", "agent", "type"];

#[derive(Debug, Default)]
pub struct DrawioWriter;

impl DrawioWriter {
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_document(&mut out, doc);
        out
    }

    fn write_document(&self, out: &mut String, doc: &Document) -> fmt::Result {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        write!(
            out,
            r#"<mxfile host="{}" modified="{}" agent="{}""#,
            HOST,
            doc.modified.to_rfc3339_opts(SecondsFormat::Millis, true),
            AGENT
        )?;
        let mut version = None;
        let mut properties = Vec::new();
        for (key, value) in &doc.metadata {
            match attribute_name(key) {
                Some(name) if name == "version" => version = Some(value.as_str()),
                // Sanitizing can map two keys onto one name; the first wins.
                Some(name) if !properties.iter().any(|(n, _)| *n == name) => properties.push((name, value)),
                _ => {}
            }
        }
        write!(
            out,
            r#" version="{}""#,
            escape_attr(version.unwrap_or(env!("CARGO_PKG_VERSION")))
        )?;
        for (name, value) in properties {
            write!(out, r#" {}="{}""#, name, escape_attr(value))?;
        }
        writeln!(out, r#" type="device">"#)?;
        writeln!(
            out,
            r#"  <diagram id="{}" name="{}">"#,
            DIAGRAM_ID,
            escape_attr(&doc.title)
        )?;

        let page = &doc.page;
        writeln!(
            out,
            r#"    <mxGraphModel dx="{}" dy="{}" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="{}" pageWidth="{}" pageHeight="{}" math="0" shadow="1">"#,
            page.dx, page.dy, page.scale, page.width, page.height
        )?;
        writeln!(out, "      <root>")?;

        for cell in &doc.cells {
            self.write_cell(out, cell)?;
        }

        writeln!(out, "      </root>")?;
        writeln!(out, "    </mxGraphModel>")?;
        writeln!(out, "  </diagram>")?;
        write!(out, "</mxfile>")
    }

    fn write_cell(&self, out: &mut String, cell: &Cell) -> fmt::Result {
        let wrapped = cell.tooltip.is_some();
        let indent = if wrapped { "          " } else { "        " };

        if let Some(tooltip) = &cell.tooltip {
            write!(
                out,
                r#"        <UserObject label="{}" tooltip="{}" id="{}""#,
                escape_attr(cell.value.as_deref().unwrap_or_default()),
                escape_attr(tooltip),
                escape_attr(&cell.id)
            )?;
            if let Some(link) = &cell.link {
                write!(out, r#" link="{}""#, escape_attr(link))?;
            }
            writeln!(out, ">")?;
            write!(out, "{}<mxCell", indent)?;
        } else {
            write!(out, r#"{}<mxCell id="{}""#, indent, escape_attr(&cell.id))?;
            if let Some(value) = &cell.value {
                write!(out, r#" value="{}""#, escape_attr(value))?;
            }
            if let Some(link) = &cell.link {
                write!(out, r#" link="{}""#, escape_attr(link))?;
            }
        }

        if let Some(style) = &cell.style {
            write!(out, r#" style="{}""#, escape_attr(&style.compose()))?;
        }
        match &cell.kind {
            CellKind::Vertex(_) => write!(out, r#" vertex="1""#)?,
            CellKind::Edge { .. } => write!(out, r#" edge="1""#)?,
            CellKind::Root | CellKind::Layer => {}
        }
        if let Some(parent) = &cell.parent {
            write!(out, r#" parent="{}""#, escape_attr(parent))?;
        }
        if let CellKind::Edge { source, target } = &cell.kind {
            write!(
                out,
                r#" source="{}" target="{}""#,
                escape_attr(source),
                escape_attr(target)
            )?;
        }
        if let Some(connectable) = cell.connectable {
            write!(out, r#" connectable="{}""#, u8::from(connectable))?;
        }
        if let Some(collapsed) = cell.collapsed {
            write!(out, r#" collapsed="{}""#, u8::from(collapsed))?;
        }

        match &cell.kind {
            CellKind::Root | CellKind::Layer => writeln!(out, "/>")?,
            CellKind::Vertex(geometry) => {
                writeln!(out, ">")?;
                let b = &geometry.bounds;
                write!(
                    out,
                    r#"{}  <mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry""#,
                    indent, b.x, b.y, b.width, b.height
                )?;
                match geometry.alternate {
                    Some((width, height)) => {
                        writeln!(out, ">")?;
                        writeln!(
                            out,
                            r#"{}    <mxRectangle width="{}" height="{}" as="alternateBounds"/>"#,
                            indent, width, height
                        )?;
                        writeln!(out, "{}  </mxGeometry>", indent)?;
                    }
                    None => writeln!(out, "/>")?,
                }
                writeln!(out, "{}</mxCell>", indent)?;
            }
            CellKind::Edge { .. } => {
                writeln!(out, ">")?;
                writeln!(out, r#"{}  <mxGeometry relative="1" as="geometry">"#, indent)?;
                writeln!(out, r#"{}    <mxPoint as="sourcePoint"/>"#, indent)?;
                writeln!(out, r#"{}    <mxPoint as="targetPoint"/>"#, indent)?;
                writeln!(out, "{}  </mxGeometry>", indent)?;
                writeln!(out, "{}</mxCell>", indent)?;
            }
        }

        if wrapped {
            writeln!(out, "        </UserObject>")?;
        }
        Ok(())
    }
}

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Like [`escape_xml`], with newlines kept as character references so they
/// survive attribute value normalization.
pub fn escape_attr(s: &str) -> String {
    escape_xml(s).replace('\n', "&#xa;")
}

/// A metadata key as an XML attribute name, or `None` if it is reserved or
/// has nothing usable left.
fn attribute_name(key: &str) -> Option<String> {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        name.insert(0, '_');
    }
    if name.chars().all(|c| c == '_') || RESERVED_KEYS.contains(&name.as_str()) {
        return None;
    }
    Some(name)
}
