//! Board graph input model.
//!
//! Nodes and edges keep a typed core plus a flattened `extra` map, so unknown
//! keys survive deserialization without being modelled.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid board: expected object with \"nodes\" and \"edges\" arrays")]
    InvalidShape,
    #[error("invalid board element: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Board {
    pub nodes: Vec<BoardNode>,
    pub edges: Vec<BoardEdge>,
}

impl Board {
    pub fn from_json(input: &str) -> Result<Self, BoardError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    /// Decode a board, rejecting a missing or non-array `nodes`/`edges` up front.
    pub fn from_value(value: Value) -> Result<Self, BoardError> {
        let has_array = |key: &str| value.get(key).is_some_and(Value::is_array);
        if !has_array("nodes") || !has_array("edges") {
            return Err(BoardError::InvalidShape);
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Node `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
    Table,
    GroupZone,
    Markdown,
    Callout,
    Annotation,
    Note,
    Input,
    Legend,
    Other(String),
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "table" => Self::Table,
            "groupZone" => Self::GroupZone,
            "markdown" => Self::Markdown,
            "callout" => Self::Callout,
            "annotation" => Self::Annotation,
            "note" => Self::Note,
            "input" => Self::Input,
            "legend" => Self::Legend,
            _ => Self::Other(s),
        }
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Table => "table",
            Self::GroupZone => "groupZone",
            Self::Markdown => "markdown",
            Self::Callout => "callout",
            Self::Annotation => "annotation",
            Self::Note => "note",
            Self::Input => "input",
            Self::Legend => "legend",
            Self::Other(s) => s,
        }
    }

    /// Kinds that never produce a cell.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Input | Self::Legend)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardNode {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub style: Option<NodeStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BoardNode {
    pub fn label(&self) -> Option<&str> {
        self.data.label.as_deref().filter(|s| !s.is_empty())
    }

    /// Name a table node is known by: explicit table name, then label, then
    /// the last path segment of the node id.
    pub fn table_name(&self) -> String {
        if let Some(name) = self.data.table.as_ref().map(|t| t.name.as_str()) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        if let Some(label) = self.label() {
            return label.to_string();
        }
        match self.id.rsplit('/').next() {
            Some(last) if self.id.contains('/') && !last.is_empty() => last.to_string(),
            _ => self.id.strip_prefix("erd.").unwrap_or(&self.id).to_string(),
        }
    }

    /// Label for edge tooltips.
    pub fn display_name(&self) -> String {
        match self.kind {
            NodeKind::Table => self.table_name(),
            _ => self.label().unwrap_or(&self.id).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub table: Option<TableInfo>,
    #[serde(default)]
    pub schema: Option<TableSchema>,
    /// Per-node override of the global row limit.
    #[serde(default)]
    pub max_fields: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "x-target", default)]
    pub x_target: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Node-level visual overrides. Only `fontSize` is interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default)]
    pub font_size: Option<Scalar>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A loosely typed scalar as found in hand-written style objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric reading; strings parse their leading number (`"14px"` is 14).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => {
                let s = s.trim();
                let end = s
                    .char_indices()
                    .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
                    .map_or(s.len(), |(i, _)| i);
                s[..end].parse().ok()
            }
            Scalar::Bool(_) => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Number(n) => *n != 0.0,
            Scalar::Text(s) => !s.is_empty() && s != "false" && s != "0",
        }
    }
}

/// Edge `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum EdgeKind {
    BetweenTables,
    BetweenTablesInverted,
    Other(String),
}

impl From<String> for EdgeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "betweenTables" => Self::BetweenTables,
            "betweenTablesInverted" => Self::BetweenTablesInverted,
            _ => Self::Other(s),
        }
    }
}

impl EdgeKind {
    /// Both table-to-table kinds describe a lookup from source to target.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, Self::BetweenTables | Self::BetweenTablesInverted)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEdge {
    #[serde(default)]
    pub id: String,
    /// Empty when missing; such edges fail endpoint resolution.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<EdgeKind>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: Option<EdgeStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free-form edge appearance overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default)]
    pub stroke_width: Option<Scalar>,
    #[serde(default, alias = "stroke")]
    pub stroke_color: Option<String>,
    #[serde(default, alias = "dashPattern")]
    pub stroke_dasharray: Option<DashArray>,
    #[serde(default)]
    pub curved: Option<Scalar>,
    #[serde(default)]
    pub opacity: Option<Scalar>,
    #[serde(default)]
    pub font_size: Option<Scalar>,
    /// Explicit routing, e.g. `orthogonalEdgeStyle` or `none`.
    #[serde(default)]
    pub edge_style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dash pattern as `[5, 5]` or `"5,5"` / `"5 5"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DashArray {
    List(Vec<f64>),
    Text(String),
}

/// Strip a trailing `-source`, `-target`, `-source-inv` or `-target-inv` from a
/// handle id, leaving the field name.
pub fn handle_field_name(handle: &str) -> &str {
    for suffix in ["-source-inv", "-target-inv", "-source", "-target"] {
        if let Some(stripped) = handle.strip_suffix(suffix) {
            return stripped;
        }
    }
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_missing_arrays() {
        assert!(matches!(
            Board::from_value(json!({ "nodes": [] })),
            Err(BoardError::InvalidShape)
        ));
        assert!(matches!(
            Board::from_value(json!({ "nodes": {}, "edges": [] })),
            Err(BoardError::InvalidShape)
        ));
        assert!(matches!(Board::from_value(json!(null)), Err(BoardError::InvalidShape)));
    }

    #[test]
    fn test_edge_without_endpoints_parses() {
        let board = Board::from_value(json!({
            "nodes": [{ "type": "table", "data": {} }],
            "edges": [
                { "id": "bad", "target": "Account" },
                { "id": "ok", "source": "Contact", "target": "Account" }
            ]
        }))
        .unwrap();
        assert_eq!(board.nodes[0].id, "");
        assert_eq!(board.edges.len(), 2);
        assert_eq!(board.edges[0].source, "");
        assert_eq!(board.edges[0].target, "Account");
        assert_eq!(board.edges[1].source, "Contact");
    }

    #[test]
    fn test_accepts_empty_board() {
        let board = Board::from_json(r#"{ "nodes": [], "edges": [] }"#).unwrap();
        assert!(board.nodes.is_empty());
        assert!(board.edges.is_empty());
    }

    #[test]
    fn test_node_kinds() {
        let board = Board::from_value(json!({
            "nodes": [
                { "id": "a", "type": "table", "position": { "x": 1.5, "y": 2 }, "data": { "label": "A" } },
                { "id": "b", "type": "groupZone", "position": { "x": 0, "y": 0 }, "data": {} },
                { "id": "c", "type": "sticker", "position": { "x": 0, "y": 0 }, "data": {} }
            ],
            "edges": []
        }))
        .unwrap();

        assert_eq!(board.nodes[0].kind, NodeKind::Table);
        assert_eq!(board.nodes[0].position.x, 1.5);
        assert_eq!(board.nodes[1].kind, NodeKind::GroupZone);
        assert_eq!(board.nodes[2].kind, NodeKind::Other("sticker".into()));
        assert_eq!(board.nodes[2].kind.as_str(), "sticker");
    }

    #[test]
    fn test_schema_preserves_declaration_order() {
        let board = Board::from_value(json!({
            "nodes": [{
                "id": "t", "type": "table", "position": { "x": 0, "y": 0 },
                "data": { "schema": { "properties": {
                    "Zeta": { "type": "string" },
                    "Alpha": { "type": "string", "readOnly": true },
                    "OwnerId": { "type": "string", "x-target": "User" }
                } } }
            }],
            "edges": []
        }))
        .unwrap();

        let schema = board.nodes[0].data.schema.as_ref().unwrap();
        let names: Vec<&str> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "OwnerId"]);
        assert!(schema.properties["Alpha"].read_only);
        assert_eq!(schema.properties["OwnerId"].x_target.as_deref(), Some("User"));
    }

    #[test]
    fn test_unknown_keys_kept() {
        let board = Board::from_value(json!({
            "nodes": [{ "id": "n", "type": "note", "position": { "x": 0, "y": 0 },
                        "extent": "parent", "data": { "label": "hi", "flavour": 3 } }],
            "edges": []
        }))
        .unwrap();
        assert_eq!(board.nodes[0].extra["extent"], json!("parent"));
        assert_eq!(board.nodes[0].data.extra["flavour"], json!(3));
    }

    #[test]
    fn test_table_name_fallbacks() {
        let node: BoardNode = serde_json::from_value(json!({
            "id": "erd.Account", "type": "table", "position": { "x": 0, "y": 0 }, "data": {}
        }))
        .unwrap();
        assert_eq!(node.table_name(), "Account");

        let node: BoardNode = serde_json::from_value(json!({
            "id": "boards/sales/Opportunity", "type": "table", "data": {}
        }))
        .unwrap();
        assert_eq!(node.table_name(), "Opportunity");

        let node: BoardNode = serde_json::from_value(json!({
            "id": "x", "type": "table", "data": { "label": "Lbl", "table": { "name": "Api__c" } }
        }))
        .unwrap();
        assert_eq!(node.table_name(), "Api__c");
    }

    #[test]
    fn test_edge_style_shapes() {
        let edge: BoardEdge = serde_json::from_value(json!({
            "id": "e", "source": "a", "target": "b", "type": "betweenTablesInverted",
            "style": { "stroke": "#f00", "strokeDasharray": [5, 3], "curved": true, "opacity": 0.5 }
        }))
        .unwrap();
        assert_eq!(edge.kind, Some(EdgeKind::BetweenTablesInverted));
        let style = edge.style.unwrap();
        assert_eq!(style.stroke_color.as_deref(), Some("#f00"));
        assert_eq!(style.stroke_dasharray, Some(DashArray::List(vec![5.0, 3.0])));
        assert!(style.curved.unwrap().is_truthy());
    }

    #[test]
    fn test_handle_field_name() {
        assert_eq!(handle_field_name("AccountId-source"), "AccountId");
        assert_eq!(handle_field_name("Id-target-inv"), "Id");
        assert_eq!(handle_field_name("Owner-Id-target"), "Owner-Id");
        assert_eq!(handle_field_name("plain"), "plain");
    }

    #[test]
    fn test_scalar_parsing() {
        assert_eq!(Scalar::Text("14px".into()).as_f64(), Some(14.0));
        assert_eq!(Scalar::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(Scalar::Text("big".into()).as_f64(), None);
    }
}
