use boardio::board::Board;
use boardio::options::ConversionOptions;
use boardio::{board_to_drawio, transform_at};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;

/// One cell as read back from the markup, `UserObject` wrappers unfolded.
#[derive(Debug, Default)]
struct ParsedCell {
    id: String,
    value: Option<String>,
    style: String,
    parent: Option<String>,
    source: Option<String>,
    target: Option<String>,
    edge: bool,
    width: Option<f64>,
    height: Option<f64>,
}

fn parse_cells(xml: &str) -> Vec<ParsedCell> {
    let doc = roxmltree::Document::parse(xml).expect("well-formed XML");
    let mut out = Vec::new();

    for node in doc.descendants() {
        let (id, value, cell) = match node.tag_name().name() {
            "UserObject" => {
                let Some(cell) = node.children().find(|c| c.has_tag_name("mxCell")) else {
                    continue;
                };
                (node.attribute("id"), node.attribute("label"), cell)
            }
            "mxCell" if node.attribute("id").is_some() => (node.attribute("id"), node.attribute("value"), node),
            _ => continue,
        };

        let geometry = cell.children().find(|c| c.has_tag_name("mxGeometry"));
        let number = |name: &str| {
            geometry
                .and_then(|g| g.attribute(name))
                .and_then(|v| v.parse::<f64>().ok())
        };
        out.push(ParsedCell {
            id: id.unwrap_or_default().to_string(),
            value: value.map(str::to_string),
            style: cell.attribute("style").unwrap_or_default().to_string(),
            parent: cell.attribute("parent").map(str::to_string),
            source: cell.attribute("source").map(str::to_string),
            target: cell.attribute("target").map(str::to_string),
            edge: cell.attribute("edge") == Some("1"),
            width: number("width"),
            height: number("height"),
        });
    }
    out
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
}

fn render(board: Value, options: Value) -> String {
    let board = Board::from_value(board).unwrap();
    let options: ConversionOptions = serde_json::from_value(options).unwrap();
    transform_at(&board, &options, fixed_time())
}

fn table(id: &str, y: f64, properties: Value) -> Value {
    json!({
        "id": id,
        "type": "table",
        "position": { "x": 0, "y": y },
        "data": { "label": id, "schema": { "properties": properties } }
    })
}

fn account_contact() -> Value {
    json!({
        "nodes": [
            table("Account", 0.0, json!({
                "Id": { "type": "string", "readOnly": true },
                "Name": { "type": "string" }
            })),
            table("Contact", 300.0, json!({
                "Id": { "type": "string", "readOnly": true },
                "AccountId": { "type": "string", "x-target": "Account" }
            }))
        ],
        "edges": [{
            "id": "erd.Contact.Account",
            "source": "Contact",
            "target": "Account",
            "sourceHandle": "AccountId-source",
            "targetHandle": "Id-target",
            "type": "betweenTables"
        }]
    })
}

fn rows_of<'a>(cells: &'a [ParsedCell], table_id: &str) -> Vec<&'a ParsedCell> {
    cells
        .iter()
        .filter(|c| c.parent.as_deref() == Some(table_id))
        .collect()
}

fn assert_closed(cells: &[ParsedCell]) {
    let mut seen = HashSet::new();
    for cell in cells {
        assert!(seen.insert(cell.id.as_str()), "duplicate id {}", cell.id);
    }
    for cell in cells {
        for reference in [&cell.parent, &cell.source, &cell.target].into_iter().flatten() {
            assert!(
                seen.contains(reference.as_str()),
                "{} references missing cell {}",
                cell.id,
                reference
            );
        }
    }
}

#[test]
fn test_account_contact_scenario() {
    let xml = render(account_contact(), json!({}));
    let cells = parse_cells(&xml);
    assert_closed(&cells);

    let tables: Vec<&ParsedCell> = cells.iter().filter(|c| c.style.starts_with("swimlane;")).collect();
    assert_eq!(tables.len(), 2);
    assert_eq!(rows_of(&cells, "table_Account").len(), 2);
    assert_eq!(rows_of(&cells, "table_Contact").len(), 2);

    let edges: Vec<&ParsedCell> = cells.iter().filter(|c| c.edge).collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].id, "edge_Contact_to_Account");
    assert_eq!(edges[0].source.as_deref(), Some("Contact_AccountId"));
    assert_eq!(edges[0].target.as_deref(), Some("Account_Id"));
    assert!(edges[0].style.contains("endArrow=ERone;startArrow=ERmany;"));

    let contact_rows: Vec<&str> = rows_of(&cells, "table_Contact")
        .iter()
        .filter_map(|c| c.value.as_deref())
        .collect();
    assert_eq!(contact_rows, vec!["PK: Id : Text", "FK: AccountId : Account"]);
}

#[test]
fn test_max_fields_override_adds_more_row() {
    let mut board = account_contact();
    board["nodes"][1]["data"]["maxFields"] = json!(1);
    let cells = parse_cells(&render(board, json!({})));
    assert_closed(&cells);

    let rows = rows_of(&cells, "table_Contact");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "Contact_Id");
    assert_eq!(rows[1].id, "Contact_more");
    assert_eq!(rows[1].value.as_deref(), Some("… 1 more field"));

    // The hidden AccountId row cannot take the edge, so it lands on the table.
    let edge = cells.iter().find(|c| c.edge).unwrap();
    assert_eq!(edge.source.as_deref(), Some("table_Contact"));
    assert_eq!(edge.target.as_deref(), Some("Account_Id"));
}

#[test]
fn test_truncation_counts() {
    let properties: serde_json::Map<String, Value> = (0..25)
        .map(|i| (format!("Field{:02}", i), json!({ "type": "string" })))
        .collect();
    let board = json!({ "nodes": [table("Wide", 0.0, Value::Object(properties))], "edges": [] });
    let cells = parse_cells(&render(board, json!({ "maxFields": 20 })));

    let rows = rows_of(&cells, "table_Wide");
    assert_eq!(rows.len(), 21);
    assert_eq!(rows[20].value.as_deref(), Some("… 5 more fields"));
}

#[test]
fn test_read_only_filter_keeps_primary_key() {
    let board = json!({
        "nodes": [table("Case", 0.0, json!({
            "Subject": { "type": "string" },
            "CreatedDate": { "type": "string", "format": "date-time", "readOnly": true },
            "OwnerId": { "type": "string", "readOnly": true },
            "Id": { "type": "string", "readOnly": true }
        }))],
        "edges": []
    });
    let cells = parse_cells(&render(board, json!({ "includeReadOnlyFields": false })));
    let ids: Vec<&str> = rows_of(&cells, "table_Case").iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["Case_Id", "Case_OwnerId", "Case_Subject"]);
}

#[test]
fn test_group_zone_defaults() {
    let board = json!({
        "nodes": [{
            "id": "zone", "type": "groupZone", "position": { "x": 0, "y": 0 },
            "data": { "label": "Sales", "color": "rgba(107,99,123,0.4)" }
        }],
        "edges": []
    });
    let cells = parse_cells(&render(board, json!({})));
    let group = cells.iter().find(|c| c.id == "group_Sales").unwrap();
    assert_eq!((group.width, group.height), (Some(800.0), Some(400.0)));
    assert!(group.style.contains("fillColor=#6b637b;"));
}

#[test]
fn test_unresolvable_edges_are_dropped() {
    let mut board = account_contact();
    board["edges"] = json!([
        { "id": "ok", "source": "Contact", "target": "Account" },
        { "id": "ghost-source", "source": "Nobody", "target": "Account" },
        { "id": "ghost-target", "source": "Contact", "target": "Nobody" },
        { "id": "ok2", "source": "Account", "target": "Contact", "label": "parent of" }
    ]);
    let cells = parse_cells(&render(board, json!({})));
    assert_closed(&cells);
    let edges: Vec<&str> = cells.iter().filter(|c| c.edge).map(|c| c.id.as_str()).collect();
    assert_eq!(edges, vec!["edge_ok", "edge_parent_of"]);
}

#[test]
fn test_edge_missing_endpoint_is_dropped() {
    let mut board = account_contact();
    board["edges"] = json!([
        { "id": "bad", "target": "Account" },
        { "id": "no-target", "source": "Contact" },
        { "id": "ok", "source": "Contact", "target": "Account" }
    ]);
    let cells = parse_cells(&render(board, json!({})));
    assert_closed(&cells);
    let edges: Vec<&str> = cells.iter().filter(|c| c.edge).map(|c| c.id.as_str()).collect();
    assert_eq!(edges, vec!["edge_ok"]);
    assert!(cells.iter().any(|c| c.id == "table_Account"));
}

#[test]
fn test_ids_unique_and_closed_on_mixed_board() {
    let board = json!({
        "nodes": [
            { "id": "g1", "type": "groupZone", "position": { "x": 0, "y": 0 }, "data": { "label": "Core" } },
            { "id": "g2", "type": "groupZone", "position": { "x": 0, "y": 500 }, "data": { "label": "Core" } },
            {
                "id": "a", "type": "table", "parentId": "g1", "position": { "x": 20, "y": 40 },
                "data": {
                    "label": "Account", "annotation": "Master data", "icon": "standard:account",
                    "schema": { "properties": { "Id": { "type": "string" }, "Name": { "type": "string" } } }
                }
            },
            {
                "id": "b", "type": "table", "parentId": "g2", "position": { "x": 20, "y": 540 },
                "data": { "label": "Account", "schema": { "properties": { "Id": { "type": "string" } } } }
            },
            { "id": "n", "type": "note", "parentId": "g1", "position": { "x": 400, "y": 40 }, "data": { "label": "Core" } },
            { "id": "m", "type": "markdown", "position": { "x": 0, "y": -100 }, "data": { "label": "# Board" } },
            { "id": "i", "type": "input", "position": { "x": 0, "y": 0 }, "data": {} }
        ],
        "edges": [
            { "id": "e1", "source": "a", "target": "b", "sourceHandle": "Id-source", "targetHandle": "Id-target-inv" },
            { "id": "e2", "source": "n", "target": "a" },
            { "id": "e3", "source": "i", "target": "a" }
        ]
    });
    let xml = render(board, json!({ "metadata": { "author": "SF Explorer" }, "titleDisplay": { "show": true } }));
    let cells = parse_cells(&xml);
    assert_closed(&cells);

    let ids: HashSet<&str> = cells.iter().map(|c| c.id.as_str()).collect();
    for id in ["group_Core", "group_Core_1", "table_Account", "table_Account_1", "badge_Account", "note_Core"] {
        assert!(ids.contains(id), "missing {}", id);
    }
    assert_eq!(cells.iter().filter(|c| c.edge).count(), 2);
}

#[test]
fn test_deterministic_for_fixed_time() {
    let a = render(account_contact(), json!({ "diagramStyle": "uml" }));
    let b = render(account_contact(), json!({ "diagramStyle": "uml" }));
    assert_eq!(a, b);
    assert!(a.contains(r#"modified="2025-01-02T03:04:05.000Z""#));
}

#[test]
fn test_uml_rows_and_composition() {
    let cells = parse_cells(&render(account_contact(), json!({ "diagramStyle": "uml" })));
    let rows: Vec<&str> = rows_of(&cells, "table_Contact")
        .iter()
        .filter_map(|c| c.value.as_deref())
        .collect();
    assert_eq!(rows, vec!["+ Id : Text", "+ AccountId : Account"]);

    let edge = cells.iter().find(|c| c.edge).unwrap();
    assert!(edge.style.contains("endArrow=diamondThin;"));
}

#[test]
fn test_document_settings() {
    let xml = render(
        account_contact(),
        json!({
            "title": "Test: Visible Title",
            "metadata": {
                "author": "SF Explorer",
                "version": "2.2.0",
                "repository": "https://github.com/sf-explorer/app",
                "testProperty": "test-value"
            },
            "pageSettings": { "size": "Letter", "orientation": "landscape" },
            "viewport": { "autoFit": true, "initialZoom": 0.75, "centerContent": true },
            "titleDisplay": { "show": true, "position": "top-center" }
        }),
    );
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let mxfile = doc.root_element();
    assert_eq!(mxfile.tag_name().name(), "mxfile");
    assert_eq!(mxfile.attribute("author"), Some("SF Explorer"));
    assert_eq!(mxfile.attribute("version"), Some("2.2.0"));
    assert_eq!(mxfile.attribute("repository"), Some("https://github.com/sf-explorer/app"));
    assert_eq!(mxfile.attribute("testProperty"), Some("test-value"));
    assert_eq!(mxfile.attribute("host"), Some("app.diagrams.net"));
    assert!(xml.contains(r#"<mxCell id="0"/>"#));
    assert!(xml.contains(r#"link="https://github.com/sf-explorer/app""#));
    let link_cell = doc
        .descendants()
        .find(|n| n.has_tag_name("mxCell") && n.attribute("id") == Some("repository_link"))
        .unwrap();
    assert_eq!(link_cell.attribute("link"), Some("https://github.com/sf-explorer/app"));

    // autoFit moves the view but keeps the requested zoom.
    assert!(xml.contains(r#"pageWidth="1056" pageHeight="816""#));
    assert!(xml.contains(r#"pageScale="0.75""#));
    assert!(xml.contains(r#"name="Test: Visible Title""#));

    let cells = parse_cells(&xml);
    assert_closed(&cells);
    let title = cells.iter().find(|c| c.id.starts_with("title_")).unwrap();
    assert_eq!(title.value.as_deref(), Some("Test: Visible Title"));
    let link = cells.iter().find(|c| c.id == "repository_link").unwrap();
    assert!(link.value.as_deref().unwrap().contains("github.com/sf-explorer/app"));
}

#[test]
fn test_string_entry_point() {
    let xml = board_to_drawio(&account_contact().to_string(), Some(r#"{ "collapseTables": false }"#)).unwrap();
    let cells = parse_cells(&xml);
    let account = cells.iter().find(|c| c.id == "table_Account").unwrap();
    assert_eq!(account.height, Some(30.0 + 2.0 * 26.0));

    assert!(board_to_drawio(r#"{ "edges": [] }"#, None).is_err());
    assert!(board_to_drawio("not json", None).is_err());
}
