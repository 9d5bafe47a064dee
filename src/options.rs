//! Conversion options.
//!
//! Deserializes from the same camelCase JSON option objects the board tooling
//! passes around; every field falls back to its default.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::style::Style;

pub const DEFAULT_TITLE: &str = "SF Explorer Board";
pub const DEFAULT_ICON_BASE_URL: &str =
    "https://unpkg.com/@salesforce-ux/design-system@2.24.5/assets/icons";

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramStyle {
    /// Entity-relation swimlanes with PK/FK prefixes.
    #[default]
    Erd,
    /// Class-diagram rows with visibility markers.
    Uml,
}

impl DiagramStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "erd" => Some(Self::Erd),
            "uml" => Some(Self::Uml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStyle {
    Association,
    #[default]
    Smart,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UmlOptions {
    pub show_visibility_markers: bool,
    pub group_by_visibility: bool,
    pub relationship_style: RelationshipStyle,
}

impl Default for UmlOptions {
    fn default() -> Self {
        Self {
            show_visibility_markers: true,
            group_by_visibility: false,
            relationship_style: RelationshipStyle::Smart,
        }
    }
}

/// Document properties attached to the root cell.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub author: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub created: Option<String>,
    pub repository: Option<String>,
    /// Any other key/value pair.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.description.is_none()
            && self.version.is_none()
            && self.created.is_none()
            && self.repository.is_none()
            && self.extra.is_empty()
    }

    /// Named properties in emission order, extras last.
    pub fn properties(&self) -> Vec<(String, String)> {
        let named = [
            ("author", &self.author),
            ("description", &self.description),
            ("version", &self.version),
            ("created", &self.created),
            ("repository", &self.repository),
        ];
        let mut out: Vec<(String, String)> = named
            .into_iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
            .collect();

        for (key, value) in &self.extra {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            out.push((key.clone(), text));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    #[serde(rename = "custom")]
    Custom,
}

impl PageSize {
    /// Portrait dimensions in pixels; `None` for custom.
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            PageSize::A3 => Some((1169, 1654)),
            PageSize::A4 => Some((827, 1169)),
            PageSize::A5 => Some((583, 827)),
            PageSize::Letter => Some((816, 1056)),
            PageSize::Legal => Some((816, 1344)),
            PageSize::Tabloid => Some((1056, 1632)),
            PageSize::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub size: PageSize,
    pub orientation: Orientation,
    /// Used when `size` is `custom`.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PageSettings {
    /// Final page width and height with orientation applied.
    pub fn resolve(&self) -> (u32, u32) {
        let (w, h) = self.size.dimensions().unwrap_or_else(|| {
            let (dw, dh) = PageSize::A4.dimensions().unwrap_or((827, 1169));
            (self.width.unwrap_or(dw), self.height.unwrap_or(dh))
        });
        match (self.size, self.orientation) {
            // Custom sizes are taken as given.
            (PageSize::Custom, _) => (w, h),
            (_, Orientation::Portrait) => (w, h),
            (_, Orientation::Landscape) => (h, w),
        }
    }
}

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportSettings {
    pub auto_fit: bool,
    pub initial_zoom: f64,
    pub center_content: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            auto_fit: false,
            initial_zoom: 1.0,
            center_content: false,
        }
    }
}

impl ViewportSettings {
    pub fn zoom(&self) -> f64 {
        clamp_zoom(self.initial_zoom)
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePosition {
    TopLeft,
    #[default]
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TitlePosition {
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleDisplay {
    pub show: bool,
    pub position: TitlePosition,
    pub font_size: u32,
    #[serde(alias = "fontStyle")]
    pub font_weight: FontWeight,
    pub color: String,
}

impl Default for TitleDisplay {
    fn default() -> Self {
        Self {
            show: false,
            position: TitlePosition::TopCenter,
            font_size: 24,
            font_weight: FontWeight::Bold,
            color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    pub include_read_only_fields: bool,
    pub include_group_zones: bool,
    pub title: String,
    pub show_field_types: bool,
    pub show_descriptions: bool,
    pub table_width: f64,
    pub field_height: f64,
    pub max_fields: usize,
    pub collapse_tables: bool,
    pub highlight_custom_fields: bool,
    pub custom_fields_only: bool,
    /// Merged over the entity-relation primary-key row style.
    pub primary_key_style: Option<Style>,
    /// Merged over the entity-relation foreign-key row style.
    pub foreign_key_style: Option<Style>,
    pub diagram_style: DiagramStyle,
    pub uml_options: UmlOptions,
    pub icon_base_url: String,
    pub metadata: Option<Metadata>,
    pub page_settings: Option<PageSettings>,
    pub viewport: Option<ViewportSettings>,
    pub title_display: Option<TitleDisplay>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            include_read_only_fields: true,
            include_group_zones: true,
            title: DEFAULT_TITLE.to_string(),
            show_field_types: true,
            show_descriptions: false,
            table_width: 200.0,
            field_height: 26.0,
            max_fields: 20,
            collapse_tables: true,
            highlight_custom_fields: false,
            custom_fields_only: false,
            primary_key_style: None,
            foreign_key_style: None,
            diagram_style: DiagramStyle::Erd,
            uml_options: UmlOptions::default(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            metadata: None,
            page_settings: None,
            viewport: None,
            title_display: None,
        }
    }
}

impl ConversionOptions {
    pub fn from_json(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(input)?)
    }
}
