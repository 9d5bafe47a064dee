//! Field rows of a table node: extraction, filtering, ordering and truncation.

use crate::board::{SchemaProperty, TableSchema};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayType {
    Fk,
    Enum,
    Date,
    DateTime,
    Email,
    Url,
    Text,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl DisplayType {
    pub fn of(prop: &SchemaProperty, is_foreign: bool) -> Self {
        if is_foreign {
            return Self::Fk;
        }
        if prop.enum_values.is_some() {
            return Self::Enum;
        }
        match prop.format.as_deref() {
            Some("date") => return Self::Date,
            Some("date-time") => return Self::DateTime,
            Some("email") => return Self::Email,
            Some("uri" | "url") => return Self::Url,
            _ => {}
        }
        match prop.kind.as_deref() {
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            _ => Self::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fk => "FK",
            Self::Enum => "Enum",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Email => "Email",
            Self::Url => "URL",
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Integer => "Integer",
            Self::Boolean => "Boolean",
            Self::Array => "Array",
            Self::Object => "Object",
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub display_type: DisplayType,
    pub is_primary: bool,
    pub is_foreign: bool,
    pub is_custom: bool,
    pub is_read_only: bool,
    pub referenced_table: Option<&'a str>,
    /// Description, falling back to the title.
    pub description: &'a str,
}

impl<'a> Field<'a> {
    pub fn new(name: &'a str, prop: &'a SchemaProperty) -> Self {
        let is_primary = name == "Id";
        let is_foreign = prop.x_target.is_some() || (name.ends_with("Id") && name != "Id");
        Self {
            name,
            display_type: DisplayType::of(prop, is_foreign),
            is_primary,
            is_foreign,
            is_custom: name.ends_with("__c"),
            is_read_only: prop.read_only,
            referenced_table: prop.x_target.as_deref(),
            description: prop
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .or(prop.title.as_deref())
                .unwrap_or(""),
        }
    }

    /// Type annotation shown next to the name: the referenced table for
    /// lookups, otherwise the display type.
    pub fn type_label(&self) -> &str {
        match (self.is_foreign, self.referenced_table) {
            (true, Some(table)) => table,
            _ => self.display_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFilter {
    pub include_read_only: bool,
    pub custom_only: bool,
}

impl Default for FieldFilter {
    fn default() -> Self {
        Self {
            include_read_only: true,
            custom_only: false,
        }
    }
}

impl FieldFilter {
    fn keeps(&self, field: &Field<'_>) -> bool {
        if !self.include_read_only && field.is_read_only && !field.is_primary && !field.is_foreign {
            return false;
        }
        if self.custom_only && !field.is_custom {
            return false;
        }
        true
    }
}

/// Surviving fields in declaration order.
pub fn extract_fields<'a>(schema: &'a TableSchema, filter: FieldFilter) -> Vec<Field<'a>> {
    schema
        .properties
        .iter()
        .map(|(name, prop)| Field::new(name, prop))
        .filter(|f| filter.keeps(f))
        .collect()
}

/// Primary key first, then lookups, then the rest; stable within each group.
pub fn order_fields(fields: &mut [Field<'_>]) {
    fields.sort_by_key(|f| (!f.is_primary, !f.is_foreign));
}

/// Fields to draw plus the count hidden behind the "more" row.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldList<'a> {
    pub visible: Vec<Field<'a>>,
    pub hidden: usize,
}

impl<'a> FieldList<'a> {
    pub fn truncate(mut fields: Vec<Field<'a>>, max: usize) -> Self {
        let hidden = fields.len().saturating_sub(max);
        fields.truncate(max);
        Self {
            visible: fields,
            hidden,
        }
    }

    pub fn total(&self) -> usize {
        self.visible.len() + self.hidden
    }

    pub fn has_more(&self) -> bool {
        self.hidden > 0
    }

    /// Row count including the "more" row.
    pub fn row_count(&self) -> usize {
        self.visible.len() + usize::from(self.has_more())
    }
}

pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}
