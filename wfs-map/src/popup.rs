//! Popup content of loaded layers.
//!
//! A [`PopupFormatter`] is built once per layer from the layer's field schema and turns the
//! attributes of a clicked feature into an HTML table.

use std::fmt::Write;

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::config::PopupCopy;

/// Field names never shown in popups, compared case-insensitively.
pub const RESERVED_FIELDS: [&str; 3] = ["objectid", "fid", "shape"];

/// Type of a layer field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Text.
    String,
    /// Integer or floating point number.
    Number,
    /// Boolean.
    Boolean,
    /// Geometry column.
    Geometry,
    /// Object identifier.
    ObjectId,
    /// Nested values or only `null`s seen.
    Unknown,
}

/// A field of the layer schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldInfo {
    /// Creates a new instance.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Returns true for `objectid`, `fid` and `shape` in any letter case.
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
}

/// Names of the schema fields shown in popups, in schema order: everything except reserved names
/// and geometry-typed fields.
pub fn display_fields(schema: &[FieldInfo]) -> Vec<String> {
    schema
        .iter()
        .filter(|field| field.field_type != FieldType::Geometry && !is_reserved_field(&field.name))
        .map(|field| field.name.clone())
        .collect()
}

/// How an attribute value is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    /// The value is `null` or missing.
    NoValue,
    /// The value is an empty or whitespace-only string.
    Empty,
    /// Literal text of the value.
    Literal(String),
}

impl DisplayValue {
    /// Classifies an attribute value. `None` stands for a missing attribute.
    ///
    /// Zero and `false` are literals, not empty values.
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::NoValue,
            Some(Value::String(s)) if s.trim().is_empty() => Self::Empty,
            Some(Value::String(s)) => Self::Literal(s.clone()),
            Some(Value::Number(n)) => Self::Literal(number_text(n)),
            Some(other) => Self::Literal(other.to_string()),
        }
    }
}

/// Integral floats are shown without a fraction, so `1234.0` reads `1234`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e21 => {
            if v == 0.0 {
                "0".to_string()
            } else {
                format!("{v:.0}")
            }
        }
        _ => n.to_string(),
    }
}

/// One row of a popup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRow<'a> {
    /// Attribute name.
    pub field: &'a str,
    /// Value to show.
    pub value: DisplayValue,
    /// The attribute is a schema field. Attributes outside the schema are highlighted
    /// differently.
    pub in_schema: bool,
}

const SCHEMA_FIELD_COLOR: &str = "#0079c1";
const EXTRA_FIELD_COLOR: &str = "#d97706";

/// Renders feature attributes as popup markup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupFormatter {
    title: String,
    fields: Vec<String>,
    copy: PopupCopy,
}

impl PopupFormatter {
    /// Creates a formatter for the layer with the given title and schema.
    pub fn new(title: impl Into<String>, schema: &[FieldInfo], copy: PopupCopy) -> Self {
        Self {
            title: title.into(),
            fields: display_fields(schema),
            copy,
        }
    }

    /// Popup title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display fields in the order they are rendered.
    pub fn display_fields(&self) -> &[String] {
        &self.fields
    }

    /// Rows for the given attributes.
    ///
    /// Display fields present on the feature come first in schema order, followed by the
    /// feature's other attributes in their own order. Reserved names are never included, and
    /// display fields the feature does not have are skipped.
    pub fn rows<'a>(&'a self, attributes: &'a JsonObject) -> Vec<PopupRow<'a>> {
        let schema_rows = self.fields.iter().filter_map(|field| {
            attributes.get(field).map(|value| PopupRow {
                field: field.as_str(),
                value: DisplayValue::of(Some(value)),
                in_schema: true,
            })
        });

        let extra_rows = attributes
            .iter()
            .filter(|(key, _)| !self.fields.contains(key) && !is_reserved_field(key))
            .map(|(key, value)| PopupRow {
                field: key.as_str(),
                value: DisplayValue::of(Some(value)),
                in_schema: false,
            });

        schema_rows.chain(extra_rows).collect()
    }

    /// Renders the popup content for a feature.
    pub fn render(&self, attributes: &JsonObject) -> String {
        if attributes.is_empty() {
            return format!(
                r#"<p style="padding: 10px;">{}</p>"#,
                self.copy.no_attributes
            );
        }

        let mut html = String::from(
            r#"<div style="max-height: 400px; overflow-y: auto; font-family: Arial, sans-serif;">"#,
        );
        html.push_str(r#"<table style="width: 100%; border-collapse: collapse; font-size: 13px;">"#);

        for row in self.rows(attributes) {
            let color = if row.in_schema {
                SCHEMA_FIELD_COLOR
            } else {
                EXTRA_FIELD_COLOR
            };
            let value = match &row.value {
                DisplayValue::NoValue => format!(r#"<em style="color: #999;">{}</em>"#, self.copy.no_value),
                DisplayValue::Empty => format!(r#"<em style="color: #999;">{}</em>"#, self.copy.empty),
                DisplayValue::Literal(text) => text.clone(),
            };

            // Writing into a String cannot fail.
            let _ = write!(
                html,
                r#"<tr style="border-bottom: 1px solid #e0e0e0;"><td style="padding: 8px 10px; font-weight: 600; color: {color}; width: 40%; vertical-align: top;">{}</td><td style="padding: 8px 10px; color: #323232; vertical-align: top;">{value}</td></tr>"#,
                row.field
            );
        }

        html.push_str("</table></div>");
        html
    }

    /// Converts the formatter into a content function for the display engine.
    pub fn into_content_fn(self) -> impl Fn(&JsonObject) -> String + Send + Sync + 'static {
        move |attributes| self.render(attributes)
    }
}
