use geojson::FeatureCollection;
use serde_json::Value;

use crate::popup::{FieldInfo, FieldType};

fn value_type(name: &str, value: &Value) -> FieldType {
    if name.eq_ignore_ascii_case("objectid") {
        return FieldType::ObjectId;
    }

    match value {
        Value::String(_) => FieldType::String,
        Value::Number(_) => FieldType::Number,
        Value::Bool(_) => FieldType::Boolean,
        Value::Object(o) if o.contains_key("type") && o.contains_key("coordinates") => {
            FieldType::Geometry
        }
        Value::Null | Value::Array(_) | Value::Object(_) => FieldType::Unknown,
    }
}

/// Field schema of a feature collection: every property name in the order it is first
/// encountered. The type comes from the first non-null value of the field.
pub fn infer_schema(collection: &FeatureCollection) -> Vec<FieldInfo> {
    let mut fields: Vec<FieldInfo> = Vec::new();
    let properties = collection
        .features
        .iter()
        .filter_map(|feature| feature.properties.as_ref());

    for props in properties {
        for (name, value) in props {
            let field_type = value_type(name, value);
            match fields.iter_mut().find(|field| &field.name == name) {
                Some(field) if field.field_type == FieldType::Unknown => {
                    field.field_type = field_type;
                }
                Some(_) => {}
                None => fields.push(FieldInfo::new(name.clone(), field_type)),
            }
        }
    }

    fields
}
