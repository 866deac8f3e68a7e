//! Bounding extents of GeoJSON geometries.

use geojson::{FeatureCollection, Geometry, Position, Value};

use crate::error::WfsMapTypesError;
use crate::rect::Rect;

/// `(x, y)` of a GeoJSON position. Positions with fewer than 2 dimensions are rejected, extra
/// dimensions are ignored.
pub fn position_xy(position: &Position) -> Result<(f64, f64), WfsMapTypesError> {
    match position.as_slice() {
        [x, y, ..] => Ok((*x, *y)),
        _ => Err(WfsMapTypesError::Conversion(
            "point must contain at least 2 dimensions".to_string(),
        )),
    }
}

fn positions_extent<'a>(
    positions: impl IntoIterator<Item = &'a Position>,
) -> Result<Option<Rect>, WfsMapTypesError> {
    let points = positions
        .into_iter()
        .map(position_xy)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rect::from_points(points))
}

fn merge_extents(
    extents: impl IntoIterator<Item = Result<Option<Rect>, WfsMapTypesError>>,
) -> Result<Option<Rect>, WfsMapTypesError> {
    let mut merged: Option<Rect> = None;
    for extent in extents {
        if let Some(extent) = extent? {
            merged = Some(match merged {
                Some(current) => current.merge(extent),
                None => extent,
            });
        }
    }

    Ok(merged)
}

/// Bounding rectangle of all coordinates of the geometry, including every member of
/// multi-geometries and geometry collections. Empty geometries have no extent.
pub fn geometry_extent(geometry: &Geometry) -> Result<Option<Rect>, WfsMapTypesError> {
    match &geometry.value {
        Value::Point(p) => positions_extent([p]),
        Value::MultiPoint(points) => positions_extent(points),
        Value::LineString(line) => positions_extent(line),
        Value::MultiLineString(lines) => positions_extent(lines.iter().flatten()),
        Value::Polygon(polygon) => positions_extent(polygon.iter().flatten()),
        Value::MultiPolygon(polygons) => {
            positions_extent(polygons.iter().flatten().flatten())
        }
        Value::GeometryCollection(geometries) => {
            merge_extents(geometries.iter().map(geometry_extent))
        }
    }
}

/// Bounding rectangle of every feature geometry in the collection. Features without geometry are
/// skipped; a collection with no coordinates has no extent.
pub fn feature_collection_extent(
    collection: &FeatureCollection,
) -> Result<Option<Rect>, WfsMapTypesError> {
    merge_extents(
        collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .map(geometry_extent),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(json: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn extent_of_points() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-72.60, -38.70]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-72.50, -38.75]}, "properties": {}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }));

        let extent = feature_collection_extent(&fc).unwrap().unwrap();
        assert_eq!(extent, Rect::new(-72.60, -38.75, -72.50, -38.70));
    }

    #[test]
    fn extent_of_nested_geometries() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "LineString", "coordinates": [[2.0, -1.0], [3.0, 0.5]]},
                        {"type": "MultiPoint", "coordinates": []}
                    ]
                }}
            ]
        }));

        let extent = feature_collection_extent(&fc).unwrap().unwrap();
        assert_eq!(extent, Rect::new(0.0, -1.0, 3.0, 1.0));
    }

    #[test]
    fn empty_collection_has_no_extent() {
        let fc = collection(serde_json::json!({"type": "FeatureCollection", "features": []}));
        assert!(feature_collection_extent(&fc).unwrap().is_none());
    }

    #[test]
    fn one_dimensional_position_is_rejected() {
        assert!(position_xy(&vec![1.0]).is_err());
        assert_eq!(position_xy(&vec![1.0, 2.0, 3.0]).unwrap(), (1.0, 2.0));
    }
}
