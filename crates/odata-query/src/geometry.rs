//! Search-area normalization for spatial filters.
//!
//! A search area can arrive as a ready polygon ring, a raw coordinate
//! matrix, two tabular coordinate columns, or a WKT string. Every shape is
//! converted into one closed (lat, lon) ring and run through a single
//! validity check. Anything that fails conversion or validity is replaced
//! by the whole-world polygon so the search still runs, with a warning for
//! observability.

use tracing::warn;

/// Corner points of the whole-world fallback polygon, as (lat, lon).
const WORLD_EXTENT: [(f64, f64); 4] = [
    (-90.0, -180.0),
    (-90.0, 180.0),
    (90.0, 180.0),
    (90.0, -180.0),
];

/// The accepted shapes for a search area.
///
/// Coordinates are (lat, lon) pairs and render in that order in WKT.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaOfInterest {
    /// A recognized polygon: a vertex ring, closed or with implicit closure.
    Polygon(Vec<(f64, f64)>),
    /// A raw coordinate matrix, to be closed into a ring.
    Matrix(Vec<(f64, f64)>),
    /// Two-column tabular coordinates.
    Table { lats: Vec<f64>, lons: Vec<f64> },
    /// A WKT POLYGON string.
    Wkt(String),
}

/// Normalize any accepted area shape into an encoded WKT polygon.
///
/// The output is WKT text with every space replaced by `%20` and nothing
/// else encoded. Inputs that cannot be converted into a single valid ring
/// fall back to the whole-world polygon.
pub fn normalize_polygon(area: &AreaOfInterest) -> String {
    let ring = match to_ring(area) {
        Some(ring) if ring_is_valid(&ring) => ring,
        _ => {
            warn!(
                area = ?area,
                "search area is not a single valid polygon, substituting whole-world extent"
            );
            world_ring()
        }
    };

    encode_wkt(&ring)
}

/// Convert one input shape into a closed ring, if possible.
fn to_ring(area: &AreaOfInterest) -> Option<Vec<(f64, f64)>> {
    match area {
        AreaOfInterest::Polygon(vertices) => close_ring(vertices.clone()),
        AreaOfInterest::Matrix(points) => close_ring(points.clone()),
        AreaOfInterest::Table { lats, lons } => {
            if lats.len() != lons.len() {
                return None;
            }
            let points = lats.iter().zip(lons).map(|(la, lo)| (*la, *lo)).collect();
            close_ring(points)
        }
        AreaOfInterest::Wkt(text) => parse_wkt_polygon(text),
    }
}

/// Close a point sequence back to its start, if it is not closed already.
fn close_ring(mut points: Vec<(f64, f64)>) -> Option<Vec<(f64, f64)>> {
    let first = *points.first()?;
    if points.last() != Some(&first) {
        points.push(first);
    }
    Some(points)
}

/// Combined validity check shared by every input shape.
///
/// A ring passes when it is closed, has at least four points including the
/// closure, carries only finite coordinates, and no two non-adjacent edges
/// cross.
fn ring_is_valid(ring: &[(f64, f64)]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    if ring.first() != ring.last() {
        return false;
    }
    if ring.iter().any(|(lat, lon)| !lat.is_finite() || !lon.is_finite()) {
        return false;
    }
    !ring_self_intersects(ring)
}

/// Parse a WKT POLYGON with a single ring.
///
/// Interior rings, other geometry kinds, and malformed coordinate pairs
/// all yield `None`.
fn parse_wkt_polygon(text: &str) -> Option<Vec<(f64, f64)>> {
    let text = text.trim();
    if !text.to_uppercase().starts_with("POLYGON") {
        return None;
    }

    let start = text.find("((")?;
    let end = text.rfind("))")?;
    if end <= start {
        return None;
    }

    let inner = text[start + 2..end].trim();
    if inner.contains('(') || inner.contains(')') {
        // more than one ring
        return None;
    }

    let mut points = Vec::new();
    for pair in inner.split(',') {
        let parts: Vec<&str> = pair.split_whitespace().collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        points.push((lat, lon));
    }

    close_ring(points)
}

fn world_ring() -> Vec<(f64, f64)> {
    let mut ring = WORLD_EXTENT.to_vec();
    ring.push(WORLD_EXTENT[0]);
    ring
}

/// Render a closed ring as WKT with spaces encoded for the wire.
fn encode_wkt(ring: &[(f64, f64)]) -> String {
    let body = ring
        .iter()
        .map(|(lat, lon)| format!("{} {}", lat, lon))
        .collect::<Vec<_>>()
        .join(", ");

    format!("POLYGON (({}))", body).replace(' ', "%20")
}

/// Check whether any two non-adjacent edges of a closed ring cross.
fn ring_self_intersects(ring: &[(f64, f64)]) -> bool {
    let edges = ring.len() - 1;
    for i in 0..edges {
        for j in (i + 2)..edges {
            // the closing edge is adjacent to the first edge
            if i == 0 && j == edges - 1 {
                continue;
            }
            if segments_cross(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return true;
            }
        }
    }
    false
}

/// Proper crossing test between segments a-b and c-d.
fn segments_cross(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);

    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECTANGLE_WKT: &str =
        "POLYGON%20((-10%20-10,%2010%20-10,%2010%2010,%20-10%2010,%20-10%20-10))";
    const WORLD_WKT: &str =
        "POLYGON%20((-90%20-180,%20-90%20180,%2090%20180,%2090%20-180,%20-90%20-180))";

    fn rectangle() -> Vec<(f64, f64)> {
        vec![
            (-10.0, -10.0),
            (10.0, -10.0),
            (10.0, 10.0),
            (-10.0, 10.0),
            (-10.0, -10.0),
        ]
    }

    #[test]
    fn test_closed_polygon_passes_through() {
        let area = AreaOfInterest::Polygon(rectangle());
        assert_eq!(normalize_polygon(&area), RECTANGLE_WKT);
    }

    #[test]
    fn test_unclosed_matrix_is_closed() {
        let area = AreaOfInterest::Matrix(vec![
            (-10.0, -10.0),
            (10.0, -10.0),
            (10.0, 10.0),
            (-10.0, 10.0),
        ]);
        assert_eq!(normalize_polygon(&area), RECTANGLE_WKT);
    }

    #[test]
    fn test_table_converts_to_ring() {
        let area = AreaOfInterest::Table {
            lats: vec![-10.0, 10.0, 10.0, -10.0],
            lons: vec![-10.0, -10.0, 10.0, 10.0],
        };
        assert_eq!(normalize_polygon(&area), RECTANGLE_WKT);
    }

    #[test]
    fn test_wkt_round_trip() {
        let area =
            AreaOfInterest::Wkt("POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10))".to_string());
        assert_eq!(normalize_polygon(&area), RECTANGLE_WKT);
    }

    #[test]
    fn test_unclosed_wkt_is_closed() {
        let area = AreaOfInterest::Wkt("POLYGON ((-10 -10, 10 -10, 10 10, -10 10))".to_string());
        assert_eq!(normalize_polygon(&area), RECTANGLE_WKT);
    }

    #[test]
    fn test_self_intersecting_ring_falls_back() {
        // bow tie
        let area = AreaOfInterest::Polygon(vec![
            (-10.0, -10.0),
            (10.0, 10.0),
            (10.0, -10.0),
            (-10.0, 10.0),
            (-10.0, -10.0),
        ]);
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_non_polygon_wkt_falls_back() {
        let area = AreaOfInterest::Wkt("POINT (10 20)".to_string());
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_multipolygon_falls_back() {
        let area = AreaOfInterest::Wkt(
            "MULTIPOLYGON (((-10 -10, 10 -10, 10 10, -10 -10)))".to_string(),
        );
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_polygon_with_hole_falls_back() {
        let area = AreaOfInterest::Wkt(
            "POLYGON ((-10 -10, 10 -10, 10 10, -10 10, -10 -10), (-1 -1, 1 -1, 1 1, -1 -1))"
                .to_string(),
        );
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_garbage_wkt_falls_back() {
        let area = AreaOfInterest::Wkt("POLYGON ((this is, not numeric))".to_string());
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_mismatched_table_columns_fall_back() {
        let area = AreaOfInterest::Table {
            lats: vec![-10.0, 10.0, 10.0],
            lons: vec![-10.0, -10.0],
        };
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_too_few_points_fall_back() {
        let area = AreaOfInterest::Matrix(vec![(-10.0, -10.0), (10.0, 10.0)]);
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_empty_matrix_falls_back() {
        let area = AreaOfInterest::Matrix(Vec::new());
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_non_finite_coordinate_falls_back() {
        let area = AreaOfInterest::Matrix(vec![
            (-10.0, -10.0),
            (10.0, f64::NAN),
            (10.0, 10.0),
            (-10.0, 10.0),
        ]);
        assert_eq!(normalize_polygon(&area), WORLD_WKT);
    }

    #[test]
    fn test_fractional_coordinates_render_plainly() {
        let area = AreaOfInterest::Matrix(vec![
            (-10.5, -10.25),
            (10.5, -10.25),
            (10.5, 10.25),
            (-10.5, 10.25),
        ]);
        assert_eq!(
            normalize_polygon(&area),
            "POLYGON%20((-10.5%20-10.25,%2010.5%20-10.25,%2010.5%2010.25,%20-10.5%2010.25,%20-10.5%20-10.25))"
        );
    }
}
