//! Polygonal areas and the location filters built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::bbox::BoundingBox;
use crate::crs::{CanonicalPoint, CrsCode};
use crate::error::{GeoError, GeoResult};
use crate::location::{Location, LOCATION_EPSILON};

/// A closed ring of locations sharing one CRS.
///
/// The ring is closed implicitly: the last vertex connects back to the first.
/// Self-intersecting rings are not detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Location>", into = "Vec<Location>")]
pub struct PolygonalArea {
    vertices: Vec<Location>,
    ring: Vec<(f64, f64)>,
    bbox: BoundingBox,
}

impl PolygonalArea {
    /// Build an area from its vertices, in clockwise or counter-clockwise order.
    ///
    /// A trailing vertex equal to the first is treated as an explicit closure
    /// and dropped.
    pub fn new(mut vertices: Vec<Location>) -> GeoResult<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        let Some(first) = vertices.first() else {
            return Err(GeoError::InvalidGeometry(
                "a polygon needs at least 3 distinct vertices, got 0".to_string(),
            ));
        };
        let crs = first.crs();

        if let Some(other) = vertices.iter().find(|v| v.crs() != crs) {
            return Err(GeoError::InvalidGeometry(format!(
                "all vertices must share one CRS, found {} and {}",
                crs,
                other.crs()
            )));
        }

        let mut distinct: Vec<&Location> = Vec::with_capacity(vertices.len());
        for vertex in &vertices {
            if !distinct.iter().any(|seen| *seen == vertex) {
                distinct.push(vertex);
            }
        }
        if distinct.len() < 3 {
            return Err(GeoError::InvalidGeometry(format!(
                "a polygon needs at least 3 distinct vertices, got {}",
                distinct.len()
            )));
        }

        let ring: Vec<(f64, f64)> = vertices.iter().map(|v| v.canonical().xy()).collect();
        let bbox = BoundingBox::from_points(ring.iter().copied()).ok_or_else(|| {
            GeoError::InvalidGeometry("polygon has no vertices".to_string())
        })?;

        Ok(Self { vertices, ring, bbox })
    }

    pub fn vertices(&self) -> &[Location] {
        &self.vertices
    }

    pub fn crs(&self) -> CrsCode {
        self.vertices[0].crs()
    }

    /// Bounding box of the ring in the canonical frame.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Check whether `location` lies inside the area or on its boundary.
    ///
    /// The test runs in the canonical frame, so the location may be declared
    /// in any CRS that shares a frame with the polygon's CRS. Geographic
    /// longitudes are shifted by whole turns into the ring's range first, so
    /// -180 and 180 name the same meridian here as in location equality.
    pub fn contains(&self, location: &Location) -> bool {
        let frame = self.vertices[0].canonical();
        let point = location.canonical();
        if !frame.same_frame(&point) {
            debug!(location = %location, crs = %self.crs(), "Location is in a different frame than the polygon");
            return false;
        }

        let (mut px, py) = point.xy();
        if matches!(point, CanonicalPoint::Geographic { .. }) {
            px = self.wrap_longitude(px);
        }
        if !self.bbox.contains_point_within(px, py, LOCATION_EPSILON) {
            return false;
        }

        let n = self.ring.len();
        let mut j = n - 1;
        for i in 0..n {
            if on_segment((px, py), self.ring[j], self.ring[i]) {
                return true;
            }
            j = i;
        }

        ray_cast((px, py), &self.ring)
    }

    fn wrap_longitude(&self, lon: f64) -> f64 {
        let (min, max) = (self.bbox.min_x - LOCATION_EPSILON, self.bbox.max_x + LOCATION_EPSILON);
        if lon >= min && lon <= max {
            return lon;
        }
        [lon - 360.0, lon + 360.0]
            .into_iter()
            .find(|shifted| *shifted >= min && *shifted <= max)
            .unwrap_or(lon)
    }
}

impl TryFrom<Vec<Location>> for PolygonalArea {
    type Error = GeoError;

    fn try_from(vertices: Vec<Location>) -> Result<Self, Self::Error> {
        PolygonalArea::new(vertices)
    }
}

impl From<PolygonalArea> for Vec<Location> {
    fn from(area: PolygonalArea) -> Self {
        area.vertices
    }
}

impl PartialEq for PolygonalArea {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
    }
}

impl fmt::Display for PolygonalArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "polygon of {} vertices in {}", self.vertices.len(), self.crs())
    }
}

/// Even-odd ray casting; the point is assumed not to lie on an edge.
fn ray_cast((px, py): (f64, f64), ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn on_segment((px, py): (f64, f64), (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> bool {
    let within_x = px >= ax.min(bx) - LOCATION_EPSILON && px <= ax.max(bx) + LOCATION_EPSILON;
    let within_y = py >= ay.min(by) - LOCATION_EPSILON && py <= ay.max(by) + LOCATION_EPSILON;
    if !within_x || !within_y {
        return false;
    }

    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    let length = (bx - ax).hypot(by - ay);
    if length == 0.0 {
        return (px - ax).hypot(py - ay) <= LOCATION_EPSILON;
    }
    cross.abs() / length <= LOCATION_EPSILON
}

/// The region a spatial model is allowed to serve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedArea {
    /// Any location inside (or on the boundary of) the polygon
    Polygon(PolygonalArea),
    /// Only these exact locations
    Locations(Vec<Location>),
}

impl AllowedArea {
    pub fn allows(&self, location: &Location) -> bool {
        match self {
            AllowedArea::Polygon(area) => area.contains(location),
            AllowedArea::Locations(allowed) => allowed.iter().any(|a| a == location),
        }
    }

    /// Filter style reported to callers ("polygon" or "points").
    pub fn filter_kind(&self) -> &'static str {
        match self {
            AllowedArea::Polygon(_) => "polygon",
            AllowedArea::Locations(_) => "points",
        }
    }
}

/// Locations a caller asks data for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationFilter {
    Point(Location),
    Points(Vec<Location>),
    Area(PolygonalArea),
}

impl LocationFilter {
    /// Every location the filter names; the vertices for an area.
    pub fn locations(&self) -> &[Location] {
        match self {
            LocationFilter::Point(location) => std::slice::from_ref(location),
            LocationFilter::Points(locations) => locations,
            LocationFilter::Area(area) => area.vertices(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.locations().is_empty()
    }

    /// Turn a single point into a one-element list; other variants are unchanged.
    pub fn normalized(self) -> Self {
        match self {
            LocationFilter::Point(location) => LocationFilter::Points(vec![location]),
            other => other,
        }
    }
}

impl From<Location> for LocationFilter {
    fn from(location: Location) -> Self {
        LocationFilter::Point(location)
    }
}

impl From<Vec<Location>> for LocationFilter {
    fn from(locations: Vec<Location>) -> Self {
        LocationFilter::Points(locations)
    }
}

impl From<PolygonalArea> for LocationFilter {
    fn from(area: PolygonalArea) -> Self {
        LocationFilter::Area(area)
    }
}
