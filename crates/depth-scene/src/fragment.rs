//! Drawable fragments: the flat primitives the scene orders and emits.

use std::fmt;

use nalgebra::Point3;

use crate::{Polygon, Segment};

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Stroke properties for segments and polygon edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    /// Width before the scene's line scale is applied.
    pub width: f64,
}

impl LineStyle {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }

    /// Returns a copy with the width multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            color: self.color,
            width: self.width * scale,
        }
    }
}

/// Fill and outline of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceStyle {
    pub fill: Option<Color>,
    pub edge: Option<LineStyle>,
}

impl SurfaceStyle {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            edge: None,
        }
    }

    pub fn with_edge(mut self, edge: LineStyle) -> Self {
        self.edge = Some(edge);
        self
    }
}

/// Shape drawn for point markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Cross,
}

/// Appearance of a point marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    /// Marker extent in screen units before the line scale is applied.
    pub size: f64,
    pub fill: Option<Color>,
    pub edge: Option<LineStyle>,
}

impl MarkerStyle {
    pub fn new(shape: MarkerShape, size: f64, fill: Color) -> Self {
        Self {
            shape,
            size,
            fill: Some(fill),
            edge: None,
        }
    }

    /// Returns a copy with size and edge width multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            size: self.size * scale,
            edge: self.edge.map(|e| e.scaled(scale)),
            ..*self
        }
    }
}

/// Identifies the drawable object a fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Geometry kind of a fragment, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Polygon,
    Segment,
    Marker,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FragmentKind::Polygon => "polygon",
            FragmentKind::Segment => "segment",
            FragmentKind::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Geometry and style of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon {
        polygon: Polygon,
        surface: SurfaceStyle,
    },
    Segment {
        segment: Segment,
        line: LineStyle,
    },
    Marker {
        position: Point3<f64>,
        marker: MarkerStyle,
    },
}

/// A flat primitive produced by tessellating a scene object.
///
/// Fragments live in the scene's arena and are referred to by index. Split
/// pieces keep the object and origin of the fragment they were cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    shape: Shape,
    object: ObjectId,
    split_depth: u32,
    origin: usize,
}

impl Fragment {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            object: ObjectId::default(),
            split_depth: 0,
            origin: 0,
        }
    }

    pub fn polygon(polygon: Polygon, surface: SurfaceStyle) -> Self {
        Self::new(Shape::Polygon { polygon, surface })
    }

    pub fn segment(segment: Segment, line: LineStyle) -> Self {
        Self::new(Shape::Segment { segment, line })
    }

    pub fn marker(position: Point3<f64>, marker: MarkerStyle) -> Self {
        Self::new(Shape::Marker { position, marker })
    }

    /// Tags the fragment with the object that produced it.
    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = object;
        self
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> FragmentKind {
        match self.shape {
            Shape::Polygon { .. } => FragmentKind::Polygon,
            Shape::Segment { .. } => FragmentKind::Segment,
            Shape::Marker { .. } => FragmentKind::Marker,
        }
    }

    #[inline]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Number of splits between this fragment and its original.
    #[inline]
    pub fn split_depth(&self) -> u32 {
        self.split_depth
    }

    /// Arena index of the original, unsplit fragment.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    pub(crate) fn set_object(&mut self, object: ObjectId) {
        self.object = object;
    }

    pub(crate) fn set_origin(&mut self, origin: usize) {
        self.origin = origin;
    }

    /// The geometric vertices: polygon corners, both segment ends, or the
    /// single marker position.
    pub fn vertices(&self) -> &[Point3<f64>] {
        match &self.shape {
            Shape::Polygon { polygon, .. } => polygon.vertices(),
            Shape::Segment { segment, .. } => segment.points(),
            Shape::Marker { position, .. } => std::slice::from_ref(position),
        }
    }

    /// The polygon geometry, if this is a polygon fragment.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match &self.shape {
            Shape::Polygon { polygon, .. } => Some(polygon),
            _ => None,
        }
    }

    /// The segment geometry, if this is a segment fragment.
    pub fn as_segment(&self) -> Option<&Segment> {
        match &self.shape {
            Shape::Segment { segment, .. } => Some(segment),
            _ => None,
        }
    }

    /// Returns the same fragment with every vertex mapped through `f`.
    pub fn map_vertices(&self, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> Self {
        let shape = match &self.shape {
            Shape::Polygon { polygon, surface } => Shape::Polygon {
                polygon: polygon.map_vertices(f),
                surface: *surface,
            },
            Shape::Segment { segment, line } => Shape::Segment {
                segment: segment.map_points(f),
                line: *line,
            },
            Shape::Marker { position, marker } => Shape::Marker {
                position: f(position),
                marker: *marker,
            },
        };
        Self { shape, ..*self }
    }

    /// Builds a piece of this fragment with new polygon geometry.
    pub(crate) fn child_polygon(&self, polygon: Polygon) -> Self {
        let Shape::Polygon { surface, .. } = &self.shape else {
            unreachable!("child_polygon called on a {} fragment", self.kind());
        };
        self.child(Shape::Polygon {
            polygon,
            surface: *surface,
        })
    }

    /// Builds a piece of this fragment with new segment geometry.
    pub(crate) fn child_segment(&self, segment: Segment) -> Self {
        let Shape::Segment { line, .. } = &self.shape else {
            unreachable!("child_segment called on a {} fragment", self.kind());
        };
        self.child(Shape::Segment {
            segment,
            line: *line,
        })
    }

    /// Copies object, lineage and origin from `from`.
    pub(crate) fn inherit(mut self, from: &Fragment) -> Self {
        self.object = from.object;
        self.split_depth = from.split_depth;
        self.origin = from.origin;
        self
    }

    fn child(&self, shape: Shape) -> Self {
        Self {
            shape,
            object: self.object,
            split_depth: self.split_depth + 1,
            origin: self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_triangle() -> Fragment {
        Fragment::polygon(
            Polygon::triangle(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ),
            SurfaceStyle::filled(Color::rgb(200, 10, 10)),
        )
        .with_object(ObjectId(7))
    }

    #[test]
    fn vertices_per_kind() {
        assert_eq!(make_triangle().vertices().len(), 3);

        let seg = Fragment::segment(
            Segment::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            LineStyle::new(Color::BLACK, 1.0),
        );
        assert_eq!(seg.kind(), FragmentKind::Segment);
        assert_eq!(seg.vertices().len(), 2);

        let marker = Fragment::marker(
            Point3::new(1.0, 2.0, 3.0),
            MarkerStyle::new(MarkerShape::Square, 4.0, Color::WHITE),
        );
        assert_eq!(marker.vertices(), &[Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn child_inherits_style_and_lineage() {
        let mut parent = make_triangle();
        parent.set_origin(3);
        let piece = Polygon::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 0.5, 0.0),
        );
        let child = parent.child_polygon(piece.clone());

        assert_eq!(child.as_polygon(), Some(&piece));
        assert_eq!(child.object(), ObjectId(7));
        assert_eq!(child.origin(), 3);
        assert_eq!(child.split_depth(), 1);
        assert_eq!(child.child_polygon(piece).split_depth(), 2);
    }

    #[test]
    fn map_vertices_keeps_metadata() {
        let moved = make_triangle().map_vertices(|p| p + nalgebra::Vector3::new(0.0, 0.0, -5.0));
        assert!(moved.vertices().iter().all(|v| v.z == -5.0));
        assert_eq!(moved.object(), ObjectId(7));
    }

    #[test]
    fn marker_scaling() {
        let style = MarkerStyle::new(MarkerShape::Circle, 3.0, Color::BLACK);
        assert_eq!(style.scaled(2.0).size, 6.0);
        assert_eq!(LineStyle::new(Color::BLACK, 0.5).scaled(4.0).width, 2.0);
    }
}
