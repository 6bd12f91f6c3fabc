//! Emission of ordered fragments as drawing commands.

use nalgebra::Point2;

use super::{Scene, Viewport};
use crate::{DrawSurface, Shape};

impl Scene {
    /// Replays the draw order on `surface`, clipping to the viewport.
    /// Returns the number of commands issued.
    pub(crate) fn do_drawing(&self, surface: &mut dyn DrawSurface) -> usize {
        let viewport = &self.frame.viewport;
        let scale = self.config.line_scale;
        let mut commands = 0;

        for &idx in &self.draw_order {
            let Some(projected) = self.projected(idx) else {
                continue;
            };
            match self.fragments[idx].shape() {
                Shape::Polygon { surface: style, .. } => {
                    if style.fill.is_none() && style.edge.is_none() {
                        continue;
                    }
                    let clipped = clip_polygon(&projected.screen, viewport);
                    if clipped.len() < 3 {
                        continue;
                    }
                    surface.fill_path(&clipped, style.fill, style.edge.map(|e| e.scaled(scale)));
                    commands += 1;
                }
                Shape::Segment { line, .. } => {
                    let Some((from, to)) = clip_segment(projected.screen[0], projected.screen[1], viewport) else {
                        continue;
                    };
                    surface.stroke_line(from, to, line.scaled(scale));
                    commands += 1;
                }
                Shape::Marker { marker, .. } => {
                    let at = projected.screen[0];
                    if !viewport.contains(&at) {
                        continue;
                    }
                    surface.draw_marker(at, marker.scaled(scale));
                    commands += 1;
                }
            }
        }
        commands
    }
}

/// Clips a convex screen polygon to the viewport (Sutherland-Hodgman).
pub(crate) fn clip_polygon(points: &[Point2<f64>], viewport: &Viewport) -> Vec<Point2<f64>> {
    let (min, max) = (viewport.min(), viewport.max());
    // (axis, bound, keep values above the bound)
    let edges = [(0, min.x, true), (0, max.x, false), (1, min.y, true), (1, max.y, false)];

    let mut output = points.to_vec();
    for (axis, bound, above) in edges {
        if output.is_empty() {
            break;
        }
        let inside = |p: &Point2<f64>| if above { p[axis] >= bound } else { p[axis] <= bound };
        let input = std::mem::take(&mut output);
        let n = input.len();
        for i in 0..n {
            let current = input[i];
            let next = input[(i + 1) % n];
            let (current_in, next_in) = (inside(&current), inside(&next));
            if current_in {
                output.push(current);
            }
            if current_in != next_in {
                let t = (bound - current[axis]) / (next[axis] - current[axis]);
                let mut hit = current + (next - current) * t;
                // pin to the boundary against rounding
                hit[axis] = bound;
                output.push(hit);
            }
        }
    }
    output
}

/// Clips a screen segment to the viewport (Liang-Barsky).
pub(crate) fn clip_segment(
    from: Point2<f64>,
    to: Point2<f64>,
    viewport: &Viewport,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let (min, max) = (viewport.min(), viewport.max());
    let d = to - from;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-d.x, from.x - min.x),
        (d.x, max.x - from.x),
        (-d.y, from.y - min.y),
        (d.y, max.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((from + d * t0, from + d * t1))
}
