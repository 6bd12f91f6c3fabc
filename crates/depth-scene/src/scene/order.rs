//! Back-to-front ordering of live fragments.
//!
//! Painter's mode sorts by mean depth. BSP mode starts from that sort and
//! sweeps it front to back of the list: the fragment at the sweep position
//! is checked against every fragment drawn after it, and any fragment that
//! has to be drawn earlier is moved up or, if the pair interpenetrates,
//! both are split and the affected stretch of the list is re-sorted.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use nalgebra::{Point2, Vector3};
use tracing::{debug, trace, warn};

use super::intersect::{edge_crossing, outline_edges, point_in_footprint};
use super::{Projected, Relation, Scene};
use crate::{Camera, FragmentKind};

impl Scene {
    /// Painter's order: live fragments by mean depth, farthest first.
    pub(crate) fn sort_painters(&mut self) {
        let mut order: Vec<usize> = (0..self.fragments.len()).filter(|&i| self.live[i]).collect();
        order.sort_by(|&a, &b| self.depth_key_cmp(a, b));
        self.draw_order = order;
    }

    /// Orders by mean depth, farthest first, then by [`Scene::tie_break`].
    pub(crate) fn depth_key_cmp(&self, a: usize, b: usize) -> Ordering {
        let depth = |i: usize| self.projected(i).map_or(0.0, |p| p.depth);
        depth(b).total_cmp(&depth(a)).then_with(|| self.tie_break(a, b))
    }

    /// Deterministic order for fragments that are otherwise equal: lower
    /// original input position first, then lower arena index.
    pub(crate) fn tie_break(&self, a: usize, b: usize) -> Ordering {
        let (fa, fb) = (&self.fragments[a], &self.fragments[b]);
        fa.origin().cmp(&fb.origin()).then(a.cmp(&b))
    }

    /// Compares the depths of two overlapping fragments where they overlap
    /// on screen.
    ///
    /// Returns `Less` if `a` is farther away and must be drawn first,
    /// `Greater` if it is nearer. Depths are sampled at vertices lying
    /// inside the other footprint and at crossings of the outlines; the
    /// sample with the largest difference decides. When the samples do not
    /// separate the pair, the far depths, near depths and mean depths are
    /// compared in turn before falling back to [`Scene::tie_break`].
    pub fn fine_z_compare(&self, a: usize, b: usize) -> Ordering {
        let (Some(pa), Some(pb)) = (self.projected(a), self.projected(b)) else {
            return self.tie_break(a, b);
        };
        let eps = self.frame.eps;
        let (kind_a, kind_b) = (self.fragments[a].kind(), self.fragments[b].kind());

        let mut widest = 0.0_f64;
        for sample in sample_points(pa, pb, eps.screen) {
            let diff = depth_at(pa, kind_a, &sample) - depth_at(pb, kind_b, &sample);
            if diff.abs() > widest.abs() {
                widest = diff;
            }
        }
        if widest.abs() > eps.proj_depth {
            return if widest > 0.0 { Ordering::Less } else { Ordering::Greater };
        }

        far_first(pa.depth_max, pb.depth_max, eps.depth)
            .then_with(|| far_first(pa.depth_min, pb.depth_min, eps.depth))
            .then_with(|| far_first(pa.depth, pb.depth, eps.depth))
            .then_with(|| self.tie_break(a, b))
    }

    /// BSP order: the painter's sort, corrected pair by pair.
    pub(crate) fn order_bsp(&mut self, camera: &dyn Camera) {
        self.sort_painters();

        // pairs whose current order was accepted without a geometric proof
        let mut resolved: BTreeSet<(usize, usize)> = BTreeSet::new();
        // fragments moved up to the sweep position since it last advanced
        let mut moved: Vec<usize> = Vec::new();
        let mut pos = 0;
        let mut steps = 0usize;

        while pos < self.draw_order.len() {
            steps += 1;
            if steps > self.config.max_iterations {
                warn!(
                    limit = self.config.max_iterations,
                    remaining = self.draw_order.len() - pos,
                    "ordering step limit reached, keeping current order"
                );
                break;
            }

            let p = self.draw_order[pos];
            let Some((qpos, relation)) = self.find_obscured(pos, &resolved) else {
                pos += 1;
                moved.clear();
                continue;
            };
            let q = self.draw_order[qpos];

            if relation == Relation::Intersecting {
                if self.can_split(p, q) {
                    let (n1, n2) = self.split_pair(p, q, camera);
                    if n1 + n2 > 0 {
                        self.stats.splits += 1;
                        self.insert_fragments_into_draw_order(p, n1, q, n2);
                        moved.clear();
                        continue;
                    }
                }
                if self.fine_z_compare(p, q) != Ordering::Greater {
                    trace!(p, q, "unsplittable pair kept in place");
                    resolved.insert((p, q));
                    self.stats.unresolved += 1;
                    continue;
                }
            }

            if moved.contains(&q) {
                if self.break_cycle(p, q, &moved, camera) {
                    moved.clear();
                    continue;
                }
                debug!(p, q, "cyclic overlap left unresolved");
                resolved.insert((p, q));
                self.stats.unresolved += 1;
                continue;
            }

            trace!(p, q, "moved in front of the sweep position");
            self.draw_order.remove(qpos);
            self.draw_order.insert(pos, q);
            moved.push(q);
        }

        if self.stats.unresolved > 0 {
            warn!(
                unresolved = self.stats.unresolved,
                max_split_depth = self.config.max_split_depth,
                "some overlapping pairs were ordered by the fallback comparison"
            );
        }
    }

    /// First fragment after `pos` that must be drawn before the fragment at
    /// `pos`, with the relation that says so.
    fn find_obscured(&self, pos: usize, resolved: &BTreeSet<(usize, usize)>) -> Option<(usize, Relation)> {
        let p = self.draw_order[pos];
        self.draw_order[pos + 1..]
            .iter()
            .enumerate()
            .filter(|&(_, &q)| !resolved.contains(&(p, q)))
            .find_map(|(offset, &q)| match self.relation(p, q) {
                r @ (Relation::InFront | Relation::Intersecting) => Some((pos + 1 + offset, r)),
                Relation::Disjoint | Relation::Behind => None,
            })
    }

    /// Splits one member of a cyclic overlap by the plane of another.
    ///
    /// The cycle is `p`, `q` and the other fragments moved up to the sweep
    /// position. `p` and `q` are tried against each other first, then every
    /// member against every other. Returns false if no member that may
    /// still be split spans the plane of another member.
    fn break_cycle(&mut self, p: usize, q: usize, moved: &[usize], camera: &dyn Camera) -> bool {
        let mut cycle = vec![q, p];
        cycle.extend(moved.iter().copied().filter(|&m| m != p && m != q && self.live[m]));

        for &member in &cycle {
            if !self.can_cut(member) {
                continue;
            }
            for &cutter in &cycle {
                if cutter == member {
                    continue;
                }
                let pieces = self.split_by_plane_of(member, cutter, camera);
                if pieces == 0 {
                    continue;
                }
                trace!(p, q, member, cutter, "cycle broken by a plane split");
                self.stats.splits += 1;
                if member == p {
                    self.insert_fragments_into_draw_order(p, pieces, q, 0);
                } else {
                    self.insert_fragments_into_draw_order(p, 0, member, pieces);
                }
                return true;
            }
        }
        false
    }

    /// Replaces split fragments in the draw order by their pieces.
    ///
    /// The last `newnum1 + newnum2` arena entries must be the pieces of
    /// `idx1` followed by the pieces of `idx2`. A fragment with zero pieces
    /// stays where it is. The stretch of the draw order between the two
    /// fragments is re-sorted by depth together with the visible pieces.
    pub(crate) fn insert_fragments_into_draw_order(
        &mut self,
        idx1: usize,
        newnum1: usize,
        idx2: usize,
        newnum2: usize,
    ) {
        let first_piece = self.fragments.len() - (newnum1 + newnum2);
        let positions = [self.position_of(idx1), self.position_of(idx2)];
        let mut found = positions.into_iter().flatten();
        let range = match (found.next(), found.next()) {
            (Some(a), Some(b)) => a.min(b)..a.max(b) + 1,
            (Some(a), None) => a..a + 1,
            _ => self.draw_order.len()..self.draw_order.len(),
        };

        let mut region: Vec<usize> = self.draw_order[range.clone()]
            .iter()
            .copied()
            .filter(|&i| self.live[i])
            .collect();
        region.extend((first_piece..self.fragments.len()).filter(|&i| self.live[i]));
        region.sort_by(|&a, &b| self.depth_key_cmp(a, b));
        self.draw_order.splice(range, region);

        debug_assert!(self.is_valid_draw_order());
    }

    /// True if the draw order lists every live fragment exactly once and
    /// nothing else.
    pub fn is_valid_draw_order(&self) -> bool {
        let mut seen = vec![false; self.fragments.len()];
        for &i in &self.draw_order {
            if i >= self.fragments.len() || !self.live[i] || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        self.live.iter().filter(|&&live| live).count() == self.draw_order.len()
    }

    fn position_of(&self, idx: usize) -> Option<usize> {
        self.draw_order.iter().position(|&i| i == idx)
    }
}

/// `Less` if `a` is farther than `b` by more than `epsilon`.
fn far_first(a: f64, b: f64, epsilon: f64) -> Ordering {
    if a > b + epsilon {
        Ordering::Less
    } else if b > a + epsilon {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Screen points where both fragments are present.
fn sample_points(a: &Projected, b: &Projected, epsilon: f64) -> Vec<Point2<f64>> {
    let mut samples: Vec<Point2<f64>> = a
        .screen
        .iter()
        .filter(|p| point_in_footprint(p, &b.footprint, epsilon))
        .copied()
        .collect();
    samples.extend(
        b.screen
            .iter()
            .filter(|p| point_in_footprint(p, &a.footprint, epsilon)),
    );
    for edge_a in outline_edges(&a.footprint) {
        for edge_b in outline_edges(&b.footprint) {
            samples.extend(edge_crossing(edge_a, edge_b));
        }
    }
    samples
}

/// Projected depth of a fragment at screen point `p`.
fn depth_at(projected: &Projected, kind: FragmentKind, p: &Point2<f64>) -> f64 {
    let (screen, depth) = (&projected.screen, &projected.proj_depth);
    match kind {
        FragmentKind::Polygon => plane_depth(screen, depth, p),
        FragmentKind::Segment => {
            let ab = screen[1] - screen[0];
            let len2 = ab.norm_squared();
            let t = if len2 > 0.0 {
                ((p - screen[0]).dot(&ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            depth[0] + (depth[1] - depth[0]) * t
        }
        FragmentKind::Marker => depth[0],
    }
}

/// Depth of the plane through `(screen, depth)` at `p`. Falls back to the
/// mean depth for polygons seen edge-on.
fn plane_depth(screen: &[Point2<f64>], depth: &[f64], p: &Point2<f64>) -> f64 {
    let n = screen.len();
    let mut normal = Vector3::<f64>::zeros();
    let mut center = Vector3::zeros();
    for i in 0..n {
        let j = (i + 1) % n;
        let a = Vector3::new(screen[i].x, screen[i].y, depth[i]);
        let b = Vector3::new(screen[j].x, screen[j].y, depth[j]);
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
        center += a;
    }
    center /= n as f64;
    if normal.z.abs() <= 1e-12 * normal.norm() {
        return center.z;
    }
    center.z - (normal.x * (p.x - center.x) + normal.y * (p.y - center.y)) / normal.z
}
