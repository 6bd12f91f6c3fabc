//! Diagnostic listings of the last render.

use std::collections::BTreeMap;
use std::fmt::Write;

use tracing::trace;

use super::Scene;
use crate::ObjectId;

impl Scene {
    /// Lists every arena slot of the last render: liveness, kind, owner,
    /// lineage, depth range and screen points.
    pub fn dump_fragments(&self) -> String {
        let mut out = String::new();
        for (idx, fragment) in self.fragments.iter().enumerate() {
            let mut line = format!(
                "#{idx} {} {} {} split={} origin={}",
                if self.live[idx] { "live" } else { "dead" },
                fragment.kind(),
                fragment.object(),
                fragment.split_depth(),
                fragment.origin(),
            );
            match self.projected(idx) {
                Some(p) => {
                    let _ = write!(line, " depth=[{:.4}, {:.4}] screen=", p.depth_min, p.depth_max);
                    let points: Vec<String> = p.screen.iter().map(|s| format!("({:.2}, {:.2})", s.x, s.y)).collect();
                    line.push_str(&points.join(" "));
                }
                None => line.push_str(" not projected"),
            }
            trace!("{line}");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Summarises the last render per object: name, live and total
    /// fragment counts and the draw positions of its live fragments.
    /// Names are only known when the scene was rendered from an object
    /// graph.
    pub fn dump_objects(&self) -> String {
        #[derive(Default)]
        struct Entry {
            live: usize,
            total: usize,
            positions: Vec<usize>,
        }

        let mut objects: BTreeMap<ObjectId, Entry> = BTreeMap::new();
        for (idx, fragment) in self.fragments.iter().enumerate() {
            let entry = objects.entry(fragment.object()).or_default();
            entry.total += 1;
            if self.live[idx] {
                entry.live += 1;
            }
        }
        for (pos, &idx) in self.draw_order.iter().enumerate() {
            if let Some(entry) = objects.get_mut(&self.fragments[idx].object()) {
                entry.positions.push(pos);
            }
        }

        let mut out = String::new();
        for (object, entry) in &objects {
            let mut line = object.to_string();
            if let Some(name) = self.names.get(object) {
                let _ = write!(line, " {name:?}");
            }
            let _ = write!(
                line,
                ": live={} total={} positions={:?}",
                entry.live, entry.total, entry.positions
            );
            trace!("{line}");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};

    use crate::{
        Color, CommandRecorder, Fragment, FragmentList, ObjectGroup, ObjectId, OrthographicCamera,
        Polygon, RenderMode, Scene, SurfaceStyle, Viewport,
    };

    fn make_quad(x0: f64, depth: f64) -> Fragment {
        Fragment::polygon(
            Polygon::quad(
                Point3::new(x0, 0.0, -depth),
                Point3::new(x0 + 1.0, 0.0, -depth),
                Point3::new(x0 + 1.0, 1.0, -depth),
                Point3::new(x0, 1.0, -depth),
            ),
            SurfaceStyle::filled(Color::WHITE),
        )
    }

    fn rendered() -> Scene {
        let root = ObjectGroup::new("root", ObjectId(0))
            .with_child(FragmentList::new("near", ObjectId(1), vec![make_quad(0.0, 2.0)]))
            .with_child(FragmentList::new(
                "far",
                ObjectId(2),
                vec![make_quad(0.5, 6.0), make_quad(50.0, 6.0)],
            ));
        let camera = OrthographicCamera::look_at(
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::y(),
            10.0,
            1.0,
            0.5,
            100.0,
        );
        let mut scene = Scene::new(RenderMode::Painters);
        let mut surface = CommandRecorder::new();
        scene.render(&root, &mut surface, &camera, 0.0, 0.0, 200.0, 200.0);
        assert_eq!(scene.stats().clipped, 1);
        scene
    }

    #[test]
    fn fragment_dump_lists_every_slot() {
        let dump = rendered().dump_fragments();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#0 live polygon obj#1"));
        assert!(lines[2].starts_with("#2 dead polygon obj#2"));
        assert!(lines[2].ends_with("not projected"));
    }

    #[test]
    fn object_dump_groups_by_owner() {
        let dump = rendered().dump_objects();
        assert_eq!(
            dump,
            "obj#1 \"near\": live=1 total=1 positions=[1]\nobj#2 \"far\": live=1 total=2 positions=[0]\n"
        );
    }

    #[test]
    fn object_dump_without_graph_has_no_names() {
        let mut scene = rendered();
        let mut surface = CommandRecorder::new();
        let camera = OrthographicCamera::look_at(
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::y(),
            10.0,
            1.0,
            0.5,
            100.0,
        );
        scene.render_fragments(
            vec![make_quad(0.0, 3.0)],
            &mut surface,
            &camera,
            Viewport::new(0.0, 0.0, 200.0, 200.0),
        );
        assert_eq!(scene.dump_objects(), "obj#0: live=1 total=1 positions=[0]\n");
    }
}
