//! The object graph collaborator: drawable objects that produce fragments.

use std::collections::BTreeMap;

use crate::{Fragment, ObjectId};

/// A node of the drawable object graph.
///
/// The scene walks the graph depth-first, asking every node for its own
/// fragments before visiting its children.
pub trait SceneObject {
    /// Human readable name used by diagnostics.
    fn name(&self) -> &str;

    /// Identifier stamped on every fragment this object produces.
    fn id(&self) -> ObjectId;

    /// Appends this object's own fragments (world space) to `out`.
    fn collect_fragments(&self, out: &mut Vec<Fragment>);

    /// Child objects.
    fn children(&self) -> &[Box<dyn SceneObject>] {
        &[]
    }
}

/// Walks `root` depth-first and collects every fragment, tagged with the id
/// of the object that produced it.
pub fn collect_all(root: &dyn SceneObject, out: &mut Vec<Fragment>) {
    let start = out.len();
    root.collect_fragments(out);
    let id = root.id();
    for fragment in &mut out[start..] {
        fragment.set_object(id);
    }
    for child in root.children() {
        collect_all(child.as_ref(), out);
    }
}

/// Records the name of every object under `root` by id. The first object
/// walked wins when ids repeat.
pub(crate) fn collect_names(root: &dyn SceneObject, out: &mut BTreeMap<ObjectId, String>) {
    out.entry(root.id()).or_insert_with(|| root.name().to_owned());
    for child in root.children() {
        collect_names(child.as_ref(), out);
    }
}

/// A group of child objects with no geometry of its own.
pub struct ObjectGroup {
    name: String,
    id: ObjectId,
    children: Vec<Box<dyn SceneObject>>,
}

impl ObjectGroup {
    pub fn new(name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            id,
            children: Vec::new(),
        }
    }

    /// Adds a child object.
    pub fn push(&mut self, child: impl SceneObject + 'static) {
        self.children.push(Box::new(child));
    }

    /// Builder form of [`ObjectGroup::push`].
    pub fn with_child(mut self, child: impl SceneObject + 'static) -> Self {
        self.push(child);
        self
    }
}

impl SceneObject for ObjectGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn collect_fragments(&self, _out: &mut Vec<Fragment>) {}

    fn children(&self) -> &[Box<dyn SceneObject>] {
        &self.children
    }
}

/// A leaf object holding already tessellated fragments.
#[derive(Debug, Clone)]
pub struct FragmentList {
    name: String,
    id: ObjectId,
    fragments: Vec<Fragment>,
}

impl FragmentList {
    pub fn new(name: impl Into<String>, id: ObjectId, fragments: Vec<Fragment>) -> Self {
        Self {
            name: name.into(),
            id,
            fragments,
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

impl SceneObject for FragmentList {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn collect_fragments(&self, out: &mut Vec<Fragment>) {
        out.extend(self.fragments.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, MarkerShape, MarkerStyle};
    use nalgebra::Point3;

    fn make_marker(x: f64) -> Fragment {
        Fragment::marker(
            Point3::new(x, 0.0, 0.0),
            MarkerStyle::new(MarkerShape::Circle, 2.0, Color::BLACK),
        )
    }

    #[test]
    fn collect_all_tags_fragments_with_owner() {
        let root = ObjectGroup::new("root", ObjectId(0))
            .with_child(FragmentList::new("a", ObjectId(1), vec![make_marker(0.0)]))
            .with_child(
                ObjectGroup::new("inner", ObjectId(2)).with_child(FragmentList::new(
                    "b",
                    ObjectId(3),
                    vec![make_marker(1.0), make_marker(2.0)],
                )),
            );

        let mut out = Vec::new();
        collect_all(&root, &mut out);

        let owners: Vec<ObjectId> = out.iter().map(|f| f.object()).collect();
        assert_eq!(owners, vec![ObjectId(1), ObjectId(3), ObjectId(3)]);
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn names_are_recorded_per_id() {
        let root = ObjectGroup::new("root", ObjectId(0))
            .with_child(FragmentList::new("a", ObjectId(1), vec![make_marker(0.0)]))
            .with_child(FragmentList::new("again", ObjectId(1), Vec::new()));

        let mut names = BTreeMap::new();
        collect_names(&root, &mut names);

        assert_eq!(names.len(), 2);
        assert_eq!(names[&ObjectId(0)], "root");
        assert_eq!(names[&ObjectId(1)], "a");
    }

    #[test]
    fn empty_group_yields_nothing() {
        let mut out = Vec::new();
        collect_all(&ObjectGroup::new("empty", ObjectId(9)), &mut out);
        assert!(out.is_empty());
    }
}
