//! The shell's document: a set of named shapes.

use std::collections::BTreeMap;
use std::fmt;

use rewind_core::edits::{PointList, Property};
use rewind_core::{Editable, Handle};

pub type Point = (f32, f32);

/// A shape with a position, an opacity and an outline of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub position: Point,
    pub opacity: f32,
    pub points: Vec<Point>,
    /// Completed batch updates.
    pub revision: u64,
    updating: bool,
}

impl Shape {
    pub fn new() -> Self {
        Self {
            position: (0.0, 0.0),
            opacity: 1.0,
            points: Vec::new(),
            revision: 0,
            updating: false,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::new()
    }
}

impl Editable for Shape {
    fn begin_update(&mut self) {
        self.updating = true;
    }

    fn end_update(&mut self) {
        if std::mem::take(&mut self.updating) {
            self.revision += 1;
        }
    }
}

impl PointList for Shape {
    type Point = Point;

    fn points(&self) -> &[Point] {
        &self.points
    }

    fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at ({}, {}) opacity {}",
            self.position.0, self.position.1, self.opacity
        )?;
        if !self.points.is_empty() {
            f.write_str(" points")?;
            for (x, y) in &self.points {
                write!(f, " ({x}, {y})")?;
            }
        }
        Ok(())
    }
}

fn position(shape: &Shape) -> Point {
    shape.position
}

fn set_position(shape: &mut Shape, value: Point) {
    shape.position = value;
}

fn opacity(shape: &Shape) -> f32 {
    shape.opacity
}

fn set_opacity(shape: &mut Shape, value: f32) {
    shape.opacity = value;
}

pub const POSITION: Property<Shape, Point> = Property::new("position", position, set_position);
pub const OPACITY: Property<Shape, f32> = Property::new("opacity", opacity, set_opacity);

/// Named shapes, kept in name order.
#[derive(Debug, Default)]
pub struct Scene {
    shapes: BTreeMap<String, Handle<Shape>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str) -> Result<Handle<Shape>, String> {
        if self.shapes.contains_key(name) {
            return Err(format!("shape '{name}' already exists"));
        }
        let handle = Handle::new(Shape::new());
        self.shapes.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Result<&Handle<Shape>, String> {
        self.shapes
            .get(name)
            .ok_or_else(|| format!("no shape named '{name}'"))
    }

    pub fn remove(&mut self, name: &str) -> Result<Handle<Shape>, String> {
        self.shapes
            .remove(name)
            .ok_or_else(|| format!("no shape named '{name}'"))
    }

    pub fn handles(&self) -> Vec<Handle<Shape>> {
        self.shapes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// One line per shape.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "(no shapes)".to_string();
        }
        self.shapes
            .iter()
            .map(|(name, handle)| format!("{name}: {}", *handle.lock()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_shape_is_opaque_at_origin() {
        let shape = Shape::new();
        assert_eq!(shape.position, (0.0, 0.0));
        assert_eq!(shape.opacity, 1.0);
        assert!(shape.points.is_empty());
    }

    #[test]
    fn properties_read_and_write() {
        let mut shape = Shape::new();
        POSITION.set(&mut shape, (3.0, 4.0));
        OPACITY.set(&mut shape, 0.5);
        assert_eq!(POSITION.get(&shape), (3.0, 4.0));
        assert_eq!(OPACITY.get(&shape), 0.5);
    }

    #[test]
    fn update_hooks_count_revisions() {
        let mut shape = Shape::new();
        shape.begin_update();
        assert!(shape.updating);
        shape.end_update();
        assert!(!shape.updating);
        assert_eq!(shape.revision, 1);
    }

    #[test]
    fn scene_rejects_duplicates_and_unknown_names() {
        let mut scene = Scene::new();
        scene.add("a").unwrap();
        assert!(scene.add("a").is_err());
        assert!(scene.get("b").is_err());
        assert!(scene.remove("b").is_err());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn render_lists_shapes_in_name_order() {
        let mut scene = Scene::new();
        assert_eq!(scene.render(), "(no shapes)");
        scene.add("b").unwrap();
        scene.add("a").unwrap().lock().points.push((1.0, 2.0));
        assert_eq!(
            scene.render(),
            "a: at (0, 0) opacity 1 points (1, 2)\nb: at (0, 0) opacity 1"
        );
    }
}
