//! Collision and pick shape generation from loader geometry.

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::shape::{ConvexPolyhedron, Shape, SharedShape, TriMesh};
use rockfall_scene::Geometry;
use tracing::warn;

use crate::error::{PhysicsError, Result};

/// Thinnest extent a fallback box gets, so flat geometry still has volume.
const MIN_HALF_EXTENT: f32 = 0.005;

/// Hulls enclosing less than this volume are treated as flat.
const MIN_HULL_VOLUME: f32 = 1.0e-6;

/// Build the convex hull collider of a body from all of its vertices.
///
/// Falls back to a bounding box when the points are degenerate (coplanar or
/// collinear), which keeps a malformed fragment in the simulation instead of
/// failing the whole load.
pub fn hull_from_points(points: &[Point3<f32>], name: &str) -> Result<SharedShape> {
    if points.len() < 4 {
        return Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: "Need at least 4 points for convex hull".to_string(),
        });
    }

    // Coplanar input still yields a hull, just one with no volume.
    match ConvexPolyhedron::from_convex_hull(points) {
        Some(hull) if hull.mass_properties(1.0).mass() > MIN_HULL_VOLUME => {
            Ok(SharedShape::new(hull))
        }
        _ => {
            warn!(body = name, "degenerate hull, falling back to bounding box");
            Ok(bounding_box(points))
        }
    }
}

/// Build the static cuboid collider of a boundary.
pub fn boundary_cuboid(half_extents: &Vector3<f32>) -> SharedShape {
    SharedShape::cuboid(
        half_extents.x.max(MIN_HALF_EXTENT),
        half_extents.y.max(MIN_HALF_EXTENT),
        half_extents.z.max(MIN_HALF_EXTENT),
    )
}

/// Build the ray-cast shape standing in for one drawable sub-mesh.
///
/// Triangulated parts become trimeshes so picking follows the visible
/// surface; bare point sets use their hull.
pub fn pick_shape(part: &Geometry, name: &str) -> Result<SharedShape> {
    let vertices: Vec<Point3<f32>> = part.points().map(Point3::from).collect();

    if part.indices.len() < 3 {
        return hull_from_points(&vertices, name);
    }

    let indices: Vec<[u32; 3]> = part
        .indices
        .chunks_exact(3)
        .map(|i| [i[0], i[1], i[2]])
        .collect();

    if indices
        .iter()
        .flatten()
        .any(|&i| i as usize >= vertices.len())
    {
        return Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: "Triangle index out of range".to_string(),
        });
    }

    match TriMesh::new(vertices, indices) {
        Ok(trimesh) => Ok(SharedShape::new(trimesh)),
        Err(e) => Err(PhysicsError::CollisionShape {
            name: name.to_string(),
            reason: format!("Failed to create trimesh: {:?}", e),
        }),
    }
}

fn bounding_box(points: &[Point3<f32>]) -> SharedShape {
    let mut min = Vector3::repeat(f32::INFINITY);
    let mut max = Vector3::repeat(f32::NEG_INFINITY);

    for p in points {
        min = min.inf(&p.coords);
        max = max.sup(&p.coords);
    }

    let center = (min + max) / 2.0;
    let cuboid = boundary_cuboid(&((max - min) / 2.0));
    SharedShape::compound(vec![(Isometry3::translation(center.x, center.y, center.z), cuboid)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_points(s: f32) -> Vec<Point3<f32>> {
        Geometry::cuboid(s, s, s).points().map(Point3::from).collect()
    }

    #[test]
    fn test_convex_hull() {
        let shape = hull_from_points(&cube_points(0.5), "rock").unwrap();
        assert!(shape.as_convex_polyhedron().is_some());
    }

    #[test]
    fn test_too_few_points() {
        let points = cube_points(0.5);
        let err = hull_from_points(&points[..3], "rock").unwrap_err();
        assert!(matches!(err, PhysicsError::CollisionShape { .. }));
    }

    #[test]
    fn test_flat_points_fall_back_to_box() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let shape = hull_from_points(&points, "flat").unwrap();
        assert!(shape.as_compound().is_some());
    }

    #[test]
    fn test_tilted_flat_points_fall_back_to_box() {
        // Coplanar on x = y, so no axis of the bounding box collapses.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let shape = hull_from_points(&points, "slab").unwrap();
        assert!(shape.as_compound().is_some());
        assert!(shape.mass_properties(1.0).mass() > 0.0);
    }

    #[test]
    fn test_pick_shape_trimesh() {
        let shape = pick_shape(&Geometry::cuboid(0.5, 0.5, 0.5), "rock").unwrap();
        assert!(shape.as_trimesh().is_some());
    }

    #[test]
    fn test_pick_shape_point_cloud() {
        let mut part = Geometry::cuboid(0.5, 0.5, 0.5);
        part.indices.clear();
        let shape = pick_shape(&part, "rock").unwrap();
        assert!(shape.as_convex_polyhedron().is_some());
    }

    #[test]
    fn test_pick_shape_bad_index() {
        let mut part = Geometry::cuboid(0.5, 0.5, 0.5);
        part.indices.push(99);
        part.indices.push(0);
        part.indices.push(1);
        assert!(pick_shape(&part, "rock").is_err());
    }

    #[test]
    fn test_boundary_cuboid() {
        let shape = boundary_cuboid(&Vector3::new(5.0, 0.25, 5.0));
        let cuboid = shape.as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents, Vector3::new(5.0, 0.25, 5.0));
    }
}
