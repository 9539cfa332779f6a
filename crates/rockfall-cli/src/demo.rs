//! Built-in demo scene used when no manifest is given.

use rockfall_scene::{Geometry, SceneManifest, Transform};

/// Rock cluster on a walled slab, with one two-part rock and a bit of scenery.
pub fn demo_manifest() -> SceneManifest {
    let mut manifest = SceneManifest::new();

    manifest.push(
        "ground",
        Geometry::cuboid(6.0, 0.25, 6.0),
        Transform::from_translation(0.0, -0.25, 0.0),
    );
    for (name, x, z, hx, hz) in [
        ("wall_north", 0.0, -6.0, 6.0, 0.1),
        ("wall_south", 0.0, 6.0, 6.0, 0.1),
        ("wall_east", 6.0, 0.0, 0.1, 6.0),
        ("wall_west", -6.0, 0.0, 0.1, 6.0),
    ] {
        manifest.push(
            name,
            Geometry::cuboid(hx, 1.0, hz),
            Transform::from_translation(x, 1.0, z),
        );
    }

    let rocks = [
        (0.0, 0.35, 0.0, 0.35),
        (0.75, 0.3, 0.1, 0.3),
        (-0.7, 0.3, -0.2, 0.3),
        (0.1, 0.25, 0.75, 0.25),
        (-0.2, 0.25, -0.8, 0.25),
        (0.1, 1.0, -0.05, 0.3),
    ];
    for (i, (x, y, z, half)) in rocks.into_iter().enumerate() {
        manifest.push(
            format!("explodingRocks_{}", i + 1),
            Geometry::cuboid(half, half * 0.8, half * 0.9),
            Transform::from_translation(x, y, z),
        );
    }
    // Second sub-mesh of the first rock.
    manifest.push(
        "explodingRocks_1",
        Geometry::cuboid(0.2, 0.3, 0.2),
        Transform::from_translation(0.0, 0.35, 0.0),
    );

    manifest.push(
        "plant_fern",
        Geometry::cuboid(0.1, 0.4, 0.1),
        Transform::from_translation(3.0, 0.4, 3.0),
    );
    manifest
}
