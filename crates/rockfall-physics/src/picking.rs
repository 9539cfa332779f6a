//! Pick-and-impulse routing.
//!
//! A pointer activation becomes a camera ray, the ray becomes an ordered list
//! of hits against the drawn bodies, and each distinct body in that list gets
//! exactly one random impulse.

use std::collections::HashSet;

use parry3d::query::Ray;
use tracing::{debug, trace, warn};

use crate::camera::PerspectiveCamera;
use crate::config::ImpulseConfig;
use crate::lifecycle::Physics;
use crate::phase::Phase;
use crate::random::{sample_impulse, RandomSource};
use crate::registry::BodyRegistry;

/// Farthest distance a pick ray reaches.
const MAX_PICK_DISTANCE: f32 = 1000.0;

/// One ray intersection with a drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    /// Id of the body the drawable belongs to.
    pub body: String,
    /// Distance along the ray.
    pub distance: f32,
}

/// Intersection test against the drawables.
///
/// Returns every hit, nearest first. A body made of several sub-meshes may
/// appear more than once.
pub trait RayIntersector {
    /// Intersect `ray` with the drawables backing `registry`.
    fn intersect(&self, ray: &Ray, registry: &BodyRegistry) -> Vec<PickHit>;
}

/// Ray casts each body's sub-mesh shapes at the body's visual pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshIntersector;

impl RayIntersector for MeshIntersector {
    fn intersect(&self, ray: &Ray, registry: &BodyRegistry) -> Vec<PickHit> {
        let mut hits: Vec<PickHit> = registry
            .iter()
            .flat_map(|body| {
                body.parts().iter().filter_map(move |part| {
                    part.cast_ray(body.visual(), ray, MAX_PICK_DISTANCE, true)
                        .map(|distance| PickHit {
                            body: body.id().to_string(),
                            distance,
                        })
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// What one pick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickOutcome {
    /// Raw hits reported by the intersector, duplicates included.
    pub hits: usize,
    /// Bodies that received an impulse, in hit order.
    pub pushed: Vec<String>,
    /// Distinct hits skipped because the body had no physical counterpart.
    pub skipped: usize,
}

impl PickOutcome {
    /// Number of impulses applied.
    pub fn impulses(&self) -> usize {
        self.pushed.len()
    }
}

/// Routes pointer picks to body impulses.
pub struct Inputs {
    impulse: ImpulseConfig,
    intersector: Box<dyn RayIntersector>,
}

impl Inputs {
    /// Router using [`MeshIntersector`].
    pub fn new(impulse: ImpulseConfig) -> Self {
        Self::with_intersector(impulse, Box::new(MeshIntersector))
    }

    /// Router using a renderer-provided intersection test.
    pub fn with_intersector(impulse: ImpulseConfig, intersector: Box<dyn RayIntersector>) -> Self {
        Self {
            impulse,
            intersector,
        }
    }

    /// Handle one pick at normalized device coordinates `(x, y)`.
    ///
    /// Outside [`Phase::Playing`] this does nothing. Hits on bodies without a
    /// physical counterpart, or on ids the registry does not know, are
    /// skipped; the rest of the batch still goes through.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pick(
        &self,
        phase: Phase,
        camera: &PerspectiveCamera,
        x: f32,
        y: f32,
        registry: &BodyRegistry,
        physics: &mut Physics,
        rng: &mut dyn RandomSource,
    ) -> PickOutcome {
        let mut outcome = PickOutcome::default();
        if phase != Phase::Playing {
            debug!(%phase, "pick ignored outside playing");
            return outcome;
        }

        let ray = camera.ray_from_ndc(x, y);
        let hits = self.intersector.intersect(&ray, registry);
        outcome.hits = hits.len();

        let mut seen = HashSet::with_capacity(hits.len());
        for hit in &hits {
            if !seen.insert(hit.body.as_str()) {
                continue;
            }

            let Some(body) = registry.get(&hit.body) else {
                warn!(body = %hit.body, "pick hit an unregistered body");
                continue;
            };
            let Some(handle) = body.physical() else {
                trace!(body = %hit.body, "pick hit a body with no physical counterpart");
                outcome.skipped += 1;
                continue;
            };

            let impulse = sample_impulse(rng, &self.impulse);
            if physics.apply_impulse(handle, impulse) {
                trace!(body = %hit.body, ?impulse, "impulse applied");
                outcome.pushed.push(hit.body.clone());
            } else {
                outcome.skipped += 1;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::random::seeded;
    use crate::readiness::ReadinessGate;
    use crate::registry::boundaries_from_roles;
    use nalgebra::Point3;
    use rockfall_scene::{BodyDesc, Geometry, SceneRoles, Transform};

    /// Replays a fixed hit list regardless of the ray.
    struct Canned(Vec<&'static str>);

    impl RayIntersector for Canned {
        fn intersect(&self, _ray: &Ray, _registry: &BodyRegistry) -> Vec<PickHit> {
            self.0
                .iter()
                .enumerate()
                .map(|(i, id)| PickHit {
                    body: id.to_string(),
                    distance: i as f32,
                })
                .collect()
        }
    }

    fn roles() -> SceneRoles {
        let mut two_parts = BodyDesc {
            id: "rock_2".to_string(),
            transform: Transform::from_translation(0.0, 0.0, 0.0),
            parts: vec![Geometry::cuboid(0.5, 0.5, 0.5)],
        };
        two_parts.parts.push(Geometry::cuboid(0.4, 0.6, 0.4));

        SceneRoles {
            bodies: vec![
                two_parts,
                BodyDesc {
                    id: "rock_4".to_string(),
                    transform: Transform::from_translation(0.0, 0.0, -3.0),
                    parts: vec![Geometry::cuboid(0.5, 0.5, 0.5)],
                },
                BodyDesc {
                    id: "rock_5".to_string(),
                    transform: Transform::from_translation(4.0, 0.0, 0.0),
                    parts: vec![Geometry::cuboid(0.5, 0.5, 0.5)],
                },
            ],
            boundaries: vec![],
        }
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin())
    }

    fn built() -> (BodyRegistry, Physics) {
        let mut gate = ReadinessGate::new();
        gate.engine_ready();
        let ready = gate.assets_loaded(roles()).unwrap();
        let mut registry = BodyRegistry::from_roles(ready.roles()).unwrap();
        let boundaries = boundaries_from_roles(ready.roles());
        let mut physics = Physics::new(PhysicsConfig::default());
        physics.initialize(&ready, &mut registry, &boundaries).unwrap();
        (registry, physics)
    }

    #[test]
    fn test_mesh_intersector_orders_hits() {
        let registry = BodyRegistry::from_roles(&roles()).unwrap();
        let ray = camera().ray_from_ndc(0.0, 0.0);

        let hits = MeshIntersector.intersect(&ray, &registry);
        let ids: Vec<&str> = hits.iter().map(|h| h.body.as_str()).collect();

        assert_eq!(ids, vec!["rock_2", "rock_2", "rock_4"]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_overlapping_parts_push_once() {
        let (registry, mut physics) = built();
        let inputs = Inputs::new(ImpulseConfig::default());

        let outcome = inputs.handle_pick(
            Phase::Playing,
            &camera(),
            0.0,
            0.0,
            &registry,
            &mut physics,
            &mut seeded(1),
        );

        assert_eq!(outcome.hits, 3);
        assert_eq!(outcome.pushed, vec!["rock_2", "rock_4"]);
        assert_eq!(outcome.impulses(), 2);
    }

    #[test]
    fn test_miss_pushes_nothing() {
        let (registry, mut physics) = built();
        let inputs = Inputs::new(ImpulseConfig::default());

        let outcome = inputs.handle_pick(
            Phase::Playing,
            &camera(),
            -0.9,
            0.9,
            &registry,
            &mut physics,
            &mut seeded(1),
        );

        assert_eq!(outcome, PickOutcome::default());
    }

    #[test]
    fn test_pick_outside_playing_ignored() {
        let (registry, mut physics) = built();
        let inputs = Inputs::with_intersector(ImpulseConfig::default(), Box::new(Canned(vec!["rock_2"])));

        for phase in [Phase::Loading, Phase::Ready, Phase::Resetting] {
            let outcome = inputs.handle_pick(
                phase,
                &camera(),
                0.0,
                0.0,
                &registry,
                &mut physics,
                &mut seeded(1),
            );
            assert_eq!(outcome.hits, 0);
            assert!(outcome.pushed.is_empty());
        }
    }

    #[test]
    fn test_unknown_body_skipped() {
        let (registry, mut physics) = built();
        let inputs = Inputs::with_intersector(
            ImpulseConfig::default(),
            Box::new(Canned(vec!["ghost", "rock_5", "ghost"])),
        );

        let outcome = inputs.handle_pick(
            Phase::Playing,
            &camera(),
            0.0,
            0.0,
            &registry,
            &mut physics,
            &mut seeded(1),
        );

        assert_eq!(outcome.hits, 3);
        assert_eq!(outcome.pushed, vec!["rock_5"]);
    }

    #[test]
    fn test_body_without_world_skipped() {
        let registry = BodyRegistry::from_roles(&roles()).unwrap();
        let mut physics = Physics::new(PhysicsConfig::default());
        let inputs = Inputs::with_intersector(ImpulseConfig::default(), Box::new(Canned(vec!["rock_2", "rock_4"])));

        let outcome = inputs.handle_pick(
            Phase::Playing,
            &camera(),
            0.0,
            0.0,
            &registry,
            &mut physics,
            &mut seeded(1),
        );

        assert!(outcome.pushed.is_empty());
        assert_eq!(outcome.skipped, 2);
    }
}
