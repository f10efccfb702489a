//! Wall constraint: stop-and-slide against floor walls.
//!
//! A movement that crosses a wall is stopped just short of it and the
//! remaining displacement is projected onto the wall direction. Sliding may
//! hit a second wall (corners), so the constraint iterates a bounded number
//! of times. The angular difference between the intended and slid direction
//! feeds a small heading correction back into the pipeline, pulling future
//! raw headings toward the corridor direction.

use crate::config::CorrectionConfig;
use crate::core::{angle_diff, segment_intersection, CampusPoint, Segment};
use crate::floor::FloorConstraintProvider;

use super::types::WallConstraintResult;

/// Parameter values this close to the segment start are treated as the
/// start itself, so a point resting `wall_epsilon` from a wall does not
/// re-collide with it on the next iteration.
const T_MIN: f32 = 1e-4;

/// Constrains movements against the active floor's walls.
#[derive(Clone, Debug)]
pub struct WallConstraint {
    config: CorrectionConfig,
}

impl WallConstraint {
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    /// Swap in a new configuration.
    pub fn set_config(&mut self, config: CorrectionConfig) {
        self.config = config;
    }

    /// Constrain the movement `from -> to` against nearby walls.
    ///
    /// With no wall data loaded this is a no-op that returns `to`
    /// unconstrained; missing geometry never blocks motion.
    pub fn constrain(
        &self,
        provider: &FloorConstraintProvider,
        from: &CampusPoint,
        to: &CampusPoint,
    ) -> WallConstraintResult {
        let walls = provider.walls_near(from, self.config.wall_search_radius);
        if walls.is_empty() {
            return WallConstraintResult {
                position: *to,
                was_constrained: false,
                heading_correction: 0.0,
            };
        }

        let original_dir = (*to - *from).normalized();
        let mut start = *from;
        let mut target = *to;
        let mut constrained = false;
        let mut final_dir = original_dir;

        for _ in 0..self.config.max_wall_iterations {
            let movement = Segment::new(start, target);
            let Some((wall_seg, hit, _)) = self.nearest_hit(&walls, &movement) else {
                break;
            };
            constrained = true;

            let incoming = (target - start).normalized();

            // Stop short of the wall by epsilon along the incoming direction
            let stop = CampusPoint::new(
                hit.x - incoming.x * self.config.wall_epsilon,
                hit.y - incoming.y * self.config.wall_epsilon,
            );

            // Project the remaining displacement onto the wall direction
            let remaining = target - hit;
            let wall_dir = wall_seg.direction().normalized();
            let slide = wall_dir * remaining.dot(&wall_dir);

            start = stop;
            target = stop + slide;
            if slide.length_squared() < f32::EPSILON {
                break;
            }
            final_dir = slide.normalized();
        }

        let heading_correction = if constrained && final_dir.length_squared() > f32::EPSILON {
            angle_diff(original_dir.heading(), final_dir.heading())
                * self.config.heading_correction_factor
        } else {
            0.0
        };

        WallConstraintResult {
            position: target,
            was_constrained: constrained,
            heading_correction,
        }
    }

    /// Nearest wall intersection along the movement segment, skipping hits
    /// at the very start of the movement.
    fn nearest_hit(
        &self,
        walls: &[&crate::floor::CampusWall],
        movement: &Segment,
    ) -> Option<(Segment, CampusPoint, f32)> {
        let move_len = movement.length();
        if move_len < f32::EPSILON {
            return None;
        }

        let mut best: Option<(Segment, CampusPoint, f32)> = None;
        for wall in walls {
            if let Some(hit) = segment_intersection(movement, &wall.segment) {
                let t = movement.start.distance(&hit) / move_len;
                if t <= T_MIN {
                    continue;
                }
                match &best {
                    Some((_, _, bt)) if *bt <= t => {}
                    _ => best = Some((wall.segment, hit, t)),
                }
            }
        }
        best
    }
}
