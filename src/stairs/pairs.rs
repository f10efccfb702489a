//! Stair pairs: static associations between stair entrances on adjacent
//! floors that represent the same physical stairwell.
//!
//! Built once per campus load from the transformed entrances of every
//! floor; read-only during tracking.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core::CampusPoint;
use crate::floor::{CampusEntrance, StairDirection};

/// One physical stairwell connecting two adjacent floors.
#[derive(Clone, Debug, PartialEq)]
pub struct StairPair {
    /// Entrance position on the lower floor (campus coordinates)
    pub bottom_position: CampusPoint,
    /// Entrance position on the upper floor (campus coordinates)
    pub top_position: CampusPoint,
    /// Lower floor number
    pub bottom_floor: i32,
    /// Upper floor number
    pub top_floor: i32,
}

impl StairPair {
    /// Does this pair touch the given floor?
    #[inline]
    pub fn connects(&self, floor: i32) -> bool {
        self.bottom_floor == floor || self.top_floor == floor
    }

    /// The entrance position a user on `floor` would enter through when
    /// traveling in `direction`, if this pair supports that crossing.
    pub fn entry_on(&self, floor: i32, direction: StairDirection) -> Option<CampusPoint> {
        match direction {
            StairDirection::Up if self.bottom_floor == floor => Some(self.bottom_position),
            StairDirection::Down if self.top_floor == floor => Some(self.top_position),
            _ => None,
        }
    }

    /// Start/end positions and destination floor for a crossing from
    /// `floor` in `direction`.
    pub fn crossing_from(
        &self,
        floor: i32,
        direction: StairDirection,
    ) -> Option<(CampusPoint, CampusPoint, i32)> {
        match direction {
            StairDirection::Up if self.bottom_floor == floor => {
                Some((self.bottom_position, self.top_position, self.top_floor))
            }
            StairDirection::Down if self.top_floor == floor => {
                Some((self.top_position, self.bottom_position, self.bottom_floor))
            }
            _ => None,
        }
    }
}

/// Build stair pairs by matching up-entrances against down-entrances on
/// the connected floor by nearest campus-coordinate distance.
///
/// Entrances whose nearest counterpart exceeds `max_distance` are dropped
/// with a warning rather than mis-paired.
pub fn build_stair_pairs(
    entrances_by_floor: &HashMap<i32, Vec<CampusEntrance>>,
    max_distance: f32,
) -> Vec<StairPair> {
    let mut pairs = Vec::new();

    for (&floor, entrances) in entrances_by_floor {
        for entrance in entrances.iter().filter(|e| e.is_stair(StairDirection::Up)) {
            let upper_floor = entrance.connected_floor.unwrap_or(floor + 1);
            let Some(upper_entrances) = entrances_by_floor.get(&upper_floor) else {
                continue;
            };

            let counterpart = upper_entrances
                .iter()
                .filter(|e| e.is_stair(StairDirection::Down))
                .min_by(|a, b| {
                    let da = a.position.distance_squared(&entrance.position);
                    let db = b.position.distance_squared(&entrance.position);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                });

            match counterpart {
                Some(upper) if upper.position.distance(&entrance.position) <= max_distance => {
                    pairs.push(StairPair {
                        bottom_position: entrance.position,
                        top_position: upper.position,
                        bottom_floor: floor,
                        top_floor: upper_floor,
                    });
                }
                _ => {
                    warn!(
                        "[StairPairs] no counterpart for {} on floor {} within {:.1}m",
                        entrance.id, upper_floor, max_distance
                    );
                }
            }
        }
    }

    debug!("[StairPairs] built {} pairs", pairs.len());
    pairs
}

/// Nearest pair whose entry for `direction` lies on `floor`, within
/// `radius` of `position`.
pub fn nearest_pair_on_floor<'a>(
    pairs: &'a [StairPair],
    position: &CampusPoint,
    floor: i32,
    direction: StairDirection,
    radius: f32,
) -> Option<&'a StairPair> {
    pairs
        .iter()
        .filter_map(|p| p.entry_on(floor, direction).map(|entry| (p, entry)))
        .filter(|(_, entry)| entry.distance(position) <= radius)
        .min_by(|(_, a), (_, b)| {
            let da = a.distance_squared(position);
            let db = b.distance_squared(position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(p, _)| p)
}

/// Fallback matching: check both entrances of every pair that connects to
/// `floor`, regardless of which end the user stands at.
///
/// Best-effort heuristic for users entering a stairwell from an angle the
/// directional search rejects; buildings with multiple stairwells in close
/// proximity may match the wrong pair.
pub fn nearest_pair_either_end<'a>(
    pairs: &'a [StairPair],
    position: &CampusPoint,
    floor: i32,
    radius: f32,
) -> Option<&'a StairPair> {
    pairs
        .iter()
        .filter(|p| p.connects(floor))
        .filter_map(|p| {
            let d = p
                .bottom_position
                .distance(position)
                .min(p.top_position.distance(position));
            (d <= radius).then_some((p, d))
        })
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(p, _)| p)
}
