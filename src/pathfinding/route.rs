//! Live route maintenance.
//!
//! Tracks the user's progress along a [`MultiFloorPath`], trims passed
//! waypoints, and recomputes the route in a background thread when the
//! user strays beyond the reroute threshold. The active route is swapped
//! atomically when the recompute lands, so callers always observe a
//! complete route.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use log::{debug, info, warn};

use crate::core::CampusPoint;
use crate::error::Result;

use super::multi_floor::{MultiFloorPath, MultiFloorPathfinder};

/// What one position update did to the route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RouteUpdate {
    /// Still on route; steer toward this waypoint
    OnRoute { next_waypoint: CampusPoint },
    /// Deviation exceeded the threshold; a background reroute is running
    Rerouting,
    /// Within the arrival radius of the goal
    Arrived,
}

type RerouteResult = Result<MultiFloorPath>;

/// Tracks progress along a route and keeps it fresh.
pub struct RouteTracker {
    pathfinder: Arc<MultiFloorPathfinder>,
    goal: CampusPoint,
    goal_floor: i32,
    route: Arc<MultiFloorPath>,
    segment_index: usize,
    waypoint_index: usize,
    pending: Option<(Receiver<RerouteResult>, Arc<AtomicBool>)>,
}

impl RouteTracker {
    /// Compute the initial route synchronously and start tracking it.
    pub fn new(
        pathfinder: Arc<MultiFloorPathfinder>,
        start: &CampusPoint,
        start_floor: i32,
        goal: CampusPoint,
        goal_floor: i32,
    ) -> Result<Self> {
        let route = pathfinder.find_multi_floor_path(start, start_floor, &goal, goal_floor, None)?;
        Ok(Self {
            pathfinder,
            goal,
            goal_floor,
            route: Arc::new(route),
            segment_index: 0,
            waypoint_index: 0,
            pending: None,
        })
    }

    /// The route currently being followed.
    pub fn route(&self) -> &Arc<MultiFloorPath> {
        &self.route
    }

    /// Is a background reroute in flight?
    pub fn has_pending_reroute(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining polyline length from the current progress point.
    pub fn remaining_length(&self) -> f32 {
        let mut remaining = 0.0;
        for (i, segment) in self.route.segments.iter().enumerate().skip(self.segment_index) {
            let from = if i == self.segment_index {
                self.waypoint_index
            } else {
                0
            };
            remaining += segment
                .waypoints
                .iter()
                .skip(from)
                .zip(segment.waypoints.iter().skip(from + 1))
                .map(|(a, b)| a.distance(b))
                .sum::<f32>();
        }
        remaining
    }

    /// Feed one position fix and advance, reroute, or arrive.
    pub fn update_user_position(&mut self, position: &CampusPoint, floor: i32) -> RouteUpdate {
        self.poll_reroute(floor);

        let routing = self.pathfinder.routing();
        if floor == self.goal_floor && position.distance(&self.goal) <= routing.arrival_radius {
            self.cancel_pending();
            info!("[RouteTracker] arrived at goal");
            return RouteUpdate::Arrived;
        }

        // Follow a floor change into its segment (stairwell crossings)
        if self
            .route
            .segments
            .get(self.segment_index)
            .map_or(true, |s| s.floor != floor)
        {
            match self.route.segments.iter().position(|s| s.floor == floor) {
                Some(index) => {
                    self.segment_index = index;
                    self.waypoint_index = 0;
                }
                None => {
                    // Route has no segment on this floor at all
                    self.start_reroute(*position, floor);
                    return RouteUpdate::Rerouting;
                }
            }
        }

        let segment = &self.route.segments[self.segment_index];

        // Trim passed waypoints: progress snaps to the nearest remaining one
        let (nearest_index, deviation) = segment
            .waypoints
            .iter()
            .enumerate()
            .skip(self.waypoint_index)
            .map(|(i, w)| (i, w.distance(position)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((self.waypoint_index, 0.0));
        self.waypoint_index = nearest_index;

        if deviation > routing.reroute_threshold {
            if self.pending.is_none() {
                debug!(
                    "[RouteTracker] deviation {:.1}m exceeds threshold, rerouting",
                    deviation
                );
                self.start_reroute(*position, floor);
            }
            return RouteUpdate::Rerouting;
        }

        let next_waypoint = segment
            .waypoints
            .get(self.waypoint_index + 1)
            .or_else(|| segment.waypoints.get(self.waypoint_index))
            .copied()
            .unwrap_or(self.goal);
        RouteUpdate::OnRoute { next_waypoint }
    }

    /// Cancel any in-flight reroute.
    pub fn cancel_pending(&mut self) {
        if let Some((_, flag)) = self.pending.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Pick up a finished background reroute and swap it in.
    fn poll_reroute(&mut self, floor: i32) {
        let Some((rx, _)) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(route)) => {
                info!(
                    "[RouteTracker] reroute landed: {:.1}m over {} segment(s)",
                    route.total_length,
                    route.segments.len()
                );
                self.route = Arc::new(route);
                self.segment_index = self
                    .route
                    .segments
                    .iter()
                    .position(|s| s.floor == floor)
                    .unwrap_or(0);
                self.waypoint_index = 0;
                self.pending = None;
            }
            Ok(Err(e)) => {
                // Keep following the stale route rather than none at all
                warn!("[RouteTracker] reroute failed: {e}");
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
            }
        }
    }

    fn start_reroute(&mut self, position: CampusPoint, floor: i32) {
        self.cancel_pending();

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = bounded(1);
        let pathfinder = Arc::clone(&self.pathfinder);
        let goal = self.goal;
        let goal_floor = self.goal_floor;
        let flag = Arc::clone(&cancel);

        std::thread::spawn(move || {
            let result = pathfinder.find_multi_floor_path(&position, floor, &goal, goal_floor, Some(&flag));
            let _ = tx.send(result);
        });
        self.pending = Some((rx, cancel));
    }
}
