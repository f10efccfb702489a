//! Stairwell Transition Scenario Tests
//!
//! Drives a full tracking session through synthetic multi-floor walks:
//! - Up crossing: approach, detect, climb, arrive on the upper floor
//! - Down crossing back to the origin floor
//! - Turnaround mid-climb rewinds to the entrance without a floor change
//! - Progress stays monotonic in each phase
//!
//! Run with: `cargo test --test stair_transition`

use std::sync::Arc;

use marga_nav::core::{CampusPoint, Segment};
use marga_nav::floor::{
    BuildingMetadata, FloorId, FloorInfo, FloorPlan, LocalEntrance, StairDirection,
    StaticFloorSource,
};
use marga_nav::stairs::{MotionLabel, MotionSample};
use marga_nav::{NavConfig, StepOutcome, TrackingSession};

fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
    Segment::new(CampusPoint::new(x1, y1), CampusPoint::new(x2, y2))
}

fn room_walls() -> Vec<Segment> {
    vec![
        wall(0.0, 0.0, 20.0, 0.0),
        wall(20.0, 0.0, 20.0, 20.0),
        wall(20.0, 20.0, 0.0, 20.0),
        wall(0.0, 20.0, 0.0, 0.0),
    ]
}

fn stair(id: &str, x: f32, y: f32, direction: StairDirection, connected: i32) -> LocalEntrance {
    LocalEntrance {
        id: id.into(),
        name: id.into(),
        position: CampusPoint::new(x, y),
        stair_direction: Some(direction),
        connected_floor: Some(connected),
    }
}

/// Two stacked floors joined by one stairwell near (8, 8).
fn building() -> Arc<StaticFloorSource> {
    Arc::new(StaticFloorSource {
        metadata: BuildingMetadata {
            building_name: "library".into(),
            floors: vec![
                FloorInfo {
                    id: FloorId::new("f1"),
                    floor_number: 1,
                    name: "First".into(),
                },
                FloorInfo {
                    id: FloorId::new("f2"),
                    floor_number: 2,
                    name: "Second".into(),
                },
            ],
        },
        plans: vec![
            FloorPlan {
                id: Some(FloorId::new("f1")),
                floor_number: 1,
                walls: room_walls(),
                entrances: vec![stair("f1-up", 8.0, 8.0, StairDirection::Up, 2)],
                ..Default::default()
            },
            FloorPlan {
                id: Some(FloorId::new("f2")),
                floor_number: 2,
                walls: room_walls(),
                entrances: vec![stair("f2-down", 8.2, 8.0, StairDirection::Down, 1)],
                ..Default::default()
            },
        ],
    })
}

fn session() -> TrackingSession {
    env_logger::try_init().ok();
    TrackingSession::new(building(), NavConfig::default()).unwrap()
}

/// Step toward the stairs with confident labels until a crossing starts.
fn approach_until_crossing(
    session: &mut TrackingSession,
    heading: f32,
    label: MotionLabel,
) -> bool {
    for _ in 0..8 {
        session.on_motion(MotionSample::new(label, 0.9));
        if matches!(
            session.on_step(heading, 0.7).unwrap(),
            StepOutcome::StairCrossing { .. }
        ) {
            return true;
        }
    }
    false
}

/// Climb with stair labels past the arrival gate, then walk off the landing.
fn climb_to_arrival(session: &mut TrackingSession, label: MotionLabel) -> Option<i32> {
    for _ in 0..8 {
        session.on_motion(MotionSample::new(label, 0.9));
        session.on_step(0.0, 0.7).unwrap();
    }
    for _ in 0..4 {
        session.on_motion(MotionSample::new(MotionLabel::Walking, 0.9));
        if let StepOutcome::FloorChanged { floor, .. } = session.on_step(0.0, 0.7).unwrap() {
            return Some(floor);
        }
    }
    None
}

#[test]
fn up_crossing_reaches_second_floor() {
    let mut s = session();
    s.set_position(CampusPoint::new(6.5, 8.0), 0.0, 1).unwrap();

    assert!(approach_until_crossing(&mut s, 0.0, MotionLabel::Upstairs));
    let floor = climb_to_arrival(&mut s, MotionLabel::Upstairs);

    assert_eq!(floor, Some(2));
    assert_eq!(s.current_floor(), 2);
    assert_eq!(s.provider().floor_number(), 2);
}

#[test]
fn round_trip_up_then_down() {
    let mut s = session();
    s.set_position(CampusPoint::new(6.5, 8.0), 0.0, 1).unwrap();
    assert!(approach_until_crossing(&mut s, 0.0, MotionLabel::Upstairs));
    assert_eq!(climb_to_arrival(&mut s, MotionLabel::Upstairs), Some(2));

    // Now on floor 2: re-anchor east of the stairwell, walk back facing it
    s.set_position(CampusPoint::new(10.0, 8.0), std::f32::consts::PI, 2)
        .unwrap();
    assert!(approach_until_crossing(
        &mut s,
        std::f32::consts::PI,
        MotionLabel::Downstairs
    ));
    assert_eq!(climb_to_arrival(&mut s, MotionLabel::Downstairs), Some(1));
    assert_eq!(s.current_floor(), 1);
}

#[test]
fn turnaround_returns_to_entrance_without_floor_change() {
    let mut s = session();
    s.set_position(CampusPoint::new(6.5, 8.0), 0.0, 1).unwrap();
    assert!(approach_until_crossing(&mut s, 0.0, MotionLabel::Upstairs));

    let mut cancelled = None;
    for _ in 0..30 {
        s.on_motion(MotionSample::new(MotionLabel::Downstairs, 0.9));
        if let StepOutcome::CrossingCancelled { position } = s.on_step(0.0, 0.7).unwrap() {
            cancelled = Some(position);
            break;
        }
    }

    assert_eq!(cancelled, Some(CampusPoint::new(8.0, 8.0)));
    assert_eq!(s.current_floor(), 1);
    // Tracking resumes from the entrance
    let StepOutcome::Tracking { position } = s.on_step(0.0, 0.7).unwrap() else {
        panic!("expected plain tracking after cancellation");
    };
    assert!(position.x > 8.0);
}

#[test]
fn crossing_progress_is_monotonic() {
    let mut s = session();
    s.set_position(CampusPoint::new(6.5, 8.0), 0.0, 1).unwrap();
    assert!(approach_until_crossing(&mut s, 0.0, MotionLabel::Upstairs));

    let mut last = 0.0f32;
    for _ in 0..12 {
        s.on_motion(MotionSample::new(MotionLabel::Upstairs, 0.9));
        if let StepOutcome::StairCrossing { progress, .. } = s.on_step(0.0, 0.7).unwrap() {
            assert!(progress >= last, "progress regressed during climb");
            last = progress;
        }
    }
    assert!(last > 0.5);
}

#[test]
fn low_confidence_labels_never_start_a_crossing() {
    let mut s = session();
    s.set_position(CampusPoint::new(6.5, 8.0), 0.0, 1).unwrap();

    for _ in 0..8 {
        s.on_motion(MotionSample::new(MotionLabel::Upstairs, 0.3));
        let outcome = s.on_step(0.0, 0.2).unwrap();
        assert!(
            matches!(outcome, StepOutcome::Tracking { .. }),
            "low-confidence labels must be no signal"
        );
    }
}
