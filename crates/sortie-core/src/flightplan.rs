//! Flight plans: ordered waypoints with arrival durations.
//!
//! A flight plan is anchored at its flight group's start time. Each waypoint
//! stores the time needed to fly to it from the previous one (`arrival_duration`)
//! and an optional loiter `duration` spent on it, so every timestamp in the
//! plan is derived by accumulation from the start time.

use serde::{Deserialize, Serialize};

use crate::types::Position;

/// Second point of a racetrack loiter pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Racetrack {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub name: String,
    pub position: Position,
    /// End of a directional leg, if the waypoint is flown as a line.
    pub end_position: Option<Position>,
    /// Speed towards this waypoint (m/s).
    pub speed: f64,
    /// Seconds from the previous waypoint to this one.
    pub arrival_duration: f64,
    /// Loiter time spent on this waypoint (seconds).
    pub duration: Option<f64>,
    pub racetrack: Option<Racetrack>,
    pub on_ground: bool,
    /// The flight group performs its task from this waypoint on.
    pub task_start: bool,
}

impl Waypoint {
    pub fn is_racetrack(&self) -> bool {
        self.racetrack.is_some()
    }
}

/// A waypoint before it is placed in a flight plan.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointTemplate {
    pub name: String,
    pub position: Position,
    pub end_position: Option<Position>,
    pub duration: Option<f64>,
    pub racetrack: Option<Racetrack>,
    pub on_ground: bool,
    pub task_start: bool,
}

impl WaypointTemplate {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            end_position: None,
            duration: None,
            racetrack: None,
            on_ground: false,
            task_start: false,
        }
    }

    pub fn on_ground(mut self) -> Self {
        self.on_ground = true;
        self
    }

    pub fn task_start(mut self) -> Self {
        self.task_start = true;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn end_position(mut self, position: Position) -> Self {
        self.end_position = Some(position);
        self
    }

    pub fn racetrack(mut self, name: impl Into<String>, position: Position) -> Self {
        self.racetrack = Some(Racetrack {
            name: name.into(),
            position,
        });
        self
    }

    // --- Common waypoints ---

    pub fn take_off(position: Position) -> Self {
        Self::new("Take Off", position).on_ground()
    }

    pub fn landing(position: Position) -> Self {
        Self::new("Landing", position).on_ground()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flightplan {
    pub waypoints: Vec<Waypoint>,
}

/// One row of a flight plan's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTableEntry {
    pub name: String,
    pub start: f64,
    pub end: Option<f64>,
}

impl Flightplan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append waypoints, deriving each arrival duration from the distance to
    /// the previous waypoint at `cruise_speed`. The first waypoint arrives at 0.
    pub fn add(&mut self, templates: impl IntoIterator<Item = WaypointTemplate>, cruise_speed: f64) {
        for template in templates {
            let arrival_duration = match self.waypoints.last() {
                Some(prev) if cruise_speed > 0.0 => {
                    (prev.position.distance_to(&template.position) / cruise_speed).round()
                }
                _ => 0.0,
            };
            self.waypoints.push(Waypoint {
                name: template.name,
                position: template.position,
                end_position: template.end_position,
                speed: cruise_speed,
                arrival_duration,
                duration: template.duration,
                racetrack: template.racetrack,
                on_ground: template.on_ground,
                task_start: template.task_start,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the waypoint whose window contains `now`, or `None` before
    /// the start time and after the last waypoint.
    pub fn current_index(&self, start_time: f64, now: f64) -> Option<usize> {
        if now < start_time {
            return None;
        }
        let mut plan_time = start_time;
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            plan_time += waypoint.arrival_duration + waypoint.duration.unwrap_or(0.0);
            if plan_time > now {
                return Some(index);
            }
        }
        None
    }

    pub fn current_waypoint(&self, start_time: f64, now: f64) -> Option<&Waypoint> {
        self.current_index(start_time, now)
            .and_then(|index| self.waypoints.get(index))
    }

    /// Timestamp at which the current waypoint is (or was) reached.
    pub fn arrival_time(&self, start_time: f64, now: f64) -> f64 {
        let mut arrival = start_time;
        for waypoint in &self.waypoints {
            arrival += waypoint.arrival_duration;
            if arrival > now {
                break;
            }
            arrival += waypoint.duration.unwrap_or(0.0);
        }
        arrival
    }

    /// Timestamp at which waypoint `index` is reached.
    pub fn waypoint_arrival_time(&self, start_time: f64, index: usize) -> Option<f64> {
        if index >= self.waypoints.len() {
            return None;
        }
        let mut arrival = start_time;
        for (i, waypoint) in self.waypoints.iter().enumerate() {
            arrival += waypoint.arrival_duration;
            if i == index {
                return Some(arrival);
            }
            arrival += waypoint.duration.unwrap_or(0.0);
        }
        None
    }

    /// Whether waypoint `index` is reached and its loiter window is open at `now`.
    pub fn is_active(&self, start_time: f64, index: usize, now: f64) -> bool {
        let Some(arrival) = self.waypoint_arrival_time(start_time, index) else {
            return false;
        };
        let duration = self.waypoints[index].duration.unwrap_or(0.0);
        now >= arrival && now < arrival + duration
    }

    pub fn time_table(&self, start_time: f64) -> Vec<TimeTableEntry> {
        let mut arrival = start_time;
        let mut table = Vec::with_capacity(self.waypoints.len());
        for waypoint in &self.waypoints {
            arrival += waypoint.arrival_duration;
            table.push(TimeTableEntry {
                name: waypoint.name.clone(),
                start: arrival,
                end: waypoint.duration.map(|d| arrival + d),
            });
            arrival += waypoint.duration.unwrap_or(0.0);
        }
        table
    }

    /// Total seconds from start time to the last waypoint's end.
    pub fn total_duration(&self) -> f64 {
        self.waypoints
            .iter()
            .map(|wp| wp.arrival_duration + wp.duration.unwrap_or(0.0))
            .sum()
    }

    pub fn task_waypoint_index(&self) -> Option<usize> {
        self.waypoints.iter().position(|wp| wp.task_start)
    }
}

/// Position on a racetrack after `flown` meters on it.
///
/// The leg index `floor(flown / leg)` selects the direction: even legs fly
/// from the waypoint to its racetrack point, odd legs back.
pub fn racetrack_position(waypoint: &Waypoint, flown: f64) -> Option<Position> {
    let racetrack = waypoint.racetrack.as_ref()?;
    let leg = waypoint.position.distance_to(&racetrack.position);
    if leg <= 0.0 {
        return Some(waypoint.position);
    }
    let rounds = (flown / leg).floor() as i64;
    let t = (flown - rounds as f64 * leg) / leg;
    if rounds % 2 == 0 {
        Some(waypoint.position.lerp(&racetrack.position, t))
    } else {
        Some(racetrack.position.lerp(&waypoint.position, t))
    }
}
