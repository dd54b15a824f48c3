/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

#![allow(unused)]


use std::{ops::Deref,sync::Arc};
use serde::{Deserialize,Serialize};

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Default)]
#[serde(rename_all="snake_case")]
pub enum WaypointAction {
    Takeoff,
    #[default]
    #[serde(alias="navigate")]
    Waypoint,
    Loiter,
    Land,
    ReturnToHome,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Waypoint {
    #[serde(alias="lat")]
    pub latitude: f64,

    #[serde(alias="lng", alias="lon")]
    pub longitude: f64,

    pub altitude: f64,

    #[serde(default, alias="waypoint_type")]
    pub action: WaypointAction,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub description: Option<String>,
}

impl Waypoint {
    pub fn new (latitude: f64, longitude: f64, altitude: f64, action: WaypointAction)->Self {
        Waypoint { latitude, longitude, altitude, action, description: None }
    }

    pub fn position (&self)->GeoPosition {
        GeoPosition { latitude: self.latitude, longitude: self.longitude, altitude: self.altitude }
    }
}

/// the planned route of a mission. Paths are immutable once created - a re-planned mission gets a new path.
/// Cloning is cheap (shared)
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(transparent)]
pub struct WaypointPath {
    waypoints: Arc<[Waypoint]>
}

impl WaypointPath {
    pub fn new (waypoints: Vec<Waypoint>)->Self {
        WaypointPath { waypoints: waypoints.into() }
    }

    /// a path needs at least two waypoints to have a segment
    pub fn is_traversable (&self)->bool {
        self.waypoints.len() >= 2
    }

    pub fn segment_count (&self)->usize {
        self.waypoints.len().saturating_sub(1)
    }
}

impl Deref for WaypointPath {
    type Target = [Waypoint];
    fn deref (&self)->&[Waypoint] { &self.waypoints }
}

impl From<Vec<Waypoint>> for WaypointPath {
    fn from (waypoints: Vec<Waypoint>)->Self { WaypointPath::new(waypoints) }
}

/// where along a path an entity is. The segment index is always derived from the progress
/// (see [`crate::interpolate::traversal_state`])
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct TraversalState {
    pub progress: f64,
    pub current_segment_index: usize,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeoPosition {
    pub fn new (latitude: f64, longitude: f64, altitude: f64)->Self {
        GeoPosition { latitude, longitude, altitude }
    }
}
