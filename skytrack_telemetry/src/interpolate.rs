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


//! position of a moving entity derived from its waypoint path and a progress fraction.
//!
//! Segments are weighted uniformly by waypoint count, not by distance, and positions are interpolated
//! linearly in latitude/longitude. This is not geodesically correct but it only drives map markers, and
//! it keeps the output stable across consumers. Do not replace it with great-circle interpolation.

use crate::errors::{Result,SkytrackError};
use crate::waypoint::{GeoPosition,TraversalState,Waypoint,WaypointPath};

struct Segment {
    index: usize,
    fraction: f64,
}

fn check_progress (progress: f64)->Result<()> {
    if progress.is_nan() { Err( SkytrackError::InvalidProgress(progress)) } else { Ok(()) }
}

/// active segment and intra-segment fraction for a path with `n >= 2` waypoints
fn active_segment (n: usize, progress: f64)->Segment {
    let last_segment = n - 2;
    let scaled = progress * (n - 1) as f64;
    let index = (scaled.floor().max(0.0) as usize).min(last_segment);
    let fraction = (scaled - index as f64).clamp(0.0, 1.0);
    Segment { index, fraction }
}

#[inline]
fn lerp (a: f64, b: f64, t: f64)->f64 {
    a + (b - a) * t
}

fn lerp_waypoints (a: &Waypoint, b: &Waypoint, t: f64)->GeoPosition {
    GeoPosition {
        latitude: lerp( a.latitude, b.latitude, t),
        longitude: lerp( a.longitude, b.longitude, t),
        altitude: lerp( a.altitude, b.altitude, t),
    }
}

/// the current position for a progress fraction in `[0,1]`. Values outside are clamped, i.e.
/// `progress <= 0` yields the first and `progress >= 1` the last waypoint exactly. A single waypoint
/// path yields that waypoint for all progress values. Empty paths and NaN progress are errors
pub fn interpolate (path: &WaypointPath, progress: f64)->Result<GeoPosition> {
    check_progress(progress)?;

    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SkytrackError::EmptyPath)
    };

    if path.len() == 1 || progress <= 0.0 {
        Ok( first.position())
    } else if progress >= 1.0 {
        Ok( last.position())
    } else {
        let seg = active_segment( path.len(), progress);
        Ok( lerp_waypoints( &path[seg.index], &path[seg.index + 1], seg.fraction))
    }
}

/// the [`TraversalState`] that is consistent with `progress`
pub fn traversal_state (path: &WaypointPath, progress: f64)->Result<TraversalState> {
    check_progress(progress)?;
    if path.is_empty() {
        return Err(SkytrackError::EmptyPath)
    }

    let progress = progress.clamp(0.0, 1.0);
    let current_segment_index = if path.is_traversable() { active_segment( path.len(), progress).index } else { 0 };
    Ok( TraversalState { progress, current_segment_index } )
}

/// convenience for callers that track a [`TraversalState`]. Only the progress is used, the segment
/// index is recomputed from it
pub fn interpolate_state (path: &WaypointPath, state: TraversalState)->Result<GeoPosition> {
    interpolate( path, state.progress)
}
