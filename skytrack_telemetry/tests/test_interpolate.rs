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


use skytrack_telemetry::{
    interpolate, traversal_state, interpolate::interpolate_state,
    GeoPosition, Result, SkytrackError, TraversalState, Waypoint, WaypointAction, WaypointPath
};

const EPS: f64 = 1e-9;

fn path (coords: &[(f64,f64,f64)])->WaypointPath {
    coords.iter().map( |(lat,lon,alt)| Waypoint::new( *lat, *lon, *alt, WaypointAction::Waypoint)).collect::<Vec<_>>().into()
}

fn delivery_path ()->WaypointPath {
    path( &[(0.0,0.0,0.0), (0.0,10.0,100.0), (10.0,10.0,50.0)])
}

fn assert_pos (pos: GeoPosition, lat: f64, lon: f64, alt: f64) {
    assert!( (pos.latitude - lat).abs() < EPS, "latitude {} != {}", pos.latitude, lat);
    assert!( (pos.longitude - lon).abs() < EPS, "longitude {} != {}", pos.longitude, lon);
    assert!( (pos.altitude - alt).abs() < EPS, "altitude {} != {}", pos.altitude, alt);
}

#[test]
fn test_interpolate_within_segments()->Result<()> {
    let path = delivery_path();

    let pos = interpolate( &path, 0.25)?;
    println!("0.25 -> {pos:?}");
    assert_pos( pos, 0.0, 5.0, 50.0);

    let pos = interpolate( &path, 0.75)?;
    println!("0.75 -> {pos:?}");
    assert_pos( pos, 5.0, 10.0, 75.0);

    Ok(())
}

#[test]
fn test_interpolate_endpoints()->Result<()> {
    let path = delivery_path();

    assert_eq!( interpolate( &path, 0.0)?, path[0].position());
    assert_eq!( interpolate( &path, 1.0)?, path[2].position());

    // out of range progress is clamped
    assert_eq!( interpolate( &path, -0.3)?, path[0].position());
    assert_eq!( interpolate( &path, 1.7)?, path[2].position());
    assert_eq!( interpolate( &path, f64::NEG_INFINITY)?, path[0].position());
    assert_eq!( interpolate( &path, f64::INFINITY)?, path[2].position());

    Ok(())
}

#[test]
fn test_segment_boundaries_are_continuous()->Result<()> {
    let path = path( &[(0.0,0.0,0.0), (1.0,2.0,30.0), (4.0,2.0,60.0), (4.0,-1.0,0.0), (5.0,-1.0,10.0)]);
    let n_segments = path.segment_count();
    assert_eq!( n_segments, 4);

    for i in 1..n_segments {
        let p = i as f64 / n_segments as f64;
        let at = interpolate( &path, p)?;
        let before = interpolate( &path, p - 1e-12)?;
        let after = interpolate( &path, p + 1e-12)?;

        assert_pos( at, path[i].latitude, path[i].longitude, path[i].altitude);
        assert!( (before.latitude - at.latitude).abs() < 1e-6 && (after.latitude - at.latitude).abs() < 1e-6);
        assert!( (before.altitude - at.altitude).abs() < 1e-6 && (after.altitude - at.altitude).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_single_waypoint()->Result<()> {
    let path = path( &[(37.5, -122.1, 42.0)]);
    assert_eq!( path.segment_count(), 0);
    assert!( !path.is_traversable());

    for p in [0.0, 0.3, 0.5, 1.0, 2.0] {
        assert_pos( interpolate( &path, p)?, 37.5, -122.1, 42.0);
    }

    let state = traversal_state( &path, 0.7)?;
    assert_eq!( state, TraversalState { progress: 0.7, current_segment_index: 0 });
    Ok(())
}

#[test]
fn test_invalid_input() {
    let empty = WaypointPath::new( Vec::new());
    assert_eq!( interpolate( &empty, 0.5), Err(SkytrackError::EmptyPath));
    assert_eq!( traversal_state( &empty, 0.5), Err(SkytrackError::EmptyPath));

    match interpolate( &delivery_path(), f64::NAN) {
        Err(SkytrackError::InvalidProgress(p)) => assert!( p.is_nan()),
        other => panic!("NaN progress not rejected: {other:?}")
    }
}

#[test]
fn test_traversal_state_is_derived_from_progress()->Result<()> {
    let path = delivery_path();

    assert_eq!( traversal_state( &path, 0.0)?.current_segment_index, 0);
    assert_eq!( traversal_state( &path, 0.49)?.current_segment_index, 0);
    assert_eq!( traversal_state( &path, 0.5)?.current_segment_index, 1);
    assert_eq!( traversal_state( &path, 1.0)?.current_segment_index, 1); // last segment, not n-1

    let state = traversal_state( &path, 1.5)?;
    assert_eq!( state, TraversalState { progress: 1.0, current_segment_index: 1 });

    // a stale segment index cannot desynchronize the position
    let stale = TraversalState { progress: 0.75, current_segment_index: 0 };
    assert_pos( interpolate_state( &path, stale)?, 5.0, 10.0, 75.0);
    Ok(())
}

#[test]
fn test_mission_file_waypoints()->Result<()> {
    let json = r#"[
        {"lat": 37.0, "lng": -122.0, "altitude": 0.0, "action": "takeoff"},
        {"lat": 37.0, "lon": -121.0, "altitude": 100.0, "waypoint_type": "navigate"},
        {"latitude": 38.0, "longitude": -121.0, "altitude": 0.0, "action": "land", "description": "drop-off"}
    ]"#;
    let path: WaypointPath = serde_json::from_str(json).map_err( |e| SkytrackError::JsonError(e.to_string()))?;

    assert_eq!( path.len(), 3);
    assert_eq!( path[0].action, WaypointAction::Takeoff);
    assert_eq!( path[1].action, WaypointAction::Waypoint);
    assert_eq!( path[2].description.as_deref(), Some("drop-off"));

    assert_pos( interpolate( &path, 0.25)?, 37.0, -121.5, 50.0);
    Ok(())
}
