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


use std::sync::{Arc,Mutex};
use chrono::Utc;
use skytrack_telemetry::{
    cache::{Availability, CacheValue, ORDERS_KEY, CHANNEL_STATUS_KEY, order_key, telemetry_key, position_key},
    ws::OrderStatusPayload,
    cache_ops, CacheOp, CacheSyncBridge, MemoryCache, Order, OrderReadModel, OrderStatus, OrderStore, Result,
    SharedCache, SkytrackError, TelemetryMessage, TelemetryPayload, Waypoint, WaypointAction, WaypointPath
};

/// records the cache operations in the order they are applied
#[derive(Default)]
struct RecordingCache {
    ops: Mutex<Vec<CacheOp>>
}

impl SharedCache for RecordingCache {
    fn set (&self, key: &str, value: CacheValue) {
        self.ops.lock().unwrap().push( CacheOp::Set { key: key.to_string(), value });
    }
    fn invalidate (&self, key: &str) {
        self.ops.lock().unwrap().push( CacheOp::Invalidate { key: key.to_string() });
    }
}

struct UnavailableReadModel;

impl OrderReadModel for UnavailableReadModel {
    fn get_orders (&self)->Result<Vec<Order>> { Err( SkytrackError::ReadModelError("db offline".to_string())) }
    fn get_order (&self, id: &str)->Result<Option<Order>> { Err( SkytrackError::ReadModelError("db offline".to_string())) }
    fn get_mission_waypoints (&self, order_id: &str)->Result<Option<WaypointPath>> { Err( SkytrackError::ReadModelError("db offline".to_string())) }
}

fn telemetry (drone_id: &str, order_id: Option<&str>, mission_id: Option<&str>, progress: Option<f64>)->TelemetryMessage {
    TelemetryMessage::Telemetry {
        data: Arc::new( TelemetryPayload {
            drone_id: drone_id.to_string(),
            order_id: order_id.map( |s| s.to_string()),
            mission_id: mission_id.map( |s| s.to_string()),
            latitude: 37.0,
            longitude: -122.0,
            altitude: 80.0,
            heading: 180.0,
            battery_remaining: 0.75,
            ground_speed: 6.5,
            mission_progress: progress,
            current_waypoint: None,
            timestamp: Utc::now(),
        })
    }
}

fn status_update (order_id: &str, status: OrderStatus)->TelemetryMessage {
    TelemetryMessage::StatusUpdate { data: OrderStatusPayload { order_id: order_id.to_string(), status, message: None } }
}

fn delivery_store ()->OrderStore {
    let store = OrderStore::new();
    store.set_mission( "ord-1", WaypointPath::new( vec![
        Waypoint::new( 0.0, 0.0, 0.0, WaypointAction::Takeoff),
        Waypoint::new( 0.0, 10.0, 100.0, WaypointAction::Waypoint),
        Waypoint::new( 10.0, 10.0, 50.0, WaypointAction::Land),
    ]));
    store
}

#[test]
fn test_cache_ops() {
    let ops = cache_ops( &status_update( "ord-1", OrderStatus::InFlight));
    assert_eq!( ops, vec![
        CacheOp::Invalidate { key: "/orders".to_string() },
        CacheOp::Invalidate { key: "/orders/ord-1".to_string() },
    ]);

    let msg = telemetry( "drone_1", None, None, None);
    let TelemetryMessage::Telemetry { data } = &msg else { unreachable!() };
    assert_eq!( cache_ops( &msg), vec![
        CacheOp::Set { key: "/telemetry/drone_1".to_string(), value: CacheValue::Telemetry( data.clone()) }
    ]);

    assert_eq!( cache_ops( &TelemetryMessage::SubscribeAck), vec![
        CacheOp::Set { key: CHANNEL_STATUS_KEY.to_string(), value: CacheValue::ChannelStatus( Availability::Available) }
    ]);
    assert_eq!( cache_ops( &TelemetryMessage::terminal_error("server gone")), vec![
        CacheOp::Set { key: CHANNEL_STATUS_KEY.to_string(), value: CacheValue::ChannelStatus( Availability::Unavailable("server gone".to_string())) }
    ]);
    assert!( cache_ops( &TelemetryMessage::error("Unknown message type: foo")).is_empty());
}

#[test]
fn test_ops_are_applied_in_delivery_order() {
    let bridge = CacheSyncBridge::new( RecordingCache::default(), OrderStore::new());

    bridge.apply( &TelemetryMessage::SubscribeAck);
    bridge.apply( &status_update( "ord-2", OrderStatus::Completed));
    bridge.apply( &telemetry( "drone_2", None, None, None));

    let keys: Vec<String> = bridge.cache().ops.lock().unwrap().iter().map( |op| match op {
        CacheOp::Set { key, .. } => format!("set {key}"),
        CacheOp::Invalidate { key } => format!("invalidate {key}"),
    }).collect();

    assert_eq!( keys, vec![
        "set /channel/status", "invalidate /orders", "invalidate /orders/ord-2", "set /telemetry/drone_2"
    ]);
}

#[test]
fn test_status_update_invalidates_orders() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), OrderStore::new());

    // whatever consumers cached under these keys
    cache.set( ORDERS_KEY, CacheValue::ChannelStatus( Availability::Available));
    cache.set( &order_key("ord-1"), CacheValue::ChannelStatus( Availability::Available));
    cache.set( &order_key("ord-2"), CacheValue::ChannelStatus( Availability::Available));

    bridge.apply( &status_update( "ord-1", OrderStatus::Failed));

    assert!( !cache.contains_key( ORDERS_KEY));
    assert!( !cache.contains_key( &order_key("ord-1")));
    assert!( cache.contains_key( &order_key("ord-2"))); // not referenced
}

#[test]
fn test_telemetry_replaces_entry() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), OrderStore::new());

    bridge.apply( &telemetry( "drone_1", Some("ord-9"), Some("m-1"), Some(0.3)));
    let t = cache.telemetry( "drone_1").expect("no telemetry entry");
    assert_eq!( t.mission_id.as_deref(), Some("m-1"));

    // a snapshot without mission fields must not inherit the old ones
    bridge.apply( &telemetry( "drone_1", None, None, None));
    let t = cache.telemetry( "drone_1").expect("no telemetry entry");
    assert!( t.mission_id.is_none() && t.order_id.is_none() && t.mission_progress.is_none());

    bridge.apply( &telemetry( "drone_2", None, None, None));
    assert_eq!( cache.get_clones_with_prefix( "/telemetry/").len(), 2);
}

#[test]
fn test_position_is_published()->Result<()> {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), delivery_store());

    bridge.apply( &telemetry( "drone_1", Some("ord-1"), None, Some(0.25)));
    let tracked = cache.position( "ord-1").expect("no position");
    println!("{tracked:?}");
    assert_eq!( tracked.drone_id, "drone_1");
    assert_eq!( tracked.current_segment_index, 0);
    assert_eq!( (tracked.position.latitude, tracked.position.longitude, tracked.position.altitude), (0.0, 5.0, 50.0));

    bridge.apply( &telemetry( "drone_1", Some("ord-1"), None, Some(0.75)));
    let tracked = cache.position( "ord-1").expect("no position");
    assert_eq!( tracked.current_segment_index, 1);
    assert_eq!( (tracked.position.latitude, tracked.position.longitude, tracked.position.altitude), (5.0, 10.0, 75.0));

    // out of range progress values are clamped
    bridge.apply( &telemetry( "drone_1", Some("ord-1"), None, Some(1.2)));
    let tracked = cache.position( "ord-1").expect("no position");
    assert_eq!( tracked.progress, 1.0);
    assert_eq!( (tracked.position.latitude, tracked.position.longitude, tracked.position.altitude), (10.0, 10.0, 50.0));
    Ok(())
}

#[test]
fn test_no_position_without_mission() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), delivery_store());

    bridge.apply( &telemetry( "drone_1", Some("ord-unknown"), None, Some(0.5))); // no waypoints
    bridge.apply( &telemetry( "drone_2", Some("ord-1"), None, None));           // no progress
    bridge.apply( &telemetry( "drone_3", Some("ord-1"), None, Some(f64::NAN)));  // not interpolatable

    assert!( cache.position( "ord-unknown").is_none());
    assert!( cache.position( "ord-1").is_none());
    assert_eq!( cache.get_clones_with_prefix( "/telemetry/").len(), 3);
}

#[test]
fn test_read_model_failure_keeps_telemetry() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), UnavailableReadModel);

    bridge.apply( &telemetry( "drone_1", Some("ord-1"), None, Some(0.5)));
    assert!( cache.telemetry( "drone_1").is_some());
    assert!( cache.position( "ord-1").is_none());
}

#[test]
fn test_channel_availability() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), OrderStore::new());
    assert_eq!( cache.channel_status(), None);

    bridge.apply( &TelemetryMessage::terminal_error("reconnect attempts exhausted"));
    assert_eq!( cache.channel_status(), Some( Availability::Unavailable("reconnect attempts exhausted".to_string())));

    bridge.apply( &TelemetryMessage::SubscribeAck);
    assert_eq!( cache.channel_status(), Some( Availability::Available));
}

#[test]
fn test_server_error_keeps_channel_available() {
    let cache = Arc::new( MemoryCache::new());
    let bridge = CacheSyncBridge::new( cache.clone(), OrderStore::new());

    bridge.apply( &TelemetryMessage::SubscribeAck);
    bridge.apply( &TelemetryMessage::error("Unknown message type: foo")); // connection stays up
    bridge.apply( &telemetry( "drone_1", None, None, None));

    assert!( cache.telemetry( "drone_1").is_some());
    assert_eq!( cache.channel_status(), Some( Availability::Available));
}

#[test]
fn test_order_store_from_json()->Result<()> {
    let json = r#"{
        "orders": [
            {"id": "ord-2", "status": "scheduled"},
            {"id": "ord-1", "status": "in_flight", "drone_id": "drone_002", "description": "medical supplies"}
        ],
        "missions": {
            "ord-1": [
                {"lat": 37.77, "lng": -122.41, "altitude": 0.0, "action": "takeoff"},
                {"lat": 37.76, "lng": -122.39, "altitude": 0.0, "action": "land"}
            ]
        }
    }"#;
    let store = OrderStore::from_json_str( json)?;

    let orders = store.get_orders()?;
    assert_eq!( orders.iter().map( |o| o.id.as_str()).collect::<Vec<_>>(), vec!["ord-1", "ord-2"]);
    assert_eq!( store.get_order( "ord-1")?.and_then( |o| o.drone_id), Some("drone_002".to_string()));
    assert!( store.get_order( "ord-3")?.is_none());

    assert_eq!( store.get_mission_waypoints( "ord-1")?.map( |p| p.len()), Some(2));
    assert!( store.get_mission_waypoints( "ord-2")?.is_none());

    assert!( OrderStore::from_json_str( "{\"orders\": 42}").is_err());
    Ok(())
}
