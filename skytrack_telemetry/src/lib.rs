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


//! live telemetry synchronization for drone delivery monitoring.
//!
//! The crate consists of three parts
//!   - [`TelemetryChannel`] - the persistent, self-healing websocket subscription to the telemetry server
//!   - [`interpolate`] - the (pure) position of an entity along a [`WaypointPath`] for a given progress
//!   - [`CacheSyncBridge`] - publishes channel messages and derived positions into a shared read cache
//!
//! The channel is generic over its [`Transport`] so that it can be driven by in-memory connections.
//! [`WsTransport`] is the production websocket implementation.

use std::{path::Path,time::Duration};
use serde::{Deserialize,Serialize};
use skytrack_common::datetime::{
    deserialize_duration,serialize_duration,deserialize_optional_duration,serialize_optional_duration,secs
};

pub mod ws;
pub mod transport;
pub mod backoff;
pub mod waypoint;
pub mod interpolate;
pub mod cache;
pub mod read_model;
pub mod bridge;

mod channel;
pub use channel::{TelemetryChannel,ChannelState,ChannelStatus,ChannelOptions};

mod errors;
pub use errors::{SkytrackError,Result,op_failed};

pub use ws::{TelemetryMessage,TelemetryPayload,OrderStatusPayload,OrderStatus,WsTransport};
pub use transport::{Transport,TransportConnection};
pub use backoff::ReconnectPolicy;
pub use waypoint::{Waypoint,WaypointAction,WaypointPath,TraversalState,GeoPosition};
pub use interpolate::{interpolate,traversal_state};
pub use cache::{SharedCache,MemoryCache,CacheValue};
pub use read_model::{Order,OrderReadModel,OrderStore};
pub use bridge::{CacheSyncBridge,CacheOp,cache_ops};

/// subscription topics are plain server defined names ("telemetry", "orders", ..)
pub type Topic = String;

#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub ws_uri: String,
    pub access_token: Option<String>,
    pub topics: Vec<Topic>,
    pub reconnect: ReconnectPolicy,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub connect_timeout: Duration,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub ack_timeout: Duration,

    #[serde(serialize_with="serialize_optional_duration", deserialize_with="deserialize_optional_duration")]
    pub ping_interval: Option<Duration>, // no keepalive pings if not set
}

impl Default for TelemetryConfig {
    fn default()->Self {
        TelemetryConfig {
            ws_uri: "ws://localhost:8000/ws/telemetry".to_string(),
            access_token: None,
            topics: vec!["telemetry".to_string(), "orders".to_string()],
            reconnect: ReconnectPolicy::default(),
            connect_timeout: secs(10),
            ack_timeout: secs(5),
            ping_interval: None,
        }
    }
}

pub fn load_config<P: AsRef<Path>> (path: P)->Result<TelemetryConfig> {
    Ok( skytrack_common::config::load_config(path)? )
}
