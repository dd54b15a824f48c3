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


use std::sync::Arc;
use tracing::{debug,warn};

use crate::cache::{
    SharedCache, CacheValue, TrackedPosition, Availability,
    ORDERS_KEY, CHANNEL_STATUS_KEY, order_key, telemetry_key, position_key
};
use crate::channel::TelemetryChannel;
use crate::interpolate::{interpolate,traversal_state};
use crate::read_model::OrderReadModel;
use crate::transport::Transport;
use crate::ws::{TelemetryMessage,TelemetryPayload};

#[derive(Debug,Clone,PartialEq)]
pub enum CacheOp {
    Set { key: String, value: CacheValue },
    Invalidate { key: String },
}

/// the invalidation table:
///   - `status_update` : invalidate the order collection and the referenced order entry
///   - `telemetry`     : replace (not merge) the telemetry entry of the drone
///   - `subscribe_ack` : channel status becomes available
///   - `error`         : channel status becomes unavailable (with the reason) if the channel gave up.
///                       Server reported errors leave the cache alone
pub fn cache_ops (msg: &TelemetryMessage)->Vec<CacheOp> {
    match msg {
        TelemetryMessage::StatusUpdate { data } => vec![
            CacheOp::Invalidate { key: ORDERS_KEY.to_string() },
            CacheOp::Invalidate { key: order_key( &data.order_id) },
        ],
        TelemetryMessage::Telemetry { data } => vec![
            CacheOp::Set { key: telemetry_key( &data.drone_id), value: CacheValue::Telemetry( data.clone()) },
        ],
        TelemetryMessage::SubscribeAck => vec![
            CacheOp::Set { key: CHANNEL_STATUS_KEY.to_string(), value: CacheValue::ChannelStatus( Availability::Available) },
        ],
        TelemetryMessage::Error { reason, terminal: true } => vec![
            CacheOp::Set { key: CHANNEL_STATUS_KEY.to_string(), value: CacheValue::ChannelStatus( Availability::Unavailable( reason.clone())) },
        ],
        TelemetryMessage::Error { terminal: false, .. } => Vec::new(),
    }
}

/// publishes [`TelemetryChannel`] output into the shared read cache, in the order the channel delivers it.
/// Telemetry of drones that execute a mission additionally yields the interpolated marker position
/// of the respective order
pub struct CacheSyncBridge<C,R> where C: SharedCache, R: OrderReadModel {
    cache: C,
    read_model: R,
}

impl<C,R> CacheSyncBridge<C,R> where C: SharedCache, R: OrderReadModel {
    pub fn new (cache: C, read_model: R)->Self {
        CacheSyncBridge { cache, read_model }
    }

    pub fn cache (&self)->&C {
        &self.cache
    }

    /// register as a message handler of `channel`
    pub fn attach<T: Transport> (self: &Arc<Self>, channel: &TelemetryChannel<T>) {
        let bridge = self.clone();
        channel.on_message( move |msg| bridge.apply(msg));
    }

    pub fn apply (&self, msg: &TelemetryMessage) {
        for op in cache_ops(msg) {
            match op {
                CacheOp::Set { key, value } => self.cache.set( &key, value),
                CacheOp::Invalidate { key } => self.cache.invalidate( &key),
            }
        }

        if let TelemetryMessage::Telemetry { data } = msg {
            self.publish_position( data);
        }
    }

    fn publish_position (&self, telemetry: &TelemetryPayload) {
        let (Some(order_id), Some(progress)) = (&telemetry.order_id, telemetry.mission_progress) else { return };

        match self.read_model.get_mission_waypoints( order_id) {
            Ok(Some(path)) => {
                match traversal_state( &path, progress).and_then( |state| Ok( (state, interpolate( &path, state.progress)?))) {
                    Ok((state,position)) => {
                        let tracked = TrackedPosition {
                            order_id: order_id.clone(),
                            drone_id: telemetry.drone_id.clone(),
                            progress: state.progress,
                            current_segment_index: state.current_segment_index,
                            position
                        };
                        self.cache.set( &position_key(order_id), CacheValue::Position(tracked));
                    }
                    Err(e) => warn!("cannot interpolate position of order {order_id}: {e}")
                }
            }
            Ok(None) => debug!("no mission waypoints for order {order_id}"),
            Err(e) => warn!("failed to get mission waypoints for order {order_id}: {e}")
        }
    }
}
