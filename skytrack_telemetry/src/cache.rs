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


use std::{collections::HashMap,sync::{Arc,RwLock,PoisonError}};
use serde::{Deserialize,Serialize};

use crate::ws::TelemetryPayload;
use crate::waypoint::GeoPosition;

/* #region cache keys *******************************************************************************/

// structured, path-like keys so that consumers can query by prefix

pub const ORDERS_KEY: &str = "/orders";
pub const CHANNEL_STATUS_KEY: &str = "/channel/status";

pub fn order_key (order_id: &str)->String { format!("{ORDERS_KEY}/{order_id}") }
pub fn telemetry_key (drone_id: &str)->String { format!("/telemetry/{drone_id}") }
pub fn position_key (order_id: &str)->String { format!("/positions/{order_id}") }

/* #endregion cache keys */

/// the values the core publishes into the shared read cache
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub enum CacheValue {
    Telemetry(Arc<TelemetryPayload>),
    Position(TrackedPosition),
    ChannelStatus(Availability),
}

/// interpolated marker position of an order that is in flight
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TrackedPosition {
    pub order_id: String,
    pub drone_id: String,
    pub progress: f64,
    pub current_segment_index: usize,
    pub position: GeoPosition,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub enum Availability {
    Available,
    Unavailable(String)
}

/// the shared read cache as seen from the core. Implementations are responsible for their own
/// internal consistency
pub trait SharedCache: Send + Sync + 'static {
    fn set (&self, key: &str, value: CacheValue);
    fn invalidate (&self, key: &str);
}

impl<C> SharedCache for Arc<C> where C: SharedCache {
    fn set (&self, key: &str, value: CacheValue) { self.as_ref().set(key, value) }
    fn invalidate (&self, key: &str) { self.as_ref().invalidate(key) }
}

/// RwLock-synchronized in-memory [`SharedCache`]. Since values are shared between threads getters
/// return clones. Invalidation removes the entry, which forces consumers to re-fetch
#[derive(Debug,Default)]
pub struct MemoryCache {
    map: RwLock<HashMap<String,CacheValue>>
}

impl MemoryCache {
    pub fn new ()->Self {
        MemoryCache::default()
    }

    pub fn get_clone (&self, key: &str)->Option<CacheValue> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    pub fn contains_key (&self, key: &str)->bool {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(key)
    }

    pub fn len (&self)->usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty (&self)->bool {
        self.len() == 0
    }

    /// sorted (key,value) clones for all keys that start with `prefix`
    pub fn get_clones_with_prefix (&self, prefix: &str)->Vec<(String,CacheValue)> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        let mut res: Vec<(String,CacheValue)> = map.iter()
            .filter( |(k,_)| k.starts_with(prefix))
            .map( |(k,v)| (k.clone(), v.clone()))
            .collect();
        res.sort_by( |a,b| a.0.cmp(&b.0));
        res
    }

    pub fn telemetry (&self, drone_id: &str)->Option<Arc<TelemetryPayload>> {
        match self.get_clone( &telemetry_key(drone_id)) {
            Some(CacheValue::Telemetry(t)) => Some(t),
            _ => None
        }
    }

    pub fn position (&self, order_id: &str)->Option<TrackedPosition> {
        match self.get_clone( &position_key(order_id)) {
            Some(CacheValue::Position(p)) => Some(p),
            _ => None
        }
    }

    pub fn channel_status (&self)->Option<Availability> {
        match self.get_clone( CHANNEL_STATUS_KEY) {
            Some(CacheValue::ChannelStatus(a)) => Some(a),
            _ => None
        }
    }
}

impl SharedCache for MemoryCache {
    fn set (&self, key: &str, value: CacheValue) {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.insert( key.to_string(), value);
    }

    fn invalidate (&self, key: &str) {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
    }
}
