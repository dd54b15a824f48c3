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


use std::{collections::HashMap,fs,path::Path,sync::{Arc,RwLock,PoisonError}};
use chrono::{DateTime,Utc};
use serde::{Deserialize,Serialize};

use crate::errors::Result;
use crate::waypoint::{Waypoint,WaypointPath};
use crate::ws::OrderStatus;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub drone_id: Option<String>,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// the order/mission records as seen by the core, which only reads them.
/// Calls are synchronous since they are made from within message handlers
pub trait OrderReadModel: Send + Sync + 'static {
    fn get_orders (&self)->Result<Vec<Order>>;
    fn get_order (&self, id: &str)->Result<Option<Order>>;
    fn get_mission_waypoints (&self, order_id: &str)->Result<Option<WaypointPath>>;
}

impl<R> OrderReadModel for Arc<R> where R: OrderReadModel {
    fn get_orders (&self)->Result<Vec<Order>> { self.as_ref().get_orders() }
    fn get_order (&self, id: &str)->Result<Option<Order>> { self.as_ref().get_order(id) }
    fn get_mission_waypoints (&self, order_id: &str)->Result<Option<WaypointPath>> { self.as_ref().get_mission_waypoints(order_id) }
}

/// file format for [`OrderStore`] snapshots:
/// `{ "orders": [ {"id":"o1","status":"in_flight"} ], "missions": { "o1": [ {"lat":..,"lng":..,"altitude":..,"action":"takeoff"}, .. ] } }`
#[derive(Serialize,Deserialize,Debug,Default)]
#[serde(default)]
struct OrderStoreSnapshot {
    orders: Vec<Order>,
    missions: HashMap<String,Vec<Waypoint>>,
}

/// in-memory [`OrderReadModel`] e.g. for stand-alone monitoring or testing
#[derive(Debug,Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<String,Order>>,
    missions: RwLock<HashMap<String,WaypointPath>>,
}

impl OrderStore {
    pub fn new ()->Self {
        OrderStore::default()
    }

    pub fn from_json_str (json: &str)->Result<Self> {
        let snapshot: OrderStoreSnapshot = serde_json::from_str(json)?;
        let store = OrderStore::new();
        for order in snapshot.orders {
            store.insert_order( order);
        }
        for (order_id, waypoints) in snapshot.missions {
            store.set_mission( order_id, WaypointPath::new(waypoints));
        }
        Ok(store)
    }

    pub fn from_json_file<P: AsRef<Path>> (path: P)->Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str( json.as_str())
    }

    pub fn insert_order (&self, order: Order) {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        orders.insert( order.id.clone(), order);
    }

    /// missions are never modified, re-planning replaces the whole path
    pub fn set_mission (&self, order_id: impl ToString, path: WaypointPath) {
        let mut missions = self.missions.write().unwrap_or_else(PoisonError::into_inner);
        missions.insert( order_id.to_string(), path);
    }

    pub fn mission_count (&self)->usize {
        self.missions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl OrderReadModel for OrderStore {
    fn get_orders (&self)->Result<Vec<Order>> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        let mut list: Vec<Order> = orders.values().cloned().collect();
        list.sort_by( |a,b| a.id.cmp(&b.id));
        Ok(list)
    }

    fn get_order (&self, id: &str)->Result<Option<Order>> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        Ok( orders.get(id).cloned() )
    }

    fn get_mission_waypoints (&self, order_id: &str)->Result<Option<WaypointPath>> {
        let missions = self.missions.read().unwrap_or_else(PoisonError::into_inner);
        Ok( missions.get(order_id).cloned() )
    }
}
