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


use std::{fmt,sync::Arc};
use futures::{SinkExt,StreamExt};
use chrono::{DateTime,Utc};
use serde::{Deserialize,Serialize};
use serde_json::{self,Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, WebSocketStream, MaybeTlsStream,
    tungstenite::{
        protocol::Message,
        http::header::{AUTHORIZATION,HeaderValue},
        client::IntoClientRequest
    }
};
use tracing::debug;
use skytrack_common::datetime::deserialize_utc_datetime;

use crate::{Topic, transport::{Transport,TransportConnection}};
use crate::errors::{Result, protocol_error};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/* #region websocket messages ***********************************************************************/

// in:   {"type":"subscribe_ack"}
// in:   {"type":"telemetry","data":{"drone_id":"drone_002","order_id":"4f1c..","latitude":37.77,"longitude":-122.41,"altitude":42.0,
//                                   "heading":270.0,"battery_remaining":0.83,"ground_speed":5.1,"mission_progress":0.4,
//                                   "timestamp":"2025-06-18T14:02:11Z"}}
// in:   {"type":"status_update","data":{"order_id":"4f1c..","status":"in_flight","message":"drone_002 took off"}}
// in:   {"type":"error","message":"Unknown message type: foo"}
// out:  {"type":"subscribe","topics":["orders","telemetry"]}

/// the messages we get from the telemetry server through the websocket, in wire arrival order
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(tag="type", rename_all="snake_case")]
pub enum TelemetryMessage {
    Telemetry { data: Arc<TelemetryPayload> },

    StatusUpdate { data: OrderStatusPayload },

    #[serde(alias="subscribed")]
    SubscribeAck,

    /// server reported errors are not terminal. The channel itself only sends a terminal error
    /// once it gives up reconnecting
    Error {
        #[serde(alias="message")]
        reason: String,

        #[serde(skip)]
        terminal: bool
    }
}

impl TelemetryMessage {
    pub fn error (reason: impl ToString)->Self {
        TelemetryMessage::Error { reason: reason.to_string(), terminal: false }
    }

    pub fn terminal_error (reason: impl ToString)->Self {
        TelemetryMessage::Error { reason: reason.to_string(), terminal: true }
    }

    /// true if this reports that the channel gave up, i.e. telemetry is unavailable until reconnected
    pub fn is_terminal (&self)->bool {
        matches!( self, TelemetryMessage::Error { terminal: true, .. })
    }

    pub fn kind (&self)->&'static str {
        match self {
            TelemetryMessage::Telemetry{..} => "telemetry",
            TelemetryMessage::StatusUpdate{..} => "status_update",
            TelemetryMessage::SubscribeAck => "subscribe_ack",
            TelemetryMessage::Error{..} => "error",
        }
    }
}

/// drone state snapshot. Each one fully replaces the previous snapshot of the same drone
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TelemetryPayload {
    pub drone_id: String,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub mission_id: Option<String>,

    #[serde(alias="lat")]
    pub latitude: f64,   // degrees

    #[serde(alias="lng", alias="lon")]
    pub longitude: f64,  // degrees

    pub altitude: f64,   // meters
    #[serde(default)]
    pub heading: f64,    // degrees

    pub battery_remaining: f64, // fraction [0..1]
    pub ground_speed: f64,      // m/s

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub mission_progress: Option<f64>, // fraction [0..1]

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub current_waypoint: Option<usize>,

    #[serde(deserialize_with="deserialize_utc_datetime")]
    pub timestamp: DateTime<Utc>, // naive server timestamps are UTC
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct OrderStatusPayload {
    pub order_id: String,
    pub status: OrderStatus,

    #[serde(default, skip_serializing_if="Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
#[serde(rename_all="snake_case")]
pub enum OrderStatus {
    Pending,
    Scheduled,
    InFlight,
    Completed,
    Failed,

    #[serde(other)]
    Unknown
}

impl fmt::Display for OrderStatus {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Scheduled => "scheduled",
            OrderStatus::InFlight => "in_flight",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// outgoing websocket messages
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(tag="type", rename_all="snake_case")]
pub enum ClientFrame {
    Subscribe { topics: Vec<Topic> },
    Unsubscribe { topics: Vec<Topic> },
    Ping { timestamp: i64 }, // epoch millis
}

impl ClientFrame {
    pub fn subscribe<'a> (topics: impl IntoIterator<Item=&'a Topic>)->Self {
        ClientFrame::Subscribe { topics: topics.into_iter().cloned().collect() }
    }

    pub fn new_ping ()->Self {
        ClientFrame::Ping { timestamp: Utc::now().timestamp_millis() }
    }

    pub fn to_json (&self)->Result<String> {
        Ok( serde_json::to_string(self)? )
    }
}

/// parse an inbound text frame. Keepalive responses (`pong`) are consumed here and returned as `None`,
/// everything that is not a known [`TelemetryMessage`] variant is a protocol error
pub fn parse_frame (text: &str)->Result<Option<TelemetryMessage>> {
    let value: Value = serde_json::from_str(text).map_err(|e| protocol_error(format!("not a JSON frame: {e}")))?;

    match value.get("type").and_then(Value::as_str) {
        Some("pong") => Ok(None),
        Some(_) => {
            let msg = serde_json::from_value::<TelemetryMessage>(value).map_err(|e| protocol_error(format!("unknown frame: {e}")))?;
            Ok(Some(msg))
        }
        None => Err( protocol_error("frame without 'type'"))
    }
}

/* #endregion websocket messages */

/* #region websocket transport **********************************************************************/

pub async fn connect (ws_uri: &str, access_token: Option<&str>)->Result<WsStream> {
    let mut request = ws_uri.into_client_request()?;

    if let Some(token) = access_token {
        let auth_val = format!("Bearer {}", token);
        request.headers_mut().append( AUTHORIZATION, HeaderValue::from_str(auth_val.as_str())?);
    }

    let (ws_stream,response) = connect_async(request).await?;
    debug!("websocket connected to {ws_uri} (status {})", response.status());
    Ok(ws_stream)
}

/// the production [`Transport`] that opens a new websocket for each connection epoch
#[derive(Debug,Clone)]
pub struct WsTransport {
    ws_uri: String,
    access_token: Option<String>,
}

impl WsTransport {
    pub fn new (ws_uri: impl ToString, access_token: Option<String>)->Self {
        WsTransport { ws_uri: ws_uri.to_string(), access_token }
    }
}

impl Transport for WsTransport {
    type Connection = WsConnection;

    async fn open (&mut self)->Result<WsConnection> {
        let ws = connect( self.ws_uri.as_str(), self.access_token.as_deref()).await?;
        Ok( WsConnection { ws } )
    }
}

pub struct WsConnection {
    ws: WsStream
}

impl TransportConnection for WsConnection {
    async fn send_text (&mut self, text: String)->Result<()> {
        Ok( self.ws.send( Message::text(text)).await? )
    }

    async fn next_text (&mut self)->Option<Result<String>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some( Ok( text.as_str().to_string())),
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue, // binary and websocket control frames are not part of our protocol
                Err(e) => return Some( Err( e.into()))
            }
        }
    }
}

/* #endregion websocket transport */
