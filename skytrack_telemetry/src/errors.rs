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


use thiserror::Error;
use skytrack_common::{map_to_opaque_error, CommonError};

pub type Result<T> = std::result::Result<T, SkytrackError>;

/// skytrack_telemetry specific error type. Errors are `Clone` since terminal channel errors are
/// reported to every registered message handler, hence we map foreign errors into opaque strings
#[derive(Error,Debug,Clone,PartialEq)]
pub enum SkytrackError {
    #[error("IO error {0}")]
    IOError(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("websock error {0}")]
    WsError(String),

    #[error("websock protocol error {0}")]
    WsProtocolError(String), // unparseable or unexpected frames

    #[error("websocket closed by server")]
    WsClosedError,

    #[error("JSON error {0}")]
    JsonError(String),

    #[error("timeout error {0}")]
    TimeoutError(String),

    #[error("telemetry channel is closed")]
    ChannelClosed,

    #[error("waypoint path is empty")]
    EmptyPath,

    #[error("invalid progress value {0}")]
    InvalidProgress(f64),

    #[error("read model error {0}")]
    ReadModelError(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

map_to_opaque_error!{ std::io::Error => SkytrackError::IOError }
map_to_opaque_error!{ serde_json::Error => SkytrackError::JsonError }
map_to_opaque_error!{ url::ParseError => SkytrackError::WsError }
map_to_opaque_error!{ tokio_tungstenite::tungstenite::Error => SkytrackError::WsError }
map_to_opaque_error!{ tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue => SkytrackError::WsError }
map_to_opaque_error!{ tokio::time::error::Elapsed => SkytrackError::TimeoutError }

impl From<CommonError> for SkytrackError {
    fn from (e: CommonError)->Self {
        match e {
            CommonError::IOError(msg) => SkytrackError::IOError(msg),
            CommonError::ConfigError(msg) => SkytrackError::ConfigError(msg),
        }
    }
}

pub fn op_failed (msg: impl ToString)->SkytrackError {
    SkytrackError::OpFailed(msg.to_string())
}

pub fn protocol_error (msg: impl ToString)->SkytrackError {
    SkytrackError::WsProtocolError(msg.to_string())
}

pub fn read_model_error (msg: impl ToString)->SkytrackError {
    SkytrackError::ReadModelError(msg.to_string())
}
