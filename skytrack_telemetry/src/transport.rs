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


use std::future::Future;
use crate::errors::Result;

/// the seam between a [`TelemetryChannel`](crate::TelemetryChannel) and the message oriented connection
/// it runs on. The channel calls `open()` once per connection epoch, i.e. for the initial connect and for
/// each reconnect. Implementations are the websocket based [`WsTransport`](crate::ws::WsTransport) and
/// in-memory fakes for testing
pub trait Transport: Send + 'static {
    type Connection: TransportConnection;

    fn open (&mut self)->impl Future<Output=Result<Self::Connection>> + Send;
}

/// a single live connection. Dropping it closes the connection
pub trait TransportConnection: Send + 'static {
    fn send_text (&mut self, text: String)->impl Future<Output=Result<()>> + Send;

    /// the next inbound text frame, or `None` if the connection was closed by the peer.
    /// This has to be cancellation safe since it is used within `select!`
    fn next_text (&mut self)->impl Future<Output=Option<Result<String>>> + Send;
}
