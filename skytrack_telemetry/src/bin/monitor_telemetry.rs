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


/// command line tool to monitor the live telemetry of a drone delivery server. Messages are passed through
/// a CacheSyncBridge into an in-memory cache, which provides the interpolated marker positions of orders
/// that have mission waypoints (read from an optional JSON mission file).
///
/// example:
/// ```
/// RUST_LOG=info monitor_telemetry --config configs/telemetry.ron --missions configs/missions.json
/// ```

use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use skytrack_telemetry::{
    load_config, CacheSyncBridge, MemoryCache, OrderStore, TelemetryChannel, TelemetryConfig, TelemetryMessage,
    TelemetryPayload, WsTransport
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "monitor live drone telemetry and order status updates")]
pub struct Args {
    /// RON config file (uses built-in defaults if not set)
    #[arg(short,long)]
    pub config: Option<String>,

    /// JSON file with orders and mission waypoints
    #[arg(short,long)]
    pub missions: Option<String>,

    /// comma separated topics to subscribe to (overrides config)
    #[arg(short,long, value_delimiter=',')]
    pub topics: Vec<String>,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    let config: TelemetryConfig = match &args.config {
        Some(path) => load_config(path)?,
        None => TelemetryConfig::default()
    };
    let topics = if args.topics.is_empty() { config.topics.clone() } else { args.topics.clone() };

    let read_model = match &args.missions {
        Some(path) => OrderStore::from_json_file(path)?,
        None => OrderStore::new()
    };
    println!("loaded {} missions", read_model.mission_count());

    let cache = Arc::new( MemoryCache::new());
    let bridge = Arc::new( CacheSyncBridge::new( cache.clone(), read_model));

    let transport = WsTransport::new( &config.ws_uri, config.access_token.clone());
    let channel = TelemetryChannel::from_config( transport, &config);

    bridge.attach( &channel); // has to come first so that we can print the updated cache entries
    channel.on_message( move |msg| print_message( msg, &cache));

    println!("connecting to {} with topics {:?}", config.ws_uri, topics);
    println!("terminate with ctrl-C");
    channel.connect( topics)?;

    tokio::signal::ctrl_c().await?;
    channel.disconnect();
    println!("\nterminated.");

    Ok(())
}

fn print_message (msg: &TelemetryMessage, cache: &MemoryCache) {
    match msg {
        TelemetryMessage::Telemetry { data } => {
            print_telemetry( data);
            if let Some(tracked) = data.order_id.as_ref().and_then( |id| cache.position(id)) {
                let pos = tracked.position;
                println!("    order {} marker: {:.5},{:.5} {:.0}m (segment {})",
                    tracked.order_id, pos.latitude, pos.longitude, pos.altitude, tracked.current_segment_index);
            }
        }
        TelemetryMessage::StatusUpdate { data } => {
            println!("status    {:<12} {:<10} {}", data.order_id, data.status, data.message.as_deref().unwrap_or(""));
        }
        TelemetryMessage::SubscribeAck => println!("-- subscribed"),
        TelemetryMessage::Error { reason, terminal } => eprintln!("{} {reason}", if *terminal { "FATAL" } else { "ERROR" }),
    }
}

fn print_telemetry (t: &TelemetryPayload) {
    let progress = t.mission_progress.map( |p| format!("{:3.0}%", p * 100.0)).unwrap_or_else( || "   -".to_string());
    println!("telemetry {:<12} {:9.5},{:10.5} {:6.1}m {:5.1}m/s {:3.0}% bat  progress {}  {}",
        t.drone_id, t.latitude, t.longitude, t.altitude, t.ground_speed, t.battery_remaining * 100.0, progress,
        t.timestamp.format("%H:%M:%S"));
}
