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


use std::{
    cell::Cell, collections::BTreeSet, future, panic::{self,AssertUnwindSafe}, time::Duration,
    sync::{Arc, Mutex, MutexGuard, PoisonError, atomic::{AtomicBool, Ordering}}
};
use tokio::{
    select,
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::AbortHandle,
    time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout}
};
use tracing::{debug, error, info, trace, warn};

use crate::{Topic, TelemetryConfig};
use crate::backoff::ReconnectPolicy;
use crate::errors::{Result, SkytrackError, op_failed, protocol_error};
use crate::transport::{Transport, TransportConnection};
use crate::ws::{ClientFrame, TelemetryMessage, parse_frame};

/* #region public interface *****************************************************************************************/

/// ```text
///  Disconnected --connect()--> Connecting --open--> AwaitingAck --ack--> Subscribed
///       ^                          |                    |                    |
///       +------ (backoff) ---------+---- fail/timeout --+---- close/error ---+
///
///  any --disconnect()--> Closed (terminal)
/// ```
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    AwaitingAck,
    Subscribed,
    Closed
}

#[derive(Debug,Clone,PartialEq)]
pub struct ChannelStatus {
    pub state: ChannelState,
    pub reconnect_attempt: u32,
    pub topics: BTreeSet<Topic>,
}

#[derive(Debug,Clone,PartialEq)]
pub struct ChannelOptions {
    pub reconnect: ReconnectPolicy,
    pub connect_timeout: Duration,
    pub ack_timeout: Duration,
    pub ping_interval: Option<Duration>,
}

impl From<&TelemetryConfig> for ChannelOptions {
    fn from (config: &TelemetryConfig)->Self {
        ChannelOptions {
            reconnect: config.reconnect.clone(),
            connect_timeout: config.connect_timeout,
            ack_timeout: config.ack_timeout,
            ping_interval: config.ping_interval,
        }
    }
}

impl Default for ChannelOptions {
    fn default()->Self {
        ChannelOptions::from( &TelemetryConfig::default())
    }
}

/// the persistent, self-healing subscription to the telemetry server.
///
/// A channel owns its [`Transport`] exclusively and runs at most one connection at a time. The connection is
/// managed by a background task that is spawned on the first [`connect`](Self::connect) call, hence this has to
/// be called from within a tokio runtime. Inbound messages are passed to all registered handlers in wire order.
///
/// Transport failures are recovered with an exponential backoff ([`ReconnectPolicy`]). Once the maximum number of
/// attempts is exceeded all handlers get a single terminal [`TelemetryMessage::Error`] and the channel stays
/// `Disconnected` until `connect()` is called again. Malformed frames are logged and dropped.
///
/// Delivery is at-most-once per connection epoch - frames that are lost during a disconnect are not replayed.
pub struct TelemetryChannel<T: Transport> {
    shared: Arc<Shared>,
    options: ChannelOptions,
    transport: Mutex<Option<T>>, // moved into the connection task on first connect
    cmd_tx: Mutex<Option<UnboundedSender<ChannelCmd>>>,
    task: Mutex<Option<AbortHandle>>,
}

impl<T: Transport> TelemetryChannel<T> {

    pub fn new (transport: T, options: ChannelOptions)->Self {
        TelemetryChannel {
            shared: Arc::new( Shared::new()),
            options,
            transport: Mutex::new( Some(transport)),
            cmd_tx: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn from_config (transport: T, config: &TelemetryConfig)->Self {
        Self::new( transport, ChannelOptions::from(config))
    }

    /// subscribe to `topics`. This is idempotent for the current topic set. A different topic set re-subscribes
    /// over the live connection (if any). If automatic reconnection was given up this starts a new reconnect cycle
    pub fn connect<I,S> (&self, topics: I)->Result<()> where I: IntoIterator<Item=S>, S: Into<Topic> {
        let topics: BTreeSet<Topic> = topics.into_iter().map( |t| t.into()).collect();

        let mut task = lock( &self.task); // disconnect() sets the closed flag before it takes the task
        if self.shared.is_closed() {
            return Err(SkytrackError::ChannelClosed)
        }

        if task.is_some() {
            match lock( &self.cmd_tx).as_ref() {
                Some(cmd_tx) => cmd_tx.send( ChannelCmd::Connect(topics)).map_err(|_| SkytrackError::ChannelClosed),
                None => Err(SkytrackError::ChannelClosed)
            }

        } else { // first connect - start the connection task
            let rt = Handle::try_current().map_err(|e| op_failed(format!("no async runtime to connect: {e}")))?;
            let transport = lock( &self.transport).take().ok_or(SkytrackError::ChannelClosed)?;

            {
                let mut status = lock( &self.shared.status);
                status.topics = topics;
                status.state = ChannelState::Connecting;
            }

            let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ChannelCmd>();
            let conn_task = ConnectionTask {
                shared: self.shared.clone(),
                transport,
                options: self.options.clone(),
                cmd_rx,
                acked: false
            };

            *task = Some( rt.spawn( conn_task.run()).abort_handle());
            *lock( &self.cmd_tx) = Some(cmd_tx);
            Ok(())
        }
    }

    /// register a message handler. Each handler gets every message (fan-out), in wire order.
    /// Handlers are executed synchronously on the connection task and should not block
    pub fn on_message<F> (&self, handler: F) where F: FnMut(&TelemetryMessage) + Send + 'static {
        self.shared.add_handler( Box::new(handler))
    }

    /// terminally close this channel. Once this returns there are no further handler invocations, even
    /// for frames that were already received by the transport. Pending reconnects are cancelled.
    /// This can also be called from within a handler
    pub fn disconnect (&self) {
        self.shared.closed.store( true, Ordering::SeqCst);

        if let Some(task) = lock( &self.task).take() {
            task.abort();
        }
        lock( &self.cmd_tx).take();

        // wait for a dispatch in progress on another thread. If we are called from within
        // a handler of this channel the dispatch loop checks the closed flag before each handler call
        if !self.shared.is_dispatching_here() {
            drop( lock( &self.shared.handlers));
        }

        let mut status = lock( &self.shared.status);
        if status.state != ChannelState::Closed {
            status.state = ChannelState::Closed;
            info!("telemetry channel closed");
        }
    }

    pub fn status (&self)->ChannelStatus {
        lock( &self.shared.status).clone()
    }

    pub fn state (&self)->ChannelState {
        lock( &self.shared.status).state
    }

    pub fn reconnect_attempt (&self)->u32 {
        lock( &self.shared.status).reconnect_attempt
    }

    pub fn subscribed_topics (&self)->BTreeSet<Topic> {
        lock( &self.shared.status).topics.clone()
    }
}

impl<T: Transport> Drop for TelemetryChannel<T> {
    fn drop (&mut self) {
        self.disconnect()
    }
}

/* #endregion public interface */

/* #region shared state and dispatch ********************************************************************************/

type MessageHandler = Box<dyn FnMut(&TelemetryMessage) + Send + 'static>;

#[derive(Debug)]
enum ChannelCmd {
    Connect(BTreeSet<Topic>)
}

thread_local! {
    // address of the Shared instance whose handlers are currently executed on this thread (0 if none)
    static DISPATCHING: Cell<usize> = const { Cell::new(0) };
}

/// resets the DISPATCHING marker even if a handler panics
struct DispatchGuard {
    prev: usize
}

impl DispatchGuard {
    fn enter (shared: &Shared)->Self {
        let prev = DISPATCHING.with( |d| d.replace( shared.addr()));
        DispatchGuard { prev }
    }
}

impl Drop for DispatchGuard {
    fn drop (&mut self) {
        DISPATCHING.with( |d| d.set( self.prev));
    }
}

/// state shared between a TelemetryChannel and its connection task
struct Shared {
    status: Mutex<ChannelStatus>,
    handlers: Mutex<Vec<MessageHandler>>,
    added_handlers: Mutex<Vec<MessageHandler>>, // registered while dispatching
    closed: AtomicBool,
}

impl Shared {
    fn new ()->Self {
        Shared {
            status: Mutex::new( ChannelStatus { state: ChannelState::Disconnected, reconnect_attempt: 0, topics: BTreeSet::new() }),
            handlers: Mutex::new( Vec::new()),
            added_handlers: Mutex::new( Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn addr (&self)->usize {
        self as *const Shared as usize
    }

    fn is_closed (&self)->bool {
        self.closed.load( Ordering::SeqCst)
    }

    fn is_dispatching_here (&self)->bool {
        DISPATCHING.with( |d| d.get() == self.addr())
    }

    fn add_handler (&self, handler: MessageHandler) {
        if self.is_dispatching_here() { // handlers lock is held by us
            lock( &self.added_handlers).push( handler);
        } else {
            lock( &self.handlers).push( handler);
        }
    }

    /// pass msg to all handlers. The closed check happens while holding the handlers lock, which is
    /// what `disconnect()` synchronizes on. Returns false if the channel got closed
    fn dispatch (&self, msg: &TelemetryMessage)->bool {
        let mut handlers = lock( &self.handlers);
        if self.is_closed() {
            return false
        }
        handlers.append( &mut lock( &self.added_handlers));

        let _guard = DispatchGuard::enter(self);
        for handler in handlers.iter_mut() {
            if self.is_closed() {
                return false
            }
            if panic::catch_unwind( AssertUnwindSafe(|| handler(msg))).is_err() {
                error!("telemetry message handler panicked on {} message", msg.kind());
            }
        }
        !self.is_closed()
    }

    fn set_state (&self, state: ChannelState) {
        let mut status = lock( &self.status);
        if status.state != state && status.state != ChannelState::Closed {
            debug!("telemetry channel {:?} -> {:?}", status.state, state);
            status.state = state;
        }
    }

    fn state (&self)->ChannelState {
        lock( &self.status).state
    }

    fn topics (&self)->BTreeSet<Topic> {
        lock( &self.status).topics.clone()
    }

    /// returns true if the topic set has changed
    fn update_topics (&self, topics: BTreeSet<Topic>)->bool {
        let mut status = lock( &self.status);
        if status.topics != topics {
            debug!("telemetry topics changed to {:?}", topics);
            status.topics = topics;
            true
        } else {
            false
        }
    }
}

fn lock<T> (mutex: &Mutex<T>)->MutexGuard<'_,T> {
    mutex.lock().unwrap_or_else( PoisonError::into_inner)
}

/* #endregion shared state and dispatch */

/* #region connection task ******************************************************************************************/

/// how a connection epoch ended
enum EpochEnd {
    Failed(SkytrackError), // unplanned - apply reconnect policy
    Terminated             // channel was closed or dropped
}

/// the background task that owns the transport and runs the connection state machine
struct ConnectionTask<T: Transport> {
    shared: Arc<Shared>,
    transport: T,
    options: ChannelOptions,
    cmd_rx: UnboundedReceiver<ChannelCmd>,
    acked: bool, // current connection got at least one subscribe ack
}

impl<T: Transport> ConnectionTask<T> {

    async fn run (mut self) {
        loop {
            match self.run_epoch().await {
                EpochEnd::Failed(e) => {
                    if !self.schedule_reconnect(e).await { break }
                }
                EpochEnd::Terminated => break
            }
        }
        debug!("telemetry connection task terminated");
    }

    /// one connection epoch: open, subscribe and process frames until the connection fails
    async fn run_epoch (&mut self)->EpochEnd {
        self.shared.set_state( ChannelState::Connecting);

        let mut conn = match timeout( self.options.connect_timeout, self.transport.open()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return EpochEnd::Failed(e),
            Err(e) => return EpochEnd::Failed(e.into())
        };
        self.acked = false;

        if let Err(e) = self.send_subscribe( &mut conn).await {
            return EpochEnd::Failed(e)
        }
        let mut ack_deadline = Instant::now() + self.options.ack_timeout;
        let mut ping = self.options.ping_interval.map( |dur| {
            let mut iv = interval_at( Instant::now() + dur, dur);
            iv.set_missed_tick_behavior( MissedTickBehavior::Delay);
            iv
        });

        loop {
            let awaiting_ack = self.shared.state() == ChannelState::AwaitingAck;

            select! { // all awaited futures have to be cancellation safe
                maybe_frame = conn.next_text() => {
                    match maybe_frame {
                        Some(Ok(text)) => {
                            if let Some(end) = self.process_frame( &text) { return end }
                        }
                        Some(Err(e)) => return EpochEnd::Failed(e),
                        None => return EpochEnd::Failed(SkytrackError::WsClosedError)
                    }
                }

                maybe_cmd = self.cmd_rx.recv() => {
                    match maybe_cmd {
                        Some(ChannelCmd::Connect(topics)) => {
                            if self.shared.update_topics(topics) {
                                if let Err(e) = self.send_subscribe( &mut conn).await {
                                    return EpochEnd::Failed(e)
                                }
                                ack_deadline = Instant::now() + self.options.ack_timeout;
                            }
                        }
                        None => return EpochEnd::Terminated // channel dropped
                    }
                }

                _ = sleep_until( ack_deadline), if awaiting_ack => {
                    return EpochEnd::Failed( SkytrackError::TimeoutError("no subscribe acknowledgement".to_string()))
                }

                _ = next_tick( &mut ping) => {
                    let res = match ClientFrame::new_ping().to_json() {
                        Ok(json) => conn.send_text(json).await,
                        Err(e) => Err(e)
                    };
                    if let Err(e) = res {
                        return EpochEnd::Failed(e)
                    }
                }
            }
        }
    }

    /// the server does not keep subscriptions across connections, hence we always send the full topic set
    async fn send_subscribe (&mut self, conn: &mut T::Connection)->Result<()> {
        let topics = self.shared.topics();
        let json = ClientFrame::subscribe( &topics).to_json()?;
        conn.send_text( json).await?;
        self.shared.set_state( ChannelState::AwaitingAck);
        Ok(())
    }

    fn process_frame (&mut self, text: &str)->Option<EpochEnd> {
        match parse_frame(text) {
            Ok(Some(msg)) => {
                let mut end = None;
                let state = self.shared.state();

                match &msg {
                    TelemetryMessage::SubscribeAck => {
                        if state == ChannelState::AwaitingAck {
                            self.acked = true;
                            let mut status = lock( &self.shared.status);
                            if status.state != ChannelState::Closed {
                                status.state = ChannelState::Subscribed;
                                status.reconnect_attempt = 0;
                                info!("telemetry channel subscribed to {:?}", status.topics);
                            }
                        }
                    }
                    TelemetryMessage::Error { reason, .. } => {
                        if state == ChannelState::AwaitingAck && !self.acked {
                            end = Some( EpochEnd::Failed( protocol_error( format!("subscription rejected: {reason}"))));
                        } else if state == ChannelState::AwaitingAck {
                            // topic change rejected, the previous subscription is still served
                            warn!("telemetry server rejected topic change: {reason}");
                            self.shared.set_state( ChannelState::Subscribed);
                        } else {
                            warn!("telemetry server reported error: {reason}");
                        }
                    }
                    _ => {}
                }

                if !self.shared.dispatch( &msg) {
                    return Some(EpochEnd::Terminated)
                }
                end
            }
            Ok(None) => { // keepalive response
                trace!("received pong");
                None
            }
            Err(e) => {
                warn!("dropping malformed telemetry frame: {e}");
                None
            }
        }
    }

    /// apply the reconnect policy after an unplanned disconnect. Returns false if the task should terminate
    async fn schedule_reconnect (&mut self, reason: SkytrackError)->bool {
        let attempt = {
            let mut status = lock( &self.shared.status);
            if status.state == ChannelState::Closed {
                return false
            }
            status.state = ChannelState::Disconnected;
            status.reconnect_attempt = status.reconnect_attempt.saturating_add(1);
            status.reconnect_attempt
        };

        let policy = &self.options.reconnect;
        if policy.is_exhausted(attempt) {
            error!("telemetry connection failed ({reason}), giving up after {} reconnect attempts", policy.max_attempts);
            let msg = TelemetryMessage::terminal_error( format!("telemetry unavailable, reconnect attempts exhausted: {reason}"));
            if !self.shared.dispatch( &msg) {
                return false
            }
            self.await_restart().await

        } else {
            let delay = policy.delay_for(attempt);
            warn!("telemetry connection failed ({reason}), reconnect attempt {attempt} in {delay:?}");
            let reconnect_at = Instant::now() + delay;

            loop {
                select! {
                    _ = sleep_until( reconnect_at) => return true,

                    maybe_cmd = self.cmd_rx.recv() => {
                        match maybe_cmd {
                            Some(ChannelCmd::Connect(topics)) => { self.shared.update_topics(topics); } // used by the next attempt
                            None => return false
                        }
                    }
                }
            }
        }
    }

    /// no more automatic retries - wait for an explicit connect
    async fn await_restart (&mut self)->bool {
        match self.cmd_rx.recv().await {
            Some(ChannelCmd::Connect(topics)) => {
                self.shared.update_topics(topics);
                lock( &self.shared.status).reconnect_attempt = 0;
                info!("restarting telemetry connection");
                true
            }
            None => false
        }
    }
}

async fn next_tick (interval: &mut Option<Interval>) {
    match interval {
        Some(iv) => { iv.tick().await; }
        None => future::pending::<()>().await
    }
}

/* #endregion connection task */
