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


use std::time::Duration;
use serde::{Deserialize,Serialize};
use skytrack_common::datetime::{deserialize_duration,serialize_duration,secs};

/// exponential reconnect backoff: `delay_for(n) = min(max_delay, base_delay * 2^n)` for
/// the n'th consecutive reconnect attempt, with at most `max_attempts` automatic attempts
#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct ReconnectPolicy {
    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub base_delay: Duration,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub max_delay: Duration,

    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new (base_delay: Duration, max_delay: Duration, max_attempts: u32)->Self {
        ReconnectPolicy { base_delay, max_delay, max_attempts }
    }

    pub fn delay_for (&self, attempt: u32)->Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX).min(self.max_delay)
    }

    pub fn is_exhausted (&self, attempt: u32)->bool {
        attempt > self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default()->Self {
        ReconnectPolicy {
            base_delay: secs(1),
            max_delay: secs(30),
            max_attempts: 10,
        }
    }
}
