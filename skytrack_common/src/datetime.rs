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
use chrono::{DateTime,NaiveDateTime,Utc};
use serde::{Deserialize,Deserializer,Serializer};
use parse_duration::parse;

#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }

/* #region serde support for config durations *********************************************/

// durations are written in human readable form ("250ms", "5s", "2 min") so that configs can be edited
// manually. Serialization uses the Debug format of Duration, which parse_duration reads back

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    let s = String::deserialize(deserializer)?;
    parse( s.as_str()).map_err( |e| serde::de::Error::custom(format!("invalid duration '{s}': {e:?}")))
}

pub fn deserialize_optional_duration <'a,D>(deserializer: D) -> Result<Option<Duration>,D::Error>
    where D: Deserializer<'a>
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) => {
            let dur = parse( s.as_str()).map_err( |e| serde::de::Error::custom(format!("invalid duration '{s}': {e:?}")))?;
            Ok( Some(dur) )
        }
        None => Ok(None)
    }
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &format!("{:?}", dur))
}

pub fn serialize_optional_duration<S: Serializer> (dur: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match dur {
        Some(d) => s.serialize_some( &format!("{:?}", d)),
        None => s.serialize_none()
    }
}

/* #endregion serde support */

/* #region timestamps *********************************************************************/

// servers that stamp with a naive UTC clock send ISO 8601 without offset, either with 'T' or with a
// space separator ("2025-06-18 14:02:11.123456"). Those are read as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC3339 or a naive ISO 8601 datetime that is taken to be UTC
pub fn parse_utc_datetime (s: &str)->Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some( dt.to_utc())
    }
    NAIVE_FORMATS.iter()
        .find_map( |fmt| NaiveDateTime::parse_from_str( s, fmt).ok())
        .map( |ndt| ndt.and_utc())
}

pub fn deserialize_utc_datetime <'a,D>(deserializer: D) -> Result<DateTime<Utc>,D::Error>
    where D: Deserializer<'a>
{
    let s = String::deserialize(deserializer)?;
    parse_utc_datetime( s.as_str()).ok_or_else( || serde::de::Error::custom(format!("invalid datetime '{s}'")))
}

/* #endregion timestamps */
