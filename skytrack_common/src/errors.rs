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
use crate::map_to_opaque_error;

pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error,Debug,Clone)]
pub enum CommonError {
    #[error("IO error {0}")]
    IOError(String),

    #[error("config error {0}")]
    ConfigError(String),
}

map_to_opaque_error!{ std::io::Error => CommonError::IOError }
map_to_opaque_error!{ ron::error::SpannedError => CommonError::ConfigError }

pub fn config_error (msg: impl ToString)->CommonError {
    CommonError::ConfigError(msg.to_string())
}
