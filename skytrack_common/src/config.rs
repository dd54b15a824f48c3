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


use std::{fs,path::Path};
use serde::de::DeserializeOwned;
use crate::errors::{Result,config_error};

/// load a RON config file into a serde deserializable (usually `#[serde(default)]`) config struct.
/// Missing files are reported as config errors since there is no sensible fallback once a path was given
pub fn load_config<C,P> (path: P)->Result<C> where C: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( config_error( format!("config file not found: {}", path.display())))
    }
    let contents = fs::read_to_string(path)?;
    config_from_str( contents.as_str())
}

pub fn config_from_str<C> (input: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::de::from_str(input)? )
}

/// load from path if there is one, otherwise use the `Default` of the config struct
pub fn load_config_or_default<C,P> (path: Option<P>)->Result<C> where C: DeserializeOwned + Default, P: AsRef<Path> {
    match path {
        Some(path) => load_config(path),
        None => Ok( C::default() )
    }
}
