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


/// implement `From<$from_error>` for an error enum variant that only keeps the string rendering of
/// the source error. We use this for error types that have to be `Clone` (e.g. to be sent to several
/// message handlers), which most foreign error types are not
/// ```
/// use skytrack_common::map_to_opaque_error;
///
/// #[derive(Debug,Clone)]
/// enum MyError { IOError(String) }
///
/// map_to_opaque_error!{ std::io::Error => MyError::IOError }
/// ```
#[macro_export]
macro_rules! map_to_opaque_error {
    ($from_error:ty => $to_error:ident :: $variant:ident) => {
        impl From<$from_error> for $to_error {
            fn from (e: $from_error)->Self { $to_error :: $variant ( e.to_string()) }
        }
    };
}
pub use map_to_opaque_error;
