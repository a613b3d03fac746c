/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Unit conversions and derived ratios

const GIB: u64 = 1024 * 1024 * 1024;
const TIB: u64 = 1024 * GIB;

/// Convert bytes to whole GiB, truncating
pub fn bytes_to_gib(bytes: u64) -> u64 {
    bytes / GIB
}

/// Cores per socket, 0 when there are no sockets
pub fn cores_per_socket(total_cores: u16, sockets: u16) -> u16 {
    if sockets == 0 {
        return 0;
    }
    total_cores / sockets
}

/// Render a byte count as TiB truncated to one decimal place
///
/// # Arguments
/// * `bytes` - Raw capacity in bytes
///
/// # Returns
/// * Text such as `"3.6"`
pub fn format_tib(bytes: u64) -> String {
    let tenths = u128::from(bytes) * 10 / u128::from(TIB);
    format!("{}.{}", tenths / 10, tenths % 10)
}
