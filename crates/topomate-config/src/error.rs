// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Everything that can go wrong while emitting a router's configuration
/// text. Per spec.md §4.3, emission itself never fails on a missing field
/// (an absent value just yields an empty section); the only fatal case is
/// a reference into the model that should have been guaranteed by
/// elaboration but wasn't.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A VPN customer's parent PE interface for this VRF/hostname pair
    /// could not be found, so no gateway address exists for the CE's
    /// default route.
    #[error("AS{asn} VRF {vrf:?}: no PE-side interface found for customer {hostname:?}")]
    MissingCeGateway {
        asn: u32,
        vrf: String,
        hostname: String,
    },
}
