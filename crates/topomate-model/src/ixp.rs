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

//! Internet Exchange Points: a shared fabric plus a route-server.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use topomate_types::Asn;

/// A shared L2 exchange fabric. The route-server is router 1 in `asn`'s AS;
/// every declared peer gets a new interface onto the shared bridge and a
/// route-server-client (from the RS's perspective) / peer (from its own)
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ixp {
    /// The synthetic AS hosting the route-server.
    pub asn: Asn,
    /// The exchange fabric's address prefix.
    pub prefix: IpNet,
    /// Loopback prefix for the route-server, if addressing is enabled.
    pub loopback: Option<IpNet>,
    /// Attached members.
    pub peers: Vec<IxpPeer>,
}

impl Ixp {
    /// The bridge name this exchange's fabric will be realized as
    /// (`ixp-<asn>`).
    pub fn bridge_name(&self) -> String {
        format!("ixp-{}", self.asn.0)
    }
}

/// One AS/router attached to an [`Ixp`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IxpPeer {
    /// The peer's AS.
    pub asn: Asn,
    /// The specific router within that AS attached to the fabric.
    pub router: topomate_types::RouterId,
    /// Nominal port speed in Mbit/s; defaults to 1000 when unspecified in
    /// the declarative spec.
    pub speed: u32,
}
