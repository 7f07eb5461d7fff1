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

//! RPKI validator hosts.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use topomate_types::{Asn, RouterId};

/// An RPKI validator, realized as an auxiliary container linked to exactly
/// one router over a dedicated internal link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpkiServer {
    /// Hostname of the validator container.
    pub hostname: String,
    /// Address the router's `rpki cache` statement will dial.
    pub address: IpAddr,
    /// Port the router's `rpki cache` statement will dial.
    pub port: u16,
    /// Preference value used to order multiple caches on the same router.
    pub preference: u8,
    /// Path to a ROA table file loaded into the validator container, if
    /// any.
    pub roa_table: Option<String>,
    /// AS owning the router this validator is linked to. `RouterId` is only
    /// unique within one AS, so this is needed to resolve `linked_router`
    /// project-wide.
    pub asn: Asn,
    /// Router this validator is linked to.
    pub linked_router: RouterId,
}

/// One entry in a router's ordered list of RPKI caches to validate
/// against, resolved from a `rpki:` top-level definition by the AS-level
/// `rpki.servers` reference list. Position in [`crate::Router::rpki_caches`]
/// is the cache's preference (index 0 ⇒ `preference 1`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RpkiCacheRef {
    /// Address the `rpki cache` statement dials.
    pub address: IpAddr,
    /// Port the `rpki cache` statement dials.
    pub port: u16,
}
