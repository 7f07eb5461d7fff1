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

//! Internal and external links.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use topomate_types::{Asn, InterfaceId, LinkId, Relation, RouterId};

/// One endpoint of a [`Link`]: a router and the interface it attached for
/// this link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    /// The router this endpoint belongs to.
    pub router: RouterId,
    /// The interface on that router carrying this endpoint's address.
    pub interface: InterfaceId,
}

/// An internal (intra-AS) link between two routers. The link's subnet
/// lives on the two interfaces themselves; this struct just pairs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Stable id within the owning AS.
    pub id: LinkId,
    /// First endpoint.
    pub a: LinkItem,
    /// Second endpoint.
    pub b: LinkItem,
    /// The subnet allocated to this link, if addressing was enabled.
    pub subnet: Option<IpNet>,
}

impl Link {
    /// The endpoint belonging to `router`, if this link touches it.
    pub fn endpoint_for(&self, router: RouterId) -> Option<LinkItem> {
        if self.a.router == router {
            Some(self.a)
        } else if self.b.router == router {
            Some(self.b)
        } else {
            None
        }
    }

    /// The endpoint *not* belonging to `router`.
    pub fn other_end(&self, router: RouterId) -> Option<LinkItem> {
        if self.a.router == router {
            Some(self.b)
        } else if self.b.router == router {
            Some(self.a)
        } else {
            None
        }
    }
}

/// One endpoint of an [`ExternalLink`]: an AS, a router within it, the
/// interface used, and the AS-relationship as seen from this side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtLinkItem {
    /// The AS this endpoint belongs to.
    pub asn: Asn,
    /// The router within that AS.
    pub router: RouterId,
    /// The interface carrying this endpoint's address.
    pub interface: InterfaceId,
    /// The relation of the *other* side, as seen from here (`Provider`
    /// means the other side is this side's customer).
    pub relation: Relation,
}

/// A cross-AS link. Directional in the sense that `from.relation` and
/// `to.relation` are independently meaningful (both are always set, and
/// are each other's mirror: `from.relation == Provider` implies
/// `to.relation == Customer`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExternalLink {
    /// The initiating side, as it appeared in the declarative spec.
    pub from: ExtLinkItem,
    /// The responding side.
    pub to: ExtLinkItem,
}

impl ExternalLink {
    /// The route-map name pair (`in`, `out`) this link's `from` side should
    /// apply, derived from its relation.
    pub fn route_maps_for(relation: Relation) -> (&'static str, &'static str) {
        match relation {
            Relation::Provider => ("PROVIDER_IN", "PROVIDER_OUT"),
            Relation::Customer => ("CUSTOMER_IN", "CUSTOMER_OUT"),
            Relation::Peer => ("PEER_IN", "PEER_OUT"),
            Relation::None => ("PEER_IN", "PEER_OUT"),
        }
    }
}
