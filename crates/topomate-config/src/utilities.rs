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

//! Utility prefix-lists and route-maps: spec.md §4.3 item 8.
//!
//! Three families of route-maps are emitted for every router that runs
//! BGP: an "own prefix" pair advertising the AS's announceable network, the
//! relation route-maps (`PROVIDER_IN/OUT`, `CUSTOMER_IN/OUT`, `PEER_IN/OUT`)
//! keyed off the process-wide community/local-preference defaults, and an
//! RPKI validity pair consulted by the relation maps when RPKI is active.

use std::fmt::Write as _;

use topomate_model::{AutonomousSystem, GlobalBgpDefaults, Router};
use topomate_types::Relation;

pub fn write_utilities(
    out: &mut String,
    as_: &AutonomousSystem,
    router: &Router,
    global_bgp: &GlobalBgpDefaults,
) {
    if as_.bgp.disabled {
        return;
    }

    let _ = writeln!(out, "ip prefix-list OWN_PREFIX seq 5 permit {}", as_.network);
    let _ = writeln!(out, "route-map OWN_PREFIX permit 10");
    let _ = writeln!(out, " match ip address prefix-list OWN_PREFIX");
    let _ = writeln!(out, "!");

    if !router.rpki_caches.is_empty() {
        let _ = writeln!(out, "route-map RPKI permit 10");
        let _ = writeln!(out, " match rpki valid");
        let _ = writeln!(out, "route-map RPKI deny 20");
        let _ = writeln!(out, "!");
    }

    for (relation, in_map, out_map) in [
        (Relation::Provider, "PROVIDER_IN", "PROVIDER_OUT"),
        (Relation::Customer, "CUSTOMER_IN", "CUSTOMER_OUT"),
        (Relation::Peer, "PEER_IN", "PEER_OUT"),
    ] {
        let Some(default) = global_bgp.for_relation(relation) else {
            continue;
        };
        let _ = writeln!(out, "route-map {in_map} permit 10");
        let _ = writeln!(
            out,
            " set community {}:{} additive",
            as_.asn.0, default.community
        );
        let _ = writeln!(out, " set local-preference {}", default.local_pref);
        let _ = writeln!(out, "!");
        let _ = writeln!(out, "route-map {out_map} permit 10");
        let _ = writeln!(out, " match ip address prefix-list OWN_PREFIX");
        let _ = writeln!(out, "!");
    }
}
