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

//! BGP block: spec.md §4.3 item 5.
//!
//! Router-id selection prefers the router's first IPv4 loopback; absent
//! one, a synthetic `10.1.1.x` is drawn from the [`crate::EmitContext`]
//! (the per-AS reimplementation of the source material's `genericID`).

use std::fmt::Write as _;

use topomate_model::{AutonomousSystem, BgpNeighbor, InterfaceIgp, Router, UpdateSource};
use topomate_types::AddressFamily;

use crate::context::EmitContext;

const FAMILIES: [(AddressFamily, &str); 4] = [
    (AddressFamily::IPV4, "ipv4 unicast"),
    (AddressFamily::IPV6, "ipv6 unicast"),
    (AddressFamily::VPNV4, "ipv4 vpn"),
    (AddressFamily::VPNV6, "ipv6 vpn"),
];

/// The AS's configured IGP, read off its routers' interfaces, for the
/// `redistribute <igp>` line inside a BGP address-family block
/// (`examples/original_source/frr/bgp.go`'s `c.Redistribute.Write`).
fn igp_kind(router: &Router) -> Option<&'static str> {
    router.interfaces.iter().find_map(|i| match i.igp {
        InterfaceIgp::Ospf { .. } => Some("ospf"),
        InterfaceIgp::Isis { .. } => Some("isis"),
        InterfaceIgp::None => None,
    })
}

/// Emit the whole BGP section (main process plus any per-VRF processes),
/// or nothing at all if BGP is disabled for this AS.
pub fn write_bgp(out: &mut String, as_: &AutonomousSystem, router: &Router, ctx: &mut EmitContext) {
    if as_.bgp.disabled {
        return;
    }

    let router_id = router
        .first_ipv4_loopback()
        .map(|lo| lo.addr())
        .unwrap_or_else(|| ctx.next_router_id().into());

    let _ = writeln!(out, "router bgp {}", as_.asn.0);
    let _ = writeln!(out, " bgp router-id {router_id}");

    for (key, nbr) in &router.neighbors {
        let _ = writeln!(out, " neighbor {key} remote-as {}", nbr.remote_asn.0);
        if let UpdateSource::Loopback = nbr.update_source {
            let _ = writeln!(out, " neighbor {key} update-source lo");
        }
        if nbr.disable_connected_check {
            let _ = writeln!(out, " neighbor {key} disable-connected-check");
        }
    }
    let _ = writeln!(out, "!");

    for (family, label) in FAMILIES {
        let active: Vec<(&String, &BgpNeighbor)> = router
            .neighbors
            .iter()
            .filter(|(_, nbr)| nbr.families.contains(family))
            .collect();
        if active.is_empty() {
            continue;
        }

        let _ = writeln!(out, " address-family {label}");
        let is_unicast_family = family == AddressFamily::IPV4 || family == AddressFamily::IPV6;
        if is_unicast_family && as_.bgp.redistribute_igp {
            if let Some(igp) = igp_kind(router) {
                let _ = writeln!(out, "  redistribute {igp}");
            }
        }
        for (key, nbr) in &active {
            let _ = writeln!(out, "  neighbor {key} activate");
            if nbr.next_hop_self {
                let _ = writeln!(out, "  neighbor {key} next-hop-self");
            }
            if let Some(map) = &nbr.route_map_in {
                let _ = writeln!(out, "  neighbor {key} route-map {map} in");
            }
            if let Some(map) = &nbr.route_map_out {
                let _ = writeln!(out, "  neighbor {key} route-map {map} out");
            }
            if nbr.rr_client {
                let _ = writeln!(out, "  neighbor {key} route-reflector-client");
            }
            if nbr.rs_client {
                let _ = writeln!(out, "  neighbor {key} route-server-client");
            }
            if family == AddressFamily::VPNV4 || family == AddressFamily::VPNV6 {
                let _ = writeln!(out, "  neighbor {key} send-community extended");
            }
        }
        if is_unicast_family && as_.network.addr().is_ipv4() == (family == AddressFamily::IPV4) {
            let _ = writeln!(out, "  network {}", as_.network);
        }
        let _ = writeln!(out, " exit-address-family");
    }
    let _ = writeln!(out, "!");

    for (vrf, cfg) in &router.vrfs {
        let _ = writeln!(out, "router bgp {} vrf {}", as_.asn.0, vrf);
        let _ = writeln!(out, " address-family ipv4 unicast");
        let _ = writeln!(out, "  rd vpn export {}", cfg.rd);
        let _ = writeln!(out, "  label vpn export auto");
        if cfg.import_rt.len() == 1 && cfg.export_rt.len() == 1 && cfg.import_rt == cfg.export_rt {
            let _ = writeln!(out, "  rt vpn both {}", cfg.import_rt[0]);
        } else {
            if !cfg.import_rt.is_empty() {
                let _ = writeln!(out, "  rt vpn import {}", cfg.import_rt.join(" "));
            }
            if !cfg.export_rt.is_empty() {
                let _ = writeln!(out, "  rt vpn export {}", cfg.export_rt.join(" "));
            }
        }
        let _ = writeln!(out, "  import vpn");
        let _ = writeln!(out, "  export vpn");
        let _ = writeln!(out, " exit-address-family");
        let _ = writeln!(out, "exit");
        let _ = writeln!(out, "!");
    }
}
