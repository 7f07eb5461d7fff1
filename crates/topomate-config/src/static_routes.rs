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

//! Static routes: spec.md §4.3 item 3, plus the hub-and-spoke downstream
//! statics supplemented from `examples/original_source/frr/l3vpn.go`.

use std::fmt::Write as _;
use std::net::IpAddr;

use topomate_model::{AutonomousSystem, Router};
use topomate_types::Asn;

/// One static route per external (cross-AS) neighbor, pointing at the
/// locally attached interface rather than a next-hop address -- the peer
/// is always directly connected for these sessions (eBGP single-hop, or
/// multi-hop over a loopback reached through exactly one local interface).
pub fn write_external_statics(out: &mut String, local_asn: Asn, router: &Router) {
    let mut wrote = false;
    for (key, nbr) in &router.neighbors {
        if nbr.remote_asn == local_asn {
            continue;
        }
        let Some(iface_id) = nbr.peer_interface else {
            continue;
        };
        let Some(iface) = router.interface(iface_id) else {
            continue;
        };
        let Ok(addr) = key.parse::<IpAddr>() else {
            continue;
        };
        let line = match addr {
            IpAddr::V4(_) => format!("ip route {}/{} {}", key, nbr.prefix_len, iface.name()),
            IpAddr::V6(_) => format!("ipv6 route {}/{} {}", key, nbr.prefix_len, iface.name()),
        };
        let _ = writeln!(out, "{line}");
        wrote = true;
    }
    if wrote {
        let _ = writeln!(out, "!");
    }
}

/// On a hub PE, one static route per declared spoke subnet in the VPN's
/// mirror `<vrf>_down` VRF, pointing back out the hub's own VRF-facing
/// interface so traffic redistributed down from the hub reaches the CE
/// that originates it.
pub fn write_hub_spoke_statics(out: &mut String, as_: &AutonomousSystem, router: &Router) {
    let mut wrote = false;
    for vpn in &as_.vpns {
        if !vpn.is_hub_and_spoke() {
            continue;
        }
        let Some(hub) = vpn.hubs().find(|c| c.parent == router.id) else {
            continue;
        };
        let Some(hub_iface) = router.interfaces.iter().find(|i| {
            i.vrf.as_deref() == Some(vpn.vrf.as_str())
                && i.description.as_deref() == Some(&format!("vpn:{}:{}", vpn.vrf, hub.ce.hostname))
        }) else {
            continue;
        };
        let Some(spokes) = &vpn.spoke_subnets else {
            continue;
        };
        for subnet in spokes {
            let _ = writeln!(
                out,
                "ip route {} {} vrf {}_down",
                subnet,
                hub_iface.name(),
                vpn.vrf
            );
            wrote = true;
        }
    }
    if wrote {
        let _ = writeln!(out, "!");
    }
}
