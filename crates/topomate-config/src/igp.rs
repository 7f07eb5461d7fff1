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

//! IGP blocks: spec.md §4.3 item 6 (OSPFv2, OSPFv3, IS-IS).

use std::fmt::Write as _;

use topomate_model::{InterfaceIgp, Router};
use topomate_types::IsisLevel;

use crate::net::build_net;

/// Which route sources an IGP process redistributes, shared between the
/// OSPF and IS-IS emitters (`examples/original_source/frr/structs.go`'s
/// `RouteRedistribution`, carried as one struct for both processes rather
/// than duplicated per protocol).
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRedistribution {
    pub connected: bool,
    pub static_: bool,
    pub ospf: bool,
    pub bgp: bool,
    pub isis: bool,
}

impl RouteRedistribution {
    /// The AS-wide default: redistribute directly connected routes (the
    /// loopback and any interfaces outside the IGP, e.g. VRF-facing ones)
    /// so they're reachable without a dedicated `network` statement.
    pub fn default_for_as() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }
}

pub fn write_ospfv2(out: &mut String, router: &Router, redist: RouteRedistribution) {
    let ospf_ifaces: Vec<_> = router
        .interfaces
        .iter()
        .filter(|i| matches!(i.igp, InterfaceIgp::Ospf { .. }) && i.ip.map(|ip| ip.addr().is_ipv4()).unwrap_or(false))
        .collect();
    if ospf_ifaces.is_empty() {
        return;
    }

    let _ = writeln!(out, "router ospf");
    write_redistribute_lines(out, redist);
    for iface in &ospf_ifaces {
        let InterfaceIgp::Ospf { area } = iface.igp else {
            unreachable!()
        };
        if let Some(ip) = iface.ip {
            let _ = writeln!(out, " network {ip} area {area}");
        }
    }
    let _ = writeln!(out, "!");
}

pub fn write_ospfv3(out: &mut String, router: &Router, redist: RouteRedistribution) {
    let ospf6_ifaces: Vec<_> = router
        .interfaces
        .iter()
        .filter(|i| matches!(i.igp, InterfaceIgp::Ospf { .. }) && i.ip.map(|ip| ip.addr().is_ipv6()).unwrap_or(false))
        .collect();
    if ospf6_ifaces.is_empty() {
        return;
    }

    let _ = writeln!(out, "router ospf6");
    if let Some(lo) = router.first_ipv4_loopback() {
        let _ = writeln!(out, " ospf6 router-id {}", lo.addr());
    }
    for iface in &ospf6_ifaces {
        let _ = writeln!(out, " interface {} area 0.0.0.0", iface.name());
    }
    write_redistribute_lines(out, redist);
    let _ = writeln!(out, "!");
}

pub fn write_isis(out: &mut String, router: &Router, redist: RouteRedistribution) -> Option<()> {
    let isis_cfg = router.isis?;
    if !router.interfaces.iter().any(|i| matches!(i.igp, InterfaceIgp::Isis { .. })) {
        return None;
    }
    let lo = router.first_ipv4_loopback()?;
    let loopback = match lo.addr() {
        std::net::IpAddr::V4(v4) => v4,
        std::net::IpAddr::V6(_) => return None,
    };

    let _ = writeln!(out, "router isis 1");
    let _ = writeln!(out, " net {}", build_net(isis_cfg.area, loopback));
    let _ = writeln!(out, " metric-style wide");
    let _ = writeln!(out, " is-type {}", isis_cfg.level.as_frr_str());
    if matches!(isis_cfg.level, IsisLevel::L1L2) {
        let _ = writeln!(out, " set-attached-bit");
        let _ = writeln!(out, " default-information originate");
        let _ = writeln!(out, " default-information originate ipv6");
    }
    let v4 = router.interfaces.iter().any(|i| {
        matches!(i.igp, InterfaceIgp::Isis { .. }) && i.ip.map(|ip| ip.addr().is_ipv4()).unwrap_or(false)
    });
    let v6 = router.interfaces.iter().any(|i| {
        matches!(i.igp, InterfaceIgp::Isis { .. }) && i.ip.map(|ip| ip.addr().is_ipv6()).unwrap_or(false)
    });
    write_isis_redistribute(out, redist, isis_cfg.level, v4, v6);
    let _ = writeln!(out, "!");
    Some(())
}

/// IS-IS redistribute lines, dispatched per the router's own level
/// (`examples/original_source/frr/isis.go`'s `writeRedistribute`): an L1
/// router only emits `level-1` lines, an L2 router only `level-2`, and an
/// L1-L2 router emits both, for each of the four redistribution kinds.
/// spec.md §9 flags that the source only emits the IPv6 lines when the
/// IPv4 flag is *also* set, nesting the IPv4 check inside the IPv6 one
/// rather than emitting them independently; that observed behavior is
/// preserved rather than "fixed".
fn write_isis_redistribute(out: &mut String, redist: RouteRedistribution, level: IsisLevel, v4: bool, v6: bool) {
    if v4 {
        write_isis_redistribute_af(out, redist, "ipv4", level);
    }
    if v6 {
        if v4 {
            write_isis_redistribute_af(out, redist, "ipv6", level);
        }
    }
}

fn write_isis_redistribute_af(out: &mut String, redist: RouteRedistribution, af: &str, level: IsisLevel) {
    match level {
        IsisLevel::L1 => write_isis_redistribute_level(out, redist, af, "level-1"),
        IsisLevel::L2 => write_isis_redistribute_level(out, redist, af, "level-2"),
        IsisLevel::L1L2 => {
            write_isis_redistribute_level(out, redist, af, "level-1");
            write_isis_redistribute_level(out, redist, af, "level-2");
        }
    }
}

fn write_isis_redistribute_level(out: &mut String, redist: RouteRedistribution, af: &str, level: &str) {
    if redist.connected {
        let _ = writeln!(out, " redistribute {af} connected {level}");
    }
    if redist.static_ {
        let _ = writeln!(out, " redistribute {af} static {level}");
    }
    if redist.ospf {
        let _ = writeln!(out, " redistribute {af} ospf {level}");
    }
    if redist.bgp {
        let _ = writeln!(out, " redistribute {af} bgp {level}");
    }
}

fn write_redistribute_lines(out: &mut String, redist: RouteRedistribution) {
    if redist.connected {
        let _ = writeln!(out, " redistribute connected");
    }
    if redist.static_ {
        let _ = writeln!(out, " redistribute static");
    }
    if redist.bgp {
        let _ = writeln!(out, " redistribute bgp");
    }
}
