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

//! Interface blocks: spec.md §4.3 item 2. Loopback addresses get their own
//! `interface lo` block; every other interface is emitted in id order
//! (which is attach order, and thus `eth<k>` order).

use std::fmt::Write as _;

use topomate_model::{InterfaceIgp, Router};

pub fn write_interfaces(out: &mut String, router: &Router) {
    if !router.loopbacks.is_empty() {
        let _ = writeln!(out, "interface lo");
        for lo in &router.loopbacks {
            let _ = writeln!(out, " ip address {lo}");
        }
        let _ = writeln!(out, "!");
    }

    let mut ifaces: Vec<_> = router.interfaces.iter().collect();
    ifaces.sort_by_key(|i| i.id);

    for iface in ifaces {
        match &iface.vrf {
            Some(vrf) => {
                let _ = writeln!(out, "interface {} vrf {}", iface.name(), vrf);
            }
            None => {
                let _ = writeln!(out, "interface {}", iface.name());
            }
        }
        if let Some(desc) = &iface.description {
            let _ = writeln!(out, " description {desc}");
        }
        if let Some(ip) = iface.ip {
            let _ = writeln!(out, " ip address {ip}");
        }
        match iface.igp {
            InterfaceIgp::None => {}
            InterfaceIgp::Ospf { area } => {
                if iface.ip.map(|ip| ip.addr().is_ipv4()).unwrap_or(true) {
                    let _ = writeln!(out, " ip ospf area {area}");
                }
                if let Some(cost) = iface.cost {
                    let _ = writeln!(out, " bandwidth {cost}");
                }
            }
            InterfaceIgp::Isis {
                circuit,
                passive,
                metric,
            } => {
                let is4 = iface.ip.map(|ip| ip.addr().is_ipv4()).unwrap_or(true);
                if is4 {
                    let _ = writeln!(out, " ip router isis 1");
                } else {
                    let _ = writeln!(out, " ipv6 router isis 1");
                }
                if passive {
                    let _ = writeln!(out, " isis passive");
                } else {
                    let _ = writeln!(out, " isis circuit-type {}", circuit.as_frr_str());
                }
                let _ = writeln!(out, " isis metric {metric}");
            }
        }
        let _ = writeln!(out, "!");
    }
}
