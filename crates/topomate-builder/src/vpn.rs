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

//! L3VPN customer attachment: spec.md §4.2 step 3 and the RD/RT allocation
//! scheme of §4.3.
//!
//! Every customer sharing a `vpn:` entry gets the same Route Distinguisher
//! and the same "up" Route Target (symmetric import/export). In
//! hub-and-spoke mode the hub's PE additionally carries a mirror VRF,
//! `<vrf>_down`, whose export RT is a second, distinct value and whose
//! import RT is the shared "up" value -- so a spoke exports into the hub's
//! primary VRF and the hub's mirror VRF exports back down to the spokes.

use std::collections::BTreeSet;

use ipnet::IpNet;
use topomate_addr::LinkAddressCursor;
use topomate_model::{AutonomousSystem, NetInterface, Router, VrfBgpConfig, Vpn, VpnCustomer};
use topomate_spec::schema::VpnSpec;
use topomate_types::{AddressFamily, RouterId};

use crate::as_builder::neighbor_key;
use crate::context::ElaborationContext;
use crate::error::BuilderError;

/// Attach every `vpn:` entry declared for one AS: instantiate CE routers,
/// link them to their parent PE, assign VRF route targets, and activate
/// VPNv4 among the participating PEs.
pub fn attach_vpns(
    as_: &mut AutonomousSystem,
    cursor: &mut LinkAddressCursor,
    vpns: &[VpnSpec],
    ctx: &mut ElaborationContext,
) -> Result<(), BuilderError> {
    for spec in vpns {
        attach_one(as_, cursor, spec, ctx)?;
    }
    Ok(())
}

fn attach_one(
    as_: &mut AutonomousSystem,
    cursor: &mut LinkAddressCursor,
    spec: &VpnSpec,
    ctx: &mut ElaborationContext,
) -> Result<(), BuilderError> {
    let asn = as_.asn.0;
    let hub_and_spoke = spec.hub_and_spoke.unwrap_or(false);
    let rd = ctx.next_rd();
    let rt_up = ctx.next_rt();
    let rt_down = if hub_and_spoke { Some(ctx.next_rt()) } else { None };

    let mut customers = Vec::new();
    let mut neighbors: BTreeSet<RouterId> = BTreeSet::new();

    for (i, c) in spec.customers.iter().enumerate() {
        let parent = RouterId::from_one_based(c.parent);
        let max = as_.routers.len() as u32;
        if as_.router(parent).is_none() {
            return Err(BuilderError::RouterOutOfRange {
                asn,
                router: c.parent,
                max,
            });
        }

        let ce_id = RouterId::from_one_based(i as u32 + 1);
        let mut ce = Router::new(ce_id, c.hostname.clone());
        if let Some(lb) = &c.loopback {
            ce.loopbacks.push(parse_cidr(asn, "vpn.customers[].loopback", lb)?);
        }

        let (pe_ip, ce_ip) = cursor.next_link_ips()?;
        let mut pe_iface = NetInterface::bare(1000);
        pe_iface.ip = Some(pe_ip);
        pe_iface.vrf = Some(spec.vrf.clone());
        pe_iface.external = true;
        pe_iface.description = Some(format!("vpn:{}:{}", spec.vrf, c.hostname));
        as_.router_mut(parent)
            .expect("presence checked above")
            .attach_interface(pe_iface);

        let mut ce_iface = NetInterface::bare(1000);
        ce_iface.ip = Some(ce_ip);
        ce_iface.external = true;
        ce.attach_interface(ce_iface);

        as_.alloc_link_id();

        let hub = c.hub.unwrap_or(false);
        let pe = as_
            .router_mut(parent)
            .expect("presence checked above");
        if hub_and_spoke && hub {
            pe.vrfs.insert(
                spec.vrf.clone(),
                VrfBgpConfig {
                    rd: rd.clone(),
                    import_rt: vec![rt_up.clone()],
                    export_rt: vec![rt_up.clone()],
                },
            );
            pe.vrfs.insert(
                format!("{}_down", spec.vrf),
                VrfBgpConfig {
                    rd: rd.clone(),
                    import_rt: vec![rt_up.clone()],
                    export_rt: vec![rt_down.clone().expect("hub_and_spoke implies rt_down")],
                },
            );
        } else {
            pe.vrfs.insert(
                spec.vrf.clone(),
                VrfBgpConfig {
                    rd: rd.clone(),
                    import_rt: vec![rt_up.clone()],
                    export_rt: vec![rt_up.clone()],
                },
            );
        }

        neighbors.insert(parent);
        customers.push(VpnCustomer {
            ce,
            parent,
            subnet: parse_opt_cidr(asn, &c.subnet)?,
            remote_subnet: parse_opt_cidr(asn, &c.remote_subnet)?,
            downstream_subnet: parse_opt_cidr(asn, &c.downstream_subnet)?,
            hub,
        });
    }

    let spoke_subnets = hub_and_spoke.then(|| {
        customers
            .iter()
            .filter(|c| !c.hub)
            .filter_map(|c| c.subnet)
            .collect::<Vec<IpNet>>()
    });

    let neighbor_ids: Vec<RouterId> = neighbors.iter().copied().collect();
    for i in 0..neighbor_ids.len() {
        for j in (i + 1)..neighbor_ids.len() {
            activate_vpnv4(as_, neighbor_ids[i], neighbor_ids[j]);
        }
    }

    as_.vpns.push(Vpn {
        vrf: spec.vrf.clone(),
        customers,
        neighbors,
        spoke_subnets,
    });

    Ok(())
}

/// Make sure `a` and `b` carry a VPNv4-capable iBGP session, extending an
/// existing full-mesh/manual session if one was already installed, or
/// creating a minimal one if this pair isn't otherwise adjacent (e.g. two
/// route-reflector clients that don't full-mesh for unicast but still need
/// to exchange VPNv4 routes via their common reflector... in which case no
/// direct session is installed here; only directly-peering pairs gain the
/// VPNv4 family).
fn activate_vpnv4(as_: &mut AutonomousSystem, a: RouterId, b: RouterId) {
    let a_key = as_.router(a).and_then(neighbor_key);
    let b_key = as_.router(b).and_then(neighbor_key);
    let (Some(a_key), Some(b_key)) = (a_key, b_key) else {
        return;
    };

    if let Some(r) = as_.router_mut(a) {
        if let Some(nbr) = r.neighbors.get_mut(&b_key) {
            nbr.families |= AddressFamily::VPNV4;
        }
    }
    if let Some(r) = as_.router_mut(b) {
        if let Some(nbr) = r.neighbors.get_mut(&a_key) {
            nbr.families |= AddressFamily::VPNV4;
        }
    }
}

fn parse_cidr(asn: u32, field: &'static str, value: &str) -> Result<IpNet, BuilderError> {
    value.parse().map_err(|_| BuilderError::InvalidCidr {
        asn,
        field,
        value: value.to_string(),
    })
}

fn parse_opt_cidr(asn: u32, value: &Option<String>) -> Result<Option<IpNet>, BuilderError> {
    value
        .as_deref()
        .map(|v| parse_cidr(asn, "vpn.customers[].subnet", v))
        .transpose()
}
