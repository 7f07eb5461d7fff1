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

//! Customer-edge router configuration.
//!
//! CE routers carry no BGP session in the elaborated model (`topomate_builder`
//! only installs VPNv4 sessions between PEs); a CE reaches its VRF purely via
//! a default route toward the PE-side address of the link it attaches over,
//! per the `conf_cust_<hostname>` artifact named in spec.md §6.

use topomate_model::{AutonomousSystem, Vpn, VpnCustomer};

use crate::error::ConfigError;
use crate::header::write_header;
use crate::interfaces::write_interfaces;

pub fn emit_ce_router(
    as_: &AutonomousSystem,
    vpn: &Vpn,
    customer: &VpnCustomer,
) -> Result<String, ConfigError> {
    let gateway = as_
        .router(customer.parent)
        .and_then(|pe| {
            pe.interfaces.iter().find(|i| {
                i.vrf.as_deref() == Some(vpn.vrf.as_str())
                    && i.description.as_deref()
                        == Some(&format!("vpn:{}:{}", vpn.vrf, customer.ce.hostname))
            })
        })
        .and_then(|i| i.ip)
        .ok_or_else(|| ConfigError::MissingCeGateway {
            asn: as_.asn.0,
            vrf: vpn.vrf.clone(),
            hostname: customer.ce.hostname.clone(),
        })?;

    let mut out = String::new();
    write_header(&mut out, &customer.ce.hostname);
    write_interfaces(&mut out, &customer.ce);

    use std::fmt::Write as _;
    if gateway.addr().is_ipv4() {
        let _ = writeln!(out, "ip route 0.0.0.0/0 {}", gateway.addr());
    } else {
        let _ = writeln!(out, "ipv6 route ::/0 {}", gateway.addr());
    }
    let _ = writeln!(out, "!");

    Ok(out)
}
