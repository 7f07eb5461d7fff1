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

//! MPLS/LDP block: spec.md §4.3 item 7.

use std::fmt::Write as _;

use topomate_model::{AutonomousSystem, Router};

pub fn write_mpls(out: &mut String, as_: &AutonomousSystem, router: &Router) {
    if !as_.mpls {
        return;
    }
    let Some(lo) = router.first_ipv4_loopback() else {
        return;
    };

    let _ = writeln!(out, "mpls ldp");
    let _ = writeln!(out, " router-id {}", lo.addr());
    let _ = writeln!(out, " address-family ipv4");
    let _ = writeln!(out, "  discovery transport-address {}", lo.addr());
    for iface in &router.interfaces {
        if !iface.external {
            let _ = writeln!(out, "  interface {}", iface.name());
        }
    }
    let _ = writeln!(out, " exit-address-family");
    let _ = writeln!(out, "!");
}
