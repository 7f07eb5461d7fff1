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

//! Config header: spec.md §4.3 item 1.

use std::fmt::Write as _;

pub fn write_header(out: &mut String, hostname: &str) {
    let _ = writeln!(out, "frr version 8.4");
    let _ = writeln!(out, "frr defaults traditional");
    let _ = writeln!(out, "hostname {hostname}");
    let _ = writeln!(out, "log file /var/log/frr/frr.log");
    let _ = writeln!(out, "no ip forwarding");
    let _ = writeln!(out, "no ipv6 forwarding");
    let _ = writeln!(out, "service integrated-vtysh-config");
    let _ = writeln!(out, "password zebra");
    let _ = writeln!(out, "!");
}
