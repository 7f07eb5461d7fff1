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

//! IS-IS NET (Network Entity Title) construction from a router's area and
//! IPv4 loopback, per spec.md §4.3.
//!
//! Each octet of the loopback is zero-padded to three decimal digits and
//! the four padded octets are concatenated into one 12-digit string, which
//! is then grouped into three 4-digit segments. `49.<area:04d>.<seg1>.
//! <seg2>.<seg3>.00` is the resulting NET: area prefix, the embedded IPv4
//! system-id, and the `00` NSEL for the IS-IS protocol itself.

use std::net::Ipv4Addr;

/// Build the NET for `area` embedding `loopback`.
pub fn build_net(area: u32, loopback: Ipv4Addr) -> String {
    let octets = loopback.octets();
    let digits: String = octets.iter().map(|o| format!("{o:03}")).collect();
    let seg1 = &digits[0..4];
    let seg2 = &digits[4..8];
    let seg3 = &digits[8..12];
    format!("49.{area:04}.{seg1}.{seg2}.{seg3}.00")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn embeds_loopback_in_three_quads() {
        let net = build_net(1, Ipv4Addr::new(10, 255, 0, 1));
        assert_eq!(net, "49.0001.0102.5500.0001.00");
    }

    #[test]
    fn zero_pads_area_to_four_digits() {
        let net = build_net(12, Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(net, "49.0012.0010.0200.3004.00");
    }
}
