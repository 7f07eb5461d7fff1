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

//! Internal-link preset expansion: `ring`, `full-mesh`, and `manual`
//! (inline or from a file), per spec.md §4.2 step 1.

use topomate_spec::schema::ManualLinkSpec;
use topomate_spec::LinkFileEntry;

use crate::error::BuilderError;

const DEFAULT_SPEED: u32 = 1000;

/// One link to be materialized between two routers, identified by their
/// 1-based indices within the AS.
#[derive(Debug, Clone, Copy)]
pub struct PendingLink {
    pub first: u32,
    pub second: u32,
    pub speed: u32,
    pub cost_a: Option<u32>,
    pub cost_b: Option<u32>,
}

/// `ring`: *N* links, router *i* paired with router `(i mod N) + 1`.
/// Requires at least 3 routers (spec.md §4.2).
pub fn ring(asn: u32, n: u32) -> Result<Vec<PendingLink>, BuilderError> {
    if n < 3 {
        return Err(BuilderError::RingTooSmall { asn, routers: n });
    }
    Ok((1..=n)
        .map(|i| PendingLink {
            first: i,
            second: (i % n) + 1,
            speed: DEFAULT_SPEED,
            cost_a: None,
            cost_b: None,
        })
        .collect())
}

/// `full-mesh`: every unordered pair, *N*·(*N*−1)/2 links.
pub fn full_mesh(n: u32) -> Vec<PendingLink> {
    let mut links = Vec::new();
    for i in 1..=n {
        for j in (i + 1)..=n {
            links.push(PendingLink {
                first: i,
                second: j,
                speed: DEFAULT_SPEED,
                cost_a: None,
                cost_b: None,
            });
        }
    }
    links
}

/// `manual`, inline specs.
pub fn manual(specs: &[ManualLinkSpec]) -> Vec<PendingLink> {
    specs
        .iter()
        .map(|s| PendingLink {
            first: s.first,
            second: s.second,
            speed: s.speed.unwrap_or(DEFAULT_SPEED),
            cost_a: s.cost_a,
            cost_b: s.cost_b.or(s.cost_a),
        })
        .collect()
}

/// `manual`, parsed from a link file (`FROM TO SPEED [COST_A [COST_B]]`).
pub fn from_file(entries: &[LinkFileEntry]) -> Vec<PendingLink> {
    entries
        .iter()
        .map(|e| PendingLink {
            first: e.first,
            second: e.second,
            speed: e.speed,
            cost_a: e.cost_a,
            cost_b: e.cost_b.or(e.cost_a),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ring_of_three_pairs_each_router_with_the_next() {
        let links = ring(65000, 3).unwrap();
        let pairs: Vec<(u32, u32)> = links.iter().map(|l| (l.first, l.second)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn ring_rejects_fewer_than_three_routers() {
        assert!(matches!(
            ring(65000, 2),
            Err(BuilderError::RingTooSmall { routers: 2, .. })
        ));
    }

    #[test]
    fn full_mesh_of_four_has_six_links() {
        let links = full_mesh(4);
        assert_eq!(links.len(), 6);
        assert!(links.iter().any(|l| (l.first, l.second) == (1, 2)));
        assert!(links.iter().any(|l| (l.first, l.second) == (3, 4)));
    }
}
