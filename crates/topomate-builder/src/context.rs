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

//! Per-AS elaboration state.
//!
//! The source material keeps `nextRouteTarget`/`nextRouteDescriptor` as
//! package-level globals, reset (almost certainly by accident, but spec.md
//! §9 directs us to preserve the observed behavior) at the start of each
//! AS's processing. Here that's an explicit value threaded through
//! [`crate::as_builder::build_as`] and discarded at the end of it -- there
//! is no way to "forget" to reset it.

use topomate_types::Asn;

/// Route-Distinguisher / Route-Target allocation state for a single AS.
/// Constructed fresh for each AS the builder processes.
#[derive(Debug)]
pub struct ElaborationContext {
    asn: Asn,
    next_rd: u32,
    next_rt: u32,
}

impl ElaborationContext {
    /// Start a new context for `asn`, counters at 1.
    pub fn new(asn: Asn) -> Self {
        Self {
            asn,
            next_rd: 1,
            next_rt: 1,
        }
    }

    /// Hand out the next Route-Distinguisher, `<asn>:<n>`.
    pub fn next_rd(&mut self) -> String {
        let rd = format!("{}:{}", self.asn.0, self.next_rd);
        self.next_rd += 1;
        rd
    }

    /// Hand out the next Route-Target, `<asn>:<n>`. Shares the same
    /// `<asn>:<n>` textual shape as a Route-Distinguisher but a distinct
    /// counter (they're both BGP extended communities, but an RD and an RT
    /// for the same VPN must not collide).
    pub fn next_rt(&mut self) -> String {
        let rt = format!("{}:{}", self.asn.0, self.next_rt + 10_000);
        self.next_rt += 1;
        rt
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counters_start_at_one_and_advance_independently() {
        let mut ctx = ElaborationContext::new(Asn(65000));
        assert_eq!(ctx.next_rd(), "65000:1");
        assert_eq!(ctx.next_rd(), "65000:2");
        assert_eq!(ctx.next_rt(), "65000:10001");
        assert_eq!(ctx.next_rt(), "65000:10002");
    }
}
