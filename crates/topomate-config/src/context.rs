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

//! Per-AS emission state.
//!
//! The source material's `genericID` is a single package-level counter,
//! starting at `10.1.1.1` and incremented on every call regardless of which
//! AS is being emitted. spec.md §9 directs reimplementing it as a per-AS
//! counter instead, mirroring how `topomate_builder::ElaborationContext`
//! already replaced `nextRouteTarget`/`nextRouteDescriptor` -- constructed
//! fresh per AS and threaded explicitly rather than living at module scope.

use std::net::Ipv4Addr;

/// Router-id fallback allocation state for a single AS's emission pass.
#[derive(Debug)]
pub struct EmitContext {
    next_id: u32,
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitContext {
    /// Start a new context, counter at `10.1.1.1`.
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Hand out the next synthetic router-id, `10.1.1.<n>`, and advance.
    pub fn next_router_id(&mut self) -> Ipv4Addr {
        let host = self.next_id;
        self.next_id += 1;
        Ipv4Addr::new(10, 1, 1, host as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counter_starts_at_one_and_advances() {
        let mut ctx = EmitContext::new();
        assert_eq!(ctx.next_router_id(), Ipv4Addr::new(10, 1, 1, 1));
        assert_eq!(ctx.next_router_id(), Ipv4Addr::new(10, 1, 1, 2));
    }
}
