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

//! Deterministic IPv4/IPv6 prefix arithmetic.
//!
//! Everything here is a pure, stateful cursor over a parent prefix: calling
//! the same sequence of operations on two identical cursors always produces
//! the same sequence of addresses. That determinism is what lets the
//! topology builder re-run elaboration on an unchanged spec and get
//! byte-identical addressing back.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Errors that can occur while sub-allocating prefixes.
#[derive(Debug, thiserror::Error)]
pub enum AddrError {
    /// The requested child prefix length is shorter (less specific) than
    /// the parent's, so no sub-allocation is possible.
    #[error("cannot sub-allocate a /{child} from a /{parent} parent")]
    ChildWiderThanParent { parent: u8, child: u8 },
    /// The parent prefix has been fully consumed: no more subnets remain.
    #[error("address pool {0} is exhausted")]
    PoolExhausted(IpNet),
    /// A subnet has fewer than two usable addresses left for a
    /// point-to-point pair.
    #[error("subnet {0} has no more usable host addresses")]
    SubnetExhausted(IpNet),
    /// The underlying `ipnet` crate rejected a subnet split (e.g. because
    /// the new prefix length does not fit the address family's bit width).
    #[error(transparent)]
    PrefixLen(#[from] ipnet::PrefixLenError),
}

/// Increment an address by one, regardless of family.
fn inc(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V4(a) => IpAddr::V4((u32::from(a).wrapping_add(1)).into()),
        IpAddr::V6(a) => IpAddr::V6((u128::from(a).wrapping_add(1)).into()),
    }
}

/// Sub-allocate successive `/prefix_len` subnets out of `parent`, in
/// address order. This is the `SubAllocate` operation of the component
/// design: a deterministic iterator, consumed one subnet at a time by the
/// higher-level cursors below.
#[derive(Debug, Clone)]
pub struct SubnetPool {
    inner: SubnetIterKind,
}

#[derive(Debug, Clone)]
enum SubnetIterKind {
    V4(Box<ipnet::Ipv4Subnets>),
    V6(Box<ipnet::Ipv6Subnets>),
}

impl SubnetPool {
    /// Create a pool that yields `/prefix_len` subnets carved out of
    /// `parent`, in order.
    pub fn new(parent: IpNet, prefix_len: u8) -> Result<Self, AddrError> {
        if prefix_len < parent.prefix_len() {
            return Err(AddrError::ChildWiderThanParent {
                parent: parent.prefix_len(),
                child: prefix_len,
            });
        }
        let inner = match parent {
            IpNet::V4(net) => SubnetIterKind::V4(Box::new(net.subnets(prefix_len)?)),
            IpNet::V6(net) => SubnetIterKind::V6(Box::new(net.subnets(prefix_len)?)),
        };
        Ok(Self { inner })
    }

    /// Whether this pool was built over an IPv4 (`true`) or IPv6 (`false`)
    /// parent.
    pub fn is4(&self) -> bool {
        matches!(self.inner, SubnetIterKind::V4(_))
    }

    /// Pull the next subnet out of the pool.
    pub fn next_subnet(&mut self) -> Option<IpNet> {
        match &mut self.inner {
            SubnetIterKind::V4(it) => it.next().map(IpNet::V4),
            SubnetIterKind::V6(it) => it.next().map(IpNet::V6),
        }
    }
}

fn hosts(net: IpNet) -> Box<dyn Iterator<Item = IpAddr>> {
    match net {
        IpNet::V4(n) => Box::new(n.hosts()),
        IpNet::V6(n) => Box::new(n.hosts()),
    }
}

/// A cursor handing out point-to-point address pairs for internal and
/// external links, advancing through successive `/prefix_len` subnets of a
/// parent prefix as each one is exhausted. This is `NextLinkIPs` in the
/// component design.
#[derive(Debug, Clone)]
pub struct LinkAddressCursor {
    pool: SubnetPool,
    prefix_len: u8,
    current: Option<(IpNet, Vec<IpAddr>)>,
}

impl LinkAddressCursor {
    /// Build a cursor over `parent`, handing out `/prefix_len` subnets.
    pub fn new(parent: IpNet, prefix_len: u8) -> Result<Self, AddrError> {
        Ok(Self {
            pool: SubnetPool::new(parent, prefix_len)?,
            prefix_len,
            current: None,
        })
    }

    /// Advance the cursor and return the next point-to-point address pair,
    /// each carrying the subnet's mask (e.g. `10.0.0.1/30`,
    /// `10.0.0.2/30`). Moves to a fresh subnet whenever the current one has
    /// fewer than two usable addresses left.
    pub fn next_link_ips(&mut self) -> Result<(IpNet, IpNet), AddrError> {
        loop {
            if let Some((net, remaining)) = &mut self.current {
                if remaining.len() >= 2 {
                    let a = remaining.remove(0);
                    let b = remaining.remove(0);
                    return Ok((
                        IpNet::new(a, self.prefix_len).unwrap(),
                        IpNet::new(b, self.prefix_len).unwrap(),
                    ));
                }
                let _ = net;
            }
            let next = self
                .pool
                .next_subnet()
                .ok_or_else(|| AddrError::SubnetExhausted(self.current_or_parent_repr()))?;
            let remaining: Vec<IpAddr> = hosts(next).collect();
            self.current = Some((next, remaining));
        }
    }

    fn current_or_parent_repr(&self) -> IpNet {
        self.current
            .as_ref()
            .map(|(n, _)| *n)
            .unwrap_or_else(|| if self.pool.is4() {
                IpNet::V4(Ipv4Net::default())
            } else {
                IpNet::V6(Ipv6Net::default())
            })
    }
}

/// A cursor handing out successive individual addresses within a single
/// shared broadcast domain (e.g. an IXP fabric subnet). This is `NextIP` in
/// the component design.
#[derive(Debug, Clone)]
pub struct BroadcastCursor {
    net: IpNet,
    remaining: std::collections::VecDeque<IpAddr>,
}

impl BroadcastCursor {
    /// Build a cursor handing out addresses from within `net`, in order.
    pub fn new(net: IpNet) -> Self {
        let remaining = hosts(net).collect();
        Self { net, remaining }
    }

    /// Advance the cursor, returning the next address (with `net`'s mask).
    pub fn next_ip(&mut self) -> Result<IpNet, AddrError> {
        let addr = self
            .remaining
            .pop_front()
            .ok_or(AddrError::SubnetExhausted(self.net))?;
        Ok(IpNet::new(addr, self.net.prefix_len()).unwrap())
    }
}

/// A cursor handing out successive loopback addresses from a starting
/// `/32` (or `/128`), one per router, by incrementing the address itself
/// rather than sub-allocating a subnet (loopbacks are host routes, not
/// point-to-point links).
#[derive(Debug, Clone)]
pub struct LoopbackCursor {
    next: IpAddr,
    prefix_len: u8,
}

impl LoopbackCursor {
    /// Build a cursor starting at `start` (whose prefix length is the mask
    /// every subsequent loopback will carry, normally `/32` or `/128`).
    pub fn new(start: IpNet) -> Self {
        Self {
            next: start.addr(),
            prefix_len: start.prefix_len(),
        }
    }

    /// Hand out the next loopback address and advance the cursor.
    pub fn next_loopback(&mut self) -> IpNet {
        let addr = self.next;
        self.next = inc(self.next);
        IpNet::new(addr, self.prefix_len).unwrap()
    }
}

/// Whether a prefix (or an address's natural family) is IPv4.
pub fn is4(net: IpNet) -> bool {
    net.addr().is_ipv4()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ring_of_three_addressing() {
        // Mirrors S1 from spec.md: a /24 sub-allocated into /30s.
        let parent: IpNet = "10.0.0.0/24".parse().unwrap();
        let mut cur = LinkAddressCursor::new(parent, 30).unwrap();

        let (a, b) = cur.next_link_ips().unwrap();
        assert_eq!(a, "10.0.0.1/30".parse().unwrap());
        assert_eq!(b, "10.0.0.2/30".parse().unwrap());

        let (a, b) = cur.next_link_ips().unwrap();
        assert_eq!(a, "10.0.0.5/30".parse().unwrap());
        assert_eq!(b, "10.0.0.6/30".parse().unwrap());

        let (a, b) = cur.next_link_ips().unwrap();
        assert_eq!(a, "10.0.0.9/30".parse().unwrap());
        assert_eq!(b, "10.0.0.10/30".parse().unwrap());
    }

    #[test]
    fn loopback_increments_by_one() {
        let mut cur = LoopbackCursor::new("10.255.0.1/32".parse().unwrap());
        assert_eq!(cur.next_loopback(), "10.255.0.1/32".parse().unwrap());
        assert_eq!(cur.next_loopback(), "10.255.0.2/32".parse().unwrap());
        assert_eq!(cur.next_loopback(), "10.255.0.3/32".parse().unwrap());
    }

    #[test]
    fn sub_allocate_rejects_widening() {
        let parent: IpNet = "10.0.0.0/24".parse().unwrap();
        assert!(matches!(
            SubnetPool::new(parent, 16),
            Err(AddrError::ChildWiderThanParent { .. })
        ));
    }

    #[test]
    fn broadcast_cursor_hands_out_sequential_hosts() {
        let mut cur = BroadcastCursor::new("172.16.0.0/24".parse().unwrap());
        assert_eq!(cur.next_ip().unwrap(), "172.16.0.1/24".parse().unwrap());
        assert_eq!(cur.next_ip().unwrap(), "172.16.0.2/24".parse().unwrap());
    }

    #[test]
    fn is4_distinguishes_families() {
        assert!(is4("10.0.0.0/24".parse().unwrap()));
        assert!(!is4("2001:db8::/64".parse().unwrap()));
    }
}
