//! Subnet allocation across availability zones.
//!
//! The parent block is cut into `2 * zones` equally sized, power-of-two
//! subnets. Zone `i` owns global subnet indices `2i` (private) and `2i + 1`
//! (public), so the layout only depends on the parent block and the order of
//! the zone list.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::Serialize;
use tracing::debug;

use crate::error::{IacError, IacResult};

/// Subnets allocated per availability zone.
pub const SUBNETS_PER_ZONE: usize = 2;

/// Smallest subnet AWS accepts.
pub const AWS_MAX_SUBNET_PREFIX: u8 = 28;

/// Role implied by a subnet's slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetRole {
    Private,
    Public,
}

impl SubnetRole {
    pub fn from_slot(slot: u8) -> Self {
        if slot % 2 == 0 {
            SubnetRole::Private
        } else {
            SubnetRole::Public
        }
    }

    pub fn slot(&self) -> u8 {
        match self {
            SubnetRole::Private => 0,
            SubnetRole::Public => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetRole::Private => "private",
            SubnetRole::Public => "public",
        }
    }
}

impl std::fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One allocated subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetAllocation {
    pub zone: String,
    /// Position among all subnets of the parent block.
    pub index: u32,
    /// 0 (private) or 1 (public) within the zone.
    pub slot: u8,
    pub cidr: IpNet,
}

impl SubnetAllocation {
    pub fn role(&self) -> SubnetRole {
        SubnetRole::from_slot(self.slot)
    }

    /// Terraform local name, `subnet_<slot>_<zone>`.
    pub fn resource_name(&self) -> String {
        format!("subnet_{}_{}", self.slot, self.zone)
    }
}

/// Ordered allocation result: zone order, slot 0 before slot 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub parent: IpNet,
    pub prefix_len: u8,
    pub subnets: Vec<SubnetAllocation>,
}

impl Allocation {
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubnetAllocation> {
        self.subnets.iter()
    }

    pub fn with_role(&self, role: SubnetRole) -> impl Iterator<Item = &SubnetAllocation> {
        self.subnets.iter().filter(move |s| s.role() == role)
    }

    pub fn private(&self) -> impl Iterator<Item = &SubnetAllocation> {
        self.with_role(SubnetRole::Private)
    }

    pub fn public(&self) -> impl Iterator<Item = &SubnetAllocation> {
        self.with_role(SubnetRole::Public)
    }

    pub fn for_zone<'a>(&'a self, zone: &'a str) -> impl Iterator<Item = &'a SubnetAllocation> + 'a {
        self.subnets.iter().filter(move |s| s.zone == zone)
    }

    /// Addresses in each subnet.
    pub fn addresses_per_subnet(&self) -> u128 {
        let host_bits = u32::from(self.parent.max_prefix_len() - self.prefix_len);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }
}

/// Splits a parent block into per-zone subnets.
#[derive(Debug, Clone, Default)]
pub struct SubnetAllocator {
    max_prefix_len: Option<u8>,
}

impl SubnetAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse subnets with a longer prefix (fewer addresses) than `prefix_len`.
    pub fn with_max_prefix_len(mut self, prefix_len: u8) -> Self {
        self.max_prefix_len = Some(prefix_len);
        self
    }

    pub fn allocate(&self, parent: IpNet, zones: &[String]) -> IacResult<Allocation> {
        if zones.is_empty() {
            return Err(IacError::InvalidInput(
                "at least one availability zone is required to allocate subnets".to_string(),
            ));
        }

        let parent = parent.trunc();
        let bits = u32::from(parent.max_prefix_len());
        let parent_prefix = u32::from(parent.prefix_len());
        let host_bits = bits - parent_prefix;

        let slots = (zones.len() * SUBNETS_PER_ZONE) as u128;
        // ceil(log2(slots)): largest power-of-two subnet that fits `slots` times.
        let index_bits = u128::BITS - (slots - 1).leading_zeros();

        let insufficient = || IacError::InsufficientAddressSpace {
            cidr: parent.to_string(),
            zones: zones.len(),
        };

        if index_bits > host_bits {
            return Err(insufficient());
        }

        let prefix_len = (parent_prefix + index_bits) as u8;
        let limit = self.max_prefix_len.unwrap_or(parent.max_prefix_len());
        if prefix_len > limit {
            return Err(insufficient());
        }

        let subnet_host_bits = bits - u32::from(prefix_len);
        let base = network_bits(&parent);

        debug!(
            "Allocating {} /{} subnets from {} across {} zone(s)",
            slots,
            prefix_len,
            parent,
            zones.len()
        );

        let mut subnets = Vec::with_capacity(zones.len() * SUBNETS_PER_ZONE);
        for (i, zone) in zones.iter().enumerate() {
            for slot in 0..SUBNETS_PER_ZONE {
                let index = (i * SUBNETS_PER_ZONE + slot) as u128;
                let address = (index << subnet_host_bits) | base;
                subnets.push(SubnetAllocation {
                    zone: zone.clone(),
                    index: index as u32,
                    slot: slot as u8,
                    cidr: make_net(&parent, address, prefix_len)?,
                });
            }
        }

        Ok(Allocation {
            parent,
            prefix_len,
            subnets,
        })
    }
}

/// Allocate without any size floor beyond the address family.
pub fn allocate(parent: IpNet, zones: &[String]) -> IacResult<Allocation> {
    SubnetAllocator::new().allocate(parent, zones)
}

fn network_bits(net: &IpNet) -> u128 {
    match net.network() {
        IpAddr::V4(addr) => u128::from(u32::from(addr)),
        IpAddr::V6(addr) => u128::from(addr),
    }
}

fn make_net(parent: &IpNet, address: u128, prefix_len: u8) -> IacResult<IpNet> {
    let net = match parent {
        IpNet::V4(_) => {
            let address = u32::try_from(address)
                .map_err(|_| IacError::InvalidInput(format!("address {} overflows IPv4", address)))?;
            Ipv4Net::new(Ipv4Addr::from(address), prefix_len).map(IpNet::V4)
        }
        IpNet::V6(_) => Ipv6Net::new(Ipv6Addr::from(address), prefix_len).map(IpNet::V6),
    };
    net.map_err(|e| IacError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|z| z.to_string()).collect()
    }

    fn cidrs(allocation: &Allocation) -> Vec<String> {
        allocation.iter().map(|s| s.cidr.to_string()).collect()
    }

    #[test]
    fn test_two_zones_in_slash_16() {
        let parent: IpNet = "10.0.0.0/16".parse().unwrap();
        let allocation = allocate(parent, &zones(&["us-east-1a", "us-east-1b"])).unwrap();

        assert_eq!(allocation.prefix_len, 18);
        assert_eq!(allocation.addresses_per_subnet(), 16384);
        assert_eq!(
            cidrs(&allocation),
            vec!["10.0.0.0/18", "10.0.64.0/18", "10.0.128.0/18", "10.0.192.0/18"]
        );

        let layout: Vec<_> = allocation.iter().map(|s| (s.zone.as_str(), s.slot)).collect();
        assert_eq!(
            layout,
            vec![("us-east-1a", 0), ("us-east-1a", 1), ("us-east-1b", 0), ("us-east-1b", 1)]
        );
    }

    #[test]
    fn test_three_zones_round_down_to_power_of_two() {
        let parent: IpNet = "10.0.0.0/16".parse().unwrap();
        let allocation = allocate(parent, &zones(&["a", "b", "c"])).unwrap();

        // 65536 / 6 = 10922, largest power of two below is 8192
        assert_eq!(allocation.prefix_len, 19);
        assert_eq!(allocation.len(), 6);
        assert_eq!(allocation.subnets[5].cidr.to_string(), "10.0.160.0/19");
    }

    #[test]
    fn test_single_zone() {
        let parent: IpNet = "192.168.0.0/24".parse().unwrap();
        let allocation = allocate(parent, &zones(&["eu-west-1a"])).unwrap();
        assert_eq!(cidrs(&allocation), vec!["192.168.0.0/25", "192.168.0.128/25"]);
        assert_eq!(allocation.private().count(), 1);
        assert_eq!(allocation.public().count(), 1);
    }

    #[test]
    fn test_empty_zone_list_rejected() {
        let parent: IpNet = "10.0.0.0/16".parse().unwrap();
        assert!(matches!(allocate(parent, &[]), Err(IacError::InvalidInput(_))));
    }

    #[test]
    fn test_insufficient_address_space() {
        let parent: IpNet = "10.0.0.0/31".parse().unwrap();
        let result = allocate(parent, &zones(&["a", "b"]));
        assert!(matches!(result, Err(IacError::InsufficientAddressSpace { zones: 2, .. })));
    }

    #[test]
    fn test_max_prefix_limit() {
        let parent: IpNet = "10.0.0.0/26".parse().unwrap();
        let allocator = SubnetAllocator::new().with_max_prefix_len(AWS_MAX_SUBNET_PREFIX);

        // 64 / 4 = 16 addresses -> /28 is still allowed
        assert_eq!(allocator.allocate(parent, &zones(&["a", "b"])).unwrap().prefix_len, 28);
        // 64 / 6 -> /29 is too small for AWS
        assert!(matches!(
            allocator.allocate(parent, &zones(&["a", "b", "c"])),
            Err(IacError::InsufficientAddressSpace { .. })
        ));
    }

    #[test]
    fn test_ipv6_parent() {
        let parent: IpNet = "2001:db8::/56".parse().unwrap();
        let allocation = allocate(parent, &zones(&["a", "b"])).unwrap();
        assert_eq!(allocation.prefix_len, 58);
        assert_eq!(allocation.subnets[3].cidr.to_string(), "2001:db8:0:c0::/58");
    }

    #[test]
    fn test_resource_name() {
        let parent: IpNet = "10.0.0.0/16".parse().unwrap();
        let allocation = allocate(parent, &zones(&["us-east-1a"])).unwrap();
        assert_eq!(allocation.subnets[0].resource_name(), "subnet_0_us-east-1a");
        assert_eq!(allocation.subnets[1].role(), SubnetRole::Public);
    }
}
