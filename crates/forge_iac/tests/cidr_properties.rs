//! Property-based tests for subnet allocation.
//!
//! For any parent block large enough to hold them, allocation yields two
//! equally sized, non-overlapping subnets per zone inside the parent.

use std::net::{Ipv4Addr, Ipv6Addr};

use forge_iac::cidr::{allocate, Allocation, SubnetRole, SUBNETS_PER_ZONE};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use proptest::prelude::*;

fn zones(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("zone-{}", i)).collect()
}

fn ipv4_parent() -> impl Strategy<Value = IpNet> {
    (any::<u32>(), 8u8..=24).prop_map(|(addr, prefix)| {
        IpNet::V4(Ipv4Net::new(Ipv4Addr::from(addr), prefix).unwrap().trunc())
    })
}

fn ipv6_parent() -> impl Strategy<Value = IpNet> {
    (any::<u128>(), 32u8..=64).prop_map(|(addr, prefix)| {
        IpNet::V6(Ipv6Net::new(Ipv6Addr::from(addr), prefix).unwrap().trunc())
    })
}

fn check_layout(parent: &IpNet, zone_names: &[String], allocation: &Allocation) {
    assert_eq!(allocation.len(), zone_names.len() * SUBNETS_PER_ZONE);

    for (i, subnet) in allocation.iter().enumerate() {
        assert!(parent.contains(&subnet.cidr), "{} outside {}", subnet.cidr, parent);
        assert_eq!(subnet.cidr.prefix_len(), allocation.prefix_len);
        assert_eq!(subnet.index as usize, i);
        assert_eq!(subnet.zone, zone_names[i / SUBNETS_PER_ZONE]);
    }

    let subnets: Vec<&IpNet> = allocation.iter().map(|s| &s.cidr).collect();
    for (i, a) in subnets.iter().enumerate() {
        for b in &subnets[i + 1..] {
            assert!(
                !a.contains(&b.network()) && !b.contains(&a.network()),
                "{} overlaps {}",
                a,
                b
            );
        }
    }

    for zone in zone_names {
        let roles: Vec<SubnetRole> = allocation.for_zone(zone).map(|s| s.role()).collect();
        assert_eq!(roles, vec![SubnetRole::Private, SubnetRole::Public]);
    }
}

proptest! {
    #[test]
    fn prop_ipv4_allocation_is_disjoint_and_contained(
        parent in ipv4_parent(),
        zone_count in 1usize..=6,
    ) {
        let zone_names = zones(zone_count);
        let allocation = allocate(parent, &zone_names).unwrap();
        check_layout(&parent, &zone_names, &allocation);
    }

    #[test]
    fn prop_ipv6_allocation_is_disjoint_and_contained(
        parent in ipv6_parent(),
        zone_count in 1usize..=6,
    ) {
        let zone_names = zones(zone_count);
        let allocation = allocate(parent, &zone_names).unwrap();
        check_layout(&parent, &zone_names, &allocation);
    }

    #[test]
    fn prop_allocation_is_deterministic(
        parent in ipv4_parent(),
        zone_count in 1usize..=6,
    ) {
        let zone_names = zones(zone_count);
        prop_assert_eq!(
            allocate(parent, &zone_names).unwrap(),
            allocate(parent, &zone_names).unwrap()
        );
    }

    #[test]
    fn prop_subnets_use_smallest_sufficient_prefix(
        parent in ipv4_parent(),
        zone_count in 1usize..=6,
    ) {
        let allocation = allocate(parent, &zones(zone_count)).unwrap();
        let slots = zone_count * SUBNETS_PER_ZONE;
        let index_bits = allocation.prefix_len - parent.prefix_len();

        // 2^index_bits subnets fit, 2^(index_bits - 1) would not
        prop_assert!(1usize << index_bits >= slots);
        prop_assert!(1usize << (index_bits - 1) < slots);
    }
}
