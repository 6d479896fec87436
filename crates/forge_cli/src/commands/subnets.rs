//! Subnets command - Show how a block is split across zones.

use anyhow::{Context, Result};
use clap::Args;
use ipnet::IpNet;

use forge_iac::SubnetAllocator;

#[derive(Args, Debug)]
pub struct SubnetsArgs {
    /// Parent CIDR block (IPv4 or IPv6)
    #[arg(long)]
    pub cidr: IpNet,

    /// Comma-separated availability zones
    #[arg(long, value_delimiter = ',', required = true)]
    pub zones: Vec<String>,

    /// Refuse subnets with a longer prefix than this
    #[arg(long)]
    pub max_prefix: Option<u8>,

    /// Print the allocation as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: SubnetsArgs) -> Result<()> {
    let mut allocator = SubnetAllocator::new();
    if let Some(prefix) = args.max_prefix {
        allocator = allocator.with_max_prefix_len(prefix);
    }

    let allocation = allocator
        .allocate(args.cidr, &args.zones)
        .with_context(|| format!("Failed to allocate subnets from {}", args.cidr))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&allocation)?);
        return Ok(());
    }

    println!(
        "🌐 {} → {} × /{} ({} addresses each)",
        allocation.parent,
        allocation.len(),
        allocation.prefix_len,
        allocation.addresses_per_subnet()
    );
    let width = args.zones.iter().map(String::len).max().unwrap_or(0).max(4);
    println!("   {:<width$}  {:<7}  CIDR", "ZONE", "ROLE", width = width);
    for subnet in allocation.iter() {
        println!(
            "   {:<width$}  {:<7}  {}",
            subnet.zone,
            subnet.role().as_str(),
            subnet.cidr,
            width = width
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_space_is_an_iac_error() {
        let err = execute(SubnetsArgs {
            cidr: "10.0.0.0/31".parse().unwrap(),
            zones: vec!["a".to_string(), "b".to_string()],
            max_prefix: None,
            json: false,
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<forge_iac::IacError>(),
            Some(forge_iac::IacError::InsufficientAddressSpace { .. })
        ));
    }
}
