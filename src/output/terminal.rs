//! Terminal output utilities.
//!
//! `format_*` build the text, `print_*` write it to stdout.

use crate::models::{
    num_az_hosts, Connection, LocalNetworkGateway, VirtualNetwork, VirtualNetworkGateway,
};
use colored::Colorize;
use std::fmt::Write;

const LABEL_WIDTH: usize = 22;

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "\t{label:<LABEL_WIDTH$}{value}");
}

fn header(kind: &str, name: &str, id: Option<&crate::models::ResourceId>) -> String {
    let mut out = format!("{kind}: {}\n", name.bold());
    if let Some(id) = id {
        line(&mut out, "Resource ID:", id);
    }
    out
}

pub fn format_virtual_network(network: &VirtualNetwork) -> String {
    let mut out = header("Network", network.display_name(), network.id.as_ref());
    line(&mut out, "Region:", network.location.as_deref().unwrap_or("-"));
    let spaces: Vec<String> = network
        .properties
        .address_space
        .address_prefixes
        .iter()
        .map(|p| p.to_string())
        .collect();
    line(&mut out, "Address spaces:", spaces.join(", "));
    line(&mut out, "Subnets:", network.properties.subnets.len());
    for subnet in &network.properties.subnets {
        let prefix = subnet
            .properties
            .address_prefix
            .map(|p| {
                let hosts = num_az_hosts(p.mask)
                    .map(|n| format!(" ({n} usable)"))
                    .unwrap_or_default();
                format!("{p}{hosts}")
            })
            .unwrap_or_else(|| "none".to_string());
        line(&mut out, &format!("  {}:", subnet.name), prefix);
    }
    out
}

pub fn format_vpn_gateway(gateway: &VirtualNetworkGateway) -> String {
    let p = &gateway.properties;
    let mut out = header("Virtual network gateway", gateway.display_name(), gateway.id.as_ref());
    line(&mut out, "Gateway type:", format!("{:?}", p.gateway_type));
    line(&mut out, "VPN type:", format!("{:?}", p.vpn_type));
    line(&mut out, "SKU:", &p.sku.name);
    for ip_config in &p.ip_configurations {
        if let Some(subnet) = &ip_config.properties.subnet {
            line(&mut out, "Subnet:", &subnet.id);
        }
        if let Some(public_ip) = &ip_config.properties.public_ip_address {
            line(&mut out, "Public IP:", &public_ip.id);
        }
    }
    if let Some(state) = p.provisioning_state {
        line(&mut out, "Provisioning state:", format!("{state:?}"));
    }
    out
}

pub fn format_local_gateway(gateway: &LocalNetworkGateway) -> String {
    let p = &gateway.properties;
    let mut out = header("Local network gateway", gateway.display_name(), gateway.id.as_ref());
    line(
        &mut out,
        "Gateway IP:",
        p.gateway_ip_address
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    let spaces: Vec<String> = p
        .local_network_address_space
        .address_prefixes
        .iter()
        .map(|s| s.to_string())
        .collect();
    line(&mut out, "Address spaces:", spaces.join(", "));
    out
}

/// Connection summary; the shared key is never included.
pub fn format_connection(connection: &Connection) -> String {
    let p = &connection.properties;
    let mut out = header("Connection", connection.display_name(), connection.id.as_ref());
    line(&mut out, "Type:", format!("{:?}", p.connection_type));
    line(
        &mut out,
        "Status:",
        p.connection_status.as_deref().unwrap_or("Unknown"),
    );
    if let Some(gw) = &p.virtual_network_gateway1 {
        line(&mut out, "VPN gateway:", gw.id.name().unwrap_or(gw.id.as_str()));
    }
    if let Some(gw) = &p.local_network_gateway2 {
        line(&mut out, "Local gateway:", gw.id.name().unwrap_or(gw.id.as_str()));
    }
    if let Some(state) = p.provisioning_state {
        line(&mut out, "Provisioning state:", format!("{state:?}"));
    }
    out
}

pub fn print_virtual_network(network: &VirtualNetwork) {
    println!("{}", format_virtual_network(network));
}

pub fn print_vpn_gateway(gateway: &VirtualNetworkGateway) {
    println!("{}", format_vpn_gateway(gateway));
}

pub fn print_local_gateway(gateway: &LocalNetworkGateway) {
    println!("{}", format_local_gateway(gateway));
}

pub fn print_connection(connection: &Connection) {
    println!("{}", format_connection(connection));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ipv4;
    use serde_json::json;

    #[test]
    fn test_format_virtual_network_lists_subnets() {
        colored::control::set_override(false);
        let mut vnet = VirtualNetwork::with_gateway_subnet(
            "eastus",
            Ipv4::new("10.11.0.0/16").unwrap(),
            Ipv4::new("10.11.255.0/27").unwrap(),
        );
        vnet.name = Some("vnet1".to_string());

        let text = format_virtual_network(&vnet);
        assert!(text.starts_with("Network: vnet1\n"));
        assert!(text.contains("10.11.0.0/16"));
        assert!(text.contains("GatewaySubnet:"));
        assert!(text.contains("10.11.255.0/27 (27 usable)"));
    }

    #[test]
    fn test_format_connection_hides_shared_key() {
        let connection: Connection = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/connections/con1",
            "name": "con1",
            "properties": {
                "connectionType": "IPsec",
                "sharedKey": "MySecretKey",
                "connectionStatus": "Connecting",
                "virtualNetworkGateway1": {"id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworkGateways/gw1"},
                "localNetworkGateway2": {"id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/localNetworkGateways/lgw1"}
            }
        }))
        .unwrap();

        let text = format_connection(&connection);
        assert!(text.contains("IPsec"));
        assert!(text.contains("Connecting"));
        assert!(text.contains("gw1"));
        assert!(text.contains("lgw1"));
        assert!(!text.contains("MySecretKey"));
    }
}
