//! Port command handlers.

use tabled::Tabled;

use netbind_api::{Port, PortFilter};
use netbind_core::Orchestrator;

use crate::cli::{GlobalOpts, PortsArgs, PortsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Fixed IPs")]
    fixed_ips: String,
}

fn fixed_ips(p: &Port) -> String {
    p.fixed_ips
        .iter()
        .map(|ip| ip.ip_address.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&Port> for PortRow {
    fn from(p: &Port) -> Self {
        Self {
            id: p.id.clone(),
            network: p.network_id.clone(),
            mac: p.mac_address.clone(),
            device: p.bound_device().unwrap_or_default().to_owned(),
            fixed_ips: fixed_ips(p),
        }
    }
}

fn detail(p: &Port) -> String {
    output::detail(&[
        ("ID", p.id.clone()),
        ("Network", p.network_id.clone()),
        ("Tenant", p.tenant_id.clone().unwrap_or_default()),
        ("MAC", p.mac_address.clone()),
        ("Device", p.bound_device().unwrap_or_default().to_owned()),
        ("Owner", p.device_owner.clone().unwrap_or_default()),
        ("Fixed IPs", fixed_ips(p)),
        ("Security groups", p.security_groups.join(", ")),
        ("Host", p.binding_host_id.clone().unwrap_or_default()),
        ("VIF type", p.binding_vif_type.clone().unwrap_or_default()),
    ])
}

pub async fn handle(
    orchestrator: &Orchestrator,
    args: PortsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = util::context(global, None);
    match args.command {
        PortsCommand::List { device, network } => {
            let filter = PortFilter {
                device_id: device,
                network_id: network,
                ..PortFilter::default()
            };
            let ports = orchestrator.list_ports(&ctx, &filter).await?;
            let out = output::render_list(
                &global.output,
                &ports,
                |p| PortRow::from(p),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Show { id } => {
            let port = orchestrator.show_port(&ctx, &id).await?;
            let out = output::render_single(&global.output, &port, detail, |p| p.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
