//! Instance lifecycle commands: allocate, deallocate, network info, validation,
//! fixed IPs and migration.

use tabled::Tabled;

use netbind_core::{AllocateRequest, NetworkInfo, Orchestrator, Vif};

use crate::cli::{
    AllocateArgs, AttachPortArgs, FixedIpsArgs, FixedIpsCommand, GlobalOpts, InstanceArgs,
    RequestArgs,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VifRow {
    #[tabled(rename = "Port")]
    id: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Bridge")]
    bridge: String,
    #[tabled(rename = "Type")]
    vif_type: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
}

impl From<&Vif> for VifRow {
    fn from(v: &Vif) -> Self {
        let addresses = v
            .fixed_ips()
            .map(|ip| {
                if ip.floating_ips.is_empty() {
                    ip.address.clone()
                } else {
                    format!("{} ({})", ip.address, ip.floating_ips.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: v.id.clone(),
            mac: v.address.clone(),
            network: v.network.label.clone(),
            bridge: v.network.bridge.clone().unwrap_or_default(),
            vif_type: v.vif_type.clone().unwrap_or_default(),
            addresses,
        }
    }
}

fn print_nw_info(info: &NetworkInfo, global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        info.vifs(),
        |v| VifRow::from(v),
        |v| v.id.clone(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn allocate(
    orchestrator: &Orchestrator,
    args: AllocateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance.instance)?;
    let ctx = util::context(global, Some(&instance));
    let request = AllocateRequest {
        requested_networks: util::requested_networks(&args.request)?,
        macs: (!args.macs.is_empty()).then_some(args.macs),
        security_groups: args.security_groups,
    };

    let info = orchestrator
        .allocate_for_instance(&ctx, &instance, &request)
        .await?;
    print_nw_info(&info, global);
    Ok(())
}

pub async fn deallocate(
    orchestrator: &Orchestrator,
    args: &InstanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance)?;
    let ctx = util::context(global, Some(&instance));
    orchestrator.deallocate_for_instance(&ctx, &instance).await?;
    if !global.quiet {
        eprintln!("Instance {} detached", instance.label());
    }
    Ok(())
}

pub async fn attach_port(
    orchestrator: &Orchestrator,
    args: AttachPortArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance.instance)?;
    let ctx = util::context(global, Some(&instance));
    let info = orchestrator
        .allocate_port_for_instance(
            &ctx,
            &instance,
            args.port.as_deref(),
            args.network.as_deref(),
            args.ip.as_deref(),
        )
        .await?;
    print_nw_info(&info, global);
    Ok(())
}

pub async fn detach_port(
    orchestrator: &Orchestrator,
    args: &InstanceArgs,
    port_id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance)?;
    let ctx = util::context(global, Some(&instance));
    let info = orchestrator
        .deallocate_port_for_instance(&ctx, &instance, port_id)
        .await?;
    print_nw_info(&info, global);
    Ok(())
}

pub async fn nw_info(
    orchestrator: &Orchestrator,
    args: &InstanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance)?;
    let ctx = util::context(global, Some(&instance));
    let info = orchestrator.get_instance_nw_info(&ctx, &instance).await?;
    print_nw_info(&info, global);
    Ok(())
}

pub async fn validate(
    orchestrator: &Orchestrator,
    args: &RequestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = util::project_context(global)?;
    let requested = util::requested_networks(args)?;
    orchestrator.validate_networks(&ctx, &requested).await?;
    if !global.quiet {
        eprintln!("Network request is valid");
    }
    Ok(())
}

pub async fn fixed_ips(
    orchestrator: &Orchestrator,
    args: FixedIpsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FixedIpsCommand::Add {
            instance,
            network_id,
        } => {
            let instance = util::read_instance(&instance.instance)?;
            let ctx = util::context(global, Some(&instance));
            let info = orchestrator
                .add_fixed_ip_to_instance(&ctx, &instance, &network_id)
                .await?;
            print_nw_info(&info, global);
            Ok(())
        }

        FixedIpsCommand::Remove { instance, address } => {
            let instance = util::read_instance(&instance.instance)?;
            let ctx = util::context(global, Some(&instance));
            let info = orchestrator
                .remove_fixed_ip_from_instance(&ctx, &instance, &address)
                .await?;
            print_nw_info(&info, global);
            Ok(())
        }

        FixedIpsCommand::Owner { address } => {
            let ctx = util::context(global, None);
            let uuid = orchestrator.get_fixed_ip_by_address(&ctx, &address).await?;
            output::print_output(&uuid, global.quiet);
            Ok(())
        }
    }
}

pub async fn migrate_finish(
    orchestrator: &Orchestrator,
    args: &InstanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let instance = util::read_instance(&args.instance)?;
    let ctx = util::context(global, Some(&instance));
    orchestrator.migrate_instance_start(&ctx, &instance).await?;
    orchestrator.migrate_instance_finish(&ctx, &instance).await?;
    if !global.quiet {
        eprintln!(
            "Ports of {} bound to {}",
            instance.label(),
            instance.host.as_deref().unwrap_or("(no host)")
        );
    }
    Ok(())
}
