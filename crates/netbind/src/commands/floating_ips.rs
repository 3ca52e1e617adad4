//! Floating IP command handlers.

use tabled::Tabled;

use netbind_core::{FloatingIpInfo, FloatingIpPool, Orchestrator};

use crate::cli::{FloatingIpsArgs, FloatingIpsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FloatingIpRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Fixed IP")]
    fixed: String,
    #[tabled(rename = "Instance")]
    instance: String,
}

impl From<&FloatingIpInfo> for FloatingIpRow {
    fn from(f: &FloatingIpInfo) -> Self {
        Self {
            address: f.address.clone(),
            pool: f.pool.clone(),
            fixed: f.fixed_ip_address.clone().unwrap_or_default(),
            instance: f.instance_uuid.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    name: String,
}

fn detail(f: &FloatingIpInfo) -> String {
    output::detail(&[
        ("ID", f.id.clone()),
        ("Address", f.address.clone()),
        ("Pool", f.pool.clone()),
        ("Project", f.project_id.clone().unwrap_or_default()),
        ("Port", f.fixed_ip_id.clone().unwrap_or_default()),
        ("Fixed IP", f.fixed_ip_address.clone().unwrap_or_default()),
        ("Instance", f.instance_uuid.clone().unwrap_or_default()),
    ])
}

pub async fn handle(
    orchestrator: &Orchestrator,
    args: FloatingIpsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FloatingIpsCommand::List => {
            let ctx = util::project_context(global)?;
            let fips = orchestrator.get_floating_ips_by_project(&ctx).await?;
            let out = output::render_list(
                &global.output,
                &fips,
                |f| FloatingIpRow::from(f),
                |f| f.address.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FloatingIpsCommand::Show { address } => {
            let ctx = util::context(global, None);
            let fip = orchestrator
                .get_floating_ip_by_address(&ctx, &address)
                .await?;
            let out = output::render_single(&global.output, &fip, detail, |f| f.address.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FloatingIpsCommand::Pools => {
            let ctx = util::context(global, None);
            let pools = orchestrator.get_floating_ip_pools(&ctx).await?;
            let out = output::render_list(
                &global.output,
                &pools,
                |p: &FloatingIpPool| PoolRow {
                    name: p.name.clone(),
                },
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FloatingIpsCommand::Allocate { pool } => {
            let ctx = util::context(global, None);
            let address = orchestrator
                .allocate_floating_ip(&ctx, pool.as_deref())
                .await?;
            output::print_output(&address, global.quiet);
            Ok(())
        }

        FloatingIpsCommand::Release { address } => {
            let ctx = util::context(global, None);
            orchestrator.release_floating_ip(&ctx, &address).await?;
            if !global.quiet {
                eprintln!("Floating IP {address} released");
            }
            Ok(())
        }

        FloatingIpsCommand::Associate {
            instance,
            floating,
            fixed,
        } => {
            let instance = util::read_instance(&instance.instance)?;
            let ctx = util::context(global, Some(&instance));
            orchestrator
                .associate_floating_ip(&ctx, &instance, &floating, &fixed)
                .await?;
            if !global.quiet {
                eprintln!("Floating IP {floating} associated with {fixed}");
            }
            Ok(())
        }

        FloatingIpsCommand::Disassociate { instance, floating } => {
            let instance = util::read_instance(&instance.instance)?;
            let ctx = util::context(global, Some(&instance));
            orchestrator
                .disassociate_floating_ip(&ctx, &instance, &floating)
                .await?;
            if !global.quiet {
                eprintln!("Floating IP {floating} disassociated");
            }
            Ok(())
        }
    }
}
