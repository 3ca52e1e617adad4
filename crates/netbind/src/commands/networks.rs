//! Network command handlers.

use tabled::Tabled;

use netbind_api::Network;
use netbind_core::Orchestrator;

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Shared")]
    shared: String,
    #[tabled(rename = "External")]
    external: String,
    #[tabled(rename = "Subnets")]
    subnets: String,
}

impl From<&Network> for NetworkRow {
    fn from(n: &Network) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            tenant: n.tenant_id.clone().unwrap_or_default(),
            shared: yes_no(n.shared),
            external: yes_no(n.router_external.unwrap_or(false)),
            subnets: n.subnets.len().to_string(),
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.into()
}

fn detail(n: &Network) -> String {
    output::detail(&[
        ("ID", n.id.clone()),
        ("Name", n.name.clone()),
        ("Tenant", n.tenant_id.clone().unwrap_or_default()),
        ("Shared", yes_no(n.shared)),
        ("External", yes_no(n.router_external.unwrap_or(false))),
        (
            "Port security",
            n.port_security_enabled
                .map_or_else(|| "default".into(), yes_no),
        ),
        ("Subnets", n.subnets.join(", ")),
    ])
}

pub async fn handle(
    orchestrator: &Orchestrator,
    args: NetworksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = util::context(global, None);
    match args.command {
        NetworksCommand::List => {
            let networks = orchestrator.list_networks(&ctx).await?;
            let out = output::render_list(
                &global.output,
                &networks,
                |n| NetworkRow::from(n),
                |n| n.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Show { network } => {
            let id = orchestrator.get_network_id_by_name(&ctx, &network).await?;
            let net = orchestrator.get_network(&ctx, &id).await?;
            let out = output::render_single(&global.output, &net, detail, |n| n.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
