//! Command dispatch: bridges CLI args -> orchestrator calls -> output formatting.

pub mod agents;
pub mod floating_ips;
pub mod instance;
pub mod networks;
pub mod ports;
pub mod util;

use netbind_core::Orchestrator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    orchestrator: &Orchestrator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Allocate(args) => instance::allocate(orchestrator, args, global).await,
        Command::Deallocate(args) => instance::deallocate(orchestrator, &args, global).await,
        Command::AttachPort(args) => instance::attach_port(orchestrator, args, global).await,
        Command::DetachPort { instance, port_id } => {
            instance::detach_port(orchestrator, &instance, &port_id, global).await
        }
        Command::NwInfo(args) => instance::nw_info(orchestrator, &args, global).await,
        Command::Validate(args) => instance::validate(orchestrator, &args, global).await,
        Command::FixedIps(args) => instance::fixed_ips(orchestrator, args, global).await,
        Command::MigrateFinish(args) => instance::migrate_finish(orchestrator, &args, global).await,
        Command::Networks(args) => networks::handle(orchestrator, args, global).await,
        Command::Ports(args) => ports::handle(orchestrator, args, global).await,
        Command::FloatingIps(args) => floating_ips::handle(orchestrator, args, global).await,
        Command::Agents => agents::handle(orchestrator, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
