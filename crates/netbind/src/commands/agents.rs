//! Agent status handler.

use serde::Serialize;
use tabled::Tabled;

use netbind_core::Orchestrator;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// Flattened (host, agent) entry for output.
#[derive(Serialize)]
struct AgentEntry {
    host: String,
    agent_type: String,
    alive: bool,
}

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Agent")]
    agent_type: String,
    #[tabled(rename = "Alive")]
    alive: String,
}

pub async fn handle(orchestrator: &Orchestrator, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = util::context(global, None);
    let by_host = orchestrator.get_agents_status(&ctx).await?;
    let entries: Vec<AgentEntry> = by_host
        .into_iter()
        .flat_map(|(host, agents)| {
            agents.into_iter().map(move |a| AgentEntry {
                host: host.clone(),
                agent_type: a.agent_type,
                alive: a.alive,
            })
        })
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| AgentRow {
            host: e.host.clone(),
            agent_type: e.agent_type.clone(),
            alive: output::alive_marker(e.alive, color),
        },
        |e| format!("{} {}", e.host, e.agent_type),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
