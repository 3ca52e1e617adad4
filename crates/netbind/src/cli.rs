//! Clap derive structures for the `netbind` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netbind -- attach instances to tenant networks
#[derive(Debug, Parser)]
#[command(
    name = "netbind",
    version,
    about = "Provision instance network attachments from the command line",
    long_about = "Binds or creates ports for an instance on a remote network service,\n\
        rolls back partial allocations, and reports the resulting network info.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Service profile to use
    #[arg(long, short = 'p', env = "NETBIND_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Network service URL (overrides profile)
    #[arg(long, short = 'u', env = "NETBIND_URL", global = true)]
    pub url: Option<String>,

    /// Caller's identity token
    #[arg(long, env = "NETBIND_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Caller's project (tenant) id
    #[arg(long, env = "NETBIND_PROJECT", global = true)]
    pub project: Option<String>,

    /// Authentication strategy (overrides profile)
    #[arg(long, env = "NETBIND_AUTH_STRATEGY", global = true)]
    pub auth_strategy: Option<AuthStrategyArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETBIND_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "NETBIND_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETBIND_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Directory holding cached network info per instance
    #[arg(long, env = "NETBIND_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AuthStrategyArg {
    /// Identity-service tokens
    Keystone,
    /// Authentication disabled on the service
    Noauth,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Attach an instance to its networks
    Allocate(AllocateArgs),

    /// Detach an instance from every network
    Deallocate(InstanceArgs),

    /// Attach one more port to an instance
    AttachPort(AttachPortArgs),

    /// Detach a single port from an instance
    DetachPort {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Port to detach
        port_id: String,
    },

    /// Rebuild and show an instance's network info
    #[command(alias = "nw")]
    NwInfo(InstanceArgs),

    /// Check a network request before scheduling
    Validate(RequestArgs),

    /// Add or remove fixed IPs of an instance
    FixedIps(FixedIpsArgs),

    /// Rebind an instance's ports to its current host
    MigrateFinish(InstanceArgs),

    /// Inspect networks
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Inspect ports
    Ports(PortsArgs),

    /// Manage floating IPs
    #[command(alias = "fip")]
    FloatingIps(FloatingIpsArgs),

    /// Agent liveness grouped by host
    Agents,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Instance commands ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstanceArgs {
    /// JSON file describing the instance
    #[arg(long, short = 'i')]
    pub instance: PathBuf,
}

/// Requested networks, shared by `allocate` and `validate`.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Network to attach to, optionally with a fixed address (NET[=IP])
    #[arg(long = "network", short = 'n')]
    pub networks: Vec<String>,

    /// Pre-created port to bind
    #[arg(long = "port")]
    pub ports: Vec<String>,
}

#[derive(Debug, Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Hypervisor-supplied MAC address (repeatable)
    #[arg(long = "mac")]
    pub macs: Vec<String>,

    /// Security group name or id (repeatable)
    #[arg(long = "security-group", short = 's')]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Args)]
pub struct AttachPortArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Existing port to bind
    #[arg(long, conflicts_with = "network")]
    pub port: Option<String>,

    /// Network on which to create a port
    #[arg(long, required_unless_present = "port")]
    pub network: Option<String>,

    /// Fixed address for the new port
    #[arg(long, requires = "network")]
    pub ip: Option<String>,
}

#[derive(Debug, Args)]
pub struct FixedIpsArgs {
    #[command(subcommand)]
    pub command: FixedIpsCommand,
}

#[derive(Debug, Subcommand)]
pub enum FixedIpsCommand {
    /// Add a fixed IP on a network the instance is attached to
    Add {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Network id
        network_id: String,
    },

    /// Remove a fixed IP from the instance
    Remove {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Address to remove
        address: String,
    },

    /// Instance owning a fixed address
    Owner {
        /// Fixed address
        address: String,
    },
}

// ── Networks ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List visible networks
    #[command(alias = "ls")]
    List,

    /// Show a network by name or id
    Show {
        /// Network name or id
        network: String,
    },
}

// ── Ports ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(subcommand)]
    pub command: PortsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// List ports
    #[command(alias = "ls")]
    List {
        /// Only ports bound to this device (instance uuid)
        #[arg(long)]
        device: Option<String>,

        /// Only ports on this network
        #[arg(long)]
        network: Option<String>,
    },

    /// Show a port
    Show {
        /// Port id
        id: String,
    },
}

// ── Floating IPs ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FloatingIpsArgs {
    #[command(subcommand)]
    pub command: FloatingIpsCommand,
}

#[derive(Debug, Subcommand)]
pub enum FloatingIpsCommand {
    /// List the project's floating IPs
    #[command(alias = "ls")]
    List,

    /// Show a floating IP by address
    Show {
        /// Floating address
        address: String,
    },

    /// List floating IP pools
    Pools,

    /// Allocate a floating IP
    Allocate {
        /// Pool name or id (defaults to the profile's default pool)
        #[arg(long)]
        pool: Option<String>,
    },

    /// Release an unbound floating IP
    Release {
        /// Floating address
        address: String,
    },

    /// Bind a floating IP to one of an instance's fixed addresses
    Associate {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Floating address
        floating: String,

        /// Fixed address on the instance
        fixed: String,
    },

    /// Unbind a floating IP from an instance
    Disassociate {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Floating address
        floating: String,
    },
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
