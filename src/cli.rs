//! CLI definitions and command routing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use crate::hosts::{BackupOutcome, Projection};
use crate::service::HostsService;

#[derive(Parser)]
#[command(name = "hostswitch")]
#[command(about = "Toggle groups of host mappings in the system hosts file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage host groups (create, update, toggle, delete, list)
    Group {
        #[command(subcommand)]
        cmd: GroupCmd,
    },

    /// Inspect, apply to, and back up the system hosts file
    Hosts {
        #[command(subcommand)]
        cmd: HostsCmd,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Show or move the data directory
    Location {
        #[command(subcommand)]
        cmd: LocationCmd,
    },
}

#[derive(Subcommand)]
pub enum GroupCmd {
    /// List all groups in order
    List,
    /// Print one group's details and content
    Show { id: String },
    /// Create a group (inactive unless --active)
    Create {
        title: String,
        /// Hosts lines for the group
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read hosts lines from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Mark as a remote group refreshed from this URL
        #[arg(long)]
        remote_url: Option<String>,
        /// Activate right away
        #[arg(long)]
        active: bool,
        /// Re-project the system hosts file afterwards
        #[arg(long)]
        apply: bool,
    },
    /// Change a group's title, content or activation
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        apply: bool,
    },
    /// Delete a group
    Delete {
        id: String,
        #[arg(long)]
        apply: bool,
    },
    /// Flip a group between active and inactive
    Toggle {
        id: String,
        #[arg(long)]
        apply: bool,
    },
    /// Replace a group's tags (none clears them)
    Tag { id: String, tags: Vec<String> },
    /// Set a group's parent group (none clears it)
    Parent { id: String, parent: Option<String> },
}

#[derive(Subcommand)]
pub enum HostsCmd {
    /// Print the system hosts file
    Show,
    /// Write the active groups into the system hosts file
    Apply,
    /// Back up the system hosts file now
    Backup,
    /// List backups, oldest first
    Backups,
    /// Restore the system hosts file from a backup
    Restore { file: PathBuf },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print the current settings as JSON
    Show,
    /// Change one setting
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConfigKey {
    /// light or dark
    Theme,
    /// true or false
    AutoBackup,
    /// Folder for backups; empty for the default
    BackupFolder,
    /// Remote refresh interval in minutes
    UpdateFreq,
    /// append or exclusive (re-applies the hosts file)
    HostsMode,
}

#[derive(Subcommand)]
pub enum LocationCmd {
    /// Print the data directory
    Show,
    /// Copy all data to a new directory and use it from now on
    Set { path: PathBuf },
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let service = HostsService::open_default()?;

    match cli.command {
        Commands::Group { cmd } => cmd_group(&service, cmd),
        Commands::Hosts { cmd } => cmd_hosts(&service, cmd),
        Commands::Config { cmd } => cmd_config(&service, cmd),
        Commands::Location { cmd } => cmd_location(&service, cmd),
    }
}

fn read_content(content: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (content, file) {
        (Some(c), _) => Ok(Some(c)),
        (None, Some(path)) => {
            let c = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            Ok(Some(c))
        }
        (None, None) => Ok(None),
    }
}

fn apply(service: &HostsService) -> Result<()> {
    let projection = service.update_system_hosts()?;
    print_projection(&projection);
    Ok(())
}

fn print_projection(p: &Projection) {
    if p.changed {
        println!("Updated {}", p.path.display());
    } else {
        println!("{} already up to date", p.path.display());
    }
    match &p.backup {
        BackupOutcome::Written(b) => println!("Backup: {}", b.display()),
        BackupOutcome::Failed(e) => eprintln!("Warning: backup failed: {e}"),
        BackupOutcome::Skipped => {}
    }
}

fn cmd_group(service: &HostsService, cmd: GroupCmd) -> Result<()> {
    match cmd {
        GroupCmd::List => {
            for g in service.list_groups() {
                let state = if g.is_active { "on" } else { "off" };
                let tags: Vec<&str> = g.tags.iter().map(String::as_str).collect();
                if tags.is_empty() {
                    println!("{}\t{state}\t{}", g.id, g.title);
                } else {
                    println!("{}\t{state}\t{}\t[{}]", g.id, g.title, tags.join(", "));
                }
            }
            Ok(())
        }
        GroupCmd::Show { id } => {
            let g = service.get_group(&id)?;
            println!("id:       {}", g.id);
            println!("title:    {}", g.title);
            println!("active:   {}", g.is_active);
            if let Some(url) = &g.remote_url {
                println!("remote:   {url}");
            }
            if let Some(parent) = &g.parent {
                println!("parent:   {parent}");
            }
            println!("created:  {}", g.created_at.to_rfc3339());
            println!("updated:  {}", g.last_updated.to_rfc3339());
            println!();
            print!("{}", g.content);
            if !g.content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        GroupCmd::Create {
            title,
            content,
            file,
            remote_url,
            active,
            apply: reapply,
        } => {
            let content = read_content(content, file)?.unwrap_or_default();
            let is_remote = remote_url.is_some();
            let group =
                service.create_group(&title, &content, is_remote, remote_url.as_deref())?;
            if active {
                service.toggle_group(&group.id)?;
            }
            println!("{}", group.id);
            if reapply {
                apply(service)?;
            }
            Ok(())
        }
        GroupCmd::Update {
            id,
            title,
            content,
            file,
            active,
            apply: reapply,
        } => {
            let current = service.get_group(&id)?;
            let content = read_content(content, file)?.unwrap_or(current.content);
            let title = title.unwrap_or(current.title);
            let active = active.unwrap_or(current.is_active);
            service.update_group(&id, &title, &content, active)?;
            println!("Updated group: {id}");
            if reapply {
                apply(service)?;
            }
            Ok(())
        }
        GroupCmd::Delete { id, apply: reapply } => {
            service.delete_group(&id)?;
            println!("Deleted group: {id}");
            if reapply {
                apply(service)?;
            }
            Ok(())
        }
        GroupCmd::Toggle { id, apply: reapply } => {
            service.toggle_group(&id)?;
            let g = service.get_group(&id)?;
            let state = if g.is_active { "on" } else { "off" };
            println!("{}: {state}", g.title);
            if reapply {
                apply(service)?;
            }
            Ok(())
        }
        GroupCmd::Tag { id, tags } => {
            service.set_group_tags(&id, &tags)?;
            println!("Tagged group: {id}");
            Ok(())
        }
        GroupCmd::Parent { id, parent } => {
            service.set_group_parent(&id, parent.as_deref())?;
            println!("Set parent for {id}");
            Ok(())
        }
    }
}

fn cmd_hosts(service: &HostsService, cmd: HostsCmd) -> Result<()> {
    match cmd {
        HostsCmd::Show => {
            let hosts = service.get_system_hosts()?;
            std::io::stdout().write_all(&hosts.content)?;
            Ok(())
        }
        HostsCmd::Apply => apply(service),
        HostsCmd::Backup => {
            let path = service.backup_system_hosts()?;
            println!("{}", path.display());
            Ok(())
        }
        HostsCmd::Backups => {
            for path in service.list_backups()? {
                println!("{}", path.display());
            }
            Ok(())
        }
        HostsCmd::Restore { file } => {
            let projection = service.restore_backup(&file)?;
            print_projection(&projection);
            Ok(())
        }
    }
}

fn cmd_config(service: &HostsService, cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Show => {
            println!("{}", serde_json::to_string_pretty(&service.config())?);
            Ok(())
        }
        ConfigCmd::Set { key, value } => {
            let mut config = service.config();
            match key {
                ConfigKey::HostsMode => {
                    let projection = service.set_hosts_mode(&value)?;
                    println!("hostsMode = {value}");
                    print_projection(&projection);
                    return Ok(());
                }
                ConfigKey::Theme => config.theme = value,
                ConfigKey::AutoBackup => {
                    config.auto_backup = value.parse().with_context(|| {
                        format!("auto-backup expects true or false, got {value:?}")
                    })?
                }
                ConfigKey::BackupFolder => {
                    config.backup_folder = (!value.is_empty()).then(|| PathBuf::from(value))
                }
                ConfigKey::UpdateFreq => {
                    config.update_freq = value
                        .parse()
                        .with_context(|| format!("update-freq expects minutes, got {value:?}"))?
                }
            }
            service.save_config(config)?;
            println!("Saved");
            Ok(())
        }
    }
}

fn cmd_location(service: &HostsService, cmd: LocationCmd) -> Result<()> {
    match cmd {
        LocationCmd::Show => {
            println!("{}", service.data_location().display());
            Ok(())
        }
        LocationCmd::Set { path } => {
            let relocation = service.set_data_location(&path)?;
            if !relocation.moved {
                println!("Already using {}", relocation.to.display());
                return Ok(());
            }
            println!("Moved data to {}", relocation.to.display());
            match relocation.reprojection {
                Some(Ok(p)) => print_projection(&p),
                Some(Err(e)) => eprintln!("Warning: hosts file not updated: {e}"),
                None => {}
            }
            Ok(())
        }
    }
}
