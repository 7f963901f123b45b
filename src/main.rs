use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use mdm_authz::authz::{permissions_for_module, use_permissions, Module, PermissionProvider};
use mdm_authz::config::Config;
use mdm_authz::session::SessionCodec;
use mdm_authz::{PlantId, UserAuthProfile};

#[derive(Parser, Debug)]
#[command(author, version, about = "master-data console authorization probe", long_about = None)]
struct Cli {
    /// Session payload JSON file (falls back to AUTHZ_PROFILE)
    #[arg(long, global = true)]
    profile: Option<PathBuf>,
    /// Signed session token; verified with SESSION_SECRET
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a single permission
    Check {
        permission: String,
        #[arg(long)]
        resource: Option<PlantId>,
    },
    /// Allow if any of the permissions is granted
    Any {
        #[arg(required = true)]
        permissions: Vec<String>,
        #[arg(long)]
        resource: Option<PlantId>,
    },
    /// Allow only if every permission is granted
    All {
        #[arg(required = true)]
        permissions: Vec<String>,
        #[arg(long)]
        resource: Option<PlantId>,
    },
    /// Coarse plant visibility check
    Access { resource: PlantId },
    /// Filter a JSON array of records down to what the profile may see
    Filter {
        #[arg(long)]
        records: PathBuf,
        #[arg(long, required_unless_present = "coarse")]
        module: Option<String>,
        /// Use the plant visibility gate instead of module grants
        #[arg(long)]
        coarse: bool,
    },
    /// List catalog permissions
    Catalog {
        #[arg(long)]
        module: Option<String>,
    },
    /// Show derived flags and plant sets of the profile
    Inspect,
    /// Sign the profile into a session token
    Mint,
}

fn main() -> anyhow::Result<ExitCode> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    // The catalog listing needs no profile.
    let profile = match &cli.command {
        Commands::Catalog { .. } => None,
        _ => load_profile(&cli, &config)?.map(Arc::new),
    };

    let provider = PermissionProvider::new(profile);
    provider.scope(|| run(cli.command))
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let perms = use_permissions()?;

    let allowed = match command {
        Commands::Check { permission, resource } => perms.has_permission(&permission, resource),
        Commands::Any { permissions, resource } => {
            perms.has_any_permission(&as_strs(&permissions), resource)
        }
        Commands::All { permissions, resource } => {
            perms.has_all_permissions(&as_strs(&permissions), resource)
        }
        Commands::Access { resource } => perms.can_access_resource(resource),
        Commands::Filter { records, module, coarse } => {
            let records = read_records(&records)?;
            let visible = match module {
                Some(module) if !coarse => perms.filter_by_module_and_resource(records, &module),
                _ => perms.filter_by_resource_access(records),
            };
            println!("{}", serde_json::to_string_pretty(&visible)?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Inspect => {
            let summary = json!({
                "userId": perms.profile().and_then(|p| p.user_id),
                "fingerprint": perms.profile().map(UserAuthProfile::fingerprint),
                "isSuperAdmin": perms.is_super_admin,
                "isApprover": perms.is_approver,
                "isITBin": perms.is_it_bin,
                "permittedPlantIds": perms.permitted_plant_ids,
                "itPlantIds": perms.it_plant_ids,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Catalog { module } => {
            print_catalog(module.as_deref())?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Mint => {
            let profile = perms
                .profile()
                .context("mint needs --profile, --token or AUTHZ_PROFILE")?;
            let codec = SessionCodec::from_env()?;
            println!("{}", codec.encode(profile)?);
            return Ok(ExitCode::SUCCESS);
        }
    };

    println!("{}", if allowed { "allow" } else { "deny" });
    Ok(if allowed { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn load_profile(cli: &Cli, config: &Config) -> anyhow::Result<Option<UserAuthProfile>> {
    if cli.profile.is_some() && cli.token.is_some() {
        anyhow::bail!("--profile and --token are mutually exclusive");
    }

    if let Some(token) = &cli.token {
        let codec = SessionCodec::from_env()?;
        return codec.decode(token).map(Some).context("failed to verify session token");
    }

    let Some(path) = cli.profile.as_ref().or(config.default_profile.as_ref()) else {
        tracing::warn!("no profile supplied, evaluating as anonymous");
        return Ok(None);
    };

    let payload = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile at {}", path.display()))?;
    let profile = UserAuthProfile::from_json(&payload)
        .with_context(|| format!("failed to parse profile at {}", path.display()))?;
    Ok(Some(profile))
}

fn read_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array", path.display()))
}

fn print_catalog(module: Option<&str>) -> anyhow::Result<()> {
    match module {
        Some(module) => {
            for permission in permissions_for_module(module)? {
                println!("{permission}");
            }
        }
        None => {
            for module in Module::ALL {
                for permission in module.permissions() {
                    println!("{:<20} {}", module.key(), permission);
                }
            }
        }
    }
    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
