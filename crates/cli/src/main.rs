use anyhow::{Context, Result};
use citygml_xsd::citygml::{self, LoaderConfig, DEFAULT_TYPES_DUMP, ROOT_NAMESPACE, SCHEMA_BASE_URL};
use citygml_xsd::HttpSource;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "citygml-schema")]
#[command(about = "Load the CityGML XSD family and dump its compiled types", long_about = None)]
#[command(version)]
struct Cli {
    /// Schema version below `profiles/base/`
    #[arg(default_value = "3.0")]
    schema_version: String,

    /// Prefix the root schema path is appended to (http(s):// or file://)
    #[arg(long, env = "CITYGML_SCHEMA_BASE_URL", default_value = SCHEMA_BASE_URL)]
    base_url: String,

    /// Namespace the root schema is registered under
    #[arg(long, env = "CITYGML_ROOT_NAMESPACE", default_value = ROOT_NAMESPACE)]
    root_namespace: String,

    /// Where to write the list of type names
    #[arg(long, short, default_value = DEFAULT_TYPES_DUMP)]
    output: PathBuf,

    /// Also write a JSON snapshot of every compiled type
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = LoaderConfig {
        base_url: cli.base_url,
        root_namespace: cli.root_namespace,
        ..LoaderConfig::default()
    };

    let registry = citygml::load(&config, &cli.schema_version, HttpSource::new())
        .with_context(|| format!("failed to load CityGML {}", cli.schema_version))?;

    citygml::write_type_names(&registry, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!("Wrote type names to {}", cli.output.display());

    if let Some(path) = &cli.json {
        citygml::write_json(&registry, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote type snapshot to {}", path.display());
    }

    Ok(())
}
