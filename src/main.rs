use clap::Parser;
use rdp_core::adapters::export::export_data_listing;
use rdp_core::utils::error::ErrorSeverity;
use rdp_core::utils::{logger, validation::Validate};
use rdp_core::{CliConfig, ProxyResolver, RdpError, RdpManifest, SystemClock};
use std::sync::Arc;

fn run(config: &CliConfig) -> Result<(), RdpError> {
    let manifest = RdpManifest::from_file(&config.manifest)?;
    manifest.validate()?;

    let factory = manifest.factory(Arc::new(SystemClock));
    let rdp = manifest.build(&factory)?;

    let summary = rdp.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if let Some(landing) = rdp.landing_page(&ProxyResolver::default()) {
        println!("landing page: {}", landing);
    }

    if let Some(tag) = &config.capability {
        match rdp.resolve_service_tag(tag)? {
            Some(service) => println!("{}", serde_json::to_string_pretty(service.as_ref())?),
            None => println!("no service offers {}", tag),
        }
    }

    if let Some(schema) = &config.schema {
        match rdp.metadata_for(schema) {
            Some(metadatum) => println!("{}", serde_json::to_string_pretty(metadatum.as_ref())?),
            None => println!("no metadata for schema '{}'", schema),
        }
    }

    if let Some(path) = &config.export_data {
        let rows = export_data_listing(rdp.data(), path)?;
        tracing::info!("Wrote {} data references to {}", rows, path.display());
    }

    Ok(())
}

fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate().and_then(|_| run(&config)) {
        tracing::error!(
            "Failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
