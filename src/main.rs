use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser as ClapParser;
use log::LevelFilter;

use vkpbr_bridge::logging::{init_logging, LoggingConfig};
use vkpbr_bridge::{native, BridgeConfig, EngineBinding, SystemLoader};

#[derive(ClapParser, Debug)]
#[command(
    name = "engine-probe",
    version,
    about = "Check that the native rendering engine module binds on this machine"
)]
struct Cli {
    /// Module name or path. Defaults to the name baked in at build time.
    #[arg(long, value_name = "NAME")]
    module: Option<String>,
    /// Directory to search before the system loader's own search path.
    #[arg(long = "search-dir", value_name = "DIR")]
    search_dirs: Vec<PathBuf>,
    /// Entry point the module must export (repeatable).
    #[arg(long = "require", value_name = "SYMBOL")]
    required_symbols: Vec<String>,
    /// Do not require the native-activity entry point.
    #[arg(long)]
    no_default_symbols: bool,
    /// Log every candidate tried.
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        if let Some(module) = self.module {
            config = config.with_engine_module(module);
        }
        if self.no_default_symbols {
            config = config.without_required_symbols();
        }
        for dir in self.search_dirs {
            config = config.with_search_dir(dir);
        }
        for symbol in self.required_symbols {
            config = config.with_required_symbol(symbol);
        }
        config.with_logging(LoggingConfig {
            level: if self.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            ..LoggingConfig::default()
        })
    }
}

fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config();
    init_logging(config.logging.clone());

    let info = vkpbr_bridge::build_info();
    println!("{} ({})", vkpbr_bridge::version(), native::host_triplet());
    println!("features: {}", info.features.join(", "));
    println!(
        "module: {} -> {}",
        config.engine_module,
        native::dynamic_lib_filename(&config.engine_module)
    );

    let binding = EngineBinding::from_config(SystemLoader, &config);

    let started = Instant::now();
    let handle = binding
        .ensure_loaded()
        .with_context(|| format!("binding `{}` failed", config.engine_module))?;
    println!(
        "bound from {} in {:?}",
        handle.location().display(),
        handle.bound_at().duration_since(started)
    );
    for symbol in &config.required_symbols {
        println!("exports {symbol}: OK");
    }

    binding.ensure_loaded()?;
    println!("load attempts after second call: {}", binding.load_attempts());
    Ok(())
}
