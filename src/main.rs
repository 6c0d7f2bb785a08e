use clap::Parser;
#[cfg(feature = "completions")]
use clap::CommandFactory;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use harsift::cli::{Cli, Commands, SnapshotArgs, StoreCommands};
use harsift::commands::{
    run_domains, run_estimate, run_export, run_list, run_noise, run_quick, run_store_copy,
    run_store_save, run_store_show, DomainsOptions, EstimateOptions, ExportOptions, ListOptions,
    NoiseOptions, QuickOptions, SnapshotSource, StoreCopyOptions, StoreSaveOptions,
};
use harsift::config::{load_config, render_config, ResolvedConfig};
use harsift::error::Result;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HARSIFT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn snapshot_source(args: SnapshotArgs, config: &ResolvedConfig) -> SnapshotSource {
    SnapshotSource {
        filters: args.filters.or_else(|| config.filters.path.clone()),
        settings: args.settings.or_else(|| config.export.settings.clone()),
        use_store: args.use_store || config.export.use_store,
        store_dir: store_dir(args.store_dir, config),
    }
}

fn store_dir(flag: Option<PathBuf>, config: &ResolvedConfig) -> Option<PathBuf> {
    flag.or_else(|| config.store.dir_or_default())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = (|| -> Result<()> {
        let config = ResolvedConfig::from_config(&load_config()?);
        let save_delay = Duration::from_millis(config.store.debounce_ms);

        match cli.command {
            Commands::Export {
                input,
                format,
                output,
                compact,
                snapshot,
            } => {
                let options = ExportOptions {
                    format: format.unwrap_or(config.export.format),
                    output: output.or_else(|| config.export.output.clone()),
                    compact: compact || config.export.compact,
                    snapshot: snapshot_source(snapshot, &config),
                };
                run_export(&input, &options)
            }
            Commands::Estimate {
                input,
                json,
                snapshot,
            } => run_estimate(
                &input,
                &EstimateOptions {
                    json,
                    snapshot: snapshot_source(snapshot, &config),
                },
            ),
            Commands::List {
                input,
                all,
                json,
                snapshot,
            } => run_list(
                &input,
                &ListOptions {
                    all,
                    json,
                    snapshot: snapshot_source(snapshot, &config),
                },
            ),
            Commands::Domains { input, json } => run_domains(&input, &DomainsOptions { json }),
            Commands::Quick {
                input,
                preset,
                toggle,
                save,
                json,
                snapshot,
            } => run_quick(
                &input,
                &QuickOptions {
                    json,
                    preset,
                    toggle,
                    save,
                    save_delay,
                    snapshot: snapshot_source(snapshot, &config),
                },
            ),
            Commands::Noise {
                input,
                add,
                remove,
                enable,
                disable,
                save,
                json,
                snapshot,
            } => run_noise(&NoiseOptions {
                json,
                input,
                add,
                remove,
                enable,
                disable,
                save,
                save_delay,
                snapshot: snapshot_source(snapshot, &config),
            }),
            Commands::Store { command } => match command {
                StoreCommands::Show { input, store_dir: dir } => {
                    run_store_show(&input, store_dir(dir, &config).as_deref())
                }
                StoreCommands::Save {
                    input,
                    filters,
                    settings,
                    store_dir: dir,
                } => run_store_save(
                    &input,
                    &StoreSaveOptions {
                        filters,
                        settings,
                        store_dir: store_dir(dir, &config),
                    },
                ),
                StoreCommands::Copy {
                    source,
                    target,
                    merge,
                    noise,
                    export_settings,
                    store_dir: dir,
                } => run_store_copy(
                    &source,
                    &target,
                    &StoreCopyOptions {
                        merge,
                        noise,
                        export_settings,
                        store_dir: store_dir(dir, &config),
                    },
                ),
            },
            Commands::Config => {
                print!("{}", render_config(&config)?);
                Ok(())
            }
            #[cfg(feature = "completions")]
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(shell, &mut cmd, "harsift", &mut std::io::stdout());
                Ok(())
            }
        }
    })();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
