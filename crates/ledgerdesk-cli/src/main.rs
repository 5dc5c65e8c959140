// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::{BackendKind, Config};
use ledgerdesk_api::HttpAdapter;
use ledgerdesk_app::{AppState, EntityAdapter};
use ledgerdesk_db::Store;
use runtime::{HttpRuntime, SqliteRuntime};
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 0x1ed9_e5d5;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `ledgerdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let backend = if options.demo {
        BackendKind::Sqlite
    } else {
        config.backend_kind()
    };

    if options.print_db_path {
        match backend {
            BackendKind::Sqlite if options.demo => println!(":memory:"),
            BackendKind::Sqlite => println!("{}", config.db_path()?.display()),
            BackendKind::Http => println!("{}", config.base_url()?),
        }
        return Ok(());
    }

    logging::init(config.log_level(), &config.log_file()?)?;

    let mut state = AppState::new(config.user_id(), config.page_size());
    state.show_inactive = config.show_inactive();

    match backend {
        BackendKind::Sqlite => {
            let store = if options.demo {
                Store::open_memory()?
            } else {
                let db_path = config.db_path()?;
                Store::open(&db_path).with_context(|| {
                    format!(
                        "open database {} -- if this path is wrong, set [backend].db_path or LEDGERDESK_DB_PATH",
                        db_path.display()
                    )
                })?
            };
            store.bootstrap()?;
            if options.demo {
                let written = store.seed_demo_data(DEMO_SEED)?;
                tracing::info!(written, "demo data seeded");
            }
            if options.check_only {
                for counts in store.entity_counts()? {
                    println!(
                        "{:<16} {:>6} active {:>6} inactive",
                        counts.entity.as_str(),
                        counts.active,
                        counts.inactive
                    );
                }
                return Ok(());
            }

            let mut runtime = SqliteRuntime::new(&store);
            ledgerdesk_tui::run_app(&mut state, &mut runtime)
        }
        BackendKind::Http => {
            let client = HttpAdapter::new(config.base_url()?, state.active, config.timeout()?)
                .with_context(|| {
                    format!(
                        "invalid [backend] config in {}; fix base_url/timeout values",
                        options.config_path.display()
                    )
                })?
                .with_token(config.token());
            if options.check_only {
                let page = client.list(1, 1).context("check backend")?;
                println!("{} reachable ({} {})", client.base_url(), page.total, state.active.as_str());
                return Ok(());
            }

            let mut runtime = HttpRuntime::new(client);
            ledgerdesk_tui::run_app(&mut state, &mut runtime)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("ledgerdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path (or API base URL)");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Validate config and backend, then exit");
    println!("  --help                   Show this help");
}
