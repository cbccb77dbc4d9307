mod browser;
mod cli;
mod context;
mod dataset;
mod db;
mod error;
mod export;
mod filter;
mod fmt;
mod kpi;
mod loader;
mod models;
mod pager;
mod settings;
mod store;
mod tui;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands};
use context::Context;

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    let cli = Cli::parse();
    let ctx = Context::load().with_dataset(cli.dataset.as_deref().map(PathBuf::from));

    let result = match cli.command {
        None | Some(Commands::Status) => cli::status::run(&ctx),
        Some(Commands::Init { data_dir }) => cli::init::run(&ctx, data_dir),
        Some(Commands::Load { path }) => cli::load::run(&ctx, &path),
        Some(Commands::Demo) => cli::demo::run(&ctx),
        Some(Commands::Import { file }) => cli::import::run(&ctx, &file),
        Some(Commands::Dashboard { month }) => cli::dashboard::run(&ctx, month),
        Some(Commands::Projects {
            search,
            status,
            organisation,
            country,
            year,
            paging,
        }) => cli::projects::run(
            &ctx,
            cli::projects::ProjectsQuery {
                search,
                status,
                organisation,
                country,
                year,
            },
            &paging,
        ),
        Some(Commands::Project { id, budget }) => cli::project::run(&ctx, &id, budget),
        Some(Commands::Expenses {
            project,
            search,
            category,
            period,
            sort,
            paging,
        }) => cli::expenses::run(
            &ctx,
            &project,
            cli::expenses::ExpensesQuery {
                search,
                category,
                period,
                sort,
            },
            &paging,
        ),
        Some(Commands::Recent {
            search,
            kind,
            status,
            period,
            paging,
        }) => cli::recent::run(
            &ctx,
            cli::recent::RecentQuery {
                search,
                kind,
                status,
                period,
            },
            &paging,
        ),
        Some(Commands::Beneficiaries {
            project,
            search,
            kind,
            period,
            paging,
            export,
            session,
            output,
        }) => cli::beneficiaries::run(
            &ctx,
            &project,
            cli::beneficiaries::BeneficiariesQuery { search, kind, period },
            &paging,
            cli::beneficiaries::ExportArgs {
                export,
                session,
                output,
            },
        ),
        Some(Commands::Browse) => cli::browse::run(&ctx),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
