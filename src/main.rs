mod config;
mod export;
mod logging;
mod models;
mod report;
mod run;
mod storage;
mod store;
mod util;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    logging::init(&config.log_filter)?;

    let data_dir = config.ensure_data_dir()?;
    tracing::info!(data_dir = %data_dir.display(), "starting fintrack");

    let storage = storage::SqliteStorage::open(&config.db_path())?;
    let mut data = store::FinanceData::load(storage);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run::as_cli(&args, &mut data, &mut out)
}
