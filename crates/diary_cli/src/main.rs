//! CLI entry point.
//!
//! # Responsibility
//! - Without arguments: print a deterministic probe of `diary_core` linkage.
//! - `diary_cli <db-path> [site.toml]`: print the RSS feed of a diary store.
//!
//! Set `DIARY_LOG_DIR` to an absolute directory to enable file logging.

use diary_core::db::open_db;
use diary_core::{
    default_log_level, init_logging, DiaryService, SiteConfig, SqliteContentRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "DIARY_LOG_DIR";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(db_path) = args.first() else {
        println!("diary_core ping={}", diary_core::ping());
        println!("diary_core version={}", diary_core::core_version());
        return ExitCode::SUCCESS;
    };

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match print_feed(db_path, args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_feed(db_path: &str, config_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    let size = config.feed.size;

    let conn = open_db(db_path)?;
    let repo = SqliteContentRepository::try_new(&conn)?;
    let service = DiaryService::new(repo, config);
    let xml = service.rss_feed(size)?;
    info!("event=cli_feed module=cli status=ok bytes={}", xml.len());
    println!("{xml}");
    Ok(())
}
