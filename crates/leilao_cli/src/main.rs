//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open an auction store (file path argument, or in-memory) and print the
//!   derived auction counts.
//! - Never modify data: the session is always rolled back.
//! - When `LEILAO_LOG_DIR` is set, write core logs there.

use leilao_core::{
    init_logging, open_db, open_db_in_memory, AuctionRepository, LoggingConfig, RepoError,
    Session,
};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "LEILAO_LOG_DIR";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let started = LoggingConfig::with_default_level(&log_dir)
            .and_then(|config| init_logging(&config));
        if let Err(err) = started {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), RepoError> {
    println!("leilao_core version={}", leilao_core::core_version());

    let mut conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let session = Session::begin(&mut conn)?;
    let auctions = AuctionRepository::new(&session);

    println!("active={}", auctions.count_active()?);
    println!("unused={}", auctions.list_unused()?.len());
    println!("stale={}", auctions.list_stale()?.len());

    session.rollback()?;
    Ok(())
}
