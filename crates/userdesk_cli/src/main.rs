//! CLI smoke entry point.
//!
//! Opens an in-memory slot database, runs one create/reload cycle and
//! prints the result, to check `userdesk_core` wiring end to end.

use std::process::ExitCode;
use userdesk_core::db::open_db_in_memory;
use userdesk_core::{Role, ServiceConfig, SqliteSlotStore, UserService};

fn main() -> ExitCode {
    println!("userdesk_core version={}", userdesk_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("userdesk_core db=error {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut service = UserService::open(SqliteSlotStore::new(&conn), ServiceConfig::default());
    if let Err(err) = service.create("Smoke", "smoke@localhost", Role::Guest) {
        eprintln!("userdesk_core create=error {err}");
        return ExitCode::FAILURE;
    }

    let reloaded = UserService::open(SqliteSlotStore::new(&conn), ServiceConfig::default());
    println!(
        "userdesk_core startup={:?} users={} next_id={}",
        reloaded.startup_state(),
        reloaded.store().len(),
        reloaded.store().next_id()
    );
    ExitCode::SUCCESS
}
