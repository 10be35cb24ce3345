//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notepad_core` linkage with a version probe.
//! - Stream one record's plain-text export to stdout when given
//!   `<db_path> <record_uri>`.

use notepad_core::{ContentUri, RecordStore, StoreConfig};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notepad_core version={}", notepad_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => ExitCode::SUCCESS,
        [db_path, uri] => match export(db_path, uri) {
            Ok(bytes) => {
                eprintln!("exported bytes={bytes}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("export failed: {err}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: notepad_cli [<db_path> <record_uri>]");
            ExitCode::from(2)
        }
    }
}

fn export(db_path: &str, uri: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let store = RecordStore::open(db_path, StoreConfig::default())?;
    let uri: ContentUri = uri.parse()?;
    let mut stream = store.open_export_stream(&uri, "text/*")?;
    Ok(io::copy(&mut stream, &mut io::stdout().lock())?)
}
