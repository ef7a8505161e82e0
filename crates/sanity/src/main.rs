#[cfg(feature = "native")]
use clap::Parser;
#[cfg(feature = "native")]
use sanity::cli::{Cli, Runner};
#[cfg(feature = "native")]
use sanity::platform::NativeStorage;
#[cfg(feature = "native")]
use sanity::{SessionStore, init_logging};

#[cfg(feature = "native")]
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(NativeStorage::default_path);

    init_logging(&data_dir, &cli.log_level)?;
    tracing::debug!(command = ?cli.command, "Running command");

    let runner = Runner::new(SessionStore::new(NativeStorage::new(data_dir)), cli.json);
    let output = runner.run(&cli.command)?;
    print!("{output}");

    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    // Web entry point is handled via wasm_bindgen in lib.rs
    // This main() exists only to satisfy the binary target requirement
    panic!(
        "This binary requires the 'native' feature. For web, use trunk to build the WASM target."
    );
}
