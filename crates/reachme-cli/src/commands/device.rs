use std::path::Path;

use reachme_core::device::DeviceIdentity;

use crate::context::open_identity;
use crate::error::CliError;

pub fn run_device_key(storage_path: &Path, reset: bool) -> Result<(), CliError> {
    println!("{}", open_identity(storage_path, reset)?.device_key());
    Ok(())
}
