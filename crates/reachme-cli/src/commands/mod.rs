pub mod common;
pub mod config;
pub mod contact;
pub mod device;
pub mod emergency;
pub mod show;
pub mod status;
pub mod toggle;

pub use config::run_config;
pub use contact::run_contact;
pub use device::run_device_key;
pub use emergency::run_emergency;
pub use show::run_show;
pub use status::run_status;
pub use toggle::run_toggle;
