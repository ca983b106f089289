//! Systems module - the Hubbard model and its electron configurations.

mod econf;
mod hubbard;

pub use econf::{ElectronConfiguration, ElectronHop, SiteOccupation};
pub use hubbard::{HubbardModelVmc, HubbardParams};
