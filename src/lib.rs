use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use convert::{default_outfile, Conversion, ConversionSummary, ConvertError};
pub use grid::{DuplicatePolicy, Grid, GridBuilder, GridBuilderError};
pub use loader::{LoadError, Samples};
pub mod convert;
pub mod grid;
pub mod header;
pub mod loader;
pub mod ucsf;
