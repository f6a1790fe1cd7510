pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod inventory;
pub mod model;
pub mod output;
pub mod platform;
pub mod probe;
pub mod registry;
pub mod run;
pub mod scanner;

pub use config::Config;
pub use context::{OutputMode, RunContext, RunRequest};
pub use error::{InventoryError, RegistryError};
pub use inventory::{IngestOutcome, Inventory};
pub use model::{Architecture, SoftwareRecord, StoreLocation, NOT_AVAILABLE};
pub use run::{collect_inventory, InventoryRun};
pub use scanner::{Extractor, Scanner};
