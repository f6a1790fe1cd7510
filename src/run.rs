//! One inventory run, from connecting to the host to the merged inventory.

use chrono::Local;

use crate::context::{RunContext, RunRequest};
use crate::error::InventoryError;
use crate::inventory::Inventory;
use crate::model::StoreLocation;
use crate::probe::ArchitectureProbe;
use crate::registry::Connector;
use crate::scanner::{Extractor, ScanSummary, Scanner};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct InventoryRun {
    pub context: RunContext,
    pub inventory: Inventory,
    pub summary: ScanSummary,
}

/// Collects the software inventory described by `request`.
///
/// The output directory is validated first, then the registry is opened,
/// then the architecture is probed. Only those first two steps can fail;
/// everything after them degrades instead.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidOutputPath`] or
/// [`InventoryError::RegistryUnavailable`].
pub fn collect_inventory<C, P, F>(
    request: &RunRequest,
    connector: &C,
    probe: &P,
    extractor: Extractor,
    on_location: F,
) -> Result<InventoryRun, InventoryError>
where
    C: Connector,
    P: ArchitectureProbe + ?Sized,
    F: FnMut(StoreLocation),
{
    let started_at = Local::now();
    let output = request.output_mode()?;

    let registry = connector
        .connect(&request.host)
        .map_err(|source| InventoryError::RegistryUnavailable {
            host: request.host.clone(),
            source,
        })?;

    let context = RunContext {
        host: request.host.clone(),
        output,
        architecture: probe.probe(&request.host),
        started_at,
    };
    tracing::debug!(
        host = %context.host,
        architecture = %context.architecture,
        "run context resolved"
    );

    let mut inventory = Inventory::new();
    let summary =
        Scanner::new(&registry, extractor).scan(context.architecture, &mut inventory, on_location);

    Ok(InventoryRun {
        context,
        inventory,
        summary,
    })
}
