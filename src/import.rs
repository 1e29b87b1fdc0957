//! # Reconciliation Controller
//!
//! Decides how a document is imported into a destination directory and then
//! carries the decision out.
//!
//! | Destination | `replace` | `assume_yes` | Result |
//! |---|---|---|---|
//! | missing | any | any | create it, map fresh |
//! | leaf | any | any | `NotADirectory`, nothing written |
//! | directory | yes | any | prompt, then wipe, recreate and map fresh |
//! | directory | no | yes | merge without asking |
//! | directory | no | no | prompt, then merge |
//!
//! Replacing always asks, even with `assume_yes`, because it deletes data.
//! A "no" answer ends the import with [`ImportOutcome::Declined`] before the
//! store is touched.

use crate::classify::{classify, Classification};
use crate::confirm::ConfirmationGate;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::mapper::{MapMode, MapStats, TreeMapper};
use crate::path;
use crate::store::{DeleteOptions, KeyValueStore, SetOptions};
use log::{debug, info};
use std::fmt;

/// Flags that shape the reconciliation decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Delete the destination's contents before writing.
    pub replace: bool,
    /// Skip the confirmation for a merge into existing data.
    pub assume_yes: bool,
}

/// How the document is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Destination did not exist; create it and write everything.
    CreateFresh,
    /// Write into the existing destination, keeping unrelated keys.
    MergeInPlace,
    /// Delete the destination, recreate it and write everything.
    ReplaceDestructive,
}

impl Strategy {
    fn map_mode(self) -> MapMode {
        match self {
            Strategy::CreateFresh | Strategy::ReplaceDestructive => MapMode::CreateFresh,
            Strategy::MergeInPlace => MapMode::MergeInPlace,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::CreateFresh => "create",
            Strategy::MergeInPlace => "merge",
            Strategy::ReplaceDestructive => "replace",
        })
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub strategy: Strategy,
    /// Whether the operator has to confirm before anything is written.
    pub confirm: bool,
}

/// The reconciliation table.
///
/// Pure: looks only at the classification of `destination` and the flags.
pub fn decide(
    destination: &str,
    classification: Classification,
    options: ImportOptions,
) -> Result<Decision> {
    match classification {
        Classification::NotFound => Ok(Decision {
            strategy: Strategy::CreateFresh,
            confirm: false,
        }),
        Classification::ExistsAsLeaf => Err(Error::NotADirectory {
            path: destination.to_string(),
        }),
        Classification::ExistsAsDirectory if options.replace => Ok(Decision {
            strategy: Strategy::ReplaceDestructive,
            confirm: true,
        }),
        Classification::ExistsAsDirectory => Ok(Decision {
            strategy: Strategy::MergeInPlace,
            confirm: !options.assume_yes,
        }),
    }
}

/// The question asked before existing data is overwritten.
pub fn overwrite_prompt(destination: &str) -> String {
    format!("Do you want to overwrite data in directory: {}", destination)
}

/// A decided import, ready to run.
#[derive(Debug, Clone)]
pub struct ImportPlan<'a> {
    pub strategy: Strategy,
    pub destination: String,
    pub document: &'a Document,
}

impl ImportPlan<'_> {
    /// Write the document according to the plan.
    pub fn execute<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<ImportReport> {
        let destination = self.destination.as_str();
        match self.strategy {
            Strategy::CreateFresh => {
                debug!("creating destination {}", destination);
                store.set(destination, "", SetOptions { dir: true })?;
            }
            Strategy::ReplaceDestructive => {
                debug!("clearing destination {}", destination);
                store.delete(destination, DeleteOptions { recursive: true })?;
                store.set(destination, "", SetOptions { dir: true })?;
            }
            Strategy::MergeInPlace => {}
        }

        let stats = TreeMapper::new(store, self.strategy.map_mode()).map(self.document, destination)?;
        Ok(ImportReport {
            destination: self.destination.clone(),
            strategy: self.strategy,
            stats,
        })
    }
}

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub destination: String,
    pub strategy: Strategy,
    pub stats: MapStats,
}

/// Result of [`import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Completed(ImportReport),
    /// The operator answered "no"; the store was not modified.
    Declined,
}

/// Import `document` into the store directory `destination`.
///
/// The destination is classified once, the table above picks a strategy,
/// the gate is consulted when required, and the document is mapped. Store
/// failures abort immediately and leave any partial writes in place.
pub fn import<S, G>(
    store: &S,
    gate: &mut G,
    destination: &str,
    document: &Document,
    options: ImportOptions,
) -> Result<ImportOutcome>
where
    S: KeyValueStore + ?Sized,
    G: ConfirmationGate + ?Sized,
{
    if !document.is_container() {
        return Err(Error::InvalidDocument {
            message: "the document root must be a mapping or a sequence".to_string(),
        });
    }
    document.validate_keys()?;

    let destination = path::normalize(destination);
    let classification = classify(store, &destination)?;
    debug!("destination {} classified as {}", destination, classification);

    let decision = decide(&destination, classification, options)?;
    if decision.confirm && !gate.confirm(&overwrite_prompt(&destination))? {
        info!("import into {} declined", destination);
        return Ok(ImportOutcome::Declined);
    }

    info!("importing into {} ({})", destination, decision.strategy);
    let plan = ImportPlan {
        strategy: decision.strategy,
        destination,
        document,
    };
    plan.execute(store).map(ImportOutcome::Completed)
}
