//! Service catalog based on well-known port numbers.
//!
//! Maps a port number to the ordered list of services registered for it.
//! The catalog is loaded once from the bundled `data/ports.json` and is
//! read-only afterwards, so it can be shared across workers without locking.

use crate::error::{CatalogError, CatalogResult};
use crate::types::Port;
use serde::Deserialize;
use std::collections::HashMap;

/// Bundled well-known port dataset.
const BUNDLED_PORTS: &str = include_str!("../data/ports.json");

/// Placeholder written when a port has no catalog entry.
pub const NOT_SPECIFIED: &str = "Not specified";

/// One registered use of a port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDescriptor {
    pub description: String,
    #[serde(default)]
    pub tcp: bool,
    #[serde(default)]
    pub udp: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub port: String,
}

/// Immutable port-to-services lookup table.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    entries: HashMap<u16, Vec<ServiceDescriptor>>,
}

impl ServiceCatalog {
    /// Load the dataset compiled into the binary.
    pub fn bundled() -> CatalogResult<Self> {
        Self::from_json(BUNDLED_PORTS)
    }

    /// Parse a catalog from its JSON form: an object keyed by port number
    /// string, each value an ordered array of descriptors.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let raw: HashMap<String, Vec<ServiceDescriptor>> = serde_json::from_str(json)?;

        let entries = raw
            .into_iter()
            .map(|(key, descriptors)| {
                key.trim()
                    .parse::<u16>()
                    .map(|port| (port, descriptors))
                    .map_err(|_| CatalogError::InvalidPort(key))
            })
            .collect::<CatalogResult<HashMap<_, _>>>()?;

        Ok(Self { entries })
    }

    /// Look up the descriptors registered for a port.
    ///
    /// Returns an empty slice if the port is not in the catalog.
    pub fn lookup(&self, port: Port) -> &[ServiceDescriptor] {
        self.entries
            .get(&port.as_u16())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of ports with at least one entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the annotation lines written for an open port.
    ///
    /// One line per descriptor, or a single "Not specified" line when the
    /// catalog has nothing for the port. Never returns an empty list.
    pub fn annotate(&self, port: Port) -> Vec<String> {
        match self.lookup(port) {
            [] => vec![annotation_line(port, NOT_SPECIFIED)],
            descriptors => descriptors
                .iter()
                .map(|d| annotation_line(port, &d.description))
                .collect(),
        }
    }
}

fn annotation_line(port: Port, description: &str) -> String {
    format!("{:<9} | {}\n", port, description)
}
