//! Data-source layer: upstream clients and bundle assembly
//!
//! Each source is independent and optional. Transport or parse failures
//! downgrade to an absent source with a warning; the engine then fuses
//! whatever remains. Climatology is computed locally and is always present.

pub mod climatology;
pub mod power;
pub mod precip;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::models::{Location, ObservationBundle};
use crate::Result;

use power::PowerClient;

/// The set of upstream sources queried per request
pub struct SourceSet {
    power: PowerClient,
}

impl SourceSet {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            power: PowerClient::new(config)?,
        })
    }

    /// Assemble the observation bundle for one point and date.
    ///
    /// Never fails: an unreachable upstream leaves its slot empty and the
    /// estimate degrades to the remaining sources.
    pub async fn assemble(&self, location: Location, date: NaiveDate) -> ObservationBundle {
        let mut bundle = ObservationBundle::new(location, date);

        match self.power.fetch_daily(&location, date).await {
            Ok(Some(live)) => {
                if let Some(estimate) = precip::from_live(&live) {
                    bundle = bundle.with_precip(estimate);
                }
                bundle = bundle.with_live(live);
            }
            Ok(None) => {
                debug!("POWER had no data for {date}; continuing without the live source");
            }
            Err(error) => {
                warn!("{error}; {}", error.user_message());
            }
        }

        let bands =
            climatology::percentile_bands(location.latitude, location.longitude, date.ordinal());
        bundle = bundle.with_climatology(bands);

        debug!(sources = bundle.source_count(), "bundle assembled");
        bundle
    }
}
