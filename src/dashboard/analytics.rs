//! Donations Analytics: read-only summary over every donation on record.

use crate::models::{Donation, DonationStats};
use crate::store::{DonationStore, StoreError};

#[derive(Debug, Clone)]
pub struct DonationReport {
    pub donations: Vec<Donation>,
    pub stats: DonationStats,
}

impl DonationReport {
    pub fn empty() -> Self {
        Self { donations: Vec::new(), stats: DonationStats::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.donations.is_empty()
    }
}

pub async fn load(store: &dyn DonationStore) -> Result<DonationReport, StoreError> {
    let donations = store.list_by_date_desc().await?;
    let stats = DonationStats::from_donations(&donations);
    log::debug!("Loaded {} donations, total {}", stats.count, stats.total);
    Ok(DonationReport { donations, stats })
}
