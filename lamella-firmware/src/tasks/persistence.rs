//! Persistence task
//!
//! Serializes flash writes so the command path never waits on an erase.

use defmt::*;

use lamella_drivers::storage::SettingsStore;
use lamella_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::{PersistRequest, PERSIST};

/// Persistence task - applies queued writes in order
#[embassy_executor::task]
pub async fn persistence_task(mut store: SettingsStore<Rp2040FlashStorage<'static>>) {
    info!("Persistence task started");

    loop {
        match PERSIST.receive().await {
            PersistRequest::Position(position) => match store.save_position(position).await {
                Ok(()) => debug!("Saved position {}", position),
                Err(e) => warn!("Failed to save position {}: {:?}", position, e),
            },
            PersistRequest::Setting(key, config) => match store.save(key, &config).await {
                Ok(()) => info!("Saved {}", key.as_str()),
                Err(e) => warn!("Failed to save {}: {:?}", key.as_str(), e),
            },
        }
    }
}
