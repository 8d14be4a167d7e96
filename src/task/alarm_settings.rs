//! # Alarm Settings
//! This module persists the state of the alarm face in the flash memory.
//!
//! Every alarm slot, the pending alarm and the cursor are stored as separate key/value pairs, so a change to one
//! alarm only rewrites that alarm. Keys `0..16` are the slots, [`PENDING_KEY`] and [`CURSOR_KEY`] follow.
use crate::task::task_messages::{Events, send_event};
use core::ops::Range;
use defmt::{Debug2Format, info, warn};
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use pico_alarm_face::alarm::ALARM_COUNT;
use pico_alarm_face::snapshot::{PENDING_LEN, SLOT_LEN, Snapshot};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{Value, fetch_item, store_item};

/// Channel for flash write commands
static FLASH_CHANNEL: Channel<CriticalSectionRawMutex, Snapshot, 1> = Channel::new();

/// Sends a snapshot to be written to flash
pub async fn send_flash_write_command(snapshot: Snapshot) {
    FLASH_CHANNEL.sender().send(snapshot).await;
}

/// Waits for the next flash write command
async fn wait_for_flash_write_command() -> Snapshot {
    FLASH_CHANNEL.receiver().receive().await
}

/// The size of the flash memory in bytes.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Key of the pending alarm
const PENDING_KEY: u8 = 16;

/// Key of the cursor
const CURSOR_KEY: u8 = 17;

/// Value of a slot that was never written, it fails to decode and restores as an empty slot
const MISSING_SLOT: [u8; SLOT_LEN] = [0xFF; SLOT_LEN];

/// This struct persists the face state in the flash memory.
pub struct PersistedFace<'a> {
    /// The flash peripheral
    flash: Flash<'a, FLASH, Async, { FLASH_SIZE }>,
    /// The range of the flash memory used for the key/value pairs
    flash_range: Range<u32>,
    /// A buffer used for reading and writing data to the flash memory
    data_buffer: [u8; 128],
    /// What is known to be in flash, to skip unchanged values
    stored: Option<Snapshot>,
}

impl<'a> PersistedFace<'a> {
    /// Create a new `PersistedFace` on the given flash
    pub const fn new(flash: Flash<'a, FLASH, Async, { FLASH_SIZE }>) -> Self {
        Self {
            flash_range: 0x1F_9000..0x1FC_000,
            data_buffer: [0; 128],
            flash,
            stored: None,
        }
    }

    /// Read the snapshot from the flash memory. Returns None if not a single value was found.
    pub async fn read_snapshot(&mut self) -> Option<Snapshot> {
        let mut snapshot = Snapshot {
            slots: [MISSING_SLOT; ALARM_COUNT],
            pending: [0; PENDING_LEN],
            cursor: 0,
        };
        let mut has_any_value = false;

        for (key, slot) in (0..).zip(snapshot.slots.iter_mut()) {
            if let Some(value) = self.fetch::<[u8; SLOT_LEN]>(key).await {
                *slot = value;
                has_any_value = true;
            }
        }
        if let Some(value) = self.fetch::<[u8; PENDING_LEN]>(PENDING_KEY).await {
            snapshot.pending = value;
            has_any_value = true;
        }
        if let Some(value) = self.fetch::<u8>(CURSOR_KEY).await {
            snapshot.cursor = value;
            has_any_value = true;
        }

        if !has_any_value {
            warn!("No alarm face state found in flash");
            return None;
        }
        info!("Read alarm face state: {:?}", &snapshot);
        self.stored = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Write the snapshot to the flash memory, skipping values that are already stored
    pub async fn write_snapshot(&mut self, snapshot: Snapshot) {
        let stored = self.stored.take();

        for (key, slot) in (0..).zip(snapshot.slots.iter()) {
            let unchanged = stored
                .as_ref()
                .is_some_and(|stored| stored.slots.get(usize::from(key)) == Some(slot));
            if !unchanged {
                self.store(key, slot).await;
            }
        }
        if stored.as_ref().is_none_or(|stored| stored.pending != snapshot.pending) {
            self.store(PENDING_KEY, &snapshot.pending).await;
        }
        if stored.as_ref().is_none_or(|stored| stored.cursor != snapshot.cursor) {
            self.store(CURSOR_KEY, &snapshot.cursor).await;
        }

        self.stored = Some(snapshot);
    }

    /// Fetch one value
    async fn fetch<V>(&mut self, key: u8) -> Option<V>
    where
        V: for<'d> Value<'d>,
    {
        match fetch_item::<u8, V, _>(
            &mut self.flash,
            self.flash_range.clone(),
            &mut NoCache::new(),
            &mut self.data_buffer,
            &key,
        )
        .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to fetch value for key {:?}: {:?}", key, Debug2Format(&e));
                None
            }
        }
    }

    /// Store one value, logging failures
    async fn store<V>(&mut self, key: u8, value: &V)
    where
        V: for<'d> Value<'d>,
    {
        match store_item::<u8, V, _>(
            &mut self.flash,
            self.flash_range.clone(),
            &mut NoCache::new(),
            &mut self.data_buffer,
            &key,
            value,
        )
        .await
        {
            Ok(()) => info!("Key {:?} stored successfully", key),
            Err(e) => warn!("Failed to store key {:?}: {:?}", key, Debug2Format(&e)),
        }
    }
}

/// This task reads the face state from the flash memory on startup and sends it to the orchestrator.
/// After that, it waits for commands to write the state.
#[embassy_executor::task]
pub async fn alarm_settings_handler(flash: Flash<'static, FLASH, Async, { FLASH_SIZE }>) {
    let mut persisted_face = PersistedFace::new(flash);

    match persisted_face.read_snapshot().await {
        Some(snapshot) => send_event(Events::Restored(snapshot)).await,
        None => send_event(Events::FreshStart).await,
    }

    loop {
        let snapshot = wait_for_flash_write_command().await;
        persisted_face.write_snapshot(snapshot).await;
    }
}
