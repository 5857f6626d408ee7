//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Storage keys for persisted data
///
/// One key per configuration field plus the last known blinds position.
/// Values are stored independently so a corrupted record only resets
/// its own field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Rotation count at the last stop (-1 = unknown)
    BlindsPosition = 0,
    StateInterval = 1,
    LuxInterval = 2,
    TempInterval = 3,
    OpenDuration = 4,
    MaxRunDuration = 5,
    MaxOpenRotations = 6,
    RotationLimits = 7,
    ClosedRotationOffset = 8,
    DebounceDurSwitches = 9,
    DebounceDurMotor = 10,
    MinLuxReportDelta = 11,
    MaxCurrentLimit = 12,
    AllowRemoteControl = 13,
    AllowRemoteBleep = 14,
    WiFiSetup = 15,
}

impl StorageKey {
    /// Every key, in byte order
    pub const ALL: [StorageKey; 16] = [
        StorageKey::BlindsPosition,
        StorageKey::StateInterval,
        StorageKey::LuxInterval,
        StorageKey::TempInterval,
        StorageKey::OpenDuration,
        StorageKey::MaxRunDuration,
        StorageKey::MaxOpenRotations,
        StorageKey::RotationLimits,
        StorageKey::ClosedRotationOffset,
        StorageKey::DebounceDurSwitches,
        StorageKey::DebounceDurMotor,
        StorageKey::MinLuxReportDelta,
        StorageKey::MaxCurrentLimit,
        StorageKey::AllowRemoteControl,
        StorageKey::AllowRemoteBleep,
        StorageKey::WiFiSetup,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Flash storage trait
///
/// Wear-leveled key-value storage for settings and the blinds position.
/// A failed write must leave the previous value readable.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read, or [`FlashError::NotFound`] if the
    /// key was never written.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
