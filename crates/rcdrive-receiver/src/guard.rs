//! Process-wide exclusivity for GPIO chips

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::debug;

use crate::ReceiverError;

static CLAIMED_CHIPS: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// Exclusive claim on a GPIO chip for pulse capture.
///
/// Only one reader may own a chip at a time. The claim is released when
/// dropped, which every reader does after its capture has stopped.
#[derive(Debug)]
pub struct ReceiverClaim {
    chip: String,
}

impl ReceiverClaim {
    /// Claim `chip`.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::AlreadyActive`] if another reader holds it.
    pub fn acquire(chip: &str) -> Result<Self, ReceiverError> {
        let mut claimed = CLAIMED_CHIPS.lock();
        if !claimed.insert(chip.to_string()) {
            return Err(ReceiverError::AlreadyActive {
                chip: chip.to_string(),
            });
        }
        debug!("claimed GPIO chip {chip}");
        Ok(Self {
            chip: chip.to_string(),
        })
    }

    /// Whether some reader currently holds `chip`.
    pub fn is_claimed(chip: &str) -> bool {
        CLAIMED_CHIPS.lock().contains(chip)
    }

    /// The claimed chip.
    pub fn chip(&self) -> &str {
        &self.chip
    }
}

impl Drop for ReceiverClaim {
    fn drop(&mut self) {
        CLAIMED_CHIPS.lock().remove(&self.chip);
        debug!("released GPIO chip {}", self.chip);
    }
}
