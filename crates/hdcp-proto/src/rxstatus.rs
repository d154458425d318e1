//! RXSTATUS register word.

/// Decoded view of the two-byte RXSTATUS register.
///
/// Bits 9:0 carry the size of the message the receiver has staged for
/// reading; bit 11 is the receiver's re-authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxStatus(u16);

impl RxStatus {
    /// Mask of the pending-message size field.
    pub const AVAILABLE_BYTES_MASK: u16 = 0x03FF;
    /// Re-authentication request flag.
    pub const REAUTH_REQ_MASK: u16 = 0x0800;

    /// Wraps a raw register word.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Decodes the little-endian on-wire form.
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Raw register word.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Size in bytes of the message currently staged by the receiver,
    /// zero when nothing is pending.
    pub const fn available_bytes(self) -> usize {
        (self.0 & Self::AVAILABLE_BYTES_MASK) as usize
    }

    /// True when the receiver is asking for re-authentication.
    pub const fn reauth_requested(self) -> bool {
        self.0 & Self::REAUTH_REQ_MASK != 0
    }

    /// Builds a register word from its fields. Used by test doubles that
    /// model the receiver side.
    pub const fn compose(available_bytes: u16, reauth_requested: bool) -> Self {
        let mut raw = available_bytes & Self::AVAILABLE_BYTES_MASK;
        if reauth_requested {
            raw |= Self::REAUTH_REQ_MASK;
        }
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_field_is_masked_off_the_reauth_bit() {
        let status = RxStatus::from_le_bytes([0x16, 0x0A]);
        assert_eq!(status.available_bytes(), 0x216);
        assert!(status.reauth_requested());
    }

    #[test]
    fn compose_clamps_oversized_counts() {
        let status = RxStatus::compose(0x5FF, false);
        assert_eq!(status.available_bytes(), 0x1FF);
        assert!(!status.reauth_requested());
    }
}
