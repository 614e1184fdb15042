//! Wire formats (spec.md §6): the 65-byte UDP broadcast frame and the TCP
//! upload framing's type tag.

use crate::error::WireError;

/// Exactly 65 bytes, little-endian: `{ idx: u8, share: [u8;32], hash: [u8;32] }`.
pub const BROADCAST_PACKET_LEN: usize = 1 + 32 + 32;

/// One share of an [`crate::ephid::EphId`], on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPacket {
    /// 1-based share index, in `1..=N`.
    pub idx: u8,
    /// The share payload (32 bytes for this protocol's block-wise split of a
    /// 32-byte EphID into two 16-byte Shamir blocks).
    pub share: [u8; 32],
    /// Digest of the EphID this share belongs to.
    pub hash: [u8; 32],
}

impl BroadcastPacket {
    /// Encodes into the fixed 65-byte little-endian wire frame.
    pub fn encode(&self) -> [u8; BROADCAST_PACKET_LEN] {
        let mut buf = [0u8; BROADCAST_PACKET_LEN];
        buf[0] = self.idx;
        buf[1..33].copy_from_slice(&self.share);
        buf[33..65].copy_from_slice(&self.hash);
        buf
    }

    /// Decodes a frame previously produced by [`Self::encode`].
    ///
    /// # Errors
    /// Returns [`WireError::ShortFrame`] if `bytes` isn't exactly
    /// [`BROADCAST_PACKET_LEN`] bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() != BROADCAST_PACKET_LEN {
            return Err(WireError::ShortFrame {
                expected: BROADCAST_PACKET_LEN,
                got: bytes.len(),
            });
        }
        let mut share = [0u8; 32];
        let mut hash = [0u8; 32];
        share.copy_from_slice(&bytes[1..33]);
        hash.copy_from_slice(&bytes[33..65]);
        Ok(Self {
            idx: bytes[0],
            share,
            hash,
        })
    }
}

/// The type tag prefixing a TCP filter upload (spec.md §4.8/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A diagnosed node's combined filter, merged into the backend's
    /// standing filter.
    Cbf,
    /// A query: has this combined filter intersected a diagnosed contact?
    Qbf,
}

impl UploadKind {
    /// The exact 3 ASCII bytes sent on the wire for this tag.
    pub const fn as_tag(self) -> &'static [u8; 3] {
        match self {
            UploadKind::Cbf => b"CBF",
            UploadKind::Qbf => b"QBF",
        }
    }

    /// Parses the 3-byte tag read off the wire.
    ///
    /// # Errors
    /// Returns [`WireError::BadTypeTag`] for anything other than `"CBF"` or
    /// `"QBF"`.
    pub fn from_tag(tag: &[u8; 3]) -> Result<Self, WireError> {
        match tag {
            b"CBF" => Ok(UploadKind::Cbf),
            b"QBF" => Ok(UploadKind::Qbf),
            _ => Err(WireError::BadTypeTag(*tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_packet_round_trips() {
        let packet = BroadcastPacket {
            idx: 3,
            share: [7u8; 32],
            hash: [9u8; 32],
        };
        let encoded = packet.encode();
        assert_eq!(encoded.len(), BROADCAST_PACKET_LEN);
        let decoded = BroadcastPacket::decode(&encoded).expect("decodes");
        assert_eq!(packet, decoded);
    }

    #[test]
    fn broadcast_packet_rejects_short_frame() {
        let err = BroadcastPacket::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, WireError::ShortFrame { expected: 65, got: 10 }));
    }

    #[test]
    fn upload_kind_round_trips() {
        assert_eq!(UploadKind::from_tag(b"CBF").unwrap(), UploadKind::Cbf);
        assert_eq!(UploadKind::from_tag(b"QBF").unwrap(), UploadKind::Qbf);
        assert!(UploadKind::from_tag(b"XYZ").is_err());
    }
}
