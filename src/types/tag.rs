use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Packet tags for the supported packet kinds.
/// Ref: <https://www.rfc-editor.org/rfc/rfc4880.html#section-4.3>
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Tag {
    /// Public-Key Encrypted Session Key Packet
    PublicKeyEncryptedSessionKey = 1,
    /// Signature Packet
    Signature = 2,
    /// One-Pass Signature Packet
    OnePassSignature = 4,
    /// Secret-Key Packet
    SecretKey = 5,
    /// Public-Key Packet
    PublicKey = 6,
    /// Compressed Data Packet
    CompressedData = 8,
    /// Symmetrically Encrypted Data Packet
    SymEncryptedData = 9,
    /// Literal Data Packet
    LiteralData = 11,
    /// User ID Packet
    UserId = 13,
}

/// The length of a packet body, as declared in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketLength {
    Fixed(u32),
    /// Partial body length, must be a power of two. Only the final
    /// chunk of a partial body carries a fixed length.
    Partial(u32),
    /// Old format headers can omit the length, the body then extends
    /// to the end of the stream.
    Indeterminate,
}
