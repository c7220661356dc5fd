use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("key generation failed"))]
    KeyGeneration { source: rsa::Error },
    #[snafu(display("malformed key: {message}"))]
    MalformedKey { message: String },
    #[snafu(display("wrong passphrase"))]
    WrongPassphrase,
    #[snafu(display("truncated stream: needed {needed} more bytes, {remaining} remaining"))]
    TruncatedStream { needed: usize, remaining: usize },
    #[snafu(display("unknown packet kind: tag {tag}"))]
    UnknownPacketKind { tag: u8 },
    #[snafu(display("refusing to encrypt to an empty recipient set"))]
    NoRecipients,
    #[snafu(display("no session key packet matches the given secret key"))]
    NoMatchingRecipient,
    #[snafu(display("failed to unlock the signing key"))]
    KeyUnlock { source: Box<Error> },
    #[snafu(display("signature computation failed"))]
    SignatureComputation { source: rsa::Error },
    #[snafu(display("no public key in the keyring for signer {key_id}"))]
    UnknownSigner { key_id: String },
    #[snafu(display("invalid armor wrappers"))]
    InvalidArmorWrappers,
    #[snafu(display("invalid crc24 checksum"))]
    InvalidChecksum,
    #[snafu(display("cfb: invalid key iv length"))]
    CfbInvalidKeyIvLength,
    #[snafu(transparent)]
    Base64Decode { source: base64::DecodeError },
    #[snafu(transparent)]
    IO {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(transparent)]
    RSAError { source: rsa::Error },
    #[snafu(transparent)]
    Utf8Error { source: std::str::Utf8Error },
    #[snafu(display("{message}"))]
    Message { message: String },
}

impl From<cipher::InvalidLength> for Error {
    fn from(_: cipher::InvalidLength) -> Error {
        Error::CfbInvalidKeyIvLength
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::Message { message: err }
    }
}

macro_rules! format_err {
    ($($arg:tt)+) => {
        $crate::errors::Error::Message { message: format!($($arg)+) }
    };
}

macro_rules! bail {
    ($($arg:tt)+) => {
        return Err($crate::errors::format_err!($($arg)+))
    };
}

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::errors::bail!($($arg)+);
        }
    };
}

macro_rules! ensure_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if left_val != right_val {
                    $crate::errors::bail!($($arg)+);
                }
            }
        }
    };
}

pub(crate) use {bail, ensure, ensure_eq, format_err};
