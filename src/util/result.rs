//! Standard error and result types for the library.
use base64::DecodeError as FromBase64Error;
use hex::FromHexError;
use secp256k1::Error as Secp256k1Error;
use std::io;

/// Standard error type used in the library
#[derive(Debug)]
pub enum Error {
    /// An argument provided is invalid
    BadArgument(String),
    /// The data given is not valid
    BadData(String),
    /// A signature, key or message is not encoded as required
    BadEncoding(String),
    /// Base64 string could not be decoded
    FromBase64Error(FromBase64Error),
    /// Hex string could not be decoded
    FromHexError(FromHexError),
    /// Standard library IO error
    IOError(io::Error),
    /// An index, recovery id or scalar lies outside its allowed range
    OutOfRange(String),
    /// No recovery id reconstructs a usable public key
    RecoveryFailed(String),
    /// Error in the Secp256k1 library
    Secp256k1Error(Secp256k1Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadArgument(s) => write!(f, "Bad argument: {}", s),
            Error::BadData(s) => write!(f, "Bad data: {}", s),
            Error::BadEncoding(s) => write!(f, "Bad encoding: {}", s),
            Error::FromBase64Error(e) => write!(f, "Base64 decoding error: {}", e),
            Error::FromHexError(e) => write!(f, "Hex decoding error: {}", e),
            Error::IOError(e) => write!(f, "IO error: {}", e),
            Error::OutOfRange(s) => write!(f, "Out of range: {}", s),
            Error::RecoveryFailed(s) => write!(f, "Could not recover public key: {}", s),
            Error::Secp256k1Error(e) => write!(f, "Secp256k1 error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FromBase64Error(e) => Some(e),
            Error::FromHexError(e) => Some(e),
            Error::IOError(e) => Some(e),
            Error::Secp256k1Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FromBase64Error> for Error {
    fn from(e: FromBase64Error) -> Self {
        Error::FromBase64Error(e)
    }
}

impl From<FromHexError> for Error {
    fn from(e: FromHexError) -> Self {
        Error::FromHexError(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IOError(e)
    }
}

impl From<Secp256k1Error> for Error {
    fn from(e: Secp256k1Error) -> Self {
        Error::Secp256k1Error(e)
    }
}

/// Standard Result used in the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        assert_eq!(
            Error::OutOfRange("recovery id 4".to_string()).to_string(),
            "Out of range: recovery id 4"
        );
        assert_eq!(
            Error::RecoveryFailed("no matching key".to_string()).to_string(),
            "Could not recover public key: no matching key"
        );
    }

    #[test]
    fn source() {
        use std::error::Error as _;
        let e: Error = hex::decode("zz").unwrap_err().into();
        assert!(e.source().is_some());
        assert!(Error::BadEncoding("der".to_string()).source().is_none());
    }
}
