//! Serialization of fitted pipeline parameters.
//!
//! Fitted components (encoders, scaler, forest) never serialize themselves
//! directly. Each one exposes a plain-data `*Params` representation which is
//! turned into bytes here, so the on-disk shape does not depend on in-memory
//! lookup tables.

use std::error::Error;

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain data (e.g. `Vec<f64>`, `String`,
/// nested params structs), never caches derived from that data.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        mean: Vec<f64>,
        label: String,
    }

    #[test]
    fn test_blanket_impl_preserves_values() {
        let s = Sample {
            mean: vec![1.5, -2.25],
            label: "income".to_string(),
        };
        let bytes = s.to_bytes().unwrap();
        assert_eq!(Sample::from_bytes(&bytes).unwrap(), s);
    }

    #[test]
    fn test_from_bytes_rejects_truncated_input() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        assert!(Sample::from_bytes(bad_bytes).is_err());
    }
}
