//! On-disk artifact format for a trained pipeline.
//!
//! # Format Structure
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Magic "LOANELIG" (8 bytes)              │
//! ├─────────────────────────────────────────┤
//! │ Format version (u16, little endian)     │
//! ├─────────────────────────────────────────┤
//! │ Payload length (u32, little endian)     │
//! ├─────────────────────────────────────────┤
//! │ Payload (bincode ArtifactPayload)       │
//! ├─────────────────────────────────────────┤
//! │ SHA-256 of all preceding bytes          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The payload carries forest, fit state and label encoder together; there is
//! no way to load one without the others. Saving writes a uniquely named
//! sibling temporary file and renames it over the target, so readers see
//! either the previous artifact or a complete new one, even when several
//! saves to the same path race.

use crate::error::{EligibilityError, Result};
use crate::evaluation::EvaluationReport;
use crate::model::ForestParams;
use crate::preprocessing::{FitStateParams, LabelEncoderParams};
use crate::serialization::SerializableParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// File magic.
pub const MAGIC: [u8; 8] = *b"LOANELIG";

/// Current format version. Bumped whenever the payload layout changes.
pub const FORMAT_VERSION: u16 = 1;

/// Magic + version + payload length.
pub const HEADER_SIZE: usize = 8 + 2 + 4;

/// SHA-256 digest size.
pub const CHECKSUM_SIZE: usize = 32;

/// Default artifact location used by the command line.
pub const DEFAULT_ARTIFACT_PATH: &str = "loan_eligibility_model.bin";

/// Provenance of a trained pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of this crate that wrote the artifact.
    pub crate_version: String,
    pub seed: u64,
    pub corpus_size: usize,
    pub created_at: DateTime<Utc>,
    pub evaluation: Option<EvaluationReport>,
}

impl ArtifactMetadata {
    pub fn new(seed: u64, corpus_size: usize, evaluation: Option<EvaluationReport>) -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            seed,
            corpus_size,
            created_at: Utc::now(),
            evaluation,
        }
    }
}

/// Everything persisted in one artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPayload {
    pub forest: ForestParams,
    pub fit_state: FitStateParams,
    pub label_encoder: LabelEncoderParams,
    pub metadata: ArtifactMetadata,
}

fn load_err(path: &Path, msg: impl std::fmt::Display) -> EligibilityError {
    EligibilityError::ArtifactLoad(format!("{}: {}", path.display(), msg))
}

fn save_err(path: &Path, msg: impl std::fmt::Display) -> EligibilityError {
    EligibilityError::ArtifactSave(format!("{}: {}", path.display(), msg))
}

/// Frame `payload` with header and checksum.
pub fn encode(payload: &ArtifactPayload) -> Result<Vec<u8>> {
    let body = payload
        .to_bytes()
        .map_err(|e| EligibilityError::ArtifactSave(format!("Failed to serialize payload: {}", e)))?;
    let len = u32::try_from(body.len()).map_err(|_| {
        EligibilityError::ArtifactSave(format!("payload of {} bytes is too large", body.len()))
    })?;

    let mut content = Vec::with_capacity(HEADER_SIZE + body.len() + CHECKSUM_SIZE);
    content.extend_from_slice(&MAGIC);
    content.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    content.extend_from_slice(&len.to_le_bytes());
    content.extend_from_slice(&body);
    let digest = Sha256::digest(&content);
    content.extend_from_slice(&digest);
    Ok(content)
}

/// Validate framing and checksum; returns the payload bytes.
fn verify(bytes: &[u8]) -> std::result::Result<&[u8], String> {
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(format!("file too small: {} bytes", bytes.len()));
    }
    if bytes[..8] != MAGIC {
        return Err("not a loan eligibility artifact (bad magic)".to_string());
    }
    let version = u16::from_le_bytes([bytes[8], bytes[9]]);
    if version != FORMAT_VERSION {
        return Err(format!(
            "format version {} is not supported (expected {})",
            version, FORMAT_VERSION
        ));
    }
    let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);
    let body_end = HEADER_SIZE + payload_len as usize;
    if body_end + CHECKSUM_SIZE != bytes.len() {
        return Err(format!(
            "payload length {} does not match file size {}",
            payload_len,
            bytes.len()
        ));
    }
    let digest = Sha256::digest(&bytes[..body_end]);
    if digest.as_slice() != &bytes[body_end..] {
        return Err("checksum mismatch".to_string());
    }
    Ok(&bytes[HEADER_SIZE..body_end])
}

/// Parse a complete artifact image.
pub fn decode(bytes: &[u8]) -> std::result::Result<ArtifactPayload, String> {
    let body = verify(bytes)?;
    ArtifactPayload::from_bytes(body).map_err(|e| format!("undecodable payload: {}", e))
}

/// Write `payload` to `path` atomically.
///
/// # Errors
/// [`EligibilityError::ArtifactSave`]; on failure `path` is left untouched.
pub fn save<P: AsRef<Path>>(path: P, payload: &ArtifactPayload) -> Result<()> {
    let path = path.as_ref();
    let content = encode(payload)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if path.file_name().is_none() {
        return Err(save_err(path, "path has no file name"));
    }
    fs::create_dir_all(&dir).map_err(|e| save_err(path, e))?;

    // Uniquely named per call; dropped (and removed) on any error below.
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| save_err(path, e))?;
    tmp.write_all(&content).map_err(|e| save_err(path, e))?;
    tmp.as_file().sync_all().map_err(|e| save_err(path, e))?;
    tmp.persist(path).map_err(|e| save_err(path, e.error))?;

    info!(
        path = %path.display(),
        version = FORMAT_VERSION,
        bytes = content.len(),
        "Artifact saved"
    );
    Ok(())
}

/// Read and fully verify an artifact.
///
/// # Errors
/// [`EligibilityError::ArtifactLoad`] if the file is missing, truncated,
/// corrupt, from another format version or not decodable.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ArtifactPayload> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| load_err(path, e))?;
    let payload = decode(&bytes).map_err(|e| load_err(path, e))?;
    debug!(
        path = %path.display(),
        created_at = %payload.metadata.created_at,
        "Artifact decoded"
    );
    Ok(payload)
}
