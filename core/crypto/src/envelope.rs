//! The `opdata01` authenticated envelope.
//!
//! Two shapes share one layout and differ by a 16-byte header:
//!
//! ```text
//! Opdata01: "opdata01" | length (u64 LE) | IV (16) | ciphertext | HMAC-SHA256 (32)
//! Bare:                                    IV (16) | ciphertext | HMAC-SHA256 (32)
//! ```
//!
//! The tag covers every byte before it. The ciphertext is AES-256-CBC with
//! no padding scheme; the encryptor instead prepends random bytes to reach
//! a block boundary, so the plaintext is the trailing `length` bytes of the
//! decrypted buffer. The length is always read from bytes `8..16`, which
//! for bare envelopes falls inside the IV.

use aes::Aes256;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::keys::KeyPair;
use keysafe_common::{Error, Result, SensitiveBytes};

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Magic bytes at the start of a header-bearing envelope.
pub const MAGIC: &[u8; 8] = b"opdata01";

/// Size of the magic plus the length field.
pub const HEADER_SIZE: usize = 16;

/// AES-CBC initialization vector size.
pub const IV_SIZE: usize = 16;

/// HMAC-SHA256 tag size.
pub const TAG_SIZE: usize = 32;

/// AES block size.
pub const BLOCK_SIZE: usize = 16;

const LENGTH_OFFSET: usize = 8;

/// Which envelope shape to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFormat {
    /// Magic header and explicit length field before the IV.
    Opdata01,
    /// IV first, no magic.
    Bare,
}

impl EnvelopeFormat {
    fn iv_offset(self) -> usize {
        match self {
            EnvelopeFormat::Opdata01 => HEADER_SIZE,
            EnvelopeFormat::Bare => 0,
        }
    }

    /// Smallest well-formed envelope: header (if any), IV and tag.
    pub fn min_len(self) -> usize {
        self.iv_offset() + IV_SIZE + TAG_SIZE
    }
}

/// Open an envelope and return its plaintext.
///
/// # Procedure
/// 1. For `Opdata01`, check the magic before touching the MAC
/// 2. Verify the trailing HMAC-SHA256 tag in constant time
/// 3. Decrypt the ciphertext with AES-256-CBC, no padding removal
/// 4. Keep the trailing `length` bytes, dropping the prepended padding
///
/// # Errors
/// - `ChecksumMismatch` if the magic is wrong, checked first
/// - `InvalidInput` if the envelope is shorter than its fixed layout
/// - `Authentication` if the tag does not verify (wrong key or tampering)
/// - `Decryption` if the ciphertext is not a whole number of blocks
pub fn open(key_pair: &KeyPair, envelope: &[u8], format: EnvelopeFormat) -> Result<SensitiveBytes> {
    if format == EnvelopeFormat::Opdata01
        && envelope.len() >= MAGIC.len()
        && &envelope[..MAGIC.len()] != MAGIC
    {
        return Err(Error::ChecksumMismatch);
    }

    if envelope.len() < format.min_len() {
        return Err(Error::InvalidInput(format!(
            "Envelope too short: expected at least {} bytes, got {}",
            format.min_len(),
            envelope.len()
        )));
    }

    let (body, tag) = envelope.split_at(envelope.len() - TAG_SIZE);
    let mut mac = new_mac(key_pair)?;
    mac.update(body);
    mac.verify_slice(tag).map_err(|_| Error::Authentication)?;

    let iv_offset = format.iv_offset();
    let iv = &body[iv_offset..iv_offset + IV_SIZE];
    let ciphertext = &body[iv_offset + IV_SIZE..];
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::Decryption(format!(
            "Ciphertext length {} is not a multiple of the block size",
            ciphertext.len()
        )));
    }

    let mut decrypted = Aes256CbcDec::new_from_slices(key_pair.encryption_key(), iv)
        .map_err(|e| Error::Decryption(e.to_string()))?
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|e| Error::Decryption(e.to_string()))?;

    let keep = usize::try_from(declared_length(envelope))
        .map_or(decrypted.len(), |n| n.min(decrypted.len()));
    let plaintext = decrypted.split_off(decrypted.len() - keep);
    decrypted.zeroize();

    Ok(SensitiveBytes::new(plaintext))
}

/// Read the 64-bit little-endian length field at bytes `8..16`.
///
/// Callers guarantee the envelope is at least [`HEADER_SIZE`] bytes long.
fn declared_length(envelope: &[u8]) -> u64 {
    let mut field = [0u8; 8];
    field.copy_from_slice(&envelope[LENGTH_OFFSET..LENGTH_OFFSET + 8]);
    u64::from_le_bytes(field)
}

fn new_mac(key_pair: &KeyPair) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key_pair.mac_key())
        .map_err(|e| Error::InvalidInput(format!("Invalid MAC key: {}", e)))
}

/// Build an envelope around `plaintext`.
///
/// Prepends 1 to 16 random bytes so the padded plaintext fills whole
/// blocks. For `Bare` envelopes the plaintext length is written into the
/// second half of the IV, where [`open`] reads it back.
#[cfg(any(test, feature = "test-util"))]
pub fn seal(key_pair: &KeyPair, plaintext: &[u8], format: EnvelopeFormat) -> Result<Vec<u8>> {
    use cbc::cipher::BlockEncryptMut;

    let length = (plaintext.len() as u64).to_le_bytes();
    let pad_len = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;

    let mut padded = Vec::with_capacity(pad_len + plaintext.len());
    padded.extend_from_slice(&rand::random::<[u8; BLOCK_SIZE]>()[..pad_len]);
    padded.extend_from_slice(plaintext);

    let mut iv: [u8; IV_SIZE] = rand::random();
    if format == EnvelopeFormat::Bare {
        iv[LENGTH_OFFSET..].copy_from_slice(&length);
    }

    let ciphertext = cbc::Encryptor::<Aes256>::new_from_slices(key_pair.encryption_key(), &iv)
        .map_err(|e| Error::InvalidInput(e.to_string()))?
        .encrypt_padded_vec_mut::<NoPadding>(&padded);
    padded.zeroize();

    let mut envelope = Vec::with_capacity(format.min_len() + ciphertext.len());
    if format == EnvelopeFormat::Opdata01 {
        envelope.extend_from_slice(MAGIC);
        envelope.extend_from_slice(&length);
    }
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);

    let mut mac = new_mac(key_pair)?;
    mac.update(&envelope);
    envelope.extend_from_slice(&mac.finalize().into_bytes());

    Ok(envelope)
}
