//! Per-note envelope encryption.
//!
//! Each note version is encrypted under a fresh random 128-bit data key.
//! The data key itself is wrapped under a 256-bit key derived from the
//! caller's content secret and a fresh per-note salt, so the database
//! never holds anything decryptable without the password.
//!
//! One random IV is shared by the header, content, and key-wrap
//! ciphertexts of a note version. The header and content are encrypted
//! under the data key while the wrap runs under the derived key, so no IV
//! is ever reused under the same key.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::{self, ContentSecret, WrapKey, SALT_LEN};
use crate::error::{Result, SealnoteError};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the per-note data key in bytes (AES-128).
pub const DATA_KEY_LEN: usize = 16;

/// Length of the initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// The five crypto fields persisted for one note version.
///
/// These fields are only ever written together: a partial update would
/// leave the note permanently undecryptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRecord {
    /// Header ciphertext (under the data key).
    pub header: Vec<u8>,

    /// Content ciphertext (under the data key).
    pub content: Vec<u8>,

    /// Data key ciphertext (under the derived wrapping key).
    pub wrapped_data_key: Vec<u8>,

    /// Salt mixed into wrapping-key derivation for this version.
    pub wrap_salt: [u8; SALT_LEN],

    /// IV shared by the three ciphertexts of this version.
    pub iv: [u8; IV_LEN],
}

/// Random per-note symmetric key. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
struct DataKey([u8; DATA_KEY_LEN]);

impl DataKey {
    fn generate() -> Self {
        let mut bytes = [0u8; DATA_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt a note's header and content for the given content secret.
///
/// Every call draws a fresh data key, IV, and wrap salt; sealing the same
/// plaintext twice never reuses any of the three.
pub fn seal(header: &[u8], content: &[u8], secret: &ContentSecret) -> Result<EnvelopeRecord> {
    let data_key = DataKey::generate();
    let iv = generate_iv();

    let header_ct = Aes128CbcEnc::new((&data_key.0).into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(header);
    let content_ct = Aes128CbcEnc::new((&data_key.0).into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(content);

    let wrap_salt = kdf::generate_salt();
    let wrap_key = kdf::derive_wrap_key(secret, &wrap_salt)?;
    let wrapped_data_key = Aes256CbcEnc::new(wrap_key.as_bytes().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(&data_key.0);

    Ok(EnvelopeRecord {
        header: header_ct,
        content: content_ct,
        wrapped_data_key,
        wrap_salt,
        iv,
    })
}

/// Decrypt a note's header and content.
///
/// # Errors
///
/// Returns `SealnoteError::Decryption` for a wrong secret or corrupted
/// fields. The error is opaque: it does not reveal which sub-step failed.
pub fn open(record: &EnvelopeRecord, secret: &ContentSecret) -> Result<(Vec<u8>, Vec<u8>)> {
    let data_key = unwrap_data_key(record, secret)?;

    let header = Aes128CbcDec::new((&data_key.0).into(), (&record.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&record.header)
        .map_err(|_| SealnoteError::Decryption)?;
    let content = Aes128CbcDec::new((&data_key.0).into(), (&record.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&record.content)
        .map_err(|_| SealnoteError::Decryption)?;

    Ok((header, content))
}

/// Decrypt only the header field.
///
/// Used by bulk listing paths, which fall back to the ciphertext when one
/// note's header will not open rather than failing the whole listing.
pub fn open_header(record: &EnvelopeRecord, secret: &ContentSecret) -> Result<Vec<u8>> {
    let data_key = unwrap_data_key(record, secret)?;

    Aes128CbcDec::new((&data_key.0).into(), (&record.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&record.header)
        .map_err(|_| SealnoteError::Decryption)
}

fn unwrap_data_key(record: &EnvelopeRecord, secret: &ContentSecret) -> Result<DataKey> {
    let wrap_key: WrapKey =
        kdf::derive_wrap_key(secret, &record.wrap_salt).map_err(|_| SealnoteError::Decryption)?;

    let mut unwrapped = Aes256CbcDec::new(wrap_key.as_bytes().into(), (&record.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&record.wrapped_data_key)
        .map_err(|_| SealnoteError::Decryption)?;

    if unwrapped.len() != DATA_KEY_LEN {
        unwrapped.zeroize();
        return Err(SealnoteError::Decryption);
    }

    let mut bytes = [0u8; DATA_KEY_LEN];
    bytes.copy_from_slice(&unwrapped);
    unwrapped.zeroize();
    Ok(DataKey(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{ContentSecret, SECRET_LEN};

    fn secret_from(byte: u8) -> ContentSecret {
        ContentSecret::from_bytes([byte; SECRET_LEN])
    }

    #[test]
    fn test_seal_open_round_trip() {
        let secret = secret_from(0x11);
        let record = seal(b"Groceries", b"milk, eggs", &secret).unwrap();

        let (header, content) = open(&record, &secret).unwrap();
        assert_eq!(header, b"Groceries");
        assert_eq!(content, b"milk, eggs");
    }

    #[test]
    fn test_round_trip_empty_and_block_aligned_payloads() {
        let secret = secret_from(0x11);

        for payload in [&b""[..], &[0x42; 16][..], &[0x42; 4096][..]] {
            let record = seal(b"h", payload, &secret).unwrap();
            let (_, content) = open(&record, &secret).unwrap();
            assert_eq!(content, payload);
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let secret = secret_from(0x11);
        let record = seal(b"Groceries", b"milk, eggs", &secret).unwrap();

        assert_ne!(record.header.as_slice(), b"Groceries".as_slice());
        assert_ne!(record.content.as_slice(), b"milk, eggs".as_slice());
    }

    #[test]
    fn test_wrong_secret_fails_opaquely() {
        let record = seal(b"Groceries", b"milk, eggs", &secret_from(0x11)).unwrap();

        let result = open(&record, &secret_from(0x22));
        assert!(matches!(result, Err(SealnoteError::Decryption)));
    }

    #[test]
    fn test_sealing_twice_never_reuses_key_iv_or_salt() {
        let secret = secret_from(0x11);
        let first = seal(b"Groceries", b"milk, eggs", &secret).unwrap();
        let second = seal(b"Groceries", b"milk, eggs", &secret).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.wrap_salt, second.wrap_salt);
        assert_ne!(first.wrapped_data_key, second.wrapped_data_key);
        assert_ne!(first.content, second.content);
    }

    #[test]
    fn test_shared_iv_across_fields() {
        // One IV serves all three ciphertexts of a version; the record
        // carries exactly one.
        let secret = secret_from(0x11);
        let record = seal(b"h", b"c", &secret).unwrap();
        assert_eq!(record.iv.len(), IV_LEN);
        assert!(open(&record, &secret).is_ok());
    }

    #[test]
    fn test_corrupted_fields_fail_closed() {
        let secret = secret_from(0x11);
        let record = seal(b"Groceries", b"milk, eggs", &secret).unwrap();

        let mut bad = record.clone();
        bad.wrapped_data_key[0] ^= 0xFF;
        assert!(open(&bad, &secret).is_err());

        let mut bad = record.clone();
        bad.wrap_salt[0] ^= 0xFF;
        assert!(open(&bad, &secret).is_err());

        let mut bad = record.clone();
        bad.content.truncate(bad.content.len() - 1);
        assert!(open(&bad, &secret).is_err());
    }

    #[test]
    fn test_open_header_only() {
        let secret = secret_from(0x11);
        let record = seal(b"Groceries", b"milk, eggs", &secret).unwrap();

        assert_eq!(open_header(&record, &secret).unwrap(), b"Groceries");
        assert!(open_header(&record, &secret_from(0x22)).is_err());
    }
}
