use crate::error::ClientError;
use crate::secrets::RepositoryPublicKey;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use zeroize::Zeroize;

/// Raw length of an X25519 public key.
const PUBLIC_KEY_LEN: usize = 32;

/// Seal a plaintext secret value under a repository public key.
///
/// The key arrives as standard-alphabet padded base64. The value is
/// encrypted with an anonymous sealed box (no sender keypair; only the
/// repository's private key, held server-side, can open it) and the
/// ciphertext is re-encoded with the same base64 alphabet, ready to be sent
/// as `encrypted_value` together with the key's `key_id`.
///
/// A malformed key or a failed seal is an error: the value is never sent
/// unencrypted, and it is never logged here.
pub fn seal_secret_value(
    public_key: &RepositoryPublicKey,
    value: &str,
) -> Result<String, ClientError> {
    let decoded = BASE64
        .decode(&public_key.key)
        .map_err(|e| ClientError::InvalidPublicKey {
            key_id: public_key.key_id.clone(),
            reason: e.to_string(),
        })?;

    let key_bytes: [u8; PUBLIC_KEY_LEN] =
        decoded
            .as_slice()
            .try_into()
            .map_err(|_| ClientError::InvalidPublicKey {
                key_id: public_key.key_id.clone(),
                reason: format!("expected {PUBLIC_KEY_LEN} bytes, got {}", decoded.len()),
            })?;

    let recipient = PublicKey::from(key_bytes);
    let mut plaintext = value.as_bytes().to_vec();
    let sealed = recipient
        .seal(&mut OsRng, &plaintext)
        .map_err(|_| ClientError::Seal);
    plaintext.zeroize();

    Ok(BASE64.encode(sealed?))
}
