//! Logon credential signing.
//!
//! The counterparty recomputes the signature from the same fields, so the
//! prehash layout below is a wire contract: `timestamp + msg_type + seq_num +
//! api_key + target_comp_id + passphrase`, HMAC-SHA256 keyed with the raw
//! secret, standard base64 output.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Deterministic logon signature.
pub fn sign(
    timestamp: &str,
    msg_type: &str,
    seq_num: &str,
    api_key: &str,
    target_comp_id: &str,
    passphrase: &str,
    api_secret: &str,
) -> String {
    let prehash = [timestamp, msg_type, seq_num, api_key, target_comp_id, passphrase].concat();

    let mut mac =
        HmacSha256::new_from_slice(api_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(prehash.as_bytes());

    BASE64.encode(mac.finalize().into_bytes())
}

pub trait Signer: Send + Sync {
    /// Signature for a logon message sent at `timestamp` to `target_comp_id`.
    fn sign_logon(&self, timestamp: &str, target_comp_id: &str) -> String;
    fn access_key(&self) -> &str;
    fn passphrase(&self) -> &str;
}

/// HMAC-SHA256 signer holding the API credentials
pub struct HmacSigner {
    api_key: String,
    api_secret: String,
    passphrase: String,
}

impl HmacSigner {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            passphrase: passphrase.into(),
        }
    }
}

impl Signer for HmacSigner {
    fn sign_logon(&self, timestamp: &str, target_comp_id: &str) -> String {
        sign(
            timestamp,
            crate::fix::tags::msg_type::LOGON,
            "1",
            &self.api_key,
            target_comp_id,
            &self.passphrase,
            &self.api_secret,
        )
    }

    fn access_key(&self) -> &str {
        &self.api_key
    }

    fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
