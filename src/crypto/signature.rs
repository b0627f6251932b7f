use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// HMAC digest used to sign a webhook body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    /// Prefix carried by the signature header value
    pub fn prefix(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1=",
            SignatureAlgorithm::Sha256 => "sha256=",
        }
    }
}

/// Keyed MAC already fed with the body
fn keyed<M: Mac + KeyInit>(secret: &str, body: &[u8]) -> Option<M> {
    let mut mac = <M as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Sign a body, producing a prefixed hex signature like `sha256=ab12...`
pub fn sign(body: &[u8], secret: &str, algorithm: SignatureAlgorithm) -> Result<String> {
    let digest = match algorithm {
        SignatureAlgorithm::Sha1 => {
            keyed::<HmacSha1>(secret, body).map(|mac| mac.finalize().into_bytes().to_vec())
        }
        SignatureAlgorithm::Sha256 => {
            keyed::<HmacSha256>(secret, body).map(|mac| mac.finalize().into_bytes().to_vec())
        }
    }
    .ok_or_else(|| Error::Config("invalid HMAC key".to_string()))?;
    Ok(format!("{}{}", algorithm.prefix(), hex::encode(digest)))
}

/// Check one signature header value against the body
fn verify_one(body: &[u8], signature: &str, secret: &str, algorithm: SignatureAlgorithm) -> bool {
    let hex_sig = signature
        .strip_prefix(algorithm.prefix())
        .unwrap_or(signature);
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };

    match algorithm {
        SignatureAlgorithm::Sha1 => keyed::<HmacSha1>(secret, body)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok()),
        SignatureAlgorithm::Sha256 => keyed::<HmacSha256>(secret, body)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok()),
    }
}

/// Verify a webhook body against its SHA1 and/or SHA256 signature.
///
/// Valid when either signature matches. An empty body, a missing secret or
/// missing signatures never verify.
pub fn verify_signature(
    body: &[u8],
    signature: Option<&str>,
    signature256: Option<&str>,
    secret: Option<&str>,
) -> bool {
    tracing::info!("[googlemeet] Checking signature");
    if body.is_empty() {
        tracing::warn!("[googlemeet] The body is null or empty");
        return false;
    }

    let secret = secret.filter(|s| !s.is_empty());
    let check = |sig: Option<&str>, algorithm| match (secret, sig.filter(|s| !s.is_empty())) {
        (Some(secret), Some(sig)) => verify_one(body, sig, secret, algorithm),
        _ => false,
    };

    let verified = check(signature, SignatureAlgorithm::Sha1);
    if !verified {
        tracing::warn!("[googlemeet] Invalid signature sha1");
    }
    let verified256 = check(signature256, SignatureAlgorithm::Sha256);
    if !verified256 {
        tracing::warn!("[googlemeet] Invalid signature sha256");
    }

    verified || verified256
}
