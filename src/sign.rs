//! Deterministic JS-SDK signature computation and nonce generation.

// crates.io
use rand::Rng;
use sha1::{Digest, Sha1};

const NONCE_LEN: usize = 11;
const NONCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Computes the hex-encoded SHA-1 signature binding ticket, nonce, timestamp, and target URL.
///
/// The signed string is the literal
/// `jsapi_ticket=<ticket>&noncestr=<nonce>&timestamp=<ts>&url=<url>`; the platform verifies the
/// same concatenation on its side, so field order and spelling are fixed.
pub fn signature(ticket: &str, nonce: &str, timestamp: i64, url: &str) -> String {
	let payload = format!("jsapi_ticket={ticket}&noncestr={nonce}&timestamp={timestamp}&url={url}");
	let mut hasher = Sha1::new();

	hasher.update(payload.as_bytes());

	hex::encode(hasher.finalize())
}

/// Generates an 11-character base-36 nonce.
///
/// Non-cryptographic; collisions are accepted because the nonce only decorrelates signatures
/// across requests.
pub fn nonce() -> String {
	let mut rng = rand::rng();

	(0..NONCE_LEN)
		.map(|_| char::from(NONCE_ALPHABET[rng.random_range(0..NONCE_ALPHABET.len())]))
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn signature_matches_the_platform_sample() {
		// Reference vector from the platform's published signature documentation.
		let digest = signature(
			"sM4AOVdWfPE4DxkXGEs8VMCPGGVi4C3VM0P37wVUCFvkVAy_90u5h9nbSlYy3-Sl-HhTdfl2fzFy1AOcHKP7qg",
			"Wm3WZYTPz0wzccnW",
			1414587457,
			"http://mp.weixin.qq.com?params=value",
		);

		assert_eq!(digest, "0f9de62fce790f9a083d5c99e95740ceb90c27ed");
	}

	#[test]
	fn signature_is_deterministic() {
		let first = signature("asdf", "nonce", 1414587457, "http://awesome.com");
		let second = signature("asdf", "nonce", 1414587457, "http://awesome.com");

		assert_eq!(first, second);
		assert_eq!(first, "ce83b31d206bf534e25bb7f28c6d2ca377c53db8");
	}

	#[test]
	fn signature_is_lowercase_hex() {
		let digest = signature("ticket", "nonce", 0, "https://example.com");

		assert_eq!(digest.len(), 40);
		assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn nonce_is_base36_with_fixed_length() {
		for _ in 0..32 {
			let value = nonce();

			assert_eq!(value.len(), NONCE_LEN);
			assert!(value.bytes().all(|b| NONCE_ALPHABET.contains(&b)));
		}
	}
}
