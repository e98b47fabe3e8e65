use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Parameters the upload API sends but never signs.
pub const UNSIGNED_PARAMS: [&str; 4] =
    ["file", "api_key", "signature", "resource_type"];

/// Signs upload parameters: keys sorted, joined as `k=v&k=v`, secret
/// appended, SHA-256 as lowercase hex.
///
/// Parameters listed in [`UNSIGNED_PARAMS`] and parameters with an empty
/// value are left out of the signed string.
pub fn sign_params<'a, I>(params: I, api_secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let to_sign = params
        .into_iter()
        .filter(|(key, value)| !UNSIGNED_PARAMS.contains(key) && !value.is_empty())
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha256_hex(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    #[test]
    fn sorts_parameters_and_appends_secret() {
        let signature = sign_params(
            [("timestamp", "1315060510"), ("public_id", "sample_image")],
            "abcd",
        );
        assert_eq!(
            signature,
            sha256_hex("public_id=sample_image&timestamp=1315060510abcd")
        );
    }

    #[test]
    fn excludes_unsigned_and_empty_parameters() {
        let signature = sign_params(
            [
                ("timestamp", "1"),
                ("api_key", "key"),
                ("file", "data"),
                ("resource_type", "image"),
                ("signature", "old"),
                ("folder", ""),
            ],
            "s",
        );
        assert_eq!(signature, sha256_hex("timestamp=1s"));
    }

    #[test]
    fn output_is_lowercase_hex() {
        let signature = sign_params([("timestamp", "42")], "secret");
        assert_eq!(signature.len(), 64);
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }
}
