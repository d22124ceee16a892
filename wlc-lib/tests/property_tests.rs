//! Property-based tests for wlc-lib

use proptest::prelude::*;
use wlc_lib::{signing, EnvelopeCipher, QueryParams, RequestEnvelope};

proptest! {
    /// Signing depends on the parameter set, never on insertion order
    #[test]
    fn test_sign_is_order_independent(
        entries in prop::collection::btree_map("[a-zA-Z]{1,12}", "[0-9a-z]{0,24}", 1..8),
        body in ".{0,64}",
    ) {
        let forward: QueryParams = entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let reverse: QueryParams =
            entries.iter().rev().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let a = signing::sign("secret", &forward, &body);
        let b = signing::sign("secret", &reverse, &body);

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), 64);
        prop_assert!(signing::verify("secret", &forward, &body, &b));
    }

    /// Changing any value changes the signature
    #[test]
    fn test_sign_covers_values(
        key in "[a-z]{1,8}",
        value in "[0-9]{1,18}",
        other in "[0-9]{1,18}",
    ) {
        prop_assume!(value != other);
        let a = signing::sign("secret", &QueryParams::new().with(key.clone(), value), "");
        let b = signing::sign("secret", &QueryParams::new().with(key, other), "");

        prop_assert_ne!(a, b);
    }

    /// Sealing then opening recovers the exact plaintext for every key size
    #[test]
    fn test_seal_open_recovers_plaintext(
        key_len in prop::sample::select(vec![16usize, 24, 32]),
        key_byte in any::<u8>(),
        plaintext in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let cipher = EnvelopeCipher::from_key(&vec![key_byte; key_len]).unwrap();
        let sealed = cipher.seal(&plaintext).unwrap();

        prop_assert_eq!(sealed.len(), plaintext.len() + 12 + 16);
        prop_assert_eq!(cipher.open(&sealed).unwrap(), plaintext);
    }

    /// Envelopes of arbitrary JSON payloads open to the same JSON
    #[test]
    fn test_envelope_recovers_payload(
        fields in prop::collection::btree_map("[a-z]{1,8}", "\\PC{0,32}", 0..6),
    ) {
        let cipher = EnvelopeCipher::from_hex_secret("bbd3322487be9f3b2af1e7d1d3734f41").unwrap();

        let envelope = RequestEnvelope::seal(&cipher, &fields).unwrap();
        let body = envelope.to_body().unwrap();
        let opened: std::collections::BTreeMap<String, String> =
            RequestEnvelope::from_body(&body).unwrap().open(&cipher).unwrap();

        prop_assert_eq!(opened, fields);
    }
}
