//! RFC 5869 Appendix A test vectors for HKDF-SHA256, plus the
//! prefix-consistency property of `expand`.

use chunkseal_crypto::kdf::{derive_key, expand, extract, Prk, MAX_OUTPUT_LEN};
use chunkseal_crypto::{ChunkSealError, Cipher};
use proptest::prelude::*;

fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

#[test]
fn rfc5869_case_1_basic() {
    let ikm = [0x0bu8; 22];
    let salt = unhex("000102030405060708090a0b0c");
    let info = unhex("f0f1f2f3f4f5f6f7f8f9");

    let prk = extract(Some(&salt), &ikm);
    assert_eq!(
        hex::encode(prk.as_bytes()),
        "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5"
    );

    let okm = expand(&prk, &info, 42).unwrap();
    assert_eq!(
        hex::encode(okm),
        "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
    );
}

#[test]
fn rfc5869_case_3_empty_salt_and_info() {
    let ikm = [0x0bu8; 22];
    let expected_prk = "19ef24a32c717b167f33a91d6f648bdf96596776afdb6377ac434c1c293ccb04";
    let expected_okm =
        "8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d9d201395faa4b61a96c8";

    // A zero-length salt and an absent salt both mean "HashLen zero bytes".
    for salt in [Some(&[][..]), None] {
        let prk = extract(salt, &ikm);
        assert_eq!(hex::encode(prk.as_bytes()), expected_prk);
        assert_eq!(hex::encode(expand(&prk, b"", 42).unwrap()), expected_okm);
    }
}

#[test]
fn derive_key_composes_extract_and_expand() {
    let salt = b"chunkseal-salt";
    let direct = derive_key(Some(salt), b"ikm", b"info", 80).unwrap();
    let staged = expand(&extract(Some(salt), b"ikm"), b"info", 80).unwrap();
    assert_eq!(direct, staged);
}

#[test]
fn over_long_output_is_rejected() {
    let err = derive_key(None, b"ikm", b"info", 255 * 32 + 1).unwrap_err();
    assert!(matches!(err, ChunkSealError::InvalidLength { .. }));
}

#[test]
fn any_length_past_the_limit_is_rejected() {
    for length in [MAX_OUTPUT_LEN + 1, usize::MAX / 2, usize::MAX] {
        let err = derive_key(None, b"ikm", b"info", length).unwrap_err();
        assert!(
            matches!(err, ChunkSealError::InvalidLength { .. }),
            "length {length}: {err:?}"
        );
    }
}

#[test]
fn rfc5869_case_1_expand_from_raw_prk() {
    let prk: [u8; 32] = unhex("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5")
        .try_into()
        .unwrap();
    let info = unhex("f0f1f2f3f4f5f6f7f8f9");
    let okm = expand(&Prk::from_bytes(prk), &info, 42).unwrap();
    assert_eq!(
        hex::encode(okm),
        "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
    );
}

#[test]
fn derived_key_drives_a_cipher() {
    let key = derive_key(Some(b"salt"), b"shared secret", b"chunkseal aead", 32).unwrap();
    let cipher = Cipher::new(&key).unwrap();
    let chunks = cipher.encrypt_chunks(b"derived").unwrap();
    assert_eq!(cipher.decrypt_chunks(&chunks).unwrap(), b"derived");
}

proptest! {
    /// A shorter request is always a prefix of a longer one.
    #[test]
    fn expand_is_prefix_consistent(
        ikm in proptest::collection::vec(any::<u8>(), 0..=64),
        info in proptest::collection::vec(any::<u8>(), 0..=32),
        short in 0usize..=512,
        extra in 0usize..=512,
    ) {
        let long = (short + extra).min(MAX_OUTPUT_LEN);
        let a = derive_key(None, &ikm, &info, short).unwrap();
        let b = derive_key(None, &ikm, &info, long).unwrap();
        prop_assert_eq!(a.len(), short);
        prop_assert_eq!(&b[..short], a.as_slice());
    }
}
