//! Golden test vector validation
//!
//! Envelopes carry no version tag, so these vectors are the only guard
//! against silently changing the key derivation parameters or the layout.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use recoverbox::RecoveryCodec;
use recoverbox::cipher::NONCE_LEN;
use recoverbox::kdf::SALT_LEN;
use recoverbox::random::FixedRandom;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    plaintext: String,
    password: String,
    salt: String,
    nonce: String,
    envelope: String,
    comment: String,
}

fn load_golden_vectors() -> Result<Vec<GoldenVector>, serde_json::Error> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data)
}

fn decode(field: &str) -> Vec<u8> {
    BASE64_STANDARD
        .decode(field)
        .expect("failed to decode golden vector field")
}

#[test]
fn test_golden_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    assert!(!vectors.is_empty(), "No golden vectors were tested");

    let mut failed = 0;

    for (i, vector) in vectors.iter().enumerate() {
        let expected_plaintext = decode(&vector.plaintext);
        let password = decode(&vector.password);
        let salt = decode(&vector.salt);
        let nonce = decode(&vector.nonce);
        assert_eq!(salt.len(), SALT_LEN, "vector {}: bad salt length", i);
        assert_eq!(nonce.len(), NONCE_LEN, "vector {}: bad nonce length", i);

        // The codec draws the salt first, then the nonce.
        let random = FixedRandom::new([salt, nonce].concat());
        let codec = RecoveryCodec::with_random(Box::new(random));

        let envelope = codec
            .encrypt(&expected_plaintext, &password)
            .expect("encryption failed");
        if envelope != vector.envelope {
            eprintln!("Vector {}: FAILED - envelope mismatch", i);
            eprintln!("  Comment: {}", vector.comment);
            eprintln!("  Expected: {}", vector.envelope);
            eprintln!("  Actual:   {}", envelope);
            failed += 1;
            continue;
        }

        match codec.decrypt(&vector.envelope, &password) {
            Ok(decrypted) if *decrypted == expected_plaintext => {}
            Ok(decrypted) => {
                eprintln!("Vector {}: FAILED - plaintext mismatch", i);
                eprintln!("  Comment: {}", vector.comment);
                eprintln!("  Expected length: {}", expected_plaintext.len());
                eprintln!("  Actual length: {}", decrypted.len());
                failed += 1;
            }
            Err(e) => {
                eprintln!("Vector {}: FAILED to decrypt - {}", i, e);
                eprintln!("  Comment: {}", vector.comment);
                failed += 1;
            }
        }
    }

    assert_eq!(failed, 0, "Some golden vectors failed validation");
}

#[test]
fn test_golden_vector_wrong_password() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let vector = &vectors[0];

    let err = recoverbox::decrypt(&vector.envelope, b"wrong-password")
        .expect_err("expected authentication failure");
    assert_eq!(err.kind, Some(recoverbox::ErrorKind::AuthenticationFailed));
}
