use sipkl_core::password::{
    DEFAULT_PASSWORD, generate_token, hash_password, is_default_password, verify_password,
};

#[test]
fn test_hash_password_is_hex_sha256() {
    let hash = hash_password("123456");
    assert_eq!(
        hash,
        "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
    );
}

#[test]
fn test_hash_password_is_deterministic() {
    assert_eq!(hash_password("rahasia"), hash_password("rahasia"));
    assert_ne!(hash_password("rahasia"), hash_password("Rahasia"));
}

#[test]
fn test_verify_password() {
    let hash = hash_password("correctpassword");
    assert!(verify_password("correctpassword", &hash));
    assert!(!verify_password("wrongpassword", &hash));
}

#[test]
fn test_default_password_detection() {
    assert!(is_default_password(&hash_password(DEFAULT_PASSWORD)));
    assert!(!is_default_password(&hash_password("something-else")));
}

#[test]
fn test_tokens_are_unique_uuids() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
    assert!(uuid::Uuid::parse_str(&a).is_ok());
}
