use rand::Rng;
use sha2::{Digest, Sha256};

pub const SALT_LENGTH: usize = 30;

/// Hex encoded SHA-256 of `data`.
pub fn get_hash(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{:x}", hash)
}

/// Hex encoded SHA-256 of the password followed by its salt.
pub fn get_password_hash(password: &str, salt: &str) -> String {
    get_hash(format!("{password}{salt}").as_bytes())
}

/// Random alphanumeric salt of `length` characters.
pub fn generate_salt(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Compares two hex digests without short-circuiting on the first mismatch.
pub fn digest_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
