mod signature;

pub use signature::*;

/// Random opaque value for the OAuth `state` parameter
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::random();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
