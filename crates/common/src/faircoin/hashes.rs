pub use bitcoin::hashes::{Hash, sha256, sha256d};
use groestl::{Digest, Groestl512};

/// Two sequential rounds of SHA-256 over `data`.
///
/// This is the digest used for block identity hashes, for the default
/// proof-of-work pipeline, and as the message digest of checkpoint signatures.
pub fn double_digest(data: &[u8]) -> sha256d::Hash {
    sha256d::Hash::hash(data)
}

/// A single round of Groestl-512 followed by a single round of SHA-256.
pub fn groestl_digest(data: &[u8]) -> sha256::Hash {
    let wide = Groestl512::digest(data);
    sha256::Hash::hash(wide.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_digest_is_sha256_twice() {
        let data = b"sync-checkpoint";
        let once = sha256::Hash::hash(data);
        let twice = sha256::Hash::hash(once.as_byte_array());
        assert_eq!(double_digest(data).to_byte_array(), twice.to_byte_array());
    }

    #[test]
    fn test_double_digest_empty_input() {
        // sha256d("") is a well-known constant.
        assert_eq!(
            hex::encode(double_digest(&[]).to_byte_array()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_groestl512_known_answers() {
        assert_eq!(
            hex::encode(Groestl512::digest(b"")),
            "6d3ad29d279110eef3adbd66de2a0345a77baede1557f5d099fce0c03d6dc2ba\
             8e6d4a6633dfbd66053c20faa87d1a11f39a7fbe4a6c2f009801370308fc4ad8"
        );
        assert_eq!(
            hex::encode(Groestl512::digest(b"The quick brown fox jumps over the lazy dog")),
            "badc1f70ccd69e0cf3760c3f93884289da84ec13c70b3d12a53a7a8a4a513f99\
             715d46288f55e1dbf926e6d084a0538e4eebfc91cf2b21452921ccde9131718d"
        );
    }

    #[test]
    fn test_groestl_digest_empty_input() {
        assert_eq!(
            hex::encode(groestl_digest(&[]).to_byte_array()),
            "99de071d22ba0f7e161f8e9233ef16fe2f571a998b2ca5daf308bfbe3e63c83a"
        );
    }

    #[test]
    fn test_groestl_digest_composes_primitives() {
        let data = [0x5au8; 80];
        let wide = Groestl512::digest(data);
        assert_eq!(wide.len(), 64);
        assert_eq!(groestl_digest(&data), sha256::Hash::hash(wide.as_slice()));
        assert_ne!(groestl_digest(&data).to_byte_array(), double_digest(&data).to_byte_array());
    }
}
