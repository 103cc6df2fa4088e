#![deny(unsafe_code, missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts, unused_extern_crates, unused_import_braces)]
#![warn(unused_lifetimes, unused_qualifications, clippy::pedantic)]
//
#![doc = include_str!("../README.md")]

// Implements the hybrid McEliece encryption scheme over binary Goppa
// codes, with the constant-weight-word channel codec that packs message
// bits into the error pattern.
//
// Functionality map against the scheme description:
//
// GF(2^m) log/exp field tables                  --> gf.rs
// Polynomial layer (Euclid, sqrt mod g, ...)    --> poly.rs
// Bit-packed matrix + systematic reduction      --> mat.rs
// MSB-first bidirectional bit buffer            --> bitbuf.rs
// Range coder with underflow counter            --> arith.rs
// Split-distribution tree + leaf budgets        --> precomp.rs
// Constant-weight-word codec (b2cw / cw2b)      --> cww.rs
// Key generation                                --> keygen.rs
// Block encryption                              --> encrypt.rs
// Syndrome, Patterson decoder, block decryption --> decrypt.rs
//
// The parameter sets are modules in this file with injected macro code
// connecting them to the functionality above. Constant-time execution is
// NOT claimed anywhere: the reference design never aimed for it, and the
// table-driven field arithmetic is inherently data-dependent.

/// The `rand_core` types are re-exported so that users of this crate do
/// not have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod arith;
mod bitbuf;
mod cww;
mod decrypt;
mod encrypt;
mod error;
mod gf;
mod helpers;
mod keygen;
mod mat;
mod poly;
mod precomp;

/// All functionality is covered by traits, such that consumers can
/// utilize trait objects if desired.
pub mod traits;

pub use error::Error;


// This common functionality is injected into each parameter set module
macro_rules! functionality {
    () => {
        use crate::error::Error;
        use crate::gf::Field;
        use crate::precomp::Precomp;
        use crate::traits::{Decrypt, Encrypt, KeyGen, SerDes};
        use once_cell::sync::Lazy;
        use rand_core::CryptoRngCore;
        use subtle::ConstantTimeEq;
        use zeroize::{Zeroize, ZeroizeOnDrop};

        /// Code length in bits, 2^m.
        pub const LENGTH: usize = 1 << M;
        /// Number of parity bits, m·t.
        pub const CODIMENSION: usize = M as usize * T as usize;
        /// Number of information bits.
        pub const DIMENSION: usize = LENGTH - CODIMENSION;
        const ROW_WORDS: usize = 1 + (CODIMENSION - 1) / 64;
        /// Cleartext block length in bits.
        pub const CLEARTEXT_BITS: usize = DIMENSION + ERROR_SIZE;
        /// Serialized public key length in bytes.
        pub const PK_LEN: usize = DIMENSION * ROW_WORDS * 8;
        /// Serialized secret key length in bytes.
        pub const SK_LEN: usize =
            LENGTH * ROW_WORDS * 8 + (LENGTH + 1 + (T as usize + 1) * T as usize) * 2;
        /// Ciphertext block length in bytes.
        pub const CT_LEN: usize = LENGTH / 8;
        /// Plaintext block length in bytes; only the low `CLEARTEXT_BITS`
        /// bits are significant.
        pub const PT_LEN: usize = (CLEARTEXT_BITS - 1) / 8 + 1;

        static FIELD: Lazy<Field> =
            Lazy::new(|| Field::new(M).expect("fixed parameter set has a valid field degree"));
        static PRECOMP: Lazy<Precomp> = Lazy::new(|| {
            Precomp::build(M, T, REDUC).expect("fixed parameter set has a valid precomputation")
        });

        /// Correctly sized public key specific to the target parameter set.
        #[derive(Clone, Debug)]
        pub struct PublicKey(Vec<u8>);

        /// Correctly sized secret key specific to the target parameter set.
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct SecretKey(Vec<u8>);

        /// Correctly sized ciphertext block specific to the target
        /// parameter set.
        #[derive(Clone, Debug)]
        pub struct CipherText(Vec<u8>);

        /// Correctly sized plaintext block specific to the target
        /// parameter set.
        #[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
        pub struct Plaintext(Vec<u8>);

        // Conservative (constant-time) comparison over the significant
        // bits; the spare bits of the trailing byte do not participate.
        impl PartialEq for Plaintext {
            fn eq(&self, other: &Self) -> bool {
                let spare = PT_LEN * 8 - CLEARTEXT_BITS;
                let mut a = self.0.clone();
                let mut b = other.0.clone();
                if spare > 0 {
                    let mask = 0xffu8 >> spare;
                    a[PT_LEN - 1] &= mask;
                    b[PT_LEN - 1] &= mask;
                }
                bool::from(a.ct_eq(&b))
            }
        }

        /// Supports the `KeyGen` trait, allowing for keypair generation.
        pub struct KG();

        impl KeyGen for KG {
            type PublicKey = PublicKey;
            type SecretKey = SecretKey;

            fn try_keygen_with_rng(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(PublicKey, SecretKey), Error> {
                let mut pk = vec![0u8; PK_LEN];
                let mut sk = vec![0u8; SK_LEN];
                crate::keygen::keypair(&FIELD, T as usize, rng, &mut pk, &mut sk)?;
                Ok((PublicKey(pk), SecretKey(sk)))
            }

            fn validate_keypair_vartime(pk: &[u8], sk: &[u8]) -> bool {
                let (pk, sk) = match (
                    PublicKey::try_from_bytes(pk.to_vec()),
                    SecretKey::try_from_bytes(sk.to_vec()),
                ) {
                    (Ok(pk), Ok(sk)) => (pk, sk),
                    _ => return false,
                };
                // a fixed probe block must survive the round trip
                let mut probe = vec![0u8; PT_LEN];
                for (i, b) in probe.iter_mut().enumerate() {
                    *b = (i % 251) as u8;
                }
                let pt = match Plaintext::try_from_bytes(probe) {
                    Ok(pt) => pt,
                    Err(_) => return false,
                };
                match pk.try_encrypt(&pt) {
                    Ok(ct) => match sk.try_decrypt(&ct) {
                        Ok(back) => back == pt,
                        Err(_) => false,
                    },
                    Err(_) => false,
                }
            }
        }

        impl Encrypt for PublicKey {
            type CipherText = CipherText;
            type Plaintext = Plaintext;

            fn try_encrypt(&self, pt: &Plaintext) -> Result<CipherText, Error> {
                let mut ct = vec![0u8; CT_LEN];
                crate::encrypt::encrypt_block(
                    &mut ct, &pt.0, &self.0, M, T, DIMENSION, ERROR_SIZE, &PRECOMP,
                )?;
                Ok(CipherText(ct))
            }
        }

        impl Decrypt for SecretKey {
            type CipherText = CipherText;
            type Plaintext = Plaintext;

            fn try_decrypt(&self, ct: &CipherText) -> Result<Plaintext, Error> {
                let mut pt = vec![0u8; PT_LEN];
                crate::decrypt::decrypt_block(
                    &mut pt, &ct.0, &self.0, &FIELD, M, T, DIMENSION, ERROR_SIZE, &PRECOMP,
                )?;
                Ok(Plaintext(pt))
            }
        }

        impl SerDes for PublicKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            fn try_from_bytes(ba: Vec<u8>) -> Result<Self, Error> {
                // only the length is checkable: the rows of a systematic
                // parity check carry no further invariant
                if ba.len() != PK_LEN {
                    return Err(Error::InvalidParameters);
                }
                Ok(PublicKey(ba))
            }
        }

        impl SerDes for SecretKey {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> {
                let mut this = self;
                core::mem::take(&mut this.0)
            }

            fn try_from_bytes(ba: Vec<u8>) -> Result<Self, Error> {
                if ba.len() != SK_LEN {
                    return Err(Error::InvalidParameters);
                }
                // the inverse support section must be a permutation
                let base = LENGTH * ROW_WORDS * 8;
                let mut seen = vec![false; LENGTH];
                for i in 0..LENGTH {
                    let v =
                        u16::from_le_bytes([ba[base + 2 * i], ba[base + 2 * i + 1]]) as usize;
                    if v >= LENGTH || seen[v] {
                        return Err(Error::InvalidParameters);
                    }
                    seen[v] = true;
                }
                Ok(SecretKey(ba))
            }
        }

        impl SerDes for CipherText {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            fn try_from_bytes(ba: Vec<u8>) -> Result<Self, Error> {
                if ba.len() != CT_LEN {
                    return Err(Error::InvalidParameters);
                }
                Ok(CipherText(ba))
            }
        }

        impl SerDes for Plaintext {
            type ByteArray = Vec<u8>;

            fn into_bytes(self) -> Vec<u8> {
                let mut this = self;
                core::mem::take(&mut this.0)
            }

            fn try_from_bytes(ba: Vec<u8>) -> Result<Self, Error> {
                if ba.len() != PT_LEN {
                    return Err(Error::InvalidParameters);
                }
                Ok(Plaintext(ba))
            }
        }

    };
}


/// Functionality for the classic m = 10, t = 50 parameter set (the
/// dimensions of the original scheme proposal): code length 1024,
/// dimension 524.
#[cfg(feature = "mce-10-50")]
pub mod mce_10_50 {
    //!
    //! Typical usage flow:
    //! 1. The receiver runs `try_keygen()` and publishes the public key
    //!    bytes.
    //! 2. A sender deserializes them, packs `CLEARTEXT_BITS` message bits
    //!    into a `Plaintext` and runs `try_encrypt()`.
    //! 3. The receiver runs `try_decrypt()` on the ciphertext block.
    //!
    //! **--> See [`crate::traits`] for the keygen, encrypt, decrypt and
    //! serialization functionality.**

    const M: u32 = 10;
    const T: u32 = 50;
    const REDUC: u32 = 1;

    /// Cleartext bits carried by the error pattern of each block, a floor
    /// of the self-information bound for these parameters.
    pub const ERROR_SIZE: usize = 279;

    functionality!();
}


/// Functionality for the m = 11, t = 32 parameter set (the reference
/// choice of the hybrid scheme): code length 2048, dimension 1696.
#[cfg(feature = "mce-11-32")]
pub mod mce_11_32 {
    //!
    //! Typical usage flow:
    //! 1. The receiver runs `try_keygen()` and publishes the public key
    //!    bytes.
    //! 2. A sender deserializes them, packs `CLEARTEXT_BITS` message bits
    //!    into a `Plaintext` and runs `try_encrypt()`.
    //! 3. The receiver runs `try_decrypt()` on the ciphertext block.
    //!
    //! **--> See [`crate::traits`] for the keygen, encrypt, decrypt and
    //! serialization functionality.**

    const M: u32 = 11;
    const T: u32 = 32;
    const REDUC: u32 = 2;

    /// Cleartext bits carried by the error pattern of each block, a floor
    /// of the self-information bound for these parameters.
    pub const ERROR_SIZE: usize = 230;

    functionality!();
}


/// Functionality for the m = 12, t = 41 parameter set (a higher-security
/// choice): code length 4096, dimension 3604.
#[cfg(feature = "mce-12-41")]
pub mod mce_12_41 {
    //!
    //! Typical usage flow:
    //! 1. The receiver runs `try_keygen()` and publishes the public key
    //!    bytes.
    //! 2. A sender deserializes them, packs `CLEARTEXT_BITS` message bits
    //!    into a `Plaintext` and runs `try_encrypt()`.
    //! 3. The receiver runs `try_decrypt()` on the ciphertext block.
    //!
    //! **--> See [`crate::traits`] for the keygen, encrypt, decrypt and
    //! serialization functionality.**

    const M: u32 = 12;
    const T: u32 = 41;
    const REDUC: u32 = 2;

    /// Cleartext bits carried by the error pattern of each block, a floor
    /// of the self-information bound for these parameters.
    pub const ERROR_SIZE: usize = 323;

    functionality!();
}
