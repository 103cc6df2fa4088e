use crate::error::Error;
use rand_core::CryptoRngCore;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// The public key used for block encryption.
    type PublicKey;
    /// The secret key used for block decryption.
    type SecretKey;

    /// Generates a public and secret key pair specific to this parameter
    /// set, using the OS default random number generator.
    /// # Errors
    /// Returns an error when the parameter set is internally inconsistent;
    /// key generation retries internally on singular parity-check matrices.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mceliece_hy::mce_11_32;  // Could also be mce_10_50 or mce_12_41.
    /// use mceliece_hy::traits::{Decrypt, Encrypt, KeyGen, SerDes};
    ///
    /// let (pk, sk) = mce_11_32::KG::try_keygen()?;
    /// let pt = mce_11_32::Plaintext::try_from_bytes(vec![0x5a; mce_11_32::PT_LEN])?;
    /// let ct = pk.try_encrypt(&pt)?;
    /// assert_eq!(sk.try_decrypt(&ct)?, pt);
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::SecretKey), Error> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a public and secret key pair specific to this parameter
    /// set, using the provided random number generator.
    /// # Errors
    /// Returns an error when the parameter set is internally inconsistent.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mceliece_hy::mce_11_32;
    /// use mceliece_hy::traits::KeyGen;
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    /// let (pk, sk) = mce_11_32::KG::try_keygen_with_rng(&mut rng)?;
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::PublicKey, Self::SecretKey), Error>;

    /// Validates the correspondence of a serialized key pair, perhaps
    /// after both were stored to disk and retrieved: both keys must
    /// deserialize and carry a probe block through an encrypt/decrypt
    /// round trip. Not intended to run in constant time.
    fn validate_keypair_vartime(pk: &[u8], sk: &[u8]) -> bool;
}


/// Block encryption with a public key.
pub trait Encrypt {
    /// A cleartext block sized to the parameter set.
    type Plaintext;
    /// The resulting ciphertext block.
    type CipherText;

    /// Encrypts one cleartext block. Encryption is deterministic: the
    /// message content itself selects the error pattern (any randomized
    /// envelope sits above this layer).
    /// # Errors
    /// Returns an error when the cleartext tail cannot be packed into a
    /// constant-weight word, which a correctly sized block never triggers.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mceliece_hy::mce_11_32;
    /// use mceliece_hy::traits::{Decrypt, Encrypt, KeyGen, SerDes};
    ///
    /// let (pk, sk) = mce_11_32::KG::try_keygen()?;
    /// let pt = mce_11_32::Plaintext::try_from_bytes(vec![7; mce_11_32::PT_LEN])?;
    /// let ct = pk.try_encrypt(&pt)?;
    /// let ct_bytes = ct.into_bytes();              // ships to the key holder
    ///
    /// let ct = mce_11_32::CipherText::try_from_bytes(ct_bytes)?;
    /// assert_eq!(sk.try_decrypt(&ct)?, pt);
    /// # Ok(())}
    /// ```
    fn try_encrypt(&self, pt: &Self::Plaintext) -> Result<Self::CipherText, Error>;
}


/// Block decryption with a secret key.
pub trait Decrypt {
    /// A cleartext block sized to the parameter set.
    type Plaintext;
    /// The ciphertext block to open.
    type CipherText;

    /// Decrypts one ciphertext block.
    /// # Errors
    /// Returns [`Error::Undecodable`] when the block does not carry a
    /// correctable weight-t error pattern (e.g. after corruption).
    fn try_decrypt(&self, ct: &Self::CipherText) -> Result<Self::Plaintext, Error>;
}


/// Serialization and deserialization of keys, ciphertexts and plaintexts.
pub trait SerDes {
    /// The byte container for this struct.
    type ByteArray;

    /// Produces the byte serialization of this struct.
    fn into_bytes(self) -> Self::ByteArray;

    /// Consumes a serialization, validating its length (and whatever
    /// structure the type allows).
    /// # Errors
    /// Returns an error on malformed input.
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, Error>
    where
        Self: Sized;
}
