// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key derivation and the wallet-contract seam used by the transfer signer.
//!
//! Keys are Ed25519. A TON mnemonic is turned into a seed the same way the
//! reference wallets do it: HMAC-SHA512 over the phrase gives the entropy,
//! PBKDF2-HMAC-SHA512 stretches it, and the first 32 bytes are the seed.
//!
//! Wallet contracts sit behind [`WalletFactory`]; the production
//! implementation is [`TonWalletFactory`](super::wallet::TonWalletFactory).

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use super::address::Address;
use super::types::{TransferIntent, WalletVersion};
use crate::error::TonError;

/// Words in a TON mnemonic.
pub const MNEMONIC_WORDS: usize = 24;

const PBKDF2_SALT: &[u8] = b"TON default seed";
const PBKDF2_ROUNDS: u32 = 100_000;

/// Ed25519 key pair. The secret half is wiped on drop.
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed),
        }
    }

    /// Derive the key pair for a 24-word TON mnemonic.
    ///
    /// # Arguments
    /// * `phrase` - Whitespace-separated words; NFKD-normalized, case and extra
    ///   spacing are ignored
    ///
    /// # Returns
    /// * `Ok(KeyPair)` - Keys for the wallet that phrase controls
    /// * `Err(TonError::InvalidMnemonic)` - Wrong word count
    pub fn from_mnemonic(phrase: &str) -> Result<Self, TonError> {
        let decomposed = Zeroizing::new(phrase.nfkd().collect::<String>());
        let words: Vec<String> = decomposed
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if words.len() != MNEMONIC_WORDS {
            return Err(TonError::InvalidMnemonic(format!(
                "expected {MNEMONIC_WORDS} words, got {}",
                words.len()
            )));
        }
        let normalized = Zeroizing::new(words.join(" "));

        let mut mac = Hmac::<Sha512>::new_from_slice(normalized.as_bytes())
            .map_err(|e| TonError::Signing(e.to_string()))?;
        mac.update(b"");
        let mut entropy = Zeroizing::new([0u8; 64]);
        entropy.copy_from_slice(&mac.finalize().into_bytes());

        let mut stretched = Zeroizing::new([0u8; 64]);
        pbkdf2::pbkdf2_hmac::<Sha512>(&entropy[..], PBKDF2_SALT, PBKDF2_ROUNDS, &mut stretched[..]);

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&stretched[..32]);
        Ok(Self::from_seed(&seed))
    }

    /// Accept either a mnemonic or a hex-encoded key.
    ///
    /// Hex input may be the 32-byte seed or the 64-byte expanded secret key
    /// (seed followed by public key).
    pub fn from_secret(secret: &str) -> Result<Self, TonError> {
        let trimmed = secret.trim();
        if trimmed.split_whitespace().count() > 1 {
            return Self::from_mnemonic(trimmed);
        }

        let bytes = Zeroizing::new(hex::decode(trimmed.trim_start_matches("0x")).map_err(|_| {
            TonError::InvalidMnemonic("secret is neither a mnemonic nor hex".to_string())
        })?);
        match bytes.len() {
            32 | 64 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(&bytes[..32]);
                Ok(Self::from_seed(&seed))
            }
            n => Err(TonError::InvalidMnemonic(format!(
                "hex secret must be 32 or 64 bytes, got {n}"
            ))),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// External message ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// Serialized bag of cells.
    pub boc: Vec<u8>,
    /// Hash of the external message cell, as the indexer reports it.
    pub hash: [u8; 32],
}

/// A deployed (or deployable) wallet contract.
pub trait WalletContract: Send + Sync {
    fn address(&self) -> Address;

    fn version(&self) -> WalletVersion;

    /// Wrap `intents` into one external message bound to `seqno` and sign it.
    fn build_signed_message(
        &self,
        intents: &[TransferIntent],
        seqno: u32,
        keys: &KeyPair,
    ) -> Result<SignedMessage, TonError>;
}

/// Instantiates wallet contracts for a public key.
pub trait WalletFactory: Send + Sync {
    fn create(
        &self,
        public_key: [u8; 32],
        version: WalletVersion,
        workchain: i32,
    ) -> Result<Box<dyn WalletContract>, TonError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn mnemonic_derivation_matches_reference_vector() {
        let keys = KeyPair::from_mnemonic(PHRASE).unwrap();
        assert_eq!(
            hex::encode(keys.public_key()),
            "abbd2a1c784a6086850c172bcc7d56208e4dea0a51b9389ba21d174ff864c17a"
        );
    }

    #[test]
    fn mnemonic_is_normalized() {
        let shouty = format!("  {}  ", PHRASE.to_uppercase().replace(' ', "   "));
        let a = KeyPair::from_mnemonic(PHRASE).unwrap();
        let b = KeyPair::from_mnemonic(&shouty).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let err = KeyPair::from_mnemonic("abandon art").unwrap_err();
        assert!(matches!(err, TonError::InvalidMnemonic(_)));
    }

    #[test]
    fn hex_secrets_are_accepted() {
        let seed_hex = hex::encode([7u8; 32]);
        let from_seed = KeyPair::from_secret(&seed_hex).unwrap();
        assert_eq!(
            hex::encode(from_seed.public_key()),
            "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c"
        );

        let expanded = format!("0x{seed_hex}{}", hex::encode(from_seed.public_key()));
        let from_expanded = KeyPair::from_secret(&expanded).unwrap();
        assert_eq!(from_expanded.public_key(), from_seed.public_key());

        assert!(matches!(
            KeyPair::from_secret("abcd"),
            Err(TonError::InvalidMnemonic(_))
        ));
        assert!(matches!(
            KeyPair::from_secret("not-hex"),
            Err(TonError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn signatures_verify() {
        use ed25519_dalek::{Signature, Verifier, VerifyingKey};

        let keys = KeyPair::from_seed(&[1u8; 32]);
        let signature = keys.sign(b"payload");
        let verifying = VerifyingKey::from_bytes(&keys.public_key()).unwrap();
        assert!(verifying
            .verify(b"payload", &Signature::from_bytes(&signature))
            .is_ok());
    }

    #[test]
    fn debug_does_not_leak_the_secret() {
        let keys = KeyPair::from_seed(&[9u8; 32]);
        let rendered = format!("{keys:?}");
        assert!(rendered.contains(&hex::encode(keys.public_key())));
        assert!(!rendered.contains(&hex::encode([9u8; 32])));
    }
}
