use crate::error::ReporterError;
use bech32::{ToBase32, Variant};
use cosmwasm_std::{Addr, Binary};
use odin_oracle::verification::pubkey_to_canonical;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Key a reporter signs verification messages with.
pub trait Signer {
    /// Compressed secp256k1 public key.
    fn public_key(&self) -> Binary;

    /// Compact 64-byte signature of a 32-byte digest.
    fn sign(&self, digest: &[u8; 32]) -> Result<Binary, ReporterError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secp256k1Signer {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Secp256k1Signer {
    pub fn from_slice(secret: &[u8]) -> Result<Self, ReporterError> {
        let secret_key = SecretKey::from_slice(secret)
            .map_err(|err| ReporterError::signing(format!("invalid secret key: {err}")))?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret_key);
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    pub fn from_hex(secret: &str) -> Result<Self, ReporterError> {
        let bytes = hex::decode(secret)
            .map_err(|err| ReporterError::signing(format!("invalid secret key hex: {err}")))?;
        Self::from_slice(&bytes)
    }

    /// Bech32 account address of this key under `prefix`.
    pub fn address(&self, prefix: &str) -> Result<Addr, ReporterError> {
        let canonical = pubkey_to_canonical(&self.public_key.serialize());
        let address = bech32::encode(prefix, canonical.as_slice().to_base32(), Variant::Bech32)
            .map_err(|err| ReporterError::signing(format!("invalid address prefix: {err}")))?;
        Ok(Addr::unchecked(address))
    }
}

impl Signer for Secp256k1Signer {
    fn public_key(&self) -> Binary {
        Binary::from(self.public_key.serialize().to_vec())
    }

    fn sign(&self, digest: &[u8; 32]) -> Result<Binary, ReporterError> {
        let signature = Secp256k1::signing_only()
            .sign_ecdsa(&Message::from_digest(*digest), &self.secret_key);
        Ok(Binary::from(signature.serialize_compact().to_vec()))
    }
}
