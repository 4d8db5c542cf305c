use crate::error::ContractError;
use crate::state::{ExternalId, RequestId};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_vec, Addr, Api, CanonicalAddr, StdError, StdResult};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Payload a reporter signs to prove it serves `validator` for one raw request.
///
/// The sign bytes are the compact JSON encoding of this struct.
/// Field declaration order is the key order on the wire and must stay lexicographic:
/// `chain_id`, `external_id`, `request_id`, `validator`.
#[cw_serde]
pub struct VerificationMessage {
    pub chain_id: String,
    pub external_id: ExternalId,
    pub request_id: RequestId,
    pub validator: Addr,
}

impl VerificationMessage {
    pub fn new(
        chain_id: impl Into<String>,
        validator: Addr,
        request_id: RequestId,
        external_id: ExternalId,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            external_id,
            request_id,
            validator,
        }
    }

    pub fn sign_bytes(&self) -> StdResult<Vec<u8>> {
        to_json_vec(self)
    }

    /// sha256 of [VerificationMessage::sign_bytes], the digest that is signed.
    pub fn sign_digest(&self) -> StdResult<[u8; 32]> {
        Ok(Sha256::digest(self.sign_bytes()?).into())
    }

    /// Verifies a compact secp256k1 `signature` of this message by `pubkey`.
    pub fn verify(
        &self,
        api: &dyn Api,
        signature: &[u8],
        pubkey: &[u8],
    ) -> Result<bool, ContractError> {
        let digest = self.sign_digest()?;
        let valid = api
            .secp256k1_verify(&digest, signature, pubkey)
            .map_err(StdError::from)?;
        Ok(valid)
    }
}

/// Account address bytes of a secp256k1 public key: `ripemd160(sha256(pubkey))`.
pub fn pubkey_to_canonical(pubkey: &[u8]) -> CanonicalAddr {
    let sha = Sha256::digest(pubkey);
    let ripe = Ripemd160::digest(sha);
    CanonicalAddr::from(ripe.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockApi;
    use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

    fn sign(secret: &SecretKey, digest: [u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(&digest).unwrap();
        secp.sign_ecdsa(&message, secret)
            .serialize_compact()
            .to_vec()
    }

    #[test]
    fn test_sign_bytes() {
        let msg = VerificationMessage::new(
            "bandchain",
            Addr::unchecked("odinvaloper17rprjgtj0krfw3wyl9creueej6ca9dc4a65n80"),
            1,
            1,
        );
        let expected = r#"{"chain_id":"bandchain","external_id":1,"request_id":1,"validator":"odinvaloper17rprjgtj0krfw3wyl9creueej6ca9dc4a65n80"}"#;
        assert_eq!(msg.sign_bytes().unwrap(), expected.as_bytes());
    }

    #[test]
    fn test_verify() {
        let api = MockApi::default();
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let pubkey = PublicKey::from_secret_key(&secp, &secret).serialize();

        let msg = VerificationMessage::new("odin", api.addr_make("validator"), 7, 3);
        let signature = sign(&secret, msg.sign_digest().unwrap());
        assert!(msg.verify(&api, &signature, &pubkey).unwrap());

        // any field change invalidates the signature
        let other = VerificationMessage::new("odin", api.addr_make("validator"), 7, 4);
        assert!(!other.verify(&api, &signature, &pubkey).unwrap());
    }

    #[test]
    fn test_pubkey_to_canonical() {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&[0x42; 32]).unwrap();
        let pubkey = PublicKey::from_secret_key(&secp, &secret).serialize();

        let canonical = pubkey_to_canonical(&pubkey);
        assert_eq!(canonical.len(), 20);
        assert_eq!(canonical, pubkey_to_canonical(&pubkey));
    }
}
