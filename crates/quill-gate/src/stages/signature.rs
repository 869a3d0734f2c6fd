use quill_crypto::verify_signed_by;

use crate::error::GuardError;
use crate::stage::{AccessRequest, Denial, GuardStage, StageDecision};

/// Signature verification stage.
///
/// Checks that the request is signed by its stated signer and that the
/// signer is the identity the request acts for.
pub struct SignatureStage;

impl GuardStage for SignatureStage {
    fn name(&self) -> &str {
        "signature"
    }

    fn evaluate(&self, request: &AccessRequest) -> Result<StageDecision, GuardError> {
        let Some(signature) = &request.signature else {
            return Ok(StageDecision::Deny(Denial::MissingSignature));
        };
        if verify_signed_by(&request.signer, &request.message, signature).is_err() {
            return Ok(StageDecision::Deny(Denial::InvalidSignature));
        }

        if let Some(authority) = &request.claimed_authority {
            if *authority != request.signer {
                return Ok(StageDecision::Deny(Denial::SignerMismatch));
            }
        }

        Ok(StageDecision::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Action;
    use quill_crypto::SigningKey;
    use quill_types::Identity;

    fn signed(key: &SigningKey, message: &[u8]) -> AccessRequest {
        AccessRequest {
            action: Action::CreateNote,
            signer: key.identity(),
            signature: Some(key.sign(message)),
            message: message.to_vec(),
            claimed_authority: Some(key.identity()),
            target: None,
        }
    }

    #[test]
    fn valid_signature_passes() {
        let key = SigningKey::generate();
        let decision = SignatureStage.evaluate(&signed(&key, b"req")).unwrap();
        assert!(decision.is_pass());
    }

    #[test]
    fn missing_signature_is_denied() {
        let key = SigningKey::generate();
        let mut request = signed(&key, b"req");
        request.signature = None;
        assert_eq!(
            SignatureStage.evaluate(&request).unwrap(),
            StageDecision::Deny(Denial::MissingSignature)
        );
    }

    #[test]
    fn tampered_message_is_denied() {
        let key = SigningKey::generate();
        let mut request = signed(&key, b"req");
        request.message = b"other".to_vec();
        assert_eq!(
            SignatureStage.evaluate(&request).unwrap(),
            StageDecision::Deny(Denial::InvalidSignature)
        );
    }

    #[test]
    fn signature_from_another_key_is_denied() {
        let key = SigningKey::generate();
        let impostor = SigningKey::generate();
        let mut request = signed(&key, b"req");
        request.signature = Some(impostor.sign(b"req"));
        assert_eq!(
            SignatureStage.evaluate(&request).unwrap(),
            StageDecision::Deny(Denial::InvalidSignature)
        );
    }

    #[test]
    fn claimed_authority_must_match_signer() {
        let key = SigningKey::generate();
        let mut request = signed(&key, b"req");
        request.claimed_authority = Some(Identity::from_bytes([3; 32]));
        assert_eq!(
            SignatureStage.evaluate(&request).unwrap(),
            StageDecision::Deny(Denial::SignerMismatch)
        );
    }

    #[test]
    fn unsigned_request_is_denied_even_when_signer_matches_authority() {
        let victim = SigningKey::generate();
        let request = AccessRequest {
            action: Action::DeleteNote,
            signer: victim.identity(),
            signature: None,
            message: b"delete".to_vec(),
            claimed_authority: Some(victim.identity()),
            target: None,
        };
        assert_eq!(
            SignatureStage.evaluate(&request).unwrap(),
            StageDecision::Deny(Denial::MissingSignature)
        );
    }
}
