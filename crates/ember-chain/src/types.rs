use serde::{Deserialize, Serialize};

/// What is being transferred: native coin or a token.
///
/// The token-only fields exist only on the `Token` variant, so a coin
/// transfer cannot carry stray token fields and the serializer never has to
/// prune empty ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransferKind {
    Coin,
    Token {
        token_id_string: String,
        token_metadata_uri: String,
        token_nonce_bytes: Vec<u8>,
    },
}

impl TransferKind {
    pub fn is_token(&self) -> bool {
        matches!(self, TransferKind::Token { .. })
    }
}

/// A server-authoritative transaction template, as returned by the prepare
/// endpoint. Immutable once received; in particular `nonce_bytes` and
/// `chain_id` are never invented or altered client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTemplate {
    pub chain_id: u64,
    pub from: String,
    pub to: String,
    pub nonce_bytes: Vec<u8>,
    pub value: u64,
    #[serde(default)]
    pub data: String,
    #[serde(flatten)]
    pub kind: TransferKind,
}

/// A template plus its recoverable signature, ready for submission.
///
/// Signature components are raw big-endian byte vectors, never re-encoded
/// hex strings: `r_bytes` and `s_bytes` are 32 bytes each, `v_bytes` is a
/// single element holding `SIGNATURE_V_BASE + recovery parity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub template: TransactionTemplate,
    pub v_bytes: Vec<u8>,
    pub r_bytes: Vec<u8>,
    pub s_bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin_template() -> TransactionTemplate {
        TransactionTemplate {
            chain_id: 1,
            from: "0x1111111111111111111111111111111111111111".into(),
            to: "0x2222222222222222222222222222222222222222".into(),
            nonce_bytes: vec![1, 2, 3],
            value: 100,
            data: String::new(),
            kind: TransferKind::Coin,
        }
    }

    #[test]
    fn coin_template_has_no_token_fields_on_the_wire() {
        let json = serde_json::to_string(&coin_template()).unwrap();
        assert!(json.contains(r#""type":"coin""#));
        assert!(!json.contains("token_id_string"));
        assert!(!json.contains("token_metadata_uri"));
        assert!(!json.contains("token_nonce_bytes"));
    }

    #[test]
    fn token_template_roundtrips_through_flat_json() {
        let template = TransactionTemplate {
            kind: TransferKind::Token {
                token_id_string: "42".into(),
                token_metadata_uri: "ipfs://meta".into(),
                token_nonce_bytes: vec![9, 8],
            },
            ..coin_template()
        };
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains(r#""type":"token""#));
        assert!(json.contains(r#""token_id_string":"42""#));

        let back: TransactionTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn template_deserializes_from_server_shaped_json() {
        // Flat object with the tag inline, exactly as the prepare endpoint
        // returns it.
        let json = r#"{
            "chain_id": 7,
            "from": "0xAA00000000000000000000000000000000000001",
            "to": "0xBB00000000000000000000000000000000000002",
            "nonce_bytes": [0, 255],
            "value": 5,
            "data": "hello",
            "type": "coin"
        }"#;
        let template: TransactionTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.chain_id, 7);
        assert_eq!(template.nonce_bytes, vec![0, 255]);
        assert_eq!(template.kind, TransferKind::Coin);
    }

    #[test]
    fn missing_data_field_defaults_to_empty() {
        let json = r#"{
            "chain_id": 1,
            "from": "0xAA00000000000000000000000000000000000001",
            "to": "0xBB00000000000000000000000000000000000002",
            "nonce_bytes": [],
            "value": 0,
            "type": "coin"
        }"#;
        let template: TransactionTemplate = serde_json::from_str(json).unwrap();
        assert!(template.data.is_empty());
    }

    #[test]
    fn signed_transaction_serializes_flat() {
        let signed = SignedTransaction {
            template: coin_template(),
            v_bytes: vec![73],
            r_bytes: vec![0xAA; 32],
            s_bytes: vec![0xBB; 32],
        };
        let json = serde_json::to_string(&signed).unwrap();
        // Template fields sit at the top level next to the signature arrays.
        assert!(json.contains(r#""chain_id":1"#));
        assert!(json.contains(r#""v_bytes":[73]"#));

        let back: SignedTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signed);
    }
}
