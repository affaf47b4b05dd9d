//! The transport-free RPC boundary
//!
//! The core never speaks HTTP. It consumes exactly two capabilities from
//! whatever JSON-RPC client the host wires in, and hands it hex-encoded
//! bytes produced by [`crate::txmsg::serialize_tx`]. Node-reported strings
//! are surfaced verbatim so users can diagnose gas or witness problems.

use phantasma_primitives::tx::SignedTxMsg;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Where a submitted transaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    Pending,
    Confirmed,
    Rejected,
}

/// The node's verdict on a transaction, strings passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxConfirmation {
    pub state: ConfirmationState,
    pub result: String,
    pub debug_comment: String,
}

/// The two capabilities the core consumes from the RPC collaborator.
pub trait RpcClient {
    /// Submit a hex-encoded signed transaction, returning the tx hash.
    fn send_raw_transaction(&self, hex_tx: &str) -> Result<String, Error>;

    /// Query the confirmation state of a previously submitted hash.
    fn check_confirmation(&self, tx_hash: &str) -> Result<TxConfirmation, Error>;
}

/// Hex-encode and submit an already-signed message.
pub fn send_transaction(client: &impl RpcClient, signed: &SignedTxMsg) -> Result<String, Error> {
    let bytes = signed.serialize()?;
    let encoded = hex::encode(&bytes);
    log::debug!("submitting {} byte transaction", bytes.len());
    client.send_raw_transaction(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phantasma_codec::{Bytes32, Bytes64, SmallString};
    use phantasma_primitives::tx::{TransferFungible, TxBody, TxMsg, Witness};
    use std::cell::RefCell;

    struct FakeClient {
        sent: RefCell<Vec<String>>,
    }

    impl RpcClient for FakeClient {
        fn send_raw_transaction(&self, hex_tx: &str) -> Result<String, Error> {
            self.sent.borrow_mut().push(hex_tx.to_string());
            Ok("deadbeef".to_string())
        }

        fn check_confirmation(&self, _tx_hash: &str) -> Result<TxConfirmation, Error> {
            Ok(TxConfirmation {
                state: ConfirmationState::Rejected,
                result: "out of gas".to_string(),
                debug_comment: "offered 1, needed 2".to_string(),
            })
        }
    }

    #[test]
    fn sends_hex_and_surfaces_node_strings() {
        let client = FakeClient {
            sent: RefCell::new(Vec::new()),
        };
        let signed = SignedTxMsg {
            msg: TxMsg {
                expiry: 0,
                max_gas: 1,
                max_data: 0,
                gas_from: Bytes32::default(),
                payload: SmallString::default(),
                body: TxBody::TransferFungible(TransferFungible::default()),
            },
            witnesses: vec![Witness {
                address: Bytes32::default(),
                signature: Bytes64::default(),
            }],
        };

        let hash = send_transaction(&client, &signed).unwrap();
        assert_eq!(hash, "deadbeef");
        let sent = client.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].chars().all(|c| c.is_ascii_hexdigit()));

        let confirmation = client.check_confirmation(&hash).unwrap();
        assert_eq!(confirmation.state, ConfirmationState::Rejected);
        assert_eq!(confirmation.result, "out of gas");
        assert_eq!(confirmation.debug_comment, "offered 1, needed 2");
    }
}
