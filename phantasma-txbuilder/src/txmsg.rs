//! Carbon transaction helpers
//!
//! Assemble the common `TxMsg` shapes (token creation, series creation,
//! NFT minting), sign them with a wallet key and emit the compact signed
//! layout. The serialize/deserialize pair at the bottom is the boundary the
//! RPC collaborator consumes.

use phantasma_codec::{Bytes32, Bytes64, SmallString, WriteView};
use phantasma_primitives::{
    token::{SeriesInfo, TokenInfo},
    tx::{CallArgs, MintNonFungible, SignedTxMsg, TxBody, TxMsg, TxMsgCall, Witness},
};
use phantasma_wallet::PhantasmaKeys;

use crate::{
    fees::{CreateSeriesFeeOptions, CreateTokenFeeOptions, MintNftFeeOptions},
    Error,
};

/// Module ids of the built-in contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ModuleId {
    Governance = 0,
    Token = 1,
    PhantasmaVm = 2,
    Organization = 3,
    Internal = 0xFFFF_FFFF,
}

/// Method ids of the token module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TokenMethod {
    TransferFungible = 0,
    TransferNonFungible = 1,
    CreateToken = 2,
    MintFungible = 3,
    BurnFungible = 4,
    GetBalance = 5,
    CreateTokenSeries = 6,
    DeleteTokenSeries = 7,
    MintNonFungible = 8,
    BurnNonFungible = 9,
    GetInstances = 10,
    GetNonFungibleInfo = 11,
    GetNonFungibleInfoByRomId = 12,
    GetSeriesInfo = 13,
    GetSeriesInfoByMetaId = 14,
    GetTokenInfo = 15,
    GetTokenInfoBySymbol = 16,
    GetTokenSupply = 17,
    GetSeriesSupply = 18,
    GetTokenIdBySymbol = 19,
    GetBalances = 20,
    CreateMintedTokenSeries = 21,
}

fn token_call(method: TokenMethod, args: Vec<u8>) -> TxBody {
    TxBody::Call(TxMsgCall {
        module_id: ModuleId::Token as u32,
        method_id: method as u32,
        args: CallArgs::Inline(args),
    })
}

/// A `Token.CreateToken` call carrying the serialized token description.
pub fn create_token_tx(
    token_info: &TokenInfo,
    creator: Bytes32,
    fees: &CreateTokenFeeOptions,
    max_data: u64,
    expiry: i64,
) -> Result<TxMsg, Error> {
    let max_gas = fees.max_gas(&token_info.symbol)?;
    Ok(TxMsg {
        expiry,
        max_gas,
        max_data,
        gas_from: creator,
        payload: SmallString::default(),
        body: token_call(TokenMethod::CreateToken, token_info.serialize()),
    })
}

/// A `Token.CreateTokenSeries` call: the token id followed by the series
/// description.
pub fn create_token_series_tx(
    token_id: u64,
    series_info: &SeriesInfo,
    creator: Bytes32,
    fees: &CreateSeriesFeeOptions,
    max_data: u64,
    expiry: i64,
) -> Result<TxMsg, Error> {
    let max_gas = fees.max_gas()?;
    let mut args = WriteView::new();
    args.write_u64(token_id);
    series_info.write(&mut args);
    Ok(TxMsg {
        expiry,
        max_gas,
        max_data,
        gas_from: creator,
        payload: SmallString::default(),
        body: token_call(TokenMethod::CreateTokenSeries, args.into_inner()),
    })
}

/// A direct mint message for one NFT instance.
#[allow(clippy::too_many_arguments)]
pub fn mint_non_fungible_tx(
    token_id: u64,
    series_id: u32,
    sender: Bytes32,
    receiver: Bytes32,
    rom: Vec<u8>,
    ram: Vec<u8>,
    fees: &MintNftFeeOptions,
    max_data: u64,
    expiry: i64,
) -> Result<TxMsg, Error> {
    let max_gas = fees.max_gas()?;
    Ok(TxMsg {
        expiry,
        max_gas,
        max_data,
        gas_from: sender,
        payload: SmallString::default(),
        body: TxBody::MintNonFungible(MintNonFungible {
            token_id,
            to: receiver,
            series_id,
            rom,
            ram,
        }),
    })
}

/// Sign the message with the wallet key as the sole witness and emit the
/// signed layout.
pub fn sign_and_serialize(msg: &TxMsg, keys: &PhantasmaKeys) -> Result<Vec<u8>, Error> {
    let unsigned = msg.serialize()?;
    let signature = keys.sign(&unsigned);

    let mut signature_bytes = [0u8; 64];
    signature_bytes.copy_from_slice(signature.as_ref());
    let mut address = [0u8; 32];
    address.copy_from_slice(keys.public_key().as_ref());

    let signed = SignedTxMsg {
        msg: msg.clone(),
        witnesses: vec![Witness {
            address: Bytes32::new(address),
            signature: Bytes64::new(signature_bytes),
        }],
    };
    Ok(signed.serialize()?)
}

/// The pure serialization function exposed to the RPC collaborator.
pub fn serialize_tx(msg: &TxMsg, keys: &PhantasmaKeys) -> Result<Vec<u8>, Error> {
    sign_and_serialize(msg, keys)
}

/// The inverse boundary function: parse a signed transaction received from
/// the node.
pub fn deserialize_tx(bytes: &[u8]) -> Result<SignedTxMsg, Error> {
    Ok(SignedTxMsg::deserialize(bytes)?)
}
