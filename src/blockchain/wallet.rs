// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet v4r2: state init, address and signed external messages.
//!
//! An external message carries `signature || subwallet_id | valid_until |
//! seqno | op` followed by one `send_mode` byte and internal-message ref per
//! transfer. The state init is attached while the wallet is still
//! undeployed (seqno 0).

use std::sync::Arc;

use base64ct::{Base64, Encoding};
use chrono::Utc;

use super::address::Address;
use super::cell::{comment_cell, from_boc, to_boc, Cell, CellBuilder};
use super::signing::{KeyPair, SignedMessage, WalletContract, WalletFactory};
use super::types::{TransferIntent, TransferPayload, WalletVersion};
use crate::error::TonError;

/// Compiled wallet v4r2 contract code (BoC, base64).
pub const WALLET_V4R2_CODE: &str = concat!(
    "te6cckECFAEAAtQAART/APSkE/S88sgLAQIBIAIDAgFIBAUE+PKDCNcYINMf0x/THwL4I7vyZO1E",
    "0NMf0x/T//QE0VFDuvKhUVG68qIF+QFUEGT5EPKj+AAkpMjLH1JAyx9SMMv/UhD0AMntVPgPAdMH",
    "IcAAn2xRkyDXSpbTB9QC+wDoMOAhwAHjACHAAuMAAcADkTDjDQOkyMsfEssfy/8QERITAubQAdDT",
    "AyFxsJJfBOAi10nBIJJfBOAC0x8hghBwbHVnvSKCEGRzdHK9sJJfBeAD+kAwIPpEAcjKB8v/ydDt",
    "RNCBAUDXIfQEMFyBAQj0Cm+hMbOSXwfgBdM/yCWCEHBsdWe6kjgw4w0DghBkc3RyupJfBuMNBgcC",
    "ASAICQB4AfoA9AQw+CdvIjBQCqEhvvLgUIIQcGx1Z4MesXCAGFAEywUmzxZY+gIZ9ADLaRfLH1Jg",
    "yz8gyYBA+wAGAIpQBIEBCPRZMO1E0IEBQNcgyAHPFvQAye1UAXKwjiOCEGRzdHKDHrFwgBhQBcsF",
    "UAPPFiP6AhPLassfyz/JgED7AJJfA+ICASAKCwBZvSQrb2omhAgKBrkPoCGEcNQICEekk30pkQzm",
    "kD6f+YN4EoAbeBAUiYcVnzGEAgFYDA0AEbjJftRNDXCx+AA9sp37UTQgQFA1yH0BDACyMoHy//J0",
    "AGBAQj0Cm+hMYAIBIA4PABmtznaiaEAga5Drhf/AABmvHfaiaEAQa5DrhY/AAG7SB/oA1NQi+QAF",
    "yMoHFcv/ydB3dIAYyMsFywIizxZQBfoCFMtrEszMyXP7AMhAFIEBCPRR8qcCAHCBAQjXGPoA0z/I",
    "VCBHgQEI9FHyp4IQbm90ZXB0gBjIywXLAlAGzxZQBPoCFMtqEssfyz/Jc/sAAgBsgQEI1xj6ANM/",
    "MFIkgQEI9Fnyp4IQZHN0cnB0gBjIywXLAlAFzxZQA/oCE8tqyx8Syz/Jc/sAAAr0AMntVGliJeU=",
);

/// Subwallet id of the first wallet on workchain 0; other workchains add
/// their id.
pub const DEFAULT_WALLET_ID: u32 = 698_983_191;

/// Seconds an external message stays valid once signed.
pub const MESSAGE_TTL_SECS: i64 = 60;

/// Messages a single v4 external message can carry.
pub const MAX_MESSAGES: usize = 4;

const OP_SIMPLE_SEND: u8 = 0;
const OP_JETTON_TRANSFER: u32 = 0x0f8a_7ea5;
const OP_NFT_TRANSFER: u32 = 0x5fcc_3d14;

/// Wallet v4r2 for one public key on one workchain.
pub struct WalletV4R2 {
    public_key: [u8; 32],
    address: Address,
    wallet_id: u32,
    state_init: Arc<Cell>,
}

impl WalletV4R2 {
    pub fn new(public_key: [u8; 32], workchain: i32) -> Result<Self, TonError> {
        let code_boc = Base64::decode_vec(WALLET_V4R2_CODE)
            .map_err(|e| TonError::CellEncoding(format!("wallet code: {e}")))?;
        let code = from_boc(&code_boc)?;
        let wallet_id = DEFAULT_WALLET_ID.wrapping_add(workchain as u32);

        let mut data = CellBuilder::new();
        data.store_uint(32, 0)?
            .store_uint(32, u128::from(wallet_id))?
            .store_bytes(&public_key)?
            // empty plugin dictionary
            .store_bit(false)?;

        // split_depth, special, code, data, library
        let mut state_init = CellBuilder::new();
        state_init
            .store_bit(false)?
            .store_bit(false)?
            .store_maybe_ref(Some(code))?
            .store_maybe_ref(Some(data.build()))?
            .store_bit(false)?;
        let state_init = state_init.build();

        Ok(Self {
            public_key,
            address: Address::new(workchain, *state_init.hash()),
            wallet_id,
            state_init,
        })
    }

    pub fn wallet_id(&self) -> u32 {
        self.wallet_id
    }

    pub fn state_init(&self) -> &Arc<Cell> {
        &self.state_init
    }

    /// Build and sign an external message that expires at `valid_until`.
    pub fn signed_message_until(
        &self,
        intents: &[TransferIntent],
        seqno: u32,
        valid_until: u32,
        keys: &KeyPair,
    ) -> Result<SignedMessage, TonError> {
        if intents.len() > MAX_MESSAGES {
            return Err(TonError::Signing(format!(
                "wallet v4r2 sends at most {MAX_MESSAGES} messages, got {}",
                intents.len()
            )));
        }

        let mut unsigned = CellBuilder::new();
        unsigned
            .store_uint(32, u128::from(self.wallet_id))?
            .store_uint(32, u128::from(valid_until))?
            .store_uint(32, u128::from(seqno))?
            .store_uint(8, u128::from(OP_SIMPLE_SEND))?;
        for intent in intents {
            unsigned
                .store_uint(8, u128::from(intent.send_mode().bits()))?
                .store_ref(internal_message(intent)?)?;
        }
        let unsigned = unsigned.build();

        let signature = keys.sign(unsigned.hash());
        let mut body = CellBuilder::new();
        body.store_bytes(&signature)?.store_cell(&unsigned)?;

        let mut external = CellBuilder::new();
        external
            .store_uint(2, 0b10)?
            .store_address_none()?
            .store_address(&self.address)?
            .store_coins(0)?;
        if seqno == 0 {
            external.store_bit(true)?.store_bit(true)?.store_ref(self.state_init.clone())?;
        } else {
            external.store_bit(false)?;
        }
        external.store_bit(true)?.store_ref(body.build())?;
        let external = external.build();

        Ok(SignedMessage {
            boc: to_boc(&external),
            hash: *external.hash(),
        })
    }
}

impl WalletContract for WalletV4R2 {
    fn address(&self) -> Address {
        self.address
    }

    fn version(&self) -> WalletVersion {
        WalletVersion::V4R2
    }

    fn build_signed_message(
        &self,
        intents: &[TransferIntent],
        seqno: u32,
        keys: &KeyPair,
    ) -> Result<SignedMessage, TonError> {
        if keys.public_key() != self.public_key {
            return Err(TonError::Signing(
                "key pair does not control this wallet".to_string(),
            ));
        }
        // The deploying message must stay valid until it lands.
        let valid_until = if seqno == 0 {
            u32::MAX
        } else {
            u32::try_from(Utc::now().timestamp() + MESSAGE_TTL_SECS).unwrap_or(u32::MAX)
        };
        self.signed_message_until(intents, seqno, valid_until, keys)
    }
}

/// Internal message carrying one intent. Source is left empty for the
/// wallet to fill in.
fn internal_message(intent: &TransferIntent) -> Result<Arc<Cell>, TonError> {
    let mut message = CellBuilder::new();
    message
        .store_bit(false)? // int_msg_info$0
        .store_bit(true)? // ihr_disabled
        .store_bit(intent.bounce())?
        .store_bit(false)? // bounced
        .store_address_none()?
        .store_address(intent.destination())?
        .store_coins(intent.value())?
        .store_bit(false)? // extra currencies
        .store_coins(0)? // ihr_fee
        .store_coins(0)? // fwd_fee
        .store_uint(64, 0)? // created_lt
        .store_uint(32, 0)? // created_at
        .store_bit(false)?; // state init
    message.store_maybe_ref(payload_body(intent.payload())?)?;
    Ok(message.build())
}

/// Message body for a payload; `None` for an empty body.
pub fn payload_body(payload: &TransferPayload) -> Result<Option<Arc<Cell>>, TonError> {
    let body = match payload {
        TransferPayload::Empty => return Ok(None),
        TransferPayload::Comment(text) => comment_cell(text)?,
        TransferPayload::JettonTransfer {
            query_id,
            amount,
            destination,
            response_destination,
            forward_amount,
            forward_comment,
        } => {
            let mut body = CellBuilder::new();
            body.store_uint(32, u128::from(OP_JETTON_TRANSFER))?
                .store_uint(64, u128::from(*query_id))?
                .store_coins(*amount)?
                .store_address(destination)?
                .store_address(response_destination)?
                .store_maybe_ref(None)? // custom payload
                .store_coins(*forward_amount)?;
            store_forward_payload(&mut body, forward_comment.as_deref())?;
            body.build()
        }
        TransferPayload::NftTransfer {
            query_id,
            new_owner,
            response_destination,
            forward_amount,
            forward_comment,
        } => {
            let mut body = CellBuilder::new();
            body.store_uint(32, u128::from(OP_NFT_TRANSFER))?
                .store_uint(64, u128::from(*query_id))?
                .store_address(new_owner)?
                .store_address(response_destination)?
                .store_maybe_ref(None)? // custom payload
                .store_coins(*forward_amount)?;
            store_forward_payload(&mut body, forward_comment.as_deref())?;
            body.build()
        }
    };
    Ok(Some(body))
}

/// `Either Cell ^Cell`: empty inline, or the comment as a ref.
fn store_forward_payload(body: &mut CellBuilder, comment: Option<&str>) -> Result<(), TonError> {
    match comment {
        Some(text) => body.store_bit(true)?.store_ref(comment_cell(text)?)?,
        None => body.store_bit(false)?,
    };
    Ok(())
}

/// Creates wallet contracts from compiled code shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonWalletFactory;

impl WalletFactory for TonWalletFactory {
    fn create(
        &self,
        public_key: [u8; 32],
        version: WalletVersion,
        workchain: i32,
    ) -> Result<Box<dyn WalletContract>, TonError> {
        match version {
            WalletVersion::V4R2 => Ok(Box::new(WalletV4R2::new(public_key, workchain)?)),
            other => Err(TonError::Signing(format!(
                "signing with {other:?} wallets is not supported"
            ))),
        }
    }
}
