//! Fixed-layout chain and gas configuration records

use phantasma_codec::{ReadView, WriteView};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainConfig {
    pub version: u8,
    pub reserved1: u8,
    pub reserved2: u8,
    pub reserved3: u8,
    pub allowed_tx_types: u32,
    pub expiry_window: u32,
    pub block_rate_target: u32,
}

impl ChainConfig {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u8(self.version);
        w.write_u8(self.reserved1);
        w.write_u8(self.reserved2);
        w.write_u8(self.reserved3);
        w.write_u32(self.allowed_tx_types);
        w.write_u32(self.expiry_window);
        w.write_u32(self.block_rate_target);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let out = Self {
            version: r.read_u8(),
            reserved1: r.read_u8(),
            reserved2: r.read_u8(),
            reserved3: r.read_u8(),
            allowed_tx_types: r.read_u32(),
            expiry_window: r.read_u32(),
            block_rate_target: r.read_u32(),
        };
        r.result()?;
        Ok(out)
    }
}

/// The fee schedule a node enforces; mirrored here so builders can compute
/// `max_gas` offers offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasConfig {
    pub version: u8,
    pub max_name_length: u8,
    pub max_token_symbol_length: u8,
    pub fee_shift: u8,
    pub max_structure_size: u32,
    pub fee_multiplier: u64,
    pub gas_token_id: u64,
    pub data_token_id: u64,
    pub minimum_gas_offer: u64,
    pub data_escrow_per_row: u64,
    pub gas_fee_transfer: u64,
    pub gas_fee_query: u64,
    pub gas_fee_create_token_base: u64,
    pub gas_fee_create_token_symbol: u64,
    pub gas_fee_create_token_series: u64,
    pub gas_fee_per_byte: u64,
    pub gas_fee_register_name: u64,
    pub gas_burn_ratio_mul: u64,
    pub gas_burn_ratio_shift: u8,
}

impl GasConfig {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u8(self.version);
        w.write_u8(self.max_name_length);
        w.write_u8(self.max_token_symbol_length);
        w.write_u8(self.fee_shift);
        w.write_u32(self.max_structure_size);
        w.write_u64(self.fee_multiplier);
        w.write_u64(self.gas_token_id);
        w.write_u64(self.data_token_id);
        w.write_u64(self.minimum_gas_offer);
        w.write_u64(self.data_escrow_per_row);
        w.write_u64(self.gas_fee_transfer);
        w.write_u64(self.gas_fee_query);
        w.write_u64(self.gas_fee_create_token_base);
        w.write_u64(self.gas_fee_create_token_symbol);
        w.write_u64(self.gas_fee_create_token_series);
        w.write_u64(self.gas_fee_per_byte);
        w.write_u64(self.gas_fee_register_name);
        w.write_u64(self.gas_burn_ratio_mul);
        w.write_u8(self.gas_burn_ratio_shift);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let out = Self {
            version: r.read_u8(),
            max_name_length: r.read_u8(),
            max_token_symbol_length: r.read_u8(),
            fee_shift: r.read_u8(),
            max_structure_size: r.read_u32(),
            fee_multiplier: r.read_u64(),
            gas_token_id: r.read_u64(),
            data_token_id: r.read_u64(),
            minimum_gas_offer: r.read_u64(),
            data_escrow_per_row: r.read_u64(),
            gas_fee_transfer: r.read_u64(),
            gas_fee_query: r.read_u64(),
            gas_fee_create_token_base: r.read_u64(),
            gas_fee_create_token_symbol: r.read_u64(),
            gas_fee_create_token_series: r.read_u64(),
            gas_fee_per_byte: r.read_u64(),
            gas_fee_register_name: r.read_u64(),
            gas_burn_ratio_mul: r.read_u64(),
            gas_burn_ratio_shift: r.read_u8(),
        };
        r.result()?;
        Ok(out)
    }
}
