//! The Carbon transaction message
//!
//! A `TxMsg` is a fixed header (type, expiry, gas and data budgets, gas
//! payer, payload tag) followed by a variant body selected by the type
//! byte; there is no variant length prefix. The signed form appends a
//! witness region whose shape depends on the variant: single-signer
//! messages carry one bare signature (the address is implicitly the gas
//! payer), gas-payer messages carry two, the generic call-style messages
//! carry an explicit `(address, signature)` list, and the raw legacy
//! passthrough carries none at all.

use phantasma_codec::{
    carbon::{
        read_byte_array, read_bytes_n, read_count, read_small_string, write_byte_array,
        write_bytes_n, write_small_string,
    },
    Bytes32, Bytes64, ReadView, SmallString, WriteView,
};
use phantasma_math::{read_intx, write_intx, IntX};

use crate::Error;

/// An address plus the signature it produced over the unsigned message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness {
    pub address: Bytes32,
    pub signature: Bytes64,
}

/// A contract call into a module, by numeric module and method id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxMsgCall {
    pub module_id: u32,
    pub method_id: u32,
    pub args: CallArgs,
}

/// The two mutually exclusive argument encodings of [`TxMsgCall`]. On the
/// wire the next `i32` disambiguates: negative means the sections form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgs {
    Inline(Vec<u8>),
    Sections(Vec<CallSection>),
}

impl Default for CallArgs {
    fn default() -> Self {
        CallArgs::Inline(Vec::new())
    }
}

/// One section of the sections form: either a negative register offset or
/// an inline argument blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSection {
    Register(i32),
    Args(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferFungible {
    pub to: Bytes32,
    pub token_id: u64,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferFungibleGasPayer {
    pub to: Bytes32,
    pub from: Bytes32,
    pub token_id: u64,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferNonFungibleSingle {
    pub to: Bytes32,
    pub token_id: u64,
    pub instance_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferNonFungibleSingleGasPayer {
    pub to: Bytes32,
    pub from: Bytes32,
    pub token_id: u64,
    pub instance_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferNonFungibleMulti {
    pub to: Bytes32,
    pub token_id: u64,
    pub instance_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferNonFungibleMultiGasPayer {
    pub to: Bytes32,
    pub from: Bytes32,
    pub token_id: u64,
    pub instance_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MintFungible {
    pub token_id: u64,
    pub to: Bytes32,
    pub amount: IntX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurnFungible {
    pub token_id: u64,
    pub amount: IntX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurnFungibleGasPayer {
    pub token_id: u64,
    pub from: Bytes32,
    pub amount: IntX,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MintNonFungible {
    pub token_id: u64,
    pub to: Bytes32,
    pub series_id: u32,
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurnNonFungible {
    pub token_id: u64,
    pub instance_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurnNonFungibleGasPayer {
    pub token_id: u64,
    pub from: Bytes32,
    pub instance_id: u64,
}

/// An atomic batch of transfers, mints and burns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxMsgTrade {
    pub transfer_fungible: Vec<TransferFungibleGasPayer>,
    pub transfer_non_fungible: Vec<TransferNonFungibleSingleGasPayer>,
    pub mint_fungible: Vec<MintFungible>,
    pub burn_fungible: Vec<BurnFungibleGasPayer>,
    pub mint_non_fungible: Vec<MintNonFungible>,
    pub burn_non_fungible: Vec<BurnNonFungibleGasPayer>,
}

/// A legacy-format script wrapped in a Carbon message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxMsgPhantasma {
    pub nexus: SmallString,
    pub chain: SmallString,
    pub script: Vec<u8>,
}

/// An already-signed legacy transaction blob carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxMsgPhantasmaRaw {
    pub transaction: Vec<u8>,
}

/// The 17 transaction variants. The discriminant is the on-wire type byte.
#[derive(Debug, Clone, PartialEq)]
pub enum TxBody {
    Call(TxMsgCall),
    CallMulti(Vec<TxMsgCall>),
    Trade(TxMsgTrade),
    TransferFungible(TransferFungible),
    TransferFungibleGasPayer(TransferFungibleGasPayer),
    TransferNonFungibleSingle(TransferNonFungibleSingle),
    TransferNonFungibleSingleGasPayer(TransferNonFungibleSingleGasPayer),
    TransferNonFungibleMulti(TransferNonFungibleMulti),
    TransferNonFungibleMultiGasPayer(TransferNonFungibleMultiGasPayer),
    MintFungible(MintFungible),
    BurnFungible(BurnFungible),
    BurnFungibleGasPayer(BurnFungibleGasPayer),
    MintNonFungible(MintNonFungible),
    BurnNonFungible(BurnNonFungible),
    BurnNonFungibleGasPayer(BurnNonFungibleGasPayer),
    Phantasma(TxMsgPhantasma),
    PhantasmaRaw(TxMsgPhantasmaRaw),
}

impl TxBody {
    pub fn type_code(&self) -> u8 {
        match self {
            TxBody::Call(_) => 0,
            TxBody::CallMulti(_) => 1,
            TxBody::Trade(_) => 2,
            TxBody::TransferFungible(_) => 3,
            TxBody::TransferFungibleGasPayer(_) => 4,
            TxBody::TransferNonFungibleSingle(_) => 5,
            TxBody::TransferNonFungibleSingleGasPayer(_) => 6,
            TxBody::TransferNonFungibleMulti(_) => 7,
            TxBody::TransferNonFungibleMultiGasPayer(_) => 8,
            TxBody::MintFungible(_) => 9,
            TxBody::BurnFungible(_) => 10,
            TxBody::BurnFungibleGasPayer(_) => 11,
            TxBody::MintNonFungible(_) => 12,
            TxBody::BurnNonFungible(_) => 13,
            TxBody::BurnNonFungibleGasPayer(_) => 14,
            TxBody::Phantasma(_) => 15,
            TxBody::PhantasmaRaw(_) => 16,
        }
    }

    /// The second signer of a gas-payer variant; `None` elsewhere.
    fn gas_payer_source(&self) -> Option<Bytes32> {
        match self {
            TxBody::TransferFungibleGasPayer(b) => Some(b.from),
            TxBody::TransferNonFungibleSingleGasPayer(b) => Some(b.from),
            TxBody::TransferNonFungibleMultiGasPayer(b) => Some(b.from),
            TxBody::BurnFungibleGasPayer(b) => Some(b.from),
            TxBody::BurnNonFungibleGasPayer(b) => Some(b.from),
            _ => None,
        }
    }

    fn is_single_witness(&self) -> bool {
        matches!(
            self,
            TxBody::TransferFungible(_)
                | TxBody::TransferNonFungibleSingle(_)
                | TxBody::TransferNonFungibleMulti(_)
                | TxBody::MintFungible(_)
                | TxBody::BurnFungible(_)
                | TxBody::MintNonFungible(_)
                | TxBody::BurnNonFungible(_)
        )
    }

    fn is_multi_witness(&self) -> bool {
        matches!(
            self,
            TxBody::Call(_) | TxBody::CallMulti(_) | TxBody::Trade(_) | TxBody::Phantasma(_)
        )
    }
}

/* Per-variant bodies ****************************************************** */

fn write_u64_list(w: &mut WriteView, items: &[u64]) {
    w.write_i32(items.len() as i32);
    for v in items {
        w.write_u64(*v);
    }
}

fn read_u64_list(r: &mut ReadView) -> Result<Vec<u64>, Error> {
    let count = read_count(r)?;
    let mut out = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        out.push(r.read_u64());
    }
    r.result()?;
    Ok(out)
}

impl TxMsgCall {
    pub fn write(&self, w: &mut WriteView) -> Result<(), Error> {
        w.write_u32(self.module_id);
        w.write_u32(self.method_id);
        match &self.args {
            CallArgs::Inline(bytes) => write_byte_array(w, bytes),
            CallArgs::Sections(sections) => {
                if sections.is_empty() {
                    return Err(Error::InvalidCallSections);
                }
                w.write_i32(-(sections.len() as i32));
                for section in sections {
                    match section {
                        CallSection::Register(offset) => {
                            if *offset >= 0 {
                                return Err(Error::InvalidCallSections);
                            }
                            w.write_i32(*offset);
                        }
                        CallSection::Args(bytes) => write_byte_array(w, bytes),
                    }
                }
            }
        }
        Ok(())
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let module_id = r.read_u32();
        let method_id = r.read_u32();
        r.result()?;

        // peek the next i32: negative selects the sections form
        let mark = r.mark();
        let discriminator = r.read_i32();
        r.result()?;
        let args = if discriminator >= 0 {
            r.rewind(mark);
            CallArgs::Inline(read_byte_array(r)?)
        } else {
            let count = discriminator
                .checked_neg()
                .ok_or(Error::InvalidCallSections)? as usize;
            let mut sections = Vec::with_capacity(count.min(r.remaining()));
            for _ in 0..count {
                let section_mark = r.mark();
                let value = r.read_i32();
                r.result()?;
                if value >= 0 {
                    r.rewind(section_mark);
                    sections.push(CallSection::Args(read_byte_array(r)?));
                } else {
                    sections.push(CallSection::Register(value));
                }
            }
            CallArgs::Sections(sections)
        };

        Ok(Self {
            module_id,
            method_id,
            args,
        })
    }
}

impl TransferFungible {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        w.write_u64(self.token_id);
        w.write_u64(self.amount);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let token_id = r.read_u64();
        let amount = r.read_u64();
        r.result()?;
        Ok(Self {
            to,
            token_id,
            amount,
        })
    }
}

impl TransferFungibleGasPayer {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        write_bytes_n(w, &self.from);
        w.write_u64(self.token_id);
        w.write_u64(self.amount);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let from = read_bytes_n(r)?;
        let token_id = r.read_u64();
        let amount = r.read_u64();
        r.result()?;
        Ok(Self {
            to,
            from,
            token_id,
            amount,
        })
    }
}

impl TransferNonFungibleSingle {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        w.write_u64(self.token_id);
        w.write_u64(self.instance_id);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let token_id = r.read_u64();
        let instance_id = r.read_u64();
        r.result()?;
        Ok(Self {
            to,
            token_id,
            instance_id,
        })
    }
}

impl TransferNonFungibleSingleGasPayer {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        write_bytes_n(w, &self.from);
        w.write_u64(self.token_id);
        w.write_u64(self.instance_id);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let from = read_bytes_n(r)?;
        let token_id = r.read_u64();
        let instance_id = r.read_u64();
        r.result()?;
        Ok(Self {
            to,
            from,
            token_id,
            instance_id,
        })
    }
}

impl TransferNonFungibleMulti {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        w.write_u64(self.token_id);
        write_u64_list(w, &self.instance_ids);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let token_id = r.read_u64();
        r.result()?;
        let instance_ids = read_u64_list(r)?;
        Ok(Self {
            to,
            token_id,
            instance_ids,
        })
    }
}

impl TransferNonFungibleMultiGasPayer {
    fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.to);
        write_bytes_n(w, &self.from);
        w.write_u64(self.token_id);
        write_u64_list(w, &self.instance_ids);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let to = read_bytes_n(r)?;
        let from = read_bytes_n(r)?;
        let token_id = r.read_u64();
        r.result()?;
        let instance_ids = read_u64_list(r)?;
        Ok(Self {
            to,
            from,
            token_id,
            instance_ids,
        })
    }
}

impl MintFungible {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        write_bytes_n(w, &self.to);
        write_intx(w, &self.amount);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let to = read_bytes_n(r)?;
        let amount = read_intx(r)?;
        Ok(Self {
            token_id,
            to,
            amount,
        })
    }
}

impl BurnFungible {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        write_intx(w, &self.amount);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let amount = read_intx(r)?;
        Ok(Self { token_id, amount })
    }
}

impl BurnFungibleGasPayer {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        write_bytes_n(w, &self.from);
        write_intx(w, &self.amount);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let from = read_bytes_n(r)?;
        let amount = read_intx(r)?;
        Ok(Self {
            token_id,
            from,
            amount,
        })
    }
}

impl MintNonFungible {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        write_bytes_n(w, &self.to);
        w.write_u32(self.series_id);
        write_byte_array(w, &self.rom);
        write_byte_array(w, &self.ram);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let to = read_bytes_n(r)?;
        let series_id = r.read_u32();
        r.result()?;
        let rom = read_byte_array(r)?;
        let ram = read_byte_array(r)?;
        Ok(Self {
            token_id,
            to,
            series_id,
            rom,
            ram,
        })
    }
}

impl BurnNonFungible {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        w.write_u64(self.instance_id);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        let instance_id = r.read_u64();
        r.result()?;
        Ok(Self {
            token_id,
            instance_id,
        })
    }
}

impl BurnNonFungibleGasPayer {
    fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        write_bytes_n(w, &self.from);
        w.write_u64(self.instance_id);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let from = read_bytes_n(r)?;
        let instance_id = r.read_u64();
        r.result()?;
        Ok(Self {
            token_id,
            from,
            instance_id,
        })
    }
}

fn write_group<T>(w: &mut WriteView, items: &[T], write: impl Fn(&T, &mut WriteView)) {
    w.write_i32(items.len() as i32);
    for item in items {
        write(item, w);
    }
}

fn read_group<T>(
    r: &mut ReadView,
    read: impl Fn(&mut ReadView) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let count = read_count(r)?;
    let mut out = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        out.push(read(r)?);
    }
    Ok(out)
}

impl TxMsgTrade {
    fn write(&self, w: &mut WriteView) {
        write_group(w, &self.transfer_fungible, TransferFungibleGasPayer::write);
        write_group(
            w,
            &self.transfer_non_fungible,
            TransferNonFungibleSingleGasPayer::write,
        );
        write_group(w, &self.mint_fungible, MintFungible::write);
        write_group(w, &self.burn_fungible, BurnFungibleGasPayer::write);
        write_group(w, &self.mint_non_fungible, MintNonFungible::write);
        write_group(w, &self.burn_non_fungible, BurnNonFungibleGasPayer::write);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        Ok(Self {
            transfer_fungible: read_group(r, TransferFungibleGasPayer::read)?,
            transfer_non_fungible: read_group(r, TransferNonFungibleSingleGasPayer::read)?,
            mint_fungible: read_group(r, MintFungible::read)?,
            burn_fungible: read_group(r, BurnFungibleGasPayer::read)?,
            mint_non_fungible: read_group(r, MintNonFungible::read)?,
            burn_non_fungible: read_group(r, BurnNonFungibleGasPayer::read)?,
        })
    }
}

impl TxMsgPhantasma {
    fn write(&self, w: &mut WriteView) {
        write_small_string(w, &self.nexus);
        write_small_string(w, &self.chain);
        write_byte_array(w, &self.script);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        Ok(Self {
            nexus: read_small_string(r)?,
            chain: read_small_string(r)?,
            script: read_byte_array(r)?,
        })
    }
}

impl TxMsgPhantasmaRaw {
    fn write(&self, w: &mut WriteView) {
        write_byte_array(w, &self.transaction);
    }

    fn read(r: &mut ReadView) -> Result<Self, Error> {
        Ok(Self {
            transaction: read_byte_array(r)?,
        })
    }
}

/* The message itself ****************************************************** */

/// An unsigned Carbon transaction message.
#[derive(Debug, Clone, PartialEq)]
pub struct TxMsg {
    pub expiry: i64,
    pub max_gas: u64,
    pub max_data: u64,
    pub gas_from: Bytes32,
    pub payload: SmallString,
    pub body: TxBody,
}

impl TxMsg {
    pub const NO_MAX_GAS: u64 = u64::MAX;
    pub const NO_MAX_DATA: u64 = u64::MAX;

    pub fn write(&self, w: &mut WriteView) -> Result<(), Error> {
        w.write_u8(self.body.type_code());
        w.write_i64(self.expiry);
        w.write_u64(self.max_gas);
        w.write_u64(self.max_data);
        write_bytes_n(w, &self.gas_from);
        write_small_string(w, &self.payload);

        match &self.body {
            TxBody::Call(b) => b.write(w)?,
            TxBody::CallMulti(calls) => {
                w.write_i32(calls.len() as i32);
                for call in calls {
                    call.write(w)?;
                }
            }
            TxBody::Trade(b) => b.write(w),
            TxBody::TransferFungible(b) => b.write(w),
            TxBody::TransferFungibleGasPayer(b) => b.write(w),
            TxBody::TransferNonFungibleSingle(b) => b.write(w),
            TxBody::TransferNonFungibleSingleGasPayer(b) => b.write(w),
            TxBody::TransferNonFungibleMulti(b) => b.write(w),
            TxBody::TransferNonFungibleMultiGasPayer(b) => b.write(w),
            TxBody::MintFungible(b) => b.write(w),
            TxBody::BurnFungible(b) => b.write(w),
            TxBody::BurnFungibleGasPayer(b) => b.write(w),
            TxBody::MintNonFungible(b) => b.write(w),
            TxBody::BurnNonFungible(b) => b.write(w),
            TxBody::BurnNonFungibleGasPayer(b) => b.write(w),
            TxBody::Phantasma(b) => b.write(w),
            TxBody::PhantasmaRaw(b) => b.write(w),
        }
        Ok(())
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let type_code = r.read_u8();
        let expiry = r.read_i64();
        let max_gas = r.read_u64();
        let max_data = r.read_u64();
        r.result()?;
        let gas_from = read_bytes_n(r)?;
        let payload = read_small_string(r)?;

        let body = match type_code {
            0 => TxBody::Call(TxMsgCall::read(r)?),
            1 => TxBody::CallMulti(read_group(r, TxMsgCall::read)?),
            2 => TxBody::Trade(TxMsgTrade::read(r)?),
            3 => TxBody::TransferFungible(TransferFungible::read(r)?),
            4 => TxBody::TransferFungibleGasPayer(TransferFungibleGasPayer::read(r)?),
            5 => TxBody::TransferNonFungibleSingle(TransferNonFungibleSingle::read(r)?),
            6 => TxBody::TransferNonFungibleSingleGasPayer(
                TransferNonFungibleSingleGasPayer::read(r)?,
            ),
            7 => TxBody::TransferNonFungibleMulti(TransferNonFungibleMulti::read(r)?),
            8 => {
                TxBody::TransferNonFungibleMultiGasPayer(TransferNonFungibleMultiGasPayer::read(r)?)
            }
            9 => TxBody::MintFungible(MintFungible::read(r)?),
            10 => TxBody::BurnFungible(BurnFungible::read(r)?),
            11 => TxBody::BurnFungibleGasPayer(BurnFungibleGasPayer::read(r)?),
            12 => TxBody::MintNonFungible(MintNonFungible::read(r)?),
            13 => TxBody::BurnNonFungible(BurnNonFungible::read(r)?),
            14 => TxBody::BurnNonFungibleGasPayer(BurnNonFungibleGasPayer::read(r)?),
            15 => TxBody::Phantasma(TxMsgPhantasma::read(r)?),
            16 => TxBody::PhantasmaRaw(TxMsgPhantasmaRaw::read(r)?),
            other => {
                r.fail();
                return Err(Error::UnknownTxType(other));
            }
        };

        Ok(Self {
            expiry,
            max_gas,
            max_data,
            gas_from,
            payload,
            body,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let mut w = WriteView::new();
        self.write(&mut w)?;
        Ok(w.into_inner())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut r = ReadView::new(bytes);
        Self::read(&mut r)
    }
}

/// A message plus its witnesses, in the compact per-variant layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTxMsg {
    pub msg: TxMsg,
    pub witnesses: Vec<Witness>,
}

impl SignedTxMsg {
    /// Serialize the signed form. The witness list must already match the
    /// variant's layout; anything else is refused before bytes are written.
    pub fn write(&self, w: &mut WriteView) -> Result<(), Error> {
        self.validate_witnesses()?;
        self.msg.write(w)?;

        if self.msg.body.is_single_witness() {
            write_bytes_n(w, &self.witnesses[0].signature);
        } else if self.msg.body.gas_payer_source().is_some() {
            write_bytes_n(w, &self.witnesses[0].signature);
            write_bytes_n(w, &self.witnesses[1].signature);
        } else if self.msg.body.is_multi_witness() {
            w.write_i32(self.witnesses.len() as i32);
            for witness in &self.witnesses {
                write_bytes_n(w, &witness.address);
                write_bytes_n(w, &witness.signature);
            }
        }
        // PhantasmaRaw: the inner blob is already signed, nothing follows
        Ok(())
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let msg = TxMsg::read(r)?;

        let witnesses = if msg.body.is_single_witness() {
            let signature = read_bytes_n(r)?;
            vec![Witness {
                address: msg.gas_from,
                signature,
            }]
        } else if let Some(source) = msg.body.gas_payer_source() {
            let gas_signature = read_bytes_n(r)?;
            let source_signature = read_bytes_n(r)?;
            vec![
                Witness {
                    address: msg.gas_from,
                    signature: gas_signature,
                },
                Witness {
                    address: source,
                    signature: source_signature,
                },
            ]
        } else if msg.body.is_multi_witness() {
            let count = read_count(r)?;
            let mut witnesses = Vec::with_capacity(count.min(r.remaining()));
            for _ in 0..count {
                let address = read_bytes_n(r)?;
                let signature = read_bytes_n(r)?;
                witnesses.push(Witness { address, signature });
            }
            witnesses
        } else {
            Vec::new()
        };

        Ok(Self { msg, witnesses })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let mut w = WriteView::new();
        self.write(&mut w)?;
        Ok(w.into_inner())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut r = ReadView::new(bytes);
        Self::read(&mut r)
    }

    fn validate_witnesses(&self) -> Result<(), Error> {
        let body = &self.msg.body;
        if body.is_single_witness() {
            if self.witnesses.len() != 1 || self.witnesses[0].address != self.msg.gas_from {
                return Err(Error::InvalidWitness);
            }
        } else if let Some(source) = body.gas_payer_source() {
            if self.witnesses.len() != 2
                || self.witnesses[0].address != self.msg.gas_from
                || self.witnesses[1].address != source
            {
                return Err(Error::InvalidWitness);
            }
        } else if matches!(body, TxBody::PhantasmaRaw(_)) && !self.witnesses.is_empty() {
            return Err(Error::InvalidWitness);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe430896";
    const RECEIVER: &str = "d4c5061b81c4682b27a0cfc6459cd9d7892eb60a43f73dd1060b6c478aa7c3d8";

    fn key(hex_str: &str) -> Bytes32 {
        hex_str.parse().unwrap()
    }

    fn header(body: TxBody, gas_from: Bytes32) -> TxMsg {
        TxMsg {
            expiry: 1759711416000,
            max_gas: 10_000_000,
            max_data: 1000,
            gas_from,
            payload: SmallString::new("test-payload").unwrap(),
            body,
        }
    }

    #[test]
    fn transfer_fungible_vector() {
        let msg = header(
            TxBody::TransferFungible(TransferFungible {
                to: Bytes32::default(),
                token_id: 1,
                amount: 100_000_000,
            }),
            Bytes32::default(),
        );
        let expected = "03c04ef9b6990100008096980000000000e80300000000000000000000000000000000000000000000000000000000000000000000000000000c746573742d7061796c6f61640000000000000000000000000000000000000000000000000000000000000000010000000000000000e1f50500000000";
        assert_eq!(hex::encode(msg.serialize().unwrap()), expected);
    }

    #[test]
    fn transfer_fungible_gas_payer_vector() {
        let msg = header(
            TxBody::TransferFungibleGasPayer(TransferFungibleGasPayer {
                to: key(RECEIVER),
                from: key(SENDER),
                token_id: 1,
                amount: 100_000_000,
            }),
            key(SENDER),
        );
        let expected = "04c04ef9b6990100008096980000000000e803000000000000f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe4308960c746573742d7061796c6f6164d4c5061b81c4682b27a0cfc6459cd9d7892eb60a43f73dd1060b6c478aa7c3d8f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe430896010000000000000000e1f50500000000";
        assert_eq!(hex::encode(msg.serialize().unwrap()), expected);
    }

    #[test]
    fn burn_fungible_gas_payer_vector() {
        let msg = header(
            TxBody::BurnFungibleGasPayer(BurnFungibleGasPayer {
                token_id: 1,
                from: key(SENDER),
                amount: IntX::Small(100_000_000),
            }),
            key(SENDER),
        );
        let expected = "0bc04ef9b6990100008096980000000000e803000000000000f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe4308960c746573742d7061796c6f61640100000000000000f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe4308960800e1f50500000000";
        assert_eq!(hex::encode(msg.serialize().unwrap()), expected);
    }

    #[test]
    fn mint_fungible_vector() {
        let msg = header(
            TxBody::MintFungible(MintFungible {
                token_id: 1,
                to: key(RECEIVER),
                amount: IntX::Small(100_000_000),
            }),
            key(SENDER),
        );
        let expected = "09c04ef9b6990100008096980000000000e803000000000000f94a8e45bdf1e37a8466b951849e92d1baf870f49d1d04cd204d0bc9fe4308960c746573742d7061796c6f61640100000000000000d4c5061b81c4682b27a0cfc6459cd9d7892eb60a43f73dd1060b6c478aa7c3d80800e1f50500000000";
        assert_eq!(hex::encode(msg.serialize().unwrap()), expected);
    }

    #[test]
    fn call_sections_vector() {
        let call = TxMsgCall {
            module_id: 1,
            method_id: 2,
            args: CallArgs::Sections(vec![
                CallSection::Register(-1),
                CallSection::Args(vec![0x0A, 0x0B]),
            ]),
        };
        let mut w = WriteView::new();
        call.write(&mut w).unwrap();
        assert_eq!(
            hex::encode(w.as_slice()).to_uppercase(),
            "0100000002000000FEFFFFFFFFFFFFFF020000000A0B"
        );

        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        let decoded = TxMsgCall::read(&mut r).unwrap();
        assert_eq!(decoded, call);
        assert!(r.finished());
    }

    #[test]
    fn call_inline_roundtrip() {
        let call = TxMsgCall {
            module_id: 1,
            method_id: 21,
            args: CallArgs::Inline(vec![1, 2, 3]),
        };
        let mut w = WriteView::new();
        call.write(&mut w).unwrap();
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        assert_eq!(TxMsgCall::read(&mut r).unwrap(), call);
    }

    #[test]
    fn invalid_sections_are_refused() {
        let empty = TxMsgCall {
            module_id: 0,
            method_id: 0,
            args: CallArgs::Sections(vec![]),
        };
        let mut w = WriteView::new();
        assert_eq!(empty.write(&mut w), Err(Error::InvalidCallSections));

        let positive_register = TxMsgCall {
            module_id: 0,
            method_id: 0,
            args: CallArgs::Sections(vec![CallSection::Register(3)]),
        };
        let mut w = WriteView::new();
        assert_eq!(
            positive_register.write(&mut w),
            Err(Error::InvalidCallSections)
        );
    }

    #[test]
    fn every_variant_roundtrips() {
        let bodies = vec![
            TxBody::Call(TxMsgCall {
                module_id: 1,
                method_id: 2,
                args: CallArgs::Inline(vec![9, 9]),
            }),
            TxBody::CallMulti(vec![TxMsgCall::default(), TxMsgCall::default()]),
            TxBody::Trade(TxMsgTrade {
                transfer_fungible: vec![TransferFungibleGasPayer {
                    to: key(RECEIVER),
                    from: key(SENDER),
                    token_id: 7,
                    amount: 10,
                }],
                mint_fungible: vec![MintFungible {
                    token_id: 7,
                    to: key(RECEIVER),
                    amount: IntX::Small(5),
                }],
                ..TxMsgTrade::default()
            }),
            TxBody::TransferFungible(TransferFungible::default()),
            TxBody::TransferFungibleGasPayer(TransferFungibleGasPayer::default()),
            TxBody::TransferNonFungibleSingle(TransferNonFungibleSingle::default()),
            TxBody::TransferNonFungibleSingleGasPayer(
                TransferNonFungibleSingleGasPayer::default(),
            ),
            TxBody::TransferNonFungibleMulti(TransferNonFungibleMulti {
                to: key(RECEIVER),
                token_id: 3,
                instance_ids: vec![5, 6, 7],
            }),
            TxBody::TransferNonFungibleMultiGasPayer(TransferNonFungibleMultiGasPayer::default()),
            TxBody::MintFungible(MintFungible::default()),
            TxBody::BurnFungible(BurnFungible {
                token_id: 2,
                amount: IntX::from_str_radix("98765432109876543210987654321", 10).unwrap(),
            }),
            TxBody::BurnFungibleGasPayer(BurnFungibleGasPayer::default()),
            TxBody::MintNonFungible(MintNonFungible {
                token_id: 9,
                to: key(RECEIVER),
                series_id: 4,
                rom: vec![1, 0x42],
                ram: vec![],
            }),
            TxBody::BurnNonFungible(BurnNonFungible::default()),
            TxBody::BurnNonFungibleGasPayer(BurnNonFungibleGasPayer::default()),
            TxBody::Phantasma(TxMsgPhantasma {
                nexus: SmallString::new("testnet").unwrap(),
                chain: SmallString::new("main").unwrap(),
                script: vec![1, 2, 3],
            }),
            TxBody::PhantasmaRaw(TxMsgPhantasmaRaw {
                transaction: vec![7, 7, 7],
            }),
        ];

        for body in bodies {
            let code = body.type_code();
            let msg = header(body, key(SENDER));
            let bytes = msg.serialize().unwrap();
            assert_eq!(bytes[0], code);
            let decoded = TxMsg::deserialize(&bytes).unwrap();
            assert_eq!(decoded, msg, "variant {code}");
        }
    }

    #[test]
    fn signed_single_witness_layout() {
        let msg = header(
            TxBody::TransferFungible(TransferFungible {
                to: key(RECEIVER),
                token_id: 1,
                amount: 5,
            }),
            key(SENDER),
        );
        let unsigned_len = msg.serialize().unwrap().len();
        let signature = Bytes64::padded(&[0xAB; 64]);
        let signed = SignedTxMsg {
            msg,
            witnesses: vec![Witness {
                address: key(SENDER),
                signature,
            }],
        };
        let bytes = signed.serialize().unwrap();
        // just the signature, no address and no count
        assert_eq!(bytes.len(), unsigned_len + 64);

        let decoded = SignedTxMsg::deserialize(&bytes).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.witnesses[0].address, key(SENDER));
    }

    #[test]
    fn signed_gas_payer_layout_and_order() {
        let msg = header(
            TxBody::TransferFungibleGasPayer(TransferFungibleGasPayer {
                to: key(RECEIVER),
                from: key(RECEIVER),
                token_id: 1,
                amount: 5,
            }),
            key(SENDER),
        );
        let unsigned_len = msg.serialize().unwrap().len();
        let gas_sig = Bytes64::padded(&[0x01; 64]);
        let src_sig = Bytes64::padded(&[0x02; 64]);
        let signed = SignedTxMsg {
            msg,
            witnesses: vec![
                Witness {
                    address: key(SENDER),
                    signature: gas_sig,
                },
                Witness {
                    address: key(RECEIVER),
                    signature: src_sig,
                },
            ],
        };
        let bytes = signed.serialize().unwrap();
        assert_eq!(bytes.len(), unsigned_len + 128);
        // gas payer's signature comes first
        assert_eq!(bytes[unsigned_len], 0x01);
        assert_eq!(bytes[unsigned_len + 64], 0x02);

        assert_eq!(SignedTxMsg::deserialize(&bytes).unwrap(), signed);
    }

    #[test]
    fn signed_multi_witness_layout() {
        let msg = header(
            TxBody::Call(TxMsgCall {
                module_id: 1,
                method_id: 2,
                args: CallArgs::Inline(vec![]),
            }),
            key(SENDER),
        );
        let signed = SignedTxMsg {
            msg,
            witnesses: vec![Witness {
                address: key(SENDER),
                signature: Bytes64::padded(&[0xEE; 64]),
            }],
        };
        let bytes = signed.serialize().unwrap();
        assert_eq!(SignedTxMsg::deserialize(&bytes).unwrap(), signed);
    }

    #[test]
    fn witness_invariants_are_enforced() {
        let msg = header(
            TxBody::TransferFungible(TransferFungible::default()),
            key(SENDER),
        );

        // wrong address for the single-witness class
        let wrong = SignedTxMsg {
            msg: msg.clone(),
            witnesses: vec![Witness {
                address: key(RECEIVER),
                signature: Bytes64::default(),
            }],
        };
        assert_eq!(wrong.serialize().unwrap_err(), Error::InvalidWitness);

        // wrong witness count
        let empty = SignedTxMsg {
            msg,
            witnesses: vec![],
        };
        assert_eq!(empty.serialize().unwrap_err(), Error::InvalidWitness);

        // raw passthrough must not carry witnesses
        let raw = SignedTxMsg {
            msg: header(TxBody::PhantasmaRaw(TxMsgPhantasmaRaw::default()), key(SENDER)),
            witnesses: vec![Witness {
                address: key(SENDER),
                signature: Bytes64::default(),
            }],
        };
        assert_eq!(raw.serialize().unwrap_err(), Error::InvalidWitness);
    }

    #[test]
    fn unknown_type_byte_fails() {
        let mut bytes = vec![42u8];
        bytes.extend_from_slice(&[0u8; 57]);
        assert!(matches!(
            TxMsg::deserialize(&bytes),
            Err(Error::UnknownTxType(42))
        ));
    }
}
