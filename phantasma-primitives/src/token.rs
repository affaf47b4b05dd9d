//! Token, series and NFT records and their Carbon layouts

use phantasma_codec::{
    carbon::{
        read_byte_array, read_bytes_n, read_count, read_small_string, write_byte_array,
        write_bytes_n, write_small_string,
    },
    Bytes32, ReadView, SmallString, WriteView,
};
use phantasma_math::{read_intx, write_intx, IntX};

use crate::{
    vm::{read_dynamic, write_dynamic, VmDynamicValue, VmStructSchema},
    Error,
};

/// Field names with on-chain meaning.
pub mod standard_meta {
    /// The per-series / per-NFT id every schema must declare.
    pub const ID: &str = "_i";
    pub const MODE: &str = "mode";
    pub const ROM: &str = "rom";

    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const URL: &str = "url";
    pub const ICON: &str = "icon";
    pub const VERSION: &str = "version";
    pub const IMAGE_URL: &str = "imageURL";
    pub const INFO_URL: &str = "infoURL";
    pub const ROYALTIES: &str = "royalties";
}

/// Behavior bits of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenFlags(pub u8);

impl TokenFlags {
    pub const NONE: Self = Self(0);
    /// Fungible whose max supply does not fit a signed 64-bit slot.
    pub const BIG_FUNGIBLE: Self = Self(1 << 0);
    pub const NON_FUNGIBLE: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_non_fungible(self) -> bool {
        self.contains(Self::NON_FUNGIBLE)
    }
}

impl std::ops::BitOr for TokenFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Per-NFT-instance state bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NftInstanceFlags(pub u8);

impl NftInstanceFlags {
    pub const NONE: Self = Self(0);
    pub const HAS_META_ID: Self = Self(1 << 0);
    pub const HAS_RAM: Self = Self(1 << 1);
    pub const STAKED: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokensConfig {
    pub flags: u8,
}

impl TokensConfig {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u8(self.flags);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let flags = r.read_u8();
        r.result()?;
        Ok(Self { flags })
    }
}

/// The on-chain description of a token.
///
/// `token_schemas` is only present on the wire for non-fungibles; the flag
/// decides, so it must be set before serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenInfo {
    pub max_supply: IntX,
    pub flags: TokenFlags,
    pub decimals: u8,
    pub owner: Bytes32,
    pub symbol: SmallString,
    pub metadata: Vec<u8>,
    pub token_schemas: Vec<u8>,
}

impl TokenInfo {
    pub fn write(&self, w: &mut WriteView) {
        write_intx(w, &self.max_supply);
        w.write_u8(self.flags.0);
        w.write_u8(self.decimals);
        write_bytes_n(w, &self.owner);
        write_small_string(w, &self.symbol);
        write_byte_array(w, &self.metadata);
        if self.flags.is_non_fungible() {
            write_byte_array(w, &self.token_schemas);
        }
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let max_supply = read_intx(r)?;
        let flags = TokenFlags(r.read_u8());
        let decimals = r.read_u8();
        r.result()?;
        let owner = read_bytes_n(r)?;
        let symbol = read_small_string(r)?;
        let metadata = read_byte_array(r)?;
        let token_schemas = if flags.is_non_fungible() {
            read_byte_array(r)?
        } else {
            Vec::new()
        };
        Ok(Self {
            max_supply,
            flags,
            decimals,
            owner,
            symbol,
            metadata,
            token_schemas,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut w = WriteView::new();
        self.write(&mut w);
        w.into_inner()
    }
}

/// The three named schemas a non-fungible token declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenSchemas {
    pub series_metadata: VmStructSchema,
    pub rom: VmStructSchema,
    pub ram: VmStructSchema,
}

impl TokenSchemas {
    pub fn write(&self, w: &mut WriteView) {
        self.series_metadata.write(w);
        self.rom.write(w);
        self.ram.write(w);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        Ok(Self {
            series_metadata: VmStructSchema::read(r)?,
            rom: VmStructSchema::read(r)?,
            ram: VmStructSchema::read(r)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut w = WriteView::new();
        self.write(&mut w);
        w.into_inner()
    }
}

/// A collection template under a token: mint caps, owner, metadata blob and
/// the per-instance ROM/RAM schemas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesInfo {
    pub max_mint: u32,
    pub max_supply: u32,
    pub owner: Bytes32,
    pub metadata: Vec<u8>,
    pub rom: VmStructSchema,
    pub ram: VmStructSchema,
}

impl SeriesInfo {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u32(self.max_mint);
        w.write_u32(self.max_supply);
        write_bytes_n(w, &self.owner);
        write_byte_array(w, &self.metadata);
        self.rom.write(w);
        self.ram.write(w);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let max_mint = r.read_u32();
        let max_supply = r.read_u32();
        r.result()?;
        let owner = read_bytes_n(r)?;
        let metadata = read_byte_array(r)?;
        let rom = VmStructSchema::read(r)?;
        let ram = VmStructSchema::read(r)?;
        Ok(Self {
            max_mint,
            max_supply,
            owner,
            metadata,
            rom,
            ram,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut w = WriteView::new();
        self.write(&mut w);
        w.into_inner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeriesSupply {
    pub mint_count: u32,
    pub current_supply: u32,
}

impl SeriesSupply {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u32(self.mint_count);
        w.write_u32(self.current_supply);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let mint_count = r.read_u32();
        let current_supply = r.read_u32();
        r.result()?;
        Ok(Self {
            mint_count,
            current_supply,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftMintInfo {
    pub series_id: u32,
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
}

impl NftMintInfo {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u32(self.series_id);
        write_byte_array(w, &self.rom);
        write_byte_array(w, &self.ram);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let series_id = r.read_u32();
        r.result()?;
        let rom = read_byte_array(r)?;
        let ram = read_byte_array(r)?;
        Ok(Self {
            series_id,
            rom,
            ram,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftInstance {
    pub originator: Bytes32,
    pub created: i64,
    pub flags: NftInstanceFlags,
    pub rom: Vec<u8>,
}

impl NftInstance {
    pub fn write(&self, w: &mut WriteView) {
        write_bytes_n(w, &self.originator);
        w.write_i64(self.created);
        w.write_u8(self.flags.0);
        write_byte_array(w, &self.rom);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let originator = read_bytes_n(r)?;
        let created = r.read_i64();
        let flags = NftInstanceFlags(r.read_u8());
        r.result()?;
        let rom = read_byte_array(r)?;
        Ok(Self {
            originator,
            created,
            flags,
            rom,
        })
    }
}

/// Mutable per-instance state.
#[derive(Debug, Clone, PartialEq)]
pub struct NftState {
    pub last_transfer: i64,
    pub flags: NftInstanceFlags,
    pub meta_id: VmDynamicValue,
}

impl Default for NftState {
    fn default() -> Self {
        Self {
            last_transfer: 0,
            flags: NftInstanceFlags::NONE,
            meta_id: VmDynamicValue::Null,
        }
    }
}

impl NftState {
    pub fn write(&self, w: &mut WriteView) -> Result<(), Error> {
        w.write_i64(self.last_transfer);
        w.write_u8(self.flags.0);
        write_dynamic(w, &self.meta_id)
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let last_transfer = r.read_i64();
        let flags = NftInstanceFlags(r.read_u8());
        r.result()?;
        let meta_id = read_dynamic(r)?;
        Ok(Self {
            last_transfer,
            flags,
            meta_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftInfo {
    pub series_id: u32,
    pub mint_number: u32,
    pub originator: Bytes32,
    pub created: i64,
    pub flags: NftInstanceFlags,
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub owner: Bytes32,
}

impl NftInfo {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u32(self.series_id);
        w.write_u32(self.mint_number);
        write_bytes_n(w, &self.originator);
        w.write_i64(self.created);
        w.write_u8(self.flags.0);
        write_byte_array(w, &self.rom);
        write_byte_array(w, &self.ram);
        write_bytes_n(w, &self.owner);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let series_id = r.read_u32();
        let mint_number = r.read_u32();
        r.result()?;
        let originator = read_bytes_n(r)?;
        let created = r.read_i64();
        let flags = NftInstanceFlags(r.read_u8());
        r.result()?;
        let rom = read_byte_array(r)?;
        let ram = read_byte_array(r)?;
        let owner = read_bytes_n(r)?;
        Ok(Self {
            series_id,
            mint_number,
            originator,
            created,
            flags,
            rom,
            ram,
            owner,
        })
    }
}

/// One pre-existing instance carried along a series import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftImport {
    pub mint_number: u32,
    pub originator: Bytes32,
    pub created: i64,
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub owner: Bytes32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesImport {
    pub token_id: u64,
    pub info: SeriesInfo,
    pub imports: Vec<NftImport>,
}

impl SeriesImport {
    pub fn write(&self, w: &mut WriteView) {
        w.write_u64(self.token_id);
        self.info.write(w);
        w.write_i32(self.imports.len() as i32);
        for import in &self.imports {
            write_bytes_n(w, &import.originator);
            w.write_u32(import.mint_number);
            w.write_i64(import.created);
            write_byte_array(w, &import.rom);
            write_byte_array(w, &import.ram);
            write_bytes_n(w, &import.owner);
        }
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let token_id = r.read_u64();
        r.result()?;
        let info = SeriesInfo::read(r)?;
        let count = read_count(r)?;
        let mut imports = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            let originator = read_bytes_n(r)?;
            let mint_number = r.read_u32();
            let created = r.read_i64();
            r.result()?;
            let rom = read_byte_array(r)?;
            let ram = read_byte_array(r)?;
            let owner = read_bytes_n(r)?;
            imports.push(NftImport {
                mint_number,
                originator,
                created,
                rom,
                ram,
                owner,
            });
        }
        Ok(Self {
            token_id,
            info,
            imports,
        })
    }
}

/// The resolved schema bundle of one NFT as the node reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NftSchema {
    pub token_rom: VmStructSchema,
    pub series_rom: VmStructSchema,
    pub token_ram: VmStructSchema,
    pub series_ram: VmStructSchema,
    pub series_metadata_schema: VmStructSchema,
    pub series_metadata_value: Vec<u8>,
    pub token_metadata: Vec<u8>,
    pub token_symbol: SmallString,
}

impl NftSchema {
    pub fn write(&self, w: &mut WriteView) {
        self.token_rom.write(w);
        self.series_rom.write(w);
        self.token_ram.write(w);
        self.series_ram.write(w);
        self.series_metadata_schema.write(w);
        write_byte_array(w, &self.series_metadata_value);
        write_byte_array(w, &self.token_metadata);
        write_small_string(w, &self.token_symbol);
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        Ok(Self {
            token_rom: VmStructSchema::read(r)?,
            series_rom: VmStructSchema::read(r)?,
            token_ram: VmStructSchema::read(r)?,
            series_ram: VmStructSchema::read(r)?,
            series_metadata_schema: VmStructSchema::read(r)?,
            series_metadata_value: read_byte_array(r)?,
            token_metadata: read_byte_array(r)?,
            token_symbol: read_small_string(r)?,
        })
    }
}
