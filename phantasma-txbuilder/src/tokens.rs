//! Token, series and NFT builders
//!
//! These builders are eager validators: every required field and every
//! declared schema constraint is checked before a single byte of output is
//! produced, and the first violation is the error the caller sees.

use std::collections::BTreeMap;

use base64::Engine as _;
use phantasma_codec::{Bytes32, SmallString, WriteView};
use phantasma_math::{Int256, IntX};
use phantasma_primitives::{
    token::{standard_meta, SeriesInfo, TokenFlags, TokenInfo, TokenSchemas},
    vm::{
        write_struct, write_struct_with_schema, VmDynamicStruct, VmDynamicValue,
        VmNamedDynamicValue, VmNamedVariableSchema, VmStructArray, VmStructSchema, VmType,
        VmVariableSchema,
    },
};

use crate::Error;

/// A name/type pair for declaring schema fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub vm_type: VmType,
}

impl FieldType {
    pub fn new(name: &str, vm_type: VmType) -> Self {
        Self {
            name: name.to_string(),
            vm_type,
        }
    }
}

/// A runtime-typed metadata value supplied by the application.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Int(i64),
    UInt(u64),
    Bytes(Vec<u8>),
    Struct(Vec<MetadataField>),
    Array(Vec<MetadataValue>),
}

impl MetadataValue {
    pub fn from_string(value: impl Into<String>) -> Self {
        MetadataValue::String(value.into())
    }

    pub fn from_i64(value: i64) -> Self {
        MetadataValue::Int(value)
    }

    pub fn from_u64(value: u64) -> Self {
        MetadataValue::UInt(value)
    }

    pub fn from_bytes(value: impl Into<Vec<u8>>) -> Self {
        MetadataValue::Bytes(value.into())
    }

    pub fn from_struct(fields: Vec<MetadataField>) -> Self {
        MetadataValue::Struct(fields)
    }

    pub fn from_array(items: Vec<MetadataValue>) -> Self {
        MetadataValue::Array(items)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    pub name: String,
    pub value: MetadataValue,
}

impl MetadataField {
    pub fn new(name: &str, value: MetadataValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/* Metadata value coercion ************************************************* */

fn signed_range(field: &str, value: &MetadataValue, min: i64, max: u64) -> Result<i64, Error> {
    let wide = match value {
        MetadataValue::Int(v) => *v as i128,
        MetadataValue::UInt(v) => *v as i128,
        _ => {
            return Err(Error::FieldNotNumber {
                field: field.to_string(),
            })
        }
    };
    if wide < min as i128 || wide > max as i128 {
        return Err(Error::FieldOutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(wide as i64)
}

fn bytes_value(field: &str, value: &MetadataValue) -> Result<Vec<u8>, Error> {
    match value {
        MetadataValue::Bytes(bytes) => Ok(bytes.clone()),
        MetadataValue::String(text) => {
            let stripped = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .unwrap_or(text);
            hex::decode(stripped).map_err(|_| Error::FieldNotBytes {
                field: field.to_string(),
            })
        }
        _ => Err(Error::FieldNotBytes {
            field: field.to_string(),
        }),
    }
}

fn fixed_bytes<const N: usize>(
    field: &str,
    value: &MetadataValue,
) -> Result<phantasma_codec::BytesN<N>, Error> {
    let bytes = bytes_value(field, value)?;
    if bytes.len() != N {
        return Err(Error::FieldWrongSize {
            field: field.to_string(),
            expected: N,
        });
    }
    Ok(phantasma_codec::BytesN::padded(&bytes))
}

fn string_value(field: &str, value: &MetadataValue) -> Result<String, Error> {
    match value {
        MetadataValue::String(text) => Ok(text.clone()),
        _ => Err(Error::FieldNotString {
            field: field.to_string(),
        }),
    }
}

fn struct_value(
    field: &str,
    value: &MetadataValue,
    schema: &VmStructSchema,
) -> Result<VmDynamicStruct, Error> {
    let MetadataValue::Struct(children) = value else {
        return Err(Error::FieldNotStruct {
            field: field.to_string(),
        });
    };
    for child in children {
        if schema.field(&SmallString::truncated(&child.name)).is_none() {
            return Err(Error::FieldUnknownProperty {
                field: field.to_string(),
                property: child.name.clone(),
            });
        }
    }
    let mut out = Vec::with_capacity(schema.len());
    for declared in &schema.fields {
        let name = declared.name.to_string();
        let child = children
            .iter()
            .find(|c| c.name == name)
            .ok_or(Error::FieldMandatory {
                field: name.clone(),
            })?;
        out.push(VmNamedDynamicValue::new(
            declared.name.clone(),
            coerce_metadata_value(&name, &child.value, &declared.schema)?,
        ));
    }
    Ok(VmDynamicStruct::sorted(out))
}

fn array_items<'a>(field: &str, value: &'a MetadataValue) -> Result<&'a [MetadataValue], Error> {
    match value {
        MetadataValue::Array(items) => Ok(items),
        _ => Err(Error::FieldNotArray {
            field: field.to_string(),
        }),
    }
}

/// Coerce one application-supplied value into the schema's declared type.
///
/// Integer widths accept the union of the signed and unsigned range of the
/// slot and store the two's complement; bytes accept raw arrays or hex
/// strings with an optional `0x` prefix; structs require every declared
/// child and refuse unknown ones; arrays coerce every element.
pub fn coerce_metadata_value(
    field: &str,
    value: &MetadataValue,
    schema: &VmVariableSchema,
) -> Result<VmDynamicValue, Error> {
    let coerced = match schema.vm_type {
        VmType::Dynamic => match value {
            MetadataValue::String(s) => VmDynamicValue::String(s.clone()),
            MetadataValue::Int(v) => VmDynamicValue::Int64(*v as u64),
            MetadataValue::UInt(v) => VmDynamicValue::Int64(*v),
            MetadataValue::Bytes(b) => VmDynamicValue::Bytes(b.clone()),
            MetadataValue::Struct(_) => {
                return Err(Error::FieldNotStruct {
                    field: field.to_string(),
                })
            }
            MetadataValue::Array(_) => {
                return Err(Error::FieldNotArray {
                    field: field.to_string(),
                })
            }
        },
        VmType::Int8 => VmDynamicValue::Int8(signed_range(field, value, i8::MIN as i64, u8::MAX as u64)? as u8),
        VmType::Int16 => {
            VmDynamicValue::Int16(signed_range(field, value, i16::MIN as i64, u16::MAX as u64)? as u16)
        }
        VmType::Int32 => {
            VmDynamicValue::Int32(signed_range(field, value, i32::MIN as i64, u32::MAX as u64)? as u32)
        }
        VmType::Int64 => match value {
            MetadataValue::Int(v) => VmDynamicValue::Int64(*v as u64),
            MetadataValue::UInt(v) => VmDynamicValue::Int64(*v),
            _ => {
                return Err(Error::FieldNotNumber {
                    field: field.to_string(),
                })
            }
        },
        VmType::Int256 => match value {
            MetadataValue::Int(v) => VmDynamicValue::Int256(Int256::from(*v)),
            MetadataValue::UInt(v) => {
                VmDynamicValue::Int256(phantasma_math::Uint256::from(*v).as_signed())
            }
            _ => {
                return Err(Error::FieldNotNumber {
                    field: field.to_string(),
                })
            }
        },
        VmType::Bytes => VmDynamicValue::Bytes(bytes_value(field, value)?),
        VmType::Bytes16 => VmDynamicValue::Bytes16(fixed_bytes(field, value)?),
        VmType::Bytes32 => VmDynamicValue::Bytes32(fixed_bytes(field, value)?),
        VmType::Bytes64 => VmDynamicValue::Bytes64(fixed_bytes(field, value)?),
        VmType::String => VmDynamicValue::String(string_value(field, value)?),
        VmType::Struct => VmDynamicValue::Struct(struct_value(field, value, &schema.structure)?),
        VmType::ArrayInt8 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(signed_range(field, item, i8::MIN as i64, u8::MAX as u64)? as u8);
            }
            VmDynamicValue::ArrayInt8(out)
        }
        VmType::ArrayInt16 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(signed_range(field, item, i16::MIN as i64, u16::MAX as u64)? as u16);
            }
            VmDynamicValue::ArrayInt16(out)
        }
        VmType::ArrayInt32 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(signed_range(field, item, i32::MIN as i64, u32::MAX as u64)? as u32);
            }
            VmDynamicValue::ArrayInt32(out)
        }
        VmType::ArrayInt64 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(match item {
                    MetadataValue::Int(v) => *v as u64,
                    MetadataValue::UInt(v) => *v,
                    _ => {
                        return Err(Error::FieldNotNumber {
                            field: field.to_string(),
                        })
                    }
                });
            }
            VmDynamicValue::ArrayInt64(out)
        }
        VmType::ArrayInt256 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(match item {
                    MetadataValue::Int(v) => Int256::from(*v),
                    MetadataValue::UInt(v) => phantasma_math::Uint256::from(*v).as_signed(),
                    _ => {
                        return Err(Error::FieldNotNumber {
                            field: field.to_string(),
                        })
                    }
                });
            }
            VmDynamicValue::ArrayInt256(out)
        }
        VmType::ArrayBytes => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(bytes_value(field, item)?);
            }
            VmDynamicValue::ArrayBytes(out)
        }
        VmType::ArrayBytes16 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(fixed_bytes(field, item)?);
            }
            VmDynamicValue::ArrayBytes16(out)
        }
        VmType::ArrayBytes32 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(fixed_bytes(field, item)?);
            }
            VmDynamicValue::ArrayBytes32(out)
        }
        VmType::ArrayBytes64 => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(fixed_bytes(field, item)?);
            }
            VmDynamicValue::ArrayBytes64(out)
        }
        VmType::ArrayString => {
            let mut out = Vec::new();
            for item in array_items(field, value)? {
                out.push(string_value(field, item)?);
            }
            VmDynamicValue::ArrayString(out)
        }
        VmType::ArrayStruct => {
            let mut items = Vec::new();
            for item in array_items(field, value)? {
                items.push(struct_value(field, item, &schema.structure)?);
            }
            VmDynamicValue::ArrayStruct(VmStructArray {
                schema: schema.structure.clone(),
                items,
            })
        }
        VmType::ArrayDynamic => {
            return Err(Error::FieldNotArray {
                field: field.to_string(),
            })
        }
    };
    Ok(coerced)
}

/// Look up `schema_field` in the supplied metadata, coerce it and append it
/// to `out`. A declared field with no metadata entry is mandatory.
pub fn push_metadata_field(
    schema_field: &VmNamedVariableSchema,
    out: &mut Vec<VmNamedDynamicValue>,
    metadata: &[MetadataField],
) -> Result<(), Error> {
    let name = schema_field.name.to_string();
    let supplied = metadata
        .iter()
        .find(|f| f.name == name)
        .ok_or(Error::FieldMandatory {
            field: name.clone(),
        })?;
    let value = coerce_metadata_value(&name, &supplied.value, &schema_field.schema)?;
    out.push(VmNamedDynamicValue::new(schema_field.name.clone(), value));
    Ok(())
}

/// Fetch a bytes-typed field if present, or an empty blob.
pub fn optional_bytes_field(metadata: &[MetadataField], name: &str) -> Result<Vec<u8>, Error> {
    match metadata.iter().find(|f| f.name == name) {
        Some(field) => bytes_value(name, &field.value),
        None => Ok(Vec::new()),
    }
}

/* Token metadata ********************************************************** */

const REQUIRED_METADATA: [&str; 4] = [
    standard_meta::NAME,
    standard_meta::ICON,
    standard_meta::URL,
    standard_meta::DESCRIPTION,
];

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    // byte-wise so a multi-byte character at the cut point cannot panic
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

fn validate_icon(icon: &str) -> Result<(), Error> {
    let trimmed = icon.trim();
    if trimmed.is_empty() || !starts_with_ignore_case(trimmed, "data:image/") {
        return Err(Error::IconNotDataUri);
    }
    let comma = trimmed.find(',').ok_or(Error::IconNotDataUri)?;
    let mime_part = &trimmed[..comma];
    let accepted = ["data:image/png;base64", "data:image/jpeg;base64", "data:image/webp;base64"];
    if !accepted
        .iter()
        .any(|prefix| starts_with_ignore_case(mime_part, prefix))
    {
        return Err(Error::IconNotDataUri);
    }

    let payload = trimmed[comma + 1..].trim();
    if payload.is_empty() {
        return Err(Error::IconEmptyPayload);
    }
    if payload.len() % 4 != 0 || !payload.chars().all(is_base64_char) {
        return Err(Error::IconInvalidBase64);
    }

    let engine = base64::engine::general_purpose::STANDARD;
    let decoded = engine
        .decode(payload)
        .map_err(|_| Error::IconInvalidBase64)?;
    if decoded.is_empty() {
        return Err(Error::IconEmptyPayload);
    }

    // the payload must survive a decode/encode cycle modulo '=' padding
    let reencoded = engine.encode(&decoded);
    if reencoded.trim_end_matches('=') != payload.trim_end_matches('=') {
        return Err(Error::IconInvalidBase64);
    }
    Ok(())
}

/// Builds the serialized token metadata struct from string fields.
pub struct TokenMetadataBuilder;

impl TokenMetadataBuilder {
    /// Requires `name`, `icon`, `url` and `description`, all non-blank, and
    /// a valid image data URI for the icon; extra fields pass through.
    pub fn build_and_serialize(fields: &[(String, String)]) -> Result<Vec<u8>, Error> {
        let lookup: BTreeMap<&str, &str> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if lookup.len() < REQUIRED_METADATA.len() {
            return Err(Error::MetadataMandatory);
        }

        let missing: Vec<&str> = REQUIRED_METADATA
            .iter()
            .filter(|name| {
                lookup
                    .get(**name)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::MetadataMissingFields(missing.join(", ")));
        }

        validate_icon(lookup[standard_meta::ICON])?;

        let entries: Vec<VmNamedDynamicValue> = lookup
            .iter()
            .map(|(name, value)| {
                VmNamedDynamicValue::new(
                    SmallString::truncated(name),
                    VmDynamicValue::String((*value).to_string()),
                )
            })
            .collect();
        let meta = VmDynamicStruct::sorted(entries);

        let mut w = WriteView::new();
        write_struct(&mut w, &meta)?;
        Ok(w.into_inner())
    }
}

/* Token schemas *********************************************************** */

fn series_default_fields() -> Vec<FieldType> {
    vec![
        FieldType::new(standard_meta::ID, VmType::Int256),
        FieldType::new(standard_meta::MODE, VmType::Int8),
        FieldType::new(standard_meta::ROM, VmType::Bytes),
    ]
}

fn nft_default_fields() -> Vec<FieldType> {
    vec![
        FieldType::new(standard_meta::ID, VmType::Int256),
        FieldType::new(standard_meta::ROM, VmType::Bytes),
    ]
}

fn standard_nft_metadata_fields() -> Vec<FieldType> {
    vec![
        FieldType::new(standard_meta::NAME, VmType::String),
        FieldType::new(standard_meta::DESCRIPTION, VmType::String),
        FieldType::new(standard_meta::IMAGE_URL, VmType::String),
        FieldType::new(standard_meta::INFO_URL, VmType::String),
        FieldType::new(standard_meta::ROYALTIES, VmType::Int32),
    ]
}

/// `true` when the schema declares `field` with the right type; a type or
/// letter-case disagreement is an error rather than "not found".
fn contains_field(schema: &VmStructSchema, field: &FieldType) -> Result<bool, Error> {
    for candidate in &schema.fields {
        let candidate_name = candidate.name.to_string();
        if candidate_name == field.name {
            if candidate.schema.vm_type != field.vm_type {
                return Err(Error::InvalidTokenSchema(format!(
                    "Type mismatch for field {}",
                    field.name
                )));
            }
            return Ok(true);
        }
        if candidate_name.eq_ignore_ascii_case(&field.name) {
            return Err(Error::InvalidTokenSchema(format!(
                "Case mismatch for field {}, expected {candidate_name}",
                field.name
            )));
        }
    }
    Ok(false)
}

fn verify_mandatory(schema: &VmStructSchema, mandatory: &[FieldType]) -> Result<(), Error> {
    for field in mandatory {
        if !contains_field(schema, field)? {
            return Err(Error::InvalidTokenSchema(format!(
                "Mandatory metadata field not found: {}",
                field.name
            )));
        }
    }
    Ok(())
}

fn verify_standard_metadata(
    first: &VmStructSchema,
    second: &VmStructSchema,
) -> Result<(), Error> {
    for field in standard_nft_metadata_fields() {
        let found = contains_field(first, &field)? || contains_field(second, &field)?;
        if !found {
            return Err(Error::InvalidTokenSchema(format!(
                "Mandatory metadata field not found: {}",
                field.name
            )));
        }
    }
    Ok(())
}

fn add_field(dest: &mut Vec<VmNamedVariableSchema>, field: &FieldType) -> Result<(), Error> {
    if field.name.is_empty() {
        return Err(Error::InvalidTokenSchema(
            "Field name cannot be empty".to_string(),
        ));
    }
    for existing in dest.iter() {
        let existing_name = existing.name.to_string();
        if existing_name == field.name {
            return Err(Error::InvalidTokenSchema(format!(
                "Duplicate field name: {}",
                field.name
            )));
        }
        if existing_name.eq_ignore_ascii_case(&field.name) {
            return Err(Error::InvalidTokenSchema(format!(
                "Case mismatch for field {}, expected {existing_name}",
                field.name
            )));
        }
    }
    dest.push(VmNamedVariableSchema {
        name: SmallString::truncated(&field.name),
        schema: VmVariableSchema::plain(field.vm_type),
    });
    Ok(())
}

fn verify_schemas(schemas: &TokenSchemas) -> Result<(), Error> {
    verify_mandatory(&schemas.series_metadata, &series_default_fields())?;
    verify_mandatory(&schemas.rom, &nft_default_fields())?;
    verify_standard_metadata(&schemas.series_metadata, &schemas.rom)
}

pub struct TokenSchemasBuilder;

impl TokenSchemasBuilder {
    /// The stock schema triple for standard NFTs: series metadata carries
    /// the id/mode/shared-rom slots, the ROM carries the id, blob and the
    /// standard display fields, the RAM is free-form.
    pub fn standard_schemas() -> TokenSchemas {
        use phantasma_primitives::vm::SchemaFlags;

        let series = series_default_fields()
            .iter()
            .map(|f| VmNamedVariableSchema {
                name: SmallString::truncated(&f.name),
                schema: VmVariableSchema::plain(f.vm_type),
            })
            .collect();
        let rom = nft_default_fields()
            .iter()
            .chain(standard_nft_metadata_fields().iter())
            .map(|f| VmNamedVariableSchema {
                name: SmallString::truncated(&f.name),
                schema: VmVariableSchema::plain(f.vm_type),
            })
            .collect();

        TokenSchemas {
            series_metadata: VmStructSchema::unsorted(series, SchemaFlags::NONE),
            rom: VmStructSchema::unsorted(rom, SchemaFlags::NONE),
            ram: VmStructSchema::unsorted(Vec::new(), SchemaFlags::DYNAMIC_EXTRAS),
        }
    }

    /// Build the schema triple from user fields, prepending the mandatory
    /// defaults and enforcing uniqueness, case consistency and the standard
    /// NFT metadata.
    pub fn build_from_fields(
        series_fields: &[FieldType],
        rom_fields: &[FieldType],
        ram_fields: &[FieldType],
    ) -> Result<TokenSchemas, Error> {
        let mut series = Vec::new();
        for field in series_default_fields().iter().chain(series_fields) {
            add_field(&mut series, field)?;
        }

        let mut rom = Vec::new();
        for field in nft_default_fields().iter().chain(rom_fields) {
            add_field(&mut rom, field)?;
        }

        let mut ram = Vec::new();
        for field in ram_fields {
            add_field(&mut ram, field)?;
        }
        let allow_extras = ram.is_empty();

        let schemas = TokenSchemas {
            series_metadata: VmStructSchema::sorted(series, false),
            rom: VmStructSchema::sorted(rom, false),
            ram: VmStructSchema::sorted(ram, allow_extras),
        };
        verify_schemas(&schemas)?;
        Ok(schemas)
    }

    pub fn build_and_serialize(schemas: Option<&TokenSchemas>) -> Vec<u8> {
        match schemas {
            Some(schemas) => schemas.serialize(),
            None => Self::standard_schemas().serialize(),
        }
    }
}

/* Token / series / NFT info *********************************************** */

pub struct TokenInfoBuilder;

impl TokenInfoBuilder {
    /// Validate symbol, supply and metadata and assemble a [`TokenInfo`].
    ///
    /// Symbols are strictly `A-Z`. NFT supplies must fit a signed 64-bit
    /// slot; fungibles with larger supplies are flagged as big fungibles
    /// rather than rejected.
    pub fn build(
        symbol: &str,
        max_supply: IntX,
        is_nft: bool,
        decimals: u8,
        creator: Bytes32,
        metadata: Vec<u8>,
        token_schemas: Option<Vec<u8>>,
    ) -> Result<TokenInfo, Error> {
        if symbol.is_empty() {
            return Err(Error::SymbolEmpty);
        }
        if symbol.len() > 255 {
            return Err(Error::SymbolTooLong);
        }
        if !symbol.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::SymbolInvalidCharacter);
        }
        if metadata.is_empty() {
            return Err(Error::MetadataRequired);
        }

        let is_int64_safe = max_supply.is_8byte_safe();
        let mut flags = TokenFlags::NONE;
        if is_nft {
            if !is_int64_safe {
                return Err(Error::NftSupplyTooLarge);
            }
            flags = TokenFlags::NON_FUNGIBLE;
        } else if !is_int64_safe {
            flags = TokenFlags::BIG_FUNGIBLE;
        }

        let token_schemas = if is_nft {
            token_schemas.ok_or(Error::NftSchemasRequired)?
        } else {
            token_schemas.unwrap_or_default()
        };

        Ok(TokenInfo {
            max_supply,
            flags,
            decimals,
            owner: creator,
            symbol: SmallString::truncated(symbol),
            metadata,
            token_schemas,
        })
    }
}

/// Builds the serialized series metadata struct against a series schema.
pub struct TokenSeriesMetadataBuilder;

impl TokenSeriesMetadataBuilder {
    pub fn build_and_serialize(
        series_metadata_schema: &VmStructSchema,
        series_id: &Int256,
        metadata: &[MetadataField],
    ) -> Result<Vec<u8>, Error> {
        let shared_rom = optional_bytes_field(metadata, standard_meta::ROM)?;
        let mode: u8 = if shared_rom.is_empty() { 0 } else { 1 };

        let mut fields = vec![
            VmNamedDynamicValue::new(
                SmallString::truncated(standard_meta::ID),
                VmDynamicValue::Int256(*series_id),
            ),
            VmNamedDynamicValue::new(
                SmallString::truncated(standard_meta::MODE),
                VmDynamicValue::Int8(mode),
            ),
            VmNamedDynamicValue::new(
                SmallString::truncated(standard_meta::ROM),
                VmDynamicValue::Bytes(shared_rom),
            ),
        ];

        let defaults = series_default_fields();
        for declared in &series_metadata_schema.fields {
            let declared_name = declared.name.to_string();
            if defaults.iter().any(|d| d.name == declared_name) {
                continue;
            }
            push_metadata_field(declared, &mut fields, metadata)?;
        }

        let meta = VmDynamicStruct::sorted(fields);
        let mut w = WriteView::new();
        write_struct_with_schema(&mut w, &meta, series_metadata_schema)?;
        Ok(w.into_inner())
    }
}

pub struct SeriesInfoBuilder;

impl SeriesInfoBuilder {
    /// Build a series against a schema, generating the metadata struct.
    pub fn build(
        series_metadata_schema: &VmStructSchema,
        series_id: &Int256,
        max_mint: u32,
        max_supply: u32,
        owner: Bytes32,
        metadata: &[MetadataField],
    ) -> Result<SeriesInfo, Error> {
        let metadata_blob = TokenSeriesMetadataBuilder::build_and_serialize(
            series_metadata_schema,
            series_id,
            metadata,
        )?;
        Ok(SeriesInfo {
            max_mint,
            max_supply,
            owner,
            metadata: metadata_blob,
            rom: VmStructSchema::default(),
            ram: VmStructSchema::default(),
        })
    }

    /// Build a series around an already-serialized metadata blob.
    pub fn from_metadata(
        max_mint: u32,
        max_supply: u32,
        owner: Bytes32,
        metadata: Option<Vec<u8>>,
    ) -> Result<SeriesInfo, Error> {
        let metadata = metadata.ok_or(Error::SeriesMetadataRequired)?;
        Ok(SeriesInfo {
            max_mint,
            max_supply,
            owner,
            metadata,
            rom: VmStructSchema::default(),
            ram: VmStructSchema::default(),
        })
    }
}

/// Builds the immutable per-NFT ROM blob against a ROM schema.
pub struct NftRomBuilder;

impl NftRomBuilder {
    pub fn build_and_serialize(
        nft_rom_schema: &VmStructSchema,
        nft_id: &Int256,
        metadata: &[MetadataField],
    ) -> Result<Vec<u8>, Error> {
        let rom = optional_bytes_field(metadata, standard_meta::ROM)?;

        let mut fields = vec![
            VmNamedDynamicValue::new(
                SmallString::truncated(standard_meta::ID),
                VmDynamicValue::Int256(*nft_id),
            ),
            VmNamedDynamicValue::new(
                SmallString::truncated(standard_meta::ROM),
                VmDynamicValue::Bytes(rom),
            ),
        ];

        let defaults = nft_default_fields();
        for declared in &nft_rom_schema.fields {
            let declared_name = declared.name.to_string();
            if defaults.iter().any(|d| d.name == declared_name) {
                continue;
            }
            push_metadata_field(declared, &mut fields, metadata)?;
        }

        let rom_struct = VmDynamicStruct::sorted(fields);
        let mut w = WriteView::new();
        write_struct_with_schema(&mut w, &rom_struct, nft_rom_schema)?;
        Ok(w.into_inner())
    }

    /// Convenience form for standard NFTs: display fields plus the raw ROM
    /// blob, validated against the given (or stock) schemas.
    #[allow(clippy::too_many_arguments)]
    pub fn build_standard(
        nft_id: &Int256,
        name: &str,
        description: &str,
        image_url: &str,
        info_url: &str,
        royalties: u32,
        rom: &[u8],
        token_schemas: Option<&TokenSchemas>,
    ) -> Result<Vec<u8>, Error> {
        let stock;
        let schemas = match token_schemas {
            Some(schemas) => schemas,
            None => {
                stock = TokenSchemasBuilder::standard_schemas();
                &stock
            }
        };

        let metadata = vec![
            MetadataField::new(standard_meta::NAME, MetadataValue::from_string(name)),
            MetadataField::new(
                standard_meta::DESCRIPTION,
                MetadataValue::from_string(description),
            ),
            MetadataField::new(standard_meta::IMAGE_URL, MetadataValue::from_string(image_url)),
            MetadataField::new(standard_meta::INFO_URL, MetadataValue::from_string(info_url)),
            MetadataField::new(
                standard_meta::ROYALTIES,
                MetadataValue::from_i64(royalties as i64),
            ),
            MetadataField::new(standard_meta::ROM, MetadataValue::from_bytes(rom.to_vec())),
        ];

        Self::build_and_serialize(&schemas.rom, nft_id, &metadata)
    }
}
