//! Validation behavior of the token, schema and metadata builders,
//! mirrored from the vectors shared with the other SDK implementations.

use phantasma_codec::{Bytes32, SmallString};
use phantasma_math::IntX;
use phantasma_primitives::vm::{
    VmDynamicValue, VmNamedVariableSchema, VmStructSchema, VmType, VmVariableSchema,
};
use phantasma_txbuilder::tokens::{
    coerce_metadata_value, push_metadata_field, FieldType, MetadataField, MetadataValue,
    NftRomBuilder, SeriesInfoBuilder, TokenInfoBuilder, TokenMetadataBuilder, TokenSchemasBuilder,
};
use phantasma_txbuilder::Error;

const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR4nGMAAQAABQABDQottAAAAABJRU5ErkJggg==";
const WEBP: &str = "data:image/webp;base64,UklGRg==";
const SVG: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0naHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmcnIHZpZXdCb3g9JzAgMCAyNCAyNCc+PHBhdGggZmlsbD0nI0Y0NDMzNicgZD0nTTcgNGg1YTUgNSAwIDAxMCAxMEg5djZIN3pNOSA2djZoM2EzIDMgMCAwMDAtNnonLz48L3N2Zz4=";
const LEGACY_SVG: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'%3E%3Cpath fill='%23F44336' d='M7 4h5a5 5 0 010 10H9v6H7zM9 6v6h3a3 3 0 000-6z'/%3E%3C/svg%3E";
const GIF: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAAAAACH5BAAAAAAALAAAAAABAAEAAAICRAEAOw==";

fn metadata_fields(icon: &str) -> Vec<(String, String)> {
    vec![
        ("name".to_string(), "My test token!".to_string()),
        ("icon".to_string(), icon.to_string()),
        ("url".to_string(), "http://example.com".to_string()),
        (
            "description".to_string(),
            "My test token description".to_string(),
        ),
    ]
}

fn build_metadata() -> Vec<u8> {
    TokenMetadataBuilder::build_and_serialize(&metadata_fields(PNG)).unwrap()
}

fn schema(name: &str, vm_type: VmType) -> VmNamedVariableSchema {
    VmNamedVariableSchema {
        name: SmallString::new(name).unwrap(),
        schema: VmVariableSchema::plain(vm_type),
    }
}

fn schema_with_structure(
    name: &str,
    vm_type: VmType,
    structure: VmStructSchema,
) -> VmNamedVariableSchema {
    VmNamedVariableSchema {
        name: SmallString::new(name).unwrap(),
        schema: VmVariableSchema::with_structure(vm_type, structure),
    }
}

/* Icon data URI validation ************************************************ */

#[test]
fn icon_accepts_png_jpeg_webp() {
    assert!(TokenMetadataBuilder::build_and_serialize(&metadata_fields(PNG)).is_ok());
    assert!(TokenMetadataBuilder::build_and_serialize(&metadata_fields(
        "data:image/jpeg;base64,/9j/"
    ))
    .is_ok());
    assert!(TokenMetadataBuilder::build_and_serialize(&metadata_fields(WEBP)).is_ok());
}

#[test]
fn icon_rejects_other_formats() {
    for icon in [SVG, LEGACY_SVG, GIF] {
        assert_eq!(
            TokenMetadataBuilder::build_and_serialize(&metadata_fields(icon)).unwrap_err(),
            Error::IconNotDataUri,
            "icon {icon} should be rejected"
        );
    }
}

#[test]
fn icon_rejects_bad_payloads() {
    assert_eq!(
        TokenMetadataBuilder::build_and_serialize(&metadata_fields("data:image/png;base64,"))
            .unwrap_err(),
        Error::IconEmptyPayload
    );
    assert_eq!(
        TokenMetadataBuilder::build_and_serialize(&metadata_fields("data:image/jpeg;base64,@@@"))
            .unwrap_err(),
        Error::IconInvalidBase64
    );
}

#[test]
fn metadata_requires_all_fields_non_blank() {
    let mut fields = metadata_fields(PNG);
    fields.retain(|(name, _)| name != "url");
    assert_eq!(
        TokenMetadataBuilder::build_and_serialize(&fields).unwrap_err(),
        Error::MetadataMandatory
    );

    let mut blank = metadata_fields(PNG);
    blank[0].1 = "   ".to_string();
    assert_eq!(
        TokenMetadataBuilder::build_and_serialize(&blank).unwrap_err(),
        Error::MetadataMissingFields("name".to_string())
    );
}

/* Token info validation *************************************************** */

#[test]
fn symbol_rules() {
    let metadata = build_metadata();
    let creator = Bytes32::default();

    assert_eq!(
        TokenInfoBuilder::build("", IntX::ZERO, false, 0, creator, metadata.clone(), None)
            .unwrap_err(),
        Error::SymbolEmpty
    );
    assert_eq!(
        TokenInfoBuilder::build(
            &"A".repeat(256),
            IntX::ZERO,
            false,
            0,
            creator,
            metadata.clone(),
            None
        )
        .unwrap_err(),
        Error::SymbolTooLong
    );
    assert_eq!(
        TokenInfoBuilder::build("AB1", IntX::ZERO, false, 0, creator, metadata.clone(), None)
            .unwrap_err(),
        Error::SymbolInvalidCharacter
    );
    assert_eq!(
        TokenInfoBuilder::build("ABC", IntX::ZERO, false, 0, creator, Vec::new(), None)
            .unwrap_err(),
        Error::MetadataRequired
    );
    assert!(
        TokenInfoBuilder::build("FUNGIBLE", IntX::ZERO, false, 8, creator, metadata, None).is_ok()
    );
}

#[test]
fn nft_supply_and_schema_rules() {
    let metadata = build_metadata();
    let creator = Bytes32::default();
    let schemas = TokenSchemasBuilder::build_and_serialize(None);
    let big_supply = IntX::from_str_radix("9223372036854775808", 10).unwrap();

    assert_eq!(
        TokenInfoBuilder::build(
            "NFT",
            big_supply,
            true,
            0,
            creator,
            metadata.clone(),
            Some(schemas.clone())
        )
        .unwrap_err(),
        Error::NftSupplyTooLarge
    );
    assert_eq!(
        TokenInfoBuilder::build("NFT", IntX::ZERO, true, 0, creator, metadata.clone(), None)
            .unwrap_err(),
        Error::NftSchemasRequired
    );

    // a fungible with an oversized supply is flagged, not rejected
    let big_fungible =
        TokenInfoBuilder::build("BIG", big_supply, false, 8, creator, metadata, None).unwrap();
    assert!(big_fungible
        .flags
        .contains(phantasma_primitives::token::TokenFlags::BIG_FUNGIBLE));
}

#[test]
fn series_metadata_is_required() {
    assert_eq!(
        SeriesInfoBuilder::from_metadata(1, 1, Bytes32::default(), None).unwrap_err(),
        Error::SeriesMetadataRequired
    );
}

/* Schema builder rules **************************************************** */

#[test]
fn schema_builder_requires_standard_metadata() {
    assert_eq!(
        TokenSchemasBuilder::build_from_fields(&[], &[], &[]).unwrap_err(),
        Error::InvalidTokenSchema("Mandatory metadata field not found: name".to_string())
    );
}

#[test]
fn schema_builder_detects_type_and_case_mismatches() {
    let wrong_type = [FieldType::new("name", VmType::Int32)];
    assert_eq!(
        TokenSchemasBuilder::build_from_fields(&wrong_type, &[], &[]).unwrap_err(),
        Error::InvalidTokenSchema("Type mismatch for field name".to_string())
    );

    let wrong_case = [FieldType::new("Name", VmType::String)];
    assert!(matches!(
        TokenSchemasBuilder::build_from_fields(&wrong_case, &[], &[]).unwrap_err(),
        Error::InvalidTokenSchema(message) if message.contains("Case mismatch for field")
    ));
}

#[test]
fn schema_builder_accepts_standard_fields() {
    let series_fields: Vec<FieldType> = [
        ("name", VmType::String),
        ("description", VmType::String),
        ("imageURL", VmType::String),
        ("infoURL", VmType::String),
        ("royalties", VmType::Int32),
    ]
    .iter()
    .map(|(n, t)| FieldType::new(n, *t))
    .collect();

    let schemas = TokenSchemasBuilder::build_from_fields(&series_fields, &[], &[]).unwrap();
    assert!(schemas.ram.is_empty());
    // serializes cleanly
    assert!(!schemas.serialize().is_empty());
}

#[test]
fn schema_builder_rejects_duplicates() {
    let duplicated = [FieldType::new("_i", VmType::Int256)];
    assert_eq!(
        TokenSchemasBuilder::build_from_fields(&duplicated, &[], &[]).unwrap_err(),
        Error::InvalidTokenSchema("Duplicate field name: _i".to_string())
    );
}

/* Metadata value coercion ************************************************* */

#[test]
fn int32_accepts_and_bounds() {
    let declared = schema("royalties", VmType::Int32);
    let mut out = Vec::new();
    push_metadata_field(
        &declared,
        &mut out,
        &[MetadataField::new("royalties", MetadataValue::from_i64(42))],
    )
    .unwrap();
    assert_eq!(out[0].value, VmDynamicValue::Int32(42));

    let err = push_metadata_field(
        &declared,
        &mut Vec::new(),
        &[MetadataField::new(
            "royalties",
            MetadataValue::from_string("forty-two"),
        )],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be a number"));

    let err = push_metadata_field(
        &declared,
        &mut Vec::new(),
        &[MetadataField::new(
            "royalties",
            MetadataValue::from_u64(0x1_0000_0000),
        )],
    )
    .unwrap_err();
    assert!(err.to_string().contains("between -2147483648"));
}

#[test]
fn narrow_integers_take_the_unsigned_range_too() {
    let level = schema("level", VmType::Int8);
    let mut out = Vec::new();
    push_metadata_field(
        &level,
        &mut out,
        &[MetadataField::new("level", MetadataValue::from_i64(200))],
    )
    .unwrap();
    assert_eq!(out[0].value, VmDynamicValue::Int8(200));

    let checksum = schema("checksum", VmType::Int16);
    let mut out = Vec::new();
    push_metadata_field(
        &checksum,
        &mut out,
        &[MetadataField::new("checksum", MetadataValue::from_i64(65535))],
    )
    .unwrap();
    assert_eq!(out[0].value, VmDynamicValue::Int16(65535));

    let supply = schema("supply", VmType::Int64);
    let mut out = Vec::new();
    push_metadata_field(
        &supply,
        &mut out,
        &[MetadataField::new("supply", MetadataValue::from_u64(u64::MAX))],
    )
    .unwrap();
    assert_eq!(out[0].value, VmDynamicValue::Int64(u64::MAX));
}

#[test]
fn bytes_accept_raw_and_hex() {
    let declared = schema("payload", VmType::Bytes);
    for value in [
        MetadataValue::from_string("0a0b"),
        MetadataValue::from_string("0x0a0b"),
        MetadataValue::from_bytes(vec![0x0A, 0x0B]),
    ] {
        let coerced = coerce_metadata_value("payload", &value, &declared.schema).unwrap();
        assert_eq!(coerced, VmDynamicValue::Bytes(vec![0x0A, 0x0B]));
    }

    let err =
        coerce_metadata_value("payload", &MetadataValue::from_string("xyz"), &declared.schema)
            .unwrap_err();
    assert!(err.to_string().contains("byte array or hex string"));
}

#[test]
fn fixed_width_bytes_check_their_length() {
    let declared = schema("hash", VmType::Bytes16);
    let coerced = coerce_metadata_value(
        "hash",
        &MetadataValue::from_string("00112233445566778899aabbccddeeff"),
        &declared.schema,
    )
    .unwrap();
    assert!(matches!(coerced, VmDynamicValue::Bytes16(_)));

    assert!(coerce_metadata_value(
        "hash",
        &MetadataValue::from_string("0011"),
        &declared.schema
    )
    .is_err());
}

#[test]
fn nested_structs_check_membership() {
    let nested = VmStructSchema::sorted(
        vec![
            schema("innerName", VmType::String),
            schema("innerValue", VmType::Int32),
        ],
        false,
    );
    let declared = schema_with_structure("details", VmType::Struct, nested.clone());

    let good = MetadataValue::from_struct(vec![
        MetadataField::new("innerName", MetadataValue::from_string("demo")),
        MetadataField::new("innerValue", MetadataValue::from_i64(5)),
    ]);
    let coerced = coerce_metadata_value("details", &good, &declared.schema).unwrap();
    let VmDynamicValue::Struct(nested_struct) = coerced else {
        panic!("expected a struct");
    };
    assert_eq!(
        nested_struct.get(&SmallString::new("innerValue").unwrap()),
        Some(&VmDynamicValue::Int32(5))
    );

    let unknown = MetadataValue::from_struct(vec![
        MetadataField::new("innerName", MetadataValue::from_string("demo")),
        MetadataField::new("innerValue", MetadataValue::from_i64(5)),
        MetadataField::new("extra", MetadataValue::from_string("oops")),
    ]);
    let err = coerce_metadata_value("details", &unknown, &declared.schema).unwrap_err();
    assert!(err.to_string().contains("received unknown property"));

    let missing = MetadataValue::from_struct(vec![]);
    let err = coerce_metadata_value("details", &missing, &declared.schema).unwrap_err();
    assert!(err.to_string().contains("is mandatory"));
}

#[test]
fn arrays_coerce_every_element() {
    let tags = schema("tags", VmType::ArrayString);
    let coerced = coerce_metadata_value(
        "tags",
        &MetadataValue::from_array(vec![
            MetadataValue::from_string("alpha"),
            MetadataValue::from_string("beta"),
        ]),
        &tags.schema,
    )
    .unwrap();
    assert_eq!(
        coerced,
        VmDynamicValue::ArrayString(vec!["alpha".to_string(), "beta".to_string()])
    );

    let deltas = schema("deltas", VmType::ArrayInt8);
    let coerced = coerce_metadata_value(
        "deltas",
        &MetadataValue::from_array(vec![
            MetadataValue::from_i64(1),
            MetadataValue::from_i64(-1),
            MetadataValue::from_i64(5),
        ]),
        &deltas.schema,
    )
    .unwrap();
    assert_eq!(coerced, VmDynamicValue::ArrayInt8(vec![1, 255, 5]));

    let roots = schema("roots", VmType::ArrayBytes32);
    let coerced = coerce_metadata_value(
        "roots",
        &MetadataValue::from_array(vec![
            MetadataValue::from_string(
                "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff",
            ),
            MetadataValue::from_string(
                "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
        ]),
        &roots.schema,
    )
    .unwrap();
    let VmDynamicValue::ArrayBytes32(items) = coerced else {
        panic!("expected a Bytes32 array");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].as_ref(), &[0xFF; 32]);
}

#[test]
fn array_of_structs_carries_the_element_schema() {
    let element = VmStructSchema::sorted(vec![schema("name", VmType::String)], false);
    let declared = schema_with_structure("items", VmType::ArrayStruct, element.clone());

    let coerced = coerce_metadata_value(
        "items",
        &MetadataValue::from_array(vec![
            MetadataValue::from_struct(vec![MetadataField::new(
                "name",
                MetadataValue::from_string("one"),
            )]),
            MetadataValue::from_struct(vec![MetadataField::new(
                "name",
                MetadataValue::from_string("two"),
            )]),
        ]),
        &declared.schema,
    )
    .unwrap();

    let VmDynamicValue::ArrayStruct(array) = coerced else {
        panic!("expected a struct array");
    };
    assert_eq!(array.schema, element);
    assert_eq!(array.items.len(), 2);
    assert_eq!(
        array.items[1].get(&SmallString::new("name").unwrap()),
        Some(&VmDynamicValue::String("two".to_string()))
    );
}

/* NFT ROM builder ********************************************************* */

#[test]
fn nft_rom_builds_against_the_standard_schema() {
    let schemas = TokenSchemasBuilder::standard_schemas();
    let nft_id = phantasma_math::Int256::from_str_radix(
        "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        10,
    )
    .unwrap();

    let metadata = vec![
        MetadataField::new("name", MetadataValue::from_string("My NFT #1")),
        MetadataField::new(
            "description",
            MetadataValue::from_string("This is my first NFT!"),
        ),
        MetadataField::new(
            "imageURL",
            MetadataValue::from_string(
                "images-assets.nasa.gov/image/PIA13227/PIA13227~orig.jpg",
            ),
        ),
        MetadataField::new(
            "infoURL",
            MetadataValue::from_string("https://images.nasa.gov/details/PIA13227"),
        ),
        MetadataField::new("royalties", MetadataValue::from_i64(10_000_000)),
        MetadataField::new("rom", MetadataValue::from_bytes(vec![0x01, 0x42])),
    ];

    let rom = NftRomBuilder::build_and_serialize(&schemas.rom, &nft_id, &metadata).unwrap();
    assert!(!rom.is_empty());

    // a missing standard field is refused up front
    let incomplete = &metadata[..4];
    let err = NftRomBuilder::build_and_serialize(&schemas.rom, &nft_id, incomplete).unwrap_err();
    assert!(err.to_string().contains("is mandatory"));
}
