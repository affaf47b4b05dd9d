//! Dynamic VM values, struct schemas and their Carbon codec
//!
//! A dynamic value is a one-byte type tag plus a body. Structs are lists of
//! `(name, value)` pairs whose canonical form is sorted by name ascending;
//! writers canonicalize and readers re-sort, so a struct observed through
//! this module is always canonical. When a schema is in scope the field
//! list is written in schema order without repeating names or tags, with an
//! optional trailing block of dynamic extras.

use phantasma_codec::{
    carbon::{
        read_array_bytes_n, read_array_of_arrays, read_array_sz, read_array_u16, read_array_u32,
        read_array_u64, read_array_u8, read_byte_array, read_bytes_n, read_count,
        read_small_string, read_sz, write_array_bytes_n, write_array_of_arrays, write_array_sz,
        write_array_u16, write_array_u32, write_array_u64, write_array_u8, write_byte_array,
        write_bytes_n, write_small_string, write_sz,
    },
    Bytes16, Bytes32, Bytes64, ReadView, SmallString, WriteView,
};
use phantasma_math::{read_int256, write_int256, Int256};

use crate::Error;

/// One-byte discriminator for Carbon dynamic values. Bit 0 is the array
/// marker; the remaining bits select the element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum VmType {
    Dynamic,
    Bytes,
    Struct,
    Int8,
    Int16,
    Int32,
    Int64,
    Int256,
    Bytes16,
    Bytes32,
    Bytes64,
    String,
    ArrayDynamic,
    ArrayBytes,
    ArrayStruct,
    ArrayInt8,
    ArrayInt16,
    ArrayInt32,
    ArrayInt64,
    ArrayInt256,
    ArrayBytes16,
    ArrayBytes32,
    ArrayBytes64,
    ArrayString,
}

impl VmType {
    pub const ARRAY_BIT: u8 = 0x01;

    pub fn to_byte(self) -> u8 {
        match self {
            VmType::Dynamic => 0x00,
            VmType::Bytes => 0x02,
            VmType::Struct => 0x04,
            VmType::Int8 => 0x06,
            VmType::Int16 => 0x08,
            VmType::Int32 => 0x0A,
            VmType::Int64 => 0x0C,
            VmType::Int256 => 0x0E,
            VmType::Bytes16 => 0x10,
            VmType::Bytes32 => 0x12,
            VmType::Bytes64 => 0x14,
            VmType::String => 0x16,
            VmType::ArrayDynamic => 0x01,
            VmType::ArrayBytes => 0x03,
            VmType::ArrayStruct => 0x05,
            VmType::ArrayInt8 => 0x07,
            VmType::ArrayInt16 => 0x09,
            VmType::ArrayInt32 => 0x0B,
            VmType::ArrayInt64 => 0x0D,
            VmType::ArrayInt256 => 0x0F,
            VmType::ArrayBytes16 => 0x11,
            VmType::ArrayBytes32 => 0x13,
            VmType::ArrayBytes64 => 0x15,
            VmType::ArrayString => 0x17,
        }
    }

    pub fn from_byte(tag: u8) -> Result<Self, Error> {
        Ok(match tag {
            0x00 => VmType::Dynamic,
            0x02 => VmType::Bytes,
            0x04 => VmType::Struct,
            0x06 => VmType::Int8,
            0x08 => VmType::Int16,
            0x0A => VmType::Int32,
            0x0C => VmType::Int64,
            0x0E => VmType::Int256,
            0x10 => VmType::Bytes16,
            0x12 => VmType::Bytes32,
            0x14 => VmType::Bytes64,
            0x16 => VmType::String,
            0x01 => VmType::ArrayDynamic,
            0x03 => VmType::ArrayBytes,
            0x05 => VmType::ArrayStruct,
            0x07 => VmType::ArrayInt8,
            0x09 => VmType::ArrayInt16,
            0x0B => VmType::ArrayInt32,
            0x0D => VmType::ArrayInt64,
            0x0F => VmType::ArrayInt256,
            0x11 => VmType::ArrayBytes16,
            0x13 => VmType::ArrayBytes32,
            0x15 => VmType::ArrayBytes64,
            0x17 => VmType::ArrayString,
            other => return Err(Error::UnknownVmType(other)),
        })
    }

    pub fn is_array(self) -> bool {
        self.to_byte() & Self::ARRAY_BIT != 0 && self != VmType::Dynamic
    }
}

impl Default for VmType {
    fn default() -> Self {
        VmType::Dynamic
    }
}

/// Schema behavior flags, serialized as one byte after the field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaFlags(u8);

impl SchemaFlags {
    pub const NONE: Self = Self(0);
    pub const DYNAMIC_EXTRAS: Self = Self(1 << 0);
    pub const IS_SORTED: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn to_byte(self) -> u8 {
        self.0
    }

    pub fn from_byte(b: u8) -> Self {
        Self(b)
    }
}

impl std::ops::BitOr for SchemaFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Declared shape of a single variable: a type, plus a nested schema when
/// the type is `Struct` or `Array_Struct`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmVariableSchema {
    pub vm_type: VmType,
    pub structure: VmStructSchema,
}

impl VmVariableSchema {
    pub fn plain(vm_type: VmType) -> Self {
        Self {
            vm_type,
            structure: VmStructSchema::default(),
        }
    }

    pub fn with_structure(vm_type: VmType, structure: VmStructSchema) -> Self {
        Self { vm_type, structure }
    }

    fn nested(&self) -> Option<&VmStructSchema> {
        if self.structure.is_empty() {
            None
        } else {
            Some(&self.structure)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmNamedVariableSchema {
    pub name: SmallString,
    pub schema: VmVariableSchema,
}

/// An ordered list of named field declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmStructSchema {
    pub fields: Vec<VmNamedVariableSchema>,
    pub flags: SchemaFlags,
}

impl VmStructSchema {
    /// Sort the fields by name and mark the schema accordingly.
    pub fn sorted(mut fields: Vec<VmNamedVariableSchema>, dynamic_extras: bool) -> Self {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        let mut flags = SchemaFlags::IS_SORTED;
        if dynamic_extras {
            flags = flags | SchemaFlags::DYNAMIC_EXTRAS;
        }
        Self { fields, flags }
    }

    pub fn unsorted(fields: Vec<VmNamedVariableSchema>, flags: SchemaFlags) -> Self {
        Self { fields, flags }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &SmallString) -> Option<&VmNamedVariableSchema> {
        if self.flags.contains(SchemaFlags::IS_SORTED) {
            self.fields
                .binary_search_by(|f| f.name.cmp(name))
                .ok()
                .map(|i| &self.fields[i])
        } else {
            self.fields.iter().find(|f| &f.name == name)
        }
    }

    pub fn write(&self, w: &mut WriteView) {
        w.write_i32(self.fields.len() as i32);
        for field in &self.fields {
            write_small_string(w, &field.name);
            w.write_u8(field.schema.vm_type.to_byte());
            if matches!(field.schema.vm_type, VmType::Struct | VmType::ArrayStruct) {
                field.schema.structure.write(w);
            }
        }
        w.write_u8(self.flags.to_byte());
    }

    pub fn read(r: &mut ReadView) -> Result<Self, Error> {
        let count = read_count(r)?;
        let mut fields = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            let name = read_small_string(r)?;
            let tag = r.read_u8();
            r.result()?;
            let vm_type = match VmType::from_byte(tag) {
                Ok(t) => t,
                Err(e) => {
                    r.fail();
                    return Err(e);
                }
            };
            let structure = if matches!(vm_type, VmType::Struct | VmType::ArrayStruct) {
                Self::read(r)?
            } else {
                VmStructSchema::default()
            };
            fields.push(VmNamedVariableSchema {
                name,
                schema: VmVariableSchema {
                    vm_type,
                    structure,
                },
            });
        }
        let flags = SchemaFlags::from_byte(r.read_u8());
        r.result()?;
        Ok(Self { fields, flags })
    }
}

/// An array of structs that all share one schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VmStructArray {
    pub schema: VmStructSchema,
    pub items: Vec<VmDynamicStruct>,
}

/// A dynamic value: the runtime-typed variant carried inside metadata,
/// ROM/RAM blobs and call arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum VmDynamicValue {
    /// A dynamic slot with nothing in it; serializes as an empty dynamic
    /// array, so it never round-trips back to `Null`.
    Null,
    Dynamic(Box<VmDynamicValue>),
    Bytes(Vec<u8>),
    Struct(VmDynamicStruct),
    Int8(u8),
    Int16(u16),
    Int32(u32),
    Int64(u64),
    Int256(Int256),
    Bytes16(Bytes16),
    Bytes32(Bytes32),
    Bytes64(Bytes64),
    String(String),
    ArrayDynamic(Vec<VmDynamicValue>),
    ArrayBytes(Vec<Vec<u8>>),
    ArrayStruct(VmStructArray),
    ArrayInt8(Vec<u8>),
    ArrayInt16(Vec<u16>),
    ArrayInt32(Vec<u32>),
    ArrayInt64(Vec<u64>),
    ArrayInt256(Vec<Int256>),
    ArrayBytes16(Vec<Bytes16>),
    ArrayBytes32(Vec<Bytes32>),
    ArrayBytes64(Vec<Bytes64>),
    ArrayString(Vec<String>),
}

impl VmDynamicValue {
    pub fn vm_type(&self) -> VmType {
        match self {
            VmDynamicValue::Null | VmDynamicValue::Dynamic(_) => VmType::Dynamic,
            VmDynamicValue::Bytes(_) => VmType::Bytes,
            VmDynamicValue::Struct(_) => VmType::Struct,
            VmDynamicValue::Int8(_) => VmType::Int8,
            VmDynamicValue::Int16(_) => VmType::Int16,
            VmDynamicValue::Int32(_) => VmType::Int32,
            VmDynamicValue::Int64(_) => VmType::Int64,
            VmDynamicValue::Int256(_) => VmType::Int256,
            VmDynamicValue::Bytes16(_) => VmType::Bytes16,
            VmDynamicValue::Bytes32(_) => VmType::Bytes32,
            VmDynamicValue::Bytes64(_) => VmType::Bytes64,
            VmDynamicValue::String(_) => VmType::String,
            VmDynamicValue::ArrayDynamic(_) => VmType::ArrayDynamic,
            VmDynamicValue::ArrayBytes(_) => VmType::ArrayBytes,
            VmDynamicValue::ArrayStruct(_) => VmType::ArrayStruct,
            VmDynamicValue::ArrayInt8(_) => VmType::ArrayInt8,
            VmDynamicValue::ArrayInt16(_) => VmType::ArrayInt16,
            VmDynamicValue::ArrayInt32(_) => VmType::ArrayInt32,
            VmDynamicValue::ArrayInt64(_) => VmType::ArrayInt64,
            VmDynamicValue::ArrayInt256(_) => VmType::ArrayInt256,
            VmDynamicValue::ArrayBytes16(_) => VmType::ArrayBytes16,
            VmDynamicValue::ArrayBytes32(_) => VmType::ArrayBytes32,
            VmDynamicValue::ArrayBytes64(_) => VmType::ArrayBytes64,
            VmDynamicValue::ArrayString(_) => VmType::ArrayString,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, VmDynamicValue::Null)
    }

    /// The zero-initialized value of a declared type; written in place of a
    /// missing or mismatched field.
    pub fn zero(vm_type: VmType) -> Self {
        match vm_type {
            VmType::Dynamic => VmDynamicValue::Null,
            VmType::Bytes => VmDynamicValue::Bytes(Vec::new()),
            VmType::Struct => VmDynamicValue::Struct(VmDynamicStruct::default()),
            VmType::Int8 => VmDynamicValue::Int8(0),
            VmType::Int16 => VmDynamicValue::Int16(0),
            VmType::Int32 => VmDynamicValue::Int32(0),
            VmType::Int64 => VmDynamicValue::Int64(0),
            VmType::Int256 => VmDynamicValue::Int256(Int256::ZERO),
            VmType::Bytes16 => VmDynamicValue::Bytes16(Bytes16::default()),
            VmType::Bytes32 => VmDynamicValue::Bytes32(Bytes32::default()),
            VmType::Bytes64 => VmDynamicValue::Bytes64(Bytes64::default()),
            VmType::String => VmDynamicValue::String(String::new()),
            VmType::ArrayDynamic => VmDynamicValue::ArrayDynamic(Vec::new()),
            VmType::ArrayBytes => VmDynamicValue::ArrayBytes(Vec::new()),
            VmType::ArrayStruct => VmDynamicValue::ArrayStruct(VmStructArray::default()),
            VmType::ArrayInt8 => VmDynamicValue::ArrayInt8(Vec::new()),
            VmType::ArrayInt16 => VmDynamicValue::ArrayInt16(Vec::new()),
            VmType::ArrayInt32 => VmDynamicValue::ArrayInt32(Vec::new()),
            VmType::ArrayInt64 => VmDynamicValue::ArrayInt64(Vec::new()),
            VmType::ArrayInt256 => VmDynamicValue::ArrayInt256(Vec::new()),
            VmType::ArrayBytes16 => VmDynamicValue::ArrayBytes16(Vec::new()),
            VmType::ArrayBytes32 => VmDynamicValue::ArrayBytes32(Vec::new()),
            VmType::ArrayBytes64 => VmDynamicValue::ArrayBytes64(Vec::new()),
            VmType::ArrayString => VmDynamicValue::ArrayString(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VmNamedDynamicValue {
    pub name: SmallString,
    pub value: VmDynamicValue,
}

impl VmNamedDynamicValue {
    pub fn new(name: SmallString, value: VmDynamicValue) -> Self {
        Self { name, value }
    }
}

/// A struct value in canonical form: fields sorted by name ascending.
///
/// The only constructors sort, so every instance observed through this type
/// is canonical and lookups can binary-search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VmDynamicStruct {
    fields: Vec<VmNamedDynamicValue>,
}

impl VmDynamicStruct {
    pub fn sorted(mut fields: Vec<VmNamedDynamicValue>) -> Self {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Self { fields }
    }

    pub fn fields(&self) -> &[VmNamedDynamicValue] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &SmallString) -> Option<&VmDynamicValue> {
        self.fields
            .binary_search_by(|f| f.name.cmp(name))
            .ok()
            .map(|i| &self.fields[i].value)
    }

    /// Overlay `updates` onto `old`: a null update removes the field, any
    /// other update replaces it, untouched fields survive.
    pub fn merge(old: &Self, updates: &Self) -> Self {
        let mut fields = Vec::with_capacity(old.len() + updates.len());
        for field in &old.fields {
            if updates.get(&field.name).is_none() {
                fields.push(field.clone());
            }
        }
        for field in &updates.fields {
            if !field.value.is_null() {
                fields.push(field.clone());
            }
        }
        Self::sorted(fields)
    }
}

/* Schema-less codec ******************************************************* */

/// Write the self-describing form: one type byte, then the body.
pub fn write_dynamic(w: &mut WriteView, value: &VmDynamicValue) -> Result<(), Error> {
    w.write_u8(value.vm_type().to_byte());
    write_body(w, value, None)
}

/// Read the self-describing form.
pub fn read_dynamic(r: &mut ReadView) -> Result<VmDynamicValue, Error> {
    let tag = r.read_u8();
    r.result()?;
    let vm_type = match VmType::from_byte(tag) {
        Ok(t) => t,
        Err(e) => {
            r.fail();
            return Err(e);
        }
    };
    read_body(r, vm_type, None)
}

fn write_named(w: &mut WriteView, field: &VmNamedDynamicValue) -> Result<(), Error> {
    write_small_string(w, &field.name);
    write_dynamic(w, &field.value)
}

fn read_named(r: &mut ReadView) -> Result<VmNamedDynamicValue, Error> {
    let name = read_small_string(r)?;
    let value = read_dynamic(r)?;
    Ok(VmNamedDynamicValue { name, value })
}

/// Write a struct with inline names: count, then `name || tag || body` per
/// field in canonical order.
pub fn write_struct(w: &mut WriteView, value: &VmDynamicStruct) -> Result<(), Error> {
    w.write_i32(value.len() as i32);
    for field in value.fields() {
        write_named(w, field)?;
    }
    Ok(())
}

pub fn read_struct(r: &mut ReadView) -> Result<VmDynamicStruct, Error> {
    let count = read_count(r)?;
    let mut fields = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        fields.push(read_named(r)?);
    }
    Ok(VmDynamicStruct::sorted(fields))
}

fn write_body(
    w: &mut WriteView,
    value: &VmDynamicValue,
    schema: Option<&VmStructSchema>,
) -> Result<(), Error> {
    match value {
        VmDynamicValue::Null => {
            // a vacant dynamic slot is spelled as an empty dynamic array
            w.write_u8(VmType::ArrayDynamic.to_byte());
            w.write_i32(0);
            Ok(())
        }
        VmDynamicValue::Dynamic(inner) => write_dynamic(w, inner),
        VmDynamicValue::Bytes(bytes) => {
            write_byte_array(w, bytes);
            Ok(())
        }
        VmDynamicValue::Struct(s) => match schema {
            Some(schema) => write_struct_with_schema(w, s, schema),
            None => write_struct(w, s),
        },
        VmDynamicValue::Int8(v) => {
            w.write_u8(*v);
            Ok(())
        }
        VmDynamicValue::Int16(v) => {
            w.write_u16(*v);
            Ok(())
        }
        VmDynamicValue::Int32(v) => {
            w.write_u32(*v);
            Ok(())
        }
        VmDynamicValue::Int64(v) => {
            w.write_u64(*v);
            Ok(())
        }
        VmDynamicValue::Int256(v) => {
            write_int256(w, v);
            Ok(())
        }
        VmDynamicValue::Bytes16(v) => {
            write_bytes_n(w, v);
            Ok(())
        }
        VmDynamicValue::Bytes32(v) => {
            write_bytes_n(w, v);
            Ok(())
        }
        VmDynamicValue::Bytes64(v) => {
            write_bytes_n(w, v);
            Ok(())
        }
        VmDynamicValue::String(s) => Ok(write_sz(w, s)?),
        VmDynamicValue::ArrayDynamic(items) => {
            w.write_i32(items.len() as i32);
            for item in items {
                write_dynamic(w, item)?;
            }
            Ok(())
        }
        VmDynamicValue::ArrayBytes(items) => {
            write_array_of_arrays(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayStruct(array) => {
            w.write_i32(array.items.len() as i32);
            let inline = schema.or_else(|| {
                if array.schema.is_empty() {
                    None
                } else {
                    Some(&array.schema)
                }
            });
            // with no outer schema the element schema travels inline, once
            if schema.is_none() {
                if let Some(element_schema) = inline {
                    element_schema.write(w);
                }
            }
            for item in &array.items {
                match inline {
                    Some(element_schema) => write_struct_with_schema(w, item, element_schema)?,
                    None => write_struct(w, item)?,
                }
            }
            Ok(())
        }
        VmDynamicValue::ArrayInt8(items) => {
            write_array_u8(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayInt16(items) => {
            write_array_u16(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayInt32(items) => {
            write_array_u32(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayInt64(items) => {
            write_array_u64(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayInt256(items) => {
            phantasma_math::write_array_int256(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayBytes16(items) => {
            write_array_bytes_n(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayBytes32(items) => {
            write_array_bytes_n(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayBytes64(items) => {
            write_array_bytes_n(w, items);
            Ok(())
        }
        VmDynamicValue::ArrayString(items) => Ok(write_array_sz(w, items)?),
    }
}

fn read_body(
    r: &mut ReadView,
    vm_type: VmType,
    schema: Option<&VmStructSchema>,
) -> Result<VmDynamicValue, Error> {
    let value = match vm_type {
        VmType::Dynamic => VmDynamicValue::Dynamic(Box::new(read_dynamic(r)?)),
        VmType::Bytes => VmDynamicValue::Bytes(read_byte_array(r)?),
        VmType::Struct => match schema {
            Some(schema) => VmDynamicValue::Struct(read_struct_with_schema(r, schema)?),
            None => VmDynamicValue::Struct(read_struct(r)?),
        },
        VmType::Int8 => {
            let v = r.read_u8();
            r.result()?;
            VmDynamicValue::Int8(v)
        }
        VmType::Int16 => {
            let v = r.read_u16();
            r.result()?;
            VmDynamicValue::Int16(v)
        }
        VmType::Int32 => {
            let v = r.read_u32();
            r.result()?;
            VmDynamicValue::Int32(v)
        }
        VmType::Int64 => {
            let v = r.read_u64();
            r.result()?;
            VmDynamicValue::Int64(v)
        }
        VmType::Int256 => VmDynamicValue::Int256(read_int256(r)?),
        VmType::Bytes16 => VmDynamicValue::Bytes16(read_bytes_n(r)?),
        VmType::Bytes32 => VmDynamicValue::Bytes32(read_bytes_n(r)?),
        VmType::Bytes64 => VmDynamicValue::Bytes64(read_bytes_n(r)?),
        VmType::String => VmDynamicValue::String(read_sz(r)?),
        VmType::ArrayDynamic => {
            let count = read_count(r)?;
            let mut items = Vec::with_capacity(count.min(r.remaining()));
            for _ in 0..count {
                items.push(read_dynamic(r)?);
            }
            VmDynamicValue::ArrayDynamic(items)
        }
        VmType::ArrayBytes => VmDynamicValue::ArrayBytes(read_array_of_arrays(r)?),
        VmType::ArrayStruct => {
            let count = read_count(r)?;
            if count == 0 {
                VmDynamicValue::ArrayStruct(VmStructArray::default())
            } else {
                let element_schema = match schema {
                    Some(schema) => schema.clone(),
                    None => VmStructSchema::read(r)?,
                };
                let mut items = Vec::with_capacity(count.min(r.remaining()));
                for _ in 0..count {
                    items.push(read_struct_with_schema(r, &element_schema)?);
                }
                VmDynamicValue::ArrayStruct(VmStructArray {
                    schema: element_schema,
                    items,
                })
            }
        }
        VmType::ArrayInt8 => VmDynamicValue::ArrayInt8(read_array_u8(r)?),
        VmType::ArrayInt16 => VmDynamicValue::ArrayInt16(read_array_u16(r)?),
        VmType::ArrayInt32 => VmDynamicValue::ArrayInt32(read_array_u32(r)?),
        VmType::ArrayInt64 => VmDynamicValue::ArrayInt64(read_array_u64(r)?),
        VmType::ArrayInt256 => VmDynamicValue::ArrayInt256(phantasma_math::read_array_int256(r)?),
        VmType::ArrayBytes16 => VmDynamicValue::ArrayBytes16(read_array_bytes_n(r)?),
        VmType::ArrayBytes32 => VmDynamicValue::ArrayBytes32(read_array_bytes_n(r)?),
        VmType::ArrayBytes64 => VmDynamicValue::ArrayBytes64(read_array_bytes_n(r)?),
        VmType::ArrayString => VmDynamicValue::ArrayString(read_array_sz(r)?),
    };
    Ok(value)
}

/* Schema-directed codec *************************************************** */

/// Write the body of a value as declared by `schema`, without a type tag.
/// A value of the wrong runtime type degrades to the declared type's zero
/// value; the error reports it after the write completes.
pub fn write_with_schema(
    w: &mut WriteView,
    value: &VmDynamicValue,
    schema: &VmVariableSchema,
) -> Result<(), Error> {
    if value.vm_type() != schema.vm_type {
        // zero bodies only fail on their own missing nested fields, which
        // is subsumed by the mismatch being reported here
        let zero = VmDynamicValue::zero(schema.vm_type);
        let _ = write_body(w, &zero, schema.nested());
        return Err(Error::SchemaTypeMismatch(String::new()));
    }
    write_body(w, value, schema.nested())
}

/// Read the body of a value as declared by `schema`.
pub fn read_with_schema(
    r: &mut ReadView,
    schema: &VmVariableSchema,
) -> Result<VmDynamicValue, Error> {
    read_body(r, schema.vm_type, schema.nested())
}

/// Write a struct's fields in schema order, then the extras block when the
/// schema allows dynamic extras. Missing or mismatched fields are replaced
/// by zero values of the declared type; serialization keeps going and the
/// first such violation is reported once the bytes are out.
pub fn write_struct_with_schema(
    w: &mut WriteView,
    value: &VmDynamicStruct,
    schema: &VmStructSchema,
) -> Result<(), Error> {
    let mut violation: Option<Error> = None;
    let mut fields_found = 0usize;

    for declared in &schema.fields {
        match value.get(&declared.name) {
            Some(field) => {
                fields_found += 1;
                if let Err(e) = write_with_schema(w, field, &declared.schema) {
                    let named = match e {
                        Error::SchemaTypeMismatch(_) => {
                            Error::SchemaTypeMismatch(declared.name.to_string())
                        }
                        other => other,
                    };
                    violation.get_or_insert(named);
                }
            }
            None => {
                let zero = VmDynamicValue::zero(declared.schema.vm_type);
                write_body(w, &zero, declared.schema.nested())?;
                violation.get_or_insert(Error::MissingSchemaField(declared.name.to_string()));
            }
        }
    }

    if !schema.flags.contains(SchemaFlags::DYNAMIC_EXTRAS) {
        return match violation {
            Some(e) => Err(e),
            None => Ok(()),
        };
    }

    if fields_found == schema.len() && schema.len() == value.len() {
        w.write_i32(0);
    } else {
        let extras: Vec<&VmNamedDynamicValue> = value
            .fields()
            .iter()
            .filter(|f| schema.field(&f.name).is_none())
            .collect();
        w.write_i32(extras.len() as i32);
        for extra in extras {
            write_named(w, extra)?;
        }
    }

    match violation {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Read a struct driven by `schema`: declared fields in schema order, then
/// — when the schema allows them — the extras block. The result is
/// re-sorted to canonical order.
pub fn read_struct_with_schema(
    r: &mut ReadView,
    schema: &VmStructSchema,
) -> Result<VmDynamicStruct, Error> {
    if schema.is_empty() && !schema.flags.contains(SchemaFlags::DYNAMIC_EXTRAS) {
        return Ok(VmDynamicStruct::default());
    }
    let mut fields = Vec::with_capacity(schema.len());
    for declared in &schema.fields {
        let value = read_with_schema(r, &declared.schema)?;
        fields.push(VmNamedDynamicValue {
            name: declared.name.clone(),
            value,
        });
    }

    if schema.flags.contains(SchemaFlags::DYNAMIC_EXTRAS) {
        let extras = read_count(r)?;
        for _ in 0..extras {
            fields.push(read_named(r)?);
        }
    }
    Ok(VmDynamicStruct::sorted(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn name(s: &str) -> SmallString {
        SmallString::new(s).unwrap()
    }

    fn roundtrip_body(vm_type: VmType, value: VmDynamicValue) -> VmDynamicValue {
        let mut w = WriteView::new();
        write_body(&mut w, &value, None).unwrap();
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        let out = read_body(&mut r, vm_type, None).unwrap();
        assert!(r.finished(), "trailing bytes after {vm_type:?}");
        out
    }

    #[test_case(VmDynamicValue::Int8(0))]
    #[test_case(VmDynamicValue::Int8(255))]
    #[test_case(VmDynamicValue::Int16(0x8000))]
    #[test_case(VmDynamicValue::Int32(0xDEAD_BEEF))]
    #[test_case(VmDynamicValue::Int64(u64::MAX))]
    #[test_case(VmDynamicValue::String("hello world".into()))]
    #[test_case(VmDynamicValue::Bytes(vec![0, 1, 2, 3]))]
    #[test_case(VmDynamicValue::ArrayInt64(vec![1, 2, 3]))]
    #[test_case(VmDynamicValue::ArrayString(vec!["alpha".into(), "beta".into()]))]
    fn body_roundtrip(value: VmDynamicValue) {
        assert_eq!(roundtrip_body(value.vm_type(), value.clone()), value);
    }

    #[test]
    fn int256_body_roundtrip() {
        let value = VmDynamicValue::Int256(
            Int256::from_str_radix("1234567890123456789012345678901234567890", 10).unwrap(),
        );
        assert_eq!(roundtrip_body(VmType::Int256, value.clone()), value);
    }

    #[test]
    fn fixed_width_bodies_are_raw() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let value = VmDynamicValue::Bytes32(Bytes32::new(bytes));
        let mut w = WriteView::new();
        write_body(&mut w, &value, None).unwrap();
        assert_eq!(w.as_slice(), &bytes);
        assert_eq!(roundtrip_body(VmType::Bytes32, value.clone()), value);
    }

    #[test]
    fn struct_writes_canonical_order() {
        let s = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("url"), VmDynamicValue::String("u".into())),
            VmNamedDynamicValue::new(name("name"), VmDynamicValue::String("n".into())),
            VmNamedDynamicValue::new(name("icon"), VmDynamicValue::String("i".into())),
        ]);
        assert_eq!(s.fields()[0].name, name("icon"));
        assert_eq!(s.fields()[2].name, name("url"));

        let mut w = WriteView::new();
        write_struct(&mut w, &s).unwrap();
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        assert_eq!(read_struct(&mut r).unwrap(), s);
    }

    #[test]
    fn struct_lookup() {
        let s = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("b"), VmDynamicValue::Int8(2)),
            VmNamedDynamicValue::new(name("a"), VmDynamicValue::Int8(1)),
        ]);
        assert_eq!(s.get(&name("a")), Some(&VmDynamicValue::Int8(1)));
        assert_eq!(s.get(&name("c")), None);
    }

    #[test]
    fn merge_overlays_and_deletes() {
        let old = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("keep"), VmDynamicValue::Int8(1)),
            VmNamedDynamicValue::new(name("replace"), VmDynamicValue::Int8(2)),
            VmNamedDynamicValue::new(name("drop"), VmDynamicValue::Int8(3)),
        ]);
        let updates = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("replace"), VmDynamicValue::Int8(20)),
            VmNamedDynamicValue::new(name("drop"), VmDynamicValue::Null),
            VmNamedDynamicValue::new(name("new"), VmDynamicValue::Int8(4)),
        ]);
        let merged = VmDynamicStruct::merge(&old, &updates);
        assert_eq!(merged.get(&name("keep")), Some(&VmDynamicValue::Int8(1)));
        assert_eq!(merged.get(&name("replace")), Some(&VmDynamicValue::Int8(20)));
        assert_eq!(merged.get(&name("new")), Some(&VmDynamicValue::Int8(4)));
        assert_eq!(merged.get(&name("drop")), None);
        assert_eq!(merged.len(), 3);
    }

    fn sample_schema(extras: bool) -> VmStructSchema {
        VmStructSchema::sorted(
            vec![
                VmNamedVariableSchema {
                    name: name("amount"),
                    schema: VmVariableSchema::plain(VmType::Int32),
                },
                VmNamedVariableSchema {
                    name: name("label"),
                    schema: VmVariableSchema::plain(VmType::String),
                },
            ],
            extras,
        )
    }

    #[test]
    fn schema_roundtrip_without_extras() {
        let schema = sample_schema(false);
        let value = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("label"), VmDynamicValue::String("x".into())),
            VmNamedDynamicValue::new(name("amount"), VmDynamicValue::Int32(7)),
        ]);

        let mut w = WriteView::new();
        write_struct_with_schema(&mut w, &value, &schema).unwrap();
        let buf = w.into_inner();
        // no tags, no names: i32 + sz-string
        assert_eq!(buf.len(), 4 + 2);

        let mut r = ReadView::new(&buf);
        assert_eq!(read_struct_with_schema(&mut r, &schema).unwrap(), value);
        assert!(r.finished());
    }

    #[test]
    fn schema_roundtrip_with_extras() {
        let schema = sample_schema(true);
        let value = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("amount"), VmDynamicValue::Int32(7)),
            VmNamedDynamicValue::new(name("label"), VmDynamicValue::String("x".into())),
            VmNamedDynamicValue::new(name("zebra"), VmDynamicValue::Int8(9)),
        ]);

        let mut w = WriteView::new();
        write_struct_with_schema(&mut w, &value, &schema).unwrap();
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        assert_eq!(read_struct_with_schema(&mut r, &schema).unwrap(), value);
    }

    #[test]
    fn schema_missing_field_writes_zero_and_reports() {
        let schema = sample_schema(false);
        let value = VmDynamicStruct::sorted(vec![VmNamedDynamicValue::new(
            name("label"),
            VmDynamicValue::String("x".into()),
        )]);

        let mut w = WriteView::new();
        let err = write_struct_with_schema(&mut w, &value, &schema).unwrap_err();
        assert_eq!(err, Error::MissingSchemaField("amount".into()));
        // the buffer still holds a complete record: zero amount + label
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        let decoded = read_struct_with_schema(&mut r, &schema).unwrap();
        assert_eq!(decoded.get(&name("amount")), Some(&VmDynamicValue::Int32(0)));
    }

    #[test]
    fn schema_type_mismatch_reports_field() {
        let schema = sample_schema(false);
        let value = VmDynamicStruct::sorted(vec![
            VmNamedDynamicValue::new(name("amount"), VmDynamicValue::String("seven".into())),
            VmNamedDynamicValue::new(name("label"), VmDynamicValue::String("x".into())),
        ]);
        let mut w = WriteView::new();
        let err = write_struct_with_schema(&mut w, &value, &schema).unwrap_err();
        assert_eq!(err, Error::SchemaTypeMismatch("amount".into()));
    }

    #[test]
    fn array_struct_inlines_its_schema_once() {
        let element_schema = VmStructSchema::sorted(
            vec![VmNamedVariableSchema {
                name: name("n"),
                schema: VmVariableSchema::plain(VmType::Int8),
            }],
            false,
        );
        let items = vec![
            VmDynamicStruct::sorted(vec![VmNamedDynamicValue::new(
                name("n"),
                VmDynamicValue::Int8(1),
            )]),
            VmDynamicStruct::sorted(vec![VmNamedDynamicValue::new(
                name("n"),
                VmDynamicValue::Int8(2),
            )]),
        ];
        let value = VmDynamicValue::ArrayStruct(VmStructArray {
            schema: element_schema.clone(),
            items: items.clone(),
        });

        let mut w = WriteView::new();
        write_body(&mut w, &value, None).unwrap();
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        match read_body(&mut r, VmType::ArrayStruct, None).unwrap() {
            VmDynamicValue::ArrayStruct(array) => {
                assert_eq!(array.schema, element_schema);
                assert_eq!(array.items, items);
            }
            other => panic!("expected a struct array, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_wraps_inner_value() {
        let value = VmDynamicValue::Dynamic(Box::new(VmDynamicValue::Int8(42)));
        let mut w = WriteView::new();
        write_dynamic(&mut w, &value).unwrap();
        // outer Dynamic tag, inner Int8 tag, one payload byte
        assert_eq!(w.as_slice(), &[0x00, 0x06, 42]);
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        assert_eq!(read_dynamic(&mut r).unwrap(), value);
    }

    #[test]
    fn null_serializes_as_empty_dynamic_array() {
        let mut w = WriteView::new();
        write_dynamic(&mut w, &VmDynamicValue::Null).unwrap();
        assert_eq!(w.as_slice(), &[0x00, 0x01, 0, 0, 0, 0]);
    }

    #[test]
    fn unknown_tag_fails() {
        let mut r = ReadView::new(&[0x42]);
        assert_eq!(read_dynamic(&mut r), Err(Error::UnknownVmType(0x42)));
        assert!(r.failure());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bytes_body_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
                let value = VmDynamicValue::Bytes(data);
                prop_assert_eq!(roundtrip_body(VmType::Bytes, value.clone()), value);
            }

            #[test]
            fn int64_array_body_roundtrip(items in proptest::collection::vec(any::<u64>(), 0..64)) {
                let value = VmDynamicValue::ArrayInt64(items);
                prop_assert_eq!(roundtrip_body(VmType::ArrayInt64, value.clone()), value);
            }

            #[test]
            fn string_array_body_roundtrip(items in proptest::collection::vec("[a-zA-Z0-9 ._-]{0,24}", 0..16)) {
                let value = VmDynamicValue::ArrayString(items);
                prop_assert_eq!(roundtrip_body(VmType::ArrayString, value.clone()), value);
            }
        }
    }

    #[test]
    fn schema_wire_form_roundtrip() {
        let nested = VmStructSchema::sorted(
            vec![VmNamedVariableSchema {
                name: name("inner"),
                schema: VmVariableSchema::plain(VmType::String),
            }],
            false,
        );
        let schema = VmStructSchema::sorted(
            vec![
                VmNamedVariableSchema {
                    name: name("rom"),
                    schema: VmVariableSchema::plain(VmType::Bytes),
                },
                VmNamedVariableSchema {
                    name: name("details"),
                    schema: VmVariableSchema::with_structure(VmType::Struct, nested),
                },
            ],
            true,
        );

        let mut w = WriteView::new();
        schema.write(&mut w);
        let buf = w.into_inner();
        let mut r = ReadView::new(&buf);
        assert_eq!(VmStructSchema::read(&mut r).unwrap(), schema);
        assert!(r.finished());
    }
}
