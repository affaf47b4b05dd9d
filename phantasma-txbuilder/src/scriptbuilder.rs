//! Builder for legacy Phantasma VM scripts
//!
//! A script is a flat stream of one-byte opcodes and operands. The builder
//! only ever appends; the high-level helpers follow the calling convention
//! of the on-chain contracts: arguments are pushed in reverse order, then
//! the method name, then a CTX/SWITCH pair binds and enters the contract
//! context. Every load goes through register 0.

use phantasma_addresses::Address;
use phantasma_codec::{legacy::write_var_int, WriteView};
use phantasma_math::{Int256, IntX};

use crate::Error;

/// The complete opcode table of the legacy VM. Values are wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    // register
    Move = 1,
    Copy = 2,
    Push = 3,
    Pop = 4,
    Swap = 5,
    // flow
    Call = 6,
    ExtCall = 7,
    Jmp = 8,
    JmpIf = 9,
    JmpNot = 10,
    Ret = 11,
    Throw = 12,
    // data
    Load = 13,
    Cast = 14,
    Cat = 15,
    Range = 16,
    Left = 17,
    Right = 18,
    Size = 19,
    Count = 20,
    // logical
    Not = 21,
    And = 22,
    Or = 23,
    Xor = 24,
    Equal = 25,
    Lt = 26,
    Gt = 27,
    Lte = 28,
    Gte = 29,
    // numeric
    Inc = 30,
    Dec = 31,
    Sign = 32,
    Negate = 33,
    Abs = 34,
    Add = 35,
    Sub = 36,
    Mul = 37,
    Div = 38,
    Mod = 39,
    Shl = 40,
    Shr = 41,
    Min = 42,
    Max = 43,
    Pow = 44,
    // context
    Ctx = 45,
    Switch = 46,
    // array
    Put = 47,
    Get = 48,
    Clear = 49,
    Unpack = 50,
    Pack = 51,
    // debugger
    Debug = 52,
}

impl Opcode {
    /// Gas charged per opcode by the on-chain interpreter.
    pub fn gas_cost(self) -> u64 {
        match self {
            Opcode::Get | Opcode::Put | Opcode::Call | Opcode::Load => 5,
            Opcode::ExtCall | Opcode::Ctx => 10,
            Opcode::Switch => 100,
            Opcode::Nop | Opcode::Ret => 0,
            _ => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Move => "MOVE",
            Opcode::Copy => "COPY",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Swap => "SWAP",
            Opcode::Call => "CALL",
            Opcode::ExtCall => "EXTCALL",
            Opcode::Jmp => "JMP",
            Opcode::JmpIf => "JMPIF",
            Opcode::JmpNot => "JMPNOT",
            Opcode::Ret => "RET",
            Opcode::Throw => "THROW",
            Opcode::Load => "LOAD",
            Opcode::Cast => "CAST",
            Opcode::Cat => "CAT",
            Opcode::Range => "RANGE",
            Opcode::Left => "LEFT",
            Opcode::Right => "RIGHT",
            Opcode::Size => "SIZE",
            Opcode::Count => "COUNT",
            Opcode::Not => "NOT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Equal => "EQUAL",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Lte => "LTE",
            Opcode::Gte => "GTE",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Sign => "SIGN",
            Opcode::Negate => "NEGATE",
            Opcode::Abs => "ABS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Min => "MIN",
            Opcode::Max => "MAX",
            Opcode::Pow => "POW",
            Opcode::Ctx => "CTX",
            Opcode::Switch => "SWITCH",
            Opcode::Put => "PUT",
            Opcode::Get => "GET",
            Opcode::Clear => "CLEAR",
            Opcode::Unpack => "UNPACK",
            Opcode::Pack => "PACK",
            Opcode::Debug => "DEBUG",
        }
    }
}

/// The legacy VM value-type byte carried by `LOAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VmValueType {
    None = 0,
    Struct = 1,
    Bytes = 2,
    Number = 3,
    String = 4,
    Timestamp = 5,
    Bool = 6,
    Enum = 7,
    Object = 8,
}

/// How `LOAD` frames its operand length.
///
/// The first protocol revision wrote a single length byte, capping operands
/// at 255 bytes; later revisions use the full VarInt. Both are live on
/// chain, so the builder keeps both paths and the caller picks at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorVersion {
    V0,
    #[default]
    Latest,
}

/// A value pushed as a contract-call argument.
#[derive(Debug, Clone)]
pub enum ScriptArg {
    Number(Int256),
    String(String),
    Bytes(Vec<u8>),
    Address(Address),
    Bool(bool),
}

impl From<i64> for ScriptArg {
    fn from(v: i64) -> Self {
        ScriptArg::Number(Int256::from(v))
    }
}

impl From<i32> for ScriptArg {
    fn from(v: i32) -> Self {
        ScriptArg::Number(Int256::from(v as i64))
    }
}

impl From<Int256> for ScriptArg {
    fn from(v: Int256) -> Self {
        ScriptArg::Number(v)
    }
}

impl From<IntX> for ScriptArg {
    fn from(v: IntX) -> Self {
        ScriptArg::Number(v.to_int256())
    }
}

impl From<&str> for ScriptArg {
    fn from(v: &str) -> Self {
        ScriptArg::String(v.to_string())
    }
}

impl From<String> for ScriptArg {
    fn from(v: String) -> Self {
        ScriptArg::String(v)
    }
}

impl From<&Address> for ScriptArg {
    fn from(v: &Address) -> Self {
        ScriptArg::Address(*v)
    }
}

impl From<Address> for ScriptArg {
    fn from(v: Address) -> Self {
        ScriptArg::Address(v)
    }
}

impl From<Vec<u8>> for ScriptArg {
    fn from(v: Vec<u8>) -> Self {
        ScriptArg::Bytes(v)
    }
}

impl From<bool> for ScriptArg {
    fn from(v: bool) -> Self {
        ScriptArg::Bool(v)
    }
}

/// Appends opcodes and operands to a growing byte buffer; `end_script`
/// terminates with `RET` and returns the bytes.
pub struct ScriptBuilder {
    writer: WriteView,
    version: BehaviorVersion,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::with_version(BehaviorVersion::default())
    }

    pub fn with_version(version: BehaviorVersion) -> Self {
        Self {
            writer: WriteView::new(),
            version,
        }
    }

    pub fn emit(mut self, opcode: Opcode) -> Self {
        self.writer.write_u8(opcode as u8);
        self
    }

    /// `LOAD reg, type, length, bytes`.
    pub fn emit_load(mut self, reg: u8, bytes: &[u8], ty: VmValueType) -> Result<Self, Error> {
        if self.version == BehaviorVersion::V0 && bytes.len() > 0xFF {
            return Err(Error::OperandTooLong);
        }
        self.writer.write_u8(Opcode::Load as u8);
        self.writer.write_u8(reg);
        self.writer.write_u8(ty as u8);
        match self.version {
            BehaviorVersion::V0 => self.writer.write_u8(bytes.len() as u8),
            BehaviorVersion::Latest => write_var_int(&mut self.writer, bytes.len() as u64),
        }
        self.writer.write_bytes(bytes);
        Ok(self)
    }

    pub fn emit_load_number(self, reg: u8, value: &Int256) -> Result<Self, Error> {
        self.emit_load(reg, &value.to_signed_bytes(), VmValueType::Number)
    }

    pub fn emit_load_string(self, reg: u8, value: &str) -> Result<Self, Error> {
        self.emit_load(reg, value.as_bytes(), VmValueType::String)
    }

    /// Addresses load as their legacy serialization, a VarInt-framed byte
    /// array, typed as raw bytes.
    pub fn emit_load_address(self, reg: u8, value: &Address) -> Result<Self, Error> {
        let mut operand = WriteView::with_capacity(Address::LENGTH + 1);
        phantasma_codec::legacy::write_var_bytes(&mut operand, value.as_ref());
        self.emit_load(reg, operand.as_slice(), VmValueType::Bytes)
    }

    pub fn emit_push(mut self, reg: u8) -> Self {
        self.writer.write_u8(Opcode::Push as u8);
        self.writer.write_u8(reg);
        self
    }

    fn load_and_push(self, arg: &ScriptArg) -> Result<Self, Error> {
        let loaded = match arg {
            ScriptArg::Number(v) => self.emit_load_number(0, v)?,
            ScriptArg::String(v) => self.emit_load_string(0, v)?,
            ScriptArg::Bytes(v) => self.emit_load(0, v, VmValueType::Bytes)?,
            ScriptArg::Address(v) => self.emit_load_address(0, v)?,
            ScriptArg::Bool(v) => self.emit_load(0, &[*v as u8], VmValueType::Bool)?,
        };
        Ok(loaded.emit_push(0))
    }

    /// Call `method` of `contract`: arguments pushed in reverse, then the
    /// method name, then the contract context is bound and entered.
    pub fn call_contract(
        mut self,
        contract: &str,
        method: &str,
        args: &[ScriptArg],
    ) -> Result<Self, Error> {
        for arg in args.iter().rev() {
            self = self.load_and_push(arg)?;
        }
        self = self.emit_load_string(0, method)?.emit_push(0);
        self = self.emit_load_string(0, contract)?;
        self.writer.write_u8(Opcode::Ctx as u8);
        self.writer.write_u8(0);
        self.writer.write_u8(1);
        self.writer.write_u8(Opcode::Switch as u8);
        self.writer.write_u8(1);
        Ok(self)
    }

    /// Offer gas for the transaction: `gas.AllowGas(from, target, price, limit)`.
    pub fn allow_gas(
        self,
        from: &Address,
        target: &Address,
        gas_price: impl Into<Int256>,
        gas_limit: impl Into<Int256>,
    ) -> Result<Self, Error> {
        self.call_contract(
            "gas",
            "AllowGas",
            &[
                from.into(),
                target.into(),
                gas_price.into().into(),
                gas_limit.into().into(),
            ],
        )
    }

    /// Settle the gas offer: `gas.SpendGas(from)`.
    pub fn spend_gas(self, from: &Address) -> Result<Self, Error> {
        self.call_contract("gas", "SpendGas", &[from.into()])
    }

    pub fn transfer_tokens(
        self,
        symbol: &str,
        from: &Address,
        to: &Address,
        amount: impl Into<Int256>,
    ) -> Result<Self, Error> {
        self.call_contract(
            "token",
            "TransferTokens",
            &[from.into(), to.into(), symbol.into(), amount.into().into()],
        )
    }

    /// Terminate with `RET` and hand back the script bytes.
    pub fn end_script(mut self) -> Vec<u8> {
        self.writer.write_u8(Opcode::Ret as u8);
        self.writer.into_inner()
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
