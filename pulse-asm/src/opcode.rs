use std::convert::TryFrom;
use std::fmt;

/// Byte-level opcode table of the engine.
///
/// The interpreter dispatches on this representation after reading a single
/// opcode byte; any operands follow in the instruction stream as
/// little-endian immediates. Most families come in a "short" form with the
/// operand baked into the opcode byte (`..0`-`..6`) and "wide" forms that
/// read an 8/16/32-bit immediate, so small indices cost a single byte on the
/// wire.
///
/// Suffix conventions:
///
/// - `0`..`6` — implicit operand, no immediate bytes.
/// - `I8`/`I16`/`I32` — signed little-endian immediate (literals, locals
///   addressed relative to the base pointer, jump displacements).
/// - `U8`/`U16`/`U32` — unsigned little-endian immediate (registry indices,
///   counts).
///
/// `Ref` variants additionally maintain the reference count of the value
/// they transfer: reads increment the referent, writes drop the previous
/// occupant of the destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[repr(u8)]
pub enum OpcodeRepr {
    Nil = 0x02,
    Not = 0x03,
    Neg = 0x04,
    Add = 0x05,
    Sub = 0x06,
    Mul = 0x07,
    Div = 0x08,
    Mod = 0x09,
    Shl = 0x0a,
    Shr = 0x0b,
    Lt = 0x0c,
    Le = 0x0d,
    Gt = 0x0e,
    Ge = 0x0f,
    Eq = 0x10,
    Ne = 0x11,
    And = 0x12,
    Or = 0x13,
    Xor = 0x14,
    Ret = 0x15,
    Print = 0x16,
    PrintObj = 0x17,
    Halt = 0x18,
    Dup = 0x19,
    PushTrue = 0x1a,
    PushFalse = 0x1b,
    Abort = 0x1c,
    Int0 = 30,
    Int1 = 31,
    Int2 = 32,
    Int3 = 33,
    Int4 = 34,
    Int5 = 35,
    Int6 = 36,
    IntI8 = 37,
    IntI16 = 38,
    IntI32 = 39,
    GetLocal0 = 40,
    GetLocal1 = 41,
    GetLocal2 = 42,
    GetLocal3 = 43,
    GetLocal4 = 44,
    GetLocal5 = 45,
    GetLocal6 = 46,
    GetLocalI8 = 47,
    GetLocalI16 = 48,
    GetLocalI32 = 49,
    SetLocal0 = 50,
    SetLocal1 = 51,
    SetLocal2 = 52,
    SetLocal3 = 53,
    SetLocal4 = 54,
    SetLocal5 = 55,
    SetLocal6 = 56,
    SetLocalI8 = 57,
    SetLocalI16 = 58,
    SetLocalI32 = 59,
    AllocLocal1 = 61,
    AllocLocal2 = 62,
    AllocLocal3 = 63,
    AllocLocal4 = 64,
    AllocLocal5 = 65,
    AllocLocal6 = 66,
    AllocLocalU8 = 67,
    AllocLocalU16 = 68,
    AllocLocalU32 = 69,
    Pop1 = 71,
    Pop2 = 72,
    Pop3 = 73,
    Pop4 = 74,
    Pop5 = 75,
    Pop6 = 76,
    PopU8 = 77,
    PopU16 = 78,
    PopU32 = 79,
    Jne8 = 80,
    Jne16 = 81,
    Jne32 = 82,
    Je8 = 83,
    Je16 = 84,
    Je32 = 85,
    J8 = 86,
    J16 = 87,
    J32 = 88,
    GetLast0 = 90,
    GetLast1 = 91,
    GetLast2 = 92,
    GetLast3 = 93,
    GetLastU8 = 94,
    GetLastU16 = 95,
    GetLastU32 = 96,
    SetNodeU8 = 97,
    SetNodeU16 = 98,
    SetNodeU32 = 99,
    ObjField0 = 100,
    ObjField1 = 101,
    ObjField2 = 102,
    ObjField3 = 103,
    ObjField4 = 104,
    ObjField5 = 105,
    ObjField6 = 106,
    UpdDev0 = 110,
    UpdDev1 = 111,
    UpdDev2 = 112,
    UpdDev3 = 113,
    UpdDevU8 = 114,
    UpdNodeU8 = 117,
    UpdNodeU16 = 118,
    UpdNodeU32 = 119,
    Output0 = 120,
    Output1 = 121,
    Output2 = 122,
    Output3 = 123,
    OutputU8 = 124,
    CallU8 = 127,
    CallU16 = 128,
    CallU32 = 129,
    GetDataU8 = 130,
    GetDataU16 = 131,
    GetDataU32 = 132,
    GetNodeU8 = 133,
    GetNodeU16 = 134,
    GetNodeU32 = 135,
    SetDataU8 = 141,
    SetDataU16 = 142,
    SetDataU32 = 143,
    ObjTag = 144,
    SetLast0 = 150,
    SetLast1 = 151,
    SetLast2 = 152,
    SetLast3 = 153,
    SetLastU8 = 154,
    SetLastU16 = 155,
    SetLastU32 = 156,
    EndUpdU8 = 157,
    EndUpdU16 = 158,
    EndUpdU32 = 159,
    AllocObj0 = 160,
    AllocObj1 = 161,
    AllocObj2 = 162,
    AllocObj3 = 163,
    AllocObj4 = 164,
    AllocObj5 = 165,
    AllocObj6 = 166,
    AllocObjU8 = 167,
    DropLocal0 = 170,
    DropLocal1 = 171,
    DropLocal2 = 172,
    DropLocal3 = 173,
    DropLocal4 = 174,
    DropLocal5 = 175,
    DropLocal6 = 176,
    DropLocalI8 = 177,
    DropLocalI16 = 178,
    DropLocalI32 = 179,
    GetLocalRef0 = 180,
    GetLocalRef1 = 181,
    GetLocalRef2 = 182,
    GetLocalRef3 = 183,
    GetLocalRef4 = 184,
    GetLocalRef5 = 185,
    GetLocalRef6 = 186,
    GetLocalRefI8 = 187,
    GetLocalRefI16 = 188,
    GetLocalRefI32 = 189,
    SetLocalRef0 = 190,
    SetLocalRef1 = 191,
    SetLocalRef2 = 192,
    SetLocalRef3 = 193,
    SetLocalRef4 = 194,
    SetLocalRef5 = 195,
    SetLocalRef6 = 196,
    SetLocalRefI8 = 197,
    SetLocalRefI16 = 198,
    SetLocalRefI32 = 199,
    ObjFieldRef0 = 200,
    ObjFieldRef1 = 201,
    ObjFieldRef2 = 202,
    ObjFieldRef3 = 203,
    ObjFieldRef4 = 204,
    ObjFieldRef5 = 205,
    ObjFieldRef6 = 206,
    EndUpdObjU8 = 210,
    EndUpdObjU16 = 211,
    EndUpdObjU32 = 212,
    GetNodeRefU8 = 213,
    GetNodeRefU16 = 214,
    GetNodeRefU32 = 215,
    GetDataRefU8 = 216,
    GetDataRefU16 = 217,
    GetDataRefU32 = 218,
    GetLastRef0 = 220,
    GetLastRef1 = 221,
    GetLastRef2 = 222,
    GetLastRef3 = 223,
    GetLastRefU8 = 224,
    GetLastRefU16 = 225,
    GetLastRefU32 = 226,
    SetDataRefU8 = 227,
    SetDataRefU16 = 228,
    SetDataRefU32 = 229,
    SetLastRef0 = 230,
    SetLastRef1 = 231,
    SetLastRef2 = 232,
    SetLastRef3 = 233,
    SetLastRefU8 = 234,
    SetLastRefU16 = 235,
    SetLastRefU32 = 236,
    SetNodeRefU8 = 237,
    SetNodeRefU16 = 238,
    SetNodeRefU32 = 239,
    DropLastU8 = 240,
    DropLastU16 = 241,
    DropLastU32 = 242,
    J0 = 243,
    J1 = 244,
    Je0 = 245,
    Je1 = 246,
    Jne0 = 247,
    Jne1 = 248,
}

/// The byte is not a valid opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOpcode(pub u8);

impl fmt::Display for InvalidOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid opcode byte 0x{:02x}", self.0)
    }
}

impl std::error::Error for InvalidOpcode {}

impl From<OpcodeRepr> for u8 {
    fn from(op: OpcodeRepr) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for OpcodeRepr {
    type Error = InvalidOpcode;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        use OpcodeRepr::*;

        let op = match b {
            0x02 => Nil,
            0x03 => Not,
            0x04 => Neg,
            0x05 => Add,
            0x06 => Sub,
            0x07 => Mul,
            0x08 => Div,
            0x09 => Mod,
            0x0a => Shl,
            0x0b => Shr,
            0x0c => Lt,
            0x0d => Le,
            0x0e => Gt,
            0x0f => Ge,
            0x10 => Eq,
            0x11 => Ne,
            0x12 => And,
            0x13 => Or,
            0x14 => Xor,
            0x15 => Ret,
            0x16 => Print,
            0x17 => PrintObj,
            0x18 => Halt,
            0x19 => Dup,
            0x1a => PushTrue,
            0x1b => PushFalse,
            0x1c => Abort,
            30 => Int0,
            31 => Int1,
            32 => Int2,
            33 => Int3,
            34 => Int4,
            35 => Int5,
            36 => Int6,
            37 => IntI8,
            38 => IntI16,
            39 => IntI32,
            40 => GetLocal0,
            41 => GetLocal1,
            42 => GetLocal2,
            43 => GetLocal3,
            44 => GetLocal4,
            45 => GetLocal5,
            46 => GetLocal6,
            47 => GetLocalI8,
            48 => GetLocalI16,
            49 => GetLocalI32,
            50 => SetLocal0,
            51 => SetLocal1,
            52 => SetLocal2,
            53 => SetLocal3,
            54 => SetLocal4,
            55 => SetLocal5,
            56 => SetLocal6,
            57 => SetLocalI8,
            58 => SetLocalI16,
            59 => SetLocalI32,
            61 => AllocLocal1,
            62 => AllocLocal2,
            63 => AllocLocal3,
            64 => AllocLocal4,
            65 => AllocLocal5,
            66 => AllocLocal6,
            67 => AllocLocalU8,
            68 => AllocLocalU16,
            69 => AllocLocalU32,
            71 => Pop1,
            72 => Pop2,
            73 => Pop3,
            74 => Pop4,
            75 => Pop5,
            76 => Pop6,
            77 => PopU8,
            78 => PopU16,
            79 => PopU32,
            80 => Jne8,
            81 => Jne16,
            82 => Jne32,
            83 => Je8,
            84 => Je16,
            85 => Je32,
            86 => J8,
            87 => J16,
            88 => J32,
            90 => GetLast0,
            91 => GetLast1,
            92 => GetLast2,
            93 => GetLast3,
            94 => GetLastU8,
            95 => GetLastU16,
            96 => GetLastU32,
            97 => SetNodeU8,
            98 => SetNodeU16,
            99 => SetNodeU32,
            100 => ObjField0,
            101 => ObjField1,
            102 => ObjField2,
            103 => ObjField3,
            104 => ObjField4,
            105 => ObjField5,
            106 => ObjField6,
            110 => UpdDev0,
            111 => UpdDev1,
            112 => UpdDev2,
            113 => UpdDev3,
            114 => UpdDevU8,
            117 => UpdNodeU8,
            118 => UpdNodeU16,
            119 => UpdNodeU32,
            120 => Output0,
            121 => Output1,
            122 => Output2,
            123 => Output3,
            124 => OutputU8,
            127 => CallU8,
            128 => CallU16,
            129 => CallU32,
            130 => GetDataU8,
            131 => GetDataU16,
            132 => GetDataU32,
            133 => GetNodeU8,
            134 => GetNodeU16,
            135 => GetNodeU32,
            141 => SetDataU8,
            142 => SetDataU16,
            143 => SetDataU32,
            144 => ObjTag,
            150 => SetLast0,
            151 => SetLast1,
            152 => SetLast2,
            153 => SetLast3,
            154 => SetLastU8,
            155 => SetLastU16,
            156 => SetLastU32,
            157 => EndUpdU8,
            158 => EndUpdU16,
            159 => EndUpdU32,
            160 => AllocObj0,
            161 => AllocObj1,
            162 => AllocObj2,
            163 => AllocObj3,
            164 => AllocObj4,
            165 => AllocObj5,
            166 => AllocObj6,
            167 => AllocObjU8,
            170 => DropLocal0,
            171 => DropLocal1,
            172 => DropLocal2,
            173 => DropLocal3,
            174 => DropLocal4,
            175 => DropLocal5,
            176 => DropLocal6,
            177 => DropLocalI8,
            178 => DropLocalI16,
            179 => DropLocalI32,
            180 => GetLocalRef0,
            181 => GetLocalRef1,
            182 => GetLocalRef2,
            183 => GetLocalRef3,
            184 => GetLocalRef4,
            185 => GetLocalRef5,
            186 => GetLocalRef6,
            187 => GetLocalRefI8,
            188 => GetLocalRefI16,
            189 => GetLocalRefI32,
            190 => SetLocalRef0,
            191 => SetLocalRef1,
            192 => SetLocalRef2,
            193 => SetLocalRef3,
            194 => SetLocalRef4,
            195 => SetLocalRef5,
            196 => SetLocalRef6,
            197 => SetLocalRefI8,
            198 => SetLocalRefI16,
            199 => SetLocalRefI32,
            200 => ObjFieldRef0,
            201 => ObjFieldRef1,
            202 => ObjFieldRef2,
            203 => ObjFieldRef3,
            204 => ObjFieldRef4,
            205 => ObjFieldRef5,
            206 => ObjFieldRef6,
            210 => EndUpdObjU8,
            211 => EndUpdObjU16,
            212 => EndUpdObjU32,
            213 => GetNodeRefU8,
            214 => GetNodeRefU16,
            215 => GetNodeRefU32,
            216 => GetDataRefU8,
            217 => GetDataRefU16,
            218 => GetDataRefU32,
            220 => GetLastRef0,
            221 => GetLastRef1,
            222 => GetLastRef2,
            223 => GetLastRef3,
            224 => GetLastRefU8,
            225 => GetLastRefU16,
            226 => GetLastRefU32,
            227 => SetDataRefU8,
            228 => SetDataRefU16,
            229 => SetDataRefU32,
            230 => SetLastRef0,
            231 => SetLastRef1,
            232 => SetLastRef2,
            233 => SetLastRef3,
            234 => SetLastRefU8,
            235 => SetLastRefU16,
            236 => SetLastRefU32,
            237 => SetNodeRefU8,
            238 => SetNodeRefU16,
            239 => SetNodeRefU32,
            240 => DropLastU8,
            241 => DropLastU16,
            242 => DropLastU32,
            243 => J0,
            244 => J1,
            245 => Je0,
            246 => Je1,
            247 => Jne0,
            248 => Jne1,
            _ => return Err(InvalidOpcode(b)),
        };

        Ok(op)
    }
}

/// Assembly-level instruction carrying its operands.
///
/// This is the form the host compiler and the test suite build programs
/// with; [`Opcode::encode`] lowers it to the wire encoding the interpreter
/// consumes. Collecting an iterator of `Opcode` into `Vec<u8>` assembles a
/// complete bytecode body:
///
/// ```
/// use pulse_asm::Opcode;
///
/// let body: Vec<u8> = vec![Opcode::Int2, Opcode::Int3, Opcode::Add, Opcode::Halt]
///     .into_iter()
///     .collect();
///
/// assert_eq!(body, vec![32, 33, 0x05, 0x18]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Opcode {
    // Stack literals and plain stack shuffling.
    Nil,
    PushTrue,
    PushFalse,
    Dup,
    Int0,
    Int1,
    Int2,
    Int3,
    Int4,
    Int5,
    Int6,
    IntI8(i8),
    IntI16(i16),
    IntI32(i32),
    Pop1,
    Pop2,
    Pop3,
    Pop4,
    Pop5,
    Pop6,
    PopU8(u8),
    PopU16(u16),
    PopU32(u32),

    // Arithmetic, logic and comparisons. Binary forms consume the two top
    // stack words with the right operand on top.
    Not,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Xor,

    // Locals, addressed relative to the base pointer.
    GetLocal0,
    GetLocal1,
    GetLocal2,
    GetLocal3,
    GetLocal4,
    GetLocal5,
    GetLocal6,
    GetLocalI8(i8),
    GetLocalI16(i16),
    GetLocalI32(i32),
    SetLocal0,
    SetLocal1,
    SetLocal2,
    SetLocal3,
    SetLocal4,
    SetLocal5,
    SetLocal6,
    SetLocalI8(i8),
    SetLocalI16(i16),
    SetLocalI32(i32),
    AllocLocal1,
    AllocLocal2,
    AllocLocal3,
    AllocLocal4,
    AllocLocal5,
    AllocLocal6,
    AllocLocalU8(u8),
    AllocLocalU16(u16),
    AllocLocalU32(u32),
    GetLocalRef0,
    GetLocalRef1,
    GetLocalRef2,
    GetLocalRef3,
    GetLocalRef4,
    GetLocalRef5,
    GetLocalRef6,
    GetLocalRefI8(i8),
    GetLocalRefI16(i16),
    GetLocalRefI32(i32),
    SetLocalRef0,
    SetLocalRef1,
    SetLocalRef2,
    SetLocalRef3,
    SetLocalRef4,
    SetLocalRef5,
    SetLocalRef6,
    SetLocalRefI8(i8),
    SetLocalRefI16(i16),
    SetLocalRefI32(i32),
    DropLocal0,
    DropLocal1,
    DropLocal2,
    DropLocal3,
    DropLocal4,
    DropLocal5,
    DropLocal6,
    DropLocalI8(i8),
    DropLocalI16(i16),
    DropLocalI32(i32),

    // Control flow. Displacements are relative to the first byte after the
    // operand; a conditional that falls through skips its operand bytes.
    J0,
    J1,
    J8(i8),
    J16(i16),
    J32(i32),
    Je0,
    Je1,
    Je8(i8),
    Je16(i16),
    Je32(i32),
    Jne0,
    Jne1,
    Jne8(i8),
    Jne16(i16),
    Jne32(i32),
    CallU8(u8, u8),
    CallU16(u8, u16),
    CallU32(u8, u32),
    Ret,

    // Registry access: nodes, global data slots, last-cycle values.
    GetNodeU8(u8),
    GetNodeU16(u16),
    GetNodeU32(u32),
    GetNodeRefU8(u8),
    GetNodeRefU16(u16),
    GetNodeRefU32(u32),
    SetNodeU8(u8),
    SetNodeU16(u16),
    SetNodeU32(u32),
    SetNodeRefU8(u8),
    SetNodeRefU16(u16),
    SetNodeRefU32(u32),
    GetDataU8(u8),
    GetDataU16(u16),
    GetDataU32(u32),
    GetDataRefU8(u8),
    GetDataRefU16(u16),
    GetDataRefU32(u32),
    SetDataU8(u8),
    SetDataU16(u16),
    SetDataU32(u32),
    SetDataRefU8(u8),
    SetDataRefU16(u16),
    SetDataRefU32(u32),
    GetLast0,
    GetLast1,
    GetLast2,
    GetLast3,
    GetLastU8(u8),
    GetLastU16(u16),
    GetLastU32(u32),
    GetLastRef0,
    GetLastRef1,
    GetLastRef2,
    GetLastRef3,
    GetLastRefU8(u8),
    GetLastRefU16(u16),
    GetLastRefU32(u32),
    SetLast0,
    SetLast1,
    SetLast2,
    SetLast3,
    SetLastU8(u8),
    SetLastU16(u16),
    SetLastU32(u32),
    SetLastRef0,
    SetLastRef1,
    SetLastRef2,
    SetLastRef3,
    SetLastRefU8(u8),
    SetLastRefU16(u16),
    SetLastRefU32(u32),
    DropLastU8(u8),
    DropLastU16(u16),
    DropLastU32(u32),

    // Heap objects. `AllocObj*` carries the raw 32-bit header immediate.
    AllocObj0(u32),
    AllocObj1(u32),
    AllocObj2(u32),
    AllocObj3(u32),
    AllocObj4(u32),
    AllocObj5(u32),
    AllocObj6(u32),
    AllocObjU8(u8, u32),
    ObjField0,
    ObjField1,
    ObjField2,
    ObjField3,
    ObjField4,
    ObjField5,
    ObjField6,
    ObjFieldRef0,
    ObjFieldRef1,
    ObjFieldRef2,
    ObjFieldRef3,
    ObjFieldRef4,
    ObjFieldRef5,
    ObjFieldRef6,
    ObjTag,

    // Reactive update dispatch and output actions.
    UpdDev0,
    UpdDev1,
    UpdDev2,
    UpdDev3,
    UpdDevU8(u8),
    UpdNodeU8(u8),
    UpdNodeU16(u16),
    UpdNodeU32(u32),
    EndUpdU8(u8),
    EndUpdU16(u16),
    EndUpdU32(u32),
    EndUpdObjU8(u8),
    EndUpdObjU16(u16),
    EndUpdObjU32(u32),
    Output0,
    Output1,
    Output2,
    Output3,
    OutputU8(u8),

    // Diagnostics and termination.
    Print,
    PrintObj,
    Halt,
    Abort,
}

impl Opcode {
    /// The opcode byte this instruction lowers to.
    pub const fn repr(&self) -> OpcodeRepr {
        use Opcode as O;
        use OpcodeRepr as R;

        match self {
            O::Nil => R::Nil,
            O::Not => R::Not,
            O::Neg => R::Neg,
            O::Add => R::Add,
            O::Sub => R::Sub,
            O::Mul => R::Mul,
            O::Div => R::Div,
            O::Mod => R::Mod,
            O::Shl => R::Shl,
            O::Shr => R::Shr,
            O::Lt => R::Lt,
            O::Le => R::Le,
            O::Gt => R::Gt,
            O::Ge => R::Ge,
            O::Eq => R::Eq,
            O::Ne => R::Ne,
            O::And => R::And,
            O::Or => R::Or,
            O::Xor => R::Xor,
            O::Ret => R::Ret,
            O::Print => R::Print,
            O::PrintObj => R::PrintObj,
            O::Halt => R::Halt,
            O::Dup => R::Dup,
            O::PushTrue => R::PushTrue,
            O::PushFalse => R::PushFalse,
            O::Abort => R::Abort,
            O::Int0 => R::Int0,
            O::Int1 => R::Int1,
            O::Int2 => R::Int2,
            O::Int3 => R::Int3,
            O::Int4 => R::Int4,
            O::Int5 => R::Int5,
            O::Int6 => R::Int6,
            O::IntI8(_) => R::IntI8,
            O::IntI16(_) => R::IntI16,
            O::IntI32(_) => R::IntI32,
            O::GetLocal0 => R::GetLocal0,
            O::GetLocal1 => R::GetLocal1,
            O::GetLocal2 => R::GetLocal2,
            O::GetLocal3 => R::GetLocal3,
            O::GetLocal4 => R::GetLocal4,
            O::GetLocal5 => R::GetLocal5,
            O::GetLocal6 => R::GetLocal6,
            O::GetLocalI8(_) => R::GetLocalI8,
            O::GetLocalI16(_) => R::GetLocalI16,
            O::GetLocalI32(_) => R::GetLocalI32,
            O::SetLocal0 => R::SetLocal0,
            O::SetLocal1 => R::SetLocal1,
            O::SetLocal2 => R::SetLocal2,
            O::SetLocal3 => R::SetLocal3,
            O::SetLocal4 => R::SetLocal4,
            O::SetLocal5 => R::SetLocal5,
            O::SetLocal6 => R::SetLocal6,
            O::SetLocalI8(_) => R::SetLocalI8,
            O::SetLocalI16(_) => R::SetLocalI16,
            O::SetLocalI32(_) => R::SetLocalI32,
            O::AllocLocal1 => R::AllocLocal1,
            O::AllocLocal2 => R::AllocLocal2,
            O::AllocLocal3 => R::AllocLocal3,
            O::AllocLocal4 => R::AllocLocal4,
            O::AllocLocal5 => R::AllocLocal5,
            O::AllocLocal6 => R::AllocLocal6,
            O::AllocLocalU8(_) => R::AllocLocalU8,
            O::AllocLocalU16(_) => R::AllocLocalU16,
            O::AllocLocalU32(_) => R::AllocLocalU32,
            O::Pop1 => R::Pop1,
            O::Pop2 => R::Pop2,
            O::Pop3 => R::Pop3,
            O::Pop4 => R::Pop4,
            O::Pop5 => R::Pop5,
            O::Pop6 => R::Pop6,
            O::PopU8(_) => R::PopU8,
            O::PopU16(_) => R::PopU16,
            O::PopU32(_) => R::PopU32,
            O::Jne8(_) => R::Jne8,
            O::Jne16(_) => R::Jne16,
            O::Jne32(_) => R::Jne32,
            O::Je8(_) => R::Je8,
            O::Je16(_) => R::Je16,
            O::Je32(_) => R::Je32,
            O::J8(_) => R::J8,
            O::J16(_) => R::J16,
            O::J32(_) => R::J32,
            O::GetLast0 => R::GetLast0,
            O::GetLast1 => R::GetLast1,
            O::GetLast2 => R::GetLast2,
            O::GetLast3 => R::GetLast3,
            O::GetLastU8(_) => R::GetLastU8,
            O::GetLastU16(_) => R::GetLastU16,
            O::GetLastU32(_) => R::GetLastU32,
            O::SetNodeU8(_) => R::SetNodeU8,
            O::SetNodeU16(_) => R::SetNodeU16,
            O::SetNodeU32(_) => R::SetNodeU32,
            O::ObjField0 => R::ObjField0,
            O::ObjField1 => R::ObjField1,
            O::ObjField2 => R::ObjField2,
            O::ObjField3 => R::ObjField3,
            O::ObjField4 => R::ObjField4,
            O::ObjField5 => R::ObjField5,
            O::ObjField6 => R::ObjField6,
            O::UpdDev0 => R::UpdDev0,
            O::UpdDev1 => R::UpdDev1,
            O::UpdDev2 => R::UpdDev2,
            O::UpdDev3 => R::UpdDev3,
            O::UpdDevU8(_) => R::UpdDevU8,
            O::UpdNodeU8(_) => R::UpdNodeU8,
            O::UpdNodeU16(_) => R::UpdNodeU16,
            O::UpdNodeU32(_) => R::UpdNodeU32,
            O::Output0 => R::Output0,
            O::Output1 => R::Output1,
            O::Output2 => R::Output2,
            O::Output3 => R::Output3,
            O::OutputU8(_) => R::OutputU8,
            O::CallU8(..) => R::CallU8,
            O::CallU16(..) => R::CallU16,
            O::CallU32(..) => R::CallU32,
            O::GetDataU8(_) => R::GetDataU8,
            O::GetDataU16(_) => R::GetDataU16,
            O::GetDataU32(_) => R::GetDataU32,
            O::GetNodeU8(_) => R::GetNodeU8,
            O::GetNodeU16(_) => R::GetNodeU16,
            O::GetNodeU32(_) => R::GetNodeU32,
            O::SetDataU8(_) => R::SetDataU8,
            O::SetDataU16(_) => R::SetDataU16,
            O::SetDataU32(_) => R::SetDataU32,
            O::ObjTag => R::ObjTag,
            O::SetLast0 => R::SetLast0,
            O::SetLast1 => R::SetLast1,
            O::SetLast2 => R::SetLast2,
            O::SetLast3 => R::SetLast3,
            O::SetLastU8(_) => R::SetLastU8,
            O::SetLastU16(_) => R::SetLastU16,
            O::SetLastU32(_) => R::SetLastU32,
            O::EndUpdU8(_) => R::EndUpdU8,
            O::EndUpdU16(_) => R::EndUpdU16,
            O::EndUpdU32(_) => R::EndUpdU32,
            O::AllocObj0(_) => R::AllocObj0,
            O::AllocObj1(_) => R::AllocObj1,
            O::AllocObj2(_) => R::AllocObj2,
            O::AllocObj3(_) => R::AllocObj3,
            O::AllocObj4(_) => R::AllocObj4,
            O::AllocObj5(_) => R::AllocObj5,
            O::AllocObj6(_) => R::AllocObj6,
            O::AllocObjU8(..) => R::AllocObjU8,
            O::DropLocal0 => R::DropLocal0,
            O::DropLocal1 => R::DropLocal1,
            O::DropLocal2 => R::DropLocal2,
            O::DropLocal3 => R::DropLocal3,
            O::DropLocal4 => R::DropLocal4,
            O::DropLocal5 => R::DropLocal5,
            O::DropLocal6 => R::DropLocal6,
            O::DropLocalI8(_) => R::DropLocalI8,
            O::DropLocalI16(_) => R::DropLocalI16,
            O::DropLocalI32(_) => R::DropLocalI32,
            O::GetLocalRef0 => R::GetLocalRef0,
            O::GetLocalRef1 => R::GetLocalRef1,
            O::GetLocalRef2 => R::GetLocalRef2,
            O::GetLocalRef3 => R::GetLocalRef3,
            O::GetLocalRef4 => R::GetLocalRef4,
            O::GetLocalRef5 => R::GetLocalRef5,
            O::GetLocalRef6 => R::GetLocalRef6,
            O::GetLocalRefI8(_) => R::GetLocalRefI8,
            O::GetLocalRefI16(_) => R::GetLocalRefI16,
            O::GetLocalRefI32(_) => R::GetLocalRefI32,
            O::SetLocalRef0 => R::SetLocalRef0,
            O::SetLocalRef1 => R::SetLocalRef1,
            O::SetLocalRef2 => R::SetLocalRef2,
            O::SetLocalRef3 => R::SetLocalRef3,
            O::SetLocalRef4 => R::SetLocalRef4,
            O::SetLocalRef5 => R::SetLocalRef5,
            O::SetLocalRef6 => R::SetLocalRef6,
            O::SetLocalRefI8(_) => R::SetLocalRefI8,
            O::SetLocalRefI16(_) => R::SetLocalRefI16,
            O::SetLocalRefI32(_) => R::SetLocalRefI32,
            O::ObjFieldRef0 => R::ObjFieldRef0,
            O::ObjFieldRef1 => R::ObjFieldRef1,
            O::ObjFieldRef2 => R::ObjFieldRef2,
            O::ObjFieldRef3 => R::ObjFieldRef3,
            O::ObjFieldRef4 => R::ObjFieldRef4,
            O::ObjFieldRef5 => R::ObjFieldRef5,
            O::ObjFieldRef6 => R::ObjFieldRef6,
            O::EndUpdObjU8(_) => R::EndUpdObjU8,
            O::EndUpdObjU16(_) => R::EndUpdObjU16,
            O::EndUpdObjU32(_) => R::EndUpdObjU32,
            O::GetNodeRefU8(_) => R::GetNodeRefU8,
            O::GetNodeRefU16(_) => R::GetNodeRefU16,
            O::GetNodeRefU32(_) => R::GetNodeRefU32,
            O::GetDataRefU8(_) => R::GetDataRefU8,
            O::GetDataRefU16(_) => R::GetDataRefU16,
            O::GetDataRefU32(_) => R::GetDataRefU32,
            O::GetLastRef0 => R::GetLastRef0,
            O::GetLastRef1 => R::GetLastRef1,
            O::GetLastRef2 => R::GetLastRef2,
            O::GetLastRef3 => R::GetLastRef3,
            O::GetLastRefU8(_) => R::GetLastRefU8,
            O::GetLastRefU16(_) => R::GetLastRefU16,
            O::GetLastRefU32(_) => R::GetLastRefU32,
            O::SetDataRefU8(_) => R::SetDataRefU8,
            O::SetDataRefU16(_) => R::SetDataRefU16,
            O::SetDataRefU32(_) => R::SetDataRefU32,
            O::SetLastRef0 => R::SetLastRef0,
            O::SetLastRef1 => R::SetLastRef1,
            O::SetLastRef2 => R::SetLastRef2,
            O::SetLastRef3 => R::SetLastRef3,
            O::SetLastRefU8(_) => R::SetLastRefU8,
            O::SetLastRefU16(_) => R::SetLastRefU16,
            O::SetLastRefU32(_) => R::SetLastRefU32,
            O::SetNodeRefU8(_) => R::SetNodeRefU8,
            O::SetNodeRefU16(_) => R::SetNodeRefU16,
            O::SetNodeRefU32(_) => R::SetNodeRefU32,
            O::DropLastU8(_) => R::DropLastU8,
            O::DropLastU16(_) => R::DropLastU16,
            O::DropLastU32(_) => R::DropLastU32,
            O::J0 => R::J0,
            O::J1 => R::J1,
            O::Je0 => R::Je0,
            O::Je1 => R::Je1,
            O::Jne0 => R::Jne0,
            O::Jne1 => R::Jne1,
        }
    }

    /// Append the wire encoding of this instruction to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        use Opcode as O;

        buf.push(self.repr() as u8);

        match *self {
            O::IntI8(v)
            | O::GetLocalI8(v)
            | O::SetLocalI8(v)
            | O::DropLocalI8(v)
            | O::GetLocalRefI8(v)
            | O::SetLocalRefI8(v)
            | O::J8(v)
            | O::Je8(v)
            | O::Jne8(v) => buf.push(v as u8),

            O::IntI16(v)
            | O::GetLocalI16(v)
            | O::SetLocalI16(v)
            | O::DropLocalI16(v)
            | O::GetLocalRefI16(v)
            | O::SetLocalRefI16(v)
            | O::J16(v)
            | O::Je16(v)
            | O::Jne16(v) => buf.extend_from_slice(&v.to_le_bytes()),

            O::IntI32(v)
            | O::GetLocalI32(v)
            | O::SetLocalI32(v)
            | O::DropLocalI32(v)
            | O::GetLocalRefI32(v)
            | O::SetLocalRefI32(v)
            | O::J32(v)
            | O::Je32(v)
            | O::Jne32(v) => buf.extend_from_slice(&v.to_le_bytes()),

            O::AllocLocalU8(v)
            | O::PopU8(v)
            | O::GetLastU8(v)
            | O::GetLastRefU8(v)
            | O::SetLastU8(v)
            | O::SetLastRefU8(v)
            | O::DropLastU8(v)
            | O::GetNodeU8(v)
            | O::GetNodeRefU8(v)
            | O::SetNodeU8(v)
            | O::SetNodeRefU8(v)
            | O::GetDataU8(v)
            | O::GetDataRefU8(v)
            | O::SetDataU8(v)
            | O::SetDataRefU8(v)
            | O::UpdDevU8(v)
            | O::UpdNodeU8(v)
            | O::EndUpdU8(v)
            | O::EndUpdObjU8(v)
            | O::OutputU8(v) => buf.push(v),

            O::AllocLocalU16(v)
            | O::PopU16(v)
            | O::GetLastU16(v)
            | O::GetLastRefU16(v)
            | O::SetLastU16(v)
            | O::SetLastRefU16(v)
            | O::DropLastU16(v)
            | O::GetNodeU16(v)
            | O::GetNodeRefU16(v)
            | O::SetNodeU16(v)
            | O::SetNodeRefU16(v)
            | O::GetDataU16(v)
            | O::GetDataRefU16(v)
            | O::SetDataU16(v)
            | O::SetDataRefU16(v)
            | O::UpdNodeU16(v)
            | O::EndUpdU16(v)
            | O::EndUpdObjU16(v) => buf.extend_from_slice(&v.to_le_bytes()),

            O::AllocLocalU32(v)
            | O::PopU32(v)
            | O::GetLastU32(v)
            | O::GetLastRefU32(v)
            | O::SetLastU32(v)
            | O::SetLastRefU32(v)
            | O::DropLastU32(v)
            | O::GetNodeU32(v)
            | O::GetNodeRefU32(v)
            | O::SetNodeU32(v)
            | O::SetNodeRefU32(v)
            | O::GetDataU32(v)
            | O::GetDataRefU32(v)
            | O::SetDataU32(v)
            | O::SetDataRefU32(v)
            | O::UpdNodeU32(v)
            | O::EndUpdU32(v)
            | O::EndUpdObjU32(v)
            | O::AllocObj0(v)
            | O::AllocObj1(v)
            | O::AllocObj2(v)
            | O::AllocObj3(v)
            | O::AllocObj4(v)
            | O::AllocObj5(v)
            | O::AllocObj6(v) => buf.extend_from_slice(&v.to_le_bytes()),

            O::CallU8(nargs, func) => {
                buf.push(nargs);
                buf.push(func);
            }
            O::CallU16(nargs, func) => {
                buf.push(nargs);
                buf.extend_from_slice(&func.to_le_bytes());
            }
            O::CallU32(nargs, func) => {
                buf.push(nargs);
                buf.extend_from_slice(&func.to_le_bytes());
            }
            O::AllocObjU8(entries, header) => {
                buf.push(entries);
                buf.extend_from_slice(&header.to_le_bytes());
            }

            _ => (),
        }
    }

    /// The wire encoding as an owned buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

impl FromIterator<Opcode> for Vec<u8> {
    fn from_iter<I: IntoIterator<Item = Opcode>>(iter: I) -> Self {
        let mut buf = Vec::new();
        iter.into_iter().for_each(|op| op.encode(&mut buf));
        buf
    }
}
