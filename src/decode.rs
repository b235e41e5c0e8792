use crate::registers::{Pair, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCodes {
    Nop,
    LoadPairImmediate(Pair),
    StoreAccIndirect(Pair),
    LoadAccIndirect(Pair),
    StoreHlDirect,
    LoadHlDirect,
    StoreAccDirect,
    LoadAccDirect,
    IncrementPair(Pair),
    DecrementPair(Pair),
    AddPairToHl(Pair),
    Increment(Reg),
    Decrement(Reg),
    MoveImmediate(Reg),
    RotateLeft,
    RotateRight,
    RotateLeftThroughCarry,
    RotateRightThroughCarry,
    DecimalAdjust,
    ComplementAcc,
    SetCarry,
    ComplementCarry,
    Move(Reg, Reg),
    Halt,
    Alu(AluOp, Reg),
    AluImmediate(AluOp),
    Return(Option<Cond>),
    Jump(Option<Cond>),
    Call(Option<Cond>),
    Pop(Pair),
    Push(Pair),
    Restart(u8),
    Output,
    Input,
    ExchangeStackTop,
    ExchangeDeHl,
    DisableInterrupts,
    EnableInterrupts,
    JumpHl,
    LoadSpFromHl,
}

// Base cycle counts. Conditional calls and returns take 6 more when taken.
#[rustfmt::skip]
pub const CYCLES: [u8; 256] = [
//  0  1   2   3   4   5   6   7   8  9   A   B   C   D   E  F
    4, 10, 7,  5,  5,  5,  7,  4,  4, 10, 7,  5,  5,  5,  7, 4,  // 0
    4, 10, 7,  5,  5,  5,  7,  4,  4, 10, 7,  5,  5,  5,  7, 4,  // 1
    4, 10, 16, 5,  5,  5,  7,  4,  4, 10, 16, 5,  5,  5,  7, 4,  // 2
    4, 10, 13, 5,  10, 10, 10, 4,  4, 10, 13, 5,  5,  5,  7, 4,  // 3
    5, 5,  5,  5,  5,  5,  7,  5,  5, 5,  5,  5,  5,  5,  7, 5,  // 4
    5, 5,  5,  5,  5,  5,  7,  5,  5, 5,  5,  5,  5,  5,  7, 5,  // 5
    5, 5,  5,  5,  5,  5,  7,  5,  5, 5,  5,  5,  5,  5,  7, 5,  // 6
    7, 7,  7,  7,  7,  7,  7,  7,  5, 5,  5,  5,  5,  5,  7, 5,  // 7
    4, 4,  4,  4,  4,  4,  7,  4,  4, 4,  4,  4,  4,  4,  7, 4,  // 8
    4, 4,  4,  4,  4,  4,  7,  4,  4, 4,  4,  4,  4,  4,  7, 4,  // 9
    4, 4,  4,  4,  4,  4,  7,  4,  4, 4,  4,  4,  4,  4,  7, 4,  // A
    4, 4,  4,  4,  4,  4,  7,  4,  4, 4,  4,  4,  4,  4,  7, 4,  // B
    5, 10, 10, 10, 11, 11, 7,  11, 5, 10, 10, 10, 11, 17, 7, 11, // C
    5, 10, 10, 10, 11, 11, 7,  11, 5, 10, 10, 10, 11, 17, 7, 11, // D
    5, 10, 10, 18, 11, 11, 7,  11, 5, 5,  10, 4,  11, 17, 7, 11, // E
    5, 10, 10, 4,  11, 11, 7,  11, 5, 5,  10, 4,  11, 17, 7, 11, // F
];

fn alu_op(bits: u8) -> AluOp {
    match bits & 0b111 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbb,
        4 => AluOp::Ana,
        5 => AluOp::Xra,
        6 => AluOp::Ora,
        _ => AluOp::Cmp,
    }
}

fn cond(bits: u8) -> Cond {
    match bits & 0b111 {
        0 => Cond::NotZero,
        1 => Cond::Zero,
        2 => Cond::NoCarry,
        3 => Cond::Carry,
        4 => Cond::ParityOdd,
        5 => Cond::ParityEven,
        6 => Cond::Plus,
        _ => Cond::Minus,
    }
}

// `rp` field: BC, DE, HL, then SP or PSW depending on the instruction group
fn pair(bits: u8, last: Pair) -> Pair {
    match bits & 0b11 {
        0 => Pair::BC,
        1 => Pair::DE,
        2 => Pair::HL,
        _ => last,
    }
}

impl OpCodes {
    /// Splits an opcode into its `xx yyy zzz` fields and decodes it.
    /// Every byte decodes; the undocumented slots alias NOP, JMP, RET and CALL.
    pub fn decode(opcode: u8) -> OpCodes {
        let x = opcode >> 6;
        let y = (opcode >> 3) & 0b111;
        let z = opcode & 0b111;
        let rp = y >> 1;
        let odd = y & 1 == 1;

        match (x, z) {
            (0, 0) => OpCodes::Nop,
            (0, 1) if odd => OpCodes::AddPairToHl(pair(rp, Pair::SP)),
            (0, 1) => OpCodes::LoadPairImmediate(pair(rp, Pair::SP)),
            (0, 2) => match y {
                0 | 2 => OpCodes::StoreAccIndirect(pair(rp, Pair::SP)),
                1 | 3 => OpCodes::LoadAccIndirect(pair(rp, Pair::SP)),
                4 => OpCodes::StoreHlDirect,
                5 => OpCodes::LoadHlDirect,
                6 => OpCodes::StoreAccDirect,
                _ => OpCodes::LoadAccDirect,
            },
            (0, 3) if odd => OpCodes::DecrementPair(pair(rp, Pair::SP)),
            (0, 3) => OpCodes::IncrementPair(pair(rp, Pair::SP)),
            (0, 4) => OpCodes::Increment(Reg::from_bits(y)),
            (0, 5) => OpCodes::Decrement(Reg::from_bits(y)),
            (0, 6) => OpCodes::MoveImmediate(Reg::from_bits(y)),
            (0, _) => match y {
                0 => OpCodes::RotateLeft,
                1 => OpCodes::RotateRight,
                2 => OpCodes::RotateLeftThroughCarry,
                3 => OpCodes::RotateRightThroughCarry,
                4 => OpCodes::DecimalAdjust,
                5 => OpCodes::ComplementAcc,
                6 => OpCodes::SetCarry,
                _ => OpCodes::ComplementCarry,
            },
            (1, 6) if y == 6 => OpCodes::Halt,
            (1, _) => OpCodes::Move(Reg::from_bits(y), Reg::from_bits(z)),
            (2, _) => OpCodes::Alu(alu_op(y), Reg::from_bits(z)),
            (_, 0) => OpCodes::Return(Some(cond(y))),
            (_, 1) if !odd => OpCodes::Pop(pair(rp, Pair::PSW)),
            (_, 1) => match rp {
                0 | 1 => OpCodes::Return(None),
                2 => OpCodes::JumpHl,
                _ => OpCodes::LoadSpFromHl,
            },
            (_, 2) => OpCodes::Jump(Some(cond(y))),
            (_, 3) => match y {
                0 | 1 => OpCodes::Jump(None),
                2 => OpCodes::Output,
                3 => OpCodes::Input,
                4 => OpCodes::ExchangeStackTop,
                5 => OpCodes::ExchangeDeHl,
                6 => OpCodes::DisableInterrupts,
                _ => OpCodes::EnableInterrupts,
            },
            (_, 4) => OpCodes::Call(Some(cond(y))),
            (_, 5) if !odd => OpCodes::Push(pair(rp, Pair::PSW)),
            (_, 5) => OpCodes::Call(None),
            (_, 6) => OpCodes::AluImmediate(alu_op(y)),
            _ => OpCodes::Restart(y),
        }
    }
}

#[test]
fn test_decode_groups() {
    assert_eq!(OpCodes::decode(0x00), OpCodes::Nop);
    assert_eq!(OpCodes::decode(0x08), OpCodes::Nop);
    assert_eq!(OpCodes::decode(0x31), OpCodes::LoadPairImmediate(Pair::SP));
    assert_eq!(OpCodes::decode(0x09), OpCodes::AddPairToHl(Pair::BC));
    assert_eq!(OpCodes::decode(0x1a), OpCodes::LoadAccIndirect(Pair::DE));
    assert_eq!(OpCodes::decode(0x22), OpCodes::StoreHlDirect);
    assert_eq!(OpCodes::decode(0x3a), OpCodes::LoadAccDirect);
    assert_eq!(OpCodes::decode(0x2b), OpCodes::DecrementPair(Pair::HL));
    assert_eq!(OpCodes::decode(0x34), OpCodes::Increment(Reg::M));
    assert_eq!(OpCodes::decode(0x27), OpCodes::DecimalAdjust);
    assert_eq!(OpCodes::decode(0x76), OpCodes::Halt);
    assert_eq!(OpCodes::decode(0x77), OpCodes::Move(Reg::M, Reg::A));
    assert_eq!(OpCodes::decode(0xbe), OpCodes::Alu(AluOp::Cmp, Reg::M));
}

#[test]
fn test_decode_control_flow() {
    assert_eq!(OpCodes::decode(0xc0), OpCodes::Return(Some(Cond::NotZero)));
    assert_eq!(OpCodes::decode(0xc9), OpCodes::Return(None));
    assert_eq!(OpCodes::decode(0xd9), OpCodes::Return(None));
    assert_eq!(OpCodes::decode(0xf1), OpCodes::Pop(Pair::PSW));
    assert_eq!(OpCodes::decode(0xc5), OpCodes::Push(Pair::BC));
    assert_eq!(OpCodes::decode(0xe9), OpCodes::JumpHl);
    assert_eq!(OpCodes::decode(0xf9), OpCodes::LoadSpFromHl);
    assert_eq!(OpCodes::decode(0xc3), OpCodes::Jump(None));
    assert_eq!(OpCodes::decode(0xcb), OpCodes::Jump(None));
    assert_eq!(OpCodes::decode(0xfa), OpCodes::Jump(Some(Cond::Minus)));
    assert_eq!(OpCodes::decode(0xd3), OpCodes::Output);
    assert_eq!(OpCodes::decode(0xdb), OpCodes::Input);
    assert_eq!(OpCodes::decode(0xe3), OpCodes::ExchangeStackTop);
    assert_eq!(OpCodes::decode(0xeb), OpCodes::ExchangeDeHl);
    assert_eq!(OpCodes::decode(0xf3), OpCodes::DisableInterrupts);
    assert_eq!(OpCodes::decode(0xfb), OpCodes::EnableInterrupts);
    assert_eq!(OpCodes::decode(0xcd), OpCodes::Call(None));
    assert_eq!(OpCodes::decode(0xfd), OpCodes::Call(None));
    assert_eq!(OpCodes::decode(0xcc), OpCodes::Call(Some(Cond::Zero)));
    assert_eq!(OpCodes::decode(0xfe), OpCodes::AluImmediate(AluOp::Cmp));
    assert_eq!(OpCodes::decode(0xcf), OpCodes::Restart(1));
    assert_eq!(OpCodes::decode(0xd7), OpCodes::Restart(2));
}
