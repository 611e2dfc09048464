/// Instruction and dispatch forms with fixed T-cycle costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCostKind {
    /// `NOP`, `HALT`, and one idle step while halted.
    Nop,
    /// Register-to-register 8-bit load.
    LoadRegister,
    /// 8-bit load of an immediate into a register.
    LoadImmediate,
    /// 8-bit load through a register pair (`(HL)`, `(BC)`, `(DE)`).
    LoadIndirect,
    /// `LD (HL),n`.
    StoreImmediateIndirect,
    /// `LD A,(nn)` / `LD (nn),A`.
    LoadAbsolute,
    /// `LD rr,nn`.
    LoadPairImmediate,
    /// `LD HL,(nn)` / `LD (nn),HL`.
    LoadPairAbsolute,
    /// `LD SP,HL`.
    LoadStackPointer,
    /// `LD I,A` / `LD A,I`.
    LoadInterruptVector,
    /// `INC r` / `DEC r`.
    IncDecRegister,
    /// `INC (HL)` / `DEC (HL)`.
    IncDecIndirect,
    /// `INC rr` / `DEC rr`.
    IncDecPair,
    /// ALU operation on a register.
    AluRegister,
    /// ALU operation on `(HL)` or an immediate.
    AluMemory,
    /// `ADD HL,rr`.
    AddPair,
    /// `ADC HL,rr` / `SBC HL,rr`.
    AdcSbcPair,
    /// Accumulator rotates and `CPL`/`SCF`/`CCF`.
    Accumulator,
    /// `NEG`.
    Negate,
    /// `EX AF,AF'`, `EXX`, `EX DE,HL`.
    Exchange,
    /// `EX (SP),HL`.
    ExchangeStack,
    /// `JP nn`, `JP cc,nn` either way.
    Jump,
    /// `JP (HL)`.
    JumpIndirect,
    /// `JR` taken.
    RelativeTaken,
    /// `JR cc` not taken.
    RelativeNotTaken,
    /// `DJNZ` taken.
    DjnzTaken,
    /// `DJNZ` not taken.
    DjnzNotTaken,
    /// `CALL` taken.
    Call,
    /// `CALL cc` not taken.
    CallNotTaken,
    /// Unconditional `RET`.
    Ret,
    /// `RET cc` taken.
    RetConditionalTaken,
    /// `RET cc` not taken.
    RetConditionalNotTaken,
    /// `RETN` / `RETI`.
    ReturnFromInterrupt,
    /// `RST p`.
    Restart,
    /// `PUSH rr`.
    Push,
    /// `POP rr`.
    Pop,
    /// `DI` / `EI`.
    InterruptEnable,
    /// `IM n`.
    InterruptModeSelect,
    /// Non-maskable interrupt entry.
    NmiEntry,
    /// Extra cost on top of the executed opcode for mode 0 entry.
    Mode0Overhead,
    /// Mode 1 interrupt entry.
    Mode1Entry,
    /// Mode 2 interrupt entry.
    Mode2Entry,
}

/// Every cost kind paired with its T-cycle cost.
pub const CYCLE_COST_TABLE: &[(CycleCostKind, u32)] = &[
    entry(CycleCostKind::Nop),
    entry(CycleCostKind::LoadRegister),
    entry(CycleCostKind::LoadImmediate),
    entry(CycleCostKind::LoadIndirect),
    entry(CycleCostKind::StoreImmediateIndirect),
    entry(CycleCostKind::LoadAbsolute),
    entry(CycleCostKind::LoadPairImmediate),
    entry(CycleCostKind::LoadPairAbsolute),
    entry(CycleCostKind::LoadStackPointer),
    entry(CycleCostKind::LoadInterruptVector),
    entry(CycleCostKind::IncDecRegister),
    entry(CycleCostKind::IncDecIndirect),
    entry(CycleCostKind::IncDecPair),
    entry(CycleCostKind::AluRegister),
    entry(CycleCostKind::AluMemory),
    entry(CycleCostKind::AddPair),
    entry(CycleCostKind::AdcSbcPair),
    entry(CycleCostKind::Accumulator),
    entry(CycleCostKind::Negate),
    entry(CycleCostKind::Exchange),
    entry(CycleCostKind::ExchangeStack),
    entry(CycleCostKind::Jump),
    entry(CycleCostKind::JumpIndirect),
    entry(CycleCostKind::RelativeTaken),
    entry(CycleCostKind::RelativeNotTaken),
    entry(CycleCostKind::DjnzTaken),
    entry(CycleCostKind::DjnzNotTaken),
    entry(CycleCostKind::Call),
    entry(CycleCostKind::CallNotTaken),
    entry(CycleCostKind::Ret),
    entry(CycleCostKind::RetConditionalTaken),
    entry(CycleCostKind::RetConditionalNotTaken),
    entry(CycleCostKind::ReturnFromInterrupt),
    entry(CycleCostKind::Restart),
    entry(CycleCostKind::Push),
    entry(CycleCostKind::Pop),
    entry(CycleCostKind::InterruptEnable),
    entry(CycleCostKind::InterruptModeSelect),
    entry(CycleCostKind::NmiEntry),
    entry(CycleCostKind::Mode0Overhead),
    entry(CycleCostKind::Mode1Entry),
    entry(CycleCostKind::Mode2Entry),
];

const fn entry(kind: CycleCostKind) -> (CycleCostKind, u32) {
    (kind, cycle_cost(kind))
}

/// T-cycle cost for a cycle-cost kind.
#[must_use]
pub const fn cycle_cost(kind: CycleCostKind) -> u32 {
    match kind {
        CycleCostKind::Nop
        | CycleCostKind::LoadRegister
        | CycleCostKind::IncDecRegister
        | CycleCostKind::AluRegister
        | CycleCostKind::Accumulator
        | CycleCostKind::Exchange
        | CycleCostKind::JumpIndirect
        | CycleCostKind::InterruptEnable => 4,
        CycleCostKind::LoadImmediate
        | CycleCostKind::LoadIndirect
        | CycleCostKind::AluMemory
        | CycleCostKind::RelativeNotTaken => 7,
        CycleCostKind::StoreImmediateIndirect
        | CycleCostKind::LoadPairImmediate
        | CycleCostKind::Jump
        | CycleCostKind::CallNotTaken
        | CycleCostKind::Ret
        | CycleCostKind::Pop => 10,
        CycleCostKind::LoadAbsolute | CycleCostKind::DjnzTaken | CycleCostKind::Mode1Entry => 13,
        CycleCostKind::LoadPairAbsolute => 16,
        CycleCostKind::LoadStackPointer | CycleCostKind::IncDecPair => 6,
        CycleCostKind::LoadInterruptVector => 9,
        CycleCostKind::IncDecIndirect
        | CycleCostKind::AddPair
        | CycleCostKind::RetConditionalTaken
        | CycleCostKind::Restart
        | CycleCostKind::Push
        | CycleCostKind::NmiEntry => 11,
        CycleCostKind::AdcSbcPair => 15,
        CycleCostKind::Negate
        | CycleCostKind::DjnzNotTaken
        | CycleCostKind::InterruptModeSelect => 8,
        CycleCostKind::ExchangeStack | CycleCostKind::Mode2Entry => 19,
        CycleCostKind::RelativeTaken => 12,
        CycleCostKind::Call => 17,
        CycleCostKind::RetConditionalNotTaken => 5,
        CycleCostKind::ReturnFromInterrupt => 14,
        CycleCostKind::Mode0Overhead => 2,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{cycle_cost, CycleCostKind, CYCLE_COST_TABLE};

    const KIND_COUNT: usize = 42;

    #[test]
    fn table_contains_unique_kinds() {
        let kinds: HashSet<_> = CYCLE_COST_TABLE.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds.len(), CYCLE_COST_TABLE.len());
    }

    #[test]
    fn table_values_match_documented_t_states() {
        assert_eq!(cycle_cost(CycleCostKind::Nop), 4);
        assert_eq!(cycle_cost(CycleCostKind::Jump), 10);
        assert_eq!(cycle_cost(CycleCostKind::Call), 17);
        assert_eq!(cycle_cost(CycleCostKind::RetConditionalNotTaken), 5);
        assert_eq!(cycle_cost(CycleCostKind::NmiEntry), 11);
        assert_eq!(cycle_cost(CycleCostKind::Mode1Entry), 13);
        assert_eq!(cycle_cost(CycleCostKind::Mode2Entry), 19);
    }

    #[test]
    fn table_lists_every_kind() {
        assert_eq!(CYCLE_COST_TABLE.len(), KIND_COUNT);
        assert!(CYCLE_COST_TABLE.iter().all(|(_, cycles)| *cycles > 0));
    }

    #[test]
    fn every_table_entry_resolves_via_lookup() {
        for (kind, expected_cycles) in CYCLE_COST_TABLE {
            assert_eq!(cycle_cost(*kind), *expected_cycles);
        }
    }
}
