//! Processor: reset/interrupt arbitration and the fetch-decode-execute step.
//!
//! Every step evaluates, highest priority first:
//!
//! 1. a latched reset request (reinitialize, no cycles, no fetch);
//! 2. a latched NMI (push `PC`, jump to `0x0066`, 11 cycles);
//! 3. a maskable interrupt, if `IFF1` is set and the previous instruction
//!    was not `EI`;
//! 4. a halted idle cycle, or a normal fetch-decode-execute.

use log::{debug, trace, warn};

use crate::bus::{Bus, BusError};
use crate::config::ProcessorConfig;
use crate::decoder::Decoder;
use crate::execute::{call_subroutine, execute_instruction, ExecuteOutcome};
use crate::fault::Fault;
use crate::signals::InterruptLines;
use crate::state::{InterruptMode, RegisterBank};
use crate::timing::{cycle_cost, CycleCostKind};
use crate::trace::{InterruptSource, NullTraceSink, TraceEvent, TraceSink};
use crate::word::Word;

/// Handler address for non-maskable interrupts.
pub const NMI_VECTOR: u16 = 0x0066;
/// Handler address for mode 1 maskable interrupts.
pub const MODE1_VECTOR: u16 = 0x0038;

/// Operand bytes a base-page instruction can carry.
const MAX_OPERAND_BYTES: usize = 2;

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// A pending reset reinitialized the processor; no instruction ran.
    Reset,
    /// One instruction retired.
    Retired {
        /// T-cycles charged.
        cycles: u32,
    },
    /// The processor is halted and idled for one instruction slot.
    Halted {
        /// T-cycles charged.
        cycles: u32,
    },
    /// An interrupt was accepted.
    Interrupted {
        /// Interrupt kind.
        source: InterruptSource,
        /// T-cycles charged, including the mode 0 instruction.
        cycles: u32,
    },
}

impl StepOutcome {
    /// T-cycles charged by the step.
    #[must_use]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Reset => 0,
            Self::Retired { cycles }
            | Self::Halted { cycles }
            | Self::Interrupted { cycles, .. } => cycles,
        }
    }
}

/// Aggregate result of [`Processor::run_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunOutcome {
    /// Steps taken.
    pub steps: u64,
    /// T-cycles charged across those steps.
    pub cycles: u64,
}

/// One emulated processor bound to its bus.
#[derive(Debug)]
pub struct Processor<B: Bus> {
    regs: RegisterBank,
    bus: B,
    total_cycles: u64,
    interrupt_mode: InterruptMode,
    lines: InterruptLines,
    config: ProcessorConfig,
}

impl<B: Bus> Processor<B> {
    /// Creates a processor in its reset state with the default config.
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, ProcessorConfig::default())
    }

    /// Creates a processor in its reset state.
    #[must_use]
    pub fn with_config(bus: B, config: ProcessorConfig) -> Self {
        Self {
            regs: RegisterBank::default(),
            bus,
            total_cycles: 0,
            interrupt_mode: config.reset_interrupt_mode,
            lines: InterruptLines::new(),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Runs one arbitration pass without tracing.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the step; no cycles are charged for it.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        self.step_traced(&mut NullTraceSink)
    }

    /// Runs one arbitration pass, reporting to `sink` when tracing is
    /// enabled in the config.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the step; no cycles are charged for it.
    pub fn step_traced(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        let pc = self.regs.pc();
        match self.arbitrate(sink) {
            Ok(outcome) => {
                self.total_cycles += u64::from(outcome.cycles());
                Ok(outcome)
            }
            Err(fault) => {
                warn!("{fault} (step at {pc:#06x})");
                self.emit(
                    sink,
                    TraceEvent::FaultRaised {
                        pc,
                        fault_class: fault.class(),
                    },
                );
                Err(fault)
            }
        }
    }

    /// Steps until at least `budget` T-cycles have elapsed.
    ///
    /// # Errors
    ///
    /// Stops at the first fault and returns it.
    pub fn run_for(&mut self, budget: u64) -> Result<RunOutcome, Fault> {
        let mut outcome = RunOutcome::default();
        while outcome.cycles < budget {
            let step = self.step()?;
            outcome.steps += 1;
            outcome.cycles += u64::from(step.cycles());
        }
        Ok(outcome)
    }

    /// Reinitializes the processor immediately. Not for use while another
    /// thread may be inside [`Self::step`]; use [`Self::request_reset`].
    pub fn reset(&mut self) {
        self.lines.take_reset();
        self.apply_reset();
    }

    /// Latches a reset, applied at the next step.
    pub fn request_reset(&self) {
        self.lines.request_reset();
    }

    /// Drives the NMI input.
    pub fn set_nmi_line(&self, level: bool) {
        self.lines.set_nmi(level);
    }

    /// Drives the INT input.
    pub fn set_int_line(&self, level: bool) {
        self.lines.set_int(level);
    }

    /// Shareable handle onto this processor's control lines.
    #[must_use]
    pub fn lines(&self) -> InterruptLines {
        self.lines.clone()
    }

    /// T-cycles charged since creation or the last [`Self::reset_cycles`].
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Zeroes the cycle counter.
    pub const fn reset_cycles(&mut self) {
        self.total_cycles = 0;
    }

    /// Register bank.
    #[must_use]
    pub const fn registers(&self) -> &RegisterBank {
        &self.regs
    }

    /// Mutable register bank, for harnesses and debuggers.
    pub const fn registers_mut(&mut self) -> &mut RegisterBank {
        &mut self.regs
    }

    /// Current maskable interrupt mode.
    #[must_use]
    pub const fn interrupt_mode(&self) -> InterruptMode {
        self.interrupt_mode
    }

    /// Selects the maskable interrupt mode.
    pub fn set_interrupt_mode(&mut self, mode: InterruptMode) {
        if mode != self.interrupt_mode {
            debug!("interrupt mode {}", mode.number());
        }
        self.interrupt_mode = mode;
    }

    /// Attached bus.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable attached bus.
    pub const fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the processor and returns its bus.
    #[must_use]
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn emit(&self, sink: &mut dyn TraceSink, event: TraceEvent) {
        if self.config.tracing_enabled {
            sink.on_event(event);
        }
    }

    fn apply_reset(&mut self) {
        self.lines.take_nmi_edge();
        self.regs.reset(self.lines.int_level());
        self.interrupt_mode = self.config.reset_interrupt_mode;
        debug!("reset");
    }

    fn arbitrate(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        if self.lines.take_reset() {
            self.apply_reset();
            self.emit(sink, TraceEvent::Reset);
            return Ok(StepOutcome::Reset);
        }

        if self.lines.take_nmi_edge() {
            self.regs.set_nmi_pending(true);
        }
        self.regs.set_int_pending(self.lines.int_level());

        if self.regs.nmi_pending() {
            return self.accept_nmi(sink);
        }

        if self.regs.int_pending() && self.regs.iff1() && !self.regs.ei_executed() {
            return self.accept_int(sink);
        }
        let shadowed = self.regs.ei_executed();
        self.regs.set_ei_executed(false);

        if self.regs.halted() {
            return Ok(StepOutcome::Halted {
                cycles: cycle_cost(CycleCostKind::Nop),
            });
        }

        // A faulted fetch retries the same instruction, still shadowed.
        self.fetch_execute(sink)
            .inspect_err(|_| self.regs.set_ei_executed(shadowed))
    }

    fn accept_nmi(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        call_subroutine(&mut self.regs, &mut self.bus, NMI_VECTOR)?;
        self.regs.set_iff1(false);
        self.regs.set_nmi_pending(false);
        self.regs.set_halted(false);

        debug!("NMI accepted");
        self.emit(
            sink,
            TraceEvent::InterruptAccepted {
                source: InterruptSource::Nmi,
                vector: NMI_VECTOR,
            },
        );
        Ok(StepOutcome::Interrupted {
            source: InterruptSource::Nmi,
            cycles: cycle_cost(CycleCostKind::NmiEntry),
        })
    }

    fn accept_int(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        let snapshot = self.regs.clone();
        let accepted = self.enter_maskable();
        let (source, cycles) = match accepted {
            Ok(entry) => entry,
            Err(fault) => {
                self.regs = snapshot;
                return Err(fault);
            }
        };

        debug!(
            "INT accepted in mode {}, handler {:#06x}",
            self.interrupt_mode.number(),
            self.regs.pc()
        );
        self.emit(
            sink,
            TraceEvent::InterruptAccepted {
                source,
                vector: self.regs.pc(),
            },
        );
        Ok(StepOutcome::Interrupted { source, cycles })
    }

    fn enter_maskable(&mut self) -> Result<(InterruptSource, u32), Fault> {
        let data = self.bus.interrupt_acknowledge()?;
        self.regs.set_iffs(false);
        self.regs.set_halted(false);

        match self.interrupt_mode {
            InterruptMode::Mode0 => {
                let cycles = self.execute_acknowledged(data)?;
                Ok((
                    InterruptSource::Mode0,
                    cycles + cycle_cost(CycleCostKind::Mode0Overhead),
                ))
            }
            InterruptMode::Mode1 => {
                call_subroutine(&mut self.regs, &mut self.bus, MODE1_VECTOR)?;
                Ok((
                    InterruptSource::Mode1,
                    cycle_cost(CycleCostKind::Mode1Entry),
                ))
            }
            InterruptMode::Mode2 => {
                let vector = u16::from_halves(self.regs.i(), data);
                call_subroutine(&mut self.regs, &mut self.bus, vector)?;
                Ok((
                    InterruptSource::Mode2,
                    cycle_cost(CycleCostKind::Mode2Entry),
                ))
            }
        }
    }

    /// Runs the mode 0 opcode supplied on the data bus. Operand bytes come
    /// from further acknowledge cycles; the instruction is placed just
    /// before `PC` so its own advance lands back on the interrupted `PC`.
    fn execute_acknowledged(&mut self, opcode: u8) -> Result<u32, Fault> {
        let instruction = Decoder::decode_opcode(opcode);
        let size = instruction.size();

        let mut operands = [0; MAX_OPERAND_BYTES];
        let count = usize::from(size.saturating_sub(1)).min(MAX_OPERAND_BYTES);
        for byte in &mut operands[..count] {
            *byte = self.bus.interrupt_acknowledge()?;
        }

        let start = self.regs.pc().wrapping_sub(u16::from(size));
        self.regs.set_pc(start);
        let mut bus = AcknowledgedOperands {
            bus: &mut self.bus,
            first: start.wrapping_add(1),
            operands: &operands[..count],
        };
        let outcome = execute_instruction(instruction, &mut self.regs, &mut bus)?;
        self.absorb(outcome);
        Ok(outcome.cycles())
    }

    fn fetch_execute(&mut self, sink: &mut dyn TraceSink) -> Result<StepOutcome, Fault> {
        let pc = self.regs.pc();
        let opcode = self.bus.read(pc)?;
        self.emit(sink, TraceEvent::InstructionStart { pc, opcode });

        let instruction = Decoder::decode_fetched(&mut self.bus, pc, opcode)?;
        trace!("{pc:#06x}  {instruction}");

        let outcome = execute_instruction(instruction, &mut self.regs, &mut self.bus)?;
        self.absorb(outcome);

        let cycles = outcome.cycles();
        self.emit(sink, TraceEvent::InstructionRetired { pc, cycles });
        Ok(StepOutcome::Retired { cycles })
    }

    fn absorb(&mut self, outcome: ExecuteOutcome) {
        match outcome {
            ExecuteOutcome::InterruptModeSelected { mode, .. } => self.set_interrupt_mode(mode),
            ExecuteOutcome::Halted { .. } => debug!("halted, resume at {:#06x}", self.regs.pc()),
            ExecuteOutcome::Retired { .. } => {}
        }
    }
}

/// Bus view for a mode 0 instruction: reads of its operand bytes are
/// answered from the acknowledge cycles, everything else passes through.
struct AcknowledgedOperands<'a, B: ?Sized> {
    bus: &'a mut B,
    first: u16,
    operands: &'a [u8],
}

impl<B: Bus + ?Sized> Bus for AcknowledgedOperands<'_, B> {
    fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        match self.operands.get(usize::from(addr.wrapping_sub(self.first))) {
            Some(byte) => Ok(*byte),
            None => self.bus.read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.bus.write(addr, value)
    }

    fn interrupt_acknowledge(&mut self) -> Result<u8, BusError> {
        self.bus.interrupt_acknowledge()
    }
}
