pub mod alu;
pub mod opcodes;
pub mod regs;


use crate::disasm::disassemble;
use crate::error::Unsupported;
use crate::memory::Memory;
use opcodes::{Op, Opcode};
pub use regs::{Flags, Pair, Reg, RegisterPair, Registers};

/// Hook offered every opcode before the generic dispatcher sees it.
///
/// Machines use this to model peripherals that sit behind IN/OUT (or to trap
/// calls into an operating system that is not really there) without the CPU
/// core knowing anything about them.
pub trait IoHook {
    /// Inspect the instruction at `cpu.regs.pc`.
    ///
    /// `lo` and `hi` are the two bytes following the opcode (operand bytes
    /// for 2- and 3-byte instructions). Return `Ok(true)` after fully
    /// executing the instruction, including advancing `pc`; return
    /// `Ok(false)` to let the dispatcher decode it normally.
    fn intercept(&mut self, cpu: &mut Cpu, opcode: u8, hi: u8, lo: u8)
        -> Result<bool, Unsupported>;
}

/// No peripherals: every opcode goes to the dispatcher, so IN and OUT are
/// unsupported.
impl IoHook for () {
    fn intercept(&mut self, _: &mut Cpu, _: u8, _: u8, _: u8) -> Result<bool, Unsupported> {
        Ok(false)
    }
}

/// Run state of the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    /// `JMP 0000`: the program asked to end the run.
    ResetJump,
    /// The program hit something the emulator does not model.
    Unsupported(Unsupported),
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }
}

/// Intel 8080 core: registers, memory and control state.
#[derive(Clone)]
pub struct Cpu {
    pub regs: Registers,
    pub memory: Memory,
    pub interrupts_enabled: bool,
    status: Status,
    executed: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(0x0000, 0x0000)
    }
}

impl Cpu {
    /// Create a CPU with zeroed registers and memory.
    pub fn new(pc: u16, sp: u16) -> Self {
        let regs = Registers {
            pc,
            sp,
            ..Registers::default()
        };
        Self {
            regs,
            memory: Memory::new(),
            interrupts_enabled: false,
            status: Status::Running,
            executed: 0,
        }
    }

    /// Reset registers and run state, preserving memory contents.
    pub fn reset(&mut self, pc: u16, sp: u16) {
        let memory = std::mem::take(&mut self.memory);
        *self = Self { memory, ..Self::new(pc, sp) };
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of instructions completed so far, hooked ones included.
    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }

    /// Push a word: high byte at `sp - 1`, low byte at `sp - 2`.
    pub fn push(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.memory.write_word(self.regs.sp, value);
    }

    pub fn pop(&mut self) -> u16 {
        let value = self.memory.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Execute one instruction.
    ///
    /// The hook gets the first look at the opcode; anything it declines is
    /// decoded through the opcode table. Once the status is terminal this
    /// is a no-op that keeps returning the same status.
    pub fn step<H: IoHook + ?Sized>(&mut self, hook: &mut H) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        let pc = self.regs.pc;
        let opcode = self.memory.read(pc);
        let lo = self.memory.read(pc.wrapping_add(1));
        let hi = self.memory.read(pc.wrapping_add(2));

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{:04x}  {}", pc, disassemble(&self.memory, pc).text);
        }

        match hook.intercept(self, opcode, hi, lo) {
            Ok(true) => {}
            Ok(false) => self.execute(opcode, lo, hi),
            Err(fault) => self.stop(Status::Unsupported(fault)),
        }

        if !self.status.is_terminal() {
            self.executed += 1;
        }
        self.status
    }

    fn stop(&mut self, status: Status) {
        match status {
            Status::Running => {}
            Status::ResetJump => log::warn!("jump to 0x0000, ending run"),
            Status::Unsupported(fault) => log::error!("{fault}"),
        }
        self.status = status;
    }

    fn read_reg(&self, reg: Reg) -> u8 {
        match reg {
            Reg::M => self.memory.read(self.regs.hl.get()),
            _ => self.regs.get(reg),
        }
    }

    fn write_reg(&mut self, reg: Reg, value: u8) {
        match reg {
            Reg::M => self.memory.write(self.regs.hl.get(), value),
            _ => self.regs.set(reg, value),
        }
    }

    fn call(&mut self, target: u16, return_to: u16) {
        self.push(return_to);
        self.regs.pc = target;
    }

    fn execute(&mut self, opcode: u8, lo: u8, hi: u8) {
        let Opcode { op, len } = opcodes::lookup(opcode);
        let pc = self.regs.pc;
        let next = pc.wrapping_add(len as u16);
        let word = u16::from_le_bytes([lo, hi]);

        // Straight-line instructions leave this in place; transfers
        // overwrite it.
        self.regs.pc = next;

        match op {
            Op::Nop => {}

            // Data transfer
            Op::Mov { dst, src } => {
                let value = self.read_reg(src);
                self.write_reg(dst, value);
            }
            Op::Mvi(reg) => self.write_reg(reg, lo),
            Op::Lxi(pair) => self.regs.set_pair(pair, word),
            Op::Lda => self.regs.a = self.memory.read(word),
            Op::Sta => self.memory.write(word, self.regs.a),
            Op::Ldax(pair) => self.regs.a = self.memory.read(self.regs.pair(pair)),
            Op::Stax(pair) => self.memory.write(self.regs.pair(pair), self.regs.a),
            Op::Lhld => {
                let value = self.memory.read_word(word);
                self.regs.hl.set(value);
            }
            Op::Shld => self.memory.write_word(word, self.regs.hl.get()),

            // Arithmetic and logic
            Op::Alu(alu_op, reg) => {
                let value = self.read_reg(reg);
                self.regs.a = alu::accumulate(alu_op, self.regs.a, value, &mut self.regs.flags);
            }
            Op::AluImm(alu_op) => {
                self.regs.a = alu::accumulate(alu_op, self.regs.a, lo, &mut self.regs.flags);
            }
            Op::Inr(reg) => {
                let value = alu::increment(self.read_reg(reg), &mut self.regs.flags);
                self.write_reg(reg, value);
            }
            Op::Dcr(reg) => {
                let value = alu::decrement(self.read_reg(reg), &mut self.regs.flags);
                self.write_reg(reg, value);
            }
            Op::Inx(pair) => {
                let value = self.regs.pair(pair).wrapping_add(1);
                self.regs.set_pair(pair, value);
            }
            Op::Dcx(pair) => {
                let value = self.regs.pair(pair).wrapping_sub(1);
                self.regs.set_pair(pair, value);
            }
            Op::Dad(pair) => {
                let value = self.regs.pair(pair);
                let hl = alu::add_wide(self.regs.hl.get(), value, &mut self.regs.flags);
                self.regs.hl.set(hl);
            }
            Op::Daa => self.regs.a = alu::decimal_adjust(self.regs.a),
            Op::Cma => self.regs.a = !self.regs.a,
            Op::Stc => self.regs.flags.insert(Flags::CARRY),
            Op::Cmc => self.regs.flags.toggle(Flags::CARRY),

            // Rotation
            Op::Rlc => self.regs.a = alu::rotate_left(self.regs.a, &mut self.regs.flags),
            Op::Rrc => self.regs.a = alu::rotate_right(self.regs.a, &mut self.regs.flags),
            Op::Ral => self.regs.a = alu::rotate_left_through_carry(self.regs.a, &mut self.regs.flags),
            Op::Rar => self.regs.a = alu::rotate_right_through_carry(self.regs.a, &mut self.regs.flags),

            // Control transfer
            Op::Jmp => {
                self.regs.pc = word;
                if word == 0x0000 {
                    self.stop(Status::ResetJump);
                }
            }
            Op::Jcc(cond) => {
                if cond.holds(self.regs.flags) {
                    self.regs.pc = word;
                }
            }
            Op::Call => self.call(word, next),
            Op::Ccc(cond) => {
                if cond.holds(self.regs.flags) {
                    self.call(word, next);
                }
            }
            Op::Ret => self.regs.pc = self.pop(),
            Op::Rcc(cond) => {
                if cond.holds(self.regs.flags) {
                    self.regs.pc = self.pop();
                }
            }
            Op::Rst(vector) => self.call((vector as u16) << 3, next),
            Op::Pchl => self.regs.pc = self.regs.hl.get(),

            // Stack
            Op::Push(pair) => {
                let value = self.regs.pair(pair);
                self.push(value);
            }
            Op::Pop(pair) => {
                let value = self.pop();
                self.regs.set_pair(pair, value);
            }
            Op::Xthl => {
                let sp = self.regs.sp;
                let top = self.memory.read_word(sp);
                self.memory.write_word(sp, self.regs.hl.get());
                self.regs.hl.set(top);
            }
            Op::Sphl => self.regs.sp = self.regs.hl.get(),
            Op::Xchg => std::mem::swap(&mut self.regs.de, &mut self.regs.hl),

            // Machine control
            Op::Ei => self.interrupts_enabled = true,
            Op::Di => self.interrupts_enabled = false,
            Op::Hlt => log::debug!("HLT at {pc:#06x} treated as NOP"),

            Op::In => {
                self.regs.pc = pc;
                self.stop(Status::Unsupported(Unsupported::InPort { port: lo, pc }));
            }
            Op::Out => {
                self.regs.pc = pc;
                self.stop(Status::Unsupported(Unsupported::OutPort { port: lo, pc }));
            }
            Op::Undefined => {
                self.regs.pc = pc;
                self.stop(Status::Unsupported(Unsupported::Opcode { opcode, pc }));
            }
        }
    }
}
