use crate::cpu::Cpu;

/// RST 1: raised when the beam is near the middle of the screen.
pub const MID_FRAME_VECTOR: u16 = 0x0008;
/// RST 2: raised at the start of vertical blank.
pub const END_FRAME_VECTOR: u16 = 0x0010;

/// Raster interrupt source driven by the frame loop.
///
/// Each accepted interrupt behaves like an `RST` to the next vector,
/// alternating between mid-frame and end-of-frame. Interrupts raised while
/// the CPU has them disabled are dropped: there is no pending latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterruptController {
    end_of_frame_next: bool,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vector the next accepted interrupt will jump to.
    pub fn next_vector(&self) -> u16 {
        if self.end_of_frame_next {
            END_FRAME_VECTOR
        } else {
            MID_FRAME_VECTOR
        }
    }

    /// Raise an interrupt.
    ///
    /// Returns the vector taken, or `None` when the request was dropped
    /// because interrupts were disabled or the run has already ended.
    pub fn interrupt(&mut self, cpu: &mut Cpu) -> Option<u16> {
        if cpu.status().is_terminal() {
            log::debug!("interrupt dropped: run ended with {:?}", cpu.status());
            return None;
        }
        if !cpu.interrupts_enabled {
            log::debug!("interrupt dropped at {:#06x}: interrupts disabled", cpu.regs.pc);
            return None;
        }
        cpu.interrupts_enabled = false;

        let vector = self.next_vector();
        cpu.push(cpu.regs.pc);
        cpu.regs.pc = vector;
        self.end_of_frame_next = !self.end_of_frame_next;
        Some(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{Flags, Status};

    fn enabled_cpu(pc: u16) -> Cpu {
        let mut cpu = Cpu::new(pc, 0x2400);
        cpu.interrupts_enabled = true;
        cpu
    }

    #[test]
    fn masked_interrupt_is_a_no_op() {
        let mut cpu = Cpu::new(0x1234, 0x2400);
        cpu.regs.flags = Flags::CARRY | Flags::ZERO;
        let mut ic = InterruptController::new();

        assert_eq!(ic.interrupt(&mut cpu), None);
        assert_eq!(cpu.regs.pc, 0x1234);
        assert_eq!(cpu.regs.sp, 0x2400);
        assert_eq!(cpu.regs.flags, Flags::CARRY | Flags::ZERO);
        // Dropped interrupts do not advance the alternation.
        assert_eq!(ic.next_vector(), MID_FRAME_VECTOR);
    }

    #[test]
    fn accepted_interrupt_pushes_pc_and_disables() {
        let mut cpu = enabled_cpu(0x1abc);
        let mut ic = InterruptController::new();

        assert_eq!(ic.interrupt(&mut cpu), Some(MID_FRAME_VECTOR));
        assert_eq!(cpu.regs.pc, MID_FRAME_VECTOR);
        assert_eq!(cpu.regs.sp, 0x23fe);
        assert_eq!(cpu.memory.read(0x23ff), 0x1a);
        assert_eq!(cpu.memory.read(0x23fe), 0xbc);
        assert!(!cpu.interrupts_enabled);

        // Still masked: the second request is lost.
        assert_eq!(ic.interrupt(&mut cpu), None);
        assert_eq!(cpu.regs.sp, 0x23fe);
    }

    #[test]
    fn ended_run_ignores_interrupts() {
        // EI; undefined opcode
        let mut cpu = enabled_cpu(0x0000);
        cpu.memory.load(0x0000, &[0xfb, 0x08]).unwrap();
        cpu.step(&mut ());
        assert!(cpu.step(&mut ()).is_terminal());
        let mut ic = InterruptController::new();

        assert_eq!(ic.interrupt(&mut cpu), None);
        assert_eq!(cpu.regs.pc, 0x0001);
        assert_eq!(cpu.regs.sp, 0x2400);
        assert!(cpu.interrupts_enabled);
        assert_eq!(ic.next_vector(), MID_FRAME_VECTOR);
    }

    #[test]
    fn vectors_alternate() {
        let mut cpu = enabled_cpu(0x0100);
        let mut ic = InterruptController::new();

        assert_eq!(ic.interrupt(&mut cpu), Some(MID_FRAME_VECTOR));
        cpu.interrupts_enabled = true;
        assert_eq!(ic.interrupt(&mut cpu), Some(END_FRAME_VECTOR));
        cpu.interrupts_enabled = true;
        assert_eq!(ic.interrupt(&mut cpu), Some(MID_FRAME_VECTOR));
    }

    #[test]
    fn handler_returns_to_interrupted_code() {
        // Handler at 0x0008: EI; RET
        let mut cpu = enabled_cpu(0x0200);
        cpu.memory.load(MID_FRAME_VECTOR, &[0xfb, 0xc9]).unwrap();
        let mut ic = InterruptController::new();

        ic.interrupt(&mut cpu);
        assert_eq!(cpu.step(&mut ()), Status::Running);
        assert!(cpu.interrupts_enabled);
        assert_eq!(cpu.step(&mut ()), Status::Running);
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.regs.sp, 0x2400);
    }
}
