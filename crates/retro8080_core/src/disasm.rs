use crate::cpu::opcodes::{lookup, Op};
use crate::memory::Memory;

/// One decoded instruction in Intel mnemonic form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pub text: String,
    pub len: u8,
}

/// Render the instruction at `pc`.
///
/// Uses the dispatcher's opcode table, so the listing always agrees with
/// what `step` would execute. Never mutates anything.
pub fn disassemble(memory: &Memory, pc: u16) -> Disassembly {
    let opcode = memory.read(pc);
    let entry = lookup(opcode);
    let d8 = memory.read(pc.wrapping_add(1));
    let d16 = memory.read_word(pc.wrapping_add(1));

    let text = match entry.op {
        Op::Nop => "NOP".to_string(),
        Op::Mov { dst, src } => format!("MOV {},{}", dst.name(), src.name()),
        Op::Mvi(reg) => format!("MVI {},${:02x}", reg.name(), d8),
        Op::Lxi(pair) => format!("LXI {},${:04x}", pair.name(), d16),
        Op::Lda => format!("LDA ${:04x}", d16),
        Op::Sta => format!("STA ${:04x}", d16),
        Op::Ldax(pair) => format!("LDAX {}", pair.name()),
        Op::Stax(pair) => format!("STAX {}", pair.name()),
        Op::Lhld => format!("LHLD ${:04x}", d16),
        Op::Shld => format!("SHLD ${:04x}", d16),
        Op::Alu(op, reg) => format!("{} {}", op.mnemonic(), reg.name()),
        Op::AluImm(op) => format!("{} ${:02x}", op.immediate_mnemonic(), d8),
        Op::Inr(reg) => format!("INR {}", reg.name()),
        Op::Dcr(reg) => format!("DCR {}", reg.name()),
        Op::Inx(pair) => format!("INX {}", pair.name()),
        Op::Dcx(pair) => format!("DCX {}", pair.name()),
        Op::Dad(pair) => format!("DAD {}", pair.name()),
        Op::Rlc => "RLC".to_string(),
        Op::Rrc => "RRC".to_string(),
        Op::Ral => "RAL".to_string(),
        Op::Rar => "RAR".to_string(),
        Op::Jmp => format!("JMP ${:04x}", d16),
        Op::Jcc(cond) => format!("J{} ${:04x}", cond.suffix(), d16),
        Op::Call => format!("CALL ${:04x}", d16),
        Op::Ccc(cond) => format!("C{} ${:04x}", cond.suffix(), d16),
        Op::Ret => "RET".to_string(),
        Op::Rcc(cond) => format!("R{}", cond.suffix()),
        Op::Rst(n) => format!("RST {}", n),
        Op::Push(pair) => format!("PUSH {}", pair.name()),
        Op::Pop(pair) => format!("POP {}", pair.name()),
        Op::Xchg => "XCHG".to_string(),
        Op::Xthl => "XTHL".to_string(),
        Op::Sphl => "SPHL".to_string(),
        Op::Pchl => "PCHL".to_string(),
        Op::Cma => "CMA".to_string(),
        Op::Stc => "STC".to_string(),
        Op::Cmc => "CMC".to_string(),
        Op::Daa => "DAA".to_string(),
        Op::Ei => "EI".to_string(),
        Op::Di => "DI".to_string(),
        Op::Hlt => "HLT".to_string(),
        Op::In => format!("IN ${:02x}", d8),
        Op::Out => format!("OUT ${:02x}", d8),
        Op::Undefined => format!("DB ${:02x}", opcode),
    };

    Disassembly {
        text,
        len: entry.len,
    }
}

/// Disassemble `count` consecutive instructions starting at `pc`.
pub fn listing(memory: &Memory, mut pc: u16, count: usize) -> Vec<(u16, Disassembly)> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let line = disassemble(memory, pc);
        let len = line.len as u16;
        out.push((pc, line));
        pc = pc.wrapping_add(len);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(program: &[u8]) -> Memory {
        let mut mem = Memory::new();
        mem.load(0x0000, program).unwrap();
        mem
    }

    #[test]
    fn renders_operands() {
        let mem = memory_with(&[
            0x31, 0x00, 0x24, // LXI SP,$2400
            0x3e, 0x7f, // MVI A,$7f
            0x77, // MOV M,A
            0xfe, 0x10, // CPI $10
            0xc2, 0x34, 0x12, // JNZ $1234
            0xf5, // PUSH PSW
            0xd7, // RST 2
            0xd3, 0x04, // OUT $04
            0x08, // undefined
        ]);
        let lines: Vec<String> = listing(&mem, 0, 9)
            .into_iter()
            .map(|(_, line)| line.text)
            .collect();
        assert_eq!(
            lines,
            [
                "LXI SP,$2400",
                "MVI A,$7f",
                "MOV M,A",
                "CPI $10",
                "JNZ $1234",
                "PUSH PSW",
                "RST 2",
                "OUT $04",
                "DB $08",
            ]
        );
    }

    #[test]
    fn listing_advances_by_instruction_length() {
        let mem = memory_with(&[0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x76]);
        let addrs: Vec<u16> = listing(&mem, 0, 4).into_iter().map(|(pc, _)| pc).collect();
        assert_eq!(addrs, [0, 3, 4, 6]);
    }

    #[test]
    fn conditional_mnemonics() {
        let mem = memory_with(&[0xe8, 0xfc, 0x00, 0x00]);
        assert_eq!(disassemble(&mem, 0).text, "RPE");
        assert_eq!(disassemble(&mem, 1).text, "CM $0000");
    }
}
