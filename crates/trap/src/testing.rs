//! Host-side stand-ins for the hart: a register file that executes the codec
//! assembly, a CSR block and a timer.

use std::cell::Cell;
use std::collections::BTreeMap;

use crate::frame::{FRAME_SLOTS, TrapFrame};
use crate::{Exception, Interrupt, Mode, Timer, TrapCause, TrapControl, VectorBase};

#[ctor::ctor(anonymous)]
fn test_init() {
    let _ = env_logger::builder()
        .parse_env(env_logger::Env::default().default_filter_or("info"))
        .format_level(true)
        .format_source_path(true)
        .format_module_path(false)
        .target(env_logger::Target::Stdout)
        .is_test(true)
        .try_init();
}

#[cfg(not(feature = "rve"))]
pub fn tracked_registers() -> Vec<&'static str> {
    vec![
        "ra", "t0", "t1", "t2", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "t3", "t4", "t5",
        "t6",
    ]
}

#[cfg(feature = "rve")]
pub fn tracked_registers() -> Vec<&'static str> {
    vec!["ra", "t0", "t1", "a0", "a1", "a2", "a3"]
}

/// Executes the load/store/`addi sp` subset emitted by the frame codec.
#[derive(Clone, Debug)]
pub struct SimulatedHart {
    regs: BTreeMap<String, usize>,
    memory: BTreeMap<usize, usize>,
}

impl SimulatedHart {
    pub fn new(sp: usize) -> Self {
        let mut regs = BTreeMap::new();
        regs.insert("sp".to_string(), sp);
        Self {
            regs,
            memory: BTreeMap::new(),
        }
    }

    pub fn get(&self, reg: &str) -> usize {
        self.regs.get(reg).copied().unwrap_or(0)
    }

    pub fn set(&mut self, reg: &str, value: usize) {
        self.regs.insert(reg.to_string(), value);
    }

    pub fn sp(&self) -> usize {
        self.get("sp")
    }

    pub fn run(&mut self, program: &str) {
        for line in program.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (op, rest) = line.split_once(' ').expect("instruction without operands");
            let operands: Vec<&str> = rest.split(',').map(str::trim).collect();
            match op {
                "addi" => {
                    assert_eq!(&operands[..2], &["sp", "sp"], "{line}");
                    let sp = self.sp() as i64 + eval(operands[2]);
                    self.set("sp", sp as usize);
                }
                "sd" | "sw" => {
                    let addr = self.address(operands[1]);
                    self.memory.insert(addr, self.get(operands[0]));
                }
                "ld" | "lw" => {
                    let addr = self.address(operands[1]);
                    let value = *self.memory.get(&addr).expect("load from unwritten slot");
                    self.set(operands[0], value);
                }
                _ => panic!("unexpected instruction in codec: {line}"),
            }
        }
    }

    /// Registers named by the loads/stores of `program`, in order.
    pub fn registers_in(program: &str) -> Vec<String> {
        program
            .lines()
            .filter_map(|line| {
                let (op, rest) = line.trim().split_once(' ')?;
                match op {
                    "sd" | "sw" | "ld" | "lw" => Some(rest.split(',').next()?.trim().to_string()),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn frame_at_sp(&self) -> TrapFrame {
        let word = core::mem::size_of::<usize>();
        let mut words = [0usize; FRAME_SLOTS];
        for (i, slot) in words.iter_mut().enumerate() {
            // Padding slots are never stored.
            *slot = self.memory.get(&(self.sp() + i * word)).copied().unwrap_or(0);
        }
        unsafe { core::mem::transmute::<[usize; FRAME_SLOTS], TrapFrame>(words) }
    }

    pub fn write_frame_at_sp(&mut self, frame: &TrapFrame) {
        let word = core::mem::size_of::<usize>();
        let words = unsafe { core::mem::transmute::<TrapFrame, [usize; FRAME_SLOTS]>(*frame) };
        for (i, value) in words.into_iter().enumerate() {
            self.memory.insert(self.sp() + i * word, value);
        }
    }

    fn address(&self, operand: &str) -> usize {
        let (offset, base) = operand.split_once('(').expect("memory operand");
        let base = base.trim_end_matches(')');
        (self.get(base) as i64 + eval(offset)) as usize
    }
}

/// Evaluates the `-16*8` style immediates the codec emits.
fn eval(expr: &str) -> i64 {
    let (sign, expr) = match expr.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, expr),
    };
    sign * expr
        .split('*')
        .map(|factor| factor.trim().parse::<i64>().expect("numeric factor"))
        .product::<i64>()
}

/// CSR block of one mode, backed by cells.
pub struct MockControl {
    mode: Mode,
    cause: Cell<usize>,
    info: Cell<usize>,
    epc: Cell<usize>,
    base: Cell<Option<VectorBase>>,
    enabled: Cell<bool>,
    sources: Cell<u64>,
}

impl MockControl {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            cause: Cell::new(0),
            info: Cell::new(0),
            epc: Cell::new(0),
            base: Cell::new(None),
            enabled: Cell::new(false),
            sources: Cell::new(0),
        }
    }

    /// Latch an exception the way the hart does on trap entry.
    pub fn raise(&self, exception: Exception, pc: usize) {
        self.cause.set(exception.code().expect("architectural exception"));
        self.epc.set(pc);
    }

    pub fn raise_interrupt(&self, interrupt: Interrupt, pc: usize) {
        self.cause
            .set(interrupt.cause_bits().expect("architectural interrupt"));
        self.epc.set(pc);
    }

    pub fn trap_entry(&self) -> Option<VectorBase> {
        self.base.get()
    }

    pub fn source_enabled(&self, source: Interrupt) -> bool {
        let bit = source.code().expect("known source");
        self.sources.get() & (1 << bit) != 0
    }
}

impl TrapControl for MockControl {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn cause(&self) -> TrapCause {
        TrapCause::from_bits(self.cause.get(), self.info.get())
    }

    fn set_cause(&self, bits: usize) {
        self.cause.set(bits);
    }

    fn epc(&self) -> usize {
        self.epc.get()
    }

    fn set_epc(&self, pc: usize) {
        self.epc.set(pc);
    }

    fn set_trap_entry(&self, base: VectorBase) {
        self.base.set(Some(base));
    }

    fn enable_interrupts(&self) {
        self.enabled.set(true);
    }

    fn disable_interrupts(&self) {
        self.enabled.set(false);
    }

    fn interrupts_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn enable_source(&self, source: Interrupt) {
        if let Some(bit) = source.code() {
            self.sources.set(self.sources.get() | 1 << bit);
        }
    }

    fn disable_source(&self, source: Interrupt) {
        if let Some(bit) = source.code() {
            self.sources.set(self.sources.get() & !(1 << bit));
        }
    }
}

pub struct MockTimer {
    pub now: Cell<u64>,
    pub compare: Cell<Option<u64>>,
}

impl MockTimer {
    pub fn at(now: u64) -> Self {
        Self {
            now: Cell::new(now),
            compare: Cell::new(None),
        }
    }
}

impl Timer for MockTimer {
    const TICKS_PER_SECOND: u64 = 32_768;

    fn now(&self) -> u64 {
        self.now.get()
    }

    fn set_compare(&self, deadline: u64) {
        self.compare.set(Some(deadline));
    }
}
