//! Shared functionality which is used in unit-tests across the crate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arch::{ArchRef, Architecture};
use crate::frame::StackFrame;
use crate::unwinder::pending::PendingFrame;
use crate::unwinder::sniffer::{Resolution, UnwinderHost};
use crate::{Error, RegisterValue, Result};

/// Register table of the test architecture. `flags` is deliberately narrower and
/// `v0` deliberately wider than a pointer, for width-validation tests.
const TEST_REGISTERS: &[(&str, u16, usize)] = &[
    ("sp", 0, 8),
    ("pc", 1, 8),
    ("fp", 2, 8),
    ("lr", 3, 8),
    ("flags", 4, 4),
    ("v0", 5, 16),
];

/// A small fixed architecture: 8-byte pointers, six registers.
pub(crate) struct TestArch;

impl Architecture for TestArch {
    fn name(&self) -> &str {
        "test-arch"
    }

    fn pointer_size(&self) -> usize {
        8
    }

    fn register_number(&self, name: &str) -> Option<u16> {
        TEST_REGISTERS
            .iter()
            .find(|(reg, _, _)| *reg == name)
            .map(|(_, number, _)| *number)
    }

    fn register_name(&self, number: u16) -> Option<&str> {
        TEST_REGISTERS
            .iter()
            .find(|(_, reg, _)| *reg == number)
            .map(|(name, _, _)| *name)
    }

    fn register_size(&self, number: u16) -> Option<usize> {
        TEST_REGISTERS
            .iter()
            .find(|(_, reg, _)| *reg == number)
            .map(|(_, _, size)| *size)
    }
}

pub(crate) fn test_arch() -> ArchRef {
    Arc::new(TestArch)
}

/// A frame with a fixed register file: sp=0x7000, pc=0x4000, fp=0x7100, lr=0x4040.
/// Registers can be marked unreadable to exercise propagated read failures.
pub(crate) struct TestFrame {
    registers: HashMap<u16, RegisterValue>,
    unreadable: Vec<u16>,
}

impl TestFrame {
    pub(crate) fn new() -> Self {
        let mut registers = HashMap::new();
        registers.insert(0, RegisterValue::from_u64(0x7000, 8));
        registers.insert(1, RegisterValue::from_u64(0x4000, 8));
        registers.insert(2, RegisterValue::from_u64(0x7100, 8));
        registers.insert(3, RegisterValue::from_u64(0x4040, 8));
        registers.insert(4, RegisterValue::from_u64(0x2, 4));
        TestFrame {
            registers,
            unreadable: Vec::new(),
        }
    }

    pub(crate) fn with_unreadable(mut self, number: u16) -> Self {
        self.unreadable.push(number);
        self
    }
}

impl StackFrame for TestFrame {
    fn register(&self, number: u16) -> Result<RegisterValue> {
        if self.unreadable.contains(&number) {
            return Err(Error::UnreadableRegister { regnum: number });
        }
        self.registers
            .get(&number)
            .cloned()
            .ok_or(Error::UnreadableRegister { regnum: number })
    }

    fn stack_pointer(&self) -> Result<u64> {
        self.register(0).map(|value| value.as_u64().unwrap_or(0))
    }

    fn program_counter(&self) -> Result<u64> {
        self.register(1).map(|value| value.as_u64().unwrap_or(0))
    }
}

pub(crate) fn test_frame() -> Arc<dyn StackFrame> {
    Arc::new(TestFrame::new())
}

/// Closure-backed host, so tests can script the resolution inline.
pub(crate) struct FnHost<F>(pub F);

impl<F> UnwinderHost for FnHost<F>
where
    F: Fn(&Arc<PendingFrame>) -> Result<Resolution> + Send + Sync,
{
    fn resolve(&self, pending: &Arc<PendingFrame>) -> Result<Resolution> {
        (self.0)(pending)
    }
}
