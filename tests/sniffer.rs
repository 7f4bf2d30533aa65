//! End-to-end tests of the scripted-unwinder protocol over the public API:
//! engine-side fakes implement `Architecture` and `StackFrame`, a host fake drives
//! the resolution, and the tests walk the full sniff → freeze → query lifecycle.

use std::sync::{Arc, Mutex};

use unwindscope::prelude::*;

/// An architecture with uniform 8-byte registers: sp=0, pc=1, fp=2, lr=3.
struct Arch64;

const REGISTERS: &[(&str, u16)] = &[("sp", 0), ("pc", 1), ("fp", 2), ("lr", 3)];

impl Architecture for Arch64 {
    fn name(&self) -> &str {
        "arch64"
    }

    fn pointer_size(&self) -> usize {
        8
    }

    fn register_number(&self, name: &str) -> Option<u16> {
        REGISTERS
            .iter()
            .find(|(reg, _)| *reg == name)
            .map(|(_, number)| *number)
    }

    fn register_name(&self, number: u16) -> Option<&str> {
        REGISTERS
            .iter()
            .find(|(_, reg)| *reg == number)
            .map(|(name, _)| *name)
    }

    fn register_size(&self, number: u16) -> Option<usize> {
        self.register_name(number).map(|_| 8)
    }
}

/// A frame with sp=0x7000, pc=0x4000, fp=sp+0x100 and lr=0x4010.
struct Frame {
    sp: u64,
    pc: u64,
}

impl Frame {
    fn new() -> Self {
        Frame {
            sp: 0x7000,
            pc: 0x4000,
        }
    }
}

impl StackFrame for Frame {
    fn register(&self, number: u16) -> unwindscope::Result<RegisterValue> {
        let value = match number {
            0 => self.sp,
            1 => self.pc,
            2 => self.sp + 0x100,
            3 => 0x4010,
            _ => return Err(Error::UnreadableRegister { regnum: number }),
        };
        Ok(RegisterValue::from_u64(value, 8))
    }

    fn stack_pointer(&self) -> unwindscope::Result<u64> {
        Ok(self.sp)
    }

    fn program_counter(&self) -> unwindscope::Result<u64> {
        Ok(self.pc)
    }
}

/// Host backed by a closure, standing in for the scripting layer.
struct Host<F>(F);

impl<F> UnwinderHost for Host<F>
where
    F: Fn(&Arc<PendingFrame>) -> unwindscope::Result<Resolution> + Send + Sync,
{
    fn resolve(&self, pending: &Arc<PendingFrame>) -> unwindscope::Result<Resolution> {
        (self.0)(pending)
    }
}

fn arch() -> ArchRef {
    Arc::new(Arch64)
}

fn frame() -> Arc<dyn StackFrame> {
    Arc::new(Frame::new())
}

#[test]
fn scripted_unwinder_produces_queryable_cache() {
    // The scripted logic reads sp=0x7000, identifies the frame as Wild(0x7000) and
    // reports that the caller's pc was 0x4010.
    let host = Host(|pending: &Arc<PendingFrame>| {
        let sp = pending.read_register("sp")?;
        assert_eq!(sp.as_u64(), Some(0x7000));

        let mut info = pending.create_unwind_info(FrameIdDescriptor::new().with_sp(sp))?;
        info.add_saved_register("pc", RegisterValue::from_u64(0x4010, 8))?;
        Ok(Resolution::Unwind(info))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    let record = dispatcher.sniff(frame()).unwrap().expect("cache produced");

    assert_eq!(record.identity(), FrameIdentity::Wild { sp: 0x7000 });
    assert_eq!(record.register_count(), 1);

    let pc_bytes = RegisterValue::from_u64(0x4010, 8);
    assert_eq!(
        record.previous_register(1),
        PrevRegister::Known(pc_bytes.bytes())
    );
    // Any register never written is explicitly unavailable, not zero and not an error.
    assert_eq!(record.previous_register(0), PrevRegister::Unavailable);
    assert_eq!(record.previous_register(2), PrevRegister::Unavailable);
    assert_eq!(record.previous_register(3), PrevRegister::Unavailable);
}

#[test]
fn no_match_defers_to_other_sniffers() {
    let host = Host(|_: &Arc<PendingFrame>| Ok(Resolution::NoMatch));
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    assert!(dispatcher.sniff(frame()).unwrap().is_none());
}

#[test]
fn host_failure_degrades_to_no_cache() {
    let host = Host(|_: &Arc<PendingFrame>| {
        Err(Error::HostFailure("unwinder raised an exception".into()))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    // No error surfaces; this sniffer simply found nothing.
    assert!(dispatcher.sniff(frame()).unwrap().is_none());
}

#[test]
fn cancellation_aborts_the_sniff() {
    let host = Host(|_: &Arc<PendingFrame>| Err(Error::Cancelled));
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    assert!(matches!(
        dispatcher.sniff(frame()).unwrap_err(),
        Error::Cancelled
    ));
}

#[test]
fn pending_frame_is_stale_after_the_attempt() {
    let stash: Arc<Mutex<Option<Arc<PendingFrame>>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&stash);
    let host = Host(move |pending: &Arc<PendingFrame>| {
        *slot.lock().unwrap() = Some(Arc::clone(pending));
        let sp = pending.read_register("sp")?;
        let info = pending.create_unwind_info(FrameIdDescriptor::new().with_sp(sp))?;
        Ok(Resolution::Unwind(info))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    dispatcher.sniff(frame()).unwrap().expect("cache produced");

    let pending = stash.lock().unwrap().take().unwrap();
    assert!(!pending.is_valid());
    assert!(matches!(
        pending.read_register("sp").unwrap_err(),
        Error::StalePendingFrame
    ));
    assert!(matches!(
        pending
            .create_unwind_info(
                FrameIdDescriptor::new().with_sp(RegisterValue::from_u64(0x7000, 8))
            )
            .unwrap_err(),
        Error::StalePendingFrame
    ));
    assert_eq!(pending.to_string(), "Stale PendingFrame instance");
}

#[test]
fn identity_precedence_end_to_end() {
    let host = Host(|pending: &Arc<PendingFrame>| {
        let sp = pending.read_register("sp")?;
        let pc = pending.read_register("lr")?;
        let info = pending.create_unwind_info(
            FrameIdDescriptor::new()
                .with_sp(sp)
                .with_pc(pc)
                .with_special(RegisterValue::from_u64(7, 8)),
        )?;
        Ok(Resolution::Unwind(info))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    let record = dispatcher.sniff(frame()).unwrap().expect("cache produced");
    assert_eq!(
        record.identity(),
        FrameIdentity::Special {
            sp: 0x7000,
            pc: 0x4010,
            special: 7
        }
    );
}

#[test]
fn validation_errors_reach_the_scripted_logic() {
    // The host surfaces whatever error its scripted unwinder hit; the dispatcher
    // then absorbs it. Both layers observe the expected kinds.
    let observed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&observed);
    let host = Host(move |pending: &Arc<PendingFrame>| {
        let record = |err: Error| log.lock().unwrap().push(err.to_string());

        record(pending.read_register("cr7").unwrap_err());

        let sp = pending.read_register("sp")?;
        record(
            pending
                .create_unwind_info(FrameIdDescriptor::new())
                .unwrap_err(),
        );
        record(
            pending
                .create_unwind_info(
                    FrameIdDescriptor::new().with_sp(RegisterValue::from_u64(1, 2)),
                )
                .unwrap_err(),
        );

        let mut info = pending.create_unwind_info(FrameIdDescriptor::new().with_sp(sp))?;
        record(
            info.add_saved_register("pc", RegisterValue::from_u64(0x4010, 4))
                .unwrap_err(),
        );

        Err(Error::HostFailure("giving up".into()))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    assert!(dispatcher.sniff(frame()).unwrap().is_none());

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 4);
    assert!(observed[0].contains("Bad register"));
    assert!(observed[1].contains("requires the 'sp' field"));
    assert!(observed[2].contains("is not a pointer"));
    assert!(observed[3].contains("unexpected size: 4 instead of 8"));
}

#[test]
fn registry_installs_once_per_architecture() {
    struct Chain {
        names: Vec<String>,
    }
    impl SnifferChain for Chain {
        fn prepend(&mut self, sniffer: Arc<SnifferDispatcher>) {
            self.names
                .insert(0, sniffer.architecture().name().to_string());
        }
    }

    struct OtherArch;
    impl Architecture for OtherArch {
        fn name(&self) -> &str {
            "arch32"
        }
        fn pointer_size(&self) -> usize {
            4
        }
        fn register_number(&self, name: &str) -> Option<u16> {
            (name == "sp").then_some(0)
        }
        fn register_name(&self, number: u16) -> Option<&str> {
            (number == 0).then_some("sp")
        }
        fn register_size(&self, number: u16) -> Option<usize> {
            (number == 0).then_some(4)
        }
    }

    let host = Host(|_: &Arc<PendingFrame>| Ok(Resolution::NoMatch));
    let registry = UnwinderRegistry::new(Arc::new(host));
    let mut chain = Chain {
        names: vec!["builtin".to_string()],
    };

    let first: ArchRef = Arc::new(Arch64);
    let second: ArchRef = Arc::new(OtherArch);

    registry.observe_architecture(&first, &mut chain);
    registry.observe_architecture(&first, &mut chain);
    registry.observe_architecture(&second, &mut chain);

    // One install per architecture, each prepended ahead of the built-ins.
    assert_eq!(chain.names, vec!["arch32", "arch64", "builtin"]);
    assert!(registry.is_installed("arch64"));
    assert!(registry.is_installed("arch32"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn record_outlives_the_negotiation_objects() {
    let host = Host(|pending: &Arc<PendingFrame>| {
        let sp = pending.read_register("sp")?;
        let mut info = pending.create_unwind_info(FrameIdDescriptor::new().with_sp(sp))?;
        info.add_saved_register("fp", pending.read_register("fp")?)?;
        info.add_saved_register("pc", pending.read_register("lr")?)?;
        Ok(Resolution::Unwind(info))
    });
    let dispatcher = SnifferDispatcher::new(Arc::new(host), arch());

    let record = dispatcher.sniff(frame()).unwrap().expect("cache produced");
    drop(dispatcher);

    // Steady state continues against the frozen record alone.
    assert_eq!(record.register_count(), 2);
    let fp = RegisterValue::from_u64(0x7100, 8);
    assert_eq!(record.previous_register(2), PrevRegister::Known(fp.bytes()));
    assert_eq!(record.identity().sp(), 0x7000);
}
