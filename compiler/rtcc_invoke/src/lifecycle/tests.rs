#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Setup,
    Update,
    Teardown,
    Dropped,
}

type Calls = Rc<RefCell<Vec<Call>>>;

/// Writes the number of updates so far to `outputs[0]`.
struct Recorder {
    calls: Calls,
    updates: u32,
    teardown_status: Status,
}

impl Invocable for Recorder {
    fn setup(&mut self, _host: HostContext, outputs: &mut [f64], _inputs: &[f64]) -> Status {
        self.calls.borrow_mut().push(Call::Setup);
        if let Some(out) = outputs.first_mut() {
            *out = -1.0;
        }
        OK
    }

    fn update(&mut self, _host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
        self.calls.borrow_mut().push(Call::Update);
        self.updates += 1;
        if let Some(out) = outputs.first_mut() {
            *out = f64::from(self.updates) + inputs.iter().sum::<f64>();
        }
        OK
    }

    fn teardown(&mut self, _host: HostContext) -> Status {
        self.calls.borrow_mut().push(Call::Teardown);
        self.teardown_status
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.calls.borrow_mut().push(Call::Dropped);
    }
}

fn lifecycle(mode: ExecutionMode) -> (InvocableLifecycle, Calls) {
    lifecycle_with_teardown(mode, OK)
}

fn lifecycle_with_teardown(mode: ExecutionMode, teardown_status: Status) -> (InvocableLifecycle, Calls) {
    let calls = Calls::default();
    let recorder = Recorder {
        calls: Rc::clone(&calls),
        updates: 0,
        teardown_status,
    };
    (InvocableLifecycle::new(mode, Box::new(recorder), "recorder"), calls)
}

fn host() -> HostContext {
    HostContext::null()
}

#[test]
fn test_mode_from_raw() {
    assert_eq!(ExecutionMode::from_raw(1), Ok(ExecutionMode::SetupOnly));
    assert_eq!(ExecutionMode::from_raw(2), Ok(ExecutionMode::UpdateOnly));
    assert_eq!(ExecutionMode::from_raw(3), Ok(ExecutionMode::SetupAndUpdate));
    assert_eq!(ExecutionMode::from_raw(0), Err(LifecycleError::InvalidMode(0)));
    assert_eq!(ExecutionMode::from_raw(4), Err(LifecycleError::InvalidMode(4)));
    assert_eq!(ExecutionMode::SetupAndUpdate.as_raw(), 3);
}

#[test]
fn test_setup_and_update() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupAndUpdate);
    let mut out = [0.0];

    assert_eq!(lc.state(), LifecycleState::Created);
    assert_eq!(lc.setup(host(), &mut out, &[]), Ok(OK));
    assert_eq!(lc.state(), LifecycleState::Initialized);
    assert_eq!(out[0], -1.0);

    assert_eq!(lc.update(host(), &mut out, &[10.0]), Ok(OK));
    assert_eq!(lc.update(host(), &mut out, &[10.0]), Ok(OK));
    assert_eq!(out[0], 12.0);
    assert_eq!(lc.state(), LifecycleState::Initialized);

    assert_eq!(lc.teardown(host()), Ok(OK));
    assert_eq!(lc.state(), LifecycleState::Retired);
    assert!(!lc.is_live());
    assert_eq!(
        *calls.borrow(),
        [Call::Setup, Call::Update, Call::Update, Call::Teardown, Call::Dropped]
    );
}

#[test]
fn test_update_only_skips_setup() {
    let (mut lc, calls) = lifecycle(ExecutionMode::UpdateOnly);
    let mut out = [0.0];

    assert_eq!(lc.setup(host(), &mut out, &[]), Ok(OK));
    assert_eq!(lc.state(), LifecycleState::Created);
    assert_eq!(out[0], 0.0);

    assert_eq!(lc.update(host(), &mut out, &[]), Ok(OK));
    assert_eq!(out[0], 1.0);

    assert_eq!(lc.teardown(host()), Ok(OK));
    assert_eq!(
        *calls.borrow(),
        [Call::Update, Call::Teardown, Call::Dropped]
    );
}

#[test]
fn test_setup_only_ignores_updates() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupOnly);
    let mut out = [0.0];
    lc.setup(host(), &mut out, &[]).unwrap();

    for _ in 0..3 {
        assert_eq!(lc.update(host(), &mut out, &[1.0]), Ok(OK));
    }
    assert_eq!(out[0], -1.0);
    assert_eq!(*calls.borrow(), [Call::Setup]);
}

#[test]
fn test_update_before_setup_rejected() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupAndUpdate);
    assert_eq!(
        lc.update(host(), &mut [], &[]),
        Err(LifecycleError::NotInitialized {
            label: "recorder".to_string()
        })
    );
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_setup_twice_rejected() {
    let (mut lc, _calls) = lifecycle(ExecutionMode::SetupOnly);
    lc.setup(host(), &mut [], &[]).unwrap();
    assert!(matches!(
        lc.setup(host(), &mut [], &[]),
        Err(LifecycleError::AlreadyInitialized { .. })
    ));
}

#[test]
fn test_teardown_releases_even_on_failure() {
    let (mut lc, calls) = lifecycle_with_teardown(ExecutionMode::SetupAndUpdate, NOTOK);
    lc.setup(host(), &mut [], &[]).unwrap();

    assert_eq!(lc.teardown(host()), Ok(NOTOK));
    assert_eq!(lc.state(), LifecycleState::Retired);
    assert_eq!(calls.borrow().last(), Some(&Call::Dropped));
}

#[test]
fn test_teardown_from_created() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupAndUpdate);
    assert_eq!(lc.teardown(host()), Ok(OK));
    assert_eq!(*calls.borrow(), [Call::Teardown, Call::Dropped]);
}

#[test]
fn test_retired_rejects_everything() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupAndUpdate);
    lc.setup(host(), &mut [], &[]).unwrap();
    lc.teardown(host()).unwrap();
    let before = calls.borrow().len();

    let retired = LifecycleError::Retired {
        label: "recorder".to_string(),
    };
    assert_eq!(lc.setup(host(), &mut [], &[]), Err(retired.clone()));
    assert_eq!(lc.update(host(), &mut [], &[]), Err(retired.clone()));
    assert_eq!(lc.teardown(host()), Err(retired));
    assert_eq!(lc.update_status(host(), &mut [], &[]), NOTOK);
    assert_eq!(lc.teardown_status(host()), NOTOK);
    assert_eq!(calls.borrow().len(), before);
}

#[test]
fn test_drop_without_teardown_releases_silently() {
    let (mut lc, calls) = lifecycle(ExecutionMode::SetupAndUpdate);
    lc.setup(host(), &mut [], &[]).unwrap();
    drop(lc);
    assert_eq!(*calls.borrow(), [Call::Setup, Call::Dropped]);
}

proptest! {
    #[test]
    fn prop_setup_only_updates_are_inert(updates in 0usize..32, input in -1e6f64..1e6) {
        let (mut lc, calls) = lifecycle(ExecutionMode::SetupOnly);
        let mut out = [0.0];
        lc.setup(host(), &mut out, &[]).unwrap();
        let after_setup = out;

        for _ in 0..updates {
            prop_assert_eq!(lc.update(host(), &mut out, &[input]), Ok(OK));
        }
        prop_assert_eq!(out, after_setup);
        prop_assert_eq!(calls.borrow().clone(), vec![Call::Setup]);
    }

    #[test]
    fn prop_out_of_range_modes_rejected(raw in any::<i32>().prop_filter("valid", |m| !(1..=3).contains(m))) {
        prop_assert_eq!(ExecutionMode::from_raw(raw), Err(LifecycleError::InvalidMode(raw)));
    }
}
