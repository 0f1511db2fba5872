#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::{NOTOK, OK};
use pretty_assertions::assert_eq;

type Events = Rc<RefCell<Vec<String>>>;

/// A C-ABI object laid out the way compiled C++ code would lay it out.
#[repr(C)]
struct Counter {
    header: RawInvocable,
    count: f64,
    events: Events,
}

static COUNTER_VTABLE: InvocableVTable = InvocableVTable {
    setup: counter_setup,
    update: counter_update,
    teardown: counter_teardown,
    destroy: counter_destroy,
};

unsafe fn counter<'a>(this: *mut RawInvocable) -> &'a mut Counter {
    let counter = &mut *this.cast::<Counter>();
    debug_assert!(std::ptr::eq(counter.header.vtable, &COUNTER_VTABLE));
    counter
}

unsafe extern "C" fn counter_setup(
    this: *mut RawInvocable,
    _host: *mut c_void,
    outputs: *mut f64,
    output_count: usize,
    inputs: *const f64,
    input_count: usize,
) -> i32 {
    let this = counter(this);
    this.events.borrow_mut().push(format!("setup {output_count} {input_count}"));
    this.count = if input_count > 0 { *inputs } else { 0.0 };
    if output_count > 0 {
        *outputs = this.count;
    }
    OK
}

unsafe extern "C" fn counter_update(
    this: *mut RawInvocable,
    _host: *mut c_void,
    outputs: *mut f64,
    output_count: usize,
    _inputs: *const f64,
    _input_count: usize,
) -> i32 {
    let this = counter(this);
    this.events.borrow_mut().push("update".to_string());
    this.count += 1.0;
    if output_count == 0 {
        return NOTOK;
    }
    *outputs = this.count;
    OK
}

unsafe extern "C" fn counter_teardown(this: *mut RawInvocable, host: *mut c_void) -> i32 {
    let this = counter(this);
    this.events
        .borrow_mut()
        .push(format!("teardown {}", !host.is_null()));
    OK
}

unsafe extern "C" fn counter_destroy(this: *mut RawInvocable) {
    let this = Box::from_raw(this.cast::<Counter>());
    this.events.borrow_mut().push("destroy".to_string());
}

fn new_counter(events: &Events) -> *mut RawInvocable {
    let counter = Box::new(Counter {
        header: RawInvocable {
            vtable: &COUNTER_VTABLE,
        },
        count: 0.0,
        events: Rc::clone(events),
    });
    Box::into_raw(counter).cast()
}

#[test]
fn test_null_object_rejected() {
    assert!(unsafe { NativeInvocable::from_raw(std::ptr::null_mut()) }.is_none());

    let mut no_vtable = RawInvocable {
        vtable: std::ptr::null(),
    };
    assert!(unsafe { NativeInvocable::from_raw(&mut no_vtable) }.is_none());
}

#[test]
fn test_calls_reach_vtable() {
    let events = Events::default();
    let mut object = unsafe { NativeInvocable::from_raw(new_counter(&events)) }.unwrap();

    let mut outputs = [0.0; 2];
    let mut host_value = 0_u8;
    let host = HostContext::new(std::ptr::addr_of_mut!(host_value).cast());

    assert_eq!(object.setup(host, &mut outputs, &[5.0]), OK);
    assert_eq!(outputs[0], 5.0);
    assert_eq!(object.update(host, &mut outputs, &[]), OK);
    assert_eq!(outputs[0], 6.0);
    assert_eq!(object.update(host, &mut [], &[]), NOTOK);
    assert_eq!(object.teardown(host), OK);

    assert_eq!(
        *events.borrow(),
        ["setup 2 1", "update", "update", "teardown true"]
    );
}

#[test]
fn test_drop_calls_destroy_once() {
    let events = Events::default();
    let object = unsafe { NativeInvocable::from_raw(new_counter(&events)) }.unwrap();
    drop(object);
    assert_eq!(*events.borrow(), ["destroy"]);
}

thread_local! {
    static FACTORY_EVENTS: Events = Events::default();
}

unsafe extern "C" fn counter_factory() -> *mut RawInvocable {
    FACTORY_EVENTS.with(new_counter)
}

unsafe extern "C" fn null_factory() -> *mut RawInvocable {
    std::ptr::null_mut()
}

#[test]
fn test_from_factory() {
    let object = unsafe { NativeInvocable::from_factory(counter_factory) };
    assert!(object.is_some());
    drop(object);
    FACTORY_EVENTS.with(|events| assert_eq!(*events.borrow(), ["destroy"]));

    assert!(unsafe { NativeInvocable::from_factory(null_factory) }.is_none());
}
