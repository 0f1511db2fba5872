#![allow(clippy::unwrap_used)]

use inkwell::context::Context;
use inkwell::module::Linkage;

use super::*;
use crate::JitSession;
use pretty_assertions::assert_eq;

/// Bitcode for a module defining `int <name>(void) { return <value>; }`
/// plus an internal helper that must not be exported.
fn constant_fn_bitcode(module_name: &str, name: &str, value: u64) -> Vec<u8> {
    let context = Context::create();
    let module = context.create_module(module_name);
    let builder = context.create_builder();
    let i32_type = context.i32_type();
    let fn_type = i32_type.fn_type(&[], false);

    let function = module.add_function(name, fn_type, None);
    builder.position_at_end(context.append_basic_block(function, "entry"));
    builder
        .build_return(Some(&i32_type.const_int(value, false)))
        .unwrap();

    let helper = module.add_function("local_helper", fn_type, Some(Linkage::Internal));
    builder.position_at_end(context.append_basic_block(helper, "entry"));
    builder
        .build_return(Some(&i32_type.const_int(0, false)))
        .unwrap();

    module.add_function("external_decl", fn_type, None);

    module.write_bitcode_to_memory().as_slice().to_vec()
}

#[test]
fn test_module_exports_only_strong_definitions() {
    let bitcode = constant_fn_bitcode("m", "answer", 42);
    let module = OrcModule::from_bitcode("m", &bitcode).unwrap();
    assert_eq!(module.name(), "m");
    assert_eq!(module.defined_symbols(), ["answer".to_string()]);
}

#[test]
fn test_malformed_bitcode_rejected() {
    let err = OrcModule::from_bitcode("bad", b"BC\xC0\xDE garbage").unwrap_err();
    assert!(matches!(err, SessionError::InvalidModule { .. }));
}

#[test]
fn test_unadded_module_is_disposed() {
    let bitcode = constant_fn_bitcode("m", "answer", 1);
    drop(OrcModule::from_bitcode("m", &bitcode).unwrap());
}

#[test]
fn test_create_reports_host_triple() {
    let backend = OrcBackend::create().unwrap();
    assert!(!backend.triple().is_empty());
    assert!(!backend.mangle("answer").is_empty());
}

#[test]
fn test_add_resolve_call() {
    let session = JitSession::new(OrcBackend::create().unwrap());
    let bitcode = constant_fn_bitcode("m", "orc_answer", 42);
    session
        .add_module(OrcModule::from_bitcode("m", &bitcode).unwrap())
        .unwrap();

    let f: extern "C" fn() -> i32 = unsafe { session.resolve("orc_answer").unwrap().cast() };
    assert_eq!(f(), 42);
    session.end().unwrap();
}

#[test]
fn test_duplicate_definition_rejected() {
    let session = JitSession::new(OrcBackend::create().unwrap());
    let first = constant_fn_bitcode("a", "orc_dup", 1);
    let second = constant_fn_bitcode("b", "orc_dup", 2);

    session
        .add_module(OrcModule::from_bitcode("a", &first).unwrap())
        .unwrap();
    let err = session
        .add_module(OrcModule::from_bitcode("b", &second).unwrap())
        .unwrap_err();
    assert!(matches!(err, SessionError::DuplicateSymbol { .. }));
}

#[test]
fn test_process_symbols_visible() {
    let session = JitSession::new(OrcBackend::create().unwrap());
    assert!(session.resolve("malloc").is_ok());
    assert_eq!(
        session.resolve("rtcc_no_such_symbol"),
        Err(SessionError::SymbolNotFound {
            symbol: "rtcc_no_such_symbol".to_string()
        })
    );
}
