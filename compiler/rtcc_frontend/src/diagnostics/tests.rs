use super::*;

// The toggle is process-wide, so every assertion on it lives in this one test.
#[test]
fn test_toggle_follows_latest_request() {
    assert!(apply_options(&["-O2", VERBOSE_FLAG]));
    assert!(enabled());

    // A later request without -v switches it back off.
    assert!(!apply_options(&["-O2"]));
    assert!(!enabled());

    // Only the exact token counts.
    assert!(!apply_options(&["-verbose", "-vv"]));
    assert!(!enabled());

    set_enabled(true);
    assert!(enabled());
    set_enabled(false);
    assert!(!enabled());
}
