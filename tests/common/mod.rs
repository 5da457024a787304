#![allow(dead_code)]

pub mod synthetic_store;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}
