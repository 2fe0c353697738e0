use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use pfweights::pf::{normalize_from_logs_unchecked, normalize_log, normalize_or_flatten};

// Records are kept per thread so that tests running in parallel do not see
// each other's warnings.
thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;
static INIT: Once = Once::new();

fn capture() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already set");
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

fn warnings() -> Vec<String> {
    RECORDS.with(|r| {
        r.borrow()
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, msg)| msg.clone())
            .collect()
    })
}

#[test]
fn flattening_linear_weights_warns_once() {
    capture();

    let result = normalize_or_flatten(&[0.0, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(result.into_weights(), vec![0.25; 4]);

    let warnings = warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("flattening"));
}

#[test]
fn flattening_log_weights_warns_once() {
    capture();

    let result = normalize_log(&[-1000.0, -1000.0, -1000.0, -1000.0]).unwrap();
    for w in result.weights() {
        assert!((w + 4.0_f64.ln()).abs() < 1e-12);
    }

    assert_eq!(warnings().len(), 1);
}

#[test]
fn healthy_weights_do_not_warn() {
    capture();

    normalize_or_flatten(&[0.1, 0.2, 0.3, 0.4]).unwrap();
    normalize_log(&[-1.0, -2.0, -3.0]).unwrap();

    assert!(warnings().is_empty());
}

#[test]
fn unchecked_normalization_never_warns() {
    capture();

    let got = normalize_from_logs_unchecked(&[f64::NEG_INFINITY, f64::NEG_INFINITY]).unwrap();
    assert!(got.iter().all(|w| w.is_nan()));

    assert!(warnings().is_empty());
}
