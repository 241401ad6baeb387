#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use safe_instant::SafeInstant;
    if let Ok(data) = std::str::from_utf8(data) {
        if let Ok(dt) = SafeInstant::new(data, None) {
            let _ = dt.modify(data);
        }
        if let Ok(base) = SafeInstant::new("2000-01-01 00:00:00", None) {
            let _ = base.modify(data);
        }
        let _ = safe_instant::Interval::parse(data);
    }
});
