#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (String, String)| {
    use safe_instant::SafeInstant;
    if let Ok(dt) = SafeInstant::parse_from_str(&data.0, &data.1, None) {
        let _ = dt.format(&data.0);
    }
});
