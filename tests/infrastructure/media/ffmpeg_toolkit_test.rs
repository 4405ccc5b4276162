use std::time::Duration;

use substream::application::ports::MediaToolError;
use substream::infrastructure::media::parse_probe_duration;

#[test]
fn given_reported_seconds_when_parsing_duration_then_fraction_is_kept() {
    assert_eq!(
        parse_probe_duration("723.480000\n").unwrap(),
        Duration::from_millis(723_480)
    );
}

#[test]
fn given_unrepresentable_duration_when_parsing_then_probe_error() {
    for raw in ["1e300", "-1.5", "nan", "inf", "N/A"] {
        let result = parse_probe_duration(raw);
        assert!(
            matches!(result, Err(MediaToolError::Probe(_))),
            "{} should be rejected",
            raw
        );
    }
}
