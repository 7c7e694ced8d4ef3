//! Time and size formatting shared by the analyzer and the CLI.

/// Extract the last `HH:MM:SS` timestamp that directly follows `prefix` in
/// `text`, as a number of seconds.
///
/// ffmpeg repeats `time=` markers throughout a run; the final occurrence is
/// the authoritative one, so the last match wins. Trailing fractional digits
/// (`00:00:30.12`) are ignored. An empty prefix matches a bare timestamp
/// anywhere in the text.
pub fn time_to_seconds(text: &str, prefix: &str) -> Option<u64> {
    let mut last = None;
    if prefix.is_empty() {
        for (i, _) in text.char_indices() {
            if let Some(seconds) = parse_hms(&text[i..]) {
                last = Some(seconds);
            }
        }
    } else {
        for (i, _) in text.match_indices(prefix) {
            if let Some(seconds) = parse_hms(&text[i + prefix.len()..]) {
                last = Some(seconds);
            }
        }
    }
    last
}

/// Parse a leading `HH:MM:SS` pattern.
fn parse_hms(s: &str) -> Option<u64> {
    let b = s.as_bytes();
    if b.len() < 8 || b[2] != b':' || b[5] != b':' {
        return None;
    }
    let digit = |i: usize| -> Option<u64> {
        if b[i].is_ascii_digit() {
            Some(u64::from(b[i] - b'0'))
        } else {
            None
        }
    };
    let hours = digit(0)? * 10 + digit(1)?;
    let minutes = digit(3)? * 10 + digit(4)?;
    let seconds = digit(6)? * 10 + digit(7)?;
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Format a number of seconds as `HH:MM:SS`.
pub fn format_seconds(seconds: u64) -> String {
    let sec = seconds % 60;
    let min = (seconds / 60) % 60;
    let hour = seconds / 3600;
    format!("{hour:02}:{min:02}:{sec:02}")
}

/// Convert a byte count to a human-readable magnitude string, e.g. `1.5KiB`.
pub fn sizeof_fmt(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];
    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{num:.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_with_prefix() {
        assert_eq!(time_to_seconds("...time=01:02:03...", "time="), Some(3723));
    }

    #[test]
    fn time_last_match_wins() {
        let text = "time=00:00:10 bitrate=... time=00:00:20 speed=1x";
        assert_eq!(time_to_seconds(text, "time="), Some(20));
    }

    #[test]
    fn time_ignores_fractional_part() {
        assert_eq!(
            time_to_seconds("out_time=00:00:30.123456", "out_time="),
            Some(30)
        );
    }

    #[test]
    fn time_missing_pattern() {
        assert_eq!(time_to_seconds("no timestamps here", "time="), None);
        assert_eq!(time_to_seconds("time=1:2:3", "time="), None);
    }

    #[test]
    fn format_seconds_basic() {
        assert_eq!(format_seconds(3723), "01:02:03");
        assert_eq!(format_seconds(0), "00:00:00");
        assert_eq!(format_seconds(59), "00:00:59");
        assert_eq!(format_seconds(3600), "01:00:00");
    }

    #[test]
    fn format_parse_roundtrip() {
        // Spot-check the full day range at uneven strides.
        for s in (0..24 * 3600).step_by(977) {
            assert_eq!(time_to_seconds(&format_seconds(s), ""), Some(s));
        }
        assert_eq!(time_to_seconds(&format_seconds(86399), ""), Some(86399));
    }

    #[test]
    fn sizeof_fmt_cases() {
        assert_eq!(sizeof_fmt(0), "0.0B");
        assert_eq!(sizeof_fmt(1024), "1.0KiB");
        assert_eq!(sizeof_fmt(1536), "1.5KiB");
        assert_eq!(sizeof_fmt(1048576), "1.0MiB");
        assert_eq!(sizeof_fmt(u64::MAX), "16.0EiB");
    }
}
