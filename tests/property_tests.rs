//! Property-based tests for spectral_logger using proptest

use proptest::prelude::*;
use spectral_logger::prelude::*;
use spectral_logger::format_entry;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
    ]
}

fn any_timestamp_format() -> impl Strategy<Value = TimestampFormat> {
    prop_oneof![
        Just(TimestampFormat::Millis),
        Just(TimestampFormat::Seconds),
        Just(TimestampFormat::Iso8601),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that LogLevel ordering matches discriminants
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert_eq!(a < b, (a as u8) < (b as u8));
    }

    /// Test that parsing accepts case-insensitive input
    #[test]
    fn test_log_level_case_insensitive(level in any_level(), lower in any::<bool>()) {
        let input = if lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        prop_assert_eq!(input.parse::<LogLevel>(), Ok(level));
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// The level token can always be recovered from a formatted line
    #[test]
    fn test_level_token_roundtrip(
        level in any_level(),
        message in ".{0,80}",
        format in any_timestamp_format(),
        with_error in any::<bool>(),
    ) {
        let error = with_error.then(|| ErrorDetail::new("Kind", "went wrong"));
        let line = format_entry(level, &message, error, &format);
        prop_assert_eq!(FormattedLine::parse_level(line.as_str()), Some(level));
    }

    /// A message alone never spans more than one line
    #[test]
    fn test_message_stays_on_one_line(message in "[a-z\n\r\t ]{0,60}") {
        let line = format_entry(LogLevel::Info, &message, None, &TimestampFormat::Millis);
        prop_assert_eq!(line.as_str().lines().count(), 1);
    }

    /// The error block adds the exception line plus one line per backtrace line
    #[test]
    fn test_error_block_line_count(frames in prop::collection::vec("[a-z_]{1,12}", 0..6)) {
        let mut detail = ErrorDetail::new("Kind", "msg");
        if !frames.is_empty() {
            detail = detail.with_backtrace_text(frames.join("\n"));
        }
        let line = format_entry(LogLevel::Error, "failed", Some(detail), &TimestampFormat::Millis);
        prop_assert_eq!(line.as_str().lines().count(), 2 + frames.len());
    }
}

// ============================================================================
// Pipeline Ordering
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whatever mix of levels and paths is submitted, the file holds exactly
    /// the enabled entries in submission order
    #[test]
    fn test_file_matches_enabled_submissions(
        threshold in any_level(),
        submissions in prop::collection::vec((any_level(), any::<bool>()), 0..40),
    ) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prop.log");
        let logger = Logger::builder()
            .path(&path)
            .console(false)
            .min_level(threshold)
            .build()
            .unwrap();

        tokio_test::block_on(async {
            for (i, (level, use_async)) in submissions.iter().enumerate() {
                let message = format!("entry-{}", i);
                if *use_async {
                    logger.log_async(*level, message, None).await;
                } else {
                    logger.log(*level, message, None);
                }
            }
            logger.flush().await.unwrap();
        });

        let expected: Vec<String> = submissions
            .iter()
            .enumerate()
            .filter(|(_, (level, _))| *level >= threshold)
            .map(|(i, _)| format!("entry-{}", i))
            .collect();

        let content = std::fs::read_to_string(&path).unwrap();
        let actual: Vec<String> = content
            .lines()
            .map(|l| l.rsplit(' ').next().unwrap().to_string())
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
