//! Compiled regex patterns for cell typing and date recognition.

use regex::Regex;

/// Pattern for floating point numbers (various formats).
pub static FLOAT_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\d*\.?\d+)(?:[eE][-+]?\d+)?$").expect("Invalid float pattern")
});

/// Pattern for ISO 8601 dates (YYYY-MM-DD).
pub static DATE_ISO_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").expect("Invalid ISO date pattern")
});

/// Pattern for numeric dates with the year last (MM/DD/YYYY or DD-MM-YY).
/// Day/month order is resolved by `DatePreference`.
pub static DATE_NUMERIC_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2}|\d{4})$").expect("Invalid numeric date pattern")
});

/// Pattern for European-style dates (DD.MM.YYYY).
pub static DATE_EURO_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{2}|\d{4})$").expect("Invalid Euro date pattern")
});

/// Pattern for ISO 8601 datetime (YYYY-MM-DDTHH:MM:SS).
pub static DATETIME_ISO_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})[T ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d+))?)?\s*(Z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("Invalid ISO datetime pattern")
});

/// Pattern for numeric dates followed by a clock time, optionally with AM/PM.
pub static DATETIME_GENERAL_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2})[-/\.](\d{1,2})[-/\.](\d{2}|\d{4})[T ]\s*(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AaPp][Mm]))?$",
    )
    .expect("Invalid general datetime pattern")
});
