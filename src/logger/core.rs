//! Filtering decision for a single log call, shared by every `logger::*`
//! level function before it reaches `format::format_and_log`.

use super::config::{get_logger_config, is_debug_enabled_for_tag, is_verbose_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Errors bypass every other rule. Debug/Verbose need an explicit
/// per-tag flag even under a permissive `min_level`; everything else just
/// checks the level threshold and, if set, the `enabled_tags` allowlist.
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();
    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => return is_debug_enabled_for_tag(tag),
        LogLevel::Verbose => return config.min_level == LogLevel::Verbose || is_verbose_enabled_for_tag(tag),
        _ => {}
    }

    config.enabled_tags.is_empty() || config.enabled_tags.contains(&tag.to_debug_key())
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if should_log(&tag, level) {
        super::format::format_and_log(tag, level.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_always_log_under_the_default_config() {
        assert!(should_log(&LogTag::Feed, LogLevel::Error));
    }

    #[test]
    fn debug_is_off_by_default_without_a_tag_flag() {
        assert!(!should_log(&LogTag::Rpc, LogLevel::Debug));
    }
}
