//! Anchor-style event extraction from transaction log lines (spec §4.3.1:
//! "event-authoritative" amounts). Anchor programs emit events via
//! `sol_log_data`, which surfaces in transaction logs as `Program data: `
//! lines base64-encoding an 8-byte event discriminator followed by the
//! borsh-serialized event struct.
use base64::{engine::general_purpose::STANDARD, Engine};

const PROGRAM_DATA_PREFIX: &str = "Program data: ";

/// Returns the decoded payload (discriminator + fields still attached) of
/// every `Program data:` log line, in emission order.
pub fn extract_program_data(log_messages: &[String]) -> Vec<Vec<u8>> {
    log_messages
        .iter()
        .filter_map(|line| line.strip_prefix(PROGRAM_DATA_PREFIX))
        .filter_map(|encoded| STANDARD.decode(encoded).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_program_data_lines_only() {
        let encoded = STANDARD.encode([1, 2, 3, 4]);
        let logs = vec![
            "Program log: instruction: Buy".to_string(),
            format!("Program data: {encoded}"),
            "Program consumed 1200 of 200000 compute units".to_string(),
        ];
        let payloads = extract_program_data(&logs);
        assert_eq!(payloads, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn ignores_malformed_base64() {
        let logs = vec!["Program data: not-base64!!".to_string()];
        assert!(extract_program_data(&logs).is_empty());
    }
}
