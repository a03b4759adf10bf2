//! Stderr noise filter for the detector runtime.
//!
//! The detector is a scapy-based Python program that writes well-known
//! warnings to stderr during normal operation. Lines matching any of
//! these substrings are suppressed; everything else on stderr is logged
//! as an error. This is a noise filter, not an error classifier: process
//! exit reporting happens in the exit watcher and is never filtered here.

/// Known-benign stderr substrings from the detector's own runtime.
pub const STDERR_NOISE: &[&str] = &[
    "Mac address to reach destination not found. Using broadcast",
    "CryptographyDeprecationWarning",
    "Wireshark is installed, but cannot read manuf",
    "No libpcap provider available",
];

/// Whether a stderr line matches the fixed ignore-list.
pub fn is_benign_stderr(line: &str) -> bool {
    STDERR_NOISE.iter().any(|noise| line.contains(noise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_noise_line_suppressed() {
        assert!(is_benign_stderr(
            "WARNING: Mac address to reach destination not found. Using broadcast."
        ));
        assert!(is_benign_stderr(
            "/usr/lib/python3/dist-packages/scapy/crypto.py:14: CryptographyDeprecationWarning: int_from_bytes is deprecated"
        ));
    }

    #[test]
    fn real_errors_pass_through() {
        assert!(!is_benign_stderr(
            "Traceback (most recent call last):"
        ));
        assert!(!is_benign_stderr("PermissionError: [Errno 1] Operation not permitted"));
    }

    proptest! {
        // The ignore-list entries all carry uppercase letters, so no
        // lowercase-only line can ever be swallowed.
        #[test]
        fn lowercase_lines_never_suppressed(line in "[a-z0-9 :.,]{0,120}") {
            prop_assert!(!is_benign_stderr(&line));
        }

        #[test]
        fn embedding_noise_suppresses(prefix in "[a-z ]{0,40}", idx in 0..STDERR_NOISE.len()) {
            let line = format!("{}{}", prefix, STDERR_NOISE[idx]);
            prop_assert!(is_benign_stderr(&line));
        }
    }
}
