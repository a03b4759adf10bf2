//! Spoofed-MAC extraction from the detector's free-text description.
//!
//! The detector embeds both addresses in one line:
//! `[Expected MAC] aa:bb:cc:dd:ee:01  |  [Spoofed MAC] aa:bb:cc:dd:ee:02`.
//! The spoofed address is recovered by locating the label substring.
//! Inherited convention from the report producer; the label must stay
//! byte-for-byte identical to what the detector prints. A structured
//! field would be better, but changing it requires changing the producer.

/// Label the detector prints in front of the spoofed address.
pub const SPOOFED_MAC_LABEL: &str = "[Spoofed MAC]";

/// Extract the spoofed MAC following the label, if present.
pub fn spoofed_mac(description: &str) -> Option<&str> {
    let idx = description.find(SPOOFED_MAC_LABEL)?;
    let rest = description[idx + SPOOFED_MAC_LABEL.len()..].trim_start();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let mac = &rest[..end];
    (!mac.is_empty()).then_some(mac)
}
