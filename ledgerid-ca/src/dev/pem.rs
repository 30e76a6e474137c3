use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Wraps `bytes` in a PEM block with 64-column base64 lines.
pub fn armor(label: &str, bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = format!("-----BEGIN {}-----\n", label);
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

/// Extracts the payload of the first `label` PEM block in `text`.
pub fn dearmor(label: &str, text: &str) -> Option<Vec<u8>> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let start = text.find(&begin)? + begin.len();
    let stop = start + text[start..].find(&end)?;
    let body: String = text[start..stop].split_whitespace().collect();

    STANDARD.decode(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_wraps_lines() {
        let pem = armor("CERTIFICATE", &[7u8; 100]);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(pem.lines().all(|l| l.len() <= 64 || l.starts_with("-----")));
        assert_eq!(dearmor("CERTIFICATE", &pem), Some(vec![7u8; 100]));
    }

    #[test]
    fn test_dearmor_wrong_label() {
        let pem = armor("PRIVATE KEY", b"secret");
        assert_eq!(dearmor("CERTIFICATE", &pem), None);
    }
}
