/// Convert DER‑encoded data into a PEM block with the provided label, using `\n` line endings.
pub fn der_to_pem(der: &[u8], label: &str) -> Vec<u8> {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
    .into_bytes()
}

/// Convert the first PEM block in `pem_bytes` to DER‑encoded bytes, whatever its label.
pub fn pem_to_der(pem_bytes: &[u8]) -> Result<Vec<u8>, pem::PemError> {
    let pem = pem::parse(pem_bytes)?;
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_round_trip_keeps_label_and_contents() {
        let encoded = der_to_pem(&[1, 2, 3], "CERTIFICATE");
        let text = String::from_utf8(encoded.clone()).unwrap();
        assert!(text.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(!text.contains('\r'));
        assert_eq!(pem_to_der(&encoded).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pem_to_der_rejects_plain_text() {
        assert!(pem_to_der(b"hello").is_err());
    }
}
