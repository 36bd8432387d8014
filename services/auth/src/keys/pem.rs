use crate::keys::material::KeyError;
use tracing::debug;
use zeroize::Zeroizing;

/// Decode PEM text to DER.
///
/// Files may hold several blocks (openssl writes `EC PARAMETERS` ahead of the
/// key). The block labelled `expected_label` wins; otherwise a block whose
/// label ends with it (`EC PRIVATE KEY` for `PRIVATE KEY`); otherwise the
/// first block, left to the caller's DER parser to accept or reject. The
/// returned buffer is wiped on drop since it may hold private key bytes.
pub fn decode_pem(text: &str, expected_label: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let blocks = ::pem::parse_many(text.trim())
        .map_err(|e| KeyError::MalformedPem(format!("Invalid PEM content: {e}")))?;

    let position = blocks
        .iter()
        .position(|b| b.tag() == expected_label)
        .or_else(|| blocks.iter().position(|b| b.tag().ends_with(expected_label)))
        .unwrap_or(0);
    let block = blocks
        .into_iter()
        .nth(position)
        .ok_or_else(|| KeyError::MalformedPem("no PEM block found".to_string()))?;

    if block.tag() != expected_label {
        debug!(
            expected = %expected_label,
            found = %block.tag(),
            "PEM label differs from expected, accepting block"
        );
    }

    let der = Zeroizing::new(block.into_contents());
    if der.is_empty() {
        return Err(KeyError::MalformedPem(
            "PEM block has no base64 body".to_string(),
        ));
    }

    Ok(der)
}
