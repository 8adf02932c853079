use std::path::Path;

use reqwest::Identity;
use tracing::debug;

use crate::client::ApnsError;
use crate::config::CertificateSource;

/// Load the TLS client identity for APNs.
///
/// Files are read as PKCS#12 or PEM depending on their extension; raw bytes
/// are tried as PKCS#12 first and then as a PEM bundle. PEM bundles must
/// hold the certificate and an unencrypted PKCS#8 key, so a passphrase is
/// only accepted for PKCS#12.
pub fn load_identity(source: &CertificateSource, password: &str) -> Result<Identity, ApnsError> {
    match source {
        CertificateSource::File(path) => from_file(path, password),
        CertificateSource::Bytes(bytes) => from_bytes(bytes, password),
    }
}

fn from_file(path: &Path, password: &str) -> Result<Identity, ApnsError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let read = |path: &Path| {
        std::fs::read(path).map_err(|e| {
            ApnsError::Certificate(format!("failed to open certificate file {}: {e}", path.display()))
        })
    };

    debug!(path = %path.display(), "loading APNs certificate");
    match ext.as_str() {
        "p12" => from_pkcs12(&read(path)?, password),
        "pem" => from_pem(&read(path)?, password),
        other => Err(ApnsError::Certificate(format!("unknown extension: {other:?}"))),
    }
}

fn from_bytes(bytes: &[u8], password: &str) -> Result<Identity, ApnsError> {
    from_pkcs12(bytes, password).or_else(|p12_err| {
        from_pem(bytes, password).map_err(|pem_err| {
            ApnsError::Certificate(format!("not PKCS#12 ({p12_err}) nor PEM ({pem_err})"))
        })
    })
}

fn from_pkcs12(der: &[u8], password: &str) -> Result<Identity, ApnsError> {
    Identity::from_pkcs12_der(der, password)
        .map_err(|e| ApnsError::Certificate(format!("invalid PKCS#12 certificate: {e}")))
}

fn from_pem(pem: &[u8], password: &str) -> Result<Identity, ApnsError> {
    if !password.is_empty() {
        return Err(ApnsError::Certificate(
            "PEM certificates with a password are not supported, use PKCS#12 or an unencrypted PKCS#8 key".to_string(),
        ));
    }
    Identity::from_pkcs8_pem(pem, pem)
        .map_err(|e| ApnsError::Certificate(format!("invalid PEM certificate: {e}")))
}
