// Path: crates/cli/src/local/staking.rs

//! Staking identities: a PEM key and certificate pair plus the node id derived
//! from the certificate.

use anyhow::{anyhow, Result};
use netrunner_types::NodeId;
use rcgen::{CertificateParams, KeyPair};

/// The subject name written into generated staking certificates.
const GENERATED_CERT_SUBJECT: &str = "netrunner-node";

/// A validated staking key and certificate.
#[derive(Clone)]
pub struct StakingIdentity {
    pub key_pem: String,
    pub cert_pem: String,
    pub node_id: NodeId,
}

impl StakingIdentity {
    /// Generates a fresh self-signed staking certificate and its private key.
    pub fn generate() -> Result<Self> {
        let params = CertificateParams::new(vec![GENERATED_CERT_SUBJECT.to_string()])?;
        let key_pair = KeyPair::generate()?;
        let cert = params.self_signed(&key_pair)?;
        Ok(Self {
            node_id: NodeId::from_cert_der(cert.der()),
            key_pem: key_pair.serialize_pem(),
            cert_pem: cert.pem(),
        })
    }

    /// Parses a PEM key and certificate and checks that they belong together.
    ///
    /// The certificate must embed the public key of the private key, which is
    /// checked by locating the key's SubjectPublicKeyInfo in the certificate.
    pub fn from_pem(key_pem: &str, cert_pem: &str) -> Result<Self> {
        let cert_der = rustls_pemfile::certs(&mut cert_pem.as_bytes())
            .next()
            .ok_or_else(|| anyhow!("no certificate found in staking certificate PEM"))?
            .map_err(|e| anyhow!("malformed staking certificate PEM: {}", e))?;
        let key_pair = KeyPair::from_pem(key_pem)
            .map_err(|e| anyhow!("malformed staking key PEM: {}", e))?;

        let spki = key_pair.public_key_der();
        if spki.is_empty() || !cert_der.windows(spki.len()).any(|w| w == spki.as_slice()) {
            return Err(anyhow!("staking key does not match staking certificate"));
        }

        Ok(Self {
            node_id: NodeId::from_cert_der(&cert_der),
            key_pem: key_pem.to_string(),
            cert_pem: cert_pem.to_string(),
        })
    }
}

impl std::fmt::Debug for StakingIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StakingIdentity")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}
