//! CMS detached signatures
//!
//! Produces a DER encoded `SignedData` over an externally computed SHA-256
//! digest, signed with RSA PKCS#1 v1.5 and carrying the full chain.

use super::SigningContext;
use crate::types::*;
use cms::builder::{SignedDataBuilder, SignerInfoBuilder, create_signing_time_attribute};
use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::signed_data::{EncapsulatedContentInfo, SignerIdentifier};
use const_oid::db::rfc5911::ID_DATA;
use const_oid::db::rfc5912::ID_SHA_256;
use der::Encode;
use rsa::pkcs1v15::{Signature, SigningKey};
use sha2::{Digest, Sha256};
use spki::AlgorithmIdentifierOwned;

impl SigningContext {
    /// Sign `data` and return the DER encoded CMS `ContentInfo`
    pub fn sign_detached(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(data);
        let signer = SigningKey::<Sha256>::new(self.private_key().clone());

        let leaf = self.leaf();
        let sid = SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: leaf.tbs_certificate.issuer.clone(),
            serial_number: leaf.tbs_certificate.serial_number.clone(),
        });
        let digest_algorithm = AlgorithmIdentifierOwned {
            oid: ID_SHA_256,
            parameters: None,
        };
        let content = EncapsulatedContentInfo {
            econtent_type: ID_DATA,
            econtent: None,
        };

        let mut signer_info = SignerInfoBuilder::new(
            &signer,
            sid,
            digest_algorithm.clone(),
            &content,
            Some(digest.as_slice()),
        )
        .map_err(signing_error)?;
        signer_info
            .add_signed_attribute(create_signing_time_attribute().map_err(signing_error)?)
            .map_err(signing_error)?;

        let mut builder = SignedDataBuilder::new(&content);
        builder
            .add_digest_algorithm(digest_algorithm)
            .map_err(signing_error)?;
        for cert in self.chain() {
            builder
                .add_certificate(CertificateChoices::Certificate(cert.clone()))
                .map_err(signing_error)?;
        }
        builder
            .add_signer_info::<SigningKey<Sha256>, Signature>(signer_info)
            .map_err(signing_error)?;

        let content_info = builder.build().map_err(signing_error)?;
        content_info
            .to_der()
            .map_err(|e| StampError::Signing(format!("Failed to encode signature: {}", e)))
    }
}

fn signing_error(err: impl std::fmt::Debug) -> StampError {
    StampError::Signing(format!("{:?}", err))
}
