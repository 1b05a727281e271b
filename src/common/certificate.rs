use lazy_static::lazy_static;
use regex::Regex;

use crate::common;

lazy_static! {
    static ref FIELD_PATTERN: Regex = Regex::new(r"^(.*)=:(.*):$").unwrap();
}

/// The certificate and hash tree carried by `ic-certificate` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateBundle {
    pub certificate: Option<Vec<u8>>,
    pub tree: Option<Vec<u8>>,
}

impl CertificateBundle {

    pub fn is_certificate_header(name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(common::HEADER_IC_CERTIFICATE)
    }

    /// Folds one `ic-certificate` header value into the bundle.
    ///
    /// The value is a comma separated list of `name=:base64:` fields. Fields that
    /// do not have that shape, or whose payload is not valid base64, are skipped.
    /// A later `certificate` or `tree` field replaces an earlier one.
    pub fn absorb(&mut self, value: &str) {
        for field in value.split(',') {
            let captures = match FIELD_PATTERN.captures(field.trim()) {
                Some(captures) => captures,
                None => {
                    debug!("Skipping malformed certificate field: {:?}", field);
                    continue;
                }
            };
            let name = captures[1].trim();
            let payload = match base64::decode(captures[2].trim()) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!("Skipping certificate field {} due to {}", name, e);
                    continue;
                }
            };
            match name {
                "certificate" => self.certificate = Some(payload),
                "tree" => self.tree = Some(payload),
                _ => debug!("Ignoring unknown certificate field: {}", name),
            }
        }
    }

    /// Both parts, when both were present.
    pub fn parts(&self) -> Option<(&[u8], &[u8])> {
        match (&self.certificate, &self.tree) {
            (Some(certificate), Some(tree)) => Some((certificate.as_slice(), tree.as_slice())),
            _ => None,
        }
    }
}
