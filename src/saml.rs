use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// AWS role attribute name inside SAML assertions
const AWS_ROLE_ATTRIBUTE: &str = "https://aws.amazon.com/SAML/Attributes/Role";

/// SAML assertion handed back by the identity provider
#[derive(Debug, Clone)]
pub struct SamlAssertion {
    encoded: String,
    decoded_xml: Vec<u8>,
}

impl SamlAssertion {
    /// Create from Base64-encoded assertion
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = STANDARD
            .decode(encoded)
            .context("Failed to decode SAML assertion from base64")?;
        Ok(Self {
            encoded: encoded.to_string(),
            decoded_xml: decoded,
        })
    }

    /// Base64 form as posted to AWS STS
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Get the raw decoded XML content
    pub fn as_bytes(&self) -> &[u8] {
        &self.decoded_xml
    }

    /// Get attribute values by name (generic attribute extraction)
    pub fn get_attribute_values(&self, attribute_name: &str) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(self.decoded_xml.as_slice());
        reader.config_mut().trim_text(true);

        let mut values = Vec::new();
        let mut in_target_attribute = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"saml2:Attribute" || e.name().as_ref() == b"Attribute"
                    {
                        in_target_attribute = check_attribute_name(e, attribute_name);
                    }
                }
                Ok(Event::Text(e)) if in_target_attribute => {
                    let value = String::from_utf8_lossy(e.as_ref()).to_string();
                    values.push(value);
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"saml2:Attribute" || e.name().as_ref() == b"Attribute"
                    {
                        in_target_attribute = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => bail!("Error parsing SAML assertion: {}", e),
                _ => {}
            }
            buf.clear();
        }

        if values.is_empty() {
            bail!("No values found for attribute: {}", attribute_name);
        }

        Ok(values)
    }

    /// List the role/provider ARN pairs granted by this assertion
    pub fn roles(&self) -> Result<Vec<SamlRole>> {
        let role_values = self.get_attribute_values(AWS_ROLE_ATTRIBUTE)?;
        let roles: Vec<SamlRole> = role_values
            .iter()
            .filter_map(|value| SamlRole::parse_arn_pair(value))
            .collect();

        if roles.is_empty() {
            bail!("No roles found in SAML assertion");
        }

        Ok(roles)
    }

    /// Find the role matching the requested role ARN
    pub fn find_role(&self, role_arn: &str) -> Result<SamlRole> {
        let roles = self.roles()?;
        let available = roles
            .iter()
            .map(|r| r.role_arn.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        roles
            .into_iter()
            .find(|r| r.role_arn == role_arn)
            .with_context(|| {
                format!("Role '{role_arn}' not granted by the identity provider. Available roles: {available}")
            })
    }
}

/// Role and SAML provider ARN pair from an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlRole {
    pub role_arn: String,
    pub principal_arn: String,
}

impl SamlRole {
    /// Parse the comma-separated ARN pair (order is provider-dependent)
    fn parse_arn_pair(arn_pair: &str) -> Option<Self> {
        let parts: Vec<&str> = arn_pair.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return None;
        }

        let (role_arn, principal_arn) = if parts[0].contains(":role/") {
            (parts[0].to_string(), parts[1].to_string())
        } else {
            (parts[1].to_string(), parts[0].to_string())
        };

        Some(SamlRole {
            role_arn,
            principal_arn,
        })
    }
}

/// Check if the attribute element has the specified name
fn check_attribute_name(e: &BytesStart, attribute_name: &str) -> bool {
    e.attributes().filter_map(Result::ok).any(|attr| {
        attr.key.as_ref() == b"Name" && attr.value.as_ref() == attribute_name.as_bytes()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assertion_with_roles(role_values: &[&str]) -> SamlAssertion {
        let attributes = role_values
            .iter()
            .map(|v| format!("<saml2:AttributeValue>{v}</saml2:AttributeValue>"))
            .collect::<String>();
        let xml = format!(
            r#"<saml2:Response><saml2:Assertion><saml2:AttributeStatement>
                <saml2:Attribute Name="https://aws.amazon.com/SAML/Attributes/Role">
                    {attributes}
                </saml2:Attribute>
            </saml2:AttributeStatement></saml2:Assertion></saml2:Response>"#
        );
        let encoded = STANDARD.encode(xml.as_bytes());
        SamlAssertion::from_base64(&encoded).unwrap()
    }

    #[test]
    fn test_from_base64_rejects_invalid_input() {
        let result = SamlAssertion::from_base64("not*valid*base64");
        assert!(result.is_err());
    }

    #[test]
    fn test_encoded_preserves_input() {
        let xml = "<saml2:Response></saml2:Response>";
        let encoded = STANDARD.encode(xml.as_bytes());
        let assertion = SamlAssertion::from_base64(&encoded).unwrap();
        assert_eq!(assertion.encoded(), encoded);
        assert_eq!(assertion.as_bytes(), xml.as_bytes());
    }

    #[test]
    fn test_get_attribute_values() {
        let xml = r#"<saml2:Response><saml2:Assertion><saml2:AttributeStatement>
            <saml2:Attribute Name="test-attribute">
                <saml2:AttributeValue>test-value</saml2:AttributeValue>
            </saml2:Attribute>
        </saml2:AttributeStatement></saml2:Assertion></saml2:Response>"#;

        let encoded = STANDARD.encode(xml.as_bytes());
        let assertion = SamlAssertion::from_base64(&encoded).unwrap();

        let values = assertion.get_attribute_values("test-attribute").unwrap();
        assert_eq!(values, vec!["test-value"]);
    }

    #[test]
    fn test_parse_arn_pair() {
        let arn_pair = "arn:aws:iam::123456789012:role/MyRole,arn:aws:iam::123456789012:saml-provider/MyProvider";
        let role = SamlRole::parse_arn_pair(arn_pair).unwrap();
        assert_eq!(role.role_arn, "arn:aws:iam::123456789012:role/MyRole");
        assert_eq!(
            role.principal_arn,
            "arn:aws:iam::123456789012:saml-provider/MyProvider"
        );
    }

    #[test]
    fn test_parse_arn_pair_reversed() {
        let arn_pair = "arn:aws:iam::123456789012:saml-provider/MyProvider,arn:aws:iam::123456789012:role/AdminRole";
        let role = SamlRole::parse_arn_pair(arn_pair).unwrap();
        assert_eq!(role.role_arn, "arn:aws:iam::123456789012:role/AdminRole");
        assert_eq!(
            role.principal_arn,
            "arn:aws:iam::123456789012:saml-provider/MyProvider"
        );
    }

    #[test]
    fn test_find_role_matches_requested_arn() {
        let assertion = assertion_with_roles(&[
            "arn:aws:iam::123456789012:role/Dev,arn:aws:iam::123456789012:saml-provider/Okta",
            "arn:aws:iam::123456789012:role/Admin,arn:aws:iam::123456789012:saml-provider/Okta",
        ]);

        let role = assertion
            .find_role("arn:aws:iam::123456789012:role/Admin")
            .unwrap();
        assert_eq!(role.role_arn, "arn:aws:iam::123456789012:role/Admin");
        assert_eq!(
            role.principal_arn,
            "arn:aws:iam::123456789012:saml-provider/Okta"
        );
    }

    #[test]
    fn test_find_role_reports_available_roles() {
        let assertion = assertion_with_roles(&[
            "arn:aws:iam::123456789012:role/Dev,arn:aws:iam::123456789012:saml-provider/Okta",
        ]);

        let err = assertion
            .find_role("arn:aws:iam::123456789012:role/Missing")
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("arn:aws:iam::123456789012:role/Missing"));
        assert!(message.contains("arn:aws:iam::123456789012:role/Dev"));
    }

    #[test]
    fn test_roles_rejects_assertion_without_roles() {
        let xml = r#"<saml2:Response><saml2:Assertion><saml2:AttributeStatement>
            <saml2:Attribute Name="unrelated">
                <saml2:AttributeValue>value</saml2:AttributeValue>
            </saml2:Attribute>
        </saml2:AttributeStatement></saml2:Assertion></saml2:Response>"#;
        let encoded = STANDARD.encode(xml.as_bytes());
        let assertion = SamlAssertion::from_base64(&encoded).unwrap();

        assert!(assertion.roles().is_err());
    }
}
