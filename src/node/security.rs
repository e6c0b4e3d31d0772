//! Security scheme node

use serde::{Deserialize, Serialize};

use crate::node::{impl_component, NodeToken};
use crate::objects::OAuthFlows;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
}

/// Security scheme object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "refName", default, skip_serializing)]
    pub ref_name: Option<String>,
    #[serde(skip)]
    token: NodeToken,

    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
}

impl_component!(SecurityScheme, SecurityScheme);

impl SecurityScheme {
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            ref_name: None,
            token: NodeToken::next(),
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
        }
    }

    /// HTTP bearer scheme registered under `name`
    pub fn bearer(name: impl Into<String>, bearer_format: Option<String>) -> Self {
        let mut scheme = Self::new(SecuritySchemeType::Http);
        scheme.ref_name = Some(name.into());
        scheme.scheme = Some("bearer".to_string());
        scheme.bearer_format = bearer_format;
        scheme
    }
}
