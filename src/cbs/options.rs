use super::CbsTokenType;

/// Names used on the wire by the CBS node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbsOptions {
    pub(crate) node_name: String,
    pub(crate) sas_token_type: String,
    pub(crate) status_code_key: String,
    pub(crate) status_description_key: String,
}

impl Default for CbsOptions {
    fn default() -> Self {
        CbsOptions {
            node_name: "$cbs".to_owned(),
            sas_token_type: "servicebus.windows.net:sastoken".to_owned(),
            status_code_key: "status-code".to_owned(),
            status_description_key: "status-description".to_owned(),
        }
    }
}

impl CbsOptions {
    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    /// Operation type sent along with shared access signature tokens.
    pub fn with_sas_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.sas_token_type = token_type.into();
        self
    }

    pub fn with_status_code_key(mut self, key: impl Into<String>) -> Self {
        self.status_code_key = key.into();
        self
    }

    pub fn with_status_description_key(mut self, key: impl Into<String>) -> Self {
        self.status_description_key = key.into();
        self
    }

    pub(crate) fn token_type_name(&self, token_type: CbsTokenType) -> &str {
        match token_type {
            CbsTokenType::Jwt => "jwt",
            CbsTokenType::SasToken => &self.sas_token_type,
        }
    }
}
