/// Settings for a management channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementOptions {
    pub(crate) node_name: String,
    pub(crate) status_code_key: String,
    pub(crate) status_description_key: String,
    pub(crate) enable_trace: bool,
}

impl Default for ManagementOptions {
    fn default() -> Self {
        ManagementOptions {
            node_name: "$management".to_owned(),
            status_code_key: "statusCode".to_owned(),
            status_description_key: "statusDescription".to_owned(),
            enable_trace: false,
        }
    }
}

impl ManagementOptions {
    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    /// Application property that carries the response status code.
    pub fn with_status_code_key(mut self, key: impl Into<String>) -> Self {
        self.status_code_key = key.into();
        self
    }

    /// Application property that carries the response status description.
    pub fn with_status_description_key(mut self, key: impl Into<String>) -> Self {
        self.status_description_key = key.into();
        self
    }

    pub fn with_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn status_code_key(&self) -> &str {
        &self.status_code_key
    }

    pub fn status_description_key(&self) -> &str {
        &self.status_description_key
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.enable_trace
    }
}
