#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub account_id: String,
    pub display_name: String,
}

impl RemoteUser {
    pub fn new(account_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            display_name: display_name.into(),
        }
    }
}
