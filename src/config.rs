/// Store tuning. Everything has a usable default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Prefix for the store's log lines.
    pub label: String,
    /// Mailbox length above which a drain logs a warning. Deep mailboxes
    /// usually mean an effect chain feeding itself.
    pub mailbox_warn_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: "store".to_owned(),
            mailbox_warn_depth: 1024,
        }
    }
}

impl StoreConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_mailbox_warn_depth(mut self, depth: usize) -> Self {
        self.mailbox_warn_depth = depth;
        self
    }
}
