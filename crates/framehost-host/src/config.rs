/// Limits applied by the messaging host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum number of parent hops taken when resolving a source window.
    /// Bounds the walk in cyclic or otherwise malformed hierarchies.
    pub max_ancestry_depth: usize,
    /// Inbound data longer than this is not treated as a protocol message.
    pub max_message_len: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_ancestry_depth: 64,
            max_message_len: 64 * 1024,
        }
    }
}
