//! Trusted messaging host for embedded frames.
//!
//! framehost answers requests from untrusted embedded frames (ads, widgets)
//! that share one cross-window message channel with their host page. A
//! request is served only when its sentinel resolves to a frame the page
//! trusts, and every answer goes back to the window and origin that asked.
//!
//! # Crate Structure
//!
//! - [`window`]: window hierarchy and frame element abstraction, plus a simulated window tree
//! - [`codec`]: `amp-` prefixed JSON envelopes and the closed set of message kinds
//! - [`host`]: resolver, dispatch table, handlers, services and the page bootstrap

/// Re-export window types.
pub mod window {
    pub use framehost_window::*;
}

/// Re-export codec types.
pub mod codec {
    pub use framehost_codec::*;
}

/// Re-export host types.
pub mod host {
    pub use framehost_host::*;
}
