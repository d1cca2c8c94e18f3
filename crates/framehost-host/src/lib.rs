//! Messaging host for untrusted embedded frames.
//!
//! This is the layer that decides whether a message is answered. Inbound
//! messages are decoded, their sentinel is bound to a trusted frame on the
//! host page, and the request is routed to the handler for its kind. Every
//! response goes back to the exact window and origin that asked.

pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod host;
pub mod reply;
pub mod resolver;
pub mod services;
pub mod sim;
pub mod subscriptions;

pub use bootstrap::{PageContext, PendingQueue, ReplayReport};
pub use config::HostConfig;
pub use dispatch::{DispatchTable, Handler, RoutedRequest};
pub use error::{HostError, Result, ServiceError};
pub use handlers::{
    default_dispatch_table, handler_for, CancelFullOverlayHandler, EnterFullOverlayHandler,
    HandlerContext, SendPositionsHandler,
};
pub use host::MessagingHost;
pub use reply::ReplyTo;
pub use resolver::{FrameResolver, Supplied, TrustedFrameSet};
pub use services::{
    position_channel, OverlayCallback, OverlayResult, OverlayService, PositionData,
    PositionReceiver, PositionSender, PositionService,
};
pub use sim::{SimOverlayService, SimPositionService};
pub use subscriptions::SubscriptionRegistry;
