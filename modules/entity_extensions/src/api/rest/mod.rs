//! Request-boundary API layer
//!
//! Adapters a host calls around its own handlers, plus the declaration DTOs
//! and Problem mapping.

pub mod context;
pub mod declarations;
pub mod dto;
pub mod error;
pub mod inbound;
pub mod mapper;
pub mod outbound;
pub mod post_write;

pub use context::StashedExtensionData;
pub use error::{map_domain_error, Problem};
pub use inbound::InboundAdapter;
pub use outbound::OutboundAdapter;
pub use post_write::PostWriteAdapter;

use crate::contract::ExtensionsApi;
use std::sync::Arc;

/// The three request-boundary adapters sharing one client
#[derive(Clone)]
pub struct Adapters {
    pub inbound: InboundAdapter,
    pub post_write: PostWriteAdapter,
    pub outbound: OutboundAdapter,
}

impl Adapters {
    pub fn new(api: Arc<dyn ExtensionsApi>) -> Self {
        Self {
            inbound: InboundAdapter::new(api.clone()),
            post_write: PostWriteAdapter::new(api.clone()),
            outbound: OutboundAdapter::new(api),
        }
    }
}
