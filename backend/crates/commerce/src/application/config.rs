//! Application Configuration
//!
//! Configuration for the Commerce application layer.

use std::time::Duration;

/// Commerce application configuration
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Description forwarded to the gateway with each payment intent
    pub order_description: String,
    /// Browser destination for an order's detail page; the short id is
    /// appended as a path segment
    pub order_page_url: String,
    /// Browser destination when a callback cannot be tied to an order
    pub failure_url: String,
    /// PAYING orders older than this are failed by housekeeping
    pub stale_order_age: Duration,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            order_description: "Course purchase".to_string(),
            order_page_url: "/orders".to_string(),
            failure_url: "/orders/failed".to_string(),
            stale_order_age: Duration::from_secs(24 * 3600),
        }
    }
}

impl CommerceConfig {
    /// Detail page URL for one order
    pub fn order_url(&self, short_id: i64) -> String {
        format!("{}/{}", self.order_page_url, short_id)
    }
}
