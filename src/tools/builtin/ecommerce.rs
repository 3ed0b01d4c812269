//! E-commerce tool for shopping and price comparison.

use async_trait::async_trait;

use crate::context::JobContext;
use crate::tools::tool::{Tool, ToolError, ToolOutput};

/// Tool for e-commerce operations (Amazon, price comparison, etc.).
pub struct EcommerceTool {
    // TODO: Add API clients
}

impl EcommerceTool {
    /// Create a new e-commerce tool.
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for EcommerceTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EcommerceTool {
    fn name(&self) -> &str {
        "ecommerce"
    }

    fn description(&self) -> &str {
        "Search products, compare prices, and find deals across e-commerce platforms."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["search", "get_product", "compare_prices", "track_price"],
                    "description": "The e-commerce action to perform"
                },
                "query": {
                    "type": "string",
                    "description": "Search query (for search action)"
                },
                "product_id": {
                    "type": "string",
                    "description": "Product ID or ASIN (for get_product, compare_prices)"
                },
                "platform": {
                    "type": "string",
                    "enum": ["amazon", "ebay", "walmart", "all"],
                    "description": "E-commerce platform to search"
                },
                "max_price": {
                    "type": "number",
                    "description": "Maximum price filter"
                },
                "category": {
                    "type": "string",
                    "description": "Product category filter"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &JobContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let action = params
            .get("action")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::InvalidParameters("missing 'action' parameter".to_string())
            })?;

        // TODO: Implement actual e-commerce API integrations
        let result = match action {
            "search" => {
                let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");

                serde_json::json!({
                    "query": query,
                    "results": [],
                    "message": "E-commerce integration not yet implemented"
                })
            }
            "get_product" => {
                let product_id = params
                    .get("product_id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        ToolError::InvalidParameters("missing 'product_id' parameter".to_string())
                    })?;

                serde_json::json!({
                    "product_id": product_id,
                    "found": false,
                    "message": "E-commerce integration not yet implemented"
                })
            }
            "compare_prices" => {
                serde_json::json!({
                    "prices": [],
                    "message": "E-commerce integration not yet implemented"
                })
            }
            "track_price" => {
                serde_json::json!({
                    "tracking": false,
                    "message": "E-commerce integration not yet implemented"
                })
            }
            _ => {
                return Err(ToolError::InvalidParameters(format!(
                    "unknown action: {}",
                    action
                )));
            }
        };

        Ok(ToolOutput::success(result, start.elapsed()))
    }

    fn requires_sanitization(&self) -> bool {
        true // External e-commerce data
    }
}
