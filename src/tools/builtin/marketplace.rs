//! NEAR AI Marketplace tool.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::context::JobContext;
use crate::tools::tool::{Tool, ToolError, ToolOutput};

/// Tool for interacting with the NEAR AI marketplace.
pub struct MarketplaceTool {
    // TODO: Add marketplace client
}

impl MarketplaceTool {
    /// Create a new marketplace tool.
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MarketplaceTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MarketplaceTool {
    fn name(&self) -> &str {
        "marketplace"
    }

    fn description(&self) -> &str {
        "Interact with the NEAR AI marketplace: search jobs, submit bids, deliver work."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["search_jobs", "get_job", "submit_bid", "accept_job", "submit_work", "get_status"],
                    "description": "The marketplace action to perform"
                },
                "job_id": {
                    "type": "string",
                    "description": "Job ID (for get_job, submit_bid, accept_job, submit_work)"
                },
                "query": {
                    "type": "string",
                    "description": "Search query (for search_jobs)"
                },
                "category": {
                    "type": "string",
                    "description": "Job category filter (for search_jobs)"
                },
                "bid_amount": {
                    "type": "number",
                    "description": "Bid amount in NEAR (for submit_bid)"
                },
                "work_url": {
                    "type": "string",
                    "description": "URL to submitted work (for submit_work)"
                },
                "work_description": {
                    "type": "string",
                    "description": "Description of completed work (for submit_work)"
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

        // TODO: Implement actual marketplace integration
        let result = match action {
            "search_jobs" => {
                // Placeholder response
                serde_json::json!({
                    "jobs": [],
                    "total": 0,
                    "message": "Marketplace integration not yet implemented"
                })
            }
            "get_job" => {
                let job_id = params
                    .get("job_id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        ToolError::InvalidParameters("missing 'job_id' parameter".to_string())
                    })?;

                serde_json::json!({
                    "job_id": job_id,
                    "status": "not_found",
                    "message": "Marketplace integration not yet implemented"
                })
            }
            "submit_bid" => {
                serde_json::json!({
                    "success": false,
                    "message": "Marketplace integration not yet implemented"
                })
            }
            "accept_job" => {
                serde_json::json!({
                    "success": false,
                    "message": "Marketplace integration not yet implemented"
                })
            }
            "submit_work" => {
                serde_json::json!({
                    "success": false,
                    "message": "Marketplace integration not yet implemented"
                })
            }
            "get_status" => {
                serde_json::json!({
                    "connected": false,
                    "message": "Marketplace integration not yet implemented"
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

    fn estimated_cost(&self, params: &serde_json::Value) -> Option<Decimal> {
        // Bidding has a cost
        if params.get("action").and_then(|v| v.as_str()) == Some("submit_bid") {
            Some(Decimal::new(1, 2)) // 0.01 NEAR gas cost
        } else {
            None
        }
    }

    fn requires_sanitization(&self) -> bool {
        true // External marketplace data
    }
}
