//! Built-in tools that come with the agent.

mod echo;
mod ecommerce;
pub mod extension_tools;
mod file;
mod help;
mod http;
mod job;
mod json;
mod marketplace;
mod memory;
mod restaurant;
mod shell;
mod search;
mod sneed;
mod taskrabbit;
mod time;

pub use echo::EchoTool;
pub use ecommerce::EcommerceTool;
pub use extension_tools::{
    ToolActivateTool, ToolAuthTool, ToolInstallTool, ToolListTool, ToolRemoveTool, ToolSearchTool,
};
pub use file::{ApplyPatchTool, ListDirTool, ReadFileTool, WriteFileTool};
pub use help::HelpTool;
pub use http::HttpTool;
pub use job::{CancelJobTool, CreateJobTool, JobStatusTool, ListJobsTool};
pub use json::JsonTool;
pub use marketplace::MarketplaceTool;
pub use memory::{MemoryDeleteTool, MemoryReadTool, MemorySearchTool, MemoryTreeTool, MemoryWriteTool};
pub use restaurant::RestaurantTool;
pub use shell::ShellTool;
pub use search::SearchTool;
pub use sneed::SneedTool;
pub use taskrabbit::TaskRabbitTool;
pub use time::TimeTool;
