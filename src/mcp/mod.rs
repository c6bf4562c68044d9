pub mod session;
pub mod transport;
pub mod types;

pub use session::McpSession;
pub use transport::{McpTransport, StdioTransport, StreamTransport};
pub use types::{McpTool, McpToolResult, ToolContent};
