pub mod formatter;
pub mod renderer;
pub mod writer;

pub use formatter::format_summary_markdown;
pub use renderer::{render_event, render_summary};
pub use writer::{read_json_report, write_json_report, write_markdown_summary};
