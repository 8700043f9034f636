//! Markdown 预览页面

pub mod markdown;

pub const PREVIEW_FILE: &str = "preview.html";

pub const PREVIEW_STYLE: &str = r#"<style>body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 20px auto; padding: 0 15px; color: #333;} code { background-color: #f0f0f0; padding: 2px 4px; border-radius: 3px; font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, Courier, monospace;} pre { background-color: #f6f8fa; padding: 16px; border-radius: 5px; overflow-x: auto;} pre code { padding: 0; background-color: transparent; } table { border-collapse: collapse; } th, td { border: 1px solid #ddd; padding: 8px; }</style>"#;

/// 完整的 HTML 文档：样式表 + 渲染后的正文
pub fn render_page(title: &str, source: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{PREVIEW_STYLE}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        markdown::escape(title),
        markdown::to_html(source),
    )
}
