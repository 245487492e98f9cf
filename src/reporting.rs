//! # Reporting Module / 报告模块
//!
//! Report rendering: a plain text document for the external diff tool, styled
//! HTML for the structured comparators, and the colored console summary.
//!
//! 报告渲染：外部差异工具使用纯文本文档，结构化比较器使用样式化 HTML，以及彩色控制台摘要。

pub mod console;
pub mod html;
pub mod text;

pub use console::print_summary;
