//! Format-specific source parsers. Each module implements
//! [`SourceParser`](super::SourceParser) for exactly one input shape; nothing
//! is shared between them beyond the output corpus contract.

pub mod chapter_text;
pub mod markdown;
pub mod plain_lines;
