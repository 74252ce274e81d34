//! Rendering options configuration.

/// Output format for a rendered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned plain-text columns
    #[default]
    Text,
    /// Markdown pipe table
    Markdown,
    /// HTML table
    Html,
    /// JSON
    Json,
}

/// JSON output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Options for rendering views.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output format
    pub format: OutputFormat,

    /// JSON layout when `format` is [`OutputFormat::Json`]
    pub json_format: JsonFormat,

    /// Show at most this many data rows (None = all)
    pub max_rows: Option<usize>,

    /// Truncate text cells to this display width (None = no limit)
    pub max_cell_width: Option<usize>,

    /// Escape special Markdown characters in cells
    pub escape_special_chars: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            json_format: JsonFormat::Pretty,
            max_rows: None,
            max_cell_width: None,
            escape_special_chars: true,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, json_format: JsonFormat) -> Self {
        self.json_format = json_format;
        self
    }

    /// Limit the number of data rows shown.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Limit the display width of text cells. Zero is treated as 1.
    pub fn with_max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width.max(1));
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escape_special_chars(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RenderOptions::default();
        assert_eq!(opts.format, OutputFormat::Text);
        assert!(opts.max_rows.is_none());
        assert!(opts.escape_special_chars);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = RenderOptions::new()
            .with_format(OutputFormat::Json)
            .with_json_format(JsonFormat::Compact)
            .with_max_rows(10)
            .with_max_cell_width(0);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.json_format, JsonFormat::Compact);
        assert_eq!(opts.max_rows, Some(10));
        assert_eq!(opts.max_cell_width, Some(1));
    }
}
