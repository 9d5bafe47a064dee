use unicode_width::UnicodeWidthStr;

/// Rough text metrics for sizing synthesized label boxes (badges, title,
/// repository link). Widths are in pixels at a given font size.
pub struct TextMetrics {
    pub char_width_ratio: f64,
    pub line_height_ratio: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub min_box_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.4,
            padding_x: 8.0,
            padding_y: 4.0,
            min_box_width: 40.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * font_size * self.char_width_ratio
    }

    /// Padded box fitting every line of `text`, rounded up to whole pixels.
    pub fn label_box(&self, text: &str, font_size: f64) -> (f64, f64) {
        let lines: Vec<&str> = text.lines().collect();
        let widest = lines
            .iter()
            .map(|line| self.text_width(line, font_size))
            .fold(0.0, f64::max);
        let line_count = lines.len().max(1) as f64;

        let width = (widest + self.padding_x * 2.0).max(self.min_box_width).ceil();
        let height = (line_count * font_size * self.line_height_ratio + self.padding_y * 2.0).ceil();
        (width, height)
    }
}
