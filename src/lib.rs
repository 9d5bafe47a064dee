pub mod board;
pub mod build;
pub mod cell;
pub mod color;
pub mod document;
pub mod drawio;
pub mod field;
pub mod ids;
pub mod measure;
pub mod options;
pub mod style;
pub mod transform;
pub mod viewer;

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use board::{Board, BoardError};
use document::Document;
use drawio::DrawioWriter;
use options::{ConversionOptions, OptionsError};
use transform::Transformer;

pub use viewer::viewer_url;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Convert a board to draw.io markup, stamped with the current time.
pub fn transform(board: &Board, options: &ConversionOptions) -> String {
    transform_at(board, options, Utc::now())
}

/// Convert a board with an explicit modification time. Output is fully
/// determined by the arguments.
pub fn transform_at(board: &Board, options: &ConversionOptions, modified: DateTime<Utc>) -> String {
    let graph = Transformer::new(options).run(board);
    let doc = Document::assemble(graph, options, modified);
    DrawioWriter.render(&doc)
}

/// String-in, string-out conversion. `options_json` may be omitted for the
/// defaults.
pub fn board_to_drawio(board_json: &str, options_json: Option<&str>) -> Result<String, ConvertError> {
    let board = Board::from_json(board_json)?;
    let options = match options_json {
        Some(json) if !json.trim().is_empty() => ConversionOptions::from_json(json)?,
        _ => ConversionOptions::default(),
    };
    Ok(transform(&board, &options))
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert board JSON to draw.io XML
#[wasm_bindgen(js_name = "boardToDrawio")]
pub fn board_to_drawio_js(board: &str, options: Option<String>) -> Result<String, String> {
    board_to_drawio(board, options.as_deref()).map_err(|e| e.to_string())
}

/// Convert board JSON and return a viewer link instead of the markup
#[wasm_bindgen(js_name = "boardToDrawioViewerUrl")]
pub fn board_to_viewer_url_js(board: &str, options: Option<String>) -> Result<String, String> {
    board_to_drawio(board, options.as_deref())
        .map(|xml| viewer_url(&xml))
        .map_err(|e| e.to_string())
}
