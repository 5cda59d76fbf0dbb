//! Text and HTML extraction used by the scanner.

pub mod html;
pub mod text;
