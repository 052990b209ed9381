//! Text Scanner Library
//!
//! Upload an image, extract its text with OCR, search it for a keyword with
//! matches highlighted, and download the text as JSON.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `ocr`: OCR providers and the best-effort text extractor
//! - `highlight`: Keyword highlighting
//! - `session`: Per-session state slots
//! - `export`: JSON export
//! - `controller`: Upload/search/export state machine
//! - `routes`, `html`: HTTP surface

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod highlight;
pub mod html;
pub mod imaging;
pub mod ocr;
pub mod routes;
pub mod session;
pub mod state;
