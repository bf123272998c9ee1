//! # mapedit core
//!
//! The editable document model behind the mapedit editor: a [`Document`]
//! owning the engine's map for one session, the [`Layer`] and
//! [`OutputFormat`] views the UI lists, and undoable [`commands`] applied
//! through an [`UndoStack`](undo::UndoStack).
//!
//! ```ignore
//! use mapedit_core::{Document, commands};
//! use mapedit_engine::FileEngine;
//!
//! let mut doc = Document::new(FileEngine::new());
//! doc.load(Path::new("world.map"))?;
//! let mut history = doc.new_undo_stack();
//! history.push(Box::new(commands::map::set_name(&doc, "world")), &mut doc)?;
//! doc.save(Path::new(""))?;
//! history.mark_clean();
//! ```

pub mod commands;
pub mod config;
mod document;
mod error;
pub mod keyvalue;
mod layer;
pub mod ogc;
pub mod output_format;
pub mod undo;

pub use config::{ConfigError, EditorConfig, load_config, load_or_default};
pub use document::Document;
pub use error::{DocError, DocResult};
pub use keyvalue::KeyValues;
pub use layer::{Layer, LayerImport};
pub use ogc::OgcService;
pub use output_format::{FormatState, OutputFormat};
