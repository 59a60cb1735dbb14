//! Dis Rust - Désassembleur de flux d'instructions
//!
//! Cette bibliothèque décode le code compilé d'une fonction (une suite de
//! mots de 16 bits formant des instructions de longueur variable) et le
//! restitue sous forme de texte lisible et déterministe.

pub mod opcode;
pub mod cursor;
pub mod format;
pub mod disasm;
pub mod config;
pub mod error;

pub use opcode::*;
pub use cursor::*;
pub use format::*;
pub use disasm::*;
pub use config::*;
pub use error::*;

/// Version du désassembleur
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
