//! Désassemblage complet d'une fonction
//!
//! Le désassembleur tire les instructions du curseur, écrit l'en-tête de
//! chacune puis ses champs, et sépare les blocs par une ligne vide. Le
//! résultat est tout ou rien : en cas d'erreur, aucun texte n'est produit
//! pour la fonction fautive.

pub mod function;
pub mod sink;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DisConfig;
use crate::cursor::{Boundary, InstructionCursor};
use crate::error::DisResult;
use crate::format::FieldFormatter;
use crate::opcode::OpcodeTable;

pub use function::*;
pub use sink::*;

/// Texte retourné pour une fonction sans flux d'instructions
pub const FOREIGN_PLACEHOLDER: &str = "<foreign function>";

/// Façon dont la fin du code d'une fonction est déterminée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Tout le code de la fonction est décodé
    #[default]
    Length,

    /// Arrêt après la première instruction de retour/sortie
    Terminator,
}

/// Désassembleur lié à une table d'opcodes
#[derive(Debug, Clone, Copy)]
pub struct Disassembler<'t> {
    table: &'t OpcodeTable,
    formatter: FieldFormatter,
    boundary: BoundaryMode,
}

impl<'t> Disassembler<'t> {
    pub fn new(table: &'t OpcodeTable) -> Self {
        Self {
            table,
            formatter: FieldFormatter::new(),
            boundary: BoundaryMode::Length,
        }
    }

    /// Change la détermination de la fin du code
    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn table(&self) -> &'t OpcodeTable {
        self.table
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Curseur sur un tampon de code, selon le mode de fin configuré
    pub fn cursor<'a>(&'a self, code: &'a [u16]) -> InstructionCursor<'a> {
        let boundary = match self.boundary {
            BoundaryMode::Length => Boundary::Length(code.len()),
            BoundaryMode::Terminator => Boundary::Terminator,
        };
        InstructionCursor::new(self.table, code, 0, boundary)
    }

    /// Désassemble une fonction en texte
    pub fn disassemble<F>(&self, function: &F) -> DisResult<String>
    where
        F: FunctionSource + ?Sized,
    {
        if function.is_foreign() {
            debug!("{}: fonction étrangère", function.name());
            return Ok(FOREIGN_PLACEHOLDER.to_string());
        }

        let code = function.code();
        debug!("{}: désassemblage de {} mots", function.name(), code.len());

        self.render(code)
            .inspect_err(|err| warn!("{}: désassemblage impossible: {}", function.name(), err))
    }

    /// Désassemble une fonction et ajoute le texte au tampon fourni
    ///
    /// Le tampon n'est modifié que si le désassemblage réussit.
    pub fn disassemble_into<F, S>(&self, function: &F, sink: &mut S) -> DisResult<()>
    where
        F: FunctionSource + ?Sized,
        S: TextSink + ?Sized,
    {
        let text = self.disassemble(function)?;
        sink.push_text(&text);
        Ok(())
    }

    /// Désassemble plusieurs fonctions indépendantes en parallèle
    ///
    /// Les résultats sont dans l'ordre des fonctions reçues.
    pub fn disassemble_all<F>(&self, functions: &[F]) -> Vec<DisResult<String>>
    where
        F: FunctionSource + Sync,
    {
        functions
            .par_iter()
            .map(|function| self.disassemble(function))
            .collect()
    }

    fn render(&self, code: &[u16]) -> DisResult<String> {
        let mut text = String::new();

        for (index, instruction) in self.cursor(code).enumerate() {
            let instruction = instruction?;
            if index > 0 {
                text.push('\n');
            }
            self.formatter.write_instruction(&mut text, &instruction);
        }

        Ok(text)
    }
}

impl Disassembler<'static> {
    /// Désassembleur sur la table partagée choisie par la configuration
    pub fn from_config(config: &DisConfig) -> DisResult<Self> {
        let table = OpcodeTable::shared(config.decode.schema_version)?;
        Ok(Self::new(table).with_boundary(config.decode.boundary))
    }
}

/// Désassemble une fonction avec la table partagée de la version actuelle
pub fn disassemble<F>(function: &F) -> DisResult<String>
where
    F: FunctionSource + ?Sized,
{
    Disassembler::from_config(&DisConfig::default())?.disassemble(function)
}
