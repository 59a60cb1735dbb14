//! Erreurs du moteur de désassemblage

use crate::opcode::SchemaVersion;
use thiserror::Error;

/// Erreurs pouvant survenir pendant le décodage d'un flux d'instructions
///
/// Toutes ces erreurs sont fatales pour la requête en cours : aucune sortie
/// partielle n'est produite pour la fonction fautive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisError {
    /// Le premier mot d'une instruction ne correspond à aucun schéma
    ///
    /// `offset` n'est connu que pendant le décodage d'un flux ; une simple
    /// consultation de la table le laisse à `None`.
    #[error("opcode inconnu {opcode}{}", at_offset(.offset))]
    UnknownOpcode { opcode: u16, offset: Option<usize> },

    /// Une étape de décodage lirait au-delà de la limite déclarée
    #[error(
        "dépassement du tampon: l'instruction à l'offset {offset} lit le mot {position} (limite {limit})"
    )]
    BufferOverrun {
        offset: usize,
        position: usize,
        limit: usize,
    },

    /// Table des mnémoniques et table des schémas désalignées
    #[error("table d'opcodes incohérente ({version}): {reason}")]
    InconsistentTable {
        version: SchemaVersion,
        reason: String,
    },

    /// Un pas répété référence un compteur qui n'a pas été décodé
    #[error("compteur '{label}' introuvable pour l'opcode {opcode}")]
    MissingCount { opcode: u16, label: &'static str },
}

fn at_offset(offset: &Option<usize>) -> String {
    offset
        .map(|offset| format!(" à l'offset {offset}"))
        .unwrap_or_default()
}

pub type DisResult<T> = std::result::Result<T, DisError>;
