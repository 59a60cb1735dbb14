//! Instructions décodées

use crate::opcode::{Direction, Opcode, OpcodeClass, Scope};

/// Valeur résolue d'un champ d'instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// Scalaire, marqueur de ligne ou compteur
    Integer { label: &'static str, value: u16 },

    /// Référence de registre
    Register {
        direction: Direction,
        scope: Scope,
        slot: u16,
    },

    /// Cible de saut : déplacement brut et offset absolu
    Jump { displacement: i16, target: i64 },
}

/// Champ décodé avec sa position absolue dans le tampon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    pub position: usize,
    pub value: DecodedValue,
}

/// Instruction décodée
///
/// Éphémère : produite par le curseur, consommée par le formateur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub class: OpcodeClass,

    /// Offset du mot d'opcode
    pub offset: usize,

    /// Nombre total de mots consommés, opcode compris
    pub width: usize,

    /// Champs dans l'ordre du tampon (les mots sautés n'y figurent pas)
    pub fields: Vec<DecodedField>,
}

impl Instruction {
    /// Offset de l'instruction suivante
    pub fn next_offset(&self) -> usize {
        self.offset + self.width
    }

    /// Offset du dernier mot de l'instruction
    pub fn end(&self) -> usize {
        self.next_offset() - 1
    }

    pub fn is_terminator(&self) -> bool {
        self.class.contains(OpcodeClass::TERMINATOR)
    }

    /// Cibles de saut absolues, dans l'ordre du tampon
    pub fn jump_targets(&self) -> impl Iterator<Item = i64> + '_ {
        self.fields.iter().filter_map(|field| match field.value {
            DecodedValue::Jump { target, .. } => Some(target),
            _ => None,
        })
    }
}
