//! Schémas de décodage des instructions
//!
//! Un schéma est la liste ordonnée des pas de décodage qui décrivent la
//! disposition complète des opérandes d'un opcode.

use bitflags::bitflags;
use std::collections::HashMap;
use std::sync::Arc;

use super::Opcode;

/// Sens d'accès à un registre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Registre lu par l'instruction
    In,
    /// Registre écrit par l'instruction
    Out,
}

/// Portée d'un registre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Global,
    /// Variable capturée par une fermeture englobante
    Upvalue,
}

/// Source du nombre de répétitions d'un pas répété
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCount {
    /// Nombre fixé dans le schéma
    Fixed(usize),

    /// Valeur d'un `Counter` ou `Scalar` décodé plus tôt dans la même
    /// instruction, désigné par son label
    Field(&'static str),
}

/// Pas de décodage élémentaire
#[derive(Debug, Clone)]
pub enum DecodeStep {
    /// Numéro de ligne source (un mot)
    LineMarker,

    /// Valeur entière littérale (un mot)
    Scalar(&'static str),

    /// Référence de registre (un mot)
    RegisterRef(Direction, Scope),

    /// Suite de références de registre
    RepeatedRegisterRef {
        direction: Direction,
        scope: Scope,
        count: RepeatCount,
    },

    /// Suite de valeurs littérales portant le même label
    RepeatedScalar {
        label: &'static str,
        count: RepeatCount,
    },

    /// Valeur consommée comme nombre de répétitions d'un pas ultérieur
    Counter(&'static str),

    /// Déplacement signé relatif au début de l'instruction
    JumpTarget,

    /// Suite de cibles de saut
    RepeatedJumpTarget(RepeatCount),

    /// Mots réservés, consommés sans sortie
    OpaqueSkip(usize),

    /// Section dont la forme dépend de l'opcode décodé
    Dispatch {
        section: Arc<DispatchSection>,
        default_width: usize,
    },
}

impl DecodeStep {
    /// Label du champ produit par ce pas, s'il en a un
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DecodeStep::LineMarker => Some(LINE_LABEL),
            DecodeStep::Scalar(label) | DecodeStep::Counter(label) => Some(*label),
            DecodeStep::RepeatedScalar { label, .. } => Some(*label),
            _ => None,
        }
    }
}

/// Label des marqueurs de ligne
pub const LINE_LABEL: &str = "line:";

/// Label des compteurs standards
pub const COUNT_LABEL: &str = "count:";

/// Table de résolution d'une section « spéciale »
///
/// Partagée par tous les schémas d'une même version ; chaque opcode qui
/// connaît la forme de sa section y possède une entrée.
#[derive(Debug, Default)]
pub struct DispatchSection {
    /// Nom de la section, pour le journal
    pub name: &'static str,
    arms: HashMap<Opcode, Vec<DecodeStep>>,
}

impl DispatchSection {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            arms: HashMap::new(),
        }
    }

    /// Enregistre la forme de la section pour un opcode
    pub fn arm(mut self, opcode: Opcode, steps: Vec<DecodeStep>) -> Self {
        self.arms.insert(opcode, steps);
        self
    }

    /// Résout la section pour l'opcode décodé
    pub fn resolve(&self, opcode: Opcode) -> Option<&[DecodeStep]> {
        self.arms.get(&opcode).map(Vec::as_slice)
    }
}

bitflags! {
    /// Classes d'opcodes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OpcodeClass: u8 {
        /// Famille retour/sortie de la VM : termine une routine
        const TERMINATOR = 1 << 0;

        /// Porte au moins une cible de saut
        const BRANCH = 1 << 1;

        /// Appel de fonction
        const CALL = 1 << 2;
    }
}

/// Disposition complète des opérandes d'un opcode
#[derive(Debug, Clone)]
pub struct InstructionSchema {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub class: OpcodeClass,
    pub steps: Vec<DecodeStep>,
}

impl InstructionSchema {
    /// Vrai si l'instruction n'a aucun opérande (largeur 1)
    pub fn is_bare(&self) -> bool {
        self.steps.is_empty()
    }
}
