//! Registre des opcodes et de leurs schémas de décodage
//!
//! La table est construite une fois par version de schéma puis n'est plus
//! jamais modifiée. Elle est la seule source de vérité sur la forme des
//! instructions.

pub mod names;
pub mod schema;
mod shapes;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{DisError, DisResult};
use shapes::{Arity, Shape, SpecialArms};

pub use schema::*;

/// Identifiant numérique d'un opcode (premier mot de chaque instruction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u16);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version du jeu d'instructions de la VM
///
/// Les deux formes ne sont jamais mélangées : la version est choisie une
/// fois, à l'initialisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Cinq sections : spéciale, compteur, entrées, sorties, sauts
    #[default]
    Current,
    /// Marqueur de ligne puis sept sections dont trois spéciales
    Legacy,
}

impl SchemaVersion {
    fn mnemonics(self) -> &'static [&'static str] {
        match self {
            SchemaVersion::Current => &names::CURRENT_MNEMONICS,
            SchemaVersion::Legacy => &names::LEGACY_MNEMONICS,
        }
    }

    fn shapes(self) -> &'static [(&'static str, Shape)] {
        match self {
            SchemaVersion::Current => &shapes::CURRENT_SHAPES,
            SchemaVersion::Legacy => &shapes::LEGACY_SHAPES,
        }
    }

    fn arms(self) -> SpecialArms {
        match self {
            SchemaVersion::Current => shapes::current_arms(),
            SchemaVersion::Legacy => shapes::legacy_arms(),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Current => write!(f, "current"),
            SchemaVersion::Legacy => write!(f, "legacy"),
        }
    }
}

/// Registre immuable opcode → schéma
#[derive(Debug)]
pub struct OpcodeTable {
    version: SchemaVersion,
    schemas: Vec<InstructionSchema>,
    by_mnemonic: HashMap<&'static str, Opcode>,
}

impl OpcodeTable {
    /// Construit la table d'une version et vérifie sa cohérence
    pub fn new(version: SchemaVersion) -> DisResult<Self> {
        let mnemonics = version.mnemonics();
        let shapes = version.shapes();
        let arms = version.arms();

        check_alignment(version, mnemonics, shapes)?;

        let first = Arc::new(build_section(version, "special_1", mnemonics, arms.first)?);
        let fourth = Arc::new(build_section(version, "special_4", mnemonics, arms.fourth)?);
        let sixth = Arc::new(build_section(version, "special_6", mnemonics, arms.sixth)?);

        let mut schemas = Vec::with_capacity(shapes.len());
        let mut by_mnemonic = HashMap::with_capacity(shapes.len());

        for (index, &(mnemonic, ref shape)) in shapes.iter().enumerate() {
            let opcode = Opcode(index as u16);
            let steps = compile_shape(shape, &first, &fourth, &sixth);
            let schema = InstructionSchema {
                opcode,
                mnemonic,
                class: shape.class,
                steps,
            };
            check_schema(version, &schema)?;
            if by_mnemonic.insert(mnemonic, opcode).is_some() {
                return Err(inconsistent(version, format!("mnémonique dupliqué {mnemonic}")));
            }
            schemas.push(schema);
        }

        debug!(
            "table d'opcodes {} construite: {} opcodes",
            version,
            schemas.len()
        );

        Ok(Self {
            version,
            schemas,
            by_mnemonic,
        })
    }

    /// Table partagée par tout le processus, construite au premier appel
    pub fn shared(version: SchemaVersion) -> DisResult<&'static OpcodeTable> {
        static CURRENT: OnceLock<DisResult<OpcodeTable>> = OnceLock::new();
        static LEGACY: OnceLock<DisResult<OpcodeTable>> = OnceLock::new();

        let cell = match version {
            SchemaVersion::Current => &CURRENT,
            SchemaVersion::Legacy => &LEGACY,
        };
        cell.get_or_init(|| OpcodeTable::new(version))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Nombre d'opcodes enregistrés
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schéma d'un opcode, hors de tout flux (l'erreur ne porte pas d'offset)
    pub fn schema_for(&self, opcode: Opcode) -> DisResult<&InstructionSchema> {
        self.schemas
            .get(opcode.0 as usize)
            .ok_or(DisError::UnknownOpcode {
                opcode: opcode.0,
                offset: None,
            })
    }

    /// Mnémonique d'un opcode, avec vérification des bornes
    pub fn mnemonic(&self, opcode: Opcode) -> DisResult<&'static str> {
        self.schema_for(opcode).map(|schema| schema.mnemonic)
    }

    /// Recherche inverse mnémonique → opcode
    pub fn lookup(&self, mnemonic: &str) -> Option<Opcode> {
        self.by_mnemonic.get(mnemonic).copied()
    }

    /// Vrai si l'opcode appartient à la famille retour/sortie
    pub fn is_terminator(&self, opcode: Opcode) -> bool {
        self.schema_for(opcode)
            .map(|schema| schema.class.contains(OpcodeClass::TERMINATOR))
            .unwrap_or(false)
    }

    /// Itère sur tous les schémas, dans l'ordre des identifiants
    pub fn schemas(&self) -> impl Iterator<Item = &InstructionSchema> {
        self.schemas.iter()
    }
}

fn inconsistent(version: SchemaVersion, reason: String) -> DisError {
    DisError::InconsistentTable { version, reason }
}

/// Mnémoniques et formes : même nombre, même ordre
fn check_alignment(
    version: SchemaVersion,
    mnemonics: &[&str],
    shapes: &[(&str, Shape)],
) -> DisResult<()> {
    if mnemonics.len() != shapes.len() {
        return Err(inconsistent(
            version,
            format!(
                "{} mnémoniques pour {} formes",
                mnemonics.len(),
                shapes.len()
            ),
        ));
    }
    if mnemonics.len() > u16::MAX as usize {
        return Err(inconsistent(version, "trop d'opcodes".to_string()));
    }

    for (index, (name, (shape_name, _))) in mnemonics.iter().zip(shapes).enumerate() {
        if name != shape_name {
            return Err(inconsistent(
                version,
                format!("opcode {index}: mnémonique {name}, forme {shape_name}"),
            ));
        }
    }
    Ok(())
}

fn build_section(
    version: SchemaVersion,
    name: &'static str,
    mnemonics: &[&str],
    arms: Vec<(&'static str, Vec<DecodeStep>)>,
) -> DisResult<DispatchSection> {
    let mut section = DispatchSection::new(name);
    for (mnemonic, steps) in arms {
        let index = mnemonics
            .iter()
            .position(|candidate| *candidate == mnemonic)
            .ok_or_else(|| {
                inconsistent(version, format!("{name}: mnémonique inconnu {mnemonic}"))
            })?;
        section = section.arm(Opcode(index as u16), steps);
    }
    Ok(section)
}

fn push_registers(steps: &mut Vec<DecodeStep>, arity: Arity, direction: Direction) {
    match arity.repeat_count() {
        None => {}
        Some(RepeatCount::Fixed(1)) => steps.push(DecodeStep::RegisterRef(direction, Scope::Local)),
        Some(count) => steps.push(DecodeStep::RepeatedRegisterRef {
            direction,
            scope: Scope::Local,
            count,
        }),
    }
}

fn push_special(steps: &mut Vec<DecodeStep>, words: usize, section: &Arc<DispatchSection>) {
    if words > 0 {
        steps.push(DecodeStep::Dispatch {
            section: Arc::clone(section),
            default_width: words,
        });
    }
}

/// Traduit la forme d'un opcode en liste ordonnée de pas
fn compile_shape(
    shape: &Shape,
    first: &Arc<DispatchSection>,
    fourth: &Arc<DispatchSection>,
    sixth: &Arc<DispatchSection>,
) -> Vec<DecodeStep> {
    let mut steps = Vec::new();

    if shape.line {
        steps.push(DecodeStep::LineMarker);
    }
    push_special(&mut steps, shape.special_1, first);
    if shape.counter {
        steps.push(DecodeStep::Counter(COUNT_LABEL));
    }
    push_registers(&mut steps, shape.inputs, Direction::In);
    push_special(&mut steps, shape.special_4, fourth);
    push_registers(&mut steps, shape.outputs, Direction::Out);
    push_special(&mut steps, shape.special_6, sixth);

    match shape.jumps.repeat_count() {
        None => {}
        Some(RepeatCount::Fixed(1)) => steps.push(DecodeStep::JumpTarget),
        Some(count) => steps.push(DecodeStep::RepeatedJumpTarget(count)),
    }

    steps
}

/// Vérifie les invariants de construction d'un schéma :
/// pas de `Dispatch` imbriqué, bras de largeur fixe égale à la largeur
/// déclarée, et chaque compteur référencé décodé avant son usage.
fn check_schema(version: SchemaVersion, schema: &InstructionSchema) -> DisResult<()> {
    let mut decoded_labels: Vec<&'static str> = Vec::new();

    for step in &schema.steps {
        match step {
            DecodeStep::Dispatch {
                section,
                default_width,
            } => {
                if let Some(arm) = section.resolve(schema.opcode) {
                    if let Some(width) = fixed_width(arm) {
                        if width != *default_width {
                            return Err(inconsistent(
                                version,
                                format!(
                                    "{} ({}): bras de {} mots pour une section de {}",
                                    schema.mnemonic, section.name, width, default_width
                                ),
                            ));
                        }
                    }
                    for inner in arm {
                        check_step(version, schema, inner, &mut decoded_labels)?;
                    }
                }
            }
            other => check_step(version, schema, other, &mut decoded_labels)?,
        }
    }
    Ok(())
}

fn check_step(
    version: SchemaVersion,
    schema: &InstructionSchema,
    step: &DecodeStep,
    decoded_labels: &mut Vec<&'static str>,
) -> DisResult<()> {
    let count = match step {
        DecodeStep::Dispatch { .. } => {
            return Err(inconsistent(
                version,
                format!("{}: section spéciale imbriquée", schema.mnemonic),
            ));
        }
        DecodeStep::RepeatedRegisterRef { count, .. }
        | DecodeStep::RepeatedScalar { count, .. }
        | DecodeStep::RepeatedJumpTarget(count) => Some(*count),
        _ => None,
    };

    if let Some(RepeatCount::Field(label)) = count {
        if !decoded_labels.contains(&label) {
            return Err(inconsistent(
                version,
                format!("{}: compteur {label} utilisé avant d'être lu", schema.mnemonic),
            ));
        }
    }

    // Seuls les compteurs et scalaires simples peuvent fournir un nombre
    if let DecodeStep::Counter(label) | DecodeStep::Scalar(label) = step {
        decoded_labels.push(*label);
    }
    Ok(())
}

/// Largeur d'une liste de pas si elle ne dépend pas des données
fn fixed_width(steps: &[DecodeStep]) -> Option<usize> {
    steps.iter().try_fold(0usize, |acc, step| {
        let width = match step {
            DecodeStep::LineMarker
            | DecodeStep::Scalar(_)
            | DecodeStep::RegisterRef(..)
            | DecodeStep::Counter(_)
            | DecodeStep::JumpTarget => 1,
            DecodeStep::OpaqueSkip(n) => *n,
            DecodeStep::RepeatedRegisterRef {
                count: RepeatCount::Fixed(n),
                ..
            }
            | DecodeStep::RepeatedScalar {
                count: RepeatCount::Fixed(n),
                ..
            }
            | DecodeStep::RepeatedJumpTarget(RepeatCount::Fixed(n)) => *n,
            _ => return None,
        };
        Some(acc + width)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_versions_build() {
        let current = OpcodeTable::new(SchemaVersion::Current).unwrap();
        assert_eq!(current.len(), names::CURRENT_MNEMONICS.len());

        let legacy = OpcodeTable::new(SchemaVersion::Legacy).unwrap();
        assert_eq!(legacy.len(), names::LEGACY_MNEMONICS.len());
    }

    #[test]
    fn test_misaligned_tables_rejected() {
        let mut shapes = shapes::CURRENT_SHAPES.to_vec();
        shapes.swap(2, 3);
        let err = check_alignment(SchemaVersion::Current, &names::CURRENT_MNEMONICS, &shapes)
            .unwrap_err();
        assert!(matches!(err, DisError::InconsistentTable { .. }));

        shapes.pop();
        let err = check_alignment(SchemaVersion::Current, &names::CURRENT_MNEMONICS, &shapes)
            .unwrap_err();
        assert!(err.to_string().contains("60 mnémoniques pour 59 formes"));
    }

    #[test]
    fn test_count_used_before_counter_rejected() {
        let schema = InstructionSchema {
            opcode: Opcode(0),
            mnemonic: "o_broken",
            class: OpcodeClass::empty(),
            steps: vec![
                DecodeStep::RepeatedRegisterRef {
                    direction: Direction::In,
                    scope: Scope::Local,
                    count: RepeatCount::Field(COUNT_LABEL),
                },
                DecodeStep::Counter(COUNT_LABEL),
            ],
        };
        assert!(check_schema(SchemaVersion::Current, &schema).is_err());
    }

    #[test]
    fn test_arm_width_must_match_section() {
        let section = Arc::new(
            DispatchSection::new("special_1")
                .arm(Opcode(0), vec![DecodeStep::Scalar("a:"), DecodeStep::Scalar("b:")]),
        );
        let schema = InstructionSchema {
            opcode: Opcode(0),
            mnemonic: "o_broken",
            class: OpcodeClass::empty(),
            steps: vec![DecodeStep::Dispatch {
                section,
                default_width: 1,
            }],
        };
        assert!(check_schema(SchemaVersion::Current, &schema).is_err());
    }

    #[test]
    fn test_unknown_arm_mnemonic_rejected() {
        let arms = vec![("o_does_not_exist", vec![DecodeStep::Scalar("x:")])];
        assert!(build_section(
            SchemaVersion::Current,
            "special_1",
            &names::CURRENT_MNEMONICS,
            arms
        )
        .is_err());
    }
}
