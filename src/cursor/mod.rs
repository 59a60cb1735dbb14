//! Parcours d'un flux de mots instruction par instruction
//!
//! La largeur d'une instruction n'est ni fixe ni préfixée : elle découle du
//! schéma de l'opcode, et certains nombres d'opérandes sont lus dans le flux
//! lui-même. Le décodage d'une instruction est une fonction pure de
//! `(tampon, offset)` ; le curseur se contente d'enchaîner ces appels.

pub mod instruction;

use log::trace;
use std::iter::FusedIterator;

use crate::error::{DisError, DisResult};
use crate::opcode::{DecodeStep, Opcode, OpcodeTable, RepeatCount};

pub use instruction::*;

/// Fin déclarée du code d'une fonction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Nombre de mots de code à partir de l'offset de départ
    Length(usize),

    /// S'arrête après la première instruction de la famille retour/sortie,
    /// ou à la fin du tampon
    Terminator,
}

/// Lecteur de mots borné, propre à une instruction
struct WordReader<'a> {
    buffer: &'a [u16],
    start: usize,
    pos: usize,
    limit: usize,
}

impl<'a> WordReader<'a> {
    fn overrun(&self, position: usize) -> DisError {
        DisError::BufferOverrun {
            offset: self.start,
            position,
            limit: self.limit,
        }
    }

    /// Lit le mot courant et retourne sa position
    fn read(&mut self) -> DisResult<(usize, u16)> {
        if self.pos >= self.limit {
            return Err(self.overrun(self.pos));
        }
        let position = self.pos;
        self.pos += 1;
        Ok((position, self.buffer[position]))
    }

    fn skip(&mut self, words: usize) -> DisResult<()> {
        let end = self.pos.saturating_add(words);
        if end > self.limit {
            return Err(self.overrun(self.limit));
        }
        self.pos = end;
        Ok(())
    }
}

/// Décode l'instruction qui commence à `offset`
///
/// Aucun mot au-delà de `limit` (ni de la fin du tampon) n'est lu.
pub fn decode_at(
    table: &OpcodeTable,
    buffer: &[u16],
    offset: usize,
    limit: usize,
) -> DisResult<Instruction> {
    let mut reader = WordReader {
        buffer,
        start: offset,
        pos: offset,
        limit: limit.min(buffer.len()),
    };

    let (_, word) = reader.read()?;
    let opcode = Opcode(word);
    let schema = table
        .schema_for(opcode)
        .map_err(|_| DisError::UnknownOpcode {
            opcode: word,
            offset: Some(offset),
        })?;

    let mut fields = Vec::new();
    for step in &schema.steps {
        apply_step(step, opcode, &mut reader, &mut fields)?;
    }

    let width = reader.pos - offset;
    trace!("[{}] {} ({} mots)", offset, schema.mnemonic, width);

    Ok(Instruction {
        opcode,
        mnemonic: schema.mnemonic,
        class: schema.class,
        offset,
        width,
        fields,
    })
}

fn resolve_count(
    count: RepeatCount,
    opcode: Opcode,
    fields: &[DecodedField],
) -> DisResult<usize> {
    match count {
        RepeatCount::Fixed(n) => Ok(n),
        RepeatCount::Field(label) => fields
            .iter()
            .rev()
            .find_map(|field| match field.value {
                DecodedValue::Integer { label: l, value } if l == label => Some(value as usize),
                _ => None,
            })
            .ok_or(DisError::MissingCount {
                opcode: opcode.0,
                label,
            }),
    }
}

fn read_jump(reader: &mut WordReader<'_>) -> DisResult<DecodedField> {
    let (position, word) = reader.read()?;
    let displacement = word as i16;
    Ok(DecodedField {
        position,
        value: DecodedValue::Jump {
            displacement,
            target: reader.start as i64 + displacement as i64,
        },
    })
}

fn apply_step(
    step: &DecodeStep,
    opcode: Opcode,
    reader: &mut WordReader<'_>,
    fields: &mut Vec<DecodedField>,
) -> DisResult<()> {
    match step {
        DecodeStep::LineMarker | DecodeStep::Scalar(_) | DecodeStep::Counter(_) => {
            let (position, value) = reader.read()?;
            let label = step.label().unwrap_or_default();
            fields.push(DecodedField {
                position,
                value: DecodedValue::Integer { label, value },
            });
        }
        DecodeStep::RegisterRef(direction, scope) => {
            let (position, slot) = reader.read()?;
            fields.push(DecodedField {
                position,
                value: DecodedValue::Register {
                    direction: *direction,
                    scope: *scope,
                    slot,
                },
            });
        }
        DecodeStep::RepeatedRegisterRef {
            direction,
            scope,
            count,
        } => {
            let count = resolve_count(*count, opcode, fields)?;
            for _ in 0..count {
                let (position, slot) = reader.read()?;
                fields.push(DecodedField {
                    position,
                    value: DecodedValue::Register {
                        direction: *direction,
                        scope: *scope,
                        slot,
                    },
                });
            }
        }
        DecodeStep::RepeatedScalar { label, count } => {
            let count = resolve_count(*count, opcode, fields)?;
            for _ in 0..count {
                let (position, value) = reader.read()?;
                fields.push(DecodedField {
                    position,
                    value: DecodedValue::Integer {
                        label: *label,
                        value,
                    },
                });
            }
        }
        DecodeStep::JumpTarget => {
            let field = read_jump(reader)?;
            fields.push(field);
        }
        DecodeStep::RepeatedJumpTarget(count) => {
            let count = resolve_count(*count, opcode, fields)?;
            for _ in 0..count {
                let field = read_jump(reader)?;
                fields.push(field);
            }
        }
        DecodeStep::OpaqueSkip(words) => reader.skip(*words)?,
        DecodeStep::Dispatch {
            section,
            default_width,
        } => match section.resolve(opcode) {
            Some(arm) => {
                for inner in arm {
                    apply_step(inner, opcode, reader, fields)?;
                }
            }
            None => {
                trace!(
                    "{}: opcode {} sans forme connue, {} mot(s) sauté(s)",
                    section.name,
                    opcode,
                    default_width
                );
                reader.skip(*default_width)?;
            }
        },
    }
    Ok(())
}

/// Curseur sur le code d'une fonction
///
/// Séquence paresseuse, finie et non redémarrable. Pour reprendre à un offset
/// donné, il suffit de créer un nouveau curseur : le décodage est pur.
/// Après une erreur, le curseur ne produit plus rien.
#[derive(Debug)]
pub struct InstructionCursor<'a> {
    table: &'a OpcodeTable,
    buffer: &'a [u16],
    offset: usize,
    limit: usize,
    stop_at_terminator: bool,
    done: bool,
}

impl<'a> InstructionCursor<'a> {
    /// Crée un curseur à partir de `start`
    pub fn new(table: &'a OpcodeTable, buffer: &'a [u16], start: usize, boundary: Boundary) -> Self {
        let (limit, stop_at_terminator) = match boundary {
            Boundary::Length(length) => (start.saturating_add(length), false),
            Boundary::Terminator => (buffer.len(), true),
        };
        Self {
            table,
            buffer,
            offset: start,
            limit,
            stop_at_terminator,
            done: false,
        }
    }

    /// Curseur sur tout le tampon
    pub fn over(table: &'a OpcodeTable, buffer: &'a [u16]) -> Self {
        Self::new(table, buffer, 0, Boundary::Length(buffer.len()))
    }

    /// Offset de la prochaine instruction
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Vrai quand le curseur est épuisé
    pub fn is_done(&self) -> bool {
        self.done || self.offset >= self.limit
    }
}

impl Iterator for InstructionCursor<'_> {
    type Item = DisResult<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            self.done = true;
            return None;
        }

        match decode_at(self.table, self.buffer, self.offset, self.limit) {
            Ok(instruction) => {
                self.offset = instruction.next_offset();
                if self.stop_at_terminator && instruction.is_terminator() {
                    self.done = true;
                }
                Some(Ok(instruction))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for InstructionCursor<'_> {}
