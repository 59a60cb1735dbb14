//! Mise en forme textuelle des instructions décodées
//!
//! La grammaire des lignes est un contrat : les outils qui lisent cette
//! sortie dépendent des espaces, des flèches et des crochets exacts.
//!
//! ```text
//! [0-2] (42) o_load_integer
//!     [   1] value:   5
//!     [   2] ======>  #1
//! ```

use crate::cursor::{DecodedField, DecodedValue, Instruction};
use crate::opcode::{Direction, Scope};

/// Largeur de la colonne des positions
pub const POSITION_WIDTH: usize = 4;

/// Largeur de la colonne des labels
pub const LABEL_WIDTH: usize = 9;

/// Formateur des champs d'instruction
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldFormatter;

impl FieldFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Ligne d'en-tête : `[<début>-<fin>] (<opcode>) <mnémonique>`
    pub fn header(&self, instruction: &Instruction) -> String {
        format!(
            "[{}-{}] ({}) {}",
            instruction.offset,
            instruction.end(),
            instruction.opcode,
            instruction.mnemonic
        )
    }

    /// Ligne d'un champ décodé
    pub fn field(&self, field: &DecodedField) -> String {
        let pos = field.position;
        match &field.value {
            DecodedValue::Integer { label, value } => {
                format!(
                    "    [{pos:>pw$}] {label:<lw$}{value}",
                    pw = POSITION_WIDTH,
                    lw = LABEL_WIDTH
                )
            }
            DecodedValue::Register {
                direction,
                scope,
                slot,
            } => {
                let arrow = match direction {
                    Direction::In => "<------",
                    Direction::Out => "======>",
                };
                let suffix = match scope {
                    Scope::Local => "",
                    Scope::Global => " (G)",
                    Scope::Upvalue => " (up)",
                };
                format!(
                    "    [{pos:>pw$}] {arrow}  #{slot}{suffix}",
                    pw = POSITION_WIDTH
                )
            }
            DecodedValue::Jump {
                displacement,
                target,
            } => {
                format!(
                    "    [{pos:>pw$}] +>    |  [{target}] ({displacement})",
                    pw = POSITION_WIDTH
                )
            }
        }
    }

    /// Bloc complet d'une instruction : en-tête puis un champ par ligne
    pub fn write_instruction(&self, out: &mut String, instruction: &Instruction) {
        out.push_str(&self.header(instruction));
        out.push('\n');
        for field in &instruction.fields {
            out.push_str(&self.field(field));
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{Opcode, OpcodeClass};

    fn at(position: usize, value: DecodedValue) -> DecodedField {
        DecodedField { position, value }
    }

    #[test]
    fn test_scalar_label_is_padded() {
        let formatter = FieldFormatter::new();
        let line = formatter.field(&at(
            1,
            DecodedValue::Integer {
                label: "value:",
                value: 5,
            },
        ));
        assert_eq!(line, "    [   1] value:   5");

        let line = formatter.field(&at(
            12,
            DecodedValue::Integer {
                label: "literal:",
                value: 300,
            },
        ));
        assert_eq!(line, "    [  12] literal: 300");
    }

    #[test]
    fn test_register_arrows_and_scopes() {
        let formatter = FieldFormatter::new();
        let reg = |direction, scope| {
            formatter.field(&at(
                3,
                DecodedValue::Register {
                    direction,
                    scope,
                    slot: 7,
                },
            ))
        };

        assert_eq!(reg(Direction::In, Scope::Local), "    [   3] <------  #7");
        assert_eq!(reg(Direction::Out, Scope::Local), "    [   3] ======>  #7");
        assert_eq!(reg(Direction::In, Scope::Global), "    [   3] <------  #7 (G)");
        assert_eq!(reg(Direction::Out, Scope::Global), "    [   3] ======>  #7 (G)");
        assert_eq!(reg(Direction::In, Scope::Upvalue), "    [   3] <------  #7 (up)");
        assert_eq!(reg(Direction::Out, Scope::Upvalue), "    [   3] ======>  #7 (up)");
    }

    #[test]
    fn test_jump_line() {
        let formatter = FieldFormatter::new();
        let line = formatter.field(&at(
            11,
            DecodedValue::Jump {
                displacement: -3,
                target: 7,
            },
        ));
        assert_eq!(line, "    [  11] +>    |  [7] (-3)");
    }

    #[test]
    fn test_header_uses_inclusive_end() {
        let instruction = Instruction {
            opcode: Opcode(42),
            mnemonic: "o_load_integer",
            class: OpcodeClass::empty(),
            offset: 4,
            width: 3,
            fields: Vec::new(),
        };
        assert_eq!(
            FieldFormatter::new().header(&instruction),
            "[4-6] (42) o_load_integer"
        );
    }
}
