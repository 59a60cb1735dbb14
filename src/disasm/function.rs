//! Fonctions fournies par l'hôte

use serde::{Deserialize, Serialize};

/// Interface d'une fonction à désassembler
///
/// Une fonction étrangère (implémentée hors de la VM) n'a pas de flux
/// d'instructions : `code` n'est alors jamais consulté.
pub trait FunctionSource {
    /// Nom affichable de la fonction
    fn name(&self) -> &str;

    /// Vrai si la fonction n'a pas de flux d'instructions
    fn is_foreign(&self) -> bool;

    /// Mots de code de la fonction
    fn code(&self) -> &[u16];
}

/// Fonction décrite par l'hôte, chargeable depuis JSON
///
/// ```json
/// { "name": "main", "foreign": false, "code": [42, 5, 1, 31, 1] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFunction {
    pub name: String,

    #[serde(default)]
    pub foreign: bool,

    #[serde(default)]
    pub code: Vec<u16>,
}

impl CodeFunction {
    /// Fonction compilée pour la VM
    pub fn native(name: impl Into<String>, code: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            foreign: false,
            code,
        }
    }

    /// Fonction implémentée par l'hôte
    pub fn foreign(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreign: true,
            code: Vec::new(),
        }
    }

    /// Charge une fonction ou une liste de fonctions depuis du JSON
    pub fn parse_many(json: &str) -> serde_json::Result<Vec<CodeFunction>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(CodeFunction),
            Many(Vec<CodeFunction>),
        }

        Ok(match serde_json::from_str(json)? {
            OneOrMany::One(function) => vec![function],
            OneOrMany::Many(functions) => functions,
        })
    }
}

impl FunctionSource for CodeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_foreign(&self) -> bool {
        self.foreign
    }

    fn code(&self) -> &[u16] {
        &self.code
    }
}

/// Un tampon brut est toujours une fonction native
impl FunctionSource for [u16] {
    fn name(&self) -> &str {
        "<code>"
    }

    fn is_foreign(&self) -> bool {
        false
    }

    fn code(&self) -> &[u16] {
        self
    }
}
