//! Destination du texte produit

/// Tampon de texte externe qui accumule la sortie
pub trait TextSink {
    /// Ajoute un morceau de texte à la fin du tampon
    fn push_text(&mut self, text: &str);
}

impl TextSink for String {
    fn push_text(&mut self, text: &str) {
        self.push_str(text);
    }
}
