use crate::models::DocumentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Matched against the lower-cased filename as a literal substring.
    pub pattern: String,
    pub kind: DocumentKind,
}

impl ClassificationRule {
    pub fn new(pattern: impl AsRef<str>, kind: DocumentKind) -> Self {
        Self {
            pattern: pattern.as_ref().to_lowercase(),
            kind,
        }
    }
}

/// Ordered filename predicates; the first matching rule decides the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRules {
    rules: Vec<ClassificationRule>,
}

impl ClassificationRules {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, pattern: impl AsRef<str>, kind: DocumentKind) {
        self.rules.push(ClassificationRule::new(pattern, kind));
    }

    /// Default rules with the patterns of a kind replaced when `table` or `wide`
    /// is non-empty. Kinds without overrides keep their default patterns.
    pub fn with_overrides<P: AsRef<str>>(table: &[P], wide: &[P]) -> Self {
        let defaults = Self::default();
        let mut rules = Self::empty();

        for (kind, overrides) in [(DocumentKind::Table, table), (DocumentKind::WideContext, wide)] {
            if overrides.is_empty() {
                rules.rules.extend(
                    defaults
                        .rules
                        .iter()
                        .filter(|rule| rule.kind == kind)
                        .cloned(),
                );
            } else {
                for pattern in overrides {
                    rules.push(pattern, kind);
                }
            }
        }

        rules
    }

    pub fn classify(&self, filename: &str) -> DocumentKind {
        let lowered = filename.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.pattern))
            .map(|rule| rule.kind)
            .unwrap_or(DocumentKind::Default)
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::new(vec![
            ClassificationRule::new("tabela de preços atualizada (1).pdf", DocumentKind::Table),
            ClassificationRule::new("convênios versão2.pdf", DocumentKind::WideContext),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_ignore_filename_case() {
        let rules = ClassificationRules::default();
        assert_eq!(
            rules.classify("TABELA DE PREÇOS ATUALIZADA (1).pdf"),
            DocumentKind::Table
        );
        assert_eq!(rules.classify("CONVÊNIOS versão2.pdf"), DocumentKind::WideContext);
        assert_eq!(
            rules.classify("MANUAL DE ATENDIMENTO VERSÃO 02 DRIVE (1).pdf"),
            DocumentKind::Default
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut rules = ClassificationRules::empty();
        rules.push("precos", DocumentKind::Table);
        rules.push(".pdf", DocumentKind::WideContext);

        assert_eq!(rules.classify("precos-2024.pdf"), DocumentKind::Table);
        assert_eq!(rules.classify("guia.pdf"), DocumentKind::WideContext);
        assert_eq!(rules.classify("notes.txt"), DocumentKind::Default);
    }

    #[test]
    fn overriding_one_kind_keeps_the_other_defaults() {
        let rules = ClassificationRules::with_overrides(&[] as &[&str], &["GUIA"]);

        assert_eq!(
            rules.classify("TABELA DE PREÇOS ATUALIZADA (1).pdf"),
            DocumentKind::Table
        );
        assert_eq!(rules.classify("guia de convênios.pdf"), DocumentKind::WideContext);
        assert_eq!(rules.classify("CONVÊNIOS versão2.pdf"), DocumentKind::Default);

        let rules = ClassificationRules::with_overrides(&["valores"], &[]);
        assert_eq!(rules.classify("valores.pdf"), DocumentKind::Table);
        assert_eq!(
            rules.classify("TABELA DE PREÇOS ATUALIZADA (1).pdf"),
            DocumentKind::Default
        );
        assert_eq!(rules.classify("CONVÊNIOS versão2.pdf"), DocumentKind::WideContext);
    }

    #[test]
    fn no_overrides_equals_defaults() {
        assert_eq!(
            ClassificationRules::with_overrides::<&str>(&[], &[]),
            ClassificationRules::default()
        );
    }
}
