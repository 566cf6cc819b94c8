//! Gendered kinship vocabulary and the escalation rules used by the classifier.

/// Label of entry 0 of every family tree.
pub const ROOT_LABEL: &str = "Root";

/// Label for a relative no rule could classify.
pub const UNKNOWN_RELATION: &str = "Unknown Relation";

/// Canonical kinship category, named by its male form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kinship {
    Father,
    Son,
    Brother,
    GrandFather,
    GreatUncle,
    GreatGrandFather,
    Uncle,
    Cousin,
    Nephew,
    GrandSon,
    GreatGrandSon,
}

impl Kinship {
    pub const ALL: [Kinship; 11] = [
        Kinship::Father,
        Kinship::Son,
        Kinship::Brother,
        Kinship::GrandFather,
        Kinship::GreatUncle,
        Kinship::GreatGrandFather,
        Kinship::Uncle,
        Kinship::Cousin,
        Kinship::Nephew,
        Kinship::GrandSon,
        Kinship::GreatGrandSon,
    ];

    /// Category name, e.g. `"GrandFather"`.
    pub fn name(self) -> &'static str {
        match self {
            Kinship::Father => "Father",
            Kinship::Son => "Son",
            Kinship::Brother => "Brother",
            Kinship::GrandFather => "GrandFather",
            Kinship::GreatUncle => "GreatUncle",
            Kinship::GreatGrandFather => "GreatGrandFather",
            Kinship::Uncle => "Uncle",
            Kinship::Cousin => "Cousin",
            Kinship::Nephew => "Nephew",
            Kinship::GrandSon => "GrandSon",
            Kinship::GreatGrandSon => "GreatGrandSon",
        }
    }

    /// Look a category up by its exact name.
    pub fn from_name(name: &str) -> Option<Kinship> {
        Kinship::ALL.into_iter().find(|k| k.name() == name)
    }

    /// `(female, male)` wording of the category.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Kinship::Father => ("Mother", "Father"),
            Kinship::Son => ("Daughter", "Son"),
            Kinship::Brother => ("Sister", "Brother"),
            Kinship::GrandFather => ("GrandMother", "GrandFather"),
            Kinship::GreatUncle => ("GreatAunt", "GreatUncle"),
            Kinship::GreatGrandFather => ("GreatGrandMother", "GreatGrandFather"),
            Kinship::Uncle => ("Aunt", "Uncle"),
            Kinship::Cousin => ("Cousin", "Cousin"),
            Kinship::Nephew => ("Niece", "Nephew"),
            Kinship::GrandSon => ("Granddaughter", "GrandSon"),
            Kinship::GreatGrandSon => ("GreatGranddaughter", "GreatGrandson"),
        }
    }

    /// Wording for `sex` (`"F"` or `"M"`), [`UNKNOWN_RELATION`] for any other value.
    pub fn gendered(self, sex: &str) -> &'static str {
        let (female, male) = self.labels();
        match sex {
            "F" => female,
            "M" => male,
            _ => UNKNOWN_RELATION,
        }
    }

    /// True if `label` is either wording of this category.
    pub fn matches(self, label: &str) -> bool {
        let (female, male) = self.labels();
        label == female || label == male
    }
}

/// Gendered label for a category given by name.
///
/// Unknown categories and sexes other than `"F"`/`"M"` yield [`UNKNOWN_RELATION`].
pub fn gendered(category: &str, sex: &str) -> &'static str {
    Kinship::from_name(category)
        .map(|k| k.gendered(sex))
        .unwrap_or(UNKNOWN_RELATION)
}

/// True if `label` is a wording of the category named `category`.
pub fn is_category(label: &str, category: &str) -> bool {
    Kinship::from_name(category).is_some_and(|k| k.matches(label))
}

/// Escalation applied when the candidate is a parent of an already classified
/// relative. Evaluated top to bottom.
pub const ANCESTOR_RULES: [(Kinship, Kinship); 2] = [
    (Kinship::Father, Kinship::GrandFather),
    (Kinship::GrandFather, Kinship::GreatGrandFather),
];

/// Escalation applied when the candidate is a child of an already classified
/// relative. Evaluated top to bottom.
pub const DESCENDANT_RULES: [(Kinship, Kinship); 8] = [
    (Kinship::GrandFather, Kinship::Uncle),
    (Kinship::Uncle, Kinship::Cousin),
    (Kinship::Cousin, Kinship::Nephew),
    (Kinship::Brother, Kinship::Nephew),
    (Kinship::GreatGrandFather, Kinship::GreatUncle),
    (Kinship::Nephew, Kinship::Nephew),
    (Kinship::Son, Kinship::GrandSon),
    (Kinship::GrandSon, Kinship::GreatGrandSon),
];

/// First rule whose source category matches `label`.
pub fn escalate(rules: &[(Kinship, Kinship)], label: &str) -> Option<Kinship> {
    rules
        .iter()
        .find(|(from, _)| from.matches(label))
        .map(|&(_, to)| to)
}
