// ============================================================
// Layer 3 — Structural Relations
// ============================================================
// A label graph links every child symbol to its parent through
// zero or more spatial relations. The set is fixed: every label
// row carries exactly one field per relation, in this order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One spatial relationship between a parent and a child symbol.
///
/// The declaration order is the column order of the relation
/// flags in a label row, and the iteration order of
/// `Vocabulary::structural_relation_ids`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructRelation {
    Above,
    Below,
    Sub,
    Sup,
    LSup,
    Inside,
    Right,
}

impl StructRelation {
    /// Number of relation kinds, i.e. the arity of `struct_flags`.
    pub const COUNT: usize = 7;

    pub const ALL: [StructRelation; Self::COUNT] = [
        StructRelation::Above,
        StructRelation::Below,
        StructRelation::Sub,
        StructRelation::Sup,
        StructRelation::LSup,
        StructRelation::Inside,
        StructRelation::Right,
    ];

    /// The symbol used for this relation in the dictionary file.
    pub fn as_str(self) -> &'static str {
        match self {
            StructRelation::Above  => "above",
            StructRelation::Below  => "below",
            StructRelation::Sub    => "sub",
            StructRelation::Sup    => "sup",
            StructRelation::LSup   => "L-sup",
            StructRelation::Inside => "inside",
            StructRelation::Right  => "right",
        }
    }
}

impl fmt::Display for StructRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructRelation::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown structural relation '{s}'"))
    }
}
