// ============================================================
// Layer 6 — Vocabulary
// ============================================================
// Bidirectional mapping between symbol strings and integer ids.
//
// Dictionary file format:
//   UTF-8 text, one symbol per line, surrounding whitespace
//   trimmed. The line index is the symbol id:
//
//     <sos>        ← id 0
//     <eos>        ← id 1
//     <pad>        ← id 2
//     \frac        ← id 3
//     ...
//
// If a symbol appears twice, encoding uses the later line while
// both ids still decode to it.
//
// A Vocabulary is built once from a configured path and shared
// behind an Arc by every component that encodes labels.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::domain::error::DataError;
use crate::domain::relation::StructRelation;

pub const SOS: &str = "<sos>";
pub const EOS: &str = "<eos>";
pub const PAD: &str = "<pad>";
pub const STRUCT: &str = "struct";
pub const FRAC: &str = r"\frac";
pub const SUM: &str = r"\sum";

#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// symbol → id
    words:     HashMap<String, u32>,
    /// id → symbol, in file order
    index:     Vec<String>,
    sos_id:    u32,
    eos_id:    u32,
    pad_id:    u32,
    struct_id: u32,
    frac_id:   Option<u32>,
    sum_id:    Option<u32>,
    relations: BTreeMap<StructRelation, u32>,
}

impl Vocabulary {
    /// Read a newline-delimited dictionary file.
    ///
    /// Fails with a Config error if the file cannot be read or a
    /// required special symbol is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            DataError::config(format!("cannot read dictionary '{}': {e}", path.display()))
        })?;

        let vocab = Self::from_symbols(text.lines())?;
        tracing::info!("{} symbols in total (from '{}')", vocab.index.len(), path.display());
        Ok(vocab)
    }

    /// Build from symbols in id order.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();

        let mut words = HashMap::with_capacity(index.len());
        for (id, word) in index.iter().enumerate() {
            words.insert(word.clone(), id as u32);
        }

        let required = |name: &str| -> Result<u32, DataError> {
            words.get(name).copied().ok_or_else(|| {
                DataError::config(format!("dictionary is missing required symbol '{name}'"))
            })
        };

        let sos_id    = required(SOS)?;
        let eos_id    = required(EOS)?;
        let pad_id    = required(PAD)?;
        let struct_id = required(STRUCT)?;

        let mut relations = BTreeMap::new();
        for r in StructRelation::ALL {
            relations.insert(r, required(r.as_str())?);
        }

        let frac_id = words.get(FRAC).copied();
        let sum_id  = words.get(SUM).copied();

        Ok(Self {
            words,
            index,
            sos_id,
            eos_id,
            pad_id,
            struct_id,
            frac_id,
            sum_id,
            relations,
        })
    }

    /// Map each symbol to its id. No unknown-token fallback.
    pub fn encode<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Vec<u32>, DataError> {
        symbols.iter().map(|s| self.id_of(s.as_ref())).collect()
    }

    /// Id of a single symbol.
    pub fn id_of(&self, symbol: &str) -> Result<u32, DataError> {
        self.words
            .get(symbol)
            .copied()
            .ok_or_else(|| DataError::lookup(format!("symbol '{symbol}' is not in the vocabulary")))
    }

    /// Space-joined symbols for the given ids.
    pub fn decode(&self, ids: &[u32]) -> Result<String, DataError> {
        let symbols = ids
            .iter()
            .map(|&id| {
                self.index
                    .get(id as usize)
                    .map(String::as_str)
                    .ok_or_else(|| DataError::lookup(format!("id {id} is not in the vocabulary")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(symbols.join(" "))
    }

    /// Number of distinct symbols.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// The fixed seven-entry relation → id table.
    pub fn structural_relation_ids(&self) -> &BTreeMap<StructRelation, u32> {
        &self.relations
    }

    pub fn relation_id(&self, relation: StructRelation) -> u32 {
        self.relations[&relation]
    }

    pub fn sos_id(&self) -> u32 { self.sos_id }
    pub fn eos_id(&self) -> u32 { self.eos_id }
    pub fn pad_id(&self) -> u32 { self.pad_id }
    pub fn struct_id(&self) -> u32 { self.struct_id }

    pub fn right_id(&self) -> u32 {
        self.relation_id(StructRelation::Right)
    }

    /// Id of `\frac`, if the dictionary has it.
    pub fn frac_id(&self) -> Option<u32> { self.frac_id }

    /// Id of `\sum`, if the dictionary has it.
    pub fn sum_id(&self) -> Option<u32> { self.sum_id }
}
