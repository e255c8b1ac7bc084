// ============================================================
// Layer 2 — VocabUseCase
// ============================================================
// Loads a dictionary and answers questions about it: its size,
// the special ids, and the encoding of a symbol sequence.

use anyhow::{Context, Result};

use crate::infra::vocabulary::Vocabulary;

pub struct VocabUseCase {
    vocab: Vocabulary,
}

impl VocabUseCase {
    pub fn load(path: &str) -> Result<Self> {
        let vocab = Vocabulary::load(path)
            .with_context(|| format!("Loading vocabulary '{path}'"))?;
        Ok(Self { vocab })
    }

    pub fn from_vocab(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Human-readable description of the dictionary.
    pub fn summary(&self) -> String {
        let v = &self.vocab;
        let mut lines = vec![
            format!("symbols:  {}", v.size()),
            format!("<sos>={} <eos>={} <pad>={} struct={}", v.sos_id(), v.eos_id(), v.pad_id(), v.struct_id()),
        ];

        let relations: Vec<String> = v
            .structural_relation_ids()
            .iter()
            .map(|(r, id)| format!("{r}={id}"))
            .collect();
        lines.push(format!("relations: {}", relations.join(" ")));

        if let Some(id) = v.frac_id() {
            lines.push(format!("\\frac={id}"));
        }
        if let Some(id) = v.sum_id() {
            lines.push(format!("\\sum={id}"));
        }
        lines.join("\n")
    }

    /// Encode whitespace-separated symbols.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let symbols: Vec<&str> = text.split_whitespace().collect();
        Ok(self.vocab.encode(&symbols)?)
    }

    /// Decode whitespace-separated ids.
    pub fn decode(&self, text: &str) -> Result<String> {
        let ids = text
            .split_whitespace()
            .map(|t| t.parse::<u32>().with_context(|| format!("'{t}' is not an id")))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.vocab.decode(&ids)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::vocabulary::tests::sample_vocab;

    #[test]
    fn test_summary_lists_relations() {
        let uc = VocabUseCase::from_vocab(sample_vocab());
        let s  = uc.summary();
        assert!(s.contains("symbols:  18"));
        assert!(s.contains("L-sup=8"));
        assert!(s.contains("\\frac=11"));
    }

    #[test]
    fn test_encode_then_decode() {
        let uc  = VocabUseCase::from_vocab(sample_vocab());
        let ids = uc.encode("x + y = 2").unwrap();
        assert_eq!(ids, vec![13, 16, 14, 17, 15]);
        assert_eq!(uc.decode("13 16 14 17 15").unwrap(), "x + y = 2");
    }

    #[test]
    fn test_decode_rejects_non_numeric() {
        let uc = VocabUseCase::from_vocab(sample_vocab());
        assert!(uc.decode("13 x").is_err());
    }
}
