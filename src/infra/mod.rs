// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting pieces used by several other layers:
//
//   vocabulary.rs   — Symbol dictionary
//                     Reads the one-symbol-per-line dictionary
//                     and maps symbols to ids and back. Built once
//                     and injected wherever labels are encoded.
//
//   config_store.rs — Dataset config persistence
//                     Saves/loads DatasetConfig as JSON.
//
//   metrics.rs      — Batch metrics logging
//                     Writes per-batch packing statistics to CSV.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Symbol ↔ id dictionary
pub mod vocabulary;

/// DatasetConfig JSON persistence
pub mod config_store;

/// Per-batch packing statistics CSV logger
pub mod metrics;
