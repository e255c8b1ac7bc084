// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what a formula sample
// IS, independent of how it is stored or batched.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The seven structural relations between parent and child symbols
pub mod relation;

// Raw and transformed sample types
pub mod sample;

// Typed errors shared by the data and infra layers
pub mod error;

// Seams for sample sources and index samplers
pub mod traits;
