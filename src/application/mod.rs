// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each.
//
// Rules for this layer:
//   - No tensor or packing code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination and configuration
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Dataset configuration shared by every workflow
pub mod config;

// Build the loaders and walk them, recording batch statistics
pub mod inspect_use_case;

// Dictionary inspection, encode and decode
pub mod vocab_use_case;
