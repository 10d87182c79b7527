//! Hash collections used for the engine's id-keyed maps.
//! FxHash: non-cryptographic, fast for short string keys.

pub use rustc_hash::{FxHashMap, FxHashSet};
