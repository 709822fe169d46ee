//! Tessera AI — the narrow contract to the external tile generator:
//! prompt in, content plus token usage out, bounded retries.

pub mod generate;

pub use generate::{
    GenerateError, GeneratedTile, RetryPolicy, TileGenerator, generate_with_fallback,
};
