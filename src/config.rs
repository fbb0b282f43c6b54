//! Settings for every front end: playback timing, the music library, the
//! remote endpoint, the desktop bridge, media keys and logging.
//!
//! Values come from defaults, then `config.toml`, then `INCALLIDE__*`
//! environment variables.

mod load;
mod schema;

pub use schema::*;
