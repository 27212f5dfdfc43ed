//! Music catalog adapters.

mod mock;
mod spotify;

pub use mock::MockCatalog;
pub use spotify::{SpotifyCatalog, SpotifyConfig};
