//! Database table operations

mod auth_state_table;
mod spotify_token_table;
mod user_table;

pub use auth_state_table::AuthStateTable;
pub use spotify_token_table::SpotifyTokenTable;
pub use user_table::UserTable;
