//! US state/territory geography: the fixed name ⇄ postal-code table and the
//! tile-grid coordinates used by the terminal choropleth.

mod states;

pub use states::{code_to_name, name_to_code, tile_position, STATE_CODES};
