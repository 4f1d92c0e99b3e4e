pub mod aggregate;
pub mod annual;
pub mod guild;
pub mod hindex;
pub mod loader;
pub mod windows;

pub use aggregate::aggregate;
pub use annual::annual_summary;
pub use guild::{builtin_reports, guild_collection_summary, run_report};
pub use hindex::h_index;
pub use loader::{DataLoader, Snapshot};
pub use windows::{
    Window, archaeologist, fewest_plays, new_to_me, out_of_the_dust, through_the_years,
};
