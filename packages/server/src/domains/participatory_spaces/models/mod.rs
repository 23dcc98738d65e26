pub mod participatory_space;

pub use participatory_space::{Component, ParticipatorySpace};
