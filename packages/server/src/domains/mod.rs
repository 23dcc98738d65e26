// Business domains
pub mod meetings;
pub mod participatory_spaces;
