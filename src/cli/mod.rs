pub mod cleanup;
pub mod doctor;
