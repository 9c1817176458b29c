pub mod feature;
pub mod statistics;
pub mod track;
