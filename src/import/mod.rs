pub mod gpx;
mod time;
