pub mod audio;
pub mod backend;
pub mod firebase;
pub mod http;
pub mod prefs_store;
pub mod still_frames;
pub mod v4l2;
