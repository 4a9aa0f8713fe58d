pub mod alert;
pub mod camera;
pub mod detection;
pub mod errors;
pub mod preferences;
pub mod session;
pub mod status;
pub mod view;
