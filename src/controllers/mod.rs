pub mod friends;
pub mod home;
pub mod maintenance;
pub mod movies;
pub mod reviews;
