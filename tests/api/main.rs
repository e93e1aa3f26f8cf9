#[macro_use]
mod helpers;

mod account;
mod course_materials;
mod directory;
mod home;
mod material_requests;
mod news;
