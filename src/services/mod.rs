pub mod admin;
pub mod link_service;
pub mod redirect;

pub use admin::AdminService;
pub use link_service::LinkService;
pub use redirect::RedirectService;
