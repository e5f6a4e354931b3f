pub mod password;

pub mod registration_service;
pub mod registration_service_impl;
pub use registration_service::{
    NewUser, RegisteredUser, RegistrationError, RegistrationService,
};
pub use registration_service_impl::SeaOrmRegistrationService;
