pub mod agent;
pub mod functions;
pub mod registry;
pub mod validator;
